use crate::config::InteractionConfigOverrides;
use crate::menu::MenuType;
use anyhow::{anyhow, bail, Context, Result};
use glam::Vec2;
use std::env;
use std::path::PathBuf;

/// Arguments of the `pie_probe` tool.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProbeArgs {
    menu: Option<MenuType>,
    stick: Option<Vec2>,
    angle_degrees: Option<f32>,
    config: Option<PathBuf>,
    deadzone: Option<f32>,
    json: Option<bool>,
}

impl ProbeArgs {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut probe = ProbeArgs::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            if !flag.starts_with("--") {
                bail!("Unexpected argument '{flag}'. Use --menu/--stick/--angle with values.");
            }
            let key = &flag[2..];
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "menu" => {
                    probe.menu = Some(
                        MenuType::from_name(&value).ok_or_else(|| anyhow!("Unknown menu '{value}'"))?,
                    );
                }
                "stick" => probe.stick = Some(parse_stick(&value)?),
                "angle" => {
                    probe.angle_degrees =
                        Some(value.parse::<f32>().with_context(|| format!("Invalid angle '{value}'"))?);
                }
                "config" => probe.config = Some(PathBuf::from(value)),
                "deadzone" => {
                    probe.deadzone =
                        Some(value.parse::<f32>().with_context(|| format!("Invalid deadzone '{value}'"))?);
                }
                "json" => probe.json = Some(parse_bool_flag("json", &value)?),
                _ => bail!(
                    "Unknown flag '{flag}'. Supported flags: --menu, --stick, --angle, --config, --deadzone, --json."
                ),
            }
        }
        if probe.stick.is_some() && probe.angle_degrees.is_some() {
            bail!("--stick and --angle are mutually exclusive");
        }
        Ok(probe)
    }

    pub fn menu(&self) -> MenuType {
        self.menu.unwrap_or(MenuType::Main8)
    }

    pub fn stick(&self) -> Option<Vec2> {
        self.stick
    }

    /// Probe angle in radians, clockwise from up.
    pub fn angle(&self) -> Option<f32> {
        self.angle_degrees.map(f32::to_radians)
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config.as_ref()
    }

    pub fn json(&self) -> bool {
        self.json.unwrap_or(false)
    }

    pub fn config_overrides(&self) -> InteractionConfigOverrides {
        InteractionConfigOverrides { stick_deadzone: self.deadzone, ..InteractionConfigOverrides::default() }
    }
}

fn parse_stick(value: &str) -> Result<Vec2> {
    let (x, y) = value.split_once(',').ok_or_else(|| anyhow!("Invalid stick '{value}'. Use x,y."))?;
    let x = x.trim().parse::<f32>().with_context(|| format!("Invalid stick x '{x}'"))?;
    let y = y.trim().parse::<f32>().with_context(|| format!("Invalid stick y '{y}'"))?;
    Ok(Vec2::new(x, y))
}

fn parse_bool_flag(flag: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => bail!("Invalid {flag} value '{other}'. Use on/off or true/false."),
    }
}
