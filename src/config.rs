use crate::cursor::Side;
use anyhow::{Context, Result};
use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct DragConfig {
    /// Hand travel in metres before a held press becomes a drag.
    #[serde(default = "DragConfig::default_distance_threshold")]
    pub distance_threshold: f32,
    #[serde(default = "DragConfig::default_rotation_threshold_degrees")]
    pub rotation_threshold_degrees: f32,
    /// Minimum hold time before a press may become a drag.
    #[serde(default = "DragConfig::default_time_threshold_ms")]
    pub time_threshold_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuConfig {
    /// Stick deflections at or below this length carry no direction.
    #[serde(default = "MenuConfig::default_stick_deadzone")]
    pub stick_deadzone: f32,
    #[serde(default = "MenuConfig::default_submenu_depth_limit")]
    pub submenu_depth_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HandsConfig {
    #[serde(default = "HandsConfig::default_dominant")]
    pub dominant: Side,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct InteractionConfig {
    #[serde(default)]
    pub drag: DragConfig,
    #[serde(default)]
    pub menu: MenuConfig,
    #[serde(default)]
    pub hands: HandsConfig,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionConfigOverrides {
    pub distance_threshold: Option<f32>,
    pub time_threshold_ms: Option<u64>,
    pub stick_deadzone: Option<f32>,
}

impl DragConfig {
    const fn default_distance_threshold() -> f32 {
        0.012
    }

    const fn default_rotation_threshold_degrees() -> f32 {
        8.0
    }

    const fn default_time_threshold_ms() -> u64 {
        150
    }

    pub fn rotation_threshold(&self) -> f32 {
        self.rotation_threshold_degrees.to_radians()
    }
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            distance_threshold: Self::default_distance_threshold(),
            rotation_threshold_degrees: Self::default_rotation_threshold_degrees(),
            time_threshold_ms: Self::default_time_threshold_ms(),
        }
    }
}

impl MenuConfig {
    const fn default_stick_deadzone() -> f32 {
        1e-4
    }

    const fn default_submenu_depth_limit() -> usize {
        8
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            stick_deadzone: Self::default_stick_deadzone(),
            submenu_depth_limit: Self::default_submenu_depth_limit(),
        }
    }
}

impl HandsConfig {
    const fn default_dominant() -> Side {
        Side::Right
    }
}

impl Default for HandsConfig {
    fn default() -> Self {
        Self { dominant: Self::default_dominant() }
    }
}

impl InteractionConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("[config] {err:#}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &InteractionConfigOverrides) {
        if let Some(distance) = overrides.distance_threshold {
            self.drag.distance_threshold = distance.max(0.0);
        }
        if let Some(time) = overrides.time_threshold_ms {
            self.drag.time_threshold_ms = time;
        }
        if let Some(deadzone) = overrides.stick_deadzone {
            self.menu.stick_deadzone = deadzone.max(0.0);
        }
    }
}

impl InteractionConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.distance_threshold.is_none() && self.time_threshold_ms.is_none() && self.stick_deadzone.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.distance_threshold.is_some() {
            fields.push("distance_threshold");
        }
        if self.time_threshold_ms.is_some() {
            fields.push("time_threshold_ms");
        }
        if self.stick_deadzone.is_some() {
            fields.push("stick_deadzone");
        }
        fields
    }
}
