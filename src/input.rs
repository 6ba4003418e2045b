use crate::cursor::Side;
use crate::handler::HandlerType;
use anyhow::{Context, Result};
use bitflags::bitflags;
use glam::{Mat4, Vec2};
use log::warn;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

bitflags! {
    /// Physical controller buttons, one bit each.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Buttons: u16 {
        const TRIGGER = 1 << 0;
        const GRIP = 1 << 1;
        const PRIMARY = 1 << 2;
        const SECONDARY = 1 << 3;
        const MENU = 1 << 4;
        const STICK_PRESS = 1 << 5;
        const STICK_TOUCH = 1 << 6;
        const THUMBREST = 1 << 7;
    }
}

impl Buttons {
    /// Buttons the radial menu takes over while it is open.
    pub const STICK: Buttons = Buttons::STICK_PRESS.union(Buttons::STICK_TOUCH);

    pub fn from_config_name(raw: &str) -> Option<Buttons> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "trigger" => Some(Buttons::TRIGGER),
            "grip" | "grab" => Some(Buttons::GRIP),
            "primary" | "a" | "x" => Some(Buttons::PRIMARY),
            "secondary" | "b" | "y" => Some(Buttons::SECONDARY),
            "menu" => Some(Buttons::MENU),
            "stick_press" | "thumbstick" => Some(Buttons::STICK_PRESS),
            "stick_touch" => Some(Buttons::STICK_TOUCH),
            "thumbrest" => Some(Buttons::THUMBREST),
            _ => None,
        }
    }
}

/// Raw per-hand sample supplied by the input layer each frame.
#[derive(Debug, Clone, Copy)]
pub struct ControllerSample {
    pub pose: Mat4,
    pub buttons: Buttons,
    pub stick: Vec2,
}

impl ControllerSample {
    pub fn at(pose: Mat4) -> Self {
        Self { pose, buttons: Buttons::empty(), stick: Vec2::ZERO }
    }

    pub fn with_buttons(mut self, buttons: Buttons) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn with_stick(mut self, stick: Vec2) -> Self {
        self.stick = stick;
        self.buttons |= Buttons::STICK_TOUCH;
        self
    }
}

impl Default for ControllerSample {
    fn default() -> Self {
        Self::at(Mat4::IDENTITY)
    }
}

/// Press and release edges between two consecutive button states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonEdges {
    pub pressed: Buttons,
    pub released: Buttons,
    pub held: Buttons,
}

impl ButtonEdges {
    pub fn between(previous: Buttons, current: Buttons) -> Self {
        Self { pressed: current - previous, released: previous - current, held: current }
    }

    pub fn masked(self, mask: Buttons) -> Self {
        Self { pressed: self.pressed & mask, released: self.released & mask, held: self.held & mask }
    }
}

/// Which handler each controller button drives, per hand. The trigger binding is the hand's
/// current tool.
#[derive(Debug, Clone)]
pub struct ButtonLayout {
    left: HashMap<Buttons, String>,
    right: HashMap<Buttons, String>,
}

impl ButtonLayout {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read layout file {}", path.display()))?;
        let file: LayoutConfigFile = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse layout file {}", path.display()))?;
        Ok(Self::from_config(file, &path.display().to_string()))
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(layout) => layout,
            Err(err) => {
                warn!("[layout] {err:#}. Falling back to default bindings.");
                Self::default()
            }
        }
    }

    fn from_config(file: LayoutConfigFile, origin: &str) -> Self {
        let mut layout = Self::default();
        for (side, overrides) in [(Side::Left, file.left), (Side::Right, file.right)] {
            for (button_name, handler_name) in overrides {
                let Some(button) = Buttons::from_config_name(&button_name) else {
                    warn!("[layout] {origin}: unknown button '{button_name}' on {side} hand, ignoring.");
                    continue;
                };
                let handler_name = handler_name.trim().to_string();
                if handler_name.is_empty() {
                    layout.unbind(side, button);
                    continue;
                }
                layout.bind(side, button, handler_name);
            }
        }
        layout
    }

    fn default_map(side: Side) -> HashMap<Buttons, String> {
        let mut map = HashMap::new();
        let (tool, menu, secondary) = match side {
            Side::Left => (HandlerType::Transform, HandlerType::MenuLeft, HandlerType::Redo),
            Side::Right => (HandlerType::SelectRaycast, HandlerType::MenuRight, HandlerType::Undo),
        };
        map.insert(Buttons::TRIGGER, tool.name().to_string());
        map.insert(Buttons::GRIP, HandlerType::NaviGrabAir.name().to_string());
        map.insert(Buttons::PRIMARY, menu.name().to_string());
        map.insert(Buttons::SECONDARY, secondary.name().to_string());
        map.insert(Buttons::MENU, HandlerType::SwitchTool.name().to_string());
        map.insert(Buttons::THUMBREST, HandlerType::Shift.name().to_string());
        map
    }

    fn side_map(&self, side: Side) -> &HashMap<Buttons, String> {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn side_map_mut(&mut self, side: Side) -> &mut HashMap<Buttons, String> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn binding(&self, side: Side, button: Buttons) -> Option<&str> {
        self.side_map(side).get(&button).map(String::as_str)
    }

    pub fn bind(&mut self, side: Side, button: Buttons, handler_name: impl Into<String>) {
        self.side_map_mut(side).insert(button, handler_name.into());
    }

    pub fn unbind(&mut self, side: Side, button: Buttons) -> Option<String> {
        self.side_map_mut(side).remove(&button)
    }

    /// Name of the handler bound to the trigger.
    pub fn tool_name(&self, side: Side) -> Option<&str> {
        self.binding(side, Buttons::TRIGGER)
    }

    pub fn set_tool(&mut self, side: Side, tool: HandlerType) {
        self.bind(side, Buttons::TRIGGER, tool.name());
    }

    /// Bound buttons in bit order, filtered by `mask`.
    pub fn bound_in(&self, side: Side, mask: Buttons) -> impl Iterator<Item = (Buttons, &str)> + '_ {
        let map = self.side_map(side);
        mask.iter().filter_map(move |button| map.get(&button).map(|name| (button, name.as_str())))
    }
}

impl Default for ButtonLayout {
    fn default() -> Self {
        Self { left: Self::default_map(Side::Left), right: Self::default_map(Side::Right) }
    }
}

#[derive(Debug, Default, Deserialize)]
struct LayoutConfigFile {
    #[serde(default)]
    left: HashMap<String, String>,
    #[serde(default)]
    right: HashMap<String, String>,
}
