use crate::handler::HandlerType;
use crate::menu::MenuType;
use glam::Mat4;

pub(crate) const HIGHLIGHT_SCALE: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconGlyph<'a> {
    Handler { handler_type: HandlerType, name: &'a str },
    Command(&'a str),
    Submenu(MenuType),
    Exit,
    Placeholder,
}

impl IconGlyph<'_> {
    pub fn label(&self) -> String {
        match self {
            IconGlyph::Handler { name, .. } => (*name).to_string(),
            IconGlyph::Command(command) => (*command).to_string(),
            IconGlyph::Submenu(menu) => format!("menu:{menu}"),
            IconGlyph::Exit => "exit".to_string(),
            IconGlyph::Placeholder => "placeholder".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconStyle {
    pub active: bool,
    pub highlighted: bool,
    pub scale: f32,
}

impl IconStyle {
    pub const IDLE: IconStyle = IconStyle { active: false, highlighted: false, scale: 1.0 };

    pub fn active() -> Self {
        Self { active: true, ..Self::IDLE }
    }

    pub fn highlighted() -> Self {
        Self { active: true, highlighted: true, scale: HIGHLIGHT_SCALE }
    }
}

impl Default for IconStyle {
    fn default() -> Self {
        Self::IDLE
    }
}

/// Draw-call sink supplied by the host renderer. Called once per visible icon per frame.
pub trait IconRenderer {
    fn draw_icon(&mut self, glyph: IconGlyph<'_>, transform: Mat4, style: IconStyle);
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedIcon {
    pub label: String,
    pub transform: Mat4,
    pub style: IconStyle,
}

/// Renderer that keeps every draw call; used by headless hosts and tests.
#[derive(Debug, Default)]
pub struct IconRecorder {
    pub icons: Vec<RecordedIcon>,
}

impl IconRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.icons.iter().map(|icon| icon.label.as_str()).collect()
    }

    pub fn highlighted(&self) -> Option<&RecordedIcon> {
        self.icons.iter().find(|icon| icon.style.highlighted)
    }

    pub fn clear(&mut self) {
        self.icons.clear();
    }
}

impl IconRenderer for IconRecorder {
    fn draw_icon(&mut self, glyph: IconGlyph<'_>, transform: Mat4, style: IconStyle) {
        self.icons.push(RecordedIcon { label: glyph.label(), transform, style });
    }
}
