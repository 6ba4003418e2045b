//! Radial (pie) menu state per hand.
//!
//! A menu session starts with [`RadialMenu::open_root`], follows the stick with
//! [`RadialMenu::update`] and ends with [`RadialMenu::commit`]. Submenus push the parent onto a
//! per-hand stack; committing the exit region pops it again.

mod catalog;
mod sector;

pub use catalog::{
    populate, validate, LayoutKind, MenuEntries, MenuEntry, MenuError, MenuItem, MenuSpec, MenuType, Population,
};
pub use sector::{compass_position, resolve_sector, stick_angle, Sector, SectorLayout, MAX_ITEMS};

use crate::config::MenuConfig;
use crate::cursor::Side;
use crate::handler::{HandlerRef, HandlerType};
use crate::registry::HandlerRegistry;
use crate::render::{IconGlyph, IconRenderer, IconStyle};
use glam::{Mat4, Quat, Vec2, Vec3};
use log::{debug, error, warn};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub type MenuHandle = Rc<RefCell<RadialMenu>>;

/// Distance of item icons from the controller, in metres.
pub(crate) const MENU_RADIUS: f32 = 0.04;
/// Icons sit slightly above the controller so the stick stays visible.
pub(crate) const MENU_LIFT: f32 = 0.01;

#[derive(Debug, Clone)]
pub struct MenuState {
    menu_type: MenuType,
    parents: SmallVec<[MenuType; 4]>,
    is_open: bool,
    stick: Vec2,
    angle: Option<f32>,
    highlight_index: i32,
    action_settings: bool,
    items: MenuEntries,
    layout: Option<SectorLayout>,
}

impl MenuState {
    fn new(menu_type: MenuType) -> Self {
        Self {
            menu_type,
            parents: SmallVec::new(),
            is_open: false,
            stick: Vec2::ZERO,
            angle: None,
            highlight_index: -1,
            action_settings: false,
            items: MenuEntries::new(),
            layout: None,
        }
    }

    pub fn menu_type(&self) -> MenuType {
        self.menu_type
    }

    pub fn depth(&self) -> usize {
        self.parents.len()
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn stick(&self) -> Vec2 {
        self.stick
    }

    pub fn angle(&self) -> Option<f32> {
        self.angle
    }

    pub fn highlight_index(&self) -> i32 {
        self.highlight_index
    }

    pub fn action_settings(&self) -> bool {
        self.action_settings
    }

    pub fn items(&self) -> &[MenuEntry] {
        &self.items
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn layout(&self) -> Option<SectorLayout> {
        self.layout
    }

    /// Sector under the last valid stick angle.
    pub fn hovered(&self) -> Option<Sector> {
        Some(self.layout?.resolve(self.angle?))
    }

    fn close(&mut self) {
        self.is_open = false;
        self.highlight_index = -1;
    }
}

/// What a commit resolved to. The caller performs the follow-up.
#[derive(Clone)]
pub enum MenuCommit {
    /// Nothing to resolve: menu closed or no valid angle this session.
    Ignored,
    Exited { depth: usize, closed: bool },
    Submenu { menu: MenuType, depth: usize },
    Invoke { handler_type: HandlerType, handler: HandlerRef },
    Command(&'static str),
    SelectTool(HandlerType),
    Empty,
}

impl fmt::Debug for MenuCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuCommit::Ignored => f.write_str("Ignored"),
            MenuCommit::Exited { depth, closed } => write!(f, "Exited {{ depth: {depth}, closed: {closed} }}"),
            MenuCommit::Submenu { menu, depth } => write!(f, "Submenu {{ menu: {menu}, depth: {depth} }}"),
            MenuCommit::Invoke { handler_type, .. } => write!(f, "Invoke({handler_type})"),
            MenuCommit::Command(name) => write!(f, "Command({name})"),
            MenuCommit::SelectTool(tool) => write!(f, "SelectTool({tool})"),
            MenuCommit::Empty => f.write_str("Empty"),
        }
    }
}

/// Both hands' menu state.
#[derive(Debug, Clone)]
pub struct RadialMenu {
    config: MenuConfig,
    hands: [MenuState; 2],
}

impl RadialMenu {
    pub fn new(config: MenuConfig) -> Self {
        Self { config, hands: [MenuState::new(MenuType::TsSelect), MenuState::new(MenuType::TsTransform)] }
    }

    pub fn into_handle(self) -> MenuHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn state(&self, side: Side) -> &MenuState {
        &self.hands[side.index()]
    }

    fn state_mut(&mut self, side: Side) -> &mut MenuState {
        &mut self.hands[side.index()]
    }

    pub fn is_open(&self, side: Side) -> bool {
        self.state(side).is_open
    }

    /// Opens `menu` at the current depth. Tables that do not fit their layout leave the state
    /// untouched.
    pub fn open(&mut self, side: Side, menu: MenuType, registry: &HandlerRegistry) -> bool {
        let population = match populate(menu, registry) {
            Ok(population) => population,
            Err(err) => {
                error!("[menu] refusing to open {menu}: {err}");
                debug_assert!(false, "malformed menu table: {err}");
                return false;
            }
        };
        let state = self.state_mut(side);
        state.menu_type = menu;
        state.items = population.entries;
        state.layout = Some(population.layout);
        state.stick = Vec2::ZERO;
        state.angle = None;
        state.highlight_index = -1;
        state.is_open = true;
        debug!("[menu] {side} opened {menu} at depth {}", state.depth());
        true
    }

    /// Starts a fresh session at depth 0 with the root menu for `tool`.
    pub fn open_root(&mut self, side: Side, tool: Option<HandlerType>, registry: &HandlerRegistry) -> bool {
        self.open_fresh(side, MenuType::root_for(tool), registry)
    }

    /// Starts a fresh session at depth 0 with an explicit menu.
    pub fn open_fresh(&mut self, side: Side, menu: MenuType, registry: &HandlerRegistry) -> bool {
        let state = self.state_mut(side);
        state.parents.clear();
        state.action_settings = false;
        self.open(side, menu, registry)
    }

    pub fn open_action_settings(&mut self, side: Side, tool: HandlerType, registry: &HandlerRegistry) -> bool {
        let Some(menu) = MenuType::action_settings_for(tool) else {
            return false;
        };
        let state = self.state_mut(side);
        state.parents.clear();
        state.action_settings = true;
        if !self.open(side, menu, registry) {
            self.state_mut(side).action_settings = false;
            return false;
        }
        true
    }

    pub fn close_action_settings(&mut self, side: Side) -> bool {
        let state = self.state_mut(side);
        if !state.action_settings {
            return false;
        }
        state.action_settings = false;
        state.close();
        true
    }

    pub fn close(&mut self, side: Side) {
        let state = self.state_mut(side);
        state.action_settings = false;
        state.close();
    }

    /// Samples the stick. Degenerate vectors keep the previous angle and highlight.
    pub fn update(&mut self, side: Side, stick: Vec2) {
        let deadzone = self.config.stick_deadzone;
        let state = self.state_mut(side);
        if !state.is_open {
            return;
        }
        let Some(angle) = stick_angle(stick, deadzone) else {
            debug!("[menu] {side} stick {stick} below deadzone, keeping last angle");
            return;
        };
        state.stick = stick;
        state.angle = Some(angle);
        state.highlight_index = state
            .layout
            .and_then(|layout| layout.slot_of(layout.resolve(angle)))
            .map(|slot| slot as i32)
            .unwrap_or(-1);
    }

    /// Resolves the last valid angle and applies it to the depth stack.
    pub fn commit(&mut self, side: Side, registry: &HandlerRegistry) -> MenuCommit {
        let depth_limit = self.config.submenu_depth_limit;
        let state = self.state(side);
        if !state.is_open {
            return MenuCommit::Ignored;
        }
        let Some(sector) = state.hovered() else {
            return MenuCommit::Ignored;
        };
        let keep_open = state.action_settings;
        match sector {
            Sector::Exit => self.exit_level(side, registry),
            Sector::Empty => {
                if !keep_open {
                    self.state_mut(side).close();
                }
                MenuCommit::Empty
            }
            Sector::Item(index) => {
                let Some(entry) = state.items.get(index).cloned() else {
                    return MenuCommit::Empty;
                };
                match entry {
                    MenuEntry::Submenu(menu) => {
                        if state.depth() >= depth_limit {
                            warn!("[menu] {side} submenu {menu} exceeds depth limit {depth_limit}");
                            return MenuCommit::Ignored;
                        }
                        let parent = state.menu_type;
                        self.state_mut(side).parents.push(parent);
                        if !self.open(side, menu, registry) {
                            self.state_mut(side).parents.pop();
                            return MenuCommit::Ignored;
                        }
                        MenuCommit::Submenu { menu, depth: self.state(side).depth() }
                    }
                    MenuEntry::Handler { handler_type, handler } => {
                        if !keep_open {
                            self.state_mut(side).close();
                        }
                        MenuCommit::Invoke { handler_type, handler }
                    }
                    MenuEntry::Command(name) => {
                        if !keep_open {
                            self.state_mut(side).close();
                        }
                        MenuCommit::Command(name)
                    }
                    MenuEntry::Tool(tool) => {
                        self.close(side);
                        MenuCommit::SelectTool(tool)
                    }
                    MenuEntry::Placeholder => {
                        if !keep_open {
                            self.state_mut(side).close();
                        }
                        MenuCommit::Empty
                    }
                }
            }
        }
    }

    fn exit_level(&mut self, side: Side, registry: &HandlerRegistry) -> MenuCommit {
        let state = self.state_mut(side);
        match state.parents.pop() {
            Some(parent) => {
                if !self.open(side, parent, registry) {
                    self.close(side);
                    return MenuCommit::Exited { depth: self.state(side).depth(), closed: true };
                }
                MenuCommit::Exited { depth: self.state(side).depth(), closed: false }
            }
            None => {
                self.close(side);
                MenuCommit::Exited { depth: 0, closed: true }
            }
        }
    }

    /// Entry fired by a stick-center press while the menu is open.
    pub fn center_action(&self, side: Side, registry: &HandlerRegistry) -> Option<MenuEntry> {
        let state = self.state(side);
        if !state.is_open {
            return None;
        }
        state.menu_type.spec().center.map(|item| MenuEntry::resolve(item, registry))
    }

    /// Draws the open menu of a hand around its controller. Pure with respect to menu state.
    pub fn render(&self, side: Side, controller: Mat4, renderer: &mut dyn IconRenderer) {
        let state = self.state(side);
        let Some(layout) = state.layout.filter(|_| state.is_open) else {
            return;
        };
        let icon_transform = |slot: usize, highlighted: bool| -> Option<(Mat4, IconStyle)> {
            let dir = layout.slot_direction(slot)?;
            let offset = Vec3::new(dir.x * MENU_RADIUS, MENU_LIFT, -dir.y * MENU_RADIUS);
            let style = if highlighted { IconStyle::highlighted() } else { IconStyle::active() };
            let local = Mat4::from_scale_rotation_translation(Vec3::splat(style.scale), Quat::IDENTITY, offset);
            Some((controller * local, style))
        };
        for (slot, entry) in state.items.iter().enumerate() {
            let Some((transform, style)) = icon_transform(slot, state.highlight_index == slot as i32) else {
                continue;
            };
            match entry {
                MenuEntry::Handler { handler_type, handler } => match handler.try_borrow() {
                    Ok(handler) => handler.render_icon(transform, style, renderer),
                    Err(_) => renderer.draw_icon(
                        IconGlyph::Handler { handler_type: *handler_type, name: handler_type.name() },
                        transform,
                        style,
                    ),
                },
                MenuEntry::Command(name) => renderer.draw_icon(IconGlyph::Command(name), transform, style),
                MenuEntry::Tool(tool) => {
                    renderer.draw_icon(IconGlyph::Handler { handler_type: *tool, name: tool.name() }, transform, style)
                }
                MenuEntry::Submenu(menu) => renderer.draw_icon(IconGlyph::Submenu(*menu), transform, style),
                MenuEntry::Placeholder => renderer.draw_icon(IconGlyph::Placeholder, transform, style),
            }
        }
        if let Some(exit) = layout.exit_slot() {
            if let Some((transform, style)) = icon_transform(exit, state.highlight_index == exit as i32) {
                renderer.draw_icon(IconGlyph::Exit, transform, style);
            }
        }
    }
}

impl Default for RadialMenu {
    fn default() -> Self {
        Self::new(MenuConfig::default())
    }
}
