use super::sector::SectorLayout;
use crate::handler::{HandlerRef, HandlerType};
use crate::registry::HandlerRegistry;
use log::warn;
use smallvec::SmallVec;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuType {
    Main8,
    Main12,
    SwitchTool,
    TsSelect,
    TsTransform,
    TsAnnotate,
    TsMeasure,
    TsAddPrimitive,
    TsExtrude,
    TsInsetFaces,
    TsBevel,
    TsLoopCut,
    TsKnife,
    TsCursorOffset,
    AsNavi,
    AsTransform,
    AsExtrude,
}

impl MenuType {
    pub const ALL: [MenuType; 17] = [
        MenuType::Main8,
        MenuType::Main12,
        MenuType::SwitchTool,
        MenuType::TsSelect,
        MenuType::TsTransform,
        MenuType::TsAnnotate,
        MenuType::TsMeasure,
        MenuType::TsAddPrimitive,
        MenuType::TsExtrude,
        MenuType::TsInsetFaces,
        MenuType::TsBevel,
        MenuType::TsLoopCut,
        MenuType::TsKnife,
        MenuType::TsCursorOffset,
        MenuType::AsNavi,
        MenuType::AsTransform,
        MenuType::AsExtrude,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MenuType::Main8 => "MAIN_8",
            MenuType::Main12 => "MAIN_12",
            MenuType::SwitchTool => "SWITCHTOOL",
            MenuType::TsSelect => "TS_SELECT",
            MenuType::TsTransform => "TS_TRANSFORM",
            MenuType::TsAnnotate => "TS_ANNOTATE",
            MenuType::TsMeasure => "TS_MEASURE",
            MenuType::TsAddPrimitive => "TS_ADDPRIMITIVE",
            MenuType::TsExtrude => "TS_EXTRUDE",
            MenuType::TsInsetFaces => "TS_INSETFACES",
            MenuType::TsBevel => "TS_BEVEL",
            MenuType::TsLoopCut => "TS_LOOPCUT",
            MenuType::TsKnife => "TS_KNIFE",
            MenuType::TsCursorOffset => "TS_CURSOROFFSET",
            MenuType::AsNavi => "AS_NAVI",
            MenuType::AsTransform => "AS_TRANSFORM",
            MenuType::AsExtrude => "AS_EXTRUDE",
        }
    }

    pub fn from_name(name: &str) -> Option<MenuType> {
        let upper = name.trim().to_ascii_uppercase();
        Self::ALL.iter().copied().find(|menu| menu.name() == upper)
    }

    pub fn is_action_settings(self) -> bool {
        matches!(self, MenuType::AsNavi | MenuType::AsTransform | MenuType::AsExtrude)
    }

    pub fn spec(self) -> &'static MenuSpec {
        match self {
            MenuType::Main8 => &MAIN_8,
            MenuType::Main12 => &MAIN_12,
            MenuType::SwitchTool => &SWITCH_TOOL,
            MenuType::TsSelect => &TS_SELECT,
            MenuType::TsTransform => &TS_TRANSFORM,
            MenuType::TsAnnotate => &TS_ANNOTATE,
            MenuType::TsMeasure => &TS_MEASURE,
            MenuType::TsAddPrimitive => &TS_ADD_PRIMITIVE,
            MenuType::TsExtrude => &TS_EXTRUDE,
            MenuType::TsInsetFaces => &TS_INSET_FACES,
            MenuType::TsBevel => &TS_BEVEL,
            MenuType::TsLoopCut => &TS_LOOP_CUT,
            MenuType::TsKnife => &TS_KNIFE,
            MenuType::TsCursorOffset => &TS_CURSOR_OFFSET,
            MenuType::AsNavi => &AS_NAVI,
            MenuType::AsTransform => &AS_TRANSFORM,
            MenuType::AsExtrude => &AS_EXTRUDE,
        }
    }

    /// Root menu shown when a hand opens its menu with `tool` selected.
    pub fn root_for(tool: Option<HandlerType>) -> MenuType {
        match tool {
            Some(tool) if tool.is_selection() => MenuType::TsSelect,
            Some(HandlerType::Transform) => MenuType::TsTransform,
            Some(HandlerType::Annotate) => MenuType::TsAnnotate,
            Some(HandlerType::Measure) => MenuType::TsMeasure,
            Some(HandlerType::AddPrimitive) => MenuType::TsAddPrimitive,
            Some(HandlerType::Extrude) => MenuType::TsExtrude,
            Some(HandlerType::InsetFaces) => MenuType::TsInsetFaces,
            Some(HandlerType::Bevel) => MenuType::TsBevel,
            Some(HandlerType::LoopCut) => MenuType::TsLoopCut,
            Some(HandlerType::Knife) => MenuType::TsKnife,
            Some(HandlerType::CursorOffset) => MenuType::TsCursorOffset,
            _ => MenuType::Main12,
        }
    }

    /// Action-settings menu shown while the trigger of a hand holding `tool` is down.
    pub fn action_settings_for(tool: HandlerType) -> Option<MenuType> {
        match tool {
            tool if tool.is_navigation() => Some(MenuType::AsNavi),
            HandlerType::Transform => Some(MenuType::AsTransform),
            HandlerType::Extrude => Some(MenuType::AsExtrude),
            _ => None,
        }
    }
}

impl fmt::Display for MenuType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One slot of a menu table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    /// Built-in handler clicked on commit.
    Handler(HandlerType),
    /// Command routed to the dynamic handler of that name, or published as a command event.
    Named(&'static str),
    /// Makes the handler the hand's current tool.
    Tool(HandlerType),
    Submenu(MenuType),
    Placeholder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Standard,
    Lateral,
}

#[derive(Debug)]
pub struct MenuSpec {
    pub items: &'static [MenuItem],
    pub layout: LayoutKind,
    /// Fired by a stick-center press while the menu is open.
    pub center: Option<MenuItem>,
}

impl MenuSpec {
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn sector_layout(&self) -> Option<SectorLayout> {
        match self.layout {
            LayoutKind::Standard => SectorLayout::for_count(self.count()),
            LayoutKind::Lateral => SectorLayout::lateral(self.count()),
        }
    }
}

use MenuItem::{Handler as H, Named as N, Placeholder as P, Submenu as S, Tool as T};

static MAIN_8: MenuSpec = MenuSpec {
    items: &[
        H(HandlerType::Alt),
        H(HandlerType::Undo),
        H(HandlerType::Redo),
        H(HandlerType::SwitchComponent),
        H(HandlerType::SwitchSpace),
        H(HandlerType::Delete),
        S(MenuType::SwitchTool),
    ],
    layout: LayoutKind::Standard,
    center: None,
};

static MAIN_12: MenuSpec = MenuSpec {
    items: &[
        S(MenuType::Main8),
        H(HandlerType::Undo),
        H(HandlerType::Redo),
        H(HandlerType::SwitchComponent),
        H(HandlerType::SwitchSpace),
        H(HandlerType::Delete),
        H(HandlerType::Duplicate),
        H(HandlerType::Join),
        H(HandlerType::Separate),
        H(HandlerType::SwitchLayout),
        S(MenuType::SwitchTool),
    ],
    layout: LayoutKind::Standard,
    center: None,
};

static SWITCH_TOOL: MenuSpec = MenuSpec {
    items: &[
        T(HandlerType::Transform),
        T(HandlerType::AddPrimitive),
        T(HandlerType::Extrude),
        T(HandlerType::CursorOffset),
        T(HandlerType::Annotate),
        T(HandlerType::SelectRaycast),
        T(HandlerType::Measure),
        T(HandlerType::InsetFaces),
        T(HandlerType::Bevel),
        T(HandlerType::LoopCut),
        T(HandlerType::Knife),
    ],
    layout: LayoutKind::Standard,
    center: None,
};

static TS_SELECT: MenuSpec = MenuSpec {
    items: &[N("select.mode.cursor"), N("select.mode.raycast"), N("select.mode.proximity")],
    layout: LayoutKind::Standard,
    center: None,
};

static TS_TRANSFORM: MenuSpec = MenuSpec {
    items: &[
        N("transform.manipulator"),
        N("transform.mode.move"),
        N("transform.mode.free"),
        N("transform.mode.rotate"),
        N("transform.mode.scale"),
        H(HandlerType::Delete),
        H(HandlerType::Duplicate),
    ],
    layout: LayoutKind::Standard,
    center: None,
};

static TS_ANNOTATE: MenuSpec = MenuSpec {
    items: &[
        N("annotate.color.black"),
        N("annotate.color.white"),
        N("annotate.color.red"),
        N("annotate.color.orange"),
        N("annotate.color.yellow"),
        N("annotate.color.green"),
        N("annotate.color.cyan"),
        N("annotate.color.blue"),
        N("annotate.color.purple"),
        N("annotate.color.pink"),
        N("annotate.eraser"),
    ],
    layout: LayoutKind::Standard,
    center: None,
};

static TS_MEASURE: MenuSpec = MenuSpec {
    items: &[N("measure.clear"), N("measure.snap"), N("measure.units")],
    layout: LayoutKind::Standard,
    center: None,
};

static TS_ADD_PRIMITIVE: MenuSpec = MenuSpec {
    items: &[
        N("primitive.plane"),
        N("primitive.cube"),
        N("primitive.circle"),
        N("primitive.cylinder"),
        N("primitive.cone"),
        N("primitive.grid"),
        N("primitive.monkey"),
        N("primitive.uv_sphere"),
        N("primitive.ico_sphere"),
        H(HandlerType::Separate),
        H(HandlerType::Join),
    ],
    layout: LayoutKind::Standard,
    center: None,
};

static TS_EXTRUDE: MenuSpec = MenuSpec {
    items: &[
        N("extrude.normals"),
        N("extrude.region"),
        N("extrude.individual"),
        N("extrude.flip_normals"),
        N("extrude.transform"),
    ],
    layout: LayoutKind::Standard,
    center: None,
};

static TS_INSET_FACES: MenuSpec = MenuSpec {
    items: &[
        N("inset.individual"),
        N("inset.even_thickness"),
        N("inset.relative"),
        N("inset.edge_rail"),
        N("inset.outset"),
    ],
    layout: LayoutKind::Standard,
    center: None,
};

static TS_BEVEL: MenuSpec = MenuSpec {
    items: &[N("bevel.vertex_only"), N("bevel.segments.add"), N("bevel.segments.remove")],
    layout: LayoutKind::Standard,
    center: None,
};

static TS_LOOP_CUT: MenuSpec = MenuSpec {
    items: &[
        N("loopcut.edge_slide"),
        N("loopcut.flipped"),
        N("loopcut.clamp"),
        N("loopcut.cuts.add"),
        N("loopcut.cuts.remove"),
    ],
    layout: LayoutKind::Standard,
    center: None,
};

static TS_KNIFE: MenuSpec = MenuSpec {
    items: &[N("knife.cut_through"), P, P],
    layout: LayoutKind::Standard,
    center: None,
};

static TS_CURSOR_OFFSET: MenuSpec = MenuSpec {
    items: &[N("cursor.teleport"), N("cursor.reset"), N("cursor.snap_selected")],
    layout: LayoutKind::Standard,
    center: None,
};

static AS_NAVI: MenuSpec = MenuSpec {
    items: &[
        N("navi.lock.rotation"),
        N("navi.lock.translation"),
        N("navi.lock.scale"),
        N("navi.lock.up"),
        N("navi.lock.rotation_z"),
        N("navi.lock.translation_z"),
        N("navi.lock.scale_ground"),
    ],
    layout: LayoutKind::Standard,
    center: None,
};

static AS_TRANSFORM: MenuSpec = MenuSpec {
    items: &[
        N("transform.constraint.x"),
        N("transform.constraint.y"),
        N("transform.constraint.z"),
        N("transform.snap.translation"),
        N("transform.snap.rotation"),
        N("transform.snap.scale"),
        N("transform.pivot.cycle"),
    ],
    layout: LayoutKind::Standard,
    center: Some(N("transform.space.cycle")),
};

static AS_EXTRUDE: MenuSpec = MenuSpec {
    items: &[N("extrude.amount.decrease"), N("extrude.amount.increase")],
    layout: LayoutKind::Lateral,
    center: Some(N("transform.space.cycle")),
};

/// A menu slot after registry resolution.
#[derive(Clone)]
pub enum MenuEntry {
    Handler { handler_type: HandlerType, handler: HandlerRef },
    Command(&'static str),
    Tool(HandlerType),
    Submenu(MenuType),
    Placeholder,
}

impl MenuEntry {
    pub fn resolve(item: MenuItem, registry: &HandlerRegistry) -> MenuEntry {
        match item {
            MenuItem::Handler(handler_type) => match registry.get_handler(handler_type, None) {
                Ok(handler) => MenuEntry::Handler { handler_type, handler },
                Err(err) => {
                    warn!("[menu] {err}; slot left empty");
                    MenuEntry::Placeholder
                }
            },
            MenuItem::Named(name) => match registry.get_handler_by_name(name) {
                Ok(handler) => MenuEntry::Handler { handler_type: registry.type_for_name(name), handler },
                Err(_) => MenuEntry::Command(name),
            },
            MenuItem::Tool(tool) => MenuEntry::Tool(tool),
            MenuItem::Submenu(menu) => MenuEntry::Submenu(menu),
            MenuItem::Placeholder => MenuEntry::Placeholder,
        }
    }
}

impl fmt::Debug for MenuEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuEntry::Handler { handler_type, .. } => write!(f, "Handler({handler_type})"),
            MenuEntry::Command(name) => write!(f, "Command({name})"),
            MenuEntry::Tool(tool) => write!(f, "Tool({tool})"),
            MenuEntry::Submenu(menu) => write!(f, "Submenu({menu})"),
            MenuEntry::Placeholder => f.write_str("Placeholder"),
        }
    }
}

impl PartialEq for MenuEntry {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                MenuEntry::Handler { handler_type: a, handler: ha },
                MenuEntry::Handler { handler_type: b, handler: hb },
            ) => a == b && Rc::ptr_eq(ha, hb),
            (MenuEntry::Command(a), MenuEntry::Command(b)) => a == b,
            (MenuEntry::Tool(a), MenuEntry::Tool(b)) => a == b,
            (MenuEntry::Submenu(a), MenuEntry::Submenu(b)) => a == b,
            (MenuEntry::Placeholder, MenuEntry::Placeholder) => true,
            _ => false,
        }
    }
}

pub type MenuEntries = SmallVec<[MenuEntry; 12]>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuError {
    #[error("menu {menu} has {count} items but its layout holds {capacity}")]
    LayoutMismatch { menu: MenuType, count: usize, capacity: usize },
    #[error("menu {menu} has no sector layout for {count} items")]
    NoLayout { menu: MenuType, count: usize },
}

/// Ordered entries of one menu level together with the layout they resolve against.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    pub menu: MenuType,
    pub entries: MenuEntries,
    pub layout: SectorLayout,
}

impl Population {
    pub fn count(&self) -> usize {
        self.entries.len()
    }
}

/// Checks that a menu table fits the sector layout it will be resolved against.
pub fn validate(menu: MenuType) -> Result<SectorLayout, MenuError> {
    let spec = menu.spec();
    let count = spec.count();
    let layout = spec.sector_layout().ok_or(MenuError::NoLayout { menu, count })?;
    let capacity = layout.capacity();
    if count != layout.count() || count > capacity {
        return Err(MenuError::LayoutMismatch { menu, count, capacity });
    }
    Ok(layout)
}

pub fn populate(menu: MenuType, registry: &HandlerRegistry) -> Result<Population, MenuError> {
    let layout = validate(menu)?;
    let entries = menu.spec().items.iter().map(|item| MenuEntry::resolve(*item, registry)).collect();
    Ok(Population { menu, entries, layout })
}
