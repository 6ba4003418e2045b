use crate::cursor::{Cursor, Side, Space, SpaceConverter};
use crate::events::{EventBus, InteractionEvent};
use crate::registry::HandlerRegistry;
use crate::render::{IconGlyph, IconRenderer, IconStyle};
use glam::{Mat4, Vec3};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a registered handler. Menus and the dispatcher hold clones of the
/// registry's entry rather than owning handlers themselves.
pub type HandlerRef = Rc<RefCell<dyn Handler>>;

pub fn handler_ref<H: Handler + 'static>(handler: H) -> HandlerRef {
    Rc::new(RefCell::new(handler))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HandlerType {
    Invalid,
    Trigger,
    Shift,
    Alt,
    Navi,
    NaviGrabAir,
    NaviJoystick,
    NaviTeleport,
    Select,
    SelectRaycast,
    SelectProximity,
    Transform,
    Annotate,
    Measure,
    AddPrimitive,
    Extrude,
    InsetFaces,
    Bevel,
    LoopCut,
    Knife,
    CursorOffset,
    Delete,
    Duplicate,
    Join,
    Separate,
    SwitchLayout,
    SwitchComponent,
    SwitchSpace,
    SwitchTool,
    Undo,
    Redo,
    Menu,
    MenuLeft,
    MenuRight,
}

impl HandlerType {
    /// Every valid type, in declaration order. `Invalid` is excluded.
    pub const ALL: [HandlerType; 33] = [
        HandlerType::Trigger,
        HandlerType::Shift,
        HandlerType::Alt,
        HandlerType::Navi,
        HandlerType::NaviGrabAir,
        HandlerType::NaviJoystick,
        HandlerType::NaviTeleport,
        HandlerType::Select,
        HandlerType::SelectRaycast,
        HandlerType::SelectProximity,
        HandlerType::Transform,
        HandlerType::Annotate,
        HandlerType::Measure,
        HandlerType::AddPrimitive,
        HandlerType::Extrude,
        HandlerType::InsetFaces,
        HandlerType::Bevel,
        HandlerType::LoopCut,
        HandlerType::Knife,
        HandlerType::CursorOffset,
        HandlerType::Delete,
        HandlerType::Duplicate,
        HandlerType::Join,
        HandlerType::Separate,
        HandlerType::SwitchLayout,
        HandlerType::SwitchComponent,
        HandlerType::SwitchSpace,
        HandlerType::SwitchTool,
        HandlerType::Undo,
        HandlerType::Redo,
        HandlerType::Menu,
        HandlerType::MenuLeft,
        HandlerType::MenuRight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HandlerType::Invalid => "INVALID",
            HandlerType::Trigger => "TRIGGER",
            HandlerType::Shift => "SHIFT",
            HandlerType::Alt => "ALT",
            HandlerType::Navi => "NAVI",
            HandlerType::NaviGrabAir => "NAVI_GRABAIR",
            HandlerType::NaviJoystick => "NAVI_JOYSTICK",
            HandlerType::NaviTeleport => "NAVI_TELEPORT",
            HandlerType::Select => "SELECT",
            HandlerType::SelectRaycast => "SELECT_RAYCAST",
            HandlerType::SelectProximity => "SELECT_PROXIMITY",
            HandlerType::Transform => "TRANSFORM",
            HandlerType::Annotate => "ANNOTATE",
            HandlerType::Measure => "MEASURE",
            HandlerType::AddPrimitive => "ADDPRIMITIVE",
            HandlerType::Extrude => "EXTRUDE",
            HandlerType::InsetFaces => "INSETFACES",
            HandlerType::Bevel => "BEVEL",
            HandlerType::LoopCut => "LOOPCUT",
            HandlerType::Knife => "KNIFE",
            HandlerType::CursorOffset => "CURSOROFFSET",
            HandlerType::Delete => "DELETE",
            HandlerType::Duplicate => "DUPLICATE",
            HandlerType::Join => "JOIN",
            HandlerType::Separate => "SEPARATE",
            HandlerType::SwitchLayout => "SWITCHLAYOUT",
            HandlerType::SwitchComponent => "SWITCHCOMPONENT",
            HandlerType::SwitchSpace => "SWITCHSPACE",
            HandlerType::SwitchTool => "SWITCHTOOL",
            HandlerType::Undo => "UNDO",
            HandlerType::Redo => "REDO",
            HandlerType::Menu => "MENU",
            HandlerType::MenuLeft => "MENU_LEFT",
            HandlerType::MenuRight => "MENU_RIGHT",
        }
    }

    /// Exact-match lookup of a canonical name. Unknown names map to `Invalid`.
    pub fn from_name(name: &str) -> HandlerType {
        Self::ALL.iter().copied().find(|ty| ty.name() == name).unwrap_or(HandlerType::Invalid)
    }

    pub fn is_valid(self) -> bool {
        self != HandlerType::Invalid
    }

    pub fn is_navigation(self) -> bool {
        matches!(
            self,
            HandlerType::Navi | HandlerType::NaviGrabAir | HandlerType::NaviJoystick | HandlerType::NaviTeleport
        )
    }

    pub fn is_selection(self) -> bool {
        matches!(self, HandlerType::Select | HandlerType::SelectRaycast | HandlerType::SelectProximity)
    }

    /// Types that can be bound as a hand's current tool.
    pub fn is_tool(self) -> bool {
        self.is_navigation()
            || self.is_selection()
            || matches!(
                self,
                HandlerType::Transform
                    | HandlerType::Annotate
                    | HandlerType::Measure
                    | HandlerType::AddPrimitive
                    | HandlerType::Extrude
                    | HandlerType::InsetFaces
                    | HandlerType::Bevel
                    | HandlerType::LoopCut
                    | HandlerType::Knife
                    | HandlerType::CursorOffset
            )
    }

    pub fn is_menu(self) -> bool {
        matches!(self, HandlerType::Menu | HandlerType::MenuLeft | HandlerType::MenuRight)
    }

    /// The side-specific menu variant for a hand.
    pub fn menu_for(side: Side) -> HandlerType {
        match side {
            Side::Left => HandlerType::MenuLeft,
            Side::Right => HandlerType::MenuRight,
        }
    }

    /// The hand a side-specific type is pinned to, if any.
    pub fn pinned_side(self) -> Option<Side> {
        match self {
            HandlerType::MenuLeft => Some(Side::Left),
            HandlerType::MenuRight => Some(Side::Right),
            _ => None,
        }
    }

    const fn bit(self) -> u64 {
        1u64 << (self as u64)
    }
}

impl fmt::Display for HandlerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compact set of handler types used by focus policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandlerTypeSet(u64);

impl HandlerTypeSet {
    pub const EMPTY: HandlerTypeSet = HandlerTypeSet(0);

    pub const NAVIGATION: HandlerTypeSet = HandlerTypeSet::EMPTY
        .with(HandlerType::Navi)
        .with(HandlerType::NaviGrabAir)
        .with(HandlerType::NaviJoystick)
        .with(HandlerType::NaviTeleport);

    pub const EDITING_TOOLS: HandlerTypeSet = HandlerTypeSet::EMPTY
        .with(HandlerType::Select)
        .with(HandlerType::SelectRaycast)
        .with(HandlerType::SelectProximity)
        .with(HandlerType::Transform)
        .with(HandlerType::Annotate)
        .with(HandlerType::Measure)
        .with(HandlerType::AddPrimitive)
        .with(HandlerType::Extrude)
        .with(HandlerType::InsetFaces)
        .with(HandlerType::Bevel)
        .with(HandlerType::LoopCut)
        .with(HandlerType::Knife)
        .with(HandlerType::CursorOffset);

    pub const fn with(self, ty: HandlerType) -> Self {
        HandlerTypeSet(self.0 | ty.bit())
    }

    pub const fn union(self, other: HandlerTypeSet) -> Self {
        HandlerTypeSet(self.0 | other.0)
    }

    pub const fn contains(self, ty: HandlerType) -> bool {
        self.0 & ty.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<HandlerType> for HandlerTypeSet {
    fn from_iter<I: IntoIterator<Item = HandlerType>>(iter: I) -> Self {
        iter.into_iter().fold(HandlerTypeSet::EMPTY, HandlerTypeSet::with)
    }
}

/// Declared focus-steal behaviour of a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusPolicy {
    /// Types allowed to take a hand away from this handler mid-drag.
    pub allows_steal_by: HandlerTypeSet,
    /// Types this handler takes hands away from.
    pub steals_from: HandlerTypeSet,
}

impl FocusPolicy {
    pub const EXCLUSIVE: FocusPolicy =
        FocusPolicy { allows_steal_by: HandlerTypeSet::EMPTY, steals_from: HandlerTypeSet::EMPTY };
}

/// Capability snapshot of one handler, taken right before a dispatch decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub handler_type: HandlerType,
    pub click: bool,
    pub drag: bool,
    pub immediate_drag: bool,
}

impl Capabilities {
    pub fn of(handler: &dyn Handler, cursor: &Cursor) -> Self {
        Self {
            handler_type: handler.handler_type(),
            click: handler.has_click(cursor),
            drag: handler.has_drag(cursor),
            immediate_drag: handler.drags_immediately(),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.click || self.drag
    }
}

/// A challenger may take the hand only when the owner allows it and the challenger wants it.
pub fn arbitrate_focus(owner: &dyn Handler, challenger: &dyn Handler) -> bool {
    let (owner_type, challenger_type) = (owner.handler_type(), challenger.handler_type());
    owner_type != challenger_type && owner.allows_focus_steal(challenger_type) && challenger.steals_focus(owner_type)
}

/// Follow-up work a handler asks the session to perform once its callback returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerRequest {
    SelectTool { side: Side, tool: HandlerType },
}

/// Everything a handler callback may touch while it runs.
pub struct HandlerContext<'a> {
    pub cursor: &'a mut Cursor,
    pub other: &'a Cursor,
    pub registry: &'a HandlerRegistry,
    pub spaces: &'a dyn SpaceConverter,
    pub events: &'a mut EventBus,
    pub requests: &'a mut Vec<HandlerRequest>,
    /// The hand's current tool, if its layout binds one.
    pub tool: Option<HandlerType>,
}

impl<'a> HandlerContext<'a> {
    pub fn side(&self) -> Side {
        self.cursor.side
    }

    /// Translation of the acting cursor in scene space.
    pub fn scene_position(&self) -> Vec3 {
        self.cursor.pose_in(Space::Scene, self.spaces).w_axis.truncate()
    }

    pub fn emit(&mut self, event: InteractionEvent) {
        self.events.push(event);
    }

    pub fn request(&mut self, request: HandlerRequest) {
        self.requests.push(request);
    }
}

/// One interaction type. Every capability is opt-in; the dispatcher queries `has_click` and
/// `has_drag` before it calls the matching lifecycle method.
pub trait Handler {
    fn handler_type(&self) -> HandlerType;

    fn name(&self) -> &str {
        self.handler_type().name()
    }

    fn has_click(&self, _cursor: &Cursor) -> bool {
        false
    }

    fn click(&mut self, _ctx: &mut HandlerContext<'_>) {}

    fn has_drag(&self, _cursor: &Cursor) -> bool {
        false
    }

    fn drag_start(&mut self, _ctx: &mut HandlerContext<'_>) {}

    fn drag_continue(&mut self, _ctx: &mut HandlerContext<'_>) {}

    fn drag_stop(&mut self, _ctx: &mut HandlerContext<'_>) {}

    /// Skip click/drag disambiguation and start dragging on the press edge.
    fn drags_immediately(&self) -> bool {
        false
    }

    fn focus_policy(&self) -> FocusPolicy {
        FocusPolicy::EXCLUSIVE
    }

    fn allows_focus_steal(&self, by: HandlerType) -> bool {
        self.focus_policy().allows_steal_by.contains(by)
    }

    fn steals_focus(&self, from: HandlerType) -> bool {
        self.focus_policy().steals_from.contains(from)
    }

    fn render_icon(&self, transform: Mat4, style: IconStyle, renderer: &mut dyn IconRenderer) {
        renderer.draw_icon(IconGlyph::Handler { handler_type: self.handler_type(), name: self.name() }, transform, style);
    }

    /// In-scene feedback for a hand this handler currently serves.
    fn render_scene(&self, _cursor: &Cursor, _renderer: &mut dyn IconRenderer) {}
}
