use crate::cursor::{Cursor, Modifiers};
use crate::events::{CommandPhase, InteractionEvent};
use crate::handler::{FocusPolicy, Handler, HandlerContext, HandlerType, HandlerTypeSet};

/// Capabilities a built-in handler advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandProfile {
    pub click: bool,
    pub drag: bool,
    pub immediate: bool,
    pub focus: FocusPolicy,
}

impl CommandProfile {
    const CLICK: CommandProfile =
        CommandProfile { click: true, drag: false, immediate: false, focus: FocusPolicy::EXCLUSIVE };

    const NAVIGATION: CommandProfile = CommandProfile {
        click: false,
        drag: true,
        immediate: true,
        focus: FocusPolicy { allows_steal_by: HandlerTypeSet::EMPTY, steals_from: HandlerTypeSet::EDITING_TOOLS },
    };

    const fn tool(click: bool, immediate: bool) -> CommandProfile {
        CommandProfile {
            click,
            drag: true,
            immediate,
            focus: FocusPolicy { allows_steal_by: HandlerTypeSet::NAVIGATION, steals_from: HandlerTypeSet::EMPTY },
        }
    }

    pub fn for_type(handler_type: HandlerType) -> CommandProfile {
        match handler_type {
            ty if ty.is_navigation() => Self::NAVIGATION,
            HandlerType::Transform | HandlerType::Annotate => Self::tool(handler_type == HandlerType::Transform, true),
            HandlerType::Measure => Self::tool(false, false),
            ty if ty.is_tool() => Self::tool(true, false),
            HandlerType::Shift => CommandProfile { click: false, drag: true, immediate: true, ..Self::CLICK },
            _ => Self::CLICK,
        }
    }
}

/// Built-in handler whose command body lives in the host. Each lifecycle call is published
/// on the event bus; the second hand of a bimanual drag stays silent.
#[derive(Debug, Clone)]
pub struct BuiltinHandler {
    handler_type: HandlerType,
    profile: CommandProfile,
}

impl BuiltinHandler {
    pub fn new(handler_type: HandlerType) -> Self {
        Self { handler_type, profile: CommandProfile::for_type(handler_type) }
    }

    pub fn profile(&self) -> CommandProfile {
        self.profile
    }

    fn publish(&self, ctx: &mut HandlerContext<'_>, phase: CommandPhase) {
        let side = ctx.side();
        let position = ctx.scene_position();
        ctx.emit(InteractionEvent::Command { side, handler: self.handler_type, phase, position });
    }
}

impl Handler for BuiltinHandler {
    fn handler_type(&self) -> HandlerType {
        self.handler_type
    }

    fn has_click(&self, _cursor: &Cursor) -> bool {
        self.profile.click
    }

    fn click(&mut self, ctx: &mut HandlerContext<'_>) {
        if self.handler_type == HandlerType::Alt {
            ctx.cursor.modifiers.toggle(Modifiers::ALT);
        }
        self.publish(ctx, CommandPhase::Click);
    }

    fn has_drag(&self, _cursor: &Cursor) -> bool {
        self.profile.drag
    }

    fn drag_start(&mut self, ctx: &mut HandlerContext<'_>) {
        if self.handler_type == HandlerType::Shift {
            ctx.cursor.modifiers.insert(Modifiers::SHIFT);
        }
        if ctx.cursor.bimanual.computes_shared() {
            self.publish(ctx, CommandPhase::DragStart);
        }
    }

    fn drag_continue(&mut self, ctx: &mut HandlerContext<'_>) {
        if ctx.cursor.bimanual.computes_shared() {
            self.publish(ctx, CommandPhase::DragContinue);
        }
    }

    fn drag_stop(&mut self, ctx: &mut HandlerContext<'_>) {
        if self.handler_type == HandlerType::Shift {
            ctx.cursor.modifiers.remove(Modifiers::SHIFT);
        }
        if ctx.cursor.bimanual.computes_shared() {
            self.publish(ctx, CommandPhase::DragStop);
        }
    }

    fn drags_immediately(&self) -> bool {
        self.profile.immediate
    }

    fn focus_policy(&self) -> FocusPolicy {
        self.profile.focus
    }
}
