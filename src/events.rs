use crate::cursor::{Bimanual, Side};
use crate::handler::HandlerType;
use crate::menu::{MenuType, Sector};
use glam::Vec3;
use std::fmt;

/// Lifecycle phase reported by built-in command handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandPhase {
    Click,
    DragStart,
    DragContinue,
    DragStop,
}

impl CommandPhase {
    pub fn label(self) -> &'static str {
        match self {
            CommandPhase::Click => "click",
            CommandPhase::DragStart => "drag_start",
            CommandPhase::DragContinue => "drag_continue",
            CommandPhase::DragStop => "drag_stop",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    Clicked { side: Side, handler: HandlerType },
    DragStarted { side: Side, handler: HandlerType, bimanual: Bimanual },
    DragStopped { side: Side, handler: HandlerType },
    FocusStolen { side: Side, from: HandlerType, to: HandlerType },
    StealRejected { side: Side, owner: HandlerType, challenger: HandlerType },
    MenuOpened { side: Side, menu: MenuType, depth: usize },
    MenuClosed { side: Side, menu: MenuType },
    MenuCommitted { side: Side, menu: MenuType, sector: Sector },
    MenuCommand { side: Side, menu: MenuType, command: &'static str },
    ToolSwitched { side: Side, tool: HandlerType },
    /// `position` is the acting cursor's translation in scene space.
    Command { side: Side, handler: HandlerType, phase: CommandPhase, position: Vec3 },
}

impl InteractionEvent {
    pub fn side(&self) -> Side {
        match self {
            InteractionEvent::Clicked { side, .. }
            | InteractionEvent::DragStarted { side, .. }
            | InteractionEvent::DragStopped { side, .. }
            | InteractionEvent::FocusStolen { side, .. }
            | InteractionEvent::StealRejected { side, .. }
            | InteractionEvent::MenuOpened { side, .. }
            | InteractionEvent::MenuClosed { side, .. }
            | InteractionEvent::MenuCommitted { side, .. }
            | InteractionEvent::MenuCommand { side, .. }
            | InteractionEvent::ToolSwitched { side, .. }
            | InteractionEvent::Command { side, .. } => *side,
        }
    }
}

impl fmt::Display for InteractionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionEvent::Clicked { side, handler } => write!(f, "Clicked side={side} handler={handler}"),
            InteractionEvent::DragStarted { side, handler, bimanual } => {
                write!(f, "DragStarted side={side} handler={handler} bimanual={bimanual:?}")
            }
            InteractionEvent::DragStopped { side, handler } => {
                write!(f, "DragStopped side={side} handler={handler}")
            }
            InteractionEvent::FocusStolen { side, from, to } => {
                write!(f, "FocusStolen side={side} from={from} to={to}")
            }
            InteractionEvent::StealRejected { side, owner, challenger } => {
                write!(f, "StealRejected side={side} owner={owner} challenger={challenger}")
            }
            InteractionEvent::MenuOpened { side, menu, depth } => {
                write!(f, "MenuOpened side={side} menu={menu} depth={depth}")
            }
            InteractionEvent::MenuClosed { side, menu } => write!(f, "MenuClosed side={side} menu={menu}"),
            InteractionEvent::MenuCommitted { side, menu, sector } => {
                write!(f, "MenuCommitted side={side} menu={menu} sector={sector:?}")
            }
            InteractionEvent::MenuCommand { side, menu, command } => {
                write!(f, "MenuCommand side={side} menu={menu} command={command}")
            }
            InteractionEvent::ToolSwitched { side, tool } => write!(f, "ToolSwitched side={side} tool={tool}"),
            InteractionEvent::Command { side, handler, phase, position } => {
                write!(f, "Command side={side} handler={handler} phase={} at={position}", phase.label())
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<InteractionEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: InteractionEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<InteractionEvent> {
        self.events.drain(..).collect()
    }

    pub fn events(&self) -> &[InteractionEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}
