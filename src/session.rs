use crate::config::InteractionConfig;
use crate::cursor::{Cursor, CursorPair, Side, SpaceConverter};
use crate::dispatch::{DispatchFrame, Dispatcher, FocusState};
use crate::events::{EventBus, InteractionEvent};
use crate::handler::{HandlerRequest, HandlerType};
use crate::handlers::builtin_registry;
use crate::input::{ButtonLayout, ControllerSample};
use crate::menu::{MenuHandle, MenuState, RadialMenu};
use crate::registry::HandlerRegistry;
use crate::render::{IconRenderer, IconStyle};
use log::{debug, info};

/// Controller samples for one frame. A missing sample leaves that hand untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub time_ms: u64,
    pub left: Option<ControllerSample>,
    pub right: Option<ControllerSample>,
}

impl FrameInput {
    pub fn new(time_ms: u64) -> Self {
        Self { time_ms, left: None, right: None }
    }

    pub fn with(mut self, side: Side, sample: ControllerSample) -> Self {
        match side {
            Side::Left => self.left = Some(sample),
            Side::Right => self.right = Some(sample),
        }
        self
    }

    pub fn sample(&self, side: Side) -> Option<&ControllerSample> {
        match side {
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
        }
    }
}

/// Owns the whole interaction core: registry, shared menu state, cursors, focus and the
/// event queue. Hosts feed it one [`FrameInput`] per frame and drain events afterwards.
pub struct InteractionSession {
    config: InteractionConfig,
    registry: HandlerRegistry,
    menu: MenuHandle,
    layout: ButtonLayout,
    cursors: CursorPair,
    dispatcher: Dispatcher,
    events: EventBus,
    requests: Vec<HandlerRequest>,
}

impl InteractionSession {
    pub fn new(config: InteractionConfig, layout: ButtonLayout) -> Self {
        let menu = RadialMenu::new(config.menu.clone()).into_handle();
        let registry = builtin_registry(&menu);
        info!("[session] {} built-in handlers, dominant hand {}", registry.len(), config.hands.dominant);
        let dispatcher = Dispatcher::new(config.drag.clone());
        Self {
            config,
            registry,
            menu,
            layout,
            cursors: CursorPair::new(),
            dispatcher,
            events: EventBus::default(),
            requests: Vec::new(),
        }
    }

    /// Runs one frame: left hand first, then right. Requests raised by a hand's handlers are
    /// applied before the other hand is processed.
    pub fn frame(&mut self, input: &FrameInput, spaces: &dyn SpaceConverter) {
        for side in Side::BOTH {
            let Some(sample) = input.sample(side) else {
                continue;
            };
            self.cursors.get_mut(side).apply_sample(sample, input.time_ms);
            let mut frame = DispatchFrame {
                cursors: &mut self.cursors,
                registry: &self.registry,
                layout: &self.layout,
                menu: &self.menu,
                spaces,
                events: &mut self.events,
                requests: &mut self.requests,
            };
            self.dispatcher.process_hand(side, &mut frame);
            self.apply_requests();
        }
    }

    fn apply_requests(&mut self) {
        for request in self.requests.drain(..) {
            match request {
                HandlerRequest::SelectTool { side, tool } => {
                    debug!("[session] {side} tool -> {tool}");
                    self.layout.set_tool(side, tool);
                    self.events.push(InteractionEvent::ToolSwitched { side, tool });
                }
            }
        }
    }

    /// Draws each hand's tool icon, the active drag owner's scene and any open menu.
    pub fn render(&self, renderer: &mut dyn IconRenderer) {
        for side in Side::BOTH {
            let cursor = self.cursors.get(side);
            if let Some(tool) = self.layout.tool_name(side).and_then(|name| self.registry.get_handler_by_name(name).ok()) {
                if let Ok(tool) = tool.try_borrow() {
                    let style = if self.dispatcher.focus(side) == FocusState::Owned(tool.handler_type()) {
                        IconStyle::active()
                    } else {
                        IconStyle::IDLE
                    };
                    tool.render_icon(cursor.position, style, renderer);
                };
            }
            if let Some(owner) = self.dispatcher.owner(side) {
                if let Ok(owner) = owner.try_borrow() {
                    if !owner.handler_type().is_menu() {
                        owner.render_scene(cursor, renderer);
                    }
                };
            }
            if let Ok(menu) = self.registry.get_handler(HandlerType::menu_for(side), None) {
                if let Ok(menu) = menu.try_borrow() {
                    menu.render_scene(cursor, renderer);
                };
            }
        }
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Mutable registry access for dynamic handler registration.
    pub fn registry_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.registry
    }

    pub fn menu(&self) -> &MenuHandle {
        &self.menu
    }

    /// Snapshot of a hand's menu state.
    pub fn menu_state(&self, side: Side) -> Option<MenuState> {
        self.menu.try_borrow().ok().map(|menu| menu.state(side).clone())
    }

    pub fn layout(&self) -> &ButtonLayout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut ButtonLayout {
        &mut self.layout
    }

    pub fn cursor(&self, side: Side) -> &Cursor {
        self.cursors.get(side)
    }

    pub fn focus(&self, side: Side) -> FocusState {
        self.dispatcher.focus(side)
    }

    pub fn stick_focus(&self, side: Side) -> FocusState {
        self.dispatcher.stick_focus(side)
    }

    pub fn current_tool(&self, side: Side) -> Option<HandlerType> {
        let name = self.layout.tool_name(side)?;
        Some(self.registry.type_for_name(name)).filter(|ty| ty.is_valid())
    }

    pub fn events(&self) -> &[InteractionEvent] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<InteractionEvent> {
        self.events.drain()
    }
}

impl Default for InteractionSession {
    fn default() -> Self {
        Self::new(InteractionConfig::default(), ButtonLayout::default())
    }
}
