//! Per-hand focus tracking and click/drag lifecycle delivery.
//!
//! Each hand has two channels. The button channel follows the hand's layout bindings; the
//! stick channel drives the radial menu while a menu is open on that hand. Both use the same
//! [`Focus`] slot: a drag lifecycle started on a channel is always finished on the handler
//! that received its `drag_start`, unless a focus steal hands the channel over.

use crate::config::DragConfig;
use crate::cursor::{Bimanual, CursorPair, Side, SpaceConverter};
use crate::events::{EventBus, InteractionEvent};
use crate::handler::{arbitrate_focus, Capabilities, HandlerContext, HandlerRef, HandlerRequest, HandlerType};
use crate::handlers::invoke_entry;
use crate::input::{ButtonEdges, ButtonLayout, Buttons};
use crate::menu::{MenuHandle, MenuType};
use crate::registry::HandlerRegistry;
use glam::Mat4;
use log::{debug, error};
use smallvec::SmallVec;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Default)]
pub enum Focus {
    #[default]
    Idle,
    /// Pressed on a handler that takes both clicks and drags; undecided until release or the
    /// drag threshold.
    Pending { handler: HandlerRef, handler_type: HandlerType, button: Buttons, pressed_at: Mat4, since_ms: u64 },
    Owned { handler: HandlerRef, handler_type: HandlerType, button: Buttons },
}

impl Focus {
    pub fn state(&self) -> FocusState {
        match self {
            Focus::Idle => FocusState::Idle,
            Focus::Pending { handler_type, .. } => FocusState::Pending(*handler_type),
            Focus::Owned { handler_type, .. } => FocusState::Owned(*handler_type),
        }
    }

    pub fn handler(&self) -> Option<&HandlerRef> {
        match self {
            Focus::Idle => None,
            Focus::Pending { handler, .. } | Focus::Owned { handler, .. } => Some(handler),
        }
    }

    /// Whether this slot is mid-drag on `handler`.
    pub fn drags(&self, handler: &HandlerRef) -> bool {
        matches!(self, Focus::Owned { handler: owner, .. } if Rc::ptr_eq(owner, handler))
    }

    /// Whether this slot is pending or dragging on `handler`.
    pub fn holds(&self, handler: &HandlerRef) -> bool {
        self.handler().is_some_and(|held| Rc::ptr_eq(held, handler))
    }
}

impl fmt::Debug for Focus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.state())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusState {
    Idle,
    Pending(HandlerType),
    Owned(HandlerType),
}

/// Result of offering a hand's new presses to challengers while it is pending or dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Steal {
    Uncontested,
    /// Every challenger was refused; the hand's input is dropped for the frame.
    Refused,
    /// A challenger took the hand. Carries its button when the press was accepted.
    Taken(Buttons),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Click,
    DragStart,
    DragContinue,
    DragStop,
}

/// Borrowed view of everything one hand's pass needs.
pub struct DispatchFrame<'a> {
    pub cursors: &'a mut CursorPair,
    pub registry: &'a HandlerRegistry,
    pub layout: &'a ButtonLayout,
    pub menu: &'a MenuHandle,
    pub spaces: &'a dyn SpaceConverter,
    pub events: &'a mut EventBus,
    pub requests: &'a mut Vec<HandlerRequest>,
}

impl DispatchFrame<'_> {
    /// The hand's current tool; lookup failures mean no tool.
    pub fn tool(&self, side: Side) -> Option<HandlerType> {
        let name = self.layout.tool_name(side)?;
        Some(self.registry.type_for_name(name)).filter(|ty| ty.is_valid())
    }

    fn with_context<R>(&mut self, side: Side, f: impl FnOnce(&mut HandlerContext<'_>) -> R) -> R {
        let tool = self.tool(side);
        let (cursor, other) = self.cursors.split_mut(side);
        let mut ctx = HandlerContext {
            cursor,
            other,
            registry: self.registry,
            spaces: self.spaces,
            events: &mut *self.events,
            requests: &mut *self.requests,
            tool,
        };
        f(&mut ctx)
    }

    fn emit(&mut self, event: InteractionEvent) {
        self.events.push(event);
    }

    /// Delivers one lifecycle call, gated on the matching capability. `drag_stop` is always
    /// delivered to a handler that accepted `drag_start`.
    fn deliver(&mut self, side: Side, handler: &HandlerRef, call: Lifecycle) -> bool {
        let Ok(mut handler) = handler.try_borrow_mut() else {
            error!("[dispatch] {side} handler re-entered during {call:?}, dropping call");
            return false;
        };
        self.with_context(side, |ctx| match call {
            Lifecycle::Click if handler.has_click(ctx.cursor) => {
                handler.click(ctx);
                true
            }
            Lifecycle::DragStart if handler.has_drag(ctx.cursor) => {
                handler.drag_start(ctx);
                true
            }
            Lifecycle::DragContinue if handler.has_drag(ctx.cursor) => {
                handler.drag_continue(ctx);
                true
            }
            Lifecycle::DragStop => {
                handler.drag_stop(ctx);
                true
            }
            _ => false,
        })
    }

    fn capabilities(&self, side: Side, handler: &HandlerRef) -> Option<Capabilities> {
        let handler = handler.try_borrow().ok()?;
        Some(Capabilities::of(&*handler, self.cursors.get(side)))
    }

    /// Newly pressed buttons in `pressed` that resolve to a registered handler, in bit order.
    fn bound_presses(&self, side: Side, pressed: Buttons) -> SmallVec<[(Buttons, HandlerRef); 2]> {
        self.layout
            .bound_in(side, pressed)
            .filter_map(|(button, name)| match self.registry.get_handler_by_name(name) {
                Ok(handler) => Some((button, handler)),
                Err(err) => {
                    debug!("[dispatch] {side} {button:?}: {err}");
                    None
                }
            })
            .collect()
    }
}

#[derive(Debug, Default)]
struct HandFocus {
    button: Focus,
    stick: Focus,
    previous: Buttons,
}

pub struct Dispatcher {
    hands: [HandFocus; 2],
    drag: DragConfig,
}

impl Dispatcher {
    pub fn new(drag: DragConfig) -> Self {
        Self { hands: [HandFocus::default(), HandFocus::default()], drag }
    }

    pub fn focus(&self, side: Side) -> FocusState {
        self.hands[side.index()].button.state()
    }

    pub fn stick_focus(&self, side: Side) -> FocusState {
        self.hands[side.index()].stick.state()
    }

    /// Handler currently dragging on the hand's button channel.
    pub fn owner(&self, side: Side) -> Option<HandlerRef> {
        match &self.hands[side.index()].button {
            Focus::Owned { handler, .. } => Some(Rc::clone(handler)),
            _ => None,
        }
    }

    /// One hand's pass for the current frame. The cursor must already hold this frame's sample.
    pub fn process_hand(&mut self, side: Side, frame: &mut DispatchFrame<'_>) {
        let current = frame.cursors.get(side).buttons;
        let hand = &mut self.hands[side.index()];
        let edges = ButtonEdges::between(hand.previous, current);
        hand.previous = current;

        let menu_open = frame.menu.try_borrow().map(|menu| menu.is_open(side)).unwrap_or(false);
        let stick_active = menu_open || !matches!(self.hands[side.index()].stick, Focus::Idle);
        if stick_active {
            self.process_stick(side, edges, frame);
        }
        let mask = if stick_active { !Buttons::STICK } else { Buttons::all() };
        let edges = edges.masked(mask);
        let accepted = self.process_buttons(side, edges, frame);
        self.process_action_settings(side, edges, accepted, frame);
    }

    fn process_stick(&mut self, side: Side, edges: ButtonEdges, frame: &mut DispatchFrame<'_>) {
        let Ok(menu_handler) = frame.registry.get_handler(HandlerType::menu_for(side), None) else {
            return;
        };
        if self.hands[side.index()].button.holds(&menu_handler) {
            return;
        }
        if edges.pressed.contains(Buttons::STICK_PRESS) {
            Self::stick_center(side, frame);
        }
        let touching = edges.held.contains(Buttons::STICK_TOUCH);
        match self.hands[side.index()].stick.clone() {
            Focus::Idle => {
                if touching && frame.deliver(side, &menu_handler, Lifecycle::DragStart) {
                    let handler_type = HandlerType::menu_for(side);
                    self.hands[side.index()].stick =
                        Focus::Owned { handler: menu_handler, handler_type, button: Buttons::STICK_TOUCH };
                    frame.emit(InteractionEvent::DragStarted { side, handler: handler_type, bimanual: Bimanual::Off });
                }
            }
            Focus::Owned { handler, handler_type, .. } => {
                if touching {
                    frame.deliver(side, &handler, Lifecycle::DragContinue);
                } else {
                    self.hands[side.index()].stick = Focus::Idle;
                    frame.deliver(side, &handler, Lifecycle::DragStop);
                    frame.emit(InteractionEvent::DragStopped { side, handler: handler_type });
                }
            }
            Focus::Pending { .. } => self.hands[side.index()].stick = Focus::Idle,
        }
    }

    fn stick_center(side: Side, frame: &mut DispatchFrame<'_>) {
        let action = match frame.menu.try_borrow() {
            Ok(menu) => {
                let menu_type = menu.state(side).menu_type();
                menu.center_action(side, frame.registry).map(|entry| (entry, menu_type))
            }
            Err(_) => None,
        };
        if let Some((entry, menu_type)) = action {
            frame.with_context(side, |ctx| invoke_entry(entry, menu_type, ctx));
        }
    }

    /// Opens the tool's action settings once the trigger press was taken by the button channel;
    /// the trigger release closes them.
    fn process_action_settings(
        &mut self,
        side: Side,
        edges: ButtonEdges,
        accepted: Buttons,
        frame: &mut DispatchFrame<'_>,
    ) {
        if accepted.contains(Buttons::TRIGGER) {
            if let Some((tool, menu_type)) =
                frame.tool(side).and_then(|tool| MenuType::action_settings_for(tool).map(|menu| (tool, menu)))
            {
                let opened = frame
                    .menu
                    .try_borrow_mut()
                    .map(|mut menu| menu.open_action_settings(side, tool, frame.registry))
                    .unwrap_or(false);
                if opened {
                    frame.emit(InteractionEvent::MenuOpened { side, menu: menu_type, depth: 0 });
                }
            }
        }
        if edges.released.contains(Buttons::TRIGGER) {
            let closed = frame.menu.try_borrow_mut().ok().and_then(|mut menu| {
                let menu_type = menu.state(side).menu_type();
                menu.close_action_settings(side).then_some(menu_type)
            });
            if let Some(menu_type) = closed {
                frame.emit(InteractionEvent::MenuClosed { side, menu: menu_type });
            }
        }
    }

    /// Runs the button channel and returns the button whose press a handler accepted this frame,
    /// if any. From Idle the first bound press in bit order is dispatched.
    fn process_buttons(&mut self, side: Side, edges: ButtonEdges, frame: &mut DispatchFrame<'_>) -> Buttons {
        match self.hands[side.index()].button.clone() {
            Focus::Idle => {
                let Some((button, handler)) = frame.bound_presses(side, edges.pressed).into_iter().next() else {
                    return Buttons::empty();
                };
                if self.press(side, button, handler, frame) {
                    button
                } else {
                    Buttons::empty()
                }
            }
            Focus::Pending { handler, handler_type, button, pressed_at, since_ms } => {
                match self.try_steal(side, &handler, handler_type, button, edges, frame) {
                    Steal::Taken(accepted) => return accepted,
                    Steal::Refused => return Buttons::empty(),
                    Steal::Uncontested => {}
                }
                if edges.released.contains(button) || !edges.held.contains(button) {
                    self.hands[side.index()].button = Focus::Idle;
                    if frame.deliver(side, &handler, Lifecycle::Click) {
                        frame.emit(InteractionEvent::Clicked { side, handler: handler_type });
                    }
                    return Buttons::empty();
                }
                if self.drag_threshold_reached(side, &handler, pressed_at, since_ms, frame) {
                    self.begin_drag(side, button, handler, handler_type, Some(pressed_at), frame);
                }
                Buttons::empty()
            }
            Focus::Owned { handler, handler_type, button } => {
                match self.try_steal(side, &handler, handler_type, button, edges, frame) {
                    Steal::Taken(accepted) => return accepted,
                    Steal::Refused => return Buttons::empty(),
                    Steal::Uncontested => {}
                }
                if edges.released.contains(button) || !edges.held.contains(button) {
                    self.end_drag(side, &handler, handler_type, frame);
                    return Buttons::empty();
                }
                frame.deliver(side, &handler, Lifecycle::DragContinue);
                Buttons::empty()
            }
        }
    }

    /// Offers every other newly pressed bound button, in bit order, to take the hand from
    /// `owner`. The first challenger the owner admits wins; each refusal is recorded.
    fn try_steal(
        &mut self,
        side: Side,
        owner: &HandlerRef,
        owner_type: HandlerType,
        owner_button: Buttons,
        edges: ButtonEdges,
        frame: &mut DispatchFrame<'_>,
    ) -> Steal {
        let mut contested = false;
        for (button, challenger) in frame.bound_presses(side, edges.pressed - owner_button) {
            if Rc::ptr_eq(owner, &challenger) {
                continue;
            }
            contested = true;
            let decision = match (owner.try_borrow(), challenger.try_borrow()) {
                (Ok(owner), Ok(candidate)) => {
                    let caps = Capabilities::of(&*candidate, frame.cursors.get(side));
                    Some((caps.handler_type, caps.is_interactive() && arbitrate_focus(&*owner, &*candidate)))
                }
                _ => None,
            };
            let Some((challenger_type, allowed)) = decision else {
                error!("[dispatch] {side} handler busy during focus arbitration, dropping {button:?}");
                continue;
            };
            if !allowed {
                debug!("[dispatch] {side} {challenger_type} may not take focus from {owner_type}");
                frame.emit(InteractionEvent::StealRejected { side, owner: owner_type, challenger: challenger_type });
                continue;
            }
            if self.hands[side.index()].button.drags(owner) {
                self.end_drag(side, owner, owner_type, frame);
            } else {
                self.hands[side.index()].button = Focus::Idle;
            }
            frame.emit(InteractionEvent::FocusStolen { side, from: owner_type, to: challenger_type });
            let accepted = if self.press(side, button, challenger, frame) { button } else { Buttons::empty() };
            return Steal::Taken(accepted);
        }
        if contested {
            Steal::Refused
        } else {
            Steal::Uncontested
        }
    }

    /// Runs the press path for `handler`. Returns false when the handler did not take the press.
    fn press(&mut self, side: Side, button: Buttons, handler: HandlerRef, frame: &mut DispatchFrame<'_>) -> bool {
        let Some(caps) = frame.capabilities(side, &handler) else {
            error!("[dispatch] {side} handler busy on press, ignoring");
            return false;
        };
        if !caps.is_interactive() {
            debug!("[dispatch] {side} {} takes neither clicks nor drags", caps.handler_type);
            return false;
        }
        let other_dragging = self.hands[side.other().index()].button.drags(&handler);
        if caps.drag && (!caps.click || caps.immediate_drag || other_dragging) {
            self.begin_drag(side, button, handler, caps.handler_type, None, frame)
        } else if caps.drag {
            let cursor = frame.cursors.get(side);
            self.hands[side.index()].button = Focus::Pending {
                handler,
                handler_type: caps.handler_type,
                button,
                pressed_at: cursor.position,
                since_ms: cursor.time_ms,
            };
            true
        } else if frame.deliver(side, &handler, Lifecycle::Click) {
            frame.emit(InteractionEvent::Clicked { side, handler: caps.handler_type });
            true
        } else {
            false
        }
    }

    fn drag_threshold_reached(
        &self,
        side: Side,
        handler: &HandlerRef,
        pressed_at: Mat4,
        since_ms: u64,
        frame: &DispatchFrame<'_>,
    ) -> bool {
        if self.hands[side.other().index()].button.drags(handler) {
            return true;
        }
        let cursor = frame.cursors.get(side);
        if cursor.time_ms.saturating_sub(since_ms) < self.drag.time_threshold_ms {
            return false;
        }
        let (_, start_rotation, start_translation) = pressed_at.to_scale_rotation_translation();
        let (_, rotation, translation) = cursor.position.to_scale_rotation_translation();
        start_translation.distance(translation) > self.drag.distance_threshold
            || start_rotation.angle_between(rotation) > self.drag.rotation_threshold()
    }

    fn begin_drag(
        &mut self,
        side: Side,
        button: Buttons,
        handler: HandlerRef,
        handler_type: HandlerType,
        anchor: Option<Mat4>,
        frame: &mut DispatchFrame<'_>,
    ) -> bool {
        let other_dragging = self.hands[side.other().index()].button.drags(&handler);
        let cursor = frame.cursors.get_mut(side);
        cursor.interaction_position = anchor.unwrap_or(cursor.position);
        if other_dragging {
            frame.cursors.link_bimanual(side, Bimanual::Second);
        }
        if !frame.deliver(side, &handler, Lifecycle::DragStart) {
            if other_dragging {
                frame.cursors.reset_bimanual();
            }
            self.hands[side.index()].button = Focus::Idle;
            return false;
        }
        let bimanual = frame.cursors.get(side).bimanual;
        self.hands[side.index()].button = Focus::Owned { handler, handler_type, button };
        frame.emit(InteractionEvent::DragStarted { side, handler: handler_type, bimanual });
        true
    }

    fn end_drag(&mut self, side: Side, handler: &HandlerRef, handler_type: HandlerType, frame: &mut DispatchFrame<'_>) {
        frame.deliver(side, handler, Lifecycle::DragStop);
        self.hands[side.index()].button = Focus::Idle;
        if frame.cursors.get(side).bimanual.is_active() {
            frame.cursors.reset_bimanual();
            if self.hands[side.other().index()].button.drags(handler) {
                frame.cursors.get_mut(side.other()).anchor();
            }
        }
        frame.emit(InteractionEvent::DragStopped { side, handler: handler_type });
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DragConfig::default())
    }
}
