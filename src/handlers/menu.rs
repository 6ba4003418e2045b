use crate::cursor::{Cursor, Side};
use crate::events::InteractionEvent;
use crate::handler::{Handler, HandlerContext, HandlerRef, HandlerRequest, HandlerType};
use crate::menu::{MenuCommit, MenuEntry, MenuHandle, MenuType, Sector};
use crate::render::IconRenderer;
use log::{debug, error};

/// Clicks `handler` if it accepts clicks for the acting cursor.
pub(crate) fn click_handler(handler: &HandlerRef, ctx: &mut HandlerContext<'_>) -> bool {
    let Ok(mut handler) = handler.try_borrow_mut() else {
        error!("[menu] handler already in use, dropping click");
        return false;
    };
    if !handler.has_click(ctx.cursor) {
        debug!("[menu] {} takes no clicks", handler.handler_type());
        return false;
    }
    let handler_type = handler.handler_type();
    handler.click(ctx);
    let side = ctx.side();
    ctx.emit(InteractionEvent::Clicked { side, handler: handler_type });
    true
}

/// Performs a resolved menu entry outside any commit, e.g. a stick-center press.
pub(crate) fn invoke_entry(entry: MenuEntry, menu: MenuType, ctx: &mut HandlerContext<'_>) {
    let side = ctx.side();
    match entry {
        MenuEntry::Handler { handler, .. } => {
            click_handler(&handler, ctx);
        }
        MenuEntry::Command(command) => ctx.emit(InteractionEvent::MenuCommand { side, menu, command }),
        MenuEntry::Tool(tool) => ctx.request(HandlerRequest::SelectTool { side, tool }),
        MenuEntry::Submenu(_) | MenuEntry::Placeholder => {}
    }
}

/// Handler front of the radial menu. The left and right variants are pinned to their hand;
/// the generic variant follows whichever hand drives it.
pub struct MenuHandler {
    handler_type: HandlerType,
    menu: MenuHandle,
}

impl MenuHandler {
    pub fn new(handler_type: HandlerType, menu: MenuHandle) -> Self {
        Self { handler_type, menu }
    }

    fn side_for(&self, cursor: &Cursor) -> Side {
        self.handler_type.pinned_side().unwrap_or(cursor.side)
    }

    fn sample_stick(&mut self, ctx: &mut HandlerContext<'_>) {
        let side = self.side_for(ctx.cursor);
        match self.menu.try_borrow_mut() {
            Ok(mut menu) => menu.update(side, ctx.cursor.stick),
            Err(_) => error!("[menu] menu state busy, dropping stick sample"),
        }
    }

    fn apply_commit(&self, ctx: &mut HandlerContext<'_>, menu: MenuType, sector: Option<Sector>, commit: MenuCommit) {
        let side = self.side_for(ctx.cursor);
        if let (Some(sector), false) = (sector, matches!(commit, MenuCommit::Ignored)) {
            ctx.emit(InteractionEvent::MenuCommitted { side, menu, sector });
        }
        match commit {
            MenuCommit::Ignored | MenuCommit::Empty | MenuCommit::Exited { .. } => {}
            MenuCommit::Submenu { menu, depth } => ctx.emit(InteractionEvent::MenuOpened { side, menu, depth }),
            MenuCommit::Invoke { handler, .. } => {
                click_handler(&handler, ctx);
            }
            MenuCommit::Command(command) => ctx.emit(InteractionEvent::MenuCommand { side, menu, command }),
            MenuCommit::SelectTool(tool) => ctx.request(HandlerRequest::SelectTool { side, tool }),
        }
    }
}

impl Handler for MenuHandler {
    fn handler_type(&self) -> HandlerType {
        self.handler_type
    }

    fn has_click(&self, _cursor: &Cursor) -> bool {
        true
    }

    /// Toggles the hand's root menu. Reopening always starts again at depth 0.
    fn click(&mut self, ctx: &mut HandlerContext<'_>) {
        let side = self.side_for(ctx.cursor);
        let Ok(mut menu) = self.menu.try_borrow_mut() else {
            error!("[menu] menu state busy, dropping click");
            return;
        };
        let state = menu.state(side);
        if state.is_open() && !state.action_settings() {
            let closing = state.menu_type();
            menu.close(side);
            drop(menu);
            ctx.emit(InteractionEvent::MenuClosed { side, menu: closing });
            return;
        }
        if menu.open_root(side, ctx.tool, ctx.registry) {
            let opened = menu.state(side).menu_type();
            drop(menu);
            ctx.emit(InteractionEvent::MenuOpened { side, menu: opened, depth: 0 });
        }
    }

    fn has_drag(&self, cursor: &Cursor) -> bool {
        let side = self.side_for(cursor);
        self.menu.try_borrow().map(|menu| menu.is_open(side)).unwrap_or(false)
    }

    fn drag_start(&mut self, ctx: &mut HandlerContext<'_>) {
        self.sample_stick(ctx);
    }

    fn drag_continue(&mut self, ctx: &mut HandlerContext<'_>) {
        self.sample_stick(ctx);
    }

    fn drag_stop(&mut self, ctx: &mut HandlerContext<'_>) {
        let side = self.side_for(ctx.cursor);
        let (menu_type, sector, commit, closed) = {
            let Ok(mut menu) = self.menu.try_borrow_mut() else {
                error!("[menu] menu state busy, dropping commit");
                return;
            };
            let state = menu.state(side);
            let menu_type = state.menu_type();
            let sector = state.hovered();
            let was_open = state.is_open();
            let commit = menu.commit(side, ctx.registry);
            (menu_type, sector, commit, was_open && !menu.is_open(side))
        };
        debug!("[menu] {side} committed {menu_type}: {commit:?}");
        self.apply_commit(ctx, menu_type, sector, commit);
        if closed {
            ctx.emit(InteractionEvent::MenuClosed { side, menu: menu_type });
        }
    }

    fn render_scene(&self, cursor: &Cursor, renderer: &mut dyn IconRenderer) {
        if let Ok(menu) = self.menu.try_borrow() {
            menu.render(self.side_for(cursor), cursor.position, renderer);
        }
    }
}

/// Opens the tool picker on the pressing hand.
pub struct SwitchToolHandler {
    menu: MenuHandle,
}

impl SwitchToolHandler {
    pub fn new(menu: MenuHandle) -> Self {
        Self { menu }
    }
}

impl Handler for SwitchToolHandler {
    fn handler_type(&self) -> HandlerType {
        HandlerType::SwitchTool
    }

    fn has_click(&self, _cursor: &Cursor) -> bool {
        true
    }

    fn click(&mut self, ctx: &mut HandlerContext<'_>) {
        let side = ctx.side();
        let opened = match self.menu.try_borrow_mut() {
            Ok(mut menu) => menu.open_fresh(side, MenuType::SwitchTool, ctx.registry),
            Err(_) => {
                error!("[menu] menu state busy, dropping tool switch");
                false
            }
        };
        if opened {
            ctx.emit(InteractionEvent::MenuOpened { side, menu: MenuType::SwitchTool, depth: 0 });
        }
    }
}
