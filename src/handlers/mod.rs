mod command;
mod menu;

pub use command::{BuiltinHandler, CommandProfile};
pub use menu::{MenuHandler, SwitchToolHandler};
pub(crate) use menu::invoke_entry;

use crate::handler::{handler_ref, HandlerType};
use crate::menu::MenuHandle;
use crate::registry::HandlerRegistry;
use log::error;
use std::rc::Rc;

/// Registry holding one built-in handler per type. Menu handlers share `menu`.
pub fn builtin_registry(menu: &MenuHandle) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    for handler_type in HandlerType::ALL {
        let handler = match handler_type {
            ty if ty.is_menu() => handler_ref(MenuHandler::new(ty, Rc::clone(menu))),
            HandlerType::SwitchTool => handler_ref(SwitchToolHandler::new(Rc::clone(menu))),
            ty => handler_ref(BuiltinHandler::new(ty)),
        };
        if let Err(err) = registry.install_builtin(handler) {
            error!("[registry] failed to install {handler_type}: {err}");
        }
    }
    registry
}
