use crate::handler::{HandlerRef, HandlerType};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no handler registered for '{0}'")]
    NotFound(String),
    #[error("'{0}' is not a valid handler type")]
    InvalidType(String),
    #[error("handler '{0}' is built in and cannot be removed")]
    BuiltIn(String),
    #[error("a handler named '{0}' is already registered")]
    Duplicate(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOrigin {
    BuiltIn,
    Dynamic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSummary {
    pub name: String,
    pub handler_type: HandlerType,
    pub origin: HandlerOrigin,
}

struct DynamicSlot {
    name: String,
    handler_type: HandlerType,
    handler: HandlerRef,
}

/// Catalog of handlers: one built-in instance per type plus handlers registered by name at
/// runtime. Built-ins answer to their canonical type name.
#[derive(Default)]
pub struct HandlerRegistry {
    builtins: BTreeMap<HandlerType, HandlerRef>,
    dynamic: Vec<DynamicSlot>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the built-in instance for the handler's type and returns the one it replaces.
    pub fn install_builtin(&mut self, handler: HandlerRef) -> RegistryResult<Option<HandlerRef>> {
        let handler_type = handler.borrow().handler_type();
        if !handler_type.is_valid() {
            return Err(RegistryError::InvalidType(handler_type.name().to_string()));
        }
        if let Some(slot) = self.dynamic.iter().find(|slot| slot.name == handler_type.name()) {
            return Err(RegistryError::Duplicate(slot.name.clone()));
        }
        Ok(self.builtins.insert(handler_type, handler))
    }

    pub fn register_dynamic(&mut self, name: impl Into<String>, handler: HandlerRef) -> RegistryResult<()> {
        let name = name.into();
        let handler_type = handler.borrow().handler_type();
        if !handler_type.is_valid() {
            return Err(RegistryError::InvalidType(name));
        }
        if name.is_empty() || HandlerType::from_name(&name).is_valid() || self.dynamic_index(&name).is_some() {
            return Err(RegistryError::Duplicate(name));
        }
        debug!("[registry] registered '{name}' as {handler_type}");
        self.dynamic.push(DynamicSlot { name, handler_type, handler });
        Ok(())
    }

    /// Removes a dynamically registered handler. Built-ins stay put.
    pub fn unregister(&mut self, name: &str) -> RegistryResult<HandlerRef> {
        if let Some(index) = self.dynamic_index(name) {
            let slot = self.dynamic.remove(index);
            debug!("[registry] unregistered '{name}'");
            return Ok(slot.handler);
        }
        let builtin = HandlerType::from_name(name);
        if builtin.is_valid() && self.builtins.contains_key(&builtin) {
            warn!("[registry] refusing to unregister built-in handler '{name}'");
            return Err(RegistryError::BuiltIn(name.to_string()));
        }
        Err(RegistryError::NotFound(name.to_string()))
    }

    /// Looks up the built-in for `handler_type`, or the dynamic handler of that type registered
    /// under `ident`. `Invalid` is never registered, so it is not found.
    pub fn get_handler(&self, handler_type: HandlerType, ident: Option<&str>) -> RegistryResult<HandlerRef> {
        if !handler_type.is_valid() {
            return Err(RegistryError::NotFound(handler_type.name().to_string()));
        }
        match ident {
            Some(ident) => self
                .dynamic
                .iter()
                .find(|slot| slot.name == ident && slot.handler_type == handler_type)
                .map(|slot| Rc::clone(&slot.handler))
                .ok_or_else(|| RegistryError::NotFound(ident.to_string())),
            None => self
                .builtins
                .get(&handler_type)
                .cloned()
                .ok_or_else(|| RegistryError::NotFound(handler_type.name().to_string())),
        }
    }

    pub fn get_handler_by_name(&self, name: &str) -> RegistryResult<HandlerRef> {
        let builtin = HandlerType::from_name(name);
        if let Some(handler) = self.builtins.get(&builtin) {
            return Ok(Rc::clone(handler));
        }
        self.dynamic_index(name)
            .map(|index| Rc::clone(&self.dynamic[index].handler))
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Type registered under `name`; `Invalid` when nothing matches.
    pub fn type_for_name(&self, name: &str) -> HandlerType {
        let builtin = HandlerType::from_name(name);
        if self.builtins.contains_key(&builtin) {
            return builtin;
        }
        self.dynamic_index(name).map(|index| self.dynamic[index].handler_type).unwrap_or(HandlerType::Invalid)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.type_for_name(name).is_valid()
    }

    pub fn list_names(&self) -> Vec<String> {
        self.builtins
            .keys()
            .map(|ty| ty.name().to_string())
            .chain(self.dynamic.iter().map(|slot| slot.name.clone()))
            .collect()
    }

    pub fn handler_summaries(&self) -> Vec<HandlerSummary> {
        let builtins = self.builtins.keys().map(|ty| HandlerSummary {
            name: ty.name().to_string(),
            handler_type: *ty,
            origin: HandlerOrigin::BuiltIn,
        });
        let dynamic = self.dynamic.iter().map(|slot| HandlerSummary {
            name: slot.name.clone(),
            handler_type: slot.handler_type,
            origin: HandlerOrigin::Dynamic,
        });
        builtins.chain(dynamic).collect()
    }

    pub fn len(&self) -> usize {
        self.builtins.len() + self.dynamic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn dynamic_index(&self, name: &str) -> Option<usize> {
        self.dynamic.iter().position(|slot| slot.name == name)
    }
}
