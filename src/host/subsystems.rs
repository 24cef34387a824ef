//! Host-owned subsystem map

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::facade::SdkFacade;

/// Facades registered by well-known key
///
/// The host holds the strong references; coordinators only keep weak handles.
#[derive(Default)]
pub struct Subsystems {
    facades: RefCell<HashMap<String, Rc<dyn SdkFacade>>>,
}

impl Subsystems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a facade, returning the one it replaced
    pub fn register(&self, key: impl Into<String>, facade: Rc<dyn SdkFacade>) -> Option<Rc<dyn SdkFacade>> {
        let key = key.into();
        debug!(%key, version = %facade.version(), "Subsystems::register: called");
        self.facades.borrow_mut().insert(key, facade)
    }

    pub fn resolve(&self, key: &str) -> Option<Rc<dyn SdkFacade>> {
        self.facades.borrow().get(key).cloned()
    }

    pub fn remove(&self, key: &str) -> Option<Rc<dyn SdkFacade>> {
        debug!(%key, "Subsystems::remove: called");
        self.facades.borrow_mut().remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.facades.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.facades.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.facades.borrow().is_empty()
    }
}
