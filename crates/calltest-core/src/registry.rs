//! Explicit name → callable registration.
//!
//! Nothing registers itself on load; a runner builds a [`Registry`] and hands
//! it to whatever sequences the calls.

use std::collections::BTreeMap;
use std::fmt;

use crate::callable::{Callable, CallableDescriptor};
use crate::error::Failure;

/// Named callables, iterated in name order.
#[derive(Default)]
pub struct Registry {
    entries: BTreeMap<String, Box<dyn Callable>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register under the callable's descriptor name. A later registration
    /// with the same name replaces the earlier one.
    pub fn register<C: Callable + 'static>(&mut self, callable: C) -> &mut Self {
        let name = callable.descriptor().name;
        self.entries.insert(name, Box::new(callable));
        self
    }

    /// Resolve a name; unknown names are not callable.
    pub fn get(&self, name: &str) -> Result<&dyn Callable, Failure> {
        self.entries
            .get(name)
            .map(|callable| &**callable)
            .ok_or_else(|| Failure::NotCallable {
                target: name.to_owned(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn descriptors(&self) -> Vec<CallableDescriptor> {
        self.entries.values().map(|c| c.descriptor()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}
