//! Name-binding mappings that outlive a single code block.
//!
//! A [`Namespace`] is one `name -> Value` mapping. [`Scopes`] pairs a local
//! and a global namespace: the environment a block executes in. Both are
//! cheap handles; cloning shares the underlying map.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::Value;

/// A shared, single-threaded `name -> Value` mapping.
///
/// Clones alias the same storage. Not `Send`: a conversion mutates its
/// scopes strictly sequentially.
#[derive(Clone, Default)]
#[repr(transparent)]
pub struct Namespace(Rc<RefCell<FxHashMap<String, Value>>>);

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.borrow().get(name).cloned()
    }

    #[inline]
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().insert(name.into(), value);
    }

    pub fn remove(&self, name: &str) -> Option<Value> {
        self.0.borrow_mut().remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.borrow().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Bound names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.borrow().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Whether both handles refer to the same mapping.
    pub fn ptr_eq(&self, other: &Namespace) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// The local and global mappings a block runs in.
///
/// Top-level bindings go to `local`; functions defined in the block resolve
/// free names through `global`. With [`Scopes::new`] both are one mapping.
#[derive(Clone, Debug)]
pub struct Scopes {
    local: Namespace,
    global: Namespace,
}

impl Scopes {
    /// A fresh environment whose local and global mapping are the same.
    pub fn new() -> Self {
        let namespace = Namespace::new();
        Scopes {
            local: namespace.clone(),
            global: namespace,
        }
    }

    /// An environment with distinct (or deliberately shared) mappings.
    pub fn with_mappings(local: Namespace, global: Namespace) -> Self {
        Scopes { local, global }
    }

    pub fn local(&self) -> &Namespace {
        &self.local
    }

    pub fn global(&self) -> &Namespace {
        &self.global
    }

    pub fn is_unified(&self) -> bool {
        self.local.ptr_eq(&self.global)
    }

    /// Look `name` up the way top-level code does, minus builtins.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.local.get(name).or_else(|| self.global.get(name))
    }
}

impl Default for Scopes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
