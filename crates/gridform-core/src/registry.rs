//! Name-keyed handle tables.
//!
//! ## Learning: Write-Once Cells
//!
//! The planner hands out a [`HandleSlot`] before any editor exists. The
//! renderer fills it later, once, through the capture callback. `OnceLock`
//! gives exactly that: many readers, a single successful write, and no
//! `RefCell` borrow panics. The `Arc` lets the registry, the editor
//! descriptor and the capture callback share the same slot.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// A string-keyed table with upsert semantics.
///
/// There is no removal: entries live as long as the render pass that
/// created them, and are superseded when the same key is set again.
#[derive(Debug, Clone)]
pub struct Registry<V> {
    entries: HashMap<String, V>,
}

impl<V> Registry<V> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Returns the entry for a key.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    /// Inserts or overwrites an entry, returning the one it superseded.
    pub fn set(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        let previous = self.entries.insert(key, value);
        if previous.is_some() {
            tracing::trace!("Registry entry superseded");
        }
        previous
    }

    /// Returns true if the key has an entry.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for Registry<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// An opaque reference to a live editor instance.
#[derive(Clone)]
pub struct EditorHandle(Arc<dyn Any + Send + Sync>);

impl EditorHandle {
    /// Wraps an editor instance.
    pub fn new<T: Any + Send + Sync>(instance: T) -> Self {
        Self(Arc::new(instance))
    }

    /// Borrows the instance as a concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    /// Returns a shared pointer to the instance as a concrete type.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.0.clone().downcast().ok()
    }

    /// Returns true if both handles point at the same instance.
    pub fn same_instance(&self, other: &EditorHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EditorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EditorHandle").finish_non_exhaustive()
    }
}

/// A placeholder for an editor handle that is filled once realized.
#[derive(Debug, Clone, Default)]
pub struct HandleSlot(Arc<OnceLock<EditorHandle>>);

impl HandleSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the realized editor. Only the first capture is kept.
    ///
    /// Returns false if the slot was already filled.
    pub fn capture(&self, handle: EditorHandle) -> bool {
        self.0.set(handle).is_ok()
    }

    /// Returns the captured editor, if any.
    pub fn handle(&self) -> Option<&EditorHandle> {
        self.0.get()
    }

    /// Returns true once an editor has been captured.
    pub fn is_captured(&self) -> bool {
        self.0.get().is_some()
    }

    /// Returns true if both slots are the same placeholder.
    pub fn same_slot(&self, other: &HandleSlot) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Editor placeholders keyed by column name.
pub type ReferenceRegistry = Registry<HandleSlot>;
