use std::any::{TypeId, type_name};
use std::collections::BTreeMap;

use crate::State;
use crate::slot::Entry;

/// Read-only view of the registered values, handed to [`Compute::compute`](crate::Compute::compute).
pub struct Dep<'a> {
    entries: &'a BTreeMap<TypeId, Entry>,
}

impl<'a> Dep<'a> {
    pub(crate) fn new(entries: &'a BTreeMap<TypeId, Entry>) -> Self {
        Self { entries }
    }

    pub fn try_state_ref<T: State>(&self) -> Option<&'a T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.slot.as_any().downcast_ref::<T>())
    }

    /// # Panics
    /// Panics if `T` was never registered; a compute must only read what it lists in `deps`.
    pub fn get_state_ref<T: State>(&self) -> &'a T {
        self.try_state_ref::<T>()
            .unwrap_or_else(|| panic!("Dependency {} is not registered", type_name::<T>()))
    }
}

impl std::fmt::Debug for Dep<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dep")
            .field("entries", &self.entries.len())
            .finish()
    }
}
