use std::any::{Any, TypeId, type_name};
use std::collections::BTreeMap;

use crate::{Compute, State};

/// Owned copy of every registered state and compute, taken when a command is flushed.
///
/// Commands run detached from the `StateCtx`, so they read their inputs from here instead
/// of borrowing live values.
#[derive(Default)]
pub struct CommandSnapshot {
    values: BTreeMap<TypeId, Box<dyn Any + Send>>,
}

impl CommandSnapshot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_cloned(&mut self, id: TypeId, value: Box<dyn Any + Send>) {
        self.values.insert(id, value);
    }

    pub fn try_state<T: State>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
    }

    pub fn state<T: State>(&self) -> &T {
        self.try_state::<T>()
            .unwrap_or_else(|| panic!("State snapshot for {} is missing", type_name::<T>()))
    }

    pub fn compute<T: Compute>(&self) -> &T {
        self.try_state::<T>()
            .unwrap_or_else(|| panic!("Compute snapshot for {} is missing", type_name::<T>()))
    }
}

impl std::fmt::Debug for CommandSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSnapshot")
            .field("values", &self.values.len())
            .finish()
    }
}
