//! Type-erased storage cell for states and computes.

use std::any::{Any, TypeId, type_name};

use crate::{Compute, Dep, State, StateSyncStatus, Updater};

pub(crate) trait Slot: Send {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn snapshot(&self) -> Box<dyn Any + Send>;

    /// Replaces the stored value. Returns `false` when `value` has the wrong type.
    fn assign(&mut self, value: Box<dyn Any + Send>) -> bool;

    fn is_compute(&self) -> bool;

    fn deps(&self) -> Vec<TypeId>;

    fn recompute(&self, deps: &Dep<'_>, updater: &Updater);

    fn type_name(&self) -> &'static str;
}

pub(crate) struct Entry {
    pub(crate) slot: Box<dyn Slot>,
    pub(crate) status: StateSyncStatus,
}

impl Entry {
    pub(crate) fn state<T: State>(value: T) -> Self {
        Self {
            slot: Box::new(StateSlot(value)),
            status: StateSyncStatus::BeforeInit,
        }
    }

    pub(crate) fn compute<T: Compute>(value: T) -> Self {
        Self {
            slot: Box::new(ComputeSlot(value)),
            status: StateSyncStatus::BeforeInit,
        }
    }
}

struct StateSlot<T>(T);

impl<T: State> Slot for StateSlot<T> {
    fn as_any(&self) -> &dyn Any {
        &self.0
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        &mut self.0
    }

    fn snapshot(&self) -> Box<dyn Any + Send> {
        Box::new(self.0.clone())
    }

    fn assign(&mut self, value: Box<dyn Any + Send>) -> bool {
        match value.downcast::<T>() {
            Ok(value) => {
                self.0 = *value;
                true
            }
            Err(_) => false,
        }
    }

    fn is_compute(&self) -> bool {
        false
    }

    fn deps(&self) -> Vec<TypeId> {
        Vec::new()
    }

    fn recompute(&self, _deps: &Dep<'_>, _updater: &Updater) {}

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

struct ComputeSlot<T>(T);

impl<T: Compute> Slot for ComputeSlot<T> {
    fn as_any(&self) -> &dyn Any {
        &self.0
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        &mut self.0
    }

    fn snapshot(&self) -> Box<dyn Any + Send> {
        Box::new(self.0.clone())
    }

    fn assign(&mut self, value: Box<dyn Any + Send>) -> bool {
        match value.downcast::<T>() {
            Ok(value) => {
                self.0 = *value;
                true
            }
            Err(_) => false,
        }
    }

    fn is_compute(&self) -> bool {
        true
    }

    fn deps(&self) -> Vec<TypeId> {
        self.0.deps()
    }

    fn recompute(&self, deps: &Dep<'_>, updater: &Updater) {
        self.0.compute(deps, updater);
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}
