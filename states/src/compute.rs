use std::any::TypeId;

use crate::{Dep, State, Updater};

/// A cached value.
///
/// Two shapes are supported:
/// - derived: `deps` names the states it reads, `compute` posts the new value through the
///   `Updater` whenever one of them changed.
/// - command-updated: the defaults (no deps, no-op `compute`); a command writes it via
///   [`Updater::set`] or [`Updater::update`].
pub trait Compute: State {
    fn deps(&self) -> Vec<TypeId> {
        Vec::new()
    }

    fn compute(&self, _deps: &Dep<'_>, _updater: &Updater) {}
}
