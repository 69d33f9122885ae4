use std::any::{Any, TypeId, type_name};

use flume::Sender;
use log::debug;

use crate::{Command, State};

pub(crate) type Mutation = Box<dyn FnOnce(&mut dyn Any) + Send>;

pub(crate) enum Update {
    Replace {
        id: TypeId,
        name: &'static str,
        value: Box<dyn Any + Send>,
    },
    Mutate {
        id: TypeId,
        name: &'static str,
        apply: Mutation,
    },
    Dispatch {
        id: TypeId,
        name: &'static str,
    },
}

/// Posts results back to the owning [`StateCtx`](crate::StateCtx).
///
/// Every call is queued; it takes effect on the next
/// [`StateCtx::sync_computes`](crate::StateCtx::sync_computes).
#[derive(Clone)]
pub struct Updater {
    send: Sender<Update>,
}

impl Updater {
    pub(crate) fn new(send: Sender<Update>) -> Self {
        Self { send }
    }

    /// Replace the stored `T` wholesale.
    pub fn set<T: State>(&self, value: T) {
        self.post(Update::Replace {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            value: Box::new(value),
        });
    }

    /// Reconcile the stored `T` in place.
    ///
    /// The closure sees the value as it is at sync time, not as it was when the command
    /// started, which is what lets a late response notice that its owner has moved on.
    pub fn update<T: State>(&self, apply: impl FnOnce(&mut T) + Send + 'static) {
        let apply: Mutation = Box::new(move |any: &mut dyn Any| {
            if let Some(value) = any.downcast_mut::<T>() {
                apply(value);
            }
        });
        self.post(Update::Mutate {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            apply,
        });
    }

    /// Queue a follow-up command; it is flushed with the next batch.
    pub fn dispatch<C: Command>(&self) {
        self.post(Update::Dispatch {
            id: TypeId::of::<C>(),
            name: type_name::<C>(),
        });
    }

    fn post(&self, update: Update) {
        if self.send.send(update).is_err() {
            debug!("Updater: state context dropped, update discarded");
        }
    }
}

impl std::fmt::Debug for Updater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Updater")
            .field("queued", &self.send.len())
            .finish()
    }
}
