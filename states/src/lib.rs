//! Reactive state container shared by the business layer and its shells.
//!
//! The model is single-threaded and cooperative:
//! - [`State`] values are plain data owned by [`StateCtx`].
//! - [`Compute`] values are caches, either derived from states or written by commands.
//! - [`Command`]s are manual-only async side effects. They receive a [`CommandSnapshot`]
//!   and report back through an [`Updater`].
//! - Nothing a command posts is visible until the owner calls [`StateCtx::sync_computes`],
//!   so every stored value has exactly one writer: the thread that owns the `StateCtx`.

mod command;
mod compute;
mod ctx;
mod dep;
mod error;
mod slot;
mod snapshot;
mod state;
mod state_sync_status;
mod updater;

pub use command::{Command, CommandFuture};
pub use compute::Compute;
pub use ctx::{SHUTDOWN_GRACE, StateCtx};
pub use dep::Dep;
pub use error::Error;
pub use snapshot::CommandSnapshot;
pub use state::State;
pub(crate) use state_sync_status::StateSyncStatus;
pub use updater::Updater;
