use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::{CommandSnapshot, Updater};

pub type CommandFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Manual-only side effect (network IO and the like).
///
/// Side effects never live in a [`Compute`](crate::Compute) because computes run
/// implicitly. A command runs only after [`StateCtx::enqueue_command`](crate::StateCtx::enqueue_command)
/// followed by [`StateCtx::flush_commands`](crate::StateCtx::flush_commands).
pub trait Command: Send + Sync + 'static {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: Updater,
        cancel: CancellationToken,
    ) -> CommandFuture;
}
