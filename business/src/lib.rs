//! Business layer for the roster admin console.
//!
//! Everything a shell needs lives in [`users`]; register it with [`users::register`]
//! next to a [`BusinessConfig`], then drive it through the `StateCtx` helpers.

pub mod config;
pub mod http;
pub mod users;

#[cfg(test)]
mod test_utils;

pub use config::{BusinessConfig, ConfigError, DEFAULT_API_BASE_URL};

use roster_states::StateCtx;

/// A `StateCtx` with the config and every user state, compute and command registered,
/// and an initial sync done.
pub fn build_state_ctx(config: BusinessConfig) -> StateCtx {
    let mut ctx = StateCtx::new();
    ctx.add_state(config);
    users::register(&mut ctx);
    ctx.sync_computes();
    ctx
}
