//! `roster users` subcommands, one module each.

pub mod create;
pub mod delete;
pub mod list;

pub use create::{CreateArgs, run_create};
pub use delete::run_delete;
pub use list::run_list;
