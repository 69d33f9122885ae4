mod cli;
mod commands;
mod context;
mod output;
mod timing;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser as _;
use tracing::info;

use crate::cli::{Cli, Commands, UsersCommand};
use crate::commands::{CreateArgs, run_create, run_delete, run_list};
use crate::context::{build_state_ctx, resolve_config};
use crate::output::Output;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    timing::init_tracing(cli.verbose, cli.timing);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            Output::new().error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.api_url.as_deref())?;
    info!(api = %config.api_base_url, "Using user service");
    let ctx = build_state_ctx(config);

    match cli.command {
        Commands::Users { command } => match command {
            UsersCommand::List => run_list(ctx).await,
            UsersCommand::Create {
                name,
                username,
                email,
                phone,
                role,
            } => {
                let args = CreateArgs {
                    name,
                    username,
                    email,
                    phone,
                    role,
                };
                run_create(ctx, args).await
            }
            UsersCommand::Delete { username } => run_delete(ctx, username).await,
        },
    }
}
