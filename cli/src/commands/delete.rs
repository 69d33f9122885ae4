use anyhow::{Context as _, Result, bail};
use inquire::{Confirm, Text};
use roster_business::users::{
    DeleteConfirmation, close_delete_dialog, confirm_delete, open_delete_dialog, refresh_roster,
    type_confirmation,
};
use roster_states::StateCtx;
use tracing::{info, instrument};

use crate::context::flush_and_await;
use crate::output::Output;

fn describe_target(out: &Output, gate: &DeleteConfirmation) -> Result<()> {
    let target = gate.target().context("Delete dialog has no target")?;
    let role = target
        .role
        .map_or_else(|| "UNKNOWN".to_owned(), |role| role.as_str().to_uppercase());

    out.header("Delete User");
    out.print(format!(
        "Are you sure you want to delete {}?",
        target.username
    ));
    out.print(format!(
        "This action will permanently remove the user with the role of {role} from the system. This cannot be undone."
    ));
    out.warning("Please be careful, this operation cannot be undone.");
    out.newline();
    Ok(())
}

fn ask(message: &str, default: bool) -> Result<bool> {
    Confirm::new(message)
        .with_default(default)
        .prompt()
        .context("Failed to read confirmation")
}

/// Outcome of one confirm attempt once its request settled.
enum Attempt {
    Deleted,
    Retype,
    GiveUp,
}

/// Await the in-flight delete, then offer a retry with the same typed value.
async fn settle(ctx: &mut StateCtx, out: &Output) -> Result<Attempt> {
    loop {
        flush_and_await(ctx).await;

        let gate = ctx.state::<DeleteConfirmation>();
        if let Some(message) = gate.success_message() {
            out.success(message);
            return Ok(Attempt::Deleted);
        }
        let error = gate.error().unwrap_or("Failed to delete user").to_owned();
        out.error(&error);

        if !ask("Retry the deletion?", false)? {
            return Ok(Attempt::GiveUp);
        }
        if !confirm_delete(ctx) {
            return Ok(Attempt::Retype);
        }
        info!("Retrying delete");
    }
}

async fn confirm_until_done(ctx: &mut StateCtx, out: &Output) -> Result<()> {
    describe_target(out, ctx.state::<DeleteConfirmation>())?;

    loop {
        let typed = Text::new("Username:")
            .with_placeholder("Enter username to confirm deletion.")
            .prompt()
            .context("Failed to read username")?;
        type_confirmation(ctx, &typed);

        if !confirm_delete(ctx) {
            out.error("The username you typed does not match.");
            if ask("Try again?", true)? {
                continue;
            }
            close_delete_dialog(ctx);
            out.dim("Deletion cancelled.");
            return Ok(());
        }

        match settle(ctx, out).await? {
            Attempt::Deleted => return Ok(()),
            Attempt::Retype => {}
            Attempt::GiveUp => {
                close_delete_dialog(ctx);
                bail!("User was not deleted");
            }
        }
    }
}

#[instrument(skip_all, name = "users_delete", fields(username = %username))]
pub async fn run_delete(mut ctx: StateCtx, username: String) -> Result<()> {
    let out = Output::new();

    refresh_roster(&mut ctx);
    flush_and_await(&mut ctx).await;

    let result = if open_delete_dialog(&mut ctx, &username) {
        confirm_until_done(&mut ctx, &out).await
    } else {
        Err(anyhow::anyhow!("No user named '{username}' was found"))
    };

    ctx.shutdown().await;
    result
}
