//! Delete flow: drive [`DeleteConfirmation`] and run the request it authorises.

use log::{error, info};
use roster_states::{Command, CommandFuture, CommandSnapshot, State, StateCtx, Updater};
use tokio_util::sync::CancellationToken;

use crate::BusinessConfig;

use super::api::{MutationError, delete_user};
use super::delete_gate::{DeleteConfirmation, DeleteTarget, DeleteTicket};
use super::roster::{RosterCompute, dispatch_refresh};

/// The ticket handed out by the last successful confirm.
#[derive(Debug, Clone, Default)]
pub struct DeleteUserInput {
    pub ticket: Option<DeleteTicket>,
}

impl State for DeleteUserInput {}

/// Open the dialog for a roster entry. Returns `false` when `username` is not in the
/// cached roster.
pub fn open_delete_dialog(ctx: &mut StateCtx, username: &str) -> bool {
    let Some(record) = ctx.compute::<RosterCompute>().find(username) else {
        info!("open_delete_dialog: '{username}' is not in the roster");
        return false;
    };
    let target = DeleteTarget {
        username: record.username,
        role: Some(record.role),
    };
    ctx.update::<DeleteConfirmation>(|gate| gate.open(target));
    true
}

pub fn type_confirmation(ctx: &mut StateCtx, typed: &str) {
    ctx.update::<DeleteConfirmation>(|gate| gate.input(typed));
}

/// Confirm and enqueue [`DeleteUserCommand`]. `false`, with no request queued, unless
/// the gate is armed with a matching username.
pub fn confirm_delete(ctx: &mut StateCtx) -> bool {
    if !ctx.state::<DeleteConfirmation>().can_confirm() {
        return false;
    }
    let mut ticket = None;
    ctx.update::<DeleteConfirmation>(|gate| ticket = gate.confirm());
    let Some(ticket) = ticket else {
        return false;
    };
    ctx.update::<DeleteUserInput>(|input| input.ticket = Some(ticket));
    ctx.enqueue_command::<DeleteUserCommand>();
    true
}

pub fn close_delete_dialog(ctx: &mut StateCtx) {
    ctx.update::<DeleteConfirmation>(DeleteConfirmation::close);
    ctx.update::<DeleteUserInput>(|input| input.ticket = None);
}

#[derive(Debug, Default)]
pub struct DeleteUserCommand;

impl Command for DeleteUserCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: Updater,
        cancel: CancellationToken,
    ) -> CommandFuture {
        let input = snap.state::<DeleteUserInput>().clone();
        let config = snap.state::<BusinessConfig>().clone();

        Box::pin(async move {
            let Some(ticket) = input.ticket else {
                info!("DeleteUserCommand: no confirmed ticket, skipping");
                return;
            };
            info!("DeleteUserCommand: deleting '{}'", ticket.username);

            let result = tokio::select! {
                () = cancel.cancelled() => {
                    info!("DeleteUserCommand: cancelled");
                    return;
                }
                result = delete_user(&config, ticket.username.as_str()) => result,
            };

            if let Err(MutationError::Transport { detail }) = &result {
                error!("DeleteUserCommand: transport failure: {detail}");
            }
            if result.is_ok() {
                dispatch_refresh(&updater);
            }

            updater.update::<DeleteUserInput>({
                let ticket = ticket.clone();
                move |input| {
                    if input.ticket.as_ref() == Some(&ticket) {
                        input.ticket = None;
                    }
                }
            });
            updater.update::<DeleteConfirmation>(move |gate| {
                if !gate.resolve(&ticket, result) {
                    info!(
                        "DeleteUserCommand: dialog for '{}' is gone, dropping result",
                        ticket.username
                    );
                }
            });
        })
    }
}
