use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use roster_states::{Command, CommandFuture, CommandSnapshot, Compute, State, StateCtx, Updater};
use tokio_util::sync::CancellationToken;

use crate::BusinessConfig;

use super::api::list_users;
use super::model::UserRecord;

/// Read-through copy of the remote roster.
///
/// Only [`RefreshRosterCommand`] writes it, and always by replacing `users` wholesale.
#[derive(Debug, Clone, Default)]
pub struct RosterCompute {
    pub users: Vec<UserRecord>,
    /// Fetches requested and not yet landed.
    pub in_flight: usize,
    /// When the fetch behind `users` started. `None` until the first one lands.
    pub last_fetch: Option<DateTime<Utc>>,
}

impl State for RosterCompute {}
impl Compute for RosterCompute {}

impl RosterCompute {
    pub fn find(&self, username: &str) -> Option<&UserRecord> {
        self.users.iter().find(|user| user.username.as_str() == username)
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight > 0
    }
}

/// Queue a fetch. Every queued fetch counts as in flight until it lands or is cancelled.
pub fn refresh_roster(ctx: &mut StateCtx) {
    ctx.update::<RosterCompute>(|roster| roster.in_flight += 1);
    ctx.enqueue_command::<RefreshRosterCommand>();
}

/// [`refresh_roster`] for commands: counted and dispatched through the `Updater`.
pub(crate) fn dispatch_refresh(updater: &Updater) {
    updater.update::<RosterCompute>(|roster| roster.in_flight += 1);
    updater.dispatch::<RefreshRosterCommand>();
}

fn fetch_landed(roster: &mut RosterCompute) {
    roster.in_flight = roster.in_flight.saturating_sub(1);
}

#[derive(Debug, Default)]
pub struct RefreshRosterCommand;

impl Command for RefreshRosterCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: Updater,
        cancel: CancellationToken,
    ) -> CommandFuture {
        let config = snap.state::<BusinessConfig>().clone();

        Box::pin(async move {
            let started_at = Utc::now();

            let users = tokio::select! {
                () = cancel.cancelled() => {
                    warn!("RefreshRosterCommand: cancelled");
                    updater.update::<RosterCompute>(fetch_landed);
                    return;
                }
                users = list_users(&config) => users,
            };
            info!("RefreshRosterCommand: fetched {} users", users.len());

            updater.update::<RosterCompute>(move |roster| {
                fetch_landed(roster);
                if roster.last_fetch.is_some_and(|last| last > started_at) {
                    debug!("RefreshRosterCommand: a newer fetch already landed, dropping");
                    return;
                }
                roster.users = users;
                roster.last_fetch = Some(started_at);
            });
        })
    }
}
