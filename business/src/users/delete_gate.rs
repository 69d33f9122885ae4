//! Typed-username confirmation in front of a destructive delete.
//!
//! The gate owns the only path to a delete request: [`DeleteConfirmation::confirm`]
//! hands out a [`DeleteTicket`] when, and only when, the operator has retyped the
//! target username exactly (surrounding whitespace ignored) and nothing is in flight.
//! The ticket is stamped with the dialog session, so a response that comes back after
//! the dialog was closed or reopened is recognised and dropped by
//! [`DeleteConfirmation::resolve`].

use std::fmt;

use roster_states::State;
use ustr::Ustr;

use super::api::MutationError;
use super::model::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatePhase {
    #[default]
    Idle,
    /// Dialog shown, nothing typed.
    Open,
    ArmedInvalid,
    ArmedValid,
    Submitting,
    /// Deleted; the dialog is gone but the success message is still readable.
    Closed,
}

impl GatePhase {
    fn accepts_input(self) -> bool {
        matches!(self, Self::Open | Self::ArmedInvalid | Self::ArmedValid)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    pub username: Ustr,
    pub role: Option<Role>,
}

/// Latest result shown next to the dialog. One at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Failed(String),
    Deleted(String),
}

/// Authorises exactly one delete request for one dialog session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTicket {
    pub username: Ustr,
    pub session: u64,
}

pub fn deleted_message(username: &str) -> String {
    format!("The following user has been deleted: {username}")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteConfirmation {
    phase: GatePhase,
    target: Option<DeleteTarget>,
    typed: String,
    outcome: Option<GateOutcome>,
    session: u64,
}

impl State for DeleteConfirmation {}

impl DeleteConfirmation {
    /// Show the dialog for `target`. Any previous dialog, and any response still owed to
    /// it, is abandoned.
    pub fn open(&mut self, target: DeleteTarget) {
        self.session += 1;
        self.phase = GatePhase::Open;
        self.target = Some(target);
        self.typed.clear();
        self.outcome = None;
    }

    /// Replace the typed value and re-evaluate the match. Ignored unless the dialog is
    /// open and idle.
    pub fn input(&mut self, typed: impl Into<String>) {
        if !self.phase.accepts_input() {
            return;
        }
        self.typed = typed.into();
        self.phase = self.evaluate();
    }

    fn evaluate(&self) -> GatePhase {
        match &self.target {
            _ if self.typed.is_empty() => GatePhase::Open,
            Some(target) if self.typed.trim() == target.username.as_str() => GatePhase::ArmedValid,
            _ => GatePhase::ArmedInvalid,
        }
    }

    pub fn can_confirm(&self) -> bool {
        self.phase == GatePhase::ArmedValid
    }

    /// Move to `Submitting` and hand out the ticket for the request. `None` when the
    /// confirm control should have been disabled.
    pub fn confirm(&mut self) -> Option<DeleteTicket> {
        if !self.can_confirm() {
            return None;
        }
        let target = self.target.as_ref()?;
        let ticket = DeleteTicket {
            username: target.username,
            session: self.session,
        };
        self.phase = GatePhase::Submitting;
        self.outcome = None;
        Some(ticket)
    }

    /// Apply the delete result. Returns `false`, leaving the gate untouched, when the
    /// ticket belongs to a dialog that no longer exists.
    pub fn resolve(&mut self, ticket: &DeleteTicket, result: Result<(), MutationError>) -> bool {
        if ticket.session != self.session || self.phase != GatePhase::Submitting {
            return false;
        }
        match result {
            Ok(()) => {
                self.phase = GatePhase::Closed;
                self.typed.clear();
                self.outcome = Some(GateOutcome::Deleted(deleted_message(&ticket.username)));
            }
            Err(err) => {
                self.phase = self.evaluate();
                self.outcome = Some(GateOutcome::Failed(err.to_string()));
            }
        }
        true
    }

    /// Dismiss the dialog from any phase.
    pub fn close(&mut self) {
        *self = Self {
            session: self.session + 1,
            ..Self::default()
        };
    }

    pub fn phase(&self) -> GatePhase {
        self.phase
    }

    pub fn target(&self) -> Option<&DeleteTarget> {
        self.target.as_ref()
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn outcome(&self) -> Option<&GateOutcome> {
        self.outcome.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Some(GateOutcome::Failed(message)) => Some(message),
            _ => None,
        }
    }

    pub fn success_message(&self) -> Option<&str> {
        match &self.outcome {
            Some(GateOutcome::Deleted(message)) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == GatePhase::Submitting
    }

    pub fn is_open(&self) -> bool {
        matches!(
            self.phase,
            GatePhase::Open | GatePhase::ArmedInvalid | GatePhase::ArmedValid | GatePhase::Submitting
        )
    }
}

impl fmt::Display for GatePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Open => "open",
            Self::ArmedInvalid => "armed (mismatch)",
            Self::ArmedValid => "armed",
            Self::Submitting => "submitting",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}
