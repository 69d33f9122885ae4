//! User administration: signup, roster and confirmed delete.

pub mod api;
pub mod delete_gate;
pub mod delete_user;
pub mod model;
pub mod roster;
pub mod signup;
pub mod validation;

pub use api::{MutationError, create_user, delete_user as delete_remote_user, list_users};
pub use delete_gate::{
    DeleteConfirmation, DeleteTarget, DeleteTicket, GateOutcome, GatePhase, deleted_message,
};
pub use delete_user::{
    DeleteUserCommand, DeleteUserInput, close_delete_dialog, confirm_delete, open_delete_dialog,
    type_confirmation,
};
pub use model::{Role, UserId, UserRecord, UserStatus};
pub use roster::{RefreshRosterCommand, RosterCompute, refresh_roster};
pub use signup::{
    CreateUserCommand, CreateUserCompute, CreateUserInput, CreateUserResult, SIGNUP_SUCCESS,
    SignupForm, SignupValidationCompute, SubmitOutcome, discard_signup, edit_signup,
    submit_signup,
};
pub use validation::{SignupDraft, SignupField, SignupRequest, ValidationErrors, validate_signup};

use roster_states::StateCtx;

/// Register every user state, compute and command. [`crate::BusinessConfig`] must be
/// added separately.
pub fn register(ctx: &mut StateCtx) {
    ctx.add_state(SignupForm::default());
    ctx.add_state(CreateUserInput::default());
    ctx.add_state(DeleteConfirmation::default());
    ctx.add_state(DeleteUserInput::default());

    ctx.record_compute(CreateUserCompute::default());
    ctx.record_compute(SignupValidationCompute::default());
    ctx.record_compute(RosterCompute::default());

    ctx.record_command(CreateUserCommand);
    ctx.record_command(DeleteUserCommand);
    ctx.record_command(RefreshRosterCommand);
}
