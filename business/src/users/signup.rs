//! Signup form session: draft, create command and its result cache.
//!
//! Creating a user is a network side effect, so it lives in a manual-only
//! [`CreateUserCommand`] rather than a compute. The command writes
//! [`CreateUserCompute`]; the shell reads it after each sync.
//!
//! Register once, usually through [`super::register`], then:
//! 1. edit the draft with [`edit_signup`];
//! 2. call [`submit_signup`], which validates and enqueues the command;
//! 3. flush commands and sync; read [`CreateUserCompute`].
//!
//! Each form instance carries a submission counter. [`discard_signup`] bumps it, and a
//! response stamped with an older counter changes nothing.

use std::any::TypeId;

use log::{error, info, warn};
use roster_states::{
    Command, CommandFuture, CommandSnapshot, Compute, Dep, State, StateCtx, Updater,
};
use tokio_util::sync::CancellationToken;

use crate::BusinessConfig;

use super::api::{MutationError, create_user};
use super::roster::dispatch_refresh;
use super::validation::{SignupDraft, SignupRequest, ValidationErrors, validate_signup};

pub const SIGNUP_SUCCESS: &str = "Signup Successful 🎉 Your account has been created!";

/// The draft being edited plus the counter that identifies this form instance.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub draft: SignupDraft,
    pub submission: u64,
}

impl State for SignupForm {}

/// What the command will send. `None` means nothing was submitted.
#[derive(Debug, Clone, Default)]
pub struct CreateUserInput {
    pub request: Option<SignupRequest>,
    pub submission: u64,
}

impl State for CreateUserInput {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CreateUserResult {
    #[default]
    Idle,
    Pending,
    Success(String),
    Error(String),
}

/// Latest create outcome. Written by [`CreateUserCommand`], never derived.
#[derive(Debug, Clone, Default)]
pub struct CreateUserCompute {
    pub result: CreateUserResult,
    pub submission: u64,
}

impl State for CreateUserCompute {}
impl Compute for CreateUserCompute {}

impl CreateUserCompute {
    pub fn is_pending(&self) -> bool {
        matches!(self.result, CreateUserResult::Pending)
    }

    pub fn success_message(&self) -> Option<&str> {
        match &self.result {
            CreateUserResult::Success(message) => Some(message),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.result {
            CreateUserResult::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Field errors for the current draft, kept in step with every edit.
#[derive(Debug, Clone, Default)]
pub struct SignupValidationCompute {
    pub errors: ValidationErrors,
    /// The draft is untouched; shells usually hide errors in this case.
    pub pristine: bool,
}

impl State for SignupValidationCompute {}

impl Compute for SignupValidationCompute {
    fn deps(&self) -> Vec<TypeId> {
        vec![TypeId::of::<SignupForm>()]
    }

    fn compute(&self, deps: &Dep<'_>, updater: &Updater) {
        let form = deps.get_state_ref::<SignupForm>();
        updater.set(Self {
            errors: validate_signup(&form.draft).err().unwrap_or_default(),
            pristine: form.draft.is_empty(),
        });
    }
}

impl SignupValidationCompute {
    pub fn is_pristine(&self) -> bool {
        self.pristine
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// A create for this form is still in flight; nothing was sent.
    Busy,
    Invalid(ValidationErrors),
    Submitted,
}

pub fn edit_signup(ctx: &mut StateCtx, edit: impl FnOnce(&mut SignupDraft)) {
    ctx.update::<SignupForm>(|form| edit(&mut form.draft));
}

/// Validate the current draft and, when it passes, enqueue [`CreateUserCommand`].
///
/// The caller still has to flush commands.
pub fn submit_signup(ctx: &mut StateCtx) -> SubmitOutcome {
    if ctx.compute::<CreateUserCompute>().is_pending() {
        info!("submit_signup: create already in flight, ignoring");
        return SubmitOutcome::Busy;
    }

    let form = ctx.state::<SignupForm>();
    let submission = form.submission;
    let request = match validate_signup(&form.draft) {
        Ok(request) => request,
        Err(errors) => return SubmitOutcome::Invalid(errors),
    };

    ctx.update::<CreateUserInput>(|input| {
        input.request = Some(request);
        input.submission = submission;
    });
    ctx.update::<CreateUserCompute>(|compute| {
        compute.result = CreateUserResult::Pending;
        compute.submission = submission;
    });
    ctx.enqueue_command::<CreateUserCommand>();
    SubmitOutcome::Submitted
}

/// Throw the form away. A create still in flight for it will be ignored on arrival.
pub fn discard_signup(ctx: &mut StateCtx) {
    ctx.update::<SignupForm>(|form| {
        form.submission += 1;
        form.draft.reset();
    });
    let submission = ctx.state::<SignupForm>().submission;
    ctx.update::<CreateUserInput>(|input| *input = CreateUserInput::default());
    ctx.update::<CreateUserCompute>(|compute| {
        compute.result = CreateUserResult::Idle;
        compute.submission = submission;
    });
}

/// Manual-only command that sends the staged [`CreateUserInput`].
#[derive(Debug, Default)]
pub struct CreateUserCommand;

impl Command for CreateUserCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: Updater,
        cancel: CancellationToken,
    ) -> CommandFuture {
        let input = snap.state::<CreateUserInput>().clone();
        let config = snap.state::<BusinessConfig>().clone();

        Box::pin(async move {
            let Some(request) = input.request else {
                info!("CreateUserCommand: nothing submitted, skipping");
                return;
            };
            let submission = input.submission;
            info!("CreateUserCommand: creating '{}'", request.username);

            let result = tokio::select! {
                () = cancel.cancelled() => {
                    warn!("CreateUserCommand: cancelled");
                    updater.update::<CreateUserInput>(move |input| {
                        if input.submission == submission {
                            input.request = None;
                        }
                    });
                    updater.update::<CreateUserCompute>(move |compute| {
                        if compute.submission == submission && compute.is_pending() {
                            compute.result = CreateUserResult::Idle;
                        }
                    });
                    return;
                }
                result = create_user(&config, &request) => result,
            };

            updater.update::<CreateUserInput>(move |input| {
                if input.submission == submission {
                    input.request = None;
                }
            });

            let outcome = match result {
                Ok(()) => {
                    updater.update::<SignupForm>(move |form| {
                        if form.submission == submission {
                            form.draft.reset();
                        }
                    });
                    dispatch_refresh(&updater);
                    CreateUserResult::Success(SIGNUP_SUCCESS.to_owned())
                }
                Err(err) => {
                    if let MutationError::Transport { detail } = &err {
                        error!("CreateUserCommand: transport failure: {detail}");
                    }
                    CreateUserResult::Error(err.to_string())
                }
            };

            updater.update::<CreateUserCompute>(move |compute| {
                if compute.submission == submission {
                    compute.result = outcome;
                } else {
                    info!("CreateUserCommand: form was discarded, dropping result");
                }
            });
        })
    }
}
