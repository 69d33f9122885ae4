use anyhow::{Context as _, Result, bail};
use inquire::{Confirm, Password, PasswordDisplayMode, Select, Text};
use roster_business::users::{
    CreateUserCompute, Role, SignupDraft, SignupField, SubmitOutcome, ValidationErrors,
    discard_signup, edit_signup, submit_signup,
};
use roster_states::StateCtx;
use tracing::{info, instrument};

use crate::context::flush_and_await;
use crate::output::Output;

/// Values given on the command line. Anything missing is prompted for.
#[derive(Debug, Default)]
pub struct CreateArgs {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
}

fn prompt_text(label: &str, initial: &str) -> Result<String> {
    Text::new(label)
        .with_initial_value(initial)
        .prompt()
        .with_context(|| format!("Failed to read {label}"))
}

fn prompt_role() -> Result<String> {
    let options: Vec<&str> = Role::ALL.iter().map(|role| role.as_str()).collect();
    Select::new("Role:", options)
        .prompt()
        .map(str::to_owned)
        .context("Failed to read role")
}

fn prompt_password(label: &str) -> Result<String> {
    Password::new(label)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .with_context(|| format!("Failed to read {label}"))
}

fn prompt_passwords(draft: &mut SignupDraft) -> Result<()> {
    draft.password = prompt_password("Password:")?;
    draft.password_confirmation = prompt_password("Confirm password:")?;
    Ok(())
}

fn confirm(message: &str, default: bool) -> Result<bool> {
    Confirm::new(message)
        .with_default(default)
        .prompt()
        .context("Failed to read confirmation")
}

fn collect_draft(args: CreateArgs) -> Result<SignupDraft> {
    let field = |value: Option<String>, label: &str| match value {
        Some(value) => Ok(value),
        None => prompt_text(label, ""),
    };

    let mut draft = SignupDraft {
        name: field(args.name, "Name:")?,
        username: field(args.username, "Username:")?,
        email: field(args.email, "Email:")?,
        phone_number: field(args.phone, "Phone number:")?,
        role: match args.role {
            Some(role) => role,
            None => prompt_role()?,
        },
        ..SignupDraft::default()
    };
    prompt_passwords(&mut draft)?;
    Ok(draft)
}

/// Ask again for every field that failed, keeping what was typed as the starting
/// value. Passwords are always asked for as a pair.
fn reprompt(draft: &mut SignupDraft, errors: &ValidationErrors) -> Result<()> {
    let mut passwords = false;
    for field in errors.fields() {
        match field {
            SignupField::Name => draft.name = prompt_text("Name:", &draft.name)?,
            SignupField::Username => draft.username = prompt_text("Username:", &draft.username)?,
            SignupField::Email => draft.email = prompt_text("Email:", &draft.email)?,
            SignupField::PhoneNumber => {
                draft.phone_number = prompt_text("Phone number:", &draft.phone_number)?;
            }
            SignupField::Role => draft.role = prompt_role()?,
            SignupField::Password | SignupField::PasswordConfirmation => passwords = true,
        }
    }
    if passwords {
        prompt_passwords(draft)?;
    }
    Ok(())
}

fn print_errors(out: &Output, errors: &ValidationErrors) {
    out.error("Some fields need attention:");
    for field in errors.fields() {
        for message in errors.get(field) {
            out.field_error(field, message);
        }
    }
}

async fn submit_until_done(ctx: &mut StateCtx, out: &Output, mut draft: SignupDraft) -> Result<()> {
    loop {
        let staged = draft.clone();
        edit_signup(ctx, |current| *current = staged);

        match submit_signup(ctx) {
            SubmitOutcome::Invalid(errors) => {
                print_errors(out, &errors);
                if !confirm("Fix these fields and try again?", true)? {
                    discard_signup(ctx);
                    bail!("User was not created");
                }
                reprompt(&mut draft, &errors)?;
            }
            SubmitOutcome::Busy => flush_and_await(ctx).await,
            SubmitOutcome::Submitted => {
                flush_and_await(ctx).await;

                let compute = ctx.compute::<CreateUserCompute>();
                if let Some(message) = compute.success_message() {
                    out.success(message);
                    return Ok(());
                }
                let message = compute
                    .error_message()
                    .unwrap_or("User was not created")
                    .to_owned();
                out.error(&message);
                if !confirm("Try again?", false)? {
                    discard_signup(ctx);
                    bail!("User was not created");
                }
                info!("Retrying signup for '{}'", draft.username);
            }
        }
    }
}

#[instrument(skip_all, name = "users_create")]
pub async fn run_create(mut ctx: StateCtx, args: CreateArgs) -> Result<()> {
    let out = Output::new();
    out.header("Create user");
    out.newline();

    let result = match collect_draft(args) {
        Ok(draft) => submit_until_done(&mut ctx, &out, draft).await,
        Err(err) => Err(err),
    };

    ctx.shutdown().await;
    result
}
