//! Signup draft validation.
//!
//! [`validate_signup`] is a pure function: it never touches the network and never
//! panics. Every per-field rule runs; the password confirmation check only runs once
//! all of them pass, and lands on the `password_confirmation` path.
//!
//! Values are validated exactly as typed. Nothing is trimmed, so `" ada"` is a
//! non-empty username and is sent as-is.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use super::model::Role;

pub const MIN_PASSWORD_LEN: usize = 7;

pub const NAME_REQUIRED: &str = "Please enter your name";
pub const USERNAME_REQUIRED: &str = "Please enter your username";
pub const EMAIL_REQUIRED: &str = "Please enter your email";
pub const EMAIL_INVALID: &str = "Invalid email address";
pub const PHONE_REQUIRED: &str = "Please enter your phone number";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 7 characters long";
pub const PASSWORDS_DIFFER: &str = "Passwords don't match.";

// Local part may not start with a dot and may not contain "..": checked separately
// since the regex crate has no lookaround.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+\-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$")
        .expect("email pattern is a valid regex")
});

pub fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && EMAIL_PATTERN.is_match(email)
}

fn role_invalid(value: &str) -> String {
    let expected = Role::ALL
        .iter()
        .map(|role| format!("'{role}'"))
        .collect::<Vec<_>>()
        .join(" | ");
    format!("Invalid enum value. Expected {expected}, received '{value}'")
}

/// Raw signup input, exactly as the operator typed it.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SignupDraft {
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    /// Free text until validated; only the four role names are accepted.
    pub role: String,
    pub password: String,
    pub password_confirmation: String,
}

impl SignupDraft {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Debug for SignupDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupDraft")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("phone_number", &self.phone_number)
            .field("role", &self.role)
            .field("password", &"<redacted>")
            .field("password_confirmation", &"<redacted>")
            .finish()
    }
}

/// Field paths errors are keyed by. These match the wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SignupField {
    Name,
    Username,
    Email,
    PhoneNumber,
    Role,
    Password,
    PasswordConfirmation,
}

impl SignupField {
    pub const ALL: [Self; 7] = [
        Self::Name,
        Self::Username,
        Self::Email,
        Self::PhoneNumber,
        Self::Role,
        Self::Password,
        Self::PasswordConfirmation,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Username => "username",
            Self::Email => "email",
            Self::PhoneNumber => "phone_number",
            Self::Role => "role",
            Self::Password => "password",
            Self::PasswordConfirmation => "password_confirmation",
        }
    }
}

impl fmt::Display for SignupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Field path → messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", self.full_messages().join("; "))]
pub struct ValidationErrors {
    errors: BTreeMap<SignupField, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: SignupField, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_error(&self, field: SignupField) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn get(&self, field: SignupField) -> &[String] {
        self.errors.get(&field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = SignupField> + '_ {
        self.errors.keys().copied()
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .flat_map(|(field, messages)| messages.iter().map(move |m| format!("{field}: {m}")))
            .collect()
    }
}

/// An accepted draft, shaped for `POST /users/signup`. The confirmation is gone.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub role: Role,
    pub password: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("phone_number", &self.phone_number)
            .field("role", &self.role)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub fn validate_signup(draft: &SignupDraft) -> Result<SignupRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if draft.name.is_empty() {
        errors.add(SignupField::Name, NAME_REQUIRED);
    }
    if draft.username.is_empty() {
        errors.add(SignupField::Username, USERNAME_REQUIRED);
    }
    if draft.email.is_empty() {
        errors.add(SignupField::Email, EMAIL_REQUIRED);
    }
    if !is_valid_email(&draft.email) {
        errors.add(SignupField::Email, EMAIL_INVALID);
    }
    if draft.phone_number.is_empty() {
        errors.add(SignupField::PhoneNumber, PHONE_REQUIRED);
    }
    let role = draft.role.parse::<Role>();
    if role.is_err() {
        errors.add(SignupField::Role, role_invalid(&draft.role));
    }
    if draft.password.encode_utf16().count() < MIN_PASSWORD_LEN {
        errors.add(SignupField::Password, PASSWORD_TOO_SHORT);
    }

    let role = match role {
        Ok(role) if errors.is_empty() => role,
        _ => return Err(errors),
    };

    if draft.password != draft.password_confirmation {
        errors.add(SignupField::PasswordConfirmation, PASSWORDS_DIFFER);
        return Err(errors);
    }

    Ok(SignupRequest {
        name: draft.name.clone(),
        username: draft.username.clone(),
        email: draft.email.clone(),
        phone_number: draft.phone_number.clone(),
        role,
        password: draft.password.clone(),
    })
}
