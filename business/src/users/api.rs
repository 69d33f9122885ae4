//! User service client helpers.
//!
//! Every call resolves to a tagged outcome. Nothing here panics or returns a raw
//! transport error to the caller; commands map the outcome into state.

use log::{error, info, warn};
use serde_json::Value;
use thiserror::Error;

use crate::BusinessConfig;
use crate::http::{Client, Response};

use super::model::{ListUsersResponse, UserRecord};
use super::validation::SignupRequest;

pub const CREATE_FALLBACK: &str = "An error occurred. Please try again.";
pub const DELETE_FALLBACK: &str = "Something went wrong";
pub const TRANSPORT_FAILURE: &str = "Unexpected error. Please check your network and try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// The service answered with a non-2xx status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// No interpretable answer: connection failure, timeout, bad URL.
    #[error("Unexpected error. Please check your network and try again.")]
    Transport { detail: String },
}

/// The non-empty `error` string of a failure body. `Err` when the body is not JSON.
fn server_message(response: &Response) -> Result<Option<String>, serde_json::Error> {
    let body: Value = response.json()?;
    Ok(body
        .get("error")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(str::to_owned))
}

/// Create failures: an unreadable body is a transport failure, a JSON body without a
/// usable `error` falls back to [`CREATE_FALLBACK`].
fn create_rejection(response: &Response) -> MutationError {
    match server_message(response) {
        Ok(message) => MutationError::Rejected {
            status: response.status,
            message: message.unwrap_or_else(|| CREATE_FALLBACK.to_owned()),
        },
        Err(e) => transport(format!(
            "unreadable failure body (status {}): {e}",
            response.status
        )),
    }
}

/// Delete failures: anything without a usable `error` falls back to
/// [`DELETE_FALLBACK`], unreadable bodies included.
fn delete_rejection(response: &Response) -> MutationError {
    MutationError::Rejected {
        status: response.status,
        message: server_message(response)
            .ok()
            .flatten()
            .unwrap_or_else(|| DELETE_FALLBACK.to_owned()),
    }
}

fn transport(detail: impl Into<String>) -> MutationError {
    MutationError::Transport {
        detail: detail.into(),
    }
}

/// `POST /users/signup`. Any 2xx is success; the body is ignored.
pub async fn create_user(
    config: &BusinessConfig,
    request: &SignupRequest,
) -> Result<(), MutationError> {
    let url = config.signup_url().map_err(|e| transport(e.to_string()))?;
    let response = Client::post(url)
        .json(request)
        .map_err(|e| transport(format!("failed to serialize signup request: {e}")))?
        .send()
        .await
        .map_err(|e| transport(e.message))?;

    if response.is_success() {
        info!("create_user: created '{}'", request.username);
        Ok(())
    } else {
        let err = create_rejection(&response);
        warn!(
            "create_user: '{}' rejected with status {}: {err}",
            request.username, response.status
        );
        Err(err)
    }
}

/// `DELETE /users/delete/{username}`.
pub async fn delete_user(config: &BusinessConfig, username: &str) -> Result<(), MutationError> {
    let url = config
        .delete_url(username)
        .map_err(|e| transport(e.to_string()))?;
    let response = Client::delete(url)
        .send()
        .await
        .map_err(|e| transport(e.message))?;

    if response.is_success() {
        info!("delete_user: deleted '{username}'");
        Ok(())
    } else {
        let err = delete_rejection(&response);
        warn!(
            "delete_user: '{username}' rejected with status {}: {err}",
            response.status
        );
        Err(err)
    }
}

/// `GET /users`. Any failure yields an empty roster. Records that cannot be mapped
/// are dropped one by one.
pub async fn list_users(config: &BusinessConfig) -> Vec<UserRecord> {
    let url = match config.users_url() {
        Ok(url) => url,
        Err(e) => {
            error!("list_users: {e}");
            return Vec::new();
        }
    };
    let response = match Client::get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            error!("list_users: request failed: {e}");
            return Vec::new();
        }
    };
    if !response.is_success() {
        error!("list_users: API returned status {}", response.status);
        return Vec::new();
    }
    let body: ListUsersResponse = match response.json() {
        Ok(body) => body,
        Err(e) => {
            error!("list_users: failed to parse ListUsersResponse: {e}");
            return Vec::new();
        }
    };

    body.users
        .into_iter()
        .filter_map(|remote| match UserRecord::try_from(remote) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("list_users: skipping record: {e}");
                None
            }
        })
        .collect()
}
