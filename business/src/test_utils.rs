//! Mock-server harness for driving user commands end to end.
//!
//! ```ignore
//! let mut t = TestContext::new().await;
//! t.mock_list_users(vec![remote_user("bob", "cashier")]).await;
//! refresh_roster(&mut t.ctx);
//! t.flush_and_wait().await;
//! assert_eq!(t.ctx.compute::<RosterCompute>().users.len(), 1);
//! ```

use std::time::Duration;

use roster_states::StateCtx;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::users::SignupDraft;
use crate::{BusinessConfig, build_state_ctx};

pub struct TestContext {
    pub mock_server: MockServer,
    pub ctx: StateCtx,
}

impl TestContext {
    pub async fn new() -> Self {
        let mock_server = MockServer::start().await;
        let ctx = build_state_ctx(BusinessConfig::new(mock_server.uri()));
        Self { mock_server, ctx }
    }

    /// Sync, flush and await every command, including follow-ups, with a timeout.
    pub async fn flush_and_wait(&mut self) {
        tokio::time::timeout(Duration::from_secs(5), self.ctx.run_until_idle())
            .await
            .unwrap_or_else(|_| {
                panic!(
                    "Timed out waiting for pending tasks ({} still in JoinSet)",
                    self.ctx.task_count()
                )
            });
    }

    pub async fn mock_signup(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path("/users/signup"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.mock_server)
            .await;
    }

    /// A failure whose body is not JSON, as a proxy in front of the service would send.
    pub async fn mock_signup_raw(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path("/users/signup"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_signup_delayed(&self, delay: Duration) {
        Mock::given(method("POST"))
            .and(path("/users/signup"))
            .respond_with(ResponseTemplate::new(201).set_delay(delay))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_delete(&self, username: &str, status: u16, body: Value) {
        Mock::given(method("DELETE"))
            .and(path(format!("/users/delete/{username}")))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_delete_delayed(&self, username: &str, delay: Duration) {
        Mock::given(method("DELETE"))
            .and(path(format!("/users/delete/{username}")))
            .respond_with(ResponseTemplate::new(200).set_delay(delay))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_list_users(&self, users: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": users })))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_list_users_error(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.mock_server)
            .await;
    }

    /// Bodies of every `POST /users/signup` the server saw.
    pub async fn signup_bodies(&self) -> Vec<Value> {
        self.mock_server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|req| req.url.path() == "/users/signup")
            .filter_map(|req| serde_json::from_slice(&req.body).ok())
            .collect()
    }

    pub async fn delete_count(&self) -> usize {
        self.mock_server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|req| req.method.as_str() == "DELETE")
            .count()
    }
}

pub fn remote_user(username: &str, role: &str) -> Value {
    json!({
        "id": 1,
        "name": format!("{username} display"),
        "username": username,
        "email": format!("{username}@Example.com"),
        "phone_number": "5550000000",
        "status": "active",
        "role": role,
    })
}

pub fn ada_draft() -> SignupDraft {
    SignupDraft {
        name: "Ada Lovelace".to_owned(),
        username: "ada".to_owned(),
        email: "ada@example.com".to_owned(),
        phone_number: "5551234567".to_owned(),
        role: "cashier".to_owned(),
        password: "longenough".to_owned(),
        password_confirmation: "longenough".to_owned(),
    }
}
