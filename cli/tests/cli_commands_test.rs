//! Workflow tests for the `users` subcommands.
//!
//! These drive the same business calls the CLI makes, in the same order, against a
//! mock user service. Prompts are replaced by the values an operator would type.

use std::time::Duration;

use roster_business::users::{
    CreateUserCompute, DeleteConfirmation, GatePhase, RosterCompute, SignupDraft, SubmitOutcome,
    confirm_delete, edit_signup, open_delete_dialog, refresh_roster, submit_signup,
    type_confirmation,
};
use roster_business::{BusinessConfig, build_state_ctx};
use roster_states::StateCtx;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct CliTestContext {
    mock_server: MockServer,
    ctx: StateCtx,
}

impl CliTestContext {
    async fn new() -> Self {
        let mock_server = MockServer::start().await;
        let ctx = build_state_ctx(BusinessConfig::new(mock_server.uri()));
        Self { mock_server, ctx }
    }

    async fn flush_and_wait(&mut self) {
        tokio::time::timeout(Duration::from_secs(5), self.ctx.run_until_idle())
            .await
            .expect("pending tasks did not finish");
    }

    async fn mock_roster(&self, usernames: &[&str]) {
        let users: Vec<_> = usernames
            .iter()
            .enumerate()
            .map(|(id, username)| {
                json!({
                    "id": id,
                    "name": username.to_uppercase(),
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "phone_number": "5550000000",
                    "status": "active",
                    "role": "manager",
                })
            })
            .collect();
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": users })))
            .mount(&self.mock_server)
            .await;
    }

    async fn shutdown(&mut self) {
        self.ctx.shutdown().await;
    }
}

#[tokio::test]
async fn users_list_loads_roster() {
    let mut t = CliTestContext::new().await;
    t.mock_roster(&["amy", "bob"]).await;

    refresh_roster(&mut t.ctx);
    t.flush_and_wait().await;

    let roster = t.ctx.compute::<RosterCompute>();
    assert_eq!(roster.users.len(), 2);
    assert_eq!(roster.find("bob").unwrap().display_name, "BOB");
    t.shutdown().await;
}

#[tokio::test]
async fn users_list_with_service_down_is_empty() {
    let mut ctx = build_state_ctx(BusinessConfig::new("http://127.0.0.1:9"));
    refresh_roster(&mut ctx);
    ctx.run_until_idle().await;

    assert!(ctx.compute::<RosterCompute>().is_empty());
}

#[tokio::test]
async fn users_delete_retry_reuses_typed_username() {
    let mut t = CliTestContext::new().await;
    t.mock_roster(&["bob"]).await;
    Mock::given(method("DELETE"))
        .and(path("/users/delete/bob"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "error": "user has active orders" })),
        )
        .up_to_n_times(1)
        .mount(&t.mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/users/delete/bob"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&t.mock_server)
        .await;

    refresh_roster(&mut t.ctx);
    t.flush_and_wait().await;
    assert!(open_delete_dialog(&mut t.ctx, "bob"));

    type_confirmation(&mut t.ctx, "bob");
    assert!(confirm_delete(&mut t.ctx));
    t.flush_and_wait().await;
    assert_eq!(
        t.ctx.state::<DeleteConfirmation>().error(),
        Some("user has active orders")
    );

    // Operator chooses to retry without retyping.
    assert!(confirm_delete(&mut t.ctx));
    t.flush_and_wait().await;

    let gate = t.ctx.state::<DeleteConfirmation>();
    assert_eq!(gate.phase(), GatePhase::Closed);
    assert_eq!(
        gate.success_message(),
        Some("The following user has been deleted: bob")
    );
    t.shutdown().await;
}

#[tokio::test]
async fn users_create_reports_transport_failure() {
    let mut ctx = build_state_ctx(BusinessConfig::new("http://127.0.0.1:9"));
    edit_signup(&mut ctx, |draft| {
        *draft = SignupDraft {
            name: "Ada Lovelace".to_owned(),
            username: "ada".to_owned(),
            email: "ada@example.com".to_owned(),
            phone_number: "5551234567".to_owned(),
            role: "admin".to_owned(),
            password: "longenough".to_owned(),
            password_confirmation: "longenough".to_owned(),
        };
    });

    assert!(matches!(submit_signup(&mut ctx), SubmitOutcome::Submitted));
    ctx.run_until_idle().await;

    assert_eq!(
        ctx.compute::<CreateUserCompute>().error_message(),
        Some("Unexpected error. Please check your network and try again.")
    );
}
