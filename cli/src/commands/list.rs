use anyhow::Result;
use roster_business::users::{RosterCompute, UserRecord, refresh_roster};
use roster_states::StateCtx;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::instrument;

use crate::context::flush_and_await;
use crate::output::Output;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&UserRecord> for UserRow {
    fn from(user: &UserRecord) -> Self {
        Self {
            username: user.username.to_string(),
            name: truncate_str(&user.display_name, 24),
            email: user.email.clone(),
            phone: user.phone_number.clone(),
            role: user.role.to_string(),
            status: user.status.to_string(),
        }
    }
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    } else {
        s.to_owned()
    }
}

pub fn render_table(users: &[UserRecord]) -> String {
    let rows: Vec<UserRow> = users.iter().map(UserRow::from).collect();
    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.to_string()
}

#[instrument(skip_all, name = "users_list")]
pub async fn run_list(mut ctx: StateCtx) -> Result<()> {
    let out = Output::new();

    refresh_roster(&mut ctx);
    flush_and_await(&mut ctx).await;

    let roster = ctx.compute::<RosterCompute>();
    if roster.is_empty() {
        // A failed fetch lands here too; the cause is in the log.
        out.dim("No users found.");
    } else {
        out.newline();
        out.print(render_table(&roster.users));
        out.total("Total", roster.users.len());
    }

    ctx.shutdown().await;
    Ok(())
}
