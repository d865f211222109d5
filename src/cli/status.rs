//! pms status command implementation
//!
//! Reports backend reachability, the session and the effective role.

use crate::api::DataSource;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::role::Role;
use crate::session::RoleSource;

use super::Context;

#[derive(serde::Serialize)]
struct StatusReport {
    api_url: String,
    offline: bool,
    mode: DataSource,
    logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    role: Role,
    role_source: RoleSource,
    state_dir: String,
}

pub async fn run(ctx: &mut Context) -> Result<()> {
    let offline = ctx.config.api.offline;
    let client = ctx.client().await?;
    let mode = if client.is_mock() {
        DataSource::Mock
    } else {
        DataSource::Live
    };
    let api_url = client.base_url().to_string();

    let report = StatusReport {
        api_url: api_url.clone(),
        offline,
        mode,
        logged_in: ctx.session.is_some(),
        user: ctx.session.as_ref().map(|s| s.user.email.clone()),
        role: ctx.role,
        role_source: ctx.role_source,
        state_dir: ctx.state_dir.display().to_string(),
    };

    let mut human = HumanOutput::new("pms status");
    human.push_summary("api", api_url);
    human.push_summary(
        "backend",
        match (offline, mode) {
            (true, _) => "offline (sample data)",
            (false, DataSource::Live) => "reachable",
            (false, DataSource::Mock) => "unreachable (sample data)",
        },
    );
    human.push_summary(
        "session",
        report.user.clone().unwrap_or_else(|| "none".to_string()),
    );
    human.push_summary(
        "role",
        format!("{} ({})", ctx.role.display_name(), ctx.role_source.as_str()),
    );
    human.push_summary("state dir", report.state_dir.clone());
    if !report.logged_in {
        human.push_next_step("pms login --demo pm");
    }

    emit_success(ctx.output, "status", &report, Some(&human))
}
