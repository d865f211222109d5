//! pms login / logout / whoami

use std::path::PathBuf;

use crate::api::DataSource;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::role::{menu_for, Role};
use crate::session::{self, RoleSource, Session, User};

use super::Context;

/// Options for `pms login`
pub struct LoginOptions {
    pub email: Option<String>,
    pub password: Option<String>,
    pub demo: Option<String>,
}

#[derive(serde::Serialize)]
struct LoginReport {
    user: User,
    source: DataSource,
    session_path: PathBuf,
}

#[derive(serde::Serialize)]
struct LogoutReport {
    removed: bool,
}

#[derive(serde::Serialize)]
struct WhoamiReport<'a> {
    logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a User>,
    role: Role,
    role_source: RoleSource,
}

pub async fn run_login(ctx: &mut Context, options: LoginOptions) -> Result<()> {
    let fetched = match options.demo {
        Some(raw) => {
            let role: Role = raw.parse()?;
            let client = ctx.client().await?;
            session::demo_login(client, role).await?
        }
        None => {
            let email = options.email.ok_or_else(|| {
                Error::InvalidArgument("email is required unless --demo is given".to_string())
            })?;
            let password = options.password.ok_or_else(|| {
                Error::InvalidArgument("password is required (--password or PMS_PASSWORD)".to_string())
            })?;
            let fallback_role = ctx.login_role()?;
            let client = ctx.client().await?;
            session::login(client, &email, &password, fallback_role).await?
        }
    };

    let session_path = fetched.value.save(&ctx.state_dir)?;
    let user = fetched.value.user.clone();

    let mut human = HumanOutput::new(format!("Logged in as {}", user.name));
    human.push_summary("email", user.email.clone());
    human.push_summary("role", user.role.display_name());
    human.push_summary("session", session_path.display().to_string());
    human.note_source(fetched.source);
    human.push_next_step("pms menu");

    emit_success(
        ctx.output,
        "login",
        &LoginReport {
            user,
            source: fetched.source,
            session_path,
        },
        Some(&human),
    )
}

pub fn run_logout(ctx: &mut Context) -> Result<()> {
    let removed = Session::clear(&ctx.state_dir)?;
    ctx.session = None;

    let header = if removed {
        "Logged out"
    } else {
        "No saved session"
    };
    let mut human = HumanOutput::new(header);
    human.push_next_step("pms login --demo pm");

    emit_success(ctx.output, "logout", &LogoutReport { removed }, Some(&human))
}

pub fn run_whoami(ctx: &Context) -> Result<()> {
    let user = ctx.session.as_ref().map(|s| &s.user);

    let header = match user {
        Some(user) => format!("{} ({})", user.name, user.email),
        None => "Not logged in".to_string(),
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("role", format!("{} [{}]", ctx.role.display_name(), ctx.role));
    human.push_summary("role source", ctx.role_source.as_str());
    if let Some(user) = user {
        human.push_summary("department", user.department.clone());
        if user.role != ctx.role {
            human.push_warning(format!(
                "acting as {} instead of the session role {}",
                ctx.role, user.role
            ));
        }
    } else {
        human.push_next_step("pms login <email>");
    }
    let views: Vec<&str> = menu_for(ctx.role).iter().map(|view| view.label()).collect();
    human.push_summary("views", views.join(", "));

    emit_success(
        ctx.output,
        "whoami",
        &WhoamiReport {
            logged_in: user.is_some(),
            user,
            role: ctx.role,
            role_source: ctx.role_source,
        },
        Some(&human),
    )
}
