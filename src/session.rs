//! Login session and role resolution.
//!
//! Role resolution order:
//! 1) CLI --role (explicit)
//! 2) PMS_ROLE environment variable
//! 3) Role of the persisted session user in `<state dir>/session.json`
//! 4) Config default (session.default_role) or "pm"

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, Fetched};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::role::Role;

const SESSION_FILENAME: &str = "session.json";
pub const MOCK_TOKEN: &str = "mock-jwt-token";
pub const DEMO_PASSWORD: &str = "demo";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub email: String,
    #[serde(default)]
    pub department: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
    pub logged_in_at: DateTime<Utc>,
}

impl Session {
    pub fn from_login(response: LoginResponse) -> Self {
        Self {
            token: response.token,
            user: response.user,
            logged_in_at: Utc::now(),
        }
    }

    /// Load the persisted session, if present.
    pub fn load(state_dir: &Path) -> Result<Option<Self>> {
        let path = session_path(state_dir);
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path)?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "ignoring unreadable session file"
                );
                Ok(None)
            }
        }
    }

    pub fn save(&self, state_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(state_dir)?;
        let path = session_path(state_dir);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, format!("{json}\n"))?;
        Ok(path)
    }

    /// Remove the persisted session. Returns false when there was none.
    pub fn clear(state_dir: &Path) -> Result<bool> {
        let path = session_path(state_dir);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(path)?;
        Ok(true)
    }
}

fn session_path(state_dir: &Path) -> PathBuf {
    state_dir.join(SESSION_FILENAME)
}

/// Directory holding the session and user config.
pub fn state_dir(home: Option<&Path>) -> Result<PathBuf> {
    if let Some(home) = home {
        return Ok(home.to_path_buf());
    }
    directories::ProjectDirs::from("com", "insuretech", "pms")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            Error::OperationFailed("cannot determine a data directory; pass --home".to_string())
        })
}

pub fn validate_credentials(email: &str, password: &str) -> Result<()> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, _)) if !local.is_empty() => {}
        _ => {
            return Err(Error::InvalidArgument(format!(
                "invalid email '{email}': expected name@domain"
            )))
        }
    }
    if password.is_empty() {
        return Err(Error::InvalidArgument("password cannot be empty".to_string()));
    }
    Ok(())
}

/// Login result used when the backend cannot be reached.
pub fn mock_login(email: &str, role: Role) -> LoginResponse {
    let email = email.trim();
    let name = email.split('@').next().unwrap_or(email);
    LoginResponse {
        token: MOCK_TOKEN.to_string(),
        user: User {
            id: "1".to_string(),
            name: name.to_string(),
            role,
            email: email.to_string(),
            department: "PMO".to_string(),
        },
    }
}

/// One demo account per role, offered by `pms login --demo` and the login screen.
pub fn demo_user(role: Role) -> User {
    let (id, name, department) = match role {
        Role::Sponsor => ("101", "Daehyun Kang", "Executive Office"),
        Role::PmoHead => ("102", "Sujin Han", "PMO"),
        Role::Pm => ("103", "Chulsoo Kim", "PMO"),
        Role::Developer => ("104", "Minsu Park", "AI Development"),
        Role::Qa => ("105", "Jihoon Choi", "Quality Assurance"),
        Role::BusinessAnalyst => ("106", "Younghee Lee", "Claims Operations"),
        Role::Auditor => ("107", "Hyejin Yoon", "External Audit"),
        Role::Admin => ("108", "Dongwook Seo", "IT Operations"),
    };
    User {
        id: id.to_string(),
        name: name.to_string(),
        role,
        email: format!("{}@insuretech.com", role.as_str().replace('_', ".")),
        department: department.to_string(),
    }
}

pub fn demo_users() -> Vec<User> {
    Role::ALL.into_iter().map(demo_user).collect()
}

/// Authenticate and build a session. Falls back to a local mock login when
/// the backend is unreachable.
pub async fn login(
    client: &mut ApiClient,
    email: &str,
    password: &str,
    fallback_role: Role,
) -> Result<Fetched<Session>> {
    validate_credentials(email, password)?;
    let request = LoginRequest {
        email: email.trim().to_string(),
        password: password.to_string(),
    };
    authenticate(client, request, mock_login(email, fallback_role)).await
}

/// Log in as the demo account of a role.
pub async fn demo_login(client: &mut ApiClient, role: Role) -> Result<Fetched<Session>> {
    let user = demo_user(role);
    let request = LoginRequest {
        email: user.email.clone(),
        password: DEMO_PASSWORD.to_string(),
    };
    let fallback = LoginResponse {
        token: MOCK_TOKEN.to_string(),
        user,
    };
    authenticate(client, request, fallback).await
}

async fn authenticate(
    client: &mut ApiClient,
    request: LoginRequest,
    fallback: LoginResponse,
) -> Result<Fetched<Session>> {
    let fetched = client.login(&request, fallback).await;
    client.set_token(fetched.value.token.clone());
    tracing::info!(
        user = %fetched.value.user.email,
        role = %fetched.value.user.role,
        source = %fetched.source,
        "logged in"
    );
    Ok(fetched.map(Session::from_login))
}

/// Where the effective role came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleSource {
    Flag,
    Env,
    Session,
    Config,
}

impl RoleSource {
    pub fn as_str(self) -> &'static str {
        match self {
            RoleSource::Flag => "flag",
            RoleSource::Env => "env",
            RoleSource::Session => "session",
            RoleSource::Config => "config",
        }
    }
}

/// Resolve the current role using CLI, environment, session, and config.
pub fn resolve_role(
    cli_role: Option<&str>,
    session: Option<&Session>,
    config: &Config,
) -> Result<(Role, RoleSource)> {
    let env_role = std::env::var("PMS_ROLE").ok();
    resolve_role_from(cli_role, env_role.as_deref(), session, config)
}

fn resolve_role_from(
    cli_role: Option<&str>,
    env_role: Option<&str>,
    session: Option<&Session>,
    config: &Config,
) -> Result<(Role, RoleSource)> {
    if let Some(role) = non_empty(cli_role) {
        return Ok((role.parse()?, RoleSource::Flag));
    }
    if let Some(role) = non_empty(env_role) {
        return Ok((role.parse()?, RoleSource::Env));
    }
    if let Some(session) = session {
        return Ok((session.user.role, RoleSource::Session));
    }
    Ok((config.session.role()?, RoleSource::Config))
}

fn non_empty(input: Option<&str>) -> Option<&str> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}
