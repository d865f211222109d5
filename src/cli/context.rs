//! Per-invocation state shared by the command runners.

use std::path::PathBuf;

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputOptions;
use crate::role::{self, Role, View};
use crate::session::{self, RoleSource, Session};
use crate::ui::console::LaunchOptions;

/// Global flags shared by every command.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub home: Option<PathBuf>,
    pub role: Option<String>,
    pub api_url: Option<String>,
    pub offline: bool,
    pub json: bool,
    pub quiet: bool,
}

pub struct Context {
    pub config: Config,
    pub state_dir: PathBuf,
    pub session: Option<Session>,
    pub role: Role,
    pub role_source: RoleSource,
    pub output: OutputOptions,
    client: Option<ApiClient>,
}

impl Context {
    pub fn new(globals: GlobalOptions) -> Result<Self> {
        let state_dir = session::state_dir(globals.home.as_deref())?;
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let mut config = Config::discover(globals.config.as_deref(), &state_dir, &cwd)?
            .with_api_url(globals.api_url.as_deref())?;
        if globals.offline {
            config.api.offline = true;
        }

        let session = Session::load(&state_dir)?;
        let (role, role_source) =
            session::resolve_role(globals.role.as_deref(), session.as_ref(), &config)?;
        tracing::debug!(role = %role, source = role_source.as_str(), "resolved role");

        Ok(Self {
            config,
            state_dir,
            session,
            role,
            role_source,
            output: OutputOptions {
                json: globals.json,
                quiet: globals.quiet,
            },
            client: None,
        })
    }

    /// The API client, connected (and health-probed) on first use.
    pub async fn client(&mut self) -> Result<&mut ApiClient> {
        if self.client.is_none() {
            let token = self.session.as_ref().map(|s| s.token.clone());
            let client = ApiClient::connect(&self.config.api, token).await?;
            self.client = Some(client);
        }
        self.client
            .as_mut()
            .ok_or_else(|| Error::OperationFailed("API client unavailable".to_string()))
    }

    pub fn require_view(&self, view: View) -> Result<()> {
        role::require_view(self.role, view)
    }

    /// Role used for a fresh login when the user did not pick one: the
    /// explicit role if any, otherwise the configured default.
    pub fn login_role(&self) -> Result<Role> {
        match self.role_source {
            RoleSource::Flag | RoleSource::Env => Ok(self.role),
            RoleSource::Session | RoleSource::Config => self.config.session.role(),
        }
    }

    /// Hand the resolved state to the terminal UI.
    pub fn into_launch(self) -> LaunchOptions {
        let role = match self.role_source {
            RoleSource::Config => None,
            _ => Some(self.role),
        };
        LaunchOptions {
            config: self.config,
            state_dir: self.state_dir,
            session: self.session,
            role,
        }
    }
}
