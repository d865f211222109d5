//! Command-line interface for pms
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::{Error, Result};

mod backlog;
mod board;
mod chat;
mod context;
mod dashboard;
mod phases;
mod roles;
mod session;
mod status;

pub use context::{Context, GlobalOptions};

/// pms - InsureTech project management console
///
/// Role-gated dashboard, Kanban board, backlog, phases, permissions and AI
/// assistant for the claims review automation project. Works against the
/// PMS REST API and falls back to sample data when it is unreachable.
#[derive(Parser, Debug)]
#[command(name = "pms")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a config file (defaults to <home>/config.toml, then ./.pms.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// State directory holding the session and user config
    #[arg(long, global = true, env = "PMS_HOME")]
    pub home: Option<PathBuf>,

    /// Act as this role (sponsor, pmo_head, pm, developer, qa, business_analyst, auditor, admin)
    #[arg(long, global = true)]
    pub role: Option<String>,

    /// Backend base URL, e.g. http://localhost:3001/api
    #[arg(long, global = true, env = "PMS_API_URL")]
    pub api_url: Option<String>,

    /// Skip the backend and use sample data
    #[arg(long, global = true)]
    pub offline: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and remember the session
    Login {
        /// Account email
        #[arg(required_unless_present = "demo")]
        email: Option<String>,

        /// Account password
        #[arg(long, env = "PMS_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Log in as the demo account of a role
        #[arg(long, conflicts_with = "email")]
        demo: Option<String>,
    },

    /// Forget the saved session
    Logout,

    /// Show the current user and role
    Whoami,

    /// List the views the current role can open
    Menu,

    /// Show backend connectivity and session state
    Status,

    /// Show the integrated dashboard
    Dashboard,

    /// Kanban board
    #[command(subcommand)]
    Board(BoardCommands),

    /// Product backlog
    #[command(subcommand)]
    Backlog(BacklogCommands),

    /// Project phases, deliverables and KPIs
    #[command(subcommand)]
    Phases(PhasesCommands),

    /// List project roles and their menus
    Roles,

    /// Role permission matrix
    #[command(subcommand)]
    Permissions(PermissionsCommands),

    /// Ask the AI assistant
    Chat {
        /// Message text
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Open the terminal dashboard
    Ui,
}

/// Board subcommands
#[derive(Subcommand, Debug)]
pub enum BoardCommands {
    /// Show columns and cards
    Show {
        /// Only show this column
        #[arg(long)]
        column: Option<String>,
    },

    /// Move a card to another column
    Move {
        /// Task id
        id: u64,

        /// Target column id (backlog, sprint, inProgress, review, testing, done)
        column: String,
    },

    /// Add a card to the backlog column
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        assignee: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: String,

        /// Priority: high, medium, low
        #[arg(long)]
        priority: Option<String>,

        /// Story points (default 5)
        #[arg(long)]
        points: Option<u32>,

        /// Comma separated labels
        #[arg(long, default_value = "")]
        labels: String,

        /// Mark as urgent firefighting work
        #[arg(long)]
        urgent: bool,
    },

    /// Edit a card
    Edit {
        /// Task id
        id: u64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        assignee: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        #[arg(long)]
        priority: Option<String>,

        #[arg(long)]
        points: Option<u32>,

        /// Comma separated labels (replaces existing)
        #[arg(long)]
        labels: Option<String>,

        /// Set or clear the urgent flag
        #[arg(long)]
        urgent: Option<bool>,
    },

    /// Delete a card
    Rm {
        /// Task id
        id: u64,
    },

    /// Task counts and story points per column
    Stats,
}

/// Backlog subcommands
#[derive(Subcommand, Debug)]
pub enum BacklogCommands {
    /// List stories in rank order
    List {
        /// Filter by status: backlog, selected, in_sprint, completed
        #[arg(long)]
        status: Option<String>,

        /// Filter by epic
        #[arg(long)]
        epic: Option<String>,
    },

    /// List epics
    Epics,

    /// Add a story at the bottom of the backlog
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        epic: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long)]
        priority: Option<String>,

        #[arg(long)]
        points: Option<u32>,

        /// Acceptance criterion (repeatable)
        #[arg(long = "criterion")]
        criteria: Vec<String>,
    },

    /// Move a story one rank up
    Up {
        /// Story id
        id: u64,
    },

    /// Move a story one rank down
    Down {
        /// Story id
        id: u64,
    },
}

/// Phase subcommands
#[derive(Subcommand, Debug)]
pub enum PhasesCommands {
    /// List phases with progress
    List,

    /// Show one phase with deliverables and KPIs
    Show {
        /// Phase id
        id: u32,
    },

    /// Set phase progress (0-100)
    Progress {
        /// Phase id
        id: u32,

        /// Progress percentage; values outside 0-100 are clamped
        #[arg(allow_negative_numbers = true)]
        percent: i64,
    },

    /// Approve or reject a deliverable
    Approve {
        /// Deliverable id
        id: String,

        /// Reject instead of approve
        #[arg(long)]
        reject: bool,
    },

    /// Add a KPI to a phase
    KpiAdd {
        /// Phase id
        phase: u32,

        #[arg(long)]
        name: String,

        #[arg(long)]
        target: String,

        #[arg(long, default_value = "")]
        current: String,

        /// achieved, on_track, at_risk
        #[arg(long)]
        status: Option<String>,
    },

    /// Update a KPI
    KpiSet {
        /// Phase id
        phase: u32,

        /// KPI id
        kpi: String,

        #[arg(long, default_value = "")]
        name: String,

        #[arg(long, default_value = "")]
        target: String,

        #[arg(long, default_value = "")]
        current: String,

        #[arg(long)]
        status: Option<String>,
    },

    /// Remove a KPI
    KpiRm {
        /// Phase id
        phase: u32,

        /// KPI id
        kpi: String,
    },
}

/// Permission subcommands
#[derive(Subcommand, Debug)]
pub enum PermissionsCommands {
    /// Show the matrix, optionally for one role
    Show {
        /// Only show grants of this role
        #[arg(long = "for")]
        for_role: Option<String>,
    },

    /// Flip one grant (admin only)
    Toggle {
        /// Role whose grant changes
        #[arg(value_name = "ROLE")]
        target: String,

        /// Permission id, e.g. manage_wbs
        permission: String,
    },
}

impl Cli {
    fn globals(&self) -> GlobalOptions {
        GlobalOptions {
            config: self.config.clone(),
            home: self.home.clone(),
            role: self.role.clone(),
            api_url: self.api_url.clone(),
            offline: self.offline,
            json: self.json,
            quiet: self.quiet,
        }
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let ctx = Context::new(self.globals())?;

        if let Commands::Ui = self.command {
            return crate::ui::console::run(ctx.into_launch());
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| Error::OperationFailed(format!("failed to start runtime: {err}")))?;
        runtime.block_on(dispatch(ctx, self.command))
    }
}

async fn dispatch(mut ctx: Context, command: Commands) -> Result<()> {
    match command {
        Commands::Login {
            email,
            password,
            demo,
        } => {
            session::run_login(
                &mut ctx,
                session::LoginOptions {
                    email,
                    password,
                    demo,
                },
            )
            .await
        }
        Commands::Logout => session::run_logout(&mut ctx),
        Commands::Whoami => session::run_whoami(&ctx),
        Commands::Menu => roles::run_menu(&ctx),
        Commands::Status => status::run(&mut ctx).await,
        Commands::Dashboard => dashboard::run(&mut ctx).await,
        Commands::Board(cmd) => match cmd {
            BoardCommands::Show { column } => board::run_show(&mut ctx, column).await,
            BoardCommands::Move { id, column } => board::run_move(&mut ctx, id, column).await,
            BoardCommands::Add {
                title,
                assignee,
                due,
                priority,
                points,
                labels,
                urgent,
            } => {
                board::run_add(
                    &mut ctx,
                    board::AddOptions {
                        title,
                        assignee,
                        due,
                        priority,
                        points,
                        labels,
                        urgent,
                    },
                )
                .await
            }
            BoardCommands::Edit {
                id,
                title,
                assignee,
                due,
                priority,
                points,
                labels,
                urgent,
            } => {
                board::run_edit(
                    &mut ctx,
                    board::EditOptions {
                        id,
                        title,
                        assignee,
                        due,
                        priority,
                        points,
                        labels,
                        urgent,
                    },
                )
                .await
            }
            BoardCommands::Rm { id } => board::run_rm(&mut ctx, id).await,
            BoardCommands::Stats => board::run_stats(&mut ctx).await,
        },
        Commands::Backlog(cmd) => match cmd {
            BacklogCommands::List { status, epic } => {
                backlog::run_list(&mut ctx, status, epic).await
            }
            BacklogCommands::Epics => backlog::run_epics(&mut ctx).await,
            BacklogCommands::Add {
                title,
                epic,
                description,
                priority,
                points,
                criteria,
            } => {
                backlog::run_add(
                    &mut ctx,
                    backlog::AddOptions {
                        title,
                        epic,
                        description,
                        priority,
                        points,
                        criteria,
                    },
                )
                .await
            }
            BacklogCommands::Up { id } => {
                backlog::run_move(&mut ctx, id, crate::backlog::Direction::Up).await
            }
            BacklogCommands::Down { id } => {
                backlog::run_move(&mut ctx, id, crate::backlog::Direction::Down).await
            }
        },
        Commands::Phases(cmd) => match cmd {
            PhasesCommands::List => phases::run_list(&mut ctx).await,
            PhasesCommands::Show { id } => phases::run_show(&mut ctx, id).await,
            PhasesCommands::Progress { id, percent } => {
                phases::run_progress(&mut ctx, id, percent).await
            }
            PhasesCommands::Approve { id, reject } => {
                phases::run_approve(&mut ctx, id, !reject).await
            }
            PhasesCommands::KpiAdd {
                phase,
                name,
                target,
                current,
                status,
            } => {
                phases::run_kpi_add(
                    &mut ctx,
                    phase,
                    phases::KpiOptions {
                        name,
                        target,
                        current,
                        status,
                    },
                )
                .await
            }
            PhasesCommands::KpiSet {
                phase,
                kpi,
                name,
                target,
                current,
                status,
            } => {
                phases::run_kpi_set(
                    &mut ctx,
                    phase,
                    kpi,
                    phases::KpiOptions {
                        name,
                        target,
                        current,
                        status,
                    },
                )
                .await
            }
            PhasesCommands::KpiRm { phase, kpi } => phases::run_kpi_rm(&mut ctx, phase, kpi).await,
        },
        Commands::Roles => roles::run_roles(&ctx),
        Commands::Permissions(cmd) => match cmd {
            PermissionsCommands::Show { for_role } => {
                roles::run_permissions_show(&mut ctx, for_role).await
            }
            PermissionsCommands::Toggle { target, permission } => {
                roles::run_permissions_toggle(&mut ctx, target, permission).await
            }
        },
        Commands::Chat { message } => chat::run(&mut ctx, message.join(" ")).await,
        Commands::Ui => Err(Error::OperationFailed(
            "the terminal UI cannot run inside the command runtime".to_string(),
        )),
    }
}
