//! Role-based visibility gate.
//!
//! A static table maps each of the eight project roles to the views it may
//! open, and [`Capabilities`] answers the finer questions the screens ask
//! (can this role see budget figures, edit the board, chat with the
//! assistant). Gating is advisory: it decides what is rendered and which
//! commands are refused, it does not protect the underlying data.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Sponsor,
    PmoHead,
    Pm,
    Developer,
    Qa,
    BusinessAnalyst,
    Auditor,
    Admin,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Sponsor,
        Role::PmoHead,
        Role::Pm,
        Role::Developer,
        Role::Qa,
        Role::BusinessAnalyst,
        Role::Auditor,
        Role::Admin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Sponsor => "sponsor",
            Role::PmoHead => "pmo_head",
            Role::Pm => "pm",
            Role::Developer => "developer",
            Role::Qa => "qa",
            Role::BusinessAnalyst => "business_analyst",
            Role::Auditor => "auditor",
            Role::Admin => "admin",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Role::Sponsor => "Project Sponsor",
            Role::PmoHead => "PMO Head",
            Role::Pm => "Project Manager",
            Role::Developer => "Development Team",
            Role::Qa => "QA Team",
            Role::BusinessAnalyst => "Business Analyst",
            Role::Auditor => "External Auditor",
            Role::Admin => "System Admin",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Role::Sponsor => "Final decisions, budget approval, business goals",
            Role::PmoHead => "Portfolio management across projects, runs the PMO",
            Role::Pm => "Plans, executes, controls and closes the project",
            Role::Developer => "Implements user stories, unit tests, code",
            Role::Qa => "Designs test cases, runs integration and system tests",
            Role::BusinessAnalyst => "Defines business requirements, validates PoC results",
            Role::Auditor => "Third-party review of progress and deliverables",
            Role::Admin => "Operates the system, manages accounts and permissions",
        }
    }

    /// Number of people holding the role in the sample organisation.
    pub fn user_count(self) -> u32 {
        match self {
            Role::Sponsor => 2,
            Role::PmoHead => 1,
            Role::Pm => 3,
            Role::Developer => 12,
            Role::Qa => 4,
            Role::BusinessAnalyst => 5,
            Role::Auditor => 2,
            Role::Admin => 2,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| Error::UnknownRole(s.trim().to_string()))
    }
}

/// Screens reachable from the sidebar, in sidebar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Dashboard,
    Phases,
    Kanban,
    Backlog,
    Roles,
    Settings,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Dashboard,
        View::Phases,
        View::Kanban,
        View::Backlog,
        View::Roles,
        View::Settings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            View::Dashboard => "dashboard",
            View::Phases => "phases",
            View::Kanban => "kanban",
            View::Backlog => "backlog",
            View::Roles => "roles",
            View::Settings => "settings",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            View::Dashboard => "Integrated Dashboard",
            View::Phases => "Phase Management",
            View::Kanban => "Kanban Board",
            View::Backlog => "Backlog",
            View::Roles => "Roles & Permissions",
            View::Settings => "Settings",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        View::ALL
            .into_iter()
            .find(|view| view.as_str() == normalized)
            .ok_or_else(|| Error::UnknownView(s.trim().to_string()))
    }
}

const SPONSOR_MENU: &[View] = &[View::Dashboard, View::Phases, View::Roles, View::Settings];
const FULL_MENU: &[View] = &[
    View::Dashboard,
    View::Phases,
    View::Kanban,
    View::Backlog,
    View::Roles,
    View::Settings,
];
const PM_MENU: &[View] = &[
    View::Dashboard,
    View::Phases,
    View::Kanban,
    View::Backlog,
    View::Settings,
];
const DELIVERY_MENU: &[View] = &[View::Dashboard, View::Kanban, View::Backlog, View::Settings];
const ANALYST_MENU: &[View] = &[View::Dashboard, View::Phases, View::Backlog, View::Settings];

/// Views available to a role, in sidebar order.
pub fn menu_for(role: Role) -> &'static [View] {
    match role {
        Role::Sponsor | Role::Auditor => SPONSOR_MENU,
        Role::PmoHead | Role::Admin => FULL_MENU,
        Role::Pm => PM_MENU,
        Role::Developer | Role::Qa => DELIVERY_MENU,
        Role::BusinessAnalyst => ANALYST_MENU,
    }
}

pub fn can_access(role: Role, view: View) -> bool {
    menu_for(role).contains(&view)
}

/// Refuse a view that is not in the role's menu.
pub fn require_view(role: Role, view: View) -> crate::error::Result<()> {
    if can_access(role, view) {
        Ok(())
    } else {
        Err(Error::access_denied(role, format!("open the {view} view")))
    }
}

/// Per-role display switches used by the individual screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub view_budget: bool,
    pub view_detailed_metrics: bool,
    pub dashboard_read_only: bool,
    pub edit_board: bool,
    pub board_read_only: bool,
    pub use_assistant: bool,
    pub manage_permissions: bool,
    pub manage_backlog: bool,
    pub approve_deliverables: bool,
    pub manage_phases: bool,
}

impl Capabilities {
    pub fn for_role(role: Role) -> Self {
        use Role::*;
        Self {
            view_budget: matches!(role, Sponsor | PmoHead | Pm),
            view_detailed_metrics: role != Auditor,
            dashboard_read_only: matches!(role, Auditor | BusinessAnalyst),
            edit_board: matches!(role, Pm | Developer | Qa),
            board_read_only: matches!(role, Auditor | Sponsor),
            use_assistant: matches!(
                role,
                Sponsor | PmoHead | Pm | Developer | Qa | BusinessAnalyst
            ),
            manage_permissions: role == Admin,
            manage_backlog: matches!(role, PmoHead | Pm | Developer | Qa | BusinessAnalyst),
            approve_deliverables: matches!(role, Sponsor | PmoHead | Pm),
            manage_phases: matches!(role, PmoHead | Pm),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menus_match_role_table() {
        assert_eq!(
            menu_for(Role::Sponsor),
            &[View::Dashboard, View::Phases, View::Roles, View::Settings]
        );
        assert_eq!(menu_for(Role::PmoHead).len(), 6);
        assert_eq!(
            menu_for(Role::Pm),
            &[
                View::Dashboard,
                View::Phases,
                View::Kanban,
                View::Backlog,
                View::Settings
            ]
        );
        assert_eq!(
            menu_for(Role::Developer),
            &[View::Dashboard, View::Kanban, View::Backlog, View::Settings]
        );
        assert_eq!(menu_for(Role::Qa), menu_for(Role::Developer));
        assert_eq!(
            menu_for(Role::BusinessAnalyst),
            &[View::Dashboard, View::Phases, View::Backlog, View::Settings]
        );
        assert_eq!(menu_for(Role::Auditor), menu_for(Role::Sponsor));
        assert_eq!(menu_for(Role::Admin), menu_for(Role::PmoHead));
    }

    #[test]
    fn every_role_gets_dashboard_and_settings() {
        for role in Role::ALL {
            assert!(can_access(role, View::Dashboard), "{role}");
            assert!(can_access(role, View::Settings), "{role}");
        }
    }

    #[test]
    fn require_view_denies_outside_menu() {
        let err = require_view(Role::Developer, View::Roles).expect_err("denied");
        assert_eq!(err.exit_code(), crate::error::exit_codes::ACCESS_DENIED);
        assert!(require_view(Role::Admin, View::Roles).is_ok());
    }

    #[test]
    fn role_parses_wire_and_dashed_names() {
        assert_eq!("pmo_head".parse::<Role>().expect("role"), Role::PmoHead);
        assert_eq!("Business-Analyst".parse::<Role>().expect("role"), Role::BusinessAnalyst);
        assert!(matches!("ceo".parse::<Role>(), Err(Error::UnknownRole(_))));
    }

    #[test]
    fn capabilities_follow_screen_rules() {
        let sponsor = Capabilities::for_role(Role::Sponsor);
        assert!(sponsor.view_budget);
        assert!(sponsor.board_read_only);
        assert!(!sponsor.edit_board);

        let auditor = Capabilities::for_role(Role::Auditor);
        assert!(!auditor.view_budget);
        assert!(!auditor.view_detailed_metrics);
        assert!(auditor.dashboard_read_only);
        assert!(!auditor.use_assistant);

        let admin = Capabilities::for_role(Role::Admin);
        assert!(admin.manage_permissions);
        assert!(!admin.use_assistant);
        assert!(!admin.edit_board);

        let dev = Capabilities::for_role(Role::Developer);
        assert!(dev.edit_board);
        assert!(!dev.manage_phases);
        assert!(!dev.view_budget);
        assert!(!dev.manage_permissions);
    }
}
