//! Sample datasets served when the backend is unavailable.

use crate::backlog::Backlog;
use crate::board::Board;
use crate::dashboard::{self, Activity, DashboardStats};
use crate::permission::PermissionMatrix;
use crate::phase::PhasePlan;

pub fn dashboard_stats() -> DashboardStats {
    DashboardStats::sample()
}

pub fn activities() -> Vec<Activity> {
    dashboard::sample_activities()
}

pub fn phases() -> PhasePlan {
    PhasePlan::sample()
}

pub fn board() -> Board {
    Board::sample()
}

pub fn backlog() -> Backlog {
    Backlog::sample()
}

pub fn permissions() -> PermissionMatrix {
    PermissionMatrix::sample()
}

/// Session id for a conversation that never reached the backend.
pub fn chat_session_id() -> String {
    format!("local-{}", uuid::Uuid::new_v4())
}

/// Everything one screen session works on, loaded in one go.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    pub stats: DashboardStats,
    pub activities: Vec<Activity>,
    pub phases: PhasePlan,
    pub board: Board,
    pub backlog: Backlog,
    pub permissions: PermissionMatrix,
}

impl Workspace {
    pub fn sample() -> Self {
        Self {
            stats: dashboard_stats(),
            activities: activities(),
            phases: phases(),
            board: board(),
            backlog: backlog(),
            permissions: permissions(),
        }
    }
}
