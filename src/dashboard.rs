//! Integrated dashboard: KPI cards, progress charts, AI insights and the
//! recent activity feed, filtered by what the viewing role may see.

use serde::{Deserialize, Serialize};

use crate::role::{Capabilities, Role};

pub const PROJECT_TITLE: &str = "AI-based non-life insurance claims review automation";
pub const PROJECT_CODE: &str = "INS-AI-2025-001";

/// Figures behind the KPI cards. Budget amounts are in millions of won.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub overall_progress: u32,
    pub budget_usage: u32,
    pub budget_total: u64,
    pub budget_used: u64,
    pub active_issues: u32,
    pub high_priority_issues: u32,
    pub completed_tasks: u32,
    pub total_tasks: u32,
}

impl DashboardStats {
    pub fn sample() -> Self {
        Self {
            overall_progress: 62,
            budget_usage: 58,
            budget_total: 1000,
            budget_used: 580,
            active_issues: 7,
            high_priority_issues: 3,
            completed_tasks: 142,
            total_tasks: 230,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Success,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub user: String,
    pub action: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
}

pub fn sample_activities() -> Vec<Activity> {
    let activity = |user: &str, action: &str, time: &str, kind| Activity {
        user: user.to_string(),
        action: action.to_string(),
        time: time.to_string(),
        kind,
    };
    vec![
        activity("Minsu Park", "finished the OCR model v2.1 performance test", "5 min ago", ActivityKind::Success),
        activity("Younghee Lee", "requested approval of the de-identification document", "1 hour ago", ActivityKind::Info),
        activity("AI Assistant", "sent a schedule delay risk alert", "2 hours ago", ActivityKind::Warning),
        activity("Chulsoo Kim", "posted the Sprint 5 retrospective notes", "3 hours ago", ActivityKind::Info),
        activity("Jihoon Choi", "resolved urgent issue #47", "5 hours ago", ActivityKind::Success),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseProgress {
    pub phase: String,
    pub planned: u32,
    pub actual: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SprintVelocity {
    pub sprint: String,
    pub velocity: u32,
    pub planned: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BurndownPoint {
    pub day: String,
    pub remaining: u32,
    pub ideal: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charts {
    pub phases: Vec<PhaseProgress>,
    pub velocity: Vec<SprintVelocity>,
    pub burndown: Vec<BurndownPoint>,
    /// Share of the sprint's planned points already burned.
    pub sprint_progress: u32,
    pub sprint_goal_probability: u32,
}

impl Charts {
    pub fn sample() -> Self {
        let actuals = [100, 100, 85, 0, 0, 0];
        let velocity = [(32, 35), (38, 35), (35, 35), (42, 40), (40, 40)];
        let remaining = [120, 110, 95, 85, 70, 55, 42, 28, 15, 8];
        let ideal = [120, 105, 90, 75, 60, 45, 30, 15, 0, 0];

        Self {
            phases: actuals
                .iter()
                .enumerate()
                .map(|(idx, actual)| PhaseProgress {
                    phase: format!("Phase {}", idx + 1),
                    planned: 100,
                    actual: *actual,
                })
                .collect(),
            velocity: velocity
                .iter()
                .enumerate()
                .map(|(idx, (velocity, planned))| SprintVelocity {
                    sprint: format!("Sprint {}", idx + 1),
                    velocity: *velocity,
                    planned: *planned,
                })
                .collect(),
            burndown: remaining
                .iter()
                .zip(ideal.iter())
                .enumerate()
                .map(|(idx, (remaining, ideal))| BurndownPoint {
                    day: format!("Day {}", idx + 1),
                    remaining: *remaining,
                    ideal: *ideal,
                })
                .collect(),
            sprint_progress: 93,
            sprint_goal_probability: 85,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Risk,
    Achievement,
    Recommendation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub body: String,
}

pub fn sample_insights() -> Vec<Insight> {
    vec![
        Insight {
            kind: InsightKind::Risk,
            title: "Risk detected".to_string(),
            body: "75% chance the OCR model misses its accuracy target. Recognition drops on diagnosis forms from specific hospitals.".to_string(),
        },
        Insight {
            kind: InsightKind::Achievement,
            title: "Weekly achievement".to_string(),
            body: "Data preprocessing reached 95% completion. Training infrastructure optimisation finished.".to_string(),
        },
        Insight {
            kind: InsightKind::Recommendation,
            title: "Recommendation".to_string(),
            body: "Prioritise data augmentation in the next sprint.".to_string(),
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetCard {
    pub usage: u32,
    pub used: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCards {
    pub overall_progress: u32,
    /// `None` when the role may not see budget figures.
    pub budget: Option<BudgetCard>,
    pub active_issues: u32,
    pub high_priority_issues: u32,
    pub completed_tasks: u32,
    pub total_tasks: u32,
}

/// Everything the dashboard screen renders for one role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub role: Role,
    pub read_only: bool,
    pub cards: KpiCards,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charts: Option<Charts>,
    pub insights: Vec<Insight>,
    pub activities: Vec<Activity>,
}

impl DashboardView {
    pub fn for_role(role: Role, stats: &DashboardStats, activities: Vec<Activity>) -> Self {
        let caps = Capabilities::for_role(role);
        let budget = caps.view_budget.then(|| BudgetCard {
            usage: stats.budget_usage,
            used: stats.budget_used,
            total: stats.budget_total,
        });
        Self {
            role,
            read_only: caps.dashboard_read_only,
            cards: KpiCards {
                overall_progress: stats.overall_progress,
                budget,
                active_issues: stats.active_issues,
                high_priority_issues: stats.high_priority_issues,
                completed_tasks: stats.completed_tasks,
                total_tasks: stats.total_tasks,
            },
            charts: caps.view_detailed_metrics.then(Charts::sample),
            insights: sample_insights(),
            activities,
        }
    }
}

/// Format an amount in millions of won, e.g. `₩1,000M`.
pub fn format_won_millions(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::new();
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("₩{out}M")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_hidden_without_budget_rights() {
        let stats = DashboardStats::sample();
        let sponsor = DashboardView::for_role(Role::Sponsor, &stats, sample_activities());
        assert_eq!(
            sponsor.cards.budget,
            Some(BudgetCard {
                usage: 58,
                used: 580,
                total: 1000
            })
        );
        let dev = DashboardView::for_role(Role::Developer, &stats, sample_activities());
        assert!(dev.cards.budget.is_none());
        assert!(!dev.read_only);
    }

    #[test]
    fn auditor_is_read_only_without_charts() {
        let view = DashboardView::for_role(
            Role::Auditor,
            &DashboardStats::sample(),
            sample_activities(),
        );
        assert!(view.read_only);
        assert!(view.charts.is_none());
        assert_eq!(view.activities.len(), 5);

        let json = serde_json::to_value(&view).expect("json");
        assert!(json.get("charts").is_none());
        assert!(json["cards"]["budget"].is_null());
    }

    #[test]
    fn chart_series_shapes() {
        let charts = Charts::sample();
        assert_eq!(charts.phases.len(), 6);
        assert_eq!(charts.phases[2].actual, 85);
        assert_eq!(charts.velocity.len(), 5);
        assert_eq!(charts.velocity[3].velocity, 42);
        assert_eq!(charts.burndown.len(), 10);
        assert_eq!(charts.burndown[9].remaining, 8);
        assert_eq!(charts.burndown[9].ideal, 0);
    }

    #[test]
    fn won_formatting() {
        assert_eq!(format_won_millions(580), "₩580M");
        assert_eq!(format_won_millions(1000), "₩1,000M");
        assert_eq!(format_won_millions(1234567), "₩1,234,567M");
    }

    #[test]
    fn activity_wire_format() {
        let raw = r#"{"user":"A","action":"did","time":"now","type":"warning"}"#;
        let activity: Activity = serde_json::from_str(raw).expect("parse");
        assert_eq!(activity.kind, ActivityKind::Warning);
    }
}
