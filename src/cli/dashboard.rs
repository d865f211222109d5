//! pms dashboard

use crate::api::DataSource;
use crate::dashboard::{format_won_millions, DashboardView, PROJECT_CODE, PROJECT_TITLE};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::role::View;

use super::Context;

#[derive(serde::Serialize)]
struct DashboardReport {
    project: &'static str,
    code: &'static str,
    #[serde(flatten)]
    view: DashboardView,
    source: DataSource,
}

pub async fn run(ctx: &mut Context) -> Result<()> {
    ctx.require_view(View::Dashboard)?;
    let role = ctx.role;

    let client = ctx.client().await?;
    let stats = client.dashboard_stats().await;
    let activities = client.activities().await;
    let source = if stats.source.is_mock() || activities.source.is_mock() {
        DataSource::Mock
    } else {
        DataSource::Live
    };
    let view = DashboardView::for_role(role, &stats.value, activities.value);

    let mut human = HumanOutput::new(format!("{PROJECT_TITLE} ({PROJECT_CODE})"));
    let cards = &view.cards;
    human.push_summary("overall progress", format!("{}%", cards.overall_progress));
    if let Some(budget) = &cards.budget {
        human.push_summary(
            "budget",
            format!(
                "{}% ({} of {})",
                budget.usage,
                format_won_millions(budget.used),
                format_won_millions(budget.total)
            ),
        );
    }
    human.push_summary(
        "active issues",
        format!("{} ({} high priority)", cards.active_issues, cards.high_priority_issues),
    );
    human.push_summary(
        "tasks",
        format!("{}/{} completed", cards.completed_tasks, cards.total_tasks),
    );

    if let Some(charts) = &view.charts {
        human.push_section(
            "Phase progress (planned / actual)",
            charts
                .phases
                .iter()
                .map(|p| format!("{:<22} {:>3}% / {:>3}%", p.phase, p.planned, p.actual))
                .collect(),
        );
        human.push_section(
            "Sprint velocity (actual / planned)",
            charts
                .velocity
                .iter()
                .map(|v| format!("{:<10} {:>3} / {:>3}", v.sprint, v.velocity, v.planned))
                .collect(),
        );
        human.push_summary("sprint progress", format!("{}%", charts.sprint_progress));
        human.push_summary(
            "sprint goal probability",
            format!("{}%", charts.sprint_goal_probability),
        );
    }

    human.push_section(
        "AI insights",
        view.insights
            .iter()
            .map(|insight| format!("{}: {}", insight.title, insight.body))
            .collect(),
    );
    human.push_section(
        "Recent activity",
        view.activities
            .iter()
            .map(|a| format!("{} {} ({})", a.user, a.action, a.time))
            .collect(),
    );
    if view.read_only {
        human.push_detail("read-only view");
    }
    human.note_source(source);

    emit_success(
        ctx.output,
        "dashboard",
        &DashboardReport {
            project: PROJECT_TITLE,
            code: PROJECT_CODE,
            view,
            source,
        },
        Some(&human),
    )
}
