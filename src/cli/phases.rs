//! pms phases command implementation
//!
//! Lists the six project phases and edits progress, deliverable approval and
//! KPIs. Every edit is validated against the fetched plan before it is sent.

use crate::api::DataSource;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::phase::{self, Deliverable, Kpi, KpiInput, KpiStatus, Phase, PhaseStatus};
use crate::role::View;

use super::Context;

/// Options for `pms phases kpi-add` and `kpi-set`
pub struct KpiOptions {
    pub name: String,
    pub target: String,
    pub current: String,
    pub status: Option<String>,
}

impl KpiOptions {
    fn into_input(self) -> Result<KpiInput> {
        let status: Option<KpiStatus> = self.status.as_deref().map(str::parse).transpose()?;
        Ok(KpiInput {
            name: self.name,
            target: self.target,
            current: self.current,
            status,
        })
    }
}

#[derive(serde::Serialize)]
struct ListReport<'a> {
    overall_progress: u8,
    phases: &'a [Phase],
    source: DataSource,
}

#[derive(serde::Serialize)]
struct ShowReport<'a> {
    phase: &'a Phase,
    deliverables: Vec<Deliverable>,
    kpis: Vec<Kpi>,
    source: DataSource,
}

#[derive(serde::Serialize)]
struct ProgressReport {
    phase_id: u32,
    progress: u8,
    status: PhaseStatus,
    source: DataSource,
}

#[derive(serde::Serialize)]
struct DeliverableReport {
    phase_id: u32,
    deliverable: Deliverable,
    source: DataSource,
}

#[derive(serde::Serialize)]
struct KpiReport {
    phase_id: u32,
    kpi: Kpi,
    source: DataSource,
}

pub async fn run_list(ctx: &mut Context) -> Result<()> {
    ctx.require_view(View::Phases)?;
    let fetched = ctx.client().await?.phases().await;
    let plan = &fetched.value;

    let mut human = HumanOutput::new("Project phases");
    human.push_summary("overall progress", format!("{}%", plan.overall_progress()));
    human.push_section("Phases", plan.phases().iter().map(phase_line).collect());
    human.note_source(fetched.source);
    human.push_next_step("pms phases show <id>");

    emit_success(
        ctx.output,
        "phases list",
        &ListReport {
            overall_progress: plan.overall_progress(),
            phases: plan.phases(),
            source: fetched.source,
        },
        Some(&human),
    )
}

pub async fn run_show(ctx: &mut Context, id: u32) -> Result<()> {
    ctx.require_view(View::Phases)?;

    let client = ctx.client().await?;
    let plan = client.phases().await;
    let phase = plan.value.get(id).ok_or(Error::PhaseNotFound(id))?;
    let deliverables = client.phase_deliverables(id).await;
    let kpis = client.phase_kpis(id).await;
    let source = if plan.source.is_mock() || deliverables.source.is_mock() || kpis.source.is_mock()
    {
        DataSource::Mock
    } else {
        DataSource::Live
    };

    let mut human = HumanOutput::new(format!("Phase {}: {}", phase.id, phase.name));
    if !phase.description.is_empty() {
        human.push_summary("description", phase.description.clone());
    }
    human.push_summary("status", phase.status.as_str());
    human.push_summary("progress", format!("{}%", phase.progress));
    human.push_summary("schedule", format!("{} to {}", phase.start_date, phase.end_date));
    human.push_section(
        "Deliverables",
        deliverables
            .value
            .iter()
            .map(|d| format!("{:<6} {} ({}) [{}]", d.id, d.name, d.kind, d.status.as_str()))
            .collect(),
    );
    human.push_section(
        "KPIs",
        kpis.value
            .iter()
            .map(|k| {
                let current = if k.current.is_empty() { "-" } else { k.current.as_str() };
                format!(
                    "{:<6} {}: {} / target {} [{}]",
                    k.id,
                    k.name,
                    current,
                    k.target,
                    k.status.as_str()
                )
            })
            .collect(),
    );
    human.note_source(source);

    emit_success(
        ctx.output,
        "phases show",
        &ShowReport {
            phase,
            deliverables: deliverables.value,
            kpis: kpis.value,
            source,
        },
        Some(&human),
    )
}

pub async fn run_progress(ctx: &mut Context, id: u32, percent: i64) -> Result<()> {
    ctx.require_view(View::Phases)?;
    phase::require_manage(ctx.role)?;

    let client = ctx.client().await?;
    let mut plan = client.phases().await.value;
    let update = plan.set_progress(id, percent)?;
    let fetched = client.update_phase(id, update).await;

    let mut human = HumanOutput::new(format!("Phase {id} progress set to {}%", fetched.value.progress));
    human.push_summary("status", fetched.value.status.as_str());
    human.push_summary("overall progress", format!("{}%", plan.overall_progress()));
    if i64::from(fetched.value.progress) != percent {
        human.push_warning(format!("{percent} is outside 0-100 and was clamped"));
    }
    human.note_source(fetched.source);

    emit_success(
        ctx.output,
        "phases progress",
        &ProgressReport {
            phase_id: id,
            progress: fetched.value.progress,
            status: fetched.value.status,
            source: fetched.source,
        },
        Some(&human),
    )
}

pub async fn run_approve(ctx: &mut Context, id: String, approved: bool) -> Result<()> {
    ctx.require_view(View::Phases)?;
    phase::require_approve(ctx.role)?;

    let client = ctx.client().await?;
    let mut plan = client.phases().await.value;
    let phase_id = plan
        .find_deliverable(&id)
        .map(|(phase_id, _)| phase_id)
        .ok_or_else(|| Error::DeliverableNotFound(id.clone()))?;
    let updated = plan.approve_deliverable(&id, approved)?;
    let fetched = client.approve_deliverable(updated, approved).await;

    let verb = if approved { "Approved" } else { "Rejected" };
    let mut human = HumanOutput::new(format!("{verb} {} ({})", fetched.value.name, fetched.value.id));
    human.push_summary("phase", phase_id.to_string());
    human.push_summary("status", fetched.value.status.as_str());
    human.note_source(fetched.source);

    emit_success(
        ctx.output,
        "phases approve",
        &DeliverableReport {
            phase_id,
            deliverable: fetched.value,
            source: fetched.source,
        },
        Some(&human),
    )
}

pub async fn run_kpi_add(ctx: &mut Context, phase_id: u32, options: KpiOptions) -> Result<()> {
    ctx.require_view(View::Phases)?;
    phase::require_manage(ctx.role)?;
    let input = options.into_input()?;

    let client = ctx.client().await?;
    let plan = client.phases().await.value;
    let kpi = plan.build_kpi(phase_id, input)?;
    let fetched = client.create_kpi(phase_id, kpi).await;

    let mut human = HumanOutput::new(format!("Added KPI {} to phase {phase_id}", fetched.value.id));
    human.push_summary("kpi", kpi_summary(&fetched.value));
    human.note_source(fetched.source);

    emit_success(
        ctx.output,
        "phases kpi-add",
        &KpiReport {
            phase_id,
            kpi: fetched.value,
            source: fetched.source,
        },
        Some(&human),
    )
}

pub async fn run_kpi_set(
    ctx: &mut Context,
    phase_id: u32,
    kpi_id: String,
    options: KpiOptions,
) -> Result<()> {
    ctx.require_view(View::Phases)?;
    phase::require_manage(ctx.role)?;
    let input = options.into_input()?;

    let client = ctx.client().await?;
    let mut plan = client.phases().await.value;
    let kpi = plan.update_kpi(phase_id, &kpi_id, input)?;
    let fetched = client.update_kpi(phase_id, kpi).await;

    let mut human = HumanOutput::new(format!("Updated KPI {}", fetched.value.id));
    human.push_summary("kpi", kpi_summary(&fetched.value));
    human.note_source(fetched.source);

    emit_success(
        ctx.output,
        "phases kpi-set",
        &KpiReport {
            phase_id,
            kpi: fetched.value,
            source: fetched.source,
        },
        Some(&human),
    )
}

pub async fn run_kpi_rm(ctx: &mut Context, phase_id: u32, kpi_id: String) -> Result<()> {
    ctx.require_view(View::Phases)?;
    phase::require_manage(ctx.role)?;

    let client = ctx.client().await?;
    let mut plan = client.phases().await.value;
    let kpi = plan.delete_kpi(phase_id, &kpi_id)?;
    let fetched = client.delete_kpi(phase_id, &kpi.id).await;

    let mut human = HumanOutput::new(format!("Removed KPI {} ({})", kpi.id, kpi.name));
    human.push_detail(fetched.value.message);
    human.note_source(fetched.source);

    emit_success(
        ctx.output,
        "phases kpi-rm",
        &KpiReport {
            phase_id,
            kpi,
            source: fetched.source,
        },
        Some(&human),
    )
}

fn phase_line(phase: &Phase) -> String {
    format!(
        "{}. {:<34} {:<11} {:>3}%  {} to {}",
        phase.id,
        phase.name,
        phase.status.as_str(),
        phase.progress,
        phase.start_date,
        phase.end_date
    )
}

fn kpi_summary(kpi: &Kpi) -> String {
    format!(
        "{}: {} / target {} [{}]",
        kpi.name,
        if kpi.current.is_empty() { "-" } else { kpi.current.as_str() },
        kpi.target,
        kpi.status.as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kpi_options_parse_status() {
        let input = KpiOptions {
            name: "Accuracy".to_string(),
            target: "95%".to_string(),
            current: String::new(),
            status: Some("at-risk".to_string()),
        }
        .into_input()
        .expect("input");
        assert_eq!(input.status, Some(KpiStatus::AtRisk));

        let bad = KpiOptions {
            name: "Accuracy".to_string(),
            target: "95%".to_string(),
            current: String::new(),
            status: Some("late".to_string()),
        };
        assert!(matches!(bad.into_input(), Err(Error::InvalidArgument(_))));
    }
}
