//! Waterfall phases with their deliverables and KPIs.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::role::{Capabilities, Role};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl PhaseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PhaseStatus::Pending => "pending",
            PhaseStatus::InProgress => "in_progress",
            PhaseStatus::Completed => "completed",
        }
    }

    /// 0 is pending, 100 is completed, anything between is in progress.
    pub fn from_progress(progress: u8) -> Self {
        match progress {
            0 => PhaseStatus::Pending,
            p if p >= 100 => PhaseStatus::Completed,
            _ => PhaseStatus::InProgress,
        }
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverableStatus {
    #[default]
    Pending,
    InReview,
    Approved,
    Rejected,
}

impl DeliverableStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliverableStatus::Pending => "pending",
            DeliverableStatus::InReview => "in_review",
            DeliverableStatus::Approved => "approved",
            DeliverableStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for DeliverableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiStatus {
    Achieved,
    #[default]
    OnTrack,
    AtRisk,
}

impl KpiStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            KpiStatus::Achieved => "achieved",
            KpiStatus::OnTrack => "on_track",
            KpiStatus::AtRisk => "at_risk",
        }
    }
}

impl fmt::Display for KpiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KpiStatus {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "achieved" => Ok(KpiStatus::Achieved),
            "on_track" | "ontrack" => Ok(KpiStatus::OnTrack),
            "at_risk" | "risk" => Ok(KpiStatus::AtRisk),
            other => Err(Error::InvalidArgument(format!(
                "invalid KPI status '{other}': must be achieved, on_track, or at_risk"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deliverable {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub status: DeliverableStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kpi {
    pub id: String,
    pub name: String,
    pub target: String,
    #[serde(default)]
    pub current: String,
    #[serde(default)]
    pub status: KpiStatus,
}

#[derive(Debug, Clone, Default)]
pub struct KpiInput {
    pub name: String,
    pub target: String,
    pub current: String,
    pub status: Option<KpiStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: PhaseStatus,
    #[serde(default)]
    pub progress: u8,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub deliverables: Vec<Deliverable>,
    #[serde(default)]
    pub kpis: Vec<Kpi>,
}

impl Phase {
    pub fn deliverable(&self, id: &str) -> Option<&Deliverable> {
        self.deliverables.iter().find(|d| d.id == id)
    }

    pub fn kpi(&self, id: &str) -> Option<&Kpi> {
        self.kpis.iter().find(|kpi| kpi.id == id)
    }
}

/// Body of `PUT /phases/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseUpdate {
    pub progress: u8,
    pub status: PhaseStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhasePlan {
    phases: Vec<Phase>,
}

impl PhasePlan {
    pub fn new(phases: Vec<Phase>) -> Self {
        Self { phases }
    }

    pub fn sample() -> Self {
        let date = |y: i32, m: u32, d: u32| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        let deliverable = |id: &str, name: &str, kind: &str, status: DeliverableStatus| Deliverable {
            id: id.to_string(),
            name: name.to_string(),
            kind: kind.to_string(),
            status,
        };
        let kpi = |id: &str, name: &str, target: &str, current: &str, status: KpiStatus| Kpi {
            id: id.to_string(),
            name: name.to_string(),
            target: target.to_string(),
            current: current.to_string(),
            status,
        };
        use DeliverableStatus as D;
        use KpiStatus as K;

        let phase = |id: u32,
                     name: &str,
                     description: &str,
                     progress: u8,
                     start: NaiveDate,
                     end: NaiveDate,
                     deliverables: Vec<Deliverable>,
                     kpis: Vec<Kpi>| Phase {
            id,
            name: name.to_string(),
            description: description.to_string(),
            status: PhaseStatus::from_progress(progress),
            progress,
            start_date: start,
            end_date: end,
            deliverables,
            kpis,
        };

        Self::new(vec![
            phase(
                1,
                "Requirements & Planning",
                "Scope the claims review process and agree the automation targets",
                100,
                date(2025, 1, 6),
                date(2025, 2, 28),
                vec![
                    deliverable("d1-1", "Project charter", "document", D::Approved),
                    deliverable("d1-2", "Requirements specification", "document", D::Approved),
                ],
                vec![kpi("k1-1", "Requirements signed off", "100%", "100%", K::Achieved)],
            ),
            phase(
                2,
                "Data Collection & Preprocessing",
                "Gather and de-identify historical claim documents for training",
                100,
                date(2025, 3, 3),
                date(2025, 4, 30),
                vec![
                    deliverable("d2-1", "Labeled claim dataset", "dataset", D::Approved),
                    deliverable("d2-2", "De-identification report", "document", D::Approved),
                ],
                vec![
                    kpi("k2-1", "Labeled documents", "50,000", "52,340", K::Achieved),
                    kpi("k2-2", "Label agreement", "95%", "96.1%", K::Achieved),
                ],
            ),
            phase(
                3,
                "AI Model Development",
                "Train OCR, classification and clause matching models",
                85,
                date(2025, 5, 1),
                date(2025, 8, 31),
                vec![
                    deliverable("d3-1", "OCR model v2.0", "model", D::Approved),
                    deliverable("d3-2", "Model evaluation report", "document", D::InReview),
                    deliverable("d3-3", "OCR model v2.1", "model", D::Pending),
                ],
                vec![
                    kpi("k3-1", "OCR field accuracy", "95%", "93.5%", K::OnTrack),
                    kpi("k3-2", "Classification accuracy", "90%", "87%", K::AtRisk),
                ],
            ),
            phase(
                4,
                "System Integration",
                "Connect the models to the legacy claims review system",
                0,
                date(2025, 9, 1),
                date(2025, 10, 31),
                vec![deliverable("d4-1", "Interface specification", "document", D::Pending)],
                vec![kpi("k4-1", "API response time", "< 2s", "", K::OnTrack)],
            ),
            phase(
                5,
                "Pilot Operation & Validation",
                "Run the automated review alongside human reviewers",
                0,
                date(2025, 11, 3),
                date(2025, 12, 19),
                vec![deliverable("d5-1", "Pilot result report", "document", D::Pending)],
                vec![kpi("k5-1", "Automated review rate", "60%", "", K::OnTrack)],
            ),
            phase(
                6,
                "Rollout & Stabilization",
                "Production rollout, monitoring and handover to operations",
                0,
                date(2026, 1, 5),
                date(2026, 2, 27),
                vec![deliverable("d6-1", "Operations manual", "document", D::Pending)],
                vec![kpi("k6-1", "Review lead time reduction", "50%", "", K::OnTrack)],
            ),
        ])
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn get(&self, id: u32) -> Option<&Phase> {
        self.phases.iter().find(|phase| phase.id == id)
    }

    fn get_mut(&mut self, id: u32) -> Result<&mut Phase> {
        self.phases
            .iter_mut()
            .find(|phase| phase.id == id)
            .ok_or(Error::PhaseNotFound(id))
    }

    /// Mean phase progress, rounded to the nearest percent.
    pub fn overall_progress(&self) -> u8 {
        if self.phases.is_empty() {
            return 0;
        }
        let sum: u32 = self.phases.iter().map(|phase| u32::from(phase.progress)).sum();
        let mean = f64::from(sum) / self.phases.len() as f64;
        mean.round() as u8
    }

    /// Clamp progress to 0..=100 and derive the phase status from it.
    pub fn set_progress(&mut self, id: u32, progress: i64) -> Result<PhaseUpdate> {
        let phase = self.get_mut(id)?;
        let progress = progress.clamp(0, 100) as u8;
        phase.progress = progress;
        phase.status = PhaseStatus::from_progress(progress);
        Ok(PhaseUpdate {
            progress,
            status: phase.status,
        })
    }

    /// Find a deliverable by id across all phases.
    pub fn find_deliverable(&self, id: &str) -> Option<(u32, &Deliverable)> {
        self.phases.iter().find_map(|phase| {
            phase.deliverable(id).map(|deliverable| (phase.id, deliverable))
        })
    }

    pub fn approve_deliverable(&mut self, id: &str, approved: bool) -> Result<Deliverable> {
        let deliverable = self
            .phases
            .iter_mut()
            .flat_map(|phase| phase.deliverables.iter_mut())
            .find(|deliverable| deliverable.id == id)
            .ok_or_else(|| Error::DeliverableNotFound(id.to_string()))?;
        deliverable.status = if approved {
            DeliverableStatus::Approved
        } else {
            DeliverableStatus::Rejected
        };
        Ok(deliverable.clone())
    }

    pub fn build_kpi(&self, phase_id: u32, input: KpiInput) -> Result<Kpi> {
        let phase = self.get(phase_id).ok_or(Error::PhaseNotFound(phase_id))?;
        let name = input.name.trim();
        let target = input.target.trim();
        if name.is_empty() || target.is_empty() {
            return Err(Error::InvalidArgument(
                "KPI name and target are required".to_string(),
            ));
        }
        let mut seq = phase.kpis.len() + 1;
        let mut id = format!("k{phase_id}-{seq}");
        while phase.kpi(&id).is_some() {
            seq += 1;
            id = format!("k{phase_id}-{seq}");
        }
        Ok(Kpi {
            id,
            name: name.to_string(),
            target: target.to_string(),
            current: input.current.trim().to_string(),
            status: input.status.unwrap_or_default(),
        })
    }

    pub fn add_kpi(&mut self, phase_id: u32, input: KpiInput) -> Result<Kpi> {
        let kpi = self.build_kpi(phase_id, input)?;
        self.get_mut(phase_id)?.kpis.push(kpi.clone());
        Ok(kpi)
    }

    /// Replace the fields of an existing KPI; empty strings keep the old value.
    pub fn update_kpi(&mut self, phase_id: u32, kpi_id: &str, input: KpiInput) -> Result<Kpi> {
        let phase = self.get_mut(phase_id)?;
        let kpi = phase
            .kpis
            .iter_mut()
            .find(|kpi| kpi.id == kpi_id)
            .ok_or_else(|| Error::KpiNotFound(kpi_id.to_string()))?;
        if !input.name.trim().is_empty() {
            kpi.name = input.name.trim().to_string();
        }
        if !input.target.trim().is_empty() {
            kpi.target = input.target.trim().to_string();
        }
        if !input.current.trim().is_empty() {
            kpi.current = input.current.trim().to_string();
        }
        if let Some(status) = input.status {
            kpi.status = status;
        }
        Ok(kpi.clone())
    }

    pub fn delete_kpi(&mut self, phase_id: u32, kpi_id: &str) -> Result<Kpi> {
        let phase = self.get_mut(phase_id)?;
        let idx = phase
            .kpis
            .iter()
            .position(|kpi| kpi.id == kpi_id)
            .ok_or_else(|| Error::KpiNotFound(kpi_id.to_string()))?;
        Ok(phase.kpis.remove(idx))
    }
}

pub fn require_approve(role: Role) -> Result<()> {
    if Capabilities::for_role(role).approve_deliverables {
        Ok(())
    } else {
        Err(Error::access_denied(role, "approve deliverables"))
    }
}

/// Progress and KPI edits follow the WBS grant (PMO head and PM).
pub fn require_manage(role: Role) -> Result<()> {
    if Capabilities::for_role(role).manage_phases {
        Ok(())
    } else {
        Err(Error::access_denied(role, "edit phases"))
    }
}
