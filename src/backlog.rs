//! Product backlog: ranked user stories grouped into epics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::Priority;
use crate::error::{Error, Result};
use crate::role::{Capabilities, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryStatus {
    Backlog,
    Selected,
    InSprint,
    Completed,
}

impl StoryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StoryStatus::Backlog => "backlog",
            StoryStatus::Selected => "selected",
            StoryStatus::InSprint => "in_sprint",
            StoryStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoryStatus {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "backlog" => Ok(StoryStatus::Backlog),
            "selected" => Ok(StoryStatus::Selected),
            "in_sprint" | "sprint" => Ok(StoryStatus::InSprint),
            "completed" | "done" => Ok(StoryStatus::Completed),
            other => Err(Error::InvalidArgument(format!(
                "invalid story status '{other}': must be backlog, selected, in_sprint, or completed"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(Error::InvalidArgument(format!(
                "invalid direction '{other}': must be up or down"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub story_points: u32,
    pub status: StoryStatus,
    pub epic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewStory {
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub story_points: Option<u32>,
    pub epic: String,
    pub acceptance_criteria: Vec<String>,
}

/// Stories in rank order; index 0 is the top of the backlog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Backlog {
    stories: Vec<Story>,
}

impl Backlog {
    pub fn new(stories: Vec<Story>) -> Self {
        Self { stories }
    }

    pub fn sample() -> Self {
        let story = |id: u64,
                     title: &str,
                     description: &str,
                     priority: Priority,
                     points: u32,
                     status: StoryStatus,
                     epic: &str,
                     assignee: Option<&str>,
                     criteria: &[&str]| Story {
            id,
            title: title.to_string(),
            description: description.to_string(),
            priority,
            story_points: points,
            status,
            epic: epic.to_string(),
            assignee: assignee.map(str::to_string),
            acceptance_criteria: criteria.iter().map(|c| c.to_string()).collect(),
        };
        use Priority::*;
        use StoryStatus::*;

        Self::new(vec![
            story(
                1,
                "Recognise handwritten fields on diagnosis forms",
                "As a claims reviewer I want handwritten diagnosis codes extracted automatically",
                High,
                8,
                InSprint,
                "OCR Engine",
                Some("Younghee Lee"),
                &["95% field accuracy on the validation set", "Low-confidence fields flagged for review"],
            ),
            story(
                2,
                "Classify receipt line items by treatment type",
                "As a reviewer I want each receipt line mapped to a covered treatment category",
                High,
                5,
                Selected,
                "AI Model",
                Some("Jihoon Choi"),
                &["Top-1 accuracy above 90%", "Unknown items routed to manual queue"],
            ),
            story(
                3,
                "Match claims against policy clauses",
                "As a reviewer I want the applicable clause suggested for each claim",
                Medium,
                13,
                Backlog,
                "AI Model",
                None,
                &["Clause suggestion shown with confidence", "Reviewer can override the suggestion"],
            ),
            story(
                4,
                "GPU training cluster monitoring",
                "As an engineer I want training job health visible on one screen",
                Medium,
                3,
                Completed,
                "Infrastructure",
                Some("Minsu Park"),
                &["GPU utilisation and job status charted"],
            ),
            story(
                5,
                "De-identify personal data before labeling",
                "As a privacy officer I want resident numbers and names masked before data leaves the vault",
                High,
                5,
                Completed,
                "Data Management",
                Some("Jieun Kim"),
                &["No raw identifiers in the labeling export", "Masking audit log retained"],
            ),
            story(
                6,
                "Hospital-specific form templates",
                "As an OCR engineer I want layout templates for the five largest hospitals",
                Medium,
                8,
                Backlog,
                "OCR Engine",
                None,
                &["Templates cover 80% of incoming forms"],
            ),
            story(
                7,
                "Legacy review system API adapter",
                "As the claims system I want automated decisions posted to the legacy review API",
                Low,
                8,
                Backlog,
                "Infrastructure",
                None,
                &["Adapter retries are idempotent", "Failures surface in the ops dashboard"],
            ),
        ])
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn get(&self, id: u64) -> Option<&Story> {
        self.stories.iter().find(|story| story.id == id)
    }

    pub fn filter(&self, status: Option<StoryStatus>, epic: Option<&str>) -> Vec<&Story> {
        self.stories
            .iter()
            .filter(|story| status.map(|s| story.status == s).unwrap_or(true))
            .filter(|story| {
                epic.map(|e| story.epic.eq_ignore_ascii_case(e.trim()))
                    .unwrap_or(true)
            })
            .collect()
    }

    /// Distinct epics in first-appearance order.
    pub fn epics(&self) -> Vec<String> {
        let mut epics: Vec<String> = Vec::new();
        for story in &self.stories {
            if !epics.contains(&story.epic) {
                epics.push(story.epic.clone());
            }
        }
        epics
    }

    pub fn total_points(&self, status: Option<StoryStatus>) -> u32 {
        self.filter(status, None)
            .iter()
            .map(|story| story.story_points)
            .sum()
    }

    /// Swap a story with its neighbour. Returns false at the edges.
    pub fn reprioritize(&mut self, id: u64, direction: Direction) -> Result<bool> {
        let idx = self
            .stories
            .iter()
            .position(|story| story.id == id)
            .ok_or(Error::StoryNotFound(id))?;
        let target = match direction {
            Direction::Up if idx > 0 => idx - 1,
            Direction::Down if idx + 1 < self.stories.len() => idx + 1,
            _ => return Ok(false),
        };
        self.stories.swap(idx, target);
        Ok(true)
    }

    pub fn build_story(&self, input: NewStory) -> Result<Story> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(Error::InvalidArgument("story title is required".to_string()));
        }
        let epic = input.epic.trim();
        if epic.is_empty() {
            return Err(Error::InvalidArgument("story epic is required".to_string()));
        }
        Ok(Story {
            id: self.stories.iter().map(|story| story.id).max().unwrap_or(0) + 1,
            title: title.to_string(),
            description: input.description.trim().to_string(),
            priority: input.priority.unwrap_or_default(),
            story_points: input.story_points.unwrap_or(0),
            status: StoryStatus::Backlog,
            epic: epic.to_string(),
            assignee: None,
            acceptance_criteria: input.acceptance_criteria,
        })
    }

    /// New stories start at the bottom of the backlog.
    pub fn add_story(&mut self, input: NewStory) -> Result<Story> {
        let story = self.build_story(input)?;
        self.stories.push(story.clone());
        Ok(story)
    }

    pub fn set_status(&mut self, id: u64, status: StoryStatus) -> Result<Story> {
        let story = self
            .stories
            .iter_mut()
            .find(|story| story.id == id)
            .ok_or(Error::StoryNotFound(id))?;
        story.status = status;
        Ok(story.clone())
    }
}

pub fn require_manage(role: Role) -> Result<()> {
    if Capabilities::for_role(role).manage_backlog {
        Ok(())
    } else {
        Err(Error::access_denied(role, "manage the backlog"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(backlog: &Backlog) -> Vec<u64> {
        backlog.stories().iter().map(|story| story.id).collect()
    }

    #[test]
    fn epics_in_first_appearance_order() {
        let backlog = Backlog::sample();
        assert_eq!(
            backlog.epics(),
            vec!["OCR Engine", "AI Model", "Infrastructure", "Data Management"]
        );
    }

    #[test]
    fn filter_by_status_and_epic() {
        let backlog = Backlog::sample();
        let ocr_backlog = backlog.filter(Some(StoryStatus::Backlog), Some("ocr engine"));
        assert_eq!(ocr_backlog.len(), 1);
        assert_eq!(ocr_backlog[0].id, 6);
        assert_eq!(backlog.filter(None, None).len(), 7);
        assert_eq!(backlog.total_points(Some(StoryStatus::Completed)), 8);
    }

    #[test]
    fn reprioritize_swaps_and_stops_at_edges() {
        let mut backlog = Backlog::sample();
        assert!(backlog.reprioritize(3, Direction::Up).expect("up"));
        assert_eq!(order(&backlog), vec![1, 3, 2, 4, 5, 6, 7]);
        assert!(!backlog.reprioritize(1, Direction::Up).expect("top"));
        assert!(!backlog.reprioritize(7, Direction::Down).expect("bottom"));
        assert!(matches!(
            backlog.reprioritize(42, Direction::Down),
            Err(Error::StoryNotFound(42))
        ));
    }

    #[test]
    fn add_story_appends_with_next_id() {
        let mut backlog = Backlog::sample();
        let story = backlog
            .add_story(NewStory {
                title: "Reviewer feedback loop".to_string(),
                epic: "AI Model".to_string(),
                story_points: Some(5),
                ..NewStory::default()
            })
            .expect("add");
        assert_eq!(story.id, 8);
        assert_eq!(story.status, StoryStatus::Backlog);
        assert_eq!(order(&backlog).last(), Some(&8));

        assert!(backlog.add_story(NewStory::default()).is_err());
    }

    #[test]
    fn status_parsing_accepts_aliases() {
        assert_eq!("done".parse::<StoryStatus>().expect("status"), StoryStatus::Completed);
        assert_eq!("in-sprint".parse::<StoryStatus>().expect("status"), StoryStatus::InSprint);
        assert!("later".parse::<StoryStatus>().is_err());
    }

    #[test]
    fn auditors_cannot_manage_backlog() {
        assert!(require_manage(Role::BusinessAnalyst).is_ok());
        assert!(require_manage(Role::Auditor).is_err());
        assert!(require_manage(Role::Sponsor).is_err());
    }
}
