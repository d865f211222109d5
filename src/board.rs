//! Kanban board: columns of tasks where column membership is the task's
//! workflow stage.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::role::{Capabilities, Role};

pub const BACKLOG_COLUMN: &str = "backlog";
pub const IN_PROGRESS_COLUMN: &str = "inProgress";
pub const DONE_COLUMN: &str = "done";
const DEFAULT_STORY_POINTS: u32 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "h" => Ok(Priority::High),
            "medium" | "m" => Ok(Priority::Medium),
            "low" | "l" => Ok(Priority::Low),
            _ => Err(Error::InvalidArgument(format!(
                "invalid priority '{}': must be high, medium, or low",
                s.trim()
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub assignee: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub story_points: u32,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(rename = "isFirefighting", default)]
    pub urgent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Column {
    fn new(id: &str, title: &str, tasks: Vec<Task>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            tasks,
        }
    }

    pub fn story_points(&self) -> u32 {
        self.tasks.iter().map(|task| task.story_points).sum()
    }
}

/// Input for a new card. Title, assignee and due date are required.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub assignee: String,
    pub priority: Option<Priority>,
    pub story_points: Option<u32>,
    pub due_date: Option<NaiveDate>,
    pub labels: String,
    pub urgent: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub assignee: Option<String>,
    pub priority: Option<Priority>,
    pub story_points: Option<u32>,
    pub due_date: Option<NaiveDate>,
    pub labels: Option<String>,
    pub urgent: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MoveOutcome {
    Moved { from: String, to: String },
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnStats {
    pub id: String,
    pub title: String,
    pub tasks: usize,
    pub story_points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub urgent: usize,
    pub columns: Vec<ColumnStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    columns: Vec<Column>,
}

impl Board {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Sprint 5 board of the claims automation project.
    pub fn sample() -> Self {
        let task = |id: u64,
                    title: &str,
                    assignee: &str,
                    priority: Priority,
                    points: u32,
                    (y, m, d): (i32, u32, u32),
                    labels: &[&str],
                    urgent: bool| Task {
            id,
            title: title.to_string(),
            assignee: assignee.to_string(),
            priority,
            story_points: points,
            due_date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
            labels: labels.iter().map(|label| label.to_string()).collect(),
            urgent,
        };
        use Priority::*;

        Self::new(vec![
            Column::new(
                BACKLOG_COLUMN,
                "Product Backlog",
                vec![
                    task(1, "Improve claim form image preprocessing", "Minsu Park", Medium, 5, (2025, 8, 20), &["AI modeling", "Data processing"], false),
                    task(2, "Baseline NLP model for policy clauses", "Jieun Kim", High, 8, (2025, 8, 25), &["AI modeling", "NLP"], false),
                ],
            ),
            Column::new(
                "sprint",
                "This Sprint",
                vec![
                    task(3, "Augment training data for OCR model v2.1", "Younghee Lee", High, 8, (2025, 8, 18), &["AI modeling", "OCR"], false),
                    task(4, "Raise receipt line-item classifier accuracy", "Jihoon Choi", Medium, 5, (2025, 8, 19), &["AI modeling", "Classification"], false),
                ],
            ),
            Column::new(
                IN_PROGRESS_COLUMN,
                "In Progress",
                vec![
                    task(5, "Collect hospital-specific diagnosis form samples", "Minsu Park", High, 3, (2025, 8, 17), &["Data collection"], true),
                    task(6, "Hyperparameter tuning run (learning rate)", "Jieun Kim", Medium, 5, (2025, 8, 18), &["AI modeling", "Experiment"], false),
                ],
            ),
            Column::new(
                "review",
                "Code Review",
                vec![task(7, "Refactor data pipeline", "Younghee Lee", Low, 3, (2025, 8, 17), &["Infrastructure", "Optimization"], false)],
            ),
            Column::new(
                "testing",
                "Testing",
                vec![task(8, "OCR v2.0 integration test", "Jihoon Choi", High, 5, (2025, 8, 16), &["QA", "OCR"], false)],
            ),
            Column::new(
                DONE_COLUMN,
                "Done",
                vec![
                    task(9, "Model performance metrics dashboard", "Minsu Park", Medium, 5, (2025, 8, 15), &["Infrastructure", "Monitoring"], false),
                    task(10, "Automate data de-identification script", "Jieun Kim", High, 8, (2025, 8, 14), &["Data processing", "Security"], false),
                ],
            ),
        ])
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == id)
    }

    pub fn total_tasks(&self) -> usize {
        self.columns.iter().map(|column| column.tasks.len()).sum()
    }

    /// Locate a task, returning the id of the column holding it.
    pub fn find_task(&self, id: u64) -> Option<(&str, &Task)> {
        self.columns.iter().find_map(|column| {
            column
                .tasks
                .iter()
                .find(|task| task.id == id)
                .map(|task| (column.id.as_str(), task))
        })
    }

    /// Move a task to the end of another column.
    pub fn move_task(&mut self, id: u64, to_column: &str) -> Result<MoveOutcome> {
        let to_idx = self
            .columns
            .iter()
            .position(|column| column.id == to_column)
            .ok_or_else(|| Error::ColumnNotFound(to_column.to_string()))?;
        let (from_idx, task_idx) = self
            .locate(id)
            .ok_or(Error::TaskNotFound(id))?;
        if from_idx == to_idx {
            return Ok(MoveOutcome::Unchanged);
        }

        let task = self.columns[from_idx].tasks.remove(task_idx);
        self.columns[to_idx].tasks.push(task);
        Ok(MoveOutcome::Moved {
            from: self.columns[from_idx].id.clone(),
            to: self.columns[to_idx].id.clone(),
        })
    }

    /// Validate input and build the task without inserting it.
    pub fn build_task(&self, input: NewTask) -> Result<Task> {
        let title = input.title.trim();
        let assignee = input.assignee.trim();
        if title.is_empty() || assignee.is_empty() || input.due_date.is_none() {
            return Err(Error::InvalidArgument(
                "title, assignee and due date are required".to_string(),
            ));
        }
        Ok(Task {
            id: self.next_id(),
            title: title.to_string(),
            assignee: assignee.to_string(),
            priority: input.priority.unwrap_or_default(),
            story_points: input.story_points.unwrap_or(DEFAULT_STORY_POINTS),
            due_date: input.due_date.unwrap_or_default(),
            labels: parse_labels(&input.labels),
            urgent: input.urgent,
        })
    }

    /// New cards always land in the backlog column.
    pub fn add_task(&mut self, input: NewTask) -> Result<Task> {
        let task = self.build_task(input)?;
        self.insert_task(task.clone())?;
        Ok(task)
    }

    pub fn insert_task(&mut self, task: Task) -> Result<()> {
        let backlog = self
            .columns
            .iter_mut()
            .find(|column| column.id == BACKLOG_COLUMN)
            .ok_or_else(|| Error::ColumnNotFound(BACKLOG_COLUMN.to_string()))?;
        backlog.tasks.push(task);
        Ok(())
    }

    /// Validates the whole patch before touching the task.
    pub fn update_task(&mut self, id: u64, patch: TaskPatch) -> Result<Task> {
        let (col_idx, task_idx) = self.locate(id).ok_or(Error::TaskNotFound(id))?;
        let title = required_field(patch.title.as_deref(), "title")?;
        let assignee = required_field(patch.assignee.as_deref(), "assignee")?;

        let task = &mut self.columns[col_idx].tasks[task_idx];
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(assignee) = assignee {
            task.assignee = assignee;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(points) = patch.story_points {
            task.story_points = points;
        }
        if let Some(due) = patch.due_date {
            task.due_date = due;
        }
        if let Some(labels) = patch.labels {
            task.labels = parse_labels(&labels);
        }
        if let Some(urgent) = patch.urgent {
            task.urgent = urgent;
        }
        Ok(task.clone())
    }

    pub fn delete_task(&mut self, id: u64) -> Result<Task> {
        let (col_idx, task_idx) = self.locate(id).ok_or(Error::TaskNotFound(id))?;
        Ok(self.columns[col_idx].tasks.remove(task_idx))
    }

    pub fn stats(&self) -> BoardStats {
        let count = |id: &str| self.column(id).map(|col| col.tasks.len()).unwrap_or(0);
        BoardStats {
            total: self.total_tasks(),
            completed: count(DONE_COLUMN),
            in_progress: count(IN_PROGRESS_COLUMN),
            urgent: self
                .columns
                .iter()
                .flat_map(|column| column.tasks.iter())
                .filter(|task| task.urgent)
                .count(),
            columns: self
                .columns
                .iter()
                .map(|column| ColumnStats {
                    id: column.id.clone(),
                    title: column.title.clone(),
                    tasks: column.tasks.len(),
                    story_points: column.story_points(),
                })
                .collect(),
        }
    }

    fn next_id(&self) -> u64 {
        self.columns
            .iter()
            .flat_map(|column| column.tasks.iter())
            .map(|task| task.id)
            .max()
            .unwrap_or(0)
            + 1
    }

    fn locate(&self, id: u64) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(col_idx, column)| {
            column
                .tasks
                .iter()
                .position(|task| task.id == id)
                .map(|task_idx| (col_idx, task_idx))
        })
    }
}

/// Refuse board edits for roles without edit rights.
pub fn require_edit(role: Role) -> Result<()> {
    if Capabilities::for_role(role).edit_board {
        Ok(())
    } else {
        Err(Error::access_denied(role, "edit the board"))
    }
}

/// Split a comma separated label string, dropping empty entries.
pub fn parse_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

fn required_field(value: Option<&str>, field: &str) -> Result<Option<String>> {
    match value.map(str::trim) {
        Some("") => Err(Error::InvalidArgument(format!("{field} cannot be empty"))),
        other => Ok(other.map(str::to_string)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn due() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 8, 30)
    }

    #[test]
    fn sample_board_shape() {
        let board = Board::sample();
        let ids: Vec<&str> = board.columns().iter().map(|col| col.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["backlog", "sprint", "inProgress", "review", "testing", "done"]
        );
        let stats = board.stats();
        assert_eq!(stats.total, 10);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.in_progress, 2);
        assert_eq!(stats.urgent, 1);
    }

    #[test]
    fn move_updates_counts_consistently() {
        let mut board = Board::sample();
        let outcome = board.move_task(1, DONE_COLUMN).expect("move");
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                from: "backlog".to_string(),
                to: "done".to_string()
            }
        );
        let stats = board.stats();
        assert_eq!(stats.total, 10);
        assert_eq!(stats.completed, 3);
        assert_eq!(board.column(BACKLOG_COLUMN).expect("backlog").tasks.len(), 1);
        let done = board.column(DONE_COLUMN).expect("done");
        assert_eq!(done.tasks.last().map(|task| task.id), Some(1));
    }

    #[test]
    fn move_to_same_column_is_noop() {
        let mut board = Board::sample();
        let before = board.clone();
        let outcome = board.move_task(5, IN_PROGRESS_COLUMN).expect("move");
        assert_eq!(outcome, MoveOutcome::Unchanged);
        assert_eq!(board, before);
    }

    #[test]
    fn move_rejects_unknown_ids() {
        let mut board = Board::sample();
        assert!(matches!(
            board.move_task(99, DONE_COLUMN),
            Err(Error::TaskNotFound(99))
        ));
        assert!(matches!(
            board.move_task(1, "archive"),
            Err(Error::ColumnNotFound(_))
        ));
        assert_eq!(board.total_tasks(), 10);
    }

    #[test]
    fn add_task_requires_fields_and_lands_in_backlog() {
        let mut board = Board::sample();
        let err = board
            .add_task(NewTask {
                title: "Write runbook".to_string(),
                assignee: String::new(),
                due_date: due(),
                ..NewTask::default()
            })
            .expect_err("missing assignee");
        assert!(matches!(err, Error::InvalidArgument(_)));

        let task = board
            .add_task(NewTask {
                title: " Write runbook ".to_string(),
                assignee: "Minsu Park".to_string(),
                due_date: due(),
                labels: "ops, ,docs,".to_string(),
                ..NewTask::default()
            })
            .expect("add");
        assert_eq!(task.id, 11);
        assert_eq!(task.title, "Write runbook");
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.story_points, 5);
        assert_eq!(task.labels, vec!["ops".to_string(), "docs".to_string()]);
        assert_eq!(board.find_task(11).map(|(col, _)| col), Some(BACKLOG_COLUMN));
    }

    #[test]
    fn update_and_delete() {
        let mut board = Board::sample();
        let updated = board
            .update_task(
                7,
                TaskPatch {
                    priority: Some(Priority::High),
                    urgent: Some(true),
                    ..TaskPatch::default()
                },
            )
            .expect("update");
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(board.stats().urgent, 2);

        let removed = board.delete_task(7).expect("delete");
        assert_eq!(removed.id, 7);
        assert!(board.column("review").expect("review").tasks.is_empty());
        assert!(matches!(board.delete_task(7), Err(Error::TaskNotFound(7))));
    }

    #[test]
    fn rejected_patch_leaves_task_untouched() {
        let mut board = Board::sample();
        let before = board.find_task(7).map(|(_, task)| task.clone()).expect("task");

        let err = board
            .update_task(
                7,
                TaskPatch {
                    title: Some("Renamed card".to_string()),
                    assignee: Some("   ".to_string()),
                    urgent: Some(true),
                    ..TaskPatch::default()
                },
            )
            .expect_err("empty assignee");
        assert!(matches!(err, Error::InvalidArgument(_)));

        let after = board.find_task(7).map(|(_, task)| task.clone()).expect("task");
        assert_eq!(after, before);
    }

    #[test]
    fn columns_accept_backend_name_field() {
        let column: Column = serde_json::from_value(serde_json::json!({
            "id": "todo",
            "name": "To Do",
            "tasks": []
        }))
        .expect("column");
        assert_eq!(column.title, "To Do");
    }

    #[test]
    fn task_wire_format_uses_camel_case() {
        let board = Board::sample();
        let (_, task) = board.find_task(5).expect("task");
        let value = serde_json::to_value(task).expect("json");
        assert_eq!(value["storyPoints"], 3);
        assert_eq!(value["dueDate"], "2025-08-17");
        assert_eq!(value["isFirefighting"], true);
    }

    #[test]
    fn only_delivery_roles_edit() {
        assert!(require_edit(Role::Developer).is_ok());
        assert!(require_edit(Role::Pm).is_ok());
        assert!(matches!(
            require_edit(Role::Auditor),
            Err(Error::AccessDenied { .. })
        ));
    }
}
