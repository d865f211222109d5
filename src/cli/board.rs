//! pms board command implementation
//!
//! Edits are applied to the fetched board first so validation errors never
//! reach the backend; the backend call then persists the result.

use chrono::NaiveDate;

use crate::api::DataSource;
use crate::board::{self, BoardStats, Column, MoveOutcome, NewTask, Priority, Task, TaskPatch};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::role::{Capabilities, View};

use super::Context;

/// Options for `pms board add`
pub struct AddOptions {
    pub title: String,
    pub assignee: String,
    pub due: String,
    pub priority: Option<String>,
    pub points: Option<u32>,
    pub labels: String,
    pub urgent: bool,
}

/// Options for `pms board edit`
pub struct EditOptions {
    pub id: u64,
    pub title: Option<String>,
    pub assignee: Option<String>,
    pub due: Option<String>,
    pub priority: Option<String>,
    pub points: Option<u32>,
    pub labels: Option<String>,
    pub urgent: Option<bool>,
}

#[derive(serde::Serialize)]
struct ShowReport<'a> {
    columns: Vec<&'a Column>,
    source: DataSource,
}

#[derive(serde::Serialize)]
struct MoveReport {
    task_id: u64,
    #[serde(flatten)]
    outcome: MoveOutcome,
    source: DataSource,
}

#[derive(serde::Serialize)]
struct TaskReport {
    task: Task,
    source: DataSource,
}

#[derive(serde::Serialize)]
struct RemoveReport {
    task: Task,
    message: String,
    source: DataSource,
}

#[derive(serde::Serialize)]
struct StatsReport {
    #[serde(flatten)]
    stats: BoardStats,
    source: DataSource,
}

pub async fn run_show(ctx: &mut Context, column: Option<String>) -> Result<()> {
    ctx.require_view(View::Kanban)?;
    let can_edit = Capabilities::for_role(ctx.role).edit_board;

    let fetched = ctx.client().await?.task_columns().await;
    let board = &fetched.value;
    let columns: Vec<&Column> = match column.as_deref() {
        Some(id) => vec![board
            .column(id)
            .ok_or_else(|| Error::ColumnNotFound(id.to_string()))?],
        None => board.columns().iter().collect(),
    };

    let mut human = HumanOutput::new("Kanban board");
    human.push_summary("tasks", board.total_tasks().to_string());
    for col in &columns {
        human.push_section(
            format!("{} [{}] ({})", col.title, col.id, col.tasks.len()),
            col.tasks.iter().map(card_line).collect(),
        );
    }
    if !can_edit {
        human.push_detail("read-only: your role cannot edit cards");
    }
    human.note_source(fetched.source);

    emit_success(
        ctx.output,
        "board show",
        &ShowReport {
            columns,
            source: fetched.source,
        },
        Some(&human),
    )
}

pub async fn run_move(ctx: &mut Context, id: u64, column: String) -> Result<()> {
    ctx.require_view(View::Kanban)?;
    board::require_edit(ctx.role)?;

    let client = ctx.client().await?;
    let mut current = client.task_columns().await.value;
    let outcome = current.move_task(id, &column)?;
    let source = match &outcome {
        MoveOutcome::Moved { to, .. } => client.move_task(id, to).await.source,
        MoveOutcome::Unchanged => source_of(client.is_mock()),
    };

    let header = match &outcome {
        MoveOutcome::Moved { from, to } => format!("Moved #{id} from {from} to {to}"),
        MoveOutcome::Unchanged => format!("#{id} is already in {column}"),
    };
    let mut human = HumanOutput::new(header);
    human.note_source(source);

    emit_success(
        ctx.output,
        "board move",
        &MoveReport {
            task_id: id,
            outcome,
            source,
        },
        Some(&human),
    )
}

pub async fn run_add(ctx: &mut Context, options: AddOptions) -> Result<()> {
    ctx.require_view(View::Kanban)?;
    board::require_edit(ctx.role)?;

    let input = NewTask {
        title: options.title,
        assignee: options.assignee,
        priority: parse_priority(options.priority.as_deref())?,
        story_points: options.points,
        due_date: Some(parse_due(&options.due)?),
        labels: options.labels,
        urgent: options.urgent,
    };

    let client = ctx.client().await?;
    let current = client.task_columns().await.value;
    let task = current.build_task(input)?;
    let fetched = client.create_task(task).await;

    let mut human = HumanOutput::new(format!("Added #{} to the backlog", fetched.value.id));
    human.push_summary("card", card_line(&fetched.value));
    human.note_source(fetched.source);
    human.push_next_step(format!("pms board move {} sprint", fetched.value.id));

    emit_success(
        ctx.output,
        "board add",
        &TaskReport {
            task: fetched.value,
            source: fetched.source,
        },
        Some(&human),
    )
}

pub async fn run_edit(ctx: &mut Context, options: EditOptions) -> Result<()> {
    ctx.require_view(View::Kanban)?;
    board::require_edit(ctx.role)?;

    let patch = TaskPatch {
        title: options.title,
        assignee: options.assignee,
        priority: parse_priority(options.priority.as_deref())?,
        story_points: options.points,
        due_date: options.due.as_deref().map(parse_due).transpose()?,
        labels: options.labels,
        urgent: options.urgent,
    };

    let client = ctx.client().await?;
    let mut current = client.task_columns().await.value;
    let updated = current.update_task(options.id, patch)?;
    let fetched = client.update_task(updated).await;

    let mut human = HumanOutput::new(format!("Updated #{}", fetched.value.id));
    human.push_summary("card", card_line(&fetched.value));
    human.note_source(fetched.source);

    emit_success(
        ctx.output,
        "board edit",
        &TaskReport {
            task: fetched.value,
            source: fetched.source,
        },
        Some(&human),
    )
}

pub async fn run_rm(ctx: &mut Context, id: u64) -> Result<()> {
    ctx.require_view(View::Kanban)?;
    board::require_edit(ctx.role)?;

    let client = ctx.client().await?;
    let mut current = client.task_columns().await.value;
    let task = current.delete_task(id)?;
    let fetched = client.delete_task(id).await;

    let mut human = HumanOutput::new(format!("Deleted #{id} {}", task.title));
    human.note_source(fetched.source);

    emit_success(
        ctx.output,
        "board rm",
        &RemoveReport {
            task,
            message: fetched.value.message,
            source: fetched.source,
        },
        Some(&human),
    )
}

pub async fn run_stats(ctx: &mut Context) -> Result<()> {
    ctx.require_view(View::Kanban)?;

    let fetched = ctx.client().await?.task_columns().await;
    let stats = fetched.value.stats();

    let mut human = HumanOutput::new("Board statistics");
    human.push_summary("total", stats.total.to_string());
    human.push_summary("in progress", stats.in_progress.to_string());
    human.push_summary("completed", stats.completed.to_string());
    human.push_summary("urgent", stats.urgent.to_string());
    human.push_section(
        "Columns",
        stats
            .columns
            .iter()
            .map(|col| format!("{:<12} {:>2} tasks {:>3} pts", col.title, col.tasks, col.story_points))
            .collect(),
    );
    human.note_source(fetched.source);

    emit_success(
        ctx.output,
        "board stats",
        &StatsReport {
            stats,
            source: fetched.source,
        },
        Some(&human),
    )
}

fn card_line(task: &Task) -> String {
    let mut line = format!(
        "#{:<3} [{}] {} - {}, {} pts, due {}",
        task.id, task.priority, task.title, task.assignee, task.story_points, task.due_date
    );
    if !task.labels.is_empty() {
        line.push_str(&format!(" [{}]", task.labels.join(", ")));
    }
    if task.urgent {
        line.push_str(" URGENT");
    }
    line
}

fn parse_priority(raw: Option<&str>) -> Result<Option<Priority>> {
    raw.map(str::parse).transpose()
}

fn parse_due(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        Error::InvalidArgument(format!("invalid due date '{raw}': expected YYYY-MM-DD"))
    })
}

fn source_of(mock: bool) -> DataSource {
    if mock {
        DataSource::Mock
    } else {
        DataSource::Live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn due_dates_must_be_iso() {
        assert_eq!(
            parse_due(" 2025-08-30 ").expect("date"),
            NaiveDate::from_ymd_opt(2025, 8, 30).expect("valid")
        );
        assert!(matches!(parse_due("30/08/2025"), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn card_line_marks_urgent_work() {
        let board = Board::sample();
        let (_, task) = board
            .columns()
            .iter()
            .flat_map(|col| col.tasks.iter().map(move |t| (col.id.as_str(), t)))
            .find(|(_, t)| t.urgent)
            .expect("sample has an urgent task");
        assert!(card_line(task).ends_with("URGENT"));
    }
}
