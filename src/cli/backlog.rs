//! pms backlog

use crate::api::DataSource;
use crate::backlog::{self, Backlog, Direction, NewStory, Story, StoryStatus};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::role::View;

use super::Context;

/// Options for `pms backlog add`
pub struct AddOptions {
    pub title: String,
    pub epic: String,
    pub description: String,
    pub priority: Option<String>,
    pub points: Option<u32>,
    pub criteria: Vec<String>,
}

#[derive(serde::Serialize)]
struct ListReport {
    stories: Backlog,
    total_points: u32,
    completed_points: u32,
    source: DataSource,
}

#[derive(serde::Serialize)]
struct EpicsReport {
    epics: Vec<String>,
    source: DataSource,
}

#[derive(serde::Serialize)]
struct StoryReport {
    story: Story,
    source: DataSource,
}

#[derive(serde::Serialize)]
struct MoveReport {
    story_id: u64,
    direction: Direction,
    moved: bool,
    rank: usize,
    source: DataSource,
}

pub async fn run_list(
    ctx: &mut Context,
    status: Option<String>,
    epic: Option<String>,
) -> Result<()> {
    ctx.require_view(View::Backlog)?;
    let status: Option<StoryStatus> = status.as_deref().map(str::parse).transpose()?;
    let epic = epic.filter(|e| !e.trim().is_empty());

    let fetched = ctx.client().await?.stories(status, epic.as_deref()).await;
    let stories = fetched.value;
    let total_points = stories.total_points(None);
    let completed_points = stories.total_points(Some(StoryStatus::Completed));

    let mut human = HumanOutput::new("Product backlog");
    human.push_summary("stories", stories.stories().len().to_string());
    human.push_summary(
        "story points",
        format!("{total_points} total, {completed_points} completed"),
    );
    if let Some(status) = status {
        human.push_summary("status", status.as_str());
    }
    if let Some(epic) = &epic {
        human.push_summary("epic", epic.clone());
    }
    human.push_section(
        "Stories",
        stories
            .stories()
            .iter()
            .enumerate()
            .map(|(rank, story)| story_line(rank + 1, story))
            .collect(),
    );
    human.note_source(fetched.source);

    emit_success(
        ctx.output,
        "backlog list",
        &ListReport {
            stories,
            total_points,
            completed_points,
            source: fetched.source,
        },
        Some(&human),
    )
}

pub async fn run_epics(ctx: &mut Context) -> Result<()> {
    ctx.require_view(View::Backlog)?;
    let fetched = ctx.client().await?.epics().await;

    let mut human = HumanOutput::new("Epics");
    human.push_section("Epics", fetched.value.clone());
    human.note_source(fetched.source);

    emit_success(
        ctx.output,
        "backlog epics",
        &EpicsReport {
            epics: fetched.value,
            source: fetched.source,
        },
        Some(&human),
    )
}

pub async fn run_add(ctx: &mut Context, options: AddOptions) -> Result<()> {
    ctx.require_view(View::Backlog)?;
    backlog::require_manage(ctx.role)?;

    let input = NewStory {
        title: options.title,
        description: options.description,
        priority: options.priority.as_deref().map(str::parse).transpose()?,
        story_points: options.points,
        epic: options.epic,
        acceptance_criteria: options
            .criteria
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect(),
    };

    let client = ctx.client().await?;
    let current = client.stories(None, None).await.value;
    let story = current.build_story(input)?;
    let fetched = client.create_story(story).await;

    let mut human = HumanOutput::new(format!("Added story #{}", fetched.value.id));
    human.push_summary("story", story_line(current.stories().len() + 1, &fetched.value));
    if !fetched.value.acceptance_criteria.is_empty() {
        human.push_section("Acceptance criteria", fetched.value.acceptance_criteria.clone());
    }
    human.note_source(fetched.source);

    emit_success(
        ctx.output,
        "backlog add",
        &StoryReport {
            story: fetched.value,
            source: fetched.source,
        },
        Some(&human),
    )
}

pub async fn run_move(ctx: &mut Context, id: u64, direction: Direction) -> Result<()> {
    ctx.require_view(View::Backlog)?;
    backlog::require_manage(ctx.role)?;

    let client = ctx.client().await?;
    let mut current = client.stories(None, None).await.value;
    let moved = current.reprioritize(id, direction)?;
    let (ordered, source) = if moved {
        let fetched = client.update_story_priority(id, direction, current).await;
        (fetched.value, fetched.source)
    } else {
        let source = if client.is_mock() {
            DataSource::Mock
        } else {
            DataSource::Live
        };
        (current, source)
    };
    let rank = ordered
        .stories()
        .iter()
        .position(|story| story.id == id)
        .map(|idx| idx + 1)
        .unwrap_or_default();

    let header = if moved {
        format!("Story #{id} is now rank {rank}")
    } else {
        format!("Story #{id} is already at the edge (rank {rank})")
    };
    let mut human = HumanOutput::new(header);
    human.note_source(source);

    let command = match direction {
        Direction::Up => "backlog up",
        Direction::Down => "backlog down",
    };
    emit_success(
        ctx.output,
        command,
        &MoveReport {
            story_id: id,
            direction,
            moved,
            rank,
            source,
        },
        Some(&human),
    )
}

fn story_line(rank: usize, story: &Story) -> String {
    let assignee = story.assignee.as_deref().unwrap_or("unassigned");
    format!(
        "{rank:>2}. #{:<3} [{}] {} ({} pts, {}, {}) - {}",
        story.id,
        story.priority,
        story.title,
        story.story_points,
        story.status.as_str(),
        story.epic,
        assignee
    )
}
