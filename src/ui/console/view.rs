use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::api::DataSource;
use crate::assistant::{ChatRole, SUGGESTED_PROMPTS};
use crate::board::{Priority, Task};
use crate::dashboard::{self, ActivityKind, DashboardView, InsightKind, PROJECT_CODE, PROJECT_TITLE};
use crate::phase::{DeliverableStatus, KpiStatus, PhaseStatus};
use crate::role::{Capabilities, Role, View};
use crate::session;

use super::app::{AppState, StatusKind};
use super::form::TaskForm;

const SIDEBAR_WIDTH: u16 = 26;
const BAR_WIDTH: usize = 20;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_BG_MUTED: Color = Color::Rgb(52, 56, 60);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER_LIST: Color = Color::Rgb(92, 126, 166);
const COLOR_BORDER_DETAIL: Color = Color::Rgb(180, 156, 92);
const COLOR_MAGENTA: Color = Color::Rgb(214, 140, 230);

pub fn render(frame: &mut Frame, app: &AppState) {
    let area = frame.size();
    let Some(role) = app.role else {
        render_login(frame, app, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(2),
            ]
            .as_ref(),
        )
        .split(area);
    render_header(frame, app, role, chunks[0]);

    let mut constraints = vec![Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)];
    if app.chat_open {
        constraints.push(Constraint::Percentage(35));
    }
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(chunks[1]);
    render_sidebar(frame, app, body[0]);
    render_content(frame, app, role, body[1]);
    if app.chat_open {
        render_assistant(frame, app, body[2]);
    }

    render_footer(frame, app, chunks[2]);

    if let Some(form) = app.form.as_ref() {
        render_form_modal(frame, area, form);
    }
}

fn render_header(frame: &mut Frame, app: &AppState, role: Role, area: Rect) {
    let user = match app.user.as_ref() {
        Some(user) => format!("{} <{}>", user.name, user.email),
        None => "not logged in".to_string(),
    };
    let (source_label, source_color) = match app.source {
        Some(DataSource::Live) => ("live", COLOR_SUCCESS),
        Some(DataSource::Mock) => ("sample data", COLOR_WARNING),
        None => ("loading", COLOR_MUTED),
    };
    let lines = vec![
        Line::from(vec![
            Span::styled(
                PROJECT_TITLE,
                Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(PROJECT_CODE, Style::default().fg(COLOR_MUTED_DARK)),
        ]),
        Line::from(vec![
            Span::styled(user, Style::default().fg(COLOR_INFO)),
            Span::raw("  "),
            Span::styled(
                role.display_name(),
                Style::default().fg(COLOR_ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(source_label, Style::default().fg(source_color)),
        ]),
    ];
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(COLOR_BG_MUTED)),
    );
    frame.render_widget(widget, area);
}

fn render_sidebar(frame: &mut Frame, app: &AppState, area: Rect) {
    let width = area.width.saturating_sub(2) as usize;
    let lines: Vec<Line<'static>> = app
        .menu()
        .iter()
        .enumerate()
        .map(|(idx, view)| {
            let text = truncate_text(&format!("{} {}", idx + 1, view.label()), width);
            let style = if *view == app.view {
                Style::default()
                    .fg(COLOR_ACCENT)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(COLOR_MUTED)
            };
            Line::from(Span::styled(text, style))
        })
        .collect();
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BORDER_LIST))
            .title("Menu"),
    );
    frame.render_widget(widget, area);
}

fn render_content(frame: &mut Frame, app: &AppState, role: Role, area: Rect) {
    if app.workspace.is_none() {
        let widget = Paragraph::new(Span::styled("Loading...", Style::default().fg(COLOR_MUTED)))
            .alignment(Alignment::Center)
            .block(panel(app.view.label()));
        frame.render_widget(widget, area);
        return;
    }

    match app.view {
        View::Dashboard => render_dashboard(frame, app, role, area),
        View::Kanban => render_board(frame, app, role, area),
        View::Backlog => render_backlog(frame, app, role, area),
        View::Phases => render_phases(frame, app, role, area),
        View::Roles => render_roles(frame, app, role, area),
        View::Settings => render_settings(frame, app, role, area),
    }
}

fn render_dashboard(frame: &mut Frame, app: &AppState, role: Role, area: Rect) {
    let Some(ws) = app.workspace.as_ref() else {
        return;
    };
    let view = DashboardView::for_role(role, &ws.stats, ws.activities.clone());
    let cards = &view.cards;
    let mut lines: Vec<Line<'static>> = Vec::new();

    if view.read_only {
        lines.push(Line::from(Span::styled(
            "Read-only view",
            Style::default().fg(COLOR_WARNING),
        )));
        lines.push(Line::from(""));
    }

    lines.push(section_header("Key figures"));
    lines.push(Line::from(vec![
        label_span("Overall progress"),
        Span::styled(
            format!("{} {}%", progress_bar(cards.overall_progress), cards.overall_progress),
            Style::default().fg(COLOR_INFO),
        ),
    ]));
    if let Some(budget) = cards.budget.as_ref() {
        lines.push(Line::from(vec![
            label_span("Budget"),
            Span::styled(
                format!(
                    "{}% ({} of {})",
                    budget.usage,
                    dashboard::format_won_millions(budget.used),
                    dashboard::format_won_millions(budget.total)
                ),
                Style::default().fg(COLOR_TEXT),
            ),
        ]));
    }
    lines.push(Line::from(vec![
        label_span("Active issues"),
        Span::styled(cards.active_issues.to_string(), Style::default().fg(COLOR_TEXT)),
        Span::styled(
            format!("  ({} high priority)", cards.high_priority_issues),
            Style::default().fg(COLOR_ERROR),
        ),
    ]));
    lines.push(Line::from(vec![
        label_span("Tasks done"),
        Span::styled(
            format!("{}/{}", cards.completed_tasks, cards.total_tasks),
            Style::default().fg(COLOR_SUCCESS),
        ),
    ]));

    if let Some(charts) = view.charts.as_ref() {
        lines.push(Line::from(""));
        lines.push(section_header("Phase progress (planned / actual)"));
        for phase in &charts.phases {
            lines.push(Line::from(vec![
                Span::styled(pad_text(&phase.phase, 14), Style::default().fg(COLOR_MUTED)),
                Span::styled(progress_bar(phase.actual), Style::default().fg(COLOR_SUCCESS)),
                Span::styled(
                    format!(" {:>3}% / {:>3}%", phase.actual, phase.planned),
                    Style::default().fg(COLOR_MUTED_DARK),
                ),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(section_header("Sprint velocity"));
        for sprint in &charts.velocity {
            lines.push(Line::from(Span::styled(
                format!("{:<10} {:>3} / {:>3} pts", sprint.sprint, sprint.velocity, sprint.planned),
                Style::default().fg(COLOR_TEXT),
            )));
        }
        lines.push(Line::from(vec![
            label_span("Sprint progress"),
            Span::styled(format!("{}%", charts.sprint_progress), Style::default().fg(COLOR_INFO)),
            Span::raw("  "),
            label_span("Goal probability"),
            Span::styled(
                format!("{}%", charts.sprint_goal_probability),
                Style::default().fg(COLOR_INFO),
            ),
        ]));
        if let (Some(first), Some(last)) = (charts.burndown.first(), charts.burndown.last()) {
            lines.push(Line::from(vec![
                label_span("Burndown"),
                Span::styled(
                    format!(
                        "{} {} pts to {} {} pts (ideal {})",
                        first.day, first.remaining, last.day, last.remaining, last.ideal
                    ),
                    Style::default().fg(COLOR_TEXT),
                ),
            ]));
        }
    }

    lines.push(Line::from(""));
    lines.push(section_header("AI insights"));
    for insight in &view.insights {
        let color = match insight.kind {
            InsightKind::Risk => COLOR_ERROR,
            InsightKind::Achievement => COLOR_SUCCESS,
            InsightKind::Recommendation => COLOR_ACCENT,
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{}: ", insight.title),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(insight.body.clone(), Style::default().fg(COLOR_TEXT)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(section_header("Recent activity"));
    for activity in &view.activities {
        let color = match activity.kind {
            ActivityKind::Success => COLOR_SUCCESS,
            ActivityKind::Info => COLOR_INFO,
            ActivityKind::Warning => COLOR_WARNING,
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", activity.user), Style::default().fg(color)),
            Span::styled(activity.action.clone(), Style::default().fg(COLOR_TEXT)),
            Span::styled(format!("  {}", activity.time), Style::default().fg(COLOR_MUTED_DARK)),
        ]));
    }

    let widget = Paragraph::new(lines)
        .block(panel(View::Dashboard.label()))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn render_board(frame: &mut Frame, app: &AppState, role: Role, area: Rect) {
    let Some(ws) = app.workspace.as_ref() else {
        return;
    };
    let caps = Capabilities::for_role(role);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)].as_ref())
        .split(area);

    let stats = ws.board.stats();
    let mut summary = vec![Span::styled(
        format!(
            "{} tasks  {} in progress  {} done  {} urgent",
            stats.total, stats.in_progress, stats.completed, stats.urgent
        ),
        Style::default().fg(COLOR_MUTED),
    )];
    if caps.board_read_only || !caps.edit_board {
        summary.push(Span::styled("  read-only", Style::default().fg(COLOR_WARNING)));
    }
    frame.render_widget(Paragraph::new(Line::from(summary)), chunks[0]);

    let columns = ws.board.columns();
    if columns.is_empty() {
        return;
    }
    let constraints: Vec<Constraint> = columns
        .iter()
        .map(|_| Constraint::Ratio(1, columns.len() as u32))
        .collect();
    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(chunks[1]);

    for (col_idx, (column, col_area)) in columns.iter().zip(areas.iter()).enumerate() {
        let active = col_idx == app.board_column;
        let width = col_area.width.saturating_sub(2) as usize;
        let mut lines: Vec<Line<'static>> = Vec::new();
        for (task_idx, task) in column.tasks.iter().enumerate() {
            let selected = active && task_idx == app.board_task;
            lines.extend(card_lines(task, width, selected));
        }
        let border = if active { COLOR_BORDER_DETAIL } else { COLOR_BORDER_LIST };
        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(format!("{} ({})", column.title, column.tasks.len())),
        );
        frame.render_widget(widget, *col_area);
    }
}

fn card_lines(task: &Task, width: usize, selected: bool) -> Vec<Line<'static>> {
    let mut title_style = Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD);
    if selected {
        title_style = title_style.add_modifier(Modifier::REVERSED);
    }
    let mut first = vec![Span::styled(
        truncate_text(&format!("#{} {}", task.id, task.title), width),
        title_style,
    )];
    if task.urgent {
        first.push(Span::styled(" !", Style::default().fg(COLOR_ERROR)));
    }
    vec![
        Line::from(first),
        Line::from(vec![
            Span::styled(
                format!("{} ", task.priority),
                Style::default().fg(priority_color(task.priority)),
            ),
            Span::styled(
                truncate_text(
                    &format!("{} {}pt {}", task.assignee, task.story_points, task.due_date),
                    width.saturating_sub(7),
                ),
                Style::default().fg(COLOR_MUTED),
            ),
        ]),
        Line::from(""),
    ]
}

fn render_backlog(frame: &mut Frame, app: &AppState, role: Role, area: Rect) {
    let Some(ws) = app.workspace.as_ref() else {
        return;
    };
    let stories = ws.backlog.stories();
    let width = area.width.saturating_sub(2) as usize;
    let mut lines: Vec<Line<'static>> = vec![Line::from(Span::styled(
        format!(
            "{} stories  {} pts total  {} pts completed",
            stories.len(),
            ws.backlog.total_points(None),
            ws.backlog
                .total_points(Some(crate::backlog::StoryStatus::Completed))
        ),
        Style::default().fg(COLOR_MUTED),
    ))];
    if !Capabilities::for_role(role).manage_backlog {
        lines.push(Line::from(Span::styled(
            "read-only",
            Style::default().fg(COLOR_WARNING),
        )));
    }
    lines.push(Line::from(""));

    for (idx, story) in stories.iter().enumerate() {
        let mut style = Style::default().fg(COLOR_TEXT);
        if idx == app.backlog_selected {
            style = style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(vec![
            Span::styled(format!("{:>2}. ", idx + 1), Style::default().fg(COLOR_MUTED_DARK)),
            Span::styled(
                format!("{:<6} ", story.priority),
                Style::default().fg(priority_color(story.priority)),
            ),
            Span::styled(
                truncate_text(&format!("#{} {}", story.id, story.title), width.saturating_sub(32)),
                style,
            ),
            Span::styled(
                format!("  {}pt {} [{}]", story.story_points, story.status, story.epic),
                Style::default().fg(COLOR_MUTED),
            ),
        ]));
    }

    if let Some(story) = stories.get(app.backlog_selected) {
        lines.push(Line::from(""));
        lines.push(section_header(&format!("#{} {}", story.id, story.title)));
        if !story.description.is_empty() {
            lines.push(Line::from(Span::styled(
                story.description.clone(),
                Style::default().fg(COLOR_TEXT),
            )));
        }
        lines.push(Line::from(vec![
            label_span("Assignee"),
            Span::styled(
                story.assignee.clone().unwrap_or_else(|| "unassigned".to_string()),
                Style::default().fg(COLOR_INFO),
            ),
        ]));
        for criterion in &story.acceptance_criteria {
            lines.push(Line::from(Span::styled(
                format!("- {criterion}"),
                Style::default().fg(COLOR_MUTED),
            )));
        }
    }

    let widget = Paragraph::new(lines)
        .block(panel(View::Backlog.label()))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn render_phases(frame: &mut Frame, app: &AppState, role: Role, area: Rect) {
    let Some(ws) = app.workspace.as_ref() else {
        return;
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(0)].as_ref())
        .split(area);

    let mut lines: Vec<Line<'static>> = vec![Line::from(vec![
        label_span("Overall"),
        Span::styled(
            format!("{}%", ws.phases.overall_progress()),
            Style::default().fg(COLOR_INFO),
        ),
    ])];
    for (idx, phase) in ws.phases.phases().iter().enumerate() {
        let mut name_style = Style::default().fg(COLOR_TEXT);
        if idx == app.phase_selected {
            name_style = name_style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(vec![
            Span::styled(pad_text(&format!("{}. {}", phase.id, phase.name), 36), name_style),
            Span::styled(
                progress_bar(u32::from(phase.progress)),
                Style::default().fg(phase_color(phase.status)),
            ),
            Span::styled(
                format!(" {:>3}% {}", phase.progress, phase.status),
                Style::default().fg(COLOR_MUTED),
            ),
        ]));
    }
    frame.render_widget(
        Paragraph::new(lines).block(panel(View::Phases.label())),
        chunks[0],
    );

    let Some(phase) = ws.phases.phases().get(app.phase_selected) else {
        return;
    };
    let caps = Capabilities::for_role(role);
    let mut detail: Vec<Line<'static>> = Vec::new();
    if !phase.description.is_empty() {
        detail.push(Line::from(Span::styled(
            phase.description.clone(),
            Style::default().fg(COLOR_TEXT),
        )));
    }
    detail.push(Line::from(vec![
        label_span("Schedule"),
        Span::styled(
            format!("{} to {}", phase.start_date, phase.end_date),
            Style::default().fg(COLOR_TEXT),
        ),
    ]));
    detail.push(Line::from(""));
    detail.push(section_header("Deliverables"));
    for (idx, deliverable) in phase.deliverables.iter().enumerate() {
        let mut style = Style::default().fg(COLOR_TEXT);
        if idx == app.deliverable_selected {
            style = style.add_modifier(Modifier::REVERSED);
        }
        detail.push(Line::from(vec![
            Span::styled(
                format!("{} {} ({})", deliverable.id, deliverable.name, deliverable.kind),
                style,
            ),
            Span::styled(
                format!("  {}", deliverable.status),
                Style::default().fg(deliverable_color(deliverable.status)),
            ),
        ]));
    }
    if !caps.approve_deliverables {
        detail.push(Line::from(Span::styled(
            "approval requires a sponsor, PMO head or PM",
            Style::default().fg(COLOR_MUTED_DARK),
        )));
    }
    detail.push(Line::from(""));
    detail.push(section_header("KPIs"));
    for kpi in &phase.kpis {
        let current = if kpi.current.is_empty() { "-" } else { kpi.current.as_str() };
        detail.push(Line::from(vec![
            Span::styled(
                format!("{}: {} / target {}", kpi.name, current, kpi.target),
                Style::default().fg(COLOR_TEXT),
            ),
            Span::styled(
                format!("  {}", kpi.status),
                Style::default().fg(kpi_color(kpi.status)),
            ),
        ]));
    }

    let widget = Paragraph::new(detail)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(COLOR_BORDER_DETAIL))
                .title(format!("Phase {}: {}", phase.id, phase.name)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, chunks[1]);
}

fn render_roles(frame: &mut Frame, app: &AppState, role: Role, area: Rect) {
    let Some(ws) = app.workspace.as_ref() else {
        return;
    };
    let editable = Capabilities::for_role(role).manage_permissions;
    let mut lines: Vec<Line<'static>> = Vec::new();

    let mut roles_line = vec![Span::styled(
        pad_text("", 28),
        Style::default().fg(COLOR_MUTED_DARK),
    )];
    for (idx, target) in Role::ALL.iter().enumerate() {
        let mut style = Style::default().fg(COLOR_ACCENT).add_modifier(Modifier::BOLD);
        if editable && idx == app.permission_role {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        roles_line.push(Span::styled(pad_text(role_short(*target), 5), style));
    }
    lines.push(Line::from(roles_line));

    let mut category = "";
    for (idx, permission) in ws.permissions.permissions().iter().enumerate() {
        if permission.category != category {
            category = permission.category.as_str();
            lines.push(section_header(category));
        }
        let row_selected = idx == app.permission_selected;
        let mut name_style = Style::default().fg(COLOR_TEXT);
        if row_selected {
            name_style = name_style.add_modifier(Modifier::BOLD);
        }
        let mut spans = vec![Span::styled(
            pad_text(&truncate_text(&permission.name, 27), 28),
            name_style,
        )];
        for (role_idx, target) in Role::ALL.iter().enumerate() {
            let granted = permission.is_granted(*target);
            let mut style = if granted {
                Style::default().fg(COLOR_SUCCESS)
            } else {
                Style::default().fg(COLOR_MUTED_DARK)
            };
            if editable && row_selected && role_idx == app.permission_role {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(pad_text(if granted { "yes" } else { "-" }, 5), style));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(section_header("Roles"));
    for target in Role::ALL {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<5}", role_short(target)),
                Style::default().fg(COLOR_ACCENT),
            ),
            Span::styled(
                format!("{} ({} users) ", target.display_name(), target.user_count()),
                Style::default().fg(COLOR_TEXT),
            ),
            Span::styled(target.description(), Style::default().fg(COLOR_MUTED)),
        ]));
    }
    if !editable {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Only administrators can change permissions.",
            Style::default().fg(COLOR_WARNING),
        )));
    }

    let widget = Paragraph::new(lines).block(panel(View::Roles.label()));
    frame.render_widget(widget, area);
}

fn render_settings(frame: &mut Frame, app: &AppState, role: Role, area: Rect) {
    let mut lines: Vec<Line<'static>> = Vec::new();
    lines.push(section_header("Account"));
    match app.user.as_ref() {
        Some(user) => {
            lines.push(Line::from(vec![
                label_span("Name"),
                Span::styled(user.name.clone(), Style::default().fg(COLOR_TEXT)),
            ]));
            lines.push(Line::from(vec![
                label_span("Email"),
                Span::styled(user.email.clone(), Style::default().fg(COLOR_TEXT)),
            ]));
            if !user.department.is_empty() {
                lines.push(Line::from(vec![
                    label_span("Department"),
                    Span::styled(user.department.clone(), Style::default().fg(COLOR_TEXT)),
                ]));
            }
        }
        None => lines.push(Line::from(Span::styled(
            "Acting without a session",
            Style::default().fg(COLOR_MUTED),
        ))),
    }
    lines.push(Line::from(vec![
        label_span("Role"),
        Span::styled(role.display_name(), Style::default().fg(COLOR_ACCENT)),
    ]));
    lines.push(Line::from(""));
    lines.push(section_header("Connection"));
    lines.push(Line::from(vec![
        label_span("API"),
        Span::styled(app.api_url.clone(), Style::default().fg(COLOR_TEXT)),
    ]));
    lines.push(Line::from(vec![
        label_span("Data"),
        Span::styled(
            app.source.map(|s| s.as_str()).unwrap_or("loading"),
            Style::default().fg(COLOR_INFO),
        ),
    ]));

    let widget = Paragraph::new(lines).block(panel(View::Settings.label()));
    frame.render_widget(widget, area);
}

fn render_assistant(frame: &mut Frame, app: &AppState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(area);

    let mut lines: Vec<Line<'static>> = Vec::new();
    for message in app.conversation.messages() {
        let (label, color) = match message.role {
            ChatRole::User => ("You", COLOR_ACCENT),
            ChatRole::Assistant => ("AI", COLOR_MAGENTA),
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{label} "),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                message.timestamp.format("%H:%M").to_string(),
                Style::default().fg(COLOR_MUTED_DARK),
            ),
        ]));
        for text in message.content.lines() {
            lines.push(Line::from(Span::styled(
                text.to_string(),
                Style::default().fg(COLOR_TEXT),
            )));
        }
        lines.push(Line::from(""));
    }
    if app.chat_pending {
        lines.push(Line::from(Span::styled(
            "AI is typing...",
            Style::default().fg(COLOR_MUTED),
        )));
    }
    if app.conversation.show_suggestions() {
        lines.push(section_header("Try asking (tab)"));
        for prompt in SUGGESTED_PROMPTS {
            lines.push(Line::from(Span::styled(
                format!("- {}", prompt.label),
                Style::default().fg(COLOR_INFO),
            )));
        }
    }

    let height = chunks[0].height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(height) as u16;
    let history = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(COLOR_MAGENTA))
                .title("AI Assistant"),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(history, chunks[0]);

    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(COLOR_MUTED_DARK)),
        Span::styled(app.chat_input.clone(), Style::default().fg(COLOR_TEXT)),
        Span::styled("_", Style::default().fg(COLOR_ACCENT)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(input, chunks[1]);
}

fn render_footer(frame: &mut Frame, app: &AppState, area: Rect) {
    let hint_span = Span::styled(app.footer_hint(), Style::default().fg(COLOR_INFO));
    let line = if let Some((status, kind)) = app.status_line() {
        let status_style = match kind {
            StatusKind::Error => Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
            StatusKind::Info => Style::default().fg(COLOR_WARNING),
        };
        Line::from(vec![
            hint_span,
            Span::raw("  |  "),
            Span::styled(status, status_style),
        ])
    } else {
        Line::from(hint_span)
    };
    let widget = Paragraph::new(line).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(COLOR_BORDER_LIST)),
    );
    frame.render_widget(widget, area);
}

fn render_login(frame: &mut Frame, app: &AppState, area: Rect) {
    let users = session::demo_users();
    let height = (users.len() as u16) + 8;
    let modal = centered_rect(64, height, area);
    frame.render_widget(Clear, modal);

    let mut lines: Vec<Line<'static>> = vec![
        Line::from(Span::styled(
            PROJECT_TITLE,
            Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Choose a demo account",
            Style::default().fg(COLOR_MUTED),
        )),
        Line::from(""),
    ];
    for (idx, user) in users.iter().enumerate() {
        let mut style = Style::default().fg(COLOR_TEXT);
        if idx == app.login_selected {
            style = style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(vec![
            Span::styled(pad_text(user.role.display_name(), 22), style),
            Span::styled(format!("{} ", user.name), Style::default().fg(COLOR_INFO)),
            Span::styled(user.email.clone(), Style::default().fg(COLOR_MUTED_DARK)),
        ]));
    }
    lines.push(Line::from(""));
    if let Some((status, kind)) = app.status_line() {
        let color = match kind {
            StatusKind::Error => COLOR_ERROR,
            StatusKind::Info => COLOR_WARNING,
        };
        lines.push(Line::from(Span::styled(status, Style::default().fg(color))));
    }
    lines.push(Line::from(Span::styled(
        app.footer_hint(),
        Style::default().fg(COLOR_MUTED_DARK),
    )));

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Log in"))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn render_form_modal(frame: &mut Frame, area: Rect, form: &TaskForm) {
    let height = (form.fields().len() as u16) + 6;
    let modal = centered_rect(60, height, area);
    frame.render_widget(Clear, modal);

    let mut lines: Vec<Line<'static>> = Vec::new();
    for (idx, field) in form.fields().iter().enumerate() {
        let active = idx == form.active_index();
        let marker = if field.required { "*" } else { " " };
        let label_style = if active {
            Style::default().fg(COLOR_ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(COLOR_MUTED)
        };
        let mut spans = vec![
            Span::styled(pad_text(&format!("{}{marker}", field.label), 12), label_style),
            Span::styled(field.value.clone(), Style::default().fg(COLOR_TEXT)),
        ];
        if active {
            spans.push(Span::styled("_", Style::default().fg(COLOR_ACCENT)));
        }
        if field.value.is_empty() && !field.hint.is_empty() {
            spans.push(Span::styled(
                format!(" {}", field.hint),
                Style::default().fg(COLOR_MUTED_DARK),
            ));
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(""));
    if let Some(error) = form.error() {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(COLOR_ERROR),
        )));
    }
    lines.push(Line::from(Span::styled(
        "tab next  enter submit on last field  esc cancel",
        Style::default().fg(COLOR_MUTED_DARK),
    )));

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("New card"))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, modal);
}

fn panel(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_BORDER_LIST))
        .title(title.to_string())
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn progress_bar(percent: u32) -> String {
    let filled = (percent.min(100) as usize * BAR_WIDTH) / 100;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn role_short(role: Role) -> &'static str {
    match role {
        Role::Sponsor => "SPN",
        Role::PmoHead => "PMO",
        Role::Pm => "PM",
        Role::Developer => "DEV",
        Role::Qa => "QA",
        Role::BusinessAnalyst => "BA",
        Role::Auditor => "AUD",
        Role::Admin => "ADM",
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => COLOR_ERROR,
        Priority::Medium => COLOR_WARNING,
        Priority::Low => COLOR_SUCCESS,
    }
}

fn phase_color(status: PhaseStatus) -> Color {
    match status {
        PhaseStatus::Completed => COLOR_SUCCESS,
        PhaseStatus::InProgress => COLOR_INFO,
        PhaseStatus::Pending => COLOR_MUTED_DARK,
    }
}

fn deliverable_color(status: DeliverableStatus) -> Color {
    match status {
        DeliverableStatus::Approved => COLOR_SUCCESS,
        DeliverableStatus::Rejected => COLOR_ERROR,
        DeliverableStatus::InReview => COLOR_WARNING,
        DeliverableStatus::Pending => COLOR_MUTED,
    }
}

fn kpi_color(status: KpiStatus) -> Color {
    match status {
        KpiStatus::Achieved => COLOR_SUCCESS,
        KpiStatus::OnTrack => COLOR_INFO,
        KpiStatus::AtRisk => COLOR_ERROR,
    }
}

fn pad_text(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }
    format!("{value}{}", " ".repeat(width - len))
}

fn truncate_text(value: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    if max <= 3 {
        return chars[..max].iter().collect();
    }
    let mut out: String = chars[..(max - 3)].iter().collect();
    out.push_str("...");
    out
}

fn label_span(label: &str) -> Span<'static> {
    Span::styled(format!("{label}: "), Style::default().fg(COLOR_MUTED_DARK))
}

fn section_header(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(COLOR_WARNING)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_is_fixed_width() {
        assert_eq!(progress_bar(0), ".".repeat(BAR_WIDTH));
        assert_eq!(progress_bar(250), "#".repeat(BAR_WIDTH));
        assert_eq!(progress_bar(50).matches('#').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn truncate_text_marks_cut_text() {
        assert_eq!(truncate_text("Kanban", 10), "Kanban");
        assert_eq!(truncate_text("Integrated Dashboard", 10), "Integra...");
        assert_eq!(truncate_text("abc", 0), "");
    }
}
