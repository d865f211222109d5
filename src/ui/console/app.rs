use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::api::mock::Workspace;
use crate::api::{ApiClient, ChatRequest, ChatResponse, DataSource, Fetched};
use crate::assistant::{simulate_reply, Conversation, SUGGESTED_PROMPTS};
use crate::backlog::{Backlog, Direction};
use crate::board::{MoveOutcome, Task};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::permission::RolePermissionUpdate;
use crate::phase::Deliverable;
use crate::role::{menu_for, Capabilities, Role, View};
use crate::session::{self, Session, User};

use super::form::{FormAction, TaskForm};
use super::view;

/// Everything the console needs from the command line.
pub struct LaunchOptions {
    pub config: Config,
    pub state_dir: PathBuf,
    pub session: Option<Session>,
    /// Known role; `None` opens the login picker.
    pub role: Option<Role>,
}

enum LoadRequest {
    Reload,
    Login(Role),
    Logout,
    Chat {
        request: ChatRequest,
        fallback: ChatResponse,
    },
    MoveTask {
        id: u64,
        to: String,
    },
    CreateTask(Task),
    Reorder {
        id: u64,
        direction: Direction,
        backlog: Backlog,
    },
    Approve {
        deliverable: Deliverable,
        approved: bool,
    },
    SetPermission(RolePermissionUpdate),
}

enum UiMsg {
    Loaded(Fetched<Workspace>),
    LoggedIn(Fetched<Session>),
    LoggedOut,
    ChatReply(Fetched<ChatResponse>),
    Saved { what: String, source: DataSource },
    Error(String),
}

#[derive(Clone, Copy)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

pub struct AppState {
    pub(crate) role: Option<Role>,
    pub(crate) user: Option<User>,
    pub(crate) login_selected: usize,
    pub(crate) view: View,
    pub(crate) workspace: Option<Workspace>,
    pub(crate) source: Option<DataSource>,
    pub(crate) board_column: usize,
    pub(crate) board_task: usize,
    pub(crate) backlog_selected: usize,
    pub(crate) phase_selected: usize,
    pub(crate) deliverable_selected: usize,
    pub(crate) permission_selected: usize,
    pub(crate) permission_role: usize,
    pub(crate) conversation: Conversation,
    pub(crate) chat_open: bool,
    pub(crate) chat_input: String,
    pub(crate) chat_pending: bool,
    suggestion_cursor: usize,
    pub(crate) form: Option<TaskForm>,
    pub(crate) api_url: String,
    status_message: Option<(String, StatusKind)>,
    tick: Duration,
}

impl AppState {
    fn new(options: LaunchOptions) -> Self {
        let user = options.session.map(|s| s.user);
        let role = options.role.or(user.as_ref().map(|u| u.role));
        Self {
            role,
            user,
            login_selected: Role::ALL
                .iter()
                .position(|r| Some(*r) == role)
                .unwrap_or(2),
            view: View::Dashboard,
            workspace: None,
            source: None,
            board_column: 0,
            board_task: 0,
            backlog_selected: 0,
            phase_selected: 0,
            deliverable_selected: 0,
            permission_selected: 0,
            permission_role: 0,
            conversation: Conversation::new(),
            chat_open: false,
            chat_input: String::new(),
            chat_pending: false,
            suggestion_cursor: 0,
            form: None,
            api_url: options.config.api.base_url.clone(),
            status_message: None,
            tick: Duration::from_millis(options.config.ui.tick_ms.max(10)),
        }
    }

    /// Sidebar entries for the current role.
    pub(crate) fn menu(&self) -> &'static [View] {
        self.role.map(menu_for).unwrap_or(&[])
    }

    pub(crate) fn caps(&self) -> Option<Capabilities> {
        self.role.map(Capabilities::for_role)
    }

    fn can(&self, check: impl Fn(&Capabilities) -> bool) -> bool {
        self.caps().map(|caps| check(&caps)).unwrap_or(false)
    }

    fn set_role(&mut self, role: Role) {
        self.role = Some(role);
        if !menu_for(role).contains(&self.view) {
            self.view = View::Dashboard;
        }
        if !Capabilities::for_role(role).use_assistant {
            self.chat_open = false;
        }
    }

    fn select_view(&mut self, index: usize) {
        if let Some(view) = self.menu().get(index) {
            self.view = *view;
        }
    }

    fn cycle_view(&mut self, delta: isize) {
        let menu = self.menu();
        if menu.is_empty() {
            return;
        }
        let current = menu.iter().position(|v| *v == self.view).unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(menu.len() as isize) as usize;
        self.view = menu[next];
    }

    pub(crate) fn selected_task(&self) -> Option<&Task> {
        self.workspace
            .as_ref()?
            .board
            .columns()
            .get(self.board_column)?
            .tasks
            .get(self.board_task)
    }

    pub(crate) fn status_line(&self) -> Option<(String, StatusKind)> {
        self.status_message.clone()
    }

    fn set_error(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), StatusKind::Error));
    }

    fn set_info(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), StatusKind::Info));
    }

    pub(crate) fn footer_hint(&self) -> String {
        if self.role.is_none() {
            return "j/k select  enter log in  q quit".to_string();
        }
        if self.form.is_some() {
            return "tab next field  enter on last field submits  esc cancel".to_string();
        }
        if self.chat_open {
            return "type a message  enter send  tab suggestion  esc close".to_string();
        }
        let view_keys = match self.view {
            View::Kanban if self.can(|c| c.edit_board) => {
                "h/l column  j/k card  </> move card  n new card"
            }
            View::Kanban => "h/l column  j/k card",
            View::Backlog if self.can(|c| c.manage_backlog) => "j/k story  K/J rank up/down",
            View::Backlog => "j/k story",
            View::Phases if self.can(|c| c.approve_deliverables) => {
                "j/k phase  h/l deliverable  y approve  x reject"
            }
            View::Phases => "j/k phase  h/l deliverable",
            View::Roles if self.can(|c| c.manage_permissions) => {
                "j/k permission  h/l role  space toggle"
            }
            View::Roles => "j/k permission",
            View::Settings => "o log out",
            View::Dashboard => "",
        };
        let assistant = if self.can(|c| c.use_assistant) {
            "  a assistant"
        } else {
            ""
        };
        format!("tab/1-9 views  {view_keys}{assistant}  r reload  q quit")
    }

    fn clamp_selection(&mut self) {
        let Some(ws) = self.workspace.as_ref() else {
            return;
        };
        let columns = ws.board.columns();
        self.board_column = self.board_column.min(columns.len().saturating_sub(1));
        let tasks = columns.get(self.board_column).map(|c| c.tasks.len()).unwrap_or(0);
        self.board_task = self.board_task.min(tasks.saturating_sub(1));
        self.backlog_selected = self
            .backlog_selected
            .min(ws.backlog.stories().len().saturating_sub(1));
        let phases = ws.phases.phases();
        self.phase_selected = self.phase_selected.min(phases.len().saturating_sub(1));
        let deliverables = phases
            .get(self.phase_selected)
            .map(|p| p.deliverables.len())
            .unwrap_or(0);
        self.deliverable_selected = self.deliverable_selected.min(deliverables.saturating_sub(1));
        self.permission_selected = self
            .permission_selected
            .min(ws.permissions.len().saturating_sub(1));
        self.permission_role = self.permission_role.min(Role::ALL.len() - 1);
    }
}

pub fn run(options: LaunchOptions) -> Result<()> {
    let (ui_tx, ui_rx) = mpsc::channel();
    let (req_tx, req_rx) = mpsc::channel();

    let token = options.session.as_ref().map(|s| s.token.clone());
    spawn_loader(
        options.config.clone(),
        options.state_dir.clone(),
        token,
        req_rx,
        ui_tx,
    );

    if req_tx.send(LoadRequest::Reload).is_err() {
        return Err(Error::OperationFailed(
            "failed to start data loader".to_string(),
        ));
    }

    let mut app = AppState::new(options);
    run_terminal(&mut app, ui_rx, req_tx)
}

fn run_terminal(
    app: &mut AppState,
    ui_rx: Receiver<UiMsg>,
    req_tx: Sender<LoadRequest>,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app, ui_rx, req_tx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    ui_rx: Receiver<UiMsg>,
    req_tx: Sender<LoadRequest>,
) -> Result<()> {
    let mut dirty = true;
    loop {
        while let Ok(msg) = ui_rx.try_recv() {
            handle_ui_msg(app, msg, &req_tx);
            dirty = true;
        }

        if dirty {
            terminal.draw(|frame| view::render(frame, app))?;
            dirty = false;
        }

        if event::poll(app.tick)? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(app, key, &req_tx) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }
    }
    Ok(())
}

fn handle_ui_msg(app: &mut AppState, msg: UiMsg, req_tx: &Sender<LoadRequest>) {
    match msg {
        UiMsg::Loaded(fetched) => {
            app.workspace = Some(fetched.value);
            app.source = Some(fetched.source);
            app.clamp_selection();
            if fetched.source.is_mock() {
                app.set_info("backend unavailable: showing sample data");
            }
        }
        UiMsg::LoggedIn(fetched) => {
            let user = fetched.value.user;
            app.set_role(user.role);
            app.login_selected = Role::ALL
                .iter()
                .position(|r| *r == user.role)
                .unwrap_or(0);
            app.set_info(format!("logged in as {} ({})", user.name, user.role.display_name()));
            app.user = Some(user);
            if fetched.source.is_mock() {
                app.source = Some(DataSource::Mock);
            }
            let _ = req_tx.send(LoadRequest::Reload);
        }
        UiMsg::LoggedOut => {
            app.set_info("logged out");
        }
        UiMsg::ChatReply(fetched) => {
            app.chat_pending = false;
            app.conversation.finish_turn(fetched.value);
            if fetched.source.is_mock() {
                app.source = Some(DataSource::Mock);
            }
        }
        UiMsg::Saved { what, source } => {
            if source.is_mock() {
                app.source = Some(DataSource::Mock);
                app.set_info(format!("{what} (local only: backend unavailable)"));
            } else {
                app.set_info(what);
            }
        }
        UiMsg::Error(err) => app.set_error(err),
    }
}

/// Returns true when the console should exit.
fn handle_key(app: &mut AppState, key: KeyEvent, req_tx: &Sender<LoadRequest>) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if app.role.is_none() {
        return handle_login_key(app, key, req_tx);
    }

    if app.form.is_some() {
        handle_form_key(app, key, req_tx);
        return false;
    }

    if app.chat_open {
        handle_chat_key(app, key, req_tx);
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Tab => app.cycle_view(1),
        KeyCode::BackTab => app.cycle_view(-1),
        KeyCode::Char(ch @ '1'..='9') => {
            let index = (ch as usize) - ('1' as usize);
            app.select_view(index);
        }
        KeyCode::Char('a') => {
            if app.can(|c| c.use_assistant) {
                app.chat_open = true;
            } else {
                app.set_error("your role cannot use the AI assistant");
            }
        }
        KeyCode::Char('r') => {
            if req_tx.send(LoadRequest::Reload).is_ok() {
                app.set_info("reloading");
            }
        }
        _ => match app.view {
            View::Kanban => handle_board_key(app, key, req_tx),
            View::Backlog => handle_backlog_key(app, key, req_tx),
            View::Phases => handle_phases_key(app, key, req_tx),
            View::Roles => handle_roles_key(app, key, req_tx),
            View::Settings => handle_settings_key(app, key, req_tx),
            View::Dashboard => {}
        },
    }
    false
}

fn handle_login_key(app: &mut AppState, key: KeyEvent, req_tx: &Sender<LoadRequest>) -> bool {
    let len = Role::ALL.len();
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Down | KeyCode::Char('j') => app.login_selected = (app.login_selected + 1) % len,
        KeyCode::Up | KeyCode::Char('k') => {
            app.login_selected = (app.login_selected + len - 1) % len
        }
        KeyCode::Enter => {
            let role = Role::ALL[app.login_selected % len];
            if req_tx.send(LoadRequest::Login(role)).is_ok() {
                app.set_info(format!("logging in as {}", role.display_name()));
            }
        }
        _ => {}
    }
    false
}

fn handle_form_key(app: &mut AppState, key: KeyEvent, req_tx: &Sender<LoadRequest>) {
    let Some(form) = app.form.as_mut() else {
        return;
    };
    match form.handle_key(key) {
        FormAction::None => {}
        FormAction::Cancel => {
            app.form = None;
            app.set_info("cancelled");
        }
        FormAction::Submit => {
            let input = match form.build() {
                Ok(input) => input,
                Err(err) => {
                    form.set_error(err);
                    return;
                }
            };
            let Some(ws) = app.workspace.as_mut() else {
                form.set_error("board not loaded yet".to_string());
                return;
            };
            match ws.board.add_task(input) {
                Ok(task) => {
                    let id = task.id;
                    app.form = None;
                    let _ = req_tx.send(LoadRequest::CreateTask(task));
                    app.set_info(format!("added #{id} to the backlog"));
                }
                Err(err) => form.set_error(err.to_string()),
            }
        }
    }
}

fn handle_chat_key(app: &mut AppState, key: KeyEvent, req_tx: &Sender<LoadRequest>) {
    match key.code {
        KeyCode::Esc => app.chat_open = false,
        KeyCode::Enter => send_chat(app, req_tx),
        KeyCode::Backspace => {
            app.chat_input.pop();
        }
        KeyCode::Tab if app.conversation.show_suggestions() => {
            let prompt = SUGGESTED_PROMPTS[app.suggestion_cursor % SUGGESTED_PROMPTS.len()];
            app.chat_input = prompt.prompt.to_string();
            app.suggestion_cursor += 1;
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.chat_input.push(ch);
        }
        _ => {}
    }
}

fn send_chat(app: &mut AppState, req_tx: &Sender<LoadRequest>) {
    if app.chat_pending {
        app.set_info("waiting for the assistant");
        return;
    }
    let request = match app.conversation.begin_turn(&app.chat_input) {
        Ok(request) => request,
        Err(err) => {
            app.set_error(err.to_string());
            return;
        }
    };
    let fallback = ChatResponse {
        session_id: app.conversation.session_id().unwrap_or_default().to_string(),
        reply: simulate_reply(&request.message).to_string(),
    };
    app.chat_input.clear();
    if req_tx.send(LoadRequest::Chat { request, fallback }).is_ok() {
        app.chat_pending = true;
    }
}

fn handle_board_key(app: &mut AppState, key: KeyEvent, req_tx: &Sender<LoadRequest>) {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => {
            app.board_column = app.board_column.saturating_sub(1);
            app.board_task = 0;
        }
        KeyCode::Right | KeyCode::Char('l') => {
            app.board_column += 1;
            app.board_task = 0;
        }
        KeyCode::Up | KeyCode::Char('k') => app.board_task = app.board_task.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => app.board_task += 1,
        KeyCode::Char('<') | KeyCode::Char('H') => move_selected_task(app, -1, req_tx),
        KeyCode::Char('>') | KeyCode::Char('L') => move_selected_task(app, 1, req_tx),
        KeyCode::Char('n') => {
            if app.can(|c| c.edit_board) {
                app.form = Some(TaskForm::new());
            } else {
                app.set_error("your role cannot edit the board");
            }
        }
        _ => {}
    }
    app.clamp_selection();
}

fn move_selected_task(app: &mut AppState, delta: isize, req_tx: &Sender<LoadRequest>) {
    if !app.can(|c| c.edit_board) {
        app.set_error("your role cannot edit the board");
        return;
    }
    let Some(ws) = app.workspace.as_mut() else {
        return;
    };
    let columns = ws.board.columns();
    let Some(task) = columns
        .get(app.board_column)
        .and_then(|column| column.tasks.get(app.board_task))
    else {
        return;
    };
    let id = task.id;
    let target = app.board_column as isize + delta;
    if target < 0 || target as usize >= columns.len() {
        return;
    }
    let target = target as usize;
    let to = columns[target].id.clone();

    match ws.board.move_task(id, &to) {
        Ok(MoveOutcome::Moved { .. }) => {
            app.board_column = target;
            app.board_task = ws.board.columns()[target].tasks.len().saturating_sub(1);
            let _ = req_tx.send(LoadRequest::MoveTask { id, to });
        }
        Ok(MoveOutcome::Unchanged) => {}
        Err(err) => app.set_error(err.to_string()),
    }
}

fn handle_backlog_key(app: &mut AppState, key: KeyEvent, req_tx: &Sender<LoadRequest>) {
    let direction = match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.backlog_selected = app.backlog_selected.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.backlog_selected += 1;
            None
        }
        KeyCode::Char('K') | KeyCode::Char('+') => Some(Direction::Up),
        KeyCode::Char('J') | KeyCode::Char('-') => Some(Direction::Down),
        _ => None,
    };
    if let Some(direction) = direction {
        reorder_selected_story(app, direction, req_tx);
    }
    app.clamp_selection();
}

fn reorder_selected_story(app: &mut AppState, direction: Direction, req_tx: &Sender<LoadRequest>) {
    if !app.can(|c| c.manage_backlog) {
        app.set_error("your role cannot manage the backlog");
        return;
    }
    let Some(ws) = app.workspace.as_mut() else {
        return;
    };
    let Some(id) = ws.backlog.stories().get(app.backlog_selected).map(|s| s.id) else {
        return;
    };
    match ws.backlog.reprioritize(id, direction) {
        Ok(true) => {
            app.backlog_selected = match direction {
                Direction::Up => app.backlog_selected.saturating_sub(1),
                Direction::Down => app.backlog_selected + 1,
            };
            let _ = req_tx.send(LoadRequest::Reorder {
                id,
                direction,
                backlog: ws.backlog.clone(),
            });
        }
        Ok(false) => {}
        Err(err) => app.set_error(err.to_string()),
    }
}

fn handle_phases_key(app: &mut AppState, key: KeyEvent, req_tx: &Sender<LoadRequest>) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.phase_selected = app.phase_selected.saturating_sub(1);
            app.deliverable_selected = 0;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.phase_selected += 1;
            app.deliverable_selected = 0;
        }
        KeyCode::Left | KeyCode::Char('h') => {
            app.deliverable_selected = app.deliverable_selected.saturating_sub(1)
        }
        KeyCode::Right | KeyCode::Char('l') => app.deliverable_selected += 1,
        KeyCode::Char('y') => decide_deliverable(app, true, req_tx),
        KeyCode::Char('x') => decide_deliverable(app, false, req_tx),
        _ => {}
    }
    app.clamp_selection();
}

fn decide_deliverable(app: &mut AppState, approved: bool, req_tx: &Sender<LoadRequest>) {
    if !app.can(|c| c.approve_deliverables) {
        app.set_error("your role cannot approve deliverables");
        return;
    }
    let Some(ws) = app.workspace.as_mut() else {
        return;
    };
    let Some(id) = ws
        .phases
        .phases()
        .get(app.phase_selected)
        .and_then(|phase| phase.deliverables.get(app.deliverable_selected))
        .map(|d| d.id.clone())
    else {
        return;
    };
    match ws.phases.approve_deliverable(&id, approved) {
        Ok(deliverable) => {
            let _ = req_tx.send(LoadRequest::Approve {
                deliverable,
                approved,
            });
        }
        Err(err) => app.set_error(err.to_string()),
    }
}

fn handle_roles_key(app: &mut AppState, key: KeyEvent, req_tx: &Sender<LoadRequest>) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.permission_selected = app.permission_selected.saturating_sub(1)
        }
        KeyCode::Down | KeyCode::Char('j') => app.permission_selected += 1,
        KeyCode::Left | KeyCode::Char('h') => {
            app.permission_role = app.permission_role.saturating_sub(1)
        }
        KeyCode::Right | KeyCode::Char('l') => app.permission_role += 1,
        KeyCode::Char(' ') | KeyCode::Enter => toggle_permission(app, req_tx),
        _ => {}
    }
    app.clamp_selection();
}

fn toggle_permission(app: &mut AppState, req_tx: &Sender<LoadRequest>) {
    let Some(actor) = app.role else {
        return;
    };
    let target = Role::ALL[app.permission_role % Role::ALL.len()];
    let Some(ws) = app.workspace.as_mut() else {
        return;
    };
    let Some(id) = ws
        .permissions
        .permissions()
        .get(app.permission_selected)
        .map(|p| p.id.clone())
    else {
        return;
    };
    let result = ws
        .permissions
        .prepare_toggle(actor, target, &id)
        .and_then(|update| ws.permissions.apply(&update).map(|_| update));
    match result {
        Ok(update) => {
            let _ = req_tx.send(LoadRequest::SetPermission(update));
        }
        Err(err) => app.set_error(err.to_string()),
    }
}

fn handle_settings_key(app: &mut AppState, key: KeyEvent, req_tx: &Sender<LoadRequest>) {
    if key.code == KeyCode::Char('o') && req_tx.send(LoadRequest::Logout).is_ok() {
        app.role = None;
        app.user = None;
        app.chat_open = false;
        app.chat_pending = false;
        app.conversation = Conversation::new();
        app.view = View::Dashboard;
    }
}

fn spawn_loader(
    config: Config,
    state_dir: PathBuf,
    token: Option<String>,
    req_rx: Receiver<LoadRequest>,
    ui_tx: Sender<UiMsg>,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.send(UiMsg::Error(format!("failed to start runtime: {err}")));
                return;
            }
        };
        let mut client = match runtime.block_on(ApiClient::connect(&config.api, token)) {
            Ok(client) => client,
            Err(err) => {
                let _ = ui_tx.send(UiMsg::Error(format!("API client error: {err}")));
                return;
            }
        };
        let typing_delay = config.assistant.reply_delay();

        while let Ok(req) = req_rx.recv() {
            let msg = runtime.block_on(handle_request(&mut client, &state_dir, typing_delay, req));
            if ui_tx.send(msg).is_err() {
                break;
            }
        }
    });
}

async fn handle_request(
    client: &mut ApiClient,
    state_dir: &Path,
    typing_delay: Duration,
    req: LoadRequest,
) -> UiMsg {
    match req {
        LoadRequest::Reload => UiMsg::Loaded(client.load_workspace().await),
        LoadRequest::Login(role) => match session::demo_login(client, role).await {
            Ok(fetched) => match fetched.value.save(state_dir) {
                Ok(_) => UiMsg::LoggedIn(fetched),
                Err(err) => UiMsg::Error(format!("failed to save session: {err}")),
            },
            Err(err) => UiMsg::Error(err.to_string()),
        },
        LoadRequest::Logout => {
            client.clear_token();
            match Session::clear(state_dir) {
                Ok(_) => {
                    tracing::info!("logged out");
                    UiMsg::LoggedOut
                }
                Err(err) => UiMsg::Error(format!("failed to clear session: {err}")),
            }
        }
        LoadRequest::Chat { request, fallback } => {
            UiMsg::ChatReply(client.send_chat(&request, fallback, typing_delay).await)
        }
        LoadRequest::MoveTask { id, to } => {
            let fetched = client.move_task(id, &to).await;
            saved(format!("moved #{id} to {to}"), fetched.source)
        }
        LoadRequest::CreateTask(task) => {
            let id = task.id;
            let fetched = client.create_task(task).await;
            saved(format!("saved #{id}"), fetched.source)
        }
        LoadRequest::Reorder {
            id,
            direction,
            backlog,
        } => {
            let fetched = client.update_story_priority(id, direction, backlog).await;
            saved(format!("reranked story #{id}"), fetched.source)
        }
        LoadRequest::Approve {
            deliverable,
            approved,
        } => {
            let verb = if approved { "approved" } else { "rejected" };
            let fetched = client.approve_deliverable(deliverable, approved).await;
            saved(format!("{verb} {}", fetched.value.name), fetched.source)
        }
        LoadRequest::SetPermission(update) => {
            let fetched = client.update_role_permission(update).await;
            let verb = if fetched.value.granted { "granted" } else { "revoked" };
            saved(
                format!("{} {verb} for {}", fetched.value.permission_id, fetched.value.role),
                fetched.source,
            )
        }
    }
}

fn saved(what: String, source: DataSource) -> UiMsg {
    UiMsg::Saved { what, source }
}
