use std::time::Duration;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{health_url, mock, Ack, ChatRequest, ChatResponse, Fetched, TaskMove};
use crate::backlog::{Backlog, Direction, Story, StoryStatus};
use crate::board::{Board, Task};
use crate::config::ApiConfig;
use crate::dashboard::{Activity, DashboardStats};
use crate::error::{Error, Result};
use crate::permission::{PermissionMatrix, RolePermissionUpdate};
use crate::phase::{Deliverable, Kpi, PhasePlan, PhaseUpdate};
use crate::session::{LoginRequest, LoginResponse};

/// One HTTP call against the API base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.body = serde_json::to_value(body).ok();
        self
    }

    pub fn query(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.query.push((key.to_string(), value.to_string()));
        }
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Backend client holding the bearer token and the sticky mock flag.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    use_mock: bool,
    health_timeout: Duration,
    request_timeout: Duration,
    chat_timeout: Duration,
    mock_delay: Duration,
}

impl ApiClient {
    /// Build a client without probing the backend. Offline configs start in
    /// mock mode.
    pub fn new(config: &ApiConfig, token: Option<String>) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
            use_mock: config.offline,
            health_timeout: config.health_timeout(),
            request_timeout: config.request_timeout(),
            chat_timeout: config.chat_timeout(),
            mock_delay: config.mock_delay(),
        })
    }

    /// Build a client and run the health probe unless offline.
    pub async fn connect(config: &ApiConfig, token: Option<String>) -> Result<Self> {
        let mut client = Self::new(config, token)?;
        if !client.use_mock {
            client.probe().await;
        }
        Ok(client)
    }

    /// Check `/health`; any failure switches to mock mode.
    pub async fn probe(&mut self) -> bool {
        let url = health_url(&self.base_url);
        let healthy = match self
            .http
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::debug!(%url, error = %err, "health probe failed");
                false
            }
        };
        if !healthy {
            tracing::warn!(%url, "backend not available, using mock data");
            self.use_mock = true;
        }
        healthy
    }

    pub fn is_mock(&self) -> bool {
        self.use_mock
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Try the backend, falling back to `mock` after the mock delay.
    pub async fn fetch_with_fallback<T: DeserializeOwned>(
        &mut self,
        request: ApiRequest,
        mock: T,
    ) -> Fetched<T> {
        let delay = self.mock_delay;
        self.fetch_or(request, mock, delay).await
    }

    async fn fetch_or<T: DeserializeOwned>(
        &mut self,
        request: ApiRequest,
        mock: T,
        delay: Duration,
    ) -> Fetched<T> {
        if self.use_mock {
            tokio::time::sleep(delay).await;
            return Fetched::mock(mock);
        }

        let path = request.path.clone();
        match self.send(request).await {
            Ok(value) => Fetched::live(value),
            Err(err) => {
                tracing::warn!(endpoint = %path, error = %err, "API call failed, using mock data");
                self.use_mock = true;
                Fetched::mock(mock)
            }
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let url = format!("{}{}", self.base_url, request.path);
        tracing::debug!(method = %request.method, %url, "API request");

        let mut builder = self
            .http
            .request(request.method, &url)
            .timeout(request.timeout.unwrap_or(self.request_timeout))
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api {
                endpoint: request.path,
                status: status.as_u16(),
            });
        }

        let payload: Value = response.json().await?;
        decode_payload(payload)
    }

    pub async fn login(&mut self, request: &LoginRequest, mock: LoginResponse) -> Fetched<LoginResponse> {
        self.fetch_with_fallback(ApiRequest::post("/auth/login").json(request), mock)
            .await
    }

    pub async fn dashboard_stats(&mut self) -> Fetched<DashboardStats> {
        self.fetch_with_fallback(ApiRequest::get("/dashboard/stats"), mock::dashboard_stats())
            .await
    }

    pub async fn activities(&mut self) -> Fetched<Vec<Activity>> {
        self.fetch_with_fallback(ApiRequest::get("/dashboard/activities"), mock::activities())
            .await
    }

    pub async fn phases(&mut self) -> Fetched<PhasePlan> {
        self.fetch_with_fallback(ApiRequest::get("/phases"), mock::phases())
            .await
    }

    pub async fn update_phase(&mut self, phase_id: u32, update: PhaseUpdate) -> Fetched<PhaseUpdate> {
        let request = ApiRequest::put(format!("/phases/{phase_id}")).json(&update);
        self.fetch_with_fallback(request, update).await
    }

    pub async fn phase_deliverables(&mut self, phase_id: u32) -> Fetched<Vec<Deliverable>> {
        let fallback = mock::phases()
            .get(phase_id)
            .map(|phase| phase.deliverables.clone())
            .unwrap_or_default();
        self.fetch_with_fallback(
            ApiRequest::get(format!("/phases/{phase_id}/deliverables")),
            fallback,
        )
        .await
    }

    pub async fn update_deliverable(
        &mut self,
        phase_id: u32,
        deliverable: Deliverable,
    ) -> Fetched<Deliverable> {
        let request = ApiRequest::put(format!(
            "/phases/{phase_id}/deliverables/{}",
            deliverable.id
        ))
        .json(&deliverable);
        self.fetch_with_fallback(request, deliverable).await
    }

    /// `updated` is the locally approved or rejected deliverable.
    pub async fn approve_deliverable(
        &mut self,
        updated: Deliverable,
        approved: bool,
    ) -> Fetched<Deliverable> {
        let request = ApiRequest::post(format!("/deliverables/{}/approval", updated.id))
            .json(&serde_json::json!({ "approved": approved }));
        self.fetch_with_fallback(request, updated).await
    }

    pub async fn phase_kpis(&mut self, phase_id: u32) -> Fetched<Vec<Kpi>> {
        let fallback = mock::phases()
            .get(phase_id)
            .map(|phase| phase.kpis.clone())
            .unwrap_or_default();
        self.fetch_with_fallback(ApiRequest::get(format!("/phases/{phase_id}/kpis")), fallback)
            .await
    }

    pub async fn create_kpi(&mut self, phase_id: u32, kpi: Kpi) -> Fetched<Kpi> {
        let request = ApiRequest::post(format!("/phases/{phase_id}/kpis")).json(&kpi);
        self.fetch_with_fallback(request, kpi).await
    }

    pub async fn update_kpi(&mut self, phase_id: u32, kpi: Kpi) -> Fetched<Kpi> {
        let request = ApiRequest::put(format!("/phases/{phase_id}/kpis/{}", kpi.id)).json(&kpi);
        self.fetch_with_fallback(request, kpi).await
    }

    pub async fn delete_kpi(&mut self, phase_id: u32, kpi_id: &str) -> Fetched<Ack> {
        self.fetch_with_fallback(
            ApiRequest::delete(format!("/phases/{phase_id}/kpis/{kpi_id}")),
            Ack::new("KPI deleted"),
        )
        .await
    }

    pub async fn task_columns(&mut self) -> Fetched<Board> {
        self.fetch_with_fallback(ApiRequest::get("/tasks/columns"), mock::board())
            .await
    }

    pub async fn create_task(&mut self, task: Task) -> Fetched<Task> {
        let request = ApiRequest::post("/tasks").json(&task);
        self.fetch_with_fallback(request, task).await
    }

    pub async fn update_task(&mut self, task: Task) -> Fetched<Task> {
        let request = ApiRequest::put(format!("/tasks/{}", task.id)).json(&task);
        self.fetch_with_fallback(request, task).await
    }

    pub async fn move_task(&mut self, task_id: u64, to_column: &str) -> Fetched<TaskMove> {
        let body = TaskMove {
            task_id,
            to_column: to_column.to_string(),
        };
        let request = ApiRequest::put(format!("/tasks/{task_id}/move"))
            .json(&serde_json::json!({ "toColumn": to_column }));
        self.fetch_with_fallback(request, body).await
    }

    pub async fn delete_task(&mut self, task_id: u64) -> Fetched<Ack> {
        self.fetch_with_fallback(
            ApiRequest::delete(format!("/tasks/{task_id}")),
            Ack::new("Task deleted"),
        )
        .await
    }

    /// Stories filtered server-side; the fallback applies the same filter
    /// to the sample backlog.
    pub async fn stories(&mut self, status: Option<StoryStatus>, epic: Option<&str>) -> Fetched<Backlog> {
        let fallback = Backlog::new(
            mock::backlog()
                .filter(status, epic)
                .into_iter()
                .cloned()
                .collect(),
        );
        let request = ApiRequest::get("/stories")
            .query("status", status.map(StoryStatus::as_str))
            .query("epic", epic);
        self.fetch_with_fallback(request, fallback).await
    }

    pub async fn epics(&mut self) -> Fetched<Vec<String>> {
        self.fetch_with_fallback(ApiRequest::get("/stories/epics"), mock::backlog().epics())
            .await
    }

    pub async fn create_story(&mut self, story: Story) -> Fetched<Story> {
        let request = ApiRequest::post("/stories").json(&story);
        self.fetch_with_fallback(request, story).await
    }

    pub async fn update_story(&mut self, story: Story) -> Fetched<Story> {
        let request = ApiRequest::put(format!("/stories/{}", story.id)).json(&story);
        self.fetch_with_fallback(request, story).await
    }

    /// `reordered` is the backlog after the local swap.
    pub async fn update_story_priority(
        &mut self,
        story_id: u64,
        direction: Direction,
        reordered: Backlog,
    ) -> Fetched<Backlog> {
        let request = ApiRequest::put(format!("/stories/{story_id}/priority"))
            .json(&serde_json::json!({ "direction": direction }));
        self.fetch_with_fallback(request, reordered).await
    }

    pub async fn permissions(&mut self) -> Fetched<PermissionMatrix> {
        self.fetch_with_fallback(ApiRequest::get("/permissions"), mock::permissions())
            .await
    }

    pub async fn update_role_permission(
        &mut self,
        update: RolePermissionUpdate,
    ) -> Fetched<RolePermissionUpdate> {
        let request = ApiRequest::put("/permissions/role").json(&update);
        self.fetch_with_fallback(request, update).await
    }

    /// Load every dataset the screens need. The result is labelled mock if
    /// any part of it came from the sample data.
    pub async fn load_workspace(&mut self) -> Fetched<mock::Workspace> {
        let stats = self.dashboard_stats().await;
        let activities = self.activities().await;
        let phases = self.phases().await;
        let board = self.task_columns().await;
        let backlog = self.stories(None, None).await;
        let permissions = self.permissions().await;

        let any_mock = [
            stats.source,
            activities.source,
            phases.source,
            board.source,
            backlog.source,
            permissions.source,
        ]
        .iter()
        .any(|source| source.is_mock());

        let workspace = mock::Workspace {
            stats: stats.value,
            activities: activities.value,
            phases: phases.value,
            board: board.value,
            backlog: backlog.value,
            permissions: permissions.value,
        };
        if any_mock {
            Fetched::mock(workspace)
        } else {
            Fetched::live(workspace)
        }
    }

    /// Chat uses the long chat timeout and the typing delay for its fallback.
    pub async fn send_chat(
        &mut self,
        request: &ChatRequest,
        fallback: ChatResponse,
        typing_delay: Duration,
    ) -> Fetched<ChatResponse> {
        let call = ApiRequest::post("/chat/message")
            .json(request)
            .timeout(self.chat_timeout);
        let mut fetched = self.fetch_or(call, fallback, typing_delay).await;
        if fetched.source.is_mock() && fetched.value.session_id.is_empty() {
            fetched.value.session_id = mock::chat_session_id();
        }
        fetched
    }
}

/// Accept either a raw payload or one wrapped in `{ "data": ... }`.
fn decode_payload<T: DeserializeOwned>(payload: Value) -> Result<T> {
    if let Value::Object(map) = &payload {
        if let Some(inner) = map.get("data") {
            if let Ok(value) = serde_json::from_value(inner.clone()) {
                return Ok(value);
            }
        }
    }
    Ok(serde_json::from_value(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn offline_config() -> ApiConfig {
        ApiConfig {
            offline: true,
            mock_delay_ms: 0,
            ..ApiConfig::default()
        }
    }

    #[test]
    fn decode_unwraps_data_envelope() {
        let value: Vec<u32> = decode_payload(json!({ "data": [1, 2, 3] })).expect("decode");
        assert_eq!(value, vec![1, 2, 3]);
        let value: Vec<u32> = decode_payload(json!([4])).expect("decode");
        assert_eq!(value, vec![4]);
    }

    #[test]
    fn decode_keeps_objects_with_data_field() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            data: String,
            extra: u32,
        }
        let value: Wrapper = decode_payload(json!({ "data": "x", "extra": 3 })).expect("decode");
        assert_eq!(value.data, "x");
        assert_eq!(value.extra, 3);
    }

    #[test]
    fn query_skips_empty_values() {
        let request = ApiRequest::get("/stories")
            .query("status", None)
            .query("epic", Some(""))
            .query("epic", Some("AI Model"));
        assert_eq!(
            request.query,
            vec![("epic".to_string(), "AI Model".to_string())]
        );
    }

    #[tokio::test]
    async fn offline_client_serves_mock_data() {
        let mut client = ApiClient::connect(&offline_config(), None)
            .await
            .expect("client");
        assert!(client.is_mock());

        let stats = client.dashboard_stats().await;
        assert!(stats.source.is_mock());
        assert_eq!(stats.value.overall_progress, 62);

        let board = client.task_columns().await;
        assert_eq!(board.value.total_tasks(), 10);
    }

    #[tokio::test]
    async fn mutation_fallback_echoes_input() {
        let mut client = ApiClient::new(&offline_config(), Some("t".to_string())).expect("client");
        let fetched = client.move_task(3, "done").await;
        assert_eq!(
            fetched.value,
            TaskMove {
                task_id: 3,
                to_column: "done".to_string()
            }
        );
        let ack = client.delete_kpi(3, "k3-1").await;
        assert_eq!(ack.value.message, "KPI deleted");
    }

    #[tokio::test]
    async fn offline_story_fallback_applies_filters() {
        let mut client = ApiClient::new(&offline_config(), None).expect("client");
        let stories = client.stories(Some(StoryStatus::Completed), None).await;
        assert_eq!(stories.value.stories().len(), 2);
    }

    #[tokio::test]
    async fn token_can_be_replaced_and_cleared() {
        let mut client = ApiClient::new(&offline_config(), None).expect("client");
        assert!(client.token().is_none());
        client.set_token("abc");
        assert_eq!(client.token(), Some("abc"));
        client.clear_token();
        assert!(client.token().is_none());
    }
}
