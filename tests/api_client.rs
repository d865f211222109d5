use pms::api::{ApiClient, DataSource};
use pms::board::Board;
use pms::config::ApiConfig;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: format!("{}/api", server.uri()),
        mock_delay_ms: 0,
        ..ApiConfig::default()
    }
}

async fn healthy_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn healthy_backend_serves_live_data() {
    let server = healthy_server().await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "overallProgress": 40,
            "budgetUsage": 30,
            "budgetTotal": 2000,
            "budgetUsed": 600,
            "activeIssues": 2,
            "highPriorityIssues": 1,
            "completedTasks": 12,
            "totalTasks": 40
        })))
        .mount(&server)
        .await;

    let mut client = ApiClient::connect(&config_for(&server), None)
        .await
        .expect("client");
    assert!(!client.is_mock());

    let stats = client.dashboard_stats().await;
    assert_eq!(stats.source, DataSource::Live);
    assert_eq!(stats.value.overall_progress, 40);
    assert_eq!(stats.value.budget_total, 2000);
}

#[tokio::test]
async fn data_envelopes_are_unwrapped() {
    let server = healthy_server().await;
    Mock::given(method("GET"))
        .and(path("/api/stories/epics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": ["OCR Engine", "Billing"] })),
        )
        .mount(&server)
        .await;

    let mut client = ApiClient::connect(&config_for(&server), None)
        .await
        .expect("client");
    let epics = client.epics().await;
    assert_eq!(epics.source, DataSource::Live);
    assert_eq!(epics.value, ["OCR Engine", "Billing"]);
}

#[tokio::test]
async fn failed_call_switches_to_mock_for_good() {
    let server = healthy_server().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks/columns"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = ApiClient::connect(&config_for(&server), None)
        .await
        .expect("client");

    let first = client.task_columns().await;
    assert_eq!(first.source, DataSource::Mock);
    assert_eq!(first.value, Board::sample());
    assert!(client.is_mock());

    let second = client.task_columns().await;
    assert_eq!(second.source, DataSource::Mock);
}

#[tokio::test]
async fn unhealthy_backend_starts_in_mock_mode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/phases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = ApiClient::connect(&config_for(&server), None)
        .await
        .expect("client");
    assert!(client.is_mock());

    let phases = client.phases().await;
    assert_eq!(phases.source, DataSource::Mock);
    assert_eq!(phases.value.phases().len(), 6);
}

#[tokio::test]
async fn requests_carry_the_bearer_token_and_filters() {
    let server = healthy_server().await;
    Mock::given(method("GET"))
        .and(path("/api/stories"))
        .and(header("authorization", "Bearer secret-token"))
        .and(query_param("status", "completed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 40,
                "title": "Archive scanned claims",
                "priority": "low",
                "storyPoints": 2,
                "status": "completed",
                "epic": "Infrastructure"
            }
        ])))
        .mount(&server)
        .await;

    let mut client = ApiClient::connect(&config_for(&server), Some("secret-token".to_string()))
        .await
        .expect("client");
    let stories = client
        .stories(Some(pms::backlog::StoryStatus::Completed), None)
        .await;

    assert_eq!(stories.source, DataSource::Live);
    assert_eq!(stories.value.stories().len(), 1);
    assert_eq!(stories.value.stories()[0].id, 40);
}

#[tokio::test]
async fn live_login_returns_backend_user() {
    let server = healthy_server().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "jwt-from-backend",
            "user": {
                "id": "7",
                "name": "Sujin Han",
                "role": "pmo_head",
                "email": "han@insuretech.com"
            }
        })))
        .mount(&server)
        .await;

    let mut client = ApiClient::connect(&config_for(&server), None)
        .await
        .expect("client");
    let session = pms::session::login(&mut client, "han@insuretech.com", "pw", pms::role::Role::Pm)
        .await
        .expect("login");

    assert_eq!(session.source, DataSource::Live);
    assert_eq!(session.value.token, "jwt-from-backend");
    assert_eq!(session.value.user.role, pms::role::Role::PmoHead);
    assert_eq!(client.token(), Some("jwt-from-backend"));
}

#[tokio::test]
async fn chat_falls_back_to_canned_reply() {
    let server = healthy_server().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/message"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let mut client = ApiClient::connect(&config_for(&server), None)
        .await
        .expect("client");
    let mut conversation = pms::assistant::Conversation::new();
    let reply = conversation
        .send(&mut client, "weekly report please", std::time::Duration::ZERO)
        .await
        .expect("reply");

    assert_eq!(reply.source, DataSource::Mock);
    assert!(conversation.session_id().is_some());
    assert_eq!(conversation.messages().len(), 3);
}
