use pms::error::{exit_codes, Error, JsonError};

#[test]
fn exit_codes_map_correctly() {
    let user = Error::InvalidArgument("bad".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    let denied = Error::AccessDenied {
        role: "developer".to_string(),
        action: "open phases".to_string(),
    };
    assert_eq!(denied.exit_code(), exit_codes::ACCESS_DENIED);

    let api = Error::Api {
        endpoint: "/tasks/columns".to_string(),
        status: 500,
    };
    assert_eq!(api.exit_code(), exit_codes::OPERATION_FAILED);

    let op = Error::OperationFailed("boom".to_string());
    assert_eq!(op.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn json_error_includes_code_and_details() {
    let err = Error::TaskNotFound(42);
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::USER_ERROR);
    assert!(json.error.contains("Task not found: 42"));
    assert_eq!(json.details, Some(serde_json::json!({ "id": 42 })));
}

#[test]
fn access_denied_names_role_and_action() {
    let err = Error::AccessDenied {
        role: "auditor".to_string(),
        action: "use the AI assistant".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Access denied: role auditor cannot use the AI assistant"
    );
    let details = err.details().expect("details");
    assert_eq!(details["role"], "auditor");
    assert_eq!(details["action"], "use the AI assistant");
}

#[test]
fn operation_failures_carry_no_details() {
    let err = Error::OperationFailed("terminal closed".to_string());
    assert!(err.details().is_none());
}
