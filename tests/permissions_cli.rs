mod support;

use serde_json::Value;

use support::TestHome;

fn permission_ids(value: &Value) -> Vec<String> {
    value["data"]["permissions"]
        .as_array()
        .expect("permissions")
        .iter()
        .filter_map(|perm| perm["id"].as_str().map(str::to_string))
        .collect()
}

#[test]
fn matrix_lists_all_permissions() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    let value = home.json(&["--role", "admin", "permissions", "show"]);

    let ids = permission_ids(&value);
    assert_eq!(ids.len(), 13);
    assert_eq!(ids[0], "view_dashboard");
    assert!(value["data"].get("role").is_none());
    assert_eq!(value["data"]["permissions"][5]["roles"]["sponsor"], true);
    Ok(())
}

#[test]
fn matrix_filters_by_role() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    let value = home.json(&["--role", "auditor", "permissions", "show", "--for", "sponsor"]);

    assert_eq!(value["data"]["role"], "sponsor");
    let ids = permission_ids(&value);
    assert!(ids.contains(&"approve_budget".to_string()));
    assert!(!ids.contains(&"manage_users".to_string()));

    home.json_failure(
        &["--role", "auditor", "permissions", "show", "--for", "ceo"],
        2,
    );
    Ok(())
}

#[test]
fn admin_toggles_a_grant() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;

    let granted = home.json(&["--role", "admin", "permissions", "toggle", "qa", "manage_wbs"]);
    assert_eq!(granted["data"]["role"], "qa");
    assert_eq!(granted["data"]["permissionId"], "manage_wbs");
    assert_eq!(granted["data"]["granted"], true);
    assert_eq!(granted["data"]["source"], "mock");
    assert!(granted["warnings"]
        .as_array()
        .expect("warnings")
        .iter()
        .any(|w| w == "change was not persisted"));

    let revoked = home.json(&["--role", "admin", "permissions", "toggle", "pm", "manage_wbs"]);
    assert_eq!(revoked["data"]["granted"], false);
    Ok(())
}

#[test]
fn only_admins_toggle_grants() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    let denied = home.json_failure(
        &["--role", "pmo_head", "permissions", "toggle", "qa", "manage_wbs"],
        3,
    );
    assert_eq!(denied["error"]["details"]["role"], "pmo_head");

    home.json_failure(
        &["--role", "admin", "permissions", "toggle", "qa", "launch_rockets"],
        2,
    );
    Ok(())
}
