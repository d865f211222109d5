mod support;

use serde_json::Value;

use support::TestHome;

fn view_ids(value: &Value) -> Vec<String> {
    value["data"]["views"]
        .as_array()
        .expect("views")
        .iter()
        .filter_map(|view| view["id"].as_str().map(str::to_string))
        .collect()
}

#[test]
fn menus_follow_roles() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    let cases: [(&str, &[&str]); 8] = [
        ("sponsor", &["dashboard", "phases", "roles", "settings"]),
        ("pmo_head", &["dashboard", "phases", "kanban", "backlog", "roles", "settings"]),
        ("pm", &["dashboard", "phases", "kanban", "backlog", "settings"]),
        ("developer", &["dashboard", "kanban", "backlog", "settings"]),
        ("qa", &["dashboard", "kanban", "backlog", "settings"]),
        ("business_analyst", &["dashboard", "phases", "backlog", "settings"]),
        ("auditor", &["dashboard", "phases", "roles", "settings"]),
        ("admin", &["dashboard", "phases", "kanban", "backlog", "roles", "settings"]),
    ];

    for (role, expected) in cases {
        let value = home.json(&["--role", role, "menu"]);
        assert_eq!(value["data"]["role"], role);
        assert_eq!(view_ids(&value), expected, "menu for {role}");
    }
    Ok(())
}

#[test]
fn capabilities_are_reported() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;

    let auditor = home.json(&["--role", "auditor", "menu"]);
    assert_eq!(auditor["data"]["capabilities"]["use_assistant"], false);
    assert_eq!(auditor["data"]["capabilities"]["board_read_only"], true);

    let admin = home.json(&["--role", "admin", "menu"]);
    assert_eq!(admin["data"]["capabilities"]["manage_permissions"], true);
    Ok(())
}

#[test]
fn views_outside_the_menu_are_denied() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;

    let denied = home.json_failure(&["--role", "sponsor", "board", "show"], 3);
    assert_eq!(denied["error"]["kind"], "access_denied");
    assert_eq!(denied["error"]["details"]["role"], "sponsor");

    home.json_failure(&["--role", "developer", "phases", "list"], 3);
    home.json_failure(&["--role", "pm", "permissions", "show"], 3);
    home.json_failure(&["--role", "qa", "permissions", "show"], 3);
    Ok(())
}

#[test]
fn roles_lists_every_role() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    let value = home.json(&["--role", "developer", "roles"]);
    let roles = value["data"].as_array().expect("roles");
    assert_eq!(roles.len(), 8);
    assert_eq!(roles[0]["id"], "sponsor");
    assert!(roles.iter().all(|role| role["users"].as_u64().is_some()));
    Ok(())
}
