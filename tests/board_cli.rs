mod support;

use serde_json::Value;

use support::TestHome;

fn column_ids(value: &Value) -> Vec<String> {
    value["data"]["columns"]
        .as_array()
        .expect("columns")
        .iter()
        .filter_map(|column| column["id"].as_str().map(str::to_string))
        .collect()
}

#[test]
fn board_show_lists_six_columns_from_sample_data() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    let value = home.json(&["--role", "developer", "board", "show"]);

    assert_eq!(
        column_ids(&value),
        ["backlog", "sprint", "inProgress", "review", "testing", "done"]
    );
    assert_eq!(value["data"]["source"], "mock");
    assert!(value["warnings"][0]
        .as_str()
        .unwrap_or_default()
        .contains("sample data"));
    Ok(())
}

#[test]
fn board_show_filters_one_column() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    let value = home.json(&["--role", "qa", "board", "show", "--column", "inProgress"]);
    assert_eq!(column_ids(&value), ["inProgress"]);
    let tasks = value["data"]["columns"][0]["tasks"].as_array().expect("tasks");
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["isFirefighting"], true);

    let missing = home.json_failure(&["--role", "qa", "board", "show", "--column", "blocked"], 2);
    assert_eq!(missing["error"]["details"]["id"], "blocked");
    Ok(())
}

#[test]
fn board_move_reports_outcome() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;

    let moved = home.json(&["--role", "pm", "board", "move", "1", "sprint"]);
    assert_eq!(moved["data"]["task_id"], 1);
    assert_eq!(moved["data"]["outcome"], "moved");
    assert_eq!(moved["data"]["from"], "backlog");
    assert_eq!(moved["data"]["to"], "sprint");

    let same = home.json(&["--role", "pm", "board", "move", "1", "backlog"]);
    assert_eq!(same["data"]["outcome"], "unchanged");

    home.json_failure(&["--role", "pm", "board", "move", "99", "done"], 2);
    home.json_failure(&["--role", "pm", "board", "move", "1", "archive"], 2);
    Ok(())
}

#[test]
fn read_only_roles_cannot_edit_cards() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    let denied = home.json_failure(&["--role", "pmo_head", "board", "move", "1", "sprint"], 3);
    assert_eq!(denied["error"]["kind"], "access_denied");

    home.json_failure(&["--role", "admin", "board", "rm", "1"], 3);
    Ok(())
}

#[test]
fn board_add_applies_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    let value = home.json(&[
        "--role",
        "developer",
        "board",
        "add",
        "--title",
        "Tune OCR thresholds",
        "--assignee",
        "Minsu Park",
        "--due",
        "2025-09-01",
        "--labels",
        "OCR, , Tuning",
    ]);

    let task = &value["data"]["task"];
    assert_eq!(task["id"], 11);
    assert_eq!(task["priority"], "medium");
    assert_eq!(task["storyPoints"], 5);
    assert_eq!(task["dueDate"], "2025-09-01");
    assert_eq!(task["labels"], serde_json::json!(["OCR", "Tuning"]));
    assert_eq!(task["isFirefighting"], false);
    Ok(())
}

#[test]
fn board_add_validates_input() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    home.json_failure(
        &[
            "--role", "qa", "board", "add", "--title", "x", "--assignee", "y", "--due", "tomorrow",
        ],
        2,
    );
    home.json_failure(
        &[
            "--role", "qa", "board", "add", "--title", "  ", "--assignee", "y", "--due", "2025-09-01",
        ],
        2,
    );
    home.json_failure(
        &[
            "--role", "qa", "board", "add", "--title", "x", "--assignee", "y", "--due",
            "2025-09-01", "--priority", "urgent",
        ],
        2,
    );
    Ok(())
}

#[test]
fn board_edit_and_rm() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;

    let edited = home.json(&[
        "--role", "pm", "board", "edit", "7", "--priority", "high", "--urgent", "true",
    ]);
    assert_eq!(edited["data"]["task"]["id"], 7);
    assert_eq!(edited["data"]["task"]["priority"], "high");
    assert_eq!(edited["data"]["task"]["isFirefighting"], true);
    assert_eq!(edited["data"]["task"]["title"], "Refactor data pipeline");

    let removed = home.json(&["--role", "pm", "board", "rm", "10"]);
    assert_eq!(removed["data"]["task"]["id"], 10);

    home.json_failure(&["--role", "pm", "board", "rm", "42"], 2);
    Ok(())
}

#[test]
fn board_stats_summarise_sample_board() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    let value = home.json(&["--role", "admin", "board", "stats"]);

    assert_eq!(value["data"]["total"], 10);
    assert_eq!(value["data"]["completed"], 2);
    assert_eq!(value["data"]["in_progress"], 2);
    assert_eq!(value["data"]["urgent"], 1);
    assert_eq!(value["data"]["columns"].as_array().map(Vec::len), Some(6));
    Ok(())
}
