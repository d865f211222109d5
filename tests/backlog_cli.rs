mod support;

use serde_json::Value;

use support::TestHome;

fn story_ids(value: &Value) -> Vec<u64> {
    value["data"]["stories"]
        .as_array()
        .expect("stories")
        .iter()
        .filter_map(|story| story["id"].as_u64())
        .collect()
}

#[test]
fn backlog_list_totals_story_points() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    let value = home.json(&["--role", "developer", "backlog", "list"]);

    assert_eq!(story_ids(&value), [1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(value["data"]["total_points"], 50);
    assert_eq!(value["data"]["completed_points"], 8);
    Ok(())
}

#[test]
fn backlog_list_filters_by_status_and_epic() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;

    let completed = home.json(&["--role", "qa", "backlog", "list", "--status", "done"]);
    assert_eq!(story_ids(&completed), [4, 5]);

    let ocr = home.json(&["--role", "qa", "backlog", "list", "--epic", "OCR Engine"]);
    assert_eq!(story_ids(&ocr), [1, 6]);

    home.json_failure(&["--role", "qa", "backlog", "list", "--status", "blocked"], 2);
    Ok(())
}

#[test]
fn backlog_epics_are_distinct() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    let value = home.json(&["--role", "pm", "backlog", "epics"]);
    let epics = value["data"]["epics"].as_array().expect("epics");
    assert_eq!(epics.len(), 4);
    assert!(epics.iter().any(|epic| epic == "Data Management"));
    Ok(())
}

#[test]
fn backlog_up_and_down_change_rank() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;

    let up = home.json(&["--role", "pm", "backlog", "up", "3"]);
    assert_eq!(up["command"], "backlog up");
    assert_eq!(up["data"]["moved"], true);
    assert_eq!(up["data"]["rank"], 2);
    assert_eq!(up["data"]["direction"], "up");

    let top = home.json(&["--role", "pm", "backlog", "up", "1"]);
    assert_eq!(top["data"]["moved"], false);
    assert_eq!(top["data"]["rank"], 1);

    let down = home.json(&["--role", "pm", "backlog", "down", "1"]);
    assert_eq!(down["data"]["rank"], 2);

    let bottom = home.json(&["--role", "pm", "backlog", "down", "7"]);
    assert_eq!(bottom["data"]["moved"], false);

    home.json_failure(&["--role", "pm", "backlog", "up", "70"], 2);
    Ok(())
}

#[test]
fn backlog_add_appends_story() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    let value = home.json(&[
        "--role",
        "business_analyst",
        "backlog",
        "add",
        "--title",
        "Explain automated decisions",
        "--epic",
        "AI Model",
        "--points",
        "3",
        "--criterion",
        "Reason shown next to every decision",
        "--criterion",
        " ",
    ]);

    let story = &value["data"]["story"];
    assert_eq!(story["id"], 8);
    assert_eq!(story["status"], "backlog");
    assert_eq!(story["storyPoints"], 3);
    assert_eq!(
        story["acceptanceCriteria"],
        serde_json::json!(["Reason shown next to every decision"])
    );
    Ok(())
}

#[test]
fn backlog_edits_require_rights() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    home.json_failure(&["--role", "admin", "backlog", "up", "2"], 3);
    home.json_failure(
        &["--role", "admin", "backlog", "add", "--title", "x", "--epic", "y"],
        3,
    );
    home.json_failure(
        &["--role", "pm", "backlog", "add", "--title", "x", "--epic", " "],
        2,
    );
    Ok(())
}
