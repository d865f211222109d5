mod support;

use predicates::str::contains;

use support::TestHome;

#[test]
fn chat_uses_canned_replies_offline() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    let value = home.json(&["--role", "pm", "chat", "what", "is", "the", "biggest", "risk?"]);

    assert_eq!(value["data"]["question"], "what is the biggest risk?");
    assert_eq!(value["data"]["reply"]["role"], "assistant");
    assert!(value["data"]["reply"]["content"]
        .as_str()
        .unwrap_or_default()
        .starts_with("Main risks"));
    assert_eq!(value["data"]["source"], "mock");
    assert!(value["data"]["session_id"].as_str().is_some());
    Ok(())
}

#[test]
fn chat_human_output_prints_reply() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    home.cmd()
        .args(["--role", "developer", "chat", "Generate a WBS"])
        .assert()
        .success()
        .stdout(contains("AI assistant"))
        .stdout(contains("Reply"));
    Ok(())
}

#[test]
fn chat_rejects_blank_and_oversized_messages() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    home.json_failure(&["--role", "pm", "chat", "   "], 2);

    let long = "a".repeat(2001);
    home.json_failure(&["--role", "pm", "chat", &long], 2);
    Ok(())
}

#[test]
fn chat_is_gated_by_role() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    let auditor = home.json_failure(&["--role", "auditor", "chat", "hello"], 3);
    assert_eq!(auditor["error"]["kind"], "access_denied");
    home.json_failure(&["--role", "admin", "chat", "hello"], 3);
    Ok(())
}
