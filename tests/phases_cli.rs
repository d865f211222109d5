mod support;

use support::TestHome;

#[test]
fn phases_list_reports_six_phases() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    let value = home.json(&["--role", "sponsor", "phases", "list"]);

    let phases = value["data"]["phases"].as_array().expect("phases");
    assert_eq!(phases.len(), 6);
    assert_eq!(phases[0]["status"], "completed");
    assert_eq!(phases[2]["status"], "in_progress");
    assert_eq!(phases[5]["status"], "pending");
    assert!(value["data"]["overall_progress"].as_u64().is_some());
    Ok(())
}

#[test]
fn phases_show_includes_deliverables_and_kpis() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    let value = home.json(&["--role", "pm", "phases", "show", "3"]);

    assert_eq!(value["data"]["phase"]["id"], 3);
    assert_eq!(value["data"]["deliverables"].as_array().map(Vec::len), Some(3));
    assert_eq!(value["data"]["kpis"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["data"]["kpis"][1]["status"], "at_risk");

    home.json_failure(&["--role", "pm", "phases", "show", "9"], 2);
    Ok(())
}

#[test]
fn progress_is_clamped_and_drives_status() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;

    let full = home.json(&["--role", "pmo_head", "phases", "progress", "4", "150"]);
    assert_eq!(full["data"]["progress"], 100);
    assert_eq!(full["data"]["status"], "completed");
    assert!(full["warnings"]
        .as_array()
        .expect("warnings")
        .iter()
        .any(|w| w.as_str().unwrap_or_default().contains("clamped")));

    let started = home.json(&["--role", "pm", "phases", "progress", "5", "30"]);
    assert_eq!(started["data"]["status"], "in_progress");

    let reset = home.json(&["--role", "pm", "phases", "progress", "3", "-5"]);
    assert_eq!(reset["data"]["progress"], 0);
    assert_eq!(reset["data"]["status"], "pending");

    home.json_failure(&["--role", "sponsor", "phases", "progress", "4", "10"], 3);
    Ok(())
}

#[test]
fn deliverables_are_approved_or_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;

    let approved = home.json(&["--role", "sponsor", "phases", "approve", "d3-3"]);
    assert_eq!(approved["data"]["phase_id"], 3);
    assert_eq!(approved["data"]["deliverable"]["status"], "approved");

    let rejected = home.json(&["--role", "pm", "phases", "approve", "d4-1", "--reject"]);
    assert_eq!(rejected["data"]["deliverable"]["status"], "rejected");

    home.json_failure(&["--role", "pm", "phases", "approve", "d9-9"], 2);
    home.json_failure(&["--role", "auditor", "phases", "approve", "d3-3"], 3);
    Ok(())
}

#[test]
fn kpis_can_be_added_updated_and_removed() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;

    let added = home.json(&[
        "--role", "pm", "phases", "kpi-add", "3", "--name", "Recall", "--target", "92%",
    ]);
    assert_eq!(added["data"]["kpi"]["id"], "k3-3");
    assert_eq!(added["data"]["kpi"]["status"], "on_track");

    let updated = home.json(&[
        "--role", "pm", "phases", "kpi-set", "3", "k3-2", "--current", "91%", "--status",
        "achieved",
    ]);
    assert_eq!(updated["data"]["kpi"]["name"], "Classification accuracy");
    assert_eq!(updated["data"]["kpi"]["current"], "91%");
    assert_eq!(updated["data"]["kpi"]["status"], "achieved");

    let removed = home.json(&["--role", "pmo_head", "phases", "kpi-rm", "3", "k3-1"]);
    assert_eq!(removed["data"]["kpi"]["id"], "k3-1");

    home.json_failure(&["--role", "pm", "phases", "kpi-rm", "3", "k1-1"], 2);
    home.json_failure(
        &["--role", "pm", "phases", "kpi-add", "3", "--name", " ", "--target", "1"],
        2,
    );
    home.json_failure(
        &["--role", "sponsor", "phases", "kpi-add", "3", "--name", "x", "--target", "1"],
        3,
    );
    Ok(())
}
