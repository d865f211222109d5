mod support;

use predicates::str::contains;

use support::TestHome;

#[test]
fn demo_login_persists_session() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;

    let login = home.json(&["login", "--demo", "sponsor"]);
    assert_eq!(login["data"]["user"]["role"], "sponsor");
    assert_eq!(login["data"]["user"]["email"], "sponsor@insuretech.com");
    assert_eq!(login["data"]["source"], "mock");
    assert!(home.session_path().exists());

    let whoami = home.json(&["whoami"]);
    assert_eq!(whoami["data"]["logged_in"], true);
    assert_eq!(whoami["data"]["role"], "sponsor");
    assert_eq!(whoami["data"]["role_source"], "session");
    Ok(())
}

#[test]
fn password_login_uses_default_role_offline() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;

    let login = home.json(&["login", "kim@insuretech.com", "--password", "secret"]);
    assert_eq!(login["data"]["user"]["email"], "kim@insuretech.com");
    assert_eq!(login["data"]["user"]["role"], "pm");
    Ok(())
}

#[test]
fn password_login_honours_role_flag() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;

    home.cmd()
        .env("PMS_PASSWORD", "secret")
        .args(["--role", "qa", "login", "tester@insuretech.com", "--json"])
        .assert()
        .success()
        .stdout(contains("\"role\": \"qa\""));
    Ok(())
}

#[test]
fn malformed_email_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    home.json_failure(&["login", "not-an-email", "--password", "secret"], 2);
    assert!(!home.session_path().exists());
    Ok(())
}

#[test]
fn role_flag_overrides_session_role() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    home.json(&["login", "--demo", "developer"]);

    let whoami = home.json(&["--role", "auditor", "whoami"]);
    assert_eq!(whoami["data"]["role"], "auditor");
    assert_eq!(whoami["data"]["role_source"], "flag");
    assert_eq!(whoami["data"]["user"]["role"], "developer");
    assert!(whoami["warnings"][0]
        .as_str()
        .unwrap_or_default()
        .contains("acting as auditor"));
    Ok(())
}

#[test]
fn env_role_is_used_without_flag() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    home.cmd()
        .env("PMS_ROLE", "admin")
        .args(["whoami", "--json"])
        .assert()
        .success()
        .stdout(contains("\"role_source\": \"env\""));
    Ok(())
}

#[test]
fn logout_removes_session() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    home.json(&["login", "--demo", "pm"]);

    let logout = home.json(&["logout"]);
    assert_eq!(logout["data"]["removed"], true);
    assert!(!home.session_path().exists());

    let again = home.json(&["logout"]);
    assert_eq!(again["data"]["removed"], false);

    let whoami = home.json(&["whoami"]);
    assert_eq!(whoami["data"]["logged_in"], false);
    assert_eq!(whoami["data"]["role_source"], "config");
    Ok(())
}

#[test]
fn corrupt_session_file_does_not_block_commands() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new()?;
    std::fs::write(home.session_path(), "{\"token\":")?;

    let menu = home.json(&["--role", "pm", "menu"]);
    assert_eq!(menu["data"]["role"], "pm");

    let whoami = home.json(&["whoami"]);
    assert_eq!(whoami["data"]["logged_in"], false);

    let logout = home.json(&["logout"]);
    assert_eq!(logout["data"]["removed"], true);
    assert!(!home.session_path().exists());
    Ok(())
}
