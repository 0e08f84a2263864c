use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, stderr, stdout};

const CONFIG: &str = r#"{ "translatedLocales": ["de"] }"#;

#[test]
fn test_check_in_sync_after_sync() -> Result<()> {
    let test = CliTest::with_files(CONFIG, &[("src/app.frag", "= Hello\n")])?;

    let synced = test.sync()?;
    assert!(synced.status.success(), "stderr: {}", stderr(&synced));

    let output = test.check()?;
    assert_eq!(output.status.code(), Some(0), "stdout: {}", stdout(&output));
    assert!(stdout(&output).contains("Sources and store are in sync"));
    // Untranslated text is only a warning.
    assert!(stdout(&output).contains("missing-translations"));
    assert!(stdout(&output).contains("src/app.frag:1:1"));

    Ok(())
}

#[test]
fn test_check_out_of_sync_changes_nothing() -> Result<()> {
    let test = CliTest::with_files(CONFIG, &[("src/app.frag", "greeting = Hello\n= World\n")])?;

    let output = test.check()?;
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("project is out of sync  out-of-sync"));
    assert!(out.contains("sources to rewrite: src/app.frag; store would change"));
    assert!(!out.contains("Sources and store are in sync"));

    assert_eq!(test.read_file("src/app.frag")?, "greeting = Hello\n= World\n");
    assert!(!test.root().join("i18n").exists());
    assert!(!test.root().join("dist").exists());

    Ok(())
}

#[test]
fn test_check_severity_override() -> Result<()> {
    let test = CliTest::with_files(
        r#"{
          "translatedLocales": ["de"],
          "diagnostics": { "out-of-sync": "warning", "missing-translations": "ignore" }
        }"#,
        &[("src/app.frag", "= Hello\n")],
    )?;

    let output = test.check()?;
    assert_eq!(output.status.code(), Some(0));
    let out = stdout(&output);
    assert!(out.contains("warning: project is out of sync"));
    assert!(!out.contains("missing-translations"));
    assert!(out.contains("1 problems (0 errors, 1 warning)"));

    Ok(())
}

#[test]
fn test_check_clean_project() -> Result<()> {
    let test = CliTest::with_files("{}", &[("src/app.frag", "# nothing yet\n")])?;

    let output = test.check()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Checked 1 source - no issues found"));

    Ok(())
}

#[test]
fn test_check_invalid_config() -> Result<()> {
    let test = CliTest::with_files(r#"{ "output": { "filename": "messages.json" } }"#, &[])?;

    let output = test.check()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Error:"));
    assert!(stderr(&output).contains("[locale]"));

    Ok(())
}
