use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, stdout};

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Created .fragsyncrc.json"));

    let config = test.read_json(".fragsyncrc.json")?;
    assert_eq!(config["sourceLocale"], "en");
    assert_eq!(config["store"], "./i18n/store.json");
    assert_eq!(config["discardObsolete"], "untranslated");
    assert_eq!(config["output"]["filename"], "[locale].json");

    Ok(())
}

#[test]
fn test_init_fails_if_config_exists() -> Result<()> {
    let test = CliTest::with_files(r#"{ "sourceLocale": "fr" }"#, &[])?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("error: .fragsyncrc.json already exists"));
    assert_eq!(test.read_file(".fragsyncrc.json")?, r#"{ "sourceLocale": "fr" }"#);

    Ok(())
}

#[test]
fn test_init_config_is_usable() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("src/app.frag", "= Hello\n")?;

    let init = test.command().arg("init").output()?;
    assert!(init.status.success());

    let output = test.sync()?;
    assert!(output.status.success());
    assert_eq!(test.read_file("src/app.frag")?, "0 = Hello\n");
    assert_eq!(
        test.read_json("dist/locales/en.json")?,
        serde_json::json!({ "0": "Hello" })
    );

    Ok(())
}
