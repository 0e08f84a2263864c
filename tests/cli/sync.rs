use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{CliTest, stderr, stdout};

const CONFIG: &str = r#"{ "translatedLocales": ["de"] }"#;

#[test]
fn test_sync_assigns_ids() -> Result<()> {
    let test = CliTest::with_files(
        CONFIG,
        &[("src/app.frag", "# App\ngreeting = Hello\n= World\n")],
    )?;

    let output = test.sync()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Assigned new ids in 1 source"));
    assert!(stdout(&output).contains("missing-translations"));

    assert_eq!(
        test.read_file("src/app.frag")?,
        "# App\ngreeting = Hello\n0 = World\n"
    );

    let store = test.read_json("i18n/store.json")?;
    let fragments = store["fragments"].as_object().unwrap();
    assert_eq!(
        fragments.keys().collect::<Vec<_>>(),
        vec!["0", "greeting"]
    );
    assert_eq!(fragments["0"]["sourceId"], "src/app.frag");
    assert_eq!(fragments["0"]["value"], "World");
    assert_eq!(store["obsolete"], json!([]));

    Ok(())
}

#[test]
fn test_sync_writes_bundles_and_manifest() -> Result<()> {
    let test = CliTest::with_files(
        CONFIG,
        &[
            ("src/app.frag", "greeting = Hello\napples = [One apple | {n} apples]\n"),
            (
                "i18n/store.json",
                r#"{
                  "fragments": {
                    "greeting": {
                      "sourceId": "src/app.frag",
                      "enabled": true,
                      "value": "Hello",
                      "modified": "2024-01-01T00:00:00.000Z",
                      "translations": {
                        "de": { "value": "Hallo", "modified": "2024-01-02T00:00:00.000Z" }
                      }
                    }
                  },
                  "obsolete": []
                }"#,
            ),
        ],
    )?;

    let output = test.sync()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    assert_eq!(
        test.read_json("dist/locales/en.json")?,
        json!({ "apples": ["One apple", "{n} apples"], "greeting": "Hello" })
    );
    assert_eq!(
        test.read_json("dist/locales/de.json")?,
        json!({ "greeting": "Hallo" })
    );
    assert_eq!(
        test.read_json("dist/locales/manifest.json")?,
        json!({
            "version": 1,
            "sourceLocale": "en",
            "locales": ["de", "en"],
            "files": {
                "de": { "default": "de.json" },
                "en": { "default": "en.json" }
            }
        })
    );

    Ok(())
}

#[test]
fn test_sync_is_idempotent() -> Result<()> {
    let test = CliTest::with_files(CONFIG, &[("src/app.frag", "= Hello\n= World\n")])?;

    let first = test.sync()?;
    assert!(first.status.success(), "stderr: {}", stderr(&first));
    let source = test.read_file("src/app.frag")?;
    let store = test.read_file("i18n/store.json")?;

    let second = test.sync()?;
    assert!(second.status.success());
    assert!(!stdout(&second).contains("Assigned new ids"));
    assert!(!stdout(&second).contains("Updated the translation store"));
    assert_eq!(test.read_file("src/app.frag")?, source);
    assert_eq!(test.read_file("i18n/store.json")?, store);

    Ok(())
}

#[test]
fn test_sync_retains_translated_fragments_of_deleted_sources() -> Result<()> {
    let test = CliTest::with_files(
        CONFIG,
        &[
            ("src/app.frag", "greeting = Hello\n"),
            (
                "i18n/store.json",
                r#"{
                  "fragments": {
                    "bye": {
                      "sourceId": "src/gone.frag",
                      "enabled": true,
                      "value": "Bye",
                      "modified": "2024-01-01T00:00:00.000Z",
                      "translations": {
                        "de": { "value": "Tschuess", "modified": "2024-01-02T00:00:00.000Z" }
                      }
                    },
                    "unused": {
                      "sourceId": "src/gone.frag",
                      "enabled": true,
                      "value": "Unused",
                      "modified": "2024-01-01T00:00:00.000Z",
                      "translations": {}
                    }
                  }
                }"#,
            ),
        ],
    )?;

    let output = test.sync()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let store = test.read_json("i18n/store.json")?;
    assert_eq!(
        store["fragments"].as_object().unwrap().keys().collect::<Vec<_>>(),
        vec!["greeting"]
    );
    let obsolete = store["obsolete"].as_array().unwrap();
    assert_eq!(obsolete.len(), 1);
    assert_eq!(obsolete[0][0], "bye");
    assert_eq!(obsolete[0][1]["translations"]["de"]["value"], "Tschuess");

    Ok(())
}

#[test]
fn test_sync_static_sources_are_never_rewritten() -> Result<()> {
    let extracted = r#"{
      "fragments": [
        { "id": "title", "value": "Title", "start": 0, "end": 5 },
        { "value": "No id yet" }
      ],
      "outputNames": ["admin"]
    }"#;
    let test = CliTest::with_files(
        r#"{ "sources": ["src/**/*.json"], "output": { "filename": "[name]/[locale].json" } }"#,
        &[("src/admin.json", extracted)],
    )?;

    let output = test.sync()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    assert_eq!(test.read_file("src/admin.json")?, extracted);
    assert_eq!(
        test.read_json("dist/locales/admin/en.json")?,
        json!({ "title": "Title" })
    );

    Ok(())
}

#[test]
fn test_sync_invalid_config() -> Result<()> {
    let test = CliTest::with_files(r#"{ "discardObsolete": "sometimes" }"#, &[])?;

    let output = test.sync()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("discardObsolete"));

    Ok(())
}
