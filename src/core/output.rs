//! Locale bundles and the build manifest.
//!
//! Every live, enabled fragment with a value lands in one bundle per locale
//! and output name. The source locale gets the fragment's own value; a
//! translated locale gets its translation when it exists, matches the value
//! type and is current (or outdated ones are allowed).

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{source::Source, store::StoreView, value::TranslatableValue};

pub const DEFAULT_BUNDLE: &str = "default";
pub const MANIFEST_VERSION: u32 = 1;

const LOCALE_PLACEHOLDER: &str = "[locale]";
const NAME_PLACEHOLDER: &str = "[name]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOptions {
    pub source_locale: String,
    pub translated_locales: Vec<String>,
    /// File name template containing `[locale]` and optionally `[name]`.
    pub filename: String,
    pub include_outdated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub locale: String,
    pub name: String,
    /// Path relative to the output directory.
    pub file: String,
    /// Fragment id -> value.
    pub messages: BTreeMap<String, TranslatableValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: u32,
    pub source_locale: String,
    pub locales: Vec<String>,
    /// Locale -> bundle name -> file.
    pub files: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub bundles: Vec<Bundle>,
    pub manifest: Manifest,
}

/// File of the bundle `name` for `locale`.
///
/// Without a `[name]` placeholder, bundles other than the default one are
/// placed in a directory named after the bundle.
pub fn bundle_file(template: &str, locale: &str, name: &str) -> String {
    let file = template
        .replace(LOCALE_PLACEHOLDER, locale)
        .replace(NAME_PLACEHOLDER, name);
    if template.contains(NAME_PLACEHOLDER) || name == DEFAULT_BUNDLE {
        file
    } else {
        format!("{}/{}", name, file)
    }
}

pub fn build_output<S: Source>(
    store: &StoreView,
    sources: &BTreeMap<String, S>,
    options: &OutputOptions,
) -> BuildOutput {
    let locales: BTreeSet<&str> = std::iter::once(options.source_locale.as_str())
        .chain(options.translated_locales.iter().map(String::as_str))
        .collect();

    // (locale, name) -> messages
    let mut messages: BTreeMap<(String, String), BTreeMap<String, TranslatableValue>> =
        BTreeMap::new();
    let mut names: BTreeSet<String> = BTreeSet::new();

    store.for_each_fragment(|fragment_id, fragment| {
        let Some(value) = fragment.value.as_ref().filter(|_| fragment.enabled) else {
            return;
        };
        let mut fragment_names = sources
            .get(&fragment.source_id)
            .map(|source| source.output_names())
            .unwrap_or_default();
        if fragment_names.is_empty() {
            fragment_names.push(DEFAULT_BUNDLE.to_string());
        }

        for locale in &locales {
            let localized = if *locale == options.source_locale {
                Some(value)
            } else {
                fragment
                    .translations
                    .get(*locale)
                    .filter(|t| t.value.type_equals(value))
                    .filter(|t| options.include_outdated || !fragment.is_outdated(t))
                    .map(|t| &t.value)
            };
            let Some(localized) = localized else {
                continue;
            };
            for name in &fragment_names {
                messages
                    .entry((locale.to_string(), name.clone()))
                    .or_default()
                    .insert(fragment_id.to_string(), localized.clone());
            }
        }
        names.extend(fragment_names);
    });

    if names.is_empty() {
        names.insert(DEFAULT_BUNDLE.to_string());
    }

    let mut bundles = Vec::with_capacity(locales.len() * names.len());
    let mut files: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    for locale in &locales {
        for name in &names {
            let file = bundle_file(&options.filename, locale, name);
            files
                .entry(locale.to_string())
                .or_default()
                .insert(name.clone(), file.clone());
            bundles.push(Bundle {
                locale: locale.to_string(),
                name: name.clone(),
                file,
                messages: messages
                    .remove(&(locale.to_string(), name.clone()))
                    .unwrap_or_default(),
            });
        }
    }

    BuildOutput {
        bundles,
        manifest: Manifest {
            version: MANIFEST_VERSION,
            source_locale: options.source_locale.clone(),
            locales: locales.iter().map(|l| l.to_string()).collect(),
            files,
        },
    }
}

pub fn write_output(dir: &Path, output: &BuildOutput, manifest_name: &str) -> Result<()> {
    for bundle in &output.bundles {
        let path = dir.join(&bundle.file);
        write_json(&path, &bundle.messages)?;
        debug!(path = %path.display(), messages = bundle.messages.len(), "wrote bundle");
    }
    write_json(&dir.join(manifest_name), &output.manifest)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let mut content = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    content.push('\n');
    fs::write(path, content).with_context(|| format!("Failed to write file: {}", path.display()))
}
