use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::{DiscardPolicy, output::OutputOptions};
use crate::diagnostics::{Kind, Level, Locales};

pub const CONFIG_FILE_NAME: &str = ".fragsyncrc.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_source_locale")]
    pub source_locale: String,
    #[serde(default)]
    pub translated_locales: Vec<String>,
    #[serde(default = "default_store")]
    pub store: String,
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
    #[serde(default)]
    pub ignores: Vec<String>,
    /// One of `all`, `untranslated`, `outdated`.
    #[serde(default = "default_discard_obsolete")]
    pub discard_obsolete: String,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default = "default_manifest")]
    pub manifest: String,
    /// Diagnostic kind -> level override.
    #[serde(default)]
    pub diagnostics: BTreeMap<String, Level>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
    #[serde(default = "default_output_filename")]
    pub filename: String,
    #[serde(default)]
    pub include_outdated: bool,
}

fn default_source_locale() -> String {
    "en".to_string()
}

fn default_store() -> String {
    "./i18n/store.json".to_string()
}

fn default_sources() -> Vec<String> {
    vec!["src/**/*.frag".to_string()]
}

fn default_discard_obsolete() -> String {
    DiscardPolicy::default().to_string()
}

fn default_manifest() -> String {
    "manifest.json".to_string()
}

fn default_output_dir() -> String {
    "./dist/locales".to_string()
}

fn default_output_filename() -> String {
    "[locale].json".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            filename: default_output_filename(),
            include_outdated: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_locale: default_source_locale(),
            translated_locales: Vec::new(),
            store: default_store(),
            sources: default_sources(),
            ignores: Vec::new(),
            discard_obsolete: default_discard_obsolete(),
            output: OutputConfig::default(),
            manifest: default_manifest(),
            diagnostics: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.sources {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'sources': \"{}\"", pattern))?;
        }
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        self.discard_policy()?;

        if !self.output.filename.contains("[locale]") {
            bail!(
                "'output.filename' must contain [locale]: \"{}\"",
                self.output.filename
            );
        }
        if self.translated_locales.contains(&self.source_locale) {
            bail!(
                "'translatedLocales' must not contain the source locale \"{}\"",
                self.source_locale
            );
        }
        for kind in self.diagnostics.keys() {
            kind.parse::<Kind>()
                .context("Invalid key in 'diagnostics'")?;
        }

        Ok(())
    }

    pub fn discard_policy(&self) -> Result<DiscardPolicy> {
        self.discard_obsolete
            .parse::<DiscardPolicy>()
            .context("Invalid 'discardObsolete'")
    }

    pub fn locales(&self) -> Locales {
        Locales {
            source: self.source_locale.clone(),
            translated: self.translated_locales.clone(),
        }
    }

    pub fn output_options(&self) -> OutputOptions {
        OutputOptions {
            source_locale: self.source_locale.clone(),
            translated_locales: self.translated_locales.clone(),
            filename: self.output.filename.clone(),
            include_outdated: self.output.include_outdated,
        }
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// Directory paths in the config are relative to. The config file's
    /// directory, or the start directory when using defaults.
    pub root: PathBuf,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            let root = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| start_dir.to_path_buf());
            Ok(ConfigLoadResult {
                config,
                root,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            root: start_dir.to_path_buf(),
            from_file: false,
        }),
    }
}
