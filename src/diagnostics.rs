//! Translation coverage and consistency diagnostics.
//!
//! Diagnostics are computed on demand from a reconciled engine state. Only
//! store fragments that are in sync with their live source fragment are
//! inspected; out-of-sync fragments are pending reconciliation, not
//! translation problems.
//!
//! Each diagnostic carries structured data (source id, fragment id, locales,
//! counts) so callers can format it however they like. The CLI reporter is
//! one such caller.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::core::{
    Engine, Error, Source, StoreFragment, TranslatableValue, ValueType, fragment::Fragment,
    plural::plural_rule,
};

// ============================================================
// Severity and Kind
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Configured level of a diagnostic kind. `Ignore` drops it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warning,
    Info,
    Ignore,
}

impl Level {
    pub fn severity(self) -> Option<Severity> {
        match self {
            Level::Error => Some(Severity::Error),
            Level::Warning => Some(Severity::Warning),
            Level::Info => Some(Severity::Info),
            Level::Ignore => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    MissingTranslations,
    UnknownTranslations,
    OutdatedTranslations,
    ValueTypeMismatch,
    PluralFormCountMismatch,
    DuplicateFragment,
    UnsupportedLocales,
    OutOfSync,
}

impl Kind {
    pub const ALL: [Kind; 8] = [
        Kind::MissingTranslations,
        Kind::UnknownTranslations,
        Kind::OutdatedTranslations,
        Kind::ValueTypeMismatch,
        Kind::PluralFormCountMismatch,
        Kind::DuplicateFragment,
        Kind::UnsupportedLocales,
        Kind::OutOfSync,
    ];

    pub fn default_severity(self) -> Severity {
        match self {
            Kind::MissingTranslations | Kind::OutdatedTranslations | Kind::UnsupportedLocales => {
                Severity::Warning
            }
            Kind::UnknownTranslations
            | Kind::ValueTypeMismatch
            | Kind::PluralFormCountMismatch
            | Kind::DuplicateFragment
            | Kind::OutOfSync => Severity::Error,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Kind::MissingTranslations => "missing-translations",
            Kind::UnknownTranslations => "unknown-translations",
            Kind::OutdatedTranslations => "outdated-translations",
            Kind::ValueTypeMismatch => "value-type-mismatch",
            Kind::PluralFormCountMismatch => "plural-form-count-mismatch",
            Kind::DuplicateFragment => "duplicate-fragment",
            Kind::UnsupportedLocales => "unsupported-locales",
            Kind::OutOfSync => "out-of-sync",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnknownDiagnosticKind(s.to_string()))
    }
}

// ============================================================
// Diagnostic Types - Fragment level
// ============================================================

/// Where a fragment-level diagnostic points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentContext {
    pub source_id: String,
    pub fragment_id: String,
    /// Byte range of the fragment in the source text.
    pub start: usize,
    pub end: usize,
}

impl FragmentContext {
    pub fn new(source_id: &str, fragment_id: &str, fragment: &Fragment) -> Self {
        Self {
            source_id: source_id.to_string(),
            fragment_id: fragment_id.to_string(),
            start: fragment.start,
            end: fragment.end,
        }
    }
}

/// Target locales without a translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTranslations {
    pub context: FragmentContext,
    pub locales: Vec<String>,
}

/// Translations for locales outside the target set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTranslations {
    pub context: FragmentContext,
    pub locales: Vec<String>,
}

/// Translations older than the fragment's current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutdatedTranslations {
    pub context: FragmentContext,
    pub locales: Vec<String>,
}

/// Translations whose value shape differs from the source value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueTypeMismatch {
    pub context: FragmentContext,
    pub expected: ValueType,
    pub locales: Vec<String>,
}

/// A plural value with the wrong number of forms for its locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralFormCountMismatch {
    pub context: FragmentContext,
    pub locale: String,
    pub expected: usize,
    pub actual: usize,
}

// ============================================================
// Diagnostic Types - Project level
// ============================================================

/// A fragment id claimed by more than one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateFragment {
    pub fragment_id: String,
    pub source_ids: Vec<String>,
}

/// Locales without a known plural rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedLocales {
    pub locales: Vec<String>,
}

/// Sources or the store would change on the next sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutOfSync {
    pub sources: Vec<String>,
    pub store: bool,
}

// ============================================================
// Diagnostic Enum
// ============================================================

#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    MissingTranslations(MissingTranslations),
    UnknownTranslations(UnknownTranslations),
    OutdatedTranslations(OutdatedTranslations),
    ValueTypeMismatch(ValueTypeMismatch),
    PluralFormCountMismatch(PluralFormCountMismatch),
    DuplicateFragment(DuplicateFragment),
    UnsupportedLocales(UnsupportedLocales),
    OutOfSync(OutOfSync),
}

// ============================================================
// Report Trait
// ============================================================

/// Uniform view of a diagnostic for reporters.
#[enum_dispatch]
pub trait Report {
    fn kind(&self) -> Kind;

    /// The fragment the diagnostic points to, `None` for project-wide ones.
    fn context(&self) -> Option<&FragmentContext> {
        None
    }

    /// Primary message.
    fn message(&self) -> String;

    /// Optional details for the "= note:" line.
    fn details(&self) -> Option<String> {
        None
    }
}

impl Report for MissingTranslations {
    fn kind(&self) -> Kind {
        Kind::MissingTranslations
    }

    fn context(&self) -> Option<&FragmentContext> {
        Some(&self.context)
    }

    fn message(&self) -> String {
        format!("fragment `{}` is missing translations", self.context.fragment_id)
    }

    fn details(&self) -> Option<String> {
        Some(format!("missing in: {}", self.locales.join(", ")))
    }
}

impl Report for UnknownTranslations {
    fn kind(&self) -> Kind {
        Kind::UnknownTranslations
    }

    fn context(&self) -> Option<&FragmentContext> {
        Some(&self.context)
    }

    fn message(&self) -> String {
        format!(
            "fragment `{}` has translations for unknown locales",
            self.context.fragment_id
        )
    }

    fn details(&self) -> Option<String> {
        Some(format!("unknown: {}", self.locales.join(", ")))
    }
}

impl Report for OutdatedTranslations {
    fn kind(&self) -> Kind {
        Kind::OutdatedTranslations
    }

    fn context(&self) -> Option<&FragmentContext> {
        Some(&self.context)
    }

    fn message(&self) -> String {
        format!("fragment `{}` has outdated translations", self.context.fragment_id)
    }

    fn details(&self) -> Option<String> {
        Some(format!("outdated in: {}", self.locales.join(", ")))
    }
}

impl Report for ValueTypeMismatch {
    fn kind(&self) -> Kind {
        Kind::ValueTypeMismatch
    }

    fn context(&self) -> Option<&FragmentContext> {
        Some(&self.context)
    }

    fn message(&self) -> String {
        format!(
            "fragment `{}` has translations of the wrong type",
            self.context.fragment_id
        )
    }

    fn details(&self) -> Option<String> {
        Some(format!(
            "expected {}, mismatched in: {}",
            self.expected,
            self.locales.join(", ")
        ))
    }
}

impl Report for PluralFormCountMismatch {
    fn kind(&self) -> Kind {
        Kind::PluralFormCountMismatch
    }

    fn context(&self) -> Option<&FragmentContext> {
        Some(&self.context)
    }

    fn message(&self) -> String {
        format!(
            "fragment `{}` has {} plural forms in {}",
            self.context.fragment_id, self.actual, self.locale
        )
    }

    fn details(&self) -> Option<String> {
        Some(format!("{} expects {} forms", self.locale, self.expected))
    }
}

impl Report for DuplicateFragment {
    fn kind(&self) -> Kind {
        Kind::DuplicateFragment
    }

    fn message(&self) -> String {
        format!("fragment id `{}` is used by several sources", self.fragment_id)
    }

    fn details(&self) -> Option<String> {
        Some(format!("claimed by: {}", self.source_ids.join(", ")))
    }
}

impl Report for UnsupportedLocales {
    fn kind(&self) -> Kind {
        Kind::UnsupportedLocales
    }

    fn message(&self) -> String {
        format!("no plural rules for: {}", self.locales.join(", "))
    }
}

impl Report for OutOfSync {
    fn kind(&self) -> Kind {
        Kind::OutOfSync
    }

    fn message(&self) -> String {
        "project is out of sync".to_string()
    }

    fn details(&self) -> Option<String> {
        let mut parts = Vec::new();
        if !self.sources.is_empty() {
            parts.push(format!("sources to rewrite: {}", self.sources.join(", ")));
        }
        if self.store {
            parts.push("store would change".to_string());
        }
        (!parts.is_empty()).then(|| parts.join("; "))
    }
}

// ============================================================
// Ordering
// ============================================================

impl Ord for Diagnostic {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;

        // Fragment diagnostics by location first, project-wide ones last.
        match (self.context(), other.context()) {
            (Some(a), Some(b)) => a
                .source_id
                .cmp(&b.source_id)
                .then_with(|| a.start.cmp(&b.start))
                .then_with(|| a.fragment_id.cmp(&b.fragment_id))
                .then_with(|| self.kind().cmp(&other.kind()))
                .then_with(|| self.message().cmp(&other.message())),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self
                .kind()
                .cmp(&other.kind())
                .then_with(|| self.message().cmp(&other.message())),
        }
    }
}

impl PartialOrd for Diagnostic {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// ============================================================
// Severity Resolution
// ============================================================

/// A diagnostic with its effective severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reported {
    pub severity: Severity,
    pub diagnostic: Diagnostic,
}

/// Effective severity of `kind`, `None` when configured as ignored.
pub fn resolve_severity(kind: Kind, overrides: &BTreeMap<String, Level>) -> Option<Severity> {
    match overrides.get(kind.as_str()) {
        Some(level) => level.severity(),
        None => Some(kind.default_severity()),
    }
}

/// Attach severities and drop ignored kinds. Output is sorted.
pub fn apply_severities(
    diagnostics: Vec<Diagnostic>,
    overrides: &BTreeMap<String, Level>,
) -> Vec<Reported> {
    let mut diagnostics = diagnostics;
    diagnostics.sort();
    diagnostics
        .into_iter()
        .filter_map(|diagnostic| {
            resolve_severity(diagnostic.kind(), overrides).map(|severity| Reported {
                severity,
                diagnostic,
            })
        })
        .collect()
}

// ============================================================
// Generator
// ============================================================

/// Locale configuration the generator checks against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locales {
    pub source: String,
    /// The target locale set.
    pub translated: Vec<String>,
}

/// Compute diagnostics for the engine's current state.
pub fn generate<S: Source + Clone>(engine: &Engine<S>, locales: &Locales) -> Vec<Diagnostic> {
    let targets: BTreeSet<&str> = locales.translated.iter().map(String::as_str).collect();
    let mut encountered: BTreeSet<String> = std::iter::once(locales.source.clone())
        .chain(locales.translated.iter().cloned())
        .collect();

    let mut diagnostics = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let store = engine.store();

    for (source_id, source) in engine.sources() {
        for fragment in source.fragments() {
            let Some(stored) = store.get_sync_fragment(source_id, fragment) else {
                continue;
            };
            let Some(fragment_id) = fragment.fragment_id.as_deref() else {
                continue;
            };
            if !seen.insert(fragment_id) {
                continue;
            }
            let context = FragmentContext::new(source_id, fragment_id, fragment);
            encountered.extend(stored.translations.keys().cloned());
            check_fragment(&mut diagnostics, context, stored, &targets, &locales.source);
        }
    }

    for (fragment_id, source_ids) in engine.index().duplicates() {
        diagnostics.push(Diagnostic::DuplicateFragment(DuplicateFragment {
            fragment_id,
            source_ids,
        }));
    }

    let unsupported: Vec<String> = encountered
        .into_iter()
        .filter(|locale| plural_rule(locale).is_none())
        .collect();
    if !unsupported.is_empty() {
        diagnostics.push(Diagnostic::UnsupportedLocales(UnsupportedLocales {
            locales: unsupported,
        }));
    }

    diagnostics.sort();
    diagnostics
}

fn check_fragment(
    diagnostics: &mut Vec<Diagnostic>,
    context: FragmentContext,
    stored: &StoreFragment,
    targets: &BTreeSet<&str>,
    source_locale: &str,
) {
    // Translations are a BTreeMap, so every list below comes out sorted.
    let missing: Vec<String> = targets
        .iter()
        .filter(|locale| !stored.translations.contains_key(**locale))
        .map(|locale| locale.to_string())
        .collect();
    let unknown: Vec<String> = stored
        .translations
        .keys()
        .filter(|locale| !targets.contains(locale.as_str()))
        .cloned()
        .collect();
    let outdated: Vec<String> = stored
        .translations
        .iter()
        .filter(|(_, translation)| stored.is_outdated(translation))
        .map(|(locale, _)| locale.clone())
        .collect();

    if !missing.is_empty() {
        diagnostics.push(Diagnostic::MissingTranslations(MissingTranslations {
            context: context.clone(),
            locales: missing,
        }));
    }
    if !unknown.is_empty() {
        diagnostics.push(Diagnostic::UnknownTranslations(UnknownTranslations {
            context: context.clone(),
            locales: unknown,
        }));
    }
    if !outdated.is_empty() {
        diagnostics.push(Diagnostic::OutdatedTranslations(OutdatedTranslations {
            context: context.clone(),
            locales: outdated,
        }));
    }

    let Some(value) = stored.value.as_ref() else {
        return;
    };

    let mismatched: Vec<String> = stored
        .translations
        .iter()
        .filter(|(_, translation)| !translation.value.type_equals(value))
        .map(|(locale, _)| locale.clone())
        .collect();
    if !mismatched.is_empty() {
        diagnostics.push(Diagnostic::ValueTypeMismatch(ValueTypeMismatch {
            context: context.clone(),
            expected: value.value_type(),
            locales: mismatched,
        }));
    }

    let plurals = std::iter::once((source_locale, value)).chain(
        stored
            .translations
            .iter()
            .map(|(locale, translation)| (locale.as_str(), &translation.value)),
    );
    for (locale, plural) in plurals {
        let TranslatableValue::Plural(forms) = plural else {
            continue;
        };
        let Some(rule) = plural_rule(locale) else {
            continue;
        };
        if forms.len() != rule.form_count {
            diagnostics.push(Diagnostic::PluralFormCountMismatch(PluralFormCountMismatch {
                context: context.clone(),
                locale: locale.to_string(),
                expected: rule.form_count,
                actual: forms.len(),
            }));
        }
    }
}

// ============================================================
// Tests
// ============================================================
