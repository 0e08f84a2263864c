use serde::{Deserialize, Serialize};

use super::value::TranslatableValue;

/// One translatable unit as currently parsed from a source unit.
///
/// Fragments are recomputed on every parse and never persisted; the store is
/// the durable record. `start..end` is the half-open byte range of the
/// fragment inside the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    /// Id annotation already present in the source text, if any.
    #[serde(default, rename = "id", skip_serializing_if = "Option::is_none")]
    pub fragment_id: Option<String>,
    /// `None` when the source text does not hold a usable value.
    #[serde(default)]
    pub value: Option<TranslatableValue>,
    /// False when the fragment is commented out but still tracked.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
}

fn default_enabled() -> bool {
    true
}

impl Fragment {
    pub fn new(fragment_id: Option<&str>, value: Option<TranslatableValue>) -> Self {
        Self {
            fragment_id: fragment_id.map(String::from),
            value,
            enabled: true,
            start: 0,
            end: 0,
        }
    }

    /// Shorthand for an enabled fragment with a plain string value.
    pub fn text(fragment_id: Option<&str>, text: &str) -> Self {
        Self::new(fragment_id, Some(TranslatableValue::string(text)))
    }

    pub fn with_range(mut self, start: usize, end: usize) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
