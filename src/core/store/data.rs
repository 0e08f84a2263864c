use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::clock::Timestamp;
use crate::core::value::TranslatableValue;

/// The persisted translation store.
///
/// `fragments` holds the live set keyed by fragment id. `obsolete` is an
/// append-only history of fragments removed from the live set; several
/// entries may share an id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub fragments: BTreeMap<String, StoreFragment>,
    #[serde(default)]
    pub obsolete: Vec<(String, StoreFragment)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreFragment {
    pub source_id: String,
    pub enabled: bool,
    pub value: Option<TranslatableValue>,
    /// When `value` last changed.
    #[serde(with = "timestamp")]
    pub modified: Timestamp,
    /// Locale -> translation.
    #[serde(default)]
    pub translations: BTreeMap<String, Translation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub value: TranslatableValue,
    #[serde(with = "timestamp")]
    pub modified: Timestamp,
}

impl StoreFragment {
    pub fn new(
        source_id: impl Into<String>,
        enabled: bool,
        value: Option<TranslatableValue>,
        modified: Timestamp,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            enabled,
            value,
            modified,
            translations: BTreeMap::new(),
        }
    }

    /// A translation is outdated when it was last touched before the source
    /// value changed.
    pub fn is_outdated(&self, translation: &Translation) -> bool {
        translation.modified < self.modified
    }
}

impl Translation {
    pub fn new(value: impl Into<TranslatableValue>, modified: Timestamp) -> Self {
        Self {
            value: value.into(),
            modified,
        }
    }
}

impl StoreData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty() && self.obsolete.is_empty()
    }
}

/// Serde adapter persisting epoch milliseconds as RFC 3339 strings.
mod timestamp {
    use serde::{Deserialize, Deserializer, Serializer, de, ser};

    use crate::core::clock::{Timestamp, format_timestamp, parse_timestamp};

    pub fn serialize<S: Serializer>(value: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        let text = format_timestamp(*value).map_err(ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_timestamp(&text).map_err(de::Error::custom)
    }
}
