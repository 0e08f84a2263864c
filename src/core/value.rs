use std::fmt;

use serde::{Deserialize, Serialize};

/// A translatable value carried by a fragment or a translation.
///
/// Two shapes exist:
///
/// 1. **String**: a single text, serialized as a JSON string.
///    - JSON: `"value": "Hello"`
///
/// 2. **Plural**: one text per grammatical plural form of the locale,
///    serialized as a JSON array of strings.
///    - JSON: `"value": ["One apple", "{count} apples"]`
///
/// Whether a value is usable at all is modelled one level up as
/// `Option<TranslatableValue>`: `None` is the invalid marker (`null` on disk).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranslatableValue {
    String(String),
    Plural(Vec<String>),
}

/// Shape of a [`TranslatableValue`] without its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueType {
    String,
    Plural,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::String => write!(f, "string"),
            ValueType::Plural => write!(f, "plural"),
        }
    }
}

impl TranslatableValue {
    pub fn string(text: impl Into<String>) -> Self {
        TranslatableValue::String(text.into())
    }

    pub fn plural<I, S>(forms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TranslatableValue::Plural(forms.into_iter().map(Into::into).collect())
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            TranslatableValue::String(_) => ValueType::String,
            TranslatableValue::Plural(_) => ValueType::Plural,
        }
    }

    /// True if both values are strings or both are plurals, regardless of
    /// content or form count.
    pub fn type_equals(&self, other: &TranslatableValue) -> bool {
        self.value_type() == other.value_type()
    }

    /// Number of plural forms, `None` for plain strings.
    pub fn form_count(&self) -> Option<usize> {
        match self {
            TranslatableValue::String(_) => None,
            TranslatableValue::Plural(forms) => Some(forms.len()),
        }
    }
}

impl fmt::Display for TranslatableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslatableValue::String(text) => write!(f, "{}", text),
            TranslatableValue::Plural(forms) => write!(f, "[{}]", forms.join(" | ")),
        }
    }
}

impl From<&str> for TranslatableValue {
    fn from(text: &str) -> Self {
        TranslatableValue::String(text.to_string())
    }
}

impl From<String> for TranslatableValue {
    fn from(text: String) -> Self {
        TranslatableValue::String(text)
    }
}
