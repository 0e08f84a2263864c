use serde::{Deserialize, Serialize};

use crate::core::{fragment::Fragment, source::Source};

/// Fragments handed over by an external extractor.
///
/// The extractor owns the text, so the unit cannot rewrite itself; only
/// fragments that already carry an id are tracked.
///
/// JSON form:
/// ```json
/// { "fragments": [ { "id": "0", "value": "Hello", "start": 10, "end": 17 } ],
///   "outputNames": ["admin"] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticSource {
    pub fragments: Vec<Fragment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_names: Vec<String>,
}

impl StaticSource {
    pub fn new(fragments: Vec<Fragment>) -> Self {
        Self {
            fragments,
            output_names: Vec::new(),
        }
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

impl Source for StaticSource {
    fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    fn output_names(&self) -> Vec<String> {
        self.output_names.clone()
    }
}
