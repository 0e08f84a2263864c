use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::data::StoreFragment;
use crate::core::error::Error;

/// What happens to a store fragment once no source produces it anymore.
///
/// A fragment is either deleted outright or moved to the obsolete history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscardPolicy {
    /// Never retain removed fragments.
    All,
    /// Delete fragments without any translation, retain the rest.
    #[default]
    Untranslated,
    /// Delete fragments whose translations are all caught up with the
    /// fragment value (vacuously true without translations), retain the rest.
    Outdated,
}

impl DiscardPolicy {
    /// True if `fragment` should be deleted instead of retained as obsolete.
    pub fn should_discard(self, fragment: &StoreFragment) -> bool {
        match self {
            DiscardPolicy::All => true,
            DiscardPolicy::Untranslated => fragment.translations.is_empty(),
            DiscardPolicy::Outdated => fragment
                .translations
                .values()
                .all(|translation| !fragment.is_outdated(translation)),
        }
    }
}

impl fmt::Display for DiscardPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardPolicy::All => write!(f, "all"),
            DiscardPolicy::Untranslated => write!(f, "untranslated"),
            DiscardPolicy::Outdated => write!(f, "outdated"),
        }
    }
}

impl FromStr for DiscardPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(DiscardPolicy::All),
            "untranslated" => Ok(DiscardPolicy::Untranslated),
            "outdated" => Ok(DiscardPolicy::Outdated),
            other => Err(Error::InvalidDiscardPolicy(other.to_string())),
        }
    }
}
