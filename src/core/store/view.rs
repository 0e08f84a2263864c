use std::collections::HashSet;

use tracing::debug;

use super::data::{StoreData, StoreFragment};
use super::discard::DiscardPolicy;
use crate::core::{
    clock::Timestamp, fragment::Fragment, index::SourceFragmentIndex, value::TranslatableValue,
};

/// Values written by [`StoreView::update_fragment`].
#[derive(Debug, Clone, Copy)]
pub struct FragmentUpdate<'a> {
    pub enabled: bool,
    pub value: Option<&'a TranslatableValue>,
    /// Id the fragment carried in the source before it was reassigned.
    pub old_fragment_id: Option<&'a str>,
}

/// In-memory view of the translation store.
///
/// Keeps a [`SourceFragmentIndex`] over the live fragments so the fragments
/// of one source can be found without scanning the store. Every mutating
/// call sets the `modified` flag; callers clear it after persisting.
#[derive(Debug, Clone, Default)]
pub struct StoreView {
    data: StoreData,
    index: SourceFragmentIndex,
    modified: bool,
}

impl StoreView {
    pub fn new(data: StoreData) -> Self {
        let mut index = SourceFragmentIndex::new();
        for (fragment_id, fragment) in &data.fragments {
            index.add(&fragment.source_id, fragment_id);
        }
        Self {
            data,
            index,
            modified: false,
        }
    }

    pub fn data(&self) -> &StoreData {
        &self.data
    }

    pub fn into_data(self) -> StoreData {
        self.data
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn clear_modified(&mut self) {
        self.modified = false;
    }

    pub fn fragment(&self, fragment_id: &str) -> Option<&StoreFragment> {
        self.data.fragments.get(fragment_id)
    }

    pub fn has_source(&self, source_id: &str) -> bool {
        self.index.has_source(source_id)
    }

    /// Source ids owning at least one live fragment, sorted.
    pub fn source_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.index.source_ids().cloned().collect();
        ids.sort();
        ids
    }

    /// Ids of the live fragments owned by `source_id`, sorted.
    pub fn fragment_ids_of_source(&self, source_id: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .index
            .fragments_of(source_id)
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    /// Create or update the live fragment `fragment_id` on behalf of
    /// `source_id`. Returns true if anything changed.
    ///
    /// A newly created fragment inherits the translations of
    /// `old_fragment_id` so renumbering does not lose translation work;
    /// the copies are outdated whenever the value differs, since the new
    /// fragment is stamped with `now`.
    pub fn update_fragment(
        &mut self,
        source_id: &str,
        fragment_id: &str,
        update: FragmentUpdate<'_>,
        now: Timestamp,
    ) -> bool {
        let changed = match self.data.fragments.get_mut(fragment_id) {
            Some(existing) => {
                let mut changed = false;
                if existing.source_id != source_id {
                    self.index.remove(&existing.source_id, fragment_id);
                    self.index.add(source_id, fragment_id);
                    existing.source_id = source_id.to_string();
                    changed = true;
                }
                if existing.enabled != update.enabled {
                    existing.enabled = update.enabled;
                    changed = true;
                }
                if existing.value.as_ref() != update.value {
                    existing.value = update.value.cloned();
                    existing.modified = now;
                    changed = true;
                }
                changed
            }
            None => {
                let mut fragment =
                    StoreFragment::new(source_id, update.enabled, update.value.cloned(), now);
                if let Some(old_id) = update.old_fragment_id
                    && old_id != fragment_id
                    && let Some(old) = self.data.fragments.get(old_id)
                {
                    fragment.translations = old.translations.clone();
                }
                self.data.fragments.insert(fragment_id.to_string(), fragment);
                self.index.add(source_id, fragment_id);
                true
            }
        };

        if changed {
            self.modified = true;
        }
        changed
    }

    /// Remove the live fragments of `source_id`, except the ids in `keep`.
    /// Returns the number of fragments removed.
    pub fn remove_fragments_of_source(
        &mut self,
        source_id: &str,
        policy: DiscardPolicy,
        keep: Option<&HashSet<String>>,
    ) -> usize {
        let stale: Vec<String> = self
            .fragment_ids_of_source(source_id)
            .into_iter()
            .filter(|id| keep.is_none_or(|keep| !keep.contains(id)))
            .collect();
        for fragment_id in &stale {
            self.remove_fragment(fragment_id, policy);
        }
        stale.len()
    }

    /// Remove the live fragments of every source matching `filter`.
    pub fn remove_sources<F>(&mut self, filter: F, policy: DiscardPolicy) -> usize
    where
        F: Fn(&str) -> bool,
    {
        self.source_ids()
            .into_iter()
            .filter(|source_id| filter(source_id))
            .map(|source_id| self.remove_fragments_of_source(&source_id, policy, None))
            .sum()
    }

    /// The store fragment that is in sync with `fragment` as produced by
    /// `source_id`: same id, same owner, same value and enabled flag.
    pub fn get_sync_fragment(&self, source_id: &str, fragment: &Fragment) -> Option<&StoreFragment> {
        let fragment_id = fragment.fragment_id.as_deref()?;
        self.data.fragments.get(fragment_id).filter(|stored| {
            stored.source_id == source_id
                && stored.enabled == fragment.enabled
                && stored.value == fragment.value
        })
    }

    pub fn for_each_fragment<F>(&self, mut f: F)
    where
        F: FnMut(&str, &StoreFragment),
    {
        for (fragment_id, fragment) in &self.data.fragments {
            f(fragment_id, fragment);
        }
    }

    fn remove_fragment(&mut self, fragment_id: &str, policy: DiscardPolicy) {
        let Some(fragment) = self.data.fragments.remove(fragment_id) else {
            return;
        };
        self.index.remove(&fragment.source_id, fragment_id);
        self.modified = true;

        if policy.should_discard(&fragment) {
            debug!(fragment_id, source_id = %fragment.source_id, "discarded fragment");
        } else {
            debug!(fragment_id, source_id = %fragment.source_id, "retained obsolete fragment");
            self.data.obsolete.push((fragment_id.to_string(), fragment));
        }
    }
}
