//! Bidirectional mapping between source ids and fragment ids.

use std::collections::{HashMap, HashSet};

/// Which fragment ids each source currently claims, and the inverse.
///
/// Both maps are kept as exact inverses of each other. Updating a source
/// only touches the pairs that changed, so re-indexing one file in a large
/// project does not walk the whole index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFragmentIndex {
    fragments_by_source: HashMap<String, HashSet<String>>,
    sources_by_fragment: HashMap<String, HashSet<String>>,
}

impl SourceFragmentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the fragment id set claimed by `source_id`.
    ///
    /// An empty set removes the source entirely.
    pub fn update_source<I, S>(&mut self, source_id: &str, fragment_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let next: HashSet<String> = fragment_ids.into_iter().map(Into::into).collect();
        let previous = self.fragments_by_source.remove(source_id).unwrap_or_default();

        for fragment_id in previous.difference(&next) {
            self.unlink(source_id, fragment_id);
        }
        for fragment_id in next.difference(&previous) {
            self.sources_by_fragment
                .entry(fragment_id.clone())
                .or_default()
                .insert(source_id.to_string());
        }

        if !next.is_empty() {
            self.fragments_by_source.insert(source_id.to_string(), next);
        }
    }

    pub fn remove_source(&mut self, source_id: &str) {
        if let Some(previous) = self.fragments_by_source.remove(source_id) {
            for fragment_id in &previous {
                self.unlink(source_id, fragment_id);
            }
        }
    }

    /// Add a single pair without touching the rest of the source's set.
    pub fn add(&mut self, source_id: &str, fragment_id: &str) {
        self.fragments_by_source
            .entry(source_id.to_string())
            .or_default()
            .insert(fragment_id.to_string());
        self.sources_by_fragment
            .entry(fragment_id.to_string())
            .or_default()
            .insert(source_id.to_string());
    }

    /// Remove a single pair.
    pub fn remove(&mut self, source_id: &str, fragment_id: &str) {
        if let Some(fragments) = self.fragments_by_source.get_mut(source_id) {
            fragments.remove(fragment_id);
            if fragments.is_empty() {
                self.fragments_by_source.remove(source_id);
            }
        }
        self.unlink(source_id, fragment_id);
    }

    /// True if any source other than `source_id` claims `fragment_id`.
    pub fn has_other_sources(&self, source_id: &str, fragment_id: &str) -> bool {
        self.sources_by_fragment
            .get(fragment_id)
            .is_some_and(|sources| sources.iter().any(|s| s != source_id))
    }

    pub fn has_fragment(&self, fragment_id: &str) -> bool {
        self.sources_by_fragment.contains_key(fragment_id)
    }

    pub fn has_source(&self, source_id: &str) -> bool {
        self.fragments_by_source.contains_key(source_id)
    }

    pub fn fragments_of(&self, source_id: &str) -> Option<&HashSet<String>> {
        self.fragments_by_source.get(source_id)
    }

    pub fn sources_of(&self, fragment_id: &str) -> Option<&HashSet<String>> {
        self.sources_by_fragment.get(fragment_id)
    }

    /// Number of distinct fragment ids claimed by any source.
    pub fn fragment_count(&self) -> usize {
        self.sources_by_fragment.len()
    }

    pub fn source_ids(&self) -> impl Iterator<Item = &String> {
        self.fragments_by_source.keys()
    }

    /// Fragment ids claimed by more than one source, with their sorted
    /// source ids, ordered by fragment id.
    pub fn duplicates(&self) -> Vec<(String, Vec<String>)> {
        let mut duplicates: Vec<(String, Vec<String>)> = self
            .sources_by_fragment
            .iter()
            .filter(|(_, sources)| sources.len() > 1)
            .map(|(fragment_id, sources)| {
                let mut sources: Vec<String> = sources.iter().cloned().collect();
                sources.sort();
                (fragment_id.clone(), sources)
            })
            .collect();
        duplicates.sort();
        duplicates
    }

    fn unlink(&mut self, source_id: &str, fragment_id: &str) {
        if let Some(sources) = self.sources_by_fragment.get_mut(fragment_id) {
            sources.remove(source_id);
            if sources.is_empty() {
                self.sources_by_fragment.remove(fragment_id);
            }
        }
    }
}
