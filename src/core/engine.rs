//! Reconciliation engine.
//!
//! One call to [`Engine::apply`] is one reconciliation pass: the given source
//! units are re-indexed, every fragment gets a resolved id, the store is
//! brought in line with the sources, and sources whose ids changed are
//! rewritten.
//!
//! ## Id resolution
//!
//! A fragment keeps the id it carries when
//! - no other fragment got that id earlier in the same pass, and
//! - the store fragment under that id is already in sync with it, or no
//!   other settled source claims the id.
//!
//! A source counts as settled once it has been processed in this pass or if
//! it is not part of the pass at all. Sources still waiting in the pass only
//! block an id when they own its store fragment; otherwise the first source
//! processed wins and the later one is renumbered through the assigned set.
//!
//! Everything else draws from the unit's own generator (or the shared
//! default) until a candidate is neither assigned in this pass, claimed in
//! the index, nor live in the store.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use super::{
    clock::{Clock, SystemClock, Timestamp},
    error::{Error, Result},
    fragment::Fragment,
    id_generator::{Base62IdGenerator, IdGenerator},
    index::SourceFragmentIndex,
    source::Source,
    sources::SourceKind,
    store::{DiscardPolicy, FragmentUpdate, StoreData, StoreView},
};

/// Input of one reconciliation pass.
#[derive(Debug)]
pub struct SourceUpdates<S = SourceKind> {
    /// Re-parsed source units, processed in this order.
    pub updated: Vec<(String, S)>,
    /// Source units that no longer exist.
    pub removed: Vec<String>,
    /// Freshly loaded store replacing the working store before anything
    /// else runs. All known sources are re-run against it.
    pub store: Option<StoreData>,
    /// When false nothing is written back: the pass only reports what
    /// would change.
    pub modify: bool,
}

impl<S> Default for SourceUpdates<S> {
    fn default() -> Self {
        Self {
            updated: Vec::new(),
            removed: Vec::new(),
            store: None,
            modify: true,
        }
    }
}

impl<S> SourceUpdates<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(mut self, source_id: impl Into<String>, source: S) -> Self {
        self.updated.push((source_id.into(), source));
        self
    }

    pub fn remove(mut self, source_id: impl Into<String>) -> Self {
        self.removed.push(source_id.into());
        self
    }

    pub fn with_store(mut self, data: StoreData) -> Self {
        self.store = Some(data);
        self
    }

    pub fn verify_only(mut self) -> Self {
        self.modify = false;
        self
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateResult {
    /// The store has unsaved changes (or would have, for a verify-only pass).
    pub store_modified: bool,
    /// Source id -> rewritten text for every unit whose ids changed.
    pub modified_sources: BTreeMap<String, String>,
}

impl UpdateResult {
    pub fn is_out_of_sync(&self) -> bool {
        self.store_modified || !self.modified_sources.is_empty()
    }
}

/// Everything that survives between passes.
#[derive(Debug, Clone)]
struct EngineState<S> {
    sources: BTreeMap<String, S>,
    index: SourceFragmentIndex,
    store: StoreView,
    generator: Base62IdGenerator,
}

/// Owns the store view and the source index between passes.
///
/// Passes run synchronously and must not overlap; the caller serializes them.
pub struct Engine<S = SourceKind> {
    state: EngineState<S>,
    discard_obsolete: DiscardPolicy,
    clock: Box<dyn Clock>,
}

impl<S: Source + Clone> Engine<S> {
    pub fn new(store: StoreData, discard_obsolete: DiscardPolicy) -> Self {
        Self {
            state: EngineState {
                sources: BTreeMap::new(),
                index: SourceFragmentIndex::new(),
                store: StoreView::new(store),
                generator: Base62IdGenerator::new(),
            },
            discard_obsolete,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn store(&self) -> &StoreView {
        &self.state.store
    }

    /// Call after the store has been persisted.
    pub fn clear_store_modified(&mut self) {
        self.state.store.clear_modified();
    }

    pub fn index(&self) -> &SourceFragmentIndex {
        &self.state.index
    }

    pub fn sources(&self) -> &BTreeMap<String, S> {
        &self.state.sources
    }

    pub fn discard_obsolete(&self) -> DiscardPolicy {
        self.discard_obsolete
    }

    /// Run one reconciliation pass.
    ///
    /// The pass works on a copy of the engine state. The copy replaces the
    /// current state only when the pass completes and `modify` is set, so a
    /// failed pass leaves the engine as it was.
    pub fn apply(&mut self, updates: SourceUpdates<S>) -> Result<UpdateResult> {
        let now = self.clock.now();
        let modify = updates.modify;
        let mut scratch = self.state.clone();
        let result = run_pass(&mut scratch, updates, self.discard_obsolete, now)?;
        if modify {
            self.state = scratch;
        }
        Ok(result)
    }
}

fn run_pass<S: Source>(
    state: &mut EngineState<S>,
    updates: SourceUpdates<S>,
    policy: DiscardPolicy,
    now: Timestamp,
) -> Result<UpdateResult> {
    let SourceUpdates {
        updated,
        removed,
        store,
        modify,
    } = updates;

    let reload = store.is_some();
    if let Some(data) = store {
        state.store = StoreView::new(data);
    }

    for source_id in &removed {
        state.sources.remove(source_id);
        state.index.remove_source(source_id);
        state
            .store
            .remove_fragments_of_source(source_id, policy, None);
    }

    let mut order: Vec<String> = Vec::with_capacity(updated.len());
    let mut seen: HashSet<String> = HashSet::new();
    for (source_id, source) in updated {
        if seen.insert(source_id.clone()) {
            order.push(source_id.clone());
        }
        state.sources.insert(source_id, source);
    }
    if reload {
        // Sources that were not updated still need to be re-synced with
        // the new snapshot.
        order.extend(
            state
                .sources
                .keys()
                .filter(|source_id| !seen.contains(*source_id))
                .cloned()
                .collect::<Vec<_>>(),
        );
    }

    for source_id in &order {
        if let Some(source) = state.sources.get(source_id) {
            state
                .index
                .update_source(source_id, claimed_ids(source.fragments()));
        }
    }

    let mut pending: HashSet<String> = order.iter().cloned().collect();
    let mut assigned: HashSet<String> = HashSet::new();
    let mut modified_sources = BTreeMap::new();
    let mut resolved_by_source = Vec::with_capacity(order.len());
    for source_id in &order {
        pending.remove(source_id);
        let reconciled = reconcile_source(state, source_id, &pending, &mut assigned, now)?;
        if let Some(text) = reconciled.rewritten {
            modified_sources.insert(source_id.clone(), text);
        }
        resolved_by_source.push((source_id, reconciled.resolved));
    }

    // Stale fragments go last so a fragment that moved to a source
    // processed later in the pass is reassigned instead of discarded.
    for (source_id, resolved) in &resolved_by_source {
        let removed = state
            .store
            .remove_fragments_of_source(source_id, policy, Some(resolved));
        if removed > 0 {
            debug!(source_id = %source_id, removed, "removed stale fragments");
        }
    }

    if reload {
        let EngineState { sources, store, .. } = state;
        store.remove_sources(|source_id| !sources.contains_key(source_id), policy);
    }

    let result = UpdateResult {
        store_modified: state.store.is_modified(),
        modified_sources,
    };
    info!(
        sources = order.len(),
        removed = removed.len(),
        reload,
        modify,
        store_modified = result.store_modified,
        rewritten = result.modified_sources.len(),
        "reconciliation pass finished"
    );
    Ok(result)
}

struct Reconciled {
    /// New source text, if any of the unit's ids changed.
    rewritten: Option<String>,
    /// Ids the unit's fragments resolved to.
    resolved: HashSet<String>,
}

/// Reconcile one source unit's fragments with the store.
fn reconcile_source<S: Source>(
    state: &mut EngineState<S>,
    source_id: &str,
    pending: &HashSet<String>,
    assigned: &mut HashSet<String>,
    now: Timestamp,
) -> Result<Reconciled> {
    let EngineState {
        sources,
        index,
        store,
        generator,
    } = state;
    let Some(source) = sources.get_mut(source_id) else {
        return Ok(Reconciled {
            rewritten: None,
            resolved: HashSet::new(),
        });
    };

    let fragments = source.fragments().to_vec();
    let rewritable = source.is_rewritable();

    let mut resolved_ids: Vec<Option<String>> = Vec::with_capacity(fragments.len());
    let mut resolved_set: HashSet<String> = HashSet::new();
    let mut reassigned = false;

    for fragment in &fragments {
        let kept = fragment
            .fragment_id
            .as_deref()
            .filter(|id| can_keep(index, store, source_id, fragment, id, pending, assigned));

        let resolved = match kept {
            Some(id) => Some(id.to_string()),
            None if rewritable => Some(next_free_id(
                source, generator, index, store, assigned, source_id,
            )?),
            // Unmanaged sources never get invented ids.
            None => None,
        }
        .filter(|_| rewritable || fragment.value.is_some());

        if let Some(id) = &resolved {
            let old_fragment_id = fragment.fragment_id.as_deref().filter(|old| old != id);
            if fragment.fragment_id.as_deref() != Some(id.as_str()) {
                reassigned = true;
                debug!(
                    source_id,
                    old = fragment.fragment_id.as_deref().unwrap_or("-"),
                    new = %id,
                    "assigned fragment id"
                );
            }

            assigned.insert(id.clone());
            resolved_set.insert(id.clone());
            store.update_fragment(
                source_id,
                id,
                FragmentUpdate {
                    enabled: fragment.enabled,
                    value: fragment.value.as_ref(),
                    old_fragment_id,
                },
                now,
            );
        }
        resolved_ids.push(resolved);
    }

    // Static sources keep their raw claims indexed so duplicates stay
    // visible; rewritable ones will carry exactly the resolved ids.
    if rewritable {
        index.update_source(source_id, resolved_set.iter().cloned());
    }

    let rewritten = if rewritable && reassigned {
        source.rewrite(&resolved_ids)
    } else {
        None
    };

    Ok(Reconciled {
        rewritten,
        resolved: resolved_set,
    })
}

fn claimed_ids(fragments: &[Fragment]) -> Vec<String> {
    fragments
        .iter()
        .filter_map(|fragment| fragment.fragment_id.clone())
        .collect()
}

fn can_keep(
    index: &SourceFragmentIndex,
    store: &StoreView,
    source_id: &str,
    fragment: &Fragment,
    fragment_id: &str,
    pending: &HashSet<String>,
    assigned: &HashSet<String>,
) -> bool {
    if assigned.contains(fragment_id) {
        return false;
    }
    if store.get_sync_fragment(source_id, fragment).is_some() {
        return true;
    }

    let owner = store
        .fragment(fragment_id)
        .map(|stored| stored.source_id.as_str());
    let claimed_elsewhere = index.sources_of(fragment_id).is_some_and(|sources| {
        sources.iter().any(|other| {
            other != source_id && (!pending.contains(other) || owner == Some(other.as_str()))
        })
    });
    !claimed_elsewhere
}

fn next_free_id<S: Source>(
    source: &mut S,
    fallback: &mut Base62IdGenerator,
    index: &SourceFragmentIndex,
    store: &StoreView,
    assigned: &HashSet<String>,
    source_id: &str,
) -> Result<String> {
    // A generator yielding distinct values finds a free id within this
    // many draws; running past it means the generator repeats itself.
    let attempts = index.fragment_count() + store.data().fragments.len() + assigned.len() + 1;

    let generator: &mut dyn IdGenerator = match source.id_generator() {
        Some(generator) => generator,
        None => fallback,
    };
    for _ in 0..attempts {
        let candidate = generator.generate(index);
        if !assigned.contains(&candidate)
            && !index.has_fragment(&candidate)
            && store.fragment(&candidate).is_none()
        {
            return Ok(candidate);
        }
    }

    Err(Error::IdGeneratorExhausted {
        source_id: source_id.to_string(),
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::{
        clock::ManualClock,
        sources::{LineSource, StaticSource},
        store::{StoreFragment, Translation},
        value::TranslatableValue,
    };
    use pretty_assertions::assert_eq;

    fn line(text: &str) -> SourceKind {
        SourceKind::Line(LineSource::parse(text))
    }

    fn fixed(fragments: Vec<Fragment>) -> SourceKind {
        SourceKind::Static(StaticSource::new(fragments))
    }

    fn engine(policy: DiscardPolicy) -> (Engine, Arc<ManualClock>) {
        engine_with(StoreData::new(), policy)
    }

    fn engine_with(data: StoreData, policy: DiscardPolicy) -> (Engine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000));
        let engine = Engine::new(data, policy).with_clock(Arc::clone(&clock));
        (engine, clock)
    }

    fn live_ids(engine: &Engine) -> Vec<String> {
        engine.store().data().fragments.keys().cloned().collect()
    }

    fn value_of(engine: &Engine, id: &str) -> Option<TranslatableValue> {
        engine.store().fragment(id).and_then(|f| f.value.clone())
    }

    #[test]
    fn test_fresh_ids_skip_claimed_ids() {
        let (mut engine, _) = engine(DiscardPolicy::All);
        let result = engine
            .apply(
                SourceUpdates::new()
                    .update("a", line("42 = foo\n= bar\n"))
                    .update("b", line("0 = baz\n")),
            )
            .unwrap();

        assert_eq!(value_of(&engine, "42"), Some("foo".into()));
        assert_eq!(value_of(&engine, "1"), Some("bar".into()));
        assert_eq!(value_of(&engine, "0"), Some("baz".into()));
        assert_eq!(engine.store().fragment("0").unwrap().source_id, "b");
        assert_eq!(
            result.modified_sources,
            BTreeMap::from([("a".to_string(), "42 = foo\n1 = bar\n".to_string())])
        );
        assert!(result.store_modified);
    }

    #[test]
    fn test_duplicate_within_one_source() {
        let (mut engine, _) = engine(DiscardPolicy::All);
        let result = engine
            .apply(SourceUpdates::new().update("a", line("0 = foo\n0 = bar\n")))
            .unwrap();

        assert_eq!(live_ids(&engine), vec!["0", "1"]);
        assert_eq!(value_of(&engine, "0"), Some("foo".into()));
        assert_eq!(value_of(&engine, "1"), Some("bar".into()));
        assert_eq!(result.modified_sources["a"], "0 = foo\n1 = bar\n");
    }

    #[test]
    fn test_collision_across_sources_first_processed_wins() {
        let (mut engine, _) = engine(DiscardPolicy::All);
        let result = engine
            .apply(
                SourceUpdates::new()
                    .update("a", line("0 = foo\n"))
                    .update("b", line("0 = bar\n")),
            )
            .unwrap();

        assert_eq!(value_of(&engine, "0"), Some("foo".into()));
        assert_eq!(value_of(&engine, "1"), Some("bar".into()));
        assert_eq!(
            result.modified_sources.keys().collect::<Vec<_>>(),
            vec!["b"]
        );
    }

    #[test]
    fn test_collision_with_settled_source() {
        let (mut engine, _) = engine(DiscardPolicy::All);
        engine
            .apply(SourceUpdates::new().update("a", line("0 = foo\n")))
            .unwrap();

        // "b" copies the id of a fragment "a" already owns.
        let result = engine
            .apply(SourceUpdates::new().update("b", line("0 = bar\n")))
            .unwrap();

        assert_eq!(engine.store().fragment("0").unwrap().source_id, "a");
        assert_eq!(value_of(&engine, "0"), Some("foo".into()));
        assert_eq!(result.modified_sources.keys().collect::<Vec<_>>(), vec!["b"]);
        assert!(!engine.index().has_other_sources("a", "0"));
    }

    #[test]
    fn test_store_owner_wins_even_when_processed_later() {
        let (mut engine, _) = engine(DiscardPolicy::All);
        engine
            .apply(SourceUpdates::new().update("a", line("0 = foo\n")))
            .unwrap();

        let result = engine
            .apply(
                SourceUpdates::new()
                    .update("b", line("0 = bar\n"))
                    .update("a", line("0 = foo\n")),
            )
            .unwrap();

        assert_eq!(engine.store().fragment("0").unwrap().source_id, "a");
        assert_eq!(result.modified_sources.keys().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_second_pass_is_idempotent() {
        let (mut engine, clock) = engine(DiscardPolicy::All);
        let result = engine
            .apply(SourceUpdates::new().update("a", line("= foo\n= bar\n")))
            .unwrap();
        engine.clear_store_modified();
        let rewritten = result.modified_sources["a"].clone();

        clock.advance(1_000);
        let result = engine
            .apply(SourceUpdates::new().update("a", line(&rewritten)))
            .unwrap();

        assert_eq!(result, UpdateResult::default());
        assert!(!engine.store().is_modified());
        assert_eq!(engine.store().fragment("0").unwrap().modified, 1_000);
    }

    #[test]
    fn test_value_change_updates_timestamp_and_keeps_id() {
        let (mut engine, clock) = engine(DiscardPolicy::All);
        engine
            .apply(SourceUpdates::new().update("a", line("x = foo\ny = bar\n")))
            .unwrap();

        clock.set(5_000);
        let result = engine
            .apply(SourceUpdates::new().update("a", line("x = changed\ny = bar\n")))
            .unwrap();

        assert!(result.modified_sources.is_empty());
        assert_eq!(engine.store().fragment("x").unwrap().modified, 5_000);
        assert_eq!(engine.store().fragment("y").unwrap().modified, 1_000);
    }

    #[test]
    fn test_removed_fragments_follow_discard_policy() {
        let mut data = StoreData::new();
        let mut translated = StoreFragment::new("a", true, Some("foo".into()), 1_000);
        translated
            .translations
            .insert("de".to_string(), Translation::new("Foo", 2_000));
        data.fragments.insert("x".to_string(), translated);
        data.fragments.insert(
            "y".to_string(),
            StoreFragment::new("a", true, Some("bar".into()), 1_000),
        );

        let (mut engine, _) = engine_with(data, DiscardPolicy::Untranslated);
        engine
            .apply(SourceUpdates::new().update("a", line("z = new\n")))
            .unwrap();

        assert_eq!(live_ids(&engine), vec!["z"]);
        let obsolete: Vec<&str> = engine
            .store()
            .data()
            .obsolete
            .iter()
            .map(|(id, _)| id.as_str())
            .collect();
        assert_eq!(obsolete, vec!["x"]);
    }

    #[test]
    fn test_removed_source() {
        let (mut engine, _) = engine(DiscardPolicy::All);
        engine
            .apply(
                SourceUpdates::new()
                    .update("a", line("x = foo\n"))
                    .update("b", line("y = bar\n")),
            )
            .unwrap();

        let result = engine.apply(SourceUpdates::new().remove("a")).unwrap();

        assert!(result.store_modified);
        assert_eq!(live_ids(&engine), vec!["y"]);
        assert!(!engine.sources().contains_key("a"));
        assert!(!engine.index().has_source("a"));
    }

    #[test]
    fn test_static_source_does_not_invent_ids() {
        let (mut engine, _) = engine(DiscardPolicy::All);
        let result = engine
            .apply(SourceUpdates::new().update(
                "a",
                fixed(vec![
                    Fragment::text(Some("x"), "tracked"),
                    Fragment::text(None, "unmanaged"),
                    Fragment::new(Some("y"), None),
                ]),
            ))
            .unwrap();

        assert_eq!(live_ids(&engine), vec!["x"]);
        assert!(result.modified_sources.is_empty());
    }

    #[test]
    fn test_static_duplicates_stay_indexed() {
        let (mut engine, _) = engine(DiscardPolicy::All);
        engine
            .apply(
                SourceUpdates::new()
                    .update("a", fixed(vec![Fragment::text(Some("x"), "foo")]))
                    .update("b", fixed(vec![Fragment::text(Some("x"), "bar")])),
            )
            .unwrap();

        assert_eq!(value_of(&engine, "x"), Some("foo".into()));
        assert_eq!(
            engine.index().duplicates(),
            vec![("x".to_string(), vec!["a".to_string(), "b".to_string()])]
        );
    }

    #[test]
    fn test_fragment_moved_between_sources_keeps_translations() {
        let mut data = StoreData::new();
        let mut fragment = StoreFragment::new("a", true, Some("foo".into()), 1_000);
        fragment
            .translations
            .insert("de".to_string(), Translation::new("Foo", 2_000));
        data.fragments.insert("x".to_string(), fragment);

        let (mut engine, _) = engine_with(data, DiscardPolicy::All);
        engine
            .apply(
                SourceUpdates::new()
                    .update("a", line(""))
                    .update("b", line("x = foo\n")),
            )
            .unwrap();

        let moved = engine.store().fragment("x").unwrap();
        assert_eq!(moved.source_id, "b");
        assert_eq!(moved.translations.len(), 1);
        assert_eq!(moved.modified, 1_000);
    }

    #[test]
    fn test_renumbered_fragment_inherits_translations() {
        let mut data = StoreData::new();
        let mut fragment = StoreFragment::new("a", true, Some("foo".into()), 1_000);
        fragment
            .translations
            .insert("de".to_string(), Translation::new("Foo", 2_000));
        data.fragments.insert("0".to_string(), fragment);

        let (mut engine, clock) = engine_with(data, DiscardPolicy::All);
        clock.set(3_000);
        engine
            .apply(SourceUpdates::new().update("a", line("0 = foo\n0 = foo copy\n")))
            .unwrap();

        let copy = engine.store().fragment("1").unwrap();
        assert_eq!(copy.value, Some("foo copy".into()));
        assert_eq!(copy.translations["de"].value, "Foo".into());
        assert!(copy.is_outdated(&copy.translations["de"]));
    }

    #[test]
    fn test_verify_only_pass_does_not_mutate() {
        let (mut engine, _) = engine(DiscardPolicy::All);
        engine
            .apply(SourceUpdates::new().update("a", line("x = foo\n")))
            .unwrap();
        engine.clear_store_modified();

        let result = engine
            .apply(
                SourceUpdates::new()
                    .update("a", line("x = changed\n= new\n"))
                    .verify_only(),
            )
            .unwrap();

        assert!(result.store_modified);
        assert!(result.is_out_of_sync());
        assert!(result.modified_sources.contains_key("a"));

        assert!(!engine.store().is_modified());
        assert_eq!(live_ids(&engine), vec!["x"]);
        assert_eq!(value_of(&engine, "x"), Some("foo".into()));
        assert_eq!(
            engine.sources()["a"].fragments(),
            LineSource::parse("x = foo\n").fragments()
        );
    }

    #[test]
    fn test_verify_only_in_sync() {
        let (mut engine, _) = engine(DiscardPolicy::All);
        engine
            .apply(SourceUpdates::new().update("a", line("x = foo\n")))
            .unwrap();
        engine.clear_store_modified();

        let result = engine
            .apply(SourceUpdates::new().update("a", line("x = foo\n")).verify_only())
            .unwrap();
        assert!(!result.is_out_of_sync());
    }

    #[test]
    fn test_new_snapshot_resyncs_known_sources() {
        let (mut engine, _) = engine(DiscardPolicy::All);
        engine
            .apply(
                SourceUpdates::new()
                    .update("a", line("x = foo\n"))
                    .update("b", line("y = bar\n")),
            )
            .unwrap();
        engine.clear_store_modified();

        // The file on disk lost "y" and still has a fragment of a source
        // that no longer exists.
        let mut snapshot = StoreData::new();
        snapshot.fragments.insert(
            "x".to_string(),
            StoreFragment::new("a", true, Some("foo".into()), 1_000),
        );
        snapshot.fragments.insert(
            "gone".to_string(),
            StoreFragment::new("deleted", true, Some("old".into()), 1_000),
        );

        let result = engine
            .apply(SourceUpdates::new().with_store(snapshot))
            .unwrap();

        assert!(result.store_modified);
        assert!(result.modified_sources.is_empty());
        assert_eq!(live_ids(&engine), vec!["x", "y"]);
        assert_eq!(engine.store().fragment("y").unwrap().source_id, "b");
    }

    #[test]
    fn test_snapshot_in_sync_is_not_modified() {
        let (mut engine, _) = engine(DiscardPolicy::All);
        engine
            .apply(SourceUpdates::new().update("a", line("x = foo\n")))
            .unwrap();
        let snapshot = engine.store().data().clone();

        let result = engine
            .apply(SourceUpdates::new().with_store(snapshot))
            .unwrap();
        assert!(!result.is_out_of_sync());
    }

    #[derive(Debug, Clone)]
    struct PrefixedSource {
        fragments: Vec<Fragment>,
        generator: PrefixGenerator,
        rewritten: Option<Vec<Option<String>>>,
    }

    #[derive(Debug, Clone)]
    struct PrefixGenerator {
        prefix: &'static str,
        next: usize,
        repeat: bool,
    }

    impl IdGenerator for PrefixGenerator {
        fn generate(&mut self, _claimed: &SourceFragmentIndex) -> String {
            let id = format!("{}{}", self.prefix, self.next);
            if !self.repeat {
                self.next += 1;
            }
            id
        }
    }

    impl Source for PrefixedSource {
        fn fragments(&self) -> &[Fragment] {
            &self.fragments
        }

        fn id_generator(&mut self) -> Option<&mut dyn IdGenerator> {
            Some(&mut self.generator)
        }

        fn is_rewritable(&self) -> bool {
            true
        }

        fn rewrite(&mut self, resolved_ids: &[Option<String>]) -> Option<String> {
            self.rewritten = Some(resolved_ids.to_vec());
            Some(format!("{:?}", resolved_ids))
        }
    }

    fn prefixed(fragments: Vec<Fragment>, repeat: bool) -> PrefixedSource {
        PrefixedSource {
            fragments,
            generator: PrefixGenerator {
                prefix: "msg-",
                next: 0,
                repeat,
            },
            rewritten: None,
        }
    }

    #[test]
    fn test_custom_generator_is_checked_against_index() {
        let clock = Arc::new(ManualClock::new(0));
        let mut engine: Engine<PrefixedSource> =
            Engine::new(StoreData::new(), DiscardPolicy::All).with_clock(clock);

        let result = engine
            .apply(
                SourceUpdates::new()
                    .update("other", prefixed(vec![Fragment::text(Some("msg-0"), "taken")], false))
                    .update("a", prefixed(vec![Fragment::text(None, "fresh")], false)),
            )
            .unwrap();

        assert!(engine.store().fragment("msg-1").is_some());
        assert_eq!(
            engine.sources()["a"].rewritten,
            Some(vec![Some("msg-1".to_string())])
        );
        assert_eq!(result.modified_sources.len(), 1);
    }

    #[test]
    fn test_repeating_generator_fails() {
        let clock = Arc::new(ManualClock::new(0));
        let mut engine: Engine<PrefixedSource> =
            Engine::new(StoreData::new(), DiscardPolicy::All).with_clock(clock);

        let result = engine.apply(SourceUpdates::new().update(
            "a",
            prefixed(
                vec![Fragment::text(Some("msg-0"), "one"), Fragment::text(None, "two")],
                true,
            ),
        ));

        assert!(matches!(
            result,
            Err(Error::IdGeneratorExhausted { ref source_id, .. }) if source_id == "a"
        ));
    }

    #[test]
    fn test_failed_pass_leaves_engine_unchanged() {
        let clock = Arc::new(ManualClock::new(0));
        let mut data = StoreData::new();
        data.fragments.insert(
            "kept".to_string(),
            StoreFragment::new("b", true, Some("stays".into()), 0),
        );
        let mut engine: Engine<PrefixedSource> =
            Engine::new(data.clone(), DiscardPolicy::All).with_clock(clock);

        let result = engine.apply(SourceUpdates::new().update(
            "a",
            prefixed(
                vec![Fragment::text(Some("msg-0"), "one"), Fragment::text(None, "two")],
                true,
            ),
        ));

        assert!(result.is_err());
        assert_eq!(engine.store().data(), &data);
        assert!(!engine.store().is_modified());
        assert!(engine.sources().is_empty());
        assert!(!engine.index().has_source("a"));
        assert!(!engine.index().has_fragment("msg-0"));
    }
}
