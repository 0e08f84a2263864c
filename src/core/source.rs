//! Source unit contract.
//!
//! A source unit is one parsed input (usually a file) that yields fragments.
//! Parsing happens before the engine runs; the engine only sees the result
//! through this trait. Concrete units are registered in
//! [`SourceKind`](crate::core::sources::SourceKind).

use enum_dispatch::enum_dispatch;

use super::fragment::Fragment;
use super::id_generator::IdGenerator;

#[enum_dispatch]
pub trait Source {
    /// Fragments in source order, as of the last parse.
    fn fragments(&self) -> &[Fragment];

    /// Generator producing ids meaningful to this source's format.
    /// The engine falls back to its shared default when this is `None`.
    fn id_generator(&mut self) -> Option<&mut dyn IdGenerator> {
        None
    }

    /// Whether [`Source::rewrite`] can embed new ids into the source text.
    ///
    /// The engine never invents ids for units that cannot rewrite
    /// themselves; their unmanaged fragments are simply not tracked.
    fn is_rewritable(&self) -> bool {
        false
    }

    /// Embed `resolved_ids` (one entry per fragment, `None` for untracked
    /// fragments) into the source text.
    ///
    /// Returns the new text if it differs from the current one. On success
    /// the unit reflects the new text, so its fragments carry the new ids.
    fn rewrite(&mut self, _resolved_ids: &[Option<String>]) -> Option<String> {
        None
    }

    /// Names of the output bundles this unit's fragments are written to.
    /// Empty means the default bundle.
    fn output_names(&self) -> Vec<String> {
        Vec::new()
    }
}
