//! Fragment reconciliation core.
//!
//! ## Module Structure
//!
//! - `value`, `fragment`: source-side data model
//! - `id_generator`: fragment id generation
//! - `index`: source id <-> fragment id mapping
//! - `store`: persisted store model, discard policy and indexed view
//! - `source`, `sources`: source unit contract and the concrete units
//! - `engine`: one reconciliation pass over a batch of source updates
//! - `plural`: plural form counts per locale
//! - `persist`: store file load/save
//! - `output`: locale bundles and build manifest
//!
//! Everything except `persist` and `output` works purely in memory.

pub mod clock;
pub mod engine;
pub mod error;
pub mod fragment;
pub mod id_generator;
pub mod index;
pub mod output;
pub mod persist;
pub mod plural;
pub mod source;
pub mod sources;
pub mod store;
pub mod value;

pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use engine::{Engine, SourceUpdates, UpdateResult};
pub use error::{Error, Result};
pub use fragment::Fragment;
pub use id_generator::{Base62IdGenerator, IdGenerator};
pub use index::SourceFragmentIndex;
pub use source::Source;
pub use sources::{LineSource, SourceKind, StaticSource};
pub use store::{DiscardPolicy, FragmentUpdate, StoreData, StoreFragment, StoreView, Translation};
pub use value::{TranslatableValue, ValueType};
