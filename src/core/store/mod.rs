//! Translation store: persisted data model, discard policy and the
//! indexed in-memory view the engine mutates.

mod data;
mod discard;
mod view;

pub use data::{StoreData, StoreFragment, Translation};
pub use discard::DiscardPolicy;
pub use view::{FragmentUpdate, StoreView};
