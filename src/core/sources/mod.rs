//! Concrete source units.
//!
//! - `static_source`: fragments produced by an external extractor (not rewritable)
//! - `line_source`: line-based resource files that can carry id annotations

mod line_source;
mod static_source;

use enum_dispatch::enum_dispatch;

use crate::core::{fragment::Fragment, id_generator::IdGenerator, source::Source};

pub use line_source::LineSource;
pub use static_source::StaticSource;

/// Every source unit kind the tool can load.
#[enum_dispatch(Source)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Static(StaticSource),
    Line(LineSource),
}
