//! # Kaleido
//!
//! The feature-analysis and query-construction core of a multimedia
//! retrieval engine.
//!
//! ## Features
//!
//! - Typed descriptors extracted from heterogeneous content at ingest time
//! - A single `Analyser` plugin contract shared by ingest and query
//! - Composable asynchronous operator pipelines with shared fan-out
//! - A tagged-union query input model with per-variant capabilities

pub mod analysis;
pub mod content;
pub mod descriptor;
pub mod error;
pub mod input;
pub mod operators;
pub mod query;
pub mod retrievable;
pub mod schema;
pub mod types;

pub mod prelude {
    pub use crate::analysis::{Analyser, Extractor, IndexContext, QueryContext, Retriever};
    pub use crate::content::{ContentElement, ImageContent, TextContent};
    pub use crate::descriptor::{Attribute, StructDescriptor};
    pub use crate::error::{KaleidoError, Result};
    pub use crate::input::InputData;
    pub use crate::operators::{Operator, OperatorScope};
    pub use crate::query::{ComparisonOperator, Query, SimpleBooleanQuery};
    pub use crate::retrievable::Retrievable;
    pub use crate::schema::{Field, Schema};
    pub use crate::types::{Type, Value};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
