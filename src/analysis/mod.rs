//! The analyser plugin contract.
//!
//! An [`Analyser`] binds one content kind and one descriptor kind to both
//! sides of the engine: at ingest time it produces [`Extractor`] stages that
//! derive descriptors from content, and at query time it produces
//! [`Retriever`] stages from one of three starting points: a structured
//! query, example descriptors, or example content.
//!
//! Analysers are stateless between calls; everything a stage needs is bound
//! at construction time and nothing runs until the stage's stream is driven.

pub mod bool_retriever;
pub mod coordinates;

use std::collections::HashMap;
use std::sync::Arc;

use crate::content::ContentKind;
use crate::descriptor::StructDescriptor;
use crate::error::Result;
use crate::operators::{Operator, UnaryOperator};
use crate::query::{Query, SimpleBooleanQuery};
use crate::retrievable::Retrievable;
use crate::schema::{DescriptorType, Field, Schema};

pub use bool_retriever::StructBooleanRetriever;
pub use coordinates::{GeoCoordinates, GeoCoordinatesExtractor, GeoPoint};

/// The descriptor kinds an analyser can produce.
///
/// The schema tags each field with a [`DescriptorType`]; this trait lets an
/// analyser check whether a field can be narrowed to its own kind.
pub trait DescriptorKind: Clone + Send + Sync + 'static {
    /// The schema tag of this descriptor kind.
    fn kind() -> DescriptorType;
}

impl DescriptorKind for StructDescriptor {
    fn kind() -> DescriptorType {
        DescriptorType::Struct
    }
}

/// Read-only access to stored retrievables, keyed by a boolean query.
///
/// This is the storage/index boundary: implementations live outside this
/// core and return retrievables ranked by their own scoring.
pub trait RetrievableSource: Send + Sync {
    /// Select the retrievables matching the given query.
    fn select(&self, query: &SimpleBooleanQuery) -> Result<Vec<Retrievable>>;
}

/// Context for ingest pipelines.
#[derive(Debug, Clone, Default)]
pub struct IndexContext {
    schema: Arc<Schema>,
}

impl IndexContext {
    /// Create an index context over a schema.
    pub fn new(schema: Arc<Schema>) -> Self {
        IndexContext { schema }
    }

    /// The schema this pipeline ingests into.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

/// Context for query pipelines: per-field properties plus the storage source.
#[derive(Clone, Default)]
pub struct QueryContext {
    /// Per-field key/value properties (e.g. a `"limit"` override).
    properties: HashMap<String, HashMap<String, String>>,
    source: Option<Arc<dyn RetrievableSource>>,
}

impl QueryContext {
    /// Create an empty query context.
    pub fn new() -> Self {
        QueryContext::default()
    }

    /// Bind the storage source retrievers read from.
    pub fn with_source(mut self, source: Arc<dyn RetrievableSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set a per-field property.
    pub fn with_property<F, K, V>(mut self, field: F, key: K, value: V) -> Self
    where
        F: Into<String>,
        K: Into<String>,
        V: Into<String>,
    {
        self.properties
            .entry(field.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Look up a per-field property.
    pub fn property(&self, field: &str, key: &str) -> Option<&str> {
        self.properties
            .get(field)
            .and_then(|entries| entries.get(key))
            .map(|s| s.as_str())
    }

    /// The bound storage source, if any.
    pub fn source(&self) -> Option<Arc<dyn RetrievableSource>> {
        self.source.clone()
    }
}

impl std::fmt::Debug for QueryContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryContext")
            .field("properties", &self.properties)
            .field("source", &self.source.as_ref().map(|_| "<source>"))
            .finish()
    }
}

/// An ingest stage derived from an analyser: consumes retrievables, attaches
/// the descriptors it derives, and passes the retrievables on.
pub trait Extractor: UnaryOperator<Retrievable, Retrievable> {
    /// The field or bare name this extractor writes to.
    fn target_name(&self) -> &str;
}

/// A query stage derived from an analyser: the source side of the query
/// pipeline, producing ranked/filtered retrievables.
pub trait Retriever: Operator<Retrievable> {}

impl std::fmt::Debug for dyn Retriever + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Retriever")
    }
}

/// The plugin contract binding a content kind and a descriptor kind to an
/// ingest path and a query path.
pub trait Analyser: Send + Sync {
    /// The content kind this analyser consumes.
    type Content: ContentKind + Clone + Send + Sync + 'static;
    /// The descriptor kind this analyser produces.
    type Descriptor: DescriptorKind;

    /// The name of this analyser.
    fn name(&self) -> &'static str;

    /// A deterministic, addressable placeholder descriptor for a field.
    ///
    /// Idempotent: the descriptor id is stable for a given field name across
    /// calls and process restarts, so it can serve as a schema cache key. If
    /// the field cannot be narrowed to this analyser's descriptor kind, the
    /// prototype is still produced, with a warning and without the advisory
    /// field back-reference.
    fn prototype(&self, field: &Field) -> Self::Descriptor;

    /// Create an extractor bound to a concrete schema field.
    ///
    /// Construction is cheap and side-effect free; extraction happens only
    /// when the returned stage's stream is driven.
    fn new_extractor(
        &self,
        field: &Field,
        input: Arc<dyn Operator<Retrievable>>,
        context: &IndexContext,
    ) -> Result<Box<dyn Extractor>>;

    /// Create an extractor bound to a bare name, before any field exists
    /// (e.g. for derived/virtual outputs).
    fn new_extractor_named(
        &self,
        name: &str,
        input: Arc<dyn Operator<Retrievable>>,
        context: &IndexContext,
    ) -> Result<Box<dyn Extractor>>;

    /// Create a retriever from a structured query, dispatching on the
    /// concrete query variant. Unsupported variants and operator/attribute
    /// combinations are rejected with [`crate::error::KaleidoError::UnsupportedQuery`].
    fn new_retriever_for_query(
        &self,
        field: &Field,
        query: &Query,
        context: &QueryContext,
    ) -> Result<Box<dyn Retriever>>;

    /// Create a retriever from example descriptors.
    ///
    /// Requires a non-empty collection; the first descriptor serves as the
    /// exemplar from which an equality query is built.
    fn new_retriever_for_descriptors(
        &self,
        field: &Field,
        descriptors: &[Self::Descriptor],
        context: &QueryContext,
    ) -> Result<Box<dyn Retriever>>;

    /// Create a retriever from example content, by re-analysing each item
    /// and delegating to [`Analyser::new_retriever_for_descriptors`].
    ///
    /// This path is inherently lossy for content whose discriminating signal
    /// is not recoverable from the in-memory representation alone.
    fn new_retriever_for_content(
        &self,
        field: &Field,
        content: &[Self::Content],
        context: &QueryContext,
    ) -> Result<Box<dyn Retriever>>;

    /// Derive a descriptor from one content element.
    ///
    /// When no signal is extractable, implementations prefer returning an
    /// empty/default descriptor over `None`: callers then distinguish
    /// "nothing extractable" by the default values, and `None` is reserved
    /// for content the analyser produces nothing for at all.
    fn analyse(&self, content: &Self::Content, field: &Field) -> Option<Self::Descriptor>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_context_properties() {
        let context = QueryContext::new()
            .with_property("location", "limit", "25")
            .with_property("location", "mode", "strict");
        assert_eq!(context.property("location", "limit"), Some("25"));
        assert_eq!(context.property("location", "mode"), Some("strict"));
        assert_eq!(context.property("other", "limit"), None);
        assert!(context.source().is_none());
    }
}
