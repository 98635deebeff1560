//! Generic structured boolean retriever.
//!
//! [`StructBooleanRetriever`] serves any analyser whose query path reduces
//! to an atomic attribute comparison: it is parameterized by field, query
//! and context at construction time and consults the context's storage
//! source only when its stream is driven.

use futures::stream::StreamExt;

use crate::analysis::{QueryContext, Retriever};
use crate::error::KaleidoError;
use crate::operators::{Operator, OperatorScope, OperatorStream};
use crate::query::SimpleBooleanQuery;
use crate::retrievable::Retrievable;
use crate::schema::Field;

/// A retriever evaluating one [`SimpleBooleanQuery`] against the bound
/// storage source, truncated to the query's limit.
pub struct StructBooleanRetriever {
    field: Field,
    query: SimpleBooleanQuery,
    context: QueryContext,
}

impl StructBooleanRetriever {
    /// Create a new structured boolean retriever.
    pub fn new(field: Field, query: SimpleBooleanQuery, context: QueryContext) -> Self {
        StructBooleanRetriever {
            field,
            query,
            context,
        }
    }

    /// The field this retriever targets.
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// The query this retriever evaluates.
    pub fn query(&self) -> &SimpleBooleanQuery {
        &self.query
    }
}

impl Operator<Retrievable> for StructBooleanRetriever {
    fn name(&self) -> &str {
        "struct-boolean-retriever"
    }

    fn to_stream(&self, _scope: &OperatorScope) -> OperatorStream<Retrievable> {
        let source = self.context.source();
        let query = self.query.clone();
        let field_name = self.field.name().to_string();

        futures::stream::once(async move {
            match source {
                Some(source) => source.select(&query).map(|mut retrievables| {
                    retrievables.truncate(query.limit);
                    retrievables
                }),
                None => Err(KaleidoError::invalid_input(format!(
                    "no retrievable source bound to the query context for field '{field_name}'"
                ))),
            }
        })
        .flat_map(|selection| match selection {
            Ok(retrievables) => futures::stream::iter(retrievables.into_iter().map(Ok)).boxed(),
            Err(e) => futures::stream::once(async move { Err(e) }).boxed(),
        })
        .boxed()
    }
}

impl Retriever for StructBooleanRetriever {}
