//! End-to-end scenarios for the analyser contract: ingest through an
//! extractor stage, then the three retriever-construction paths.

use std::sync::Arc;

use futures::stream::StreamExt;
use parking_lot::Mutex;

use kaleido::analysis::{
    Analyser, GeoCoordinates, IndexContext, QueryContext, RetrievableSource,
};
use kaleido::content::{
    ContentKind, ImageContent, TextContent, METADATA_GPS_LATITUDE, METADATA_GPS_LONGITUDE,
};
use kaleido::error::{KaleidoError, Result};
use kaleido::operators::{Operator, OperatorScope, OperatorStream};
use kaleido::query::{ComparisonOperator, SimpleBooleanQuery};
use kaleido::retrievable::Retrievable;
use kaleido::schema::{ContentType, DescriptorType, Field, Schema};
use kaleido::types::Value;

/// A fixed in-memory source stage feeding the ingest pipeline.
struct VecSource {
    items: Vec<Retrievable>,
}

impl Operator<Retrievable> for VecSource {
    fn name(&self) -> &str {
        "vec-source"
    }

    fn to_stream(&self, _scope: &OperatorScope) -> OperatorStream<Retrievable> {
        futures::stream::iter(self.items.clone().into_iter().map(Ok)).boxed()
    }
}

/// A storage stand-in recording the query it was asked to evaluate.
#[derive(Default)]
struct RecordingSource {
    last_query: Mutex<Option<SimpleBooleanQuery>>,
    hits: usize,
}

impl RetrievableSource for RecordingSource {
    fn select(&self, query: &SimpleBooleanQuery) -> Result<Vec<Retrievable>> {
        *self.last_query.lock() = Some(query.clone());
        Ok((0..self.hits).map(|_| Retrievable::new()).collect())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn location_field() -> Field {
    Field::new("location", ContentType::Image, DescriptorType::Struct)
}

fn tagged_image(lat: &str, lon: &str) -> ImageContent {
    ImageContent::new(image::DynamicImage::new_rgb8(2, 2))
        .with_metadata(METADATA_GPS_LATITUDE, lat)
        .with_metadata(METADATA_GPS_LONGITUDE, lon)
}

#[tokio::test]
async fn ingest_pipeline_attaches_location_descriptors() {
    init_tracing();
    let mut schema = Schema::new();
    schema.add_field(location_field()).unwrap();
    let context = IndexContext::new(Arc::new(schema));

    let tagged = Retrievable::new().add_content(tagged_image("47.36", "8.55").into_element());
    let tagged_id = tagged.id();
    let untagged =
        Retrievable::new().add_content(ImageContent::new(image::DynamicImage::new_rgb8(2, 2)).into_element());
    let text_only = Retrievable::new().add_content(TextContent::new("no image here").into_element());

    let source = Arc::new(VecSource {
        items: vec![tagged, untagged, text_only],
    }) as Arc<dyn Operator<Retrievable>>;

    let analyser = GeoCoordinates::new();
    let extractor = analyser
        .new_extractor(&location_field(), source, &context)
        .unwrap();

    let scope = OperatorScope::new();
    let results: Vec<Retrievable> = extractor
        .to_stream(&scope)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(results.len(), 3, "extractors pass every retrievable through");

    let descriptors = results[0].descriptors();
    assert_eq!(descriptors.len(), 1);
    assert_eq!(descriptors[0].retrievable_id(), Some(tagged_id));
    assert_eq!(
        descriptors[0].value("location"),
        Some(&Value::Geography("POINT(8.55 47.36)".to_string()))
    );
    assert_eq!(descriptors[0].field(), Some("location"));

    // No capture location, no descriptor at ingest time.
    assert!(results[1].descriptors().is_empty());
    assert!(results[2].descriptors().is_empty());
}

#[tokio::test]
async fn extractor_bound_to_bare_name_works_without_field() {
    let context = IndexContext::default();
    let item = Retrievable::new().add_content(tagged_image("-33.86", "151.2").into_element());
    let source = Arc::new(VecSource { items: vec![item] }) as Arc<dyn Operator<Retrievable>>;

    let extractor = GeoCoordinates::new()
        .new_extractor_named("derived-location", source, &context)
        .unwrap();
    assert_eq!(extractor.target_name(), "derived-location");

    let scope = OperatorScope::new();
    let results: Vec<Retrievable> = extractor
        .to_stream(&scope)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();
    let descriptor = &results[0].descriptors()[0];
    assert_eq!(
        descriptor.value("derived-location"),
        Some(&Value::Geography("POINT(151.2 -33.86)".to_string()))
    );
    // No schema field existed yet, so no back-reference.
    assert_eq!(descriptor.field(), None);
}

#[tokio::test]
async fn retriever_for_descriptors_builds_equality_query_with_context_limit() {
    let analyser = GeoCoordinates::new();
    let field = location_field();

    let exemplar = analyser
        .analyse(&tagged_image("47.36", "8.55"), &field)
        .unwrap();

    let source = Arc::new(RecordingSource {
        hits: 5,
        ..Default::default()
    });
    let context = QueryContext::new()
        .with_source(source.clone())
        .with_property("location", "limit", "2");

    let retriever = analyser
        .new_retriever_for_descriptors(&field, std::slice::from_ref(&exemplar), &context)
        .unwrap();

    let scope = OperatorScope::new();
    let results: Vec<_> = retriever.to_stream(&scope).collect().await;
    assert_eq!(results.len(), 2, "selection is truncated to the context limit");

    let query = source.last_query.lock().clone().unwrap();
    assert_eq!(query.attribute_name, "location");
    assert_eq!(query.comparison, ComparisonOperator::Eq);
    assert_eq!(query.limit, 2);
    assert_eq!(
        query.value,
        Value::Geography("POINT(8.55 47.36)".to_string())
    );
}

#[tokio::test]
async fn retriever_for_content_seeds_from_lossy_analysis() {
    init_tracing();
    let analyser = GeoCoordinates::new();
    let field = location_field();

    let source = Arc::new(RecordingSource::default());
    let context = QueryContext::new().with_source(source.clone());

    // A query-time image decoded from pixels carries no metadata: the seed
    // degrades to the default geography value rather than failing.
    let content = vec![ImageContent::new(image::DynamicImage::new_rgb8(2, 2))];
    let retriever = analyser
        .new_retriever_for_content(&field, &content, &context)
        .unwrap();

    let scope = OperatorScope::new();
    let _: Vec<_> = retriever.to_stream(&scope).collect().await;

    let query = source.last_query.lock().clone().unwrap();
    assert_eq!(query.value, Value::Geography("POINT(0 0)".to_string()));
    assert_eq!(query.limit, 1000, "default limit applies when none is configured");
}

#[tokio::test]
async fn retriever_for_empty_descriptor_collection_fails() {
    let analyser = GeoCoordinates::new();
    let err = analyser
        .new_retriever_for_descriptors(&location_field(), &[], &QueryContext::new())
        .unwrap_err();
    assert!(matches!(err, KaleidoError::InvalidInput(_)));
}
