//! Geospatial coordinate analysis.
//!
//! [`GeoCoordinates`] derives a capture location from image content and
//! stores it as a single geography attribute (`POINT(lon lat)` WKT) named
//! after the field. Coordinates come from sidecar metadata preserved at
//! ingest (EXIF-derived GPS keys); pixels alone carry no location, so
//! query-time analysis of a decoded image usually yields only the empty
//! descriptor.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::{
    Analyser, Extractor, IndexContext, QueryContext, Retriever, StructBooleanRetriever,
};
use crate::content::{ImageContent, METADATA_GPS_LATITUDE, METADATA_GPS_LONGITUDE};
use crate::descriptor::{Attribute, StructDescriptor};
use crate::error::{KaleidoError, Result};
use crate::operators::{Operator, OperatorScope, OperatorStream, UnaryOperator};
use crate::query::{ComparisonOperator, Query, SimpleBooleanQuery};
use crate::retrievable::Retrievable;
use crate::schema::{DescriptorType, Field};
use crate::types::{Type, Value};

/// Result limit applied when the context specifies none.
const DEFAULT_QUERY_LIMIT: usize = 1000;

/// A geographical point with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees (-90 to 90)
    pub lat: f64,
    /// Longitude in degrees (-180 to 180)
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new geographical point.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(KaleidoError::invalid_input(format!(
                "Invalid latitude: {lat} (must be between -90 and 90)"
            )));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(KaleidoError::invalid_input(format!(
                "Invalid longitude: {lon} (must be between -180 and 180)"
            )));
        }

        Ok(GeoPoint { lat, lon })
    }

    /// Serialize this point as WKT, `POINT(lon lat)`.
    pub fn to_wkt(&self) -> String {
        format!("POINT({} {})", self.lon, self.lat)
    }
}

/// Read a capture location from the image's sidecar metadata, if present
/// and within range.
fn point_from_metadata(image: &ImageContent) -> Option<GeoPoint> {
    let lat = image
        .metadata_value(METADATA_GPS_LATITUDE)?
        .parse::<f64>()
        .ok()?;
    let lon = image
        .metadata_value(METADATA_GPS_LONGITUDE)?
        .parse::<f64>()
        .ok()?;
    GeoPoint::new(lat, lon).ok()
}

/// The geospatial analyser: image content in, struct descriptors with one
/// geography attribute out.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoCoordinates;

impl GeoCoordinates {
    /// Create a new geospatial analyser.
    pub fn new() -> Self {
        GeoCoordinates
    }

    /// The single-attribute layout produced for a field.
    fn layout_for_field(attribute_name: &str) -> Vec<Attribute> {
        vec![Attribute::new(attribute_name, Type::Geography, false)]
    }

    /// The advisory field back-reference, dropped with a warning when the
    /// field cannot be narrowed to this analyser's descriptor kind.
    fn field_back_reference(&self, field: &Field) -> Option<String> {
        if field.descriptor_kind() == DescriptorType::Struct {
            Some(field.name().to_string())
        } else {
            warn!(
                field = field.name(),
                kind = ?field.descriptor_kind(),
                "field is not a struct-descriptor field; proceeding without back-reference"
            );
            None
        }
    }

    fn empty_descriptor(&self, attribute_name: &str, field: Option<String>) -> StructDescriptor {
        StructDescriptor::empty(
            attribute_name,
            Self::layout_for_field(attribute_name),
            field,
        )
    }
}

impl Analyser for GeoCoordinates {
    type Content = ImageContent;
    type Descriptor = StructDescriptor;

    fn name(&self) -> &'static str {
        "geo-coordinates"
    }

    fn prototype(&self, field: &Field) -> StructDescriptor {
        let attribute_name = field.name();
        StructDescriptor::prototype(
            attribute_name,
            Self::layout_for_field(attribute_name),
            self.field_back_reference(field),
        )
    }

    fn new_extractor(
        &self,
        field: &Field,
        input: Arc<dyn Operator<Retrievable>>,
        _context: &IndexContext,
    ) -> Result<Box<dyn Extractor>> {
        Ok(Box::new(GeoCoordinatesExtractor::for_field(
            input,
            field.clone(),
        )))
    }

    fn new_extractor_named(
        &self,
        name: &str,
        input: Arc<dyn Operator<Retrievable>>,
        _context: &IndexContext,
    ) -> Result<Box<dyn Extractor>> {
        Ok(Box::new(GeoCoordinatesExtractor::for_name(input, name)))
    }

    fn new_retriever_for_query(
        &self,
        field: &Field,
        query: &Query,
        context: &QueryContext,
    ) -> Result<Box<dyn Retriever>> {
        let target_attribute_name = field.name();

        match query {
            Query::CompoundAndSpatial(_) => Err(KaleidoError::unsupported_query(format!(
                "CompoundAndSpatialQuery for field '{target_attribute_name}' requires a dedicated spatial retriever"
            ))),
            Query::SimpleBoolean(query) => {
                if query.attribute_name == target_attribute_name
                    && matches!(
                        query.comparison,
                        ComparisonOperator::Eq | ComparisonOperator::Ne | ComparisonOperator::Like
                    )
                {
                    debug!(
                        field = target_attribute_name,
                        comparison = %query.comparison,
                        "creating struct boolean retriever for geography field"
                    );
                    Ok(Box::new(StructBooleanRetriever::new(
                        field.clone(),
                        query.clone(),
                        context.clone(),
                    )))
                } else {
                    Err(KaleidoError::unsupported_query(format!(
                        "SimpleBooleanQuery for field '{target_attribute_name}' (Geography type) only supports ==, != and ~= \
                         when targeting the field's primary geography attribute ('{}'); operator: {}",
                        query.attribute_name, query.comparison
                    )))
                }
            }
        }
    }

    fn new_retriever_for_descriptors(
        &self,
        field: &Field,
        descriptors: &[StructDescriptor],
        context: &QueryContext,
    ) -> Result<Box<dyn Retriever>> {
        let example = descriptors.first().ok_or_else(|| {
            KaleidoError::invalid_input("At least one descriptor must be provided")
        })?;
        let attribute_name = field.name();

        let geography = example
            .value(attribute_name)
            .and_then(Value::as_geography)
            .ok_or_else(|| {
                KaleidoError::invalid_input(format!(
                    "Example descriptor for field '{attribute_name}' is missing a valid geography \
                     value for attribute '{attribute_name}'. Values: {:?}",
                    example.values()
                ))
            })?;

        let limit = context
            .property(attribute_name, "limit")
            .and_then(|raw| raw.parse::<usize>().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_QUERY_LIMIT);

        // Exact WKT match against the exemplar's location.
        let query = SimpleBooleanQuery::new(
            attribute_name,
            Value::Geography(geography.to_string()),
            ComparisonOperator::Eq,
            limit,
        );

        debug!(
            field = attribute_name,
            "creating retriever for descriptors using WKT equality query"
        );
        self.new_retriever_for_query(field, &query.into(), context)
    }

    fn new_retriever_for_content(
        &self,
        field: &Field,
        content: &[ImageContent],
        context: &QueryContext,
    ) -> Result<Box<dyn Retriever>> {
        warn!(
            field = field.name(),
            "analysing image content at query time typically yields no capture location"
        );
        let descriptors: Vec<StructDescriptor> = content
            .iter()
            .filter_map(|item| self.analyse(item, field))
            .collect();
        self.new_retriever_for_descriptors(field, &descriptors, context)
    }

    /// Derive a location descriptor from one image.
    ///
    /// The location comes from sidecar metadata; a decoded query-time image
    /// has none, in which case the empty descriptor is returned so the
    /// caller can still use it as a query seed.
    fn analyse(&self, content: &ImageContent, field: &Field) -> Option<StructDescriptor> {
        let attribute_name = field.name();
        let back_reference = self.field_back_reference(field);

        match point_from_metadata(content) {
            Some(point) => {
                let values = HashMap::from([(
                    attribute_name.to_string(),
                    Some(Value::Geography(point.to_wkt())),
                )]);
                StructDescriptor::populated(
                    None,
                    Self::layout_for_field(attribute_name),
                    values,
                    back_reference,
                )
                .ok()
            }
            None => {
                warn!(
                    field = attribute_name,
                    "no capture location recoverable from image content; returning default"
                );
                Some(self.empty_descriptor(attribute_name, back_reference))
            }
        }
    }
}

/// The ingest stage produced by [`GeoCoordinates`].
///
/// Passes every retrievable through, attaching one geography descriptor per
/// image content element whose metadata carries a capture location. Images
/// without a location contribute nothing at ingest time.
pub struct GeoCoordinatesExtractor {
    input: Arc<dyn Operator<Retrievable>>,
    target: String,
    field: Option<Field>,
}

impl GeoCoordinatesExtractor {
    /// Create an extractor bound to a concrete schema field.
    pub fn for_field(input: Arc<dyn Operator<Retrievable>>, field: Field) -> Self {
        GeoCoordinatesExtractor {
            input,
            target: field.name().to_string(),
            field: Some(field),
        }
    }

    /// Create an extractor bound to a bare name.
    pub fn for_name<S: Into<String>>(input: Arc<dyn Operator<Retrievable>>, name: S) -> Self {
        GeoCoordinatesExtractor {
            input,
            target: name.into(),
            field: None,
        }
    }
}

impl Operator<Retrievable> for GeoCoordinatesExtractor {
    fn name(&self) -> &str {
        &self.target
    }

    fn to_stream(&self, scope: &OperatorScope) -> OperatorStream<Retrievable> {
        let upstream = self.input.to_stream(scope);
        let attribute_name = self.target.clone();
        let back_reference = self.field.as_ref().map(|f| f.name().to_string());

        upstream
            .map(move |item| {
                let mut retrievable = item?;
                let points: Vec<GeoPoint> = retrievable
                    .content_of::<ImageContent>()
                    .filter_map(point_from_metadata)
                    .collect();
                for point in points {
                    let values = HashMap::from([(
                        attribute_name.clone(),
                        Some(Value::Geography(point.to_wkt())),
                    )]);
                    let descriptor = StructDescriptor::populated(
                        Some(retrievable.id()),
                        GeoCoordinates::layout_for_field(&attribute_name),
                        values,
                        back_reference.clone(),
                    )?;
                    retrievable.add_descriptor(descriptor);
                }
                Ok(retrievable)
            })
            .boxed()
    }
}

impl UnaryOperator<Retrievable, Retrievable> for GeoCoordinatesExtractor {
    fn input(&self) -> &Arc<dyn Operator<Retrievable>> {
        &self.input
    }
}

impl Extractor for GeoCoordinatesExtractor {
    fn target_name(&self) -> &str {
        &self.target
    }
}
