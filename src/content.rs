//! In-memory content elements.
//!
//! A [`ContentElement`] is one unit of ingestible or queryable content. The
//! closed set of kinds currently covers text and raster images. Analysers are
//! generic over a single concrete kind; the [`ContentKind`] trait is the
//! narrowing capability they use to pick their kind out of a mixed stream.

use std::collections::HashMap;

use crate::error::{KaleidoError, Result};

/// Metadata key carrying the latitude of the content's capture location.
pub const METADATA_GPS_LATITUDE: &str = "gps.latitude";
/// Metadata key carrying the longitude of the content's capture location.
pub const METADATA_GPS_LONGITUDE: &str = "gps.longitude";

/// Textual content.
#[derive(Debug, Clone, PartialEq)]
pub struct TextContent {
    /// The text itself.
    pub text: String,
}

impl TextContent {
    /// Create new textual content.
    pub fn new<S: Into<String>>(text: S) -> Self {
        TextContent { text: text.into() }
    }
}

/// Raster image content with optional sidecar metadata.
///
/// The pixel data is the decoded image. The metadata map carries key/value
/// pairs preserved from the ingest source (e.g. EXIF-derived GPS under
/// [`METADATA_GPS_LATITUDE`] / [`METADATA_GPS_LONGITUDE`]). Images decoded
/// from a query payload have no metadata: whatever was embedded in the
/// original file is not recoverable from pixels alone.
#[derive(Debug, Clone)]
pub struct ImageContent {
    /// Decoded pixel data.
    pub image: image::DynamicImage,
    /// Sidecar metadata from the ingest source, if any.
    pub metadata: HashMap<String, String>,
}

impl ImageContent {
    /// Create image content from decoded pixel data, without metadata.
    pub fn new(image: image::DynamicImage) -> Self {
        ImageContent {
            image,
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_metadata<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Decode image content from raw encoded bytes (PNG, JPEG, ...).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| KaleidoError::content_decode(format!("failed to decode image: {e}")))?;
        Ok(ImageContent::new(image))
    }

    /// Look up a metadata entry.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(|s| s.as_str())
    }
}

/// A single unit of content flowing through the pipeline.
#[derive(Debug, Clone)]
pub enum ContentElement {
    /// Textual content.
    Text(TextContent),
    /// Raster image content.
    Image(ImageContent),
}

/// Narrowing capability for the concrete content kinds.
///
/// Implemented by [`TextContent`] and [`ImageContent`]; analysers use it to
/// select the elements of their kind from a retrievable's mixed content.
pub trait ContentKind: Send + Sync + Sized {
    /// Narrow a [`ContentElement`] to this kind, if it is one.
    fn from_element(element: &ContentElement) -> Option<&Self>;

    /// Wrap a value of this kind back into a [`ContentElement`].
    fn into_element(self) -> ContentElement;
}

impl ContentKind for TextContent {
    fn from_element(element: &ContentElement) -> Option<&Self> {
        match element {
            ContentElement::Text(text) => Some(text),
            _ => None,
        }
    }

    fn into_element(self) -> ContentElement {
        ContentElement::Text(self)
    }
}

impl ContentKind for ImageContent {
    fn from_element(element: &ContentElement) -> Option<&Self> {
        match element {
            ContentElement::Image(image) => Some(image),
            _ => None,
        }
    }

    fn into_element(self) -> ContentElement {
        ContentElement::Image(self)
    }
}
