//! Typed query input values.
//!
//! [`InputData`] is the tagged union the boundary layer deserializes query
//! inputs into. The wire format is an internally-tagged object with a
//! mandatory lowercase `type` discriminator and an optional `comparison`
//! string defaulting to `"=="`:
//!
//! ```json
//! { "type": "date", "data": "2025-05-20", "comparison": "==" }
//! ```
//!
//! Conversion to ingestible content is a fixed per-variant capability: only
//! text and image inputs carry a content-derivable payload. All other
//! variants fail [`InputData::to_content`] deterministically, evaluated at
//! call time, so non-convertible values can still be stored and serialized.

use base64::Engine;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::content::{ContentElement, ImageContent, TextContent};
use crate::error::{KaleidoError, Result};
use crate::query::ComparisonOperator;
use crate::types::Value;

/// The wire discriminator of an [`InputData`] variant.
///
/// Image is a distinct tag from Vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// Textual input.
    Text,
    /// Dense vector input.
    Vector,
    /// Base64-encoded image input.
    Image,
    /// Retrievable id input.
    Id,
    /// Boolean input.
    Boolean,
    /// Numeric input.
    Numeric,
    /// Calendar date input.
    Date,
    /// Local date-time input.
    DateTime,
}

fn default_comparison() -> String {
    "==".to_string()
}

/// A query's typed input value, with an attached comparison operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InputData {
    /// Textual input. Convertible to text content.
    Text {
        /// The text payload.
        data: String,
        /// The comparison to apply.
        #[serde(default = "default_comparison")]
        comparison: String,
    },
    /// Dense vector input. Not convertible to content.
    Vector {
        /// The vector components.
        data: Vec<f32>,
        /// The comparison to apply.
        #[serde(default = "default_comparison")]
        comparison: String,
    },
    /// Image input as a base64-encoded payload. Convertible to image content.
    Image {
        /// The base64-encoded image bytes.
        data: String,
        /// The comparison to apply.
        #[serde(default = "default_comparison")]
        comparison: String,
    },
    /// A retrievable id. Not convertible to content.
    Id {
        /// The retrievable id.
        id: String,
        /// The comparison to apply.
        #[serde(default = "default_comparison")]
        comparison: String,
    },
    /// Boolean input. Not convertible to content.
    Boolean {
        /// The boolean payload.
        data: bool,
        /// The comparison to apply.
        #[serde(default = "default_comparison")]
        comparison: String,
    },
    /// Numeric input. Not convertible to content.
    Numeric {
        /// The numeric payload.
        data: f64,
        /// The comparison to apply.
        #[serde(default = "default_comparison")]
        comparison: String,
    },
    /// A calendar date in `YYYY-MM-DD` form. Not convertible to content.
    Date {
        /// The date string.
        data: String,
        /// The comparison to apply.
        #[serde(default = "default_comparison")]
        comparison: String,
    },
    /// A local date-time in ISO-8601 form, e.g. `2025-05-20T19:25:49`.
    /// Not convertible to content.
    #[serde(rename = "datetime")]
    DateTime {
        /// The date-time string.
        data: String,
        /// The comparison to apply.
        #[serde(default = "default_comparison")]
        comparison: String,
    },
}

impl InputData {
    /// The wire discriminator of this variant.
    pub fn input_type(&self) -> InputType {
        match self {
            InputData::Text { .. } => InputType::Text,
            InputData::Vector { .. } => InputType::Vector,
            InputData::Image { .. } => InputType::Image,
            InputData::Id { .. } => InputType::Id,
            InputData::Boolean { .. } => InputType::Boolean,
            InputData::Numeric { .. } => InputType::Numeric,
            InputData::Date { .. } => InputType::Date,
            InputData::DateTime { .. } => InputType::DateTime,
        }
    }

    /// The raw comparison string attached to this input.
    pub fn comparison(&self) -> &str {
        match self {
            InputData::Text { comparison, .. }
            | InputData::Image { comparison, .. }
            | InputData::Id { comparison, .. }
            | InputData::Date { comparison, .. }
            | InputData::DateTime { comparison, .. }
            | InputData::Vector { comparison, .. }
            | InputData::Boolean { comparison, .. }
            | InputData::Numeric { comparison, .. } => comparison,
        }
    }

    /// Parse the attached comparison string into a [`ComparisonOperator`].
    pub fn comparison_operator(&self) -> Result<ComparisonOperator> {
        self.comparison().parse()
    }

    /// Convert this input to ingestible content, if the variant supports it.
    ///
    /// Text yields text content; Image decodes its base64 payload into image
    /// content (decode failures surface as [`KaleidoError::ContentDecode`]).
    /// Every other variant fails with [`KaleidoError::ContentConversion`].
    pub fn to_content(&self) -> Result<ContentElement> {
        match self {
            InputData::Text { data, .. } => Ok(ContentElement::Text(TextContent::new(data))),
            InputData::Image { data, .. } => {
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(data)
                    .map_err(|e| {
                        KaleidoError::content_decode(format!("invalid base64 image payload: {e}"))
                    })?;
                Ok(ContentElement::Image(ImageContent::from_bytes(&bytes)?))
            }
            InputData::Vector { .. } => Err(KaleidoError::content_conversion(
                "cannot derive content from vector input",
            )),
            InputData::Id { .. } => Err(KaleidoError::content_conversion(
                "cannot derive content from retrievable id input",
            )),
            InputData::Boolean { .. } => Err(KaleidoError::content_conversion(
                "cannot derive content from boolean input",
            )),
            InputData::Numeric { .. } => Err(KaleidoError::content_conversion(
                "cannot derive content from numeric input",
            )),
            InputData::Date { .. } => Err(KaleidoError::content_conversion(
                "cannot derive content from date input",
            )),
            InputData::DateTime { .. } => Err(KaleidoError::content_conversion(
                "cannot derive content from date-time input",
            )),
        }
    }

    /// Parse a date input's payload as a `YYYY-MM-DD` calendar date.
    ///
    /// Malformed input is an [`KaleidoError::InvalidInput`] error, never a
    /// default date. Calling this on a non-date variant is a misuse and is
    /// rejected the same way.
    pub fn parse_date(&self) -> Result<NaiveDate> {
        match self {
            InputData::Date { data, .. } => {
                NaiveDate::parse_from_str(data, "%Y-%m-%d").map_err(|e| {
                    KaleidoError::invalid_input(format!("malformed date '{data}': {e}"))
                })
            }
            other => Err(KaleidoError::invalid_input(format!(
                "parse_date called on {:?} input",
                other.input_type()
            ))),
        }
    }

    /// Parse a date-time input's payload as a strict ISO-8601 local date-time.
    pub fn parse_date_time(&self) -> Result<NaiveDateTime> {
        match self {
            InputData::DateTime { data, .. } => data.parse::<NaiveDateTime>().map_err(|e| {
                KaleidoError::invalid_input(format!("malformed date-time '{data}': {e}"))
            }),
            other => Err(KaleidoError::invalid_input(format!(
                "parse_date_time called on {:?} input",
                other.input_type()
            ))),
        }
    }

    /// View this input as a typed attribute [`Value`] for structured query
    /// construction. Date and date-time payloads are parsed strictly; an
    /// image payload has no scalar value representation.
    pub fn to_value(&self) -> Result<Value> {
        match self {
            InputData::Text { data, .. } => Ok(Value::Text(data.clone())),
            InputData::Vector { data, .. } => Ok(Value::FloatVector(data.clone())),
            InputData::Id { id, .. } => Ok(Value::Text(id.clone())),
            InputData::Boolean { data, .. } => Ok(Value::Boolean(*data)),
            InputData::Numeric { data, .. } => Ok(Value::Double(*data)),
            InputData::Date { .. } => Ok(Value::Date(self.parse_date()?)),
            InputData::DateTime { .. } => Ok(Value::DateTime(self.parse_date_time()?)),
            InputData::Image { .. } => Err(KaleidoError::invalid_input(
                "image input has no scalar value representation",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_default_comparison(data: &str) -> InputData {
        serde_json::from_str(data).unwrap()
    }

    #[test]
    fn test_wire_tags_are_lowercase_and_distinct() {
        let input = with_default_comparison(r#"{"type": "image", "data": "aGk="}"#);
        assert_eq!(input.input_type(), InputType::Image);

        let input = with_default_comparison(r#"{"type": "vector", "data": [0.5, 1.5]}"#);
        assert_eq!(input.input_type(), InputType::Vector);

        let input = with_default_comparison(r#"{"type": "datetime", "data": "2025-05-20T19:25:49"}"#);
        assert_eq!(input.input_type(), InputType::DateTime);
    }

    #[test]
    fn test_comparison_defaults_to_equality() {
        let input = with_default_comparison(r#"{"type": "numeric", "data": 3.5}"#);
        assert_eq!(input.comparison(), "==");
        assert_eq!(input.comparison_operator().unwrap(), ComparisonOperator::Eq);

        let input =
            with_default_comparison(r#"{"type": "numeric", "data": 3.5, "comparison": "<="}"#);
        assert_eq!(input.comparison_operator().unwrap(), ComparisonOperator::Le);
    }

    #[test]
    fn test_text_converts_to_content() {
        let input = InputData::Text {
            data: "query text".to_string(),
            comparison: default_comparison(),
        };
        match input.to_content().unwrap() {
            ContentElement::Text(text) => assert_eq!(text.text, "query text"),
            other => panic!("expected text content, got {other:?}"),
        }
    }

    #[test]
    fn test_image_round_trips_pixels_through_base64() {
        let image = image::DynamicImage::new_rgb8(3, 2);
        let mut png = Vec::new();
        image
            .write_to(
                &mut std::io::Cursor::new(&mut png),
                image::ImageFormat::Png,
            )
            .unwrap();
        let encoded = base64::engine::general_purpose::STANDARD.encode(&png);

        let input = InputData::Image {
            data: encoded,
            comparison: default_comparison(),
        };
        match input.to_content().unwrap() {
            ContentElement::Image(content) => {
                assert_eq!(content.image.to_rgb8(), image.to_rgb8());
                assert!(content.metadata.is_empty());
            }
            other => panic!("expected image content, got {other:?}"),
        }
    }

    #[test]
    fn test_image_decode_failures_surface() {
        let input = InputData::Image {
            data: "not base64!!".to_string(),
            comparison: default_comparison(),
        };
        assert!(matches!(
            input.to_content().unwrap_err(),
            KaleidoError::ContentDecode(_)
        ));

        // Valid base64, but not an image.
        let input = InputData::Image {
            data: base64::engine::general_purpose::STANDARD.encode(b"plain bytes"),
            comparison: default_comparison(),
        };
        assert!(matches!(
            input.to_content().unwrap_err(),
            KaleidoError::ContentDecode(_)
        ));
    }

    #[test]
    fn test_non_convertible_variants_always_fail() {
        let inputs = [
            InputData::Vector {
                data: vec![1.0],
                comparison: default_comparison(),
            },
            InputData::Id {
                id: "a4f1".to_string(),
                comparison: default_comparison(),
            },
            InputData::Boolean {
                data: true,
                comparison: default_comparison(),
            },
            InputData::Numeric {
                data: 1.0,
                comparison: default_comparison(),
            },
            InputData::Date {
                data: "2025-05-20".to_string(),
                comparison: default_comparison(),
            },
            InputData::DateTime {
                data: "2025-05-20T19:25:49".to_string(),
                comparison: default_comparison(),
            },
        ];
        for input in inputs {
            assert!(
                matches!(
                    input.to_content().unwrap_err(),
                    KaleidoError::ContentConversion(_)
                ),
                "{:?} must not be convertible to content",
                input.input_type()
            );
        }
    }

    #[test]
    fn test_parse_date_strict() {
        let input = InputData::Date {
            data: "2025-05-20".to_string(),
            comparison: default_comparison(),
        };
        let date = input.parse_date().unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 5, 20).unwrap());

        let input = InputData::Date {
            data: "not-a-date".to_string(),
            comparison: default_comparison(),
        };
        assert!(matches!(
            input.parse_date().unwrap_err(),
            KaleidoError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_parse_date_time_round_trips() {
        let input = InputData::DateTime {
            data: "2025-05-20T19:25:49".to_string(),
            comparison: default_comparison(),
        };
        let parsed = input.parse_date_time().unwrap();
        assert_eq!(parsed.format("%Y-%m-%dT%H:%M:%S").to_string(), "2025-05-20T19:25:49");

        let input = InputData::DateTime {
            data: "20:61 yesterday".to_string(),
            comparison: default_comparison(),
        };
        assert!(input.parse_date_time().is_err());
    }

    #[test]
    fn test_typed_value_view() {
        let input = with_default_comparison(r#"{"type": "boolean", "data": true}"#);
        assert_eq!(input.to_value().unwrap(), Value::Boolean(true));

        let input = with_default_comparison(r#"{"type": "date", "data": "2025-05-20"}"#);
        assert_eq!(
            input.to_value().unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2025, 5, 20).unwrap())
        );
    }
}
