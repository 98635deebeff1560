//! Structured query shapes built from typed input values.
//!
//! [`Query`] is a closed tagged union: dispatch sites match it exhaustively,
//! so adding a query shape is a compile-time-checked gap in every analyser
//! rather than a runtime type probe.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{KaleidoError, Result};
use crate::types::Value;

/// A comparison between a query input and a stored attribute value.
///
/// Parses from and displays as the symbolic operator set
/// `{<, <=, ==, !=, >=, >, ~=}`, where `~=` is LIKE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    /// Less than (`<`).
    #[serde(rename = "<")]
    Lt,
    /// Less or equal (`<=`).
    #[serde(rename = "<=")]
    Le,
    /// Equal (`==`).
    #[serde(rename = "==")]
    Eq,
    /// Not equal (`!=`).
    #[serde(rename = "!=")]
    Ne,
    /// Greater or equal (`>=`).
    #[serde(rename = ">=")]
    Ge,
    /// Greater than (`>`).
    #[serde(rename = ">")]
    Gt,
    /// LIKE (`~=`).
    #[serde(rename = "~=")]
    Like,
}

impl ComparisonOperator {
    /// The symbolic form of this operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Le => "<=",
            ComparisonOperator::Eq => "==",
            ComparisonOperator::Ne => "!=",
            ComparisonOperator::Ge => ">=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Like => "~=",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ComparisonOperator {
    type Err = KaleidoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "<" => Ok(ComparisonOperator::Lt),
            "<=" => Ok(ComparisonOperator::Le),
            "==" => Ok(ComparisonOperator::Eq),
            "!=" => Ok(ComparisonOperator::Ne),
            ">=" => Ok(ComparisonOperator::Ge),
            ">" => Ok(ComparisonOperator::Gt),
            "~=" => Ok(ComparisonOperator::Like),
            other => Err(KaleidoError::invalid_input(format!(
                "unknown comparison operator '{other}'"
            ))),
        }
    }
}

/// An atomic comparison of one attribute against one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleBooleanQuery {
    /// The targeted attribute name.
    pub attribute_name: String,
    /// The value to compare against.
    pub value: Value,
    /// The comparison to apply.
    pub comparison: ComparisonOperator,
    /// Maximum number of results to return.
    pub limit: usize,
}

impl SimpleBooleanQuery {
    /// Create a new simple boolean query.
    pub fn new<S: Into<String>>(
        attribute_name: S,
        value: Value,
        comparison: ComparisonOperator,
        limit: usize,
    ) -> Self {
        SimpleBooleanQuery {
            attribute_name: attribute_name.into(),
            value,
            comparison,
            limit,
        }
    }
}

/// A conjunction of a spatial predicate with further boolean predicates.
///
/// Built by the boundary layer; this core consumes it opaquely, only to
/// detect and reject it where a dedicated spatial retriever is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundAndSpatialQuery {
    /// Center of the spatial predicate, as a WKT point.
    pub center: String,
    /// Radius of the spatial predicate in kilometers.
    pub distance_km: f64,
    /// Further boolean predicates, all of which must hold.
    pub clauses: Vec<SimpleBooleanQuery>,
    /// Maximum number of results to return.
    pub limit: usize,
}

/// The closed set of query shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Query {
    /// An atomic attribute comparison.
    SimpleBoolean(SimpleBooleanQuery),
    /// A spatial-and-boolean conjunction.
    CompoundAndSpatial(CompoundAndSpatialQuery),
}

impl Query {
    /// A short name for the query shape, used in error messages.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Query::SimpleBoolean(_) => "SimpleBooleanQuery",
            Query::CompoundAndSpatial(_) => "CompoundAndSpatialQuery",
        }
    }
}

impl From<SimpleBooleanQuery> for Query {
    fn from(query: SimpleBooleanQuery) -> Self {
        Query::SimpleBoolean(query)
    }
}

impl From<CompoundAndSpatialQuery> for Query {
    fn from(query: CompoundAndSpatialQuery) -> Self {
        Query::CompoundAndSpatial(query)
    }
}
