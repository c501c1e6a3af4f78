//! Field and style model structs of a feature layer.
//!
//! All structs derive `Serialize`/`Deserialize` so they travel with the
//! layer's GeoJSON as foreign members.

use serde::{Deserialize, Serialize};

/// Storage type of an attribute field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Int,
    Double,
    DateTime,
    String,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Int => "int",
            FieldKind::Double => "double",
            FieldKind::DateTime => "datetime",
            FieldKind::String => "string",
        }
    }

    pub fn parse(s: &str) -> FieldKind {
        match s {
            "int" => FieldKind::Int,
            "double" => FieldKind::Double,
            "datetime" => FieldKind::DateTime,
            _ => FieldKind::String,
        }
    }
}

/// A named, typed attribute column of the layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
}

/// One entry of a categorised style: features whose `well_id` equals
/// `value` are drawn in `colour` and listed under `label`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub value: String,
    /// "#rrggbb"
    pub colour: String,
    pub label: String,
}
