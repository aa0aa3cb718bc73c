//! Column layout schemas.
//!
//! A schema is JSON of the form:
//! ```text
//! {
//!   "filters": ["Prefix", "ID"],
//!   "definition": [
//!     {"name": "Prefix", "start": 1, "end": 5},
//!     {"name": "ID", "start": 6, "end": -1}
//!   ]
//! }
//! ```
//!
//! - `start` and `end` are 1-based and inclusive
//! - `end` of `-1` means "to end of line"
//! - `definition` is authoritative for field order and offsets; `filters`
//!   is an optional list of display labels and is never used for slicing

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SchemaError;

/// Layout used until a user supplies their own schema.
pub const DEFAULT_SCHEMA_JSON: &str = r#"{
  "filters": ["Prefix", "ID", "Operation", "Stelle", "Type", "Payload"],
  "definition": [
    {"name": "Prefix", "start": 1, "end": 5},
    {"name": "ID", "start": 6, "end": 13},
    {"name": "Operation", "start": 14, "end": 18},
    {"name": "Stelle", "start": 19, "end": 36},
    {"name": "Type", "start": 37, "end": 39},
    {"name": "Payload", "start": 40, "end": -1}
  ]
}"#;

/// JSON encoding of [`FieldEnd::Open`].
const OPEN_END: i64 = -1;

/// Where a field stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEnd {
    /// Last column of the field, 1-based inclusive.
    At(usize),
    /// Field runs to the end of the line.
    Open,
}

/// One named fixed-width column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    name: String,
    start: usize,
    end: FieldEnd,
}

impl FieldDef {
    /// Build a field from its JSON values, enforcing `start >= 1` and
    /// `end == -1 || end >= start`.
    pub fn new(name: impl Into<String>, start: i64, end: i64) -> Result<Self, SchemaError> {
        let name = name.into();
        if start < 1 {
            return Err(SchemaError::InvalidStart { name, start });
        }
        let field_end = if end == OPEN_END {
            FieldEnd::Open
        } else if end >= start {
            FieldEnd::At(end as usize)
        } else {
            return Err(SchemaError::InvalidBounds { name, start, end });
        };
        Ok(Self {
            name,
            start: start as usize,
            end: field_end,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 1-based first column.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> FieldEnd {
        self.end
    }

    /// Fixed width in characters, or `None` for an open field.
    pub fn width(&self) -> Option<usize> {
        match self.end {
            FieldEnd::At(end) => Some(end - self.start + 1),
            FieldEnd::Open => None,
        }
    }
}

#[derive(Deserialize, Serialize)]
struct RawField {
    name: String,
    start: i64,
    end: i64,
}

#[derive(Deserialize, Serialize)]
struct RawSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filters: Option<Vec<String>>,
    definition: Vec<RawField>,
}

/// Ordered list of field definitions.
///
/// A field's position in the list is its index; filter selections and
/// active-field sets refer to fields by that index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    fields: Vec<FieldDef>,
    labels: Option<Vec<String>>,
}

impl Schema {
    /// Parse schema JSON. Nothing is returned unless every field is valid.
    pub fn parse(json: &str) -> Result<Self, SchemaError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(SchemaError::Json(serde::de::Error::custom(
                "expected a JSON object with a 'definition' array",
            )));
        }
        let raw: RawSchema = serde_json::from_value(value)?;

        let fields = raw
            .definition
            .into_iter()
            .map(|f| FieldDef::new(f.name, f.start, f.end))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(labels) = &raw.filters
            && labels.len() != fields.len()
        {
            warn!(
                labels = labels.len(),
                fields = fields.len(),
                "schema 'filters' labels do not match 'definition'; using 'definition'"
            );
        }

        Ok(Self {
            fields,
            labels: raw.filters,
        })
    }

    /// The built-in layout from [`DEFAULT_SCHEMA_JSON`].
    pub fn default_layout() -> Self {
        Self::parse(DEFAULT_SCHEMA_JSON).unwrap_or_default()
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&FieldDef> {
        self.fields.get(index)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Index of the first field called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Display label for a field: the `filters` entry when present,
    /// otherwise the field name.
    pub fn label(&self, index: usize) -> Option<&str> {
        let field = self.fields.get(index)?;
        Some(
            self.labels
                .as_ref()
                .and_then(|l| l.get(index))
                .map_or(field.name.as_str(), String::as_str),
        )
    }

    /// Render back to the JSON shape accepted by [`Schema::parse`].
    pub fn to_json_pretty(&self) -> String {
        let raw = RawSchema {
            filters: self.labels.clone(),
            definition: self
                .fields
                .iter()
                .map(|f| RawField {
                    name: f.name.clone(),
                    start: f.start as i64,
                    end: match f.end {
                        FieldEnd::At(end) => end as i64,
                        FieldEnd::Open => OPEN_END,
                    },
                })
                .collect(),
        };
        // Plain strings and integers always serialize.
        serde_json::to_string_pretty(&raw).unwrap_or_default()
    }
}
