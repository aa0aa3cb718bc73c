//! Row filtering.
//!
//! Two independent passes over a dataset:
//! - **Table filter**: keep records whose extracted value equals the
//!   selected value for every field that has a selection. Display only.
//! - **Input filter**: keep base records whose values on a set of active
//!   fields also occur in the currently displayed rows. The engine uses the
//!   result to prune the dataset permanently.
//!
//! Both return indices into the dataset in ascending order, so filtering
//! never reorders records.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::error::EngineError;
use crate::record::Record;
use crate::schema::{FieldDef, Schema};

/// Chosen value per field index. An empty value is no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    values: BTreeMap<usize, String>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `value` for field `index`; an empty value clears it.
    pub fn set(&mut self, index: usize, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.values.remove(&index);
        } else {
            self.values.insert(index, value);
        }
    }

    pub fn with(mut self, index: usize, value: impl Into<String>) -> Self {
        self.set(index, value);
        self
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(&index).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `(field index, value)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.values.iter().map(|(i, v)| (*i, v.as_str()))
    }

    /// Fail if any selection refers to a field the schema does not have.
    pub fn validate(&self, schema: &Schema) -> Result<(), EngineError> {
        check_indices(self.values.keys().copied(), schema)
    }
}

/// Field indices taking part in the input filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveFields {
    indices: BTreeSet<usize>,
}

impl ActiveFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: usize) -> bool {
        self.indices.insert(index)
    }

    pub fn remove(&mut self, index: usize) -> bool {
        self.indices.remove(&index)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    pub fn validate(&self, schema: &Schema) -> Result<(), EngineError> {
        check_indices(self.iter(), schema)
    }
}

impl FromIterator<usize> for ActiveFields {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            indices: iter.into_iter().collect(),
        }
    }
}

fn check_indices(indices: impl Iterator<Item = usize>, schema: &Schema) -> Result<(), EngineError> {
    for index in indices {
        if index >= schema.len() {
            return Err(EngineError::UnknownField {
                index,
                field_count: schema.len(),
            });
        }
    }
    Ok(())
}

/// How the input filter combines several active fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PruneMode {
    /// Every active field's value must occur in that same field of the view.
    #[default]
    AllFields,
    /// Values of all active fields in the view are pooled; any one of the
    /// record's active-field values occurring in the pool is enough.
    AnyField,
}

/// Indices of records matching every non-empty selection.
///
/// Selections for indices the schema does not have are ignored; call
/// [`FilterSelection::validate`] to reject them instead.
pub fn table_filter(records: &[Record], schema: &Schema, selection: &FilterSelection) -> Vec<usize> {
    let constraints: Vec<(&FieldDef, &str)> = selection
        .iter()
        .filter_map(|(i, value)| schema.field(i).map(|f| (f, value)))
        .collect();

    records
        .iter()
        .enumerate()
        .filter(|(_, r)| constraints.iter().all(|(f, value)| r.value(f) == *value))
        .map(|(i, _)| i)
        .collect()
}

/// Indices of base `records` whose active-field values occur in `view`.
///
/// With no active fields every index is returned.
pub fn input_filter(
    records: &[Record],
    view: &[&Record],
    schema: &Schema,
    active: &ActiveFields,
    mode: PruneMode,
) -> Vec<usize> {
    let fields: Vec<&FieldDef> = active.iter().filter_map(|i| schema.field(i)).collect();
    if fields.is_empty() {
        return (0..records.len()).collect();
    }

    let keep: Box<dyn Fn(&Record) -> bool + '_> = match mode {
        PruneMode::AllFields => {
            let seen: Vec<HashSet<&str>> = fields
                .iter()
                .map(|f| view.iter().map(|r| r.value(f)).collect())
                .collect();
            Box::new(move |r: &Record| {
                fields
                    .iter()
                    .zip(&seen)
                    .all(|(f, values)| values.contains(r.value(f)))
            })
        }
        PruneMode::AnyField => {
            let pool: HashSet<&str> = fields
                .iter()
                .flat_map(|f| view.iter().map(move |r| r.value(f)))
                .collect();
            Box::new(move |r: &Record| fields.iter().any(|f| pool.contains(r.value(f))))
        }
    };

    records
        .iter()
        .enumerate()
        .filter(|(_, r)| keep(*r))
        .map(|(i, _)| i)
        .collect()
}
