//! Per-field value domains: the distinct values a column takes across the
//! dataset, used to populate filter choices.

use std::collections::BTreeSet;

use crate::record::Record;
use crate::schema::{FieldDef, Schema};

/// Distinct extracted values of `field`, in sorted order.
///
/// Records too short to reach the field contribute nothing. A record that
/// reaches the field but is blank there contributes `""`.
pub fn collect_domain(records: &[Record], field: &FieldDef) -> BTreeSet<String> {
    records
        .iter()
        .filter(|r| r.covers(field))
        .map(|r| r.extract(field))
        .collect()
}

/// One domain per schema field, in schema order.
pub fn collect_domains(records: &[Record], schema: &Schema) -> Vec<BTreeSet<String>> {
    schema
        .fields()
        .iter()
        .map(|f| collect_domain(records, f))
        .collect()
}
