//! The record filter engine: owned dataset, schema and derived state.
//!
//! Every operation runs to completion and either applies fully or returns
//! an error with the previous state intact. Derived state (domains and the
//! displayed view) is recomputed after any change to the dataset or schema.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::domain::collect_domains;
use crate::error::EngineError;
use crate::filter::{ActiveFields, FilterSelection, PruneMode, input_filter, table_filter};
use crate::record::Record;
use crate::schema::Schema;

/// Separator written after each record on export.
pub const LINE_SEPARATOR: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Dataset, schema, current selection and current view.
#[derive(Debug, Clone)]
pub struct RecordFilterEngine {
    records: Vec<Record>,
    schema: Schema,
    domains: Vec<BTreeSet<String>>,
    selection: FilterSelection,
    /// Indices into `records` of the displayed rows, ascending.
    view: Vec<usize>,
}

impl Default for RecordFilterEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordFilterEngine {
    /// Empty dataset with the default schema.
    pub fn new() -> Self {
        Self::with_schema(Schema::default_layout())
    }

    pub fn with_schema(schema: Schema) -> Self {
        let domains = vec![BTreeSet::new(); schema.len()];
        Self {
            records: Vec::new(),
            schema,
            domains,
            selection: FilterSelection::new(),
            view: Vec::new(),
        }
    }

    /// Replace the dataset with the lines of `text`.
    ///
    /// Lines end at `\n`, `\r\n` or a lone `\r`. Empty lines are kept as
    /// records; a trailing terminator does not add one. Clears the selection
    /// and shows every row. Returns the record count.
    pub fn load_lines(&mut self, text: &str) -> usize {
        self.records = split_lines(text).into_iter().map(Record::new).collect();
        self.refresh();
        info!(records = self.records.len(), "dataset loaded");
        self.records.len()
    }

    /// Read a whole file and [`load_lines`](Self::load_lines) it.
    ///
    /// On failure the current dataset is left as it was.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize, EngineError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "reading records");
        Ok(self.load_lines(&text))
    }

    /// Parse and install a new schema.
    ///
    /// On success the selection is cleared, the view shows every row and the
    /// domains are rebuilt. On failure nothing changes.
    pub fn set_schema(&mut self, json: &str) -> Result<&Schema, EngineError> {
        let schema = Schema::parse(json)?;
        self.install_schema(schema);
        Ok(&self.schema)
    }

    /// Install an already-parsed schema, with the same resets as
    /// [`set_schema`](Self::set_schema).
    pub fn install_schema(&mut self, schema: Schema) {
        info!(fields = schema.len(), "schema installed");
        self.schema = schema;
        self.refresh();
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.schema.index_of(name)
    }

    /// Distinct values of field `index` across the dataset.
    pub fn domain(&self, index: usize) -> Option<&BTreeSet<String>> {
        self.domains.get(index)
    }

    pub fn domains(&self) -> &[BTreeSet<String>] {
        &self.domains
    }

    /// The displayed rows, in dataset order.
    pub fn view(&self) -> Vec<&Record> {
        self.view.iter().map(|&i| &self.records[i]).collect()
    }

    pub fn view_len(&self) -> usize {
        self.view.len()
    }

    /// Show only the records matching `selection`. The dataset is untouched.
    pub fn filter_by_table(
        &mut self,
        selection: FilterSelection,
    ) -> Result<Vec<&Record>, EngineError> {
        selection.validate(&self.schema)?;
        self.view = table_filter(&self.records, &self.schema, &selection);
        debug!(
            constraints = selection.len(),
            shown = self.view.len(),
            total = self.records.len(),
            "table filter applied"
        );
        self.selection = selection;
        Ok(self.view())
    }

    /// Permanently drop records whose active-field values do not occur in
    /// the current view. Returns the number of records removed.
    ///
    /// An empty `active` set is a no-op. Afterwards the view shows the whole
    /// pruned dataset, the selection is cleared and the domains are rebuilt.
    pub fn filter_by_input(
        &mut self,
        active: &ActiveFields,
        mode: PruneMode,
    ) -> Result<usize, EngineError> {
        if active.is_empty() {
            return Ok(0);
        }
        active.validate(&self.schema)?;

        let keep = {
            let view = self.view();
            input_filter(&self.records, &view, &self.schema, active, mode)
        };
        let before = self.records.len();
        let mut keep = keep.into_iter().peekable();
        let mut index = 0;
        self.records.retain(|_| {
            let kept = keep.next_if_eq(&index).is_some();
            index += 1;
            kept
        });
        let removed = before - self.records.len();

        self.refresh();
        info!(
            ?mode,
            active = active.len(),
            removed,
            remaining = self.records.len(),
            "dataset pruned"
        );
        Ok(removed)
    }

    /// Remove dataset row `index`. Out of range is a no-op returning `None`.
    pub fn remove_row(&mut self, index: usize) -> Option<Record> {
        if index >= self.records.len() {
            debug!(index, len = self.records.len(), "row removal out of range");
            return None;
        }
        let removed = self.records.remove(index);
        self.refresh();
        Some(removed)
    }

    /// The whole dataset as text, one raw record per line.
    pub fn export_all(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(record.as_str());
            out.push_str(LINE_SEPARATOR);
        }
        out
    }

    /// Write [`export_all`](Self::export_all) to `path`.
    pub fn export_to(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let path = path.as_ref();
        fs::write(path, self.export_all()).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), records = self.records.len(), "dataset exported");
        Ok(())
    }

    /// Rebuild domains, drop the selection and show every record.
    fn refresh(&mut self) {
        self.domains = collect_domains(&self.records, &self.schema);
        self.selection.clear();
        self.view = (0..self.records.len()).collect();
        debug!(fields = self.domains.len(), "domains recomputed");
    }
}

/// Split on `\n`, `\r\n` and lone `\r`, so no line keeps a `\r`.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        match rest.find(['\r', '\n']) {
            Some(pos) => {
                lines.push(&rest[..pos]);
                let skip = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[pos + skip..];
            }
            None => {
                lines.push(rest);
                break;
            }
        }
    }
    lines
}
