//! # recview
//!
//! Core of a fixed-width record viewer.
//!
//! Records are plain text lines whose columns sit at fixed character
//! positions. A JSON schema names those columns; the engine slices each
//! line into values, collects the distinct values of every column and
//! filters rows by them.
//!
//! ## Overview
//!
//! - **Schema**: ordered field definitions (`name`, 1-based `start`, `end`
//!   or `-1` for "to end of line")
//! - **Extraction**: trimmed substring of a record for one field
//! - **Domains**: distinct values per field, for building filter choices
//! - **Table filter**: show only rows matching chosen values (display only)
//! - **Input filter**: permanently drop rows whose values on chosen fields
//!   do not occur in the rows currently shown
//!
//! ## Example
//!
//! ```
//! use recview::{FilterSelection, RecordFilterEngine};
//!
//! // Default layout: Prefix(1-5) ID(6-13) Operation(14-18) ...
//! let mut engine = RecordFilterEngine::new();
//! engine.load_lines(
//!     "REC0100000001INSRT\n\
//!      REC0100000002UPDTE\n\
//!      REC0200000001DELET\n",
//! );
//!
//! let id = engine.field_index("ID").unwrap();
//! assert_eq!(engine.domain(id).unwrap().len(), 2);
//!
//! let shown = engine
//!     .filter_by_table(FilterSelection::new().with(id, "00000001"))
//!     .unwrap();
//! assert_eq!(shown.len(), 2);
//! ```

pub mod domain;
pub mod engine;
pub mod error;
pub mod filter;
pub mod record;
pub mod schema;
pub mod session;

pub use domain::{collect_domain, collect_domains};
pub use engine::{LINE_SEPARATOR, RecordFilterEngine};
pub use error::{EngineError, SchemaError, ScriptError};
pub use filter::{ActiveFields, FilterSelection, PruneMode, input_filter, table_filter};
pub use record::Record;
pub use schema::{DEFAULT_SCHEMA_JSON, FieldDef, FieldEnd, Schema};
pub use session::{Command, SessionOutput, parse_script, run_script};
