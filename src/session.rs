//! Session scripts: a replayable sequence of viewer actions.
//!
//! Script format:
//! ```text
//! # pick all records of customer 00000002
//! SELECT ID = "00000002"
//! APPLY
//! PRUNE Operation
//! DOMAIN Type
//! EXPORT
//! ```
//!
//! - One command per line; keywords are case-insensitive
//! - Lines starting with `#` and blank lines are ignored
//! - Values are delimited strings: the first non-blank character is the
//!   delimiter (`"00000002"`, `/A B/`)
//!
//! Supported commands:
//! - `SELECT field = "value"` - Choose a value for a field (empty clears it)
//! - `CLEAR` - Clear all chosen values
//! - `APPLY` - Show only records matching the chosen values
//! - `PRUNE f1, f2 [ANY]` - Drop records whose values on the listed fields
//!   are not in the shown rows; `ANY` pools the values of all listed fields.
//!   `ANY` is the mode only when it follows a field without a comma:
//!   `PRUNE A ANY` is loose over `A`, `PRUNE A, ANY` lists fields `A` and `ANY`
//! - `REMOVE n` - Remove dataset row `n` (0-based); out of range does nothing
//! - `DOMAIN field` - Emit the distinct values of a field
//! - `VIEW` - Emit the shown rows
//! - `EXPORT` - Emit the whole dataset
//! - `COUNT` - Emit `RECORDS=<n> VIEW=<m>`
//!
//! Chosen values are pending until `APPLY`. Anything that changes the
//! dataset (`PRUNE`, `REMOVE`) discards them, as the choice lists are
//! rebuilt from the remaining records.

use tracing::debug;

use crate::engine::RecordFilterEngine;
use crate::error::{EngineError, ScriptError};
use crate::filter::{ActiveFields, FilterSelection, PruneMode};

/// Parsed session command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// SELECT field = "value"
    Select { field: String, value: String },
    /// CLEAR
    Clear,
    /// APPLY
    Apply,
    /// PRUNE f1, f2 [ANY]
    Prune { fields: Vec<String>, mode: PruneMode },
    /// REMOVE n
    Remove { index: usize },
    /// DOMAIN field
    Domain { field: String },
    /// VIEW
    View,
    /// EXPORT
    Export,
    /// COUNT
    Count,
}

impl Command {
    /// Keyword for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Select { .. } => "SELECT",
            Command::Clear => "CLEAR",
            Command::Apply => "APPLY",
            Command::Prune { .. } => "PRUNE",
            Command::Remove { .. } => "REMOVE",
            Command::Domain { .. } => "DOMAIN",
            Command::View => "VIEW",
            Command::Export => "EXPORT",
            Command::Count => "COUNT",
        }
    }
}

/// Result of running a script.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionOutput {
    /// Lines emitted by DOMAIN, VIEW, EXPORT and COUNT, in order.
    pub lines: Vec<String>,
    /// Dataset size when the script finished.
    pub record_count: usize,
    /// Shown rows when the script finished.
    pub view_count: usize,
}

impl SessionOutput {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Parse script text into commands.
pub fn parse_script(text: &str) -> Result<Vec<Command>, ScriptError> {
    let mut commands = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let cmd = parse_command(line).map_err(|message| ScriptError {
            line: line_num + 1,
            message,
        })?;
        commands.push(cmd);
    }

    Ok(commands)
}

/// Parse a single command line.
fn parse_command(line: &str) -> Result<Command, String> {
    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };

    match keyword.to_uppercase().as_str() {
        "SELECT" => parse_select(rest),
        "CLEAR" => no_operands(Command::Clear, rest),
        "APPLY" => no_operands(Command::Apply, rest),
        "PRUNE" => parse_prune(rest),
        "REMOVE" => parse_remove(rest),
        "DOMAIN" => {
            if rest.is_empty() {
                Err("DOMAIN requires a field name".to_string())
            } else {
                Ok(Command::Domain {
                    field: rest.to_string(),
                })
            }
        }
        "VIEW" => no_operands(Command::View, rest),
        "EXPORT" => no_operands(Command::Export, rest),
        "COUNT" => no_operands(Command::Count, rest),
        _ => Err(format!("Unknown command: {keyword}")),
    }
}

fn no_operands(cmd: Command, rest: &str) -> Result<Command, String> {
    if rest.is_empty() {
        Ok(cmd)
    } else {
        Err(format!("{} takes no operands, got '{rest}'", cmd.name()))
    }
}

/// Parse SELECT operands: `field = "value"`.
fn parse_select(rest: &str) -> Result<Command, String> {
    let (field, value) = rest
        .split_once('=')
        .ok_or_else(|| "SELECT requires: field = \"value\"".to_string())?;

    let field = field.trim();
    if field.is_empty() {
        return Err("SELECT requires a field name".to_string());
    }

    let (value, trailing) = parse_delimited_string(value)?;
    if !trailing.trim().is_empty() {
        return Err(format!("Unexpected text after value: '{}'", trailing.trim()));
    }

    Ok(Command::Select {
        field: field.to_string(),
        value,
    })
}

/// Parse PRUNE operands: `f1, f2 [ANY]`.
fn parse_prune(rest: &str) -> Result<Command, String> {
    let mut words: Vec<&str> = rest.split_whitespace().collect();
    let any = match words.as_slice() {
        [.., prev, last] => last.eq_ignore_ascii_case("ANY") && !prev.ends_with(','),
        _ => false,
    };
    let mode = if any {
        words.pop();
        PruneMode::AnyField
    } else {
        PruneMode::AllFields
    };

    let joined = words.join(" ");
    let fields: Vec<String> = joined
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();

    if fields.is_empty() {
        return Err("PRUNE requires at least one field name".to_string());
    }

    Ok(Command::Prune { fields, mode })
}

/// Parse REMOVE operand.
fn parse_remove(rest: &str) -> Result<Command, String> {
    let index = rest
        .parse::<usize>()
        .map_err(|_| format!("Invalid row number: '{rest}'"))?;
    Ok(Command::Remove { index })
}

/// Parse a delimited string (CMS Pipelines style).
///
/// The first non-blank character is the delimiter, and the string
/// continues until the next occurrence of that delimiter.
/// Returns (extracted_string, rest_of_input).
fn parse_delimited_string(s: &str) -> Result<(String, &str), String> {
    let s = s.trim_start();
    let Some(delim) = s.chars().next() else {
        return Err("Expected delimited string".to_string());
    };
    let after_delim = &s[delim.len_utf8()..];

    match after_delim.find(delim) {
        Some(end) => Ok((
            after_delim[..end].to_string(),
            &after_delim[end + delim.len_utf8()..],
        )),
        None => Err(format!("Unclosed delimiter '{delim}'")),
    }
}

fn resolve(engine: &RecordFilterEngine, name: &str) -> Result<usize, EngineError> {
    engine
        .field_index(name)
        .ok_or_else(|| EngineError::UnknownFieldName(name.to_string()))
}

/// Run commands against `engine` in order.
///
/// Stops at the first failing command; commands before it stay applied.
pub fn run_script(
    engine: &mut RecordFilterEngine,
    commands: &[Command],
) -> Result<SessionOutput, EngineError> {
    let mut pending: FilterSelection = engine.selection().clone();
    let mut lines = Vec::new();

    for (idx, cmd) in commands.iter().enumerate() {
        debug!(step = idx, command = cmd.name(), "session command");
        match cmd {
            Command::Select { field, value } => {
                let index = resolve(engine, field)?;
                pending.set(index, value.as_str());
            }
            Command::Clear => pending.clear(),
            Command::Apply => {
                engine.filter_by_table(pending.clone())?;
            }
            Command::Prune { fields, mode } => {
                let active = fields
                    .iter()
                    .map(|f| resolve(engine, f))
                    .collect::<Result<ActiveFields, _>>()?;
                engine.filter_by_input(&active, *mode)?;
                pending.clear();
            }
            Command::Remove { index } => {
                if engine.remove_row(*index).is_some() {
                    pending.clear();
                }
            }
            Command::Domain { field } => {
                let index = resolve(engine, field)?;
                if let Some(domain) = engine.domain(index) {
                    lines.extend(domain.iter().cloned());
                }
            }
            Command::View => {
                lines.extend(engine.view().iter().map(|r| r.as_str().to_string()));
            }
            Command::Export => {
                lines.extend(engine.records().iter().map(|r| r.as_str().to_string()));
            }
            Command::Count => {
                lines.push(format!(
                    "RECORDS={} VIEW={}",
                    engine.records().len(),
                    engine.view_len()
                ));
            }
        }
    }

    Ok(SessionOutput {
        lines,
        record_count: engine.records().len(),
        view_count: engine.view_len(),
    })
}
