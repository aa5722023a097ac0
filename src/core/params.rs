//! Reconciliation of two parameter documents (e.g. a deployed
//! environment's `parameters.yml` against the working copy's).
//!
//! Classification is a pure pass over both maps; reporting writes the
//! three sections to the console in a fixed order. Only keys missing on
//! the remote side are fatal: local maps may carry obsolete overrides,
//! but remote must stay a superset of what local expects.

use crate::console::{Color, Console};
use crate::error::{Error, Result};
use serde_yml::Value;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;

/// Coarse runtime kind of a YAML value. Kind equality is by variant,
/// never by value; a tagged value takes the kind of its inner value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    List,
    Map,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Sequence(_) => ValueKind::List,
            Value::Mapping(_) => ValueKind::Map,
            Value::Tagged(tagged) => ValueKind::of(&tagged.value),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::List => "list",
            ValueKind::Map => "map",
        };
        write!(f, "{label}")
    }
}

/// A key present in both documents with differing value kinds.
#[derive(Debug, Clone)]
pub struct TypeMismatch {
    pub key: String,
    pub remote_value: Value,
    pub remote_kind: ValueKind,
    pub local_value: Value,
    pub local_kind: ValueKind,
}

/// The three classified reports of one comparison pass. Entries keep
/// the insertion order of the source maps.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Keys present in remote but absent from local, with remote values.
    pub missing_local: Vec<(String, Value)>,
    /// Keys present in local but absent from remote, with local values.
    pub missing_remote: Vec<(String, Value)>,
    /// Keys present in both with differing kinds.
    pub type_mismatches: Vec<TypeMismatch>,
}

impl Reconciliation {
    pub fn is_clean(&self) -> bool {
        self.missing_local.is_empty()
            && self.missing_remote.is_empty()
            && self.type_mismatches.is_empty()
    }
}

/// Parse a parameters document from YAML text.
pub fn load_str(text: &str) -> Result<Value> {
    Ok(serde_yml::from_str(text)?)
}

fn parameters<'a>(doc: &'a Value, side: &str) -> Result<&'a serde_yml::Mapping> {
    doc.get("parameters")
        .and_then(Value::as_mapping)
        .ok_or_else(|| {
            Error::InvalidInput(format!("{side} document needs a [parameters] map"))
        })
}

/// Classify the two documents without any reporting.
pub fn classify(remote: &Value, local: &Value) -> Result<Reconciliation> {
    let remote_params = parameters(remote, "remote")?;
    let local_params = parameters(local, "local")?;

    let remote_index: HashMap<&str, &Value> = remote_params
        .iter()
        .filter_map(|(key, value)| key.as_str().map(|key| (key, value)))
        .collect();
    let local_index: HashMap<&str, &Value> = local_params
        .iter()
        .filter_map(|(key, value)| key.as_str().map(|key| (key, value)))
        .collect();

    let mut report = Reconciliation::default();

    for (key, remote_value) in remote_params {
        let Some(key) = key.as_str() else { continue };
        match local_index.get(key) {
            None => report
                .missing_local
                .push((key.to_string(), remote_value.clone())),
            Some(local_value) => {
                let remote_kind = ValueKind::of(remote_value);
                let local_kind = ValueKind::of(local_value);
                if remote_kind != local_kind {
                    report.type_mismatches.push(TypeMismatch {
                        key: key.to_string(),
                        remote_value: remote_value.clone(),
                        remote_kind,
                        local_value: (*local_value).clone(),
                        local_kind,
                    });
                }
            }
        }
    }

    for (key, local_value) in local_params {
        let Some(key) = key.as_str() else { continue };
        if !remote_index.contains_key(key) {
            report
                .missing_remote
                .push((key.to_string(), local_value.clone()));
        }
    }

    Ok(report)
}

/// Classify and report with the default "Remote"/"Local" titles.
pub fn reconcile<W: Write>(
    console: &mut Console<W>,
    remote: &Value,
    local: &Value,
) -> Result<Reconciliation> {
    reconcile_titled(console, remote, local, "Remote", "Local")
}

/// Classify both documents and write the three report sections to the
/// console: type mismatches first, then missing-local, then
/// missing-remote. A non-empty missing-remote section fails with
/// [`Error::MissingParameter`] after all sections are written; the
/// other two findings are reported but non-fatal.
pub fn reconcile_titled<W: Write>(
    console: &mut Console<W>,
    remote: &Value,
    local: &Value,
    title_remote: &str,
    title_local: &str,
) -> Result<Reconciliation> {
    let report = classify(remote, local)?;

    if !report.type_mismatches.is_empty() {
        console.headline_colored("Parameter Type Mismatch", Color::Yellow);
        let type_remote = format!("Type [{title_remote}]");
        let value_remote = format!("Value [{title_remote}]");
        let type_local = format!("Type [{title_local}]");
        let value_local = format!("Value [{title_local}]");
        let rows: Vec<Vec<String>> = report
            .type_mismatches
            .iter()
            .map(|entry| {
                vec![
                    entry.key.clone(),
                    entry.remote_kind.to_string(),
                    display_value(&entry.remote_value),
                    entry.local_kind.to_string(),
                    display_value(&entry.local_value),
                ]
            })
            .collect();
        console.table(
            &[
                "Param",
                type_remote.as_str(),
                value_remote.as_str(),
                type_local.as_str(),
                value_local.as_str(),
            ],
            &rows,
        );
    }

    if !report.missing_local.is_empty() {
        console.headline(&format!("Missing [{title_local}] Params:"));
        let value_header = format!("[{title_remote}] Value");
        let rows = missing_rows(&report.missing_local);
        console.table(&["Param Name", value_header.as_str()], &rows);
    }

    if !report.missing_remote.is_empty() {
        console.headline(&format!("Missing [{title_remote}] Params:"));
        let value_header = format!("[{title_local}] Value");
        let rows = missing_rows(&report.missing_remote);
        console.table(&["Param Name", value_header.as_str()], &rows);

        return Err(Error::MissingParameter(format!(
            "[{title_remote}] parameters missing. Please fix and try again"
        )));
    }

    Ok(report)
}

fn missing_rows(entries: &[(String, Value)]) -> Vec<Vec<String>> {
    entries
        .iter()
        .map(|(key, value)| vec![key.clone(), display_value(value)])
        .collect()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => {
            let rendered: Vec<String> = items.iter().map(display_value).collect();
            format!("[{}]", rendered.join(","))
        }
        Value::Mapping(map) => {
            let rendered: Vec<String> = map
                .iter()
                .map(|(key, value)| format!("{}: {}", display_value(key), display_value(value)))
                .collect();
            format!("{{{}}}", rendered.join(", "))
        }
        Value::Tagged(tagged) => display_value(&tagged.value),
    }
}
