use mess_types::{FieldValue, Record, is_internal_name};
use serde::Serialize;
use std::collections::BTreeMap;

/// A selectable candidate for a reference field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceOption {
    pub id: String,
    pub label: String,
}

/// Key persisted records by identity; records without one are skipped.
pub fn index_by_identity(records: &[Record]) -> BTreeMap<String, &Record> {
    records
        .iter()
        .filter_map(|record| record.identity().map(|id| (id, record)))
        .collect()
}

/// Turn candidate records into options for a reference picker.
///
/// The label is the record's first non-empty, non-internal string field
/// (field names sorted), falling back to the id itself.
pub fn reference_options(candidates: &[Record]) -> Vec<ReferenceOption> {
    candidates
        .iter()
        .filter_map(|record| {
            let id = record.identity()?;
            let label = record
                .iter()
                .filter(|(name, _)| !is_internal_name(name))
                .find_map(|(_, value)| match value {
                    FieldValue::Json(serde_json::Value::String(s)) if !s.trim().is_empty() => {
                        Some(s.clone())
                    }
                    _ => None,
                })
                .unwrap_or_else(|| id.clone());
            Some(ReferenceOption { id, label })
        })
        .collect()
}
