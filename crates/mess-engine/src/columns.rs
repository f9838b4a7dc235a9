use mess_types::{FieldKind, Schema};
use serde::Serialize;
use std::fmt;

/// Grid column type; the grid only distinguishes scalar types it can sort
/// and format, everything else renders as an opaque object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    String,
    Boolean,
    Number,
    Date,
    Object,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::String => "string",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Number => "number",
            ColumnKind::Date => "date",
            ColumnKind::Object => "object",
        }
    }
}

impl From<FieldKind> for ColumnKind {
    fn from(kind: FieldKind) -> Self {
        match kind {
            FieldKind::String => ColumnKind::String,
            FieldKind::Boolean => ColumnKind::Boolean,
            FieldKind::Number => ColumnKind::Number,
            FieldKind::Date => ColumnKind::Date,
            FieldKind::Reference | FieldKind::Object => ColumnKind::Object,
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One grid column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    pub field: String,
    #[serde(rename = "type")]
    pub kind: ColumnKind,
    pub visible: bool,
}

/// Derive grid columns from a schema: one per field, in schema order.
/// The version field is kept but hidden.
pub fn project_columns(schema: &Schema) -> Vec<ColumnSpec> {
    schema
        .fields()
        .iter()
        .map(|field| ColumnSpec {
            name: field.name.clone(),
            field: field.name.clone(),
            kind: field.kind.into(),
            visible: !schema.is_version_field(&field.name),
        })
        .collect()
}
