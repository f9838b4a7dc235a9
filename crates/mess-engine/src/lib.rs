// Engine module - pure schema projection (columns, form fields, coercion)
// This layer sits between decoded schemas (types) and the session runtime.
// Nothing here performs I/O or fails on bad data; it degrades instead.

pub mod coerce;
pub mod columns;
pub mod error;
pub mod fields;
pub mod keys;

pub use coerce::{parse_date, parse_input, to_display, to_display_all, to_transport};
pub use columns::{ColumnKind, ColumnSpec, project_columns};
pub use error::ValidationError;
pub use fields::{
    FieldDescriptor, Widget, filter_fields, infer_widget, project_fields, validate_input,
    visible_field_names,
};
pub use keys::{ReferenceOption, index_by_identity, reference_options};
