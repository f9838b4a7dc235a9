pub mod app;
pub mod error;
pub mod kind;
pub mod record;
pub mod schema;

pub use app::{AppInfo, DEFAULT_TITLE};
pub use error::{Error, Result};
pub use kind::FieldKind;
pub use record::{Document, FieldValue, IDENTITY_FIELD, Record, format_instant};
pub use schema::{
    FieldSpec, INTERNAL_MARKER, Schema, WireSchema, decode_schemas, is_internal_name,
    schemas_from_value,
};
