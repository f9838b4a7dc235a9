//! Sample schemas and documents shared by session tests.

use mess_types::{Document, FieldKind, FieldSpec, Schema};
use serde_json::Value;

/// `{paths: {name: String, dob: Date, __v: Number}, options: {versionKey: "__v"}}`
pub fn people_schema() -> Schema {
    Schema::new("people")
        .with_field(FieldSpec::new("name", FieldKind::String))
        .with_field(FieldSpec::new("dob", FieldKind::Date))
        .with_field(FieldSpec::new("__v", FieldKind::Number))
        .with_version_field("__v")
}

pub fn users_schema() -> Schema {
    Schema::new("users")
        .with_field(FieldSpec::new("_id", FieldKind::Object))
        .with_field(FieldSpec::new("name", FieldKind::String))
        .with_field(FieldSpec::new("admin", FieldKind::Boolean))
        .with_field(FieldSpec::new("dob", FieldKind::Date))
        .with_field(FieldSpec::new("__v", FieldKind::Number))
        .with_version_field("__v")
}

pub fn orders_schema() -> Schema {
    Schema::new("orders")
        .with_field(FieldSpec::new("_id", FieldKind::Object))
        .with_field(FieldSpec::reference("customer", "users"))
        .with_field(FieldSpec::new("total", FieldKind::Number))
        .with_field(FieldSpec::new("placedAt", FieldKind::Date))
        .with_field(FieldSpec::new("__v", FieldKind::Number))
        .with_version_field("__v")
}

/// users, orders, people, in that order
pub fn sample_schemas() -> Vec<Schema> {
    vec![users_schema(), orders_schema(), people_schema()]
}

/// Unwrap a `json!` object literal into a transport document.
pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture document must be a JSON object, got {}", other),
    }
}

/// Two persisted users: Ada (admin) and Grace
pub fn sample_users() -> Vec<Document> {
    vec![
        doc(serde_json::json!({
            "_id": "000000000000000000000a0a",
            "name": "Ada",
            "admin": true,
            "dob": "1815-12-10T00:00:00.000Z",
            "__v": 0
        })),
        doc(serde_json::json!({
            "_id": "000000000000000000000b0b",
            "name": "Grace",
            "admin": false,
            "dob": "1906-12-09T00:00:00.000Z",
            "__v": 3
        })),
    ]
}
