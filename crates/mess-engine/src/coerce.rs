use crate::error::ValidationError;
use crate::fields::{FieldDescriptor, Widget, validate_input};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use mess_types::{Document, FieldKind, FieldValue, Record, Schema};
use serde_json::{Number, Value};

/// Parse a transport value as an instant.
///
/// Accepts RFC 3339 text, a bare `YYYY-MM-DD` (UTC midnight), an offset-less
/// `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC) and integer epoch milliseconds.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => parse_date_text(text.trim()),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

fn parse_date_text(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Lift a transport document into an in-memory record.
///
/// Date-typed fields become native instants when they parse; anything that
/// does not parse stays as delivered. Keys the schema does not declare pass
/// through untouched.
pub fn to_display(document: Document, schema: &Schema) -> Record {
    document
        .into_iter()
        .map(|(name, value)| {
            let is_date = schema
                .field(&name)
                .is_some_and(|field| field.kind == FieldKind::Date);
            let coerced = match (is_date, parse_date(&value)) {
                (true, Some(instant)) => FieldValue::Date(instant),
                _ => FieldValue::Json(value),
            };
            (name, coerced)
        })
        .collect()
}

pub fn to_display_all(documents: Vec<Document>, schema: &Schema) -> Vec<Record> {
    documents
        .into_iter()
        .map(|document| to_display(document, schema))
        .collect()
}

/// Lower a record back to its transport form; dates become text.
pub fn to_transport(record: &Record) -> Document {
    record
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_json()))
        .collect()
}

/// Convert editor text into a typed value for `field`.
///
/// Blank input clears the field (`null`), except for plain text fields
/// where the empty string is a legitimate value.
pub fn parse_input(field: &FieldDescriptor, input: &str) -> Result<FieldValue, ValidationError> {
    validate_input(field, input)?;

    let trimmed = input.trim();
    if trimmed.is_empty() && field.widget != Widget::Text {
        return Ok(FieldValue::Json(Value::Null));
    }

    match &field.widget {
        Widget::Text => Ok(FieldValue::from(input)),
        Widget::Checkbox => parse_bool(trimmed)
            .map(FieldValue::from)
            .ok_or_else(|| ValidationError::new(&field.name, "expected true or false")),
        Widget::Number => parse_number(trimmed)
            .map(|n| FieldValue::Json(Value::Number(n)))
            .ok_or_else(|| ValidationError::new(&field.name, "expected a number")),
        Widget::DateTime => parse_date_text(trimmed)
            .map(FieldValue::Date)
            .ok_or_else(|| {
                ValidationError::new(&field.name, "expected a date such as 2024-01-15")
            }),
        Widget::Reference { .. } => Ok(FieldValue::from(trimmed)),
        Widget::Json => serde_json::from_str(trimmed)
            .map(FieldValue::Json)
            .map_err(|e| ValidationError::new(&field.name, e.to_string())),
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn parse_number(text: &str) -> Option<Number> {
    if let Ok(int) = text.parse::<i64>() {
        return Some(Number::from(int));
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}
