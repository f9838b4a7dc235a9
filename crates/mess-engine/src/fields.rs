use crate::error::ValidationError;
use mess_types::{FieldKind, FieldSpec, Schema, is_internal_name};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static OBJECT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-fA-F0-9]{24}$").expect("valid object id pattern"));

/// Input control an editing surface should render for a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
    Text,
    Checkbox,
    Number,
    DateTime,
    /// Pick one record of `model`; candidates come from the reference resolver
    Reference { model: String },
    /// Free-form JSON text
    Json,
}

impl Widget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Widget::Text => "text",
            Widget::Checkbox => "checkbox",
            Widget::Number => "number",
            Widget::DateTime => "date_time",
            Widget::Reference { .. } => "reference",
            Widget::Json => "json",
        }
    }
}

/// One editable form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub hidden: bool,
    #[serde(flatten)]
    pub widget: Widget,
}

pub fn infer_widget(field: &FieldSpec) -> Widget {
    match field.kind {
        FieldKind::String => Widget::Text,
        FieldKind::Boolean => Widget::Checkbox,
        FieldKind::Number => Widget::Number,
        FieldKind::Date => Widget::DateTime,
        FieldKind::Reference => match &field.reference {
            Some(model) => Widget::Reference {
                model: model.clone(),
            },
            None => Widget::Json,
        },
        FieldKind::Object => Widget::Json,
    }
}

/// Keep names that are shown: all of them when `show_hidden`, otherwise
/// only those without the internal marker. Order is preserved.
pub fn filter_fields<'a, I>(names: I, show_hidden: bool) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter(|name| show_hidden || !is_internal_name(name))
        .collect()
}

pub fn visible_field_names(schema: &Schema, show_hidden: bool) -> Vec<String> {
    filter_fields(schema.field_names(), show_hidden)
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub fn project_fields(schema: &Schema, show_hidden: bool) -> Vec<FieldDescriptor> {
    schema
        .fields()
        .iter()
        .filter(|field| show_hidden || !field.hidden())
        .map(|field| FieldDescriptor {
            name: field.name.clone(),
            kind: field.kind,
            hidden: field.hidden(),
            widget: infer_widget(field),
        })
        .collect()
}

/// Check raw editor text against the field's widget.
///
/// Empty input is always accepted; required-ness is the backend's call.
pub fn validate_input(field: &FieldDescriptor, input: &str) -> Result<(), ValidationError> {
    if input.trim().is_empty() {
        return Ok(());
    }

    match &field.widget {
        Widget::Json => serde_json::from_str::<serde_json::Value>(input)
            .map(|_| ())
            .map_err(|e| ValidationError::new(&field.name, format!("not valid JSON ({})", e))),
        Widget::Reference { model } => {
            if OBJECT_ID.is_match(input.trim()) {
                Ok(())
            } else {
                Err(ValidationError::new(
                    &field.name,
                    format!("expected a 24 character hex id of a '{}' record", model),
                ))
            }
        }
        Widget::Text | Widget::Checkbox | Widget::Number | Widget::DateTime => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new("users")
            .with_field(FieldSpec::new("_id", FieldKind::Object))
            .with_field(FieldSpec::new("name", FieldKind::String))
            .with_field(FieldSpec::new("admin", FieldKind::Boolean))
            .with_field(FieldSpec::reference("manager", "users"))
            .with_field(FieldSpec::new("__v", FieldKind::Number))
            .with_version_field("__v")
    }

    #[test]
    fn test_hidden_names_are_filtered_unless_requested() {
        let schema = schema();
        assert_eq!(visible_field_names(&schema, false), vec!["name", "admin", "manager"]);
        assert_eq!(
            visible_field_names(&schema, true),
            vec!["_id", "name", "admin", "manager", "__v"]
        );
    }

    #[test]
    fn test_filter_is_idempotent() {
        let once = filter_fields(["_a", "b", "c"], false);
        let twice = filter_fields(once.clone(), false);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_widgets_follow_kind() {
        let fields = project_fields(&schema(), true);
        let widgets: Vec<(&str, &Widget)> =
            fields.iter().map(|f| (f.name.as_str(), &f.widget)).collect();

        assert_eq!(widgets[0], ("_id", &Widget::Json));
        assert_eq!(widgets[1], ("name", &Widget::Text));
        assert_eq!(widgets[2], ("admin", &Widget::Checkbox));
        assert_eq!(
            widgets[3],
            (
                "manager",
                &Widget::Reference {
                    model: "users".to_string()
                }
            )
        );
        assert!(fields[0].hidden);
        assert!(!fields[1].hidden);
    }

    #[test]
    fn test_reference_without_target_degrades_to_json() {
        let field = FieldSpec {
            name: "owner".to_string(),
            kind: FieldKind::Reference,
            reference: None,
        };
        assert_eq!(infer_widget(&field), Widget::Json);
    }

    #[test]
    fn test_json_validator() {
        let field = &project_fields(&schema(), true)[0];
        assert!(validate_input(field, "").is_ok());
        assert!(validate_input(field, r#"{"a": [1, 2]}"#).is_ok());

        let err = validate_input(field, "{oops").unwrap_err();
        assert_eq!(err.field, "_id");
    }

    #[test]
    fn test_object_id_validator() {
        let manager = &project_fields(&schema(), false)[2];
        assert!(validate_input(manager, "507f1f77bcf86cd799439011").is_ok());
        assert!(validate_input(manager, "507F1F77BCF86CD799439011").is_ok());
        assert!(validate_input(manager, "  ").is_ok());
        assert!(validate_input(manager, "507f1f77").is_err());
        assert!(validate_input(manager, "zzzf1f77bcf86cd799439011").is_err());
    }
}
