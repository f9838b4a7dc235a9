use crate::error::{Error, Result};
use crate::kind::FieldKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Leading character that marks a field as internal bookkeeping (`_id`, `__v`)
pub const INTERNAL_MARKER: char = '_';

pub fn is_internal_name(name: &str) -> bool {
    name.starts_with(INTERNAL_MARKER)
}

/// One field's classification within a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    /// Target model name, present iff `kind` is `Reference`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            reference: None,
        }
    }

    pub fn reference(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Reference,
            reference: Some(model.into()),
        }
    }

    /// Hidden by default in editing surfaces; a session may still show it.
    pub fn hidden(&self) -> bool {
        is_internal_name(&self.name)
    }
}

/// Declarative description of one model
///
/// Field order is the order the backend reported, and every projection
/// preserves it. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    name: String,
    fields: Vec<FieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version_field: Option<String>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            version_field: None,
        }
    }

    /// Append a field, or replace the one with the same name in place.
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    pub fn with_version_field(mut self, name: impl Into<String>) -> Self {
        self.version_field = Some(name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn version_field(&self) -> Option<&str> {
        self.version_field.as_deref()
    }

    pub fn is_version_field(&self, name: &str) -> bool {
        self.version_field.as_deref() == Some(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build a schema from its mongoose-shaped wire form.
    pub fn from_wire(name: impl Into<String>, wire: WireSchema) -> Self {
        let mut schema = Schema::new(name);

        for (path_name, raw) in wire.paths {
            // A path we cannot read is still a column; it just degrades to Object.
            let path: WirePath = serde_json::from_value(raw).unwrap_or_default();
            schema = schema.with_field(path.into_field(path_name));
        }

        schema.version_field = wire.options.version_key.and_then(|key| match key {
            Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        });

        schema
    }
}

/// Schema as served by the backend's `api/schemas` endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireSchema {
    #[serde(default)]
    pub paths: Map<String, Value>,
    #[serde(default)]
    pub options: WireSchemaOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireSchemaOptions {
    /// Name of the optimistic-concurrency field; `false` disables it
    #[serde(rename = "versionKey", default)]
    pub version_key: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct WirePath {
    #[serde(default)]
    instance: Option<String>,
    #[serde(default)]
    options: WirePathOptions,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct WirePathOptions {
    #[serde(rename = "ref", default)]
    reference: Option<String>,
}

impl WirePath {
    fn into_field(self, name: String) -> FieldSpec {
        let instance = self.instance.unwrap_or_default();
        match (instance.as_str(), self.options.reference) {
            ("ObjectID" | "ObjectId", Some(model)) if !model.is_empty() => {
                FieldSpec::reference(name, model)
            }
            _ => FieldSpec::new(name, FieldKind::from_instance(&instance)),
        }
    }
}

/// Decode the `api/schemas` payload: an object keyed by model name.
pub fn decode_schemas(json: &str) -> Result<Vec<Schema>> {
    let value: Value = serde_json::from_str(json)?;
    schemas_from_value(value)
}

pub fn schemas_from_value(value: Value) -> Result<Vec<Schema>> {
    let Value::Object(models) = value else {
        return Err(Error::Shape(format!(
            "expected an object keyed by model name, got {}",
            json_type_name(&value)
        )));
    };

    models
        .into_iter()
        .map(|(name, raw)| {
            let wire: WireSchema = serde_json::from_value(raw)?;
            Ok(Schema::from_wire(name, wire))
        })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
