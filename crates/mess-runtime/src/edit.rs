use crate::api::DataAccess;
use crate::references::ReferenceCache;
use crate::{Error, Result};
use mess_engine::{
    FieldDescriptor, ValidationError, parse_input, project_fields, to_transport,
    visible_field_names,
};
use mess_types::{Document, FieldValue, Record, Schema};
use std::fmt;
use std::sync::Arc;

/// Working state for one create/edit/delete interaction
///
/// Holds its own copy of the record, so whatever the editor does to it
/// never reaches the grid row until a save succeeds and the grid reloads.
pub struct EditSession {
    access: Arc<dyn DataAccess>,
    schema: Arc<Schema>,
    record: Record,
    is_new: bool,
    show_hidden_fields: bool,
    references: ReferenceCache,
}

impl EditSession {
    /// Session for a record that does not exist yet
    pub fn create(access: Arc<dyn DataAccess>, schema: Arc<Schema>) -> Self {
        Self::open(access, schema, Record::new())
    }

    /// Session over a copy of `record`
    pub fn edit(access: Arc<dyn DataAccess>, schema: Arc<Schema>, record: &Record) -> Self {
        Self::open(access, schema, record.clone())
    }

    fn open(access: Arc<dyn DataAccess>, schema: Arc<Schema>, record: Record) -> Self {
        let is_new = !record.is_persisted();
        Self {
            access,
            schema,
            record,
            is_new,
            show_hidden_fields: false,
            references: ReferenceCache::new(),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn model_name(&self) -> &str {
        self.schema.name()
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }

    /// Fixed when the session opens
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn identity(&self) -> Option<String> {
        self.record.identity()
    }

    pub fn show_hidden_fields(&self) -> bool {
        self.show_hidden_fields
    }

    pub fn toggle_show_hidden_fields(&mut self) -> bool {
        self.show_hidden_fields = !self.show_hidden_fields;
        self.show_hidden_fields
    }

    /// Field names the form currently shows
    pub fn field_names(&self) -> Vec<String> {
        visible_field_names(&self.schema, self.show_hidden_fields)
    }

    /// Field descriptors the form currently shows
    pub fn fields(&self) -> Vec<FieldDescriptor> {
        project_fields(&self.schema, self.show_hidden_fields)
    }

    /// Descriptor for any declared field, shown or not
    pub fn field(&self, name: &str) -> Option<FieldDescriptor> {
        project_fields(&self.schema, true)
            .into_iter()
            .find(|f| f.name == name)
    }

    pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.record.set(name, value);
    }

    /// Parse editor text for a declared field and store it in the copy.
    pub fn set_input(&mut self, name: &str, input: &str) -> Result<()> {
        let field = self.field(name).ok_or_else(|| {
            ValidationError::new(
                name,
                format!("'{}' has no such field", self.schema.name()),
            )
        })?;
        let value = parse_input(&field, input)?;
        self.record.set(name, value);
        Ok(())
    }

    /// Candidates for a reference field's target model, fetched once per session.
    pub async fn load_candidates(&self, model: &str) -> Result<Arc<Vec<Record>>> {
        self.references
            .load_candidates(self.access.as_ref(), model)
            .await
    }

    /// Candidates for the reference field `name`
    pub async fn load_field_candidates(&self, name: &str) -> Result<Arc<Vec<Record>>> {
        let model = self
            .schema
            .field(name)
            .and_then(|f| f.reference.clone())
            .ok_or_else(|| {
                Error::Validation(ValidationError::new(name, "not a reference field"))
            })?;
        self.load_candidates(&model).await
    }

    pub fn references(&self) -> &ReferenceCache {
        &self.references
    }

    pub fn to_transport(&self) -> Document {
        to_transport(&self.record)
    }
}

impl fmt::Debug for EditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("model", &self.schema.name())
            .field("record", &self.record)
            .field("is_new", &self.is_new)
            .field("show_hidden_fields", &self.show_hidden_fields)
            .field("cached_references", &self.references.len())
            .finish()
    }
}
