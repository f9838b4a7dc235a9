//! In-memory stand-in for the scaffold's REST backend.

use async_trait::async_trait;
use mess_runtime::{ApiError, DataAccess};
use mess_types::{Document, IDENTITY_FIELD, Schema};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// One call the backend received, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetSchemas,
    GetModelData(String),
    Create(String),
    Update(String, String),
    Delete(String, String),
}

/// Operation that should fail the next time it is called
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailPoint {
    Schemas,
    Data(String),
    Create,
    Update,
    Delete,
}

#[derive(Default)]
struct State {
    data: HashMap<String, Vec<Document>>,
    calls: Vec<Call>,
    failures: Vec<(FailPoint, ApiError)>,
    next_id: u64,
}

/// `DataAccess` backed by a map of model name to documents.
///
/// Created records get a 24-hex-digit `_id` and `__v = 0`; updates bump
/// `__v`. Failures registered with `fail_next` fire once.
///
/// # Example
/// ```
/// use mess_testing::{MemoryBackend, fixtures};
///
/// let backend = MemoryBackend::new(fixtures::sample_schemas())
///     .with_documents("users", vec![fixtures::doc(serde_json::json!({"name": "Ada"}))]);
/// assert_eq!(backend.documents("users").len(), 1);
/// ```
pub struct MemoryBackend {
    schemas: Vec<Schema>,
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new(schemas: Vec<Schema>) -> Self {
        Self {
            schemas,
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_documents(self, model: &str, documents: Vec<Document>) -> Self {
        self.lock().data.insert(model.to_string(), documents);
        self
    }

    /// Make the next matching call fail with `message` (HTTP 500).
    pub fn fail_next(&self, point: FailPoint, message: &str) {
        self.lock()
            .failures
            .push((point, ApiError::with_status(500, message)));
    }

    pub fn documents(&self, model: &str) -> Vec<Document> {
        self.lock().data.get(model).cloned().unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// How many times `model`'s data was fetched
    pub fn fetch_count(&self, model: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::GetModelData(m) if m == model))
            .count()
    }

    pub fn write_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Create(_) | Call::Update(..) | Call::Delete(..)))
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("memory backend lock poisoned")
    }

    fn record(&self, call: Call, point: FailPoint) -> Result<MutexGuard<'_, State>, ApiError> {
        let mut state = self.lock();
        state.calls.push(call);
        if let Some(pos) = state.failures.iter().position(|(p, _)| *p == point) {
            let (_, error) = state.failures.remove(pos);
            return Err(error);
        }
        Ok(state)
    }
}

fn identity_of(document: &Document) -> Option<&str> {
    document.get(IDENTITY_FIELD).and_then(Value::as_str)
}

fn not_found(model: &str, id: &str) -> ApiError {
    ApiError::with_status(404, format!("No {} with id {}", model, id))
}

#[async_trait]
impl DataAccess for MemoryBackend {
    async fn get_schemas(&self) -> Result<Vec<Schema>, ApiError> {
        drop(self.record(Call::GetSchemas, FailPoint::Schemas)?);
        Ok(self.schemas.clone())
    }

    async fn get_model_data(&self, model: &str) -> Result<Vec<Document>, ApiError> {
        let state = self.record(
            Call::GetModelData(model.to_string()),
            FailPoint::Data(model.to_string()),
        )?;
        Ok(state.data.get(model).cloned().unwrap_or_default())
    }

    async fn create_model(&self, model: &str, mut document: Document) -> Result<Document, ApiError> {
        let mut state = self.record(Call::Create(model.to_string()), FailPoint::Create)?;
        state.next_id += 1;
        let id = format!("{:024x}", state.next_id);
        document.insert(IDENTITY_FIELD.to_string(), Value::String(id));
        document.insert("__v".to_string(), Value::from(0));
        state
            .data
            .entry(model.to_string())
            .or_default()
            .push(document.clone());
        Ok(document)
    }

    async fn update_model(
        &self,
        model: &str,
        id: &str,
        mut document: Document,
    ) -> Result<Document, ApiError> {
        let mut state = self.record(
            Call::Update(model.to_string(), id.to_string()),
            FailPoint::Update,
        )?;
        let rows = state.data.entry(model.to_string()).or_default();
        let existing = rows
            .iter_mut()
            .find(|d| identity_of(d) == Some(id))
            .ok_or_else(|| not_found(model, id))?;

        let version = existing.get("__v").and_then(Value::as_i64).unwrap_or(0);
        document.insert(IDENTITY_FIELD.to_string(), Value::String(id.to_string()));
        document.insert("__v".to_string(), Value::from(version + 1));
        *existing = document.clone();
        Ok(document)
    }

    async fn delete_model(&self, model: &str, id: &str) -> Result<(), ApiError> {
        let mut state = self.record(
            Call::Delete(model.to_string(), id.to_string()),
            FailPoint::Delete,
        )?;
        let rows = state.data.entry(model.to_string()).or_default();
        let before = rows.len();
        rows.retain(|d| identity_of(d) != Some(id));
        if rows.len() == before {
            return Err(not_found(model, id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_assigns_identity_and_version() {
        let backend = MemoryBackend::new(fixtures::sample_schemas());
        let created = backend
            .create_model("users", fixtures::doc(json!({"name": "Ada"})))
            .await
            .unwrap();

        assert_eq!(identity_of(&created).map(str::len), Some(24));
        assert_eq!(created["__v"], json!(0));
        assert_eq!(backend.documents("users").len(), 1);
    }

    #[tokio::test]
    async fn test_failures_fire_once() {
        let backend = MemoryBackend::new(fixtures::sample_schemas());
        backend.fail_next(FailPoint::Data("users".to_string()), "boom");

        let err = backend.get_model_data("users").await.unwrap_err();
        assert_eq!(err.message, "boom");
        assert!(backend.get_model_data("users").await.is_ok());
        assert_eq!(backend.fetch_count("users"), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_ids() {
        let backend = MemoryBackend::new(fixtures::sample_schemas());
        let err = backend
            .update_model("users", "nope", Document::new())
            .await
            .unwrap_err();
        assert_eq!(err.status, Some(404));
        assert!(backend.delete_model("users", "nope").await.is_err());
    }
}
