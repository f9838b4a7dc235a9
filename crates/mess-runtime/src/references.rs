use crate::api::DataAccess;
use crate::{Error, Result};
use mess_types::Record;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, instrument};

/// Candidate records for reference fields, keyed by model name
///
/// Owned by one edit session and dropped with it. Loads for different
/// models may run concurrently; for the same model the first stored
/// result wins and a racing duplicate fetch is simply discarded.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    entries: Mutex<HashMap<String, Arc<Vec<Record>>>>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self, model: &str) -> Option<Arc<Vec<Record>>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(model)
            .cloned()
    }

    /// Candidates for `model`, fetched on first use.
    #[instrument(skip(self, access))]
    pub async fn load_candidates(
        &self,
        access: &dyn DataAccess,
        model: &str,
    ) -> Result<Arc<Vec<Record>>> {
        if let Some(hit) = self.cached(model) {
            debug!(count = hit.len(), "reference candidates served from cache");
            return Ok(hit);
        }

        let documents =
            access
                .get_model_data(model)
                .await
                .map_err(|source| Error::ReferenceLoad {
                    model: model.to_string(),
                    source,
                })?;
        let records: Vec<Record> = documents.into_iter().map(Record::from_document).collect();
        debug!(count = records.len(), "reference candidates fetched");

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let stored = entries
            .entry(model.to_string())
            .or_insert_with(|| Arc::new(records));
        Ok(Arc::clone(stored))
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
