use crate::api::DataAccess;
use crate::{Error, Result};
use mess_types::Schema;
use std::sync::Arc;
use tracing::{info, instrument};

/// The set of model schemas, fetched once and read-only afterwards
///
/// Cloning is cheap and clones share the same schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    schemas: Option<Arc<[Arc<Schema>]>>,
}

impl SchemaCatalog {
    /// A catalog that has not been loaded yet
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_schemas(schemas: Vec<Schema>) -> Self {
        let schemas: Vec<Arc<Schema>> = schemas.into_iter().map(Arc::new).collect();
        Self {
            schemas: Some(schemas.into()),
        }
    }

    #[instrument(skip(access))]
    pub async fn load(access: &dyn DataAccess) -> Result<Self> {
        let schemas = access.get_schemas().await.map_err(Error::SchemaLoad)?;
        info!(models = schemas.len(), "schema catalog loaded");
        Ok(Self::from_schemas(schemas))
    }

    pub fn is_loaded(&self) -> bool {
        self.schemas.is_some()
    }

    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.iter().find(|s| s.name() == name).cloned()
    }

    pub fn model_names(&self) -> Vec<&str> {
        self.iter().map(|s| s.name()).collect()
    }

    pub fn first(&self) -> Option<Arc<Schema>> {
        self.iter().next().cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Schema>> {
        self.schemas.iter().flat_map(|schemas| schemas.iter())
    }

    pub fn len(&self) -> usize {
        self.schemas.as_ref().map_or(0, |s| s.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
