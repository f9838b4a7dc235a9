use async_trait::async_trait;
use mess_types::{AppInfo, Document, Schema};
use std::fmt;

/// Structured transport failure with a message fit for a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status when the server answered at all
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (HTTP {})", self.message, status),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ApiError {}

/// Backend capability the session layer drives
///
/// Records cross this boundary in transport form; coercion to in-memory
/// values happens in the session layer.
#[async_trait]
pub trait DataAccess: Send + Sync {
    /// All model schemas, in the backend's order
    async fn get_schemas(&self) -> Result<Vec<Schema>, ApiError>;

    async fn get_model_data(&self, model: &str) -> Result<Vec<Document>, ApiError>;

    async fn create_model(&self, model: &str, document: Document) -> Result<Document, ApiError>;

    async fn update_model(
        &self,
        model: &str,
        id: &str,
        document: Document,
    ) -> Result<Document, ApiError>;

    async fn delete_model(&self, model: &str, id: &str) -> Result<(), ApiError>;

    /// Presentation settings; backends without a config endpoint use defaults.
    async fn get_app_info(&self) -> Result<AppInfo, ApiError> {
        Ok(AppInfo::default())
    }
}
