use crate::api::{ApiError, DataAccess};
use crate::config::Config;
use crate::{Error, Result};
use async_trait::async_trait;
use mess_types::{AppInfo, Document, Schema, schemas_from_value};
use reqwest::{RequestBuilder, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Data access over the scaffold's REST endpoints
///
/// `GET config`, `GET api/schemas`, `GET|POST api/{model}` and
/// `PUT|DELETE api/{model}/{id}`, all relative to the base URL.
#[derive(Debug, Clone)]
pub struct HttpDataAccess {
    base_url: Url,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl HttpDataAccess {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid base url '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "base url '{}' cannot carry paths",
                base_url
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build http client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve path segments against the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> std::result::Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::new(format!("base url '{}' cannot carry paths", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> std::result::Result<Response, ApiError> {
        let response = request.send().await.map_err(transport_error)?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let error = ApiError::with_status(status, message_from_body(status, &body));
        warn!(status, message = %error.message, "request failed");
        Err(error)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<T, ApiError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::new(format!("unexpected response body: {}", e)))
    }
}

/// Pull the backend's `message` out of an error body, falling back to the
/// status line when the body carries none.
pub fn message_from_body(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            let reason = reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason());
            match reason {
                Some(reason) => format!("{} {}", status, reason),
                None => format!("HTTP {}", status),
            }
        })
}

fn transport_error(err: reqwest::Error) -> ApiError {
    ApiError {
        status: err.status().map(|s| s.as_u16()),
        message: err.to_string(),
    }
}

#[async_trait]
impl DataAccess for HttpDataAccess {
    #[instrument(skip(self))]
    async fn get_schemas(&self) -> std::result::Result<Vec<Schema>, ApiError> {
        let url = self.endpoint(&["api", "schemas"])?;
        let payload: Value = self.send_json(self.client.get(url)).await?;
        let schemas = schemas_from_value(payload)
            .map_err(|e| ApiError::new(format!("malformed schema payload: {}", e)))?;
        debug!(count = schemas.len(), "schemas fetched");
        Ok(schemas)
    }

    #[instrument(skip(self))]
    async fn get_model_data(&self, model: &str) -> std::result::Result<Vec<Document>, ApiError> {
        let url = self.endpoint(&["api", model])?;
        let documents: Vec<Document> = self.send_json(self.client.get(url)).await?;
        debug!(count = documents.len(), "records fetched");
        Ok(documents)
    }

    #[instrument(skip(self, document))]
    async fn create_model(
        &self,
        model: &str,
        document: Document,
    ) -> std::result::Result<Document, ApiError> {
        let url = self.endpoint(&["api", model])?;
        self.send_json(self.client.post(url).json(&document)).await
    }

    #[instrument(skip(self, document))]
    async fn update_model(
        &self,
        model: &str,
        id: &str,
        document: Document,
    ) -> std::result::Result<Document, ApiError> {
        let url = self.endpoint(&["api", model, id])?;
        self.send_json(self.client.put(url).json(&document)).await
    }

    #[instrument(skip(self))]
    async fn delete_model(&self, model: &str, id: &str) -> std::result::Result<(), ApiError> {
        let url = self.endpoint(&["api", model, id])?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_app_info(&self) -> std::result::Result<AppInfo, ApiError> {
        let url = self.endpoint(&["config"])?;
        self.send_json(self.client.get(url)).await
    }
}
