use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "MESS - mongoose express scaffold";

/// Presentation settings served by the backend's `config` endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    #[serde(default)]
    pub title: Option<String>,
}

impl AppInfo {
    pub fn title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(DEFAULT_TITLE)
    }
}
