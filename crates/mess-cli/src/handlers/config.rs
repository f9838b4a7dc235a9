use crate::presenters::Presenter;
use crate::types::OutputFormat;
use anyhow::Result;
use mess_runtime::Config;
use serde_json::json;
use std::path::Path;

pub fn show(path: &Path, config: &Config, presenter: &Presenter) -> Result<()> {
    if presenter.format() == OutputFormat::Json {
        return presenter.json(&json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        }));
    }

    let origin = if path.exists() { "" } else { " (not found, defaults)" };
    println!("config:   {}{}", path.display(), origin);
    println!("base_url: {}", config.base_url);
    println!("timeout:  {}s", config.timeout_secs);
    if let Some(title) = &config.title {
        println!("title:    {}", title);
    }
    Ok(())
}

pub fn save(path: &Path, config: &Config, presenter: &Presenter) -> Result<()> {
    config.save_to(path)?;
    presenter.message(&format!("Saved config to {}", path.display()))
}
