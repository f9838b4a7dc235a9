use crate::presenters::Presenter;
use crate::types::OutputFormat;
use anyhow::{Context, Result, bail};
use mess_engine::{project_columns, project_fields};
use mess_types::decode_schemas;
use serde_json::json;
use std::path::Path;

/// Project a schema file offline: the model list, or one model's columns
/// and fields.
pub fn handle(
    path: &Path,
    model: Option<&str>,
    show_hidden: bool,
    presenter: &Presenter,
) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file: {}", path.display()))?;
    let schemas = decode_schemas(&content)
        .with_context(|| format!("Failed to decode schema file: {}", path.display()))?;

    let Some(model) = model else {
        let names: Vec<&str> = schemas.iter().map(|s| s.name()).collect();
        return presenter.info(&path.display().to_string(), &names);
    };

    let Some(schema) = schemas.iter().find(|s| s.name() == model) else {
        bail!("Unknown model: {}", model);
    };

    let columns = project_columns(schema);
    let fields = project_fields(schema, show_hidden);

    if presenter.format() == OutputFormat::Json {
        return presenter.json(&json!({
            "model": schema.name(),
            "columns": columns,
            "fields": fields,
        }));
    }

    presenter.message(&format!("Columns of {}", schema.name()))?;
    presenter.columns(&columns)?;
    println!();
    presenter.message(&format!("Fields of {}", schema.name()))?;
    presenter.fields(&fields)
}
