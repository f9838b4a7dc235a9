use crate::presenters::Presenter;
use anyhow::Result;
use mess_engine::{project_columns, project_fields};
use mess_runtime::{Config, DataAccess, Error, SchemaCatalog};
use mess_types::Schema;
use std::sync::Arc;
use tracing::warn;

pub(crate) async fn load_schema(access: &dyn DataAccess, model: &str) -> Result<Arc<Schema>> {
    let catalog = SchemaCatalog::load(access).await?;
    let schema = catalog
        .get(model)
        .ok_or_else(|| Error::UnknownModel(model.to_string()))?;
    Ok(schema)
}

pub async fn info(access: &dyn DataAccess, config: &Config, presenter: &Presenter) -> Result<()> {
    let catalog = SchemaCatalog::load(access).await?;

    let title = match &config.title {
        Some(title) => title.clone(),
        None => match access.get_app_info().await {
            Ok(info) => info.title().to_string(),
            Err(err) => {
                warn!(message = %err, "app config unavailable, using default title");
                mess_types::DEFAULT_TITLE.to_string()
            }
        },
    };

    presenter.info(&title, &catalog.model_names())
}

pub async fn columns(access: &dyn DataAccess, model: &str, presenter: &Presenter) -> Result<()> {
    let schema = load_schema(access, model).await?;
    presenter.columns(&project_columns(&schema))
}

pub async fn fields(
    access: &dyn DataAccess,
    model: &str,
    show_hidden: bool,
    presenter: &Presenter,
) -> Result<()> {
    let schema = load_schema(access, model).await?;
    presenter.fields(&project_fields(&schema, show_hidden))
}
