use crate::console::{PresetEditor, PromptConfirm, StderrNotifier};
use crate::handlers::catalog::load_schema;
use crate::presenters::Presenter;
use anyhow::{Result, anyhow, bail};
use mess_engine::{index_by_identity, reference_options};
use mess_runtime::{DataAccess, EditOutcome, EditSession, EditorAction, Error, ModelSession};
use mess_types::Record;
use std::sync::Arc;

async fn open_model(access: Arc<dyn DataAccess>, model: &str) -> Result<ModelSession> {
    let mut session = ModelSession::new(access);
    session.load_schemas().await?;
    session.select_model(model).await?;
    Ok(session)
}

/// Copy of the grid row whose identity is `id`
fn find_row(session: &ModelSession, model: &str, id: &str) -> Result<Record> {
    index_by_identity(session.rows())
        .get(id)
        .map(|row| (*row).clone())
        .ok_or_else(|| anyhow!("No {} with id {}", model, id))
}

pub async fn list(access: Arc<dyn DataAccess>, model: &str, presenter: &Presenter) -> Result<()> {
    let session = open_model(access, model).await?;
    presenter.rows(session.columns(), session.rows())
}

pub async fn options(
    access: Arc<dyn DataAccess>,
    model: &str,
    field: &str,
    presenter: &Presenter,
) -> Result<()> {
    let schema = load_schema(access.as_ref(), model).await?;
    let edit = EditSession::create(access, schema);
    let candidates = edit.load_field_candidates(field).await?;
    presenter.options(&reference_options(&candidates))
}

/// Drive the open edit session with preset input and report the outcome.
async fn run_preset(
    session: &mut ModelSession,
    editor: &PresetEditor,
    confirm: &PromptConfirm,
) -> Result<Option<EditOutcome>> {
    let notifier = StderrNotifier::new();

    match session.run_editor(editor, confirm, &notifier).await {
        Ok(EditOutcome::Cancelled) => {
            if let Some(rejection) = editor.rejection() {
                bail!("{}", rejection);
            }
            if notifier.has_notified() {
                bail!("Nothing was written");
            }
            Ok(Some(EditOutcome::Cancelled))
        }
        Ok(outcome) => Ok(Some(outcome)),
        // the write landed; only the refresh afterwards failed
        Err(err @ Error::DataLoad { .. }) => {
            eprintln!("warning: {}", err);
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn create(
    access: Arc<dyn DataAccess>,
    model: &str,
    assignments: Vec<(String, String)>,
    presenter: &Presenter,
) -> Result<()> {
    let mut session = open_model(access, model).await?;
    session.begin_create()?;

    let editor = PresetEditor::new(assignments, EditorAction::Save);
    match run_preset(&mut session, &editor, &PromptConfirm::new(false)).await? {
        Some(EditOutcome::Saved(record)) => presenter.record("Created", model, &record),
        _ => presenter.message(&format!("Created {} record", model)),
    }
}

pub async fn update(
    access: Arc<dyn DataAccess>,
    model: &str,
    id: &str,
    assignments: Vec<(String, String)>,
    presenter: &Presenter,
) -> Result<()> {
    let mut session = open_model(access, model).await?;
    let row = find_row(&session, model, id)?;
    session.begin_edit(&row)?;

    let editor = PresetEditor::new(assignments, EditorAction::Save);
    match run_preset(&mut session, &editor, &PromptConfirm::new(false)).await? {
        Some(EditOutcome::Saved(record)) => presenter.record("Updated", model, &record),
        _ => presenter.message(&format!("Updated {} {}", model, id)),
    }
}

pub async fn delete(
    access: Arc<dyn DataAccess>,
    model: &str,
    id: &str,
    assume_yes: bool,
    presenter: &Presenter,
) -> Result<()> {
    let mut session = open_model(access, model).await?;
    let row = find_row(&session, model, id)?;
    session.begin_edit(&row)?;

    let editor = PresetEditor::new(Vec::new(), EditorAction::Delete);
    match run_preset(&mut session, &editor, &PromptConfirm::new(assume_yes)).await? {
        Some(EditOutcome::Cancelled) => presenter.message("Removal cancelled"),
        _ => presenter.message(&format!("Removed {} {}", model, id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mess_testing::{MemoryBackend, fixtures};

    async fn users() -> ModelSession {
        let backend = MemoryBackend::new(fixtures::sample_schemas())
            .with_documents("users", fixtures::sample_users());
        open_model(Arc::new(backend), "users").await.unwrap()
    }

    #[tokio::test]
    async fn test_find_row_by_identity() {
        let session = users().await;

        let grace = find_row(&session, "users", "000000000000000000000b0b").unwrap();
        assert_eq!(grace.get("name").and_then(|v| v.as_str()), Some("Grace"));

        let err = find_row(&session, "users", "ffffffffffffffffffffffff").unwrap_err();
        assert_eq!(err.to_string(), "No users with id ffffffffffffffffffffffff");
    }
}
