use async_trait::async_trait;
use mess_runtime::{
    ApiError, CONFIRM_DELETE_BODY, CONFIRM_DELETE_TITLE, DataAccess, DeleteOutcome, EditOutcome,
    EditorAction, Error, ModelSession, SessionState, WriteOp,
};
use mess_testing::{
    Call, EditorStep, FailPoint, MemoryBackend, RecordingNotifier, ScriptedConfirm,
    ScriptedEditor, fixtures,
};
use mess_types::{Document, FieldValue, Schema};
use serde_json::json;
use std::sync::Arc;

fn backend() -> Arc<MemoryBackend> {
    Arc::new(
        MemoryBackend::new(fixtures::sample_schemas())
            .with_documents("users", fixtures::sample_users()),
    )
}

/// Reads go to the memory backend; writes never complete.
struct StalledWrites(Arc<MemoryBackend>);

#[async_trait]
impl DataAccess for StalledWrites {
    async fn get_schemas(&self) -> Result<Vec<Schema>, ApiError> {
        self.0.get_schemas().await
    }

    async fn get_model_data(&self, model: &str) -> Result<Vec<Document>, ApiError> {
        self.0.get_model_data(model).await
    }

    async fn create_model(&self, _: &str, _: Document) -> Result<Document, ApiError> {
        futures::future::pending().await
    }

    async fn update_model(&self, _: &str, _: &str, _: Document) -> Result<Document, ApiError> {
        futures::future::pending().await
    }

    async fn delete_model(&self, _: &str, _: &str) -> Result<(), ApiError> {
        futures::future::pending().await
    }
}

async fn session_on_users(backend: &Arc<MemoryBackend>) -> ModelSession {
    let mut session = ModelSession::new(backend.clone());
    session.bootstrap().await.expect("bootstrap should succeed");
    assert_eq!(session.selected_model(), Some("users"));
    session
}

#[tokio::test]
async fn test_new_session_is_idle() {
    let session = ModelSession::new(backend());
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.selected_model().is_none());
    assert!(session.rows().is_empty());
}

#[tokio::test]
async fn test_bootstrap_selects_first_model_and_loads_rows() {
    let backend = backend();
    let session = session_on_users(&backend).await;

    assert_eq!(session.state(), SessionState::ModelSelected);
    assert_eq!(session.rows().len(), 2);
    assert_eq!(session.columns().len(), fixtures::users_schema().len());
    assert!(session.rows()[0].get("dob").and_then(FieldValue::as_date).is_some());
    assert_eq!(
        backend.calls(),
        vec![Call::GetSchemas, Call::GetModelData("users".to_string())]
    );
}

#[tokio::test]
async fn test_bootstrap_with_no_models_stays_idle() {
    let backend = Arc::new(MemoryBackend::new(Vec::new()));
    let mut session = ModelSession::new(backend.clone());

    session.bootstrap().await.unwrap();

    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.catalog().is_loaded());
}

#[tokio::test]
async fn test_schema_load_failure_is_fatal() {
    let backend = backend();
    backend.fail_next(FailPoint::Schemas, "database offline");
    let mut session = ModelSession::new(backend.clone());

    let err = session.bootstrap().await.unwrap_err();

    assert!(matches!(err, Error::SchemaLoad(ref api) if api.message == "database offline"));
    assert_eq!(session.state(), SessionState::Idle);
    assert!(!session.catalog().is_loaded());
}

#[tokio::test]
async fn test_select_before_schemas_load_is_noop() {
    let backend = backend();
    let mut session = ModelSession::new(backend.clone());

    session.select_model("users").await.unwrap();

    assert_eq!(session.state(), SessionState::Idle);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_selecting_same_model_twice_reloads_twice() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;

    session.select_model("users").await.unwrap();

    assert_eq!(backend.fetch_count("users"), 2);
}

#[tokio::test]
async fn test_select_unknown_model_changes_nothing() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;

    let err = session.select_model("invoices").await.unwrap_err();

    assert!(matches!(err, Error::UnknownModel(ref name) if name == "invoices"));
    assert_eq!(session.selected_model(), Some("users"));
    assert_eq!(session.rows().len(), 2);
}

#[tokio::test]
async fn test_switching_models_recomputes_columns() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;

    session.select_model("people").await.unwrap();

    let columns: Vec<(&str, bool)> = session
        .columns()
        .iter()
        .map(|c| (c.name.as_str(), c.visible))
        .collect();
    assert_eq!(columns, vec![("name", true), ("dob", true), ("__v", false)]);
    assert!(session.rows().is_empty());
}

#[tokio::test]
async fn test_data_load_failure_keeps_previous_rows() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;
    backend.fail_next(FailPoint::Data("users".to_string()), "timeout");

    let err = session.reload().await.unwrap_err();

    assert!(matches!(err, Error::DataLoad { ref model, .. } if model == "users"));
    assert_eq!(session.rows().len(), 2);
    assert_eq!(session.state(), SessionState::ModelSelected);
}

#[tokio::test]
async fn test_select_model_discards_open_edit_session() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;
    session.begin_create().unwrap();

    session.select_model("orders").await.unwrap();

    assert!(session.edit_session().is_none());
    assert_eq!(session.state(), SessionState::ModelSelected);
}

#[tokio::test]
async fn test_create_then_cancel_leaves_data_unchanged() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;
    let rows_before = session.rows().to_vec();

    let edit = session.begin_create().unwrap();
    assert!(edit.is_new());
    assert!(edit.record().is_empty());
    edit.set_input("name", "Linus").unwrap();
    assert_eq!(session.state(), SessionState::Creating);

    assert_eq!(session.cancel().unwrap(), EditOutcome::Cancelled);

    assert_eq!(session.state(), SessionState::ModelSelected);
    assert_eq!(session.rows(), rows_before.as_slice());
    assert_eq!(backend.documents("users").len(), 2);
    assert_eq!(backend.write_count(), 0);
}

#[tokio::test]
async fn test_edit_then_cancel_leaves_row_untouched() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;
    let original = session.rows()[0].clone();

    let edit = session.begin_edit_row(0).unwrap();
    assert!(!edit.is_new());
    edit.set_input("name", "Countess").unwrap();
    edit.set_value("admin", false);
    edit.record_mut().remove("dob");
    assert_eq!(session.state(), SessionState::Editing);

    session.cancel().unwrap();

    assert_eq!(session.rows()[0], original);
}

#[tokio::test]
async fn test_begin_edit_without_identity_creates_on_save() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;
    let draft = mess_types::Record::new().with("name", "Draft");

    let edit = session.begin_edit(&draft).unwrap();
    assert!(edit.is_new());
    session.save().await.unwrap();

    assert_eq!(backend.calls().last(), Some(&Call::GetModelData("users".to_string())));
    assert!(backend.calls().contains(&Call::Create("users".to_string())));
}

#[tokio::test]
async fn test_create_save_writes_then_reloads() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;

    let edit = session.begin_create().unwrap();
    edit.set_input("name", "Linus").unwrap();
    edit.set_input("dob", "1969-12-28").unwrap();
    let saved = session.save().await.unwrap();

    assert!(saved.identity().is_some());
    assert!(saved.get("dob").and_then(FieldValue::as_date).is_some());
    assert_eq!(session.state(), SessionState::ModelSelected);
    assert!(session.edit_session().is_none());
    assert_eq!(session.rows().len(), 3);

    let stored = backend.documents("users");
    assert_eq!(stored[2]["dob"], json!("1969-12-28T00:00:00.000Z"));

    let calls = backend.calls();
    let tail = &calls[calls.len() - 2..];
    assert_eq!(
        tail,
        &[
            Call::Create("users".to_string()),
            Call::GetModelData("users".to_string())
        ]
    );
}

#[tokio::test]
async fn test_update_save_targets_identity() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;

    let edit = session.begin_edit_row(1).unwrap();
    edit.set_input("admin", "true").unwrap();
    session.save().await.unwrap();

    assert!(backend.calls().contains(&Call::Update(
        "users".to_string(),
        "000000000000000000000b0b".to_string()
    )));
    let grace = &backend.documents("users")[1];
    assert_eq!(grace["admin"], json!(true));
    assert_eq!(grace["__v"], json!(4));
    assert_eq!(session.rows()[1].get("admin"), Some(&FieldValue::from(true)));
}

#[tokio::test]
async fn test_failed_save_keeps_session_open_for_retry() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;
    backend.fail_next(FailPoint::Create, "name is required");

    session.begin_create().unwrap();
    let err = session.save().await.unwrap_err();

    assert!(matches!(
        err,
        Error::Write { op: WriteOp::Create, ref source, .. } if source.message == "name is required"
    ));
    assert_eq!(session.state(), SessionState::Creating);
    assert!(session.edit_session().is_some());
    assert_eq!(backend.fetch_count("users"), 1);

    session
        .edit_session_mut()
        .unwrap()
        .set_input("name", "Retry")
        .unwrap();
    session.save().await.unwrap();
    assert_eq!(backend.documents("users").len(), 3);
}

#[tokio::test]
async fn test_save_without_identity_never_creates_a_duplicate() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;

    let edit = session.begin_edit_row(0).unwrap();
    assert!(!edit.is_new());
    edit.toggle_show_hidden_fields();
    edit.set_input("_id", "").unwrap();
    assert_eq!(edit.identity(), None);

    let err = session.save().await.unwrap_err();

    assert!(matches!(err, Error::MissingIdentity));
    assert!(err.keeps_session_open());
    assert_eq!(session.state(), SessionState::Editing);
    assert!(session.edit_session().is_some());
    assert_eq!(backend.write_count(), 0);
    assert_eq!(backend.documents("users").len(), 2);
}

#[tokio::test]
async fn test_save_with_changed_identity_updates_that_identity() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;

    let edit = session.begin_edit_row(0).unwrap();
    edit.set_value("_id", "000000000000000000000b0b");
    edit.set_input("name", "Overwritten").unwrap();
    session.save().await.unwrap();

    assert!(!backend.calls().iter().any(|c| matches!(c, Call::Create(_))));
    assert_eq!(backend.documents("users").len(), 2);
    assert_eq!(backend.documents("users")[1]["name"], json!("Overwritten"));
}

#[tokio::test]
async fn test_abandoned_save_puts_state_back() {
    let backend = backend();
    let mut session = ModelSession::new(Arc::new(StalledWrites(backend.clone())));
    session.bootstrap().await.unwrap();
    session.begin_edit_row(0).unwrap();

    {
        let save = session.save();
        futures::pin_mut!(save);
        assert!(futures::poll!(save.as_mut()).is_pending());
    }

    assert_eq!(session.state(), SessionState::Editing);
    assert!(session.edit_session().is_some());
}

#[tokio::test]
async fn test_abandoned_delete_puts_state_back() {
    let backend = backend();
    let mut session = ModelSession::new(Arc::new(StalledWrites(backend.clone())));
    session.bootstrap().await.unwrap();
    session.begin_edit_row(1).unwrap();
    let confirm = ScriptedConfirm::yes();

    {
        let delete = session.delete(&confirm);
        futures::pin_mut!(delete);
        assert!(futures::poll!(delete.as_mut()).is_pending());
    }

    assert_eq!(session.state(), SessionState::Editing);
    assert_eq!(confirm.asked().len(), 1);
    assert_eq!(session.rows().len(), 2);
}

#[tokio::test]
async fn test_delete_declined_returns_to_editing_intact() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;
    let confirm = ScriptedConfirm::no();

    session.begin_edit_row(0).unwrap().set_input("name", "Changed").unwrap();
    let before = session.edit_session().unwrap().record().clone();

    let outcome = session.delete(&confirm).await.unwrap();

    assert_eq!(outcome, DeleteOutcome::Declined);
    assert_eq!(session.state(), SessionState::Editing);
    assert_eq!(session.edit_session().unwrap().record(), &before);
    assert_eq!(backend.write_count(), 0);
    assert_eq!(
        confirm.asked(),
        vec![(CONFIRM_DELETE_TITLE.to_string(), CONFIRM_DELETE_BODY.to_string())]
    );
}

#[tokio::test]
async fn test_delete_confirmed_removes_and_reloads() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;

    session.begin_edit_row(0).unwrap();
    let outcome = session.delete(&ScriptedConfirm::yes()).await.unwrap();

    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert_eq!(session.state(), SessionState::ModelSelected);
    assert_eq!(session.rows().len(), 1);
    assert_eq!(
        session.rows()[0].identity().as_deref(),
        Some("000000000000000000000b0b")
    );

    let calls = backend.calls();
    assert_eq!(
        &calls[calls.len() - 2..],
        &[
            Call::Delete("users".to_string(), "000000000000000000000a0a".to_string()),
            Call::GetModelData("users".to_string())
        ]
    );
}

#[tokio::test]
async fn test_delete_not_allowed_while_creating() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;
    let confirm = ScriptedConfirm::yes();
    session.begin_create().unwrap();

    let err = session.delete(&confirm).await.unwrap_err();

    assert!(matches!(
        err,
        Error::InvalidState { op: "delete", state: SessionState::Creating }
    ));
    assert!(confirm.asked().is_empty());
    assert_eq!(session.state(), SessionState::Creating);
}

#[tokio::test]
async fn test_failed_delete_keeps_session_open() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;
    backend.fail_next(FailPoint::Delete, "locked");

    session.begin_edit_row(0).unwrap();
    let err = session.delete(&ScriptedConfirm::yes()).await.unwrap_err();

    assert!(matches!(err, Error::Write { op: WriteOp::Delete, .. }));
    assert_eq!(session.state(), SessionState::Editing);
    assert_eq!(backend.documents("users").len(), 2);
}

#[tokio::test]
async fn test_operations_rejected_in_wrong_state() {
    let backend = backend();
    let mut session = ModelSession::new(backend.clone());

    assert!(matches!(
        session.begin_create().unwrap_err(),
        Error::InvalidState { op: "create", state: SessionState::Idle }
    ));
    assert!(matches!(
        session.save().await.unwrap_err(),
        Error::InvalidState { op: "save", .. }
    ));
    assert!(matches!(session.cancel().unwrap_err(), Error::InvalidState { .. }));

    let mut session = session_on_users(&backend).await;
    session.begin_create().unwrap();
    assert!(matches!(
        session.begin_edit_row(0).unwrap_err(),
        Error::InvalidState { op: "edit", state: SessionState::Creating }
    ));
    session.cancel().unwrap();
    assert!(matches!(session.begin_edit_row(9).unwrap_err(), Error::NoSuchRow(9)));
}

#[tokio::test]
async fn test_run_editor_save_flow() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;
    let editor = ScriptedEditor::new([EditorStep::action(EditorAction::Save)
        .input("name", "Linus")
        .input("admin", "no")]);
    let notifier = RecordingNotifier::new();

    session.begin_create().unwrap();
    let outcome = session
        .run_editor(&editor, &ScriptedConfirm::no(), &notifier)
        .await
        .unwrap();

    let EditOutcome::Saved(record) = outcome else {
        panic!("expected a saved record, got {:?}", outcome);
    };
    assert_eq!(record.get("name"), Some(&FieldValue::from("Linus")));
    assert_eq!(editor.times_opened(), 1);
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn test_run_editor_notifies_and_reopens_after_write_failure() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;
    backend.fail_next(FailPoint::Update, "version conflict");
    let editor = ScriptedEditor::new([
        EditorStep::action(EditorAction::Save).input("name", "First try"),
        EditorStep::action(EditorAction::Save),
    ]);
    let notifier = RecordingNotifier::new();

    session.begin_edit_row(0).unwrap();
    let outcome = session
        .run_editor(&editor, &ScriptedConfirm::no(), &notifier)
        .await
        .unwrap();

    assert!(matches!(outcome, EditOutcome::Saved(_)));
    assert_eq!(editor.times_opened(), 2);
    assert_eq!(notifier.messages(), vec!["version conflict".to_string()]);
    assert_eq!(backend.documents("users")[0]["name"], json!("First try"));
}

#[tokio::test]
async fn test_run_editor_declined_delete_reopens_then_cancel() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;
    let editor = ScriptedEditor::new([
        EditorStep::action(EditorAction::Delete),
        EditorStep::action(EditorAction::Cancel),
    ]);
    let confirm = ScriptedConfirm::no();

    session.begin_edit_row(1).unwrap();
    let outcome = session
        .run_editor(&editor, &confirm, &RecordingNotifier::new())
        .await
        .unwrap();

    assert_eq!(outcome, EditOutcome::Cancelled);
    assert_eq!(editor.times_opened(), 2);
    assert_eq!(confirm.asked().len(), 1);
    assert_eq!(backend.documents("users").len(), 2);
}

#[tokio::test]
async fn test_run_editor_delete_confirmed() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;
    let editor = ScriptedEditor::new([EditorStep::action(EditorAction::Delete)]);

    session.begin_edit_row(1).unwrap();
    let outcome = session
        .run_editor(&editor, &ScriptedConfirm::yes(), &RecordingNotifier::new())
        .await
        .unwrap();

    assert_eq!(outcome, EditOutcome::Deleted);
    assert_eq!(session.rows().len(), 1);
}

#[tokio::test]
async fn test_run_editor_rejects_bad_input_without_writing_it() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;
    let editor = ScriptedEditor::new([EditorStep::action(EditorAction::Save)
        .input("dob", "someday")
        .input("name", "Valid")]);

    session.begin_create().unwrap();
    session
        .run_editor(&editor, &ScriptedConfirm::no(), &RecordingNotifier::new())
        .await
        .unwrap();

    assert_eq!(editor.rejected().len(), 1);
    let created = &backend.documents("users")[2];
    assert!(created.get("dob").is_none());
    assert_eq!(created["name"], json!("Valid"));
}

#[tokio::test]
async fn test_run_editor_requires_open_session() {
    let backend = backend();
    let mut session = session_on_users(&backend).await;
    let editor = ScriptedEditor::new([]);

    let err = session
        .run_editor(&editor, &ScriptedConfirm::no(), &RecordingNotifier::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidState { .. }));
    assert_eq!(editor.times_opened(), 0);
}
