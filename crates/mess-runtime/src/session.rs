use crate::api::DataAccess;
use crate::catalog::SchemaCatalog;
use crate::edit::EditSession;
use crate::surface::{
    CONFIRM_DELETE_BODY, CONFIRM_DELETE_TITLE, Confirm, Editor, EditorAction, Notifier,
};
use crate::{Error, Result, WriteOp};
use mess_engine::{ColumnSpec, project_columns, to_display, to_display_all};
use mess_types::{Record, Schema};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Where the session is in the select → edit → write → reload loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    ModelSelected,
    Creating,
    Editing,
    /// A create or update is in flight
    Saving,
    /// A delete is in flight
    Deleting,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::ModelSelected => write!(f, "model-selected"),
            SessionState::Creating => write!(f, "creating"),
            SessionState::Editing => write!(f, "editing"),
            SessionState::Saving => write!(f, "saving"),
            SessionState::Deleting => write!(f, "deleting"),
        }
    }
}

/// How an editor interaction ended
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// Written; carries the record the backend returned
    Saved(Record),
    Cancelled,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Confirmation declined; the edit session is untouched
    Declined,
}

/// One long-lived admin session: selected model, its grid, and at most one
/// open edit session.
///
/// Every operation takes `&mut self`, so a write always resolves before the
/// reload it triggers, and a reload can never interleave with another.
pub struct ModelSession {
    access: Arc<dyn DataAccess>,
    catalog: SchemaCatalog,
    state: SessionState,
    selected: Option<Arc<Schema>>,
    columns: Vec<ColumnSpec>,
    rows: Vec<Record>,
    edit: Option<EditSession>,
}

impl ModelSession {
    pub fn new(access: Arc<dyn DataAccess>) -> Self {
        Self {
            access,
            catalog: SchemaCatalog::empty(),
            state: SessionState::Idle,
            selected: None,
            columns: Vec::new(),
            rows: Vec::new(),
            edit: None,
        }
    }

    /// Start from an already loaded catalog.
    pub fn with_catalog(access: Arc<dyn DataAccess>, catalog: SchemaCatalog) -> Self {
        Self {
            catalog,
            ..Self::new(access)
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    pub fn selected_schema(&self) -> Option<&Arc<Schema>> {
        self.selected.as_ref()
    }

    pub fn selected_model(&self) -> Option<&str> {
        self.selected.as_deref().map(Schema::name)
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    pub fn edit_session_mut(&mut self) -> Option<&mut EditSession> {
        self.edit.as_mut()
    }

    /// Fetch the schema catalog; fatal for the session when it fails.
    pub async fn load_schemas(&mut self) -> Result<()> {
        self.catalog = SchemaCatalog::load(self.access.as_ref()).await?;
        Ok(())
    }

    /// Load the catalog and select its first model.
    #[instrument(skip(self))]
    pub async fn bootstrap(&mut self) -> Result<()> {
        self.load_schemas().await?;

        match self.catalog.first() {
            Some(first) => self.select_model(first.name()).await,
            None => {
                warn!("backend reported no models");
                Ok(())
            }
        }
    }

    /// Select a model and reload its data. Valid from any state; an open
    /// edit session is discarded. Reselecting the current model reloads too.
    #[instrument(skip(self))]
    pub async fn select_model(&mut self, name: &str) -> Result<()> {
        if !self.catalog.is_loaded() {
            debug!("schemas not loaded yet, ignoring selection");
            return Ok(());
        }

        let schema = self
            .catalog
            .get(name)
            .ok_or_else(|| Error::UnknownModel(name.to_string()))?;

        if self.selected_model() != Some(name) {
            self.rows.clear();
        }
        self.edit = None;
        self.columns = project_columns(&schema);
        self.selected = Some(schema);
        self.state = SessionState::ModelSelected;

        self.reload().await
    }

    /// Refetch the selected model's rows. On failure the grid keeps its
    /// previous rows.
    #[instrument(skip(self))]
    pub async fn reload(&mut self) -> Result<()> {
        let schema = self.selected.clone().ok_or(Error::InvalidState {
            op: "reload",
            state: self.state,
        })?;

        let documents = self
            .access
            .get_model_data(schema.name())
            .await
            .map_err(|source| Error::DataLoad {
                model: schema.name().to_string(),
                source,
            })?;

        self.rows = to_display_all(documents, &schema);
        debug!(rows = self.rows.len(), "grid reloaded");
        Ok(())
    }

    pub fn begin_create(&mut self) -> Result<&mut EditSession> {
        let schema = self.selected_for("create")?;
        self.state = SessionState::Creating;
        Ok(self
            .edit
            .insert(EditSession::create(Arc::clone(&self.access), schema)))
    }

    /// Open an edit session over a copy of `record`.
    pub fn begin_edit(&mut self, record: &Record) -> Result<&mut EditSession> {
        let schema = self.selected_for("edit")?;
        self.state = SessionState::Editing;
        Ok(self
            .edit
            .insert(EditSession::edit(Arc::clone(&self.access), schema, record)))
    }

    /// Open an edit session over a copy of grid row `index`.
    pub fn begin_edit_row(&mut self, index: usize) -> Result<&mut EditSession> {
        let record = self.rows.get(index).cloned().ok_or(Error::NoSuchRow(index))?;
        self.begin_edit(&record)
    }

    fn selected_for(&self, op: &'static str) -> Result<Arc<Schema>> {
        match (&self.selected, self.state) {
            (Some(schema), SessionState::ModelSelected) => Ok(Arc::clone(schema)),
            _ => Err(Error::InvalidState {
                op,
                state: self.state,
            }),
        }
    }

    fn require_open(&self, op: &'static str) -> Result<SessionState> {
        match (self.state, &self.edit) {
            (SessionState::Creating | SessionState::Editing, Some(_)) => Ok(self.state),
            _ => Err(Error::InvalidState {
                op,
                state: self.state,
            }),
        }
    }

    /// Create or update the working copy, then reload.
    ///
    /// A new session creates; an existing one updates by identity and fails
    /// with `MissingIdentity` if the copy no longer has one. A failed write
    /// leaves the edit session open for retry or cancel. An `Err(DataLoad)`
    /// means the write went through but the reload did not.
    #[instrument(skip(self))]
    pub async fn save(&mut self) -> Result<Record> {
        self.require_open("save")?;
        let Some(session) = self.edit.as_ref() else {
            return Err(Error::InvalidState {
                op: "save",
                state: self.state,
            });
        };

        let model = session.model_name().to_string();
        let schema = Arc::clone(session.schema());
        let document = session.to_transport();
        let (op, target) = if session.is_new() {
            (WriteOp::Create, None)
        } else {
            let id = session.identity().ok_or(Error::MissingIdentity)?;
            (WriteOp::Update, Some(id))
        };

        let access = Arc::clone(&self.access);
        let in_flight = InFlight::begin(&mut self.state, SessionState::Saving);
        let written = match target {
            Some(id) => access.update_model(&model, &id, document).await,
            None => access.create_model(&model, document).await,
        };

        let saved = match written {
            Ok(document) => to_display(document, &schema),
            Err(source) => {
                warn!(%op, message = %source, "write failed, keeping edit session open");
                return Err(Error::Write { op, model, source });
            }
        };
        in_flight.finish(SessionState::ModelSelected);

        info!(%op, id = %saved.identity().unwrap_or_default(), "record saved");
        self.edit = None;
        self.reload().await?;
        Ok(saved)
    }

    /// Discard the edit session; the grid row it came from is untouched.
    pub fn cancel(&mut self) -> Result<EditOutcome> {
        self.require_open("cancel")?;
        self.edit = None;
        self.state = SessionState::ModelSelected;
        Ok(EditOutcome::Cancelled)
    }

    /// Delete the edited record after an explicit confirmation, then reload.
    #[instrument(skip(self, confirm))]
    pub async fn delete(&mut self, confirm: &dyn Confirm) -> Result<DeleteOutcome> {
        let (Some(session), SessionState::Editing) = (self.edit.as_ref(), self.state) else {
            return Err(Error::InvalidState {
                op: "delete",
                state: self.state,
            });
        };
        let id = session.identity().ok_or(Error::MissingIdentity)?;
        let model = session.model_name().to_string();

        if !confirm.confirm(CONFIRM_DELETE_TITLE, CONFIRM_DELETE_BODY).await {
            debug!(%id, "delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        let access = Arc::clone(&self.access);
        let in_flight = InFlight::begin(&mut self.state, SessionState::Deleting);
        if let Err(source) = access.delete_model(&model, &id).await {
            warn!(%id, message = %source, "delete failed, keeping edit session open");
            return Err(Error::Write {
                op: WriteOp::Delete,
                model,
                source,
            });
        }
        in_flight.finish(SessionState::ModelSelected);

        info!(%id, "record deleted");
        self.edit = None;
        self.reload().await?;
        Ok(DeleteOutcome::Deleted)
    }

    /// Drive the open edit session through `editor` until it resolves.
    ///
    /// Failures that leave the session usable are reported through
    /// `notifier` and the editor is reopened; a declined delete reopens it
    /// as well.
    pub async fn run_editor(
        &mut self,
        editor: &dyn Editor,
        confirm: &dyn Confirm,
        notifier: &dyn Notifier,
    ) -> Result<EditOutcome> {
        self.require_open("open editor")?;

        loop {
            let Some(session) = self.edit.as_mut() else {
                return Err(Error::InvalidState {
                    op: "open editor",
                    state: self.state,
                });
            };

            let attempt = match editor.open(session).await {
                EditorAction::Save => self.save().await.map(EditOutcome::Saved),
                EditorAction::Cancel => return self.cancel(),
                EditorAction::Delete => match self.delete(confirm).await {
                    Ok(DeleteOutcome::Deleted) => Ok(EditOutcome::Deleted),
                    Ok(DeleteOutcome::Declined) => continue,
                    Err(err) => Err(err),
                },
            };

            match attempt {
                Ok(outcome) => return Ok(outcome),
                Err(err) if err.keeps_session_open() && self.edit.is_some() => {
                    let message = match err.api_error() {
                        Some(api) => api.message.clone(),
                        None => err.to_string(),
                    };
                    notifier.notify(&message);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Marks a write as in flight; unless finished, dropping it (write failed,
/// or the future was abandoned mid-write) puts the prior state back.
struct InFlight<'a> {
    state: &'a mut SessionState,
    resume: SessionState,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn begin(state: &'a mut SessionState, busy: SessionState) -> Self {
        let resume = std::mem::replace(state, busy);
        Self {
            state,
            resume,
            finished: false,
        }
    }

    fn finish(mut self, next: SessionState) {
        *self.state = next;
        self.finished = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *self.state = self.resume;
        }
    }
}

impl fmt::Debug for ModelSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSession")
            .field("state", &self.state)
            .field("selected", &self.selected_model())
            .field("columns", &self.columns.len())
            .field("rows", &self.rows.len())
            .field("edit", &self.edit)
            .finish()
    }
}
