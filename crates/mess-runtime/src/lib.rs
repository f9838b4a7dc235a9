pub mod api;
pub mod catalog;
pub mod config;
pub mod edit;
pub mod error;
pub mod http;
pub mod references;
pub mod session;
pub mod surface;

pub use api::{ApiError, DataAccess};
pub use catalog::SchemaCatalog;
pub use config::Config;
pub use edit::EditSession;
pub use error::{Error, Result, WriteOp};
pub use http::HttpDataAccess;
pub use references::ReferenceCache;
pub use session::{DeleteOutcome, EditOutcome, ModelSession, SessionState};
pub use surface::{
    CONFIRM_DELETE_BODY, CONFIRM_DELETE_TITLE, Confirm, Editor, EditorAction, Notifier,
};
