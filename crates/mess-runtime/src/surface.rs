//! Presentation collaborators the session layer talks to.
//!
//! Implementations live with whatever renders the UI (a console, a test
//! script); the session only sees these contracts.

use crate::edit::EditSession;
use async_trait::async_trait;

pub const CONFIRM_DELETE_TITLE: &str = "Confirm removal";
pub const CONFIRM_DELETE_BODY: &str = "Are you sure you want to remove this model?";

/// Toast-style message surface
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Yes/no gate in front of destructive calls
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, title: &str, body: &str) -> bool;
}

/// How the user closed the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Save,
    Cancel,
    Delete,
}

/// Modal editor over one edit session
///
/// The editor mutates the session's working copy and reports how the user
/// left it; it never performs writes itself.
#[async_trait]
pub trait Editor: Send + Sync {
    async fn open(&self, session: &mut EditSession) -> EditorAction;
}
