//! Testing infrastructure for mess session tests.
//!
//! This crate provides utilities for exercising the runtime without a server:
//! - `MemoryBackend`: in-memory `DataAccess` with call log, fetch counters
//!   and one-shot failure injection
//! - `surfaces`: scripted editor/confirm and a recording notifier
//! - `fixtures`: sample schemas and documents

pub mod backend;
pub mod fixtures;
pub mod surfaces;

pub use backend::{Call, FailPoint, MemoryBackend};
pub use surfaces::{EditorStep, RecordingNotifier, ScriptedConfirm, ScriptedEditor};
