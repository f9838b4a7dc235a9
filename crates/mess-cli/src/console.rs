//! Terminal implementations of the session's notification, confirmation
//! and editor surfaces.

use async_trait::async_trait;
use is_terminal::IsTerminal;
use mess_runtime::{Confirm, EditSession, Editor, EditorAction, Notifier};
use owo_colors::OwoColorize;
use std::io::{BufRead, Write};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Prints notifications to stderr
#[derive(Debug)]
pub struct StderrNotifier {
    color: bool,
    notified: AtomicBool,
}

impl Default for StderrNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl StderrNotifier {
    pub fn new() -> Self {
        Self {
            color: std::io::stderr().is_terminal(),
            notified: AtomicBool::new(false),
        }
    }

    pub fn has_notified(&self) -> bool {
        self.notified.load(Ordering::Relaxed)
    }
}

impl Notifier for StderrNotifier {
    fn notify(&self, message: &str) {
        self.notified.store(true, Ordering::Relaxed);
        if self.color {
            eprintln!("{} {}", "error:".red().bold(), message);
        } else {
            eprintln!("error: {}", message);
        }
    }
}

/// Asks on stderr and reads the answer from stdin, unless told to assume yes
#[derive(Debug, Clone, Copy)]
pub struct PromptConfirm {
    assume_yes: bool,
}

impl PromptConfirm {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

#[async_trait]
impl Confirm for PromptConfirm {
    async fn confirm(&self, title: &str, body: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        let prompt = format!("{}\n{} [y/N] ", title, body);
        tokio::task::spawn_blocking(move || ask(&prompt))
            .await
            .unwrap_or(false)
    }
}

fn ask(prompt: &str) -> bool {
    let mut stderr = std::io::stderr();
    if write!(stderr, "{}", prompt).and_then(|_| stderr.flush()).is_err() {
        return false;
    }

    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_yes(&answer),
        Err(_) => false,
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Non-interactive editor: applies the command line's field assignments on
/// first open and answers with a fixed action. Any reopen cancels, since
/// there is nobody to fix the input.
#[derive(Debug)]
pub struct PresetEditor {
    assignments: Vec<(String, String)>,
    action: EditorAction,
    opened: AtomicUsize,
    rejection: Mutex<Option<String>>,
}

impl PresetEditor {
    pub fn new(assignments: Vec<(String, String)>, action: EditorAction) -> Self {
        Self {
            assignments,
            action,
            opened: AtomicUsize::new(0),
            rejection: Mutex::new(None),
        }
    }

    pub fn times_opened(&self) -> usize {
        self.opened.load(Ordering::Relaxed)
    }

    /// First assignment the edit session refused
    pub fn rejection(&self) -> Option<String> {
        self.rejection
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Editor for PresetEditor {
    async fn open(&self, session: &mut EditSession) -> EditorAction {
        if self.opened.fetch_add(1, Ordering::Relaxed) > 0 {
            return EditorAction::Cancel;
        }

        for (field, input) in &self.assignments {
            if let Err(err) = session.set_input(field, input) {
                if let Ok(mut rejection) = self.rejection.lock() {
                    *rejection = Some(err.to_string());
                }
                return EditorAction::Cancel;
            }
        }
        self.action
    }
}
