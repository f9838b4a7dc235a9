//! Scripted stand-ins for the editor, confirmation and toast surfaces.

use async_trait::async_trait;
use mess_runtime::{Confirm, EditSession, Editor, EditorAction, Notifier};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Collects every notification it is shown
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("notifier lock poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages
            .lock()
            .expect("notifier lock poisoned")
            .push(message.to_string());
    }
}

/// Answers confirmations from a queue; declines once the queue runs out
#[derive(Debug, Default)]
pub struct ScriptedConfirm {
    answers: Mutex<VecDeque<bool>>,
    asked: Mutex<Vec<(String, String)>>,
}

impl ScriptedConfirm {
    pub fn answering(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn yes() -> Self {
        Self::answering([true])
    }

    pub fn no() -> Self {
        Self::answering([false])
    }

    /// (title, body) of every prompt shown
    pub fn asked(&self) -> Vec<(String, String)> {
        self.asked.lock().expect("confirm lock poisoned").clone()
    }
}

#[async_trait]
impl Confirm for ScriptedConfirm {
    async fn confirm(&self, title: &str, body: &str) -> bool {
        self.asked
            .lock()
            .expect("confirm lock poisoned")
            .push((title.to_string(), body.to_string()));
        self.answers
            .lock()
            .expect("confirm lock poisoned")
            .pop_front()
            .unwrap_or(false)
    }
}

/// What the scripted user does on one opening of the editor
#[derive(Debug, Clone)]
pub struct EditorStep {
    pub inputs: Vec<(String, String)>,
    pub toggle_hidden: bool,
    pub action: EditorAction,
}

impl EditorStep {
    pub fn action(action: EditorAction) -> Self {
        Self {
            inputs: Vec::new(),
            toggle_hidden: false,
            action,
        }
    }

    pub fn input(mut self, field: &str, text: &str) -> Self {
        self.inputs.push((field.to_string(), text.to_string()));
        self
    }

    pub fn toggle_hidden(mut self) -> Self {
        self.toggle_hidden = true;
        self
    }
}

/// Replays editor steps; cancels once the script runs out.
///
/// Input that fails validation is recorded in `rejected` and skipped.
#[derive(Debug, Default)]
pub struct ScriptedEditor {
    steps: Mutex<VecDeque<EditorStep>>,
    opened: Mutex<usize>,
    rejected: Mutex<Vec<String>>,
}

impl ScriptedEditor {
    pub fn new(steps: impl IntoIterator<Item = EditorStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            opened: Mutex::new(0),
            rejected: Mutex::new(Vec::new()),
        }
    }

    pub fn times_opened(&self) -> usize {
        *self.opened.lock().expect("editor lock poisoned")
    }

    pub fn rejected(&self) -> Vec<String> {
        self.rejected.lock().expect("editor lock poisoned").clone()
    }
}

#[async_trait]
impl Editor for ScriptedEditor {
    async fn open(&self, session: &mut EditSession) -> EditorAction {
        *self.opened.lock().expect("editor lock poisoned") += 1;
        let step = self.steps.lock().expect("editor lock poisoned").pop_front();
        let Some(step) = step else {
            return EditorAction::Cancel;
        };

        if step.toggle_hidden {
            session.toggle_show_hidden_fields();
        }
        for (field, text) in &step.inputs {
            if let Err(err) = session.set_input(field, text) {
                self.rejected
                    .lock()
                    .expect("editor lock poisoned")
                    .push(err.to_string());
            }
        }
        step.action
    }
}
