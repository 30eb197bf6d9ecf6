//! Editing session state machine
//!
//! Routes user actions into the selection model and, on commit, produces the
//! output diff and hands it to a [`Persist`] sink exactly once.

use crate::diff::{transform, Mode};
use crate::selection::SelectionModel;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Named user actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveUp,
    MoveDown,
    Top,
    Bottom,
    PageUp(usize),
    PageDown(usize),
    Toggle,
    Commit,
    Quit,
    /// Unrecognized input
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Editing,
    Saving,
    Terminated,
}

/// How a finished session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Quit,
    Saved {
        target: String,
        bytes: usize,
        dropped_headers: usize,
    },
    Failed {
        target: String,
        error: String,
    },
}

/// Destination for the committed diff
pub trait Persist {
    /// Human-readable name of the destination
    fn describe(&self) -> String;
    fn write(&mut self, text: &str) -> Result<()>;
}

/// Writes the output to a file, replacing any previous content
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Persist for FileSink {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn write(&mut self, text: &str) -> Result<()> {
        std::fs::write(&self.path, text)
            .with_context(|| format!("Failed to write output file: {}", self.path.display()))
    }
}

pub struct Session {
    model: SelectionModel,
    mode: Mode,
    state: State,
    outcome: Option<Outcome>,
}

impl Session {
    pub fn new(model: SelectionModel, mode: Mode) -> Self {
        Self {
            model,
            mode,
            state: State::Editing,
            outcome: None,
        }
    }

    pub fn model(&self) -> &SelectionModel {
        &self.model
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state() == State::Terminated
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Applies one action. Returns the new state.
    pub fn handle(&mut self, action: Action, sink: &mut dyn Persist) -> State {
        if self.state != State::Editing {
            return self.state;
        }

        match action {
            Action::MoveUp => self.model.move_up(),
            Action::MoveDown => self.model.move_down(),
            Action::Top => self.model.move_to_top(),
            Action::Bottom => self.model.move_to_bottom(),
            Action::PageUp(rows) => self.model.page_up(rows),
            Action::PageDown(rows) => self.model.page_down(rows),
            Action::Toggle => self.model.toggle_current(),
            Action::Commit => self.commit(sink),
            Action::Quit => {
                self.outcome = Some(Outcome::Quit);
                self.state = State::Terminated;
            }
            Action::Ignore => {}
        }

        self.state
    }

    fn commit(&mut self, sink: &mut dyn Persist) {
        self.state = State::Saving;

        let result = transform(self.model.lines(), self.model.selection(), self.mode);
        let target = sink.describe();

        // A failed write is reported, never retried
        self.outcome = Some(match sink.write(&result.text) {
            Ok(()) => Outcome::Saved {
                target,
                bytes: result.text.len(),
                dropped_headers: result.dropped_headers,
            },
            Err(e) => Outcome::Failed {
                target,
                error: format!("{:#}", e),
            },
        });

        self.state = State::Terminated;
    }
}
