use std::path::{Path, PathBuf};

use crate::view_model::{format_similarity, AppViewModel, ResultRowView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Stopping,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub file_a: String,
    pub file_b: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    session: SessionState,
    root: Option<PathBuf>,
    results: Vec<ResultRow>,
    progress: f64,
    errors: Vec<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn results(&self) -> &[ResultRow] {
        &self.results
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            session: self.session,
            root: self.root.as_ref().map(|p| p.display().to_string()),
            rows: self
                .results
                .iter()
                .map(|row| ResultRowView {
                    file_a: row.file_a.clone(),
                    file_b: row.file_b.clone(),
                    similarity: format_similarity(row.similarity),
                })
                .collect(),
            progress: self.progress,
            last_error: self.errors.last().cloned(),
            errors: self.errors.clone(),
            error_count: self.errors.len(),
            can_compare: self.session == SessionState::Idle,
            can_stop: self.session == SessionState::Running,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn start_session(&mut self, root: PathBuf) {
        self.session = SessionState::Running;
        self.root = Some(root);
        self.progress = 0.0;
        self.dirty = true;
    }

    pub(crate) fn begin_stop(&mut self) {
        self.session = SessionState::Stopping;
        self.dirty = true;
    }

    pub(crate) fn mark_idle(&mut self) {
        self.session = SessionState::Idle;
        self.dirty = true;
    }

    pub(crate) fn add_result(&mut self, row: ResultRow) {
        self.results.push(row);
        self.dirty = true;
    }

    pub(crate) fn set_progress(&mut self, fraction: f64) {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if fraction != self.progress {
            self.progress = fraction;
            self.dirty = true;
        }
    }

    pub(crate) fn push_error(&mut self, message: String) {
        self.errors.push(message);
        self.dirty = true;
    }

    pub(crate) fn clear(&mut self) {
        self.results.clear();
        self.progress = 0.0;
        self.dirty = true;
    }
}
