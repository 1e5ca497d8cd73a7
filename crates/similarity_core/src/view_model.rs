use crate::SessionState;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub root: Option<String>,
    pub rows: Vec<ResultRowView>,
    /// Fraction in `[0, 1]`.
    pub progress: f64,
    pub last_error: Option<String>,
    /// Every error of the session, oldest first.
    pub errors: Vec<String>,
    pub error_count: usize,
    pub can_compare: bool,
    pub can_stop: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRowView {
    pub file_a: String,
    pub file_b: String,
    pub similarity: String,
}

/// `0.615` renders as `61.5%`.
pub fn format_similarity(similarity: f64) -> String {
    format!("{:.1}%", similarity * 100.0)
}
