//! Similarity core: pure front-end state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{AppState, ResultRow, SessionState};
pub use update::{parse_thread_count, update};
pub use view_model::{format_similarity, AppViewModel, ResultRowView};
