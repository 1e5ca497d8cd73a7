use crate::{AppState, Effect, Msg, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::CompareRequested { root, threads } => {
            if state.session() != SessionState::Idle {
                return (state, Vec::new());
            }
            match parse_thread_count(&threads) {
                Some(workers) => {
                    state.start_session(root.clone());
                    vec![Effect::ResetLog, Effect::StartComparison { root, workers }]
                }
                None => {
                    state.push_error(format!(
                        "Thread count must be a whole number greater than zero, got {:?}",
                        threads.trim()
                    ));
                    Vec::new()
                }
            }
        }
        Msg::StopClicked => {
            if state.session() == SessionState::Running {
                state.begin_stop();
                vec![Effect::StopComparison]
            } else {
                Vec::new()
            }
        }
        Msg::ClearClicked => {
            state.clear();
            Vec::new()
        }
        Msg::StartRejected(reason) => {
            state.push_error(reason);
            state.mark_idle();
            Vec::new()
        }
        Msg::ResultAdded(row) => {
            state.add_result(row);
            Vec::new()
        }
        Msg::ProgressUpdated(fraction) => {
            state.set_progress(fraction);
            Vec::new()
        }
        Msg::ErrorRaised(message) => {
            state.push_error(message);
            Vec::new()
        }
        Msg::EngineIdle => {
            if state.session() != SessionState::Idle {
                state.mark_idle();
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Accepts a positive whole number, ignoring surrounding whitespace.
pub fn parse_thread_count(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|count| *count > 0)
}
