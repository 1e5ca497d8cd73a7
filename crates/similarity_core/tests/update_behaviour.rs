use std::path::PathBuf;
use std::sync::Once;

use pretty_assertions::assert_eq;
use similarity_core::{
    format_similarity, parse_thread_count, update, AppState, Effect, Msg, ResultRow, SessionState,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn compare(state: AppState, root: &str, threads: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::CompareRequested {
            root: PathBuf::from(root),
            threads: threads.to_string(),
        },
    )
}

fn row(a: &str, b: &str, similarity: f64) -> ResultRow {
    ResultRow {
        file_a: a.to_string(),
        file_b: b.to_string(),
        similarity,
    }
}

#[test]
fn compare_resets_log_then_starts() {
    init_logging();
    let (mut state, effects) = compare(AppState::new(), "/data", " 3 ");

    assert_eq!(
        effects,
        vec![
            Effect::ResetLog,
            Effect::StartComparison {
                root: PathBuf::from("/data"),
                workers: 3,
            },
        ]
    );
    let view = state.view();
    assert_eq!(view.session, SessionState::Running);
    assert_eq!(view.root.as_deref(), Some("/data"));
    assert!(!view.can_compare);
    assert!(view.can_stop);
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}

#[test]
fn compare_is_ignored_while_running() {
    init_logging();
    let (state, _) = compare(AppState::new(), "/data", "2");
    let (state, effects) = compare(state, "/other", "2");

    assert!(effects.is_empty());
    assert_eq!(state.root(), Some(PathBuf::from("/data").as_path()));
}

#[test]
fn invalid_thread_count_reports_error_and_stays_idle() {
    init_logging();
    for raw in ["", "abc", "0", "-2", "2.5"] {
        let (state, effects) = compare(AppState::new(), "/data", raw);
        assert!(effects.is_empty(), "input {raw:?}");
        assert_eq!(state.session(), SessionState::Idle);
        assert_eq!(state.errors().len(), 1);
    }
}

#[test]
fn stop_emits_effect_only_while_running() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::StopClicked);
    assert!(effects.is_empty());

    let (state, _) = compare(state, "/data", "4");
    let (state, effects) = update(state, Msg::StopClicked);
    assert_eq!(effects, vec![Effect::StopComparison]);
    assert_eq!(state.session(), SessionState::Stopping);
    assert!(!state.view().can_stop);

    let (state, effects) = update(state, Msg::StopClicked);
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::EngineIdle);
    assert_eq!(state.session(), SessionState::Idle);
    assert!(state.view().can_compare);
}

#[test]
fn results_and_progress_render_into_view() {
    init_logging();
    let (state, _) = compare(AppState::new(), "/data", "2");
    let (state, _) = update(state, Msg::ResultAdded(row("a.txt", "b.txt", 8.0 / 13.0)));
    let (state, _) = update(state, Msg::ProgressUpdated(0.25));

    let view = state.view();
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].file_a, "a.txt");
    assert_eq!(view.rows[0].similarity, "61.5%");
    assert_eq!(view.progress, 0.25);
}

#[test]
fn progress_is_clamped() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::ProgressUpdated(1.7));
    assert_eq!(state.progress(), 1.0);
    let (state, _) = update(state, Msg::ProgressUpdated(f64::NAN));
    assert_eq!(state.progress(), 0.0);
}

#[test]
fn clear_empties_table_and_progress_without_effects() {
    init_logging();
    let (state, _) = compare(AppState::new(), "/data", "2");
    let (state, _) = update(state, Msg::ResultAdded(row("a", "b", 1.0)));
    let (state, _) = update(state, Msg::ProgressUpdated(0.5));
    let (state, effects) = update(state, Msg::ClearClicked);

    assert!(effects.is_empty());
    assert!(state.results().is_empty());
    assert_eq!(state.progress(), 0.0);
    assert_eq!(state.session(), SessionState::Running);
}

#[test]
fn new_comparison_resets_progress_but_keeps_results() {
    init_logging();
    let (state, _) = compare(AppState::new(), "/data", "2");
    let (state, _) = update(state, Msg::ResultAdded(row("a", "b", 0.9)));
    let (state, _) = update(state, Msg::ProgressUpdated(1.0));
    let (state, _) = update(state, Msg::EngineIdle);
    let (state, _) = compare(state, "/data", "2");

    assert_eq!(state.progress(), 0.0);
    assert_eq!(state.results().len(), 1);
}

#[test]
fn rejected_start_returns_to_idle_with_error() {
    init_logging();
    let (state, _) = compare(AppState::new(), "/missing", "2");
    let (state, _) = update(state, Msg::StartRejected("/missing is not a directory".into()));

    let view = state.view();
    assert_eq!(view.session, SessionState::Idle);
    assert_eq!(view.last_error.as_deref(), Some("/missing is not a directory"));
    assert_eq!(view.error_count, 1);
}

#[test]
fn errors_accumulate() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::ErrorRaised("one".into()));
    let (state, _) = update(state, Msg::ErrorRaised("two".into()));

    assert_eq!(state.errors(), ["one".to_string(), "two".to_string()]);
    let view = state.view();
    assert_eq!(view.errors, vec!["one".to_string(), "two".to_string()]);
    assert_eq!(view.last_error.as_deref(), Some("two"));
    assert_eq!(view.error_count, 2);
}

#[test]
fn thread_count_parsing() {
    assert_eq!(parse_thread_count("7"), Some(7));
    assert_eq!(parse_thread_count("  10\n"), Some(10));
    assert_eq!(parse_thread_count("0"), None);
    assert_eq!(parse_thread_count("three"), None);
}

#[test]
fn similarity_formats_with_one_decimal() {
    assert_eq!(format_similarity(1.0), "100.0%");
    assert_eq!(format_similarity(0.5), "50.0%");
    assert_eq!(format_similarity(0.0), "0.0%");
}
