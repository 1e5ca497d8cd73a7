use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;

use similarity_engine::{
    ComparisonLog, ComparisonResult, EngineEvent, EventSink, ProgressCounters, ResultSink,
};
use tempfile::TempDir;

#[derive(Default)]
struct TestSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl TestSink {
    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn sink_in(dir: &Path) -> (ResultSink, Arc<TestSink>, PathBuf) {
    let path = dir.join("log.csv");
    let events = Arc::new(TestSink::default());
    let sink = ResultSink::new(ComparisonLog::open(&path).unwrap(), 0.5, events.clone());
    (sink, events, path)
}

fn result(a: &str, b: &str, similarity: f64) -> ComparisonResult {
    ComparisonResult::new(PathBuf::from(a), PathBuf::from(b), similarity)
}

#[test]
fn discovery_accumulates_pair_estimate() {
    let temp = TempDir::new().unwrap();
    let (sink, _events, _path) = sink_in(temp.path());

    for _ in 0..5 {
        sink.file_discovered();
    }

    assert_eq!(
        sink.counters(),
        ProgressCounters {
            discovered: 5,
            estimated_total: 10,
            completed: 0,
            discovery_finished: false,
        }
    );
}

#[test]
fn only_results_at_threshold_are_forwarded() {
    let temp = TempDir::new().unwrap();
    let (sink, events, path) = sink_in(temp.path());
    for _ in 0..3 {
        sink.file_discovered();
    }

    sink.record(result("a.txt", "b.txt", 0.5));
    sink.record(result("a.txt", "c.txt", 0.49));

    let forwarded: Vec<_> = events
        .take()
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::ResultFound(found) => Some(found),
            _ => None,
        })
        .collect();
    assert_eq!(forwarded, vec![result("a.txt", "b.txt", 0.5)]);

    let rows = fs::read_to_string(path).unwrap();
    assert_eq!(rows, "a.txt,b.txt,0.5\na.txt,c.txt,0.49\n");
}

#[test]
fn progress_follows_every_record() {
    let temp = TempDir::new().unwrap();
    let (sink, events, _path) = sink_in(temp.path());
    for _ in 0..3 {
        sink.file_discovered();
    }

    sink.record(result("a", "b", 0.0));
    sink.record_failure(Path::new("a"), Path::new("c"));

    let progress: Vec<f64> = events
        .take()
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::Progress(fraction) => Some(fraction),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![1.0 / 3.0, 2.0 / 3.0]);
}

#[test]
fn run_completes_only_after_discovery_finishes() {
    let temp = TempDir::new().unwrap();
    let (sink, _events, _path) = sink_in(temp.path());
    sink.file_discovered();
    sink.file_discovered();

    // All known pairs done, but the walker may still find more files.
    assert!(!sink.record(result("a", "b", 0.9)));
    assert!(sink.discovery_finished());
}

#[test]
fn last_record_after_discovery_completes_run() {
    let temp = TempDir::new().unwrap();
    let (sink, _events, _path) = sink_in(temp.path());
    for _ in 0..3 {
        sink.file_discovered();
    }
    assert!(!sink.discovery_finished());

    assert!(!sink.record(result("a", "b", 0.1)));
    assert!(!sink.record(result("a", "c", 0.1)));
    assert!(sink.record_failure(Path::new("b"), Path::new("c")));
}

#[test]
fn empty_discovery_completes_without_progress() {
    let temp = TempDir::new().unwrap();
    let (sink, events, _path) = sink_in(temp.path());

    assert!(sink.discovery_finished());
    assert_eq!(sink.counters().fraction(), None);
    assert!(events.take().is_empty());
}

#[test]
fn concurrent_records_keep_rows_whole() {
    let temp = TempDir::new().unwrap();
    let (sink, _events, path) = sink_in(temp.path());
    let sink = Arc::new(sink);
    for _ in 0..9 {
        sink.file_discovered();
    }

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let sink = sink.clone();
            thread::spawn(move || {
                for i in 0..9 {
                    let a = format!("worker{worker}/left{i}.txt");
                    let b = format!("worker{worker}/right{i}.txt");
                    sink.record(result(&a, &b, 0.25));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let content = fs::read_to_string(path).unwrap();
    let rows: Vec<_> = content.lines().collect();
    assert_eq!(rows.len(), 36);
    for row in rows {
        let fields: Vec<_> = row.split(',').collect();
        assert_eq!(fields.len(), 3, "malformed row {row}");
        assert_eq!(fields[2], "0.25");
    }
    assert_eq!(sink.counters().completed, 36);
}
