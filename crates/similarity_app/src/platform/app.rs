use std::env;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use engine_logging::engine_info;
use similarity_core::{update, AppState, Msg, SessionState};

use super::effects::EffectRunner;
use super::logging::{self, LogDestination};
use super::render::Renderer;
use super::settings::load_settings;

const DEFAULT_THREADS: &str = "3";
const POLL_INTERVAL: Duration = Duration::from_millis(75);

pub fn run_app() -> anyhow::Result<()> {
    logging::initialize(LogDestination::File);

    let mut args = env::args().skip(1);
    let Some(root) = args.next() else {
        bail!("usage: similarity_app <directory> [threads]");
    };
    let threads = args.next().unwrap_or_else(|| DEFAULT_THREADS.to_string());

    let cwd = env::current_dir().context("cannot determine working directory")?;
    let runner = EffectRunner::new(load_settings(&cwd))?;

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    spawn_command_reader(msg_tx);

    let mut app = App {
        state: AppState::new(),
        runner,
        renderer: Renderer::default(),
    };
    println!("type 'stop' to cancel, 'clear' to clear the table");
    app.dispatch(Msg::CompareRequested {
        root: PathBuf::from(root),
        threads,
    });

    while app.state.session() != SessionState::Idle {
        while let Ok(msg) = msg_rx.try_recv() {
            app.dispatch(msg);
        }
        let msg = app.runner.poll(POLL_INTERVAL).unwrap_or(Msg::Tick);
        app.dispatch(msg);
    }

    let results = app.state.results().len();
    let errors = app.state.errors().len();
    engine_info!("session ended: {} similar pairs, {} errors", results, errors);
    println!("{results} pairs at or above the threshold, {errors} errors");
    Ok(())
}

struct App {
    state: AppState,
    runner: EffectRunner,
    renderer: Renderer,
}

impl App {
    fn dispatch(&mut self, msg: Msg) {
        let mut pending = vec![msg];
        while let Some(msg) = pending.pop() {
            let state = std::mem::take(&mut self.state);
            let (mut state, effects) = update(state, msg);
            if state.consume_dirty() {
                self.renderer.render(&state.view());
            }
            self.state = state;
            pending.extend(self.runner.run(effects));
        }
    }
}

/// Terminal stand-in for the Stop and Clear buttons.
fn spawn_command_reader(msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let msg = match line.trim() {
                "stop" | "s" => Msg::StopClicked,
                "clear" | "c" => Msg::ClearClicked,
                _ => continue,
            };
            if msg_tx.send(msg).is_err() {
                break;
            }
        }
    });
}
