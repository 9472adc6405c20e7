//! CLI harness running breakout_core headless with an autopilot paddle.

mod autopilot;

use autopilot::{Autopilot, Command, Finish};
use breakout_core::*;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, stdout, Result};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const USAGE: &str = "\
Usage: cli_harness [OPTIONS]

Options:
  --fast           Use the fast tick interval
  --level <N>      Start on level N (default 1)
  --seconds <N>    Give up after N seconds (default 120)
  --restart        Restart after game over instead of stopping
  --json           Print a JSON snapshot on every screen change
  -h, --help       Show this help";

/// Command-line options
#[derive(Debug, Clone, PartialEq)]
struct Options {
    fast: bool,
    level: u32,
    seconds: u64,
    restart: bool,
    json: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            fast: false,
            level: 1,
            seconds: 120,
            restart: false,
            json: false,
        }
    }
}

/// Parse arguments; `Ok(None)` means help was requested
fn parse_args(args: impl IntoIterator<Item = String>) -> std::result::Result<Option<Options>, String> {
    let mut options = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--fast" => options.fast = true,
            "--restart" => options.restart = true,
            "--json" => options.json = true,
            "--level" => options.level = parse_value(&arg, args.next())?,
            "--seconds" => options.seconds = parse_value(&arg, args.next())?,
            "-h" | "--help" => return Ok(None),
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }
    Ok(Some(options))
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<String>) -> std::result::Result<T, String> {
    let value = value.ok_or_else(|| format!("{} needs a value", flag))?;
    value
        .parse()
        .map_err(|_| format!("invalid value '{}' for {}", value, flag))
}

/// Apply actions in order until one asks to exit; returns whether it did
fn feed_actions(
    actions: Vec<Action>,
    mut apply: impl FnMut(Action) -> std::result::Result<ActionOutcome, TransitionError>,
) -> bool {
    for action in actions {
        match apply(action) {
            Ok(ActionOutcome::Exit) => return true,
            Ok(_) => {}
            Err(e) => log::debug!("action {:?} rejected: {}", action, e),
        }
    }
    false
}

/// Counts hook calls so the summary can report them
#[derive(Default)]
struct CountingHooks {
    brick_hits: AtomicU64,
    lives_lost: AtomicU64,
}

impl GameHooks for CountingHooks {
    fn on_brick_hit(&self) {
        self.brick_hits.fetch_add(1, Ordering::Relaxed);
    }

    fn on_ball_lost_life(&self) {
        self.lives_lost.fetch_add(1, Ordering::Relaxed);
    }

    fn play_background_loop(&self) {
        log::info!("background music started");
    }
}

/// CLI application state
struct CliApp {
    sim: SimulationLoop,
    snapshots: SnapshotReceiver,
    hooks: Arc<CountingHooks>,
    autopilot: Autopilot,
    options: Options,
    running: Arc<AtomicBool>,
    last_screen: Option<(GameState, u32)>,
}

impl CliApp {
    fn new(options: Options, running: Arc<AtomicBool>) -> Result<Self> {
        let config = Config::default();
        let hooks = Arc::new(CountingHooks::default());
        let mut sim = SimulationLoop::new(config, hooks.clone())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

        sim.set_level(options.level)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
        if options.fast {
            sim.handle_action(Action::SetFast)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        }

        Ok(Self {
            snapshots: sim.subscribe(),
            sim,
            hooks,
            autopilot: Autopilot::new(&config, options.restart),
            options,
            running,
            last_screen: None,
        })
    }

    fn run(&mut self) -> Result<Option<Finish>> {
        let deadline = Instant::now() + Duration::from_secs(self.options.seconds);
        self.sim
            .start_game()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

        let finish = 'run: loop {
            if !self.running.load(Ordering::SeqCst) {
                log::info!("interrupted");
                break 'run None;
            }
            if Instant::now() >= deadline {
                log::warn!("giving up after {}s", self.options.seconds);
                break 'run None;
            }
            if !self.sim.is_running() {
                if let Err(e) = self.sim.stop_game() {
                    log::error!("simulation failed: {}", e);
                }
                break 'run None;
            }

            let snapshot = self.snapshots.borrow_and_update().clone();
            self.report_screen(&snapshot)?;

            match self.autopilot.next(&snapshot) {
                Command::Act(actions) => {
                    if feed_actions(actions, |action| self.sim.handle_action(action)) {
                        log::info!("exit requested");
                        break 'run None;
                    }
                }
                Command::Finish(finish) => break 'run Some(finish),
            }

            std::thread::sleep(Duration::from_millis(1));
        };

        if let Err(e) = self.sim.stop_game() {
            log::error!("simulation loop ended with error: {}", e);
        }
        Ok(finish)
    }

    /// Print a line whenever the screen or level changes
    fn report_screen(&mut self, snapshot: &Snapshot) -> Result<()> {
        let screen = (snapshot.state, snapshot.level);
        if self.last_screen == Some(screen) {
            return Ok(());
        }
        self.last_screen = Some(screen);

        let color = match snapshot.state {
            GameState::Intro => Color::Cyan,
            GameState::Playing => Color::White,
            GameState::Won => Color::Green,
            GameState::GameOver => Color::Red,
        };
        execute!(
            stdout(),
            SetForegroundColor(color),
            Print(format!(
                "[tick {:>7}] {:<10} level {}/{}  score {:>6}  lives {}  bricks {}\n",
                snapshot.tick,
                snapshot.state.as_str(),
                snapshot.level,
                snapshot.max_level,
                snapshot.score,
                snapshot.lives,
                snapshot.live_bricks
            )),
            ResetColor
        )?;

        if self.options.json {
            match snapshot.to_json() {
                Ok(json) => println!("{}", json),
                Err(e) => log::warn!("{}", e),
            }
        }
        Ok(())
    }

    fn print_summary(&self, finish: Option<Finish>) -> Result<()> {
        let snapshot = self.sim.snapshot();
        let (color, outcome) = match finish {
            Some(Finish::GameComplete) => (Color::Green, "all levels cleared"),
            Some(Finish::GameOver) => (Color::Red, "game over"),
            None => (Color::Yellow, "stopped"),
        };

        execute!(
            stdout(),
            SetForegroundColor(color),
            Print(format!(
                "{}: level {}, score {}, {} brick hits, {} lives lost, {} ticks\n",
                outcome,
                snapshot.level,
                snapshot.score,
                self.hooks.brick_hits.load(Ordering::Relaxed),
                self.hooks.lives_lost.load(Ordering::Relaxed),
                snapshot.tick
            )),
            ResetColor
        )
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = match parse_args(std::env::args().skip(1)) {
        Ok(Some(options)) => options,
        Ok(None) => {
            println!("{}", USAGE);
            return Ok(());
        }
        Err(e) => {
            eprintln!("error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    // Handle Ctrl+C gracefully
    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    let mut app = CliApp::new(options, running)?;
    let finish = app.run()?;
    app.print_summary(finish)
}
