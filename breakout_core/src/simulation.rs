//! Background simulation loop.
//!
//! One worker thread advances the [`Game`] at the selected tick interval.
//! Every read or write of the game goes through a single mutex; a whole tick
//! is one critical section, so a reader sees the state either before or
//! after a tick, never halfway. Snapshots are published on a latest-value
//! `watch` channel after every iteration, including on screens where no
//! physics runs. Publication happens inside the critical section so the
//! channel never goes back to an older state.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tokio::sync::watch;

use crate::game::Game;
use crate::hooks::{self, GameHooks};
use crate::state::TransitionError;
use crate::types::*;

/// Receiving end of the snapshot channel
pub type SnapshotReceiver = watch::Receiver<Snapshot>;

/// Faults that end the worker thread
#[derive(Debug, Clone, PartialEq)]
pub enum LoopError {
    /// A tick or hook panicked
    Panicked(String),
    /// The shared-state lock was poisoned by another thread
    LockPoisoned,
    /// The worker thread could not be created
    SpawnFailed(String),
}

impl fmt::Display for LoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopError::Panicked(msg) => write!(f, "Simulation panicked: {}", msg),
            LoopError::LockPoisoned => write!(f, "Shared game state lock poisoned"),
            LoopError::SpawnFailed(msg) => write!(f, "Failed to spawn simulation thread: {}", msg),
        }
    }
}

impl std::error::Error for LoopError {}

/// Cloneable handle to the locked game, for readers on other threads
#[derive(Clone)]
pub struct SharedGame {
    inner: Arc<Mutex<Game>>,
}

impl SharedGame {
    fn new(game: Game) -> Self {
        SharedGame {
            inner: Arc::new(Mutex::new(game)),
        }
    }

    /// Lock the game. A lock poisoned by a failed tick is still readable.
    fn lock(&self) -> MutexGuard<'_, Game> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy the current state under the lock
    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }
}

/// What the worker thread needs
struct WorkerContext {
    game: SharedGame,
    snapshots: Arc<watch::Sender<Snapshot>>,
    hooks: Arc<dyn GameHooks>,
    stop: Arc<AtomicBool>,
    background_started: Arc<AtomicBool>,
}

struct Worker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<Result<(), LoopError>>,
}

/// Owner of the game state and its background loop
pub struct SimulationLoop {
    game: SharedGame,
    snapshots: Arc<watch::Sender<Snapshot>>,
    hooks: Arc<dyn GameHooks>,
    /// The background music hook fires once per loop owner
    background_started: Arc<AtomicBool>,
    worker: Option<Worker>,
    last_error: Option<LoopError>,
}

impl SimulationLoop {
    /// Create the game on its intro screen. The loop is not started yet.
    pub fn new(config: Config, hooks: Arc<dyn GameHooks>) -> Result<Self, ConfigError> {
        let game = Game::new(config)?;
        let (sender, _) = watch::channel(game.snapshot());

        Ok(SimulationLoop {
            game: SharedGame::new(game),
            snapshots: Arc::new(sender),
            hooks,
            background_started: Arc::new(AtomicBool::new(false)),
            worker: None,
            last_error: None,
        })
    }

    /// Subscribe to snapshots published after every loop iteration
    pub fn subscribe(&self) -> SnapshotReceiver {
        self.snapshots.subscribe()
    }

    /// Handle to the locked game for other threads
    pub fn shared(&self) -> SharedGame {
        self.game.clone()
    }

    /// Copy the current state under the lock
    pub fn snapshot(&self) -> Snapshot {
        self.game.snapshot()
    }

    /// Whether a worker thread is currently running
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .map(|w| !w.handle.is_finished())
            .unwrap_or(false)
    }

    /// Fault that ended the last worker, cleared by a successful start
    pub fn last_error(&self) -> Option<&LoopError> {
        self.last_error.as_ref()
    }

    /// Start the background loop, stopping and joining any previous one first.
    ///
    /// If a previous tick panicked while holding the lock, the lock is cleared
    /// and the current level's objects are rebuilt.
    pub fn start_game(&mut self) -> Result<(), LoopError> {
        if let Err(e) = self.stop_game() {
            log::warn!("previous simulation loop failed: {}", e);
        }

        if self.game.inner.is_poisoned() {
            log::warn!("recovering from a failed tick, rebuilding game objects");
            self.game.inner.clear_poison();
            self.game.lock().create_game_objects();
        }

        let stop = Arc::new(AtomicBool::new(false));
        let ctx = WorkerContext {
            game: self.game.clone(),
            snapshots: Arc::clone(&self.snapshots),
            hooks: Arc::clone(&self.hooks),
            stop: Arc::clone(&stop),
            background_started: Arc::clone(&self.background_started),
        };

        let handle = thread::Builder::new()
            .name("simulation".to_string())
            .spawn(move || run(ctx))
            .map_err(|e| LoopError::SpawnFailed(e.to_string()))?;

        log::debug!("simulation loop started");
        self.worker = Some(Worker { stop, handle });
        self.last_error = None;
        Ok(())
    }

    /// Ask the loop to stop and wait for the in-flight iteration to finish.
    ///
    /// Returns the fault that ended the worker, if it died on its own.
    pub fn stop_game(&mut self) -> Result<(), LoopError> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        worker.stop.store(true, Ordering::Release);
        let result = match worker.handle.join() {
            Ok(result) => result,
            Err(payload) => Err(LoopError::Panicked(panic_message(payload.as_ref()))),
        };

        log::debug!("simulation loop stopped");
        if let Err(e) = &result {
            self.last_error = Some(e.clone());
        }
        result
    }

    /// Apply a player action under the lock and publish the result.
    ///
    /// Actions that begin a round (re)start the background loop.
    pub fn handle_action(&mut self, action: Action) -> Result<ActionOutcome, TransitionError> {
        let outcome = {
            let mut game = self.game.lock();
            let outcome = game.handle_action(action)?;
            self.snapshots.send_replace(game.snapshot());
            outcome
        };

        if outcome == ActionOutcome::StartPlay {
            if let Err(e) = self.start_game() {
                log::error!("could not start simulation loop: {}", e);
                self.last_error = Some(e);
            }
        }
        Ok(outcome)
    }

    /// Jump to a level under the lock, keeping the current screen
    pub fn set_level(&mut self, level: u32) -> Result<(), TransitionError> {
        let mut game = self.game.lock();
        game.set_level(level)?;
        self.snapshots.send_replace(game.snapshot());
        Ok(())
    }

    /// Apply a compact action code; unknown codes are ignored
    pub fn handle_code(&mut self, code: u8) -> Result<ActionOutcome, TransitionError> {
        match Action::from_code(code) {
            Some(action) => self.handle_action(action),
            None => {
                log::trace!("ignoring unknown action code {:#04x}", code);
                Ok(ActionOutcome::Ignored)
            }
        }
    }
}

impl Drop for SimulationLoop {
    fn drop(&mut self) {
        let _ = self.stop_game();
    }
}

/// Worker body: iterate until asked to stop or an iteration faults
fn run(ctx: WorkerContext) -> Result<(), LoopError> {
    while !ctx.stop.load(Ordering::Acquire) {
        let started = Instant::now();

        let interval = match panic::catch_unwind(AssertUnwindSafe(|| iterate(&ctx))) {
            Ok(Ok(interval)) => interval,
            Ok(Err(e)) => {
                log::error!("simulation loop terminated: {}", e);
                return Err(e);
            }
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                log::error!("simulation loop terminated: tick panicked: {}", msg);
                return Err(LoopError::Panicked(msg));
            }
        };

        thread::sleep(interval.saturating_sub(started.elapsed()));
    }
    Ok(())
}

/// One iteration: tick and publish under the lock, then hooks outside it.
/// Returns the delay before the next iteration.
fn iterate(ctx: &WorkerContext) -> Result<std::time::Duration, LoopError> {
    let (events, interval, playing) = {
        let mut game = ctx
            .game
            .inner
            .lock()
            .map_err(|_| LoopError::LockPoisoned)?;
        let playing = game.is_active();
        let events = game.step();
        ctx.snapshots.send_replace(game.snapshot());
        (events, game.tick_interval(), playing)
    };

    if playing && !ctx.background_started.swap(true, Ordering::AcqRel) {
        ctx.hooks.play_background_loop();
    }
    hooks::dispatch(ctx.hooks.as_ref(), &events);

    Ok(interval)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
