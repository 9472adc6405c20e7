use crate::event::{AppEvent, Event, EventHandler};
use breakout_core::{
    Action, ActionOutcome, Config, GameHooks, LoopError, SimulationLoop, Snapshot,
    SnapshotReceiver,
};
use ratatui::{
    crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    DefaultTerminal,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Minimum terminal size to draw the playfield
pub const MIN_GAME_WIDTH: u16 = 40;
pub const MIN_GAME_HEIGHT: u16 = 20;

/// Frames a flash stays visible
const FLASH_FRAMES: u8 = 12;

/// Map a key to a player action
pub fn map_keycode_to_action(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('<') => Some(Action::MoveLeft),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('>') => Some(Action::MoveRight),
        KeyCode::Char('f') | KeyCode::Char('F') => Some(Action::SetFast),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(Action::SetNormal),
        KeyCode::Enter => Some(Action::Confirm),
        KeyCode::Esc => Some(Action::Cancel),
        _ => None,
    }
}

/// Collect the fault of a worker that died since the last check
fn take_fault(sim: &mut SimulationLoop) -> Option<LoopError> {
    if sim.is_running() {
        return None;
    }
    sim.stop_game().err()
}

/// Start a stopped loop again; returns whether a restart happened
fn resume_stopped(sim: &mut SimulationLoop) -> Result<bool, LoopError> {
    if sim.is_running() {
        return Ok(false);
    }
    sim.start_game()?;
    Ok(true)
}

/// Visual stand-in for sound effects: counts hook calls for the UI to flash on
#[derive(Debug, Default)]
pub struct FlashHooks {
    brick_hits: AtomicU64,
    lives_lost: AtomicU64,
}

impl FlashHooks {
    pub fn brick_hits(&self) -> u64 {
        self.brick_hits.load(Ordering::Relaxed)
    }

    pub fn lives_lost(&self) -> u64 {
        self.lives_lost.load(Ordering::Relaxed)
    }
}

impl GameHooks for FlashHooks {
    fn on_brick_hit(&self) {
        self.brick_hits.fetch_add(1, Ordering::Relaxed);
    }

    fn on_ball_lost_life(&self) {
        self.lives_lost.fetch_add(1, Ordering::Relaxed);
    }
}

/// Countdown started whenever a hook counter moves
#[derive(Debug, Default)]
pub struct Flash {
    seen: u64,
    frames: u8,
}

impl Flash {
    /// Start flashing if `count` moved since the last frame
    fn update(&mut self, count: u64) {
        if count != self.seen {
            self.seen = count;
            self.frames = FLASH_FRAMES;
        } else {
            self.frames = self.frames.saturating_sub(1);
        }
    }

    pub fn active(&self) -> bool {
        self.frames > 0
    }
}

/// Main application
pub struct App {
    /// Is the application running?
    pub running: bool,
    /// Simulation owner; only reached through actions
    sim: SimulationLoop,
    snapshots: SnapshotReceiver,
    /// Latest snapshot, redrawn every frame
    pub snapshot: Snapshot,
    hooks: Arc<FlashHooks>,
    pub brick_flash: Flash,
    pub life_flash: Flash,
    /// Last rejected action, shown in the footer
    pub message: Option<String>,
    /// Event handler
    pub events: EventHandler,
    /// Current terminal size
    pub terminal_size: (u16, u16),
    /// Whether drawing is paused due to small terminal
    pub ui_paused: bool,
}

impl App {
    /// Constructs a new instance of App
    pub fn new(config: Config) -> color_eyre::Result<Self> {
        let hooks = Arc::new(FlashHooks::default());
        let mut sim = SimulationLoop::new(config, hooks.clone())?;
        let snapshots = sim.subscribe();
        let snapshot = sim.snapshot();

        // Publishes the intro screen until the player confirms
        sim.start_game()?;

        let events = EventHandler::new()?;
        let (width, height) = ratatui::crossterm::terminal::size()?;

        Ok(Self {
            running: true,
            sim,
            snapshots,
            snapshot,
            hooks,
            brick_flash: Flash::default(),
            life_flash: Flash::default(),
            message: None,
            events,
            terminal_size: (width, height),
            ui_paused: width < MIN_GAME_WIDTH || height < MIN_GAME_HEIGHT,
        })
    }

    /// Run the application's main loop
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        while self.running {
            terminal.draw(|frame| frame.render_widget(&self, frame.area()))?;
            self.handle_events()?;
        }

        self.sim.stop_game()?;
        Ok(())
    }

    pub fn handle_events(&mut self) -> color_eyre::Result<()> {
        match self.events.next()? {
            Event::Frame => self.tick(),
            Event::Key(key_event) => self.handle_key_event(key_event),
            Event::App(app_event) => self.handle_app_event(app_event)?,
        }
        Ok(())
    }

    /// Handle key events and convert to app events
    pub fn handle_key_event(&mut self, key_event: KeyEvent) {
        if key_event.kind == KeyEventKind::Release {
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.events.send(AppEvent::Quit),
            KeyCode::Char('c') | KeyCode::Char('C')
                if key_event.modifiers == KeyModifiers::CONTROL =>
            {
                self.events.send(AppEvent::Quit)
            }
            code => {
                if let Some(action) = map_keycode_to_action(code) {
                    self.events.send(AppEvent::Game(action));
                }
            }
        }
    }

    /// Handle application events
    fn handle_app_event(&mut self, app_event: AppEvent) -> color_eyre::Result<()> {
        match app_event {
            AppEvent::Quit => self.quit(),
            AppEvent::Game(action) => self.apply_action(action)?,
            AppEvent::TerminalResize(width, height) => self.handle_resize(width, height),
        }
        Ok(())
    }

    fn apply_action(&mut self, action: Action) -> color_eyre::Result<()> {
        // A faulted game is frozen mid-round, so confirm restarts the loop
        if action == Action::Confirm && resume_stopped(&mut self.sim)? {
            self.message = None;
            self.refresh_snapshot();
            return Ok(());
        }

        match self.sim.handle_action(action) {
            Ok(ActionOutcome::Exit) => self.quit(),
            Ok(ActionOutcome::StartPlay) => {
                self.message = None;
                // Only set when this start failed
                if let Some(e) = self.sim.last_error() {
                    return Err(color_eyre::eyre::eyre!("simulation failed: {}", e));
                }
            }
            Ok(_) => {}
            Err(e) => self.message = Some(e.to_string()),
        }
        self.refresh_snapshot();
        Ok(())
    }

    /// Pick up the latest snapshot and advance flashes
    fn tick(&mut self) {
        if let Some(e) = take_fault(&mut self.sim) {
            self.message = Some(format!("{}. Press ENTER to resume", e));
        }
        self.refresh_snapshot();
        self.brick_flash.update(self.hooks.brick_hits());
        self.life_flash.update(self.hooks.lives_lost());
    }

    fn refresh_snapshot(&mut self) {
        if self.snapshots.has_changed().unwrap_or(false) {
            self.snapshot = self.snapshots.borrow_and_update().clone();
        }
    }

    fn quit(&mut self) {
        self.running = false;
    }

    // Terminal size management
    fn handle_resize(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
        self.ui_paused = width < MIN_GAME_WIDTH || height < MIN_GAME_HEIGHT;
    }
}
