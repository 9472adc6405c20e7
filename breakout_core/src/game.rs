//! Main game logic and state management.

use crate::level::{BrickGrid, Level};
use crate::object::GameObject;
use crate::physics::CollisionEngine;
use crate::scoreboard::Scoreboard;
use crate::state::{GameStateMachine, Transition, TransitionError, Trigger};
use crate::types::*;

/// Everything the simulation owns: ball, bat, bricks, scoreboard and screen.
///
/// Mutation goes through [`Game::handle_action`] and [`Game::step`]; when the
/// game runs on a [`crate::SimulationLoop`] both are only ever called with the
/// shared-state lock held.
#[derive(Debug, Clone)]
pub struct Game {
    pub config: Config,
    pub tick: Tick,
    pub ball: GameObject,
    pub bat: GameObject,
    pub bricks: BrickGrid,
    pub scoreboard: Scoreboard,
    machine: GameStateMachine,
    speed: Speed,
}

impl Game {
    /// Create a game on the intro screen with level 1 laid out
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut game = Game {
            config,
            tick: 0,
            ball: GameObject::new(0.0, 0.0, config.ball_size, config.ball_size),
            bat: GameObject::new(0.0, 0.0, config.bat_width, config.bat_height),
            bricks: BrickGrid::default(),
            scoreboard: Scoreboard::new(config.starting_lives),
            machine: GameStateMachine::new(config.max_level),
            speed: Speed::default(),
        };

        game.create_game_objects();
        Ok(game)
    }

    /// (Re)create ball, bat and bricks for the current level and refill lives.
    /// Score is left alone.
    pub fn create_game_objects(&mut self) {
        let config = &self.config;

        self.ball = GameObject::new(
            config.width / 2.0,
            config.height / 2.0,
            config.ball_size,
            config.ball_size,
        )
        .with_direction(1.0, -1.0);

        self.bat = GameObject::new(
            (config.width - config.bat_width) / 2.0,
            config.height - config.bat_floor_gap,
            config.bat_width,
            config.bat_height,
        );

        // The machine only ever holds levels in 1..=max_level
        self.bricks = match Level::new(self.machine.level(), config.max_level) {
            Some(level) => level.bricks(config),
            None => BrickGrid::default(),
        };

        self.scoreboard.refill_lives();
        log::debug!(
            "created game objects for level {} ({} bricks)",
            self.machine.level(),
            self.bricks.live()
        );
    }

    pub fn state(&self) -> GameState {
        self.machine.state()
    }

    pub fn level(&self) -> u32 {
        self.machine.level()
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// Current inter-tick delay
    pub fn tick_interval(&self) -> std::time::Duration {
        self.speed.interval(&self.config)
    }

    /// Check if the game is active (physics running)
    pub fn is_active(&self) -> bool {
        self.machine.state() == GameState::Playing
    }

    /// Jump to a level and lay it out, keeping the current screen
    pub fn set_level(&mut self, level: u32) -> Result<(), TransitionError> {
        self.machine.set_level(level)?;
        self.create_game_objects();
        Ok(())
    }

    /// Apply one player action
    pub fn handle_action(&mut self, action: Action) -> Result<ActionOutcome, TransitionError> {
        match action {
            Action::MoveLeft | Action::MoveRight => {
                if !self.is_active() {
                    log::trace!("ignoring {:?} in {}", action, self.state());
                    return Ok(ActionOutcome::Ignored);
                }
                let direction = if action == Action::MoveLeft { -1.0 } else { 1.0 };
                CollisionEngine::move_bat(&mut self.bat, direction, &self.config);
                Ok(ActionOutcome::Applied)
            }
            Action::SetFast => {
                self.speed = Speed::Fast;
                Ok(ActionOutcome::Applied)
            }
            Action::SetNormal => {
                self.speed = Speed::Normal;
                Ok(ActionOutcome::Applied)
            }
            Action::Confirm => match self.machine.apply(Trigger::Confirm)? {
                Transition::Start => Ok(ActionOutcome::StartPlay),
                Transition::Advance { .. } => {
                    self.create_game_objects();
                    Ok(ActionOutcome::StartPlay)
                }
                Transition::Restart => {
                    self.scoreboard.reset();
                    self.create_game_objects();
                    Ok(ActionOutcome::StartPlay)
                }
                _ => Ok(ActionOutcome::Ignored),
            },
            Action::Cancel => match self.machine.apply(Trigger::Cancel)? {
                Transition::Exit => Ok(ActionOutcome::Exit),
                _ => Ok(ActionOutcome::Ignored),
            },
        }
    }

    /// Step the simulation forward by one tick.
    ///
    /// Outside of `Playing` nothing moves and no events are produced.
    pub fn step(&mut self) -> Vec<GameEvent> {
        if !self.is_active() {
            return Vec::new();
        }

        self.tick += 1;
        let mut events = CollisionEngine::tick(
            &mut self.ball,
            &self.bat,
            &mut self.bricks,
            &mut self.scoreboard,
            &self.config,
        );

        let trigger = if self.scoreboard.is_out_of_lives() {
            Some(Trigger::LivesExhausted)
        } else if self.bricks.live() == 0 {
            Some(Trigger::BricksCleared)
        } else {
            None
        };

        if let Some(trigger) = trigger {
            match self.machine.apply(trigger) {
                Ok(Transition::Lost) => events.push(GameEvent::GameOver {
                    score: self.scoreboard.score(),
                }),
                Ok(Transition::LevelComplete { level }) => {
                    events.push(GameEvent::LevelCleared { level })
                }
                Ok(other) => log::warn!("unexpected transition after tick: {:?}", other),
                Err(e) => log::warn!("terminal check rejected: {}", e),
            }
        }

        events
    }

    /// Create a snapshot of the current game state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            state: self.machine.state(),
            level: self.machine.level(),
            max_level: self.machine.max_level(),
            score: self.scoreboard.score(),
            lives: self.scoreboard.lives(),
            speed: self.speed,
            ball: self.ball.view(),
            bat: self.bat.view(),
            bricks: self
                .bricks
                .iter()
                .filter(|b| b.is_visible())
                .map(|b| BrickView {
                    rect: b.view(),
                    hit_count: b.hit_count(),
                })
                .collect(),
            live_bricks: self.bricks.live(),
            playfield: (self.config.width, self.config.height),
        }
    }

    /// Get a human-readable status string
    pub fn status_string(&self) -> &'static str {
        match self.machine.state() {
            GameState::Intro => "Press ENTER to start",
            GameState::Playing => "Playing",
            GameState::Won if self.machine.is_game_complete() => "Game complete!",
            GameState::Won => "Level complete! Press ENTER for the next level",
            GameState::GameOver => "Game over! ENTER to restart, ESC to quit",
        }
    }
}
