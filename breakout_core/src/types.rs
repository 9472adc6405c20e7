//! Core types and constants for the brick-breaker simulation.

use std::fmt;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Simulation tick counter type
pub type Tick = u64;

/// Game screen / phase
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GameState {
    /// Title screen, waiting for confirm
    Intro,
    /// Active gameplay
    Playing,
    /// All bricks of the current level cleared
    Won,
    /// Lives exhausted
    GameOver,
}

impl GameState {
    pub fn as_str(self) -> &'static str {
        match self {
            GameState::Intro => "Intro",
            GameState::Playing => "Playing",
            GameState::Won => "Won",
            GameState::GameOver => "Game over",
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inter-tick delay preset
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Speed {
    #[default]
    Normal,
    Fast,
}

impl Speed {
    /// Delay between two ticks for this preset
    pub fn interval(self, config: &Config) -> Duration {
        match self {
            Speed::Normal => config.normal_interval,
            Speed::Fast => config.fast_interval,
        }
    }
}

/// Errors raised while validating a [`Config`]
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Playfield width or height is not positive
    EmptyPlayfield,
    /// No room left for the brick band
    PlayfieldTooSmall(String),
    /// Bat does not fit between the borders
    BatTooWide,
    /// Ball would never move
    ZeroBallSpeed,
    /// Game would start already lost
    NoLives,
    /// At least one level is required
    NoLevels,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyPlayfield => write!(f, "Playfield dimensions must be positive"),
            ConfigError::PlayfieldTooSmall(msg) => write!(f, "Playfield too small: {}", msg),
            ConfigError::BatTooWide => write!(f, "Bat is wider than the playable area"),
            ConfigError::ZeroBallSpeed => write!(f, "Ball speed must be positive"),
            ConfigError::NoLives => write!(f, "Starting lives must be at least 1"),
            ConfigError::NoLevels => write!(f, "Max level must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Game configuration
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Config {
    /// Playfield width
    pub width: f32,
    /// Playfield height (y grows downward)
    pub height: f32,
    /// Side and bottom border offset
    pub border_offset: f32,
    /// Top wall offset, leaves room for the HUD
    pub menu_offset: f32,
    /// Ball side length
    pub ball_size: f32,
    /// Ball movement per axis per tick
    pub ball_speed: f32,
    /// Bat dimensions
    pub bat_width: f32,
    pub bat_height: f32,
    /// Distance from the bottom of the playfield to the bat's top edge
    pub bat_floor_gap: f32,
    /// Bat movement per MoveLeft/MoveRight
    pub bat_step: f32,
    /// Horizontal margin left and right of the brick grid
    pub brick_margin_x: f32,
    /// Y of the first brick row
    pub brick_top_offset: f32,
    /// Subtracted from two thirds of the height to size the brick band
    pub brick_vertical_offset: f32,
    /// Score for every brick hit
    pub brick_hit_bonus: i32,
    /// Score change when the ball reaches the bottom edge
    pub bottom_miss_penalty: i32,
    /// Lives on every (re)creation of the game objects
    pub starting_lives: u32,
    /// Highest playable level
    pub max_level: u32,
    /// Inter-tick delays
    pub normal_interval: Duration,
    pub fast_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: 600.0,
            height: 800.0,
            border_offset: 20.0,
            menu_offset: 40.0,
            ball_size: 30.0,
            ball_speed: 5.0,
            bat_width: 150.0,  // three brick widths
            bat_height: 7.5,   // quarter brick height
            bat_floor_gap: 60.0,
            bat_step: 10.0,
            brick_margin_x: 40.0,
            brick_top_offset: 160.0,
            brick_vertical_offset: 320.0,
            brick_hit_bonus: 50,
            bottom_miss_penalty: -200,
            starting_lives: 3,
            max_level: 5,
            normal_interval: Duration::from_millis(3),
            fast_interval: Duration::from_millis(1),
        }
    }
}

impl Config {
    /// Check that the configuration describes a playable field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(ConfigError::EmptyPlayfield);
        }
        if self.width <= 2.0 * self.brick_margin_x {
            return Err(ConfigError::PlayfieldTooSmall(format!(
                "width {} leaves no room between brick margins of {}",
                self.width, self.brick_margin_x
            )));
        }
        if self.height * 2.0 / 3.0 <= self.brick_vertical_offset {
            return Err(ConfigError::PlayfieldTooSmall(format!(
                "height {} leaves no room for the brick band",
                self.height
            )));
        }
        if self.bat_width <= 0.0
            || self.bat_height <= 0.0
            || self.bat_width > self.width - 2.0 * self.border_offset
        {
            return Err(ConfigError::BatTooWide);
        }
        if self.ball_speed <= 0.0 || self.ball_size <= 0.0 {
            return Err(ConfigError::ZeroBallSpeed);
        }
        if self.starting_lives == 0 {
            return Err(ConfigError::NoLives);
        }
        if self.max_level == 0 {
            return Err(ConfigError::NoLevels);
        }
        Ok(())
    }

    /// Smallest x the bat's left edge may reach
    pub fn bat_min_x(&self) -> f32 {
        self.border_offset
    }

    /// Largest x the bat's left edge may reach
    pub fn bat_max_x(&self) -> f32 {
        self.width - self.border_offset - self.bat_width
    }
}

/// Abstract player input, decoupled from raw key codes
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SetFast,
    SetNormal,
    Confirm,
    Cancel,
}

impl Action {
    /// Decode a compact action code. Unknown codes yield `None`.
    pub fn from_code(code: u8) -> Option<Action> {
        match code {
            b'<' => Some(Action::MoveLeft),
            b'>' => Some(Action::MoveRight),
            b'f' => Some(Action::SetFast),
            b'n' => Some(Action::SetNormal),
            b'\r' => Some(Action::Confirm),
            0x1b => Some(Action::Cancel),
            _ => None,
        }
    }
}

/// What the caller should do after an action was applied
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Nothing beyond the state change itself
    Applied,
    /// Input had no effect in the current state
    Ignored,
    /// A new round begins; the loop must be (re)started
    StartPlay,
    /// The player asked to leave from the game-over screen
    Exit,
}

/// Things that happened during one tick
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// First hit on a brick, it stays on the field
    BrickDamaged { index: usize },
    /// Second hit on a brick, it is gone
    BrickDestroyed { index: usize },
    /// Ball reached the bottom edge
    LifeLost { lives: u32 },
    /// Last brick of the level destroyed
    LevelCleared { level: u32 },
    /// Lives exhausted
    GameOver { score: i32 },
}

/// Position and size of a rectangle, copied out for presentation
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectView {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A visible brick as seen by presentation
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BrickView {
    pub rect: ObjectView,
    pub hit_count: u32,
}

/// Immutable copy of the simulation, taken under the shared-state lock
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Snapshot {
    pub tick: Tick,
    pub state: GameState,
    pub level: u32,
    pub max_level: u32,
    pub score: i32,
    pub lives: u32,
    pub speed: Speed,
    pub ball: ObjectView,
    pub bat: ObjectView,
    /// Only bricks that are still visible
    pub bricks: Vec<BrickView>,
    pub live_bricks: usize,
    pub playfield: (f32, f32),
}

impl Snapshot {
    /// Won on the last level: the game-complete screen
    pub fn game_complete(&self) -> bool {
        self.state == GameState::Won && self.level >= self.max_level
    }
}
