//! Screen flow: Intro -> Playing -> Won / GameOver -> Playing.
//!
//! [`GameStateMachine`] is the only writer of the current [`GameState`] and
//! level number. Every transition is checked against the current state and
//! invalid ones are returned as [`TransitionError`] instead of being dropped.

use std::fmt;

use crate::types::GameState;

/// Inputs the machine reacts to
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Trigger {
    Confirm,
    Cancel,
    LivesExhausted,
    BricksCleared,
}

/// A transition that was accepted
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Intro -> Playing on the current level
    Start,
    /// Won -> Playing on the next level, score and lives carried over
    Advance { level: u32 },
    /// GameOver -> Playing on level 1 with a fresh scoreboard
    Restart,
    /// GameOver -> leave the game
    Exit,
    /// Playing -> Won
    LevelComplete { level: u32 },
    /// Playing -> GameOver
    Lost,
}

/// Rejected transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// Trigger makes no sense in this state
    InvalidTransition { from: GameState, trigger: Trigger },
    /// Confirm on the game-complete screen
    FinalLevelComplete,
    /// Level number outside the supported range
    InvalidLevel(u32),
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::InvalidTransition { from, trigger } => {
                write!(f, "Cannot apply {:?} while in {}", trigger, from)
            }
            TransitionError::FinalLevelComplete => write!(f, "Final level already complete"),
            TransitionError::InvalidLevel(level) => write!(f, "Invalid level: {}", level),
        }
    }
}

impl std::error::Error for TransitionError {}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GameStateMachine {
    state: GameState,
    level: u32,
    max_level: u32,
}

impl GameStateMachine {
    /// Start on the intro screen at level 1
    pub fn new(max_level: u32) -> Self {
        GameStateMachine {
            state: GameState::Intro,
            level: 1,
            max_level,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Won on the last level
    pub fn is_game_complete(&self) -> bool {
        self.state == GameState::Won && self.level >= self.max_level
    }

    /// Jump to a level without changing the screen
    pub fn set_level(&mut self, level: u32) -> Result<(), TransitionError> {
        if level == 0 || level > self.max_level {
            return Err(TransitionError::InvalidLevel(level));
        }
        self.level = level;
        Ok(())
    }

    /// Apply a trigger, returning the accepted transition
    pub fn apply(&mut self, trigger: Trigger) -> Result<Transition, TransitionError> {
        let transition = match (self.state, trigger) {
            (GameState::Intro, Trigger::Confirm) => {
                self.state = GameState::Playing;
                Transition::Start
            }
            (GameState::Won, Trigger::Confirm) => {
                if self.level >= self.max_level {
                    return Err(TransitionError::FinalLevelComplete);
                }
                self.set_level(self.level + 1)?;
                self.state = GameState::Playing;
                Transition::Advance { level: self.level }
            }
            (GameState::GameOver, Trigger::Confirm) => {
                self.level = 1;
                self.state = GameState::Playing;
                Transition::Restart
            }
            (GameState::GameOver, Trigger::Cancel) => Transition::Exit,
            (GameState::Playing, Trigger::LivesExhausted) => {
                self.state = GameState::GameOver;
                Transition::Lost
            }
            (GameState::Playing, Trigger::BricksCleared) => {
                self.state = GameState::Won;
                Transition::LevelComplete { level: self.level }
            }
            (from, trigger) => {
                return Err(TransitionError::InvalidTransition { from, trigger });
            }
        };

        log::debug!(
            "state transition {:?} -> {} (level {})",
            transition,
            self.state,
            self.level
        );
        Ok(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_intro() {
        let machine = GameStateMachine::new(5);
        assert_eq!(machine.state(), GameState::Intro);
        assert_eq!(machine.level(), 1);
    }

    #[test]
    fn test_intro_to_playing() {
        let mut machine = GameStateMachine::new(5);
        assert_eq!(machine.apply(Trigger::Confirm), Ok(Transition::Start));
        assert_eq!(machine.state(), GameState::Playing);
    }

    #[test]
    fn test_playing_to_won_and_advance() {
        let mut machine = GameStateMachine::new(5);
        machine.apply(Trigger::Confirm).unwrap();

        assert_eq!(
            machine.apply(Trigger::BricksCleared),
            Ok(Transition::LevelComplete { level: 1 })
        );
        assert_eq!(machine.state(), GameState::Won);

        assert_eq!(
            machine.apply(Trigger::Confirm),
            Ok(Transition::Advance { level: 2 })
        );
        assert_eq!(machine.state(), GameState::Playing);
        assert_eq!(machine.level(), 2);
    }

    #[test]
    fn test_no_advance_past_max_level() {
        let mut machine = GameStateMachine::new(5);
        machine.apply(Trigger::Confirm).unwrap();
        machine.set_level(5).unwrap();
        machine.apply(Trigger::BricksCleared).unwrap();
        assert!(machine.is_game_complete());

        assert_eq!(
            machine.apply(Trigger::Confirm),
            Err(TransitionError::FinalLevelComplete)
        );
        assert_eq!(machine.state(), GameState::Won);
        assert_eq!(machine.level(), 5);
    }

    #[test]
    fn test_game_over_restart_and_exit() {
        let mut machine = GameStateMachine::new(5);
        machine.apply(Trigger::Confirm).unwrap();
        machine.set_level(3).unwrap();
        assert_eq!(machine.apply(Trigger::LivesExhausted), Ok(Transition::Lost));
        assert_eq!(machine.state(), GameState::GameOver);

        assert_eq!(machine.apply(Trigger::Cancel), Ok(Transition::Exit));
        assert_eq!(machine.state(), GameState::GameOver);

        assert_eq!(machine.apply(Trigger::Confirm), Ok(Transition::Restart));
        assert_eq!(machine.state(), GameState::Playing);
        assert_eq!(machine.level(), 1);
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        let mut machine = GameStateMachine::new(5);

        assert!(matches!(
            machine.apply(Trigger::Cancel),
            Err(TransitionError::InvalidTransition {
                from: GameState::Intro,
                trigger: Trigger::Cancel
            })
        ));
        assert!(machine.apply(Trigger::BricksCleared).is_err());
        assert_eq!(machine.state(), GameState::Intro);

        machine.apply(Trigger::Confirm).unwrap();
        assert!(machine.apply(Trigger::Confirm).is_err());
        assert!(machine.apply(Trigger::Cancel).is_err());
        assert_eq!(machine.state(), GameState::Playing);
    }

    #[test]
    fn test_set_level_bounds() {
        let mut machine = GameStateMachine::new(5);
        assert_eq!(machine.set_level(0), Err(TransitionError::InvalidLevel(0)));
        assert_eq!(machine.set_level(6), Err(TransitionError::InvalidLevel(6)));
        assert_eq!(machine.level(), 1);
        assert_eq!(machine.set_level(5), Ok(()));
        assert_eq!(machine.level(), 5);
    }

    #[test]
    fn test_error_display() {
        let err = TransitionError::InvalidTransition {
            from: GameState::Playing,
            trigger: Trigger::Confirm,
        };
        assert_eq!(err.to_string(), "Cannot apply Confirm while in Playing");
        assert_eq!(
            TransitionError::InvalidLevel(9).to_string(),
            "Invalid level: 9"
        );
    }
}
