//! Breakout core game engine - brick-breaker simulation with a background tick loop

pub mod game;
pub mod hooks;
pub mod level;
pub mod object;
pub mod physics;
pub mod scoreboard;
pub mod simulation;
pub mod state;
pub mod types;

// JSON snapshots - only compiled when serde feature is enabled
#[cfg(feature = "serde")]
pub mod serialization;

pub use game::Game;
pub use hooks::{GameHooks, NoopHooks, RecordingHooks};
pub use level::{BrickGrid, BrickLayout, Level};
pub use object::GameObject;
pub use physics::CollisionEngine;
pub use scoreboard::Scoreboard;
pub use simulation::{LoopError, SharedGame, SimulationLoop, SnapshotReceiver};
pub use state::{GameStateMachine, Transition, TransitionError, Trigger};
pub use types::*;

#[cfg(test)]
mod level_progression_tests {
    use super::*;

    /// Destroy every brick through real collisions, aiming the ball from below
    fn clear_level(game: &mut Game) {
        let size = game.config.ball_size;
        for index in 0..game.bricks.len() {
            for _ in 0..2 {
                let Some(brick) = game.bricks.get(index) else {
                    break;
                };
                if !brick.is_visible() {
                    break;
                }
                let (x, y) = (brick.x + 1.0, brick.bottom() - 1.0);
                game.ball = GameObject::new(x, y, size, size).with_direction(1.0, -1.0);
                game.step();
            }
        }
    }

    #[test]
    fn test_brick_counts_per_level() {
        let config = Config::default();
        let expected = [(1, 1, 3), (2, 2, 5), (3, 3, 7), (4, 4, 9), (5, 5, 11)];

        for (number, rows, cols) in expected {
            let level = Level::new(number, config.max_level).unwrap();
            assert_eq!((level.rows, level.cols), (rows, cols));
            assert_eq!(level.brick_count(), (rows * cols) as usize);
            assert_eq!(level.bricks(&config).live(), level.brick_count());
        }
    }

    #[test]
    fn test_play_through_every_level() {
        let mut game = Game::new(Config::default()).unwrap();
        game.handle_action(Action::Confirm).unwrap();

        for level in 1..=game.config.max_level {
            assert_eq!(game.level(), level);
            assert_eq!(game.state(), GameState::Playing);

            let bricks = game.bricks.len();
            let score_before = game.scoreboard.score();
            clear_level(&mut game);

            assert_eq!(game.state(), GameState::Won, "level {} not won", level);
            assert_eq!(game.bricks.live(), 0);
            assert!(game.snapshot().bricks.is_empty());
            assert!(game.scoreboard.score() >= score_before + 2 * 50 * bricks as i32);

            if level < game.config.max_level {
                assert_eq!(
                    game.handle_action(Action::Confirm),
                    Ok(ActionOutcome::StartPlay)
                );
            }
        }

        let snapshot = game.snapshot();
        assert!(snapshot.game_complete());
        assert_eq!(snapshot.level, 5);
        assert!(game.handle_action(Action::Confirm).is_err());
    }
}
