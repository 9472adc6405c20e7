//! Ball-tracking paddle controller.

use breakout_core::{Action, Config, GameState, Snapshot};

/// Why the autopilot stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    GameComplete,
    GameOver,
}

/// What to do after looking at a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send these actions in order (possibly none)
    Act(Vec<Action>),
    Finish(Finish),
}

#[derive(Debug, Clone, Copy)]
pub struct Autopilot {
    bat_step: f32,
    /// Upper bound on bat moves per decision
    max_moves: usize,
    restart_on_game_over: bool,
}

impl Autopilot {
    pub fn new(config: &Config, restart_on_game_over: bool) -> Self {
        // Enough moves to outrun the ball between two polls
        let max_moves = ((config.ball_speed * 4.0) / config.bat_step).ceil().max(1.0) as usize;

        Autopilot {
            bat_step: config.bat_step,
            max_moves,
            restart_on_game_over,
        }
    }

    pub fn next(&self, snapshot: &Snapshot) -> Command {
        match snapshot.state {
            GameState::Intro => Command::Act(vec![Action::Confirm]),
            GameState::Playing => Command::Act(self.track(snapshot)),
            GameState::Won if snapshot.game_complete() => Command::Finish(Finish::GameComplete),
            GameState::Won => Command::Act(vec![Action::Confirm]),
            GameState::GameOver if self.restart_on_game_over => Command::Act(vec![Action::Confirm]),
            GameState::GameOver => Command::Finish(Finish::GameOver),
        }
    }

    /// Centre the bat under the ball
    fn track(&self, snapshot: &Snapshot) -> Vec<Action> {
        let ball_centre = snapshot.ball.x + snapshot.ball.width / 2.0;
        let bat_centre = snapshot.bat.x + snapshot.bat.width / 2.0;
        let offset = ball_centre - bat_centre;

        let moves = ((offset.abs() / self.bat_step) as usize).min(self.max_moves);
        let action = if offset < 0.0 {
            Action::MoveLeft
        } else {
            Action::MoveRight
        };
        vec![action; moves]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breakout_core::{Game, ObjectView};

    fn snapshot_in(state: GameState) -> Snapshot {
        let mut snapshot = Game::new(Config::default()).unwrap().snapshot();
        snapshot.state = state;
        snapshot
    }

    #[test]
    fn test_confirms_on_screens() {
        let pilot = Autopilot::new(&Config::default(), false);
        assert_eq!(
            pilot.next(&snapshot_in(GameState::Intro)),
            Command::Act(vec![Action::Confirm])
        );
        assert_eq!(
            pilot.next(&snapshot_in(GameState::Won)),
            Command::Act(vec![Action::Confirm])
        );
    }

    #[test]
    fn test_finishes() {
        let pilot = Autopilot::new(&Config::default(), false);
        assert_eq!(
            pilot.next(&snapshot_in(GameState::GameOver)),
            Command::Finish(Finish::GameOver)
        );

        let mut complete = snapshot_in(GameState::Won);
        complete.level = complete.max_level;
        assert_eq!(pilot.next(&complete), Command::Finish(Finish::GameComplete));

        let restarting = Autopilot::new(&Config::default(), true);
        assert_eq!(
            restarting.next(&snapshot_in(GameState::GameOver)),
            Command::Act(vec![Action::Confirm])
        );
    }

    #[test]
    fn test_tracks_ball() {
        let pilot = Autopilot::new(&Config::default(), false);
        let mut snapshot = snapshot_in(GameState::Playing);
        snapshot.bat = ObjectView {
            x: 225.0,
            y: 740.0,
            width: 150.0,
            height: 7.5,
        };

        // Ball centred over the bat: hold still
        snapshot.ball.x = 285.0;
        assert_eq!(pilot.next(&snapshot), Command::Act(vec![]));

        // Ball 25 units right of centre: two steps
        snapshot.ball.x = 310.0;
        assert_eq!(
            pilot.next(&snapshot),
            Command::Act(vec![Action::MoveRight, Action::MoveRight])
        );

        // Far left: capped
        snapshot.ball.x = 20.0;
        match pilot.next(&snapshot) {
            Command::Act(actions) => {
                assert_eq!(actions.len(), pilot.max_moves);
                assert!(actions.iter().all(|&a| a == Action::MoveLeft));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
