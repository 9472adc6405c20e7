//! Collision resolution for one simulation tick.
//!
//! Every contact flips one axis of the ball's direction. Walls flip the axis
//! facing them; bat and bricks always flip the vertical axis, whichever side
//! was struck.

use crate::level::BrickGrid;
use crate::object::GameObject;
use crate::scoreboard::Scoreboard;
use crate::types::{Config, GameEvent};

/// Ball-vs-world collision resolution
pub struct CollisionEngine;

impl CollisionEngine {
    /// Move the bat one step left (`direction < 0`) or right, clamped so both
    /// edges stay within the side borders.
    pub fn move_bat(bat: &mut GameObject, direction: f32, config: &Config) {
        let step = direction.signum() * config.bat_step;
        let target = (bat.x + step).clamp(config.bat_min_x(), config.bat_max_x());
        log::trace!("move bat {:+.1} -> x = {:.1}", step, target);
        bat.move_by(target - bat.x, 0.0);
    }

    /// Advance the ball and resolve walls, bat and bricks.
    ///
    /// Never fails; score and lives are updated in place and everything that
    /// happened is returned as events. Terminal conditions are left to the
    /// caller.
    pub fn tick(
        ball: &mut GameObject,
        bat: &GameObject,
        bricks: &mut BrickGrid,
        scoreboard: &mut Scoreboard,
        config: &Config,
    ) -> Vec<GameEvent> {
        let mut events = Vec::new();

        ball.advance(config.ball_speed);

        Self::resolve_walls(ball, scoreboard, config, &mut events);
        Self::resolve_bat(ball, bat);
        Self::resolve_bricks(ball, bricks, scoreboard, config, &mut events);

        events
    }

    /// Bounce off side and top walls; a bottom hit costs a life and respawns
    /// the ball at mid-height with a new horizontal heading.
    pub fn resolve_walls(
        ball: &mut GameObject,
        scoreboard: &mut Scoreboard,
        config: &Config,
        events: &mut Vec<GameEvent>,
    ) {
        let (dir_x, dir_y) = ball.direction();

        // Only flip when heading into the wall
        if ball.right() >= config.width - config.border_offset && dir_x > 0.0 {
            ball.flip_horizontal();
        }
        if ball.left() <= config.border_offset && dir_x < 0.0 {
            ball.flip_horizontal();
        }
        if ball.top() <= config.menu_offset && dir_y < 0.0 {
            ball.flip_vertical();
        }

        if ball.bottom() >= config.height - config.border_offset {
            ball.flip_vertical();
            scoreboard.add(config.bottom_miss_penalty);
            let lives = scoreboard.lose_life();

            ball.move_by(0.0, config.height / 2.0 - ball.y);
            ball.flip_horizontal();

            log::debug!("ball lost, {} lives left", lives);
            events.push(GameEvent::LifeLost { lives });
        }
    }

    /// Bat is a pure reflector for a falling ball. Returns true on contact.
    pub fn resolve_bat(ball: &mut GameObject, bat: &GameObject) -> bool {
        if ball.overlaps(bat) && ball.direction().1 > 0.0 {
            ball.flip_vertical();
            true
        } else {
            false
        }
    }

    /// Hit every visible brick the ball overlaps.
    ///
    /// Each brick is processed independently: an undamaged brick takes a hit
    /// and stays, a damaged one disappears. The ball flips vertically once
    /// per tick however many bricks it touched, so two bricks struck together
    /// still produce a bounce. Returns the number of bricks hit.
    pub fn resolve_bricks(
        ball: &mut GameObject,
        bricks: &mut BrickGrid,
        scoreboard: &mut Scoreboard,
        config: &Config,
        events: &mut Vec<GameEvent>,
    ) -> usize {
        let hits = bricks.overlapping(ball);

        for &index in &hits {
            let damaged = match bricks.get_mut(index) {
                Some(brick) if brick.hit_count() == 0 => {
                    brick.increment_hit_count();
                    true
                }
                Some(_) => false,
                None => continue,
            };

            if damaged {
                events.push(GameEvent::BrickDamaged { index });
            } else if bricks.destroy(index) {
                events.push(GameEvent::BrickDestroyed { index });
            }
            scoreboard.add(config.brick_hit_bonus);
        }

        if !hits.is_empty() {
            ball.flip_vertical();
        }
        hits.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::BrickLayout;
    use proptest::prelude::*;

    fn ball_at(x: f32, y: f32, dir_x: f32, dir_y: f32) -> GameObject {
        let config = Config::default();
        GameObject::new(x, y, config.ball_size, config.ball_size).with_direction(dir_x, dir_y)
    }

    fn default_bat() -> GameObject {
        let config = Config::default();
        GameObject::new(
            (config.width - config.bat_width) / 2.0,
            config.height - config.bat_floor_gap,
            config.bat_width,
            config.bat_height,
        )
    }

    #[test]
    fn test_bat_movement_is_clamped() {
        let config = Config::default();
        let mut bat = default_bat();

        for _ in 0..100 {
            CollisionEngine::move_bat(&mut bat, -1.0, &config);
        }
        assert_eq!(bat.left(), config.border_offset);

        for _ in 0..100 {
            CollisionEngine::move_bat(&mut bat, 1.0, &config);
        }
        assert_eq!(bat.right(), config.width - config.border_offset);

        CollisionEngine::move_bat(&mut bat, -1.0, &config);
        assert_eq!(bat.right(), config.width - config.border_offset - config.bat_step);
    }

    #[test]
    fn test_ball_moves_by_speed() {
        let config = Config::default();
        let mut ball = ball_at(300.0, 400.0, 1.0, -1.0);
        let mut bricks = BrickGrid::default();
        let mut board = Scoreboard::new(3);

        let events = CollisionEngine::tick(&mut ball, &default_bat(), &mut bricks, &mut board, &config);

        assert!(events.is_empty());
        assert_eq!((ball.x, ball.y), (305.0, 395.0));
    }

    #[test]
    fn test_side_walls_flip_horizontal() {
        let config = Config::default();
        let mut board = Scoreboard::new(3);
        let mut events = Vec::new();

        let mut ball = ball_at(551.0, 300.0, 1.0, 1.0);
        ball.advance(config.ball_speed);
        CollisionEngine::resolve_walls(&mut ball, &mut board, &config, &mut events);
        assert_eq!(ball.direction(), (-1.0, 1.0));

        let mut ball = ball_at(22.0, 300.0, -1.0, 1.0);
        ball.advance(config.ball_speed);
        CollisionEngine::resolve_walls(&mut ball, &mut board, &config, &mut events);
        assert_eq!(ball.direction(), (1.0, 1.0));
        assert!(events.is_empty());
    }

    #[test]
    fn test_wall_does_not_flip_ball_leaving_it() {
        let config = Config::default();
        let mut board = Scoreboard::new(3);
        let mut events = Vec::new();

        // Still past the right limit but already heading left
        let mut ball = ball_at(555.0, 300.0, -1.0, 1.0);
        CollisionEngine::resolve_walls(&mut ball, &mut board, &config, &mut events);
        assert_eq!(ball.direction(), (-1.0, 1.0));
    }

    #[test]
    fn test_top_wall_flips_vertical() {
        let config = Config::default();
        let mut board = Scoreboard::new(3);
        let mut events = Vec::new();

        let mut ball = ball_at(300.0, 42.0, 1.0, -1.0);
        ball.advance(config.ball_speed);
        CollisionEngine::resolve_walls(&mut ball, &mut board, &config, &mut events);
        assert_eq!(ball.direction(), (1.0, 1.0));
        assert_eq!(board.lives(), 3);
    }

    #[test]
    fn test_bottom_costs_life_and_respawns() {
        let config = Config::default();
        let mut board = Scoreboard::new(3);
        let mut bricks = BrickGrid::default();
        // Far from the bat horizontally
        let mut ball = ball_at(30.0, 748.0, 1.0, 1.0);

        let events =
            CollisionEngine::tick(&mut ball, &default_bat(), &mut bricks, &mut board, &config);

        assert_eq!(events, vec![GameEvent::LifeLost { lives: 2 }]);
        assert_eq!(board.lives(), 2);
        assert_eq!(board.score(), config.bottom_miss_penalty);
        assert_eq!(ball.y, config.height / 2.0);
        assert_eq!(ball.direction(), (-1.0, -1.0));
    }

    #[test]
    fn test_bat_reflects_ball() {
        let config = Config::default();
        let bat = default_bat();
        let mut board = Scoreboard::new(3);
        let mut bricks = BrickGrid::default();
        let mut ball = ball_at(bat.x + 20.0, bat.top() - config.ball_size - 2.0, 1.0, 1.0);

        let events = CollisionEngine::tick(&mut ball, &bat, &mut bricks, &mut board, &config);

        assert!(events.is_empty());
        assert_eq!(ball.direction(), (1.0, -1.0));
        assert_eq!(board.lives(), 3);
        assert_eq!(board.score(), 0);
    }

    #[test]
    fn test_bat_ignores_rising_ball() {
        let bat = default_bat();
        // Still overlapping the bat one tick after bouncing off it
        let mut ball = ball_at(bat.x + 20.0, bat.top() - 25.0, 1.0, -1.0);

        assert!(!CollisionEngine::resolve_bat(&mut ball, &bat));
        assert_eq!(ball.direction(), (1.0, -1.0));
    }

    #[test]
    fn test_brick_takes_two_hits() {
        let config = Config::default();
        let mut board = Scoreboard::new(3);
        let mut bricks = BrickGrid::new(vec![GameObject::new(200.0, 200.0, 100.0, 40.0)]);
        let mut events = Vec::new();

        // First hit: damaged, still visible
        let mut ball = ball_at(220.0, 235.0, 1.0, -1.0);
        let hits =
            CollisionEngine::resolve_bricks(&mut ball, &mut bricks, &mut board, &config, &mut events);
        assert_eq!(hits, 1);
        assert_eq!(ball.direction(), (1.0, 1.0));
        let brick = bricks.get(0).unwrap();
        assert!(brick.is_visible());
        assert_eq!(brick.hit_count(), 1);
        assert_eq!(bricks.live(), 1);
        assert_eq!(board.score(), config.brick_hit_bonus);
        assert_eq!(events, vec![GameEvent::BrickDamaged { index: 0 }]);

        // Second hit: gone
        events.clear();
        CollisionEngine::resolve_bricks(&mut ball, &mut bricks, &mut board, &config, &mut events);
        assert!(!bricks.get(0).unwrap().is_visible());
        assert_eq!(bricks.live(), 0);
        assert_eq!(board.score(), 2 * config.brick_hit_bonus);
        assert_eq!(events, vec![GameEvent::BrickDestroyed { index: 0 }]);

        // Invisible bricks no longer collide
        events.clear();
        let hits =
            CollisionEngine::resolve_bricks(&mut ball, &mut bricks, &mut board, &config, &mut events);
        assert_eq!(hits, 0);
        assert!(events.is_empty());
        assert_eq!(board.score(), 2 * config.brick_hit_bonus);
    }

    /// Two bricks struck in the same tick are both hit, but the ball only
    /// flips once, so it still bounces away.
    #[test]
    fn test_multiple_bricks_flip_once() {
        let config = Config::default();
        let mut board = Scoreboard::new(3);
        let mut bricks = BrickGrid::new(vec![
            GameObject::new(200.0, 200.0, 50.0, 40.0),
            GameObject::new(250.0, 200.0, 50.0, 40.0),
        ]);
        let mut events = Vec::new();
        let mut ball = ball_at(235.0, 235.0, -1.0, -1.0);

        let hits =
            CollisionEngine::resolve_bricks(&mut ball, &mut bricks, &mut board, &config, &mut events);

        assert_eq!(hits, 2);
        assert_eq!(ball.direction(), (-1.0, 1.0));
        assert_eq!(board.score(), 2 * config.brick_hit_bonus);
        assert_eq!(
            events,
            vec![
                GameEvent::BrickDamaged { index: 0 },
                GameEvent::BrickDamaged { index: 1 }
            ]
        );
    }

    #[test]
    fn test_brick_hit_ignores_side_of_impact() {
        let config = Config::default();
        let mut board = Scoreboard::new(3);
        let mut bricks = BrickGrid::new(vec![GameObject::new(200.0, 200.0, 50.0, 40.0)]);
        let mut events = Vec::new();
        // Clipping the brick's left side while moving right and down
        let mut ball = ball_at(172.0, 205.0, 1.0, 1.0);

        CollisionEngine::resolve_bricks(&mut ball, &mut bricks, &mut board, &config, &mut events);
        assert_eq!(ball.direction(), (1.0, -1.0));
    }

    proptest! {
        #[test]
        fn prop_ball_stays_in_playfield(
            x in 20.0f32..550.0,
            y in 40.0f32..740.0,
            right in any::<bool>(),
            down in any::<bool>(),
            moves in proptest::collection::vec(-1i8..=1, 0..400),
        ) {
            let config = Config::default();
            let mut ball = ball_at(x, y, if right { 1.0 } else { -1.0 }, if down { 1.0 } else { -1.0 });
            let mut bat = default_bat();
            let mut bricks = BrickLayout::from_config(&config).generate(3, 7);
            let mut board = Scoreboard::new(u32::MAX);

            for step in 0..1200usize {
                if let Some(&m) = moves.get(step % moves.len().max(1)) {
                    if m != 0 {
                        CollisionEngine::move_bat(&mut bat, m as f32, &config);
                    }
                }
                CollisionEngine::tick(&mut ball, &bat, &mut bricks, &mut board, &config);

                prop_assert!(ball.left() >= 0.0 && ball.right() <= config.width);
                prop_assert!(ball.top() >= 0.0 && ball.bottom() <= config.height);
            }
        }

        #[test]
        fn prop_bat_stays_within_borders(moves in proptest::collection::vec(any::<bool>(), 0..500)) {
            let config = Config::default();
            let mut bat = default_bat();

            for right in moves {
                CollisionEngine::move_bat(&mut bat, if right { 1.0 } else { -1.0 }, &config);
                prop_assert!(bat.left() >= config.border_offset);
                prop_assert!(bat.right() <= config.width - config.border_offset);
            }
        }

        #[test]
        fn prop_live_bricks_match_visible(x in 40.0f32..530.0, y in 160.0f32..360.0) {
            let config = Config::default();
            let mut bricks = BrickLayout::from_config(&config).generate(4, 9);
            let mut board = Scoreboard::new(3);
            let mut ball = ball_at(x, y, 1.0, 1.0);
            let mut events = Vec::new();

            for _ in 0..3 {
                CollisionEngine::resolve_bricks(&mut ball, &mut bricks, &mut board, &config, &mut events);
                let visible = bricks.iter().filter(|b| b.is_visible()).count();
                prop_assert_eq!(visible, bricks.live());
            }
        }
    }
}
