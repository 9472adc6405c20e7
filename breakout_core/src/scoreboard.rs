//! Score and lives.

/// Score may go negative through penalties; lives never drop below zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Scoreboard {
    score: i32,
    lives: u32,
    starting_lives: u32,
}

impl Scoreboard {
    pub fn new(starting_lives: u32) -> Self {
        Scoreboard {
            score: 0,
            lives: starting_lives,
            starting_lives,
        }
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn starting_lives(&self) -> u32 {
        self.starting_lives
    }

    pub fn add(&mut self, points: i32) {
        self.score = self.score.saturating_add(points);
    }

    /// Take one life. Returns the lives left.
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    pub fn is_out_of_lives(&self) -> bool {
        self.lives == 0
    }

    /// Back to full lives, score untouched (new level)
    pub fn refill_lives(&mut self) {
        self.lives = self.starting_lives;
    }

    /// Zero score and full lives (full restart)
    pub fn reset(&mut self) {
        self.score = 0;
        self.refill_lives();
    }
}
