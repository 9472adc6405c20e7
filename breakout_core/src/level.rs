//! Level table and deterministic brick layout.

use crate::object::GameObject;
use crate::types::Config;

/// Grid dimensions for one level
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Level {
    pub number: u32,
    pub rows: u32,
    pub cols: u32,
}

impl Level {
    /// Look up a level. Numbers outside `1..=max_level` are rejected.
    ///
    /// Level `n` is `n` rows by `2n + 1` columns.
    pub fn new(number: u32, max_level: u32) -> Option<Level> {
        if number == 0 || number > max_level {
            return None;
        }
        Some(Level {
            number,
            rows: number,
            cols: 2 * number + 1,
        })
    }

    pub fn brick_count(&self) -> usize {
        (self.rows * self.cols) as usize
    }

    /// Build this level's bricks for the configured playfield
    pub fn bricks(&self, config: &Config) -> BrickGrid {
        BrickLayout::from_config(config).generate(self.rows, self.cols)
    }
}

/// Geometry used to place bricks inside the playfield
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BrickLayout {
    pub playfield_width: f32,
    pub playfield_height: f32,
    pub margin_x: f32,
    pub top_offset: f32,
    pub vertical_offset: f32,
}

impl BrickLayout {
    pub fn from_config(config: &Config) -> Self {
        BrickLayout {
            playfield_width: config.width,
            playfield_height: config.height,
            margin_x: config.brick_margin_x,
            top_offset: config.brick_top_offset,
            vertical_offset: config.brick_vertical_offset,
        }
    }

    /// Size of a single brick for a `rows` x `cols` grid
    pub fn brick_size(&self, rows: u32, cols: u32) -> (f32, f32) {
        let width = (self.playfield_width - 2.0 * self.margin_x) / cols as f32;
        let height = (self.playfield_height * 2.0 / 3.0 - self.vertical_offset) / rows as f32;
        (width, height)
    }

    /// Lay out `rows` x `cols` visible, undamaged bricks, column by column.
    pub fn generate(&self, rows: u32, cols: u32) -> BrickGrid {
        let (width, height) = self.brick_size(rows, cols);
        let mut bricks = Vec::with_capacity((rows * cols) as usize);

        for col in 0..cols {
            for row in 0..rows {
                bricks.push(GameObject::new(
                    col as f32 * width + self.margin_x,
                    row as f32 * height + self.top_offset,
                    width,
                    height,
                ));
            }
        }

        log::debug!(
            "generated {}x{} bricks ({:.1} x {:.1})",
            rows,
            cols,
            width,
            height
        );
        BrickGrid::new(bricks)
    }
}

/// Bricks of the current level plus the number still on the field.
///
/// `live()` always equals the number of visible bricks; the only way to hide
/// a brick is [`BrickGrid::destroy`], which decrements the counter once.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BrickGrid {
    bricks: Vec<GameObject>,
    live: usize,
}

impl BrickGrid {
    pub fn new(bricks: Vec<GameObject>) -> Self {
        let live = bricks.iter().filter(|b| b.is_visible()).count();
        BrickGrid { bricks, live }
    }

    pub fn len(&self) -> usize {
        self.bricks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bricks.is_empty()
    }

    /// Bricks still on the field
    pub fn live(&self) -> usize {
        self.live
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameObject> {
        self.bricks.iter()
    }

    pub fn get(&self, index: usize) -> Option<&GameObject> {
        self.bricks.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut GameObject> {
        self.bricks.get_mut(index)
    }

    /// Indices of visible bricks overlapping `other`, in layout order
    pub fn overlapping(&self, other: &GameObject) -> Vec<usize> {
        self.bricks
            .iter()
            .enumerate()
            .filter(|(_, brick)| brick.is_visible() && brick.overlaps(other))
            .map(|(i, _)| i)
            .collect()
    }

    /// Hide a visible brick. Returns false if it was already gone.
    pub fn destroy(&mut self, index: usize) -> bool {
        match self.bricks.get_mut(index) {
            Some(brick) if brick.is_visible() => {
                brick.set_visible(false);
                self.live -= 1;
                true
            }
            _ => false,
        }
    }
}
