//! Axis-aligned rectangles that make up the playfield.

use crate::types::ObjectView;

/// A ball, bat or brick.
///
/// All collision geometry goes through [`GameObject::overlaps`]; callers never
/// compare raw coordinates themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct GameObject {
    /// Top-left corner
    pub x: f32,
    pub y: f32,
    width: f32,
    height: f32,
    visible: bool,
    /// Hits taken so far (bricks only)
    hit_count: u32,
    /// Horizontal / vertical direction, each +1 or -1 (ball only)
    dir_x: f32,
    dir_y: f32,
}

impl GameObject {
    /// Create a visible object with direction (+1, +1)
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        debug_assert!(width > 0.0 && height > 0.0, "object must have a size");
        GameObject {
            x,
            y,
            width,
            height,
            visible: true,
            hit_count: 0,
            dir_x: 1.0,
            dir_y: 1.0,
        }
    }

    /// Same object with the given directions (signs only are kept)
    pub fn with_direction(mut self, dir_x: f32, dir_y: f32) -> Self {
        self.dir_x = if dir_x < 0.0 { -1.0 } else { 1.0 };
        self.dir_y = if dir_y < 0.0 { -1.0 } else { 1.0 };
        self
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn direction(&self) -> (f32, f32) {
        (self.dir_x, self.dir_y)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn hit_count(&self) -> u32 {
        self.hit_count
    }

    pub fn increment_hit_count(&mut self) {
        self.hit_count += 1;
    }

    /// Translate by (dx, dy)
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    /// Translate `speed` units along the stored direction on both axes
    pub fn advance(&mut self, speed: f32) {
        self.move_by(self.dir_x * speed, self.dir_y * speed);
    }

    pub fn flip_horizontal(&mut self) {
        self.dir_x = -self.dir_x;
    }

    pub fn flip_vertical(&mut self) {
        self.dir_y = -self.dir_y;
    }

    /// AABB intersection test. Touching edges do not count as overlap.
    pub fn overlaps(&self, other: &GameObject) -> bool {
        !(self.right() <= other.left()
            || other.right() <= self.left()
            || self.bottom() <= other.top()
            || other.bottom() <= self.top())
    }

    /// Copy position and size for presentation
    pub fn view(&self) -> ObjectView {
        ObjectView {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}
