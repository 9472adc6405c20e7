use crate::app::{App, MIN_GAME_HEIGHT, MIN_GAME_WIDTH};
use breakout_core::{GameState, ObjectView, Snapshot, Speed};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph, Widget},
};
use std::ops::Range;

/// Height/width ratio of a terminal cell
const CHAR_ASPECT_RATIO: f32 = 0.5;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // HUD
                Constraint::Min(5),    // Field
                Constraint::Length(3), // Controls
            ])
            .split(area);

        self.render_hud(chunks[0], buf);

        if self.ui_paused {
            self.render_resize_notice(chunks[1], buf);
        } else if self.snapshot.state == GameState::Playing {
            self.render_field(chunks[1], buf);
        } else {
            self.render_screen(chunks[1], buf);
        }

        self.render_controls(chunks[2], buf);
    }
}

impl App {
    fn render_hud(&self, area: Rect, buf: &mut Buffer) {
        let snapshot = &self.snapshot;
        let hearts = "♥ ".repeat(snapshot.lives as usize);
        let speed = match snapshot.speed {
            Speed::Normal => "normal",
            Speed::Fast => "fast",
        };

        let hud = Line::from(vec![
            Span::raw(format!("Level {}/{}   ", snapshot.level, snapshot.max_level)),
            Span::styled(
                format!("Score {}   ", snapshot.score),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled(hearts, Style::default().fg(Color::Red)),
            Span::raw(format!("  Bricks {}   Speed {}", snapshot.live_bricks, speed)),
        ]);

        let border = if self.life_flash.active() {
            Color::Red
        } else {
            Color::Cyan
        };
        Paragraph::new(hud)
            .alignment(Alignment::Center)
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(border))
                    .title("Breakout")
                    .title_alignment(Alignment::Center),
            )
            .render(area, buf);
    }

    fn render_resize_notice(&self, area: Rect, buf: &mut Buffer) {
        let message = format!(
            "Terminal too small!\n\nMinimum required: {}×{}\nCurrent size: {}×{}",
            MIN_GAME_WIDTH, MIN_GAME_HEIGHT, self.terminal_size.0, self.terminal_size.1
        );

        Paragraph::new(message)
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center)
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title("Resize Required")
                    .title_alignment(Alignment::Center),
            )
            .render(area, buf);
    }

    /// Intro, level complete, game complete and game over screens
    fn render_screen(&self, area: Rect, buf: &mut Buffer) {
        let snapshot = &self.snapshot;
        let (title, color, text) = match snapshot.state {
            GameState::Intro => (
                "Breakout",
                Color::Cyan,
                "Clear every brick. Each brick takes two hits.\n\n\
                 Press ENTER to start"
                    .to_string(),
            ),
            GameState::Won if snapshot.game_complete() => (
                "Game Complete",
                Color::Green,
                format!(
                    "All {} levels cleared!\n\nFinal score: {}\n\nPress Q to quit",
                    snapshot.max_level, snapshot.score
                ),
            ),
            GameState::Won => (
                "Level Complete",
                Color::Green,
                format!(
                    "Level {} cleared with {} points\n\nPress ENTER for level {}",
                    snapshot.level,
                    snapshot.score,
                    snapshot.level + 1
                ),
            ),
            GameState::GameOver => (
                "Game Over",
                Color::Red,
                format!(
                    "Final score: {}\n\nENTER: play again   ESC: quit",
                    snapshot.score
                ),
            ),
            GameState::Playing => ("", Color::White, String::new()),
        };

        let inner_height = area.height.saturating_sub(2);
        let lines = text.lines().count() as u16;
        let padding = "\n".repeat((inner_height.saturating_sub(lines) / 2) as usize);

        Paragraph::new(format!("{}{}", padding, text))
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title(title)
                    .title_alignment(Alignment::Center),
            )
            .render(area, buf);
    }

    fn render_field(&self, area: Rect, buf: &mut Buffer) {
        let available_width = area.width.saturating_sub(2) as usize;
        let available_height = area.height.saturating_sub(2) as usize;
        let (cols, rows) = field_size(self.snapshot.playfield, available_width, available_height);
        if cols == 0 || rows == 0 {
            return;
        }

        let grid = FieldGrid::from_snapshot(&self.snapshot, cols, rows, self.brick_flash.active());
        let field = Rect {
            x: area.x + (area.width.saturating_sub(cols as u16 + 2)) / 2,
            y: area.y,
            width: (cols as u16 + 2).min(area.width),
            height: (rows as u16 + 2).min(area.height),
        };

        Paragraph::new(grid.lines())
            .block(Block::bordered().border_type(BorderType::Rounded))
            .render(field, buf);
    }

    fn render_controls(&self, area: Rect, buf: &mut Buffer) {
        let (text, color) = match &self.message {
            Some(message) => (message.clone(), Color::Yellow),
            None => (
                "←/→ move   F fast   N normal   ENTER confirm   ESC cancel   Q quit".to_string(),
                Color::DarkGray,
            ),
        };

        Paragraph::new(text)
            .style(Style::default().fg(color))
            .alignment(Alignment::Center)
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title("Controls")
                    .title_alignment(Alignment::Center),
            )
            .render(area, buf);
    }
}

/// Largest cell grid that fits the area and keeps the playfield's proportions
fn field_size(playfield: (f32, f32), max_cols: usize, max_rows: usize) -> (usize, usize) {
    let (width, height) = playfield;
    let ratio = height / width * CHAR_ASPECT_RATIO;

    let rows = (max_cols as f32 * ratio).round() as usize;
    if rows <= max_rows {
        (max_cols, rows)
    } else {
        let cols = (max_rows as f32 / ratio).round() as usize;
        (cols.min(max_cols), max_rows)
    }
}

/// Cells covered by a rectangle; always at least one cell per axis
fn cell_span(start: f32, len: f32, extent: f32, cells: usize) -> Range<usize> {
    let scale = cells as f32 / extent;
    let first = ((start * scale).floor().max(0.0) as usize).min(cells.saturating_sub(1));
    let last = (((start + len) * scale).ceil() as usize).clamp(first + 1, cells);
    first..last
}

/// Coloured character grid for one frame
struct FieldGrid {
    cols: usize,
    cells: Vec<(char, Color)>,
}

impl FieldGrid {
    fn from_snapshot(snapshot: &Snapshot, cols: usize, rows: usize, flash: bool) -> Self {
        let mut grid = FieldGrid {
            cols,
            cells: vec![(' ', Color::Reset); cols * rows],
        };
        let (width, height) = snapshot.playfield;
        let mut fill = |rect: &ObjectView, ch: char, color: Color| {
            let xs = cell_span(rect.x, rect.width, width, cols);
            let ys = cell_span(rect.y, rect.height, height, rows);
            for y in ys {
                for x in xs.clone() {
                    grid.cells[y * cols + x] = (ch, color);
                }
            }
        };

        for (i, brick) in snapshot.bricks.iter().enumerate() {
            // Alternate shades so neighbouring bricks stay distinguishable
            let color = match (brick.hit_count, i % 2) {
                (0, 0) => Color::Blue,
                (0, _) => Color::LightBlue,
                (_, 0) => Color::Red,
                _ => Color::LightRed,
            };
            let color = if flash && brick.hit_count > 0 {
                Color::White
            } else {
                color
            };
            fill(&brick.rect, '█', color);
        }
        fill(&snapshot.bat, '▀', Color::Green);
        fill(&snapshot.ball, '●', Color::Yellow);

        grid
    }

    fn lines(&self) -> Vec<Line<'static>> {
        self.cells
            .chunks(self.cols)
            .map(|row| {
                Line::from(
                    row.iter()
                        .map(|&(ch, color)| Span::styled(ch.to_string(), Style::default().fg(color)))
                        .collect::<Vec<_>>(),
                )
            })
            .collect()
    }
}
