//! Terminal client for breakout_core.

mod app;
mod event;
mod ui;

use app::App;
use breakout_core::Config;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let terminal = ratatui::init();
    let result = App::new(Config::default()).and_then(|app| app.run(terminal));
    ratatui::restore();
    result
}
