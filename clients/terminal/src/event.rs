use breakout_core::Action;
use color_eyre::eyre::WrapErr;
use ratatui::crossterm::{
    event::{
        self, Event as CrosstermEvent, KeyEvent, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    queue,
    terminal::{disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement},
};
use std::{
    io::stdout,
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

/// Redraw rate of the client
const FRAME_RATE: f64 = 60.0;

/// Input and redraw events
#[derive(Clone, Debug)]
pub enum Event {
    /// Time to pick up the latest snapshot and redraw
    Frame,
    Key(KeyEvent),
    App(AppEvent),
}

#[derive(Clone, Debug)]
pub enum AppEvent {
    Quit,
    /// Forward a player action to the simulation
    Game(Action),
    /// New terminal width and height
    TerminalResize(u16, u16),
}

/// Raw-mode terminal input pump feeding one channel
pub struct EventHandler {
    sender: mpsc::Sender<Event>,
    receiver: mpsc::Receiver<Event>,
    keyboard_enhanced: bool,
}

impl EventHandler {
    pub fn new() -> color_eyre::Result<Self> {
        let (sender, receiver) = mpsc::channel();

        enable_raw_mode()?;

        // Disambiguated escape codes keep a lone ESC from swallowing the next key
        let keyboard_enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
        if keyboard_enhanced {
            queue!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
            )?;
        }

        let input = sender.clone();
        thread::spawn(move || {
            // stderr belongs to the TUI; a dead input thread just stops key events
            let _ = pump(input);
        });

        Ok(Self {
            sender,
            receiver,
            keyboard_enhanced,
        })
    }

    /// Block until the next event
    pub fn next(&self) -> color_eyre::Result<Event> {
        Ok(self.receiver.recv()?)
    }

    pub fn send(&mut self, app_event: AppEvent) {
        let _ = self.sender.send(Event::App(app_event));
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        if self.keyboard_enhanced {
            let _ = queue!(stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = disable_raw_mode();
    }
}

/// Read terminal input and emit frame events until the app side hangs up
fn pump(sender: mpsc::Sender<Event>) -> color_eyre::Result<()> {
    let frame_interval = Duration::from_secs_f64(1.0 / FRAME_RATE);
    let mut last_frame = Instant::now();

    loop {
        let timeout = frame_interval.saturating_sub(last_frame.elapsed());
        if timeout == Duration::ZERO {
            last_frame = Instant::now();
            if sender.send(Event::Frame).is_err() {
                return Ok(());
            }
        }

        if !event::poll(timeout).wrap_err("failed to poll for terminal input")? {
            continue;
        }
        let event = match event::read().wrap_err("failed to read terminal input")? {
            CrosstermEvent::Key(key) => Event::Key(key),
            CrosstermEvent::Resize(width, height) => {
                Event::App(AppEvent::TerminalResize(width, height))
            }
            // Mouse, focus and paste input are not used
            _ => continue,
        };
        if sender.send(event).is_err() {
            return Ok(());
        }
    }
}
