//! Side-effect hooks fulfilled outside the core (sound, effects).

use std::sync::{Arc, Mutex};

use crate::types::GameEvent;

/// Called by the simulation loop outside the shared-state lock.
///
/// All methods default to no-ops so implementors pick what they need.
pub trait GameHooks: Send + Sync {
    /// A brick was damaged or destroyed
    fn on_brick_hit(&self) {}

    /// The ball reached the bottom edge
    fn on_ball_lost_life(&self) {}

    /// First playing tick of the loop's lifetime
    fn play_background_loop(&self) {}
}

/// Hooks that do nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl GameHooks for NoopHooks {}

/// Route tick events to the matching hooks
pub fn dispatch(hooks: &dyn GameHooks, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::BrickDamaged { .. } | GameEvent::BrickDestroyed { .. } => {
                hooks.on_brick_hit()
            }
            GameEvent::LifeLost { .. } => hooks.on_ball_lost_life(),
            GameEvent::LevelCleared { .. } | GameEvent::GameOver { .. } => {}
        }
    }
}

/// A recorded hook invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookCall {
    BrickHit,
    BallLostLife,
    BackgroundLoop,
}

/// Hooks that remember every call, for tests and diagnostics
#[derive(Debug, Default, Clone)]
pub struct RecordingHooks {
    calls: Arc<Mutex<Vec<HookCall>>>,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls so far, oldest first
    pub fn calls(&self) -> Vec<HookCall> {
        if let Ok(calls) = self.calls.lock() {
            calls.clone()
        } else {
            Vec::new()
        }
    }

    pub fn count(&self, call: HookCall) -> usize {
        self.calls().iter().filter(|&&c| c == call).count()
    }

    fn record(&self, call: HookCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl GameHooks for RecordingHooks {
    fn on_brick_hit(&self) {
        self.record(HookCall::BrickHit);
    }

    fn on_ball_lost_life(&self) {
        self.record(HookCall::BallLostLife);
    }

    fn play_background_loop(&self) {
        self.record(HookCall::BackgroundLoop);
    }
}
