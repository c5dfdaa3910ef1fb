//! Beat scheduling
//!
//! The host owns the loop and feeds elapsed time in; the clock answers
//! whether a beat is due. At most one beat fires per update, so a stalled
//! host never triggers a burst of catch-up beats.

use crate::consts::{DEFAULT_BPM, MAX_BPM, MIN_BPM};

/// Seconds between beats at `bpm`
pub fn beat_interval(bpm: u32) -> f32 {
    60.0 / bpm.clamp(MIN_BPM, MAX_BPM) as f32
}

/// Fixed-tempo beat source
#[derive(Debug, Clone)]
pub struct BeatClock {
    interval: f32,
    accumulator: f32,
    running: bool,
}

impl Default for BeatClock {
    fn default() -> Self {
        Self::new(DEFAULT_BPM)
    }
}

impl BeatClock {
    pub fn new(bpm: u32) -> Self {
        Self {
            interval: beat_interval(bpm),
            accumulator: 0.0,
            running: false,
        }
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn set_bpm(&mut self, bpm: u32) {
        self.interval = beat_interval(bpm);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Begin ticking; the first beat is due on the next update.
    pub fn start(&mut self) {
        self.running = true;
        self.accumulator = self.interval;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.accumulator = 0.0;
    }

    /// Feed elapsed seconds. Returns true when a beat should run now.
    pub fn update(&mut self, dt: f32) -> bool {
        if !self.running {
            return false;
        }
        self.accumulator += dt.max(0.0);
        if self.accumulator < self.interval {
            return false;
        }
        // Keep the phase, drop whole missed beats
        self.accumulator = (self.accumulator - self.interval) % self.interval;
        true
    }
}

/// One-shot timer
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    remaining: Option<f32>,
}

impl Countdown {
    pub fn arm(&mut self, secs: f32) {
        self.remaining = Some(secs.max(0.0));
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    /// Returns true exactly once, on the update that runs the timer out.
    pub fn update(&mut self, dt: f32) -> bool {
        let Some(remaining) = self.remaining.as_mut() else {
            return false;
        };
        *remaining -= dt.max(0.0);
        if *remaining <= 0.0 {
            self.remaining = None;
            true
        } else {
            false
        }
    }
}
