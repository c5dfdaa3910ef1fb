//! Audio cue mixing
//!
//! Turns simulation cues into clip requests for whatever backend plays
//! sound. Clip choice is a lookup table so the simulation never knows about
//! assets.

use crate::settings::Settings;
use crate::sim::{AudioCue, AudioSink, Color};

/// Token step clips, indexed by `Color::index`
const STEP_CLIPS: [&str; 5] = [
    "step_blue",
    "step_red",
    "step_green",
    "step_yellow",
    "step_white",
];

/// Clip name for a cue
pub fn clip_for(cue: AudioCue) -> &'static str {
    match cue {
        AudioCue::ArrowPlaced => "place_arrow",
        AudioCue::ArrowRemoved => "remove_arrow",
        AudioCue::ArrowRotated => "rotate_arrow",
        AudioCue::TokenStep(color) => step_clip(color),
        AudioCue::SimulationStart => "sim_start",
        AudioCue::SimulationStop => "sim_stop",
        AudioCue::BoardReset => "board_reset",
    }
}

fn step_clip(color: Color) -> &'static str {
    STEP_CLIPS[color.index()]
}

/// A clip the backend should play now
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayRequest {
    pub clip: &'static str,
    pub volume: f32,
}

type Backend = Box<dyn FnMut(PlayRequest)>;

/// Audio manager for the game
pub struct AudioManager {
    backend: Option<Backend>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("has_backend", &self.backend.is_some())
            .field("master_volume", &self.master_volume)
            .field("sfx_volume", &self.sfx_volume)
            .field("muted", &self.muted)
            .finish()
    }
}

impl AudioManager {
    /// Manager without a backend; cues are only logged
    pub fn new() -> Self {
        Self {
            backend: None,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    pub fn with_backend(backend: impl FnMut(PlayRequest) + 'static) -> Self {
        Self {
            backend: Some(Box::new(backend)),
            ..Self::new()
        }
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_muted(settings.muted);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Resolve a cue to a request, or `None` when silent
    pub fn request_for(&self, cue: AudioCue) -> Option<PlayRequest> {
        let volume = self.effective_volume();
        if volume <= 0.0 {
            return None;
        }
        Some(PlayRequest {
            clip: clip_for(cue),
            volume,
        })
    }

    /// Play a cue
    pub fn play(&mut self, cue: AudioCue) {
        let Some(request) = self.request_for(cue) else {
            return;
        };
        log::debug!("cue {:?} -> {} @ {:.2}", cue, request.clip, request.volume);
        if let Some(backend) = self.backend.as_mut() {
            (*backend)(request);
        }
    }
}

impl AudioSink for AudioManager {
    fn cue(&mut self, cue: AudioCue) {
        self.play(cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_step_clip_per_color() {
        assert_eq!(clip_for(AudioCue::TokenStep(Color::Blue)), "step_blue");
        assert_eq!(clip_for(AudioCue::TokenStep(Color::White)), "step_white");
        assert_eq!(clip_for(AudioCue::ArrowRotated), "rotate_arrow");
    }

    #[test]
    fn test_backend_receives_requests() {
        let played = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&played);
        let mut audio = AudioManager::with_backend(move |req| sink.borrow_mut().push(req));
        audio.set_master_volume(0.5);

        audio.cue(AudioCue::ArrowPlaced);
        audio.cue(AudioCue::TokenStep(Color::Green));

        let played = played.borrow();
        assert_eq!(played.len(), 2);
        assert_eq!(played[0].clip, "place_arrow");
        assert_eq!(played[1].clip, "step_green");
        assert!((played[1].volume - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_muted_is_silent() {
        let mut audio = AudioManager::new();
        audio.apply_settings(&Settings {
            muted: true,
            ..Settings::default()
        });
        assert_eq!(audio.request_for(AudioCue::SimulationStart), None);

        audio.set_muted(false);
        audio.set_sfx_volume(3.0);
        let req = audio.request_for(AudioCue::SimulationStart).unwrap();
        assert!((req.volume - 0.8).abs() < f32::EPSILON);
    }
}
