//! Playback timing and now-playing snapshot for rendering

use std::time::Instant;

use super::queue::QueueStatus;
use super::settings::DEFAULT_VOLUME;
use super::types::Track;
use crate::player::WidgetState;

/// Internal timing state for smooth progress bar updates between polls
#[derive(Clone, Debug)]
pub struct PlaybackTiming {
    pub position_secs: f64,
    pub last_update: Instant,
    pub is_playing: bool,
    pub duration_secs: f64,
}

impl Default for PlaybackTiming {
    fn default() -> Self {
        Self {
            position_secs: 0.0,
            last_update: Instant::now(),
            is_playing: false,
            duration_secs: 0.0,
        }
    }
}

impl PlaybackTiming {
    pub fn current_position_secs(&self) -> f64 {
        let position = if self.is_playing {
            self.position_secs + self.last_update.elapsed().as_secs_f64()
        } else {
            self.position_secs
        };
        if self.duration_secs > 0.0 {
            position.min(self.duration_secs)
        } else {
            position
        }
    }

    /// Apply a position reported by the player. Small backward drift is
    /// ignored so the bar does not stutter.
    pub fn update_position(&mut self, position_secs: f64, is_playing: bool) {
        let diff = position_secs - self.current_position_secs();
        let state_changed = self.is_playing != is_playing;
        let was_paused = !self.is_playing;
        let jump = diff.abs() > 2.0;
        let acceptable_sync = diff >= -0.1;

        if state_changed || was_paused || jump || acceptable_sync {
            self.position_secs = position_secs.max(0.0);
            self.last_update = Instant::now();
        }
        self.is_playing = is_playing;
    }

    pub fn set_playing(&mut self, is_playing: bool) {
        self.position_secs = self.current_position_secs();
        self.is_playing = is_playing;
        self.last_update = Instant::now();
    }

    /// A new track starts from zero
    pub fn reset(&mut self, duration_secs: u32) {
        self.position_secs = 0.0;
        self.duration_secs = duration_secs as f64;
        self.last_update = Instant::now();
    }
}

/// Everything the progress bar and top bar need
#[derive(Clone, Debug)]
pub struct PlaybackInfo {
    pub track: Option<Track>,
    pub progress_secs: f64,
    pub duration_secs: f64,
    pub status: QueueStatus,
    pub widget_state: WidgetState,
    pub volume: u8,
    pub audio_only: bool,
    pub liked: bool,
    pub queue_position: Option<(usize, usize)>,
}

impl Default for PlaybackInfo {
    fn default() -> Self {
        Self {
            track: None,
            progress_secs: 0.0,
            duration_secs: 0.0,
            status: QueueStatus::Empty,
            widget_state: WidgetState::Idle,
            volume: DEFAULT_VOLUME,
            audio_only: true,
            liked: false,
            queue_position: None,
        }
    }
}

impl PlaybackInfo {
    pub fn ratio(&self) -> f64 {
        if self.duration_secs > 0.0 {
            (self.progress_secs / self.duration_secs).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
