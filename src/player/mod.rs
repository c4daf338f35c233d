//! External player adapter.
//!
//! - `PlayerWidget`: the narrow interface the controller drives
//! - `lifecycle`: state machine over widget events
//! - `mpv`: mpv bound over its JSON IPC socket
//! - `fake`: in-memory widget for tests

mod lifecycle;
#[cfg(unix)]
mod mpv;
#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::error::PlayerError;

pub use lifecycle::{Lifecycle, LifecycleAction};
#[cfg(unix)]
pub use mpv::{MpvOptions, MpvWidget};

/// Playback states reported through `WidgetEvent::StateChanged`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Buffering,
}

/// Everything the widget reports back
#[derive(Clone, Debug, PartialEq)]
pub enum WidgetEvent {
    Ready,
    StateChanged(PlaybackState),
    Ended,
    Error(String),
}

/// Lifecycle state of the widget as seen by the controller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WidgetState {
    #[default]
    Idle,
    Ready,
    Playing,
    Paused,
    Ended,
}

/// A third-party player that plays one video at a time
#[async_trait]
pub trait PlayerWidget: Send + Sync {
    /// Replace whatever is loaded with `video_id` and start it
    async fn load(&self, video_id: &str) -> Result<(), PlayerError>;
    async fn play(&self) -> Result<(), PlayerError>;
    async fn pause(&self) -> Result<(), PlayerError>;
    async fn stop(&self) -> Result<(), PlayerError>;
    async fn seek(&self, position_secs: f64) -> Result<(), PlayerError>;
    async fn set_volume(&self, volume: u8) -> Result<(), PlayerError>;
    /// Current position in seconds
    async fn current_time(&self) -> Result<f64, PlayerError>;
    /// Take the event stream. Only the first caller gets it.
    fn subscribe(&self) -> Option<UnboundedReceiver<WidgetEvent>>;
}
