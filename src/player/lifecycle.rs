//! Widget lifecycle: `Idle -> Ready -> Playing <-> Paused -> Ended`, and
//! `Ended -> Playing` once the next track starts.

use super::{PlaybackState, WidgetEvent, WidgetState};

/// What the controller must do after an event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LifecycleAction {
    None,
    /// The track finished; move the queue forward
    AdvanceQueue,
    /// The widget reported a failure. Whether a track is affected depends
    /// on the queue, not on the widget state.
    Failed(String),
}

#[derive(Clone, Debug, Default)]
pub struct Lifecycle {
    state: WidgetState,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn apply(&mut self, event: &WidgetEvent) -> LifecycleAction {
        use WidgetState::*;

        let (next, action) = match (self.state, event) {
            (Idle, WidgetEvent::Ready) => (Ready, LifecycleAction::None),

            (Ready | Paused | Ended, WidgetEvent::StateChanged(PlaybackState::Playing)) => {
                (Playing, LifecycleAction::None)
            }
            (Playing, WidgetEvent::StateChanged(PlaybackState::Paused)) => {
                (Paused, LifecycleAction::None)
            }
            (state, WidgetEvent::StateChanged(PlaybackState::Buffering)) if state != Idle => {
                (state, LifecycleAction::None)
            }

            (Playing | Paused, WidgetEvent::Ended) => (Ended, LifecycleAction::AdvanceQueue),

            (Idle | Ready, WidgetEvent::Error(message)) => {
                (self.state, LifecycleAction::Failed(message.clone()))
            }
            (Playing | Paused | Ended, WidgetEvent::Error(message)) => {
                (Ended, LifecycleAction::Failed(message.clone()))
            }

            (state, event) => {
                tracing::trace!(?state, ?event, "Ignoring widget event");
                return LifecycleAction::None;
            }
        };

        if next != self.state {
            tracing::debug!(from = ?self.state, to = ?next, "Widget lifecycle transition");
        }
        self.state = next;
        action
    }

    /// The widget was stopped on purpose; nothing is loaded any more
    pub fn stopped(&mut self) {
        if self.state != WidgetState::Idle {
            self.state = WidgetState::Ready;
        }
    }
}
