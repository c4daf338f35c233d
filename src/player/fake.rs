//! Widget double that records every call and lets tests push events

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{PlayerWidget, WidgetEvent};
use crate::error::PlayerError;

#[derive(Clone, Debug, PartialEq)]
pub enum WidgetCall {
    Load(String),
    Play,
    Pause,
    Stop,
    Seek(f64),
    SetVolume(u8),
}

pub struct FakeWidget {
    calls: Mutex<Vec<WidgetCall>>,
    position: Mutex<f64>,
    sender: UnboundedSender<WidgetEvent>,
    receiver: Mutex<Option<UnboundedReceiver<WidgetEvent>>>,
}

impl FakeWidget {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            calls: Mutex::new(Vec::new()),
            position: Mutex::new(0.0),
            sender,
            receiver: Mutex::new(Some(receiver)),
        }
    }

    pub fn emit(&self, event: WidgetEvent) {
        let _ = self.sender.send(event);
    }

    pub fn calls(&self) -> Vec<WidgetCall> {
        self.calls.lock().expect("fake widget mutex poisoned").clone()
    }

    pub fn last_call(&self) -> Option<WidgetCall> {
        self.calls.lock().expect("fake widget mutex poisoned").last().cloned()
    }

    pub fn set_position(&self, secs: f64) {
        *self.position.lock().expect("fake widget mutex poisoned") = secs;
    }

    fn record(&self, call: WidgetCall) {
        self.calls.lock().expect("fake widget mutex poisoned").push(call);
    }
}

#[async_trait]
impl PlayerWidget for FakeWidget {
    async fn load(&self, video_id: &str) -> Result<(), PlayerError> {
        self.record(WidgetCall::Load(video_id.to_string()));
        Ok(())
    }

    async fn play(&self) -> Result<(), PlayerError> {
        self.record(WidgetCall::Play);
        Ok(())
    }

    async fn pause(&self) -> Result<(), PlayerError> {
        self.record(WidgetCall::Pause);
        Ok(())
    }

    async fn stop(&self) -> Result<(), PlayerError> {
        self.record(WidgetCall::Stop);
        Ok(())
    }

    async fn seek(&self, position_secs: f64) -> Result<(), PlayerError> {
        self.record(WidgetCall::Seek(position_secs));
        Ok(())
    }

    async fn set_volume(&self, volume: u8) -> Result<(), PlayerError> {
        self.record(WidgetCall::SetVolume(volume));
        Ok(())
    }

    async fn current_time(&self) -> Result<f64, PlayerError> {
        Ok(*self.position.lock().expect("fake widget mutex poisoned"))
    }

    fn subscribe(&self) -> Option<UnboundedReceiver<WidgetEvent>> {
        self.receiver.lock().expect("fake widget mutex poisoned").take()
    }
}
