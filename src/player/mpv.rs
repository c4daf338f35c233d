//! `mpv` driven over its JSON IPC socket.
//!
//! Commands are JSON lines tagged with a `request_id`; a reader task routes
//! replies back to the waiting caller and turns mpv events into
//! `WidgetEvent`s.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Mutex as StdMutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::process::{Child, Command};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;

use super::{PlaybackState, PlayerWidget, WidgetEvent};
use crate::error::PlayerError;
use crate::model::watch_url;

const CONNECT_ATTEMPTS: u32 = 50;
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(100);
const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);
const PAUSE_OBSERVER_ID: u64 = 1;

type Reply = Result<Value, String>;
type PendingMap = Arc<StdMutex<HashMap<u64, oneshot::Sender<Reply>>>>;

#[derive(Clone, Debug)]
pub struct MpvOptions {
    pub program: String,
    pub socket_path: PathBuf,
    pub audio_only: bool,
    pub volume: u8,
}

impl MpvOptions {
    pub fn new(program: impl Into<String>, audio_only: bool, volume: u8) -> Self {
        Self {
            program: program.into(),
            socket_path: std::env::temp_dir()
                .join(format!("synapse-mpv-{}.sock", std::process::id())),
            audio_only,
            volume: volume.min(100),
        }
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--idle=yes".to_string(),
            "--no-terminal".to_string(),
            format!("--input-ipc-server={}", self.socket_path.display()),
            format!("--volume={}", self.volume),
        ];
        if self.audio_only {
            args.push("--vid=no".to_string());
            args.push("--ytdl-format=bestaudio/best".to_string());
        } else {
            args.push("--force-window=yes".to_string());
        }
        args
    }
}

pub struct MpvWidget {
    _child: Child,
    writer: Mutex<OwnedWriteHalf>,
    pending: PendingMap,
    next_request_id: AtomicU64,
    events: StdMutex<Option<UnboundedReceiver<WidgetEvent>>>,
    reader: JoinHandle<()>,
    socket_path: PathBuf,
}

impl MpvWidget {
    /// Start mpv and connect to its control socket
    pub async fn spawn(options: MpvOptions) -> Result<Self, PlayerError> {
        let _ = std::fs::remove_file(&options.socket_path);

        tracing::info!(program = %options.program, audio_only = options.audio_only, "Starting mpv");
        let mut child = Command::new(&options.program)
            .args(options.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PlayerError::Spawn {
                program: options.program.clone(),
                source,
            })?;

        let stream = connect(&options.socket_path, &mut child).await?;
        let (read_half, write_half) = stream.into_split();

        let (tx, rx) = mpsc::unbounded_channel();
        let pending: PendingMap = Arc::new(StdMutex::new(HashMap::new()));
        let reader = tokio::spawn(read_loop(read_half, pending.clone(), tx.clone()));

        let widget = Self {
            _child: child,
            writer: Mutex::new(write_half),
            pending,
            next_request_id: AtomicU64::new(PAUSE_OBSERVER_ID + 1),
            events: StdMutex::new(Some(rx)),
            reader,
            socket_path: options.socket_path,
        };

        widget
            .command(json!(["observe_property", PAUSE_OBSERVER_ID, "pause"]))
            .await?;
        let _ = tx.send(WidgetEvent::Ready);
        tracing::info!("mpv ready");
        Ok(widget)
    }

    async fn command(&self, args: Value) -> Result<Value, PlayerError> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = oneshot::channel();
        self.pending
            .lock()
            .map_err(|_| PlayerError::Disconnected)?
            .insert(request_id, reply_tx);

        let mut line = serde_json::to_string(&json!({
            "command": args,
            "request_id": request_id,
        }))?;
        line.push('\n');
        tracing::trace!(request_id, command = %args, "mpv command");

        {
            let mut writer = self.writer.lock().await;
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await?;
        }

        match tokio::time::timeout(COMMAND_TIMEOUT, reply_rx).await {
            Ok(Ok(Ok(data))) => Ok(data),
            Ok(Ok(Err(reason))) => Err(PlayerError::Command {
                command: args.to_string(),
                reason,
            }),
            Ok(Err(_)) => Err(PlayerError::Disconnected),
            Err(_) => {
                if let Ok(mut pending) = self.pending.lock() {
                    pending.remove(&request_id);
                }
                Err(PlayerError::Command {
                    command: args.to_string(),
                    reason: "timed out".to_string(),
                })
            }
        }
    }

    async fn set_pause(&self, paused: bool) -> Result<(), PlayerError> {
        self.command(json!(["set_property", "pause", paused])).await?;
        Ok(())
    }
}

impl Drop for MpvWidget {
    fn drop(&mut self) {
        self.reader.abort();
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

#[async_trait]
impl PlayerWidget for MpvWidget {
    async fn load(&self, video_id: &str) -> Result<(), PlayerError> {
        tracing::debug!(video_id, "mpv load");
        self.command(json!(["loadfile", watch_url(video_id), "replace"]))
            .await?;
        self.set_pause(false).await
    }

    async fn play(&self) -> Result<(), PlayerError> {
        self.set_pause(false).await
    }

    async fn pause(&self) -> Result<(), PlayerError> {
        self.set_pause(true).await
    }

    async fn stop(&self) -> Result<(), PlayerError> {
        self.command(json!(["stop"])).await?;
        Ok(())
    }

    async fn seek(&self, position_secs: f64) -> Result<(), PlayerError> {
        self.command(json!(["seek", position_secs.max(0.0), "absolute"]))
            .await?;
        Ok(())
    }

    async fn set_volume(&self, volume: u8) -> Result<(), PlayerError> {
        self.command(json!(["set_property", "volume", volume.min(100)]))
            .await?;
        Ok(())
    }

    async fn current_time(&self) -> Result<f64, PlayerError> {
        let data = self.command(json!(["get_property", "time-pos"])).await?;
        Ok(data.as_f64().unwrap_or(0.0))
    }

    fn subscribe(&self) -> Option<UnboundedReceiver<WidgetEvent>> {
        self.events.lock().ok()?.take()
    }
}

async fn connect(path: &Path, child: &mut Child) -> Result<UnixStream, PlayerError> {
    for _ in 0..CONNECT_ATTEMPTS {
        if let Ok(stream) = UnixStream::connect(path).await {
            return Ok(stream);
        }
        if let Ok(Some(status)) = child.try_wait() {
            tracing::error!(%status, "mpv exited before opening its socket");
            return Err(PlayerError::Disconnected);
        }
        tokio::time::sleep(CONNECT_RETRY_DELAY).await;
    }
    Err(PlayerError::ConnectTimeout)
}

async fn read_loop(read_half: OwnedReadHalf, pending: PendingMap, events: UnboundedSender<WidgetEvent>) {
    let mut lines = BufReader::new(read_half).lines();
    let mut translator = EventTranslator::default();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "mpv socket read failed");
                break;
            }
        };
        let message: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, line = %line, "Unparseable mpv message");
                continue;
            }
        };

        if let Some(request_id) = message.get("request_id").and_then(Value::as_u64) {
            if message.get("event").is_none() {
                let sender = pending.lock().ok().and_then(|mut p| p.remove(&request_id));
                if let Some(sender) = sender {
                    let _ = sender.send(parse_reply(&message));
                }
                continue;
            }
        }

        if let Some(event) = translator.translate(&message) {
            tracing::debug!(?event, "mpv event");
            if events.send(event).is_err() {
                break;
            }
        }
    }

    tracing::info!("mpv connection closed");
    if let Ok(mut pending) = pending.lock() {
        pending.clear();
    }
    let _ = events.send(WidgetEvent::Error("Player exited".to_string()));
}

fn parse_reply(message: &Value) -> Reply {
    match message.get("error").and_then(Value::as_str) {
        Some("success") | None => Ok(message.get("data").cloned().unwrap_or(Value::Null)),
        Some(error) => Err(error.to_string()),
    }
}

/// Turns raw mpv events into widget events. Pause changes only count while
/// a file is loaded, because mpv reports the initial pause value on
/// `observe_property` too.
#[derive(Debug, Default)]
struct EventTranslator {
    loaded: bool,
    paused: bool,
}

impl EventTranslator {
    fn translate(&mut self, message: &Value) -> Option<WidgetEvent> {
        let event = message.get("event")?.as_str()?;
        match event {
            "start-file" => {
                self.loaded = false;
                Some(WidgetEvent::StateChanged(PlaybackState::Buffering))
            }
            "file-loaded" => {
                self.loaded = true;
                Some(WidgetEvent::StateChanged(self.pause_state()))
            }
            "property-change" => {
                if message.get("name")?.as_str()? != "pause" {
                    return None;
                }
                self.paused = message.get("data")?.as_bool()?;
                self.loaded.then(|| WidgetEvent::StateChanged(self.pause_state()))
            }
            "end-file" => {
                self.loaded = false;
                match message.get("reason").and_then(Value::as_str) {
                    Some("eof") => Some(WidgetEvent::Ended),
                    Some("error") => {
                        let detail = message
                            .get("file_error")
                            .and_then(Value::as_str)
                            .unwrap_or("playback failed");
                        Some(WidgetEvent::Error(format!("Could not play video: {}", detail)))
                    }
                    _ => None,
                }
            }
            "shutdown" => Some(WidgetEvent::Error("Player shut down".to_string())),
            _ => None,
        }
    }

    fn pause_state(&self) -> PlaybackState {
        if self.paused {
            PlaybackState::Paused
        } else {
            PlaybackState::Playing
        }
    }
}
