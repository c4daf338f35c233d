//! Player widget event listener and progress polling

use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::player::WidgetEvent;

use super::AppController;

const PROGRESS_POLL_INTERVAL: Duration = Duration::from_secs(1);

impl AppController {
    pub fn start_player_event_listener(&self, mut events: UnboundedReceiver<WidgetEvent>) {
        let controller = self.clone();
        tracing::info!("Starting player event listener");

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if controller.model.lock().await.should_quit() {
                    tracing::debug!("Player event listener shutting down");
                    break;
                }
                controller.handle_widget_event(event).await;
            }
            tracing::debug!("Player event stream closed");
        });
    }

    pub(crate) async fn handle_widget_event(&self, event: WidgetEvent) {
        match &event {
            WidgetEvent::StateChanged(state) => tracing::debug!(?state, "WidgetEvent::StateChanged"),
            other => tracing::debug!(event = ?other, "WidgetEvent"),
        }

        let sync = self.model.lock().await.widget_event(&event);
        self.apply_sync(sync).await;
    }

    /// Mirror the widget's position into the model while something plays
    pub fn start_progress_poll(&self) {
        let controller = self.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PROGRESS_POLL_INTERVAL);
            loop {
                interval.tick().await;
                let playing = {
                    let model = controller.model.lock().await;
                    if model.should_quit() {
                        break;
                    }
                    model.queue.is_playing() && model.queue.current().is_some()
                };
                if !playing {
                    continue;
                }
                let Some(widget) = controller.widget().await else {
                    continue;
                };
                match widget.current_time().await {
                    Ok(secs) => controller.model.lock().await.update_position(secs),
                    Err(e) => tracing::trace!(error = %e, "Could not read player position"),
                }
            }
        });
    }
}
