//! Playback control methods

use crate::model::{PlayerSync, Track};

use super::AppController;

const SEEK_STEP_SECS: f64 = 10.0;

impl AppController {
    /// Make the widget match the queue after a transition
    pub(crate) async fn apply_sync(&self, sync: PlayerSync) {
        if sync == PlayerSync::Nothing {
            return;
        }
        let Some(widget) = self.widget().await else {
            tracing::warn!(?sync, "No player attached");
            self.model
                .lock()
                .await
                .set_error("Player is not running.".to_string());
            return;
        };

        let result = match &sync {
            PlayerSync::Load(video_id) => widget.load(video_id).await,
            PlayerSync::Play => widget.play().await,
            PlayerSync::Pause => widget.pause().await,
            PlayerSync::Stop => {
                let result = widget.stop().await;
                self.model.lock().await.widget_stopped();
                result
            }
            PlayerSync::Nothing => Ok(()),
        };

        if let Err(e) = result {
            tracing::error!(?sync, error = %e, "Player command failed");
            self.show_error(e).await;
        }
    }

    pub async fn play_track(&self, track: Track, context: Vec<Track>) {
        tracing::debug!(video_id = %track.video_id, context = context.len(), "Play requested");
        let sync = self.model.lock().await.play(track, context);
        self.apply_sync(sync).await;
    }

    pub async fn play_selected(&self) {
        let selected = self.model.lock().await.selected_track();
        if let Some((track, context)) = selected {
            self.play_track(track, context).await;
        }
    }

    pub async fn toggle_playback(&self) {
        let sync = self.model.lock().await.toggle_play();
        tracing::debug!(?sync, "Toggling playback");
        self.apply_sync(sync).await;
    }

    pub async fn next_track(&self) {
        tracing::debug!("Skipping to next track");
        let sync = self.model.lock().await.next();
        self.apply_sync(sync).await;
    }

    pub async fn previous_track(&self) {
        let sync = self.model.lock().await.previous();
        self.apply_sync(sync).await;
    }

    pub async fn add_track_to_queue(&self, track: Track) {
        let title = track.title.clone();
        let sync = {
            let mut model = self.model.lock().await;
            let before = model.queue.tracks().len();
            let sync = model.add_to_queue(track);
            if model.queue.tracks().len() > before {
                model.set_status(format!("Queued: {}", title));
            } else {
                model.set_status(format!("Already queued: {}", title));
            }
            sync
        };
        self.apply_sync(sync).await;
    }

    pub async fn queue_selected(&self) {
        let selected = self.model.lock().await.selected_track();
        if let Some((track, _)) = selected {
            self.add_track_to_queue(track).await;
        }
    }

    pub async fn volume_up(&self) {
        self.change_volume(true).await;
    }

    pub async fn volume_down(&self) {
        self.change_volume(false).await;
    }

    async fn change_volume(&self, up: bool) {
        let volume = self.model.lock().await.change_volume(up);
        if let Some(widget) = self.widget().await {
            if let Err(e) = widget.set_volume(volume).await {
                self.show_error(e).await;
            }
        }
    }

    pub async fn seek_forward(&self) {
        self.seek_relative(SEEK_STEP_SECS).await;
    }

    pub async fn seek_backward(&self) {
        self.seek_relative(-SEEK_STEP_SECS).await;
    }

    async fn seek_relative(&self, delta_secs: f64) {
        let Some(target) = self.model.lock().await.seek_target(delta_secs) else {
            return;
        };
        let Some(widget) = self.widget().await else {
            return;
        };
        match widget.seek(target).await {
            Ok(()) => self.model.lock().await.update_position(target),
            Err(e) => self.show_error(e).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{controller, track};
    use crate::player::fake::WidgetCall;

    #[tokio::test]
    async fn play_loads_into_widget() {
        let (controller, fake) = controller("play").await;
        controller
            .play_track(track("b"), vec![track("a"), track("b")])
            .await;
        assert_eq!(fake.calls(), vec![WidgetCall::Load("b".to_string())]);
    }

    #[tokio::test]
    async fn toggle_pauses_and_resumes() {
        let (controller, fake) = controller("toggle").await;
        controller.toggle_playback().await;
        assert!(fake.calls().is_empty());

        controller.play_track(track("a"), vec![]).await;
        controller.toggle_playback().await;
        controller.toggle_playback().await;
        assert_eq!(
            fake.calls(),
            vec![
                WidgetCall::Load("a".to_string()),
                WidgetCall::Pause,
                WidgetCall::Play
            ]
        );
    }

    #[tokio::test]
    async fn next_at_end_stops_widget() {
        let (controller, fake) = controller("next-end").await;
        controller.play_track(track("a"), vec![track("a")]).await;
        controller.next_track().await;
        assert_eq!(fake.last_call(), Some(WidgetCall::Stop));
        assert!(controller.model.lock().await.queue.current().is_none());
    }

    #[tokio::test]
    async fn previous_at_start_sends_nothing() {
        let (controller, fake) = controller("prev-start").await;
        controller
            .play_track(track("a"), vec![track("a"), track("b")])
            .await;
        controller.previous_track().await;
        assert_eq!(fake.calls().len(), 1);
    }

    #[tokio::test]
    async fn queueing_into_empty_queue_starts_playback() {
        let (controller, fake) = controller("enqueue").await;
        controller.add_track_to_queue(track("a")).await;
        controller.add_track_to_queue(track("b")).await;
        assert_eq!(fake.calls(), vec![WidgetCall::Load("a".to_string())]);
        let model = controller.model.lock().await;
        assert_eq!(model.queue.tracks().len(), 2);
        assert_eq!(model.ui.status_message.as_deref(), Some("Queued: Song b"));
    }

    #[tokio::test]
    async fn volume_is_forwarded() {
        let (controller, fake) = controller("volume").await;
        controller.volume_up().await;
        assert_eq!(fake.last_call(), Some(WidgetCall::SetVolume(80)));
    }

    #[tokio::test]
    async fn seek_is_clamped_to_track() {
        let (controller, fake) = controller("seek").await;
        controller.seek_forward().await;
        assert!(fake.calls().is_empty());

        controller.play_track(track("a"), vec![]).await;
        controller.seek_backward().await;
        assert_eq!(fake.last_call(), Some(WidgetCall::Seek(0.0)));
    }
}
