//! Likes, local playlists and downloads

use crate::download;
use crate::error::LibraryError;
use crate::model::{ActiveSection, AppModel, PlaylistSource, Popup, Track};

use super::AppController;

/// Track a like/add action applies to: the selection in the main area,
/// otherwise whatever is playing
fn target_track(model: &AppModel) -> Option<Track> {
    if model.ui.active_section == ActiveSection::MainContent {
        if let Some((track, _)) = model.selected_track() {
            return Some(track);
        }
    }
    model.queue.current().cloned()
}

impl AppController {
    async fn library_op<T>(&self, op: impl FnOnce(&mut AppModel) -> Result<T, LibraryError>) -> Option<T> {
        let mut model = self.model.lock().await;
        match op(&mut *model) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(error = %e, "Library operation failed");
                model.report_library_error(&e);
                None
            }
        }
    }

    pub async fn toggle_like(&self) {
        let Some(track) = target_track(&*self.model.lock().await) else {
            return;
        };
        let title = track.title.clone();
        if let Some(liked) = self.library_op(|m| m.toggle_like(&track)).await {
            tracing::info!(video_id = %track.video_id, liked, "Toggled like");
            let message = if liked { "Liked" } else { "Removed from Liked Songs" };
            self.model
                .lock()
                .await
                .set_status(format!("{}: {}", message, title));
        }
    }

    pub async fn open_playlist_picker(&self) {
        let mut model = self.model.lock().await;
        let Some(track) = target_track(&model) else {
            return;
        };
        if model.local_playlists().is_empty() {
            model.set_error("No playlists yet. Create one first.".to_string());
            return;
        }
        model.show_popup(Popup::PlaylistPicker {
            track: Box::new(track),
            selected: 0,
        });
    }

    pub async fn picker_move(&self, down: bool) {
        let mut model = self.model.lock().await;
        let count = model.local_playlists().len();
        if let Some(Popup::PlaylistPicker { selected, .. }) = &mut model.ui.popup {
            if down {
                if *selected + 1 < count {
                    *selected += 1;
                }
            } else {
                *selected = selected.saturating_sub(1);
            }
        }
    }

    pub async fn confirm_playlist_picker(&self) {
        let (playlist, track) = {
            let mut model = self.model.lock().await;
            let Some(Popup::PlaylistPicker { track, selected }) = model.ui.popup.take() else {
                return;
            };
            match model.local_playlists().get(selected).cloned() {
                Some(playlist) => (playlist, *track),
                None => return,
            }
        };

        let title = track.title.clone();
        if let Some(added) = self.library_op(|m| m.add_to_playlist(&playlist.id, track)).await {
            let message = if added {
                format!("Added {} to {}", title, playlist.name)
            } else {
                format!("{} is already in {}", title, playlist.name)
            };
            self.model.lock().await.set_status(message);
        }
    }

    pub async fn start_create_playlist(&self) {
        self.model.lock().await.show_popup(Popup::CreatePlaylist {
            name: String::new(),
        });
    }

    pub async fn edit_playlist_name(&self, c: Option<char>) {
        let mut model = self.model.lock().await;
        if let Some(Popup::CreatePlaylist { name }) = &mut model.ui.popup {
            match c {
                Some(c) => name.push(c),
                None => {
                    name.pop();
                }
            }
        }
    }

    pub async fn confirm_create_playlist(&self) {
        let name = {
            let mut model = self.model.lock().await;
            match model.ui.popup.take() {
                Some(Popup::CreatePlaylist { name }) => name,
                other => {
                    model.ui.popup = other;
                    return;
                }
            }
        };
        if self.library_op(|m| m.create_playlist(&name)).await.is_some() {
            self.model
                .lock()
                .await
                .set_status(format!("Created playlist {}", name.trim()));
        }
    }

    /// Delete the playlist selected in the sidebar. Linked-account playlists
    /// are read-only.
    pub async fn delete_selected_playlist(&self) {
        let Some(item) = self.model.lock().await.selected_playlist() else {
            return;
        };
        if item.source != PlaylistSource::Local {
            self.model
                .lock()
                .await
                .set_error("Playlists of the linked account are read-only.".to_string());
            return;
        }
        if self.library_op(|m| m.delete_playlist(&item.id)).await.is_some() {
            self.model
                .lock()
                .await
                .set_status(format!("Deleted playlist {}", item.name));
        }
    }

    /// Remove the selected track from the open local playlist
    pub async fn remove_selected_from_playlist(&self) {
        let target = {
            let model = self.model.lock().await;
            model
                .open_local_playlist()
                .zip(model.selected_track().map(|(t, _)| t.video_id))
        };
        let Some((playlist_id, video_id)) = target else {
            return;
        };
        self.library_op(|m| m.remove_from_playlist(&playlist_id, &video_id))
            .await;
    }

    /// Download the selected (or playing) track in the background
    pub fn download_selected(&self) {
        let controller = self.clone();
        tokio::spawn(async move {
            let (track, program, dir) = {
                let mut model = controller.model.lock().await;
                let Some(track) = target_track(&model) else {
                    return;
                };
                model.set_status(format!("Downloading {}...", track.title));
                (
                    track,
                    model.config.ytdlp_path.clone(),
                    model.config.download_dir(),
                )
            };

            match download::download_track(&program, &track, &dir).await {
                Ok(result) => {
                    controller
                        .model
                        .lock()
                        .await
                        .set_status(format!("Saved {}", result.file_path.display()));
                }
                Err(e) => {
                    tracing::error!(video_id = %track.video_id, error = %e, "Download failed");
                    controller.show_error(e).await;
                }
            }
        });
    }
}
