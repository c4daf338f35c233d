//! Navigation-related controller methods (home, search, channels, playlists)

use crate::model::{ActiveSection, ContentView, LibraryItem, PlaylistItem, PlaylistSource};

use super::AppController;

impl AppController {
    pub async fn perform_search(&self, query: &str) {
        let query = query.trim().to_string();
        if query.is_empty() {
            return;
        }
        tracing::debug!(query = %query, "Performing search");
        {
            let mut model = self.model.lock().await;
            model.record_search(&query);
            model.set_content_loading(true);
        }

        match self.youtube.search(&query).await {
            Ok(tracks) => {
                tracing::info!(query = %query, tracks = tracks.len(), "Search completed");
                self.model
                    .lock()
                    .await
                    .show_content(ContentView::SearchResults { query, tracks });
            }
            Err(e) => {
                tracing::error!(query = %query, error = %e, "Search failed");
                self.model.lock().await.set_content_loading(false);
                self.show_error(e).await;
            }
        }
    }

    /// Trending music for the configured region
    pub async fn load_home(&self) {
        self.model.lock().await.set_content_loading(true);
        match self.youtube.trending().await {
            Ok(tracks) => {
                let mut model = self.model.lock().await;
                model.content.show(ContentView::Home { tracks });
            }
            Err(e) => {
                self.model.lock().await.set_content_loading(false);
                self.show_error(e).await;
            }
        }
    }

    pub async fn open_library_item(&self, item: LibraryItem) {
        tracing::debug!(item = item.label(), "Opening library item");
        match item {
            LibraryItem::Home => {
                self.load_home().await;
                self.model.lock().await.set_active_section(ActiveSection::MainContent);
            }
            LibraryItem::Subscriptions => self.load_subscriptions().await,
            LibraryItem::Queue => self.model.lock().await.show_content(ContentView::Queue),
            LibraryItem::SearchHistory => {
                let mut model = self.model.lock().await;
                let entries = model.settings.search_history.clone();
                model.show_content(ContentView::SearchHistory { entries });
            }
        }
    }

    /// Latest uploads from every subscribed channel of the linked account
    pub async fn load_subscriptions(&self) {
        self.model.lock().await.set_content_loading(true);

        let subscriptions = match self.youtube.subscriptions().await {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load subscriptions");
                self.model.lock().await.set_content_loading(false);
                self.show_error(e).await;
                return;
            }
        };

        let feeds = self.youtube.subscription_feed(&subscriptions).await;
        tracing::info!(
            subscriptions = subscriptions.len(),
            channels = feeds.len(),
            "Subscription feed loaded"
        );
        self.model
            .lock()
            .await
            .show_content(ContentView::Subscriptions { feeds });
    }

    pub async fn open_playlist(&self, item: PlaylistItem) {
        tracing::debug!(playlist_id = %item.id, source = ?item.source, "Opening playlist");
        match item.source {
            PlaylistSource::Local => {
                let mut model = self.model.lock().await;
                match model.library.playlist(&item.id).cloned() {
                    Some(playlist) => model.show_content(ContentView::Playlist {
                        tracks: playlist.tracks.clone(),
                        playlist,
                        next_page_token: None,
                    }),
                    None => model.set_error(format!("Playlist '{}' no longer exists", item.name)),
                }
            }
            PlaylistSource::YouTube => {
                let playlist = {
                    let mut model = self.model.lock().await;
                    model.set_content_loading(true);
                    model.external_playlist(&item.id).cloned()
                };
                let Some(playlist) = playlist else {
                    self.model.lock().await.set_content_loading(false);
                    return;
                };
                match self.youtube.playlist_items(&item.id, None).await {
                    Ok(page) => {
                        self.model.lock().await.show_content(ContentView::Playlist {
                            playlist,
                            tracks: page.items,
                            next_page_token: page.next_page_token,
                        });
                    }
                    Err(e) => {
                        tracing::error!(playlist_id = %item.id, error = %e, "Failed to load playlist");
                        self.model.lock().await.set_content_loading(false);
                        self.show_error(e).await;
                    }
                }
            }
        }
    }

    pub async fn open_selected_playlist(&self) {
        let selected = self.model.lock().await.selected_playlist();
        if let Some(item) = selected {
            self.open_playlist(item).await;
        }
    }

    pub async fn open_channel(&self, channel_id: &str) {
        tracing::debug!(channel_id, "Opening channel");
        self.model.lock().await.set_content_loading(true);

        let details = self.youtube.channel_details(channel_id).await;
        let uploads = match &details {
            Ok(_) => Some(self.youtube.channel_uploads(channel_id, None).await),
            Err(_) => None,
        };

        match (details, uploads) {
            (Ok(details), Some(Ok(page))) => {
                tracing::info!(channel = %details.title, tracks = page.items.len(), "Channel loaded");
                self.model.lock().await.show_content(ContentView::Channel {
                    details,
                    tracks: page.items,
                    next_page_token: page.next_page_token,
                });
            }
            (Err(e), _) | (Ok(_), Some(Err(e))) => {
                tracing::error!(channel_id, error = %e, "Failed to load channel");
                self.model.lock().await.set_content_loading(false);
                self.show_error(e).await;
            }
            (Ok(_), None) => self.model.lock().await.set_content_loading(false),
        }
    }

    pub async fn open_selected_channel(&self) {
        let channel_id = self.model.lock().await.selected_channel_id();
        if let Some(channel_id) = channel_id {
            self.open_channel(&channel_id).await;
        }
    }

    /// Fetch the next page once the selection reaches the end of a paged view
    pub async fn load_more_if_needed(&self) {
        let pending = {
            let mut model = self.model.lock().await;
            let pending = model.pending_page();
            if pending.is_some() {
                model.set_content_loading(true);
            }
            pending
        };
        let Some((view, token)) = pending else {
            return;
        };

        let result = match &view {
            ContentView::Channel { details, .. } => {
                self.youtube.channel_uploads(&details.id, Some(&token)).await
            }
            ContentView::Playlist { playlist, .. } => {
                self.youtube.playlist_items(&playlist.id, Some(&token)).await
            }
            _ => {
                self.model.lock().await.set_content_loading(false);
                return;
            }
        };

        let mut model = self.model.lock().await;
        match result {
            Ok(page) => {
                if same_listing(&model.content.view, &view) {
                    tracing::debug!(loaded = page.items.len(), "Appending next page");
                    model.content.append_page(page.items, page.next_page_token);
                } else {
                    model.set_content_loading(false);
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load next page");
                model.set_content_loading(false);
                drop(model);
                self.show_error(e).await;
            }
        }
    }

    /// Playlists of the linked account, if one is linked
    pub async fn load_external_playlists(&self) {
        if !self.youtube.is_linked().await {
            tracing::debug!("No linked account, skipping external playlists");
            return;
        }
        match self.youtube.my_playlists().await {
            Ok(playlists) => {
                tracing::info!(count = playlists.len(), "Loaded linked account playlists");
                self.model.lock().await.set_external_playlists(playlists);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load linked account playlists");
                self.show_error(e).await;
            }
        }
    }

    pub async fn navigate_back(&self) {
        let mut model = self.model.lock().await;
        if !model.navigate_back() {
            model.set_active_section(ActiveSection::Library);
        }
    }

    /// Enter in the main area: play a track or re-run a past search
    pub async fn activate_selected_content(&self) {
        let entry = self.model.lock().await.selected_history_entry();
        match entry {
            Some(query) => {
                self.model.lock().await.ui.search_query = query.clone();
                self.perform_search(&query).await;
            }
            None => self.play_selected().await,
        }
    }
}

/// Whether two views page through the same channel or playlist
fn same_listing(a: &ContentView, b: &ContentView) -> bool {
    match (a, b) {
        (ContentView::Channel { details: a, .. }, ContentView::Channel { details: b, .. }) => a.id == b.id,
        (ContentView::Playlist { playlist: a, .. }, ContentView::Playlist { playlist: b, .. }) => a.id == b.id,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::controller;
    use crate::model::{ActiveSection, ContentView, LibraryItem};

    #[tokio::test]
    async fn queue_item_opens_queue_view() {
        let (controller, _fake) = controller("nav-queue").await;
        controller.open_library_item(LibraryItem::Queue).await;
        let model = controller.model.lock().await;
        assert_eq!(model.content.view, ContentView::Queue);
        assert_eq!(model.ui.active_section, ActiveSection::MainContent);
    }

    #[tokio::test]
    async fn search_history_view_lists_past_queries() {
        let (controller, _fake) = controller("nav-history").await;
        {
            let mut model = controller.model.lock().await;
            model.record_search("lofi");
            model.record_search("jazz");
        }
        controller.open_library_item(LibraryItem::SearchHistory).await;
        let model = controller.model.lock().await;
        assert_eq!(
            model.content.view,
            ContentView::SearchHistory {
                entries: vec!["jazz".to_string(), "lofi".to_string()]
            }
        );
    }

    #[tokio::test]
    async fn liked_songs_open_from_library() {
        let (controller, _fake) = controller("nav-liked").await;
        controller.open_selected_playlist().await;
        let model = controller.model.lock().await;
        assert_eq!(model.content.view.title(), crate::model::LIKED_SONGS_NAME);
    }

    #[tokio::test]
    async fn blank_search_is_ignored() {
        let (controller, _fake) = controller("nav-blank").await;
        controller.perform_search("   ").await;
        let model = controller.model.lock().await;
        assert!(model.settings.search_history.is_empty());
        assert!(!model.content.is_loading);
    }

    #[tokio::test]
    async fn subscriptions_need_a_linked_account() {
        let (controller, _fake) = controller("nav-subs").await;
        controller.load_subscriptions().await;
        let model = controller.model.lock().await;
        assert!(model.ui.error_message.as_deref().unwrap().contains("synapse link"));
        assert!(!model.content.is_loading);
    }

    #[tokio::test]
    async fn back_with_no_history_leaves_content() {
        let (controller, _fake) = controller("nav-back").await;
        controller.model.lock().await.set_active_section(ActiveSection::MainContent);
        controller.navigate_back().await;
        assert_eq!(
            controller.model.lock().await.ui.active_section,
            ActiveSection::Library
        );
    }
}
