//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{ActiveSection, ContentView, Popup};

use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let mut model = self.model.lock().await;

        // Blocking screens replace the whole UI
        if model.ui.blocking.is_some() {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => model.dismiss_blocking(),
                KeyCode::Char('q') | KeyCode::Char('Q') => model.set_should_quit(true),
                _ => {}
            }
            return Ok(());
        }

        if model.has_error() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                model.clear_error();
            }
            return Ok(());
        }

        let popup = model.ui.popup.clone();
        if let Some(popup) = popup {
            drop(model);
            return self.handle_popup_key(popup, key).await;
        }

        if model.ui.active_section == ActiveSection::Search {
            match key.code {
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        model.cycle_section_backward();
                    } else {
                        model.cycle_section_forward();
                    }
                    return Ok(());
                }
                KeyCode::BackTab => {
                    model.cycle_section_backward();
                    return Ok(());
                }
                KeyCode::Enter => {
                    let query = model.ui.search_query.clone();
                    drop(model);
                    if !query.trim().is_empty() {
                        let controller = self.clone();
                        tokio::spawn(async move {
                            controller.perform_search(&query).await;
                        });
                    }
                    return Ok(());
                }
                KeyCode::Esc => {
                    model.clear_search();
                    return Ok(());
                }
                KeyCode::Backspace => {
                    model.backspace_search();
                    return Ok(());
                }
                KeyCode::Char(c) => {
                    // Ctrl+Q still quits while typing
                    if (c == 'q' || c == 'Q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        model.set_should_quit(true);
                        return Ok(());
                    }
                    model.append_to_search(c);
                    return Ok(());
                }
                _ => {}
            }
        }

        if model.ui.active_section == ActiveSection::MainContent {
            match key.code {
                KeyCode::Up => {
                    model.move_selection_up();
                    return Ok(());
                }
                KeyCode::Down => {
                    model.move_selection_down();
                    if model.pending_page().is_some() {
                        let controller = self.clone();
                        tokio::spawn(async move {
                            controller.load_more_if_needed().await;
                        });
                    }
                    return Ok(());
                }
                KeyCode::Enter => {
                    drop(model);
                    let controller = self.clone();
                    tokio::spawn(async move {
                        controller.activate_selected_content().await;
                    });
                    return Ok(());
                }
                KeyCode::Backspace | KeyCode::Esc => {
                    drop(model);
                    self.navigate_back().await;
                    return Ok(());
                }
                KeyCode::Char('x') | KeyCode::Char('X') => {
                    drop(model);
                    self.toggle_like().await;
                    return Ok(());
                }
                KeyCode::Char('k') | KeyCode::Char('K') => {
                    drop(model);
                    self.queue_selected().await;
                    return Ok(());
                }
                KeyCode::Char('a') | KeyCode::Char('A') => {
                    drop(model);
                    self.open_playlist_picker().await;
                    return Ok(());
                }
                KeyCode::Char('c') | KeyCode::Char('C') => {
                    drop(model);
                    let controller = self.clone();
                    tokio::spawn(async move {
                        controller.open_selected_channel().await;
                    });
                    return Ok(());
                }
                KeyCode::Char('d') | KeyCode::Char('D') => {
                    drop(model);
                    self.download_selected();
                    return Ok(());
                }
                KeyCode::Delete => {
                    if matches!(model.content.view, ContentView::SearchHistory { .. }) {
                        model.clear_search_history();
                        return Ok(());
                    }
                    drop(model);
                    self.remove_selected_from_playlist().await;
                    return Ok(());
                }
                _ => {}
            }
        }

        if model.ui.active_section == ActiveSection::Playlists {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('C') => {
                    model.show_popup(Popup::CreatePlaylist { name: String::new() });
                    return Ok(());
                }
                KeyCode::Delete => {
                    drop(model);
                    self.delete_selected_playlist().await;
                    return Ok(());
                }
                _ => {}
            }
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true);
            }
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    model.cycle_section_backward();
                } else {
                    model.cycle_section_forward();
                }
            }
            KeyCode::BackTab => {
                model.cycle_section_backward();
            }
            KeyCode::Up => {
                model.move_selection_up();
            }
            KeyCode::Down => {
                model.move_selection_down();
            }
            KeyCode::Enter => {
                let section = model.ui.active_section;
                match section {
                    ActiveSection::Library => {
                        let item = model.selected_library_item();
                        drop(model);
                        let controller = self.clone();
                        tokio::spawn(async move {
                            controller.open_library_item(item).await;
                        });
                    }
                    ActiveSection::Playlists => {
                        drop(model);
                        let controller = self.clone();
                        tokio::spawn(async move {
                            controller.open_selected_playlist().await;
                        });
                    }
                    _ => {}
                }
            }
            // Play/Pause toggle
            KeyCode::Char(' ') => {
                drop(model);
                self.toggle_playback().await;
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                drop(model);
                self.next_track().await;
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                drop(model);
                self.previous_track().await;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                drop(model);
                self.volume_up().await;
            }
            KeyCode::Char('-') => {
                drop(model);
                self.volume_down().await;
            }
            KeyCode::Char('.') => {
                drop(model);
                self.seek_forward().await;
            }
            KeyCode::Char(',') => {
                drop(model);
                self.seek_backward().await;
            }
            // Like whatever is playing
            KeyCode::Char('x') | KeyCode::Char('X') => {
                drop(model);
                self.toggle_like().await;
            }
            KeyCode::Char('g') | KeyCode::Char('G') | KeyCode::Char('/') => {
                model.set_active_section(ActiveSection::Search);
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                model.set_active_section(ActiveSection::Playlists);
            }
            KeyCode::Char('u') | KeyCode::Char('U') => {
                model.show_content(ContentView::Queue);
            }
            KeyCode::Char('t') | KeyCode::Char('T') => {
                let theme = model.toggle_theme();
                tracing::debug!(?theme, "Theme toggled");
            }
            KeyCode::Char('v') | KeyCode::Char('V') => {
                let audio_only = model.toggle_audio_only();
                let message = if audio_only {
                    "Audio only. Takes effect after restart."
                } else {
                    "Video enabled. Takes effect after restart."
                };
                model.set_status(message);
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                let shown = model.toggle_external_playlists();
                drop(model);
                if shown {
                    let controller = self.clone();
                    tokio::spawn(async move {
                        controller.load_external_playlists().await;
                    });
                }
            }
            KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => {
                model.show_popup(Popup::Help);
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_popup_key(&self, popup: Popup, key: KeyEvent) -> Result<()> {
        match popup {
            Popup::Help => {
                if matches!(
                    key.code,
                    KeyCode::Esc | KeyCode::Enter | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?')
                ) {
                    self.model.lock().await.close_popup();
                }
            }
            Popup::PlaylistPicker { .. } => match key.code {
                KeyCode::Up => self.picker_move(false).await,
                KeyCode::Down => self.picker_move(true).await,
                KeyCode::Enter => self.confirm_playlist_picker().await,
                KeyCode::Esc => self.model.lock().await.close_popup(),
                _ => {}
            },
            Popup::CreatePlaylist { .. } => match key.code {
                KeyCode::Enter => self.confirm_create_playlist().await,
                KeyCode::Esc => self.model.lock().await.close_popup(),
                KeyCode::Backspace => self.edit_playlist_name(None).await,
                KeyCode::Char(c) => self.edit_playlist_name(Some(c)).await,
                _ => {}
            },
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{controller, track};
    use crate::model::{ActiveSection, BlockingScreen, Popup};
    use crate::player::fake::WidgetCall;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn typing_goes_into_search_box() {
        let (controller, _fake) = controller("input-search").await;
        for c in ['q', 'n'] {
            controller.handle_key_event(key(KeyCode::Char(c))).await.unwrap();
        }
        controller.handle_key_event(key(KeyCode::Backspace)).await.unwrap();
        let model = controller.model.lock().await;
        assert_eq!(model.ui.search_query, "q");
        assert!(!model.should_quit());
    }

    #[tokio::test]
    async fn ctrl_q_quits_from_search() {
        let (controller, _fake) = controller("input-ctrlq").await;
        controller
            .handle_key_event(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL))
            .await
            .unwrap();
        assert!(controller.model.lock().await.should_quit());
    }

    #[tokio::test]
    async fn space_toggles_playback_outside_search() {
        let (controller, fake) = controller("input-space").await;
        controller.play_track(track("a"), vec![]).await;
        controller.model.lock().await.set_active_section(ActiveSection::Library);
        controller.handle_key_event(key(KeyCode::Char(' '))).await.unwrap();
        assert_eq!(fake.last_call(), Some(WidgetCall::Pause));
    }

    #[tokio::test]
    async fn error_swallows_keys_until_dismissed() {
        let (controller, fake) = controller("input-error").await;
        controller.play_track(track("a"), vec![]).await;
        {
            let mut model = controller.model.lock().await;
            model.set_active_section(ActiveSection::Library);
            model.set_error("boom".to_string());
        }
        controller.handle_key_event(key(KeyCode::Char('n'))).await.unwrap();
        assert_eq!(fake.calls().len(), 1);

        controller.handle_key_event(key(KeyCode::Esc)).await.unwrap();
        assert!(!controller.model.lock().await.has_error());
    }

    #[tokio::test]
    async fn blocking_screen_dismisses_on_enter() {
        let (controller, _fake) = controller("input-blocking").await;
        controller.model.lock().await.show_blocking(BlockingScreen::Diagnostic {
            problems: vec!["No API key".to_string()],
        });
        controller.handle_key_event(key(KeyCode::Char('x'))).await.unwrap();
        assert!(controller.model.lock().await.ui.blocking.is_some());
        controller.handle_key_event(key(KeyCode::Enter)).await.unwrap();
        assert!(controller.model.lock().await.ui.blocking.is_none());
    }

    #[tokio::test]
    async fn create_playlist_popup_takes_text() {
        let (controller, _fake) = controller("input-create").await;
        controller.model.lock().await.set_active_section(ActiveSection::Playlists);
        controller.handle_key_event(key(KeyCode::Char('c'))).await.unwrap();
        for c in "Gym".chars() {
            controller.handle_key_event(key(KeyCode::Char(c))).await.unwrap();
        }
        assert_eq!(
            controller.model.lock().await.ui.popup,
            Some(Popup::CreatePlaylist { name: "Gym".to_string() })
        );
        controller.handle_key_event(key(KeyCode::Enter)).await.unwrap();
        let model = controller.model.lock().await;
        assert!(model.ui.popup.is_none());
        assert!(model.ui.playlists.iter().any(|p| p.name == "Gym"));
    }

    #[tokio::test]
    async fn help_opens_and_closes() {
        let (controller, _fake) = controller("input-help").await;
        controller.model.lock().await.set_active_section(ActiveSection::Library);
        controller.handle_key_event(key(KeyCode::Char('?'))).await.unwrap();
        assert_eq!(controller.model.lock().await.ui.popup, Some(Popup::Help));
        controller.handle_key_event(key(KeyCode::Esc)).await.unwrap();
        assert!(controller.model.lock().await.ui.popup.is_none());
    }
}
