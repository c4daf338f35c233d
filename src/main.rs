mod auth;
mod cli;
mod config;
mod controller;
mod download;
mod error;
mod logging;
mod model;
mod player;
mod view;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::Mutex;

use auth::LinkedToken;
use cli::{Args, Command};
use config::AppConfig;
use controller::AppController;
use model::{AppModel, BlockingScreen, Library, Settings, Track, YouTubeClient};
use view::AppView;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = AppConfig::load()?;

    if let Err(e) = logging::init_logging(&config.log_dir()) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    match args.command {
        None => run_tui(config).await,
        Some(command) => run_command(command, config).await,
    }
}

fn local_username() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_default()
}

// ============================================================================
// Headless commands
// ============================================================================

fn require_api_key(config: &AppConfig) -> Result<()> {
    if config.api_key().is_none() {
        bail!(error::ConfigError::MissingApiKey {
            path: AppConfig::config_path(),
        });
    }
    Ok(())
}

fn print_tracks(tracks: &[Track]) {
    if tracks.is_empty() {
        println!("No results");
        return;
    }
    for track in tracks {
        println!(
            "{:<12} {:>8}  {} - {}",
            track.video_id,
            view::format_duration(track.duration_secs),
            track.title,
            track.artist
        );
    }
}

fn open_library(config: &AppConfig) -> Result<Library> {
    let mut library = Library::open(config.library_path())?;
    library.ensure_profile(&local_username())?;
    Ok(library)
}

async fn program_available(program: &str, version_flag: &str) -> bool {
    tokio::process::Command::new(program)
        .arg(version_flag)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

async fn run_command(command: Command, config: AppConfig) -> Result<()> {
    tracing::info!(command = command.name(), "Running headless command");
    match command {
        Command::Search { query } => {
            require_api_key(&config)?;
            let youtube = YouTubeClient::new(&config, None);
            print_tracks(&youtube.search(&query.join(" ")).await?);
        }
        Command::Trending => {
            require_api_key(&config)?;
            let youtube = YouTubeClient::new(&config, None);
            print_tracks(&youtube.trending().await?);
        }
        Command::Download { video_id, dir } => {
            let dir = dir.unwrap_or_else(|| config.download_dir());
            let result = download::download_audio(&config.ytdlp_path, &video_id, &dir).await?;
            println!("{}", result.file_path.display());
        }
        Command::Link { token, expires_in } => {
            let token = LinkedToken::new(token, Some(expires_in));
            if token.access_token.is_empty() {
                bail!("Token is empty");
            }
            let mut library = open_library(&config)?;
            library.link_token(token)?;
            println!("Linked account token stored in {}", library.path().display());
        }
        Command::Unlink => {
            let mut library = open_library(&config)?;
            library.unlink_token()?;
            println!("Linked account token removed");
        }
        Command::Profile { display_name, email } => {
            let mut library = open_library(&config)?;
            if display_name.is_some() || email.is_some() {
                library.update_profile(display_name.as_deref(), email.as_deref())?;
            }
            if let Some(user) = library.user() {
                println!("Username:     {}", user.username);
                println!("Display name: {}", user.display_name);
                println!("Email:        {}", user.email);
                println!("Linked:       {}", if user.linked_token.is_some() { "yes" } else { "no" });
            }
            if let Some(token) = library.linked_token().cloned() {
                if config.api_key().is_some() {
                    let youtube = YouTubeClient::new(&config, Some(token));
                    match youtube.my_channel().await {
                        Ok(channel) => println!("Channel:      {} ({})", channel.title, channel.id),
                        Err(e) => println!("Channel:      unavailable ({})", e),
                    }
                }
            }
        }
        Command::Playlists => {
            let library = open_library(&config)?;
            for playlist in library.playlists() {
                println!("{:<24} {:>4}  {}", playlist.id, playlist.tracks.len(), playlist.name);
            }
        }
        Command::RenamePlaylist { id, name } => {
            let mut library = open_library(&config)?;
            library.rename_playlist(&id, &name)?;
            println!("Renamed playlist {} to {}", id, name.trim());
        }
        Command::DeleteAccount { yes } => {
            if !yes {
                bail!("Refusing to delete the account without --yes");
            }
            let mut library = Library::open(config.library_path())?;
            library.delete_account()?;
            println!("Account and playlists deleted");
        }
        Command::Doctor => {
            let problems = config.problems();
            println!("Config file: {}", AppConfig::config_path().display());
            println!("Library:     {}", config.library_path().display());
            println!("Logs:        {}", config.log_dir().display());

            let mpv = program_available(&config.mpv_path, "--version").await;
            let ytdlp = program_available(&config.ytdlp_path, "--version").await;
            println!("mpv:         {}", if mpv { "ok" } else { "not found" });
            println!("yt-dlp:      {}", if ytdlp { "ok" } else { "not found" });

            for problem in &problems {
                println!("Problem: {}", problem);
            }
            if !problems.is_empty() || !mpv {
                bail!("{} problem(s) found", problems.len() + usize::from(!mpv));
            }
            println!("Everything looks good");
        }
        Command::GenerateConfig => {
            print!("{}", AppConfig::default().to_toml());
        }
    }
    Ok(())
}

// ============================================================================
// TUI
// ============================================================================

/// Build the model, routing startup problems to blocking screens
fn build_model(config: &AppConfig) -> Result<AppModel> {
    let settings = Settings::load(&AppConfig::state_path());

    let path = config.library_path();
    let mut blocking = None;
    let mut library = match Library::open(&path) {
        Ok(library) => library,
        Err(e) if e.is_permission_denied() => {
            tracing::error!(error = %e, "Library is not readable");
            blocking = Some(BlockingScreen::PermissionGuidance {
                path: path.display().to_string(),
            });
            Library::empty(&path)
        }
        Err(e) => return Err(e.into()),
    };
    let profile_error = library.ensure_profile(&local_username()).err();

    let mut model = AppModel::new(config.clone(), settings, library);

    let problems = config.problems();
    if !problems.is_empty() {
        tracing::warn!(count = problems.len(), "Configuration problems found");
        model.show_blocking(BlockingScreen::Diagnostic {
            problems: problems.iter().map(ToString::to_string).collect(),
        });
    }
    if let Some(e) = profile_error {
        model.report_library_error(&e);
    }
    if let Some(screen) = blocking {
        model.show_blocking(screen);
    }
    Ok(model)
}

#[cfg(unix)]
fn start_player(controller: &AppController, config: &AppConfig, settings: &Settings) {
    let controller = controller.clone();
    let options = player::MpvOptions::new(config.mpv_path.clone(), settings.audio_only, settings.volume);
    tokio::spawn(async move {
        match player::MpvWidget::spawn(options).await {
            Ok(widget) => controller.attach_widget(Arc::new(widget)).await,
            Err(e) => {
                tracing::error!(error = %e, "Failed to start player");
                controller.show_error(e).await;
            }
        }
    });
}

#[cfg(not(unix))]
fn start_player(controller: &AppController, _config: &AppConfig, _settings: &Settings) {
    let controller = controller.clone();
    tokio::spawn(async move {
        controller
            .model
            .lock()
            .await
            .set_error("Playback through mpv is only supported on Unix systems.".to_string());
    });
}

async fn run_tui(config: AppConfig) -> Result<()> {
    tracing::info!("=== Synapse Starting ===");

    let app_model = build_model(&config)?;
    let token = app_model.library.linked_token().cloned();
    let settings = app_model.settings.clone();
    let youtube = YouTubeClient::new(&config, token);

    let model = Arc::new(Mutex::new(app_model));
    let controller = AppController::new(model.clone(), youtube);

    start_player(&controller, &config, &settings);

    if config.api_key().is_some() {
        let controller_for_init = controller.clone();
        tokio::spawn(async move {
            controller_for_init.load_home().await;
            controller_for_init.load_external_playlists().await;
        });
    }

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model.clone(), controller.clone()).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(widget) = controller.widget().await {
        if let Err(e) = widget.stop().await {
            tracing::debug!(error = %e, "Player stop on exit failed");
        }
    }

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("Synapse shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        let should_quit = {
            let mut model_guard = model.lock().await;

            // Auto-clear old errors (after 5 seconds)
            model_guard.auto_clear_old_errors();

            terminal.draw(|f| AppView::render(f, &model_guard))?;
            model_guard.should_quit()
        };

        if should_quit {
            break;
        }

        // Short poll keeps the progress bar smooth
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }
    }

    Ok(())
}
