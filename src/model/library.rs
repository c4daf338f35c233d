//! Local document store for the user profile and playlists.
//!
//! Everything lives in a single `library.json`; every mutation is written
//! back before returning. The liked-songs playlist is created with the
//! profile, always sorts first and cannot be renamed or deleted.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::types::{
    AuthProvider, LIKED_SONGS_NAME, Playlist, PlaylistKind, PlaylistSource, Track, User,
};
use crate::auth::LinkedToken;
use crate::error::LibraryError;

type Result<T> = std::result::Result<T, LibraryError>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct LibraryDocument {
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    playlists: Vec<Playlist>,
}

#[derive(Debug)]
pub struct Library {
    path: PathBuf,
    doc: LibraryDocument,
}

fn new_id() -> String {
    format!("{:016x}", rand::random::<u64>())
}

fn io_error(path: &Path, source: io::Error) -> LibraryError {
    LibraryError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn validate_email(email: &str) -> Result<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if valid && !email.chars().any(char::is_whitespace) {
        Ok(())
    } else {
        Err(LibraryError::InvalidProfile(format!("'{}' is not a valid email", email)))
    }
}

fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() || username.chars().any(char::is_whitespace) {
        return Err(LibraryError::InvalidProfile(
            "username must be non-empty and contain no spaces".to_string(),
        ));
    }
    Ok(())
}

impl Library {
    /// Open the store at `path`. A missing file is an empty library.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let doc = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => LibraryDocument::default(),
            Err(e) => return Err(io_error(&path, e)),
        };
        let mut library = Self { path, doc };
        library.sort_liked_first();
        tracing::debug!(
            path = %library.path.display(),
            playlists = library.doc.playlists.len(),
            has_profile = library.doc.user.is_some(),
            "Library loaded"
        );
        Ok(library)
    }

    /// Empty in-memory library for when `path` cannot be read. Writes will
    /// keep failing until the file becomes accessible.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            doc: LibraryDocument::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
        }
        let content = serde_json::to_string_pretty(&self.doc)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|e| io_error(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, e))?;
        Ok(())
    }

    // ========================================================================
    // Profile
    // ========================================================================

    pub fn user(&self) -> Option<&User> {
        self.doc.user.as_ref()
    }

    pub fn create_profile(&mut self, username: &str, display_name: &str, email: &str) -> Result<&User> {
        let username = username.trim();
        let email = email.trim();
        validate_username(username)?;
        validate_email(email)?;
        let display_name = match display_name.trim() {
            "" => username,
            name => name,
        };

        self.doc.user = Some(User {
            id: new_id(),
            username: username.to_string(),
            display_name: display_name.to_string(),
            email: email.to_string(),
            avatar_url: String::new(),
            provider: AuthProvider::Local,
            linked_token: None,
        });
        self.ensure_liked_songs();
        self.save()?;
        tracing::info!(username, "Profile created");
        self.doc.user.as_ref().ok_or(LibraryError::NoProfile)
    }

    /// Create a local profile named after `username` when none exists
    pub fn ensure_profile(&mut self, username: &str) -> Result<&User> {
        if self.doc.user.is_none() {
            let username: String = username.chars().filter(|c| !c.is_whitespace()).collect();
            let username = if username.is_empty() { "listener".to_string() } else { username };
            let email = format!("{}@localhost.local", username);
            self.create_profile(&username, &username, &email)?;
        } else if self.ensure_liked_songs() {
            self.save()?;
        }
        self.doc.user.as_ref().ok_or(LibraryError::NoProfile)
    }

    pub fn update_profile(&mut self, display_name: Option<&str>, email: Option<&str>) -> Result<()> {
        if let Some(email) = email {
            validate_email(email.trim())?;
        }
        let user = self.doc.user.as_mut().ok_or(LibraryError::NoProfile)?;
        if let Some(name) = display_name.map(str::trim).filter(|n| !n.is_empty()) {
            user.display_name = name.to_string();
            for playlist in self.doc.playlists.iter_mut() {
                if playlist.owner_id == user.id {
                    playlist.owner_name = user.display_name.clone();
                }
            }
        }
        if let Some(email) = email {
            user.email = email.trim().to_string();
        }
        self.save()
    }

    /// Remove the profile together with every playlist
    pub fn delete_account(&mut self) -> Result<()> {
        self.doc.user = None;
        self.doc.playlists.clear();
        self.save()?;
        tracing::info!("Account deleted");
        Ok(())
    }

    pub fn link_token(&mut self, token: LinkedToken) -> Result<()> {
        let user = self.doc.user.as_mut().ok_or(LibraryError::NoProfile)?;
        user.linked_token = Some(token);
        user.provider = AuthProvider::Google;
        self.save()
    }

    pub fn unlink_token(&mut self) -> Result<()> {
        let user = self.doc.user.as_mut().ok_or(LibraryError::NoProfile)?;
        user.linked_token = None;
        user.provider = AuthProvider::Local;
        self.save()
    }

    pub fn linked_token(&self) -> Option<&LinkedToken> {
        self.doc.user.as_ref().and_then(|u| u.linked_token.as_ref())
    }

    // ========================================================================
    // Playlists
    // ========================================================================

    pub fn playlists(&self) -> &[Playlist] {
        &self.doc.playlists
    }

    pub fn playlist(&self, id: &str) -> Option<&Playlist> {
        self.doc.playlists.iter().find(|p| p.id == id)
    }

    fn playlist_mut(&mut self, id: &str) -> Result<&mut Playlist> {
        self.doc
            .playlists
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| LibraryError::PlaylistNotFound(id.to_string()))
    }

    pub fn liked_songs(&self) -> Option<&Playlist> {
        self.doc.playlists.iter().find(|p| p.is_liked_songs())
    }

    fn sort_liked_first(&mut self) {
        if let Some(pos) = self.doc.playlists.iter().position(Playlist::is_liked_songs) {
            if pos != 0 {
                let liked = self.doc.playlists.remove(pos);
                self.doc.playlists.insert(0, liked);
            }
        }
    }

    /// Make sure the profile owns a liked-songs playlist at the front.
    /// Returns true when the document changed.
    pub fn ensure_liked_songs(&mut self) -> bool {
        let Some(user) = &self.doc.user else {
            return false;
        };
        if self.liked_songs().is_some() {
            let first_is_liked = self.doc.playlists.first().is_some_and(Playlist::is_liked_songs);
            self.sort_liked_first();
            return !first_is_liked;
        }
        let liked = Playlist {
            id: new_id(),
            name: LIKED_SONGS_NAME.to_string(),
            owner_id: user.id.clone(),
            owner_name: user.display_name.clone(),
            tracks: Vec::new(),
            track_count: 0,
            source: PlaylistSource::Local,
            kind: PlaylistKind::LikedSongs,
        };
        self.doc.playlists.insert(0, liked);
        true
    }

    pub fn create_playlist(&mut self, name: &str) -> Result<&Playlist> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::EmptyName);
        }
        let user = self.doc.user.as_ref().ok_or(LibraryError::NoProfile)?;
        let playlist = Playlist {
            id: new_id(),
            name: name.to_string(),
            owner_id: user.id.clone(),
            owner_name: user.display_name.clone(),
            tracks: Vec::new(),
            track_count: 0,
            source: PlaylistSource::Local,
            kind: PlaylistKind::Regular,
        };
        tracing::info!(id = %playlist.id, name, "Playlist created");
        self.doc.playlists.push(playlist);
        self.save()?;
        self.doc.playlists.last().ok_or(LibraryError::EmptyName)
    }

    pub fn rename_playlist(&mut self, id: &str, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::EmptyName);
        }
        let playlist = self.playlist_mut(id)?;
        if playlist.is_liked_songs() {
            return Err(LibraryError::Protected(playlist.name.clone()));
        }
        playlist.name = name.to_string();
        self.save()
    }

    pub fn delete_playlist(&mut self, id: &str) -> Result<()> {
        let playlist = self.playlist_mut(id)?;
        if playlist.is_liked_songs() {
            return Err(LibraryError::Protected(playlist.name.clone()));
        }
        self.doc.playlists.retain(|p| p.id != id);
        tracing::info!(id, "Playlist deleted");
        self.save()
    }

    /// Append `track`. Returns false when it was already there.
    pub fn add_track(&mut self, playlist_id: &str, track: Track) -> Result<bool> {
        let playlist = self.playlist_mut(playlist_id)?;
        if playlist.contains(&track.video_id) {
            return Ok(false);
        }
        playlist.tracks.push(track);
        playlist.track_count = playlist.tracks.len() as u32;
        self.save()?;
        Ok(true)
    }

    /// Returns false when the track was not in the playlist
    pub fn remove_track(&mut self, playlist_id: &str, video_id: &str) -> Result<bool> {
        let playlist = self.playlist_mut(playlist_id)?;
        let before = playlist.tracks.len();
        playlist.tracks.retain(|t| t.video_id != video_id);
        if playlist.tracks.len() == before {
            return Ok(false);
        }
        playlist.track_count = playlist.tracks.len() as u32;
        self.save()?;
        Ok(true)
    }

    pub fn is_liked(&self, video_id: &str) -> bool {
        self.liked_songs().is_some_and(|p| p.contains(video_id))
    }

    /// Like or unlike `track`. Returns whether it is liked afterwards.
    pub fn toggle_like(&mut self, track: &Track) -> Result<bool> {
        if self.doc.user.is_none() {
            return Err(LibraryError::NoProfile);
        }
        self.ensure_liked_songs();
        let liked_id = self
            .liked_songs()
            .map(|p| p.id.clone())
            .ok_or(LibraryError::NoProfile)?;

        if self.is_liked(&track.video_id) {
            self.remove_track(&liked_id, &track.video_id)?;
            Ok(false)
        } else {
            self.add_track(&liked_id, track.clone())?;
            Ok(true)
        }
    }
}
