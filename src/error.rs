//! Error types for each subsystem

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No API key configured. Set SYNAPSE_API_KEY or `api_key` in {path}")]
    MissingApiKey { path: PathBuf },

    #[error("Invalid region code '{0}' (expected two letters, e.g. US)")]
    InvalidRegion(String),

    #[error("Could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error("No linked account. Link one with `synapse link <token>`")]
    NotLinked,

    #[error("Linked account token expired. Link the account again")]
    TokenExpired,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Playlist name cannot be empty")]
    EmptyName,

    #[error("Playlist {0} not found")]
    PlaylistNotFound(String),

    #[error("'{0}' cannot be renamed or deleted")]
    Protected(String),

    #[error("No profile. Create one first")]
    NoProfile,

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Library storage error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Library document is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl LibraryError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, LibraryError::Io { source, .. } if source.kind() == io::ErrorKind::PermissionDenied)
    }

    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            LibraryError::Io { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("Failed to start player '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Player did not open its control socket in time")]
    ConnectTimeout,

    #[error("Player connection lost")]
    Disconnected,

    #[error("Player rejected command '{command}': {reason}")]
    Command { command: String, reason: String },

    #[error("Player I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Player protocol error: {0}")]
    Protocol(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Downloader exited with {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("Downloader did not report an output file")]
    NoOutput,

    #[error("Could not create download directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_is_detected() {
        let err = LibraryError::Io {
            path: PathBuf::from("/tmp/library.json"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(err.is_permission_denied());

        let other = LibraryError::Io {
            path: PathBuf::from("/tmp/library.json"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(!other.is_permission_denied());
        assert!(!LibraryError::EmptyName.is_permission_denied());
    }

    #[test]
    fn api_status_is_exposed() {
        let err = ApiError::Api {
            status: 403,
            message: "quotaExceeded".to_string(),
        };
        assert_eq!(err.status(), Some(403));
        assert_eq!(ApiError::NotLinked.status(), None);
    }
}
