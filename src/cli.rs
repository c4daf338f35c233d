use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Synapse - music from the video platform, in your terminal
#[derive(Parser, Debug)]
#[command(name = "synapse", version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search for music and print the results
    Search {
        /// Search terms
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Print trending music for the configured region
    Trending,

    /// Download a video's audio as mp3 with yt-dlp
    Download {
        video_id: String,

        /// Target directory (defaults to the configured download directory)
        #[arg(long, short = 'd')]
        dir: Option<PathBuf>,
    },

    /// Store a bearer token for the linked account
    Link {
        token: String,

        /// Token lifetime in seconds
        #[arg(long, default_value_t = crate::auth::DEFAULT_TOKEN_LIFETIME_SECS)]
        expires_in: i64,
    },

    /// Forget the linked account token
    Unlink,

    /// Update the local profile
    Profile {
        #[arg(long)]
        display_name: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },

    /// List local playlists with their ids
    Playlists,

    /// Rename a local playlist
    RenamePlaylist { id: String, name: String },

    /// Delete the local profile and all of its playlists
    DeleteAccount {
        /// Required; there is no undo
        #[arg(long)]
        yes: bool,
    },

    /// Check configuration and external programs
    Doctor,

    /// Print a default config.toml to stdout
    GenerateConfig,
}

impl Command {
    /// Name for logs; arguments may hold secrets
    pub fn name(&self) -> &'static str {
        match self {
            Command::Search { .. } => "search",
            Command::Trending => "trending",
            Command::Download { .. } => "download",
            Command::Link { .. } => "link",
            Command::Unlink => "unlink",
            Command::Profile { .. } => "profile",
            Command::Playlists => "playlists",
            Command::RenamePlaylist { .. } => "rename-playlist",
            Command::DeleteAccount { .. } => "delete-account",
            Command::Doctor => "doctor",
            Command::GenerateConfig => "generate-config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_launches_tui() {
        let args = Args::try_parse_from(["synapse"]).unwrap();
        assert!(args.command.is_none());
    }

    #[test]
    fn search_joins_multiple_words() {
        let args = Args::try_parse_from(["synapse", "search", "daft", "punk"]).unwrap();
        match args.command {
            Some(Command::Search { query }) => assert_eq!(query.join(" "), "daft punk"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn link_defaults_lifetime() {
        let args = Args::try_parse_from(["synapse", "link", "tok"]).unwrap();
        match args.command {
            Some(Command::Link { token, expires_in }) => {
                assert_eq!(token, "tok");
                assert_eq!(expires_in, crate::auth::DEFAULT_TOKEN_LIFETIME_SECS);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(Args::try_parse_from(["synapse", "search"]).is_err());
    }

    #[test]
    fn profile_flags_are_optional() {
        let args = Args::try_parse_from(["synapse", "profile", "--email", "a@b.io"]).unwrap();
        match args.command {
            Some(Command::Profile { display_name, email }) => {
                assert_eq!(display_name, None);
                assert_eq!(email.as_deref(), Some("a@b.io"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
        let args = Args::try_parse_from(["synapse", "delete-account"]).unwrap();
        assert!(matches!(args.command, Some(Command::DeleteAccount { yes: false })));
    }
}
