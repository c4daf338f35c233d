//! Audio download through an external `yt-dlp`

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::error::DownloadError;
use crate::model::{Track, watch_url};

/// Result of a finished download
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadResult {
    pub file_path: PathBuf,
    pub video_id: String,
}

/// Arguments for extracting `video_id` as mp3 into `dir`. The final path
/// is printed on stdout once post-processing is done.
pub fn ytdlp_args(video_id: &str, dir: &Path) -> Vec<String> {
    vec![
        "--no-playlist".to_string(),
        "--no-progress".to_string(),
        "-x".to_string(),
        "--audio-format".to_string(),
        "mp3".to_string(),
        "-o".to_string(),
        dir.join("%(title)s.%(ext)s").display().to_string(),
        "--print".to_string(),
        "after_move:filepath".to_string(),
        watch_url(video_id),
    ]
}

/// Last non-empty stdout line is the written file
fn output_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .map(PathBuf::from)
}

pub async fn download_audio(program: &str, video_id: &str, dir: &Path) -> Result<DownloadResult, DownloadError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| DownloadError::Directory {
            path: dir.to_path_buf(),
            source,
        })?;

    tracing::info!(video_id, dir = %dir.display(), "Starting download");
    let output = Command::new(program)
        .args(ytdlp_args(video_id, dir))
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| DownloadError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::error!(video_id, code = ?output.status.code(), "Download failed");
        return Err(DownloadError::Failed {
            code: output.status.code(),
            stderr,
        });
    }

    let file_path = output_path(&String::from_utf8_lossy(&output.stdout)).ok_or(DownloadError::NoOutput)?;
    tracing::info!(video_id, file = %file_path.display(), "Download finished");
    Ok(DownloadResult {
        file_path,
        video_id: video_id.to_string(),
    })
}

pub async fn download_track(program: &str, track: &Track, dir: &Path) -> Result<DownloadResult, DownloadError> {
    download_audio(program, &track.video_id, dir).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_extract_audio_arguments() {
        let args = ytdlp_args("abc123", Path::new("/music"));
        assert_eq!(args.last().unwrap(), "https://www.youtube.com/watch?v=abc123");
        let format = args.iter().position(|a| a == "--audio-format").unwrap();
        assert_eq!(args[format + 1], "mp3");
        assert!(args.contains(&"-x".to_string()));
        assert!(args.contains(&"/music/%(title)s.%(ext)s".to_string()));
    }

    #[test]
    fn picks_last_printed_path() {
        let stdout = "\n/music/Song.mp3\n\n";
        assert_eq!(output_path(stdout), Some(PathBuf::from("/music/Song.mp3")));
        assert_eq!(output_path("  \n"), None);
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let dir = std::env::temp_dir().join(format!("synapse-dl-{}", std::process::id()));
        let err = download_audio("synapse-no-such-ytdlp", "abc", &dir).await.unwrap_err();
        assert!(matches!(err, DownloadError::Spawn { .. }));
    }
}
