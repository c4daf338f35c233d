//! Playback queue: the ordered list being played and the position in it.
//!
//! Every operation is a plain state transition on `&mut self`, so the
//! controller decides separately what to tell the player widget.
//!
//! Invariants:
//! - `index` is `None` exactly when nothing is loaded, and then `list` is empty
//! - when `index` is `Some(i)`, `i < list.len()`
//! - `playing` is never true while nothing is loaded

use super::types::Track;

/// Observable configuration of the queue
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueStatus {
    Empty,
    Paused,
    Playing,
}

#[derive(Clone, Debug, Default)]
pub struct PlaybackQueue {
    list: Vec<Track>,
    index: Option<usize>,
    playing: bool,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start playing `track`, using `context` as the new list when it is not
    /// empty. The track is located in the context by video id; a context
    /// that does not contain it is ignored.
    pub fn play(&mut self, track: Track, context: Vec<Track>) {
        let position = context.iter().position(|t| t.same_video(&track));
        match position {
            Some(i) => {
                self.list = context;
                self.index = Some(i);
            }
            None => {
                self.list = vec![track];
                self.index = Some(0);
            }
        }
        self.playing = true;
    }

    pub fn toggle_play(&mut self) {
        if self.index.is_some() {
            self.playing = !self.playing;
        }
    }

    /// Advance one track. Running off the end clears the queue.
    pub fn next(&mut self) {
        match self.index {
            Some(i) if i + 1 < self.list.len() => {
                self.index = Some(i + 1);
                self.playing = true;
            }
            _ => self.clear(),
        }
    }

    /// Step back one track. At the first track this does nothing.
    pub fn previous(&mut self) {
        if let Some(i) = self.index {
            if i > 0 {
                self.index = Some(i - 1);
                self.playing = true;
            }
        }
    }

    /// Append `track` unless a track with the same video id is queued.
    /// Queueing into an empty queue starts it immediately.
    pub fn add_to_queue(&mut self, track: Track) {
        if self.list.iter().any(|t| t.same_video(&track)) {
            return;
        }
        self.list.push(track);
        if self.index.is_none() {
            self.index = Some(0);
            self.playing = true;
        }
    }

    /// Mirror a play/pause reported by the player. Ignored while empty.
    pub fn set_playing(&mut self, playing: bool) {
        if self.index.is_some() {
            self.playing = playing;
        }
    }

    pub fn clear(&mut self) {
        self.list.clear();
        self.index = None;
        self.playing = false;
    }

    pub fn current(&self) -> Option<&Track> {
        self.index.and_then(|i| self.list.get(i))
    }

    pub fn upcoming(&self) -> &[Track] {
        match self.index {
            Some(i) => &self.list[i + 1..],
            None => &[],
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.list
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn status(&self) -> QueueStatus {
        match (self.index, self.playing) {
            (None, _) => QueueStatus::Empty,
            (Some(_), false) => QueueStatus::Paused,
            (Some(_), true) => QueueStatus::Playing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track {
            video_id: id.to_string(),
            title: format!("Title {}", id),
            artist: "Channel".to_string(),
            channel_id: "UC123".to_string(),
            thumbnail: String::new(),
            duration_secs: 200,
        }
    }

    fn ids(queue: &PlaybackQueue) -> Vec<&str> {
        queue.tracks().iter().map(|t| t.video_id.as_str()).collect()
    }

    fn loaded(list: &[&str], index: usize) -> PlaybackQueue {
        let tracks: Vec<Track> = list.iter().map(|id| track(id)).collect();
        let mut queue = PlaybackQueue::new();
        queue.play(tracks[index].clone(), tracks);
        queue
    }

    #[test]
    fn starts_empty() {
        let queue = PlaybackQueue::new();
        assert_eq!(queue.status(), QueueStatus::Empty);
        assert_eq!(queue.index(), None);
        assert!(queue.current().is_none());
        assert!(queue.upcoming().is_empty());
    }

    #[test]
    fn play_uses_context_and_finds_track() {
        let context = vec![track("a"), track("b"), track("c")];
        let mut queue = PlaybackQueue::new();
        queue.play(track("b"), context.clone());

        assert_eq!(queue.tracks(), context.as_slice());
        assert_eq!(queue.index(), Some(1));
        assert_eq!(queue.current().map(|t| t.video_id.as_str()), Some("b"));
        assert!(queue.is_playing());
    }

    #[test]
    fn play_matches_by_video_id_not_full_equality() {
        let mut stale = track("b");
        stale.title = "Old title".to_string();
        let mut queue = PlaybackQueue::new();
        queue.play(stale, vec![track("a"), track("b")]);

        assert_eq!(queue.index(), Some(1));
        assert_eq!(queue.current().unwrap().title, "Title b");
    }

    #[test]
    fn play_with_empty_context_is_singleton() {
        let mut queue = loaded(&["x", "y"], 1);
        queue.play(track("a"), vec![]);

        assert_eq!(ids(&queue), vec!["a"]);
        assert_eq!(queue.index(), Some(0));
        assert!(queue.is_playing());
    }

    #[test]
    fn play_with_context_missing_track_falls_back_to_singleton() {
        let mut queue = PlaybackQueue::new();
        queue.play(track("z"), vec![track("a"), track("b")]);

        assert_eq!(ids(&queue), vec!["z"]);
        assert_eq!(queue.index(), Some(0));
    }

    #[test]
    fn toggle_play_is_noop_when_empty() {
        let mut queue = PlaybackQueue::new();
        queue.toggle_play();
        assert_eq!(queue.status(), QueueStatus::Empty);
        assert!(!queue.is_playing());
    }

    #[test]
    fn toggle_play_flips_when_loaded() {
        let mut queue = loaded(&["a"], 0);
        queue.toggle_play();
        assert_eq!(queue.status(), QueueStatus::Paused);
        queue.toggle_play();
        assert_eq!(queue.status(), QueueStatus::Playing);
    }

    #[test]
    fn next_advances_and_plays() {
        let mut queue = loaded(&["a", "b", "c"], 0);
        queue.toggle_play();
        queue.next();

        assert_eq!(queue.index(), Some(1));
        assert!(queue.is_playing());
    }

    #[test]
    fn next_at_last_track_clears_everything() {
        let mut queue = loaded(&["a", "b"], 1);
        queue.next();

        assert!(queue.tracks().is_empty());
        assert_eq!(queue.index(), None);
        assert!(!queue.is_playing());
        assert_eq!(queue.status(), QueueStatus::Empty);
    }

    #[test]
    fn next_on_empty_stays_empty() {
        let mut queue = PlaybackQueue::new();
        queue.next();
        assert_eq!(queue.status(), QueueStatus::Empty);
    }

    #[test]
    fn previous_at_first_track_changes_nothing() {
        let mut queue = loaded(&["a", "b"], 0);
        queue.toggle_play();
        queue.previous();

        assert_eq!(queue.index(), Some(0));
        assert_eq!(ids(&queue), vec!["a", "b"]);
        assert!(!queue.is_playing());
    }

    #[test]
    fn previous_steps_back_and_plays() {
        let mut queue = loaded(&["a", "b", "c"], 2);
        queue.toggle_play();
        queue.previous();

        assert_eq!(queue.index(), Some(1));
        assert!(queue.is_playing());
    }

    #[test]
    fn previous_on_empty_is_noop() {
        let mut queue = PlaybackQueue::new();
        queue.previous();
        assert_eq!(queue.status(), QueueStatus::Empty);
    }

    #[test]
    fn add_to_queue_skips_duplicates() {
        let mut queue = loaded(&["a", "b"], 0);
        queue.toggle_play();
        queue.add_to_queue(track("b"));

        assert_eq!(ids(&queue), vec!["a", "b"]);
        assert_eq!(queue.index(), Some(0));
        assert!(!queue.is_playing());
    }

    #[test]
    fn add_to_queue_when_empty_starts_playback() {
        let mut queue = PlaybackQueue::new();
        queue.add_to_queue(track("a"));

        assert_eq!(ids(&queue), vec!["a"]);
        assert_eq!(queue.index(), Some(0));
        assert!(queue.is_playing());
    }

    #[test]
    fn add_to_queue_when_loaded_keeps_position_and_flag() {
        let mut queue = loaded(&["a", "b"], 1);
        queue.toggle_play();
        queue.add_to_queue(track("c"));

        assert_eq!(ids(&queue), vec!["a", "b", "c"]);
        assert_eq!(queue.index(), Some(1));
        assert!(!queue.is_playing());
    }

    #[test]
    fn add_to_queue_twice_equals_once() {
        let mut once = loaded(&["a"], 0);
        once.add_to_queue(track("b"));

        let mut twice = loaded(&["a"], 0);
        twice.add_to_queue(track("b"));
        twice.add_to_queue(track("b"));

        assert_eq!(ids(&once), ids(&twice));
        assert_eq!(once.index(), twice.index());
        assert_eq!(once.is_playing(), twice.is_playing());
    }

    #[test]
    fn scenario_next_runs_off_the_end() {
        let mut queue = loaded(&["A", "B", "C"], 1);

        queue.next();
        assert_eq!(queue.index(), Some(2));
        assert!(queue.is_playing());
        assert_eq!(queue.current().unwrap().video_id, "C");

        queue.next();
        assert!(queue.tracks().is_empty());
        assert_eq!(queue.index(), None);
        assert!(!queue.is_playing());
    }

    #[test]
    fn scenario_enqueue_from_empty() {
        let mut queue = PlaybackQueue::new();

        queue.add_to_queue(track("A"));
        assert_eq!(queue.index(), Some(0));
        assert!(queue.is_playing());

        queue.add_to_queue(track("B"));
        assert_eq!(queue.index(), Some(0));
        assert_eq!(ids(&queue), vec!["A", "B"]);
    }

    #[test]
    fn set_playing_ignored_while_empty() {
        let mut queue = PlaybackQueue::new();
        queue.set_playing(true);
        assert_eq!(queue.status(), QueueStatus::Empty);

        let mut queue = loaded(&["a"], 0);
        queue.set_playing(false);
        assert_eq!(queue.status(), QueueStatus::Paused);
    }

    #[test]
    fn upcoming_lists_tracks_after_current() {
        let queue = loaded(&["a", "b", "c"], 1);
        let upcoming: Vec<&str> = queue.upcoming().iter().map(|t| t.video_id.as_str()).collect();
        assert_eq!(upcoming, vec!["c"]);
    }
}
