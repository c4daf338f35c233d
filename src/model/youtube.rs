//! Video platform client (YouTube Data API v3).
//!
//! Public calls use the configured API key. Calls about the linked account
//! (`mine=true`) send its bearer token instead.

use std::collections::HashMap;
use std::sync::Arc;

use rand::seq::SliceRandom;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use super::types::{
    ChannelDetails, ChannelFeed, Page, Playlist, PlaylistKind, PlaylistSource, Subscription, Track,
};
use crate::auth::LinkedToken;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::{log_api_request, log_api_result};

type Result<T> = std::result::Result<T, ApiError>;

/// Anything this short is a Short, not a song
pub const SHORTS_MAX_SECS: u32 = 61;
pub const FEED_TRACKS_PER_CHANNEL: usize = 6;
const MUSIC_CATEGORY_ID: &str = "10";
const PAGE_SIZE: u32 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Auth {
    Key,
    User,
    /// Bearer token when one is usable, API key otherwise
    Either,
}

/// YouTube API client with an optional linked-account token
#[derive(Clone)]
pub struct YouTubeClient {
    http: Client,
    base_url: String,
    api_key: String,
    region_code: String,
    max_results: u32,
    token: Arc<RwLock<Option<LinkedToken>>>,
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    items: Vec<ApiItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiItem {
    id: Option<ItemId>,
    snippet: Option<Snippet>,
    content_details: Option<ContentDetails>,
    statistics: Option<Statistics>,
}

/// `id` is a plain string everywhere except in search results
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ItemId {
    Plain(String),
    Resource(ResourceId),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: Option<String>,
    channel_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    channel_id: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
    resource_id: Option<ResourceId>,
    video_owner_channel_id: Option<String>,
    video_owner_channel_title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentDetails {
    duration: Option<String>,
    video_id: Option<String>,
    item_count: Option<u32>,
    related_playlists: Option<RelatedPlaylists>,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: Option<String>,
}

/// Counts arrive as decimal strings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    subscriber_count: Option<String>,
    video_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

// ============================================================================
// Pure helpers
// ============================================================================

/// Parse an ISO-8601 duration such as `PT1H2M3S` or `P1DT5M` into seconds.
/// Anything malformed is 0.
pub fn parse_duration(iso: &str) -> u32 {
    let Some(rest) = iso.strip_prefix('P') else {
        return 0;
    };
    let mut total: u64 = 0;
    let mut number: u64 = 0;
    let mut in_time = false;

    for c in rest.chars() {
        if let Some(digit) = c.to_digit(10) {
            number = number.saturating_mul(10).saturating_add(digit as u64);
            continue;
        }
        let unit = match (c, in_time) {
            ('T', false) => {
                in_time = true;
                continue;
            }
            ('W', false) => 7 * 86_400,
            ('D', false) => 86_400,
            ('H', true) => 3_600,
            ('M', true) => 60,
            ('S', true) => 1,
            _ => return 0,
        };
        total = total.saturating_add(number.saturating_mul(unit));
        number = 0;
    }
    total.min(u32::MAX as u64) as u32
}

pub fn is_short(track: &Track) -> bool {
    track.duration_secs <= SHORTS_MAX_SECS
}

/// Search snippets come HTML-escaped
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

fn best_thumbnail(thumbnails: &Thumbnails) -> String {
    thumbnails
        .high
        .as_ref()
        .or(thumbnails.medium.as_ref())
        .or(thumbnails.default.as_ref())
        .map(|t| t.url.clone())
        .unwrap_or_default()
}

fn video_id_of(item: &ApiItem) -> Option<String> {
    let from_details = item.content_details.as_ref().and_then(|d| d.video_id.clone());
    let from_resource = item
        .snippet
        .as_ref()
        .and_then(|s| s.resource_id.as_ref())
        .and_then(|r| r.video_id.clone());
    let from_id = match &item.id {
        Some(ItemId::Plain(id)) => Some(id.clone()),
        Some(ItemId::Resource(r)) => r.video_id.clone(),
        None => None,
    };
    // playlistItems carry their own item id in `id`, so prefer the others
    from_details.or(from_resource).or(from_id)
}

fn plain_id(item: &ApiItem) -> Option<String> {
    match &item.id {
        Some(ItemId::Plain(id)) => Some(id.clone()),
        Some(ItemId::Resource(r)) => r.channel_id.clone(),
        None => None,
    }
}

/// Build a track from any video-shaped item. Durations come from the item
/// itself or from a separate `/videos` lookup.
fn track_from_item(item: &ApiItem, durations: &HashMap<String, u32>) -> Option<Track> {
    let snippet = item.snippet.as_ref()?;
    let video_id = video_id_of(item)?;
    let duration_secs = item
        .content_details
        .as_ref()
        .and_then(|d| d.duration.as_deref())
        .map(parse_duration)
        .or_else(|| durations.get(&video_id).copied())
        .unwrap_or(0);

    Some(Track {
        video_id,
        title: decode_entities(&snippet.title),
        artist: decode_entities(
            snippet
                .video_owner_channel_title
                .as_deref()
                .unwrap_or(&snippet.channel_title),
        ),
        channel_id: snippet
            .video_owner_channel_id
            .clone()
            .unwrap_or_else(|| snippet.channel_id.clone()),
        thumbnail: best_thumbnail(&snippet.thumbnails),
        duration_secs,
    })
}

fn durations_from(response: &ListResponse) -> HashMap<String, u32> {
    response
        .items
        .iter()
        .filter_map(|item| {
            let id = plain_id(item)?;
            let duration = item.content_details.as_ref()?.duration.as_deref()?;
            Some((id, parse_duration(duration)))
        })
        .collect()
}

fn music_tracks(response: &ListResponse, durations: &HashMap<String, u32>) -> Vec<Track> {
    response
        .items
        .iter()
        .filter_map(|item| track_from_item(item, durations))
        .filter(|track| !is_short(track))
        .collect()
}

/// Playlist entries whose owner vanished are deleted or private videos
fn playlist_tracks(response: &ListResponse, durations: &HashMap<String, u32>) -> Vec<Track> {
    response
        .items
        .iter()
        .filter(|item| {
            item.snippet
                .as_ref()
                .is_some_and(|s| s.video_owner_channel_id.is_some())
        })
        .filter_map(|item| track_from_item(item, durations))
        .collect()
}

fn channel_from_item(item: &ApiItem) -> Option<ChannelDetails> {
    let snippet = item.snippet.as_ref()?;
    let stats = item.statistics.as_ref();
    Some(ChannelDetails {
        id: plain_id(item)?,
        title: snippet.title.clone(),
        description: snippet.description.clone(),
        thumbnail: best_thumbnail(&snippet.thumbnails),
        subscriber_count: stats
            .and_then(|s| s.subscriber_count.as_deref())
            .and_then(|c| c.parse().ok()),
        video_count: stats
            .and_then(|s| s.video_count.as_deref())
            .and_then(|c| c.parse().ok()),
        uploads_playlist_id: item
            .content_details
            .as_ref()
            .and_then(|d| d.related_playlists.as_ref())
            .and_then(|r| r.uploads.clone()),
    })
}

fn playlist_from_item(item: &ApiItem) -> Option<Playlist> {
    let snippet = item.snippet.as_ref()?;
    Some(Playlist {
        id: plain_id(item)?,
        name: decode_entities(&snippet.title),
        owner_id: snippet.channel_id.clone(),
        owner_name: snippet.channel_title.clone(),
        tracks: Vec::new(),
        track_count: item
            .content_details
            .as_ref()
            .and_then(|d| d.item_count)
            .unwrap_or(0),
        source: PlaylistSource::YouTube,
        kind: PlaylistKind::Regular,
    })
}

fn subscription_from_item(item: &ApiItem) -> Option<Subscription> {
    let snippet = item.snippet.as_ref()?;
    let channel_id = snippet.resource_id.as_ref()?.channel_id.clone()?;
    Some(Subscription {
        channel_id,
        title: decode_entities(&snippet.title),
        thumbnail: best_thumbnail(&snippet.thumbnails),
    })
}

/// Keep channels that produced tracks, cut each to the newest few
fn build_feeds(results: Vec<(Subscription, Result<Page<Track>>)>) -> Vec<ChannelFeed> {
    results
        .into_iter()
        .filter_map(|(channel, result)| match result {
            Ok(page) => {
                let mut tracks = page.items;
                tracks.truncate(FEED_TRACKS_PER_CHANNEL);
                (!tracks.is_empty()).then_some(ChannelFeed { channel, tracks })
            }
            Err(e) => {
                tracing::warn!(channel = %channel.title, error = %e, "Dropping channel from feed");
                None
            }
        })
        .collect()
}

fn api_error(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                "empty response".to_string()
            } else {
                body.trim().to_string()
            }
        });
    ApiError::Api { status, message }
}

// ============================================================================
// Client
// ============================================================================

impl YouTubeClient {
    pub fn new(config: &AppConfig, token: Option<LinkedToken>) -> Self {
        Self {
            http: Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key().unwrap_or_default().to_string(),
            region_code: config.region_code.trim().to_uppercase(),
            max_results: config.max_results.clamp(1, PAGE_SIZE),
            token: Arc::new(RwLock::new(token)),
        }
    }

    pub async fn set_token(&self, token: Option<LinkedToken>) {
        *self.token.write().await = token;
    }

    pub async fn is_linked(&self) -> bool {
        self.token
            .read()
            .await
            .as_ref()
            .is_some_and(|t| t.usable().is_some())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        auth: Auth,
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let bearer = {
            let token = self.token.read().await;
            match (auth, token.as_ref()) {
                (Auth::Key, _) => None,
                (Auth::User, None) => return Err(ApiError::NotLinked),
                (Auth::User, Some(t)) => {
                    Some(t.usable().ok_or(ApiError::TokenExpired)?.to_string())
                }
                (Auth::Either, t) => t.and_then(|t| t.usable()).map(str::to_string),
            }
        };

        let mut request = self.http.get(&url).query(params);
        request = match bearer {
            Some(token) => request.bearer_auth(token),
            None => request.query(&[("key", self.api_key.as_str())]),
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }
        Ok(response.json::<T>().await?)
    }

    /// Durations for a batch of video ids (at most 50 per call)
    async fn durations(&self, ids: &[String]) -> Result<HashMap<String, u32>> {
        let mut durations = HashMap::new();
        for chunk in ids.chunks(PAGE_SIZE as usize) {
            let params = [
                ("part", "contentDetails".to_string()),
                ("id", chunk.join(",")),
            ];
            let response: ListResponse = self.get("videos", &params, Auth::Key).await?;
            durations.extend(durations_from(&response));
        }
        Ok(durations)
    }

    fn video_ids(response: &ListResponse) -> Vec<String> {
        response.items.iter().filter_map(video_id_of).collect()
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Track>> {
        log_api_request!("search", query = %query);
        let result = self.search_videos(query).await;
        log_api_result!("search", result);
        result
    }

    async fn search_videos(&self, query: &str) -> Result<Vec<Track>> {
        let params = [
            ("part", "snippet".to_string()),
            ("q", query.to_string()),
            ("type", "video".to_string()),
            ("maxResults", self.max_results.to_string()),
        ];
        let response: ListResponse = self.get("search", &params, Auth::Key).await?;
        let durations = self.durations(&Self::video_ids(&response)).await?;
        Ok(music_tracks(&response, &durations))
    }

    /// Most popular music videos in the configured region
    pub async fn trending(&self) -> Result<Vec<Track>> {
        log_api_request!("trending", region = %self.region_code);
        let params = [
            ("part", "snippet,contentDetails".to_string()),
            ("chart", "mostPopular".to_string()),
            ("videoCategoryId", MUSIC_CATEGORY_ID.to_string()),
            ("regionCode", self.region_code.clone()),
            ("maxResults", self.max_results.to_string()),
        ];
        let result = self
            .get::<ListResponse>("videos", &params, Auth::Key)
            .await
            .map(|response| music_tracks(&response, &HashMap::new()));
        log_api_result!("trending", result);
        result
    }

    pub async fn channel_details(&self, channel_id: &str) -> Result<ChannelDetails> {
        log_api_request!("channel_details", channel_id = %channel_id);
        let params = [
            ("part", "snippet,statistics,contentDetails".to_string()),
            ("id", channel_id.to_string()),
        ];
        let response: ListResponse = self.get("channels", &params, Auth::Key).await?;
        response
            .items
            .first()
            .and_then(channel_from_item)
            .ok_or_else(|| ApiError::NotFound(format!("Channel {}", channel_id)))
    }

    /// The linked account's own channel
    pub async fn my_channel(&self) -> Result<ChannelDetails> {
        let params = [
            ("part", "snippet,statistics,contentDetails".to_string()),
            ("mine", "true".to_string()),
        ];
        let response: ListResponse = self.get("channels", &params, Auth::User).await?;
        response
            .items
            .first()
            .and_then(channel_from_item)
            .ok_or_else(|| ApiError::NotFound("Linked channel".to_string()))
    }

    /// Newest uploads of a channel, shorts removed
    pub async fn channel_uploads(&self, channel_id: &str, page_token: Option<&str>) -> Result<Page<Track>> {
        log_api_request!("channel_uploads", channel_id = %channel_id);
        let mut params = vec![
            ("part", "snippet".to_string()),
            ("channelId", channel_id.to_string()),
            ("type", "video".to_string()),
            ("order", "date".to_string()),
            ("maxResults", PAGE_SIZE.to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        let response: ListResponse = self.get("search", &params, Auth::Key).await?;
        let durations = self.durations(&Self::video_ids(&response)).await?;
        Ok(Page {
            items: music_tracks(&response, &durations),
            next_page_token: response.next_page_token,
        })
    }

    pub async fn my_playlists(&self) -> Result<Vec<Playlist>> {
        log_api_request!("my_playlists", max = PAGE_SIZE);
        let params = [
            ("part", "snippet,contentDetails".to_string()),
            ("mine", "true".to_string()),
            ("maxResults", PAGE_SIZE.to_string()),
        ];
        let result = self
            .get::<ListResponse>("playlists", &params, Auth::User)
            .await
            .map(|response| response.items.iter().filter_map(playlist_from_item).collect());
        log_api_result!("my_playlists", result);
        result
    }

    pub async fn playlist_items(&self, playlist_id: &str, page_token: Option<&str>) -> Result<Page<Track>> {
        log_api_request!("playlist_items", playlist_id = %playlist_id);
        let mut params = vec![
            ("part", "snippet,contentDetails".to_string()),
            ("playlistId", playlist_id.to_string()),
            ("maxResults", PAGE_SIZE.to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        let response: ListResponse = self.get("playlistItems", &params, Auth::Either).await?;
        let durations = self.durations(&Self::video_ids(&response)).await?;
        Ok(Page {
            items: playlist_tracks(&response, &durations),
            next_page_token: response.next_page_token,
        })
    }

    pub async fn subscriptions(&self) -> Result<Vec<Subscription>> {
        log_api_request!("subscriptions", max = PAGE_SIZE);
        let params = [
            ("part", "snippet".to_string()),
            ("mine", "true".to_string()),
            ("order", "alphabetical".to_string()),
            ("maxResults", PAGE_SIZE.to_string()),
        ];
        let result = self
            .get::<ListResponse>("subscriptions", &params, Auth::User)
            .await
            .map(|response| response.items.iter().filter_map(subscription_from_item).collect());
        log_api_result!("subscriptions", result);
        result
    }

    /// Fetch every channel's uploads concurrently. Channels that fail or
    /// have nothing to show are left out.
    pub async fn subscription_feed(&self, subscriptions: &[Subscription]) -> Vec<ChannelFeed> {
        let fetches = subscriptions.iter().map(|sub| async move {
            (sub.clone(), self.channel_uploads(&sub.channel_id, None).await)
        });
        let results = futures::future::join_all(fetches).await;
        let mut feeds = build_feeds(results);
        feeds.shuffle(&mut rand::rng());
        tracing::info!(channels = subscriptions.len(), feeds = feeds.len(), "Subscription feed built");
        feeds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> ListResponse {
        serde_json::from_str(raw).unwrap()
    }

    const SEARCH: &str = r#"{
        "nextPageToken": "CAUQAA",
        "items": [
            {"id": {"kind": "youtube#video", "videoId": "song1"},
             "snippet": {"title": "Rock &amp; Roll", "channelId": "UCa", "channelTitle": "Band",
                         "thumbnails": {"default": {"url": "d.jpg"}, "high": {"url": "h.jpg"}}}},
            {"id": {"kind": "youtube#video", "videoId": "short1"},
             "snippet": {"title": "Clip", "channelId": "UCa", "channelTitle": "Band",
                         "thumbnails": {"default": {"url": "d2.jpg"}}}},
            {"id": {"kind": "youtube#video", "videoId": "nodetails"},
             "snippet": {"title": "Mystery", "channelId": "UCb", "channelTitle": "Other", "thumbnails": {}}}
        ]
    }"#;

    const DETAILS: &str = r#"{
        "items": [
            {"id": "song1", "contentDetails": {"duration": "PT3M45S"}},
            {"id": "short1", "contentDetails": {"duration": "PT45S"}}
        ]
    }"#;

    #[test]
    fn parses_iso_durations() {
        assert_eq!(parse_duration("PT3M45S"), 225);
        assert_eq!(parse_duration("PT1H2M3S"), 3723);
        assert_eq!(parse_duration("PT45S"), 45);
        assert_eq!(parse_duration("PT2H"), 7200);
        assert_eq!(parse_duration("P1DT1S"), 86_401);
        assert_eq!(parse_duration("P0D"), 0);
    }

    #[test]
    fn malformed_durations_are_zero() {
        assert_eq!(parse_duration(""), 0);
        assert_eq!(parse_duration("3M"), 0);
        assert_eq!(parse_duration("PT3X"), 0);
        assert_eq!(parse_duration("P3H"), 0);
    }

    #[test]
    fn search_results_drop_shorts_and_unknown_durations() {
        let search = parse(SEARCH);
        let durations = durations_from(&parse(DETAILS));
        let tracks = music_tracks(&search, &durations);

        assert_eq!(tracks.len(), 1);
        let track = &tracks[0];
        assert_eq!(track.video_id, "song1");
        assert_eq!(track.title, "Rock & Roll");
        assert_eq!(track.artist, "Band");
        assert_eq!(track.channel_id, "UCa");
        assert_eq!(track.thumbnail, "h.jpg");
        assert_eq!(track.duration_secs, 225);
    }

    #[test]
    fn sixty_one_seconds_is_still_a_short() {
        let mut track = Track {
            video_id: "x".to_string(),
            title: String::new(),
            artist: String::new(),
            channel_id: String::new(),
            thumbnail: String::new(),
            duration_secs: 61,
        };
        assert!(is_short(&track));
        track.duration_secs = 62;
        assert!(!is_short(&track));
    }

    #[test]
    fn trending_items_carry_their_own_duration() {
        let raw = r#"{"items": [
            {"id": "v1", "snippet": {"title": "Hit", "channelId": "UCx", "channelTitle": "Star",
             "thumbnails": {"medium": {"url": "m.jpg"}}},
             "contentDetails": {"duration": "PT4M"}}
        ]}"#;
        let tracks = music_tracks(&parse(raw), &HashMap::new());
        assert_eq!(tracks[0].video_id, "v1");
        assert_eq!(tracks[0].duration_secs, 240);
        assert_eq!(tracks[0].thumbnail, "m.jpg");
    }

    #[test]
    fn playlist_items_skip_deleted_videos() {
        let raw = r#"{"items": [
            {"id": "PLitem1",
             "snippet": {"title": "Song", "channelId": "UCme", "channelTitle": "Me",
                         "videoOwnerChannelId": "UCartist", "videoOwnerChannelTitle": "Artist",
                         "resourceId": {"kind": "youtube#video", "videoId": "vid1"}, "thumbnails": {}},
             "contentDetails": {"videoId": "vid1"}},
            {"id": "PLitem2",
             "snippet": {"title": "Deleted video", "channelId": "UCme", "channelTitle": "Me",
                         "resourceId": {"kind": "youtube#video", "videoId": "gone"}, "thumbnails": {}},
             "contentDetails": {"videoId": "gone"}}
        ]}"#;
        let durations = HashMap::from([("vid1".to_string(), 30)]);
        let tracks = playlist_tracks(&parse(raw), &durations);

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].video_id, "vid1");
        assert_eq!(tracks[0].artist, "Artist");
        assert_eq!(tracks[0].channel_id, "UCartist");
        // user-curated lists keep short entries
        assert_eq!(tracks[0].duration_secs, 30);
    }

    #[test]
    fn channel_details_parse_string_counts() {
        let raw = r#"{"items": [
            {"id": "UCa",
             "snippet": {"title": "Band", "description": "About", "thumbnails": {"default": {"url": "t.jpg"}}},
             "statistics": {"subscriberCount": "1200", "videoCount": "34", "hiddenSubscriberCount": false},
             "contentDetails": {"relatedPlaylists": {"uploads": "UUa"}}}
        ]}"#;
        let details = channel_from_item(&parse(raw).items[0]).unwrap();
        assert_eq!(details.id, "UCa");
        assert_eq!(details.subscriber_count, Some(1200));
        assert_eq!(details.video_count, Some(34));
        assert_eq!(details.uploads_playlist_id.as_deref(), Some("UUa"));
    }

    #[test]
    fn playlists_and_subscriptions_map() {
        let playlists = r#"{"items": [
            {"id": "PL1", "snippet": {"title": "Gym", "channelId": "UCme", "channelTitle": "Me", "thumbnails": {}},
             "contentDetails": {"itemCount": 12}}
        ]}"#;
        let playlist = playlist_from_item(&parse(playlists).items[0]).unwrap();
        assert_eq!(playlist.id, "PL1");
        assert_eq!(playlist.track_count, 12);
        assert_eq!(playlist.source, PlaylistSource::YouTube);

        let subs = r#"{"items": [
            {"id": "sub-id", "snippet": {"title": "Band",
             "resourceId": {"kind": "youtube#channel", "channelId": "UCa"},
             "thumbnails": {"default": {"url": "b.jpg"}}}}
        ]}"#;
        let sub = subscription_from_item(&parse(subs).items[0]).unwrap();
        assert_eq!(sub.channel_id, "UCa");
        assert_eq!(sub.thumbnail, "b.jpg");
    }

    #[test]
    fn feed_drops_failed_and_empty_channels() {
        let sub = |id: &str| Subscription {
            channel_id: id.to_string(),
            title: id.to_string(),
            thumbnail: String::new(),
        };
        let track = |id: String| Track {
            video_id: id,
            title: String::new(),
            artist: String::new(),
            channel_id: String::new(),
            thumbnail: String::new(),
            duration_secs: 200,
        };
        let many = Page {
            items: (0..10).map(|i| track(format!("v{}", i))).collect(),
            next_page_token: None,
        };
        let results = vec![
            (sub("full"), Ok(many)),
            (sub("empty"), Ok(Page::default())),
            (sub("broken"), Err(ApiError::NotLinked)),
        ];

        let feeds = build_feeds(results);
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].channel.channel_id, "full");
        assert_eq!(feeds[0].tracks.len(), FEED_TRACKS_PER_CHANNEL);
        assert_eq!(feeds[0].tracks[0].video_id, "v0");
    }

    #[test]
    fn error_bodies_are_unwrapped() {
        let body = r#"{"error": {"code": 403, "message": "The request cannot be completed because you have exceeded your quota."}}"#;
        match api_error(403, body) {
            ApiError::Api { status, message } => {
                assert_eq!(status, 403);
                assert!(message.contains("quota"));
            }
            other => panic!("unexpected error {:?}", other),
        }
        match api_error(500, "") {
            ApiError::Api { message, .. } => assert_eq!(message, "empty response"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn user_calls_need_a_linked_token() {
        let client = YouTubeClient::new(&AppConfig::default(), None);
        assert!(!client.is_linked().await);
        assert!(matches!(client.subscriptions().await, Err(ApiError::NotLinked)));

        client.set_token(Some(LinkedToken::new("old", Some(-60)))).await;
        assert!(matches!(client.my_playlists().await, Err(ApiError::TokenExpired)));
    }
}
