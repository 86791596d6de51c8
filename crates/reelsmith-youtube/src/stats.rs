// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel counters from the YouTube Data API.
//!
//! `channels.list` gives the channel totals and its uploads playlist. The
//! playlist is paged for video ids and `videos.list` adds likes and comments
//! for each page. Playlist order is newest first, so the first page also
//! supplies the recent uploads.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use reelsmith_core::{ChannelStats, ReelsmithError, VideoStats};

/// Uploads listed individually.
pub const RECENT_VIDEOS: usize = 5;

/// Playlist pages scanned for like and comment totals.
pub const MAX_PAGES: usize = 20;

const PAGE_SIZE: usize = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    next_page_token: Option<String>,
}

/// The API reports counters as decimal strings and omits hidden ones.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Counters {
    view_count: Option<String>,
    subscriber_count: Option<String>,
    video_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Titled {
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Channel {
    snippet: Titled,
    #[serde(default)]
    statistics: Counters,
    content_details: Option<ChannelDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    content_details: PlaylistItemDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemDetails {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct Video {
    id: String,
    snippet: Titled,
    #[serde(default)]
    statistics: Counters,
}

fn count(value: &Option<String>) -> u64 {
    value.as_deref().and_then(|v| v.parse().ok()).unwrap_or(0)
}

async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: String,
) -> Result<T, ReelsmithError> {
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| ReelsmithError::Collaborator {
            message: format!("statistics request failed: {e}"),
            source: Some(Box::new(e)),
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ReelsmithError::collaborator(format!(
            "statistics request returned {status}: {body}"
        )));
    }
    response.json().await.map_err(|e| ReelsmithError::Collaborator {
        message: format!("failed to parse statistics response: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Collects the counters of the channel owning the client's token.
pub(crate) async fn fetch(
    client: &reqwest::Client,
    api_base_url: &str,
) -> Result<ChannelStats, ReelsmithError> {
    let channels: ListResponse<Channel> = get_json(
        client,
        format!("{api_base_url}/channels?part=snippet,statistics,contentDetails&mine=true"),
    )
    .await?;
    let channel = channels
        .items
        .into_iter()
        .next()
        .ok_or_else(|| ReelsmithError::collaborator("no YouTube channel for this account"))?;

    let mut stats = ChannelStats {
        title: channel.snippet.title,
        subscribers: count(&channel.statistics.subscriber_count),
        views: count(&channel.statistics.view_count),
        videos: count(&channel.statistics.video_count),
        ..ChannelStats::default()
    };
    let Some(uploads) = channel
        .content_details
        .and_then(|d| d.related_playlists.uploads)
    else {
        return Ok(stats);
    };

    let mut page_token: Option<String> = None;
    for page in 0..MAX_PAGES {
        let mut url = format!(
            "{api_base_url}/playlistItems?part=contentDetails&playlistId={uploads}&maxResults={PAGE_SIZE}"
        );
        if let Some(token) = &page_token {
            url.push_str(&format!("&pageToken={token}"));
        }
        let listing: ListResponse<PlaylistItem> = get_json(client, url).await?;
        if listing.items.is_empty() {
            break;
        }

        let ids: Vec<String> = listing
            .items
            .into_iter()
            .map(|item| item.content_details.video_id)
            .collect();
        let videos: ListResponse<Video> = get_json(
            client,
            format!(
                "{api_base_url}/videos?part=snippet,statistics&id={}",
                ids.join(",")
            ),
        )
        .await?;

        for video in &videos.items {
            stats.likes += count(&video.statistics.like_count);
            stats.comments += count(&video.statistics.comment_count);
        }
        // videos.list does not promise request order.
        for id in &ids {
            if stats.recent.len() == RECENT_VIDEOS {
                break;
            }
            if let Some(video) = videos.items.iter().find(|v| &v.id == id) {
                stats.recent.push(VideoStats {
                    title: video.snippet.title.clone(),
                    views: count(&video.statistics.view_count),
                    likes: count(&video.statistics.like_count),
                    comments: count(&video.statistics.comment_count),
                });
            }
        }
        debug!(page, videos = ids.len(), "scanned uploads page");

        page_token = listing.next_page_token;
        if page_token.is_none() {
            break;
        }
        if page + 1 == MAX_PAGES {
            warn!(pages = MAX_PAGES, "uploads playlist truncated, totals are partial");
        }
    }

    Ok(stats)
}
