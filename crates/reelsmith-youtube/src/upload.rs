// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resumable upload protocol for the YouTube Data API.
//!
//! 1. `POST {upload}/videos?uploadType=resumable` with the video resource
//!    returns a session URI in `Location`.
//! 2. Each chunk is `PUT` to the session with `Content-Range`. The server
//!    answers `308` with `Range: bytes=0-N` while incomplete and `200`/`201`
//!    with the video resource once the last byte is in.
//! 3. After a transient failure the driver sends `Content-Range: bytes */total`
//!    to learn the committed offset and resumes from there.
//!
//! Only one chunk is held in memory at a time.

use std::io::SeekFrom;
use std::path::Path;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{CONTENT_LENGTH, CONTENT_RANGE, LOCATION, RANGE};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, info, warn};

use reelsmith_core::{Artifact, ReelsmithError};

/// `videos.insert` request body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VideoResource {
    pub snippet: Snippet,
    pub status: PrivacyStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyStatus {
    pub privacy_status: String,
}

#[derive(Debug, Deserialize)]
struct UploadedVideo {
    id: String,
}

/// Server answer to a chunk or an offset query.
#[derive(Debug, PartialEq, Eq)]
enum Progress {
    /// Bytes `0..next` are stored; continue from `next`.
    Committed(u64),
    /// Upload finished; carries the remote video id.
    Done(String),
}

#[derive(Debug)]
enum ChunkError {
    /// Worth asking for the committed offset and trying again.
    Transient(ReelsmithError),
    Fatal(ReelsmithError),
}

#[derive(Debug, Clone)]
pub struct ResumableUploader {
    client: reqwest::Client,
    upload_base_url: String,
    chunk_size: u64,
    max_chunk_retries: u32,
    retry_delay: Duration,
}

impl ResumableUploader {
    /// `client` must carry the authorization header and must not follow redirects.
    pub fn new(
        client: reqwest::Client,
        upload_base_url: &str,
        chunk_size: u64,
        max_chunk_retries: u32,
    ) -> Self {
        Self {
            client,
            upload_base_url: upload_base_url.trim_end_matches('/').to_string(),
            chunk_size,
            max_chunk_retries,
            retry_delay: Duration::from_secs(1),
        }
    }

    /// Base delay before retrying a chunk; multiplied by the attempt number.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Uploads `video` and returns the id YouTube assigned to it.
    pub async fn upload(
        &self,
        video: &Artifact,
        resource: &VideoResource,
    ) -> Result<String, ReelsmithError> {
        let total = tokio::fs::metadata(&video.path)
            .await
            .map_err(ReelsmithError::storage)?
            .len();
        if total == 0 {
            return Err(ReelsmithError::collaborator("video file is empty"));
        }

        let content_type = video.mime_type.as_deref().unwrap_or("video/*");
        let session = self.start_session(total, content_type, resource).await?;
        info!(total, chunk_size = self.chunk_size, "upload session started");

        let mut file = tokio::fs::File::open(&video.path)
            .await
            .map_err(ReelsmithError::storage)?;
        let mut offset = 0u64;

        loop {
            let progress = self.send_with_retries(&session, &mut file, offset, total).await?;
            match progress {
                Progress::Done(id) => {
                    info!(video_id = id.as_str(), "upload complete");
                    return Ok(id);
                }
                Progress::Committed(next) if next >= total => {
                    return Err(ReelsmithError::collaborator(format!(
                        "server committed all {total} bytes without returning a video id"
                    )));
                }
                Progress::Committed(next) if next > offset => {
                    debug!(offset = next, total, "chunk committed");
                    offset = next;
                }
                Progress::Committed(next) => {
                    return Err(ReelsmithError::collaborator(format!(
                        "upload stalled: server committed {next} bytes after offset {offset}"
                    )));
                }
            }
        }
    }

    async fn send_with_retries(
        &self,
        session: &str,
        file: &mut tokio::fs::File,
        mut offset: u64,
        total: u64,
    ) -> Result<Progress, ReelsmithError> {
        let mut attempt = 0u32;
        loop {
            let error = match self.send_chunk(session, file, offset, total).await {
                Ok(progress) => return Ok(progress),
                Err(ChunkError::Fatal(e)) => return Err(e),
                Err(ChunkError::Transient(e)) => e,
            };

            attempt += 1;
            if attempt > self.max_chunk_retries {
                return Err(ReelsmithError::collaborator(format!(
                    "chunk at offset {offset} failed after {} retries: {error}",
                    self.max_chunk_retries
                )));
            }
            warn!(offset, attempt, error = %error, "chunk failed, querying committed offset");
            tokio::time::sleep(self.retry_delay * attempt).await;

            match self.query_offset(session, total).await {
                Ok(Progress::Done(id)) => return Ok(Progress::Done(id)),
                Ok(Progress::Committed(committed)) => {
                    debug!(offset = committed, "resuming from committed offset");
                    if committed > offset {
                        return Ok(Progress::Committed(committed));
                    }
                    offset = committed;
                }
                Err(ChunkError::Fatal(e)) => return Err(e),
                Err(ChunkError::Transient(e)) => {
                    warn!(offset, error = %e, "offset query failed, resending chunk");
                }
            }
        }
    }

    async fn start_session(
        &self,
        total: u64,
        content_type: &str,
        resource: &VideoResource,
    ) -> Result<String, ReelsmithError> {
        let response = self
            .client
            .post(format!(
                "{}/videos?uploadType=resumable&part=snippet,status",
                self.upload_base_url
            ))
            .header("X-Upload-Content-Length", total.to_string())
            .header("X-Upload-Content-Type", content_type)
            .json(resource)
            .send()
            .await
            .map_err(|e| ReelsmithError::Collaborator {
                message: format!("upload session request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReelsmithError::collaborator(format!(
                "upload session rejected ({status}): {body}"
            )));
        }
        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ReelsmithError::collaborator("upload session response has no Location"))
    }

    async fn send_chunk(
        &self,
        session: &str,
        file: &mut tokio::fs::File,
        offset: u64,
        total: u64,
    ) -> Result<Progress, ChunkError> {
        let len = self.chunk_size.min(total - offset);
        let chunk = read_chunk(file, offset, len)
            .await
            .map_err(|e| ChunkError::Fatal(ReelsmithError::storage(e)))?;
        let range = format!("bytes {offset}-{}/{total}", offset + len - 1);

        let response = self
            .client
            .put(session)
            .header(CONTENT_RANGE, range)
            .header(CONTENT_LENGTH, len)
            .body(chunk)
            .send()
            .await;
        interpret(response, total).await
    }

    async fn query_offset(&self, session: &str, total: u64) -> Result<Progress, ChunkError> {
        let response = self
            .client
            .put(session)
            .header(CONTENT_RANGE, format!("bytes */{total}"))
            .header(CONTENT_LENGTH, 0)
            .send()
            .await;
        interpret(response, total).await
    }
}

async fn read_chunk(
    file: &mut tokio::fs::File,
    offset: u64,
    len: u64,
) -> Result<Vec<u8>, std::io::Error> {
    file.seek(SeekFrom::Start(offset)).await?;
    let mut buf = vec![0u8; len as usize];
    file.read_exact(&mut buf).await?;
    Ok(buf)
}

async fn interpret(
    response: Result<reqwest::Response, reqwest::Error>,
    total: u64,
) -> Result<Progress, ChunkError> {
    let response = response.map_err(|e| {
        ChunkError::Transient(ReelsmithError::Collaborator {
            message: format!("chunk request failed: {e}"),
            source: Some(Box::new(e)),
        })
    })?;

    let status = response.status();
    if status == StatusCode::PERMANENT_REDIRECT {
        let next = response
            .headers()
            .get(RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_range_end)
            .map_or(0, |end| end.saturating_add(1));
        if next > total {
            return Err(ChunkError::Fatal(ReelsmithError::collaborator(format!(
                "server reported {next} bytes committed of {total}"
            ))));
        }
        return Ok(Progress::Committed(next));
    }

    if status.is_success() {
        let video: UploadedVideo = response.json().await.map_err(|e| {
            ChunkError::Fatal(ReelsmithError::Collaborator {
                message: format!("failed to parse upload response: {e}"),
                source: Some(Box::new(e)),
            })
        })?;
        return Ok(Progress::Done(video.id));
    }

    let body = response.text().await.unwrap_or_default();
    let error = ReelsmithError::collaborator(format!("upload returned {status}: {body}"));
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        Err(ChunkError::Transient(error))
    } else {
        Err(ChunkError::Fatal(error))
    }
}

/// Last committed byte from a `Range: bytes=0-N` header.
fn parse_range_end(value: &str) -> Option<u64> {
    value
        .trim()
        .strip_prefix("bytes=")?
        .split_once('-')?
        .1
        .trim()
        .parse()
        .ok()
}

/// Content type used for the thumbnail upload, from the file extension.
pub(crate) fn image_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        _ => "image/jpeg",
    }
}
