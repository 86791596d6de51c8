// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain 1280x720 JPEG thumbnails.

use std::path::Path;

use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};
use tracing::debug;

use reelsmith_core::{Artifact, ReelsmithError, ThumbnailRenderer};

pub const THUMBNAIL_WIDTH: u32 = 1280;
pub const THUMBNAIL_HEIGHT: u32 = 720;
const BACKGROUND: Rgb<u8> = Rgb([20, 20, 20]);

/// Renders a dark plate at YouTube's recommended thumbnail size.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlateRenderer;

#[async_trait]
impl ThumbnailRenderer for PlateRenderer {
    async fn render(&self, title: &str, dest_dir: &Path) -> Result<Artifact, ReelsmithError> {
        tokio::fs::create_dir_all(dest_dir)
            .await
            .map_err(ReelsmithError::storage)?;

        let file_name = format!("thumbnail-{}.jpg", uuid::Uuid::new_v4());
        let path = dest_dir.join(&file_name);
        let target = path.clone();

        tokio::task::spawn_blocking(move || {
            RgbImage::from_pixel(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT, BACKGROUND)
                .save_with_format(&target, ImageFormat::Jpeg)
        })
        .await
        .map_err(|e| ReelsmithError::Internal(format!("thumbnail task panicked: {e}")))?
        .map_err(ReelsmithError::storage)?;

        let size = tokio::fs::metadata(&path)
            .await
            .map_err(ReelsmithError::storage)?
            .len();
        debug!(title, path = %path.display(), size, "thumbnail rendered");

        Ok(Artifact {
            path,
            file_name: Some(file_name),
            mime_type: Some("image/jpeg".into()),
            size,
        })
    }
}
