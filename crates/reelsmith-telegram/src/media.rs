// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Downloads user-sent files into the work directory.

use std::path::{Path, PathBuf};

use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::FileMeta;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use reelsmith_core::{Artifact, ReelsmithError};

const DEFAULT_EXTENSION: &str = "mp4";

/// Fetches `file_meta` from Telegram and stores it under `dest_dir` with a
/// fresh name that keeps the original extension.
pub async fn download(
    bot: &Bot,
    file_meta: &FileMeta,
    file_name: Option<&str>,
    mime_type: Option<String>,
    dest_dir: &Path,
) -> Result<Artifact, ReelsmithError> {
    let file = bot
        .get_file(file_meta.id.clone())
        .await
        .map_err(|e| ReelsmithError::Channel {
            message: format!("failed to get file info: {e}"),
            source: Some(Box::new(e)),
        })?;

    tokio::fs::create_dir_all(dest_dir)
        .await
        .map_err(ReelsmithError::storage)?;
    let partial = PartialFile::new(local_path(dest_dir, file_name));
    let mut dst = tokio::fs::File::create(partial.path())
        .await
        .map_err(ReelsmithError::storage)?;

    bot.download_file(&file.path, &mut dst)
        .await
        .map_err(|e| ReelsmithError::Channel {
            message: format!("failed to download file: {e}"),
            source: Some(Box::new(e)),
        })?;
    dst.flush().await.map_err(ReelsmithError::storage)?;
    drop(dst);

    let size = tokio::fs::metadata(partial.path())
        .await
        .map_err(ReelsmithError::storage)?
        .len();
    let path = partial.keep();
    debug!(file_id = %file_meta.id, path = %path.display(), size, "downloaded file from Telegram");

    Ok(Artifact {
        path,
        file_name: file_name.map(str::to_string),
        mime_type,
        size,
    })
}

/// A download target that is deleted on drop unless kept.
#[derive(Debug)]
struct PartialFile {
    path: PathBuf,
    kept: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self { path, kept: false }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn keep(mut self) -> PathBuf {
        self.kept = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.kept {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(path = %self.path.display(), error = %e, "partial download not removed");
        }
    }
}

fn local_path(dest_dir: &Path, file_name: Option<&str>) -> PathBuf {
    let extension = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or(DEFAULT_EXTENSION);
    dest_dir.join(format!("{}.{extension}", uuid::Uuid::new_v4()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_path_keeps_safe_extension() {
        let path = local_path(Path::new("/work/uploads"), Some("my clip.MOV"));
        assert_eq!(path.extension().unwrap(), "MOV");
        assert!(path.starts_with("/work/uploads"));
        assert!(!path.to_string_lossy().contains("my clip"));
    }

    #[test]
    fn dropped_partial_download_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("half.mp4");
        std::fs::write(&path, b"partial").unwrap();

        drop(PartialFile::new(path.clone()));
        assert!(!path.exists());
    }

    #[test]
    fn kept_download_survives() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("done.mp4");
        std::fs::write(&path, b"complete").unwrap();

        let kept = PartialFile::new(path.clone()).keep();
        assert_eq!(kept, path);
        assert!(path.exists());
    }

    #[test]
    fn partial_file_that_was_never_created_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        drop(PartialFile::new(dir.path().join("missing.mp4")));
    }

    #[test]
    fn local_path_defaults_to_mp4() {
        assert_eq!(local_path(Path::new("/w"), None).extension().unwrap(), "mp4");
        assert_eq!(
            local_path(Path::new("/w"), Some("../../etc/passwd")).extension().unwrap(),
            "mp4"
        );
        assert_eq!(
            local_path(Path::new("/w"), Some("clip.m p4")).extension().unwrap(),
            "mp4"
        );
    }
}
