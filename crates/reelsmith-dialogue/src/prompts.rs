// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image-generation prompts for the logo and banner workflows.

use reelsmith_core::types::{AspectRatio, ImageRequest};

use crate::fsm::ImageKind;

/// Output format requested for every generated image.
pub const IMAGE_FORMAT: &str = "png";

pub fn image_prompt(kind: ImageKind, description: &str, style: &str) -> String {
    match kind {
        ImageKind::Logo => format!(
            "Theme: {description}, Description: {style}. Generate the logo for this YouTube Channel."
        ),
        ImageKind::Banner => format!(
            "Theme: {description}, Channel name: {style}. Generate the banner for this YouTube Channel."
        ),
    }
}

/// Logos are portrait, banners are wide.
pub fn aspect_ratio(kind: ImageKind) -> AspectRatio {
    match kind {
        ImageKind::Logo => AspectRatio::Portrait,
        ImageKind::Banner => AspectRatio::Wide,
    }
}

pub fn image_request(kind: ImageKind, prompt: String) -> ImageRequest {
    ImageRequest {
        prompt,
        aspect_ratio: aspect_ratio(kind),
        output_format: IMAGE_FORMAT.to_string(),
    }
}
