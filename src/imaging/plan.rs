//! Per-image transform planning.
//!
//! [`plan_transform`] combines the size policy, the skip decision and the
//! quality selector into a [`TransformPlan`]. Nothing here touches the
//! filesystem; [`derive_output_path`] is the only path logic and it is pure.

use super::calculations::{Orientation, select_jpeg_quality, target_dimensions};
use super::params::{Encoding, JpegMode, Quality};
use crate::config::ShrinkConfig;
use crate::types::ImageMetadata;
use std::path::{Path, PathBuf};

/// What to do with an input once its plan is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Copy bytes unchanged: no decode, no encode.
    Passthrough,
    /// Resize if needed, then always re-encode.
    Transform,
}

/// Container format of an encoded output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Input bytes copied as-is, format unchanged.
    Original,
    Jpeg,
    Png,
    Webp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformPlan {
    pub orientation: Orientation,
    pub target_width: u32,
    pub target_height: u32,
    pub needs_resize: bool,
    pub needs_compression: bool,
    /// Set only for JPEG output.
    pub effective_quality: Option<u32>,
    pub output_format: OutputFormat,
    pub decision: Decision,
}

impl TransformPlan {
    /// Encoder parameters for a `Transform` plan; `None` for passthrough.
    pub fn encoding(&self, config: &ShrinkConfig) -> Option<Encoding> {
        match self.output_format {
            OutputFormat::Original | OutputFormat::Webp => None,
            OutputFormat::Png => Some(Encoding::Png),
            OutputFormat::Jpeg => Some(Encoding::Jpeg {
                quality: Quality::new(
                    self.effective_quality
                        .unwrap_or(config.compression.jpeg_quality),
                ),
                mode: if config.compression.use_advanced_compression {
                    JpegMode::Advanced
                } else {
                    JpegMode::Standard
                },
            }),
        }
    }

    pub fn resize(&self) -> Option<(u32, u32)> {
        self.needs_resize
            .then_some((self.target_width, self.target_height))
    }
}

/// Decide between passthrough and a full transform.
pub fn decide(needs_resize: bool, needs_compression: bool, skip_if_optimal: bool) -> Decision {
    if skip_if_optimal && !needs_resize && !needs_compression {
        Decision::Passthrough
    } else {
        Decision::Transform
    }
}

/// Build the plan for one image.
pub fn plan_transform(meta: &ImageMetadata, config: &ShrinkConfig) -> TransformPlan {
    let compression = &config.compression;
    let (target_width, target_height) = target_dimensions(meta.width, meta.height, &config.sizes);
    let needs_resize = meta.width != target_width || meta.height != target_height;
    let needs_compression = meta.byte_size > compression.max_size_bytes;
    let decision = decide(needs_resize, needs_compression, compression.skip_if_optimal);

    let (output_format, effective_quality) = match decision {
        Decision::Passthrough => (OutputFormat::Original, None),
        Decision::Transform if compression.use_lossless => (OutputFormat::Png, None),
        Decision::Transform => (
            OutputFormat::Jpeg,
            Some(select_jpeg_quality(
                compression.jpeg_quality,
                meta.byte_size,
                compression.max_size_bytes,
                compression.use_advanced_compression,
            )),
        ),
    };

    TransformPlan {
        orientation: Orientation::of(meta.width, meta.height),
        target_width,
        target_height,
        needs_resize,
        needs_compression,
        effective_quality,
        output_format,
        decision,
    }
}

/// Compute where an output of `format` is written, given the requested path.
///
/// PNG and WebP outputs get their extension replaced; JPEG and passthrough
/// outputs keep the requested name.
pub fn derive_output_path(base: &Path, format: OutputFormat) -> PathBuf {
    match format {
        OutputFormat::Png => base.with_extension("png"),
        OutputFormat::Webp => base.with_extension("webp"),
        OutputFormat::Jpeg | OutputFormat::Original => base.to_path_buf(),
    }
}
