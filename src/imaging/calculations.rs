//! Pure calculation functions for output dimensions and encoder quality.
//!
//! All functions here are pure and testable without any I/O or images.

use crate::config::SizeSettings;

/// Lowest JPEG quality the adaptive selector will pick.
pub const QUALITY_FLOOR: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    /// Square images count as landscape.
    pub fn of(width: u32, height: u32) -> Self {
        if width >= height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
        }
    }
}

/// Calculate the output dimensions for an image under the size rules.
///
/// Landscape images are clamped to `landscape_width`. Portrait images are set
/// to exactly `portrait_width`, which enlarges narrow portraits unless
/// `portrait_keep_small` is on. The height follows the original aspect ratio.
///
/// # Examples
/// ```
/// # use simple_shrink::config::SizeSettings;
/// # use simple_shrink::imaging::target_dimensions;
/// let settings = SizeSettings::default();
/// assert_eq!(target_dimensions(1920, 1080, &settings), (500, 281));
/// assert_eq!(target_dimensions(100, 100, &settings), (100, 100));
/// ```
pub fn target_dimensions(width: u32, height: u32, settings: &SizeSettings) -> (u32, u32) {
    let target_width = match Orientation::of(width, height) {
        Orientation::Landscape => {
            if settings.landscape_keep_small && width < settings.landscape_width {
                width
            } else {
                width.min(settings.landscape_width)
            }
        }
        Orientation::Portrait => {
            if settings.portrait_keep_small && width < settings.portrait_width {
                width
            } else {
                settings.portrait_width
            }
        }
    }
    .max(1);

    let scale = target_width as f64 / width.max(1) as f64;
    let target_height = ((height as f64 * scale).round() as u32).max(1);
    (target_width, target_height)
}

/// Pick the JPEG quality for an encode.
///
/// Only oversized inputs get a reduced quality. Advanced mode starts from
/// `max(60, q * 0.7)` and adds back up to 30 points depending on how close
/// the input already is to the budget, never exceeding `q`. Standard mode
/// scales `q` by the budget ratio with a 1.2 allowance, floored at 60.
pub fn select_jpeg_quality(
    jpeg_quality: u32,
    input_bytes: u64,
    max_size_bytes: u64,
    advanced: bool,
) -> u32 {
    if input_bytes <= max_size_bytes {
        return jpeg_quality;
    }

    let q = jpeg_quality as f64;
    let ratio = max_size_bytes as f64 / input_bytes as f64;
    let floor = QUALITY_FLOOR as f64;

    if advanced {
        let base = floor.max(q * 0.7);
        q.min(base + ratio * 30.0).round() as u32
    } else {
        let dynamic = (q * ratio * 1.2).floor();
        floor.max(q.min(dynamic)) as u32
    }
}
