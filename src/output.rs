//! Human-readable progress and summary lines.
//!
//! # Output Format
//!
//! ## Single image
//!
//! ```text
//! Processing: dawn.jpg
//!     Input: 1920x1080, 204800 bytes, jpeg
//!     Rule: landscape, target 500x281
//!     Needs: resize=true, compress=true
//!     Resize: 500x281
//!     Adaptive quality: 95 -> 77 (budget ratio 0.35)
//!     Encoder: advanced JPEG, quality 77
//!     Done: dawn.jpg -> dawn.jpg
//!     Size: 500x281
//!     Bytes: 204800 -> 40000 (80.5% smaller)
//!     Budget: within 71680 bytes
//! ```
//!
//! ## Batch
//!
//! ```text
//! Found 4 image files
//! Sizes: landscape max 500px (keep small), portrait 200px (keep small)
//! Mode: advanced JPEG (quality 95)
//!
//! [1/4] dawn.jpg
//! ...
//! Summary
//!     Processed: 3/4 files
//!     Input: 1.20 MB
//!     Output: 0.31 MB
//!     Compression: 74.2%
//!     Saved: 0.89 MB
//! ```
//!
//! # Architecture
//!
//! Every function here is pure and returns the line(s) to emit; the
//! transformer and batch driver push them through a
//! [`LogSink`](crate::sink::LogSink).

use crate::config::{CompressionOptions, ShrinkConfig, SizeSettings};
use crate::imaging::{Decision, Encoding, JpegMode, TransformPlan, WebpMode};
use crate::types::{BatchSummary, ImageMetadata, OutcomeRecord};
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

fn keep_small(flag: bool) -> &'static str {
    if flag { " (keep small)" } else { "" }
}

// ============================================================================
// Settings
// ============================================================================

pub fn describe_sizes(sizes: &SizeSettings) -> String {
    format!(
        "landscape max {}px{}, portrait {}px{}",
        sizes.landscape_width,
        keep_small(sizes.landscape_keep_small),
        sizes.portrait_width,
        keep_small(sizes.portrait_keep_small),
    )
}

pub fn describe_mode(compression: &CompressionOptions) -> String {
    if compression.use_lossless {
        "PNG lossless".to_string()
    } else if compression.use_advanced_compression {
        format!("advanced JPEG (quality {})", compression.jpeg_quality)
    } else {
        format!("standard JPEG (quality {})", compression.jpeg_quality)
    }
}

/// One-line summary of a configuration.
pub fn describe_settings(config: &ShrinkConfig) -> String {
    format!(
        "{}; {}; budget {} KB",
        describe_sizes(&config.sizes),
        describe_mode(&config.compression),
        config.compression.max_size_bytes / 1024,
    )
}

// ============================================================================
// Single image
// ============================================================================

pub fn file_start(input: &Path) -> String {
    format!("Processing: {}", file_name(input))
}

pub fn metadata_line(meta: &ImageMetadata) -> String {
    format!(
        "{}Input: {}x{}, {} bytes, {}",
        indent(1),
        meta.width,
        meta.height,
        meta.byte_size,
        meta.format.as_str()
    )
}

pub fn plan_lines(plan: &TransformPlan) -> Vec<String> {
    let mut lines = vec![format!(
        "{}Rule: {}, target {}x{}",
        indent(1),
        plan.orientation.label(),
        plan.target_width,
        plan.target_height
    )];
    match plan.decision {
        Decision::Passthrough => {
            lines.push(format!("{}Already fits, skipping", indent(1)));
        }
        Decision::Transform => {
            lines.push(format!(
                "{}Needs: resize={}, compress={}",
                indent(1),
                plan.needs_resize,
                plan.needs_compression
            ));
        }
    }
    lines
}

pub fn copied_line(output: &Path) -> String {
    format!("{}Copied to: {}", indent(1), file_name(output))
}

pub fn resize_line(width: u32, height: u32) -> String {
    format!("{}Resize: {}x{}", indent(1), width, height)
}

pub fn adaptive_quality_line(base: u32, chosen: u32, budget_ratio: f64) -> String {
    format!(
        "{}Adaptive quality: {} -> {} (budget ratio {:.2})",
        indent(1),
        base,
        chosen,
        budget_ratio
    )
}

pub fn describe_encoding(encoding: &Encoding) -> String {
    match encoding {
        Encoding::Jpeg {
            quality,
            mode: JpegMode::Advanced,
        } => format!("advanced JPEG, quality {}", quality.value()),
        Encoding::Jpeg {
            quality,
            mode: JpegMode::Standard,
        } => format!("standard JPEG, quality {}", quality.value()),
        Encoding::Png => "PNG, maximum compression".to_string(),
        Encoding::Webp(WebpMode::Lossy(quality)) => {
            format!("WebP lossy, quality {}", quality.value())
        }
        Encoding::Webp(WebpMode::Lossless) => "WebP lossless".to_string(),
    }
}

pub fn encoder_line(encoding: &Encoding) -> String {
    format!("{}Encoder: {}", indent(1), describe_encoding(encoding))
}

/// Closing lines for a transformed (or copied) image.
pub fn completion_lines(
    outcome: &OutcomeRecord,
    final_dims: (u32, u32),
    resized: bool,
    max_size_bytes: u64,
) -> Vec<String> {
    let size = if resized {
        format!("{}x{}", final_dims.0, final_dims.1)
    } else {
        format!("{}x{} (unchanged)", final_dims.0, final_dims.1)
    };
    let budget = if outcome.within_budget {
        format!("within {} bytes", max_size_bytes)
    } else {
        format!("over {} bytes", max_size_bytes)
    };
    vec![
        format!(
            "{}Done: {} -> {}",
            indent(1),
            file_name(&outcome.input_path),
            file_name(&outcome.output_path)
        ),
        format!("{}Size: {}", indent(1), size),
        format!(
            "{}Bytes: {} -> {} ({:.1}% smaller)",
            indent(1),
            outcome.input_bytes,
            outcome.output_bytes,
            outcome.compression_ratio_percent
        ),
        format!("{}Budget: {}", indent(1), budget),
    ]
}

pub fn error_line(input: &Path, error: &dyn std::fmt::Display) -> String {
    format!("Failed: {} - {}", file_name(input), error)
}

// ============================================================================
// Batch
// ============================================================================

pub fn batch_preamble(count: usize, config: &ShrinkConfig) -> Vec<String> {
    vec![
        format!("Found {} image files", count),
        format!("Sizes: {}", describe_sizes(&config.sizes)),
        format!("Mode: {}", describe_mode(&config.compression)),
        String::new(),
    ]
}

pub fn batch_progress(position: usize, total: usize, name: &str) -> String {
    format!("[{}/{}] {}", position, total, name)
}

pub fn batch_summary_lines(summary: &BatchSummary) -> Vec<String> {
    vec![
        "Summary".to_string(),
        format!(
            "{}Processed: {}/{} files",
            indent(1),
            summary.succeeded,
            summary.total_files
        ),
        format!("{}Input: {}", indent(1), megabytes(summary.total_input_bytes)),
        format!("{}Output: {}", indent(1), megabytes(summary.total_output_bytes)),
        format!(
            "{}Compression: {:.1}%",
            indent(1),
            summary.compression_ratio_percent()
        ),
        format!(
            "{}Saved: {:.2} MB",
            indent(1),
            summary.total_saved_bytes as f64 / 1024.0 / 1024.0
        ),
    ]
}

// ============================================================================
// Request
// ============================================================================

pub fn request_preamble(input: &Path, output: &Path, max_size_kb: u64) -> Vec<String> {
    vec![
        "Starting".to_string(),
        format!("Input path: {}", input.display()),
        format!("Output path: {}", output.display()),
        format!("Max size: {}KB", max_size_kb),
        String::new(),
    ]
}

pub fn request_closing_line(success: bool, message: &str) -> String {
    if success {
        format!("Finished: {}", message)
    } else {
        format!("Failed: {}", message)
    }
}
