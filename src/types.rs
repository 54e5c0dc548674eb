//! Records shared between the transformer, the batch driver and the CLI.
//!
//! Outcome and summary types serialize to JSON for `--json` output and for
//! the request/response surface in [`request`](crate::request).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Container format detected from the input's magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
    Other,
}

impl SourceFormat {
    pub fn from_image_format(format: image::ImageFormat) -> Self {
        match format {
            image::ImageFormat::Jpeg => SourceFormat::Jpeg,
            image::ImageFormat::Png => SourceFormat::Png,
            image::ImageFormat::Gif => SourceFormat::Gif,
            image::ImageFormat::WebP => SourceFormat::Webp,
            _ => SourceFormat::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "jpeg",
            SourceFormat::Png => "png",
            SourceFormat::Gif => "gif",
            SourceFormat::Webp => "webp",
            SourceFormat::Other => "other",
        }
    }
}

/// Snapshot of an input taken once before planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub format: SourceFormat,
    pub byte_size: u64,
}

/// Result of transforming one file.
///
/// `output_bytes` and `within_budget` are only meaningful when `error` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub compression_ratio_percent: f64,
    pub within_budget: bool,
    pub skipped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OutcomeRecord {
    /// A failed outcome for a file that never produced output.
    pub fn failed(input_path: PathBuf, output_path: PathBuf, input_bytes: u64, error: String) -> Self {
        Self {
            input_path,
            output_path,
            input_bytes,
            output_bytes: 0,
            compression_ratio_percent: 0.0,
            within_budget: false,
            skipped: false,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate statistics for a directory run.
///
/// Byte totals cover successful files only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_files: usize,
    pub succeeded: usize,
    pub total_input_bytes: u64,
    pub total_output_bytes: u64,
    pub total_saved_bytes: i64,
    pub outcomes: Vec<OutcomeRecord>,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.total_files - self.succeeded
    }

    /// Overall size reduction across successful files, in percent.
    pub fn compression_ratio_percent(&self) -> f64 {
        compression_ratio_percent(self.total_input_bytes, self.total_output_bytes)
    }
}

/// `(input - output) / input * 100`, rounded to one decimal.
///
/// Negative when the output grew. Zero for empty inputs.
pub fn compression_ratio_percent(input_bytes: u64, output_bytes: u64) -> f64 {
    if input_bytes == 0 {
        return 0.0;
    }
    let ratio = (input_bytes as f64 - output_bytes as f64) / input_bytes as f64 * 100.0;
    (ratio * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_rounds_to_one_decimal() {
        assert_eq!(compression_ratio_percent(204_800, 40_000), 80.5);
        assert_eq!(compression_ratio_percent(3, 2), 33.3);
        assert_eq!(compression_ratio_percent(100, 100), 0.0);
    }

    #[test]
    fn ratio_negative_when_output_grows() {
        assert_eq!(compression_ratio_percent(1000, 1500), -50.0);
    }

    #[test]
    fn ratio_of_empty_input_is_zero() {
        assert_eq!(compression_ratio_percent(0, 10), 0.0);
    }

    #[test]
    fn source_format_mapping() {
        assert_eq!(
            SourceFormat::from_image_format(image::ImageFormat::WebP),
            SourceFormat::Webp
        );
        assert_eq!(
            SourceFormat::from_image_format(image::ImageFormat::Bmp),
            SourceFormat::Other
        );
    }

    #[test]
    fn failed_outcome_serializes_error() {
        let record = OutcomeRecord::failed(
            "in/a.jpg".into(),
            "out/a.jpg".into(),
            12,
            "Decode error: bad header".into(),
        );
        assert!(!record.is_success());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["error"], "Decode error: bad header");
        assert_eq!(json["input_bytes"], 12);
    }
}
