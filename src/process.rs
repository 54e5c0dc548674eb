//! Single-image transformation.
//!
//! [`transform_image`] takes one input through the whole pipeline:
//!
//! ```text
//! identify + stat ──▶ plan ──┬─▶ PASSTHROUGH: copy bytes unchanged
//!                            └─▶ TRANSFORM:   decode ─▶ (resize) ─▶ encode ─▶ write
//! ```
//!
//! The plan is computed by [`crate::imaging::plan_transform`]; pixel work is
//! delegated to an [`ImageBackend`] so tests can run against a mock. Every
//! step reports a line through the caller's [`LogSink`].
//!
//! [`convert_to_webp`] is a separate entry point that re-encodes an input as
//! WebP at its original dimensions.

use crate::config::{ConfigError, DEFAULT_MAX_SIZE_BYTES, ShrinkConfig};
use crate::imaging::{
    BackendError, Decision, EncodeParams, Encoding, ImageBackend, OutputFormat, Quality,
    WebpMode, derive_output_path, plan_transform,
};
use crate::output;
use crate::sink::LogSink;
use crate::types::{ImageMetadata, OutcomeRecord, compression_ratio_percent};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Encode error: {0}")]
    Encode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl From<BackendError> for ProcessError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Io(e) => ProcessError::Io(e),
            BackendError::Decode(msg) => ProcessError::Decode(msg),
            BackendError::Encode(msg) => ProcessError::Encode(msg),
        }
    }
}

/// Options for [`convert_to_webp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebpOptions {
    /// Lossy quality (1-100). Ignored when `lossless` is set.
    pub quality: u32,
    pub lossless: bool,
    /// Budget the result is checked against.
    pub max_size_bytes: u64,
}

impl Default for WebpOptions {
    fn default() -> Self {
        Self {
            quality: 85,
            lossless: false,
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
        }
    }
}

impl WebpOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::Validation(format!(
                "webp quality must be 1-100, got {}",
                self.quality
            )));
        }
        if self.max_size_bytes == 0 {
            return Err(ConfigError::Validation(
                "webp max_size_bytes must be positive".into(),
            ));
        }
        Ok(())
    }

    fn encoding(&self) -> Encoding {
        if self.lossless {
            Encoding::Webp(WebpMode::Lossless)
        } else {
            Encoding::Webp(WebpMode::Lossy(Quality::new(self.quality)))
        }
    }
}

/// Identify an input and record its size on disk.
pub fn read_metadata(
    backend: &impl ImageBackend,
    input: &Path,
) -> Result<ImageMetadata, ProcessError> {
    let byte_size = fs::metadata(input)?.len();
    let info = backend.identify(input)?;
    Ok(ImageMetadata {
        width: info.width,
        height: info.height,
        format: info.format,
        byte_size,
    })
}

/// Resize and/or compress one image into `output`.
///
/// The written path can differ from `output`: lossless runs replace the
/// extension with `.png`. The returned record carries the actual path.
pub fn transform_image(
    backend: &impl ImageBackend,
    input: &Path,
    output: &Path,
    config: &ShrinkConfig,
    sink: &impl LogSink,
) -> Result<OutcomeRecord, ProcessError> {
    config.validate()?;
    sink.emit(&output::file_start(input));

    let meta = read_metadata(backend, input)?;
    sink.emit(&output::metadata_line(&meta));

    let plan = plan_transform(&meta, config);
    for line in output::plan_lines(&plan) {
        sink.emit(&line);
    }

    let max_size_bytes = config.compression.max_size_bytes;
    let output_path = derive_output_path(output, plan.output_format);
    ensure_parent(&output_path)?;

    let output_bytes = match plan.decision {
        Decision::Passthrough => {
            if !is_same_file(input, &output_path) {
                fs::copy(input, &output_path)?;
            }
            sink.emit(&output::copied_line(&output_path));
            meta.byte_size
        }
        Decision::Transform => {
            let encoding = plan.encoding(config).ok_or_else(|| {
                ProcessError::Encode(format!("no encoder for {:?}", plan.output_format))
            })?;

            if plan.needs_resize {
                sink.emit(&output::resize_line(plan.target_width, plan.target_height));
            }
            if let (Some(quality), true) = (plan.effective_quality, plan.needs_compression) {
                sink.emit(&output::adaptive_quality_line(
                    config.compression.jpeg_quality,
                    quality,
                    max_size_bytes as f64 / meta.byte_size as f64,
                ));
            }
            sink.emit(&output::encoder_line(&encoding));

            let bytes = backend.encode(&EncodeParams {
                source: input.to_path_buf(),
                resize: plan.resize(),
                encoding,
            })?;
            fs::write(&output_path, &bytes)?;
            bytes.len() as u64
        }
    };

    let outcome = OutcomeRecord {
        input_path: input.to_path_buf(),
        output_path,
        input_bytes: meta.byte_size,
        output_bytes,
        compression_ratio_percent: compression_ratio_percent(meta.byte_size, output_bytes),
        within_budget: output_bytes <= max_size_bytes,
        skipped: plan.decision == Decision::Passthrough,
        error: None,
    };

    for line in output::completion_lines(
        &outcome,
        (plan.target_width, plan.target_height),
        plan.needs_resize,
        max_size_bytes,
    ) {
        sink.emit(&line);
    }
    Ok(outcome)
}

/// Re-encode one image as WebP at its original dimensions.
///
/// The output extension is always replaced with `.webp`.
pub fn convert_to_webp(
    backend: &impl ImageBackend,
    input: &Path,
    output: &Path,
    options: &WebpOptions,
    sink: &impl LogSink,
) -> Result<OutcomeRecord, ProcessError> {
    options.validate()?;
    sink.emit(&output::file_start(input));

    let meta = read_metadata(backend, input)?;
    sink.emit(&output::metadata_line(&meta));

    let encoding = options.encoding();
    sink.emit(&output::encoder_line(&encoding));

    let output_path = derive_output_path(output, OutputFormat::Webp);
    ensure_parent(&output_path)?;

    let bytes = backend.encode(&EncodeParams {
        source: input.to_path_buf(),
        resize: None,
        encoding,
    })?;
    fs::write(&output_path, &bytes)?;

    let output_bytes = bytes.len() as u64;
    let outcome = OutcomeRecord {
        input_path: input.to_path_buf(),
        output_path,
        input_bytes: meta.byte_size,
        output_bytes,
        compression_ratio_percent: compression_ratio_percent(meta.byte_size, output_bytes),
        within_budget: output_bytes <= options.max_size_bytes,
        skipped: false,
        error: None,
    };

    for line in output::completion_lines(
        &outcome,
        (meta.width, meta.height),
        false,
        options.max_size_bytes,
    ) {
        sink.emit(&line);
    }
    Ok(outcome)
}

fn ensure_parent(path: &Path) -> Result<(), ProcessError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    let canonical = |p: &Path| -> Option<PathBuf> { p.canonicalize().ok() };
    match (canonical(a), canonical(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompressionOptions;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::JpegMode;
    use crate::sink::tests::RecordingSink;
    use crate::types::SourceFormat;
    use tempfile::TempDir;

    /// Write a placeholder file of `len` bytes. The mock backend never reads it.
    fn create_dummy_source(path: &Path, len: usize) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![7u8; len]).unwrap();
    }

    // =========================================================================
    // Transform path
    // =========================================================================

    #[test]
    fn large_landscape_is_resized_and_requalified() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in/photo.jpg");
        let output = tmp.path().join("out/photo.jpg");
        create_dummy_source(&input, 200 * 1024);

        let backend = MockBackend::new()
            .with_image("photo.jpg", 1920, 1080, SourceFormat::Jpeg)
            .with_encoded_len(40_000);
        let sink = RecordingSink::new();

        let outcome =
            transform_image(&backend, &input, &output, &ShrinkConfig::default(), &sink).unwrap();

        assert_eq!(outcome.output_path, output);
        assert_eq!(outcome.input_bytes, 204_800);
        assert_eq!(outcome.output_bytes, 40_000);
        assert_eq!(outcome.compression_ratio_percent, 80.5);
        assert!(outcome.within_budget);
        assert!(!outcome.skipped);
        assert_eq!(fs::metadata(&output).unwrap().len(), 40_000);

        assert_eq!(
            backend.encodes(),
            vec![RecordedOp::Encode {
                source: input.to_string_lossy().to_string(),
                resize: Some((500, 281)),
                encoding: Encoding::Jpeg {
                    quality: Quality::new(77),
                    mode: JpegMode::Advanced,
                },
            }]
        );
    }

    #[test]
    fn log_lines_follow_pipeline_order() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("photo.jpg");
        create_dummy_source(&input, 200 * 1024);

        let backend = MockBackend::new()
            .with_image("photo.jpg", 1920, 1080, SourceFormat::Jpeg)
            .with_encoded_len(90_000);
        let sink = RecordingSink::new();

        let outcome = transform_image(
            &backend,
            &input,
            &tmp.path().join("out.jpg"),
            &ShrinkConfig::default(),
            &sink,
        )
        .unwrap();
        assert!(!outcome.within_budget);

        let order = [
            sink.position("Processing: photo.jpg"),
            sink.position("Input: 1920x1080"),
            sink.position("Rule: landscape, target 500x281"),
            sink.position("Resize: 500x281"),
            sink.position("Adaptive quality: 95 -> 77"),
            sink.position("Encoder: advanced JPEG, quality 77"),
            sink.position("Done:"),
            sink.position("Bytes: 204800 -> 90000"),
            sink.position("Budget: over 71680 bytes"),
        ];
        assert!(order.windows(2).all(|w| w[0] < w[1]), "{:?}", sink.lines());
    }

    #[test]
    fn lossless_output_gets_png_extension() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("scan.jpg");
        create_dummy_source(&input, 100 * 1024);

        let backend = MockBackend::new().with_image("scan.jpg", 400, 300, SourceFormat::Jpeg);
        let config = ShrinkConfig {
            compression: CompressionOptions {
                use_lossless: true,
                ..Default::default()
            },
            ..Default::default()
        };

        let outcome = transform_image(
            &backend,
            &input,
            &tmp.path().join("out/scan.jpg"),
            &config,
            &RecordingSink::new(),
        )
        .unwrap();

        assert_eq!(outcome.output_path, tmp.path().join("out/scan.png"));
        assert!(outcome.output_path.exists());
        assert!(!tmp.path().join("out/scan.jpg").exists());
        assert!(matches!(
            backend.encodes()[0],
            RecordedOp::Encode {
                encoding: Encoding::Png,
                resize: None,
                ..
            }
        ));
    }

    #[test]
    fn resize_only_does_not_log_adaptive_quality() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("wide.png");
        create_dummy_source(&input, 10 * 1024);

        let backend = MockBackend::new().with_image("wide.png", 800, 600, SourceFormat::Png);
        let sink = RecordingSink::new();
        transform_image(
            &backend,
            &input,
            &tmp.path().join("wide-out.png"),
            &ShrinkConfig::default(),
            &sink,
        )
        .unwrap();

        assert!(!sink.lines().iter().any(|l| l.contains("Adaptive quality")));
        sink.position("Encoder: advanced JPEG, quality 95");
    }

    // =========================================================================
    // Passthrough
    // =========================================================================

    #[test]
    fn small_image_is_copied_byte_for_byte() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("icon.png");
        create_dummy_source(&input, 5 * 1024);
        let output = tmp.path().join("out/icon.png");

        let backend = MockBackend::new().with_image("icon.png", 100, 100, SourceFormat::Png);
        let sink = RecordingSink::new();
        let outcome =
            transform_image(&backend, &input, &output, &ShrinkConfig::default(), &sink).unwrap();

        assert!(outcome.skipped);
        assert!(outcome.within_budget);
        assert_eq!(outcome.output_bytes, outcome.input_bytes);
        assert_eq!(outcome.compression_ratio_percent, 0.0);
        assert_eq!(fs::read(&output).unwrap(), fs::read(&input).unwrap());
        assert!(backend.encodes().is_empty());
        sink.position("Already fits, skipping");
        sink.position("Copied to: icon.png");
        sink.position("Size: 100x100 (unchanged)");
    }

    #[test]
    fn passthrough_onto_itself_leaves_file_intact() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("icon.png");
        create_dummy_source(&input, 2048);

        let backend = MockBackend::new().with_image("icon.png", 100, 100, SourceFormat::Png);
        let outcome = transform_image(
            &backend,
            &input,
            &input,
            &ShrinkConfig::default(),
            &RecordingSink::new(),
        )
        .unwrap();

        assert!(outcome.skipped);
        assert_eq!(fs::read(&input).unwrap(), vec![7u8; 2048]);
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn missing_input_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = transform_image(
            &MockBackend::new(),
            &tmp.path().join("nope.jpg"),
            &tmp.path().join("out.jpg"),
            &ShrinkConfig::default(),
            &RecordingSink::new(),
        );
        assert!(matches!(result, Err(ProcessError::Io(_))));
    }

    #[test]
    fn unreadable_input_is_decode_error() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("broken.jpg");
        create_dummy_source(&input, 10);

        let result = transform_image(
            &MockBackend::new(),
            &input,
            &tmp.path().join("out.jpg"),
            &ShrinkConfig::default(),
            &RecordingSink::new(),
        );
        assert!(matches!(result, Err(ProcessError::Decode(_))));
    }

    #[test]
    fn encoder_failure_is_encode_error_and_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("photo.jpg");
        create_dummy_source(&input, 200 * 1024);
        let output = tmp.path().join("out.jpg");

        let backend = MockBackend::new()
            .with_image("photo.jpg", 1920, 1080, SourceFormat::Jpeg)
            .failing_encode();
        let result = transform_image(
            &backend,
            &input,
            &output,
            &ShrinkConfig::default(),
            &RecordingSink::new(),
        );

        assert!(matches!(result, Err(ProcessError::Encode(_))));
        assert!(!output.exists());
    }

    #[test]
    fn invalid_config_fails_before_touching_files() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("photo.jpg");
        create_dummy_source(&input, 1024);

        let backend = MockBackend::new().with_image("photo.jpg", 10, 10, SourceFormat::Jpeg);
        let mut config = ShrinkConfig::default();
        config.compression.jpeg_quality = 0;

        let result = transform_image(
            &backend,
            &input,
            &tmp.path().join("out.jpg"),
            &config,
            &RecordingSink::new(),
        );
        assert!(matches!(result, Err(ProcessError::Config(_))));
        assert!(backend.get_operations().is_empty());
    }

    // =========================================================================
    // WebP
    // =========================================================================

    #[test]
    fn webp_conversion_forces_extension_and_keeps_size() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("photo.jpg");
        create_dummy_source(&input, 50_000);

        let backend = MockBackend::new()
            .with_image("photo.jpg", 1920, 1080, SourceFormat::Jpeg)
            .with_encoded_len(20_000);
        let sink = RecordingSink::new();
        let outcome = convert_to_webp(
            &backend,
            &input,
            &tmp.path().join("photo.jpg.out"),
            &WebpOptions::default(),
            &sink,
        )
        .unwrap();

        assert_eq!(outcome.output_path, tmp.path().join("photo.jpg.webp"));
        assert_eq!(outcome.compression_ratio_percent, 60.0);
        assert_eq!(
            backend.encodes(),
            vec![RecordedOp::Encode {
                source: input.to_string_lossy().to_string(),
                resize: None,
                encoding: Encoding::Webp(WebpMode::Lossy(Quality::new(85))),
            }]
        );
        sink.position("Encoder: WebP lossy, quality 85");
    }

    #[test]
    fn webp_lossless_and_validation() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("a.png");
        create_dummy_source(&input, 1000);
        let backend = MockBackend::new().with_image("a.png", 10, 10, SourceFormat::Png);

        let options = WebpOptions {
            lossless: true,
            ..Default::default()
        };
        convert_to_webp(&backend, &input, &tmp.path().join("a"), &options, &RecordingSink::new())
            .unwrap();
        assert!(matches!(
            backend.encodes()[0],
            RecordedOp::Encode {
                encoding: Encoding::Webp(WebpMode::Lossless),
                ..
            }
        ));

        let bad = WebpOptions {
            quality: 0,
            ..Default::default()
        };
        let result = convert_to_webp(&backend, &input, &tmp.path().join("a"), &bad, &RecordingSink::new());
        assert!(matches!(result, Err(ProcessError::Config(_))));
    }
}
