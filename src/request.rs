//! Request/response surface.
//!
//! A [`ShrinkRequest`] names an input (file or directory), an output, a size
//! budget in kilobytes and the remaining options. [`handle_request`] runs it
//! and always answers with a [`ShrinkResponse`]: failures become
//! `success: false` with a readable message instead of an error value.
//!
//! Both types are JSON-serializable; the `request` CLI command reads one
//! from a file and prints the other.
//!
//! ```json
//! {
//!   "input_path": "photos",
//!   "output_path": "photos-small",
//!   "max_size_kb": 70,
//!   "is_directory": true,
//!   "options": { "compression": { "use_lossless": false } }
//! }
//! ```

use crate::batch::transform_directory;
use crate::config::{ConfigError, ShrinkConfig};
use crate::imaging::ImageBackend;
use crate::output;
use crate::process::{ProcessError, transform_image};
use crate::sink::LogSink;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_max_size_kb() -> u64 {
    70
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShrinkRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Size budget in kilobytes; overrides `options.compression.max_size_bytes`.
    #[serde(default = "default_max_size_kb")]
    pub max_size_kb: u64,
    /// Directory mode. Inferred from the input path when absent.
    #[serde(default)]
    pub is_directory: Option<bool>,
    #[serde(default)]
    pub options: ShrinkConfig,
}

impl ShrinkRequest {
    /// The effective configuration: `options` with the budget applied.
    pub fn config(&self) -> Result<ShrinkConfig, ConfigError> {
        let mut config = self.options.clone();
        config.compression.max_size_bytes = self.max_size_kb.saturating_mul(1024);
        config.validate()?;
        Ok(config)
    }

    fn directory_mode(&self) -> bool {
        self.is_directory.unwrap_or_else(|| self.input_path.is_dir())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShrinkResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ResponseStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponseStats {
    /// Size reduction in percent, one decimal.
    pub compression_ratio: f64,
}

impl ShrinkResponse {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            message,
            stats: None,
        }
    }
}

/// Run a request to completion.
pub fn handle_request(
    backend: &impl ImageBackend,
    request: &ShrinkRequest,
    sink: &impl LogSink,
) -> ShrinkResponse {
    for line in output::request_preamble(
        &request.input_path,
        &request.output_path,
        request.max_size_kb,
    ) {
        sink.emit(&line);
    }

    let response = match run(backend, request, sink) {
        Ok(response) => response,
        Err(e) => ShrinkResponse::failure(e.to_string()),
    };
    sink.emit(&output::request_closing_line(
        response.success,
        &response.message,
    ));
    response
}

fn run(
    backend: &impl ImageBackend,
    request: &ShrinkRequest,
    sink: &impl LogSink,
) -> Result<ShrinkResponse, ProcessError> {
    let config = request.config()?;
    if !request.input_path.exists() {
        return Ok(ShrinkResponse::failure(format!(
            "Input path does not exist: {}",
            request.input_path.display()
        )));
    }

    if request.directory_mode() {
        let summary = transform_directory(
            backend,
            &request.input_path,
            &request.output_path,
            &config,
            sink,
        )?;
        Ok(ShrinkResponse {
            success: true,
            message: format!(
                "Directory processed: {}/{} files",
                summary.succeeded, summary.total_files
            ),
            stats: Some(ResponseStats {
                compression_ratio: summary.compression_ratio_percent(),
            }),
        })
    } else {
        let outcome = transform_image(
            backend,
            &request.input_path,
            &request.output_path,
            &config,
            sink,
        )?;
        Ok(ShrinkResponse {
            success: true,
            message: format!("Image processed: {}", outcome.output_path.display()),
            stats: Some(ResponseStats {
                compression_ratio: outcome.compression_ratio_percent,
            }),
        })
    }
}
