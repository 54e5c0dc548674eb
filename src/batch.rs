//! Directory mode.
//!
//! Every recognized image directly inside the input directory is run through
//! [`transform_image`] in file-name order, one at a time. A file that fails
//! is logged and recorded as a failed [`OutcomeRecord`]; the rest of the
//! batch carries on. Subdirectories are not descended into.

use crate::config::ShrinkConfig;
use crate::imaging::{ImageBackend, has_image_extension};
use crate::output;
use crate::process::{ProcessError, transform_image};
use crate::sink::LogSink;
use crate::types::{BatchSummary, OutcomeRecord};
use std::fs;
use std::path::{Path, PathBuf};

/// List the image files directly inside `dir`, sorted by file name.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, ProcessError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && has_image_extension(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Transform every image in `input_dir` into `output_dir`.
///
/// Only setup problems (invalid config, unreadable input directory, output
/// directory that cannot be created) are returned as errors.
pub fn transform_directory(
    backend: &impl ImageBackend,
    input_dir: &Path,
    output_dir: &Path,
    config: &ShrinkConfig,
    sink: &impl LogSink,
) -> Result<BatchSummary, ProcessError> {
    config.validate()?;
    let files = list_images(input_dir)?;
    fs::create_dir_all(output_dir)?;

    for line in output::batch_preamble(files.len(), config) {
        sink.emit(&line);
    }

    let mut summary = BatchSummary {
        total_files: files.len(),
        ..Default::default()
    };

    for (index, input) in files.iter().enumerate() {
        let name = input.file_name().unwrap_or_default();
        let output = output_dir.join(name);
        sink.emit(&output::batch_progress(
            index + 1,
            files.len(),
            &name.to_string_lossy(),
        ));

        let outcome = match transform_image(backend, input, &output, config, sink) {
            Ok(outcome) => {
                summary.succeeded += 1;
                summary.total_input_bytes += outcome.input_bytes;
                summary.total_output_bytes += outcome.output_bytes;
                outcome
            }
            Err(e) => {
                sink.emit(&output::error_line(input, &e));
                let input_bytes = fs::metadata(input).map(|m| m.len()).unwrap_or(0);
                OutcomeRecord::failed(input.clone(), output, input_bytes, e.to_string())
            }
        };
        summary.outcomes.push(outcome);
        sink.emit("");
    }

    summary.total_saved_bytes =
        summary.total_input_bytes as i64 - summary.total_output_bytes as i64;

    for line in output::batch_summary_lines(&summary) {
        sink.emit(&line);
    }
    Ok(summary)
}
