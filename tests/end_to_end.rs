//! End-to-end runs through the real codec backend on synthetic images.

use image::codecs::jpeg::JpegEncoder;
use image::{ImageReader, Rgb, RgbImage, Rgba, RgbaImage};
use simple_shrink::config::{CompressionOptions, ShrinkConfig, SizeSettings};
use simple_shrink::imaging::RustBackend;
use simple_shrink::process::{WebpOptions, convert_to_webp, transform_image};
use simple_shrink::request::{ShrinkRequest, handle_request};
use simple_shrink::sink::NullSink;
use simple_shrink::batch::transform_directory;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

/// Noisy RGB image that compresses badly, so it lands well over budget.
fn noisy_rgb(width: u32, height: u32) -> RgbImage {
    let mut state: u32 = 0x1234_5678;
    RgbImage::from_fn(width, height, |x, y| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let noise = (state >> 24) as u8;
        Rgb([
            noise,
            ((x * 255) / width) as u8 ^ noise,
            ((y * 255) / height) as u8,
        ])
    })
}

fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = noisy_rgb(width, height);
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, 95);
    img.write_with_encoder(encoder).unwrap();
    fs::write(path, buf).unwrap();
}

/// Four-colour PNG, small on disk.
fn create_flat_png(path: &Path, width: u32, height: u32) {
    let colors = [
        Rgba([255, 0, 0, 255]),
        Rgba([0, 255, 0, 255]),
        Rgba([0, 0, 255, 255]),
        Rgba([255, 255, 255, 255]),
    ];
    let img = RgbaImage::from_fn(width, height, |x, _| colors[(x / 16 % 4) as usize]);
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

fn dimensions(path: &Path) -> (u32, u32) {
    ImageReader::open(path)
        .unwrap()
        .with_guessed_format()
        .unwrap()
        .into_dimensions()
        .unwrap()
}

#[test]
fn oversized_landscape_shrinks_to_budget_width() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("wide.jpg");
    create_test_jpeg(&input, 1920, 1080);
    let output = tmp.path().join("out/wide.jpg");

    let outcome = transform_image(
        &RustBackend::new(),
        &input,
        &output,
        &ShrinkConfig::default(),
        &NullSink,
    )
    .unwrap();

    assert!(!outcome.skipped);
    assert_eq!(dimensions(&output), (500, 281));
    assert_eq!(outcome.output_bytes, fs::metadata(&output).unwrap().len());
    assert!(outcome.output_bytes < outcome.input_bytes);
    assert!(outcome.compression_ratio_percent > 0.0);
    // SOI marker: the output is a JPEG.
    assert_eq!(&fs::read(&output).unwrap()[..2], &[0xFF, 0xD8]);
}

#[test]
fn narrow_portrait_is_enlarged_without_keep_small() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("tall.png");
    create_flat_png(&input, 150, 400);

    let config = ShrinkConfig {
        sizes: SizeSettings {
            portrait_keep_small: false,
            ..Default::default()
        },
        ..Default::default()
    };
    let output = tmp.path().join("tall.jpg");
    let outcome =
        transform_image(&RustBackend::new(), &input, &output, &config, &NullSink).unwrap();

    assert!(!outcome.skipped);
    assert_eq!(dimensions(&output), (200, 533));
}

#[test]
fn small_image_round_trips_unchanged() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("icon.png");
    create_flat_png(&input, 100, 100);
    let output = tmp.path().join("copy/icon.png");

    let outcome = transform_image(
        &RustBackend::new(),
        &input,
        &output,
        &ShrinkConfig::default(),
        &NullSink,
    )
    .unwrap();

    assert!(outcome.skipped);
    assert_eq!(fs::read(&output).unwrap(), fs::read(&input).unwrap());
}

#[test]
fn lossless_mode_writes_png() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("banner.png");
    create_flat_png(&input, 1000, 200);

    let config = ShrinkConfig {
        compression: CompressionOptions {
            use_lossless: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let outcome = transform_image(
        &RustBackend::new(),
        &input,
        &tmp.path().join("banner.jpg"),
        &config,
        &NullSink,
    )
    .unwrap();

    assert_eq!(outcome.output_path, tmp.path().join("banner.png"));
    assert_eq!(dimensions(&outcome.output_path), (500, 100));
    let bytes = fs::read(&outcome.output_path).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
    assert!(outcome.within_budget);
}

#[test]
fn directory_run_survives_a_corrupt_file() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("photos");
    fs::create_dir_all(&input).unwrap();
    create_test_jpeg(&input.join("a.jpg"), 800, 600);
    create_flat_png(&input.join("b.png"), 64, 64);
    create_test_jpeg(&input.join("c.JPEG"), 300, 900);
    fs::write(input.join("d.jpg"), b"definitely not a jpeg").unwrap();
    fs::write(input.join("readme.md"), b"# photos").unwrap();

    let lines = Mutex::new(Vec::new());
    let sink = |line: &str| lines.lock().unwrap().push(line.to_string());
    let output = tmp.path().join("small");

    let summary = transform_directory(
        &RustBackend::new(),
        &input,
        &output,
        &ShrinkConfig::default(),
        &sink,
    )
    .unwrap();

    assert_eq!(summary.total_files, 4);
    assert_eq!(summary.succeeded, 3);
    assert!(summary.outcomes[3].error.is_some());
    assert_eq!(dimensions(&output.join("a.jpg")), (500, 375));
    assert_eq!(dimensions(&output.join("c.JPEG")), (200, 600));
    assert!(output.join("b.png").exists());
    assert!(!output.join("d.jpg").exists());

    let lines = lines.lock().unwrap();
    assert!(lines.iter().any(|l| l.starts_with("Failed: d.jpg")));
    assert!(lines.iter().any(|l| l.contains("Processed: 3/4 files")));
}

#[test]
fn webp_conversion_produces_riff_container() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("photo.jpg");
    create_test_jpeg(&input, 320, 240);

    let outcome = convert_to_webp(
        &RustBackend::new(),
        &input,
        &tmp.path().join("photo.jpg"),
        &WebpOptions::default(),
        &NullSink,
    )
    .unwrap();

    assert_eq!(outcome.output_path, tmp.path().join("photo.webp"));
    let bytes = fs::read(&outcome.output_path).unwrap();
    assert_eq!(&bytes[..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WEBP");
    assert_eq!(dimensions(&outcome.output_path), (320, 240));
}

#[test]
fn json_request_round_trip() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("photo.jpg");
    create_test_jpeg(&input, 1200, 800);

    let json = serde_json::json!({
        "input_path": input,
        "output_path": tmp.path().join("out.jpg"),
        "max_size_kb": 50,
        "options": { "compression": { "use_advanced_compression": false } }
    });
    let request: ShrinkRequest = serde_json::from_value(json).unwrap();
    let response = handle_request(&RustBackend::new(), &request, &NullSink);

    assert!(response.success, "{}", response.message);
    assert!(response.stats.unwrap().compression_ratio > 0.0);
    assert_eq!(dimensions(&tmp.path().join("out.jpg")), (500, 333));

    let missing: ShrinkRequest = serde_json::from_value(serde_json::json!({
        "input_path": tmp.path().join("nope.jpg"),
        "output_path": tmp.path().join("nope-out.jpg"),
    }))
    .unwrap();
    let response = handle_request(&RustBackend::new(), &missing, &NullSink);
    assert!(!response.success);
    let value = serde_json::to_value(&response).unwrap();
    assert!(value.get("stats").is_none());
}
