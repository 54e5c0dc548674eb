//! Production codec backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader` (magic-byte sniffing, header only) |
//! | Decode (JPEG, PNG, GIF, WebP) | `image` crate |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG, advanced | `mozjpeg` (progressive, trellis, optimized scans) |
//! | Encode → JPEG, standard | `image::codecs::jpeg::JpegEncoder` (baseline) |
//! | Encode → PNG | `png` (indexed, ≤256 colours) or `image::codecs::png::PngEncoder` |
//! | Encode → WebP | `webp` (libwebp) |

use super::backend::{BackendError, ImageBackend, ImageInfo};
use super::params::{EncodeParams, Encoding, JpegMode, Quality, WebpMode};
use crate::types::SourceFormat;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, RgbaImage};
use std::collections::HashMap;
use std::path::Path;

/// File extensions considered images when scanning a directory.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Returns the set of file extensions treated as image inputs.
pub fn supported_input_extensions() -> &'static [&'static str] {
    IMAGE_EXTENSIONS
}

/// Whether a path has one of the supported image extensions (case-insensitive).
pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Backend built on the `image` crate plus dedicated encoders.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk, sniffing the format from its bytes.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| BackendError::Decode(format!("Failed to decode {}: {}", path.display(), e)))
}

fn encode_jpeg(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value() as u8);
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {}", e)))?;
    Ok(buf)
}

/// Progressive JPEG through mozjpeg.
///
/// Trellis quantization, overshoot deringing and the ImageMagick (Robidoux)
/// base quant tables are mozjpeg defaults; scans and Huffman tables are
/// optimized on top. mozjpeg reports some failures by panicking, so the
/// encode runs under `catch_unwind`.
fn encode_mozjpeg(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    let result = std::panic::catch_unwind(|| -> std::io::Result<Vec<u8>> {
        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        comp.set_size(width as usize, height as usize);
        comp.set_quality(quality.value() as f32);
        comp.set_progressive_mode();
        comp.set_optimize_scans(true);
        comp.set_optimize_coding(true);
        comp.set_use_scans_in_trellis(true);

        let mut started = comp.start_compress(Vec::new())?;
        started.write_scanlines(rgb.as_raw())?;
        started.finish()
    });

    match result {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => Err(BackendError::Encode(format!("mozjpeg encode failed: {}", e))),
        Err(_) => Err(BackendError::Encode("mozjpeg encoder panicked".into())),
    }
}

/// Palette form of an image with at most 256 distinct RGBA colours.
#[derive(Debug)]
struct Palette {
    colors: Vec<[u8; 4]>,
    indices: Vec<u8>,
}

impl Palette {
    fn has_alpha(&self) -> bool {
        self.colors.iter().any(|c| c[3] != 255)
    }
}

/// Build a palette for the image, or `None` if it has more than 256 colours.
fn reduce_to_palette(rgba: &RgbaImage) -> Option<Palette> {
    let mut lookup: HashMap<[u8; 4], u8> = HashMap::new();
    let mut colors = Vec::new();
    let mut indices = Vec::with_capacity((rgba.width() * rgba.height()) as usize);

    for pixel in rgba.pixels() {
        let index = match lookup.get(&pixel.0) {
            Some(&i) => i,
            None => {
                if colors.len() == 256 {
                    return None;
                }
                let i = colors.len() as u8;
                lookup.insert(pixel.0, i);
                colors.push(pixel.0);
                i
            }
        };
        indices.push(index);
    }

    Some(Palette { colors, indices })
}

fn encode_indexed_png(palette: &Palette, width: u32, height: u32) -> Result<Vec<u8>, BackendError> {
    let to_err = |e: png::EncodingError| BackendError::Encode(format!("PNG encode failed: {}", e));

    let rgb: Vec<u8> = palette
        .colors
        .iter()
        .flat_map(|c| [c[0], c[1], c[2]])
        .collect();

    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Best);
        encoder.set_palette(rgb);
        if palette.has_alpha() {
            let alpha: Vec<u8> = palette.colors.iter().map(|c| c[3]).collect();
            encoder.set_trns(alpha);
        }
        let mut writer = encoder.write_header().map_err(to_err)?;
        writer.write_image_data(&palette.indices).map_err(to_err)?;
        writer.finish().map_err(to_err)?;
    }
    Ok(buf)
}

/// Maximum-effort PNG, indexed when the colour count allows it.
fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, BackendError> {
    let rgba = img.to_rgba8();
    if let Some(palette) = reduce_to_palette(&rgba) {
        return encode_indexed_png(&palette, rgba.width(), rgba.height());
    }

    let mut buf = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive);
    img.write_with_encoder(encoder)
        .map_err(|e| BackendError::Encode(format!("PNG encode failed: {}", e)))?;
    Ok(buf)
}

/// WebP at maximum effort (method 6). Lossy output uses sharp YUV conversion.
fn encode_webp(img: &DynamicImage, mode: WebpMode) -> Result<Vec<u8>, BackendError> {
    let rgba = img.to_rgba8();
    let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());

    let mut config = webp::WebPConfig::new()
        .map_err(|_| BackendError::Encode("WebP config init failed".into()))?;
    config.method = 6;
    match mode {
        WebpMode::Lossless => {
            config.lossless = 1;
            config.quality = 100.0;
        }
        WebpMode::Lossy(quality) => {
            config.lossless = 0;
            config.quality = quality.value() as f32;
            config.use_sharp_yuv = 1;
        }
    }

    let memory = encoder
        .encode_advanced(&config)
        .map_err(|e| BackendError::Encode(format!("WebP encode failed: {:?}", e)))?;
    Ok(memory.to_vec())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<ImageInfo, BackendError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader.format().ok_or_else(|| {
            BackendError::Decode(format!("Unrecognized image format: {}", path.display()))
        })?;
        let (width, height) = reader.into_dimensions().map_err(|e| {
            BackendError::Decode(format!("Failed to read dimensions: {}", e))
        })?;
        if width == 0 || height == 0 {
            return Err(BackendError::Decode(format!(
                "Image has no pixels: {}",
                path.display()
            )));
        }
        Ok(ImageInfo {
            width,
            height,
            format: SourceFormat::from_image_format(format),
        })
    }

    fn encode(&self, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
        let img = load_image(&params.source)?;
        let img = match params.resize {
            Some((width, height)) => img.resize_exact(width, height, FilterType::Lanczos3),
            None => img,
        };

        match params.encoding {
            Encoding::Jpeg {
                quality,
                mode: JpegMode::Advanced,
            } => encode_mozjpeg(&img, quality),
            Encoding::Jpeg {
                quality,
                mode: JpegMode::Standard,
            } => encode_jpeg(&img, quality),
            Encoding::Png => encode_png(&img),
            Encoding::Webp(mode) => encode_webp(&img, mode),
        }
    }
}
