//! Parameter types for codec operations.
//!
//! These structs describe *what* to encode, not *how*. They are the interface
//! between the [`process`](crate::process) module (which decides what each
//! output should look like) and the [`backend`](super::backend) (which does the
//! pixel work). Keeping them plain data lets tests swap in a mock backend and
//! assert on exactly what would have been encoded.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 95). Clamped on construction.
//! - [`JpegMode`]: Advanced (progressive, trellis, optimized scans) or standard baseline.
//! - [`WebpMode`]: Lossy at a quality, or lossless.
//! - [`Encoding`]: The output codec and its knobs.
//! - [`EncodeParams`]: Source, optional resize target, and encoding for one output.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// JPEG encoder flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegMode {
    /// Progressive, trellis-quantized, optimized scans and Huffman tables.
    Advanced,
    /// Plain baseline JPEG.
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebpMode {
    Lossy(Quality),
    Lossless,
}

/// Output codec plus the parameters that codec needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Jpeg { quality: Quality, mode: JpegMode },
    /// Maximum zlib effort with palette reduction attempted.
    Png,
    Webp(WebpMode),
}

impl Encoding {
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Jpeg { .. } => "jpeg",
            Encoding::Png => "png",
            Encoding::Webp(_) => "webp",
        }
    }
}

/// Parameters for a single decode → (resize) → encode pass.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    pub source: PathBuf,
    /// Exact output dimensions, or `None` to keep the decoded size.
    pub resize: Option<(u32, u32)>,
    pub encoding: Encoding,
}
