//! Image processing: sizing math, planning and codecs.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader` (header only) |
//! | **Resize** | `resize_exact` with Lanczos3 |
//! | **JPEG** | `mozjpeg` (advanced) or `image` (baseline) |
//! | **PNG** | `png` (indexed) or `image` (adaptive filtering) |
//! | **WebP** | `webp` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension and quality math (unit testable)
//! - **Plan**: Per-image transform decision built from the calculations
//! - **Parameters**: Data structures describing encode operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
mod plan;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend, ImageInfo};
pub use calculations::{Orientation, QUALITY_FLOOR, select_jpeg_quality, target_dimensions};
pub use params::{EncodeParams, Encoding, JpegMode, Quality, WebpMode};
pub use plan::{
    Decision, OutputFormat, TransformPlan, decide, derive_output_path, plan_transform,
};
pub use rust_backend::{RustBackend, has_image_extension, supported_input_extensions};
