//! # Simple Shrink
//!
//! Shrinks images for the web: each input is resized to an orientation-aware
//! width and re-encoded so it lands near a byte budget (70 KB by default).
//! Inputs that already fit are copied unchanged.
//!
//! # Pipeline
//!
//! ```text
//! identify ─▶ plan (size policy + skip decision + quality) ─▶ copy | decode ─▶ resize ─▶ encode ─▶ write
//! ```
//!
//! A single file goes through [`process::transform_image`]; a directory goes
//! through [`batch::transform_directory`], which runs every image in turn and
//! keeps going past failures. [`request::handle_request`] wraps both behind a
//! JSON-friendly request/response pair.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Size policy, quality selector, transform plan, codec backend |
//! | [`process`] | Single-image transformer and WebP conversion |
//! | [`batch`] | Directory mode with aggregate statistics |
//! | [`request`] | Request/response surface used by the CLI |
//! | [`config`] | `shrink.toml` loading, merging and validation |
//! | [`sink`] | Progress line receivers |
//! | [`output`] | Formatting of progress and summary lines |
//! | [`types`] | Metadata, outcome and summary records |
//!
//! # Design Decisions
//!
//! ## Sizing by Orientation
//!
//! Landscape (and square) images are capped at `landscape_width`. Portrait
//! images are set to exactly `portrait_width`, so with keep-small turned off a
//! narrow portrait is enlarged while a narrow landscape never is. Height
//! always follows the aspect ratio.
//!
//! ## Quality From the Budget
//!
//! When an input is over budget, JPEG quality drops with the ratio of budget
//! to input size, floored at 60. The advanced curve never goes below 70% of
//! the configured quality; the standard curve scales linearly.
//!
//! ## Sequential by Default
//!
//! Files are processed one after another so progress lines read in order and
//! memory stays bounded by a single decoded image.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod output;
pub mod process;
pub mod request;
pub mod sink;
pub mod types;
