//! pdfscan - PDF content-stream scanning, rendering and text positioning.
//!
//! A content stream is parsed into a tree of content objects, then walked
//! level by level by a `ContentScanner` that keeps the graphics state of each
//! level. The same walk either derives positions (dry scan) or draws onto a
//! `Surface` (render).

pub mod api;
pub mod error;
pub mod font;
pub mod interp;
pub mod model;
pub mod params;
pub mod parser;
pub mod utils;
pub mod wrapper;

// Re-export high_level for convenience
pub use api::high_level;

pub use error::{Result, ScanError};
pub use interp::{ContentScanner, RecordingSurface, Surface};
pub use params::ScanParams;
