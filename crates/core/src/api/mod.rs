//! High-level API module.
//!
//! # Example
//!
//! ```ignore
//! use pdfscan_core::api::extract_text;
//! use pdfscan_core::model::{Page, Resources};
//! use pdfscan_core::params::ScanParams;
//!
//! let page = Page::parse((0.0, 0.0, 612.0, 792.0), Resources::new(), content)?;
//! let text = extract_text(&page, ScanParams::default());
//! ```

pub mod high_level;
pub mod reading_order;

// Re-export for convenience
pub use high_level::{
    TextRun, extract_graphics_objects, extract_text, extract_text_runs, render_page,
};
pub use reading_order::{is_same_line, text_lines};
