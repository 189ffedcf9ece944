//! Content stream execution and drawing output.
//!
//! This module contains:
//! - `scanner`: level-by-level cursor over a content tree
//! - `executor`: applies content objects to a graphics state
//! - `ops`: Operator implementations by category
//! - `text`: glyph positioning shared by extraction and rendering
//! - `device`: Drawing surface trait and the recording surface

pub mod device;
pub mod executor;
pub mod ops;
pub mod scanner;
pub mod text;

// Re-export main types for convenience
pub use device::{
    DrawCommand, Glyph, ImageRef, Paint, PathSegment, RecordingSurface, StrokeStyle, Surface,
};
pub use executor::{Executor, PathBuilder, RenderSession};
pub use scanner::{Container, ContentRef, ContentScanner, START_INDEX, StartHook};
pub use text::{PlacedChar, UNMAPPED_TEXT, next_line, show_text};
