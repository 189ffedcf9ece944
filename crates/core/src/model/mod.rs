//! Content model - instructions, state, color and context definitions.
//!
//! - `objects` - content objects (leaf operations and composites)
//! - `state` - per-level graphics state (GraphicsState, TextState)
//! - `color` - color spaces and values
//! - `context` - pages, forms and their resources

pub mod color;
pub mod context;
pub mod objects;
pub mod state;

// Re-export main types for convenience
pub use color::{Color, ColorSpace};
pub use context::{
    ContentContext, ExtGState, FormXObject, ImageXObject, Page, Resources, Rotation, XObject,
};
pub use objects::{
    CompositeKind, CompositeObject, ContentObject, FillRule, InlineImage, Operation, PaintPath,
    PdfObject, ShowText, TextElement,
};
pub use state::{
    BlendMode, GraphicsState, LineCap, LineDash, LineJoin, TextRenderMode, TextState,
    compute_initial_ctm,
};
