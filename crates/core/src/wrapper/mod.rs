//! Graphics object wrappers - derived views over the object at a scanner cursor.
//!
//! Wrappers never edit the content tree. Each one captures what it needs
//! from the scanner when created and computes its device box on first use.

pub mod text;
pub mod xobject;

pub use text::{TextChar, TextStringWrapper, TextStyle, TextWrapper};
pub use xobject::{InlineImageWrapper, XObjectWrapper};

use tracing::debug;

use crate::interp::scanner::ContentScanner;
use crate::model::objects::{ContentObject, Operation};
use crate::utils::Rect;

/// Wrapper over one graphics object.
#[derive(Debug, Clone)]
pub enum GraphicsObjectWrapper<'a> {
    /// Text object (`BT ... ET`)
    Text(TextWrapper),
    /// Text-showing operation
    TextString(TextStringWrapper),
    /// XObject invocation (`Do`)
    XObject(XObjectWrapper<'a>),
    InlineImage(InlineImageWrapper),
}

impl<'a> GraphicsObjectWrapper<'a> {
    /// Wraps the object at the scanner cursor; None for objects that are not
    /// graphics objects and for `Do` names missing from the resources.
    pub fn get(scanner: &ContentScanner<'a, '_>) -> Option<Self> {
        let object = scanner.current()?;
        let state = scanner.state();
        match &*object {
            ContentObject::Leaf(Operation::ShowText(show)) => {
                Some(Self::TextString(TextStringWrapper::new(show, state)))
            }
            ContentObject::Leaf(Operation::PaintXObject(name)) => {
                match scanner.resources().xobject(name) {
                    Some(xobject) => Some(Self::XObject(XObjectWrapper::new(
                        name.clone(),
                        xobject,
                        state.ctm,
                    ))),
                    None => {
                        debug!(name = %name, "no wrapper for unresolved XObject");
                        None
                    }
                }
            }
            ContentObject::Leaf(Operation::InlineImage(image)) => Some(Self::InlineImage(
                InlineImageWrapper::new(image, state.ctm),
            )),
            ContentObject::Composite(composite) if composite.kind.is_text() => {
                Some(Self::Text(TextWrapper::new(scanner)))
            }
            _ => None,
        }
    }

    /// Device-space bounding box.
    pub fn bbox(&self) -> Rect {
        match self {
            Self::Text(w) => w.bbox(),
            Self::TextString(w) => w.bbox(),
            Self::XObject(w) => w.bbox(),
            Self::InlineImage(w) => w.bbox(),
        }
    }

    /// Shown text, for the text variants.
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Text(w) => Some(w.text()),
            Self::TextString(w) => Some(w.text()),
            Self::XObject(_) | Self::InlineImage(_) => None,
        }
    }

    /// Short name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::TextString(_) => "text_string",
            Self::XObject(w) if w.is_form() => "form",
            Self::XObject(_) => "image",
            Self::InlineImage(_) => "inline_image",
        }
    }
}
