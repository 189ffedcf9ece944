//! Scan parameters.
//!
//! Contains ScanParams for controlling recursion limits, device canvas size for
//! dry scans, and surface preparation during rendering.

use std::sync::Arc;

use crate::error::{Result, ScanError};
use crate::font::Font;
use crate::utils::Size;

/// Default bound on nested form XObject invocations.
pub const DEFAULT_MAX_FORM_DEPTH: usize = 32;

/// Parameters for content scanning.
#[derive(Debug, Clone)]
pub struct ScanParams {
    /// Maximum nesting depth of form XObject invocations. Invocations beyond
    /// this depth are skipped.
    pub max_form_depth: usize,

    /// Device canvas size used to derive the root CTM in dry scans. None keeps
    /// dry scans device-independent (identity CTM).
    pub canvas_size: Option<Size>,

    /// Whether `render` clears the surface before drawing.
    pub clear_surface: bool,

    /// Font substituted when a `Tf` operator names a font missing from the resources.
    pub fallback_font: Option<Arc<dyn Font>>,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            max_form_depth: DEFAULT_MAX_FORM_DEPTH,
            canvas_size: None,
            clear_surface: true,
            fallback_font: None,
        }
    }
}

impl ScanParams {
    /// Creates new scan parameters with the specified values.
    ///
    /// # Panics
    /// Panics if canvas_size is Some and not strictly positive and finite.
    pub fn new(max_form_depth: usize, canvas_size: Option<Size>, clear_surface: bool) -> Self {
        if let Some(size) = canvas_size {
            assert!(
                valid_size(size),
                "canvas_size should be None, or a positive finite (width, height)"
            );
        }

        Self {
            max_form_depth,
            canvas_size,
            clear_surface,
            fallback_font: None,
        }
    }

    /// Sets the form recursion bound.
    pub fn with_max_form_depth(mut self, depth: usize) -> Self {
        self.max_form_depth = depth;
        self
    }

    /// Sets the dry-scan device canvas size, rejecting degenerate sizes.
    pub fn with_canvas_size(mut self, size: Size) -> Result<Self> {
        if !valid_size(size) {
            return Err(ScanError::InvalidParams(format!(
                "canvas size must be positive and finite, got {}x{}",
                size.0, size.1
            )));
        }
        self.canvas_size = Some(size);
        Ok(self)
    }

    /// Sets whether rendering clears the surface first.
    pub fn with_clear_surface(mut self, clear: bool) -> Self {
        self.clear_surface = clear;
        self
    }

    /// Sets the substitute font for unresolved font names.
    pub fn with_fallback_font(mut self, font: Arc<dyn Font>) -> Self {
        self.fallback_font = Some(font);
        self
    }
}

fn valid_size(size: Size) -> bool {
    size.0.is_finite() && size.1.is_finite() && size.0 > 0.0 && size.1 > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ScanParams::default();
        assert_eq!(params.max_form_depth, DEFAULT_MAX_FORM_DEPTH);
        assert!(params.canvas_size.is_none());
        assert!(params.clear_surface);
        assert!(params.fallback_font.is_none());
    }

    #[test]
    fn test_with_canvas_size_rejects_degenerate_sizes() {
        assert!(ScanParams::default().with_canvas_size((0.0, 10.0)).is_err());
        assert!(ScanParams::default().with_canvas_size((f64::INFINITY, 10.0)).is_err());
        let params = ScanParams::default().with_canvas_size((612.0, 792.0)).unwrap();
        assert_eq!(params.canvas_size, Some((612.0, 792.0)));
    }

    #[test]
    #[should_panic(expected = "canvas_size should be None")]
    fn test_new_panics_on_negative_canvas() {
        let _ = ScanParams::new(4, Some((-1.0, 5.0)), true);
    }
}
