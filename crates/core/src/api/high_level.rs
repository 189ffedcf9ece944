//! High-level entry points.
//!
//! Provides the main public API over a page:
//! - `render_page()` - Draw a page onto a surface
//! - `extract_text()` - Shown text as a String in reading order
//! - `extract_text_runs()` - Text strings with their device boxes and style
//! - `extract_graphics_objects()` - Wrappers for every graphics object

use tracing::debug;

use crate::api::reading_order::text_lines;
use crate::interp::device::Surface;
use crate::interp::scanner::ContentScanner;
use crate::model::context::Page;
use crate::params::ScanParams;
use crate::utils::{Rect, Size};
use crate::wrapper::{GraphicsObjectWrapper, TextChar, TextStringWrapper, TextStyle};

/// One text-showing operation as found on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub bbox: Rect,
    pub style: TextStyle,
    pub chars: Vec<TextChar>,
    /// Index of the text object the run belongs to, in page order
    pub text_object: usize,
}

impl TextRun {
    fn from_wrapper(wrapper: &TextStringWrapper, text_object: usize) -> Self {
        Self {
            text: wrapper.text(),
            bbox: wrapper.bbox(),
            style: wrapper.style(),
            chars: wrapper.chars().to_vec(),
            text_object,
        }
    }
}

/// Render a page onto a surface.
///
/// # Arguments
/// * `page` - Page to draw
/// * `surface` - Target surface
/// * `canvas_size` - Device size the page box is fitted to
/// * `clip` - Optional device clip replacing the canvas rectangle
/// * `params` - Scan parameters
pub fn render_page(
    page: &Page,
    surface: &mut dyn Surface,
    canvas_size: Size,
    clip: Option<Rect>,
    params: ScanParams,
) {
    let mut scanner = ContentScanner::for_page(page, params);
    scanner.render(surface, canvas_size, clip);
}

/// Every graphics object on the page, depth first in content order.
///
/// Text objects are reported whole; other composites are searched for the
/// objects they contain.
pub fn extract_graphics_objects<'a>(
    page: &'a Page,
    params: ScanParams,
) -> Vec<GraphicsObjectWrapper<'a>> {
    let mut scanner = ContentScanner::for_page(page, params);
    let mut objects = Vec::new();
    collect_objects(&mut scanner, &mut objects);
    debug!(count = objects.len(), "extracted graphics objects");
    objects
}

fn collect_objects<'a>(level: &mut ContentScanner<'a, '_>, out: &mut Vec<GraphicsObjectWrapper<'a>>) {
    level.move_start();
    while level.move_next() {
        if let Some(wrapper) = level.current_wrapper() {
            out.push(wrapper);
            continue;
        }
        if let Some(mut child) = level.child_level() {
            collect_objects(&mut child, out);
        }
    }
}

/// Text strings of the page in content order.
pub fn extract_text_runs(page: &Page, params: ScanParams) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut text_object = 0;
    for object in extract_graphics_objects(page, params) {
        match object {
            GraphicsObjectWrapper::Text(text) => {
                runs.extend(
                    text.text_strings()
                        .iter()
                        .map(|s| TextRun::from_wrapper(s, text_object)),
                );
                text_object += 1;
            }
            GraphicsObjectWrapper::TextString(string) => {
                runs.push(TextRun::from_wrapper(&string, text_object));
                text_object += 1;
            }
            GraphicsObjectWrapper::XObject(_) | GraphicsObjectWrapper::InlineImage(_) => {}
        }
    }
    runs
}

/// Shown text of the page in reading order.
///
/// Runs are grouped into lines by position, top to bottom and left to right.
/// Runs of different text objects on one line are separated by a space.
pub fn extract_text(page: &Page, params: ScanParams) -> String {
    let top_down = params.canvas_size.is_some();
    let lines = text_lines(extract_text_runs(page, params), top_down);
    lines
        .iter()
        .map(|line| {
            let mut text = String::new();
            let mut previous = None;
            for run in line {
                if previous.is_some_and(|p| p != run.text_object) {
                    text.push(' ');
                }
                text.push_str(&run.text);
                previous = Some(run.text_object);
            }
            text
        })
        .collect::<Vec<_>>()
        .join("\n")
}
