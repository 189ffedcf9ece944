//! pdfscan - Scan a decoded PDF content stream
//!
//! Reads an already-decoded content stream, runs it as a page and prints the
//! extracted text, the text runs or graphics objects as JSON, or the display
//! list produced by rendering it.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, ValueEnum};
use pdfscan_core::api::{extract_graphics_objects, extract_text, extract_text_runs, render_page};
use pdfscan_core::font::SimpleFont;
use pdfscan_core::interp::{DrawCommand, PathSegment, RecordingSurface};
use pdfscan_core::model::{ContentObject, Operation, Page, Resources, Rotation};
use pdfscan_core::params::ScanParams;
use pdfscan_core::parser::parse_content;
use pdfscan_core::utils::{Rect, rect_size};
use pdfscan_core::wrapper::GraphicsObjectWrapper;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

/// Output type.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputType {
    /// Plain text, one line per text object (default)
    #[default]
    Text,
    /// Text runs with device boxes as JSON
    Runs,
    /// Graphics objects with device boxes as JSON
    Objects,
    /// Display list of a render as JSON
    Render,
}

/// Scan a decoded PDF content stream.
#[derive(Parser, Debug)]
#[command(name = "pdfscan")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a decoded content stream, or "-" for stdin
    file: PathBuf,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Type of output to generate
    #[arg(short = 't', long = "output-type", value_enum, default_value = "text")]
    output_type: OutputType,

    /// Page box as "x0,y0,x1,y1"
    #[arg(short = 'b', long = "box", default_value = "0,0,612,792")]
    media_box: String,

    /// Page rotation in degrees (multiple of 90)
    #[arg(short = 'R', long, default_value = "0")]
    rotation: i64,

    /// Canvas width; defaults to the box width
    #[arg(long)]
    width: Option<f64>,

    /// Canvas height; defaults to the box height
    #[arg(long)]
    height: Option<f64>,

    /// Glyph width (1/1000 em) of the stand-in fonts
    #[arg(long = "font-width", default_value = "500")]
    font_width: f64,

    /// Maximum form XObject nesting
    #[arg(long = "max-form-depth", default_value = "32")]
    max_form_depth: usize,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,
}

#[derive(Serialize)]
struct RunOut {
    text: String,
    bbox: [f64; 4],
    font: Option<String>,
    size: f64,
    text_object: usize,
}

#[derive(Serialize)]
struct ObjectOut {
    kind: &'static str,
    bbox: [f64; 4],
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

fn rect_array(r: Rect) -> [f64; 4] {
    [r.0, r.1, r.2, r.3]
}

fn parse_box(value: &str) -> Result<Rect> {
    let parts = value
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("invalid box: {value}"))?;
    match parts[..] {
        [x0, y0, x1, y1] => Ok((x0, y0, x1, y1)),
        _ => bail!("box needs four numbers, got {}", parts.len()),
    }
}

fn read_input(path: &PathBuf) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    if path.as_os_str() == "-" {
        io::stdin().read_to_end(&mut data)?;
    } else {
        File::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?
            .read_to_end(&mut data)?;
    }
    Ok(data)
}

/// Font resource names used by `Tf` anywhere in the tree.
fn font_names(objects: &[ContentObject], names: &mut Vec<String>) {
    for object in objects {
        match object {
            ContentObject::Leaf(Operation::SetFont { name, .. }) => {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
            ContentObject::Leaf(_) => {}
            ContentObject::Composite(composite) => font_names(&composite.objects, names),
        }
    }
}

fn command_json(command: &DrawCommand) -> Value {
    match command {
        DrawCommand::SetMatrix(m) => json!({"op": "set_matrix", "matrix": [m.0, m.1, m.2, m.3, m.4, m.5]}),
        DrawCommand::Clear(r) => json!({"op": "clear", "rect": rect_array(*r)}),
        DrawCommand::ClipRect(r) => json!({"op": "clip_rect", "rect": rect_array(*r)}),
        DrawCommand::Save => json!({"op": "save"}),
        DrawCommand::Restore => json!({"op": "restore"}),
        DrawCommand::BeginFigure { name, bbox, .. } => {
            json!({"op": "begin_figure", "name": name, "bbox": rect_array(*bbox)})
        }
        DrawCommand::EndFigure(name) => json!({"op": "end_figure", "name": name}),
        DrawCommand::BeginMarkedContent(tag) => json!({"op": "begin_marked_content", "tag": tag}),
        DrawCommand::EndMarkedContent => json!({"op": "end_marked_content"}),
        DrawCommand::MarkedContentPoint(tag) => json!({"op": "marked_content_point", "tag": tag}),
        DrawCommand::FillPath { path, paint, .. } => {
            json!({"op": "fill_path", "segments": path_json(path), "color": paint.color.to_vec()})
        }
        DrawCommand::StrokePath { path, paint } => json!({
            "op": "stroke_path",
            "segments": path_json(path),
            "color": paint.color.to_vec(),
            "width": paint.stroke.as_ref().map(|s| s.width),
        }),
        DrawCommand::ClipPath { path, .. } => json!({"op": "clip_path", "segments": path_json(path)}),
        DrawCommand::Image {
            name,
            width,
            height,
        } => json!({"op": "image", "name": name, "width": width, "height": height}),
        DrawCommand::Glyph(glyph) => json!({
            "op": "glyph",
            "text": glyph.text,
            "origin": [glyph.matrix.4, glyph.matrix.5],
        }),
        DrawCommand::Shading(name) => json!({"op": "shading", "name": name}),
    }
}

fn path_json(path: &[PathSegment]) -> Vec<Value> {
    path.iter()
        .map(|segment| match segment {
            PathSegment::MoveTo(x, y) => json!(["m", x, y]),
            PathSegment::LineTo(x, y) => json!(["l", x, y]),
            PathSegment::CurveTo(x1, y1, x2, y2, x3, y3) => json!(["c", x1, y1, x2, y2, x3, y3]),
            PathSegment::ClosePath => json!(["h"]),
        })
        .collect()
}

fn run(args: &Args, output: &mut dyn Write) -> Result<()> {
    let data = read_input(&args.file)?;
    let contents = parse_content(&data).context("failed to parse content stream")?;
    let media_box = parse_box(&args.media_box)?;

    let mut names = Vec::new();
    font_names(&contents, &mut names);
    let mut resources = Resources::new();
    for name in &names {
        resources = resources.with_font(name, Arc::new(SimpleFont::new(name, args.font_width)));
    }
    debug!(fonts = names.len(), objects = contents.len(), "content parsed");

    let page = Page::new(media_box, resources, contents)
        .with_rotation(Rotation::from_degrees(args.rotation));
    let params = ScanParams::default().with_max_form_depth(args.max_form_depth);

    match args.output_type {
        OutputType::Text => {
            writeln!(output, "{}", extract_text(&page, params))?;
        }
        OutputType::Runs => {
            let runs: Vec<RunOut> = extract_text_runs(&page, params)
                .into_iter()
                .map(|run| RunOut {
                    text: run.text,
                    bbox: rect_array(run.bbox),
                    font: run.style.font_name.map(|n| n.to_string()),
                    size: run.style.font_size,
                    text_object: run.text_object,
                })
                .collect();
            serde_json::to_writer_pretty(&mut *output, &runs)?;
            writeln!(output)?;
        }
        OutputType::Objects => {
            let objects: Vec<ObjectOut> = extract_graphics_objects(&page, params)
                .iter()
                .map(|object| ObjectOut {
                    kind: object.kind(),
                    bbox: rect_array(object.bbox()),
                    text: object.text(),
                    name: match object {
                        GraphicsObjectWrapper::XObject(x) => Some(x.name().to_string()),
                        _ => None,
                    },
                })
                .collect();
            serde_json::to_writer_pretty(&mut *output, &objects)?;
            writeln!(output)?;
        }
        OutputType::Render => {
            let (box_w, box_h) = rotation_size(&page, media_box);
            let canvas = (args.width.unwrap_or(box_w), args.height.unwrap_or(box_h));
            if !(canvas.0 > 0.0 && canvas.1 > 0.0) {
                bail!("canvas size must be positive, got {}x{}", canvas.0, canvas.1);
            }
            let mut surface = RecordingSurface::new();
            render_page(&page, &mut surface, canvas, None, params);
            let commands: Vec<Value> = surface.commands.iter().map(command_json).collect();
            serde_json::to_writer_pretty(&mut *output, &commands)?;
            writeln!(output)?;
        }
    }
    Ok(())
}

/// Box size as seen on the device, sides swapped for quarter turns.
fn rotation_size(page: &Page, media_box: Rect) -> (f64, f64) {
    page.rotation.transform_size(rect_size(media_box))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(&args.outfile)
            .with_context(|| format!("failed to create output file {}", args.outfile))?;
        Box::new(BufWriter::new(file))
    };

    run(&args, output.as_mut())?;
    output.flush()?;
    Ok(())
}
