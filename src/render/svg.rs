//! SVG surface and HTML page output

use std::fs;
use std::path::Path;

use askama::Template;

use super::{Stroke, Surface};
use crate::error::GraphResult;
use crate::layout::LayoutMode;
use crate::snapshot::GraphMetrics;

/// Coordinates are pre-formatted so the template stays free of float logic
#[derive(Debug, Clone)]
pub struct SvgLine {
    pub x1: String,
    pub y1: String,
    pub x2: String,
    pub y2: String,
    pub color: String,
    pub width: String,
    pub opacity: String,
    pub dashed: bool,
}

#[derive(Debug, Clone)]
pub struct SvgCircle {
    pub cx: String,
    pub cy: String,
    pub r: String,
    pub fill: String,
}

#[derive(Debug, Clone)]
pub struct SvgText {
    pub x: String,
    pub y: String,
    pub size: String,
    pub fill: String,
    pub content: String,
}

fn num(v: f32) -> String {
    format!("{v:.2}")
}

#[derive(Template)]
#[template(path = "graph.svg")]
struct GraphTemplate<'a> {
    width: String,
    height: String,
    background: &'a str,
    lines: &'a [SvgLine],
    circles: &'a [SvgCircle],
    texts: &'a [SvgText],
}

/// A [`Surface`] that records one frame and serializes it as an SVG document
#[derive(Debug, Clone, Default)]
pub struct SvgSurface {
    width: f32,
    height: f32,
    background: String,
    lines: Vec<SvgLine>,
    circles: Vec<SvgCircle>,
    texts: Vec<SvgText>,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[SvgLine] {
        &self.lines
    }

    pub fn circles(&self) -> &[SvgCircle] {
        &self.circles
    }

    pub fn texts(&self) -> &[SvgText] {
        &self.texts
    }

    /// Serialize the last frame
    pub fn to_svg(&self) -> GraphResult<String> {
        let template = GraphTemplate {
            width: self.width.to_string(),
            height: self.height.to_string(),
            background: &self.background,
            lines: &self.lines,
            circles: &self.circles,
            texts: &self.texts,
        };
        Ok(template.render()?)
    }
}

impl Surface for SvgSurface {
    fn clear(&mut self, width: f32, height: f32, background: &str) {
        self.width = width;
        self.height = height;
        self.background = background.to_string();
        self.lines.clear();
        self.circles.clear();
        self.texts.clear();
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), stroke: Stroke<'_>) {
        self.lines.push(SvgLine {
            x1: num(from.0),
            y1: num(from.1),
            x2: num(to.0),
            y2: num(to.1),
            color: stroke.color.to_string(),
            width: num(stroke.width),
            opacity: num(stroke.opacity),
            dashed: stroke.dashed,
        });
    }

    fn circle(&mut self, center: (f32, f32), radius: f32, fill: &str) {
        self.circles.push(SvgCircle {
            cx: num(center.0),
            cy: num(center.1),
            r: num(radius),
            fill: fill.to_string(),
        });
    }

    fn text(&mut self, at: (f32, f32), content: &str, size: f32, fill: &str) {
        self.texts.push(SvgText {
            x: num(at.0),
            y: num(at.1),
            size: num(size),
            fill: fill.to_string(),
            content: content.to_string(),
        });
    }
}

/// What the page shows below the metrics readout
#[derive(Debug, Clone, Copy)]
pub enum PageBody<'a> {
    Graph(&'a str),
    Empty,
    Error(&'a str),
}

#[derive(Template)]
#[template(path = "index.html")]
struct PageTemplate<'a> {
    title: &'a str,
    mode: String,
    node_count: usize,
    edge_count: usize,
    density: String,
    svg: &'a str,
    empty: bool,
    error: Option<&'a str>,
}

/// Render the HTML page wrapping a rendered graph
pub fn render_page(
    title: &str,
    mode: LayoutMode,
    metrics: &GraphMetrics,
    body: PageBody<'_>,
) -> GraphResult<String> {
    let (svg, empty, error) = match body {
        PageBody::Graph(svg) => (svg, false, None),
        PageBody::Empty => ("", true, None),
        PageBody::Error(message) => ("", false, Some(message)),
    };
    let template = PageTemplate {
        title,
        mode: mode.to_string(),
        node_count: metrics.node_count,
        edge_count: metrics.edge_count,
        density: format!("{:.3}", metrics.density),
        svg,
        empty,
        error,
    };
    Ok(template.render()?)
}

/// Write `graph.svg` and `index.html` to the output directory
pub fn write_site(output_dir: &Path, svg: &str, page: &str) -> GraphResult<()> {
    // Create output directory if it doesn't exist
    fs::create_dir_all(output_dir)?;
    fs::write(output_dir.join("graph.svg"), svg)?;
    fs::write(output_dir.join("index.html"), page)?;
    Ok(())
}
