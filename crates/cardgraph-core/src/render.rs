//! # Graph Renderer
//!
//! Turns a graph into a `Figure`: plain drawable data (positions, sizes,
//! colours, hover text) that can be serialized to JSON for interactive
//! viewers or to a static SVG for reports.
//!
//! Node size grows linearly with degree, node colour encodes a quality
//! score in `[0, 3]`, edge width grows with connection weight.

use crate::graph::{Connection, Graph, Node};
use crate::layout::{LayoutSettings, Point, spring_layout};
use crate::primitives::EMPTY_FIGURE_MESSAGE;
use crate::{CardGraphError, ColorBy, NodeKey, NodeKind, Record};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Colour scale stops as `(position, [r, g, b])`.
const COLOR_STOPS: [(f64, [u8; 3]); 4] = [
    (0.0, [0xFF, 0xE6, 0xB3]),
    (0.33, [0xD4, 0xFF, 0xD4]),
    (0.67, [0x98, 0xFF, 0x98]),
    (1.0, [0x22, 0x8B, 0x22]),
];

/// Upper bound of the node colour scalar.
const COLOR_MAX: f64 = 3.0;

/// Connection weight mapped to the widest edge.
const EDGE_WEIGHT_CAP: f64 = 5.0;

// =============================================================================
// SETTINGS
// =============================================================================

/// Visual parameters of a rendered figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub layout: LayoutSettings,
    pub node_size_min: f64,
    pub node_size_max: f64,
    pub node_opacity: f64,
    pub edge_width_min: f64,
    pub edge_width_max: f64,
    pub edge_opacity: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            layout: LayoutSettings::default(),
            node_size_min: 10.0,
            node_size_max: 30.0,
            node_opacity: 0.8,
            edge_width_min: 0.5,
            edge_width_max: 3.0,
            edge_opacity: 0.3,
        }
    }
}

// =============================================================================
// FIGURE
// =============================================================================

/// Legend of the node colour scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorBar {
    pub title: String,
    pub tick_values: Vec<f64>,
    pub tick_labels: Vec<String>,
}

impl ColorBar {
    fn for_mode(color_by: ColorBy) -> Self {
        let (title, labels) = match color_by {
            ColorBy::Completeness => ("Data Completeness", ["0%", "33%", "67%", "100%"]),
            ColorBy::FairCompliance => ("FAIR Compliance", ["Limited", "Moderate", "Good", "Strong"]),
        };
        Self {
            title: title.to_string(),
            tick_values: vec![0.0, 1.0, 2.0, 3.0],
            tick_labels: labels.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// A drawable node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureNode {
    pub key: NodeKey,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    /// Quality score in `[0, 3]`.
    pub color_value: f64,
    /// `#RRGGBB` colour interpolated from `color_value`.
    pub color: String,
    /// Tooltip lines joined by `\n`; the first line is the heading.
    pub hover: String,
}

/// A drawable edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureEdge {
    pub source: NodeKey,
    pub target: NodeKey,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub weight: u32,
    pub width: f64,
    pub hover: String,
}

/// Rendered graph, independent of any display surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub title: String,
    pub color_by: ColorBy,
    pub color_bar: ColorBar,
    pub node_opacity: f64,
    pub edge_opacity: f64,
    pub nodes: Vec<FigureNode>,
    pub edges: Vec<FigureEdge>,
    /// Message shown instead of a graph when there is nothing to draw.
    pub placeholder: Option<String>,
}

impl Figure {
    /// Check whether this is the "no data" placeholder.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, CardGraphError> {
        serde_json::to_string_pretty(self).map_err(|e| CardGraphError::Serialization(e.to_string()))
    }

    /// Render a static SVG image of the given pixel size.
    ///
    /// Layout coordinates are fitted into the canvas below a title band.
    /// Hover text becomes `<title>` children so it still shows as a
    /// native tooltip in browsers.
    #[must_use]
    pub fn to_svg(&self, width: u32, height: u32) -> String {
        let (w, h) = (f64::from(width.max(1)), f64::from(height.max(1)));
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        );
        let _ = writeln!(svg, r##"<rect width="100%" height="100%" fill="#FFFFFF"/>"##);
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="36" font-family="sans-serif" font-size="20" text-anchor="middle">{}</text>"#,
            w / 2.0,
            escape_xml(&self.title)
        );

        if let Some(message) = &self.placeholder {
            let _ = writeln!(
                svg,
                r##"<text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="20" fill="#888888" text-anchor="middle">{}</text>"##,
                w / 2.0,
                h / 2.0,
                escape_xml(message)
            );
            svg.push_str("</svg>\n");
            return svg;
        }

        let viewport = Viewport::fit(&self.nodes, w, h);

        let _ = writeln!(svg, r##"<g stroke="#888888" stroke-opacity="{}">"##, self.edge_opacity);
        for edge in &self.edges {
            let (x0, y0) = viewport.map(edge.x0, edge.y0);
            let (x1, y1) = viewport.map(edge.x1, edge.y1);
            let _ = writeln!(
                svg,
                r#"<line x1="{x0:.2}" y1="{y0:.2}" x2="{x1:.2}" y2="{y1:.2}" stroke-width="{:.2}"><title>{}</title></line>"#,
                edge.width,
                escape_xml(&edge.hover)
            );
        }
        svg.push_str("</g>\n");

        let _ = writeln!(
            svg,
            r##"<g stroke="#888888" stroke-width="1" fill-opacity="{}">"##,
            self.node_opacity
        );
        for node in &self.nodes {
            let (cx, cy) = viewport.map(node.x, node.y);
            let _ = writeln!(
                svg,
                r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{:.2}" fill="{}"><title>{}</title></circle>"#,
                node.size / 2.0,
                node.color,
                escape_xml(&node.hover)
            );
        }
        svg.push_str("</g>\n</svg>\n");
        svg
    }
}

/// Affine map from layout coordinates to canvas pixels.
struct Viewport {
    min_x: f64,
    min_y: f64,
    factor: f64,
    offset_x: f64,
    offset_y: f64,
    height: f64,
}

impl Viewport {
    const MARGIN: f64 = 20.0;
    const TOP: f64 = 60.0;

    fn fit(nodes: &[FigureNode], w: f64, h: f64) -> Self {
        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for node in nodes {
            min_x = min_x.min(node.x);
            max_x = max_x.max(node.x);
            min_y = min_y.min(node.y);
            max_y = max_y.max(node.y);
        }
        if !min_x.is_finite() {
            (min_x, max_x, min_y, max_y) = (0.0, 0.0, 0.0, 0.0);
        }

        let avail_w = (w - 2.0 * Self::MARGIN).max(1.0);
        let avail_h = (h - Self::TOP - Self::MARGIN).max(1.0);
        let span_x = max_x - min_x;
        let span_y = max_y - min_y;
        let factor = match (span_x > 0.0, span_y > 0.0) {
            (true, true) => (avail_w / span_x).min(avail_h / span_y),
            (true, false) => avail_w / span_x,
            (false, true) => avail_h / span_y,
            (false, false) => 1.0,
        };

        Self {
            min_x,
            min_y,
            factor,
            offset_x: Self::MARGIN + (avail_w - span_x * factor) / 2.0,
            offset_y: Self::TOP + (avail_h - span_y * factor) / 2.0,
            height: span_y * factor,
        }
    }

    /// Screen y grows downward, layout y grows upward.
    fn map(&self, x: f64, y: f64) -> (f64, f64) {
        let sx = self.offset_x + (x - self.min_x) * self.factor;
        let sy = self.offset_y + self.height - (y - self.min_y) * self.factor;
        (sx, sy)
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

// =============================================================================
// RENDERING
// =============================================================================

/// Render `graph` as a figure.
///
/// An empty graph produces a placeholder figure with no nodes or edges.
#[must_use]
pub fn render(graph: &Graph, title: &str, color_by: ColorBy, settings: &RenderSettings) -> Figure {
    let mut figure = Figure {
        title: title.to_string(),
        color_by,
        color_bar: ColorBar::for_mode(color_by),
        node_opacity: settings.node_opacity,
        edge_opacity: settings.edge_opacity,
        nodes: Vec::new(),
        edges: Vec::new(),
        placeholder: None,
    };

    if graph.is_empty() {
        figure.placeholder = Some(EMPTY_FIGURE_MESSAGE.to_string());
        return figure;
    }

    let layout = spring_layout(graph, &settings.layout);
    let at = |node: &Node| layout.position(node.index).unwrap_or_default();
    let max_degree = graph.max_degree();

    for (a, b, connection) in graph.edges() {
        let (Some(na), Some(nb)) = (graph.node(a), graph.node(b)) else {
            continue;
        };
        let (pa, pb): (Point, Point) = (at(na), at(nb));
        figure.edges.push(FigureEdge {
            source: na.key.clone(),
            target: nb.key.clone(),
            x0: pa.x,
            y0: pa.y,
            x1: pb.x,
            y1: pb.y,
            weight: connection.weight.value(),
            width: edge_width(connection.weight.value(), settings),
            hover: edge_hover(connection),
        });
    }

    for node in graph.nodes() {
        let degree = graph.degree(node.index);
        let position = at(node);
        let color_value = color_value(&node.record, color_by);
        figure.nodes.push(FigureNode {
            key: node.key.clone(),
            kind: node.kind,
            x: position.x,
            y: position.y,
            size: node_size(degree, max_degree, settings),
            color_value,
            color: color_hex(color_value),
            hover: node_hover(node, degree),
        });
    }

    figure
}

/// Linear size between min and max by `degree / max_degree`.
#[must_use]
pub fn node_size(degree: usize, max_degree: usize, settings: &RenderSettings) -> f64 {
    if max_degree == 0 {
        return settings.node_size_min;
    }
    let ratio = (degree as f64 / max_degree as f64).clamp(0.0, 1.0);
    settings.node_size_min + ratio * (settings.node_size_max - settings.node_size_min)
}

/// Linear width between min and max, weights 1..=5 mapped onto `[0, 1]`.
#[must_use]
pub fn edge_width(weight: u32, settings: &RenderSettings) -> f64 {
    let normalized = ((f64::from(weight) - 1.0) / (EDGE_WEIGHT_CAP - 1.0)).clamp(0.0, 1.0);
    settings.edge_width_min + normalized * (settings.edge_width_max - settings.edge_width_min)
}

/// Quality score of a record in `[0, 3]`.
#[must_use]
pub fn color_value(record: &Record, color_by: ColorBy) -> f64 {
    match color_by {
        ColorBy::Completeness => {
            let percent = record
                .non_empty("Data Completeness")
                .and_then(|v| v.trim().trim_end_matches('%').trim().parse::<f64>().ok())
                .unwrap_or(50.0);
            (percent / 100.0 * COLOR_MAX).clamp(0.0, COLOR_MAX)
        }
        ColorBy::FairCompliance => fair_score(record.value("FAIR Compliance Notes")),
    }
}

/// Keyword grade of free-text FAIR notes.
///
/// Substring matches, checked from the highest grade down: the first
/// group with a hit wins, so "Limited FAIR compliance" grades as "fair".
#[must_use]
pub fn fair_score(notes: &str) -> f64 {
    let notes = notes.to_lowercase();
    let any = |words: &[&str]| words.iter().any(|w| notes.contains(w));

    if any(&["strong", "excellent"]) {
        3.0
    } else if any(&["good"]) {
        2.0
    } else if any(&["moderate", "fair"]) {
        1.0
    } else if any(&["limited", "poor", "weak"]) {
        0.0
    } else {
        1.5
    }
}

/// Interpolate the colour scale at `value ∈ [0, 3]`.
#[must_use]
pub fn color_hex(value: f64) -> String {
    let t = if value.is_finite() {
        (value / COLOR_MAX).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let mut rgb = COLOR_STOPS[COLOR_STOPS.len() - 1].1;
    for pair in COLOR_STOPS.windows(2) {
        let ((p0, c0), (p1, c1)) = (pair[0], pair[1]);
        if t <= p1 {
            let f = if p1 > p0 { (t - p0) / (p1 - p0) } else { 0.0 };
            for (i, channel) in rgb.iter_mut().enumerate() {
                let v = f64::from(c0[i]) + f * (f64::from(c1[i]) - f64::from(c0[i]));
                *channel = v.round().clamp(0.0, 255.0) as u8;
            }
            break;
        }
    }

    format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}

/// Cut `value` to `limit` characters, marking the cut with `...`.
fn truncate(value: &str, limit: usize) -> String {
    if value.chars().count() > limit {
        let head: String = value.chars().take(limit.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        value.to_string()
    }
}

fn edge_hover(connection: &Connection) -> String {
    let mut lines = vec![format!("Connection strength: {}", connection.weight.value())];
    for feature in connection.shared_features.iter().take(3) {
        let mut values = feature
            .shared_values
            .iter()
            .take(2)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        if feature.shared_values.len() > 2 {
            let _ = write!(values, " (+{} more)", feature.shared_values.len() - 2);
        }
        lines.push(format!("{}: {}", feature.column, values));
    }
    lines.join("\n")
}

fn node_hover(node: &Node, degree: usize) -> String {
    let record = &node.record;
    let mut lines = Vec::new();
    let push_field = |lines: &mut Vec<String>, column: &str, limit: usize| {
        if let Some(v) = record.non_empty(column) {
            lines.push(format!("{}: {}", column, truncate(v, limit)));
        }
    };

    match node.kind {
        NodeKind::Repository => {
            lines.push(node.key.to_string());
            if let Some(link) = record.non_empty("Repository Link") {
                lines.push(format!("Link: {}", link));
            }
            push_field(&mut lines, "Languages", 50);
            push_field(&mut lines, "FAIR Issues", 60);
            for column in ["Study Name", "Data Types", "Tooling"] {
                push_field(&mut lines, column, 50);
            }
        }
        NodeKind::Publication => {
            lines.push(
                record
                    .non_empty("Title")
                    .map_or_else(|| node.key.to_string(), str::to_string),
            );
            if let Some(authors) = record.non_empty("Authors") {
                let list: Vec<&str> = authors.split(';').map(str::trim).collect();
                let shown = if list.len() > 3 {
                    format!("{} (+{} more)", list[..3].join("; "), list.len() - 3)
                } else {
                    list.join("; ")
                };
                lines.push(format!("Authors: {}", shown));
            }
            if let Some(link) = record.non_empty("PubMed Central Link") {
                lines.push(format!("Link: {}", link));
            }
            for column in ["Study Name", "Diseases Included"] {
                push_field(&mut lines, column, 60);
            }
        }
        NodeKind::Dataset => {
            lines.push(node.key.to_string());
            for column in [
                "Abbreviation",
                "Diseases Included",
                "Data Modalities",
                "FAIR Compliance Notes",
            ] {
                push_field(&mut lines, column, 80);
            }
        }
    }

    lines.push(format!("Connections: {}", degree));
    lines.join("\n")
}

// =============================================================================
// TESTS
// =============================================================================
