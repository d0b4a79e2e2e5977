use crate::config::{RenderConfig, RoutingConfig};
use crate::layout::{Layout, NodeLayout, OptimizedEdge, edge_curve};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const NODE_CORNER_RADIUS: f32 = 8.0;
const EDGE_STROKE_WIDTH: f32 = 2.0;
const HUB_BADGE_RADIUS: f32 = 10.0;
/// Tracks with at least this many connections are drawn as hubs.
pub const HUB_DEGREE: usize = 5;

pub fn render_svg(
    layout: &Layout,
    theme: &Theme,
    routing: &RoutingConfig,
    render: &RenderConfig,
) -> String {
    let pad = render.padding;
    let origin_x = layout.min_x - pad;
    let origin_y = layout.min_y - pad;
    let width = (layout.width + pad * 2.0).max(200.0);
    let height = (layout.height + pad * 2.0).max(200.0);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"{origin_x:.2} {origin_y:.2} {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect x=\"{origin_x:.2}\" y=\"{origin_y:.2}\" width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        render.background
    ));

    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        theme.transition_color
    ));
    svg.push_str("</defs>");

    for edge in &layout.edges {
        svg.push_str(&edge_svg(edge, theme, routing));
    }

    for node in &layout.nodes {
        svg.push_str(&node_svg(node, theme));
    }

    svg.push_str("</svg>");
    svg
}

fn node_svg(node: &NodeLayout, theme: &Theme) -> String {
    let hub = node.degree >= HUB_DEGREE;
    let (fill, border) = if hub {
        (theme.hub_fill.as_str(), theme.hub_border.as_str())
    } else {
        (theme.node_fill.as_str(), theme.node_border.as_str())
    };
    let mut out = format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{NODE_CORNER_RADIUS}\" ry=\"{NODE_CORNER_RADIUS}\" fill=\"{fill}\" stroke=\"{border}\" stroke-width=\"{}\"/>",
        node.x,
        node.y,
        node.width,
        node.height,
        if hub { 2 } else { 1 }
    );

    let (title, artist) = match node.label.split_once(" — ") {
        Some((title, artist)) => (title, Some(artist)),
        None => (node.label.as_str(), None),
    };
    let center_x = node.x + node.width / 2.0;
    let center_y = node.y + node.height / 2.0;
    let title_y = if artist.is_some() {
        center_y - 2.0
    } else {
        center_y + theme.font_size / 3.0
    };
    out.push_str(&format!(
        "<text x=\"{center_x:.2}\" y=\"{title_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"600\" fill=\"{}\">{}</text>",
        theme.font_family,
        theme.font_size,
        theme.text_color,
        escape_xml(title)
    ));
    if let Some(artist) = artist {
        out.push_str(&format!(
            "<text x=\"{center_x:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            center_y + theme.font_size,
            theme.font_family,
            theme.font_size * 0.85,
            theme.secondary_text_color,
            escape_xml(artist)
        ));
    }

    // Connection count badge on the top-right corner.
    if hub {
        let badge_x = node.x + node.width;
        let badge_y = node.y;
        out.push_str(&format!(
            "<g class=\"hub-badge\"><circle cx=\"{badge_x:.2}\" cy=\"{badge_y:.2}\" r=\"{HUB_BADGE_RADIUS}\" fill=\"{}\"/><text x=\"{badge_x:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"700\" fill=\"{}\">{}</text></g>",
            theme.hub_badge_fill,
            badge_y + theme.font_size * 0.35,
            theme.font_family,
            theme.font_size * 0.85,
            theme.hub_badge_text,
            node.degree
        ));
    }
    out
}

fn edge_svg(edge: &OptimizedEdge, theme: &Theme, routing: &RoutingConfig) -> String {
    let curve = edge_curve(&edge.source_attachment, &edge.target_attachment, routing.curvature);
    let stroke = if edge.recent {
        theme.recent_color.as_str()
    } else {
        theme.edge_color(edge.kind)
    };
    let dash = if edge.kind.is_directed() { " stroke-dasharray=\"5 5\"" } else { "" };
    let marker = if edge.kind.is_directed() { " marker-end=\"url(#arrow)\"" } else { "" };
    format!(
        "<path id=\"edge-{}\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{EDGE_STROKE_WIDTH}\"{dash}{marker}/>",
        escape_xml(&edge.id),
        curve.to_svg_path(),
        stroke
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .unwrap_or(usvg::Size::from_wh(800.0, 600.0).unwrap());

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
