use crate::config::{LayoutConfig, RenderConfig};
use crate::layout::text::fit_label;
use crate::layout::{Connector, NodeRole, PlacedNode, TechTreeLayout};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Draws a committed layout: column backgrounds and headers, the connector
/// layer, then the nodes on top.
pub fn render_svg(
    layout: &TechTreeLayout,
    connectors: &[Connector],
    theme: &Theme,
    config: &LayoutConfig,
) -> String {
    let mut svg = String::new();
    let width = layout.width.max(200.0);
    let height = layout.height.max(200.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    svg.push_str("<g class=\"rank-columns\">");
    for column in &layout.columns {
        let Some(rect) = column.rect else {
            continue;
        };
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"12\" ry=\"12\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            rect.x, rect.y, rect.width, rect.height, theme.column_background, theme.column_border
        ));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"600\" fill=\"{}\">Rank {}</text>",
            rect.x + rect.width / 2.0,
            rect.y + config.header_height * 0.65,
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.header_text_color,
            escape_xml(&column.label)
        ));
    }
    svg.push_str("</g>");

    // Wires sit under the nodes so they appear to plug into them.
    svg.push_str("<g class=\"connectors\">");
    for connector in connectors {
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.6\" stroke-linecap=\"round\" data-from=\"{}\" data-to=\"{}\"/>",
            connector.path_data(),
            theme.line_color,
            escape_xml(&connector.from),
            escape_xml(&connector.to)
        ));
    }
    svg.push_str("</g>");

    svg.push_str("<g class=\"nodes\">");
    for node in &layout.nodes {
        svg.push_str(&node_svg(node, theme, config));
    }
    svg.push_str("</g>");

    svg.push_str("</svg>");
    svg
}

fn node_svg(node: &PlacedNode, theme: &Theme, config: &LayoutConfig) -> String {
    let Some(rect) = node.rect else {
        return String::new();
    };
    let (fill, role_class) = match node.role {
        NodeRole::TopLevel { expanded: true, .. } => (theme.node_fill.as_str(), "node stack open"),
        NodeRole::TopLevel { stack_size, .. } if stack_size > 0 => {
            (theme.node_fill.as_str(), "node stack")
        }
        NodeRole::TopLevel { .. } => (theme.node_fill.as_str(), "node"),
        NodeRole::Child { .. } => (theme.child_fill.as_str(), "node child"),
    };
    let mut out = format!(
        "<g class=\"{role_class}\" data-id=\"{}\">",
        escape_xml(&node.id)
    );
    out.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"8\" ry=\"8\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.2\"/>",
        rect.x, rect.y, rect.width, rect.height, fill, theme.node_border
    ));

    let badge_width = node
        .badge
        .as_ref()
        .map(|badge| badge.chars().count() as f32 * theme.font_size * 0.6 + 12.0)
        .unwrap_or(0.0);
    let text_x = rect.x + config.node_padding_x;
    let text_room = (rect.width - config.node_padding_x * 2.0 - badge_width).max(0.0);
    let meta_size = theme.font_size * config.meta_font_scale;
    let name = fit_label(
        &node.name,
        text_room,
        theme.font_size,
        &theme.font_family,
        config.fast_text_metrics,
    );

    let name_y = if node.is_top_level() {
        rect.y + rect.height * 0.42
    } else {
        rect.y + rect.height / 2.0 + theme.font_size * 0.35
    };
    out.push_str(&format!(
        "<text x=\"{text_x:.2}\" y=\"{name_y:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.text_color,
        escape_xml(&name)
    ));
    if node.is_top_level() {
        let meta_y = rect.y + rect.height * 0.42 + meta_size * 1.4;
        out.push_str(&format!(
            "<text x=\"{text_x:.2}\" y=\"{meta_y:.2}\" font-family=\"{}\" font-size=\"{meta_size:.2}\" fill=\"{}\">BR {}</text>",
            escape_xml(&theme.font_family),
            theme.muted_text_color,
            escape_xml(&node.rating)
        ));
    }

    if let Some(badge) = &node.badge {
        let badge_h = config.badge_height;
        let badge_x = rect.right() - config.node_padding_x - badge_width;
        let badge_y = rect.y + (rect.height - badge_h) / 2.0;
        out.push_str(&format!(
            "<rect class=\"badge\" x=\"{badge_x:.2}\" y=\"{badge_y:.2}\" width=\"{badge_width:.2}\" height=\"{badge_h:.2}\" rx=\"{:.2}\" ry=\"{:.2}\" fill=\"{}\"/>",
            badge_h / 2.0,
            badge_h / 2.0,
            theme.badge_fill
        ));
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{meta_size:.2}\" fill=\"{}\">{}</text>",
            badge_x + badge_width / 2.0,
            badge_y + badge_h / 2.0 + meta_size * 0.35,
            escape_xml(&theme.font_family),
            theme.badge_text_color,
            escape_xml(badge)
        ));
    }

    out.push_str("</g>");
    out
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
pub fn write_output_png(
    svg: &str,
    output: &Path,
    render_cfg: &RenderConfig,
    theme: &Theme,
) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().to_string())
        .unwrap_or_else(|| "sans-serif".to_string());
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .or_else(|| usvg::Size::from_wh(800.0, 600.0))
        .ok_or_else(|| anyhow::anyhow!("invalid render size"))?;
    opt.fontdb_mut().load_system_fonts();

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
pub fn write_output_png(
    _svg: &str,
    _output: &Path,
    _render_cfg: &RenderConfig,
    _theme: &Theme,
) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
