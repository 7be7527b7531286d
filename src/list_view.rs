use crate::catalog::{CatalogSnapshot, Vehicle};
use crate::config::{LayoutConfig, RenderConfig};
use crate::layout::text::fit_label;
use crate::render::escape_xml;
use crate::theme::Theme;

const CARD_WIDTH: f32 = 260.0;
const THUMB_HEIGHT: f32 = 146.0;
const CARD_BODY_HEIGHT: f32 = 104.0;
const CARD_GAP: f32 = 16.0;
const CARD_PADDING: f32 = 12.0;

/// Flat card grid for the filtered list. Cards keep the filter's order and
/// wrap to the viewport width.
pub fn render_list_svg(
    vehicles: &[&Vehicle],
    catalog: &CatalogSnapshot,
    theme: &Theme,
    layout_config: &LayoutConfig,
    render_config: &RenderConfig,
) -> String {
    let padding = layout_config.padding;
    let per_row = (((render_config.width - padding * 2.0 + CARD_GAP) / (CARD_WIDTH + CARD_GAP))
        .floor() as usize)
        .max(1);
    let rows = vehicles.len().div_ceil(per_row).max(1);
    let card_height = THUMB_HEIGHT + CARD_BODY_HEIGHT;
    let width = (padding * 2.0 + per_row as f32 * (CARD_WIDTH + CARD_GAP) - CARD_GAP)
        .max(render_config.width);
    let height = (padding * 2.0 + rows as f32 * (card_height + CARD_GAP) - CARD_GAP)
        .max(render_config.height.min(400.0));

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    svg.push_str(&format!(
        "<defs><linearGradient id=\"thumb-placeholder\" x1=\"0\" x2=\"1\"><stop stop-color=\"{}\"/><stop offset=\"1\" stop-color=\"{}\"/></linearGradient></defs>",
        theme.placeholder_start, theme.placeholder_end
    ));

    if vehicles.is_empty() {
        svg.push_str(&format!(
            "<text class=\"empty\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">No vehicles match the current filters.</text>",
            width / 2.0,
            padding + 40.0,
            escape_xml(&theme.font_family),
            theme.font_size * 1.2,
            theme.muted_text_color
        ));
    }

    for (idx, vehicle) in vehicles.iter().enumerate() {
        let x = padding + (idx % per_row) as f32 * (CARD_WIDTH + CARD_GAP);
        let y = padding + (idx / per_row) as f32 * (card_height + CARD_GAP);
        svg.push_str(&card_svg(vehicle, catalog, x, y, theme, layout_config));
    }

    svg.push_str("</svg>");
    svg
}

fn card_svg(
    vehicle: &Vehicle,
    catalog: &CatalogSnapshot,
    x: f32,
    y: f32,
    theme: &Theme,
    config: &LayoutConfig,
) -> String {
    let font = escape_xml(&theme.font_family);
    let small = theme.font_size * config.meta_font_scale;
    let mut out = format!(
        "<g class=\"card\" data-id=\"{}\"><rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{CARD_WIDTH}\" height=\"{:.2}\" rx=\"12\" ry=\"12\" fill=\"{}\" stroke=\"{}\"/>",
        escape_xml(&vehicle.id),
        THUMB_HEIGHT + CARD_BODY_HEIGHT,
        theme.card_fill,
        theme.card_border
    );

    match vehicle.image.as_deref().filter(|src| !src.trim().is_empty()) {
        Some(src) => out.push_str(&format!(
            "<image x=\"{x:.2}\" y=\"{y:.2}\" width=\"{CARD_WIDTH}\" height=\"{THUMB_HEIGHT}\" preserveAspectRatio=\"xMidYMid slice\" href=\"{0}\" xlink:href=\"{0}\"><title>{1}</title></image>",
            escape_xml(src),
            escape_xml(&vehicle.name)
        )),
        None => out.push_str(&placeholder_svg(x, y, theme)),
    }

    let text_x = x + CARD_PADDING;
    let room = CARD_WIDTH - CARD_PADDING * 2.0;
    let mut line_y = y + THUMB_HEIGHT + CARD_PADDING + theme.font_size;
    let name = fit_label(
        &vehicle.name,
        room,
        theme.font_size * 1.1,
        &theme.font_family,
        config.fast_text_metrics,
    );
    out.push_str(&format!(
        "<text class=\"name\" x=\"{text_x:.2}\" y=\"{line_y:.2}\" font-family=\"{font}\" font-size=\"{:.2}\" font-weight=\"600\" fill=\"{}\">{}</text>",
        theme.font_size * 1.1,
        theme.text_color,
        escape_xml(&name)
    ));

    line_y += theme.font_size * 1.6;
    out.push_str(&format!(
        "<text class=\"tags\" x=\"{text_x:.2}\" y=\"{line_y:.2}\" font-family=\"{font}\" font-size=\"{small:.2}\" fill=\"{}\"><tspan class=\"tag-class\">{}</tspan><tspan class=\"tag-br\" dx=\"10\">BR {}</tspan></text>",
        theme.header_text_color,
        escape_xml(catalog.class_name(&vehicle.class)),
        escape_xml(&vehicle.rating)
    ));

    line_y += small * 1.7;
    out.push_str(&format!(
        "<text class=\"meta\" x=\"{text_x:.2}\" y=\"{line_y:.2}\" font-family=\"{font}\" font-size=\"{small:.2}\" fill=\"{}\"><tspan class=\"nation\">{}</tspan><tspan class=\"rank\" dx=\"10\">{}</tspan></text>",
        theme.muted_text_color,
        escape_xml(catalog.nation_name(&vehicle.nation)),
        escape_xml(&vehicle.rank)
    ));

    if let Some(notes) = vehicle.notes.as_deref().filter(|notes| !notes.is_empty()) {
        line_y += small * 1.7;
        let notes = fit_label(notes, room, small, &theme.font_family, config.fast_text_metrics);
        out.push_str(&format!(
            "<text class=\"notes\" x=\"{text_x:.2}\" y=\"{line_y:.2}\" font-family=\"{font}\" font-size=\"{small:.2}\" fill=\"{}\">{}</text>",
            theme.muted_text_color,
            escape_xml(&notes)
        ));
    }

    out.push_str("</g>");
    out
}

fn placeholder_svg(x: f32, y: f32, theme: &Theme) -> String {
    let cx = x + CARD_WIDTH / 2.0;
    format!(
        "<g class=\"thumb-placeholder\"><rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{CARD_WIDTH}\" height=\"{THUMB_HEIGHT}\" fill=\"url(#thumb-placeholder)\"/><g fill=\"{}\" font-family=\"system-ui,Segoe UI,Roboto\" text-anchor=\"middle\"><text x=\"{cx:.2}\" y=\"{:.2}\" font-size=\"16\">No thumbnail</text><text x=\"{cx:.2}\" y=\"{:.2}\" font-size=\"11\">War Thunder Wiki</text></g></g>",
        theme.placeholder_text,
        y + THUMB_HEIGHT * 0.5,
        y + THUMB_HEIGHT * 0.5 + 20.0
    )
}
