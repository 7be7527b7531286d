use serde::Deserialize;
use techtree_rs_renderer::{
    CatalogSnapshot, FilterState, RenderOptions, Theme, ViewMode, Viewport, render_with_options,
};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TechTreeRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    fast_text: Option<bool>,
    view: Option<String>,
    width: Option<f32>,
    height: Option<f32>,
    filter: Option<FilterState>,
    expanded: Option<Vec<String>>,
    expand_all: Option<bool>,
}

fn build_render_options(options: TechTreeRenderOptions) -> RenderOptions {
    let mut render_options = match options.theme.as_deref().and_then(Theme::by_name) {
        Some(theme) => RenderOptions {
            theme,
            ..RenderOptions::hangar()
        },
        None => RenderOptions::hangar(),
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    // No system fonts to load in the browser.
    render_options.layout.fast_text_metrics = options.fast_text.unwrap_or(true);

    if options.view.as_deref() == Some("list") {
        render_options.view = ViewMode::List;
    }
    render_options.viewport = Viewport::new(
        options.width.unwrap_or(render_options.viewport.width),
        options.height.unwrap_or(render_options.viewport.height),
    );
    if let Some(filter) = options.filter {
        render_options.filter = filter;
    }
    if let Some(expanded) = options.expanded {
        render_options.expansion = expanded.into_iter().collect();
    }
    render_options.expand_all = options.expand_all.unwrap_or(false);

    render_options
}

#[wasm_bindgen]
pub fn render_tech_tree_svg(
    catalog_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<TechTreeRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        TechTreeRenderOptions::default()
    };

    let mut catalog = CatalogSnapshot::from_json_str(catalog_json)
        .map_err(|error| JsValue::from_str(&error.to_string()))?;
    catalog.apply_builtin_thumbnails();

    let render_options = build_render_options(options);
    Ok(render_with_options(&catalog, &render_options))
}
