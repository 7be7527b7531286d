pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod debounce;
pub mod expansion;
pub mod filter;
pub mod layout;
pub mod layout_dump;
pub mod list_view;
pub mod render;
pub mod session;
pub mod text_metrics;
pub mod theme;

pub use catalog::{CatalogError, CatalogSnapshot, RelationEdge, Vehicle, load_catalog};
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use expansion::ExpansionState;
pub use filter::FilterState;
pub use layout::{TechTreeFrame, TechTreeLayout, Viewport, compute_frame, compute_tech_tree};
pub use list_view::render_list_svg;
pub use render::render_svg;
pub use session::{TechTreeSession, ViewMode};
pub use theme::Theme;

/// Everything needed for a one-shot render of a catalog.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub filter: FilterState,
    pub expansion: ExpansionState,
    /// Open every stack regardless of `expansion`.
    pub expand_all: bool,
    pub view: ViewMode,
    pub viewport: Viewport,
}

impl RenderOptions {
    pub fn hangar() -> Self {
        Self::with_theme(Theme::hangar())
    }

    pub fn light() -> Self {
        Self::with_theme(Theme::light())
    }

    fn with_theme(theme: Theme) -> Self {
        let render = RenderConfig::default();
        Self {
            theme,
            layout: LayoutConfig::default(),
            filter: FilterState::default(),
            expansion: ExpansionState::new(),
            expand_all: false,
            view: ViewMode::Tree,
            viewport: Viewport::new(render.width, render.height),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            theme: config.theme.clone(),
            layout: config.layout.clone(),
            viewport: Viewport::new(config.render.width, config.render.height),
            ..Self::hangar()
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::hangar()
    }
}

/// Filters, lays out and routes `catalog`, returning the SVG for the
/// requested view.
pub fn render_with_options(catalog: &CatalogSnapshot, options: &RenderOptions) -> String {
    let filtered = options.filter.apply(catalog);
    match options.view {
        ViewMode::List => {
            let render = RenderConfig {
                width: options.viewport.width,
                height: options.viewport.height,
                background: options.theme.background.clone(),
            };
            render_list_svg(&filtered, catalog, &options.theme, &options.layout, &render)
        }
        ViewMode::Tree => {
            let frame = compute_frame(
                catalog,
                &filtered,
                &effective_expansion(catalog, options),
                options.viewport,
                &options.layout,
            );
            render_svg(&frame.layout, &frame.connectors, &options.theme, &options.layout)
        }
    }
}

/// The expansion set `options` asks for, with `expand_all` resolved to
/// every vehicle that heads a stack.
pub fn effective_expansion(catalog: &CatalogSnapshot, options: &RenderOptions) -> ExpansionState {
    if !options.expand_all {
        return options.expansion.clone();
    }
    catalog
        .vehicles
        .iter()
        .filter_map(|vehicle| vehicle.stack_of.as_deref())
        .chain(options.expansion.expanded_ids())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::new(vec![
            Vehicle::new("a", "Alpha", "usa", "x", "I", "1.0"),
            Vehicle::new("b", "Bravo", "usa", "x", "I", "1.3").stacked_under("a"),
            Vehicle::new("c", "Charlie", "ussr", "x", "II", "2.0"),
        ])
    }

    fn options() -> RenderOptions {
        let mut options = RenderOptions::hangar();
        options.layout.fast_text_metrics = true;
        options
    }

    #[test]
    fn tree_render_collapses_stacks_by_default() {
        let svg = render_with_options(&catalog(), &options());
        assert!(svg.contains("data-id=\"a\""));
        assert!(!svg.contains("data-id=\"b\""));
        // No links in the catalog, so the derived chain has nothing to join
        // across nations.
        assert_eq!(svg.matches("<path ").count(), 0);
    }

    #[test]
    fn expand_all_opens_every_stack() {
        let mut options = options();
        options.expand_all = true;
        let svg = render_with_options(&catalog(), &options);
        assert!(svg.contains("class=\"node child\" data-id=\"b\""));
    }

    #[test]
    fn list_view_honours_filter() {
        let mut options = options();
        options.view = ViewMode::List;
        options.filter = FilterState::default().with_nation("ussr");
        let svg = render_with_options(&catalog(), &options);
        assert_eq!(svg.matches("class=\"card\"").count(), 1);
        assert!(svg.contains("Charlie"));
    }
}
