use std::time::Instant;

use crate::catalog::{CatalogSnapshot, Vehicle};
use crate::config::{Config, RenderConfig};
use crate::debounce::Debouncer;
use crate::expansion::ExpansionState;
use crate::filter::FilterState;
use crate::layout::{
    Connector, TechTreeFrame, TechTreeLayout, Viewport, commit_layout, compute_tech_tree,
    route_connectors,
};
use crate::list_view::render_list_svg;
use crate::render::render_svg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Tree,
    List,
}

/// What a `tick` flushed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub search_applied: bool,
    pub resize_applied: bool,
}

impl TickOutcome {
    pub fn any(&self) -> bool {
        self.search_applied || self.resize_applied
    }
}

/// One viewing session over a catalog snapshot.
///
/// Every change runs the synchronous part of the pipeline (filter,
/// partition, stacks, layout) straight away and leaves connector routing
/// pending until the frame is committed. A newer render simply replaces the
/// pending layout; readers keep seeing the last committed frame until then.
pub struct TechTreeSession {
    catalog: CatalogSnapshot,
    config: Config,
    filter: FilterState,
    view_mode: ViewMode,
    expansion: ExpansionState,
    viewport: Viewport,
    pending: Option<TechTreeLayout>,
    committed: Option<TechTreeFrame>,
    route_pending: bool,
    search_input: Debouncer<String>,
    resize: Debouncer<Viewport>,
}

impl TechTreeSession {
    pub fn new(catalog: CatalogSnapshot, config: Config) -> Self {
        let viewport = Viewport::new(config.render.width, config.render.height);
        let search_input = Debouncer::from_millis(config.session.search_debounce_ms);
        let resize = Debouncer::from_millis(config.session.resize_debounce_ms);
        let default_nation = config.session.default_nation.clone();
        let session = Self {
            catalog,
            config,
            filter: FilterState::default(),
            view_mode: ViewMode::Tree,
            expansion: ExpansionState::new(),
            viewport,
            pending: None,
            committed: None,
            route_pending: false,
            search_input,
            resize,
        };
        match default_nation {
            Some(nation) => session.with_default_nation(&nation),
            None => session,
        }
    }

    /// Preselects `nation` when the catalog has at least one vehicle from it.
    pub fn with_default_nation(mut self, nation: &str) -> Self {
        if self
            .catalog
            .vehicles
            .iter()
            .any(|vehicle| vehicle.nation == nation)
        {
            self.filter.nations.insert(nation.to_string());
        }
        self
    }

    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The last committed layout.
    pub fn layout(&self) -> Option<&TechTreeLayout> {
        self.committed.as_ref().map(|frame| &frame.layout)
    }

    /// Connectors routed over the last committed layout.
    pub fn connectors(&self) -> &[Connector] {
        self.committed
            .as_ref()
            .map(|frame| frame.connectors.as_slice())
            .unwrap_or_default()
    }

    // Newest layout, committed or not. Clicks hit what was just built.
    fn current_layout(&self) -> Option<&TechTreeLayout> {
        self.pending.as_ref().or_else(|| self.layout())
    }

    pub fn route_pending(&self) -> bool {
        self.route_pending
    }

    pub fn filtered(&self) -> Vec<&Vehicle> {
        self.filter.apply(&self.catalog)
    }

    /// Rebuilds the layout for the current filter and expansion state and
    /// schedules connector routing for the next committed frame.
    pub fn render(&mut self) {
        let filtered = self.filter.apply(&self.catalog);
        let layout = compute_tech_tree(&filtered, &self.expansion);
        tracing::debug!(
            vehicles = filtered.len(),
            columns = layout.columns.len(),
            nodes = layout.nodes.len(),
            "tech tree laid out"
        );
        self.pending = Some(layout);
        self.route_pending = true;
    }

    /// Commits the pending layout to the grid and routes connectors against
    /// the committed geometry. Returns false when there was nothing to do.
    pub fn commit_frame(&mut self) -> bool {
        if !self.route_pending {
            return false;
        }
        let Some(mut layout) = self
            .pending
            .take()
            .or_else(|| self.committed.take().map(|frame| frame.layout))
        else {
            return false;
        };
        commit_layout(&mut layout, self.viewport, &self.config.layout);
        let connectors = route_connectors(&layout, &self.catalog, &layout, &self.config.layout);
        self.committed = Some(TechTreeFrame { layout, connectors });
        self.route_pending = false;
        true
    }

    /// `render` followed by `commit_frame`.
    pub fn frame(&mut self) {
        self.render();
        self.commit_frame();
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        self.search_input.cancel();
        self.filter = filter;
        self.render();
    }

    /// Edits the filter in place, e.g. one chip toggle. Drops any search
    /// keystrokes still waiting on the debounce.
    pub fn update_filter(&mut self, update: impl FnOnce(&mut FilterState)) {
        self.search_input.cancel();
        update(&mut self.filter);
        self.render();
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.view_mode != mode {
            self.view_mode = mode;
            self.render();
        }
    }

    /// Click on a tech-tree node. Only parents that head a stack react;
    /// returns whether anything changed.
    pub fn click(&mut self, id: &str) -> bool {
        let expandable = self
            .current_layout()
            .and_then(|layout| layout.node(id))
            .map(|node| node.is_expandable())
            .unwrap_or(false);
        if !expandable {
            return false;
        }
        self.toggle_stack(id);
        true
    }

    /// Flips one parent's expansion and re-renders. Returns the new state.
    pub fn toggle_stack(&mut self, id: &str) -> bool {
        let expanded = self.expansion.toggle(id);
        tracing::debug!(parent = id, expanded, "stack toggled");
        self.render();
        expanded
    }

    pub fn input_search(&mut self, text: &str) {
        self.input_search_at(text, Instant::now());
    }

    /// Search keystroke at a specific time (for testing).
    pub fn input_search_at(&mut self, text: &str, now: Instant) {
        self.search_input.trigger_at(text.to_string(), now);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.resize_at(width, height, Instant::now());
    }

    /// Viewport resize at a specific time (for testing).
    pub fn resize_at(&mut self, width: f32, height: f32, now: Instant) {
        self.resize.trigger_at(Viewport::new(width, height), now);
    }

    pub fn tick(&mut self) -> TickOutcome {
        self.tick_at(Instant::now())
    }

    /// Flushes debounced input whose quiet period has elapsed (for testing).
    pub fn tick_at(&mut self, now: Instant) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if let Some(search) = self.search_input.poll_at(now) {
            self.filter.search = search;
            self.render();
            outcome.search_applied = true;
        }
        if let Some(viewport) = self.resize.poll_at(now) {
            self.viewport = viewport;
            // Geometry moved; the layout itself is unchanged, so only the
            // commit and routing have to run again.
            if self.pending.is_some() || self.committed.is_some() {
                self.route_pending = true;
            }
            outcome.resize_applied = true;
        }
        outcome
    }

    /// SVG for the current view. The tree view draws the last committed
    /// frame, so call `commit_frame` first to pick up pending changes.
    pub fn to_svg(&self) -> String {
        match self.view_mode {
            ViewMode::List => {
                let filtered = self.filter.apply(&self.catalog);
                let render = RenderConfig {
                    width: self.viewport.width,
                    height: self.viewport.height,
                    background: self.config.render.background.clone(),
                };
                render_list_svg(
                    &filtered,
                    &self.catalog,
                    &self.config.theme,
                    &self.config.layout,
                    &render,
                )
            }
            ViewMode::Tree => match &self.committed {
                Some(frame) => render_svg(
                    &frame.layout,
                    &frame.connectors,
                    &self.config.theme,
                    &self.config.layout,
                ),
                None => render_svg(
                    &compute_tech_tree(&[], &self.expansion),
                    &[],
                    &self.config.theme,
                    &self.config.layout,
                ),
            },
        }
    }

    /// Quick-filter from the rank summary: searches for the rank label.
    pub fn select_rank(&mut self, rank: &str) {
        self.search_input.cancel();
        self.filter.search = rank.to_string();
        self.render();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RelationEdge;
    use std::time::Duration;

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::new(vec![
            Vehicle::new("a", "Alpha", "usa", "x", "I", "1.0"),
            Vehicle::new("b", "Bravo", "usa", "x", "I", "1.3").stacked_under("a"),
            Vehicle::new("c", "Charlie", "usa", "x", "II", "2.0"),
            Vehicle::new("d", "Delta", "ussr", "x", "II", "2.3"),
        ])
        .with_relations(vec![
            RelationEdge::new("a", "c"),
            RelationEdge::new("b", "c"),
            RelationEdge::new("c", "d"),
        ])
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.layout.fast_text_metrics = true;
        config.session.default_nation = None;
        config
    }

    #[test]
    fn routing_waits_for_commit() {
        let mut session = TechTreeSession::new(catalog(), config());
        session.render();
        assert!(session.route_pending());
        assert!(session.connectors().is_empty());
        assert!(session.commit_frame());
        assert!(!session.route_pending());
        assert_eq!(session.connectors().len(), 3);
        assert!(!session.commit_frame());
    }

    #[test]
    fn click_toggles_only_stack_parents() {
        let mut session = TechTreeSession::new(catalog(), config());
        session.frame();
        assert!(!session.click("c"));
        assert!(!session.click("nope"));
        assert!(session.click("a"));
        assert!(session.route_pending());
        session.commit_frame();
        let layout = session.layout().unwrap();
        assert_eq!(layout.visible_children(), vec!["b"]);
        // The b -> c edge still starts at the parent.
        assert_eq!(session.connectors()[1].from, "a");
        assert!(session.click("a"));
        session.commit_frame();
        assert!(session.layout().unwrap().visible_children().is_empty());
    }

    #[test]
    fn expansion_survives_filter_changes() {
        let mut session = TechTreeSession::new(catalog(), config());
        session.frame();
        session.toggle_stack("a");
        session.set_filter(FilterState::default().with_nation("usa"));
        session.commit_frame();
        assert!(session.expansion().is_expanded("a"));
        assert_eq!(session.layout().unwrap().visible_children(), vec!["b"]);
        // d is filtered out, so c -> d is dropped.
        assert_eq!(session.connectors().len(), 2);
    }

    #[test]
    fn search_input_is_debounced() {
        let start = Instant::now();
        let mut session = TechTreeSession::new(catalog(), config());
        session.frame();
        session.input_search_at("char", start);
        session.input_search_at("charl", start + Duration::from_millis(100));
        assert!(!session.tick_at(start + Duration::from_millis(200)).any());
        let outcome = session.tick_at(start + Duration::from_millis(280));
        assert!(outcome.search_applied);
        assert_eq!(session.filter().search, "charl");
        session.commit_frame();
        assert_eq!(session.layout().unwrap().top_level_ids(), vec!["c"]);
    }

    #[test]
    fn resize_reroutes_against_new_geometry() {
        let start = Instant::now();
        let mut session = TechTreeSession::new(catalog(), config());
        session.frame();
        let before = session.connectors()[0].end;

        session.resize_at(2400.0, 900.0, start);
        session.resize_at(400.0, 900.0, start + Duration::from_millis(50));
        let outcome = session.tick_at(start + Duration::from_millis(250));
        assert!(outcome.resize_applied);
        assert_eq!(session.viewport(), Viewport::new(400.0, 900.0));
        assert!(session.route_pending());
        session.commit_frame();
        assert_ne!(session.connectors()[0].end, before);
    }

    #[test]
    fn default_nation_is_preselected_when_present() {
        let session = TechTreeSession::new(catalog(), Config::default());
        assert!(session.filter().nations.contains("usa"));
        assert_eq!(session.filtered().len(), 3);

        let mut config = config();
        config.session.default_nation = Some("usa".to_string());
        let session = TechTreeSession::new(catalog(), config.clone());
        assert!(session.filter().nations.contains("usa"));

        config.session.default_nation = Some("japan".to_string());
        let session = TechTreeSession::new(catalog(), config);
        assert!(session.filter().nations.is_empty());
    }

    #[test]
    fn to_svg_follows_view_mode() {
        let mut session = TechTreeSession::new(catalog(), config());
        session.frame();
        let tree = session.to_svg();
        assert!(tree.contains("Rank I"));
        assert_eq!(tree.matches("<path ").count(), 3);

        session.set_view_mode(ViewMode::List);
        let list = session.to_svg();
        assert_eq!(list.matches("class=\"card\"").count(), 4);
        assert!(!list.contains("Rank I"));
    }

    #[test]
    fn rank_quick_filter_sets_search() {
        let mut session = TechTreeSession::new(catalog(), config());
        session.select_rank("II");
        assert_eq!(session.filter().search, "II");
        let ids: Vec<&str> = session.filtered().iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d"]);
    }

    #[test]
    fn to_svg_keeps_last_committed_frame_until_commit() {
        let mut session = TechTreeSession::new(catalog(), config());
        session.frame();
        let committed = session.to_svg();
        assert!(!committed.contains("data-id=\"b\""));
        assert_eq!(committed.matches("<path ").count(), 3);

        assert!(session.click("a"));
        assert!(session.route_pending());
        assert_eq!(session.to_svg(), committed);
        assert!(session.layout().unwrap().visible_children().is_empty());

        session.commit_frame();
        let expanded = session.to_svg();
        assert!(expanded.contains("class=\"node child\" data-id=\"b\""));
        assert_eq!(expanded.matches("<path ").count(), 3);
    }

    #[test]
    fn clicks_before_commit_act_on_the_newest_layout() {
        let mut session = TechTreeSession::new(catalog(), config());
        session.render();
        assert!(session.layout().is_none());
        assert!(session.click("a"));
        session.commit_frame();
        assert_eq!(session.layout().unwrap().visible_children(), vec!["b"]);
    }

    #[test]
    fn chip_toggle_drops_pending_search() {
        let start = Instant::now();
        let mut session = TechTreeSession::new(catalog(), config());
        session.frame();
        session.input_search_at("delta", start);
        session.update_filter(|filter| {
            filter.toggle_nation("usa");
        });
        assert!(!session.tick_at(start + Duration::from_millis(500)).search_applied);
        assert_eq!(session.filter().search, "");
        session.commit_frame();
        assert_eq!(session.layout().unwrap().top_level_ids(), vec!["a", "c"]);
    }
}
