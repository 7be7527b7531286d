use std::collections::{BTreeMap, HashMap, HashSet};

use crate::catalog::{CatalogSnapshot, RelationEdge, rating_key};
use crate::config::LayoutConfig;

use super::{AnchorGeometry, Connector, PlacedNode, TechTreeLayout};

/// Maps relation endpoints onto the nodes that represent them in the
/// current view.
pub struct EndpointResolver<'a> {
    parent_of: &'a BTreeMap<String, String>,
    placed: HashSet<&'a str>,
    declared: HashMap<&'a str, &'a str>,
}

impl<'a> EndpointResolver<'a> {
    pub fn new(layout: &'a TechTreeLayout, catalog: &'a CatalogSnapshot) -> Self {
        Self {
            parent_of: &layout.parent_of,
            placed: layout.nodes.iter().map(|node| node.id.as_str()).collect(),
            declared: catalog.declared_parents(),
        }
    }

    /// A stacked child resolves to its parent. A child that the filter
    /// removed follows its declared parents until one is on screen. Anything
    /// else resolves to itself, placed or not.
    pub fn resolve<'b>(&'b self, id: &'b str) -> &'b str {
        let mut current = id;
        let mut visited: HashSet<&str> = HashSet::new();
        loop {
            if let Some(parent) = self.parent_of.get(current) {
                return parent.as_str();
            }
            if self.placed.contains(current) {
                return current;
            }
            match self.declared.get(current) {
                Some(next) if visited.insert(*next) => current = *next,
                _ => return id,
            }
        }
    }
}

/// Edges to draw for this view: curated relations when the catalog has
/// them, otherwise the derived progression chain (if enabled).
pub fn connector_edges(
    layout: &TechTreeLayout,
    catalog: &CatalogSnapshot,
    config: &LayoutConfig,
) -> Vec<RelationEdge> {
    match &catalog.relations {
        Some(relations) => relations.clone(),
        None if config.fallback_connectors => fallback_edges(layout),
        None => Vec::new(),
    }
}

/// Links consecutive top-level vehicles of the same nation and class,
/// ordered by rank then rating.
pub fn fallback_edges(layout: &TechTreeLayout) -> Vec<RelationEdge> {
    let mut groups: BTreeMap<(&str, &str), Vec<&PlacedNode>> = BTreeMap::new();
    for node in layout.nodes.iter().filter(|node| node.is_top_level()) {
        groups
            .entry((node.nation.as_str(), node.class.as_str()))
            .or_default()
            .push(node);
    }

    let mut edges = Vec::new();
    for group in groups.values_mut() {
        group.sort_by(|a, b| {
            a.rank
                .cmp(&b.rank)
                .then_with(|| rating_key(&a.rating).cmp(&rating_key(&b.rating)))
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        edges.extend(
            group
                .windows(2)
                .map(|pair| RelationEdge::new(&pair[0].id, &pair[1].id)),
        );
    }
    edges
}

/// Cubic curve from `start` to `end` with both control points pulled
/// horizontally by `ratio` of the horizontal distance.
pub fn curve_controls(
    start: (f32, f32),
    end: (f32, f32),
    ratio: f32,
) -> ((f32, f32), (f32, f32)) {
    let offset = (end.0 - start.0) * ratio;
    ((start.0 + offset, start.1), (end.0 - offset, end.1))
}

/// One connector per edge whose resolved endpoints both have geometry.
/// Edges with an unresolved endpoint are dropped without error.
pub fn route_connectors<G>(
    layout: &TechTreeLayout,
    catalog: &CatalogSnapshot,
    geometry: &G,
    config: &LayoutConfig,
) -> Vec<Connector>
where
    G: AnchorGeometry + ?Sized,
{
    let edges = connector_edges(layout, catalog, config);
    let resolver = EndpointResolver::new(layout, catalog);
    let mut connectors = Vec::with_capacity(edges.len());
    let mut skipped = 0usize;

    for edge in &edges {
        let from = resolver.resolve(&edge.from);
        let to = resolver.resolve(&edge.to);
        let (Some(start), Some(end)) = (geometry.anchor(from), geometry.anchor(to)) else {
            tracing::trace!(from = %edge.from, to = %edge.to, "connector endpoint not on screen");
            skipped += 1;
            continue;
        };
        let (control1, control2) = curve_controls(start, end, config.connector_control_ratio);
        connectors.push(Connector {
            source_from: edge.from.clone(),
            source_to: edge.to.clone(),
            from: from.to_string(),
            to: to.to_string(),
            start,
            control1,
            control2,
            end,
        });
    }

    tracing::debug!(
        edges = edges.len(),
        drawn = connectors.len(),
        skipped,
        "routed connectors"
    );
    connectors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Vehicle;
    use crate::expansion::ExpansionState;
    use crate::layout::{Rect, compute_tech_tree};

    fn rects(entries: &[(&str, Rect)]) -> HashMap<String, Rect> {
        entries
            .iter()
            .map(|(id, rect)| (id.to_string(), *rect))
            .collect()
    }

    fn layout_for(catalog: &CatalogSnapshot, expansion: &ExpansionState) -> TechTreeLayout {
        let refs: Vec<&Vehicle> = catalog.vehicles.iter().collect();
        compute_tech_tree(&refs, expansion)
    }

    #[test]
    fn single_edge_yields_one_curve_between_centres() {
        let catalog = CatalogSnapshot::new(vec![
            Vehicle::new("a", "A", "usa", "x", "I", "1.0"),
            Vehicle::new("b", "B", "usa", "x", "II", "2.0"),
        ])
        .with_relations(vec![RelationEdge::new("a", "b")]);
        let layout = layout_for(&catalog, &ExpansionState::new());
        let geometry = rects(&[
            ("a", Rect::new(0.0, 0.0, 100.0, 40.0)),
            ("b", Rect::new(200.0, 60.0, 100.0, 40.0)),
        ]);
        let connectors = route_connectors(&layout, &catalog, &geometry, &LayoutConfig::default());
        assert_eq!(connectors.len(), 1);
        let wire = &connectors[0];
        assert_eq!(wire.start, (50.0, 20.0));
        assert_eq!(wire.end, (250.0, 80.0));
        assert_eq!(wire.control1, (130.0, 20.0));
        assert_eq!(wire.control2, (170.0, 80.0));
        assert_eq!(
            wire.path_data(),
            "M 50.00 20.00 C 130.00 20.00, 170.00 80.00, 250.00 80.00"
        );
    }

    #[test]
    fn missing_endpoint_is_skipped_silently() {
        let catalog = CatalogSnapshot::new(vec![Vehicle::new("a", "A", "usa", "x", "I", "1.0")])
            .with_relations(vec![RelationEdge::new("a", "missing")]);
        let layout = layout_for(&catalog, &ExpansionState::new());
        let geometry = rects(&[("a", Rect::new(0.0, 0.0, 100.0, 40.0))]);
        assert!(
            route_connectors(&layout, &catalog, &geometry, &LayoutConfig::default()).is_empty()
        );
    }

    #[test]
    fn stacked_child_endpoints_redirect_to_parent() {
        let catalog = CatalogSnapshot::new(vec![
            Vehicle::new("a", "A", "usa", "x", "I", "1.0"),
            Vehicle::new("b", "B", "usa", "x", "I", "1.3").stacked_under("a"),
            Vehicle::new("c", "C", "usa", "x", "II", "2.0"),
        ])
        .with_relations(vec![RelationEdge::new("b", "c")]);
        // Redirect holds whether or not the stack is open.
        for expansion in [ExpansionState::new(), ["a"].into_iter().collect()] {
            let layout = layout_for(&catalog, &expansion);
            let geometry = rects(&[
                ("a", Rect::new(0.0, 0.0, 100.0, 40.0)),
                ("b", Rect::new(10.0, 50.0, 90.0, 30.0)),
                ("c", Rect::new(200.0, 0.0, 100.0, 40.0)),
            ]);
            let connectors =
                route_connectors(&layout, &catalog, &geometry, &LayoutConfig::default());
            assert_eq!(connectors.len(), 1);
            assert_eq!(connectors[0].from, "a");
            assert_eq!(connectors[0].source_from, "b");
            assert_eq!(connectors[0].start, (50.0, 20.0));
        }
    }

    #[test]
    fn filtered_out_child_follows_declared_parent() {
        let catalog = CatalogSnapshot::new(vec![
            Vehicle::new("a", "A", "usa", "x", "I", "1.0"),
            Vehicle::new("b", "B", "usa", "x", "I", "1.3").stacked_under("a"),
            Vehicle::new("c", "C", "usa", "x", "II", "2.0"),
        ])
        .with_relations(vec![RelationEdge::new("b", "c")]);
        let refs: Vec<&Vehicle> = vec![&catalog.vehicles[0], &catalog.vehicles[2]];
        let layout = compute_tech_tree(&refs, &ExpansionState::new());
        let resolver = EndpointResolver::new(&layout, &catalog);
        assert_eq!(resolver.resolve("b"), "a");
        assert_eq!(resolver.resolve("c"), "c");
        assert_eq!(resolver.resolve("ghost"), "ghost");
    }

    #[test]
    fn uncommitted_layout_routes_nothing() {
        let catalog = CatalogSnapshot::new(vec![
            Vehicle::new("a", "A", "usa", "x", "I", "1.0"),
            Vehicle::new("b", "B", "usa", "x", "II", "2.0"),
        ])
        .with_relations(vec![RelationEdge::new("a", "b")]);
        let layout = layout_for(&catalog, &ExpansionState::new());
        assert!(route_connectors(&layout, &catalog, &layout, &LayoutConfig::default()).is_empty());
    }

    #[test]
    fn fallback_chains_nation_and_class_groups() {
        let catalog = CatalogSnapshot::new(vec![
            Vehicle::new("m4", "M4", "usa", "medium", "III", "4.0"),
            Vehicle::new("m2", "M2", "usa", "medium", "I", "1.0"),
            Vehicle::new("m3", "M3", "usa", "medium", "II", "2.7"),
            Vehicle::new("m3b", "M3 Lee", "usa", "medium", "II", "2.3"),
            Vehicle::new("m24", "M24", "usa", "light", "II", "2.7"),
            Vehicle::new("t34", "T-34", "ussr", "medium", "III", "4.0"),
            Vehicle::new("m4p", "M4 Premium", "usa", "medium", "III", "4.0").stacked_under("m4"),
        ]);
        let layout = layout_for(&catalog, &ExpansionState::new());
        let edges = fallback_edges(&layout);
        assert_eq!(
            edges,
            vec![
                RelationEdge::new("m2", "m3b"),
                RelationEdge::new("m3b", "m3"),
                RelationEdge::new("m3", "m4"),
            ]
        );
    }

    #[test]
    fn explicit_empty_relations_disable_fallback() {
        let catalog = CatalogSnapshot::new(vec![
            Vehicle::new("a", "A", "usa", "x", "I", "1.0"),
            Vehicle::new("b", "B", "usa", "x", "II", "2.0"),
        ]);
        let layout = layout_for(&catalog, &ExpansionState::new());
        let config = LayoutConfig::default();
        assert_eq!(connector_edges(&layout, &catalog, &config).len(), 1);

        let curated = catalog.clone().with_relations(Vec::new());
        assert!(connector_edges(&layout, &curated, &config).is_empty());

        let disabled = LayoutConfig {
            fallback_connectors: false,
            ..LayoutConfig::default()
        };
        assert!(connector_edges(&layout, &catalog, &disabled).is_empty());
    }

    #[test]
    fn control_points_follow_right_to_left_edges() {
        let (c1, c2) = curve_controls((300.0, 10.0), (100.0, 90.0), 0.4);
        assert_eq!(c1, (220.0, 10.0));
        assert_eq!(c2, (180.0, 90.0));
        let (c1, c2) = curve_controls((50.0, 10.0), (50.0, 90.0), 0.4);
        assert_eq!(c1, (50.0, 10.0));
        assert_eq!(c2, (50.0, 90.0));
    }
}
