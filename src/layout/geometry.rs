use std::collections::{BTreeMap, HashMap};

use crate::config::LayoutConfig;

use super::{NodeRole, Rect, TechTreeLayout};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Source of on-screen node rectangles for connector routing.
///
/// Positions come from whatever committed the layout (the column grid
/// below, or a host page measuring its own elements), so routing never
/// computes node positions itself.
pub trait AnchorGeometry {
    fn bounding_rect(&self, id: &str) -> Option<Rect>;

    fn anchor(&self, id: &str) -> Option<(f32, f32)> {
        self.bounding_rect(id).map(|rect| rect.center())
    }
}

impl AnchorGeometry for TechTreeLayout {
    fn bounding_rect(&self, id: &str) -> Option<Rect> {
        if !self.committed {
            return None;
        }
        self.node(id).and_then(|node| node.rect)
    }
}

impl AnchorGeometry for HashMap<String, Rect> {
    fn bounding_rect(&self, id: &str) -> Option<Rect> {
        self.get(id).copied()
    }
}

impl AnchorGeometry for BTreeMap<String, Rect> {
    fn bounding_rect(&self, id: &str) -> Option<Rect> {
        self.get(id).copied()
    }
}

/// Column width that shares the viewport between all columns, clamped to
/// the configured bounds.
pub fn column_width(columns: usize, viewport: Viewport, config: &LayoutConfig) -> f32 {
    let count = columns.max(1) as f32;
    let available =
        viewport.width - config.padding * 2.0 - config.column_gap * (count - 1.0);
    (available / count)
        .min(config.max_column_width)
        .max(config.min_column_width)
}

/// Places every node of `layout` on the column grid and marks the layout
/// committed. Re-committing with another viewport replaces all rectangles.
pub fn commit_layout(layout: &mut TechTreeLayout, viewport: Viewport, config: &LayoutConfig) {
    let width = column_width(layout.columns.len(), viewport, config);
    let top = config.padding + config.header_height;
    let mut content_bottom = top;

    for (col_idx, column) in layout.columns.iter().enumerate() {
        let x = config.padding + col_idx as f32 * (width + config.column_gap);
        let mut y = top;
        for &node_idx in &column.nodes {
            let node = &mut layout.nodes[node_idx];
            let rect = match node.role {
                NodeRole::TopLevel { .. } => {
                    y += config.node_gap;
                    Rect::new(x, y, width, config.node_height)
                }
                NodeRole::Child { .. } => {
                    y += config.child_gap;
                    Rect::new(
                        x + config.child_indent,
                        y,
                        (width - config.child_indent).max(1.0),
                        config.child_node_height,
                    )
                }
            };
            y = rect.bottom();
            node.rect = Some(rect);
        }
        content_bottom = content_bottom.max(y);
    }

    let column_height = content_bottom + config.node_gap - config.padding;
    for (col_idx, column) in layout.columns.iter_mut().enumerate() {
        let x = config.padding + col_idx as f32 * (width + config.column_gap);
        column.rect = Some(Rect::new(x, config.padding, width, column_height));
    }

    let count = layout.columns.len() as f32;
    let grid_width =
        config.padding * 2.0 + count * width + config.column_gap * (count - 1.0).max(0.0);
    layout.width = grid_width.max(viewport.width);
    layout.height = (content_bottom + config.node_gap + config.padding).max(viewport.height);
    layout.committed = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Vehicle;
    use crate::expansion::ExpansionState;
    use crate::layout::compute_tech_tree;

    fn sample() -> Vec<Vehicle> {
        vec![
            Vehicle::new("a", "A", "usa", "x", "I", "1.0"),
            Vehicle::new("b", "B", "usa", "x", "I", "1.3").stacked_under("a"),
            Vehicle::new("c", "C", "usa", "x", "II", "2.0"),
        ]
    }

    #[test]
    fn uncommitted_layout_has_no_geometry() {
        let vehicles = sample();
        let refs: Vec<&Vehicle> = vehicles.iter().collect();
        let layout = compute_tech_tree(&refs, &ExpansionState::new());
        assert_eq!(layout.bounding_rect("a"), None);
    }

    #[test]
    fn columns_follow_rank_order_left_to_right() {
        let vehicles = sample();
        let refs: Vec<&Vehicle> = vehicles.iter().collect();
        let mut layout = compute_tech_tree(&refs, &ExpansionState::new());
        let config = LayoutConfig::default();
        commit_layout(&mut layout, Viewport::new(1200.0, 800.0), &config);
        let a = layout.bounding_rect("a").unwrap();
        let c = layout.bounding_rect("c").unwrap();
        assert!(c.x > a.right());
        assert_eq!(a.y, c.y);
        assert!(layout.width >= 1200.0);
    }

    #[test]
    fn expanded_children_sit_below_and_indented() {
        let vehicles = sample();
        let refs: Vec<&Vehicle> = vehicles.iter().collect();
        let expansion: ExpansionState = ["a"].into_iter().collect();
        let mut layout = compute_tech_tree(&refs, &expansion);
        let config = LayoutConfig::default();
        commit_layout(&mut layout, Viewport::new(1200.0, 800.0), &config);
        let a = layout.bounding_rect("a").unwrap();
        let b = layout.bounding_rect("b").unwrap();
        assert!(b.y >= a.bottom());
        assert_eq!(b.x, a.x + config.child_indent);
        assert!(b.height < a.height);
    }

    #[test]
    fn column_width_tracks_viewport_within_bounds() {
        let config = LayoutConfig::default();
        let narrow = column_width(4, Viewport::new(400.0, 600.0), &config);
        let wide = column_width(4, Viewport::new(4000.0, 600.0), &config);
        let mid = column_width(4, Viewport::new(1100.0, 600.0), &config);
        assert_eq!(narrow, config.min_column_width);
        assert_eq!(wide, config.max_column_width);
        assert!(mid > config.min_column_width && mid < config.max_column_width);
    }
}
