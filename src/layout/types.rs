use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeRole {
    TopLevel { stack_size: usize, expanded: bool },
    Child { parent: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedNode {
    pub id: String,
    pub name: String,
    pub nation: String,
    pub class: String,
    pub rank: u8,
    pub rating: String,
    pub role: NodeRole,
    pub column: usize,
    pub slot: usize,
    /// "+N" when the node heads a stack.
    pub badge: Option<String>,
    /// Filled in when the layout is committed to the grid.
    pub rect: Option<Rect>,
}

impl PlacedNode {
    pub fn is_top_level(&self) -> bool {
        matches!(self.role, NodeRole::TopLevel { .. })
    }

    pub fn parent(&self) -> Option<&str> {
        match &self.role {
            NodeRole::Child { parent } => Some(parent.as_str()),
            NodeRole::TopLevel { .. } => None,
        }
    }

    pub fn is_expandable(&self) -> bool {
        matches!(self.role, NodeRole::TopLevel { stack_size, .. } if stack_size > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankColumn {
    pub rank: u8,
    pub label: String,
    /// Indices into `TechTreeLayout::nodes`, in visual order.
    pub nodes: Vec<usize>,
    pub rect: Option<Rect>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connector {
    /// Edge endpoints as declared in the relation data.
    pub source_from: String,
    pub source_to: String,
    /// Endpoints after redirecting stacked children to their parents.
    pub from: String,
    pub to: String,
    pub start: (f32, f32),
    pub control1: (f32, f32),
    pub control2: (f32, f32),
    pub end: (f32, f32),
}

impl Connector {
    pub fn path_data(&self) -> String {
        format!(
            "M {:.2} {:.2} C {:.2} {:.2}, {:.2} {:.2}, {:.2} {:.2}",
            self.start.0,
            self.start.1,
            self.control1.0,
            self.control1.1,
            self.control2.0,
            self.control2.1,
            self.end.0,
            self.end.1
        )
    }
}

/// Result of one layout pass. Rebuilt from scratch on every render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechTreeLayout {
    pub columns: Vec<RankColumn>,
    pub nodes: Vec<PlacedNode>,
    /// Parent of every stacked child in the current view.
    pub parent_of: BTreeMap<String, String>,
    pub width: f32,
    pub height: f32,
    pub committed: bool,
}

impl TechTreeLayout {
    pub fn node(&self, id: &str) -> Option<&PlacedNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn top_level_ids(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|node| node.is_top_level())
            .map(|node| node.id.as_str())
            .collect()
    }

    pub fn visible_children(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|node| !node.is_top_level())
            .map(|node| node.id.as_str())
            .collect()
    }

    /// Whether `id` belongs to the filtered view, shown or stacked away.
    pub fn contains_vehicle(&self, id: &str) -> bool {
        self.parent_of.contains_key(id) || self.node(id).is_some()
    }
}
