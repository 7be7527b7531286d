mod geometry;
mod ranking;
mod routing;
mod stacking;
pub(crate) mod text;
pub(crate) mod types;
pub use geometry::*;
pub use ranking::{RankBuckets, partition_by_rank};
pub use routing::*;
pub use stacking::{StackIndex, resolve_stacks};
pub use types::*;

use std::collections::BTreeMap;

use crate::catalog::{CatalogSnapshot, Vehicle, rank_label};
use crate::config::LayoutConfig;
use crate::expansion::ExpansionState;

/// Lays the filtered vehicles out in rank columns.
///
/// One node per top-level vehicle, in partitioner order. Parents that are
/// expanded in `expansion` are followed by their stacked children in the
/// same column. The result carries no geometry until it is committed with
/// [`commit_layout`].
pub fn compute_tech_tree(vehicles: &[&Vehicle], expansion: &ExpansionState) -> TechTreeLayout {
    let buckets = partition_by_rank(vehicles);
    let stacks = resolve_stacks(vehicles);

    let mut columns = Vec::with_capacity(buckets.len());
    let mut nodes = Vec::new();

    for (column_idx, (rank, bucket)) in buckets.iter().enumerate() {
        let mut column = RankColumn {
            rank: *rank,
            label: rank_label(*rank).to_string(),
            nodes: Vec::new(),
            rect: None,
        };
        let mut slot = 0usize;
        for vehicle in bucket.iter().filter(|v| stacks.is_top_level(&v.id)) {
            let children = stacks.children_of(&vehicle.id);
            let expanded = !children.is_empty() && expansion.is_expanded(&vehicle.id);
            column.nodes.push(nodes.len());
            nodes.push(placed_node(
                vehicle,
                NodeRole::TopLevel {
                    stack_size: children.len(),
                    expanded,
                },
                column_idx,
                slot,
            ));
            slot += 1;

            if expanded {
                for child in children {
                    column.nodes.push(nodes.len());
                    nodes.push(placed_node(
                        child,
                        NodeRole::Child {
                            parent: vehicle.id.clone(),
                        },
                        column_idx,
                        slot,
                    ));
                    slot += 1;
                }
            }
        }
        columns.push(column);
    }

    let parent_of: BTreeMap<String, String> = stacks
        .parent_of
        .iter()
        .map(|(child, parent)| (child.to_string(), parent.to_string()))
        .collect();

    TechTreeLayout {
        columns,
        nodes,
        parent_of,
        width: 0.0,
        height: 0.0,
        committed: false,
    }
}

fn placed_node(vehicle: &Vehicle, role: NodeRole, column: usize, slot: usize) -> PlacedNode {
    let badge = match role {
        NodeRole::TopLevel { stack_size, .. } if stack_size > 0 => Some(format!("+{stack_size}")),
        _ => None,
    };
    PlacedNode {
        id: vehicle.id.clone(),
        name: vehicle.name.clone(),
        nation: vehicle.nation.clone(),
        class: vehicle.class.clone(),
        rank: vehicle.rank_ordinal(),
        rating: vehicle.rating.clone(),
        role,
        column,
        slot,
        badge,
        rect: None,
    }
}

/// A committed layout together with the connectors routed over it.
#[derive(Debug, Clone, PartialEq)]
pub struct TechTreeFrame {
    pub layout: TechTreeLayout,
    pub connectors: Vec<Connector>,
}

/// Runs the whole pass: layout, commit to the grid, route connectors.
pub fn compute_frame(
    catalog: &CatalogSnapshot,
    vehicles: &[&Vehicle],
    expansion: &ExpansionState,
    viewport: Viewport,
    config: &LayoutConfig,
) -> TechTreeFrame {
    let mut layout = compute_tech_tree(vehicles, expansion);
    commit_layout(&mut layout, viewport, config);
    let connectors = route_connectors(&layout, catalog, &layout, config);
    TechTreeFrame { layout, connectors }
}
