use std::collections::HashMap;

use crate::catalog::Vehicle;

#[derive(Debug, Default)]
pub struct StackIndex<'a> {
    /// Vehicles drawn as their own node, in input order.
    pub top_level: Vec<&'a Vehicle>,
    /// Parent id -> stacked children, in input order.
    pub children: HashMap<&'a str, Vec<&'a Vehicle>>,
    pub parent_of: HashMap<&'a str, &'a str>,
}

impl<'a> StackIndex<'a> {
    pub fn is_top_level(&self, id: &str) -> bool {
        !self.parent_of.contains_key(id)
    }

    pub fn children_of(&self, id: &str) -> &[&'a Vehicle] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}

pub fn resolve_stacks<'a>(vehicles: &[&'a Vehicle]) -> StackIndex<'a> {
    let by_id: HashMap<&str, &'a Vehicle> = vehicles
        .iter()
        .map(|vehicle| (vehicle.id.as_str(), *vehicle))
        .collect();

    let mut index = StackIndex::default();
    for &vehicle in vehicles {
        match stack_root(vehicle, &by_id) {
            Some(root) => {
                index.children.entry(root).or_default().push(vehicle);
                index.parent_of.insert(vehicle.id.as_str(), root);
            }
            None => index.top_level.push(vehicle),
        }
    }
    index
}

/// Topmost ancestor of `vehicle` reachable through parents that are in the
/// view. The walk stops at the first parent missing from the view. A chain
/// that loops back to `vehicle` leaves it top-level; a loop further up ends
/// at the vehicle where the chain enters it.
fn stack_root<'a>(vehicle: &'a Vehicle, by_id: &HashMap<&str, &'a Vehicle>) -> Option<&'a str> {
    let mut chain: Vec<&'a Vehicle> = Vec::new();
    let mut current = vehicle;
    while let Some(parent_id) = current.stack_of.as_deref() {
        let Some(parent) = by_id.get(parent_id).copied() else {
            break;
        };
        if parent.id == vehicle.id {
            tracing::debug!(vehicle = %vehicle.id, "stacking cycle, keeping vehicle top-level");
            return None;
        }
        if let Some(entry) = chain.iter().position(|seen| seen.id == parent.id) {
            chain.truncate(entry + 1);
            break;
        }
        chain.push(parent);
        current = parent;
    }
    let root = chain.last().map(|parent| parent.id.as_str());
    if chain.len() > 1 {
        tracing::debug!(
            vehicle = %vehicle.id,
            root = root.unwrap_or_default(),
            "flattened multi-level stack"
        );
    }
    root
}
