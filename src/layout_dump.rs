use crate::layout::{Connector, NodeRole, Rect, TechTreeLayout};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub committed: bool,
    pub columns: Vec<ColumnDump>,
    pub nodes: Vec<NodeDump>,
    pub connectors: Vec<ConnectorDump>,
}

#[derive(Debug, Serialize)]
pub struct ColumnDump {
    pub rank: String,
    pub nodes: Vec<String>,
    pub rect: Option<Rect>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub name: String,
    pub column: usize,
    pub slot: usize,
    pub role: NodeRole,
    pub badge: Option<String>,
    pub rect: Option<Rect>,
}

#[derive(Debug, Serialize)]
pub struct ConnectorDump {
    pub declared: [String; 2],
    pub from: String,
    pub to: String,
    pub points: [[f32; 2]; 4],
    pub path: String,
}

impl LayoutDump {
    pub fn from_layout(layout: &TechTreeLayout, connectors: &[Connector]) -> Self {
        let columns = layout
            .columns
            .iter()
            .map(|column| ColumnDump {
                rank: column.label.clone(),
                nodes: column
                    .nodes
                    .iter()
                    .filter_map(|idx| layout.nodes.get(*idx))
                    .map(|node| node.id.clone())
                    .collect(),
                rect: column.rect,
            })
            .collect();

        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                name: node.name.clone(),
                column: node.column,
                slot: node.slot,
                role: node.role.clone(),
                badge: node.badge.clone(),
                rect: node.rect,
            })
            .collect();

        let connectors = connectors
            .iter()
            .map(|wire| ConnectorDump {
                declared: [wire.source_from.clone(), wire.source_to.clone()],
                from: wire.from.clone(),
                to: wire.to.clone(),
                points: [wire.start, wire.control1, wire.control2, wire.end].map(|(x, y)| [x, y]),
                path: wire.path_data(),
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            committed: layout.committed,
            columns,
            nodes,
            connectors,
        }
    }
}

pub fn write_layout_dump(
    path: &Path,
    layout: &TechTreeLayout,
    connectors: &[Connector],
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, connectors);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogSnapshot, RelationEdge, Vehicle};
    use crate::config::LayoutConfig;
    use crate::expansion::ExpansionState;
    use crate::layout::{Viewport, compute_frame};

    #[test]
    fn dump_lists_columns_nodes_and_wires() {
        let catalog = CatalogSnapshot::new(vec![
            Vehicle::new("a", "A", "usa", "x", "I", "1.0"),
            Vehicle::new("b", "B", "usa", "x", "I", "1.3").stacked_under("a"),
            Vehicle::new("c", "C", "usa", "x", "II", "2.0"),
        ])
        .with_relations(vec![RelationEdge::new("b", "c")]);
        let refs: Vec<&Vehicle> = catalog.vehicles.iter().collect();
        let frame = compute_frame(
            &catalog,
            &refs,
            &ExpansionState::new(),
            Viewport::new(800.0, 600.0),
            &LayoutConfig::default(),
        );
        let dump = LayoutDump::from_layout(&frame.layout, &frame.connectors);
        assert!(dump.committed);
        assert_eq!(dump.columns.len(), 2);
        assert_eq!(dump.columns[0].nodes, vec!["a"]);
        assert_eq!(dump.connectors.len(), 1);
        assert_eq!(dump.connectors[0].declared, ["b".to_string(), "c".to_string()]);
        assert_eq!(dump.connectors[0].from, "a");

        let json = serde_json::to_value(&dump).unwrap();
        assert_eq!(json["nodes"][0]["role"]["kind"], "top_level");
        assert_eq!(json["nodes"][0]["badge"], "+1");
        assert!(json["connectors"][0]["path"].as_str().unwrap().starts_with("M "));
    }
}
