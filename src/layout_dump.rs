use crate::adapter::Viewport;
use crate::layout::{EdgeKind, Handle, TreeLayout};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub viewport: Viewport,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rank: usize,
    pub order: usize,
    pub pinned: bool,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    pub kind: EdgeKind,
    pub from: String,
    pub to: String,
    pub source_handle: Handle,
    pub target_handle: Handle,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &TreeLayout, viewport: Viewport) -> Self {
        let nodes = layout
            .nodes
            .values()
            .map(|node| NodeDump {
                id: node.id.clone(),
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
                rank: node.rank,
                order: node.order,
                pinned: node.pinned,
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                kind: edge.kind,
                from: edge.from.clone(),
                to: edge.to.clone(),
                source_handle: edge.source_handle,
                target_handle: edge.target_handle,
                points: edge.points.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            viewport,
            nodes,
            edges,
        }
    }
}

/// Pretty JSON to `output`, or stdout when no path is given.
pub fn write_layout_dump(
    output: Option<&Path>,
    layout: &TreeLayout,
    viewport: Viewport,
) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout, viewport);
    match output {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &dump)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::compute_layout;
    use crate::model::{FamilyGraph, ParentOf, Person};

    #[test]
    fn dump_serializes_ranks_and_handles() {
        let graph = FamilyGraph {
            nodes: vec![Person::new("p"), Person::new("c")],
            parent_of: vec![ParentOf::new("p", "c")],
            unions: Vec::new(),
        };
        let layout = compute_layout(&graph, &LayoutConfig::default());
        let dump = LayoutDump::from_layout(&layout, Viewport::default());
        let value = serde_json::to_value(&dump).unwrap();
        assert_eq!(value["nodes"][1]["id"], "p");
        assert_eq!(value["nodes"][0]["rank"], 1);
        assert_eq!(value["edges"][0]["kind"], "parent");
        assert_eq!(value["edges"][0]["source_handle"], "bottom");
        assert_eq!(value["viewport"]["zoom"], 1.0);
    }
}
