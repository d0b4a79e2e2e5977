use crate::layout::{AttachmentPoint, EdgeCurve, Layout, edge_curve};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub min_x: f32,
    pub min_y: f32,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub degree: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDump {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: String,
    pub recent: bool,
    pub source_attachment: AttachmentPoint,
    pub target_attachment: AttachmentPoint,
    pub path_length: f32,
    pub curve: EdgeCurve,
    pub path: String,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, curvature: f32) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                label: node.label.clone(),
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
                degree: node.degree,
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| {
                let curve = edge_curve(&edge.source_attachment, &edge.target_attachment, curvature);
                EdgeDump {
                    id: edge.id.clone(),
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                    kind: format!("{:?}", edge.kind).to_lowercase(),
                    recent: edge.recent,
                    source_attachment: edge.source_attachment,
                    target_attachment: edge.target_attachment,
                    path_length: edge.path_length,
                    curve,
                    path: curve.to_svg_path(),
                }
            })
            .collect();

        LayoutDump {
            min_x: layout.min_x,
            min_y: layout.min_y,
            width: layout.width,
            height: layout.height,
            nodes,
            edges,
        }
    }
}

pub fn layout_dump_json(layout: &Layout, curvature: f32) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&LayoutDump::from_layout(layout, curvature))?)
}

pub fn write_layout_dump(path: &Path, layout: &Layout, curvature: f32) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, curvature);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoutingConfig;
    use crate::ir::Edge;
    use crate::layout::{NodeLayout, optimize_all_edges};

    #[test]
    fn dump_carries_sides_and_paths() {
        let nodes = vec![
            NodeLayout::new("a", 0.0, 0.0, 120.0, 60.0),
            NodeLayout::new("b", 300.0, 0.0, 120.0, 60.0),
        ];
        let edges =
            optimize_all_edges(&nodes, &[Edge::new("e1", "a", "b")], &RoutingConfig::default());
        let layout = Layout {
            nodes,
            edges,
            min_x: 0.0,
            min_y: 0.0,
            width: 420.0,
            height: 60.0,
        };
        let raw = layout_dump_json(&layout, 0.3).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let edge = &json["edges"][0];
        assert_eq!(edge["sourceAttachment"]["side"], "right");
        assert_eq!(edge["targetAttachment"]["side"], "left");
        assert_eq!(edge["kind"], "mashup");
        assert!(edge["path"].as_str().unwrap().starts_with("M 120.00,30.00 C"));
        assert_eq!(json["nodes"].as_array().unwrap().len(), 2);
    }
}
