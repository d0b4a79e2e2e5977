use std::collections::HashMap;
use std::f32::consts::TAU;

use rand::Rng;

use crate::config::LayoutConfig;
use crate::ir::{Edge, Node};

use super::NodeLayout;

/// Incident edge count per node id. Multi-edges count once each, self-loops twice.
pub(super) fn node_degrees(edges: &[Edge]) -> HashMap<&str, usize> {
    let mut degrees: HashMap<&str, usize> = HashMap::new();
    for edge in edges {
        *degrees.entry(edge.source.as_str()).or_insert(0) += 1;
        *degrees.entry(edge.target.as_str()).or_insert(0) += 1;
    }
    degrees
}

pub(super) fn radius_for_degree(degree: usize, config: &LayoutConfig) -> f32 {
    let multiplier = (1.0 - degree as f32 * config.degree_pull).max(config.min_radius_ratio);
    config.base_radius * multiplier
}

/// Single-pass radial placement: nodes share the circle evenly in enumeration
/// order and hubs sit closer to the center.
pub fn radial_layout<R: Rng>(
    nodes: &[Node],
    edges: &[Edge],
    config: &LayoutConfig,
    rng: &mut R,
) -> Vec<NodeLayout> {
    if nodes.is_empty() {
        return Vec::new();
    }
    let degrees = node_degrees(edges);
    let count = nodes.len() as f32;
    let jitter = config.jitter.abs();

    nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| {
            let degree = degrees.get(node.id.as_str()).copied().unwrap_or(0);
            let angle = idx as f32 / count * TAU;
            let radius = radius_for_degree(degree, config);
            let (jitter_x, jitter_y) = if jitter > 0.0 {
                (rng.gen_range(-jitter..=jitter), rng.gen_range(-jitter..=jitter))
            } else {
                (0.0, 0.0)
            };
            NodeLayout {
                id: node.id.clone(),
                label: node.label.clone(),
                x: config.center_x + angle.cos() * radius + jitter_x,
                y: config.center_y + angle.sin() * radius + jitter_y,
                width: node.width.unwrap_or(config.node_width),
                height: node.height.unwrap_or(config.node_height),
                degree,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn star(leaves: usize) -> (Vec<Node>, Vec<Edge>) {
        let mut nodes = vec![Node::new("hub")];
        let mut edges = Vec::new();
        for idx in 0..leaves {
            let id = format!("leaf{idx}");
            nodes.push(Node::new(id.as_str()));
            edges.push(Edge::new(format!("e{idx}"), "hub", id));
        }
        (nodes, edges)
    }

    #[test]
    fn empty_input_yields_empty_layout() {
        let mut rng = StdRng::seed_from_u64(1);
        let placed = radial_layout(&[], &[], &LayoutConfig::default(), &mut rng);
        assert!(placed.is_empty());
    }

    #[test]
    fn radius_shrinks_with_degree_and_saturates() {
        let config = LayoutConfig::default();
        assert_eq!(radius_for_degree(0, &config), 250.0);
        assert!((radius_for_degree(5, &config) - 175.0).abs() < 1e-3);
        assert!((radius_for_degree(10, &config) - 100.0).abs() < 1e-3);
        assert!((radius_for_degree(25, &config) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn degrees_count_multi_edges_and_self_loops() {
        let edges = vec![
            Edge::new("1", "a", "b"),
            Edge::new("2", "a", "b"),
            Edge::new("3", "c", "c"),
        ];
        let degrees = node_degrees(&edges);
        assert_eq!(degrees["a"], 2);
        assert_eq!(degrees["b"], 2);
        assert_eq!(degrees["c"], 2);
    }

    #[test]
    fn hub_is_pulled_toward_center() {
        let config = LayoutConfig {
            jitter: 0.0,
            ..LayoutConfig::default()
        };
        let (nodes, edges) = star(8);
        let mut rng = StdRng::seed_from_u64(7);
        let placed = radial_layout(&nodes, &edges, &config, &mut rng);
        let dist = |n: &NodeLayout| {
            ((n.x - config.center_x).powi(2) + (n.y - config.center_y).powi(2)).sqrt()
        };
        let hub = dist(&placed[0]);
        for leaf in &placed[1..] {
            assert!(hub < dist(leaf));
        }
        assert_eq!(placed[0].degree, 8);
    }

    #[test]
    fn missing_sizes_use_defaults() {
        let config = LayoutConfig::default();
        let nodes = vec![Node::new("a"), Node::new("b").with_size(200.0, 40.0)];
        let mut rng = StdRng::seed_from_u64(3);
        let placed = radial_layout(&nodes, &[], &config, &mut rng);
        assert_eq!((placed[0].width, placed[0].height), (120.0, 60.0));
        assert_eq!((placed[1].width, placed[1].height), (200.0, 40.0));
    }

    #[test]
    fn positions_stay_within_radius_plus_jitter() {
        let config = LayoutConfig::default();
        for seed in 0..8u64 {
            let (nodes, edges) = star(12);
            let mut rng = StdRng::seed_from_u64(seed);
            let placed = radial_layout(&nodes, &edges, &config, &mut rng);
            assert_eq!(placed.len(), nodes.len());
            let limit = config.base_radius + config.jitter + 1e-3;
            for node in &placed {
                assert!((node.x - config.center_x).abs() <= limit, "{node:?}");
                assert!((node.y - config.center_y).abs() <= limit, "{node:?}");
            }
        }
    }
}
