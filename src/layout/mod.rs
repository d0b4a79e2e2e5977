mod cache;
mod radial;
mod routing;
pub(crate) mod types;
pub use cache::{RoutingCache, cache_key};
pub use radial::radial_layout;
pub use routing::{
    AttachmentChoice, conflict_penalty, edge_curve, find_optimal_attachment_points,
    generate_attachment_points, optimize_all_edges, segments_intersect,
};
pub use types::*;

use rand::Rng;

use crate::config::{LayoutConfig, RoutingConfig};
use crate::ir::Graph;

/// Places every node radially, then routes every edge in one greedy pass.
pub fn compute_layout(
    graph: &Graph,
    layout_config: &LayoutConfig,
    routing_config: &RoutingConfig,
) -> Layout {
    compute_layout_with_rng(graph, layout_config, routing_config, &mut rand::thread_rng())
}

pub fn compute_layout_with_rng<R: Rng>(
    graph: &Graph,
    layout_config: &LayoutConfig,
    routing_config: &RoutingConfig,
    rng: &mut R,
) -> Layout {
    let nodes = radial_layout(&graph.nodes, &graph.edges, layout_config, rng);
    let edges = optimize_all_edges(&nodes, &graph.edges, routing_config);
    finish_layout(nodes, edges)
}

/// Same as [`compute_layout_with_rng`], but edge routing goes through the
/// caller's cache so unchanged geometry is not routed twice.
pub fn compute_layout_cached<R: Rng>(
    graph: &Graph,
    layout_config: &LayoutConfig,
    cache: &mut RoutingCache,
    rng: &mut R,
) -> Layout {
    let nodes = radial_layout(&graph.nodes, &graph.edges, layout_config, rng);
    cache.update_node_positions(&nodes);
    let edges = cache.optimize_edges(&nodes, &graph.edges).to_vec();
    finish_layout(nodes, edges)
}

fn finish_layout(nodes: Vec<NodeLayout>, edges: Vec<OptimizedEdge>) -> Layout {
    let (min_x, min_y, max_x, max_y) = bounds_from_nodes(&nodes);
    Layout {
        nodes,
        edges,
        min_x,
        min_y,
        width: (max_x - min_x).max(0.0),
        height: (max_y - min_y).max(0.0),
    }
}

fn bounds_from_nodes(nodes: &[NodeLayout]) -> (f32, f32, f32, f32) {
    if nodes.is_empty() {
        return (0.0, 0.0, 0.0, 0.0);
    }
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for node in nodes {
        min_x = min_x.min(node.x);
        min_y = min_y.min(node.y);
        max_x = max_x.max(node.x + node.width);
        max_y = max_y.max(node.y + node.height);
    }
    (min_x, min_y, max_x, max_y)
}
