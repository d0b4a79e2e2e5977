//! Synthetic graphs for exercising the edge router at scale.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::config::RoutingConfig;
use crate::ir::{ConnectionKind, Edge};
use crate::layout::{NodeLayout, OptimizedEdge, optimize_all_edges};

const GRID_STEP_X: f32 = 150.0;
const GRID_STEP_Y: f32 = 100.0;
const GRID_SCATTER: f32 = 50.0;
const NODE_WIDTH: f32 = 120.0;
const NODE_HEIGHT: f32 = 60.0;

#[derive(Debug, Clone)]
pub struct SyntheticGraph {
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<Edge>,
}

/// Nodes on a loosely scattered square grid, random edges without self-loops.
pub fn generate_test_graph<R: Rng>(
    node_count: usize,
    edge_count: usize,
    rng: &mut R,
) -> SyntheticGraph {
    let columns = (node_count as f64).sqrt().ceil().max(1.0) as usize;
    let nodes: Vec<NodeLayout> = (0..node_count)
        .map(|idx| {
            let row = idx / columns;
            let col = idx % columns;
            let mut node = NodeLayout::new(
                format!("node-{idx}"),
                col as f32 * GRID_STEP_X + rng.gen_range(0.0..GRID_SCATTER),
                row as f32 * GRID_STEP_Y + rng.gen_range(0.0..GRID_SCATTER),
                NODE_WIDTH,
                NODE_HEIGHT,
            );
            node.label = format!("Track {idx} — Artist {idx}");
            node
        })
        .collect();

    let mut edges = Vec::new();
    if node_count >= 2 {
        for idx in 0..edge_count {
            let source = rng.gen_range(0..node_count);
            let mut target = rng.gen_range(0..node_count);
            while target == source {
                target = rng.gen_range(0..node_count);
            }
            let kind = if rng.gen_bool(0.5) {
                ConnectionKind::Transition
            } else {
                ConnectionKind::Mashup
            };
            edges.push(Edge::new(format!("edge-{idx}"), format!("node-{source}"), format!("node-{target}")).with_kind(kind));
        }
    }

    SyntheticGraph { nodes, edges }
}

#[derive(Debug, Clone)]
pub struct RoutingBenchmark {
    pub node_count: usize,
    pub edge_count: usize,
    pub duration: Duration,
    pub edges_per_second: f64,
    /// Average top-left to top-left distance versus average routed path
    /// length, as a percentage of the former.
    pub improvement_percent: f64,
    pub optimized: Vec<OptimizedEdge>,
}

pub fn benchmark_routing<R: Rng>(
    node_count: usize,
    edge_count: usize,
    rng: &mut R,
    config: &RoutingConfig,
) -> RoutingBenchmark {
    let graph = generate_test_graph(node_count, edge_count, rng);

    let start = Instant::now();
    let optimized = optimize_all_edges(&graph.nodes, &graph.edges, config);
    let duration = start.elapsed();

    let secs = duration.as_secs_f64();
    let edges_per_second = if secs > 0.0 {
        graph.edges.len() as f64 / secs
    } else {
        f64::INFINITY
    };

    let by_id: HashMap<&str, &NodeLayout> =
        graph.nodes.iter().map(|node| (node.id.as_str(), node)).collect();
    let naive: Vec<f64> = graph
        .edges
        .iter()
        .filter_map(|edge| {
            let source = by_id.get(edge.source.as_str())?;
            let target = by_id.get(edge.target.as_str())?;
            let dx = (target.x - source.x) as f64;
            let dy = (target.y - source.y) as f64;
            Some((dx * dx + dy * dy).sqrt())
        })
        .collect();
    let routed: Vec<f64> = optimized.iter().map(|edge| edge.path_length as f64).collect();
    let improvement_percent = match (average(&naive), average(&routed)) {
        (Some(before), Some(after)) if before > 0.0 => (before - after) / before * 100.0,
        _ => 0.0,
    };

    tracing::info!(
        nodes = node_count,
        edges = edge_count,
        routed = optimized.len(),
        millis = duration.as_secs_f64() * 1000.0,
        improvement_percent,
        "routing benchmark finished"
    );

    RoutingBenchmark {
        node_count,
        edge_count,
        duration,
        edges_per_second,
        improvement_percent,
        optimized,
    }
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
