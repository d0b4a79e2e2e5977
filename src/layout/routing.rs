use std::collections::{HashMap, HashSet};
use std::f32::consts::{PI, TAU};

use crate::config::RoutingConfig;
use crate::ir::Edge;

use super::{AttachmentPoint, EdgeCurve, NodeBounds, NodeLayout, OptimizedEdge, Side};

// ── Candidate selection ─────────────────────────────────────────────
/// Cost band above the minimum treated as an exact tie. Ties prefer the pair
/// best aligned with the center-to-center axis, then the pair enumerated first.
const COST_TIE_EPSILON: f32 = 1e-4;

pub(super) type Segment = ((f32, f32), (f32, f32));

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttachmentChoice {
    pub source: AttachmentPoint,
    pub target: AttachmentPoint,
    pub path_length: f32,
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt()
}

fn angle(from: (f32, f32), to: (f32, f32)) -> f32 {
    (to.1 - from.1).atan2(to.0 - from.0)
}

fn angular_gap(a: f32, b: f32) -> f32 {
    let diff = (a - b).rem_euclid(TAU);
    if diff > PI { TAU - diff } else { diff }
}

/// Candidate points on the rectangle perimeter, `resolution + 1` per side,
/// walked clockwise: top left→right, right top→bottom, bottom right→left,
/// left bottom→top. Corners appear once per side that owns them.
pub fn generate_attachment_points(bounds: &NodeBounds, resolution: usize) -> Vec<AttachmentPoint> {
    let steps = resolution.max(1);
    let center = (bounds.center_x, bounds.center_y);
    let mut points = Vec::with_capacity(4 * (steps + 1));
    let mut push = |x: f32, y: f32, side: Side| {
        points.push(AttachmentPoint {
            x,
            y,
            side,
            angle: angle(center, (x, y)),
        });
    };
    let frac = |i: usize| i as f32 / steps as f32;

    for i in 0..=steps {
        push(bounds.x + bounds.width * frac(i), bounds.y, Side::Top);
    }
    for i in 0..=steps {
        push(bounds.right(), bounds.y + bounds.height * frac(i), Side::Right);
    }
    for i in (0..=steps).rev() {
        push(bounds.x + bounds.width * frac(i), bounds.bottom(), Side::Bottom);
    }
    for i in (0..=steps).rev() {
        push(bounds.x, bounds.y + bounds.height * frac(i), Side::Left);
    }
    points
}

/// Parametric segment intersection. Both parameters must land in `[0, 1]`;
/// near-parallel pairs never intersect.
pub fn segments_intersect(
    a: (f32, f32),
    b: (f32, f32),
    c: (f32, f32),
    d: (f32, f32),
    parallel_epsilon: f32,
) -> bool {
    let (x1, y1) = (a.0 as f64, a.1 as f64);
    let (x2, y2) = (b.0 as f64, b.1 as f64);
    let (x3, y3) = (c.0 as f64, c.1 as f64);
    let (x4, y4) = (d.0 as f64, d.1 as f64);
    let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if denom.abs() < parallel_epsilon as f64 {
        return false;
    }
    let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denom;
    let u = -((x1 - x2) * (y1 - y3) - (y1 - y2) * (x1 - x3)) / denom;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

/// Prior-edge state relevant to one source/target pair, gathered once per
/// edge instead of once per candidate pair.
pub(super) struct ConflictContext {
    source_used: Vec<(f32, f32)>,
    target_used: Vec<(f32, f32)>,
    segments: Vec<Segment>,
}

impl ConflictContext {
    /// Source candidates are compared with earlier edges leaving the same
    /// source node, target candidates with earlier edges entering the same
    /// target node.
    pub(super) fn new(source_id: &str, target_id: &str, prior: &[OptimizedEdge]) -> Self {
        Self {
            source_used: prior
                .iter()
                .filter(|edge| edge.source == source_id)
                .map(|edge| edge.source_attachment.pos())
                .collect(),
            target_used: prior
                .iter()
                .filter(|edge| edge.target == target_id)
                .map(|edge| edge.target_attachment.pos())
                .collect(),
            segments: prior
                .iter()
                .map(|edge| (edge.source_attachment.pos(), edge.target_attachment.pos()))
                .collect(),
        }
    }

    pub(super) fn penalty(
        &self,
        source: (f32, f32),
        target: (f32, f32),
        config: &RoutingConfig,
    ) -> f32 {
        let radius = config.attachment_radius;
        let cluster = |point: (f32, f32), used: &[(f32, f32)]| -> f32 {
            used.iter()
                .map(|other| distance(point, *other))
                .filter(|dist| *dist < radius)
                .map(|dist| (radius - dist) * config.cluster_weight)
                .sum()
        };
        let mut penalty = cluster(source, &self.source_used) + cluster(target, &self.target_used);
        for (start, end) in &self.segments {
            if segments_intersect(source, target, *start, *end, config.parallel_epsilon) {
                penalty += config.crossing_penalty;
            }
        }
        penalty
    }
}

/// Penalty for routing `source_id → target_id` between the given points,
/// against edges already placed earlier in the same pass.
pub fn conflict_penalty(
    source_id: &str,
    target_id: &str,
    source: &AttachmentPoint,
    target: &AttachmentPoint,
    prior: &[OptimizedEdge],
    config: &RoutingConfig,
) -> f32 {
    ConflictContext::new(source_id, target_id, prior).penalty(source.pos(), target.pos(), config)
}

/// Brute-force search over every source × target candidate pair.
pub fn find_optimal_attachment_points(
    source: &NodeLayout,
    target: &NodeLayout,
    prior: &[OptimizedEdge],
    config: &RoutingConfig,
) -> AttachmentChoice {
    let source_bounds = source.bounds();
    let target_bounds = target.bounds();
    let source_points = generate_attachment_points(&source_bounds, config.resolution);
    let target_points = generate_attachment_points(&target_bounds, config.resolution);
    let context = ConflictContext::new(&source.id, &target.id, prior);

    let source_center = (source_bounds.center_x, source_bounds.center_y);
    let target_center = (target_bounds.center_x, target_bounds.center_y);
    let source_heading = angle(source_center, target_center);
    let target_heading = angle(target_center, source_center);

    let mut costs = Vec::with_capacity(source_points.len() * target_points.len());
    let mut min_cost = f32::INFINITY;
    for sp in &source_points {
        for tp in &target_points {
            let cost = distance(sp.pos(), tp.pos()) + context.penalty(sp.pos(), tp.pos(), config);
            min_cost = min_cost.min(cost);
            costs.push(cost);
        }
    }

    let mut best = (0, 0);
    let mut best_alignment = f32::INFINITY;
    for (si, sp) in source_points.iter().enumerate() {
        let sp_alignment = angular_gap(sp.angle, source_heading);
        for (ti, tp) in target_points.iter().enumerate() {
            if costs[si * target_points.len() + ti] > min_cost + COST_TIE_EPSILON {
                continue;
            }
            let alignment = sp_alignment + angular_gap(tp.angle, target_heading);
            if alignment < best_alignment {
                best = (si, ti);
                best_alignment = alignment;
            }
        }
    }

    AttachmentChoice {
        source: source_points[best.0],
        target: target_points[best.1],
        path_length: min_cost,
    }
}

/// One greedy optimization pass. Edges are visited by ascending priority
/// (stable within a priority) and each one sees only the edges placed before
/// it. Edges with a missing endpoint are skipped, as are repeats of an
/// already placed (source, target) pair.
pub fn optimize_all_edges(
    nodes: &[NodeLayout],
    edges: &[Edge],
    config: &RoutingConfig,
) -> Vec<OptimizedEdge> {
    let node_map: HashMap<&str, &NodeLayout> =
        nodes.iter().map(|node| (node.id.as_str(), node)).collect();
    let mut ordered: Vec<&Edge> = edges.iter().collect();
    ordered.sort_by_key(|edge| edge.priority);

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut optimized: Vec<OptimizedEdge> = Vec::with_capacity(ordered.len());
    let mut skipped = 0usize;

    for edge in ordered {
        let (Some(source), Some(target)) = (
            node_map.get(edge.source.as_str()),
            node_map.get(edge.target.as_str()),
        ) else {
            skipped += 1;
            continue;
        };
        if !seen.insert((edge.source.as_str(), edge.target.as_str())) {
            skipped += 1;
            continue;
        }
        let choice = find_optimal_attachment_points(source, target, &optimized, config);
        optimized.push(OptimizedEdge {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            priority: edge.priority,
            kind: edge.kind,
            recent: edge.recent,
            source_attachment: choice.source,
            target_attachment: choice.target,
            path_length: choice.path_length,
        });
    }

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        routed = optimized.len(),
        skipped,
        "edge optimization pass complete"
    );
    optimized
}

/// Cubic control points pushed outward along each attachment side's normal
/// by `distance * curvature`.
pub fn edge_curve(
    source: &AttachmentPoint,
    target: &AttachmentPoint,
    curvature: f32,
) -> EdgeCurve {
    let reach = distance(source.pos(), target.pos()) * curvature;
    let push = |point: &AttachmentPoint| {
        let (nx, ny) = point.side.normal();
        (point.x + nx * reach, point.y + ny * reach)
    };
    EdgeCurve {
        start: source.pos(),
        control1: push(source),
        control2: push(target),
        end: target.pos(),
    }
}
