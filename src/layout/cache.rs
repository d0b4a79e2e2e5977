use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::RoutingConfig;
use crate::ir::Edge;

use super::routing::optimize_all_edges;
use super::{NodeBounds, NodeLayout, OptimizedEdge};

/// Memoizes optimization passes keyed by node positions and edge endpoints.
///
/// Position changes reported through [`RoutingCache::update_node_positions`]
/// drop every cached pass at once. Updates closer together than the throttle
/// window are ignored, so callers can report every frame.
#[derive(Debug)]
pub struct RoutingCache {
    config: RoutingConfig,
    node_bounds: HashMap<String, NodeBounds>,
    passes: HashMap<String, Arc<[OptimizedEdge]>>,
    last_update: Option<Instant>,
    dirty: bool,
}

impl RoutingCache {
    pub fn new(config: RoutingConfig) -> Self {
        Self {
            config,
            node_bounds: HashMap::new(),
            passes: HashMap::new(),
            last_update: None,
            dirty: false,
        }
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    fn throttle(&self) -> Duration {
        Duration::from_millis(self.config.throttle_ms)
    }

    pub fn update_node_positions(&mut self, nodes: &[NodeLayout]) {
        self.update_node_positions_at(nodes, Instant::now());
    }

    /// Compares node positions against the stored copy as of `now`.
    /// Returns whether the update was accepted and invalidated the cache.
    pub fn update_node_positions_at(&mut self, nodes: &[NodeLayout], now: Instant) -> bool {
        if let Some(last) = self.last_update {
            if now.saturating_duration_since(last) < self.throttle() {
                tracing::trace!(nodes = nodes.len(), "position update throttled");
                return false;
            }
        }

        let moved = nodes.iter().any(|node| match self.node_bounds.get(&node.id) {
            Some(cached) => cached.x != node.x || cached.y != node.y,
            None => true,
        });
        if !moved {
            return false;
        }

        for node in nodes {
            self.node_bounds.insert(node.id.clone(), node.bounds());
        }
        let dropped = self.passes.len();
        self.passes.clear();
        self.dirty = true;
        self.last_update = Some(now);
        tracing::debug!(
            nodes = nodes.len(),
            dropped,
            "node positions changed, routing cache invalidated"
        );
        true
    }

    /// Returns the cached pass for this exact geometry and edge set, or runs
    /// a fresh optimization pass and stores it.
    pub fn optimize_edges(&mut self, nodes: &[NodeLayout], edges: &[Edge]) -> Arc<[OptimizedEdge]> {
        let key = cache_key(nodes, edges);
        if let Some(hit) = self.passes.get(&key) {
            tracing::debug!(edges = hit.len(), "routing cache hit");
            return Arc::clone(hit);
        }

        let optimized: Arc<[OptimizedEdge]> = optimize_all_edges(nodes, edges, &self.config).into();
        tracing::debug!(
            edges = optimized.len(),
            cached = self.passes.len() + 1,
            "routing cache miss"
        );
        self.passes.insert(key, Arc::clone(&optimized));
        self.dirty = false;
        optimized
    }

    /// True after an accepted position change until the next recomputation.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn cached_pass_count(&self) -> usize {
        self.passes.len()
    }

    pub fn tracked_node_count(&self) -> usize {
        self.node_bounds.len()
    }

    /// Releases all cached state. Consuming `self` rules out further use.
    pub fn destroy(mut self) {
        self.node_bounds.clear();
        self.passes.clear();
        tracing::debug!("routing cache destroyed");
    }
}

/// `id:x,y` per node joined by `|`, then `::`, then `source-target` per edge
/// joined by `|`.
pub fn cache_key(nodes: &[NodeLayout], edges: &[Edge]) -> String {
    let mut key = String::new();
    for (idx, node) in nodes.iter().enumerate() {
        if idx > 0 {
            key.push('|');
        }
        let _ = write!(key, "{}:{},{}", node.id, node.x, node.y);
    }
    key.push_str("::");
    for (idx, edge) in edges.iter().enumerate() {
        if idx > 0 {
            key.push('|');
        }
        let _ = write!(key, "{}-{}", edge.source, edge.target);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> (Vec<NodeLayout>, Vec<Edge>) {
        let nodes = vec![
            NodeLayout::new("a", 0.0, 0.0, 120.0, 60.0),
            NodeLayout::new("b", 300.0, 0.0, 120.0, 60.0),
            NodeLayout::new("c", 150.0, 240.5, 120.0, 60.0),
        ];
        let edges = vec![Edge::new("1", "a", "b"), Edge::new("2", "b", "c")];
        (nodes, edges)
    }

    #[test]
    fn key_serializes_positions_and_endpoints() {
        let (nodes, edges) = scene();
        assert_eq!(cache_key(&nodes, &edges), "a:0,0|b:300,0|c:150,240.5::a-b|b-c");
        assert_eq!(cache_key(&[], &[]), "::");
    }

    #[test]
    fn unchanged_inputs_return_the_same_pass() {
        let (nodes, edges) = scene();
        let mut cache = RoutingCache::new(RoutingConfig::default());
        let first = cache.optimize_edges(&nodes, &edges);
        let second = cache.optimize_edges(&nodes, &edges);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 2);
        assert_eq!(cache.cached_pass_count(), 1);
    }

    #[test]
    fn moved_node_invalidates_after_update() {
        let (mut nodes, edges) = scene();
        let mut cache = RoutingCache::new(RoutingConfig::default());
        let start = Instant::now();
        assert!(cache.update_node_positions_at(&nodes, start));
        let first = cache.optimize_edges(&nodes, &edges);
        assert!(!cache.is_dirty());

        nodes[1].y += 40.0;
        assert!(cache.update_node_positions_at(&nodes, start + Duration::from_millis(20)));
        assert!(cache.is_dirty());
        assert_eq!(cache.cached_pass_count(), 0);

        let second = cache.optimize_edges(&nodes, &edges);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_ne!(first[0].target_attachment, second[0].target_attachment);
    }

    #[test]
    fn updates_inside_throttle_window_are_ignored() {
        let (mut nodes, edges) = scene();
        let mut cache = RoutingCache::new(RoutingConfig::default());
        let start = Instant::now();
        assert!(cache.update_node_positions_at(&nodes, start));
        let first = cache.optimize_edges(&nodes, &edges);

        nodes[0].x += 5.0;
        assert!(!cache.update_node_positions_at(&nodes, start + Duration::from_millis(10)));
        assert_eq!(cache.cached_pass_count(), 1);
        assert!(!cache.is_dirty());

        assert!(cache.update_node_positions_at(&nodes, start + Duration::from_millis(16)));
        assert_eq!(cache.cached_pass_count(), 0);
        let second = cache.optimize_edges(&nodes, &edges);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn unchanged_positions_keep_the_cache() {
        let (nodes, edges) = scene();
        let mut cache = RoutingCache::new(RoutingConfig::default());
        let start = Instant::now();
        cache.update_node_positions_at(&nodes, start);
        let first = cache.optimize_edges(&nodes, &edges);
        assert!(!cache.update_node_positions_at(&nodes, start + Duration::from_secs(1)));
        let second = cache.optimize_edges(&nodes, &edges);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.tracked_node_count(), 3);
    }

    #[test]
    fn size_only_changes_do_not_invalidate() {
        let (mut nodes, edges) = scene();
        let mut cache = RoutingCache::new(RoutingConfig::default());
        let start = Instant::now();
        cache.update_node_positions_at(&nodes, start);
        cache.optimize_edges(&nodes, &edges);
        nodes[2].width = 200.0;
        assert!(!cache.update_node_positions_at(&nodes, start + Duration::from_secs(1)));
        assert_eq!(cache.cached_pass_count(), 1);
    }

    #[test]
    fn managers_do_not_share_state() {
        let (nodes, edges) = scene();
        let mut left = RoutingCache::new(RoutingConfig::default());
        let mut right = RoutingCache::new(RoutingConfig::default());
        let a = left.optimize_edges(&nodes, &edges);
        assert_eq!(right.cached_pass_count(), 0);
        let b = right.optimize_edges(&nodes, &edges);
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(*a, *b);
        left.destroy();
        assert_eq!(right.cached_pass_count(), 1);
        right.destroy();
    }
}
