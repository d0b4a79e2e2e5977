use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Connections younger than this are flagged as recent on the graph edge.
const RECENT_WINDOW_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    Transition,
    Mashup,
}

impl ConnectionKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "transition" | "t" => Some(Self::Transition),
            "mashup" | "m" => Some(Self::Mashup),
            _ => None,
        }
    }

    /// Optimization priority; lower values get first pick of attachment points.
    pub fn priority(self) -> u8 {
        match self {
            Self::Transition => 0,
            Self::Mashup => 1,
        }
    }

    pub fn is_directed(self) -> bool {
        matches!(self, Self::Transition)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ConnectionKind,
    pub track_a: String,
    pub track_b: String,
    pub created_at: DateTime<Utc>,
}

/// A graph vertex before placement. Missing sizes fall back to the layout defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub degree: usize,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            width: None,
            height: None,
            degree: 0,
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub priority: u8,
    pub kind: ConnectionKind,
    pub recent: bool,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            priority: ConnectionKind::Mashup.priority(),
            kind: ConnectionKind::Mashup,
            recent: false,
        }
    }

    pub fn with_kind(mut self, kind: ConnectionKind) -> Self {
        self.kind = kind;
        self.priority = kind.priority();
        self
    }

    pub fn directed(&self) -> bool {
        self.kind.is_directed()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure_node(&mut self, id: &str, label: Option<String>) {
        if let Some(node) = self.nodes.iter_mut().find(|node| node.id == id) {
            if let Some(label) = label {
                node.label = label;
            }
            return;
        }
        let mut node = Node::new(id);
        if let Some(label) = label {
            node.label = label;
        }
        self.nodes.push(node);
    }

    /// Maps stored tracks and connections onto graph nodes and edges.
    /// Node order follows `tracks`; edge order follows `connections`.
    pub fn from_library(tracks: &[Track], connections: &[Connection], now: DateTime<Utc>) -> Self {
        let mut nodes: Vec<Node> = tracks
            .iter()
            .map(|track| Node {
                id: track.id.clone(),
                label: format!("{} — {}", track.title, track.artist),
                width: None,
                height: None,
                degree: 0,
            })
            .collect();

        for conn in connections {
            for endpoint in [&conn.track_a, &conn.track_b] {
                if let Some(node) = nodes.iter_mut().find(|node| &node.id == endpoint) {
                    node.degree += 1;
                }
            }
        }

        let recent_window = Duration::seconds(RECENT_WINDOW_SECS);
        let edges = connections
            .iter()
            .map(|conn| Edge {
                id: conn.id.clone(),
                source: conn.track_a.clone(),
                target: conn.track_b.clone(),
                priority: conn.kind.priority(),
                kind: conn.kind,
                recent: now.signed_duration_since(conn.created_at) < recent_window,
            })
            .collect();

        Self { nodes, edges }
    }
}
