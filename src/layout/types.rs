use serde::Serialize;

use crate::ir::ConnectionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// Outward unit normal of the side in screen coordinates (y grows down).
    pub fn normal(self) -> (f32, f32) {
        match self {
            Side::Top => (0.0, -1.0),
            Side::Right => (1.0, 0.0),
            Side::Bottom => (0.0, 1.0),
            Side::Left => (-1.0, 0.0),
        }
    }
}

/// A placed node. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeLayout {
    pub id: String,
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub degree: usize,
}

impl NodeLayout {
    pub fn new(id: impl Into<String>, x: f32, y: f32, width: f32, height: f32) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            x,
            y,
            width,
            height,
            degree: 0,
        }
    }

    pub fn bounds(&self) -> NodeBounds {
        NodeBounds::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub center_x: f32,
    pub center_y: f32,
}

impl NodeBounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            center_x: x + width / 2.0,
            center_y: y + height / 2.0,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttachmentPoint {
    pub x: f32,
    pub y: f32,
    pub side: Side,
    /// Angle in radians from the node center to the point.
    pub angle: f32,
}

impl AttachmentPoint {
    pub fn pos(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizedEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub priority: u8,
    pub kind: ConnectionKind,
    pub recent: bool,
    pub source_attachment: AttachmentPoint,
    pub target_attachment: AttachmentPoint,
    /// Euclidean length plus the conflict penalty paid when it was chosen.
    pub path_length: f32,
}

/// Cubic curve between two attachment points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeCurve {
    pub start: (f32, f32),
    pub control1: (f32, f32),
    pub control2: (f32, f32),
    pub end: (f32, f32),
}

impl EdgeCurve {
    pub fn to_svg_path(&self) -> String {
        format!(
            "M {:.2},{:.2} C {:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
            self.start.0,
            self.start.1,
            self.control1.0,
            self.control1.1,
            self.control2.0,
            self.control2.1,
            self.end.0,
            self.end.1
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<OptimizedEdge>,
    pub min_x: f32,
    pub min_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.iter().find(|node| node.id == id)
    }
}
