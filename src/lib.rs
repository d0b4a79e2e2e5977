#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod library;
pub mod render;
pub mod synthetic;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, RoutingConfig, load_config};
pub use ir::{Connection, ConnectionKind, Edge, Graph, Node, Track};
pub use layout::{Layout, RoutingCache, compute_layout, compute_layout_with_rng, optimize_all_edges};
pub use render::render_svg;
pub use theme::Theme;
