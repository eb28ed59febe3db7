pub mod config;
pub mod layout;
pub mod model;

pub use config::{EngineConfig, load_config};
pub use layout::{
    Arrowhead, Layer, Layout, RoutedConnector, Segment, SegmentDirection, clip, compute_layout,
    route_connectors,
};
pub use model::{
    AnchorSide, Connector, Diagram, DirectionKind, Node, Point, ResolveError, ShapeKind,
    external_anchor_side, is_external_anchor,
};
