mod anchors;
mod clip;
mod layering;
mod placement;
mod routing;
pub(crate) mod types;

pub use clip::clip;
pub use types::*;

use log::debug;

use crate::config::EngineConfig;
use crate::model::Diagram;

/// Full layout pass, run on diagram load or reload: materialize boundary
/// anchors, layer the graph, place every node, then route all connectors.
/// The registry keeps the final node positions; the returned `Layout` holds
/// everything else the host renderer needs.
pub fn compute_layout(diagram: &mut Diagram, config: &EngineConfig) -> Layout {
    placement::materialize_external_anchors(diagram);
    let layers = layering::assign_layers(diagram);
    debug!(
        "layered {} nodes into {} layers",
        diagram.nodes.len(),
        layers.len()
    );
    placement::place_layers(&mut diagram.nodes, &layers, config);
    placement::center_junctions(&mut diagram.nodes, &diagram.connectors);

    let connectors = route_connectors(diagram, config);
    let (width, height) = canvas_extent(diagram, &connectors, config);
    Layout {
        layers,
        connectors,
        width,
        height,
    }
}

/// Recompute pass after a node drag or resize: node positions are taken as
/// they are, boundary anchors follow their partners, side slots and paths
/// are rebuilt from scratch. Connectors with unresolvable endpoints are
/// dropped, never fatal.
pub fn route_connectors(diagram: &mut Diagram, config: &EngineConfig) -> Vec<RoutedConnector> {
    placement::materialize_external_anchors(diagram);
    placement::position_external_anchors(diagram, config);
    anchors::assign_side_slots(&mut diagram.connectors, &diagram.nodes);

    let mut routed = Vec::with_capacity(diagram.connectors.len());
    for connector in &diagram.connectors {
        match routing::route_connector(connector, &diagram.nodes, config) {
            Some(path) => routed.push(path),
            None => debug!(
                "dropping connector {} -> {}: unresolved endpoint",
                connector.from, connector.to
            ),
        }
    }
    debug!("routed {} of {} connectors", routed.len(), diagram.connectors.len());
    routed
}

fn canvas_extent(
    diagram: &Diagram,
    connectors: &[RoutedConnector],
    config: &EngineConfig,
) -> (f32, f32) {
    let mut max_x = 0.0f32;
    let mut max_y = 0.0f32;
    for node in diagram.nodes.values() {
        max_x = max_x.max(node.right());
        max_y = max_y.max(node.bottom());
    }
    for routed in connectors {
        for segment in &routed.segments {
            max_x = max_x.max(segment.start.x).max(segment.end.x);
            max_y = max_y.max(segment.start.y).max(segment.end.y);
        }
    }
    (max_x + config.canvas_margin, max_y + config.canvas_margin)
}
