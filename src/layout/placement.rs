use indexmap::IndexMap;
use log::debug;

use crate::config::EngineConfig;
use crate::model::{
    AnchorSide, Connector, Diagram, Node, Point, external_anchor_side, is_external_anchor,
};

use super::types::Layer;

/// Assign on-screen coordinates layer by layer. Each layer sits
/// `layer_spacing` below the previous one; siblings run left to right and
/// the whole row is centered on the shared `base_x` baseline so layers of
/// different widths stay visually aligned.
pub(super) fn place_layers(
    nodes: &mut IndexMap<String, Node>,
    layers: &[Layer],
    config: &EngineConfig,
) {
    for (depth, layer) in layers.iter().enumerate() {
        let y = config.base_y + depth as f32 * config.layer_spacing;
        let members: Vec<&str> = layer
            .ids
            .iter()
            .filter(|id| nodes.contains_key(id.as_str()))
            .map(|id| id.as_str())
            .collect();
        if members.is_empty() {
            continue;
        }
        let widths: f32 = members
            .iter()
            .filter_map(|id| nodes.get(*id))
            .map(|node| node.width)
            .sum();
        let total = widths + config.sibling_spacing * (members.len() - 1) as f32;
        let mut cursor = config.base_x - total / 2.0;
        for id in members {
            if let Some(node) = nodes.get_mut(id) {
                node.x = cursor;
                node.y = y;
                node.layer = Some(depth);
                cursor += node.width + config.sibling_spacing;
            }
        }
    }
}

/// Second pass for zero-size routing hubs: pull each junction onto the
/// arithmetic mean of its predecessors' horizontal centers, computed after
/// every first-pass position is final. The layer's vertical coordinate is
/// kept.
pub(super) fn center_junctions(nodes: &mut IndexMap<String, Node>, connectors: &[Connector]) {
    let junction_ids: Vec<String> = nodes
        .values()
        .filter(|node| node.is_zero_size() && !is_external_anchor(&node.id))
        .map(|node| node.id.clone())
        .collect();

    for id in junction_ids {
        let mut centers: Vec<f32> = Vec::new();
        for connector in connectors {
            if connector.to != id || is_external_anchor(&connector.from) {
                continue;
            }
            if let Some(source) = nodes.get(&connector.from) {
                centers.push(source.center().x);
            }
        }
        if centers.is_empty() {
            continue;
        }
        let mean = centers.iter().sum::<f32>() / centers.len() as f32;
        if let Some(node) = nodes.get_mut(&id) {
            node.x = mean;
        }
    }
}

/// Pre-pass of the two-phase boundary-anchor resolution: every referenced
/// `external*` id becomes a zero-size placeholder node before any routing
/// reads the registry.
pub(super) fn materialize_external_anchors(diagram: &mut Diagram) {
    let mut missing: Vec<String> = Vec::new();
    for connector in &diagram.connectors {
        for id in [&connector.from, &connector.to] {
            if is_external_anchor(id)
                && !diagram.nodes.contains_key(id.as_str())
                && !missing.contains(id)
            {
                missing.push(id.clone());
            }
        }
    }
    for id in missing {
        debug!("materializing boundary anchor {id}");
        diagram.nodes.insert(id.clone(), Node::placeholder(&id));
    }
}

/// Pin each boundary anchor a fixed reach away from its partner node, on
/// the side named inside the anchor id. Anchors whose id names no side, or
/// whose partner is itself a boundary anchor, are left where they are.
pub(super) fn position_external_anchors(diagram: &mut Diagram, config: &EngineConfig) {
    let mut updates: Vec<(String, Point)> = Vec::new();
    for connector in &diagram.connectors {
        for (anchor_id, partner_id) in [
            (&connector.from, &connector.to),
            (&connector.to, &connector.from),
        ] {
            if !is_external_anchor(anchor_id) || is_external_anchor(partner_id) {
                continue;
            }
            let Some(side) = external_anchor_side(anchor_id) else {
                continue;
            };
            let Some(partner) = diagram.nodes.get(partner_id.as_str()) else {
                continue;
            };
            let reach = config.external_anchor_reach;
            let position = match side {
                AnchorSide::Left => Point::new(partner.left() - reach, partner.center().y),
                AnchorSide::Right => Point::new(partner.right() + reach, partner.center().y),
                AnchorSide::Top => Point::new(partner.center().x, partner.top() - reach),
                AnchorSide::Bottom => Point::new(partner.center().x, partner.bottom() + reach),
            };
            updates.push((anchor_id.clone(), position));
        }
    }
    for (id, position) in updates {
        if let Some(node) = diagram.nodes.get_mut(&id) {
            node.x = position.x;
            node.y = position.y;
        }
    }
}
