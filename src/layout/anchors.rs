use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::model::{AnchorSide, Connector, DirectionKind, Node};

/// Recompute `index_on_side` / `total_on_side` for every connector from the
/// current node positions. Connectors sharing one (node, side) anchor are
/// merged into a single ordering: fixed-direction boundary arrows keep their
/// enumeration order and come first, node-to-node flow follows sorted by the
/// far endpoint's coordinate on the axis perpendicular to the side. Sorting
/// the flow exits this way keeps parallel connectors from crossing.
pub(super) fn assign_side_slots(
    connectors: &mut [Connector],
    nodes: &IndexMap<String, Node>,
) {
    let mut groups: IndexMap<(String, AnchorSide), Vec<usize>> = IndexMap::new();
    for (index, connector) in connectors.iter().enumerate() {
        let (node_id, side) = anchor_of(connector);
        groups
            .entry((node_id.to_string(), side))
            .or_default()
            .push(index);
    }

    for ((_, side), members) in groups {
        let fixed: Vec<usize> = members
            .iter()
            .copied()
            .filter(|&index| connectors[index].kind != DirectionKind::Connect)
            .collect();
        let mut flow: Vec<usize> = members
            .iter()
            .copied()
            .filter(|&index| connectors[index].kind == DirectionKind::Connect)
            .collect();
        flow.sort_by(|&a, &b| {
            let ka = far_coordinate(&connectors[a], side, nodes);
            let kb = far_coordinate(&connectors[b], side, nodes);
            ka.partial_cmp(&kb).unwrap_or(Ordering::Equal)
        });

        let total = members.len().max(1);
        for (slot, index) in fixed.into_iter().chain(flow).enumerate() {
            connectors[index].index_on_side = slot;
            connectors[index].total_on_side = total;
        }
    }
}

/// The (node, side) pair a connector is anchored on. Arrows with a fixed
/// direction enter the named side of their target; `Right` and node-to-node
/// flow leave the source's right side.
pub(super) fn anchor_of(connector: &Connector) -> (&str, AnchorSide) {
    match connector.kind {
        DirectionKind::Left => (connector.to.as_str(), AnchorSide::Left),
        DirectionKind::Top => (connector.to.as_str(), AnchorSide::Top),
        DirectionKind::Bottom => (connector.to.as_str(), AnchorSide::Bottom),
        DirectionKind::Right | DirectionKind::Connect => {
            (connector.from.as_str(), AnchorSide::Right)
        }
    }
}

/// Sort key for node-to-node flow: the far endpoint's position on the axis
/// perpendicular to the anchor side. Unresolved endpoints sort first, like
/// boundary anchors do.
fn far_coordinate(
    connector: &Connector,
    side: AnchorSide,
    nodes: &IndexMap<String, Node>,
) -> f32 {
    let far_id = match connector.kind {
        DirectionKind::Left | DirectionKind::Top | DirectionKind::Bottom => &connector.from,
        DirectionKind::Right | DirectionKind::Connect => &connector.to,
    };
    let Some(node) = nodes.get(far_id.as_str()) else {
        return f32::MIN;
    };
    match side {
        AnchorSide::Left | AnchorSide::Right => node.y,
        AnchorSide::Top | AnchorSide::Bottom => node.x,
    }
}
