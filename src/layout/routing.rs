use indexmap::IndexMap;

use crate::config::EngineConfig;
use crate::model::{Connector, DirectionKind, Node, Point, is_external_anchor};

use super::clip;
use super::types::{Arrowhead, RoutedConnector, Segment, SegmentDirection};

/// Rail positions used when the registry holds no sized node at all.
const FALLBACK_TOP_RAIL: f32 = 200.0;
const FALLBACK_BOTTOM_RAIL: f32 = 300.0;
/// Segments shorter than this are ignored when orienting the arrowhead.
const DEGENERATE_SEGMENT: f32 = 0.001;

/// Build the full geometry for one connector, or `None` when an endpoint is
/// missing from the registry — the caller drops the edge and carries on.
pub(super) fn route_connector(
    connector: &Connector,
    nodes: &IndexMap<String, Node>,
    config: &EngineConfig,
) -> Option<RoutedConnector> {
    let from = nodes.get(&connector.from)?;
    let to = nodes.get(&connector.to)?;

    let mut segments = if is_back_edge(from, to, config) {
        route_back_edge(from, to, nodes, config)
    } else {
        match connector.kind {
            DirectionKind::Left => route_left(to, connector, config),
            DirectionKind::Right => route_right(from, connector, config),
            DirectionKind::Top => route_top(to, connector, nodes, config),
            DirectionKind::Bottom => route_bottom(to, connector, nodes, config),
            DirectionKind::Connect => route_connect(from, to, config),
        }
    };
    if segments.is_empty() {
        return None;
    }

    clip::refine_endpoints(&mut segments, from, to);
    let arrowhead = arrowhead_for(&segments);
    let label_anchor = label_anchor_for(&segments, &connector.label, config);

    Some(RoutedConnector {
        from: connector.from.clone(),
        to: connector.to.clone(),
        label: connector.label.clone(),
        segments,
        arrowhead,
        label_anchor,
    })
}

/// A connector whose target sits in an earlier layer than its source,
/// detected from the placed vertical positions. Boundary anchors never
/// count.
pub(super) fn is_back_edge(from: &Node, to: &Node, config: &EngineConfig) -> bool {
    !is_external_anchor(&from.id)
        && !is_external_anchor(&to.id)
        && from.y > to.y + config.back_edge_margin
}

fn route_left(to: &Node, connector: &Connector, config: &EngineConfig) -> Vec<Segment> {
    let end_x = to.left();
    let start_x = end_x - config.stand_off_distance;
    let y = distributed_y(to, connector.index_on_side, connector.total_on_side);
    vec![Segment::new(
        Point::new(start_x, y),
        Point::new(end_x, y),
        SegmentDirection::Right,
    )]
}

fn route_right(from: &Node, connector: &Connector, config: &EngineConfig) -> Vec<Segment> {
    let start_x = from.right();
    let end_x = start_x + config.stand_off_distance;
    let y = distributed_y(from, connector.index_on_side, connector.total_on_side);
    vec![Segment::new(
        Point::new(start_x, y),
        Point::new(end_x, y),
        SegmentDirection::Right,
    )]
}

fn route_top(
    to: &Node,
    connector: &Connector,
    nodes: &IndexMap<String, Node>,
    config: &EngineConfig,
) -> Vec<Segment> {
    let start_y = highest_top(nodes) - config.rail_margin;
    let x = distributed_x(to, connector.index_on_side, connector.total_on_side);
    vec![Segment::new(
        Point::new(x, start_y),
        Point::new(x, to.top()),
        SegmentDirection::Down,
    )]
}

fn route_bottom(
    to: &Node,
    connector: &Connector,
    nodes: &IndexMap<String, Node>,
    config: &EngineConfig,
) -> Vec<Segment> {
    let start_y = lowest_bottom(nodes) + config.rail_margin;
    let x = distributed_x(to, connector.index_on_side, connector.total_on_side);
    vec![Segment::new(
        Point::new(x, start_y),
        Point::new(x, to.bottom()),
        SegmentDirection::Up,
    )]
}

/// Node-to-node flow: straight when the slightly lowered source anchor and
/// the target anchor are near one horizontal axis, otherwise a three-segment
/// dogleg through the horizontal midpoint.
fn route_connect(from: &Node, to: &Node, config: &EngineConfig) -> Vec<Segment> {
    let start = Point::new(from.right(), from.center().y + config.connect_anchor_offset);
    let end = Point::new(to.left(), to.center().y);

    if (start.y - end.y).abs() < config.same_axis_threshold {
        return vec![Segment::new(start, end, SegmentDirection::Right)];
    }

    let mid_x = (start.x + end.x) / 2.0;
    let turn = if end.y > start.y {
        SegmentDirection::Down
    } else {
        SegmentDirection::Up
    };
    vec![
        Segment::new(start, Point::new(mid_x, start.y), SegmentDirection::Right),
        Segment::new(
            Point::new(mid_x, start.y),
            Point::new(mid_x, end.y),
            turn,
        ),
        Segment::new(Point::new(mid_x, end.y), end, SegmentDirection::Right),
    ]
}

/// Back-edges travel around the outside of the diagram: down from the
/// source's bottom center to a rail below the lowest node, across to a lane
/// clear of every node's left edge, up to the target's height, and in
/// through the target's left side. No intermediate node is ever crossed.
fn route_back_edge(
    from: &Node,
    to: &Node,
    nodes: &IndexMap<String, Node>,
    config: &EngineConfig,
) -> Vec<Segment> {
    let start = Point::new(from.center().x, from.bottom());
    let end = Point::new(to.left(), to.center().y);

    let lowest = nodes
        .values()
        .filter(|node| node.id != from.id && node.id != to.id && !node.is_zero_size())
        .map(Node::bottom)
        .fold(from.bottom().max(to.bottom()), f32::max);
    let bypass_y = lowest + config.back_edge_clearance;

    let leftmost = nodes
        .values()
        .filter(|node| !node.is_zero_size())
        .map(Node::left)
        .fold(None::<f32>, |acc, left| {
            Some(acc.map_or(left, |current| current.min(left)))
        });
    let lane_x = leftmost.unwrap_or(from.left().min(to.left())) - config.stand_off_distance;

    vec![
        Segment::new(start, Point::new(start.x, bypass_y), SegmentDirection::Down),
        Segment::new(
            Point::new(start.x, bypass_y),
            Point::new(lane_x, bypass_y),
            SegmentDirection::Left,
        ),
        Segment::new(
            Point::new(lane_x, bypass_y),
            Point::new(lane_x, end.y),
            SegmentDirection::Up,
        ),
        Segment::new(Point::new(lane_x, end.y), end, SegmentDirection::Right),
    ]
}

/// Spread `total` anchors evenly over a node's vertical edge, top to bottom.
pub(super) fn distributed_y(node: &Node, index: usize, total: usize) -> f32 {
    let total = total.max(1);
    if total == 1 {
        return node.y + node.height / 2.0;
    }
    let step = node.height / (total + 1) as f32;
    node.y + step * (index + 1) as f32
}

/// Horizontal twin of `distributed_y` for top/bottom sides.
pub(super) fn distributed_x(node: &Node, index: usize, total: usize) -> f32 {
    let total = total.max(1);
    if total == 1 {
        return node.x + node.width / 2.0;
    }
    let step = node.width / (total + 1) as f32;
    node.x + step * (index + 1) as f32
}

/// Shared rail reference: the extreme top edge over every sized node.
/// Placeholders are skipped so boundary anchors do not drag the rail along.
fn highest_top(nodes: &IndexMap<String, Node>) -> f32 {
    nodes
        .values()
        .filter(|node| !node.is_zero_size())
        .map(Node::top)
        .fold(None::<f32>, |acc, top| {
            Some(acc.map_or(top, |current| current.min(top)))
        })
        .unwrap_or(FALLBACK_TOP_RAIL)
}

fn lowest_bottom(nodes: &IndexMap<String, Node>) -> f32 {
    nodes
        .values()
        .filter(|node| !node.is_zero_size())
        .map(Node::bottom)
        .fold(None::<f32>, |acc, bottom| {
            Some(acc.map_or(bottom, |current| current.max(bottom)))
        })
        .unwrap_or(FALLBACK_BOTTOM_RAIL)
}

/// Tip and pointing direction from the last segment that actually travels.
fn arrowhead_for(segments: &[Segment]) -> Arrowhead {
    let tip = segments
        .last()
        .map(|segment| segment.end)
        .unwrap_or(Point::new(0.0, 0.0));
    let oriented = segments
        .iter()
        .rev()
        .find(|segment| segment.length() > DEGENERATE_SEGMENT);
    let direction = match oriented {
        Some(segment) => {
            let dx = segment.end.x - segment.start.x;
            let dy = segment.end.y - segment.start.y;
            if dx.abs() >= dy.abs() {
                if dx >= 0.0 {
                    SegmentDirection::Right
                } else {
                    SegmentDirection::Left
                }
            } else if dy >= 0.0 {
                SegmentDirection::Down
            } else {
                SegmentDirection::Up
            }
        }
        None => SegmentDirection::Right,
    };
    Arrowhead { tip, direction }
}

/// Label anchor: midpoint of the path's middle segment, pushed a fixed
/// amount perpendicular to it.
fn label_anchor_for(segments: &[Segment], label: &str, config: &EngineConfig) -> Option<Point> {
    if label.is_empty() {
        return None;
    }
    let segment = segments.get(segments.len() / 2)?;
    let mid = segment.midpoint();
    let anchored = match segment.direction {
        SegmentDirection::Left | SegmentDirection::Right => {
            Point::new(mid.x, mid.y - config.label_offset)
        }
        SegmentDirection::Up | SegmentDirection::Down => {
            Point::new(mid.x - config.label_offset, mid.y)
        }
    };
    Some(anchored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShapeKind;

    fn rect_at(id: &str, x: f32, y: f32) -> Node {
        let mut node = Node::new(id, 120.0, 60.0, ShapeKind::Rectangle);
        node.x = x;
        node.y = y;
        node
    }

    fn registry(entries: Vec<Node>) -> IndexMap<String, Node> {
        entries
            .into_iter()
            .map(|node| (node.id.clone(), node))
            .collect()
    }

    fn connect(from: &str, to: &str) -> Connector {
        Connector::new(from, to, "", DirectionKind::Connect)
    }

    #[test]
    fn aligned_nodes_route_as_one_segment() {
        let config = EngineConfig::default();
        let mut target = rect_at("B", 400.0, 100.0);
        target.y = 100.0 + config.connect_anchor_offset; // cancels the source shift
        let nodes = registry(vec![rect_at("A", 100.0, 100.0), target]);
        let routed = route_connector(&connect("A", "B"), &nodes, &config).expect("routed");
        assert_eq!(routed.segments.len(), 1);
        assert_eq!(routed.segments[0].direction, SegmentDirection::Right);
    }

    #[test]
    fn offset_nodes_route_as_three_segments() {
        let config = EngineConfig::default();
        let nodes = registry(vec![rect_at("A", 100.0, 100.0), rect_at("B", 400.0, 140.0)]);
        let routed = route_connector(&connect("A", "B"), &nodes, &config).expect("routed");
        assert_eq!(routed.segments.len(), 3);
        assert_eq!(routed.segments[1].direction, SegmentDirection::Down);

        // a small rise stays a dogleg; only rises past the back-edge margin
        // leave this code path
        let nodes = registry(vec![rect_at("A", 100.0, 200.0), rect_at("B", 400.0, 160.0)]);
        let routed = route_connector(&connect("A", "B"), &nodes, &config).expect("routed");
        assert_eq!(routed.segments.len(), 3);
        assert_eq!(routed.segments[1].direction, SegmentDirection::Up);
    }

    #[test]
    fn dogleg_meets_at_the_horizontal_midpoint() {
        let config = EngineConfig::default();
        let nodes = registry(vec![rect_at("A", 100.0, 100.0), rect_at("B", 400.0, 300.0)]);
        let routed = route_connector(&connect("A", "B"), &nodes, &config).expect("routed");
        let start_x = nodes["A"].right();
        let end_x = nodes["B"].left();
        let expected_mid = (start_x + end_x) / 2.0;
        assert_eq!(routed.segments[0].end.x, expected_mid);
        assert_eq!(routed.segments[1].start.x, expected_mid);
        // the polyline is continuous
        assert_eq!(routed.segments[0].end, routed.segments[1].start);
        assert_eq!(routed.segments[1].end, routed.segments[2].start);
    }

    #[test]
    fn left_arrow_lands_on_the_distributed_point() {
        let config = EngineConfig::default();
        let nodes = registry(vec![rect_at("A", 200.0, 100.0)]);
        let mut connector = Connector::new("external_left_i1", "A", "", DirectionKind::Left);
        connector.index_on_side = 1;
        connector.total_on_side = 3;
        let mut with_anchor = nodes.clone();
        with_anchor.insert(
            "external_left_i1".to_string(),
            Node::placeholder("external_left_i1"),
        );
        let routed = route_connector(&connector, &with_anchor, &config).expect("routed");
        assert_eq!(routed.segments.len(), 1);
        let segment = &routed.segments[0];
        assert_eq!(segment.end.x, 200.0);
        assert_eq!(segment.start.x, 200.0 - config.stand_off_distance);
        // slot 1 of 3 over a 60-high side: 100 + 60/4 * 2
        assert_eq!(segment.end.y, 130.0);
    }

    #[test]
    fn side_slots_spread_symmetrically_and_increase() {
        let node = rect_at("A", 100.0, 100.0);
        let total = 3;
        let ys: Vec<f32> = (0..total)
            .map(|index| distributed_y(&node, index, total))
            .collect();
        let mid = node.y + node.height / 2.0;
        assert_eq!(ys[1], mid);
        assert!((mid - ys[0] - (ys[2] - mid)).abs() < 1e-3);
        assert!(ys.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn top_arrows_share_one_rail_across_nodes() {
        let config = EngineConfig::default();
        let high = rect_at("High", 100.0, 80.0);
        let low = rect_at("Low", 300.0, 400.0);
        let nodes = registry(vec![high, low]);
        let into_high =
            route_top(&nodes["High"], &connect("x", "High"), &nodes, &config);
        let into_low = route_top(&nodes["Low"], &connect("x", "Low"), &nodes, &config);
        // both start from the same rail above the highest node
        assert_eq!(into_high[0].start.y, 80.0 - config.rail_margin);
        assert_eq!(into_low[0].start.y, 80.0 - config.rail_margin);
        assert_eq!(into_low[0].end.y, 400.0);
    }

    #[test]
    fn bottom_arrows_rise_from_below_the_lowest_node() {
        let config = EngineConfig::default();
        let nodes = registry(vec![rect_at("A", 100.0, 80.0), rect_at("B", 300.0, 400.0)]);
        let segments = route_bottom(&nodes["A"], &connect("x", "A"), &nodes, &config);
        assert_eq!(segments[0].start.y, 460.0 + config.rail_margin);
        assert_eq!(segments[0].direction, SegmentDirection::Up);
    }

    #[test]
    fn unresolved_endpoint_yields_no_route() {
        let config = EngineConfig::default();
        let nodes = registry(vec![rect_at("A", 100.0, 100.0)]);
        assert!(route_connector(&connect("A", "ghost"), &nodes, &config).is_none());
    }

    #[test]
    fn back_edge_routes_around_the_outside() {
        let config = EngineConfig::default();
        let a = rect_at("A", 290.0, 120.0);
        let b = rect_at("B", 290.0, 280.0);
        let c = rect_at("C", 290.0, 440.0);
        let d = rect_at("D", 290.0, 600.0);
        let nodes = registry(vec![a, b, c, d]);
        let routed = route_connector(&connect("D", "A"), &nodes, &config).expect("routed");
        assert_eq!(routed.segments.len(), 4);

        // drops below the lowest intermediate node before crossing
        let bypass_y = routed.segments[0].end.y;
        assert!(bypass_y > nodes["C"].bottom());
        // the vertical return lane stays clear of every node
        let lane_x = routed.segments[2].start.x;
        assert!(lane_x < nodes["A"].left());
        // and the arrow comes back in through the target's left side
        let tip = routed.segments[3].end;
        assert_eq!(tip.x, nodes["A"].left());
        assert_eq!(tip.y, nodes["A"].center().y);
        assert_eq!(routed.arrowhead.direction, SegmentDirection::Right);
    }

    #[test]
    fn forward_connectors_are_not_back_edges() {
        let config = EngineConfig::default();
        let from = rect_at("A", 100.0, 100.0);
        let to = rect_at("B", 100.0, 260.0);
        assert!(!is_back_edge(&from, &to, &config));
        assert!(is_back_edge(&to, &from, &config));
    }

    #[test]
    fn arrowhead_follows_the_last_travelling_segment() {
        let segments = vec![
            Segment::new(
                Point::new(0.0, 0.0),
                Point::new(50.0, 0.0),
                SegmentDirection::Right,
            ),
            Segment::new(
                Point::new(50.0, 0.0),
                Point::new(50.0, 40.0),
                SegmentDirection::Down,
            ),
        ];
        let arrowhead = arrowhead_for(&segments);
        assert_eq!(arrowhead.tip, Point::new(50.0, 40.0));
        assert_eq!(arrowhead.direction, SegmentDirection::Down);
    }

    #[test]
    fn labels_anchor_beside_the_middle_segment() {
        let config = EngineConfig::default();
        let nodes = registry(vec![rect_at("A", 100.0, 100.0), rect_at("B", 400.0, 300.0)]);
        let mut connector = connect("A", "B");
        connector.label = "flow".to_string();
        let routed = route_connector(&connector, &nodes, &config).expect("routed");
        let middle = &routed.segments[1];
        let anchor = routed.label_anchor.expect("labelled");
        // middle segment is vertical, so the label shifts horizontally
        assert_eq!(anchor.x, middle.midpoint().x - config.label_offset);
        assert_eq!(anchor.y, middle.midpoint().y);
    }

    #[test]
    fn unlabelled_connectors_have_no_anchor() {
        let config = EngineConfig::default();
        let nodes = registry(vec![rect_at("A", 100.0, 100.0), rect_at("B", 400.0, 100.0)]);
        let routed = route_connector(&connect("A", "B"), &nodes, &config).expect("routed");
        assert!(routed.label_anchor.is_none());
    }
}
