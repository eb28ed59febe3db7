use indexmap::IndexMap;
use thiserror::Error;

/// Ids carrying this prefix (case-insensitive) denote diagram-boundary
/// anchors rather than nodes drawn on the canvas. They are materialized as
/// zero-size placeholder nodes before routing and carry no layer.
pub const EXTERNAL_ANCHOR_PREFIX: &str = "external";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Visible boundary of a node. `Point` is the zero-size kind shared by
/// junctions and external placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub shape: ShapeKind,
    pub layer: Option<usize>,
}

impl Node {
    pub fn new(id: &str, width: f32, height: f32, shape: ShapeKind) -> Self {
        Self {
            id: id.to_string(),
            x: 0.0,
            y: 0.0,
            width,
            height,
            shape,
            layer: None,
        }
    }

    /// Zero-size node standing in for a diagram-boundary anchor.
    pub fn placeholder(id: &str) -> Self {
        Self::new(id, 0.0, 0.0, ShapeKind::Point)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_zero_size(&self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }
}

/// How a connector attaches to the diagram. The four fixed kinds are
/// boundary arrows entering or leaving one node's side; `Connect` is
/// node-to-node flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectionKind {
    Left,
    Right,
    Top,
    Bottom,
    Connect,
}

impl DirectionKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            "connect" => Some(Self::Connect),
            _ => None,
        }
    }
}

/// One side of a node where connectors attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorSide {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub from: String,
    pub to: String,
    pub label: String,
    pub kind: DirectionKind,
    /// Slot within the shared anchor side, reassigned on every pass.
    pub index_on_side: usize,
    pub total_on_side: usize,
}

impl Connector {
    pub fn new(from: &str, to: &str, label: &str, kind: DirectionKind) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            label: label.to_string(),
            kind,
            index_on_side: 0,
            total_on_side: 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("connector references unknown node `{0}`")]
    UnknownNode(String),
}

/// Node registry plus connector list, owned by the surrounding editor
/// session. Engine passes borrow it for the duration of one recompute and
/// retain nothing across passes. Insertion order of `nodes` is the
/// enumeration order every deterministic stage relies on.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    pub nodes: IndexMap<String, Node>,
    pub connectors: Vec<Connector>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_node(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    pub fn add_connector(&mut self, connector: Connector) {
        self.connectors.push(connector);
    }

    /// Resolve both endpoints of a connector against the registry.
    pub fn endpoints(&self, connector: &Connector) -> Result<(&Node, &Node), ResolveError> {
        let from = self
            .nodes
            .get(&connector.from)
            .ok_or_else(|| ResolveError::UnknownNode(connector.from.clone()))?;
        let to = self
            .nodes
            .get(&connector.to)
            .ok_or_else(|| ResolveError::UnknownNode(connector.to.clone()))?;
        Ok((from, to))
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.connectors.clear();
    }
}

pub fn is_external_anchor(id: &str) -> bool {
    id.get(..EXTERNAL_ANCHOR_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(EXTERNAL_ANCHOR_PREFIX))
}

/// Side named inside an external anchor id, e.g. `external_left_c1`.
pub fn external_anchor_side(id: &str) -> Option<AnchorSide> {
    let lower = id.to_ascii_lowercase();
    if lower.contains("left") {
        Some(AnchorSide::Left)
    } else if lower.contains("right") {
        Some(AnchorSide::Right)
    } else if lower.contains("top") {
        Some(AnchorSide::Top)
    } else if lower.contains("bottom") {
        Some(AnchorSide::Bottom)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_kind_parses_known_tokens() {
        assert_eq!(DirectionKind::from_token("left"), Some(DirectionKind::Left));
        assert_eq!(DirectionKind::from_token("CONNECT"), Some(DirectionKind::Connect));
        assert_eq!(DirectionKind::from_token("diagonal"), None);
    }

    #[test]
    fn external_prefix_is_case_insensitive() {
        assert!(is_external_anchor("external_left_i1"));
        assert!(is_external_anchor("External_Top_C2"));
        assert!(!is_external_anchor("ext_left"));
        assert!(!is_external_anchor("A0"));
    }

    #[test]
    fn external_anchor_side_reads_id_text() {
        assert_eq!(external_anchor_side("external_left_i1"), Some(AnchorSide::Left));
        assert_eq!(external_anchor_side("externalBottomO3"), Some(AnchorSide::Bottom));
        assert_eq!(external_anchor_side("external_misc"), None);
    }

    #[test]
    fn endpoints_reports_unknown_ids() {
        let mut diagram = Diagram::new();
        diagram.insert_node(Node::new("A", 100.0, 60.0, ShapeKind::Rectangle));
        let connector = Connector::new("A", "missing", "", DirectionKind::Connect);
        let err = diagram.endpoints(&connector).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownNode(id) if id == "missing"));
    }

    #[test]
    fn zero_size_nodes_report_as_such() {
        let junction = Node::placeholder("J1");
        assert!(junction.is_zero_size());
        let block = Node::new("A", 120.0, 60.0, ShapeKind::Rectangle);
        assert!(!block.is_zero_size());
    }
}
