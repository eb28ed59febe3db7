use crate::model::Point;

/// Axis-aligned travel direction of one connector segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    pub direction: SegmentDirection,
}

impl Segment {
    pub fn new(start: Point, end: Point, direction: SegmentDirection) -> Self {
        Self {
            start,
            end,
            direction,
        }
    }

    pub fn midpoint(&self) -> Point {
        Point::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }

    pub fn length(&self) -> f32 {
        self.start.distance_to(self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrowhead {
    pub tip: Point,
    pub direction: SegmentDirection,
}

/// Finished geometry for one connector, ready for the host renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedConnector {
    pub from: String,
    pub to: String,
    pub label: String,
    /// 1 to 4 axis-aligned segments forming a continuous polyline.
    pub segments: Vec<Segment>,
    pub arrowhead: Arrowhead,
    /// Present when the connector carries a label.
    pub label_anchor: Option<Point>,
}

/// Node ids at one topological depth, insertion-order stable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Layer {
    pub ids: Vec<String>,
}

impl Layer {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub layers: Vec<Layer>,
    pub connectors: Vec<RoutedConnector>,
    /// Extent the host should give its canvas, margin included.
    pub width: f32,
    pub height: f32,
}
