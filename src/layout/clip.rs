use crate::model::{Node, Point, ShapeKind};

use super::types::Segment;

/// Parametric distances below this count as starting on the boundary.
const MIN_CROSSING_T: f32 = 0.01;
/// Direction components below this are treated as axis-parallel.
const AXIS_EPSILON: f32 = 0.01;
/// Slack for the point-in-rectangle check after a crossing is computed.
const BOUNDS_SLACK: f32 = 0.01;

/// Exact crossing of the line `from -> to` with a node's visible boundary.
/// Degenerate inputs (zero-size shape, zero-length line, no intersection)
/// fall back to returning `to` unchanged; clipping never fails.
pub fn clip(node: &Node, from: Point, to: Point) -> Point {
    match node.shape {
        ShapeKind::Rectangle => clip_rectangle(node, from, to),
        ShapeKind::Ellipse => clip_ellipse(node, from, to),
        ShapeKind::Point => to,
    }
}

fn clip_rectangle(node: &Node, from: Point, to: Point) -> Point {
    let dx = to.x - from.x;
    let dy = to.y - from.y;

    let mut ts = [0.0f32; 4];
    if dx.abs() > AXIS_EPSILON {
        ts[0] = (node.left() - from.x) / dx;
        ts[1] = (node.right() - from.x) / dx;
    }
    if dy.abs() > AXIS_EPSILON {
        ts[2] = (node.top() - from.y) / dy;
        ts[3] = (node.bottom() - from.y) / dy;
    }

    let mut candidates: Vec<Point> = Vec::new();
    for t in ts {
        if t > MIN_CROSSING_T && t <= 1.0 {
            let point = Point::new(from.x + dx * t, from.y + dy * t);
            if contains(node, point) {
                candidates.push(point);
            }
        }
    }

    // several edges can qualify; keep the exit nearest the destination
    candidates
        .into_iter()
        .min_by(|a, b| {
            a.distance_to(to)
                .partial_cmp(&b.distance_to(to))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(to)
}

fn contains(node: &Node, point: Point) -> bool {
    point.x >= node.left() - BOUNDS_SLACK
        && point.x <= node.right() + BOUNDS_SLACK
        && point.y >= node.top() - BOUNDS_SLACK
        && point.y <= node.bottom() + BOUNDS_SLACK
}

fn clip_ellipse(node: &Node, from: Point, to: Point) -> Point {
    let rx = node.width / 2.0;
    let ry = node.height / 2.0;
    if rx <= AXIS_EPSILON || ry <= AXIS_EPSILON {
        return to;
    }
    let center = node.center();
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let fx = from.x - center.x;
    let fy = from.y - center.y;

    let a = (dx * dx) / (rx * rx) + (dy * dy) / (ry * ry);
    if a <= f32::EPSILON {
        return to;
    }
    let b = 2.0 * (fx * dx / (rx * rx) + fy * dy / (ry * ry));
    let c = (fx * fx) / (rx * rx) + (fy * fy) / (ry * ry) - 1.0;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return to;
    }

    let root = discriminant.sqrt();
    let t1 = (-b + root) / (2.0 * a);
    let t2 = (-b - root) / (2.0 * a);
    let mut t = if t1.abs() < t2.abs() { t1 } else { t2 };
    if t < MIN_CROSSING_T {
        t = t1.max(t2);
    }

    Point::new(from.x + dx * t, from.y + dy * t)
}

/// Pull a routed path's terminal points onto the exact boundary of
/// ellipse-shaped endpoints. Rectangle and placeholder anchors already sit
/// on the boundary the router computed them for.
pub(super) fn refine_endpoints(segments: &mut [Segment], from: &Node, to: &Node) {
    if from.shape == ShapeKind::Ellipse
        && let Some(first) = segments.first_mut()
    {
        first.start = clip(from, first.end, from.center());
    }
    if to.shape == ShapeKind::Ellipse
        && let Some(last) = segments.last_mut()
    {
        last.end = clip(to, last.start, to.center());
    }
}
