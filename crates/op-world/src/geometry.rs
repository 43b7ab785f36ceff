//! Lane geometry elements and the point-in-element test they support.
//!
//! A `LaneGeometryElement` is a quadrilateral slice of a lane: two "joints"
//! (the current and next cross-sections), each carrying a left and right
//! corner point. The current joint additionally carries the lane's local
//! `s`/`t` projection axes and an `s` offset, so any point found inside the
//! element can be converted to road coordinates without walking back to the
//! start of the lane.

use op_core::{normalize_angle, Vector2d};

const EDGE_DETECTION_THRESHOLD: f64 = 1e-6;

/// One quadrilateral slice of a lane's centerline geometry.
#[derive(Clone, Debug)]
pub struct LaneGeometryElement {
    /// Left/right corners of the near cross-section.
    pub current_left: Vector2d,
    pub current_right: Vector2d,
    /// Reference point of the near cross-section (lane-center point used as
    /// the projection origin for `s`/`t`).
    pub current_reference: Vector2d,
    /// Left/right corners of the far cross-section.
    pub next_left: Vector2d,
    pub next_right: Vector2d,
    /// Direction vector along the lane at the near cross-section.
    pub s_axis: Vector2d,
    /// Direction vector across the lane at the near cross-section. A
    /// near-zero vector means "use the axis orthogonal to `s_axis`".
    pub t_axis: Vector2d,
    /// Arc-length offset of the near cross-section from the start of the lane.
    pub s_offset: f64,
    /// Heading of the near cross-section, used to compute relative heading.
    pub s_heading: f64,
    bbox_min: Vector2d,
    bbox_max: Vector2d,
}

impl LaneGeometryElement {
    pub fn new(
        current_left: Vector2d,
        current_right: Vector2d,
        current_reference: Vector2d,
        next_left: Vector2d,
        next_right: Vector2d,
        s_axis: Vector2d,
        t_axis: Vector2d,
        s_offset: f64,
        s_heading: f64,
    ) -> Self {
        let xs = [current_left.x, current_right.x, next_left.x, next_right.x];
        let ys = [current_left.y, current_right.y, next_left.y, next_right.y];
        let bbox_min = Vector2d::new(
            xs.iter().cloned().fold(f64::INFINITY, f64::min),
            ys.iter().cloned().fold(f64::INFINITY, f64::min),
        );
        let bbox_max = Vector2d::new(
            xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        );
        Self {
            current_left,
            current_right,
            current_reference,
            next_left,
            next_right,
            s_axis,
            t_axis,
            s_offset,
            s_heading,
            bbox_min,
            bbox_max,
        }
    }

    fn bbox_contains(&self, p: Vector2d) -> bool {
        p.x >= self.bbox_min.x
            && p.x <= self.bbox_max.x
            && p.y >= self.bbox_min.y
            && p.y <= self.bbox_max.y
    }

    /// Does `point` lie within (or on the boundary of) this element?
    pub fn contains(&self, point: Vector2d) -> bool {
        if !self.bbox_contains(point) {
            return false;
        }
        within_quadrilateral(
            self.current_left,
            self.next_left,
            self.current_right,
            self.next_right,
            point,
        )
    }

    /// Road-coordinate projection of `point`, given the agent's heading `hdg`.
    pub fn road_coordinate(&self, point: Vector2d, hdg: f64) -> (f64, f64, f64) {
        let to_ref = point - self.current_reference;
        let s = self.s_offset + projected_length(to_ref, self.s_axis);
        let t_axis = if self.t_axis.x.abs() < EDGE_DETECTION_THRESHOLD
            && self.t_axis.y.abs() < EDGE_DETECTION_THRESHOLD
        {
            self.s_axis.rotated(std::f64::consts::FRAC_PI_2)
        } else {
            self.t_axis
        };
        let t = projected_length(to_ref, t_axis);
        let heading = normalize_angle(hdg - self.s_heading);
        (s, t, heading)
    }
}

fn projected_length(to_project: Vector2d, direction: Vector2d) -> f64 {
    to_project.dot(direction) / direction.length()
}

/// Point-in-quadrilateral test split into two triangles {A,B,C} and {C,B,D},
/// each resolved with barycentric coordinates; falls back to an on-edge
/// check along all four sides plus the internal diagonal so points exactly
/// on the split are still accepted.
///
/// ```text
///        A  ________________  B
///          /               /
///         /      P        /
///        /________________/
///       C                  D
/// ```
fn within_quadrilateral(a: Vector2d, b: Vector2d, c: Vector2d, d: Vector2d, p: Vector2d) -> bool {
    let ba = a - b;
    let bc = c - b;
    let bp = p - b;

    let dot00 = ba.dot(ba);
    let dot01 = ba.dot(bc);
    let dot02 = ba.dot(bp);
    let dot11 = bc.dot(bc);
    let dot12 = bc.dot(bp);

    if within_barycentric(dot00, dot02, dot01, dot11, dot12) {
        return true;
    }

    let bd = d - b;
    let dot00 = dot11;
    let dot02 = dot12;
    let dot01 = bc.dot(bd);
    let dot11 = bd.dot(bd);
    let dot12 = bd.dot(bp);

    if within_barycentric(dot00, dot02, dot01, dot11, dot12) {
        return true;
    }

    on_edge(a, b, p) || on_edge(b, d, p) || on_edge(d, c, p) || on_edge(c, a, p) || on_edge(b, c, p)
}

fn within_barycentric(dot00: f64, dot02: f64, dot01: f64, dot11: f64, dot12: f64) -> bool {
    let denom = dot00 * dot11 - dot01 * dot01;
    let u = (dot11 * dot02 - dot01 * dot12) / denom;
    let v = (dot00 * dot12 - dot01 * dot02) / denom;
    u >= 0.0 && v >= 0.0 && (u + v) < 1.0
}

fn on_edge(a: Vector2d, b: Vector2d, p: Vector2d) -> bool {
    let pa = p - a;
    let ba = b - a;

    if (pa.x * ba.y - pa.y * ba.x).abs() > EDGE_DETECTION_THRESHOLD {
        return false;
    }

    if ba.y.abs() < EDGE_DETECTION_THRESHOLD {
        if ba.x > 0.0 {
            a.x <= p.x && p.x <= b.x
        } else {
            b.x <= p.x && p.x <= a.x
        }
    } else if ba.y > 0.0 {
        a.y <= p.y && p.y <= b.y
    } else {
        b.y <= p.y && p.y <= a.y
    }
}

/// Construct an agent's rotated bounding-box polygon as a closed 5-point
/// loop, in road-network world coordinates.
///
/// The local box spans `center - length` to `center` along x (the agent's
/// reference point is its rear axle, so the box extends forward from it)
/// and `±width/2` along y; it is then rotated by `-rotation` and translated
/// to `(x, y)`.
pub fn bounding_box(
    x: f64,
    y: f64,
    length: f64,
    width: f64,
    rotation: f64,
    center: f64,
) -> [Vector2d; 5] {
    let half_width = width / 2.0;
    let mut points = [
        Vector2d::new(center - length, -half_width),
        Vector2d::new(center - length, half_width),
        Vector2d::new(center, half_width),
        Vector2d::new(center, -half_width),
        Vector2d::new(center - length, -half_width),
    ];
    for p in &mut points {
        *p = p.rotated(-rotation);
        p.translate(x, y);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_element() -> LaneGeometryElement {
        LaneGeometryElement::new(
            Vector2d::new(0.0, 1.0),
            Vector2d::new(0.0, -1.0),
            Vector2d::new(0.0, 0.0),
            Vector2d::new(10.0, 1.0),
            Vector2d::new(10.0, -1.0),
            Vector2d::new(1.0, 0.0),
            Vector2d::new(0.0, 1.0),
            0.0,
            0.0,
        )
    }

    #[test]
    fn contains_center_point() {
        let el = square_element();
        assert!(el.contains(Vector2d::new(5.0, 0.0)));
    }

    #[test]
    fn rejects_point_outside_bbox() {
        let el = square_element();
        assert!(!el.contains(Vector2d::new(20.0, 0.0)));
    }

    #[test]
    fn road_coordinate_roundtrip() {
        let el = square_element();
        let (s, t, _) = el.road_coordinate(Vector2d::new(4.0, 0.5), 0.0);
        assert!((s - 4.0).abs() < 1e-9);
        assert!((t - 0.5).abs() < 1e-9);
    }

    #[test]
    fn bounding_box_is_closed_and_centered_on_rear_axle() {
        let corners = bounding_box(0.0, 0.0, 4.0, 2.0, 0.0, 0.0);
        assert_eq!(corners[0], corners[4]);
        assert!(corners.iter().all(|p| p.x <= 0.0 && p.x >= -4.0));
    }
}
