use super::Point2d;
use geo::{Area, Coord, Intersects, LineString, Polygon};

fn to_geo(ring: &[Point2d]) -> Polygon<f64> {
    let coords = ring.iter().map(|p| Coord { x: p.x, y: p.y }).collect::<Vec<_>>();
    Polygon::new(LineString::new(coords), vec![])
}

/// Returns true if two polygons share any point, including touching edges.
///
/// Rings may be open or closed.
pub fn polygons_intersect(a: &[Point2d], b: &[Point2d]) -> bool {
    to_geo(a).intersects(&to_geo(b))
}

/// Computes the unsigned area of a polygon ring.
pub fn polygon_area(ring: &[Point2d]) -> f64 {
    to_geo(ring).unsigned_area()
}
