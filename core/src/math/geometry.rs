use crate::survey::Point;

/// Straight-line distance between two points over all three axes.
pub fn euclidean(a: &Point, b: &Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let dz = b.z - a.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Horizontal distance of a point from the origin.
pub fn horizontal_radius(point: &Point) -> f64 {
    point.x.hypot(point.y)
}

/// Running arc length along the polyline, starting at zero.
pub fn cumulative_distances(points: &[Point]) -> Vec<f64> {
    let mut distances = Vec::with_capacity(points.len());
    let mut total = 0.0;
    for (idx, point) in points.iter().enumerate() {
        if idx > 0 {
            total += euclidean(&points[idx - 1], point);
        }
        distances.push(total);
    }
    distances
}
