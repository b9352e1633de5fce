use crate::math::geometry::{cumulative_distances, horizontal_radius};
use crate::survey::point::{Point, ResampleAxis};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Ordered list of points; order defines the polyline segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointSequence {
    points: Vec<Point>,
    /// Names of caller columns carried through in `Point::extras`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    extra_columns: Vec<String>,
}

impl PointSequence {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            extra_columns: Vec::new(),
        }
    }

    pub fn with_extra_columns(points: Vec<Point>, extra_columns: Vec<String>) -> Self {
        Self {
            points,
            extra_columns,
        }
    }

    /// Empty sequence that keeps this sequence's column layout.
    pub fn empty_like(&self) -> Self {
        Self::with_extra_columns(Vec::new(), self.extra_columns.clone())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn extend(&mut self, other: PointSequence) {
        self.points.extend(other.points);
    }

    /// Lowest and highest elevation, `None` when empty.
    pub fn elevation_range(&self) -> Option<(f64, f64)> {
        self.points.iter().fold(None, |range, point| match range {
            None => Some((point.z, point.z)),
            Some((lo, hi)) => Some((lo.min(point.z), hi.max(point.z))),
        })
    }

    /// Stable sort by the given axis; points without a value sort last.
    pub fn sort_by_axis(&mut self, axis: ResampleAxis) {
        self.points.sort_by(|a, b| match (a.scalar(axis), b.scalar(axis)) {
            (Some(lhs), Some(rhs)) => lhs.total_cmp(&rhs),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
    }

    /// Stable sort by horizontal distance from the origin.
    pub fn sort_by_radius(&mut self) {
        self.points
            .sort_by(|a, b| horizontal_radius(a).total_cmp(&horizontal_radius(b)));
    }

    /// Copy of the sequence with `distance` set to the cumulative 3-D arc length.
    pub fn with_cumulative_distance(&self) -> Self {
        let distances = cumulative_distances(&self.points);
        let points = self
            .points
            .iter()
            .zip(distances)
            .map(|(point, distance)| Point {
                distance: Some(distance),
                ..point.clone()
            })
            .collect();
        Self::with_extra_columns(points, self.extra_columns.clone())
    }
}

impl FromIterator<Point> for PointSequence {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for PointSequence {
    type Item = Point;
    type IntoIter = std::vec::IntoIter<Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a PointSequence {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
