use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a survey point: either a numeric station or a free label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    Int(i64),
    Label(String),
}

impl PointId {
    /// Integer text stays an integer, anything else becomes a label.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(value) => PointId::Int(value),
            Err(_) => PointId::Label(trimmed.to_string()),
        }
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointId::Int(value) => write!(f, "{}", value),
            PointId::Label(label) => f.write_str(label),
        }
    }
}

impl From<i64> for PointId {
    fn from(value: i64) -> Self {
        PointId::Int(value)
    }
}

impl From<i32> for PointId {
    fn from(value: i32) -> Self {
        PointId::Int(value.into())
    }
}

impl From<&str> for PointId {
    fn from(value: &str) -> Self {
        PointId::Label(value.to_string())
    }
}

/// Scalar a resampling run walks along.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleAxis {
    #[default]
    Elevation,
    Distance,
}

/// A survey point (X = North, Y = East, Z = Elevation) with derived attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_diff: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Values of caller columns the engine does not interpret, in table order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<String>,
}

impl Point {
    pub fn new(id: impl Into<PointId>, x: f64, y: f64, z: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            z,
            distance: None,
            target_value: None,
            elevation_diff: None,
            source: None,
            extras: Vec::new(),
        }
    }

    /// Value of the given axis; distance is only known once it has been assigned.
    pub fn scalar(&self, axis: ResampleAxis) -> Option<f64> {
        match axis {
            ResampleAxis::Elevation => Some(self.z),
            ResampleAxis::Distance => self.distance,
        }
    }

    pub fn coordinates(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_id_parse_keeps_integers() {
        assert_eq!(PointId::parse(" 42 "), PointId::Int(42));
        assert_eq!(PointId::parse("BH-1"), PointId::Label("BH-1".into()));
        assert_eq!(PointId::parse("1.5").to_string(), "1.5");
    }

    #[test]
    fn distance_scalar_is_unset_until_assigned() {
        let mut point = Point::new(1, 0.0, 0.0, 3.0);
        assert_eq!(point.scalar(ResampleAxis::Elevation), Some(3.0));
        assert_eq!(point.scalar(ResampleAxis::Distance), None);
        point.distance = Some(2.5);
        assert_eq!(point.scalar(ResampleAxis::Distance), Some(2.5));
    }
}
