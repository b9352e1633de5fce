use crate::prelude::{EngineError, EngineResult};
use crate::survey::{Point, PointSequence};
use crate::table::reader::CANONICAL_COLUMNS;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
    Space,
}

impl Delimiter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Delimiter::Comma => ",",
            Delimiter::Tab => "\t",
            Delimiter::Space => " ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    #[default]
    Delimited,
    Json,
}

/// Text layout of a written table; every float is written with `precision` decimals.
///
/// JSON output ignores the delimiter and keeps full float precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFormat {
    pub delimiter: Delimiter,
    pub precision: usize,
    #[serde(default)]
    pub encoding: Encoding,
}

impl OutputFormat {
    pub fn new(delimiter: Delimiter, precision: usize) -> Self {
        Self {
            delimiter,
            precision,
            encoding: Encoding::Delimited,
        }
    }

    pub fn json() -> Self {
        Self {
            encoding: Encoding::Json,
            ..Self::new(Delimiter::Comma, 0)
        }
    }
}

type Cell = fn(&Point, usize) -> String;

fn number(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_default()
}

/// Derived columns, written only when some row carries a value.
static OPTIONAL_COLUMNS: [(&str, fn(&Point) -> bool, Cell); 4] = [
    ("Distance", |p| p.distance.is_some(), |p, prec| number(p.distance, prec)),
    ("Target", |p| p.target_value.is_some(), |p, prec| number(p.target_value, prec)),
    ("Elevation_Diff", |p| p.elevation_diff.is_some(), |p, prec| number(p.elevation_diff, prec)),
    ("Source", |p| p.source.is_some(), |p, _| p.source.clone().unwrap_or_default()),
];

/// Serializes points as delimited text with a header row.
pub fn write_points(points: &PointSequence, format: &OutputFormat) -> String {
    let separator = format.delimiter.as_str();
    let precision = format.precision;
    let optional: Vec<&(&str, fn(&Point) -> bool, Cell)> = OPTIONAL_COLUMNS
        .iter()
        .filter(|(_, present, _)| points.iter().any(|p| present(p)))
        .collect();

    let mut header: Vec<&str> = CANONICAL_COLUMNS.to_vec();
    header.extend(optional.iter().map(|(name, _, _)| *name));
    header.extend(points.extra_columns().iter().map(String::as_str));

    let mut out = header.join(separator);
    out.push('\n');

    for point in points.iter() {
        let mut row = vec![
            point.id.to_string(),
            number(Some(point.x), precision),
            number(Some(point.y), precision),
            number(Some(point.z), precision),
        ];
        row.extend(optional.iter().map(|(_, _, cell)| cell(point, precision)));
        // generated points carry no pass-through values
        row.extend(
            (0..points.extra_columns().len())
                .map(|idx| point.extras.get(idx).cloned().unwrap_or_default()),
        );
        out.push_str(&row.join(separator));
        out.push('\n');
    }
    out
}

/// Serializes points as a JSON array of records.
pub fn write_json(points: &PointSequence) -> EngineResult<String> {
    serde_json::to_string_pretty(points.points())
        .map_err(|err| EngineError::Internal(format!("serializing points: {}", err)))
}

/// Renders points in whichever encoding `format` selects.
pub fn render(points: &PointSequence, format: &OutputFormat) -> EngineResult<String> {
    match format.encoding {
        Encoding::Delimited => Ok(write_points(points, format)),
        Encoding::Json => write_json(points),
    }
}
