use crate::prelude::{EngineError, EngineResult};
use crate::survey::{Point, PointId, PointSequence};

/// Canonical names of the four required columns, in positional order.
pub const CANONICAL_COLUMNS: [&str; 4] = ["Point", "North", "East", "Elevation"];

const ALIASES: [&[&str]; 4] = [
    &["point", "id"],
    &["north", "x"],
    &["east", "y"],
    &["elevation", "z"],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separator {
    Comma,
    Whitespace,
}

impl Separator {
    fn detect(line: &str) -> Self {
        if line.contains(',') {
            Separator::Comma
        } else {
            Separator::Whitespace
        }
    }

    fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            Separator::Comma => line.split(',').map(str::trim).collect(),
            Separator::Whitespace => line.split_whitespace().collect(),
        }
    }
}

/// Where each canonical column and each pass-through column sits in a row.
struct ColumnMap {
    required: [usize; 4],
    extras: Vec<(usize, String)>,
    width: usize,
}

impl ColumnMap {
    fn from_header(fields: &[&str]) -> EngineResult<Self> {
        let mut required = [usize::MAX; 4];
        let mut missing = Vec::new();
        for (slot, aliases) in ALIASES.iter().enumerate() {
            match fields
                .iter()
                .position(|field| aliases.contains(&field.trim().to_lowercase().as_str()))
            {
                Some(position) => required[slot] = position,
                None => missing.push(CANONICAL_COLUMNS[slot].to_string()),
            }
        }
        if !missing.is_empty() {
            missing.sort();
            return Err(EngineError::MissingColumns(missing));
        }

        let extras = fields
            .iter()
            .enumerate()
            .filter(|(position, _)| !required.contains(position))
            .map(|(position, name)| (position, name.trim().to_string()))
            .collect();
        Ok(Self {
            required,
            extras,
            width: fields.len(),
        })
    }

    fn positional(width: usize) -> EngineResult<Self> {
        if width < CANONICAL_COLUMNS.len() {
            let mut missing: Vec<String> = CANONICAL_COLUMNS[width..]
                .iter()
                .map(|name| name.to_string())
                .collect();
            missing.sort();
            return Err(EngineError::MissingColumns(missing));
        }
        let extras = (CANONICAL_COLUMNS.len()..width)
            .map(|position| (position, format!("Column{}", position + 1)))
            .collect();
        Ok(Self {
            required: [0, 1, 2, 3],
            extras,
            width,
        })
    }
}

fn is_alias(field: &str) -> bool {
    let name = field.trim().to_lowercase();
    ALIASES.iter().any(|aliases| aliases.contains(&name.as_str()))
}

/// A header names at least one known column; anything else is data.
fn looks_like_header(fields: &[&str]) -> bool {
    fields.iter().any(|field| is_alias(field))
}

fn parse_coordinate(line: usize, column: &str, raw: &str) -> EngineResult<f64> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(EngineError::InvalidData {
            line,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

fn parse_row(line: usize, fields: &[&str], map: &ColumnMap) -> EngineResult<Point> {
    if fields.len() != map.width {
        return Err(EngineError::InvalidData {
            line,
            column: format!("expected {} fields", map.width),
            value: fields.join(" "),
        });
    }
    let [id_at, x_at, y_at, z_at] = map.required;
    let raw_id = fields[id_at];
    if raw_id.is_empty() {
        return Err(EngineError::InvalidData {
            line,
            column: CANONICAL_COLUMNS[0].to_string(),
            value: String::new(),
        });
    }

    let mut point = Point::new(
        PointId::parse(raw_id),
        parse_coordinate(line, CANONICAL_COLUMNS[1], fields[x_at])?,
        parse_coordinate(line, CANONICAL_COLUMNS[2], fields[y_at])?,
        parse_coordinate(line, CANONICAL_COLUMNS[3], fields[z_at])?,
    );
    point.extras = map
        .extras
        .iter()
        .map(|(position, _)| fields[*position].to_string())
        .collect();
    Ok(point)
}

/// Parses a delimited point table into the canonical point shape.
///
/// Comma-separated when the first non-blank line holds a comma, otherwise
/// whitespace-separated. A header row is recognised when it names any known
/// column; without one the first four columns are taken as Point, North,
/// East, Elevation.
pub fn read_points(text: &str) -> EngineResult<PointSequence> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim_start_matches('\u{feff}').trim()))
        .filter(|(_, line)| !line.is_empty());

    let (first_number, first_line) = match lines.next() {
        Some(first) => first,
        None => return Ok(PointSequence::default()),
    };
    let separator = Separator::detect(first_line);
    let first_fields = separator.split(first_line);

    let mut points = Vec::new();
    let map = if looks_like_header(&first_fields) {
        ColumnMap::from_header(&first_fields)?
    } else {
        let map = ColumnMap::positional(first_fields.len())?;
        points.push(parse_row(first_number, &first_fields, &map)?);
        map
    };

    for (number, line) in lines {
        points.push(parse_row(number, &separator.split(line), &map)?);
    }

    let extra_columns = map.extras.into_iter().map(|(_, name)| name).collect();
    Ok(PointSequence::with_extra_columns(points, extra_columns))
}
