use anyhow::Context;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use surveygrid::{Point, PointSequence};

/// Configuration for generating a synthetic descending survey line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub points: usize,
    pub first_id: i64,
    pub top_elevation: f64,
    /// Mean elevation drop between consecutive stations.
    pub descent: f64,
    /// Horizontal spacing between stations.
    pub spacing: f64,
    /// Half-width of the uniform elevation jitter.
    pub noise: f64,
    pub seed: u64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            points: 25,
            first_id: 1,
            top_elevation: 100.0,
            descent: 0.35,
            spacing: 2.0,
            noise: 0.05,
            seed: 0,
        }
    }
}

impl ProfileConfig {
    fn normalized_points(&self) -> usize {
        self.points.max(2)
    }
}

pub fn build_profile(config: &ProfileConfig) -> anyhow::Result<PointSequence> {
    let count = config.normalized_points();
    let last_id = config
        .first_id
        .checked_add(count as i64)
        .context("overflow computing station ids for generator")?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut points = Vec::with_capacity(count);

    for (index, id) in (config.first_id..last_id).enumerate() {
        let station = index as f64;
        let jitter = if config.noise > 0.0 {
            rng.gen_range(-config.noise..config.noise)
        } else {
            0.0
        };
        let north = station * config.spacing;
        let east = (station * 0.3).sin() * config.spacing;
        let elevation = config.top_elevation - station * config.descent + jitter;
        points.push(Point::new(id, north, east, elevation));
    }

    Ok(PointSequence::new(points))
}
