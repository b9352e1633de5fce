use log::{info, warn};

const TARGET: &str = "surveygrid";

/// Thin wrapper so stages log under one target.
pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!(target: TARGET, "{}", message);
    }

    pub fn caution(&self, message: &str) {
        warn!(target: TARGET, "{}", message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
