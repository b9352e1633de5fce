use crate::workflow::config::WorkflowConfig;
use serde::{Deserialize, Serialize};
use surveygrid::{Point, RunStatus};

/// Body of `POST /process`: a raw point table and an optional per-request config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub table: String,
    #[serde(default)]
    pub config: Option<WorkflowConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub status: RunStatus,
    pub rows: usize,
    pub generated: usize,
    pub points: Vec<Point>,
    /// Selected rows rendered in the request's output format.
    pub table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
