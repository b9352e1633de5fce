use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use std::fs;
use std::path::Path;
use surveygrid::table::{read_points, render};
use surveygrid::{EngineOutput, Pipeline, PointSequence, RunStatus};

pub struct WorkflowResult {
    pub output: EngineOutput,
    /// Selected sequence rendered in the configured output format.
    pub table: String,
}

impl WorkflowResult {
    pub fn rows(&self) -> usize {
        self.output.selected().len()
    }

    pub fn summary(&self) -> String {
        match self.output.status {
            RunStatus::Completed => format!(
                "{} rows written ({} generated, {} in full table)",
                self.rows(),
                self.output.generated_count,
                self.output.full.len()
            ),
            RunStatus::NoPointsFound => "No points found".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Runner {
    config: WorkflowConfig,
    pipeline: Pipeline,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> anyhow::Result<Self> {
        let pipeline = Pipeline::new(config.engine.clone()).context("configuring pipeline")?;
        Ok(Self { config, pipeline })
    }

    pub fn execute(&self, points: &PointSequence) -> anyhow::Result<WorkflowResult> {
        let output = self.pipeline.run(points).context("running pipeline")?;
        let table = render(output.selected(), &self.config.output).context("rendering output")?;
        Ok(WorkflowResult { output, table })
    }

    pub fn execute_text(&self, text: &str) -> anyhow::Result<WorkflowResult> {
        let points = read_points(text).context("reading point table")?;
        self.execute(&points)
    }
}

pub fn load_points<P: AsRef<Path>>(path: P) -> anyhow::Result<PointSequence> {
    let path_ref = path.as_ref();
    let text = fs::read_to_string(path_ref)
        .with_context(|| format!("reading point table {}", path_ref.display()))?;
    read_points(&text).with_context(|| format!("parsing point table {}", path_ref.display()))
}
