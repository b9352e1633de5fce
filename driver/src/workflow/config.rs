use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use surveygrid::prelude::EngineConfig;
use surveygrid::table::{Delimiter, OutputFormat};

/// Decimal places written when neither the CLI nor a workflow file says otherwise.
pub const DEFAULT_PRECISION: usize = 4;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkflowConfig {
    pub engine: EngineConfig,
    pub output: OutputFormat,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            output: OutputFormat::new(Delimiter::Comma, DEFAULT_PRECISION),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config
            .engine
            .validate()
            .with_context(|| format!("validating workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(engine: EngineConfig, delimiter: Delimiter, precision: usize) -> Self {
        Self {
            engine,
            output: OutputFormat::new(delimiter, precision),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use surveygrid::prelude::{ExportSelection, IdPolicyKind};
    use surveygrid::table::Encoding;
    use surveygrid::ResampleAxis;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_keeps_output_format() {
        let cfg = WorkflowConfig::from_args(EngineConfig::default(), Delimiter::Tab, 6);
        assert_eq!(cfg.output.precision, 6);
        assert_eq!(cfg.output.delimiter, Delimiter::Tab);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"engine:\n  step: 0.5\n  tolerance: 0.05\n  id_policy: pair-label\n  interpolation_enabled: true\n  interpolation_axis: distance\n  interp_step: 2.0\n  export: full\noutput:\n  delimiter: space\n  precision: 10\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.engine.step, 0.5);
        assert_eq!(cfg.engine.id_policy, IdPolicyKind::PairLabel);
        assert_eq!(cfg.engine.interpolation_axis, ResampleAxis::Distance);
        assert_eq!(cfg.engine.export, ExportSelection::Full);
        assert_eq!(cfg.engine.start_id, 5000);
        assert_eq!(cfg.output.precision, 10);
    }

    #[test]
    fn config_load_fills_missing_sections() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"engine:\n  step: 0.25\n").unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.output.precision, DEFAULT_PRECISION);
        assert_eq!(cfg.engine.tolerance, 0.0);
    }

    #[test]
    fn config_load_reads_json_encoding() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"output:\n  delimiter: comma\n  precision: 3\n  encoding: json\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.output.encoding, Encoding::Json);
    }

    #[test]
    fn config_load_rejects_bad_step() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"engine:\n  step: 0\n").unwrap();
        let path = temp.into_temp_path();
        let err = WorkflowConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("step must be > 0"));
    }
}
