use anyhow::Context;
use bridge::bridge::{default_bind_address, Bridge};
use clap::{Parser, ValueEnum};
use generator::profile::{build_profile, ProfileConfig};
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use surveygrid::prelude::{DistanceOrdering, EngineConfig, ExportSelection, IdPolicyKind};
use surveygrid::table::{Delimiter, Encoding};
use surveygrid::ResampleAxis;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::{WorkflowConfig, DEFAULT_PRECISION};
use workflow::runner::{load_points, Runner};

mod bridge;
mod generator;
mod workflow;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum IdPolicyArg {
    Counter,
    PairLabel,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AxisArg {
    Elevation,
    Distance,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrderingArg {
    Preserve,
    Radius,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportArg {
    Filtered,
    Full,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Delimited,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DelimiterArg {
    Comma,
    Tab,
    Space,
}

#[derive(Parser)]
#[command(author, version, about = "Resample and filter survey points on a regular grid")]
struct Args {
    /// Point table to process (CSV or whitespace-delimited)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Where to write the result; stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
    /// Load a workflow config from YAML instead of the flags below
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Grid spacing for elevation targets
    #[arg(long, default_value_t = 0.1)]
    step: f64,
    /// Half-width of the match band around each target
    #[arg(long, default_value_t = 0.0)]
    tolerance: f64,
    /// Insert resampled points before filtering
    #[arg(long, default_value_t = false)]
    interpolate: bool,
    #[arg(long, value_enum, default_value_t = AxisArg::Elevation)]
    axis: AxisArg,
    /// Arc-length spacing for distance resampling
    #[arg(long)]
    interp_step: Option<f64>,
    #[arg(long, value_enum, default_value_t = OrderingArg::Preserve)]
    ordering: OrderingArg,
    #[arg(long, value_enum, default_value_t = IdPolicyArg::Counter)]
    id_policy: IdPolicyArg,
    #[arg(long, default_value_t = 5000)]
    start_id: i64,
    /// Omit the provenance column on interpolated points
    #[arg(long, default_value_t = false)]
    no_source: bool,
    /// Sort interpolated points by elevation instead of traversal order
    #[arg(long, default_value_t = false)]
    sort_output: bool,
    /// Keep distance-mode output in original-then-sample order
    #[arg(long, default_value_t = false)]
    no_sort_merged: bool,
    /// Skip the tolerance filter
    #[arg(long, default_value_t = false)]
    no_filter: bool,
    #[arg(long, value_enum, default_value_t = ExportArg::Filtered)]
    export: ExportArg,
    #[arg(long, value_enum, default_value_t = FormatArg::Delimited)]
    format: FormatArg,
    #[arg(long, value_enum, default_value_t = DelimiterArg::Comma)]
    delimiter: DelimiterArg,
    /// Decimal places for every written coordinate
    #[arg(long, default_value_t = DEFAULT_PRECISION)]
    precision: usize,
    /// Process a generated survey line instead of --input
    #[arg(long, default_value_t = false)]
    demo: bool,
    /// Host the HTTP endpoint until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long)]
    bind: Option<SocketAddr>,
}

impl Args {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            step: self.step,
            tolerance: self.tolerance,
            start_id: self.start_id,
            id_policy: match self.id_policy {
                IdPolicyArg::Counter => IdPolicyKind::Counter,
                IdPolicyArg::PairLabel => IdPolicyKind::PairLabel,
            },
            record_source: !self.no_source,
            interpolation_enabled: self.interpolate,
            interpolation_axis: match self.axis {
                AxisArg::Elevation => ResampleAxis::Elevation,
                AxisArg::Distance => ResampleAxis::Distance,
            },
            interp_step: self.interp_step,
            distance_ordering: match self.ordering {
                OrderingArg::Preserve => DistanceOrdering::PreserveOrder,
                OrderingArg::Radius => DistanceOrdering::SortByRadius,
            },
            sort_output: self.sort_output,
            sort_merged: !self.no_sort_merged,
            filter_enabled: !self.no_filter,
            export: match self.export {
                ExportArg::Filtered => ExportSelection::Filtered,
                ExportArg::Full => ExportSelection::Full,
            },
        }
    }

    fn encoding(&self) -> Encoding {
        match self.format {
            FormatArg::Delimited => Encoding::Delimited,
            FormatArg::Json => Encoding::Json,
        }
    }

    fn delimiter(&self) -> Delimiter {
        match self.delimiter {
            DelimiterArg::Comma => Delimiter::Comma,
            DelimiterArg::Tab => Delimiter::Tab,
            DelimiterArg::Space => Delimiter::Space,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        let mut config =
            WorkflowConfig::from_args(args.engine_config(), args.delimiter(), args.precision);
        config.output.encoding = args.encoding();
        config
    };
    let runner = Runner::new(workflow_config)?;

    if args.serve {
        let bridge = Bridge::new(Arc::new(runner));
        let address = args.bind.unwrap_or_else(default_bind_address);
        bridge.spawn(address);
        eprintln!("HTTP bridge on http://{} (Ctrl+C to stop)...", address);
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
        return Ok(());
    }

    let points = if args.demo {
        build_profile(&ProfileConfig::default())?
    } else {
        let path = args
            .input
            .as_ref()
            .context("--input is required unless --demo or --serve is given")?;
        load_points(path)?
    };

    let result = runner.execute(&points)?;
    eprintln!("{} -> {}", points.len(), result.summary());

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            fs::write(path, &result.table)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        None => print!("{}", result.table),
    }

    Ok(())
}
