use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use cndc_core::acquisition::release_urls;
use cndc_core::aggregate::{summary_stats_with, system_overview};
use cndc_core::discovery::{discover_inputs, unpack_archives};
use cndc_core::frame::write_dataset;
use cndc_core::outputs::{write_manifest, write_summary_csv};
use cndc_core::selection::{filter_periods, period_bounds, PeriodRange};
use cndc_core::{ingest_family, CanonicalPeriod, IngestionBatch, Layout, PipelineConfig};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "CNDC monthly statistics pipeline", long_about = None)]
struct Cli {
    /// Pipeline configuration (TOML). Falls back to CNDC_CONFIG, then built-in defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the configured metric families
    Families,
    /// Print the release URLs for a range of months
    Plan(PlanArgs),
    /// Extract downloaded release archives in place
    Unpack {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Ingest every release in a directory and write the long-form dataset
    Build(BuildArgs),
    /// Print per-entity summary statistics for one family
    Summary(SummaryArgs),
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// First month, YYYY-MM
    #[arg(long, value_parser = parse_month)]
    from: CanonicalPeriod,
    /// Last month, YYYY-MM
    #[arg(long, value_parser = parse_month)]
    to: CanonicalPeriod,
}

#[derive(Args, Debug)]
struct RangeArgs {
    /// Keep months from this one on, YYYY-MM
    #[arg(long, value_parser = parse_month)]
    from: Option<CanonicalPeriod>,
    /// Keep months up to this one, YYYY-MM
    #[arg(long, value_parser = parse_month)]
    to: Option<CanonicalPeriod>,
}

#[derive(Args, Debug)]
struct BuildArgs {
    #[arg(short, long)]
    family: String,
    #[arg(short, long)]
    input: PathBuf,
    /// Output file; `.parquet` or `.csv`
    #[arg(short, long)]
    output: PathBuf,
    /// Write the per-file ingestion report here as JSON
    #[arg(long)]
    manifest: Option<PathBuf>,
    #[command(flatten)]
    range: RangeArgs,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    #[arg(short, long)]
    family: String,
    #[arg(short, long)]
    input: PathBuf,
    /// Identifier column to summarize by, e.g. GENERADOR
    #[arg(short, long)]
    entity: String,
    /// Also write the table as CSV
    #[arg(long)]
    csv: Option<PathBuf>,
    #[command(flatten)]
    range: RangeArgs,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Families => {
            print_families(&config);
            Ok(())
        }
        Command::Plan(args) => {
            for release in release_urls(&config.acquisition, args.from, args.to) {
                println!("{}\t{}\t{}", release.period, release.archive, release.workbook);
            }
            Ok(())
        }
        Command::Unpack { input } => {
            let report = unpack_archives(&input)
                .with_context(|| format!("failed to unpack archives in {}", input.display()))?;
            info!(
                extracted = report.extracted.len(),
                failed = report.failed.len(),
                "unpack finished"
            );
            for (archive, reason) in &report.failed {
                eprintln!("could not unpack {}: {reason}", archive.display());
            }
            Ok(())
        }
        Command::Build(args) => run_build(&config, args),
        Command::Summary(args) => run_summary(&config, args),
    }
}

fn load_config(explicit: Option<&Path>) -> Result<PipelineConfig> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("CNDC_CONFIG").map(PathBuf::from));
    match path {
        Some(path) => {
            info!(config = %path.display(), "loading configuration");
            PipelineConfig::load(&path)
                .with_context(|| format!("failed to load config {}", path.display()))
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn parse_month(raw: &str) -> std::result::Result<CanonicalPeriod, String> {
    NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
        .map(CanonicalPeriod::containing)
        .map_err(|err| format!("expected YYYY-MM, got '{raw}': {err}"))
}

fn ingest(config: &PipelineConfig, family: &str, input: &Path) -> Result<IngestionBatch> {
    let paths = discover_inputs(input, config)
        .with_context(|| format!("failed to list releases in {}", input.display()))?;
    if paths.is_empty() {
        bail!("no release workbooks found in {}", input.display());
    }

    let batch = ingest_family(&paths, family, config)?;
    for problem in batch.problems() {
        warn!(
            file = %problem.path,
            status = ?problem.status,
            message = problem.message.as_deref().unwrap_or_default(),
            "release skipped"
        );
    }
    Ok(batch)
}

fn restrict(batch: &mut IngestionBatch, range: &RangeArgs) {
    if range.from.is_none() && range.to.is_none() {
        return;
    }
    let Some(bounds) = period_bounds(&batch.dataset) else {
        return;
    };
    let selected = PeriodRange::new(
        range.from.unwrap_or(bounds.start),
        range.to.unwrap_or(bounds.end),
    );
    batch.dataset = filter_periods(&batch.dataset, selected);
}

fn run_build(config: &PipelineConfig, args: BuildArgs) -> Result<()> {
    let mut batch = ingest(config, &args.family, &args.input)?;
    restrict(&mut batch, &args.range);

    if let Some(manifest) = &args.manifest {
        write_manifest(&batch, manifest)
            .with_context(|| format!("failed to write manifest {}", manifest.display()))?;
    }
    if batch.dataset.is_empty() {
        bail!("family '{}' produced no rows", args.family);
    }
    write_dataset(&batch.dataset, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!(
        "{}: {} rows from {} files ({} skipped) -> {}",
        batch.family,
        batch.dataset.len(),
        batch.reports.len(),
        batch.problems().count(),
        args.output.display()
    );
    Ok(())
}

fn run_summary(config: &PipelineConfig, args: SummaryArgs) -> Result<()> {
    let family = config.family(&args.family)?;
    let mut batch = ingest(config, &args.family, &args.input)?;
    restrict(&mut batch, &args.range);

    let overview = system_overview(&batch.dataset);
    let summaries = summary_stats_with(&batch.dataset, &args.entity, family.aggregate)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        args.entity.as_str(),
        "Months",
        "Min",
        "Mean",
        "Max",
        "Avg share %",
    ]);
    for summary in &summaries {
        table.add_row(vec![
            summary.entity.clone(),
            summary.periods.to_string(),
            format_value(summary.min),
            format_value(summary.mean),
            format_value(summary.max),
            format_value(summary.average_share),
        ]);
    }

    let span = match (overview.first_period, overview.last_period) {
        (Some(first), Some(last)) => format!("{first} .. {last}"),
        _ => "no data".to_string(),
    };
    println!(
        "{} ({}): {} rows, {span}",
        batch.family, family.value_name, overview.rows
    );
    println!("{table}");

    if let Some(csv) = &args.csv {
        write_summary_csv(&summaries, csv)
            .with_context(|| format!("failed to write {}", csv.display()))?;
    }
    Ok(())
}

fn print_families(config: &PipelineConfig) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Family", "Value", "Identifiers", "Layout", "Aggregate"]);
    for (name, family) in &config.families {
        let layout = match &family.layout {
            Layout::Wide { metric_fragment } => format!("wide: '{metric_fragment}'"),
            Layout::PeriodColumn { period_field, .. } => {
                format!("period column: {}", period_field.name)
            }
        };
        table.add_row(vec![
            name.clone(),
            family.value_name.clone(),
            family.identifier_columns().join(", "),
            layout,
            format!("{:?}", family.aggregate).to_lowercase(),
        ]);
    }
    println!("{table}");
}

fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}
