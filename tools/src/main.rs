//! hopcost-runner: command-line driver for the cost-efficiency analysis.
//!
//! Usage:
//!   hopcost-runner --generate --save results --markdown report
//!   hopcost-runner --input samples.json --output-dir ./out

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use hopcost_core::{
    config::AnalysisConfig,
    engine::{AnalysisEngine, AnalysisResult},
    export::{resolve_export_path, write_chart_data, ResultDocument},
    report::{fmt_percent, fmt_points, write_markdown},
    sample::{CostType, TransferType},
};
use std::path::{Path, PathBuf};

const DESCRIPTION: &str = "Multi-hop transfer cost efficiency analysis";

#[derive(Parser, Debug)]
#[command(name = "hopcost-runner", version, about = DESCRIPTION)]
struct Cli {
    /// Input file with sample data (JSON)
    #[arg(short, long, conflicts_with = "generate")]
    input: Option<PathBuf>,

    /// Generate synthetic samples instead of loading them
    #[arg(short, long)]
    generate: bool,

    /// Directory for chart data and relative export names
    #[arg(short, long, default_value = "./efficiency_analysis_results")]
    output_dir: PathBuf,

    /// Save the result document as JSON under this name
    #[arg(short, long)]
    save: Option<String>,

    /// Export a Markdown report under this name
    #[arg(short, long)]
    markdown: Option<String>,

    /// Save the analyzed samples (ingestion format) under this name
    #[arg(long)]
    dump_samples: Option<String>,

    /// Analysis config file (JSON)
    #[arg(short, long)]
    config: Option<String>,

    /// Override the number of generated transfer sizes
    #[arg(long)]
    steps: Option<usize>,

    /// Override the multi-wallet recipient count
    #[arg(long)]
    recipients: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let started = Utc::now();

    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(steps) = cli.steps {
        config.generator.steps = steps;
    }
    if let Some(recipients) = cli.recipients {
        config.generator.multi_recipients = recipients;
    }
    config.check().context("Invalid analysis configuration")?;

    let mut engine = AnalysisEngine::new(config);
    match &cli.input {
        Some(path) => {
            engine
                .ingest_file(path)
                .with_context(|| format!("Could not load samples from '{}'", path.display()))?;
        }
        None => {
            if !cli.generate {
                log::info!("Neither --input nor --generate given; generating synthetic samples");
            }
            engine.generate();
        }
    }

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("Cannot create output directory '{}'", cli.output_dir.display()))?;

    let result = engine.analyze().context("Analysis failed")?;
    print_summary(&result, started);

    // Exports below are best-effort: the analysis already succeeded.
    let mut created: Vec<PathBuf> = Vec::new();
    match write_chart_data(&result, &cli.output_dir) {
        Ok(files) => created.extend(files),
        Err(e) => report_export_failure("chart data", &e),
    }
    if let Some(name) = &cli.save {
        let path = resolve_export_path(&cli.output_dir, name, "json");
        export(&mut created, &path, "JSON results", || {
            ResultDocument::new(result.clone(), DESCRIPTION).write(&path)
        });
    }
    if let Some(name) = &cli.markdown {
        let path = resolve_export_path(&cli.output_dir, name, "md");
        export(&mut created, &path, "Markdown report", || write_markdown(&result, &path));
    }
    if let Some(name) = &cli.dump_samples {
        let path = resolve_export_path(&cli.output_dir, name, "json");
        export(&mut created, &path, "sample dump", || engine.store().write_document(&path));
    }

    println!();
    println!("Created files:");
    for path in &created {
        println!("  - {}", path.display());
    }
    println!();
    let elapsed = Utc::now() - started;
    println!("Analysis completed successfully in {} ms.", elapsed.num_milliseconds());
    Ok(())
}

fn export(
    created: &mut Vec<PathBuf>,
    path: &Path,
    what: &str,
    write: impl FnOnce() -> hopcost_core::CoreResult<()>,
) {
    match write() {
        Ok(()) => created.push(path.to_path_buf()),
        Err(e) => report_export_failure(what, &e),
    }
}

fn report_export_failure(what: &str, error: &hopcost_core::AnalysisError) {
    log::error!("Failed to write {what}: {error}");
    eprintln!("Warning: could not write {what}: {error}");
}

fn print_summary(result: &AnalysisResult, started: DateTime<Utc>) {
    println!();
    println!("===== COST EFFICIENCY ANALYSIS =====");
    println!("Run started {}", started.format("%Y-%m-%d %H:%M:%S UTC"));

    for transfer_type in TransferType::ALL {
        let a = result.for_type(transfer_type);
        let i = &a.improvements;
        println!();
        println!("{} transfers:", transfer_type.label());
        println!("  efficiency (unoptimized):  {:.2}%", a.unoptimized.efficiency);
        println!("  efficiency (optimized):    {:.2}%", a.optimized.efficiency);
        println!("  efficiency gain:           {}", fmt_points(i.efficiency));
        println!("  cost reduction:            {}", fmt_percent(i.cost_reduction));
        println!(
            "  rent reduction:            {}",
            fmt_percent(i.cost_reduction_by_type.get(&CostType::Rent).copied())
        );
        println!("  time improvement:          {}", fmt_percent(i.time_improvement));
    }

    println!();
    println!("Scaling:");
    match &result.scaling.optimum {
        Some(optimum) => {
            println!("  optimal transfer size:     {:.2} units", optimum.amount_in_base_units);
            println!("  max efficiency gain:       {}", fmt_points(optimum.improvement));
        }
        None => println!("  (no scaling data available)"),
    }

    println!();
    println!("Summary:");
    println!(
        "  multi vs single efficiency delta: {}",
        fmt_points(result.comparison.efficiency_delta)
    );
    println!(
        "  average efficiency gain:          {}",
        fmt_points(result.average_efficiency_improvement())
    );
    println!(
        "  average cost reduction:           {}",
        fmt_percent(result.average_cost_reduction())
    );
    println!();
    println!("===== END OF ANALYSIS =====");
}
