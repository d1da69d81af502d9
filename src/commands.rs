//! Command implementations for tabrecon CLI

use crate::analyzer::analyze;
use crate::cli::{Commands, OutputFormat};
use crate::columns::compare_structure;
use crate::comparator::{compare_with_progress, ChunkStrategy, ProgressFn};
use crate::config::ReconConfig;
use crate::data::load_dataset;
use crate::dataset::Dataset;
use crate::duplicates::find_duplicates;
use crate::error::{ReconError, Result};
use crate::output::{JsonFormatter, PrettyPrinter};
use crate::progress::ProgressReporter;
use crate::report::{JsonReportRenderer, ReportPlan, ReportRenderer};
use crate::threshold::within_threshold;
use anyhow::Context;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Settings for the compare command after merging file and flags
#[derive(Debug, Clone)]
pub struct CompareArgs {
    pub source: PathBuf,
    pub target: PathBuf,
    pub keys: Vec<String>,
    pub chunk_size: Option<usize>,
    pub strategy: Option<String>,
    pub parallel: bool,
    pub config: Option<PathBuf>,
    pub max_value_mismatches: Option<usize>,
    pub max_source_only: Option<usize>,
    pub max_target_only: Option<usize>,
    pub report: Option<PathBuf>,
    pub format: String,
}

/// Execute a command
pub fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Compare {
            source,
            target,
            keys,
            chunk_size,
            strategy,
            parallel,
            config,
            max_value_mismatches,
            max_source_only,
            max_target_only,
            report,
            format,
        } => compare_command(CompareArgs {
            source,
            target,
            keys,
            chunk_size,
            strategy,
            parallel,
            config,
            max_value_mismatches,
            max_source_only,
            max_target_only,
            report,
            format,
        }),
        Commands::Structure {
            source,
            target,
            format,
        } => structure_command(&source, &target, &format),
        Commands::Duplicates { input, keys, format } => duplicates_command(&input, &keys, &format),
        Commands::Threshold {
            source_count,
            target_count,
            fraction,
            config,
            format,
        } => {
            let fraction = resolve_threshold_fraction(fraction, config.as_deref())?;
            threshold_command(source_count, target_count, fraction, &format)
        }
    }
}

fn parse_format(format: &str) -> Result<OutputFormat> {
    OutputFormat::parse(format).map_err(ReconError::invalid_input)
}

fn load(path: &Path, side: &str) -> Result<Dataset> {
    Ok(load_dataset(path).with_context(|| format!("Failed to load {} {}", side, path.display()))?)
}

/// Merge the settings file with command-line overrides
pub fn resolve_config(args: &CompareArgs) -> Result<ReconConfig> {
    let mut config = match &args.config {
        Some(path) => ReconConfig::load(path)?,
        None => ReconConfig::default(),
    };

    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(strategy) = &args.strategy {
        config.chunk_strategy = ChunkStrategy::parse(strategy)?;
    }
    if args.parallel {
        config.parallel = true;
    }
    if let Some(n) = args.max_value_mismatches {
        config.max_value_mismatches = n;
    }
    if let Some(n) = args.max_source_only {
        config.max_source_only = n;
    }
    if let Some(n) = args.max_target_only {
        config.max_target_only = n;
    }

    config.validate()?;
    Ok(config)
}

/// Tolerance for the threshold command: flag, then settings file, then default
pub fn resolve_threshold_fraction(fraction: Option<f64>, config: Option<&Path>) -> Result<f64> {
    let mut settings = match config {
        Some(path) => ReconConfig::load(path)?,
        None => ReconConfig::default(),
    };
    if let Some(fraction) = fraction {
        settings.threshold_fraction = fraction;
    }
    settings.validate()?;
    Ok(settings.threshold_fraction)
}

/// Compare two datasets, analyze the differences and print the result
fn compare_command(args: CompareArgs) -> Result<()> {
    let format = parse_format(&args.format)?;
    let config = resolve_config(&args)?;

    let interactive = format == OutputFormat::Pretty && std::io::stderr().is_terminal();
    let mut progress = if interactive {
        ProgressReporter::new_for_compare()
    } else {
        ProgressReporter::new_minimal()
    };

    let source = load(&args.source, "source")?;
    let target = load(&args.target, "target")?;
    progress.finish_loading(&format!(
        "Loaded {} source and {} target rows",
        source.len(),
        target.len()
    ));

    let options = config.compare_options(&args.keys);
    let comparison = {
        let hook = |done: u64, total: u64| progress.update_windows(done, total);
        let hook: Option<ProgressFn<'_>> = if progress.is_enabled() { Some(&hook) } else { None };
        compare_with_progress(&source, &target, &options, hook)?
    };
    progress.finish_windows("Comparison complete");
    drop(progress);

    let analysis = analyze(
        &comparison.diff_rows,
        &config.analyze_options(&comparison.key_columns),
        Some(&comparison.summary),
    )?;

    match format {
        OutputFormat::Pretty => PrettyPrinter::print_compare_results(&comparison, &analysis),
        OutputFormat::Json => println!("{}", JsonFormatter::format_compare_results(&comparison, &analysis)?),
    }

    if let Some(report_path) = &args.report {
        let plan = ReportPlan::build(&analysis, &config.analyze_options(&comparison.key_columns));
        JsonReportRenderer::new(report_path).render(&plan)?;
        if format == OutputFormat::Pretty {
            println!("\n💾 Report saved to: {}", report_path.display());
        }
    }

    Ok(())
}

/// Compare the column sets of two files
fn structure_command(source: &Path, target: &Path, format: &str) -> Result<()> {
    let format = parse_format(format)?;
    let source = load(source, "source")?;
    let target = load(target, "target")?;

    let structure = compare_structure(&source.columns(), &target.columns())?;
    match format {
        OutputFormat::Pretty => PrettyPrinter::print_structure(&structure),
        OutputFormat::Json => println!("{}", JsonFormatter::format(&structure)?),
    }
    Ok(())
}

/// List duplicate rows in one file
fn duplicates_command(input: &Path, keys: &[String], format: &str) -> Result<()> {
    let format = parse_format(format)?;
    let dataset = load(input, "input")?;

    let keys = if keys.is_empty() { None } else { Some(keys) };
    let report = find_duplicates(&dataset, keys)?;
    match format {
        OutputFormat::Pretty => PrettyPrinter::print_duplicates(&report),
        OutputFormat::Json => println!("{}", JsonFormatter::format(&report)?),
    }
    Ok(())
}

/// Check two row counts against a tolerance
fn threshold_command(source_count: u64, target_count: u64, fraction: f64, format: &str) -> Result<()> {
    let format = parse_format(format)?;
    let check = within_threshold(source_count, target_count, fraction);
    match format {
        OutputFormat::Pretty => PrettyPrinter::print_threshold(&check),
        OutputFormat::Json => println!("{}", JsonFormatter::format(&check)?),
    }
    Ok(())
}
