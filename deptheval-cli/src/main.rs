use clap::Parser;
use deptheval::{
    AlignParams, EvalConfig, EvaluationReport, Evaluator, NamingConvention, RunOutcome,
    SsimParams,
};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Depth map evaluation CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Directory of reference depth maps (overrides the config).
    #[arg(long, value_name = "DIR")]
    reference_dir: Option<PathBuf>,
    /// Directory of candidate depth maps (overrides the config).
    #[arg(long, value_name = "DIR")]
    candidate_dir: Option<PathBuf>,
    /// Output CSV path (overrides the config).
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Evaluate pairs in parallel.
    #[arg(long)]
    parallel: bool,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct NamingConfigJson {
    candidate_suffix: String,
    intermediate_extension: Option<String>,
    reference_extension: String,
}

impl Default for NamingConfigJson {
    fn default() -> Self {
        let naming = NamingConvention::default();
        Self {
            candidate_suffix: naming.candidate_suffix,
            intermediate_extension: naming.intermediate_extension,
            reference_extension: naming.reference_extension,
        }
    }
}

impl From<NamingConfigJson> for NamingConvention {
    fn from(value: NamingConfigJson) -> Self {
        Self {
            candidate_suffix: value.candidate_suffix,
            intermediate_extension: value.intermediate_extension,
            reference_extension: value.reference_extension,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct AlignConfigJson {
    epsilon: f64,
}

impl Default for AlignConfigJson {
    fn default() -> Self {
        Self {
            epsilon: AlignParams::default().epsilon,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SsimConfigJson {
    window_size: usize,
    k1: f64,
    k2: f64,
}

impl Default for SsimConfigJson {
    fn default() -> Self {
        let cfg = SsimParams::default();
        Self {
            window_size: cfg.window_size,
            k1: cfg.k1,
            k2: cfg.k2,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    reference_dir: PathBuf,
    candidate_dir: PathBuf,
    output_path: PathBuf,
    parallel: bool,
    naming: NamingConfigJson,
    align: AlignConfigJson,
    ssim: SsimConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reference_dir: PathBuf::from("depth"),
            candidate_dir: PathBuf::from("depth_pngs_colmap"),
            output_path: PathBuf::from("depth_metrics.csv"),
            parallel: false,
            naming: NamingConfigJson::default(),
            align: AlignConfigJson::default(),
            ssim: SsimConfigJson::default(),
        }
    }
}

impl Config {
    fn into_eval_config(self, cli: &Cli) -> EvalConfig {
        EvalConfig {
            reference_dir: cli.reference_dir.clone().unwrap_or(self.reference_dir),
            candidate_dir: cli.candidate_dir.clone().unwrap_or(self.candidate_dir),
            output_path: cli.output.clone().unwrap_or(self.output_path),
            naming: self.naming.into(),
            align: AlignParams {
                epsilon: self.align.epsilon,
            },
            ssim: SsimParams {
                window_size: self.ssim.window_size,
                k1: self.ssim.k1,
                k2: self.ssim.k2,
            },
            parallel: self.parallel || cli.parallel,
        }
    }
}

/// Per-pair lines: unmatched warnings first, then one line per pair in pair order.
fn pair_lines(report: &EvaluationReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .unmatched
        .iter()
        .map(|miss| {
            format!(
                "⚠ warning: no reference for {} → expected {}",
                miss.file_name, miss.expected_reference
            )
        })
        .collect();
    lines.extend(report.outcomes.iter().map(|outcome| match outcome {
        Ok(record) => format!(
            "✔ {}: PSNR={:.2}, SSIM={:.3}",
            record.image, record.psnr, record.ssim
        ),
        Err(failure) => format!("⚠ {} error: {}", failure.key, failure.reason),
    }));
    lines
}

fn print_report(report: &EvaluationReport) {
    for line in pair_lines(report) {
        println!("{line}");
    }

    let summary = report.summary();
    if summary.count == 0 {
        return;
    }
    println!(
        "\n{} of {} pairs evaluated ({} skipped)",
        summary.count,
        report.matched,
        report.failures().len()
    );
    if let Some(rmse) = summary.mean_rmse {
        println!("mean RMSE = {rmse:.4}");
    }
    match summary.mean_psnr {
        Some(psnr) => println!(
            "mean PSNR = {psnr:.2} dB ({} exact matches excluded)",
            summary.psnr_infinite
        ),
        None if summary.psnr_infinite > 0 => println!("mean PSNR = inf"),
        None => {}
    }
    if let Some(ssim) = summary.mean_ssim {
        println!("mean SSIM = {ssim:.3}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("deptheval=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config: Config = match &cli.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    let eval_config = config.into_eval_config(&cli);
    let evaluator = Evaluator::new(eval_config)?;

    match evaluator.run()? {
        RunOutcome::Written { path, report } => {
            print_report(&report);
            println!("\nDone! Metrics saved to {}", path.display());
        }
        RunOutcome::EmptyBatch { report } => {
            print_report(&report);
            let cfg = evaluator.config();
            if report.matched == 0 {
                println!(
                    "No matching pairs found in {} vs {}",
                    cfg.candidate_dir.display(),
                    cfg.reference_dir.display()
                );
            } else {
                println!("No pair could be evaluated; no output written");
            }
        }
    }

    Ok(())
}
