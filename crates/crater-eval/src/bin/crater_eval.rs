//! crater-eval CLI: extract circles from rim masks and score them against ground truth.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use crater_eval::core::level_from_verbosity;
use crater_eval::detect::CircleExtractor;
use crater_eval::io::{self, Dataset, EvalReport, ExtractionReport};
use crater_eval::mask_image::open_mask;
use crater_eval::metrics::{binary_cross_entropy, EvalConfig, Evaluator};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "crater-eval")]
#[command(about = "Evaluate crater rim masks: ring template extraction, matching and precision/recall")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit tracing events as JSON lines (builds with the `tracing` feature).
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract circles from a single mask image.
    Extract(ExtractArgs),

    /// Evaluate a dataset manifest and print summary statistics.
    Evaluate(EvaluateArgs),

    /// Print or write the default evaluation config.
    DefaultConfig {
        /// Write the config here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Args)]
struct ExtractArgs {
    /// Square grayscale rim mask (intensity / 255 = probability).
    #[arg(long)]
    mask: PathBuf,

    /// Evaluation config; only the `extract` section is used.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write circles as JSON instead of printing them.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct EvaluateArgs {
    /// Dataset manifest (JSON).
    #[arg(long)]
    dataset: PathBuf,

    /// Evaluation config (JSON); defaults are used for missing fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override `min_images_for_summary`.
    #[arg(long)]
    min_images: Option<usize>,

    /// Override the F-score beta.
    #[arg(long)]
    beta: Option<f64>,

    /// Write the full report (config, per-image outcomes, summary) as JSON.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn load_config(path: Option<&Path>) -> CliResult<EvalConfig> {
    match path {
        Some(path) => Ok(io::load_config(path)?),
        None => Ok(EvalConfig::default()),
    }
}

fn init_logging(cli: &Cli) -> CliResult<()> {
    let level = level_from_verbosity(cli.verbose);
    #[cfg(feature = "tracing")]
    {
        tracing_log::LogTracer::init()?;
        crater_eval::core::init_tracing(cli.log_json, level);
    }
    #[cfg(not(feature = "tracing"))]
    {
        crater_eval::core::init_with_level(level)?;
        if cli.log_json {
            log::warn!("--log-json needs the `tracing` feature; using plain logs");
        }
    }
    Ok(())
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    match cli.command {
        Commands::Extract(args) => run_extract(&args),
        Commands::Evaluate(args) => run_evaluate(&args),
        Commands::DefaultConfig { out } => run_default_config(out.as_deref()),
    }
}

// ── extract ────────────────────────────────────────────────────────────

fn run_extract(args: &ExtractArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    let mask = open_mask(&args.mask)?;
    log::info!("loaded mask {} ({}x{})", args.mask.display(), mask.dim(), mask.dim());

    let circles = CircleExtractor::new(config.extract).extract_scored(&mask.view());
    log::info!("extracted {} circles", circles.len());

    match &args.out {
        Some(out) => {
            let report = ExtractionReport {
                mask_path: args.mask.clone(),
                dim: mask.dim(),
                circles,
            };
            io::write_json(out, &report)?;
            println!("wrote {} circles to {}", report.circles.len(), out.display());
        }
        None => {
            println!("x,y,r,score");
            for c in &circles {
                println!(
                    "{},{},{},{:.4}",
                    c.circle.x, c.circle.y, c.circle.r, c.score
                );
            }
        }
    }
    Ok(())
}

// ── evaluate ───────────────────────────────────────────────────────────

fn run_evaluate(args: &EvaluateArgs) -> CliResult<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(n) = args.min_images {
        config.min_images_for_summary = n;
    }
    if let Some(beta) = args.beta {
        config.beta = beta;
    }

    let dataset = Dataset::load(&args.dataset)?;
    let masks = dataset.load_masks()?;
    let views: Vec<_> = masks.iter().map(|m| m.view()).collect();
    log::info!(
        "evaluating {} masks of {}x{} from {}",
        masks.len(),
        dataset.dim,
        dataset.dim,
        args.dataset.display()
    );

    let binary_xe = match dataset.load_targets()? {
        Some(targets) => {
            let target_views: Vec<_> = targets.iter().map(|t| t.view()).collect();
            let xe = binary_cross_entropy(&views, &target_views)?;
            log::info!("binary XE score = {xe:.6}");
            Some(xe)
        }
        None => None,
    };

    let evaluator = Evaluator::new(config);
    let statistics = evaluator.evaluate(&views, &dataset.ground_truth(), dataset.dim)?;
    statistics.log_summary();

    if let Some(xe) = binary_xe {
        println!("binary XE score = {xe:.6}");
    }
    print!("{statistics}");

    if let Some(out) = &args.out {
        let report = EvalReport {
            config: evaluator.config().clone(),
            ids: dataset.ids(),
            binary_xe,
            statistics,
        };
        report.write(out)?;
        println!("report written to {}", out.display());
    }
    Ok(())
}

// ── default-config ─────────────────────────────────────────────────────

fn run_default_config(out: Option<&Path>) -> CliResult<()> {
    let config = EvalConfig::default();
    match out {
        Some(path) => {
            io::write_config(path, &config)?;
            println!("default config written to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&config)?),
    }
    Ok(())
}
