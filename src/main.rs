use clap::{Parser, Subcommand};
use feature_registration::config::{load_config_or_default, Config, ConfigFormat};
use feature_registration::data::{generate, ScenarioParams};
use feature_registration::logging::{init_logging, LoggingConfig};
use feature_registration::pipeline::RegistrationPipeline;
use feature_registration::registration::SimilarityTransform;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "register")]
#[command(about = "Robust 2D similarity registration from local feature correspondences")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a synthetic scenario with a known ground-truth transform
    Synth {
        /// Optional configuration file (TOML or JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Number of features shared between the two collections
        #[arg(long, default_value = "30")]
        shared: usize,

        /// Unrelated clutter features added to each collection
        #[arg(long, default_value = "20")]
        clutter: usize,

        /// Ground-truth rotation in radians
        #[arg(long, default_value = "0.02")]
        rotation: f64,

        /// Ground-truth uniform scale
        #[arg(long, default_value = "1.01")]
        scale: f64,

        /// Ground-truth translation, x component
        #[arg(long, default_value = "3.0")]
        tx: f64,

        /// Ground-truth translation, y component
        #[arg(long, default_value = "2.0")]
        ty: f64,

        /// Standard deviation of location noise on mapped points
        #[arg(long, default_value = "0.0")]
        noise: f64,

        /// Seed for scenario generation
        #[arg(long, default_value = "7")]
        seed: u64,

        /// Output file for the JSON report
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a default configuration file
    InitConfig {
        /// Destination path
        #[arg(short, long, default_value = "registration.toml")]
        output: PathBuf,

        /// File format: toml or json
        #[arg(short, long, default_value = "toml")]
        format: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let logging = LoggingConfig {
        global_level: level.to_string(),
        ..Default::default()
    };
    let _guard = init_logging(&logging)?;

    match cli.command {
        Commands::Synth {
            config,
            shared,
            clutter,
            rotation,
            scale,
            tx,
            ty,
            noise,
            seed,
            output,
        } => {
            let config = load_config_or_default(config.as_deref());
            let truth = SimilarityTransform::from_components(rotation, scale, tx, ty);
            let params = ScenarioParams {
                shared_points: shared,
                clutter_points: clutter,
                location_noise: noise,
                transform: truth,
                seed,
                ..Default::default()
            };

            let (set1, set2) = generate(&params)?;
            let pipeline = RegistrationPipeline::new(config);
            let report = pipeline.register(&set1, &set2)?;

            print_report(&truth, &report);

            if let Some(path) = output {
                let json = serde_json::to_string_pretty(&report)?;
                std::fs::write(&path, json)?;
                println!("Report written to {}", path.display());
            }
        }

        Commands::InitConfig { output, format } => {
            let format = match format.as_str() {
                "json" => ConfigFormat::Json,
                _ => ConfigFormat::Toml,
            };
            Config::default().save_to_file(&output, format)?;
            println!("Default configuration written to {}", output.display());
        }
    }

    Ok(())
}

fn print_report(
    truth: &SimilarityTransform,
    report: &feature_registration::pipeline::RegistrationReport,
) {
    println!("Candidates: {}", report.candidates.len());
    println!(
        "Matching: {:.2}ms, consensus filtering: {:.2}ms",
        report.matching_time_ms, report.ransac_time_ms
    );

    if !report.outcome.has_model() {
        println!("No similarity model found.");
        return;
    }

    let estimated = report.outcome.transform();
    println!("Inliers: {}", report.outcome.inliers().len());
    println!(
        "{:<14} {:>12} {:>12}",
        "", "ground truth", "estimated"
    );
    println!(
        "{:<14} {:>12.6} {:>12.6}",
        "rotation (rad)",
        truth.rotation(),
        estimated.rotation()
    );
    println!(
        "{:<14} {:>12.6} {:>12.6}",
        "scale",
        truth.scale(),
        estimated.scale()
    );
    println!(
        "{:<14} {:>12.6} {:>12.6}",
        "tx",
        truth.t1,
        estimated.t1
    );
    println!(
        "{:<14} {:>12.6} {:>12.6}",
        "ty",
        truth.t2,
        estimated.t2
    );
}
