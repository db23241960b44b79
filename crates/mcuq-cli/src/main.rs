//! mcuq - Monte Carlo uncertainty propagation through remote models
//!
//! ## Commands
//!
//! - `predator-prey`: mean prey population at time T under uncertain initial conditions
//! - `l2-sea`: mean hull resistance under uncertain Froude number and draft
//! - `evaluate`: evaluate the model once and print its output
//! - `info`: show the protocol version and the models a service hosts
//!
//! Results go to stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{info, Level};

use mcuq_core::{DriverConfig, McDriver, McReport, RunConfig, UseCase};
use mcuq_protocol::{HttpModelClient, HttpModelConfig, ModelClient};

#[derive(Parser, Debug)]
#[command(name = "mcuq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Monte Carlo uncertainty quantification against remote model services", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// TOML run configuration
    #[arg(short, long, global = true, env = "MCUQ_CONFIG")]
    config: Option<PathBuf>,

    /// Model service base URL
    #[arg(long, global = true)]
    url: Option<String>,

    /// Model name on the service
    #[arg(long, global = true)]
    model: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Maximum evaluations in flight at once
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Result format on stdout
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Propagate initial-condition uncertainty through the predator-prey model
    PredatorPrey {
        /// Number of Monte Carlo samples
        #[arg(short = 'n', long)]
        samples: Option<usize>,

        /// Sampler seed
        #[arg(long)]
        seed: Option<u64>,

        /// Time horizon T
        #[arg(long)]
        horizon: Option<f64>,

        /// Model coefficients theta1,theta2,theta12,theta21
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        theta: Option<Vec<f64>>,
    },

    /// Propagate Froude number and draft uncertainty through the L2-Sea model
    L2Sea {
        /// Number of Monte Carlo samples
        #[arg(short = 'n', long)]
        samples: Option<usize>,

        /// Sampler seed (unseeded by default)
        #[arg(long)]
        seed: Option<u64>,

        /// Discard results at or above this value
        #[arg(long, conflicts_with = "no_filter")]
        threshold: Option<f64>,

        /// Keep every result
        #[arg(long)]
        no_filter: bool,
    },

    /// Evaluate the model once and print the first output group
    Evaluate {
        /// Request vector
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<f64>,
    },

    /// Show the protocol version and hosted models
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    mcuq_core::init_tracing(cli.json, level);

    let mut run_config = match &cli.config {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RunConfig::default(),
    };
    apply_global_overrides(&cli, &mut run_config)?;
    let model_config = resolve_model_config(&cli, &run_config);

    match cli.command {
        Commands::PredatorPrey {
            samples,
            seed,
            horizon,
            theta,
        } => {
            let use_case = &mut run_config.predator_prey;
            if let Some(n) = samples {
                use_case.samples = n;
            }
            if seed.is_some() {
                use_case.seed = seed;
            }
            if let Some(t) = horizon {
                use_case.horizon = t;
            }
            if let Some(theta) = theta {
                use_case.theta = theta;
            }
            let client = connect(model_config).await?;
            let report = run_use_case(client, run_config.driver, &run_config.predator_prey).await?;
            print!("{}", render_report(&report, cli.output)?);
            Ok(())
        }
        Commands::L2Sea {
            samples,
            seed,
            threshold,
            no_filter,
        } => {
            let use_case = &mut run_config.l2_sea;
            if let Some(n) = samples {
                use_case.samples = n;
            }
            if seed.is_some() {
                use_case.seed = seed;
            }
            if no_filter {
                use_case.threshold = None;
            } else if threshold.is_some() {
                use_case.threshold = threshold;
            }
            let client = connect(model_config).await?;
            let report = run_use_case(client, run_config.driver, &run_config.l2_sea).await?;
            print!("{}", render_report(&report, cli.output)?);
            Ok(())
        }
        Commands::Evaluate { values } => {
            let client = connect(model_config).await?;
            let output = client
                .evaluate(&values)
                .await
                .context("Model evaluation failed")?;
            print!("{}", render_output(&output, cli.output)?);
            Ok(())
        }
        Commands::Info => {
            let service = HttpModelClient::fetch_info(&model_config.base_url, model_config.timeout_secs)
                .await
                .with_context(|| format!("Failed to query {}", model_config.base_url))?;
            match cli.output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&service)?),
                OutputFormat::Text => {
                    println!("endpoint: {}", model_config.base_url);
                    println!("protocol: {}", service.protocol_version);
                    println!("models:   {}", service.models.join(", "));
                }
            }
            Ok(())
        }
    }
}

/// Fold global flags into the loaded configuration.
fn apply_global_overrides(cli: &Cli, run_config: &mut RunConfig) -> Result<()> {
    if let Some(n) = cli.concurrency {
        run_config.driver.max_in_flight = n;
    }
    run_config
        .validate()
        .context("Invalid run configuration")?;
    Ok(())
}

/// Model settings: CLI flags over env vars over the config file.
fn resolve_model_config(cli: &Cli, run_config: &RunConfig) -> HttpModelConfig {
    let mut config = run_config.model_config();
    if let Some(url) = &cli.url {
        config.base_url = url.clone();
    }
    if let Some(model) = &cli.model {
        config.model_name = model.clone();
    }
    if let Some(secs) = cli.timeout_secs {
        config.timeout_secs = secs;
    }
    config
}

async fn connect(config: HttpModelConfig) -> Result<HttpModelClient> {
    let endpoint = config.base_url.clone();
    let model = config.model_name.clone();
    HttpModelClient::connect(config)
        .await
        .with_context(|| format!("Failed to connect to model '{}' at {}", model, endpoint))
}

async fn run_use_case<C: ModelClient>(
    client: C,
    driver_config: DriverConfig,
    use_case: &dyn UseCase,
) -> Result<McReport> {
    let driver = McDriver::with_config(client, driver_config);
    let report = driver
        .run(use_case)
        .await
        .with_context(|| format!("Monte Carlo run '{}' failed", use_case.name()))?;
    info!(
        "{}: mean {} over {} of {} samples, baseline {}",
        report.use_case,
        report.estimate.mean,
        report.estimate.retained,
        report.estimate.total,
        report.baseline_value
    );
    Ok(report)
}

/// Text output is the estimate and the baseline value, one per line.
fn render_report(report: &McReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => format!("{}\n{}\n", report.estimate.mean, report.baseline_value),
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(report)?),
    })
}

fn render_output(output: &[f64], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => {
            let values: Vec<String> = output.iter().map(|v| v.to_string()).collect();
            format!("{}\n", values.join(" "))
        }
        OutputFormat::Json => format!("{}\n", serde_json::to_string(output)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use mcuq_core::{L2Sea, PredatorPrey};
    use mcuq_protocol::fakes::FixedModel;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("mcuq").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_predator_prey_flags() {
        let cli = parse(&[
            "predator-prey",
            "-n",
            "500",
            "--seed",
            "7",
            "--theta",
            "0.5,-0.25,1,2",
            "--url",
            "http://models:4242",
        ]);
        assert_eq!(cli.url.as_deref(), Some("http://models:4242"));
        match cli.command {
            Commands::PredatorPrey {
                samples,
                seed,
                horizon,
                theta,
            } => {
                assert_eq!(samples, Some(500));
                assert_eq!(seed, Some(7));
                assert_eq!(horizon, None);
                assert_eq!(theta, Some(vec![0.5, -0.25, 1.0, 2.0]));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_threshold_conflicts_with_no_filter() {
        let result = Cli::try_parse_from(["mcuq", "l2-sea", "--threshold", "500", "--no-filter"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_evaluate_accepts_negative_values() {
        let cli = parse(&["evaluate", "0.32", "-6.2", "--output", "json"]);
        assert_eq!(cli.output, OutputFormat::Json);
        match cli.command {
            Commands::Evaluate { values } => assert_eq!(values, vec![0.32, -6.2]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_evaluate_requires_values() {
        assert!(Cli::try_parse_from(["mcuq", "evaluate"]).is_err());
    }

    #[test]
    fn test_cli_flags_override_model_settings() {
        let cli = parse(&[
            "info",
            "--url",
            "http://cli:4242",
            "--model",
            "benchmark_FOM",
            "--timeout-secs",
            "5",
        ]);
        let config = resolve_model_config(&cli, &RunConfig::default());
        assert_eq!(config.base_url, "http://cli:4242");
        assert_eq!(config.model_name, "benchmark_FOM");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let cli = parse(&["l2-sea", "--concurrency", "0"]);
        let mut run_config = RunConfig::default();
        assert!(apply_global_overrides(&cli, &mut run_config).is_err());

        let cli = parse(&["l2-sea", "--concurrency", "8"]);
        apply_global_overrides(&cli, &mut run_config).unwrap();
        assert_eq!(run_config.driver.max_in_flight, 8);
    }

    #[tokio::test]
    async fn test_text_report_prints_estimate_then_baseline() {
        let use_case = L2Sea {
            samples: 1,
            seed: Some(1),
            ..L2Sea::default()
        };
        let report = run_use_case(
            FixedModel::new("forward", vec![64.7470016]),
            DriverConfig::default(),
            &use_case,
        )
        .await
        .unwrap();
        assert_eq!(
            render_report(&report, OutputFormat::Text).unwrap(),
            "64.7470016\n64.7470016\n"
        );
    }

    #[tokio::test]
    async fn test_json_report_is_the_full_report() {
        let use_case = PredatorPrey {
            samples: 3,
            ..PredatorPrey::default()
        };
        let report = run_use_case(
            FixedModel::new("forward", vec![1.5, 0.5]),
            DriverConfig::default(),
            &use_case,
        )
        .await
        .unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&render_report(&report, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["use_case"], "predator-prey");
        assert_eq!(json["estimate"]["mean"], 1.5);
        assert_eq!(json["seed"], 42);
    }

    #[test]
    fn test_render_output_is_unchanged() {
        assert_eq!(
            render_output(&[64.7470016, -1.0], OutputFormat::Text).unwrap(),
            "64.7470016 -1\n"
        );
        assert_eq!(
            render_output(&[64.7470016], OutputFormat::Json).unwrap(),
            "[64.7470016]\n"
        );
    }
}
