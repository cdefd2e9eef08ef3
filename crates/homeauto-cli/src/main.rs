//! homeauto - home-automation recommender CLI
//!
//! Usage:
//!   homeauto generate -o data.csv --rows 1000      # Write a synthetic dataset
//!   homeauto evaluate data.csv                      # Hold-out accuracy report
//!   homeauto train data.csv -o models.bin           # Train and save the bundle
//!   homeauto predict models.bin --mood happy ...    # One recommendation
//!   homeauto serve models.bin --port 8080           # Web form

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod error;
mod output;

use commands::{evaluate, generate, predict, serve, train};

/// homeauto - random-forest home-automation recommendations
#[derive(Parser)]
#[command(name = "homeauto")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a synthetic dataset with the full CSV schema
    Generate {
        /// Number of rows
        #[arg(long, default_value_t = 1000)]
        rows: usize,

        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output CSV path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Train on 80% of a dataset and report accuracy on the rest
    Evaluate {
        /// Dataset CSV
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Seed for the split and the forests
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Trees per forest
        #[arg(long, default_value_t = 100)]
        trees: usize,

        /// Held-out rows reported in detail
        #[arg(long, default_value_t = 50)]
        samples: usize,

        /// Fraction of rows held out
        #[arg(long, default_value_t = 0.2)]
        test_size: f64,
    },

    /// Train on a whole dataset and save the model bundle
    Train {
        /// Dataset CSV
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output bundle path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Forest seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Trees per forest
        #[arg(long, default_value_t = 100)]
        trees: usize,

        /// Maximum tree depth (unlimited when omitted)
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// Recommend actions for one context
    Predict {
        /// Model bundle
        #[arg(value_name = "FILE")]
        model: PathBuf,

        #[arg(long)]
        mood: String,

        #[arg(long)]
        condition: String,

        #[arg(long)]
        time: String,

        /// 1 when at home, 0 when away
        #[arg(long, default_value_t = 1)]
        at_home: u8,

        /// 1 on a holiday
        #[arg(long, default_value_t = 0)]
        holiday: u8,

        /// Map unknown text to fallback values instead of rejecting it
        #[arg(long)]
        custom: bool,
    },

    /// Serve the recommendation form over HTTP
    Serve {
        /// Model bundle
        #[arg(value_name = "FILE")]
        model: PathBuf,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = 8080)]
        port: u16,

        /// Hide the custom testing mode
        #[arg(long)]
        no_custom: bool,

        /// Show the current date and time on the form
        #[arg(long)]
        clock: bool,

        /// Check inputs against the trained encoders before predicting
        #[arg(long)]
        validate: bool,
    },
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Generate { rows, seed, output } => generate::run(rows, seed, &output, cli.json),
        Commands::Evaluate {
            file,
            seed,
            trees,
            samples,
            test_size,
        } => evaluate::run(
            &file,
            &evaluate::EvaluateOptions {
                seed,
                trees,
                samples,
                test_size,
            },
            cli.json,
        ),
        Commands::Train {
            file,
            output,
            seed,
            trees,
            max_depth,
        } => train::run(&file, &output, seed, trees, max_depth, cli.json),
        Commands::Predict {
            model,
            mood,
            condition,
            time,
            at_home,
            holiday,
            custom,
        } => predict::run(
            &model,
            &predict::PredictArgs {
                mood,
                condition,
                time,
                at_home,
                holiday,
                custom,
            },
            cli.json,
        ),
        Commands::Serve {
            model,
            host,
            port,
            no_custom,
            clock,
            validate,
        } => {
            let config = serve::ServerConfig::default()
                .with_host(host)
                .with_port(port);
            let form = homeauto::form::FormConfig::default()
                .with_custom_mode(!no_custom)
                .with_clock(clock)
                .with_validation(validate);
            serve::run(&model, &config, form)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_predict() {
        let cli = Cli::try_parse_from([
            "homeauto", "predict", "models.bin", "--mood", "happy", "--condition", "at_home",
            "--time", "evening", "--holiday", "1",
        ])
        .expect("parses");
        match cli.command {
            Commands::Predict {
                at_home, holiday, custom, ..
            } => {
                assert_eq!((at_home, holiday), (1, 1));
                assert!(!custom);
            }
            _ => panic!("expected predict"),
        }
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["homeauto", "serve", "models.bin"]).expect("parses");
        match cli.command {
            Commands::Serve {
                host, port, no_custom, clock, validate, ..
            } => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 8080);
                assert!(!no_custom && !clock && !validate);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["homeauto", "evaluate", "data.csv", "--json", "-v"])
            .expect("parses");
        assert!(cli.json);
        assert!(cli.verbose);
    }
}
