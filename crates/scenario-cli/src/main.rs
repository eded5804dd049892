//! scenario-solver CLI - play, validate and review branching scenarios.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "scenario-solver",
    version,
    about = "Branching scenario decision engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scenario interactively or from a scripted list of choices
    Play {
        /// Path to a .toml or .json scenario
        #[arg(long)]
        scenario: PathBuf,

        /// Option ids to pick, one per step (e.g. "pause,facts")
        #[arg(long)]
        choices: Option<String>,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Save the attempt report as JSON
        #[arg(long)]
        save: bool,

        /// Directory for saved reports (defaults to the configured output_dir)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Exit code 1 if the attempt does not pass
        #[arg(long)]
        fail_on_fail: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate scenario files
    Validate {
        /// Path to a scenario file or directory
        #[arg(long)]
        scenario: PathBuf,
    },

    /// Print a saved attempt report
    Review {
        /// Attempt report JSON
        #[arg(long)]
        report: PathBuf,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create starter config and example scenario
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scenario_core=warn".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            scenario,
            choices,
            format,
            save,
            output,
            fail_on_fail,
            config,
        } => commands::play::execute(
            scenario,
            choices,
            format,
            save,
            output,
            fail_on_fail,
            config,
        ),
        Commands::Validate { scenario } => commands::validate::execute(scenario),
        Commands::Review { report, format } => commands::review::execute(report, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
