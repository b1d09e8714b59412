//! CLI command definitions, routing, and tracing setup.

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use forager_engine::{Collaborators, ProgressReporter, RunReport, run_goal};
use forager_planner::{OpenRouterClient, Planner};
use forager_search::{HttpFetcher, JsonSearchProvider};
use forager_shared::{
    GoalStatus, RunConfig, config_file_path, init_config, load_config, validate_api_key,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Forager — gather N things matching a goal from the web.
#[derive(Parser)]
#[command(
    name = "forager",
    version,
    about = "Goal-directed web information gathering: plan, search, fetch, extract, converge.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run a goal to completion (or failure) and print the report.
    Run {
        /// Natural-language goal, e.g. "find 10 recruiter email addresses".
        goal: String,

        /// Target result count (skips the planner's quantity analysis).
        #[arg(short, long)]
        target: Option<usize>,

        /// Maximum search rounds before giving up.
        #[arg(short, long)]
        max_iterations: Option<usize>,

        /// Print the report as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            goal,
            target,
            max_iterations,
            json,
        } => cmd_run(&goal, target, max_iterations, json).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

async fn cmd_run(
    goal: &str,
    target: Option<usize>,
    max_iterations: Option<usize>,
    json: bool,
) -> Result<()> {
    // Validate API key before doing anything
    let config = load_config()?;
    validate_api_key(&config)?;

    let mut run_config = RunConfig::from(&config);
    if let Some(k) = max_iterations {
        run_config.max_iterations = k;
    }

    let client = OpenRouterClient::from_config(&config.planner)?;
    let planner = Planner::new(Box::new(client));
    let search =
        JsonSearchProvider::new(config.search.endpoint.clone(), config.search.timeout_secs)?;
    let fetcher = HttpFetcher::new(config.search.timeout_secs)?;

    info!(goal, ?target, max_iterations = run_config.max_iterations, "starting run");

    let deps = Collaborators {
        planner: &planner,
        search: &search,
        fetcher: &fetcher,
    };
    let reporter = CliProgress::new();

    let report = run_goal(goal, target, &run_config, &deps, &reporter).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        print!("{}", report.render());
        println!();
    }

    // A failed run is reported, not raised; the exit code still reflects it.
    if report.status == GoalStatus::Failed {
        std::process::exit(1);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn searching(&self, query: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Searching [{current}/{total}] {query}"));
    }

    fn result_found(&self, count: usize, target: usize) {
        self.spinner
            .set_message(format!("Found {count}/{target} results"));
    }

    fn round_complete(&self, iteration: usize, count: usize, target: usize) {
        self.spinner.set_message(format!(
            "Round {iteration} complete: {count}/{target} results"
        ));
    }

    fn done(&self, _report: &RunReport) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Created config file at {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let path = config_file_path()?;
    println!("# resolved config ({})", path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
