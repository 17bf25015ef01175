mod output;
mod ui;
mod view;

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tickline_core::config::{ConfigError, TimelineConfig};
use tickline_core::env_filter::{EnvironmentFilter, environments};
use tickline_core::input::{load_buckets, parse_buckets};
use tickline_core::model::Bucket;
use tickline_core::rollup::{TimeWindow, fit_to_window};
use tickline_core::status::aggregate_status_across;
use tickline_core::ticks::merge_buckets;

use output::{OutputFormat, render_ticks};

#[derive(Parser)]
#[command(name = "tickline")]
#[command(about = "Merge cron check-in buckets into a status timeline", long_about = None)]
struct Cli {
    /// Config file (defaults to tickline.yaml discovered from the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Bucket data file; "-" reads stdin
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Environment to show, or "all"
    #[arg(short, long, global = true)]
    env: Option<String>,

    /// Visible time window (1h, 24h, 7d, 30d)
    #[arg(short, long, global = true)]
    window: Option<TimeWindow>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print merged timeline ticks
    Ticks {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Roll buckets up to this many columns before merging
        #[arg(long)]
        width: Option<u16>,
    },
    /// Print the worst status across the input
    Status,
    /// List environments present in the input
    Envs,
    /// Live timeline view, reloading the input on an interval
    View,
}

/// Effective settings after layering CLI flags over the config file.
struct Settings {
    input: PathBuf,
    filter: EnvironmentFilter,
    window: TimeWindow,
    refresh: Duration,
    timeline_width: Option<u16>,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

fn load_config(explicit: Option<&Path>) -> Result<TimelineConfig> {
    if let Some(path) = explicit {
        return TimelineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }

    let cwd = std::env::current_dir().context("failed to read current directory")?;
    match TimelineConfig::discover(&cwd) {
        Ok((path, config)) => {
            debug!(path = %path.display(), "using discovered config");
            Ok(config)
        }
        Err(ConfigError::NotFound { .. }) => Ok(TimelineConfig::default()),
        Err(e) => Err(e).context("failed to load discovered config"),
    }
}

fn resolve_settings(cli: &Cli, config: TimelineConfig) -> Result<Settings> {
    let Some(input) = cli.input.clone().or_else(|| config.input.clone()) else {
        bail!("no input file: pass --input or set `input` in tickline.yaml");
    };

    let filter = match &cli.env {
        Some(env) => env.parse::<EnvironmentFilter>().unwrap_or_default(),
        None => config.environment_filter(),
    };

    Ok(Settings {
        input,
        filter,
        window: cli.window.unwrap_or(config.window),
        refresh: Duration::from_millis(config.refresh_interval_ms),
        timeline_width: config.timeline_width,
    })
}

fn read_input(path: &Path) -> Result<Vec<Bucket>> {
    if path == Path::new("-") {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("failed to read bucket data from stdin")?;
        return parse_buckets(&content).context("failed to parse bucket data from stdin");
    }
    load_buckets(path).with_context(|| format!("failed to load bucket data {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = load_config(cli.config.as_deref())?;
    let settings = resolve_settings(&cli, config)?;

    match cli.command {
        Commands::Ticks { format, width } => {
            let buckets = read_input(&settings.input)?;
            let width = width.or(settings.timeline_width);
            let visible = fit_to_window(&buckets, settings.window, width);
            let ticks = merge_buckets(&visible, &settings.filter);
            debug!(buckets = visible.len(), ticks = ticks.len(), "merged buckets");
            print!("{}", render_ticks(&ticks, format)?);
            if format == OutputFormat::Json {
                println!();
            }
        }
        Commands::Status => {
            let buckets = read_input(&settings.input)?;
            let visible = fit_to_window(&buckets, settings.window, None);
            let filtered: Vec<_> = visible.iter().map(|b| settings.filter.apply(&b.envs)).collect();
            println!("{}", aggregate_status_across(&filtered));
        }
        Commands::Envs => {
            let buckets = read_input(&settings.input)?;
            for env in environments(&buckets) {
                println!("{}", env);
            }
        }
        Commands::View => {
            if settings.input == Path::new("-") {
                bail!("the live view needs a file to reload; stdin is not supported");
            }
            view::run(view::ViewSettings {
                input: settings.input,
                filter: settings.filter,
                window: settings.window,
                refresh: settings.refresh,
                timeline_width: settings.timeline_width,
            })
            .await?;
        }
    }

    Ok(())
}
