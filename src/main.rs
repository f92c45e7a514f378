use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use iftriage::analysis::flapping::{detect_flapping, FlapParams};
use iftriage::analysis::metrics::calculate_metrics;
use iftriage::analysis::stability::{analyze_stability, StabilityParams};
use iftriage::config::AppConfig;
use iftriage::store::EventFilter;

#[derive(Parser)]
#[command(
    name = "iftriage",
    about = "Interface health analytics for device syslog events",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Store filters shared by the analysis subcommands.
#[derive(Args)]
struct FilterArgs {
    /// Path to the SQLite event database
    #[arg(long, default_value = "data/iftriage.db")]
    db: String,

    /// Inclusive start of the time range (epoch seconds)
    #[arg(long)]
    start: Option<f64>,

    /// Inclusive end of the time range (epoch seconds)
    #[arg(long)]
    end: Option<f64>,

    /// Filter by device name
    #[arg(long)]
    device: Option<String>,

    /// Filter by location
    #[arg(long)]
    location: Option<String>,

    /// Filter by interface name
    #[arg(long)]
    interface: Option<String>,

    /// Maximum records to analyze
    #[arg(long)]
    limit: Option<usize>,
}

impl FilterArgs {
    fn filter(&self) -> EventFilter {
        EventFilter {
            start: self.start,
            end: self.end,
            device: self.device.clone(),
            location: self.location.clone(),
            interface: self.interface.clone(),
            limit: self.limit,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the daemon (event store + analysis API)
    Serve {
        /// Bind address (overrides the config file)
        #[arg(long)]
        bind: Option<String>,

        /// Path to the SQLite event database (overrides the config file)
        #[arg(long)]
        db: Option<String>,

        /// Path to a TOML config file (overrides the standard locations)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Load a JSON / JSON Lines event file into the store
    Ingest {
        /// Event file to load
        file: PathBuf,

        /// Path to the SQLite event database
        #[arg(long, default_value = "data/iftriage.db")]
        db: String,
    },

    /// Report interfaces oscillating rapidly between up and down
    Flapping {
        #[command(flatten)]
        filter: FilterArgs,

        /// Maximum minutes between state changes to count as rapid
        #[arg(long, default_value = "30")]
        threshold_minutes: u32,

        /// Minimum rapid transitions required to report
        #[arg(long, default_value = "3")]
        min_transitions: u32,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Score interface stability, least stable first
    Stability {
        #[command(flatten)]
        filter: FilterArgs,

        /// Analysis window cap in hours
        #[arg(long, default_value = "24")]
        window_hours: u32,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Dashboard-level interface counts
    Metrics {
        #[command(flatten)]
        filter: FilterArgs,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },
}

/// `RUST_LOG` wins over the configured default level.
fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level.to_string())),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Serve defers tracing init until the config (and its logging level)
    // has been loaded.
    if !matches!(cli.command, Commands::Serve { .. }) {
        init_tracing("info");
    }

    match cli.command {
        Commands::Serve { bind, db, config } => {
            let config = match config {
                Some(path) => AppConfig::load(&path)?,
                None => AppConfig::load_or_default(),
            };
            init_tracing(&config.logging.level);

            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let db = db.unwrap_or_else(|| config.store.db_path.clone());
            tracing::info!(%bind, %db, "Starting iftriage daemon");
            iftriage::serve(&bind, &db, config).await?;
        }
        Commands::Ingest { file, db } => {
            let pool = iftriage::store::open_pool(&db)?;
            let summary = iftriage::ingest::ingest_file(&pool, &file)?;
            println!(
                "Ingested {} records ({} skipped) from {}",
                summary.inserted,
                summary.skipped,
                file.display()
            );
        }
        Commands::Flapping {
            filter,
            threshold_minutes,
            min_transitions,
            json,
        } => {
            let params = FlapParams {
                time_threshold_minutes: threshold_minutes,
                min_transitions,
            };
            params.validate()?;

            let pool = iftriage::store::open_pool(&filter.db)?;
            let events = iftriage::store::query_events(&pool, &filter.filter())?;
            let reports = detect_flapping(&events, &params);

            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else if reports.is_empty() {
                println!("No flapping interfaces found ({} events analyzed).", events.len());
            } else {
                println!("\nFlapping Interfaces");
                println!(
                    "{:<15} | {:<15} | {:<12} | {:>11} | {:>5} | Duration (min)",
                    "Device", "Location", "Interface", "Transitions", "Rapid"
                );
                println!(
                    "{:-<15}-|-{:-<15}-|-{:-<12}-|-{:-<11}-|-{:-<5}-|-{:-<14}",
                    "", "", "", "", "", ""
                );
                for r in &reports {
                    println!(
                        "{:<15} | {:<15} | {:<12} | {:>11} | {:>5} | {:.2}",
                        r.device,
                        r.location,
                        r.interface,
                        r.transitions_count,
                        r.rapid_transitions_detected,
                        r.observation_duration_minutes
                    );
                }
                println!();
            }
        }
        Commands::Stability {
            filter,
            window_hours,
            json,
        } => {
            let params = StabilityParams {
                time_window_hours: window_hours,
            };
            params.validate()?;

            let pool = iftriage::store::open_pool(&filter.db)?;
            let events = iftriage::store::query_events(&pool, &filter.filter())?;
            let metrics = analyze_stability(&events, &params);

            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else if metrics.is_empty() {
                println!("No interface events found.");
            } else {
                println!("\nInterface Stability (least stable first)");
                println!(
                    "{:<15} | {:<12} | {:>6} | {:>6} | {:>5} | {:>8} | Freq/h",
                    "Device", "Interface", "Score", "Events", "Down", "Config"
                );
                println!(
                    "{:-<15}-|-{:-<12}-|-{:-<6}-|-{:-<6}-|-{:-<5}-|-{:-<8}-|-{:-<7}",
                    "", "", "", "", "", "", ""
                );
                for m in &metrics {
                    println!(
                        "{:<15} | {:<12} | {:>6.1} | {:>6} | {:>5} | {:>8} | {:.2}",
                        m.device,
                        m.interface,
                        m.stability_score,
                        m.total_events,
                        m.down_events,
                        m.config_events,
                        m.event_frequency_per_hour
                    );
                }
                println!();
            }
        }
        Commands::Metrics { filter, json } => {
            let pool = iftriage::store::open_pool(&filter.db)?;
            let events = iftriage::store::query_events(&pool, &filter.filter())?;
            let dashboard = calculate_metrics(&events);

            if json {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
            } else {
                println!("\nInterface Dashboard");
                println!("{:<22}: {}", "Total interfaces", dashboard.total_interfaces);
                println!("{:<22}: {}", "Active interfaces", dashboard.active_interfaces);
                println!("{:<22}: {}", "Down interfaces", dashboard.down_interfaces);
                println!("{:<22}: {}", "Flapping interfaces", dashboard.flapping_interfaces);
                println!("{:<22}: {}", "Status changes", dashboard.status_changes);
                println!("{:<22}: {}", "Config changes", dashboard.config_changes);
                println!();
            }
        }
    }

    Ok(())
}
