use std::path::PathBuf;

use clap::{Parser, Subcommand};

use aquatrack_service::advisory::{Advisor, FAILED_MESSAGE, GroqClient};
use aquatrack_service::alert::{Verdict, evaluate_reading, first_violation};
use aquatrack_service::analysis::prepare_context;
use aquatrack_service::config::AppConfig;
use aquatrack_service::ingest::simulate::{MAX_BATCH, SimulationRanges, simulate_into};
use aquatrack_service::logging::{self, Component};
use aquatrack_service::model::Reading;
use aquatrack_service::store::{ReadingStore, StoreError, open_store};

#[derive(Parser)]
#[command(name = "aquatrack")]
#[command(version, about = "Fish pond water-quality monitoring")]
struct Cli {
    /// Path to a TOML config file (defaults to ./aquatrack.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the sensor_data table if it does not exist
    Init,
    /// Generate and insert simulated sensor readings
    Simulate {
        #[arg(short = 'n', long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=MAX_BATCH as i64))]
        count: u32,
    },
    /// Show the most recent readings, newest first
    Recent {
        #[arg(short, long, default_value_t = 50)]
        limit: u32,
        #[arg(long)]
        json: bool,
    },
    /// Show every reading, oldest first
    History {
        #[arg(long)]
        json: bool,
    },
    /// Evaluate whether the latest reading is safe for fish
    Status,
    /// Print the summarized context over recent readings
    Context {
        /// Number of recent readings to summarize (defaults to summary.window)
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Ask the AI assistant a question about the pond
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    logging::init_logger(
        config.logging.min_level()?,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );
    logging::debug(
        Component::System,
        &format!("configuration loaded (database {}, model {})", config.database.url, config.advisory.model),
    );

    let store = open_store(&config.database.url);
    logged("init", store.init())?;

    match cli.command {
        Commands::Init => {
            logging::info(Component::Store, &format!("Database ready at {}", config.database.url));
        }
        Commands::Simulate { count } => {
            let mut rng = rand::thread_rng();
            let inserted = logged(
                "simulate",
                simulate_into(store.as_ref(), count, &mut rng, &SimulationRanges::default()),
            )?;
            print_readings(&inserted);
        }
        Commands::Recent { limit, json } => {
            let readings = logged("fetch_recent", store.fetch_recent(limit))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&readings)?);
            } else if readings.is_empty() {
                println!("No sensor data available.");
            } else {
                print_readings(&readings);
            }
        }
        Commands::History { json } => {
            let readings = logged("fetch_all", store.fetch_all())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&readings)?);
            } else if readings.is_empty() {
                println!("No sensor data available.");
            } else {
                print_readings(&readings);
            }
        }
        Commands::Status => print_status(store.as_ref())?,
        Commands::Context { limit } => {
            let window = limit.unwrap_or(config.summary.window);
            println!("{}", logged("prepare_context", prepare_context(store.as_ref(), window))?);
        }
        Commands::Ask { question } => {
            let question = question.join(" ");
            let client = match GroqClient::new(
                &config.advisory.base_url,
                &config.advisory.model,
                config.advisory.timeout_secs,
            ) {
                Ok(client) => client,
                Err(e) => {
                    logging::log_advisory_failure("client setup", &e);
                    println!("{}", FAILED_MESSAGE);
                    return Ok(());
                }
            };

            let advisor = Advisor::new(store.as_ref(), config.advisory.api_key.clone(), client)
                .with_window(config.summary.window);
            if advisor.is_configured() {
                eprintln!("Generating answer...");
            }
            println!("{}", logged("ask", advisor.ask_groq(&question))?);
        }
    }

    Ok(())
}

/// Log a store failure on its way out to the caller.
fn logged<T>(operation: &str, result: Result<T, StoreError>) -> Result<T, StoreError> {
    if let Err(ref e) = result {
        logging::log_store_failure(operation, e);
    }
    result
}

fn print_status(store: &dyn ReadingStore) -> Result<(), StoreError> {
    let Some(latest) = logged("fetch_recent", store.fetch_recent(1))?.into_iter().next() else {
        println!("No sensor data available.");
        return Ok(());
    };

    print_readings(std::slice::from_ref(&latest));
    println!();

    match evaluate_reading(&latest) {
        Verdict::Safe => println!("✅ Water conditions are SAFE for fish."),
        Verdict::Unsafe => {
            println!("⚠️ Water conditions are UNSAFE for fish!");
            if let Some(violation) = first_violation(latest.temperature, latest.ph, latest.dissolved_oxygen) {
                println!("   {}", violation);
                println!("   {}", violation.recommendation());
            }
            logging::warn(Component::Safety, &format!("reading {} is UNSAFE", latest.id));
        }
    }
    Ok(())
}

fn print_readings(readings: &[Reading]) {
    println!(
        "{:>6}  {:<24}  {:>10}  {:>6}  {:>10}",
        "ID", "TIMESTAMP", "TEMP (°C)", "PH", "DO (mg/L)"
    );
    for r in readings {
        println!(
            "{:>6}  {:<24}  {:>10.2}  {:>6.2}  {:>10.2}",
            r.id,
            r.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            r.temperature,
            r.ph,
            r.dissolved_oxygen
        );
    }
}
