//! Regional Supply - Entry Point
//!
//! Command-line access to region ledgers outside the game: inspect a region's
//! data file, run scripting calls against it, or replay a scenario of host
//! lifecycle events.

use clap::{Parser, Subcommand};
use regional_supply::city::{RegionSession, ResourceProperties, Scenario};
use regional_supply::core::error::Result;
use regional_supply::core::types::ResourceEntry;
use regional_supply::core::SupplyConfig;
use regional_supply::persist::{load_region_ledger, save_region_ledger, AccessMode, PackedFile};
use regional_supply::scripting::{ScriptBridge, ScriptCall, ScriptValue};
use regional_supply::supply::Ledger;

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Regional supply ledger tool
#[derive(Parser, Debug)]
#[command(name = "regional-supply")]
#[command(about = "Inspect, edit and replay regional supply/demand ledgers")]
#[command(version)]
struct Args {
    /// Config file (TOML); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the balances stored in a region data file
    Show {
        data_file: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Run scripting calls against a region data file and save the result
    Exec {
        data_file: PathBuf,

        /// Calls such as "regional_supply.add_to_supply(1, 75)"
        #[arg(required = true)]
        calls: Vec<String>,
    },
    /// Feed a scenario of lifecycle events through a region session
    Replay {
        scenario: PathBuf,

        /// Override the regions directory from the config
        #[arg(long)]
        regions_dir: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SupplyConfig::load(path)?,
        None => SupplyConfig::default(),
    };

    init_tracing(&config.log_level, args.log_file.as_deref())?;
    tracing::info!("regional-supply v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Show { data_file, json } => {
            let mut file = PackedFile::open(&data_file, AccessMode::Read)?;
            let ledger = load_region_ledger(&mut file, config.record_key);
            print_balances(&ledger, json)?;
        }
        Command::Exec { data_file, calls } => {
            let calls = calls
                .iter()
                .map(|call| ScriptCall::parse(call))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            exec_calls(&config, &data_file, &calls)?;
        }
        Command::Replay {
            scenario,
            regions_dir,
            json,
        } => {
            if let Some(dir) = regions_dir {
                config.regions_directory = dir;
            }
            let properties = ResourceProperties::from_config(&config);
            let scenario = Scenario::load(&scenario, &properties)?;

            let mut session = RegionSession::new(config);
            for output in scenario.run(&mut session) {
                match output.result {
                    Ok(values) => println!("{} => {}", output.call, format_values(&values)),
                    Err(e) => println!("{} => error: {}", output.call, e),
                }
            }

            if let Some(path) = session.data_path() {
                println!("Region data: {}", path.display());
            }
            print_balances(session.ledger(), json)?;
        }
    }

    Ok(())
}

fn init_tracing(level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("regional_supply={}", level)));

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

fn exec_calls(config: &SupplyConfig, data_file: &Path, calls: &[ScriptCall]) -> Result<()> {
    let mut file = PackedFile::open(data_file, AccessMode::ReadWrite)?;
    let mut ledger = load_region_ledger(&mut file, config.record_key);

    {
        let mut bridge = ScriptBridge::new(&config.script_table, &mut ledger);
        for call in calls {
            let values = bridge.call(call)?;
            println!("{} => {}", call, format_values(&values));
        }
    }

    save_region_ledger(&ledger, &mut file, config.record_key)?;
    file.close()?;

    print_balances(&ledger, false)
}

fn format_values(values: &[ScriptValue]) -> String {
    if values.is_empty() {
        return "ok".to_string();
    }
    values
        .iter()
        .map(|value| match value {
            ScriptValue::Nil => "nil".to_string(),
            ScriptValue::Boolean(b) => b.to_string(),
            ScriptValue::Number(n) => n.to_string(),
            ScriptValue::String(s) => format!("\"{}\"", s),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_balances(ledger: &Ledger, json: bool) -> Result<()> {
    let entries: Vec<ResourceEntry> = ledger.sorted_entries();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("(no resources)");
        return Ok(());
    }

    println!("{:<12} {:>20}", "RESOURCE", "QUANTITY");
    for entry in &entries {
        println!("{:<12} {:>20}", entry.id.to_string(), entry.quantity);
    }
    Ok(())
}
