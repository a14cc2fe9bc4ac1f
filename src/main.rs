//! # Tagsheet CLI
//!
//! Usage:
//!   tagsheet layout products.csv -o layout.json
//!   tagsheet layout products.csv --settings settings.json
//!   tagsheet defaults > settings.json
//!   tagsheet example > products.csv

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tagsheet::model::AppConfiguration;
use tagsheet::settings::{self, FileSettingsStore, SettingsStore, SETTINGS_KEY};

/// Flow price tags onto printable sheets.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lay out a CSV product list and print page geometry as JSON
    Layout {
        /// CSV file with Name, Quantity, MRP, OfferPrice columns
        csv: PathBuf,

        /// Settings blob to use instead of the saved one
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Write the JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the default settings blob
    Defaults,
    /// Print an example product CSV
    Example,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match cli.command {
        Commands::Layout {
            csv,
            settings,
            output,
        } => run_layout(csv, settings, output),
        Commands::Defaults => {
            let blob = settings::save_configuration(&AppConfiguration::default())?;
            println!("{blob}");
            Ok(())
        }
        Commands::Example => {
            print!("{}", example_csv());
            Ok(())
        }
    }
}

fn run_layout(
    csv: PathBuf,
    settings_path: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let text = fs::read_to_string(&csv)
        .with_context(|| format!("Failed to read CSV file: {}", csv.display()))?;

    let blob = match settings_path {
        Some(path) => Some(
            fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings file: {}", path.display()))?,
        ),
        None => saved_settings(),
    };

    let json = tagsheet::layout_csv(&text, blob.as_deref())?;

    match output {
        Some(path) => {
            fs::write(&path, &json)
                .with_context(|| format!("Failed to write layout: {}", path.display()))?;
            info!(path = %path.display(), bytes = json.len(), "layout written");
            eprintln!("✓ Written layout to {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}").context("Failed to write layout to stdout")?;
        }
    }
    Ok(())
}

/// The saved blob, if there is one. Store problems fall back to defaults.
fn saved_settings() -> Option<String> {
    let store = match FileSettingsStore::default_location() {
        Ok(store) => store,
        Err(e) => {
            debug!(error = %e, "no settings store; using defaults");
            return None;
        }
    };
    match store.read(SETTINGS_KEY) {
        Ok(blob) => blob,
        Err(e) => {
            warn!(error = %e, "could not read saved settings; using defaults");
            None
        }
    }
}

fn example_csv() -> &'static str {
    "Name,Quantity,MRP,Offer Price
Basmati Rice,5 kg,\"₹ 1,250.00\",999
Toor Dal,1 kg,180,155
\"Biscuits, Cream\",2 x 100 g,60,50
Sunflower Oil,1 L,210,189
Green Tea,25 bags,175,149
"
}
