//! ContrastSync CLI
//!
//! Thin wrapper around contrastsync-core for inspecting and editing the
//! persisted color pair from a terminal.
//!
//! ## Usage
//!
//! ```bash
//! # Show the current pair and its WCAG status
//! contrastsync show
//!
//! # Show the pair a shared link would load
//! contrastsync show --url "?fg=000000&bg=ffffff"
//!
//! # Change one side of the pair
//! contrastsync set fg "#1a1a1a"
//! contrastsync set bg "hsl(60, 100%, 90%)"
//!
//! # Exchange foreground and background
//! contrastsync swap
//!
//! # One-off check, nothing is saved
//! contrastsync check navy ivory
//!
//! # Print the published custom properties
//! contrastsync css
//!
//! # Raw input-value cache
//! contrastsync input set fg-input "#12"
//! contrastsync input get fg-input
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use contrastsync_core::{
    contrast_ratio, Color, ColorConfig, ColorContext, ColorState, Host, MemoryLocation,
    RedbStore, StyleMap, WcagStatus,
};

/// ContrastSync - foreground/background colors with WCAG contrast tracking
#[derive(Parser)]
#[command(name = "contrastsync")]
#[command(version = "0.1.0")]
#[command(about = "ContrastSync - foreground/background colors with WCAG contrast tracking")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Data directory (default: ~/.contrastsync/data)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// JSON file overriding default colors, storage keys and timings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current pair, its contrast ratio and WCAG status
    Show {
        /// Query string to load from, as a shared link would (e.g. "fg=000000&bg=ffffff")
        #[arg(long)]
        url: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Set the foreground or background color
    Set {
        /// Which side of the pair to change
        #[arg(value_enum)]
        slot: Slot,

        /// Any CSS color: hex, rgb(), hsl(), or a named color
        color: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Exchange foreground and background
    Swap {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check two colors without saving anything
    Check {
        /// Foreground color
        foreground: String,

        /// Background color
        background: String,
    },

    /// Print the CSS custom properties for the current pair
    Css,

    /// Raw input-value cache
    Input {
        #[command(subcommand)]
        action: InputAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Slot {
    Fg,
    Bg,
}

#[derive(Subcommand)]
enum InputAction {
    /// Remember the raw text of an input control
    Set {
        /// Input control ID
        id: String,

        /// Raw text, valid color or not
        value: String,
    },

    /// Print the last stored text of an input control
    Get {
        /// Input control ID
        id: String,
    },
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();
}

/// Get the default data directory (~/.contrastsync/data)
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".contrastsync")
        .join("data")
}

fn load_config(path: Option<&PathBuf>) -> Result<ColorConfig> {
    match path {
        Some(path) => ColorConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(ColorConfig::default()),
    }
}

fn status_line(label: &str, passed: bool) -> String {
    format!("  {:<16} {}", label, if passed { "pass" } else { "fail" })
}

fn print_status(status: &WcagStatus) {
    println!("WCAG:");
    println!("{}", status_line("Normal text AA", status.normal_aa));
    println!("{}", status_line("Normal text AAA", status.normal_aaa));
    println!("{}", status_line("Large text AA", status.large_aa));
    println!("{}", status_line("Large text AAA", status.large_aaa));
}

/// Print a state snapshot, with the query string it would be shared under
fn print_state(state: &ColorState, query: &str, json: bool) -> Result<()> {
    if json {
        let mut value = serde_json::to_value(state)?;
        if let Some(object) = value.as_object_mut() {
            object.insert("url".to_string(), format!("?{query}").into());
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Foreground: {}", state.foreground_color);
    println!("Background: {}", state.background_color);
    println!("Contrast:   {:.1}:1", state.wcag_status.ratio);
    print_status(&state.wcag_status);
    println!("URL:        ?{query}");
    Ok(())
}

/// Open the persisted store and build a context around it
fn open_context(
    data_dir: PathBuf,
    config: ColorConfig,
    query: &str,
) -> Result<(Arc<ColorContext>, Arc<MemoryLocation>)> {
    let db_path = data_dir.join("contrastsync.redb");
    debug!(path = %db_path.display(), "Opening color store");
    let store = Arc::new(RedbStore::new(&db_path)?);
    let location = Arc::new(MemoryLocation::with_query(query));

    let host = Host::headless()
        .with_storage(store)
        .with_location(location.clone())
        .with_style(Arc::new(StyleMap::new()));
    Ok((ColorContext::create(host, config), location))
}

fn run_check(foreground: &str, background: &str) -> Result<()> {
    let fg = Color::parse(foreground).with_context(|| format!("Invalid color: {foreground}"))?;
    let bg = Color::parse(background).with_context(|| format!("Invalid color: {background}"))?;
    let status = WcagStatus::from_ratio(contrast_ratio(&fg, &bg));

    println!("Foreground: {fg}");
    println!("Background: {bg}");
    println!("Contrast:   {:.1}:1", status.ratio);
    print_status(&status);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = load_config(cli.config.as_ref())?;
    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);

    match cli.command {
        Commands::Show { url, json } => {
            let query = url.as_deref().unwrap_or("");
            let (context, location) = open_context(data_dir, config, query)?;
            let manager = context.manager();
            manager.init();
            print_state(&manager.state(), &location.query(), json)?;
        }

        Commands::Set { slot, color, json } => {
            let (context, location) = open_context(data_dir, config, "")?;
            let manager = context.manager();
            let accepted = match slot {
                Slot::Fg => manager.set_foreground_color(&color),
                Slot::Bg => manager.set_background_color(&color),
            };
            if !accepted {
                bail!("Invalid color: {}", color);
            }
            context.on_before_swap();
            print_state(&manager.state(), &location.query(), json)?;
        }

        Commands::Swap { json } => {
            let (context, location) = open_context(data_dir, config, "")?;
            let manager = context.manager();
            manager.swap_colors();
            context.on_before_swap();
            print_state(&manager.state(), &location.query(), json)?;
        }

        Commands::Check {
            foreground,
            background,
        } => run_check(&foreground, &background)?,

        Commands::Css => {
            let (context, _) = open_context(data_dir, config, "")?;
            println!(":root {{");
            for (name, value) in context.manager().css_properties() {
                println!("  {name}: {value};");
            }
            println!("}}");
        }

        Commands::Input { action } => {
            let (context, _) = open_context(data_dir, config, "")?;
            match action {
                InputAction::Set { id, value } => {
                    context.store_input_value(&id, &value);
                    println!("Stored {id}");
                }
                InputAction::Get { id } => {
                    println!("{}", context.get_stored_input_value(&id));
                }
            }
        }
    }

    Ok(())
}
