//! C4 Synth HID Preset Browser - Entry Point
//!
//! Lists the presets stored on the pedal and switches between them from the
//! command line. Presets are numbered 1-128 as in Neuro Desktop.

use anyhow::{Context, Result};
use c4_hid::{
    core::config::Config,
    hid::{HidTransport, PresetIndex},
    PresetList, PresetSession,
};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Width of the pedal-side preset name display
const SHORT_NAME_WIDTH: usize = 20;

#[derive(Parser)]
#[command(name = "c4-hid", about = "Browse and select presets on a Source Audio C4 Synth")]
struct Cli {
    /// Config file (defaults to the per-user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Delay after each command before polling the pedal (ms)
    #[arg(long)]
    settle_ms: Option<u64>,

    /// Time allowed for each preset to answer (ms)
    #[arg(long)]
    response_timeout_ms: Option<u64>,

    /// Use a simulated pedal instead of the USB device (needs the mock-hid feature)
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// List active presets
    List {
        /// Print presets as JSON
        #[arg(long)]
        json: bool,
    },
    /// Switch to a preset (1-128)
    Select { number: u32 },
    /// List presets, then prompt for selections (default)
    Interactive,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let command = cli.command.clone().unwrap_or(Commands::Interactive);

    if cli.mock {
        return run_mock(&config, command);
    }

    info!(
        "Opening C4 Synth (VID: 0x{:04X}, PID: 0x{:04X})",
        config.hid.vendor_id, config.hid.product_id
    );
    let mut session = PresetSession::open(&config).context("Failed to open C4 Synth")?;
    let result = run(&mut session, command);
    session.close();
    result
}

#[cfg(feature = "mock-hid")]
fn run_mock(config: &Config, command: Commands) -> Result<()> {
    info!("Using simulated pedal");
    let pedal = c4_hid::hid::mock::MockPedal::with_demo_presets();
    let mut session = PresetSession::with_transport(pedal, config.timing.clone());
    run(&mut session, command)
}

#[cfg(not(feature = "mock-hid"))]
fn run_mock(_config: &Config, _command: Commands) -> Result<()> {
    anyhow::bail!("--mock requires building with the mock-hid feature")
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(settle_ms) = cli.settle_ms {
        config.timing.settle_ms = settle_ms;
    }
    if let Some(timeout) = cli.response_timeout_ms {
        config.timing.response_timeout_ms = timeout;
    }

    Ok(config)
}

fn run<T: HidTransport>(session: &mut PresetSession<T>, command: Commands) -> Result<()> {
    match command {
        Commands::List { json } => {
            let presets = session.discover_presets()?;
            if json {
                print_json(presets)?;
            } else {
                print_presets(presets, None);
            }
        }
        Commands::Select { number } => {
            let index = PresetIndex::from_display_number(number)?;
            session.select_preset(index.value())?;
        }
        Commands::Interactive => {
            session.discover_presets()?;
            print_presets(session.presets(), None);
            interactive(session)?;
        }
    }
    Ok(())
}

fn print_presets(presets: &PresetList, active: Option<PresetIndex>) {
    println!("*--- {} Active Presets ---*", presets.len());
    for record in presets {
        let marker = if Some(record.index) == active { " [ACT]" } else { "" };
        println!("{:>4} - {}{}", record.index.display_number(), record.name, marker);
    }
    println!();
}

fn print_json(presets: &PresetList) -> Result<()> {
    let records: Vec<_> = presets
        .iter()
        .map(|record| {
            serde_json::json!({
                "number": record.index.display_number(),
                "index": record.index.value(),
                "name": record.name.as_str(),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

/// Prompt loop. An empty line exits; `n`/`p` step through the discovered presets.
fn interactive<T: HidTransport>(session: &mut PresetSession<T>) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("Choose Preset (1-128, n/p to browse, l to list) : ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();

        let target = match input {
            "" => break,
            "l" => {
                print_presets(session.presets(), session.active_preset());
                continue;
            }
            "n" | "p" => match browse(session.presets(), session.active_preset(), input == "n") {
                Some(index) => index,
                None => {
                    println!("No active presets");
                    continue;
                }
            },
            _ => match input.parse::<u32>().map(PresetIndex::from_display_number) {
                Ok(Ok(index)) => index,
                _ => {
                    println!("Enter a preset number between 1 and 128");
                    continue;
                }
            },
        };

        if let Err(e) = session.select_preset(target.value()) {
            warn!("Program change failed: {}", e);
            continue;
        }

        match session.presets().get(target) {
            Some(record) => println!(
                "> {:03} - {}",
                target.display_number(),
                record.name.short(SHORT_NAME_WIDTH)
            ),
            None => println!("> {:03} - (empty)", target.display_number()),
        }
    }

    Ok(())
}

/// Next or previous discovered preset relative to the active one, wrapping around
fn browse(presets: &PresetList, active: Option<PresetIndex>, forward: bool) -> Option<PresetIndex> {
    let pos = match active.and_then(|index| presets.position(index)) {
        Some(pos) if forward => presets.next_after(pos)?,
        Some(pos) => presets.prev_before(pos)?,
        None if presets.is_empty() => return None,
        None => 0,
    };
    presets.as_slice().get(pos).map(|record| record.index)
}
