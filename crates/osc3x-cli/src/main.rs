//! osc3x CLI - render MIDI tracks through the three-oscillator synthesizer.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "osc3x")]
#[command(author, version, about = "Three-oscillator polyphonic synthesizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one MIDI track to a WAV file
    Render(commands::render::RenderArgs),

    /// Print the note schedule of one MIDI track
    Events(commands::events::EventsArgs),

    /// Show a preset or list the available presets
    Preset(commands::preset::PresetArgs),

    /// Render every song in a manifest with every preset in a directory
    Batch(commands::batch::BatchArgs),

    /// List audio output devices
    Devices(commands::devices::DevicesArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Events(args) => commands::events::run(args),
        Commands::Preset(args) => commands::preset::run(args),
        Commands::Batch(args) => commands::batch::run(args),
        Commands::Devices(args) => commands::devices::run(args),
    }
}
