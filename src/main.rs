//! Render a song file to a wav file
//!
//! Usage: gridsynth <song.toml> [-o output.wav] [-d seconds]

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gridsynth::{Song, SongConfig};

#[derive(Parser)]
#[command(name = "gridsynth")]
#[command(author, version, long_about = None)]
#[command(about = "Render piano-roll notation to 16-bit PCM wav")]
struct Cli {
    /// Song file (TOML)
    song: PathBuf,

    /// Output wav path (defaults to the song path with a .wav extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the song length in seconds
    #[arg(short, long)]
    duration: Option<f32>,
}

fn run(cli: Cli) -> gridsynth::Result<()> {
    let mut config = SongConfig::load(&cli.song)?;
    if cli.duration.is_some() {
        config.duration = cli.duration;
    }

    let song = Song::from_config(&config)?;
    info!(
        song = %cli.song.display(),
        rate = config.sample_rate,
        seconds = song.duration().value(),
        "rendering"
    );

    let bytes = song.render();
    let output = cli.output.unwrap_or_else(|| cli.song.with_extension("wav"));
    std::fs::write(&output, &bytes)?;

    info!(path = %output.display(), bytes = bytes.len(), "wrote wav");
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
