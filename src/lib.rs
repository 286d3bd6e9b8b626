//! gridsynth: render piano-roll notation to 16-bit PCM wav.
//!
//! ```no_run
//! use gridsynth::Song;
//!
//! let song = Song::from_toml(&std::fs::read_to_string("song.toml")?)?;
//! std::fs::write("song.wav", song.render())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod song;
pub mod units;
pub mod wav;

pub use cache::{cache_key, RenderCache};
pub use config::SongConfig;
pub use error::{Result, SynthError};
pub use song::Song;
