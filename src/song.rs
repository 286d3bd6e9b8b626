//! A fully validated piece, ready to render.

use tracing::debug;

use crate::config::SongConfig;
use crate::error::Result;
use crate::pipeline::{Instrument, Note, Score, Sequencer};
use crate::units::{BlockSize, Bpm, SampleRate, Seconds};
use crate::wav::WavLayout;

/// A piece with its instrument and every note already scheduled.
///
/// Rendering works on a copy of the prepared sequencer, so the same song
/// renders to identical bytes every time.
#[derive(Debug, Clone)]
pub struct Song {
    layout: WavLayout,
    duration: Seconds,
    sequencer: Sequencer<Instrument>,
}

impl Song {
    /// Validate a song file and schedule its notes.
    pub fn from_config(config: &SongConfig) -> Result<Self> {
        let rate = SampleRate::new(config.sample_rate)?;
        let block = BlockSize::new(config.block_size)?;
        let instrument_config = config.instrument.to_instrument_config()?;

        let instrument = Instrument::with_block_size(instrument_config, rate, block.samples());
        let mut sequencer = Sequencer::new(instrument, rate);

        let mut content_end = Seconds::ZERO;

        if let Some(notation) = &config.notation {
            let bpm = Bpm::new(notation.bpm)?;
            let score = Score::parse(bpm, &notation.text)?;
            sequencer.load_score(&score)?;
            content_end = score.duration;
        }

        let mut last_off = Seconds::ZERO;
        for entry in &config.notes {
            let note = Note::parse(&entry.note)?;
            let on = Seconds::new(entry.on)?;
            let off = Seconds::new(entry.off)?;
            sequencer.enqueue_seconds(note, on, off)?;
            if off > last_off {
                last_off = off;
            }
        }

        // Direct notes ring out for one release time past their note-off.
        let notes_end = last_off.plus(instrument_config.shape.release_time);
        let duration = match config.duration {
            Some(seconds) => Seconds::new(seconds)?,
            None if config.notation.is_none() => notes_end,
            None if !config.notes.is_empty() && notes_end > content_end => notes_end,
            None => content_end,
        };

        let layout = WavLayout::new(rate, duration, block)?;

        debug!(
            rate = rate.hz(),
            block = block.samples(),
            duration = duration.value(),
            notes = sequencer.pending(),
            samples = layout.sample_count(),
            "song ready"
        );

        Ok(Self {
            layout,
            duration,
            sequencer,
        })
    }

    /// Parse and validate a TOML song description.
    pub fn from_toml(content: &str) -> Result<Self> {
        Self::from_config(&SongConfig::parse(content)?)
    }

    pub fn duration(&self) -> Seconds {
        self.duration
    }

    pub fn layout(&self) -> &WavLayout {
        &self.layout
    }

    /// Render the whole song into a wav file image.
    pub fn render(&self) -> Vec<u8> {
        let mut sequencer = self.sequencer.clone();
        self.layout.render(&mut sequencer)
    }
}
