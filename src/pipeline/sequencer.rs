//! Sample-accurate note scheduling
//!
//! Pending notes sit in a min-heap keyed by onset sample. At every block
//! boundary the sequencer pops the notes whose onset falls inside the block
//! and hands them to its instrument with a block-relative start offset, then
//! renders the instrument.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tracing::trace;

use crate::error::{Result, SynthError};
use crate::generator::{Playable, SignalGenerator};
use crate::pipeline::note::Note;
use crate::pipeline::parser::Score;
use crate::units::{SampleRate, Seconds};

/// A note with absolute onset and offset in samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledNote {
    pub note: Note,
    pub onset: u32,
    pub offset: u32,
}

impl ScheduledNote {
    /// Length in samples
    pub fn duration(&self) -> u32 {
        self.offset - self.onset
    }
}

/// Heap entry; `seq` breaks onset ties in insertion order.
#[derive(Debug, Clone)]
struct Pending {
    seq: u64,
    scheduled: ScheduledNote,
}

impl Pending {
    fn key(&self) -> (u32, u64) {
        (self.scheduled.onset, self.seq)
    }
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Drives a [`Playable`] instrument from a queue of timed notes.
#[derive(Debug, Clone)]
pub struct Sequencer<I: Playable> {
    rate: SampleRate,
    instrument: I,
    queue: BinaryHeap<Reverse<Pending>>,
    next_seq: u64,
    /// Absolute sample index of the next block to render.
    block_start: u32,
}

impl<I: Playable> Sequencer<I> {
    /// Create a sequencer driving `instrument`
    ///
    /// # Arguments
    /// * `instrument` - Receives every dispatched note and renders the blocks
    /// * `rate` - Sample rate used to convert seconds into sample positions
    pub fn new(instrument: I, rate: SampleRate) -> Self {
        Self {
            rate,
            instrument,
            queue: BinaryHeap::new(),
            next_seq: 0,
            block_start: 0,
        }
    }

    /// Schedule `note` between two absolute sample positions.
    ///
    /// Fails with a configuration error when `offset < onset`.
    ///
    /// # Example
    /// ```
    /// use gridsynth::pipeline::{Instrument, InstrumentConfig, Note, Sequencer};
    /// use gridsynth::units::SampleRate;
    ///
    /// let rate = SampleRate::new(8000)?;
    /// let instrument = Instrument::new(InstrumentConfig::default(), rate);
    /// let mut sequencer = Sequencer::new(instrument, rate);
    /// sequencer.enqueue(Note::parse("A4")?, 0, 4000)?;
    /// assert_eq!(sequencer.pending(), 1);
    /// # Ok::<(), gridsynth::SynthError>(())
    /// ```
    pub fn enqueue(&mut self, note: Note, onset: u32, offset: u32) -> Result<()> {
        if offset < onset {
            return Err(SynthError::configuration(format!(
                "note {note} ends (sample {offset}) before it starts (sample {onset})"
            )));
        }
        self.queue.push(Reverse(Pending {
            seq: self.next_seq,
            scheduled: ScheduledNote {
                note,
                onset,
                offset,
            },
        }));
        self.next_seq += 1;
        Ok(())
    }

    /// Schedule `note` between two times from the start of the piece.
    pub fn enqueue_seconds(&mut self, note: Note, on: Seconds, off: Seconds) -> Result<()> {
        self.enqueue(note, on.to_samples(self.rate), off.to_samples(self.rate))
    }

    /// Schedule every event of a parsed score.
    pub fn load_score(&mut self, score: &Score) -> Result<()> {
        for event in &score.events {
            self.enqueue_seconds(event.note, event.on, event.off)?;
        }
        Ok(())
    }

    /// Notes not dispatched yet.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Absolute sample index of the next block.
    pub fn position(&self) -> u32 {
        self.block_start
    }

    /// Get the instrument being driven
    pub fn instrument(&self) -> &I {
        &self.instrument
    }

    /// True once every note has been dispatched and the instrument is silent.
    pub fn is_finished(&self) -> bool {
        self.queue.is_empty() && self.instrument.is_idle()
    }

    /// Dispatch the notes starting inside this block, then render it.
    pub fn advance(&mut self, buffer: &mut [f32]) {
        let len = buffer.len() as u32;
        let block_end = self.block_start.saturating_add(len);

        while let Some(Reverse(next)) = self.queue.peek() {
            if next.scheduled.onset >= block_end {
                break;
            }
            let Some(Reverse(pending)) = self.queue.pop() else {
                break;
            };
            let scheduled = pending.scheduled;
            let after = scheduled.onset.saturating_sub(self.block_start);
            trace!(
                note = %scheduled.note,
                onset = scheduled.onset,
                after,
                duration = scheduled.duration(),
                "dispatch note"
            );
            self.instrument
                .play_note(scheduled.note, after, scheduled.duration());
        }

        self.instrument.render(buffer);
        self.block_start = block_end;
    }
}

impl<I: Playable> SignalGenerator for Sequencer<I> {
    fn render(&mut self, buffer: &mut [f32]) {
        self.advance(buffer);
    }
}
