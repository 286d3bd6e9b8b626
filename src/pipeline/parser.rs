//! Parser for the piano-roll tab notation
//!
//! Format:
//! ```text
//!    | 1                 |        <- header rows start with a space
//! C#4|    :    :    :  # |
//! C4 |##  :    :    :    |
//! ```
//!
//! Each data line is a lane: a 2 or 3 character note name, `|` at index 3,
//! then grid columns, ending with `|`. Every non-separator character is one
//! sixteenth of a bar; `#` holds the lane's note, anything else is silence.
//! `|` and `:` are bar and beat markers and take up no time.

use tracing::{debug, warn};

use crate::error::{Result, SynthError};
use crate::pipeline::note::Note;
use crate::units::{Bpm, Seconds};

const LANE_SEPARATOR: u8 = b'|';
const SUSTAIN: char = '#';
const MIN_LANE_LENGTH: usize = 6;

/// A note with its onset and offset in seconds from the start of the piece.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    pub note: Note,
    pub on: Seconds,
    pub off: Seconds,
}

/// Parsed notation: the piece length and its note events.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub duration: Seconds,
    /// Lane by lane in declaration order, left to right within a lane.
    pub events: Vec<NoteEvent>,
}

impl Score {
    pub fn parse(bpm: Bpm, text: &str) -> Result<Self> {
        let lanes = extract_lanes(text)?;
        let sixteenth = bpm.sixteenth();

        let duration = sixteenth.scaled(count_columns(grid(lanes[0])) as f32);

        let mut events = Vec::new();
        for lane in &lanes {
            let note = lane_note(lane)?;
            parse_lane_events(note, grid(lane), sixteenth, &mut events);
        }

        debug!(
            lanes = lanes.len(),
            events = events.len(),
            duration = duration.value(),
            "parsed notation"
        );

        Ok(Self { duration, events })
    }
}

/// Length of the piece described by `text`, without collecting events.
pub fn parse_music_length(bpm: Bpm, text: &str) -> Result<Seconds> {
    let lanes = extract_lanes(text)?;
    Ok(bpm
        .sixteenth()
        .scaled(count_columns(grid(lanes[0])) as f32))
}

fn is_separator(c: char) -> bool {
    c == '|' || c == ':'
}

/// Grid part of a validated lane (everything after the `|` at index 3).
fn grid(lane: &str) -> &str {
    &lane[4..]
}

fn count_columns(grid: &str) -> usize {
    grid.chars().filter(|&c| !is_separator(c)).count()
}

fn lane_note(lane: &str) -> Result<Note> {
    let name_len = match lane.as_bytes()[2] {
        b' ' | b'|' | b':' => 2,
        _ => 3,
    };
    let name = lane
        .get(..name_len)
        .ok_or_else(|| SynthError::format(format!("invalid lane name in '{lane}'")))?;
    Note::parse(name)
}

fn parse_lane_events(note: Note, grid: &str, sixteenth: Seconds, events: &mut Vec<NoteEvent>) {
    let mut run_start: Option<usize> = None;
    let mut column = 0usize;

    for c in grid.chars().filter(|&c| !is_separator(c)) {
        match (run_start, c == SUSTAIN) {
            (None, true) => run_start = Some(column),
            (Some(start), false) => {
                events.push(NoteEvent {
                    note,
                    on: sixteenth.scaled(start as f32),
                    off: sixteenth.scaled(column as f32),
                });
                run_start = None;
            }
            _ => {}
        }
        column += 1;
    }

    if let Some(start) = run_start {
        warn!(
            note = %note,
            column = start,
            "sustain run reaches the end of the lane and is not played"
        );
    }
}

/// Split into lanes, drop header/comment rows and validate the grid shape.
fn extract_lanes(text: &str) -> Result<Vec<&str>> {
    let lanes: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty() && !line.starts_with(' '))
        .collect();

    let Some(first) = lanes.first() else {
        return Err(SynthError::format("no music lines found"));
    };

    let len = first.len();
    if len < MIN_LANE_LENGTH {
        return Err(SynthError::format("music lines are too short"));
    }

    for lane in &lanes {
        if lane.len() != len {
            return Err(SynthError::format(format!(
                "music lines have different lengths: '{lane}'"
            )));
        }
        if lane.as_bytes()[3] != LANE_SEPARATOR {
            return Err(SynthError::format(format!(
                "music line needs a 2 or 3 char note name and '|' at index 3: '{lane}'"
            )));
        }
        if !lane.ends_with('|') {
            return Err(SynthError::format(format!(
                "music line must end with '|': '{lane}'"
            )));
        }
    }

    Ok(lanes)
}
