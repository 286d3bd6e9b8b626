use std::io::Cursor;

use pretty_assertions::assert_eq;

use gridsynth::generator::{SignalGenerator, SineOscillator};
use gridsynth::pipeline::{Instrument, InstrumentConfig, Mixer, Note, Score, Sequencer};
use gridsynth::units::{BlockSize, Bpm, Frequency, Level, SampleRate, Seconds};
use gridsynth::wav::WavLayout;
use gridsynth::{RenderCache, Song, SongConfig};

const SONG: &str = r#"
sample_rate = 8000
block_size = 128

[instrument]
waveform = "triangle"
level_db = -6.0

[instrument.envelope]
attack = 0.005
decay = 0.05
decay_level = 0.6
release = 0.1

[notation]
bpm = 120
text = """
   | 1                 | 2                 |
E4 |    :    :    :####|    :    :    :    |
C4 |####:    :####:    |####:    :    :    |
"""
"#;

fn read_wav(bytes: &[u8]) -> (hound::WavSpec, Vec<i16>) {
    let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
    let spec = reader.spec();
    let samples = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    (spec, samples)
}

#[test]
fn test_song_file_renders_readable_wav() {
    let song = Song::from_toml(SONG).unwrap();
    // Two bars at 120 BPM
    assert_eq!(song.duration().value(), 4.0);

    let bytes = song.render();
    let (spec, samples) = read_wav(&bytes);

    assert_eq!(
        spec,
        hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    );
    assert_eq!(samples.len(), 32000);
    assert!(samples.iter().any(|&s| s != 0));
    assert!(samples.iter().all(|&s| s != i16::MIN));
}

#[test]
fn test_song_is_silent_where_no_note_sounds() {
    let song = Song::from_toml(SONG).unwrap();
    let (_, samples) = read_wav(&song.render());

    // C4 ends at 0.5 s with 0.1 s of release; the next note starts at 1.0 s
    assert!(samples[4900..8000].iter().all(|&s| s == 0));
    assert!(samples[8000..8400].iter().any(|&s| s != 0));

    // Last note ends at 2.5 s; the rest of the second bar is silent
    assert!(samples[21000..].iter().all(|&s| s == 0));
}

#[test]
fn test_sequencer_matches_direct_instrument_calls() {
    let rate = SampleRate::new(4000).unwrap();
    let block = BlockSize::new(100).unwrap();
    let layout = WavLayout::new(rate, Seconds::new(1.0).unwrap(), block).unwrap();
    let config = InstrumentConfig::default();

    let bpm = Bpm::new(120.0).unwrap();
    let score = Score::parse(bpm, "A4 |  ##:    :    :    |\n").unwrap();
    let mut sequenced = Sequencer::new(Instrument::with_block_size(config, rate, 100), rate);
    sequenced.load_score(&score).unwrap();
    let from_score = layout.render(&mut sequenced);

    // Same note, played by hand: columns 2..4 are 0.25 s..0.5 s = samples 1000..2000
    let mut direct = Sequencer::new(Instrument::with_block_size(config, rate, 100), rate);
    direct
        .enqueue(Note::parse("A4").unwrap(), 1000, 2000)
        .unwrap();
    let from_calls = layout.render(&mut direct);

    assert_eq!(from_score, from_calls);
}

#[test]
fn test_mixer_output_stays_in_range() {
    let rate = SampleRate::new(8000).unwrap();
    let duration = Seconds::new(0.5).unwrap();
    let layout = WavLayout::new(rate, duration, BlockSize::new(64).unwrap()).unwrap();

    let mut low = SineOscillator::new(Frequency::new(220.0).unwrap(), Level::FULL, rate);
    let mut high = SineOscillator::new(Frequency::new(330.0).unwrap(), Level::FULL, rate);
    let mut mixer = Mixer::new();
    mixer.add(&mut low);
    mixer.add(&mut high);

    let (_, samples) = read_wav(&layout.render(&mut mixer));
    assert_eq!(samples.len(), 4032);
    assert!(samples.contains(&i16::MAX));
    assert!(samples.iter().all(|&s| (-i16::MAX..=i16::MAX).contains(&s)));
}

#[test]
fn test_render_cache_returns_same_bytes_as_song() {
    let config = SongConfig::parse(SONG).unwrap();
    let expected = Song::from_config(&config).unwrap().render();

    let mut cache = RenderCache::new();
    assert_eq!(cache.render(&config).unwrap(), expected.as_slice());
    assert_eq!(cache.render(&config).unwrap(), expected.as_slice());
    assert_eq!(cache.hits(), 1);
}

#[test]
fn test_instrument_renders_through_trait_object() {
    let rate = SampleRate::new(1000).unwrap();
    let mut instrument = Instrument::new(InstrumentConfig::default(), rate);
    instrument.note_on(Note::parse("C4").unwrap(), 0);

    let source: &mut dyn SignalGenerator = &mut instrument;
    let mut buffer = [0.0f32; 32];
    source.render(&mut buffer);
    assert!(buffer.iter().any(|&s| s != 0.0));
}
