//! Plot one envelope to SVG and check it for jumps
//!
//! Usage:
//!   plot-envelope <attack_ms> <decay_ms> <sustain> <release_ms> <note_off_ms> <output.svg>

use clap::Parser;
use plotters::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gridsynth::generator::{Envelope, EnvelopePhase, EnvelopeShape};
use gridsynth::units::{Level, SampleRate, Seconds};

const SAMPLE_RATE: u32 = 1000; // 1ms = 1 sample
const MAX_SAMPLES: usize = 100_000;
// Float slack on top of the steepest ramp step
const STEP_TOLERANCE: f32 = 1e-4;

#[derive(Parser)]
#[command(name = "plot-envelope")]
#[command(about = "Plot an attack/decay/sustain/release envelope to SVG", long_about = None)]
struct Args {
    attack_ms: f32,
    decay_ms: f32,
    sustain_level: f32,
    release_ms: f32,
    /// Time of the note-off, from the note-on
    note_off_ms: f32,
    output_path: String,
}

impl Args {
    fn shape(&self) -> gridsynth::Result<EnvelopeShape> {
        Ok(EnvelopeShape::new(
            Seconds::from_millis(self.attack_ms)?,
            Level::FULL,
            Seconds::from_millis(self.decay_ms)?,
            Level::new(self.sustain_level),
            Seconds::from_millis(self.release_ms)?,
        ))
    }
}

fn generate_envelope(
    shape: &EnvelopeShape,
    rate: SampleRate,
    note_off: Seconds,
) -> Result<(Vec<f32>, Vec<EnvelopePhase>), Box<dyn std::error::Error>> {
    let mut envelope = Envelope::new(shape, rate);
    envelope.note_on_for(0, note_off.to_samples(rate));

    let mut samples = Vec::new();
    let mut phases = Vec::new();
    let mut gain = [0.0f32; 1];

    while !envelope.is_idle() {
        // One sample at a time so every sample gets its own phase
        envelope.fill(&mut gain);
        samples.push(gain[0]);
        phases.push(envelope.phase());

        if samples.len() > MAX_SAMPLES {
            return Err("Envelope exceeded maximum duration".into());
        }
    }

    Ok((samples, phases))
}

/// Largest per-sample change any of the ramps is allowed to make.
fn steepest_step(shape: &EnvelopeShape, rate: SampleRate) -> f32 {
    let step =
        |from: f32, to: f32, time: Seconds| (to - from).abs() / time.to_samples(rate).max(1) as f32;
    let attack = shape.attack_level.value();
    let decay = shape.decay_level.value();
    step(0.0, attack, shape.attack_time)
        .max(step(attack, decay, shape.decay_time))
        .max(step(decay, 0.0, shape.release_time))
}

fn check_discontinuities(
    samples: &[f32],
    threshold: f32,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut max_diff: f32 = 0.0;
    let mut max_diff_idx: usize = 0;

    for (i, pair) in samples.windows(2).enumerate() {
        let diff = (pair[1] - pair[0]).abs();
        if diff > max_diff {
            max_diff = diff;
            max_diff_idx = i + 1;
        }
    }

    if max_diff > threshold {
        return Err(format!(
            "DISCONTINUITY at sample {}: {} -> {} (diff = {}, allowed {})",
            max_diff_idx,
            samples[max_diff_idx - 1],
            samples[max_diff_idx],
            max_diff,
            threshold
        )
        .into());
    }

    info!(max_diff, at = max_diff_idx, threshold, "no discontinuities");
    Ok(())
}

fn create_plot(
    args: &Args,
    samples: &[f32],
    phases: &[EnvelopePhase],
) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(&args.output_path, (800, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_time = samples.len().saturating_sub(1) as f32;
    let title = format!(
        "A={}ms, D={}ms, S={:.2}, R={}ms, note_off={}ms",
        args.attack_ms, args.decay_ms, args.sustain_level, args.release_ms, args.note_off_ms
    );

    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f32..max_time.max(1.0), 0f32..1.1f32)?;

    chart
        .configure_mesh()
        .x_desc("Time (ms)")
        .y_desc("Gain")
        .x_labels(10)
        .y_labels(10)
        .draw()?;

    chart.draw_series(LineSeries::new(
        samples.iter().enumerate().map(|(i, &s)| (i as f32, s)),
        BLUE.stroke_width(2),
    ))?;

    // Phase transitions
    chart.draw_series(
        phases
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[0] != pair[1])
            .map(|(i, _)| {
                plotters::element::Cross::new(((i + 1) as f32, samples[i + 1]), 8, BLACK.filled())
            }),
    )?;

    // Note-off marker
    let note_off = args.note_off_ms.min(max_time);
    let note_off_gain = samples.get(note_off as usize).copied().unwrap_or(0.0);
    chart.draw_series(std::iter::once(plotters::element::Circle::new(
        (note_off, note_off_gain),
        5,
        RED.filled(),
    )))?;

    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let rate = SampleRate::new(SAMPLE_RATE)?;
    let shape = args.shape()?;
    let note_off = Seconds::from_millis(args.note_off_ms)?;

    let (samples, phases) = generate_envelope(&shape, rate, note_off)?;
    info!(samples = samples.len(), "generated envelope");

    // Release starts at note-off; it is over within one sample of its length
    let expected = note_off.plus(shape.release_time).to_samples(rate) as usize;
    if samples.len().abs_diff(expected) > 2 {
        return Err(format!(
            "Duration mismatch: expected about {} samples but got {}",
            expected,
            samples.len()
        )
        .into());
    }

    check_discontinuities(&samples, steepest_step(&shape, rate) + STEP_TOLERANCE)?;
    create_plot(&args, &samples, &phases)?;

    info!(output = %args.output_path, "done");
    Ok(())
}
