//! File-based rendering through the pedal core.

use super::common::{StereoBuffer, linear_to_db, parse_dip, parse_knobs, parse_toggles, peak, read_wav_stereo, rms, write_wav_stereo};
use anyhow::Context;
use clap::Args;
use flick_config::{FileStorage, MemoryStorage, PersistedSettings, SettingsStorage};
use flick_platform::{CONTROL_TICK_MS, PedalContext, SimPlatform, TogglePosition};
use std::path::PathBuf;

/// Frames per audio callback, as on the pedal.
const BLOCK_SIZE: usize = 8;

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file (stereo, 32-bit float)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Settings file (TOML) to boot with; defaults otherwise. Never written.
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Knob positions 1-6 in 0..1, e.g. "0.5,0.2,0.6,0.4,0.3,0.5"
    #[arg(long, value_parser = parse_knobs, default_value = "0.5,0.2,0.5,0.4,0.3,0.5")]
    knobs: [f32; 6],

    /// Toggle positions 1-3, e.g. "up,middle,down"
    #[arg(long, value_parser = parse_toggles, default_value = "middle,middle,middle")]
    toggles: [TogglePosition; 3],

    /// DIP switches selecting the reverb: 00 plate, 01 spring, 10 hall
    #[arg(long, value_parser = parse_dip, default_value = "00")]
    dip: (bool, bool),

    /// Switch the reverb on
    #[arg(long)]
    reverb: bool,

    /// Switch the delay on
    #[arg(long)]
    delay: bool,

    /// Switch the tremolo on
    #[arg(long)]
    tremolo: bool,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    println!("Reading {}...", args.input.display());
    let (input, sample_rate) = read_wav_stereo(&args.input)?;
    println!(
        "  {} frames, {} Hz, {:.2}s",
        input.len(),
        sample_rate,
        input.len() as f32 / sample_rate as f32
    );

    let settings = boot_settings(&args)?;
    let mut sim = SimPlatform::new();
    sim.set_knobs(args.knobs);
    for (index, position) in args.toggles.into_iter().enumerate() {
        sim.set_toggle(index, position);
    }
    sim.set_dips(args.dip.0, args.dip.1);

    let mut pedal = PedalContext::boot(sim, MemoryStorage::with_settings(&settings), sample_rate as f32);
    tracing::info!(outcome = ?pedal.load_outcome(), "settings");
    tracing::debug!(params = ?pedal.controller().params(), "boot parameters");

    println!("Processing in {BLOCK_SIZE}-frame blocks...");
    let output = render(&mut pedal, &input, sample_rate)?;

    println!("\nStats:");
    for (name, samples_in, samples_out) in [
        ("L", &input.left, &output.left),
        ("R", &input.right, &output.right),
    ] {
        println!(
            "  {name}  in: RMS {:.1} dB, Peak {:.1} dB   out: RMS {:.1} dB, Peak {:.1} dB",
            linear_to_db(rms(samples_in)),
            linear_to_db(peak(samples_in)),
            linear_to_db(rms(samples_out)),
            linear_to_db(peak(samples_out)),
        );
    }

    println!("\nWriting {}...", args.output.display());
    write_wav_stereo(&args.output, &output, sample_rate)?;
    println!("Done!");

    Ok(())
}

fn boot_settings(args: &ProcessArgs) -> anyhow::Result<PersistedSettings> {
    let mut settings = match &args.settings {
        Some(path) => FileStorage::new(path)
            .load()
            .with_context(|| format!("loading settings from {}", path.display()))?
            .with_context(|| format!("settings file {} not found", path.display()))?,
        None => PersistedSettings::default(),
    };
    settings.bypass_reverb &= !args.reverb;
    settings.bypass_delay &= !args.delay;
    settings.bypass_tremolo &= !args.tremolo;
    Ok(settings)
}

/// Runs `input` through the pedal block by block, advancing the simulated
/// clock with the audio and ticking the control loop every
/// [`CONTROL_TICK_MS`] of audio.
fn render(
    pedal: &mut PedalContext<SimPlatform, MemoryStorage>,
    input: &StereoBuffer,
    sample_rate: u32,
) -> anyhow::Result<StereoBuffer> {
    let rate = u64::from(sample_rate.max(1));
    let tick_frames = (rate * u64::from(CONTROL_TICK_MS) / 1000).max(1);

    let mut output = StereoBuffer {
        left: vec![0.0; input.len()],
        right: vec![0.0; input.len()],
    };
    let mut clock_us = 0u64;
    let mut frames_done = 0u64;
    let mut next_tick = tick_frames;

    let blocks = input
        .left
        .chunks(BLOCK_SIZE)
        .zip(input.right.chunks(BLOCK_SIZE))
        .zip(output.left.chunks_mut(BLOCK_SIZE).zip(output.right.chunks_mut(BLOCK_SIZE)));
    for ((in_l, in_r), (out_l, out_r)) in blocks {
        pedal.audio_callback(in_l, in_r, out_l, out_r);

        frames_done += in_l.len() as u64;
        let now_us = frames_done * 1_000_000 / rate;
        pedal.hardware_mut().advance_us(now_us - clock_us);
        clock_us = now_us;

        if frames_done >= next_tick {
            next_tick += tick_frames;
            let status = pedal.control_tick().context("control loop")?;
            tracing::trace!(?status, frames_done, "control tick");
        }
    }

    Ok(output)
}
