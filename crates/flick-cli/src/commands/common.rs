//! Shared CLI helpers: argument parsers, stereo WAV I/O and level stats.

use anyhow::Context;
use flick_platform::TogglePosition;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

/// Parse six comma-separated knob positions in 0..1.
pub fn parse_knobs(s: &str) -> Result<[f32; 6], String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f32>().map_err(|e| format!("invalid knob value '{v}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    let knobs: [f32; 6] = values
        .try_into()
        .map_err(|v: Vec<f32>| format!("expected 6 knob values, got {}", v.len()))?;
    if let Some(bad) = knobs.iter().find(|k| !(0.0..=1.0).contains(*k)) {
        return Err(format!("knob value {bad} outside 0..1"));
    }
    Ok(knobs)
}

/// Parse three comma-separated toggle positions (`up`, `middle`, `down`).
pub fn parse_toggles(s: &str) -> Result<[TogglePosition; 3], String> {
    let positions = s.split(',').map(parse_toggle).collect::<Result<Vec<_>, _>>()?;
    positions
        .try_into()
        .map_err(|v: Vec<TogglePosition>| format!("expected 3 toggle positions, got {}", v.len()))
}

fn parse_toggle(s: &str) -> Result<TogglePosition, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "up" | "u" => Ok(TogglePosition::Up),
        "middle" | "mid" | "m" => Ok(TogglePosition::Middle),
        "down" | "d" => Ok(TogglePosition::Down),
        other => Err(format!("invalid toggle position '{other}' (expected up, middle or down)")),
    }
}

/// Parse the two DIP switches as a bit string: `00`, `01`, `10` or `11`.
pub fn parse_dip(s: &str) -> Result<(bool, bool), String> {
    match s.trim() {
        "00" => Ok((false, false)),
        "01" => Ok((false, true)),
        "10" => Ok((true, false)),
        "11" => Ok((true, true)),
        other => Err(format!("invalid DIP setting '{other}' (expected 00, 01, 10 or 11)")),
    }
}

/// Stereo sample buffers.
#[derive(Debug, Clone, Default)]
pub struct StereoBuffer {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
}

impl StereoBuffer {
    pub fn len(&self) -> usize {
        self.left.len()
    }
}

/// Read a WAV file as stereo. Mono files are duplicated to both channels;
/// channels past the second are dropped.
pub fn read_wav_stereo(path: &Path) -> anyhow::Result<(StereoBuffer, u32)> {
    let reader = WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<_, _>>()?
        }
    };

    let mut buffer = StereoBuffer::default();
    for frame in samples.chunks(channels) {
        let left = frame[0];
        buffer.left.push(left);
        buffer.right.push(frame.get(1).copied().unwrap_or(left));
    }
    Ok((buffer, spec.sample_rate))
}

/// Write a 32-bit float stereo WAV file.
pub fn write_wav_stereo(path: &Path, buffer: &StereoBuffer, sample_rate: u32) -> anyhow::Result<()> {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec).with_context(|| format!("creating {}", path.display()))?;
    for (&l, &r) in buffer.left.iter().zip(&buffer.right) {
        writer.write_sample(l)?;
        writer.write_sample(r)?;
    }
    writer.finalize()?;
    Ok(())
}

pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0, f32::max)
}

pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 { -120.0 } else { 20.0 * linear.log10() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_knob_list() {
        assert_eq!(parse_knobs("0,0.5,1,0.25, 0.75,0").unwrap(), [0.0, 0.5, 1.0, 0.25, 0.75, 0.0]);
        assert!(parse_knobs("0,0.5").is_err());
        assert!(parse_knobs("0,0,0,0,0,1.5").is_err());
        assert!(parse_knobs("0,0,0,0,0,x").is_err());
    }

    #[test]
    fn parses_toggle_list() {
        assert_eq!(
            parse_toggles("up,Middle,d").unwrap(),
            [TogglePosition::Up, TogglePosition::Middle, TogglePosition::Down]
        );
        assert!(parse_toggles("up,left,down").is_err());
        assert!(parse_toggles("up").is_err());
    }

    #[test]
    fn parses_dip_bits() {
        assert_eq!(parse_dip("10").unwrap(), (true, false));
        assert!(parse_dip("2").is_err());
    }

    #[test]
    fn db_of_silence_is_floor() {
        assert_eq!(linear_to_db(0.0), -120.0);
        assert!((linear_to_db(1.0)).abs() < 1e-6);
    }
}
