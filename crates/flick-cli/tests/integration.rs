//! Integration tests for the `flick` binary.

use std::path::Path;
use std::process::Command;

fn flick_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_flick"))
}

fn write_test_wav(path: &Path, channels: u16, frames: usize) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: 48_000,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        let s = (i as f32 * 440.0 * std::f32::consts::TAU / 48_000.0).sin() * 0.5;
        for _ in 0..channels {
            writer.write_sample(s).unwrap();
        }
    }
    writer.finalize().unwrap();
}

fn read_wav(path: &Path) -> (hound::WavSpec, Vec<f32>) {
    let reader = hound::WavReader::open(path).unwrap();
    let spec = reader.spec();
    let samples = reader.into_samples::<f32>().map(Result::unwrap).collect();
    (spec, samples)
}

// ---------------------------------------------------------------------------
// `flick settings`
// ---------------------------------------------------------------------------

#[test]
fn settings_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("flick.toml");

    let output = flick_bin()
        .args(["settings", "init"])
        .arg(&path)
        .output()
        .expect("failed to run flick settings init");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("version = 5"));

    let output = flick_bin().args(["settings", "show"]).arg(&path).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("decay"));
    assert!(stdout.contains("Mimo"));
    assert!(stdout.contains("reverb         off"));
}

#[test]
fn settings_init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flick.toml");
    std::fs::write(&path, "keep me").unwrap();

    let output = flick_bin().args(["settings", "init"]).arg(&path).output().unwrap();
    assert!(!output.status.success());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");

    let output = flick_bin().args(["settings", "init", "--force"]).arg(&path).output().unwrap();
    assert!(output.status.success());
}

#[test]
fn settings_show_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = flick_bin()
        .args(["settings", "show"])
        .arg(dir.path().join("absent.toml"))
        .output()
        .unwrap();
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// `flick process`
// ---------------------------------------------------------------------------

#[test]
fn process_writes_stereo_float_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.wav");
    let out = dir.path().join("out.wav");
    write_test_wav(&input, 1, 4803);

    let output = flick_bin()
        .arg("process")
        .arg(&input)
        .arg(&out)
        .args(["--delay", "--tremolo", "--toggles", "up,middle,down"])
        .output()
        .expect("failed to run flick process");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let (spec, samples) = read_wav(&out);
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.bits_per_sample, 32);
    assert_eq!(spec.sample_format, hound::SampleFormat::Float);
    assert_eq!(spec.sample_rate, 48_000);
    assert_eq!(samples.len(), 4803 * 2);
    assert!(samples.iter().all(|s| s.is_finite()));
    assert!(samples.iter().any(|s| s.abs() > 0.01));
}

#[test]
fn process_with_settings_file_in_miso_duplicates_channels() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("flick.toml");
    let status = flick_bin().args(["settings", "init"]).arg(&settings).status().unwrap();
    assert!(status.success());
    let defaults = std::fs::read_to_string(&settings).unwrap();
    std::fs::write(&settings, defaults.replace("mono_stereo_mode = 0", "mono_stereo_mode = 1")).unwrap();

    let input = dir.path().join("in.wav");
    let out = dir.path().join("out.wav");
    write_test_wav(&input, 2, 2400);

    let status = flick_bin()
        .arg("process")
        .arg(&input)
        .arg(&out)
        .arg("--settings")
        .arg(&settings)
        .status()
        .unwrap();
    assert!(status.success());

    let (_, samples) = read_wav(&out);
    for frame in samples.chunks(2) {
        assert_eq!(frame[0], frame[1]);
    }
    assert!(std::fs::read_to_string(&settings).unwrap().contains("mono_stereo_mode = 1"));
}

#[test]
fn process_rejects_bad_knob_list() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.wav");
    write_test_wav(&input, 1, 64);

    let output = flick_bin()
        .arg("process")
        .arg(&input)
        .arg(dir.path().join("out.wav"))
        .args(["--knobs", "0.1,0.2"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
