//! Property-based tests for flick-core DSP primitives.
//!
//! Filter stability across the design space, smoothing convergence, LFO
//! bounds and delay line integrity, driven by proptest.

use flick_core::{
    Biquad, InterpolatedDelay, Lfo, LfoWaveform, OnePole, OnePoleHighpass, SmoothedParam, biquad,
};
use proptest::prelude::*;

const SR: f32 = 48000.0;

fn design(variant: usize, freq: f32, q: f32, gain_db: f32) -> flick_core::BiquadCoefficients {
    match variant % 4 {
        0 => biquad::lowpass(freq, q, SR),
        1 => biquad::highpass(freq, q, SR),
        2 => biquad::peaking(freq, q, gain_db, SR),
        _ => biquad::low_shelf(freq, q.min(1.0), gain_db, SR),
    }
}

fn waveform(index: usize) -> LfoWaveform {
    match index % 3 {
        0 => LfoWaveform::Sine,
        1 => LfoWaveform::Triangle,
        _ => LfoWaveform::RoundedSquare,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Every RBJ design produces finite output for bounded input.
    #[test]
    fn biquad_stability(
        freq in 20.0f32..20000.0f32,
        q in 0.1f32..40.0f32,
        gain_db in -30.0f32..12.0f32,
        variant in 0usize..4,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut filter = Biquad::with_coefficients(design(variant, freq, q, gain_db));
        for _ in 0..32 {
            for &sample in &input {
                let out = filter.process(sample);
                prop_assert!(
                    out.is_finite(),
                    "variant {} (freq={}, q={}, gain={}) produced {}",
                    variant, freq, q, gain_db, out
                );
            }
        }
    }

    /// The one-pole split recombines to the input: lp + hp == x.
    #[test]
    fn one_pole_split_is_complementary(
        freq in 20.0f32..20000.0f32,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut lp = OnePole::new(SR, freq);
        let mut hp = OnePoleHighpass::new(SR, freq);
        for &x in &input {
            let sum = lp.process(x) + hp.process(x);
            prop_assert!((sum - x).abs() < 1e-5, "lp + hp = {} for x = {}", sum, x);
        }
    }

    /// Smoothing never overshoots and ends near the target.
    #[test]
    fn smoothed_param_convergence(
        start in -10.0f32..10.0f32,
        target in -10.0f32..10.0f32,
        time_ms in 0.1f32..20.0f32,
    ) {
        let mut p = SmoothedParam::with_config(start, SR, time_ms);
        p.set_target(target);
        let (lo, hi) = if start < target { (start, target) } else { (target, start) };
        let samples = (time_ms * 0.001 * SR * 10.0) as usize + 1;
        for _ in 0..samples {
            let v = p.advance();
            prop_assert!(v >= lo - 1e-4 && v <= hi + 1e-4);
        }
        prop_assert!((p.get() - target).abs() < 1e-3 * (1.0 + (target - start).abs()));
    }

    /// The LFO never exceeds its amplitude, for every waveform and rate.
    #[test]
    fn lfo_bounded_by_amplitude(
        freq in 0.0f32..30.0f32,
        amplitude in 0.0f32..1.25f32,
        wave in 0usize..3,
        phase in 0.0f32..1.0f32,
    ) {
        let mut lfo = Lfo::new(SR, freq);
        lfo.set_waveform(waveform(wave));
        lfo.set_amplitude(amplitude);
        lfo.set_phase(phase);
        for _ in 0..2048 {
            let v = lfo.next();
            prop_assert!(v.abs() <= amplitude + 1e-5, "{:?} gave {}", waveform(wave), v);
        }
    }

    /// A written impulse is read back at exactly its integer delay.
    #[test]
    fn delay_line_integrity(
        capacity in 2usize..4096,
        delay_fraction in 0.0f32..1.0f32,
    ) {
        let mut line = InterpolatedDelay::new(capacity);
        let delay = ((capacity - 1) as f32 * delay_fraction) as usize;
        line.write(1.0);
        for _ in 0..delay {
            line.write(0.0);
        }
        prop_assert_eq!(line.read(delay as f32), 1.0);
    }
}
