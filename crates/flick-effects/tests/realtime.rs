//! The audio path must not allocate once built.

use assert_no_alloc::{AllocDisabler, assert_no_alloc};
use flick_effects::{BypassState, EffectParameters, MonoStereoMode, Pipeline, ReverbType, TremoloMode};

#[cfg(debug_assertions)]
#[global_allocator]
static ALLOCATOR: AllocDisabler = AllocDisabler;

const SR: f32 = 48000.0;
const BLOCK: usize = 8;

#[test]
fn block_processing_does_not_allocate() {
    let mut pipeline = Pipeline::new(SR);
    let mut params = EffectParameters::new(SR);
    params.bypass = BypassState {
        reverb: false,
        delay: false,
        tremolo: false,
    };
    params.mono_stereo = MonoStereoMode::Siso;
    let input: [f32; BLOCK] = core::array::from_fn(|i| (i as f32 * 0.3).sin() * 0.5);
    let mut out_l = [0.0f32; BLOCK];
    let mut out_r = [0.0f32; BLOCK];

    assert_no_alloc(|| {
        for (block, (kind, mode)) in [
            (ReverbType::Plate, TremoloMode::Sine),
            (ReverbType::Spring, TremoloMode::Square),
            (ReverbType::Hall, TremoloMode::Harmonic),
        ]
        .into_iter()
        .cycle()
        .take(600)
        .enumerate()
        {
            params.reverb_type = kind;
            params.tremolo_mode = mode;
            params.delay_time_samples = 2400.0 + block as f32;
            pipeline.update(&params);
            pipeline.process_block(&input, &input, &mut out_l, &mut out_r);
            if block % 100 == 99 {
                pipeline.clear_reverb();
            }
        }
    });

    assert!(out_l.iter().chain(&out_r).all(|s| s.is_finite()));
}
