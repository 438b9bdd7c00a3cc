//! End-to-end scenarios: a full `PedalContext` driven through `SimPlatform`.

use flick_config::{DefaultReason, LoadOutcome, MemoryStorage, PersistedSettings, SCHEMA_VERSION};
use flick_effects::NotchStage;
use flick_platform::{ControlStatus, Footswitch, PedalContext, PedalMode, PlatformController, SimPlatform};

const SR: f32 = 48_000.0;
const BLOCK: usize = 8;
const BLOCKS_PER_MS: usize = 6;

type Pedal = PedalContext<SimPlatform, MemoryStorage>;

fn boot_with(storage: MemoryStorage, sim: SimPlatform) -> Pedal {
    PedalContext::boot(sim, storage, SR)
}

fn boot() -> Pedal {
    boot_with(MemoryStorage::new(), SimPlatform::new())
}

/// Plays a square wave of amplitude `level` on both inputs for `ms`
/// milliseconds, ticking the control loop every 10 ms. Returns the output
/// energy.
fn play_ms(pedal: &mut Pedal, ms: u32, level: f32) -> f32 {
    let mut input = [0.0f32; BLOCK];
    let (mut l, mut r) = ([0.0f32; BLOCK], [0.0f32; BLOCK]);
    let mut frame = 0usize;
    let mut energy = 0.0;
    for _ in 0..ms {
        pedal.hardware_mut().advance_us(1000);
        for _ in 0..BLOCKS_PER_MS {
            for sample in &mut input {
                *sample = if (frame / 55) % 2 == 0 { level } else { -level };
                frame += 1;
            }
            pedal.audio_callback(&input, &input, &mut l, &mut r);
            energy += l.iter().chain(&r).map(|s| s * s).sum::<f32>();
        }
        if pedal.hardware().now_ms() % 10 == 0 {
            pedal.control_tick().unwrap();
        }
    }
    energy
}

/// Runs silent audio for `ms` milliseconds.
fn run_ms(pedal: &mut Pedal, ms: u32) {
    play_ms(pedal, ms, 0.0);
}

/// Holds `footswitch` for `hold_ms`, then releases it and lets `after_ms`
/// pass.
fn press(pedal: &mut Pedal, footswitch: Footswitch, hold_ms: u32, after_ms: u32) {
    pedal.hardware_mut().set_footswitch(footswitch, true);
    run_ms(pedal, hold_ms);
    pedal.hardware_mut().set_footswitch(footswitch, false);
    run_ms(pedal, after_ms);
}

/// Boots holding FS2 and walks the knob through every reset stage.
fn factory_reset(settings: &PersistedSettings) -> Pedal {
    let mut sim = SimPlatform::new();
    sim.set_footswitch(Footswitch::Fs2, true);
    let mut pedal = boot_with(MemoryStorage::with_settings(settings), sim);
    assert_eq!(pedal.status(), ControlStatus::FactoryReset);

    pedal.hardware_mut().set_footswitch(Footswitch::Fs2, false);
    assert_eq!(pedal.control_tick().unwrap(), ControlStatus::FactoryReset);
    for (stage, knob) in [1.0, 0.0, 1.0].into_iter().enumerate() {
        pedal.hardware_mut().set_knob(0, knob);
        assert_eq!(pedal.control_tick().unwrap(), ControlStatus::FactoryReset, "stage {stage}");
    }
    pedal.hardware_mut().set_knob(0, 0.0);
    assert_eq!(pedal.control_tick().unwrap(), ControlStatus::Running);
    pedal
}

/// Reverb on, every knob at half, after some signal has filled the tank.
fn pedal_with_reverb_tail() -> Pedal {
    let settings = PersistedSettings {
        bypass_reverb: false,
        ..PersistedSettings::default()
    };
    let mut sim = SimPlatform::new();
    sim.set_knobs([0.5; 6]);
    let mut pedal = boot_with(MemoryStorage::with_settings(&settings), sim);
    assert!(play_ms(&mut pedal, 300, 0.5) > 0.0);
    pedal
}

fn saved(pedal: &Pedal) -> PersistedSettings {
    let bytes = pedal.storage().bytes().expect("settings were written");
    PersistedSettings::from_bytes(bytes).unwrap()
}

#[test]
fn miso_impulse_is_duplicated_and_only_notched() {
    let settings = PersistedSettings {
        mono_stereo_mode: 1,
        ..PersistedSettings::default()
    };
    let mut pedal = boot_with(MemoryStorage::with_settings(&settings), SimPlatform::new());
    pedal.hardware_mut().advance_us(1000);

    let mut reference = NotchStage::new(SR);
    let mut in_l = [0.0f32; BLOCK];
    in_l[0] = 1.0;
    let in_r = [0.0f32; BLOCK];

    for block in 0..64 {
        let (mut out_l, mut out_r) = ([0.0f32; BLOCK], [0.0f32; BLOCK]);
        let input = if block == 0 { in_l } else { [0.0; BLOCK] };
        pedal.audio_callback(&input, &in_r, &mut out_l, &mut out_r);
        for i in 0..BLOCK {
            let (expect_l, expect_r) = reference.process(input[i], input[i]);
            assert_eq!(out_l[i], out_r[i], "block {block} sample {i}");
            assert_eq!(out_l[i], expect_l);
            assert_eq!(out_r[i], expect_r);
        }
    }
}

#[test]
fn tap_tempo_with_only_delay_sets_delay_and_leaves_tremolo() {
    let mut pedal = boot();
    run_ms(&mut pedal, 20);

    press(&mut pedal, Footswitch::Fs2, 50, 700);
    assert!(!pedal.controller().params().bypass.delay);
    assert!(pedal.controller().params().bypass.tremolo);

    press(&mut pedal, Footswitch::Fs1, 50, 100);
    press(&mut pedal, Footswitch::Fs1, 50, 700);
    assert_eq!(pedal.mode(), PedalMode::TapTempo);
    assert!(pedal.controller().params().bypass.reverb);
    let tremolo_before = pedal.pipeline().tremolo_rate_hz();

    press(&mut pedal, Footswitch::Fs2, 50, 450);
    press(&mut pedal, Footswitch::Fs2, 50, 10);
    assert_eq!(pedal.controller().tap_tempo().interval_ms(), Some(500));
    assert_eq!(pedal.pipeline().target_delay_time_samples(), 0.5 * SR);

    run_ms(&mut pedal, 1500);
    assert!((pedal.pipeline().delay_time_samples() - 0.5 * SR).abs() < 50.0);
    assert_eq!(pedal.pipeline().tremolo_rate_hz(), tremolo_before);
}

#[test]
fn edit_reverb_small_knob_move_saves_captured_decay() {
    let mut sim = SimPlatform::new();
    sim.set_knobs([0.5; 6]);
    let mut pedal = boot_with(MemoryStorage::new(), sim);
    run_ms(&mut pedal, 20);

    pedal.hardware_mut().set_footswitch(Footswitch::Fs1, true);
    run_ms(&mut pedal, 2100);
    assert_eq!(pedal.mode(), PedalMode::EditReverb);
    pedal.hardware_mut().set_footswitch(Footswitch::Fs1, false);
    run_ms(&mut pedal, 20);

    pedal.hardware_mut().set_knob(2, 0.53);
    run_ms(&mut pedal, 20);
    assert_eq!(pedal.controller().params().reverb.decay, 0.8);

    press(&mut pedal, Footswitch::Fs2, 50, 30);
    assert_eq!(pedal.mode(), PedalMode::Normal);
    let stored = saved(&pedal);
    assert_eq!(stored.decay, 0.8);
    assert!(!stored.bypass_reverb);
}

#[test]
fn edit_reverb_large_knob_move_is_saved() {
    let mut pedal = boot();
    run_ms(&mut pedal, 20);
    pedal.hardware_mut().set_footswitch(Footswitch::Fs1, true);
    run_ms(&mut pedal, 2100);
    pedal.hardware_mut().set_footswitch(Footswitch::Fs1, false);
    pedal.hardware_mut().set_knob(2, 0.4);
    run_ms(&mut pedal, 20);
    press(&mut pedal, Footswitch::Fs2, 50, 30);
    assert_eq!(saved(&pedal).decay, 0.4);
}

#[test]
fn bypass_toggles_reach_storage_and_leds() {
    let mut pedal = boot();
    run_ms(&mut pedal, 20);
    press(&mut pedal, Footswitch::Fs1, 50, 30);
    assert_eq!(pedal.hardware().leds().0, 1.0);
    assert!(!saved(&pedal).bypass_reverb);

    run_ms(&mut pedal, 600);
    press(&mut pedal, Footswitch::Fs1, 50, 30);
    assert_eq!(pedal.hardware().leds().0, 0.0);
    assert!(saved(&pedal).bypass_reverb);
}

#[test]
fn version_mismatch_boots_defaults_and_rewrites_them() {
    let old = PersistedSettings {
        version: SCHEMA_VERSION + 1,
        decay: 0.2,
        ..PersistedSettings::default()
    };
    let mut pedal = boot_with(MemoryStorage::with_settings(&old), SimPlatform::new());
    assert_eq!(
        pedal.load_outcome(),
        LoadOutcome::Defaulted(DefaultReason::VersionMismatch {
            found: SCHEMA_VERSION + 1
        })
    );
    assert_eq!(pedal.control_tick().unwrap(), ControlStatus::Running);
    assert_eq!(saved(&pedal), PersistedSettings::default());
}

#[test]
fn factory_reset_restores_defaults() {
    let custom = PersistedSettings {
        decay: 0.3,
        mono_stereo_mode: 2,
        bypass_reverb: false,
        ..PersistedSettings::default()
    };
    let pedal = factory_reset(&custom);

    assert_eq!(pedal.mode(), PedalMode::Normal);
    assert_eq!(saved(&pedal), PersistedSettings::default());
    assert!(pedal.controller().params().bypass.reverb);
    assert_eq!(pedal.controller().params().reverb.decay, 0.8);
}

#[test]
fn factory_reset_mutes_until_complete() {
    let mut sim = SimPlatform::new();
    sim.set_footswitch(Footswitch::Fs2, true);
    let mut pedal = boot_with(MemoryStorage::new(), sim);

    let input = [0.5f32; BLOCK];
    let (mut l, mut r) = ([1.0f32; BLOCK], [1.0f32; BLOCK]);
    pedal.audio_callback(&input, &input, &mut l, &mut r);
    assert!(l.iter().chain(&r).all(|&s| s == 0.0));
}

#[test]
fn factory_reset_output_matches_a_fresh_boot() {
    let custom = PersistedSettings {
        bypass_reverb: false,
        bypass_delay: false,
        ..PersistedSettings::default()
    };
    let mut reset = factory_reset(&custom);
    let mut fresh = boot();

    let mut input = [0.0f32; BLOCK];
    input[0] = 1.0;
    for block in 0..600 {
        let (mut reset_l, mut reset_r) = ([0.0f32; BLOCK], [0.0f32; BLOCK]);
        let (mut fresh_l, mut fresh_r) = ([0.0f32; BLOCK], [0.0f32; BLOCK]);
        reset.audio_callback(&input, &input, &mut reset_l, &mut reset_r);
        fresh.audio_callback(&input, &input, &mut fresh_l, &mut fresh_r);
        assert_eq!((reset_l, reset_r), (fresh_l, fresh_r), "block {block}");
        input = [0.0; BLOCK];
    }
}

#[test]
fn fs1_double_press_keeps_the_reverb_tail() {
    let mut pedal = pedal_with_reverb_tail();
    press(&mut pedal, Footswitch::Fs1, 50, 100);
    press(&mut pedal, Footswitch::Fs1, 50, 10);
    assert_eq!(pedal.mode(), PedalMode::TapTempo);
    assert!(!pedal.controller().params().bypass.reverb);

    run_ms(&mut pedal, 600);
    assert!(play_ms(&mut pedal, 20, 0.0) > 1e-9);
}

#[test]
fn fs1_switch_off_flushes_the_tail_once_the_double_press_window_closes() {
    let mut kept = pedal_with_reverb_tail();
    press(&mut kept, Footswitch::Fs1, 50, 100);
    press(&mut kept, Footswitch::Fs1, 50, 610);
    let kept_energy = play_ms(&mut kept, 20, 0.0);

    let mut flushed = pedal_with_reverb_tail();
    press(&mut flushed, Footswitch::Fs1, 50, 600);
    assert!(flushed.controller().params().bypass.reverb);
    press(&mut flushed, Footswitch::Fs1, 50, 10);
    assert!(!flushed.controller().params().bypass.reverb);
    assert_eq!(flushed.mode(), PedalMode::Normal);
    let flushed_energy = play_ms(&mut flushed, 20, 0.0);

    assert!(kept_energy > 1e-9);
    assert!(flushed_energy < kept_energy * 1e-3, "{flushed_energy} vs {kept_energy}");
}

#[test]
fn factory_reset_abort_keeps_settings() {
    let custom = PersistedSettings {
        decay: 0.3,
        ..PersistedSettings::default()
    };
    let mut sim = SimPlatform::new();
    sim.set_footswitch(Footswitch::Fs2, true);
    let mut pedal = boot_with(MemoryStorage::with_settings(&custom), sim);

    pedal.hardware_mut().set_knob(0, 1.0);
    pedal.control_tick().unwrap();
    pedal.hardware_mut().set_footswitch(Footswitch::Fs2, false);
    pedal.control_tick().unwrap();
    pedal.hardware_mut().set_footswitch(Footswitch::Fs1, true);
    assert_eq!(pedal.control_tick().unwrap(), ControlStatus::Running);

    assert_eq!(pedal.settings().record().decay, 0.3);
    assert_eq!(pedal.storage().writes(), 0);
    pedal.hardware_mut().set_footswitch(Footswitch::Fs1, false);
    run_ms(&mut pedal, 30);
    assert_eq!(pedal.mode(), PedalMode::Normal);
}

#[test]
fn dual_hold_enters_bootloader_and_mutes() {
    let mut pedal = boot();
    run_ms(&mut pedal, 20);
    pedal.hardware_mut().set_footswitch(Footswitch::Fs1, true);
    pedal.hardware_mut().set_footswitch(Footswitch::Fs2, true);
    run_ms(&mut pedal, 5100);

    assert_eq!(pedal.status(), ControlStatus::Bootloader);
    assert!(pedal.hardware().bootloader_requested());
    let history = pedal.hardware().led_history();
    assert!(history.ends_with(&[[1.0, 0.0], [0.0, 1.0], [1.0, 0.0], [0.0, 1.0], [1.0, 0.0], [0.0, 1.0]]));

    let input = [0.5f32; BLOCK];
    let (mut l, mut r) = ([1.0f32; BLOCK], [1.0f32; BLOCK]);
    pedal.audio_callback(&input, &input, &mut l, &mut r);
    assert!(l.iter().chain(&r).all(|&s| s == 0.0));
}
