//! End-to-end behavior of the formation engine driven through `tick`

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use sakura_sigil::Settings;
use sakura_sigil::sim::{
    CameraRig, FormationState, FrameInput, HandClassification, HandSignal, Region, SceneState,
    ShapeConfig, ShapeSampler, tick,
};

const DT: f32 = 1.0 / 60.0;

fn session(seed: u64) -> SceneState {
    let settings = Settings {
        particle_count: 2_000,
        ..Settings::default()
    };
    SceneState::new(seed, &settings)
}

fn run(state: &mut SceneState, input: &FrameInput, frames: usize) {
    for _ in 0..frames {
        tick(state, input, DT);
    }
}

#[test]
fn ornament_targets_sit_on_star_tips() {
    let state = session(11);
    let targets = &state.ornaments.set().target;
    assert_eq!(targets.len(), 20);

    for (i, t) in targets.iter().enumerate().take(5) {
        assert!((t.length() - 6.5).abs() < 1e-4, "ornament {i} at {t}");
        assert_eq!(t.z, 0.0);
    }
    for (i, t) in targets.iter().enumerate().skip(5).take(5) {
        assert!((t.length() - 3.5).abs() < 1e-4, "ornament {i} at {t}");
    }
    // Inner star is rotated half a turn against the outer one
    let outer_tip = targets[0].truncate().normalize();
    let inner_tip = targets[5].truncate().normalize();
    assert!((outer_tip + inner_tip).length() < 1e-4);
}

#[test]
fn chaos_settles_on_scattered_positions() {
    let mut state = session(12);
    let mut input = FrameInput::default();
    input.set_formation_state(FormationState::Chaos);
    run(&mut state, &input, 600);

    assert!(state.mix() < 1e-4);
    let field = &state.particles;
    for i in 0..field.len() {
        let chaos = field.set().chaos[i];
        assert!(field.blended_position(i).distance(chaos) < 1e-3);
    }
    assert_eq!(state.core_glow, 0.0);
}

#[test]
fn formed_settles_on_sigil_with_quiet_drift() {
    let mut state = session(13);
    let input = FrameInput::default();
    assert_eq!(input.formation, FormationState::Formed);
    run(&mut state, &input, 600);

    assert!(state.mix() > 1.0 - 1e-4);
    let field = &state.particles;
    for i in 0..field.len() {
        let target = field.set().target[i];
        assert!(field.blended_position(i).distance(target) < 1e-3);
    }
    assert!((field.frame().noise_amplitude - 0.02).abs() < 1e-4);
    assert_eq!(state.core_glow, 1.0);
    // Past the gate the whole cloud has started rolling
    assert!(field.roll() < 0.0);
}

#[test]
fn absent_hand_keeps_camera_centered() {
    let target = CameraRig::target_for(&HandSignal::absent(), 18.0);
    assert_eq!(target, Vec3::new(0.0, 0.0, 18.0));

    let mut state = session(14);
    let mut input = FrameInput::default();
    input.set_hand_signal(0.0, 0.0, true);
    run(&mut state, &input, 60);
    assert!(state.camera.position().x < -1.0);

    input.set_hand_signal(0.0, 0.0, false);
    run(&mut state, &input, 900);
    let p = state.camera.position();
    assert!(p.x.abs() < 1e-3 && p.y.abs() < 1e-3);
    assert!((p.z - 18.0).abs() < 1e-4);
}

#[test]
fn gestures_drive_formation() {
    let mut state = session(15);
    let mut input = FrameInput::default();

    input.apply_hand_signal(HandSignal::new(HandClassification::Closed, 0.5, 0.5, true));
    run(&mut state, &input, 120);
    assert_eq!(state.formation, FormationState::Chaos);
    let scattered = state.mix();
    assert!(scattered < 0.01);

    // Unknown pose moves the camera but leaves the formation alone
    input.apply_hand_signal(HandSignal::new(HandClassification::Unknown, 1.0, 0.5, true));
    run(&mut state, &input, 30);
    assert_eq!(state.formation, FormationState::Chaos);
    assert!(state.camera.target().x > 3.9);

    input.apply_hand_signal(HandSignal::new(HandClassification::Open, 0.5, 0.5, true));
    run(&mut state, &input, 120);
    assert_eq!(state.formation, FormationState::Formed);
    assert!(state.mix() > 0.99);
}

#[test]
fn setting_formation_twice_is_idempotent() {
    let mut once = session(16);
    let mut twice = session(16);

    let mut a = FrameInput::default();
    a.set_formation_state(FormationState::Chaos);
    let mut b = FrameInput::default();
    b.set_formation_state(FormationState::Chaos);
    b.set_formation_state(FormationState::Chaos);
    assert_eq!(a, b);

    run(&mut once, &a, 45);
    run(&mut twice, &b, 45);
    assert_eq!(once.mix(), twice.mix());
    assert_eq!(once.formation, twice.formation);
}

#[test]
fn region_rolls_follow_weights() {
    const ROLLS: usize = 1_000_000;
    let mut rng = Pcg32::seed_from_u64(17);
    let mut counts = [0usize; 7];
    for _ in 0..ROLLS {
        let region = Region::from_roll(rng.random::<f32>());
        let idx = Region::ALL.iter().position(|r| *r == region).unwrap();
        counts[idx] += 1;
    }

    for (region, count) in Region::ALL.iter().zip(counts) {
        let freq = count as f32 / ROLLS as f32;
        assert!(
            (freq - region.weight()).abs() < 0.005,
            "{region:?}: {freq} vs {}",
            region.weight()
        );
    }
}

#[test]
fn generated_cloud_matches_region_weights_and_colors() {
    const COUNT: usize = 100_000;
    let set = ShapeSampler::new(ShapeConfig::default(), 18).generate_particles(COUNT);

    for region in Region::ALL {
        let n = set.region.iter().filter(|r| **r == region).count();
        let freq = n as f32 / COUNT as f32;
        assert!((freq - region.weight()).abs() < 0.01, "{region:?}: {freq}");
    }
    for (region, color) in set.region.iter().zip(&set.color) {
        assert_eq!(region.color(), *color);
    }
    assert!(set.target.iter().all(|t| t.z == 0.0));
}

#[test]
fn same_seed_same_sigil() {
    let a = session(19);
    let b = session(19);
    assert_eq!(a.particles.set().target, b.particles.set().target);
    assert_eq!(a.ornaments.set().chaos, b.ornaments.set().chaos);
}
