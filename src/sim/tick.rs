//! Per-frame update
//!
//! One call per rendered frame. Inputs are plain values overwritten by the
//! signal source at its own cadence and read here; nothing blocks or waits.

use super::blend::FormationState;
use super::signal::{HandClassification, HandSignal};
use super::state::SceneState;

/// Latest external signals (single writer: the signal source)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Formation target
    pub formation: FormationState,
    /// Most recent hand reading
    pub hand: HandSignal,
}

impl FrameInput {
    /// Set the formation target; idempotent
    pub fn set_formation_state(&mut self, state: FormationState) {
        self.formation = state;
    }

    /// Overwrite the hand position; `present = false` means no hand
    pub fn set_hand_signal(&mut self, x: f32, y: f32, present: bool) {
        self.hand = HandSignal::new(self.hand.classification, x, y, present);
    }

    /// Take a full classifier reading: open assembles, closed scatters,
    /// unknown leaves the formation as it was
    pub fn apply_hand_signal(&mut self, signal: HandSignal) {
        self.hand = signal;
        match signal.classification {
            HandClassification::Open => self.formation = FormationState::Formed,
            HandClassification::Closed => self.formation = FormationState::Chaos,
            HandClassification::Unknown => {}
        }
    }

    #[inline]
    pub fn target_mix(&self) -> f32 {
        self.formation.target_mix()
    }
}

/// Advance the display by one frame of `dt` seconds
pub fn tick(state: &mut SceneState, input: &FrameInput, dt: f32) {
    let dt = dt.max(0.0);

    if input.formation != state.formation {
        log::debug!(
            "Formation {} -> {} at t={:.2}s",
            state.formation.as_str(),
            input.formation.as_str(),
            state.time
        );
        state.formation = input.formation;
    }

    state.time += dt;
    state.frame += 1;

    let particle_mix = state.particle_blend.update(state.formation, dt);
    let ornament_mix = state.ornament_blend.update(state.formation, dt);

    state.particles.update(particle_mix, state.time, dt);
    state
        .ornaments
        .update(ornament_mix, state.formation, state.time, dt);
    state.camera.update(&input.hand, dt);

    state.core_glow = match state.formation {
        FormationState::Formed => 1.0,
        FormationState::Chaos => 0.0,
    };
}
