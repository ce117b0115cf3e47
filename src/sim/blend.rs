//! Formation state and mix smoothing
//!
//! The only animation state is a scalar mix in [0, 1] that chases the
//! current formation target with exponential smoothing.

use serde::{Deserialize, Serialize};

/// Which configuration the display is heading toward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FormationState {
    /// Dispersed cloud (closed fist)
    Chaos,
    /// Resolved sigil (open hand)
    #[default]
    Formed,
}

impl FormationState {
    /// Mix value this state pulls toward
    pub fn target_mix(self) -> f32 {
        match self {
            FormationState::Chaos => 0.0,
            FormationState::Formed => 1.0,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            FormationState::Chaos => FormationState::Formed,
            FormationState::Formed => FormationState::Chaos,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FormationState::Chaos => "CHAOS",
            FormationState::Formed => "FORMED",
        }
    }
}

/// Fraction of the remaining distance covered this frame
#[inline]
pub fn smoothing_factor(dt: f32, rate: f32) -> f32 {
    (dt * rate).clamp(0.0, 1.0)
}

/// One smoothing step from `current` toward `target`
#[inline]
pub fn blend_toward(current: f32, target: f32, dt: f32, rate: f32) -> f32 {
    current + (target - current) * smoothing_factor(dt, rate)
}

/// Scalar mix chasing a formation target
#[derive(Debug, Clone)]
pub struct StateBlender {
    mix: f32,
    rate: f32,
}

impl StateBlender {
    pub fn new(rate: f32) -> Self {
        Self::with_mix(rate, 0.0)
    }

    pub fn with_mix(rate: f32, mix: f32) -> Self {
        Self {
            mix: mix.clamp(0.0, 1.0),
            rate: rate.max(0.0),
        }
    }

    #[inline]
    pub fn mix(&self) -> f32 {
        self.mix
    }

    #[inline]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Advance toward the state's target mix; returns the new mix
    pub fn update(&mut self, state: FormationState, dt: f32) -> f32 {
        self.mix = blend_toward(self.mix, state.target_mix(), dt, self.rate).clamp(0.0, 1.0);
        self.mix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_mix() {
        assert_eq!(FormationState::Chaos.target_mix(), 0.0);
        assert_eq!(FormationState::Formed.target_mix(), 1.0);
        assert_eq!(FormationState::Formed.toggled(), FormationState::Chaos);
    }

    #[test]
    fn test_factor_clamped() {
        assert_eq!(smoothing_factor(1.0, 3.0), 1.0);
        assert_eq!(smoothing_factor(-0.5, 3.0), 0.0);
        assert!((smoothing_factor(0.1, 3.0) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_large_gap_lands_on_target() {
        // A multi-second stall snaps to the target without overshooting
        let mut b = StateBlender::new(3.0);
        assert_eq!(b.update(FormationState::Formed, 2.0), 1.0);
    }

    #[test]
    fn test_converges_within_five_seconds() {
        let mut b = StateBlender::new(3.0);
        let dt = 1.0 / 60.0;
        for _ in 0..300 {
            b.update(FormationState::Formed, dt);
        }
        assert!((b.mix() - 1.0).abs() < 1e-3);

        for _ in 0..300 {
            b.update(FormationState::Chaos, dt);
        }
        assert!(b.mix() < 1e-3);
    }

    #[test]
    fn test_zero_dt_holds_mix() {
        let mut b = StateBlender::with_mix(3.0, 0.4);
        assert_eq!(b.update(FormationState::Formed, 0.0), 0.4);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn mix_approaches_without_overshoot(
                start in 0.0f32..=1.0,
                formed in any::<bool>(),
                steps in prop::collection::vec(0.0001f32..0.5, 1..100),
            ) {
                let state = if formed { FormationState::Formed } else { FormationState::Chaos };
                let target = state.target_mix();
                let mut b = StateBlender::with_mix(3.0, start);
                let mut dist = (b.mix() - target).abs();

                for dt in steps {
                    let mix = b.update(state, dt);
                    prop_assert!((0.0..=1.0).contains(&mix));
                    let d = (mix - target).abs();
                    prop_assert!(d <= dist);
                    // Never crosses to the other side of the target
                    if formed {
                        prop_assert!(mix <= 1.0);
                    } else {
                        prop_assert!(mix >= 0.0);
                    }
                    dist = d;
                }
            }
        }
    }
}
