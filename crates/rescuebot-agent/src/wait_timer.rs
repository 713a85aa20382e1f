//! Wait-timer policy: how long to wait for the human before acting alone.
//!
//! The more the agent trusts the human (willingness counts twice as much
//! as competence), the longer it waits. A far-away human gets more time
//! to arrive, and actions that need both team members get extra time.
//! The result is always within `[min_ticks, max_ticks]`.

use rescuebot_types::{Distance, TrustBelief};

use crate::config::WaitConfig;

/// Compute the wait bound in ticks.
///
/// Scalars are normalized to `[0, 1]` via `(x + 1) / 2` and combined as
/// `(c + 2w) / 3`. The combined term is raised to `trust_exponent` and
/// multiplied by the base, the distance multiplier and (if `joint`) the
/// joint multiplier, then rounded and clamped. Non-finite inputs yield
/// the minimum.
pub fn wait_ticks(distance: Distance, belief: &TrustBelief, joint: bool, config: &WaitConfig) -> u32 {
    let competence = normalize(belief.competence);
    let willingness = normalize(belief.willingness);
    let combined = willingness.mul_add(2.0, competence) / 3.0;

    let distance_factor = match distance {
        Distance::Close => config.close_multiplier,
        Distance::Far => config.far_multiplier,
    };
    let joint_factor = if joint { config.joint_multiplier } else { 1.0 };

    let raw = config.base_ticks * distance_factor * joint_factor * combined.powf(config.trust_exponent);
    clamp_ticks(raw, config)
}

/// A started wait: `ticks` ticks counted from `started`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitWindow {
    /// Tick the wait began.
    pub started: u64,
    /// Length of the wait in ticks.
    pub ticks: u32,
}

impl WaitWindow {
    /// Start a wait at `now`.
    pub const fn start(now: u64, ticks: u32) -> Self {
        Self {
            started: now,
            ticks,
        }
    }

    /// Whether the wait has run out: `now - started >= ticks`.
    pub fn is_over(&self, now: u64) -> bool {
        now.saturating_sub(self.started) >= u64::from(self.ticks)
    }
}

fn normalize(value: f64) -> f64 {
    ((value.clamp(-1.0, 1.0) + 1.0) / 2.0).clamp(0.0, 1.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_ticks(raw: f64, config: &WaitConfig) -> u32 {
    let min = config.min_ticks;
    let max = config.max_ticks.max(min);
    if !raw.is_finite() {
        return min;
    }
    let clamped = raw.round().clamp(f64::from(min), f64::from(max));
    // Clamped into the u32 range above.
    clamped as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn config() -> WaitConfig {
        WaitConfig::default()
    }

    #[test]
    fn neutral_close_wait() {
        // Combined term 0.5, sqrt ~0.7071, 15 * 1.5 * 0.7071 = 15.9 -> 16.
        let belief = TrustBelief::new(0.0, 0.0);
        assert_eq!(wait_ticks(Distance::Close, &belief, false, &config()), 16);
    }

    #[test]
    fn full_trust_far_joint_hits_maximum() {
        let belief = TrustBelief::new(1.0, 1.0);
        assert_eq!(wait_ticks(Distance::Far, &belief, true, &config()), 30);
    }

    #[test]
    fn no_trust_hits_minimum() {
        let belief = TrustBelief::new(-1.0, -1.0);
        assert_eq!(wait_ticks(Distance::Far, &belief, true, &config()), 10);
    }

    #[test]
    fn more_trust_means_longer_wait() {
        let low = TrustBelief::new(0.0, -0.2);
        let high = TrustBelief::new(0.0, 0.4);
        let cfg = config();
        assert!(wait_ticks(Distance::Close, &low, false, &cfg) < wait_ticks(Distance::Close, &high, false, &cfg));
    }

    #[test]
    fn non_finite_belief_yields_minimum() {
        let belief = TrustBelief {
            competence: f64::NAN,
            willingness: f64::INFINITY,
        };
        assert_eq!(wait_ticks(Distance::Far, &belief, true, &config()), 10);
    }

    #[test]
    fn wait_always_within_bounds() {
        let cfg = config();
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..5_000 {
            let belief = TrustBelief::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0));
            let distance = if rng.random_bool(0.5) { Distance::Close } else { Distance::Far };
            let ticks = wait_ticks(distance, &belief, rng.random_bool(0.5), &cfg);
            assert!((10..=30).contains(&ticks), "{ticks} out of range");
        }
    }

    #[test]
    fn window_expires_at_bound() {
        let window = WaitWindow::start(100, 12);
        assert!(!window.is_over(100));
        assert!(!window.is_over(111));
        assert!(window.is_over(112));
        // A clock that goes backwards never ends the wait early.
        assert!(!window.is_over(50));
    }
}
