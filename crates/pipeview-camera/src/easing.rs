// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Easing curves, named the way the demo's configs name them.

use serde::{Deserialize, Serialize};

/// Easing applied to a tween's normalized progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    /// No easing.
    #[serde(rename = "linear")]
    Linear,
    /// Quadratic ease-in-out.
    #[serde(rename = "power1.inOut")]
    Power1InOut,
    /// Cubic ease-in-out.
    #[default]
    #[serde(rename = "power2.inOut")]
    Power2InOut,
    /// Quartic ease-in-out.
    #[serde(rename = "power3.inOut")]
    Power3InOut,
}

impl Easing {
    /// Map progress `t` (clamped to `[0, 1]`) to eased progress.
    ///
    /// Endpoints are exact: `apply(0.0) == 0.0` and `apply(1.0) == 1.0`.
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::Power1InOut => in_out(t, 2),
            Self::Power2InOut => in_out(t, 3),
            Self::Power3InOut => in_out(t, 4),
        }
    }
}

fn in_out(t: f32, power: i32) -> f32 {
    if t < 0.5 {
        0.5 * (2.0 * t).powi(power)
    } else {
        1.0 - 0.5 * (2.0 - 2.0 * t).powi(power)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ALL: [Easing; 4] = [
        Easing::Linear,
        Easing::Power1InOut,
        Easing::Power2InOut,
        Easing::Power3InOut,
    ];

    #[test]
    fn endpoints_are_exact_and_midpoint_is_half() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?}");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?}");
            assert_relative_eq!(easing.apply(0.5), 0.5);
        }
    }

    #[test]
    fn out_of_range_progress_is_clamped() {
        assert_eq!(Easing::Power2InOut.apply(-3.0), 0.0);
        assert_eq!(Easing::Power2InOut.apply(7.0), 1.0);
        assert_eq!(Easing::Linear.apply(f32::NAN), 1.0);
    }

    #[test]
    fn curves_are_monotonic() {
        for easing in ALL {
            let mut prev = 0.0;
            for i in 1..=100 {
                let v = easing.apply(i as f32 / 100.0);
                assert!(v >= prev, "{easing:?} dipped at step {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn names_match_config_spelling() {
        let parsed: Easing = serde_json::from_str("\"power1.inOut\"").unwrap();
        assert_eq!(parsed, Easing::Power1InOut);
        assert_eq!(
            serde_json::to_string(&Easing::Power2InOut).unwrap(),
            "\"power2.inOut\""
        );
    }
}
