//! Easing curves addressed by the integer tween ids used in exported data.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const BACK_C1: f64 = 1.70158;
const BACK_C2: f64 = BACK_C1 * 1.525;
const BACK_C3: f64 = BACK_C1 + 1.0;
const ELASTIC_C4: f64 = (2.0 * PI) / 3.0;
const ELASTIC_C5: f64 = (2.0 * PI) / 4.5;
const BOUNCE_N1: f64 = 7.5625;
const BOUNCE_D1: f64 = 2.75;

/// Tween curve. The discriminant is the tween id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    #[default]
    Linear = 0,
    SineOut = 1,
    SineIn = 2,
    SineInOut = 3,
    QuadIn = 4,
    QuadOut = 5,
    QuadInOut = 6,
    CubicIn = 7,
    CubicOut = 8,
    CubicInOut = 9,
    QuartIn = 10,
    QuartOut = 11,
    QuartInOut = 12,
    QuintIn = 13,
    QuintOut = 14,
    QuintInOut = 15,
    ExpoIn = 16,
    ExpoOut = 17,
    ExpoInOut = 18,
    CircIn = 19,
    CircOut = 20,
    CircInOut = 21,
    ElasticIn = 22,
    ElasticOut = 23,
    ElasticInOut = 24,
    BackIn = 25,
    BackOut = 26,
    BackInOut = 27,
    BounceIn = 28,
    BounceOut = 29,
    BounceInOut = 30,
}

impl Easing {
    /// Every curve, in tween id order.
    pub const ALL: [Easing; 31] = [
        Easing::Linear,
        Easing::SineOut,
        Easing::SineIn,
        Easing::SineInOut,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::QuartIn,
        Easing::QuartOut,
        Easing::QuartInOut,
        Easing::QuintIn,
        Easing::QuintOut,
        Easing::QuintInOut,
        Easing::ExpoIn,
        Easing::ExpoOut,
        Easing::ExpoInOut,
        Easing::CircIn,
        Easing::CircOut,
        Easing::CircInOut,
        Easing::ElasticIn,
        Easing::ElasticOut,
        Easing::ElasticInOut,
        Easing::BackIn,
        Easing::BackOut,
        Easing::BackInOut,
        Easing::BounceIn,
        Easing::BounceOut,
        Easing::BounceInOut,
    ];

    /// Curve for a tween id. Unknown ids are linear.
    pub fn from_id(id: i64) -> Self {
        usize::try_from(id)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(Easing::Linear)
    }

    pub fn id(self) -> i64 {
        self as i64
    }

    /// Evaluate the curve at `t`, clamped to `[0, 1]`.
    ///
    /// Both endpoints are exact: `ease(0) == 0` and `ease(1) == 1`.
    pub fn ease(self, t: f64) -> f64 {
        if t.is_nan() || t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Easing::Linear => t,
            Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::SineOut => (t * PI / 2.0).sin(),
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => in_out(t, 2, 2.0),
            Easing::CubicIn => t.powi(3),
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicInOut => in_out(t, 3, 4.0),
            Easing::QuartIn => t.powi(4),
            Easing::QuartOut => 1.0 - (1.0 - t).powi(4),
            Easing::QuartInOut => in_out(t, 4, 8.0),
            Easing::QuintIn => t.powi(5),
            Easing::QuintOut => 1.0 - (1.0 - t).powi(5),
            Easing::QuintInOut => in_out(t, 5, 16.0),
            Easing::ExpoIn => 2f64.powf(10.0 * (t - 1.0)),
            Easing::ExpoOut => 1.0 - 2f64.powf(-10.0 * t),
            Easing::ExpoInOut => {
                if t < 0.5 {
                    2f64.powf(20.0 * t - 11.0)
                } else {
                    1.0 - 2f64.powf(-20.0 * t + 9.0)
                }
            }
            Easing::CircIn => 1.0 - (1.0 - t * t).sqrt(),
            Easing::CircOut => (1.0 - (t - 1.0) * (t - 1.0)).sqrt(),
            Easing::CircInOut => {
                if t < 0.5 {
                    (1.0 - (1.0 - 4.0 * t * t).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).sqrt() + 1.0) / 2.0
                }
            }
            Easing::ElasticIn => {
                -(2f64.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * ELASTIC_C4).sin()
            }
            Easing::ElasticOut => {
                2f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * ELASTIC_C4).sin() + 1.0
            }
            Easing::ElasticInOut => {
                let s = ((20.0 * t - 11.125) * ELASTIC_C5).sin();
                if t < 0.5 {
                    -(2f64.powf(20.0 * t - 10.0) * s) / 2.0
                } else {
                    2f64.powf(-20.0 * t + 10.0) * s / 2.0 + 1.0
                }
            }
            Easing::BackIn => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Easing::BackOut => 1.0 + BACK_C3 * (t - 1.0).powi(3) + BACK_C1 * (t - 1.0).powi(2),
            Easing::BackInOut => {
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((BACK_C2 + 1.0) * 2.0 * t - BACK_C2)) / 2.0
                } else {
                    let u = 2.0 * t - 2.0;
                    (u * u * ((BACK_C2 + 1.0) * u + BACK_C2) + 2.0) / 2.0
                }
            }
            Easing::BounceIn => 1.0 - bounce_out(1.0 - t),
            Easing::BounceOut => bounce_out(t),
            Easing::BounceInOut => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
        }
    }
}

/// Shared shape of the polynomial in-out curves.
fn in_out(t: f64, power: i32, lead: f64) -> f64 {
    if t < 0.5 {
        lead * t.powi(power)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(power) / 2.0
    }
}

fn bounce_out(t: f64) -> f64 {
    if t < 1.0 / BOUNCE_D1 {
        BOUNCE_N1 * t * t
    } else if t < 2.0 / BOUNCE_D1 {
        let t = t - 1.5 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.75
    } else if t < 2.5 / BOUNCE_D1 {
        let t = t - 2.25 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.984375
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_endpoints_are_exact() {
        for easing in Easing::ALL {
            assert_eq!(easing.ease(0.0), 0.0, "{easing:?} at 0");
            assert_eq!(easing.ease(1.0), 1.0, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_ids_round_trip() {
        for (i, easing) in Easing::ALL.iter().enumerate() {
            assert_eq!(easing.id(), i as i64);
            assert_eq!(Easing::from_id(i as i64), *easing);
        }
    }

    #[test]
    fn test_unknown_id_is_linear() {
        assert_eq!(Easing::from_id(31), Easing::Linear);
        assert_eq!(Easing::from_id(-1), Easing::Linear);
        assert_eq!(Easing::from_id(99).ease(0.3), 0.3);
    }

    #[test]
    fn test_midpoints() {
        assert!((Easing::CubicInOut.ease(0.5) - 0.5).abs() < EPSILON);
        assert!((Easing::QuadInOut.ease(0.5) - 0.5).abs() < EPSILON);
        assert!((Easing::SineInOut.ease(0.5) - 0.5).abs() < EPSILON);
        assert!((Easing::QuadIn.ease(0.5) - 0.25).abs() < EPSILON);
        assert!((Easing::BounceOut.ease(0.999_999) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_out_of_range_clamps() {
        assert_eq!(Easing::BackOut.ease(-3.0), 0.0);
        assert_eq!(Easing::ElasticIn.ease(7.0), 1.0);
        assert_eq!(Easing::Linear.ease(f64::NAN), 0.0);
    }

    #[test]
    fn test_curves_have_no_jumps() {
        const STEPS: usize = 1000;
        for easing in Easing::ALL {
            let mut prev = easing.ease(0.0);
            for i in 1..=STEPS {
                let t = i as f64 / STEPS as f64;
                let value = easing.ease(t);
                assert!((value - prev).abs() < 0.05, "{easing:?} jumps at t={t}");
                prev = value;
            }
        }
    }

    #[test]
    fn test_plain_curves_never_go_backwards() {
        let overshooting = |e: &Easing| {
            matches!(
                e,
                Easing::ElasticIn
                    | Easing::ElasticOut
                    | Easing::ElasticInOut
                    | Easing::BackIn
                    | Easing::BackOut
                    | Easing::BackInOut
                    | Easing::BounceIn
                    | Easing::BounceOut
                    | Easing::BounceInOut
            )
        };
        for easing in Easing::ALL.iter().filter(|e| !overshooting(e)) {
            let mut prev = 0.0;
            for i in 1..=1000 {
                let value = easing.ease(i as f64 / 1000.0);
                assert!(value >= prev - EPSILON, "{easing:?} decreases at step {i}");
                prev = value;
            }
        }
    }

    #[test]
    fn test_expo_in_out_meets_at_half() {
        let below = Easing::ExpoInOut.ease(0.499_999);
        let at = Easing::ExpoInOut.ease(0.5);
        assert!((at - 0.5).abs() < EPSILON);
        assert!((at - below).abs() < 1e-4);
        assert!((Easing::ExpoInOut.ease(0.6) - 0.875).abs() < EPSILON);
    }

    #[test]
    fn test_back_overshoots() {
        assert!(Easing::BackIn.ease(0.2) < 0.0);
        assert!(Easing::BackOut.ease(0.8) > 1.0);
    }
}
