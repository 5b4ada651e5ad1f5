//! Reliability scoring for itineraries.
//!
//! Pure function from the delay and live-tracking fields of an itinerary's
//! legs to a single risk score in [0, 1]. Higher means less reliable.

use super::types::RawLeg;

/// Delay at which the normalised delay component saturates at 1.
pub const DELAY_CEILING_SECS: f64 = 600.0;

/// Flat penalty applied when any leg is explicitly not live-tracked.
pub const NO_REALTIME_PENALTY: f64 = 0.25;

/// Score assigned to a degenerate zero-leg itinerary.
///
/// Deliberately not 0: a trip we know nothing about must not look
/// perfectly reliable.
pub const EMPTY_ITINERARY_SCORE: f64 = 0.2;

/// Compute the risk score for an itinerary's legs.
///
/// The average per-leg delay (departure delay, else arrival delay, else 0,
/// floored at 0) is normalised against [`DELAY_CEILING_SECS`] and clamped to
/// 1; a flat [`NO_REALTIME_PENALTY`] is added when any leg reports
/// `realTime: false`. The sum is clamped to 1 and rounded to three decimal
/// places. Holding the realtime flags fixed, the score is monotonically
/// non-decreasing in the average delay.
pub fn risk_score(legs: &[RawLeg]) -> f64 {
    if legs.is_empty() {
        return EMPTY_ITINERARY_SCORE;
    }

    let total_delay: f64 = legs.iter().map(|leg| leg.effective_delay_secs() as f64).sum();
    let average_delay = total_delay / legs.len() as f64;
    let normalized_delay = (average_delay / DELAY_CEILING_SECS).min(1.0);

    let penalty = if legs.iter().any(|leg| leg.real_time == Some(false)) {
        NO_REALTIME_PENALTY
    } else {
        0.0
    };

    round3((normalized_delay + penalty).min(1.0))
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(delay: Option<i64>, real_time: Option<bool>) -> RawLeg {
        let mut leg: RawLeg = serde_json::from_str(
            r#"{"mode": "BUS", "startTime": 0, "endTime": 60000}"#,
        )
        .unwrap();
        leg.departure_delay = delay;
        leg.real_time = real_time;
        leg
    }

    #[test]
    fn empty_itinerary_scores_neutral_default() {
        assert_eq!(risk_score(&[]), EMPTY_ITINERARY_SCORE);
    }

    #[test]
    fn zero_delay_tracked_legs_score_zero() {
        let legs = vec![leg(Some(0), Some(true)), leg(None, Some(true))];
        assert_eq!(risk_score(&legs), 0.0);
    }

    #[test]
    fn single_delayed_leg_averages_down() {
        // Four legs, one with 120s delay, all live-tracked:
        // average 30s, normalised 0.05, no penalty.
        let legs = vec![
            leg(Some(0), Some(true)),
            leg(Some(120), Some(true)),
            leg(Some(0), Some(true)),
            leg(Some(0), Some(true)),
        ];
        assert_eq!(risk_score(&legs), 0.05);
    }

    #[test]
    fn untracked_leg_adds_flat_penalty() {
        let legs = vec![leg(Some(0), Some(true)), leg(Some(0), Some(false))];
        assert_eq!(risk_score(&legs), NO_REALTIME_PENALTY);

        // Absent flag is not a penalty; only an explicit false is.
        let legs = vec![leg(Some(0), None)];
        assert_eq!(risk_score(&legs), 0.0);
    }

    #[test]
    fn clamped_to_one() {
        // Enormous delay plus penalty still caps at 1.
        let legs = vec![leg(Some(100_000), Some(false))];
        assert_eq!(risk_score(&legs), 1.0);
    }

    #[test]
    fn negative_delay_floored_at_zero() {
        let legs = vec![leg(Some(-300), Some(true))];
        assert_eq!(risk_score(&legs), 0.0);
    }

    #[test]
    fn rounded_to_three_decimals() {
        // Average 100/3 s → 0.0555... → 0.056.
        let legs = vec![
            leg(Some(100), Some(true)),
            leg(Some(0), Some(true)),
            leg(Some(0), Some(true)),
        ];
        assert_eq!(risk_score(&legs), 0.056);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn legs_with_uniform_delay(count: usize, delay: i64, tracked: bool) -> Vec<RawLeg> {
        (0..count)
            .map(|_| {
                let mut leg: RawLeg = serde_json::from_str(
                    r#"{"mode": "BUS", "startTime": 0, "endTime": 60000}"#,
                )
                .unwrap();
                leg.departure_delay = Some(delay);
                leg.real_time = Some(tracked);
                leg
            })
            .collect()
    }

    proptest! {
        /// Property: the score is always in [0, 1].
        #[test]
        fn score_in_unit_interval(
            count in 0usize..8,
            delay in -1000i64..100_000,
            tracked in any::<bool>(),
        ) {
            let legs = legs_with_uniform_delay(count, delay, tracked);
            let score = risk_score(&legs);
            prop_assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
        }

        /// Property: holding realtime flags fixed, the score never decreases
        /// as the uniform delay grows.
        #[test]
        fn monotone_in_delay(
            count in 1usize..8,
            delay in 0i64..10_000,
            increase in 0i64..10_000,
            tracked in any::<bool>(),
        ) {
            let lower = risk_score(&legs_with_uniform_delay(count, delay, tracked));
            let higher = risk_score(&legs_with_uniform_delay(count, delay + increase, tracked));
            prop_assert!(
                higher >= lower,
                "score decreased from {} to {} when delay grew by {}",
                lower, higher, increase
            );
        }
    }
}
