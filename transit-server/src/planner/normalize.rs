//! Normalization of raw planner itineraries into canonical route options.
//!
//! This is a pure transformation: no clock, no network, no side effects
//! beyond logging. Heterogeneous planner output (loose mode labels,
//! duck-typed stop references, optional metadata) becomes the validated
//! [`RouteOption`] model, annotated with a reliability score.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{Leg, LegMode, RouteOption};

use super::risk::risk_score;
use super::types::{RawItinerary, RawLeg};

/// Convert an ordered sequence of raw itineraries into route options.
///
/// Output preserves input order, one option per non-empty itinerary.
/// Zero-leg itineraries are dropped silently: a trip with no motion cannot
/// be represented, and this is policy rather than an error.
pub fn normalize_itineraries(itineraries: &[RawItinerary]) -> Vec<RouteOption> {
    let mut options = Vec::with_capacity(itineraries.len());

    for (index, itinerary) in itineraries.iter().enumerate() {
        if itinerary.legs.is_empty() {
            debug!(index, "dropping zero-leg itinerary");
            continue;
        }

        let legs: Vec<Leg> = itinerary.legs.iter().map(normalize_leg).collect();

        // The first leg exists: emptiness was checked above.
        let Some(first) = itinerary.legs.first() else {
            continue;
        };

        // First-leg start plus input position disambiguates itineraries
        // that start at the same instant.
        let id = format!("{}-{}", first.start_time, index);

        let total_duration_secs = itinerary.duration.unwrap_or(0.0).round().max(0.0) as u32;
        let transfer_count = itinerary
            .transfers
            .map(|t| t.max(0) as u32)
            .unwrap_or_else(|| itinerary.legs.len().saturating_sub(1) as u32);

        let Ok(option) = RouteOption::new(
            id,
            summarize_legs(&itinerary.legs),
            total_duration_secs,
            transfer_count,
            min_transfer_slack_secs(&itinerary.legs),
            risk_score(&itinerary.legs),
            legs,
        ) else {
            continue;
        };

        options.push(option);
    }

    options
}

/// Classify a planner mode label (case-insensitive).
///
/// WALK/WALKING map to walking, the street-running modes map to bus, and
/// everything else, including unrecognized labels, maps to train.
pub fn classify_mode(label: &str) -> LegMode {
    match label.to_uppercase().as_str() {
        "WALK" | "WALKING" => LegMode::Walk,
        "BUS" | "TRAM" | "TROLLEYBUS" | "COACH" => LegMode::Bus,
        _ => LegMode::Train,
    }
}

fn normalize_leg(raw: &RawLeg) -> Leg {
    let mode = classify_mode(&raw.mode);

    let route_id = raw
        .route_id
        .clone()
        .or_else(|| raw.route_short_name.clone())
        .or_else(|| raw.route.clone());
    let trip_id = raw
        .trip_id
        .clone()
        .or_else(|| raw.trip.as_ref().and_then(|t| t.id.clone()));

    Leg {
        mode,
        route_id,
        trip_id,
        from_stop_id: place_stop_id(raw.from.as_ref()),
        to_stop_id: place_stop_id(raw.to.as_ref()),
        depart_time: to_instant(raw.start_time),
        arrive_time: to_instant(raw.end_time),
        predicted_delay_secs: raw.effective_delay_secs(),
        description: Some(describe_leg(raw, mode)),
    }
}

fn place_stop_id(place: Option<&super::types::PlaceRef>) -> Option<String> {
    place?
        .stop_id
        .as_ref()?
        .stop_id()
        .map(str::to_string)
}

/// Epoch milliseconds to an instant. Out-of-range values fall back to the
/// Unix epoch: this function may not consult the clock.
fn to_instant(epoch_millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(epoch_millis).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Build a human-readable description for a leg.
fn describe_leg(raw: &RawLeg, mode: LegMode) -> String {
    if mode == LegMode::Walk {
        let meters = raw.distance.map(|d| d.round() as i64).unwrap_or(0);
        if meters > 0 {
            return format!("Walk {meters} m");
        }
        return "Walk".to_string();
    }

    let labels: Vec<&str> = [
        raw.route_short_name.as_deref(),
        raw.route_long_name.as_deref(),
        raw.route.as_deref(),
        raw.headsign.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|label| !label.trim().is_empty())
    .collect();

    let Some((primary, rest)) = labels.split_first() else {
        return match mode {
            LegMode::Bus => "Bus ride".to_string(),
            _ => "Train ride".to_string(),
        };
    };

    if rest.is_empty() {
        (*primary).to_string()
    } else {
        format!("{primary} – {}", rest.join(" "))
    }
}

/// Join per-leg descriptions with an arrow separator.
fn summarize_legs(legs: &[RawLeg]) -> String {
    legs.iter()
        .map(|leg| describe_leg(leg, classify_mode(&leg.mode)))
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Minimum transfer slack over consecutive leg pairs, in seconds.
///
/// Slack per pair is `max(0, next.depart - prev.arrive)`; single-leg
/// itineraries have no transfers and yield 0.
fn min_transfer_slack_secs(legs: &[RawLeg]) -> u32 {
    legs.windows(2)
        .map(|pair| {
            let slack_millis = pair[1].start_time - pair[0].end_time;
            ((slack_millis as f64 / 1000.0).round() as i64).max(0) as u32
        })
        .min()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE_MS: i64 = 60_000;

    fn raw_leg(mode: &str, start_min: i64, end_min: i64) -> RawLeg {
        let json = format!(
            r#"{{"mode": "{mode}", "startTime": {}, "endTime": {}}}"#,
            start_min * MINUTE_MS,
            end_min * MINUTE_MS
        );
        serde_json::from_str(&json).unwrap()
    }

    fn itinerary(legs: Vec<RawLeg>) -> RawItinerary {
        RawItinerary {
            duration: Some(legs.last().map(|l| l.end_time as f64 / 1000.0).unwrap_or(0.0)),
            legs,
            transfers: None,
        }
    }

    #[test]
    fn mode_classification() {
        assert_eq!(classify_mode("WALK"), LegMode::Walk);
        assert_eq!(classify_mode("walking"), LegMode::Walk);
        assert_eq!(classify_mode("BUS"), LegMode::Bus);
        assert_eq!(classify_mode("TRAM"), LegMode::Bus);
        assert_eq!(classify_mode("Trolleybus"), LegMode::Bus);
        assert_eq!(classify_mode("COACH"), LegMode::Bus);
        assert_eq!(classify_mode("train"), LegMode::Train);
        assert_eq!(classify_mode("TRAIN"), LegMode::Train);
        assert_eq!(classify_mode("RAIL"), LegMode::Train);
        // Unrecognized labels default to train.
        assert_eq!(classify_mode("FERRY"), LegMode::Train);
    }

    #[test]
    fn walk_description_uses_distance() {
        let mut leg = raw_leg("WALK", 0, 5);
        leg.distance = Some(412.4);
        assert_eq!(describe_leg(&leg, LegMode::Walk), "Walk 412 m");

        leg.distance = Some(0.0);
        assert_eq!(describe_leg(&leg, LegMode::Walk), "Walk");

        leg.distance = None;
        assert_eq!(describe_leg(&leg, LegMode::Walk), "Walk");
    }

    #[test]
    fn transit_description_prefers_short_name() {
        let mut leg = raw_leg("BUS", 0, 10);
        leg.route_short_name = Some("74".into());
        leg.headsign = Some("University".into());
        assert_eq!(describe_leg(&leg, LegMode::Bus), "74 – University");
    }

    #[test]
    fn transit_description_appends_extras_space_joined() {
        let mut leg = raw_leg("RAIL", 0, 10);
        leg.route_short_name = Some("R1".into());
        leg.route_long_name = Some("Coastal Line".into());
        leg.headsign = Some("North".into());
        assert_eq!(describe_leg(&leg, LegMode::Train), "R1 – Coastal Line North");
    }

    #[test]
    fn transit_description_skips_blank_labels() {
        let mut leg = raw_leg("BUS", 0, 10);
        leg.route_short_name = Some("  ".into());
        leg.headsign = Some("Harbor".into());
        assert_eq!(describe_leg(&leg, LegMode::Bus), "Harbor");
    }

    #[test]
    fn transit_description_generic_fallback() {
        let leg = raw_leg("BUS", 0, 10);
        assert_eq!(describe_leg(&leg, LegMode::Bus), "Bus ride");

        let leg = raw_leg("RAIL", 0, 10);
        assert_eq!(describe_leg(&leg, LegMode::Train), "Train ride");
    }

    #[test]
    fn summary_joins_with_arrows() {
        let mut bus = raw_leg("BUS", 6, 25);
        bus.route_short_name = Some("74".into());
        let legs = vec![raw_leg("WALK", 0, 5), bus, raw_leg("RAIL", 27, 40)];
        assert_eq!(summarize_legs(&legs), "Walk → 74 → Train ride");
    }

    #[test]
    fn slack_single_leg_is_zero() {
        assert_eq!(min_transfer_slack_secs(&[raw_leg("BUS", 0, 10)]), 0);
    }

    #[test]
    fn slack_is_min_over_consecutive_pairs() {
        // Gaps of 1 min and 2 min; the tighter transfer wins.
        let legs = vec![
            raw_leg("WALK", 0, 5),
            raw_leg("BUS", 6, 25),
            raw_leg("RAIL", 27, 40),
            raw_leg("WALK", 40, 45),
        ];
        assert_eq!(min_transfer_slack_secs(&legs), 60);
    }

    #[test]
    fn slack_negative_gap_floors_at_zero() {
        // Second leg departs before the first arrives.
        let legs = vec![raw_leg("BUS", 0, 10), raw_leg("BUS", 9, 20)];
        assert_eq!(min_transfer_slack_secs(&legs), 0);
    }

    #[test]
    fn zero_leg_itinerary_dropped() {
        let itineraries = vec![
            itinerary(vec![]),
            itinerary(vec![raw_leg("BUS", 0, 10)]),
        ];
        let options = normalize_itineraries(&itineraries);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].summary, "Bus ride");
    }

    #[test]
    fn ids_disambiguate_equal_start_instants() {
        let itineraries = vec![
            itinerary(vec![raw_leg("BUS", 0, 10)]),
            itinerary(vec![raw_leg("BUS", 0, 12)]),
        ];
        let options = normalize_itineraries(&itineraries);
        assert_eq!(options[0].id, "0-0");
        assert_eq!(options[1].id, "0-1");
        assert_ne!(options[0].id, options[1].id);
    }

    #[test]
    fn output_order_matches_input_order() {
        let itineraries = vec![
            itinerary(vec![raw_leg("WALK", 0, 5)]),
            itinerary(vec![raw_leg("BUS", 1, 10)]),
            itinerary(vec![raw_leg("RAIL", 2, 15)]),
        ];
        let options = normalize_itineraries(&itineraries);
        let summaries: Vec<&str> = options.iter().map(|o| o.summary.as_str()).collect();
        assert_eq!(summaries, vec!["Walk", "Bus ride", "Train ride"]);
    }

    #[test]
    fn transfer_count_source_value_wins() {
        let mut it = itinerary(vec![raw_leg("BUS", 0, 10), raw_leg("BUS", 12, 20)]);
        it.transfers = Some(3);
        let options = normalize_itineraries(&[it]);
        assert_eq!(options[0].transfer_count, 3);
    }

    #[test]
    fn transfer_count_falls_back_to_leg_count() {
        let it = itinerary(vec![
            raw_leg("WALK", 0, 5),
            raw_leg("BUS", 6, 25),
            raw_leg("WALK", 25, 30),
        ]);
        let options = normalize_itineraries(&[it]);
        assert_eq!(options[0].transfer_count, 2);

        let single = itinerary(vec![raw_leg("BUS", 0, 10)]);
        let options = normalize_itineraries(&[single]);
        assert_eq!(options[0].transfer_count, 0);
    }

    #[test]
    fn leg_fields_carried_over() {
        let mut bus = raw_leg("BUS", 6, 25);
        bus.route_short_name = Some("74".into());
        bus.departure_delay = Some(120);
        bus.from = serde_json::from_str(r#"{"name": "Central", "stopId": "IL:100"}"#).unwrap();
        bus.to = serde_json::from_str(r#"{"name": "Uni", "stopId": {"id": "200"}}"#).unwrap();

        let options = normalize_itineraries(&[itinerary(vec![bus])]);
        let leg = &options[0].legs()[0];

        assert_eq!(leg.mode, LegMode::Bus);
        assert_eq!(leg.route_id.as_deref(), Some("74"));
        assert_eq!(leg.from_stop_id.as_deref(), Some("100"));
        assert_eq!(leg.to_stop_id.as_deref(), Some("200"));
        assert_eq!(leg.predicted_delay_secs, 120);
        assert_eq!(leg.depart_time.timestamp(), 6 * 60);
        assert_eq!(leg.arrive_time.timestamp(), 25 * 60);
        assert_eq!(leg.description.as_deref(), Some("74"));
    }

    #[test]
    fn trip_id_falls_back_to_structured_ref() {
        let mut bus = raw_leg("BUS", 0, 10);
        bus.trip = serde_json::from_str(r#"{"id": "trip_9"}"#).unwrap();
        let options = normalize_itineraries(&[itinerary(vec![bus])]);
        assert_eq!(options[0].legs()[0].trip_id.as_deref(), Some("trip_9"));
    }

    #[test]
    fn out_of_range_instant_falls_back_to_epoch() {
        assert_eq!(to_instant(i64::MAX), DateTime::UNIX_EPOCH);
        assert_eq!(to_instant(0), DateTime::UNIX_EPOCH);
    }

    #[test]
    fn four_leg_itinerary_scores_and_slack() {
        let mut bus = raw_leg("BUS", 6, 25);
        bus.departure_delay = Some(120);
        bus.real_time = Some(true);
        let mut train = raw_leg("RAIL", 27, 40);
        train.departure_delay = Some(0);
        train.real_time = Some(true);
        let mut walk1 = raw_leg("WALK", 0, 5);
        walk1.real_time = Some(true);
        let mut walk2 = raw_leg("WALK", 40, 45);
        walk2.real_time = Some(true);

        let it = itinerary(vec![walk1, bus, train, walk2]);
        let options = normalize_itineraries(&[it]);
        assert_eq!(options[0].risk_score, 0.05);
        assert_eq!(options[0].min_transfer_slack_secs, 60);
    }
}
