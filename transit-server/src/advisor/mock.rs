//! Scripted advisor for testing and offline development.

use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::domain::{Coordinate, Leg, LegMode, RouteOption, SessionId};

use super::error::AdvisorError;
use super::{Advisor, Advisory};

/// Advisor that cycles through canned responses.
///
/// Every third advisory suggests a reroute with one alternative route; the
/// rest confirm the current route. The call counter is owned by the
/// instance, so concurrent tests never observe each other's sequence.
pub struct ScriptedAdvisor {
    calls: Mutex<u64>,
}

impl ScriptedAdvisor {
    /// Create a fresh advisor with its counter at zero.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(0),
        }
    }

    /// Number of advise calls handled so far.
    pub fn call_count(&self) -> u64 {
        *self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_call(&self) -> u64 {
        let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        *calls += 1;
        *calls
    }

    fn reroute_option() -> RouteOption {
        let base = Utc.with_ymd_and_hms(2026, 3, 15, 10, 0, 0).unwrap();
        let leg = |mode: LegMode, from_mins: i64, to_mins: i64, description: &str| Leg {
            mode,
            route_id: None,
            trip_id: None,
            from_stop_id: None,
            to_stop_id: None,
            depart_time: base + chrono::Duration::minutes(from_mins),
            arrive_time: base + chrono::Duration::minutes(to_mins),
            predicted_delay_secs: 0,
            description: Some(description.to_string()),
        };

        let legs = vec![
            leg(LegMode::Walk, 0, 2, "Walk to alternate stop"),
            leg(LegMode::Bus, 3, 20, "Bus 88 to destination"),
            leg(LegMode::Walk, 20, 25, "Walk to destination"),
        ];

        // Legs are non-empty, so construction cannot fail.
        RouteOption::new(
            "reroute_1".into(),
            "Switch to Bus 88, saves 5 min".into(),
            2400,
            1,
            300,
            0.3,
            legs,
        )
        .unwrap_or_else(|_| unreachable!("reroute fixture has legs"))
    }
}

impl Default for ScriptedAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Advisor for ScriptedAdvisor {
    fn start_session<'a>(
        &'a self,
        route_id: &'a str,
        _user_context: Option<&'a str>,
    ) -> BoxFuture<'a, Result<SessionId, AdvisorError>> {
        async move {
            SessionId::new(format!("session_{route_id}")).map_err(|_| AdvisorError::MissingSession)
        }
        .boxed()
    }

    fn advise<'a>(
        &'a self,
        _session: &'a SessionId,
        _location: Coordinate,
    ) -> BoxFuture<'a, Result<Advisory, AdvisorError>> {
        async move {
            let call = self.next_call();
            if call % 3 == 0 {
                Ok(Advisory {
                    advice: "Traffic ahead is heavy. A faster option is available if you switch buses."
                        .to_string(),
                    alternatives: vec![Self::reroute_option()],
                })
            } else {
                Ok(Advisory {
                    advice: "You are on the best route. No changes needed.".to_string(),
                    alternatives: Vec::new(),
                })
            }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord() -> Coordinate {
        Coordinate {
            lat: 32.08,
            lon: 34.78,
        }
    }

    #[tokio::test]
    async fn session_id_derives_from_route() {
        let advisor = ScriptedAdvisor::new();
        let session = advisor.start_session("route_1", None).await.unwrap();
        assert_eq!(session.as_str(), "session_route_1");
    }

    #[tokio::test]
    async fn every_third_advisory_suggests_reroute() {
        let advisor = ScriptedAdvisor::new();
        let session = advisor.start_session("route_1", None).await.unwrap();

        for call in 1..=6u64 {
            let advisory = advisor.advise(&session, coord()).await.unwrap();
            if call % 3 == 0 {
                assert_eq!(advisory.alternatives.len(), 1);
                assert_eq!(advisory.alternatives[0].id, "reroute_1");
            } else {
                assert!(advisory.alternatives.is_empty());
            }
        }
        assert_eq!(advisor.call_count(), 6);
    }

    #[tokio::test]
    async fn counter_is_per_instance() {
        let first = ScriptedAdvisor::new();
        let second = ScriptedAdvisor::new();
        let session = first.start_session("route_1", None).await.unwrap();

        let _ = first.advise(&session, coord()).await.unwrap();
        let _ = first.advise(&session, coord()).await.unwrap();

        // A fresh instance starts its own sequence: its third call is the
        // reroute, regardless of what other instances have served.
        for _ in 0..2 {
            let advisory = second.advise(&session, coord()).await.unwrap();
            assert!(advisory.alternatives.is_empty());
        }
        let advisory = second.advise(&session, coord()).await.unwrap();
        assert_eq!(advisory.alternatives.len(), 1);
    }
}
