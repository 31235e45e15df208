//! Scheduling portal client.
//!
//! One endpoint per fire station returns a JSON array of service plans, one
//! per vehicle. Plans that do not match the expected shape are skipped
//! individually so a single odd entry cannot hide the whole station.

use crate::error::SourceError;
use crate::ingest::JsonSource;
use crate::logging::{self, DataSource};
use crate::model::{RosterPayload, ServicePlan};

/// Fetches and parses the roster payload behind `url`.
pub fn fetch_roster(
    source: &dyn JsonSource,
    url: &str,
    cookie: Option<&str>,
) -> Result<RosterPayload, SourceError> {
    let body = source.get_json(url, cookie)?;
    parse_roster(&body)
}

/// Parses a roster payload. The top level must be an array; elements that
/// are not service plans are dropped.
pub fn parse_roster(body: &serde_json::Value) -> Result<RosterPayload, SourceError> {
    let plans = body
        .as_array()
        .ok_or_else(|| SourceError::Parse("expected an array of service plans".to_string()))?;

    let mut payload = Vec::with_capacity(plans.len());
    for (i, raw) in plans.iter().enumerate() {
        match serde_json::from_value::<ServicePlan>(raw.clone()) {
            Ok(plan) => payload.push(plan),
            Err(e) => logging::debug(
                DataSource::Schedule,
                None,
                &format!("skipping service plan #{}: {}", i, e),
            ),
        }
    }
    Ok(payload)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::test_support::CannedSource;
    use crate::model::StatusCode;
    use serde_json::json;

    #[test]
    fn test_parse_roster_keeps_valid_plans() {
        let body = json!([
            { "servicePlanName": "MERSCH-HLF21", "servicePlanVehiculeStatus": { "status": { "value": 2 } } },
            "not a plan",
            { "servicePlanName": "MERSCH-DLK21", "rows": "broken" },
            { "servicePlanName": "MERSCH-DLK21" }
        ]);
        let payload = parse_roster(&body).unwrap();
        assert_eq!(payload.len(), 2);
        assert_eq!(
            payload[0]
                .service_plan_vehicule_status
                .as_ref()
                .and_then(|s| s.status.as_ref())
                .and_then(|s| s.value),
            Some(StatusCode::Digit(2))
        );
    }

    #[test]
    fn test_parse_roster_rejects_non_array() {
        let err = parse_roster(&json!({"error": "session expired"})).unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }

    #[test]
    fn test_fetch_roster_sends_cookie() {
        let source = CannedSource::default().with("https://portal/schedules/273", Ok(json!([])));
        let payload = fetch_roster(&source, "https://portal/schedules/273", Some("JSESSIONID=abc")).unwrap();
        assert!(payload.is_empty());
        let requests = source.requests.borrow();
        assert_eq!(requests[0].1.as_deref(), Some("JSESSIONID=abc"));
    }

    #[test]
    fn test_fetch_roster_propagates_source_error() {
        let source = CannedSource::default().with("https://portal/schedules/1", Err(SourceError::HttpStatus(401)));
        let err = fetch_roster(&source, "https://portal/schedules/1", None).unwrap_err();
        assert_eq!(err, SourceError::HttpStatus(401));
    }
}
