//! Crew roster normalization.
//!
//! Turns one vehicle's service plan from the scheduling API into the ordered
//! crew listing shown on the dashboard.

use crate::alert::StatusTable;
use crate::model::{
    CrewMember, Person, PositionPriority, ServicePlan, StatusClass, StatusCode, UNRANKED_POSITION,
};

/// Status and ordered crew for one vehicle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedRoster {
    pub status: StatusCode,
    pub crew: Vec<CrewMember>,
}

impl NormalizedRoster {
    pub fn class(&self, table: &StatusTable) -> StatusClass {
        table.classify(self.status)
    }
}

/// Builds the crew listing for `plan_name` out of a roster payload.
///
/// A payload without that plan is "no data": unknown status, empty crew.
/// Crew is sorted by position rank; positions missing from `priority` rank
/// last, and equal ranks keep their payload order.
pub fn normalize_roster(
    payload: &[ServicePlan],
    plan_name: &str,
    priority: &PositionPriority,
) -> NormalizedRoster {
    let Some(plan) = payload
        .iter()
        .find(|p| p.service_plan_name.as_deref() == Some(plan_name))
    else {
        return NormalizedRoster::default();
    };

    let status = plan
        .service_plan_vehicule_status
        .as_ref()
        .and_then(|s| s.status.as_ref())
        .and_then(|s| s.value)
        .unwrap_or_default();

    let mut crew: Vec<CrewMember> = plan
        .rows
        .iter()
        .flat_map(|row| row.prestations.iter())
        .map(|prestation| {
            let position_label = prestation
                .position
                .as_ref()
                .and_then(|p| p.label.clone())
                .unwrap_or_default();
            CrewMember {
                rank: priority
                    .get(&position_label)
                    .copied()
                    .unwrap_or(UNRANKED_POSITION),
                full_name: prestation.person.as_ref().map(full_name).unwrap_or_default(),
                position_label,
            }
        })
        .collect();

    // Vec::sort_by_key is stable
    crew.sort_by_key(|member| member.rank);

    NormalizedRoster { status, crew }
}

/// First and last name, each trimmed, joined with a single space. Missing or
/// blank parts are dropped, so an anonymous prestation yields "".
pub fn full_name(person: &Person) -> String {
    [person.first_name.as_deref(), person.last_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
