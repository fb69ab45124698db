// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Dispatch coordinator: binds operator actions to incidents and units

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::incidents::IncidentStore;
use crate::roster::{Roster, UnitStatus};

/// Action label that pulls a unit from the roster
pub const DISPATCH_ROBOT: &str = "Dispatch Robot Unit";

/// Result of a single dispatch request. Not retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Incident status updated and the named unit is on its way
    Dispatched(String),
    /// Incident status updated; the label did not involve a unit
    ActionRecorded,
    /// Incident status updated, but no unit was free
    NoUnitAvailable,
    /// No incident with that id; nothing changed
    NotFound,
    /// Incident already carries an action; nothing changed
    NotPending(String),
}

impl DispatchOutcome {
    /// Whether the incident's status was changed
    pub fn applied(&self) -> bool {
        matches!(
            self,
            DispatchOutcome::Dispatched(_) | DispatchOutcome::ActionRecorded | DispatchOutcome::NoUnitAvailable
        )
    }

    pub fn message(&self, incident_id: u64) -> String {
        match self {
            DispatchOutcome::Dispatched(unit) => {
                format!("{} dispatched to incident {}", unit, incident_id)
            }
            DispatchOutcome::ActionRecorded => format!("Action recorded for incident {}", incident_id),
            DispatchOutcome::NoUnitAvailable => format!(
                "Action recorded for incident {}, but no response unit is available",
                incident_id
            ),
            DispatchOutcome::NotFound => format!("Incident {} not found", incident_id),
            DispatchOutcome::NotPending(status) => {
                format!("Incident {} is no longer pending ({})", incident_id, status)
            }
        }
    }
}

/// Apply an operator action to a pending incident
pub fn dispatch(store: &mut IncidentStore, roster: &mut Roster, incident_id: u64, action_label: &str) -> DispatchOutcome {
    let status = match store.get(incident_id) {
        Some(incident) => incident.action_status.clone(),
        None => {
            warn!("Dispatch requested for unknown incident {}", incident_id);
            return DispatchOutcome::NotFound;
        }
    };
    if !status.is_pending() {
        warn!("Incident {} already actioned: {}", incident_id, status);
        return DispatchOutcome::NotPending(status.to_string());
    }

    store.update_action(incident_id, action_label);

    if action_label != DISPATCH_ROBOT {
        info!("Incident {}: {}", incident_id, action_label);
        return DispatchOutcome::ActionRecorded;
    }

    let unit_name = match roster.first_available() {
        Some(unit) => unit.name.clone(),
        None => {
            warn!("No response unit available for incident {}", incident_id);
            return DispatchOutcome::NoUnitAvailable;
        }
    };

    roster.set_status(&unit_name, UnitStatus::OnMission(incident_id), &incident_id.to_string());
    info!("{} dispatched to incident {}", unit_name, incident_id);
    DispatchOutcome::Dispatched(unit_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ThreatLevel;
    use crate::config::RosterConfig;
    use crate::incidents::{GeoPoint, NewIncident};
    use chrono::Utc;

    fn setup(incidents: usize) -> (IncidentStore, Roster) {
        let mut store = IncidentStore::new();
        for _ in 0..incidents {
            store
                .append(NewIncident {
                    description: "Briga".to_string(),
                    level: ThreatLevel::Imminent,
                    source: "cam-3".to_string(),
                    timestamp: Utc::now(),
                    location: GeoPoint { lat: 0.0, lon: 0.0 },
                })
                .unwrap();
        }
        (store, Roster::from_seeds(&RosterConfig::default().units))
    }

    #[test]
    fn test_dispatch_picks_first_available() {
        let (mut store, mut roster) = setup(1);
        let outcome = dispatch(&mut store, &mut roster, 1, DISPATCH_ROBOT);

        assert_eq!(outcome, DispatchOutcome::Dispatched("Alpha-1".to_string()));
        assert_eq!(store.get(1).unwrap().action_status.to_string(), "Action: Dispatch Robot Unit");
        let unit = roster.get("Alpha-1").unwrap();
        assert_eq!(unit.status.to_string(), "On Mission (1)");
        assert_eq!(unit.location, "1");
    }

    #[test]
    fn test_patrolling_unit_is_eligible() {
        let (mut store, mut roster) = setup(2);
        dispatch(&mut store, &mut roster, 1, DISPATCH_ROBOT);
        let outcome = dispatch(&mut store, &mut roster, 2, DISPATCH_ROBOT);
        assert_eq!(outcome, DispatchOutcome::Dispatched("Bravo-2".to_string()));
        assert_eq!(roster.get("Bravo-2").unwrap().status, UnitStatus::OnMission(2));
    }

    #[test]
    fn test_unknown_incident_changes_nothing() {
        let (mut store, mut roster) = setup(1);
        let store_before = store.clone();
        let roster_before = roster.snapshot();

        let outcome = dispatch(&mut store, &mut roster, 9, DISPATCH_ROBOT);

        assert_eq!(outcome, DispatchOutcome::NotFound);
        assert!(!outcome.applied());
        assert_eq!(store.all(), store_before.all());
        assert_eq!(roster.snapshot(), roster_before);
    }

    #[test]
    fn test_exhausted_roster_still_updates_incident() {
        let (mut store, mut roster) = setup(3);
        dispatch(&mut store, &mut roster, 1, DISPATCH_ROBOT);
        dispatch(&mut store, &mut roster, 2, DISPATCH_ROBOT);
        let roster_before = roster.snapshot();

        // Charlie-3 is charging
        let outcome = dispatch(&mut store, &mut roster, 3, DISPATCH_ROBOT);

        assert_eq!(outcome, DispatchOutcome::NoUnitAvailable);
        assert!(outcome.applied());
        assert_eq!(roster.snapshot(), roster_before);
        assert_eq!(store.get(3).unwrap().action_status.label(), Some(DISPATCH_ROBOT));
    }

    #[test]
    fn test_other_actions_leave_roster_alone() {
        let (mut store, mut roster) = setup(1);
        let roster_before = roster.snapshot();

        let outcome = dispatch(&mut store, &mut roster, 1, "Notify Police");

        assert_eq!(outcome, DispatchOutcome::ActionRecorded);
        assert_eq!(roster.snapshot(), roster_before);
        assert_eq!(store.get(1).unwrap().action_status.to_string(), "Action: Notify Police");
    }

    #[test]
    fn test_actioned_incident_is_not_eligible() {
        let (mut store, mut roster) = setup(1);
        dispatch(&mut store, &mut roster, 1, "Notify Police");
        let roster_before = roster.snapshot();

        let outcome = dispatch(&mut store, &mut roster, 1, DISPATCH_ROBOT);

        assert_eq!(outcome, DispatchOutcome::NotPending("Action: Notify Police".to_string()));
        assert_eq!(roster.snapshot(), roster_before);
        assert_eq!(store.get(1).unwrap().action_status.label(), Some("Notify Police"));
    }

    #[test]
    fn test_outcome_wire_format() {
        let json = serde_json::to_value(DispatchOutcome::Dispatched("Alpha-1".to_string())).unwrap();
        assert_eq!(json["outcome"], "dispatched");
        assert_eq!(json["detail"], "Alpha-1");
        let json = serde_json::to_value(DispatchOutcome::NotFound).unwrap();
        assert_eq!(json["outcome"], "not_found");
    }
}
