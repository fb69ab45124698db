// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Console state: incident store, roster and alert settings in one object
//!
//! Every operation takes `&mut self`; callers that share a console across
//! requests wrap it in a mutex so store and roster change together.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::alerts::{self, AlertSettings, Notification};
use crate::classifier::ClassificationResult;
use crate::config::{AppConfig, CameraFeed, UnitSeed};
use crate::dispatch::{self, DispatchOutcome, DISPATCH_ROBOT};
use crate::incidents::{GeoPoint, Incident, IncidentStore, LocationSampler, NewIncident};
use crate::reports::{self, Period, Report, ReportKind};
use crate::roster::{ResponseUnit, Roster, UnitStatus};
use crate::Result;

/// What happened when a classification was recorded
#[derive(Debug, Clone, Serialize)]
pub struct Recorded {
    pub incident: Incident,
    pub notifications: Vec<Notification>,
    /// Set when the alert policy dispatched a unit on its own
    pub auto_dispatch: Option<DispatchOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsoleStats {
    pub total_incidents: usize,
    pub pending_incidents: usize,
    pub available_units: usize,
    pub total_units: usize,
}

pub struct Console {
    incidents: IncidentStore,
    roster: Roster,
    seeds: Vec<UnitSeed>,
    alerts: AlertSettings,
    cameras: Vec<CameraFeed>,
    locations: LocationSampler,
}

impl Console {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            incidents: IncidentStore::new(),
            roster: Roster::from_seeds(&config.roster.units),
            seeds: config.roster.units.clone(),
            alerts: config.alerts.clone(),
            cameras: config.cameras.clone(),
            locations: LocationSampler::new(&config.map),
        }
    }

    /// Store an escalated classification as an incident and apply the alert policy.
    ///
    /// Returns `Ok(None)` when the reply carried no level 2/3 marker.
    pub fn record_classification(&mut self, result: &ClassificationResult, source: &str) -> Result<Option<Recorded>> {
        let level = match result.level {
            Some(level) if level.is_escalated() => level,
            _ => return Ok(None),
        };

        let id = self.incidents.append(NewIncident {
            description: result.summary().to_string(),
            level,
            source: source.to_string(),
            timestamp: Utc::now(),
            location: self.locations.sample(&mut rand::thread_rng()),
        })?;
        info!("Incident {} recorded from {} (level {})", id, source, level);

        let notifications = alerts::notify(&self.alerts, id, level);

        let auto_dispatch = if self.alerts.should_auto_dispatch(level) {
            info!("Auto-dispatch enabled for level {}, incident {}", level, id);
            Some(self.dispatch(id, DISPATCH_ROBOT))
        } else {
            None
        };

        let incident = match self.incidents.get(id) {
            Some(incident) => incident.clone(),
            None => return Err(crate::OlhosError::IncidentNotFound(id)),
        };

        Ok(Some(Recorded {
            incident,
            notifications,
            auto_dispatch,
        }))
    }

    pub fn dispatch(&mut self, incident_id: u64, action_label: &str) -> DispatchOutcome {
        dispatch::dispatch(&mut self.incidents, &mut self.roster, incident_id, action_label)
    }

    pub fn set_unit_status(&mut self, name: &str, status: UnitStatus, location: &str) -> bool {
        let updated = self.roster.set_status(name, status, location);
        if !updated {
            warn!("Status update for unknown unit {}", name);
        }
        updated
    }

    pub fn recall_unit(&mut self, name: &str) -> bool {
        self.roster.recall(name)
    }

    pub fn clear_incidents(&mut self) {
        self.incidents.clear();
        info!("Incident list cleared");
    }

    /// Clear incidents and reseed the roster
    pub fn reset(&mut self) {
        self.incidents.clear();
        self.roster = Roster::from_seeds(&self.seeds);
        info!("Console reset");
    }

    pub fn update_alerts(&mut self, settings: AlertSettings) {
        self.alerts = settings;
    }

    pub fn report(&self, kind: ReportKind, period: Period) -> Report {
        reports::generate(kind, self.incidents.all(), period)
    }

    pub fn stats(&self) -> ConsoleStats {
        ConsoleStats {
            total_incidents: self.incidents.len(),
            pending_incidents: self.incidents.list_pending().len(),
            available_units: self.roster.units().iter().filter(|u| u.status.can_dispatch()).count(),
            total_units: self.roster.units().len(),
        }
    }

    pub fn incidents(&self) -> &IncidentStore {
        &self.incidents
    }

    pub fn pending(&self) -> Vec<Incident> {
        self.incidents.list_pending().into_iter().cloned().collect()
    }

    pub fn roster(&self) -> Vec<ResponseUnit> {
        self.roster.snapshot()
    }

    pub fn alerts(&self) -> &AlertSettings {
        &self.alerts
    }

    pub fn cameras(&self) -> &[CameraFeed] {
        &self.cameras
    }

    /// Point incident coordinates are scattered around
    pub fn map_reference(&self) -> GeoPoint {
        self.locations.reference()
    }
}
