// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! In-memory incident store
//!
//! Incidents live for the lifetime of the console. Ids are `count + 1` at the
//! time of insertion, so they restart at 1 after a clear.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classifier::ThreatLevel;
use crate::config::MapConfig;
use crate::{OlhosError, Result};

/// Operator action state of an incident
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ActionStatus {
    Pending,
    Action(String),
}

impl ActionStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, ActionStatus::Pending)
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            ActionStatus::Pending => None,
            ActionStatus::Action(label) => Some(label),
        }
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionStatus::Pending => write!(f, "Pending"),
            ActionStatus::Action(label) => write!(f, "Action: {}", label),
        }
    }
}

impl From<ActionStatus> for String {
    fn from(status: ActionStatus) -> String {
        status.to_string()
    }
}

impl TryFrom<String> for ActionStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        if value == "Pending" {
            Ok(ActionStatus::Pending)
        } else if let Some(label) = value.strip_prefix("Action: ") {
            Ok(ActionStatus::Action(label.to_string()))
        } else {
            Err(format!("unrecognised action status: {}", value))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// A recorded elevated-risk detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: u64,
    pub description: String,
    pub level: ThreatLevel,
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub location: GeoPoint,
    pub action_status: ActionStatus,
    pub actioned_at: Option<DateTime<Utc>>,
}

/// Fields supplied by the caller; the store assigns id and status
#[derive(Debug, Clone)]
pub struct NewIncident {
    pub description: String,
    pub level: ThreatLevel,
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub location: GeoPoint,
}

/// Ordered, process-lifetime incident list
#[derive(Debug, Default, Clone)]
pub struct IncidentStore {
    incidents: Vec<Incident>,
}

impl IncidentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an incident, returning its assigned id
    pub fn append(&mut self, new: NewIncident) -> Result<u64> {
        if new.description.trim().is_empty() {
            return Err(OlhosError::InvalidIncident("description is empty".to_string()));
        }
        if new.source.trim().is_empty() {
            return Err(OlhosError::InvalidIncident("source is empty".to_string()));
        }
        if !new.level.is_escalated() {
            return Err(OlhosError::InvalidIncident(format!(
                "level {} is not stored as an incident",
                new.level
            )));
        }

        let id = self.incidents.len() as u64 + 1;
        self.incidents.push(Incident {
            id,
            description: new.description,
            level: new.level,
            source: new.source,
            timestamp: new.timestamp,
            location: new.location,
            action_status: ActionStatus::Pending,
            actioned_at: None,
        });
        Ok(id)
    }

    /// Pending incidents, in insertion order
    pub fn list_pending(&self) -> Vec<&Incident> {
        self.incidents.iter().filter(|i| i.action_status.is_pending()).collect()
    }

    /// Set `Action: <label>` on an incident. Returns false if the id is unknown.
    pub fn update_action(&mut self, id: u64, label: &str) -> bool {
        match self.get_mut(id) {
            Some(incident) => {
                incident.action_status = ActionStatus::Action(label.to_string());
                incident.actioned_at = Some(Utc::now());
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.incidents.clear();
    }

    pub fn get(&self, id: u64) -> Option<&Incident> {
        self.incidents.iter().find(|i| i.id == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut Incident> {
        self.incidents.iter_mut().find(|i| i.id == id)
    }

    pub fn all(&self) -> &[Incident] {
        &self.incidents
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }
}

/// Synthesizes incident coordinates around a fixed reference point
#[derive(Debug, Clone)]
pub struct LocationSampler {
    reference: GeoPoint,
    spread_deg: f64,
}

impl LocationSampler {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            reference: GeoPoint {
                lat: config.reference_lat,
                lon: config.reference_lon,
            },
            spread_deg: config.spread_deg.abs(),
        }
    }

    pub fn reference(&self) -> GeoPoint {
        self.reference
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> GeoPoint {
        if self.spread_deg == 0.0 {
            return self.reference;
        }
        GeoPoint {
            lat: self.reference.lat + rng.gen_range(-self.spread_deg..=self.spread_deg),
            lon: self.reference.lon + rng.gen_range(-self.spread_deg..=self.spread_deg),
        }
    }
}
