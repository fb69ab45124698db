// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Response unit roster ("robot dogs")
//!
//! Units are kept in configured order; dispatch scans them front to back.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::UnitSeed;

/// Operational status of a response unit. Any free string is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UnitStatus {
    Available,
    Patrolling,
    Charging,
    OnMission(u64),
    ReturningToBase,
    Other(String),
}

impl UnitStatus {
    /// Units a dispatch may pick
    pub fn can_dispatch(&self) -> bool {
        matches!(self, UnitStatus::Available | UnitStatus::Patrolling)
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitStatus::Available => write!(f, "Available"),
            UnitStatus::Patrolling => write!(f, "Patrolling"),
            UnitStatus::Charging => write!(f, "Charging"),
            UnitStatus::OnMission(id) => write!(f, "On Mission ({})", id),
            UnitStatus::ReturningToBase => write!(f, "Returning to Base"),
            UnitStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for UnitStatus {
    fn from(value: &str) -> Self {
        match value.trim() {
            "Available" => UnitStatus::Available,
            "Patrolling" => UnitStatus::Patrolling,
            "Charging" => UnitStatus::Charging,
            "Returning to Base" => UnitStatus::ReturningToBase,
            other => other
                .strip_prefix("On Mission (")
                .and_then(|rest| rest.strip_suffix(')'))
                .and_then(|id| id.parse().ok())
                .map(UnitStatus::OnMission)
                .unwrap_or_else(|| UnitStatus::Other(other.to_string())),
        }
    }
}

impl From<String> for UnitStatus {
    fn from(value: String) -> Self {
        UnitStatus::from(value.as_str())
    }
}

impl From<UnitStatus> for String {
    fn from(status: UnitStatus) -> String {
        status.to_string()
    }
}

/// A dispatchable mobile asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseUnit {
    pub name: String,
    /// Percentage, display only
    pub battery: u8,
    pub status: UnitStatus,
    pub location: String,
}

impl From<&UnitSeed> for ResponseUnit {
    fn from(seed: &UnitSeed) -> Self {
        Self {
            name: seed.name.clone(),
            battery: seed.battery,
            status: UnitStatus::from(seed.status.as_str()),
            location: seed.location.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    units: Vec<ResponseUnit>,
}

impl Roster {
    pub fn from_seeds(seeds: &[UnitSeed]) -> Self {
        Self {
            units: seeds.iter().map(ResponseUnit::from).collect(),
        }
    }

    /// Set status and location together. Returns false for an unknown unit.
    pub fn set_status(&mut self, name: &str, status: UnitStatus, location: &str) -> bool {
        match self.units.iter_mut().find(|u| u.name == name) {
            Some(unit) => {
                unit.status = status;
                unit.location = location.to_string();
                true
            }
            None => false,
        }
    }

    /// Send a unit back to base
    pub fn recall(&mut self, name: &str) -> bool {
        self.set_status(name, UnitStatus::ReturningToBase, "Base")
    }

    /// First dispatchable unit in roster order
    pub fn first_available(&self) -> Option<&ResponseUnit> {
        self.units.iter().find(|u| u.status.can_dispatch())
    }

    pub fn get(&self, name: &str) -> Option<&ResponseUnit> {
        self.units.iter().find(|u| u.name == name)
    }

    pub fn snapshot(&self) -> Vec<ResponseUnit> {
        self.units.clone()
    }

    pub fn units(&self) -> &[ResponseUnit] {
        &self.units
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RosterConfig;

    fn roster() -> Roster {
        Roster::from_seeds(&RosterConfig::default().units)
    }

    #[test]
    fn test_seeded_in_order() {
        let names: Vec<_> = roster().units().iter().map(|u| u.name.clone()).collect();
        assert_eq!(names, vec!["Alpha-1", "Bravo-2", "Charlie-3"]);
    }

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!(UnitStatus::from("On Mission (12)"), UnitStatus::OnMission(12));
        assert_eq!(UnitStatus::OnMission(12).to_string(), "On Mission (12)");
        assert_eq!(UnitStatus::from("Returning to Base"), UnitStatus::ReturningToBase);
        assert_eq!(UnitStatus::from("Maintenance"), UnitStatus::Other("Maintenance".to_string()));
        assert_eq!(UnitStatus::from("On Mission (x)"), UnitStatus::Other("On Mission (x)".to_string()));
    }

    #[test]
    fn test_set_status_updates_location_too() {
        let mut roster = roster();
        assert!(roster.set_status("Bravo-2", UnitStatus::Charging, "Base"));
        let unit = roster.get("Bravo-2").unwrap();
        assert_eq!(unit.status, UnitStatus::Charging);
        assert_eq!(unit.location, "Base");
    }

    #[test]
    fn test_set_status_unknown_unit() {
        let mut roster = roster();
        let before = roster.snapshot();
        assert!(!roster.set_status("Delta-4", UnitStatus::Available, "Setor D"));
        assert_eq!(roster.snapshot(), before);
    }

    #[test]
    fn test_first_available_respects_order() {
        let mut roster = roster();
        assert_eq!(roster.first_available().unwrap().name, "Alpha-1");

        roster.set_status("Alpha-1", UnitStatus::OnMission(1), "1");
        assert_eq!(roster.first_available().unwrap().name, "Bravo-2");

        roster.set_status("Bravo-2", UnitStatus::Charging, "Base");
        assert!(roster.first_available().is_none());
    }

    #[test]
    fn test_recall() {
        let mut roster = roster();
        roster.set_status("Alpha-1", UnitStatus::OnMission(3), "3");
        assert!(roster.recall("Alpha-1"));
        assert_eq!(roster.get("Alpha-1").unwrap().status.to_string(), "Returning to Base");
    }
}
