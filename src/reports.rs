// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Read-only aggregations over the incident list

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::incidents::Incident;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    DetectionsByPeriod,
    ResponseEfficiency,
    CommonThreatTypes,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [
        ReportKind::DetectionsByPeriod,
        ReportKind::ResponseEfficiency,
        ReportKind::CommonThreatTypes,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ReportKind::DetectionsByPeriod => "Detecções por Período",
            ReportKind::ResponseEfficiency => "Eficiência de Resposta",
            ReportKind::CommonThreatTypes => "Tipos de Ameaças Comuns",
        }
    }
}

/// Inclusive range of UTC creation days; open ends are unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl Period {
    pub fn contains(&self, incident: &Incident) -> bool {
        let day = incident.timestamp.date_naive();
        self.from.map_or(true, |from| day >= from) && self.to.map_or(true, |to| day <= to)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    DetectionsByPeriod {
        total: usize,
        per_day: BTreeMap<NaiveDate, usize>,
    },
    ResponseEfficiency {
        actioned: usize,
        pending: usize,
        mean_seconds_to_action: Option<f64>,
        per_action: BTreeMap<String, usize>,
    },
    CommonThreatTypes {
        by_level: BTreeMap<u8, usize>,
        by_source: BTreeMap<String, usize>,
    },
}

pub fn generate(kind: ReportKind, incidents: &[Incident], period: Period) -> Report {
    let selected: Vec<&Incident> = incidents.iter().filter(|i| period.contains(i)).collect();

    match kind {
        ReportKind::DetectionsByPeriod => {
            let mut per_day = BTreeMap::new();
            for incident in &selected {
                *per_day.entry(incident.timestamp.date_naive()).or_insert(0) += 1;
            }
            Report::DetectionsByPeriod {
                total: selected.len(),
                per_day,
            }
        }
        ReportKind::ResponseEfficiency => {
            let mut per_action = BTreeMap::new();
            let mut response_secs = Vec::new();
            for incident in &selected {
                if let Some(label) = incident.action_status.label() {
                    *per_action.entry(label.to_string()).or_insert(0) += 1;
                }
                if let Some(at) = incident.actioned_at {
                    response_secs.push((at - incident.timestamp).num_milliseconds() as f64 / 1000.0);
                }
            }
            let actioned: usize = per_action.values().sum();
            let mean_seconds_to_action = if response_secs.is_empty() {
                None
            } else {
                Some(response_secs.iter().sum::<f64>() / response_secs.len() as f64)
            };
            Report::ResponseEfficiency {
                actioned,
                pending: selected.len() - actioned,
                mean_seconds_to_action,
                per_action,
            }
        }
        ReportKind::CommonThreatTypes => {
            let mut by_level = BTreeMap::new();
            let mut by_source = BTreeMap::new();
            for incident in &selected {
                *by_level.entry(incident.level.as_u8()).or_insert(0) += 1;
                *by_source.entry(incident.source.clone()).or_insert(0) += 1;
            }
            Report::CommonThreatTypes { by_level, by_source }
        }
    }
}
