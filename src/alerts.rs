// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Alert settings and the simulated notification fan-out

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classifier::ThreatLevel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSettings {
    #[serde(default = "default_true")]
    pub email_level1: bool,
    #[serde(default = "default_true")]
    pub sms_level2: bool,
    #[serde(default)]
    pub auto_dispatch_level3: bool,
    #[serde(default = "default_emails")]
    pub emails: Vec<String>,
    #[serde(default = "default_sms_numbers")]
    pub sms_numbers: Vec<String>,
}

fn default_true() -> bool { true }

fn default_emails() -> Vec<String> {
    vec!["alerta@policia.gov.br".to_string(), "supervisor@seguranca.com".to_string()]
}

fn default_sms_numbers() -> Vec<String> {
    vec!["+5511999998888".to_string(), "+5521988887777".to_string()]
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            email_level1: true,
            sms_level2: true,
            auto_dispatch_level3: false,
            emails: default_emails(),
            sms_numbers: default_sms_numbers(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "channel", content = "to", rename_all = "lowercase")]
pub enum Notification {
    Email(String),
    Sms(String),
}

impl AlertSettings {
    /// Recipients for an incident of the given level
    pub fn channels_for(&self, level: ThreatLevel) -> Vec<Notification> {
        let mut out = Vec::new();
        if self.email_level1 && level >= ThreatLevel::Suspicious {
            out.extend(self.emails.iter().cloned().map(Notification::Email));
        }
        if self.sms_level2 && level >= ThreatLevel::Potential {
            out.extend(self.sms_numbers.iter().cloned().map(Notification::Sms));
        }
        out
    }

    pub fn should_auto_dispatch(&self, level: ThreatLevel) -> bool {
        self.auto_dispatch_level3 && level == ThreatLevel::Imminent
    }

    /// Normalize comma-separated operator input into a recipient list
    pub fn parse_list(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Log the notifications that would go out; nothing is actually sent
pub fn notify(settings: &AlertSettings, incident_id: u64, level: ThreatLevel) -> Vec<Notification> {
    let notifications = settings.channels_for(level);
    for n in &notifications {
        match n {
            Notification::Email(to) => info!("Alert e-mail queued for incident {} to {}", incident_id, to),
            Notification::Sms(to) => info!("Alert SMS queued for incident {} to {}", incident_id, to),
        }
    }
    notifications
}
