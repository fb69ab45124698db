// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Threat classifier: turns free-text model output into a coarse risk level
//!
//! The model is asked in natural language to state a risk level. The reply is
//! scanned with plain, case-sensitive substring matches; level 3 markers win
//! over level 2 markers, and anything else is "no escalation".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::ai::TextGenerator;
use crate::Result;

const LEVEL_3_MARKERS: &[&str] = &["Nível de Risco: 3", "Nível: 3", "Nível 3", "Level: 3", "Level 3"];
const LEVEL_2_MARKERS: &[&str] = &["Nível de Risco: 2", "Nível: 2", "Nível 2", "Level: 2", "Level 2"];

/// Coarse risk level shown on the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ThreatLevel {
    None,
    Suspicious,
    Potential,
    Imminent,
}

impl ThreatLevel {
    pub const ALL: [ThreatLevel; 4] = [
        ThreatLevel::None,
        ThreatLevel::Suspicious,
        ThreatLevel::Potential,
        ThreatLevel::Imminent,
    ];

    pub fn as_u8(self) -> u8 {
        match self {
            ThreatLevel::None => 0,
            ThreatLevel::Suspicious => 1,
            ThreatLevel::Potential => 2,
            ThreatLevel::Imminent => 3,
        }
    }

    /// Only levels 2 and 3 become incidents
    pub fn is_escalated(self) -> bool {
        self >= ThreatLevel::Potential
    }

    pub fn label(self) -> &'static str {
        match self {
            ThreatLevel::None => "Nenhuma Ameaça",
            ThreatLevel::Suspicious => "Nível 1: Atividade Suspeita",
            ThreatLevel::Potential => "Nível 2: Ameaça Potencial",
            ThreatLevel::Imminent => "Nível 3: Ameaça Iminente!",
        }
    }

    /// Operator-facing status line for the detection simulator
    pub fn status_message(self) -> &'static str {
        match self {
            ThreatLevel::None => "✅ Tudo tranquilo! Nenhuma ameaça detectada no momento.",
            ThreatLevel::Suspicious => {
                "👀 Nível 1: Atividade suspeita detectada. Monitoramento intensificado."
            }
            ThreatLevel::Potential => {
                "⚠️ Nível 2: Ameaça potencial identificada! Alerta enviado para as autoridades locais."
            }
            ThreatLevel::Imminent => {
                "🚨 NÍVEL 3: AMEAÇA IMINENTE! Ação imediata requerida! Autoridades e cães-robôs acionados!"
            }
        }
    }
}

impl From<ThreatLevel> for u8 {
    fn from(level: ThreatLevel) -> u8 {
        level.as_u8()
    }
}

impl TryFrom<u8> for ThreatLevel {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(ThreatLevel::None),
            1 => Ok(ThreatLevel::Suspicious),
            2 => Ok(ThreatLevel::Potential),
            3 => Ok(ThreatLevel::Imminent),
            other => Err(format!("threat level must be 0-3, got {}", other)),
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// What the classifier made of one model reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Model output, verbatim
    pub text: String,
    /// `Some(Potential | Imminent)` when a marker was found
    pub level: Option<ThreatLevel>,
}

impl ClassificationResult {
    pub fn from_text(text: String) -> Self {
        let level = detect_level(&text);
        Self { text, level }
    }

    /// First non-blank line of the reply, used as the incident description
    pub fn summary(&self) -> &str {
        self.text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("")
    }
}

/// Scan model output for risk markers
pub fn detect_level(text: &str) -> Option<ThreatLevel> {
    if LEVEL_3_MARKERS.iter().any(|m| text.contains(m)) {
        Some(ThreatLevel::Imminent)
    } else if LEVEL_2_MARKERS.iter().any(|m| text.contains(m)) {
        Some(ThreatLevel::Potential)
    } else {
        None
    }
}

/// Fill the `{camera}` and `{scenario}` placeholders of a prompt template
pub fn render_prompt(template: &str, camera: &str, scenario: &str) -> String {
    template.replace("{camera}", camera).replace("{scenario}", scenario)
}

/// Adapter between the console and a text-generation backend
#[derive(Clone)]
pub struct Classifier {
    generator: Arc<dyn TextGenerator>,
    retries: u32,
}

impl Classifier {
    pub fn new(generator: Arc<dyn TextGenerator>, retries: u32) -> Self {
        Self { generator, retries }
    }

    pub fn backend(&self) -> &'static str {
        self.generator.name()
    }

    /// Send a prompt to the model and classify the reply.
    ///
    /// Errors are always `OlhosError::Adapter`; no console state is touched here.
    pub async fn classify(&self, prompt: &str) -> Result<ClassificationResult> {
        debug!("Classifying prompt ({} chars) via {}", prompt.len(), self.backend());

        let text = match self.generator.generate_with_retry(prompt, self.retries).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Classification failed: {}", e);
                return Err(e);
            }
        };

        let result = ClassificationResult::from_text(text);
        match result.level {
            Some(level) => info!("Model reported risk level {}", level),
            None => debug!("No escalation marker in model reply"),
        }
        Ok(result)
    }

    pub async fn health_check(&self) -> Result<()> {
        self.generator.health_check().await
    }
}
