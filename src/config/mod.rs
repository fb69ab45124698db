// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for Olhos

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::alerts::AlertSettings;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// AI engine configuration
    pub ai_engine: EngineConfig,

    /// Prompt templates
    #[serde(default)]
    pub prompts: PromptConfig,

    /// Response units seeded into the roster, in dispatch scan order
    #[serde(default)]
    pub roster: RosterConfig,

    /// Camera feeds offered as classification sources
    #[serde(default = "default_cameras")]
    pub cameras: Vec<CameraFeed>,

    /// Alert channels and automatic dispatch
    #[serde(default)]
    pub alerts: AlertSettings,

    /// Reference point for synthesized incident locations
    #[serde(default)]
    pub map: MapConfig,

    /// Web UI settings
    #[serde(default)]
    pub web: WebConfig,
}

/// Which text-generation backend the classifier talks to
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    Ollama,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EngineConfig {
    #[serde(default = "default_provider")]
    pub provider: Provider,
    #[serde(default = "default_engine_url")]
    pub url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Extra attempts after a failed request, at most `MAX_RETRIES`
    #[serde(default)]
    pub retries: u32,
}

/// Backoff doubles per attempt: 5 retries wait 31 s in total
pub const MAX_RETRIES: u32 = 5;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PromptConfig {
    /// Rendered with `{camera}` and `{scenario}` placeholders
    #[serde(default = "default_threat_prompt")]
    pub threat_assessment: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RosterConfig {
    #[serde(default = "default_units")]
    pub units: Vec<UnitSeed>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct UnitSeed {
    pub name: String,
    pub battery: u8,
    pub status: String,
    pub location: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CameraFeed {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MapConfig {
    #[serde(default = "default_reference_lat")]
    pub reference_lat: f64,
    #[serde(default = "default_reference_lon")]
    pub reference_lon: f64,
    /// Maximum offset in degrees applied to each coordinate
    #[serde(default = "default_spread")]
    pub spread_deg: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
}

// Default value functions
fn default_provider() -> Provider { Provider::Gemini }
fn default_engine_url() -> String { "https://generativelanguage.googleapis.com/v1beta".to_string() }
fn default_model() -> String { "gemini-2.0-flash".to_string() }
fn default_api_key_env() -> String { "GEMINI_API_KEY".to_string() }
fn default_timeout() -> u64 { 20 }
fn default_reference_lat() -> f64 { -23.5505 }
fn default_reference_lon() -> f64 { -46.6333 }
fn default_spread() -> f64 { 0.05 }
fn default_web_host() -> String { "127.0.0.1".to_string() }
fn default_web_port() -> u16 { 8501 }

fn default_threat_prompt() -> String {
    "Você é o sistema de análise do Olhos da Lei. Analise a situação observada pela \
     {camera}: \"{scenario}\". Responda com uma descrição curta na primeira linha e, \
     em seguida, informe o nível de risco no formato 'Nível de Risco: N', onde N é \
     1 (atividade suspeita), 2 (ameaça potencial) ou 3 (ameaça iminente)."
        .to_string()
}

fn default_units() -> Vec<UnitSeed> {
    [
        ("Alpha-1", 95, "Available", "Base"),
        ("Bravo-2", 78, "Patrolling", "Setor B"),
        ("Charlie-3", 32, "Charging", "Base"),
    ]
    .into_iter()
    .map(|(name, battery, status, location)| UnitSeed {
        name: name.to_string(),
        battery,
        status: status.to_string(),
        location: location.to_string(),
    })
    .collect()
}

fn default_cameras() -> Vec<CameraFeed> {
    (1..=5)
        .map(|i| CameraFeed {
            id: format!("cam-{}", i),
            label: format!("Câmera {} - Localização Exemplo {}", i, i),
        })
        .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ai_engine: EngineConfig::default(),
            prompts: PromptConfig::default(),
            roster: RosterConfig::default(),
            cameras: default_cameras(),
            alerts: AlertSettings::default(),
            map: MapConfig::default(),
            web: WebConfig::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            url: default_engine_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout(),
            retries: 0,
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            threat_assessment: default_threat_prompt(),
        }
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            units: default_units(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            reference_lat: default_reference_lat(),
            reference_lon: default_reference_lon(),
            spread_deg: default_spread(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::OlhosError::Config(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject configurations the console cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.ai_engine.timeout_secs == 0 {
            return Err(crate::OlhosError::Config(
                "ai_engine.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.ai_engine.retries > MAX_RETRIES {
            return Err(crate::OlhosError::Config(format!(
                "ai_engine.retries must be at most {}, got {}",
                MAX_RETRIES, self.ai_engine.retries
            )));
        }

        let mut names = HashSet::new();
        for unit in &self.roster.units {
            if unit.name.trim().is_empty() {
                return Err(crate::OlhosError::Config("Roster unit with empty name".to_string()));
            }
            if !names.insert(unit.name.as_str()) {
                return Err(crate::OlhosError::Config(format!(
                    "Duplicate roster unit: {}",
                    unit.name
                )));
            }
            if unit.battery > 100 {
                return Err(crate::OlhosError::Config(format!(
                    "Battery for {} must be a percentage, got {}",
                    unit.name, unit.battery
                )));
            }
        }

        let mut ids = HashSet::new();
        for camera in &self.cameras {
            if !ids.insert(camera.id.as_str()) {
                return Err(crate::OlhosError::Config(format!(
                    "Duplicate camera id: {}",
                    camera.id
                )));
            }
        }

        if !(self.map.spread_deg >= 0.0 && self.map.spread_deg.is_finite()) {
            return Err(crate::OlhosError::Config(
                "map.spread_deg must be a non-negative number".to_string(),
            ));
        }

        Ok(())
    }

    /// Camera label for a source id, falling back to the id itself
    pub fn camera_label<'a>(&'a self, source: &'a str) -> &'a str {
        self.cameras
            .iter()
            .find(|c| c.id == source)
            .map(|c| c.label.as_str())
            .unwrap_or(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ai_engine.timeout_secs, 20);
        assert_eq!(config.roster.units.len(), 3);
        assert_eq!(config.roster.units[0].name, "Alpha-1");
        assert_eq!(config.cameras.len(), 5);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.ai_engine.provider, Provider::Gemini);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.ai_engine.provider = Provider::Ollama;
        config.web.port = 9000;
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.ai_engine.provider, Provider::Ollama);
        assert_eq!(loaded.web.port, 9000);
        assert_eq!(loaded.roster.units, config.roster.units);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"ai_engine": {"provider": "ollama", "url": "http://localhost:11434"}}"#)
            .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.ai_engine.provider, Provider::Ollama);
        assert_eq!(config.ai_engine.timeout_secs, 20);
        assert_eq!(config.cameras.len(), 5);
    }

    #[test]
    fn test_duplicate_unit_rejected() {
        let mut config = AppConfig::default();
        let first = config.roster.units[0].clone();
        config.roster.units.push(first);
        assert!(matches!(config.validate(), Err(crate::OlhosError::Config(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.ai_engine.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retries_capped() {
        let mut config = AppConfig::default();
        config.ai_engine.retries = MAX_RETRIES;
        assert!(config.validate().is_ok());

        config.ai_engine.retries = 40;
        assert!(matches!(config.validate(), Err(crate::OlhosError::Config(_))));
    }

    #[test]
    fn test_camera_label_fallback() {
        let config = AppConfig::default();
        assert_eq!(config.camera_label("cam-2"), "Câmera 2 - Localização Exemplo 2");
        assert_eq!(config.camera_label("drone-7"), "drone-7");
    }
}
