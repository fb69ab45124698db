// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Text-generation backends used by the threat classifier

pub mod gemini;
pub mod ollama;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::config::{EngineConfig, Provider};
use crate::{OlhosError, Result};

/// A single, non-streaming text completion capability
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Name of this backend
    fn name(&self) -> &'static str;

    /// Send a prompt and return the model's text verbatim
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check that the backend is reachable
    async fn health_check(&self) -> Result<()>;

    /// Generate with retry logic
    async fn generate_with_retry(&self, prompt: &str, retries: u32) -> Result<String> {
        let mut last_error = None;

        for attempt in 0..=retries {
            if attempt > 0 {
                let delay = Duration::from_secs(2u64.pow(attempt - 1));
                warn!("Retrying {} request in {:?} (attempt {})", self.name(), delay, attempt + 1);
                tokio::time::sleep(delay).await;
            }

            match self.generate(prompt).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| OlhosError::Adapter("Unknown error".to_string())))
    }
}

/// Build the backend selected in configuration
pub fn build_generator(config: &EngineConfig) -> Result<Arc<dyn TextGenerator>> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let generator: Arc<dyn TextGenerator> = match config.provider {
        Provider::Gemini => {
            let api_key = std::env::var(&config.api_key_env).ok().filter(|k| !k.is_empty());
            if api_key.is_none() {
                warn!(
                    "{} is not set; classification requests will fail until it is",
                    config.api_key_env
                );
            }
            Arc::new(gemini::GeminiClient::new(&config.url, &config.model, api_key, timeout)?)
        }
        Provider::Ollama => Arc::new(ollama::OllamaClient::new(&config.url, &config.model, timeout)?),
    };
    Ok(generator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Flaky {
        failures_left: AtomicU32,
    }

    #[async_trait]
    impl TextGenerator for Flaky {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn generate(&self, _prompt: &str) -> Result<String> {
            if self.failures_left.load(Ordering::SeqCst) > 0 {
                self.failures_left.fetch_sub(1, Ordering::SeqCst);
                return Err(OlhosError::Adapter("quota exceeded".to_string()));
            }
            Ok("Nível de Risco: 2".to_string())
        }

        async fn health_check(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_no_retries_surfaces_first_error() {
        let flaky = Flaky { failures_left: AtomicU32::new(1) };
        let err = flaky.generate_with_retry("p", 0).await.unwrap_err();
        assert!(matches!(err, OlhosError::Adapter(msg) if msg == "quota exceeded"));
    }

    #[tokio::test]
    async fn test_retry_recovers() {
        let flaky = Flaky { failures_left: AtomicU32::new(1) };
        let text = flaky.generate_with_retry("p", 1).await.unwrap();
        assert_eq!(text, "Nível de Risco: 2");
    }

    #[test]
    fn test_build_ollama_backend() {
        let config = EngineConfig {
            provider: Provider::Ollama,
            url: "http://localhost:11434/api/generate".to_string(),
            model: "llama3.2:3b".to_string(),
            ..EngineConfig::default()
        };
        let generator = build_generator(&config).unwrap();
        assert_eq!(generator.name(), "ollama");
    }
}
