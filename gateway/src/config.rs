use std::path::Path;
use std::time::Duration;

use replygate_guardrails::guards::{RunnerSettings, SafetyTimeoutPolicy};
use serde::{Deserialize, Serialize};

pub const DEFAULT_GENERATION_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_GUARD_MODEL: &str = "phi3";

const MIN_GUARD_TIMEOUT_SECS: u64 = 10;
const MAX_GUARD_TIMEOUT_SECS: u64 = 300;
const DEFAULT_GUARD_TIMEOUT_SECS: u64 = 45;

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct GenerationConfig {
    pub model: Option<String>,
    pub api_url: Option<String>,
}

impl GenerationConfig {
    /// Env wins over yaml, then the default. Never empty.
    pub fn model(&self) -> String {
        env_non_empty("MODEL_NAME")
            .or_else(|| env_non_empty("GROQ_MODEL"))
            .or_else(|| {
                self.model
                    .as_deref()
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_GENERATION_MODEL.to_string())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct OllamaConfig {
    pub endpoint: Option<String>,
}

impl OllamaConfig {
    pub fn endpoint(&self) -> Option<String> {
        env_non_empty("OLLAMA_ENDPOINT").or_else(|| self.endpoint.clone())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GuardSettings {
    pub enabled: bool,
    pub model: String,
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            model: DEFAULT_GUARD_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct GuardsConfig {
    pub safety: GuardSettings,
    pub topic: GuardSettings,
    pub format: GuardSettings,
    pub pii: GuardSettings,
}

impl GuardsConfig {
    /// Enabled guards in canonical dispatch order.
    pub fn enabled(&self) -> Vec<(&'static str, &GuardSettings)> {
        [
            ("safety", &self.safety),
            ("topic", &self.topic),
            ("format", &self.format),
            ("pii", &self.pii),
        ]
        .into_iter()
        .filter(|(_, settings)| settings.enabled)
        .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub generation: GenerationConfig,
    pub ollama: OllamaConfig,
    pub guards: GuardsConfig,
    pub guard_timeout_seconds: Option<u64>,
    pub on_safety_timeout: SafetyTimeoutPolicy,
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Self {
        match std::fs::File::open(config_path) {
            Ok(f) => match serde_yaml::from_reader(f) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to parse config file, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Per-task timeout clamped to [10, 300] seconds, default 45.
    pub fn guard_timeout(&self) -> Duration {
        let secs = self
            .guard_timeout_seconds
            .unwrap_or(DEFAULT_GUARD_TIMEOUT_SECS)
            .clamp(MIN_GUARD_TIMEOUT_SECS, MAX_GUARD_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn runner_settings(&self) -> RunnerSettings {
        RunnerSettings {
            per_task_timeout: self.guard_timeout(),
            on_safety_timeout: self.on_safety_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_timeout_is_clamped_and_defaulted() {
        let mut config = Config::default();
        assert_eq!(config.guard_timeout(), Duration::from_secs(45));

        config.guard_timeout_seconds = Some(1);
        assert_eq!(config.guard_timeout(), Duration::from_secs(10));

        config.guard_timeout_seconds = Some(9999);
        assert_eq!(config.guard_timeout(), Duration::from_secs(300));

        config.guard_timeout_seconds = Some(60);
        assert_eq!(config.guard_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn guards_default_to_disabled() {
        let config = Config::default();
        assert!(config.guards.enabled().is_empty());
        assert_eq!(config.on_safety_timeout, SafetyTimeoutPolicy::Flag);
    }

    #[test]
    fn enabled_guards_keep_canonical_order() {
        let yaml = r#"
            guards:
                pii:
                    enabled: true
                safety:
                    enabled: true
                    model: llama3.2
                format:
                    enabled: true
            guard_timeout_seconds: 30
            on_safety_timeout: block
        "#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        let enabled: Vec<&str> = config.guards.enabled().iter().map(|(n, _)| *n).collect();
        assert_eq!(enabled, vec!["safety", "format", "pii"]);
        assert_eq!(config.guards.safety.model, "llama3.2");
        assert_eq!(config.guards.pii.model, "phi3");
        assert_eq!(config.on_safety_timeout, SafetyTimeoutPolicy::Block);
        assert_eq!(config.guard_timeout(), Duration::from_secs(30));
    }
}
