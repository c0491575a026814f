//! Chat settings with environment overrides.
//!
//! The configuration surface is deliberately small: one required secret
//! (the API credential, resolved in `mindline-infra`) plus a handful of
//! generation knobs with defaults, overridable through `MINDLINE_*`
//! environment variables. There is no config file.

use serde::{Deserialize, Serialize};

/// Generation settings for the chat relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    /// Model identifier sent to the provider.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature in [0, 1].
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Maximum output length in tokens.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl ChatSettings {
    /// Build settings from the process environment.
    ///
    /// `MINDLINE_MODEL` overrides the model; everything else keeps its
    /// default. Unset or empty variables are ignored.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(model) = std::env::var("MINDLINE_MODEL") {
            if !model.trim().is_empty() {
                settings.model = model;
            }
        }
        settings
    }
}
