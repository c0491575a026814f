//! Completion provider implementations.
//!
//! Contains the concrete implementation of the [`CompletionProvider`] trait
//! defined in `mindline-core`, plus a provider factory ([`create_provider`])
//! that refuses to construct a client without a credential.
//!
//! [`CompletionProvider`]: mindline_core::llm::provider::CompletionProvider

pub mod groq;

use secrecy::SecretString;

use mindline_core::llm::box_provider::BoxCompletionProvider;
use mindline_types::config::ChatSettings;
use mindline_types::error::ConfigError;

use self::groq::GroqProvider;

use crate::credentials::API_KEY_VAR;

/// Create a [`BoxCompletionProvider`] from settings and a resolved API key.
///
/// # Errors
///
/// Returns [`ConfigError::MissingApiKey`] when no key is provided; no
/// client is constructed and no network state is touched in that case.
pub fn create_provider(
    settings: &ChatSettings,
    api_key: Option<SecretString>,
) -> Result<BoxCompletionProvider, ConfigError> {
    let key = api_key.ok_or(ConfigError::MissingApiKey(API_KEY_VAR))?;
    let provider = GroqProvider::new(&key, settings.model.clone());
    Ok(BoxCompletionProvider::new(provider))
}
