//! Environment credential resolution.
//!
//! The configuration surface has exactly one required secret: the Groq API
//! key, supplied via the process environment. It is resolved once at
//! startup; a missing or empty value aborts before any store or provider
//! call is attempted.

use secrecy::SecretString;

use mindline_types::error::ConfigError;

/// Environment variable holding the Groq API key.
pub const API_KEY_VAR: &str = "GROQ_API_KEY";

/// Resolve the provider API key from the process environment.
///
/// Whitespace-only values count as missing. The returned key is wrapped in
/// [`SecretString`] so it never appears in Debug output or logs.
pub fn api_key_from_env() -> Result<SecretString, ConfigError> {
    match std::env::var(API_KEY_VAR) {
        Ok(value) if !value.trim().is_empty() => Ok(SecretString::from(value)),
        _ => Err(ConfigError::MissingApiKey(API_KEY_VAR)),
    }
}
