//! Router configuration
//!
//! Credentials are read from the environment once at startup; their
//! presence is the only thing that decides which remote adapters join the
//! fallback chain. Placeholder values left over from a `.env` template
//! count as absent.

use std::env;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// Startup configuration for [`crate::AiRouter`]
#[derive(Clone, Default)]
pub struct RouterConfig {
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_model: String,
    pub openai_model: String,
}

impl std::fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterConfig")
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("gemini_model", &self.gemini_model)
            .field("openai_model", &self.openai_model)
            .finish()
    }
}

impl RouterConfig {
    /// Read `GEMINI_API_KEY`, `OPENAI_API_KEY`, and optional model
    /// overrides from the environment
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: read_key("GEMINI_API_KEY"),
            openai_api_key: read_key("OPENAI_API_KEY"),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
        }
    }
}

fn read_key(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| credentials_present(value))
}

/// Whether a key looks like an actual credential rather than an empty
/// value or an unedited template placeholder
pub(crate) fn credentials_present(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !value.contains("your_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_present() {
        assert!(credentials_present("sk-abc123"));
        assert!(credentials_present("  AIzaXYZ  "));
        assert!(!credentials_present(""));
        assert!(!credentials_present("   "));
        assert!(!credentials_present("your_gemini_api_key_here"));
        assert!(!credentials_present("your_actual_openai_key"));
    }

    #[test]
    fn test_default_has_no_keys() {
        let config = RouterConfig::default();
        assert!(config.gemini_api_key.is_none());
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = RouterConfig {
            gemini_api_key: Some("secret-key".to_string()),
            openai_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("gemini-pro"));
    }
}
