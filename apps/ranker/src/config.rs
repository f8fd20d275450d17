use std::str::FromStr;

use thiserror::Error;

const DEFAULT_API_VERSION: &str = "2024-02-01";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Required environment variable '{0}' is not set")]
    Missing(String),

    #[error("Environment variable '{key}' is invalid: {reason}")]
    Invalid { key: String, reason: String },
}

/// Connection settings for one Azure OpenAI deployment.
#[derive(Debug, Clone)]
pub struct AzureDeployment {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
}

/// Application configuration loaded from environment variables.
/// Startup fails if any required credential is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub chat: AzureDeployment,
    pub chat_temperature: f32,
    pub chat_max_tokens: u32,
    pub embedding: AzureDeployment,
    pub embedding_chunk_size: usize,
    /// Surface raw model output in every ranking response.
    pub scorer_debug: bool,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let chat = AzureDeployment {
            endpoint: env.require("AZURE_OPENAI_ENDPOINT")?,
            api_key: env.require("AZURE_OPENAI_API_KEY")?,
            deployment: env.require("AZURE_OPENAI_DEPLOYMENT_NAME")?,
            api_version: env.or("AZURE_OPENAI_API_VERSION", DEFAULT_API_VERSION),
        };
        let embedding = AzureDeployment {
            endpoint: env.require("EMBEDDING_AZURE_OPENAI_ENDPOINT")?,
            api_key: env.require("EMBEDDING_AZURE_OPENAI_API_KEY")?,
            deployment: env.require("EMBEDDING_AZURE_OPENAI_DEPLOYMENT_NAME")?,
            api_version: env.or("EMBEDDING_AZURE_OPENAI_API_VERSION", DEFAULT_API_VERSION),
        };

        let embedding_chunk_size: usize = env.parse("EMBEDDING_CHUNK_SIZE", 10)?;
        if embedding_chunk_size == 0 {
            return Err(ConfigError::Invalid {
                key: "EMBEDDING_CHUNK_SIZE".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let max_upload_mb: usize = env.parse("MAX_UPLOAD_MB", 25)?;
        let max_upload_bytes = max_upload_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| ConfigError::Invalid {
                key: "MAX_UPLOAD_MB".to_string(),
                reason: format!("{max_upload_mb} MB overflows the byte limit"),
            })?;

        Ok(Config {
            chat,
            chat_temperature: env.parse("AZURE_OPENAI_TEMPERATURE", 0.0)?,
            chat_max_tokens: env.parse("AZURE_OPENAI_MAX_TOKENS", 512)?,
            embedding,
            embedding_chunk_size,
            scorer_debug: env.flag("SCORER_DEBUG")?,
            max_upload_bytes,
            port: env.parse("PORT", 8080)?,
            rust_log: env.or("RUST_LOG", "info"),
        })
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Blank values count as missing.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn require(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parse<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::Invalid {
                key: key.to_string(),
                reason: format!("'{raw}': {e}"),
            }),
        }
    }

    fn flag(&self, key: &str) -> Result<bool, ConfigError> {
        match self.get(key).map(|v| v.to_ascii_lowercase()).as_deref() {
            None | Some("0") | Some("false") | Some("no") | Some("off") => Ok(false),
            Some("1") | Some("true") | Some("yes") | Some("on") => Ok(true),
            Some(other) => Err(ConfigError::Invalid {
                key: key.to_string(),
                reason: format!("'{other}' is not a boolean"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn required() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("AZURE_OPENAI_ENDPOINT", "https://chat.openai.azure.com"),
            ("AZURE_OPENAI_API_KEY", "chat-key"),
            ("AZURE_OPENAI_DEPLOYMENT_NAME", "gpt-4o-mini"),
            ("EMBEDDING_AZURE_OPENAI_ENDPOINT", "https://embed.openai.azure.com"),
            ("EMBEDDING_AZURE_OPENAI_API_KEY", "embed-key"),
            ("EMBEDDING_AZURE_OPENAI_DEPLOYMENT_NAME", "text-embedding-3-small"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<Config, ConfigError> {
        Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults_applied_when_optional_vars_absent() {
        let config = load(&required()).unwrap();
        assert_eq!(config.chat.deployment, "gpt-4o-mini");
        assert_eq!(config.chat.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.embedding.api_key, "embed-key");
        assert_eq!(config.embedding_chunk_size, 10);
        assert_eq!(config.chat_max_tokens, 512);
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, 25 * 1024 * 1024);
        assert!(!config.scorer_debug);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_missing_chat_key_fails_fast() {
        let mut vars = required();
        vars.remove("AZURE_OPENAI_API_KEY");
        let err = load(&vars).unwrap_err();
        assert_eq!(err, ConfigError::Missing("AZURE_OPENAI_API_KEY".to_string()));
    }

    #[test]
    fn test_missing_embedding_deployment_fails_fast() {
        let mut vars = required();
        vars.remove("EMBEDDING_AZURE_OPENAI_DEPLOYMENT_NAME");
        let err = load(&vars).unwrap_err();
        assert!(err
            .to_string()
            .contains("EMBEDDING_AZURE_OPENAI_DEPLOYMENT_NAME"));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut vars = required();
        vars.insert("AZURE_OPENAI_ENDPOINT", "   ");
        let err = load(&vars).unwrap_err();
        assert_eq!(err, ConfigError::Missing("AZURE_OPENAI_ENDPOINT".to_string()));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let mut vars = required();
        vars.insert("PORT", "eighty");
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::Invalid { key, .. } if key == "PORT"
        ));
    }

    #[test]
    fn test_zero_chunk_size_is_rejected() {
        let mut vars = required();
        vars.insert("EMBEDDING_CHUNK_SIZE", "0");
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::Invalid { key, .. } if key == "EMBEDDING_CHUNK_SIZE"
        ));
    }

    #[test]
    fn test_oversized_upload_limit_is_rejected() {
        let mut vars = required();
        vars.insert("MAX_UPLOAD_MB", "18446744073709551615");
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::Invalid { key, .. } if key == "MAX_UPLOAD_MB"
        ));
    }

    #[test]
    fn test_debug_flag_accepts_common_spellings() {
        let mut vars = required();
        vars.insert("SCORER_DEBUG", "TRUE");
        assert!(load(&vars).unwrap().scorer_debug);

        vars.insert("SCORER_DEBUG", "maybe");
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_model_parameters_are_parsed() {
        let mut vars = required();
        vars.insert("AZURE_OPENAI_TEMPERATURE", "0.2");
        vars.insert("AZURE_OPENAI_MAX_TOKENS", "256");
        let config = load(&vars).unwrap();
        assert!((config.chat_temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.chat_max_tokens, 256);
    }
}
