//! Configuration for reaching the hosted backend.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const ENV_BACKEND_URL: &str = "PP_BACKEND_URL";
pub const ENV_BACKEND_ANON_KEY: &str = "PP_BACKEND_ANON_KEY";
pub const ENV_STORAGE_BUCKET: &str = "PP_STORAGE_BUCKET";

/// Bucket project images and avatars are uploaded to unless overridden.
pub const DEFAULT_STORAGE_BUCKET: &str = "project-images";

/// Errors raised while assembling a [`BackendConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingEnvVar(&'static str),
    InvalidUrl(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingEnvVar(name) => write!(f, "Missing environment variable: {}", name),
            ConfigError::InvalidUrl(url) => write!(f, "Invalid backend URL: {}", url),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where the backend-as-a-service lives and how to identify this app to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the project, e.g. `https://xyz.supabase.co` (no trailing slash).
    pub url: String,
    /// Public anonymous API key sent as `apikey` on every request.
    pub anon_key: String,
    /// Object storage bucket for uploaded images.
    pub storage_bucket: String,
}

impl BackendConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let trimmed = url.trim().trim_end_matches('/').to_string();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(url));
        }
        Ok(Self {
            url: trimmed,
            anon_key: anon_key.into(),
            storage_bucket: DEFAULT_STORAGE_BUCKET.to_string(),
        })
    }

    pub fn with_storage_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.storage_bucket = bucket.into();
        self
    }

    /// Build from the `PP_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, compile-time values, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());

        let url = get(ENV_BACKEND_URL).ok_or(ConfigError::MissingEnvVar(ENV_BACKEND_URL))?;
        let anon_key = get(ENV_BACKEND_ANON_KEY).ok_or(ConfigError::MissingEnvVar(ENV_BACKEND_ANON_KEY))?;
        let config = Self::new(url, anon_key)?;

        Ok(match get(ENV_STORAGE_BUCKET) {
            Some(bucket) => config.with_storage_bucket(bucket),
            None => config,
        })
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let config = BackendConfig::new("https://demo.supabase.co/", "anon").unwrap();
        assert_eq!(config.url, "https://demo.supabase.co");
        assert_eq!(config.storage_bucket, DEFAULT_STORAGE_BUCKET);
        assert!(matches!(BackendConfig::new("demo.supabase.co", "anon"), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_from_lookup_requires_url_and_key() {
        let err = BackendConfig::from_lookup(|_| None).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnvVar(ENV_BACKEND_URL));

        let err = BackendConfig::from_lookup(|k| (k == ENV_BACKEND_URL).then(|| "https://x.test".to_string())).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnvVar(ENV_BACKEND_ANON_KEY));
    }

    #[test]
    #[serial]
    fn test_from_env_reads_bucket_override() {
        unsafe {
            std::env::set_var(ENV_BACKEND_URL, "https://env.example");
            std::env::set_var(ENV_BACKEND_ANON_KEY, "key");
            std::env::set_var(ENV_STORAGE_BUCKET, "media");
        }
        let config = BackendConfig::from_env().unwrap();
        unsafe {
            std::env::remove_var(ENV_BACKEND_URL);
            std::env::remove_var(ENV_BACKEND_ANON_KEY);
            std::env::remove_var(ENV_STORAGE_BUCKET);
        }

        assert_eq!(config.url, "https://env.example");
        assert_eq!(config.anon_key, "key");
        assert_eq!(config.storage_bucket, "media");
    }
}
