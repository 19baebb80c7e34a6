use std::path::PathBuf;

use anyhow::{Context, bail};
use tidewave_core::allocator::{DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DISTANCE};

/// JWT secrets shipped in sample configs. Refused at startup.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub media_dir: PathBuf,
    pub jwt_secret: String,
    pub alloc_max_distance: u64,
    pub alloc_max_attempts: u32,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset keys take their defaults; set but
    /// unparsable values are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = lookup("TIDEWAVE_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("TIDEWAVE_JWT_SECRET is unset or still a placeholder");
        }

        let alloc_max_attempts: u32 = parse_or(&lookup, "TIDEWAVE_ALLOC_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        if alloc_max_attempts == 0 {
            bail!("TIDEWAVE_ALLOC_MAX_ATTEMPTS must be at least 1");
        }

        Ok(Self {
            host: lookup("TIDEWAVE_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "TIDEWAVE_PORT", 3000)?,
            db_path: lookup("TIDEWAVE_DB_PATH")
                .unwrap_or_else(|| "tidewave.db".into())
                .into(),
            media_dir: lookup("TIDEWAVE_MEDIA_DIR")
                .unwrap_or_else(|| "./media".into())
                .into(),
            jwt_secret,
            alloc_max_distance: parse_or(&lookup, "TIDEWAVE_ALLOC_MAX_DISTANCE", DEFAULT_MAX_DISTANCE)?,
            alloc_max_attempts,
            max_upload_bytes: parse_or(&lookup, "TIDEWAVE_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().with_context(|| format!("Invalid {}: '{}'", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_the_secret_is_set() {
        let c = config(&[("TIDEWAVE_JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(c.host, "0.0.0.0");
        assert_eq!(c.port, 3000);
        assert_eq!(c.db_path, PathBuf::from("tidewave.db"));
        assert_eq!(c.media_dir, PathBuf::from("./media"));
        assert_eq!(c.alloc_max_distance, 1024);
        assert_eq!(c.alloc_max_attempts, 5);
        assert_eq!(c.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn placeholder_secrets_are_refused() {
        assert!(config(&[]).is_err());
        assert!(config(&[("TIDEWAVE_JWT_SECRET", "dev-secret-change-me")]).is_err());
    }

    #[test]
    fn bad_numbers_are_errors() {
        let err = config(&[("TIDEWAVE_JWT_SECRET", "s3cret"), ("TIDEWAVE_PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("TIDEWAVE_PORT"));
        assert!(config(&[("TIDEWAVE_JWT_SECRET", "s3cret"), ("TIDEWAVE_ALLOC_MAX_ATTEMPTS", "0")]).is_err());
    }

    #[test]
    fn overrides_are_read() {
        let c = config(&[
            ("TIDEWAVE_JWT_SECRET", "s3cret"),
            ("TIDEWAVE_PORT", "8080"),
            ("TIDEWAVE_ALLOC_MAX_DISTANCE", "16"),
        ])
        .unwrap();
        assert_eq!(c.port, 8080);
        assert_eq!(c.alloc_max_distance, 16);
    }
}
