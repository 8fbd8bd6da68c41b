//! Configuration types and utilities
//!
//! The original fixtures read their cipher transformation from a
//! `benchmark.properties` resource (key `cryptoAlg1`). The same key=value
//! format is accepted here; anything missing falls back to the defaults.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::BenchError;

/// Default transformation used by the configurable crypto routes.
pub const DEFAULT_CRYPTO_ALG: &str = "DESede/ECB/PKCS5Padding";

/// Static fixture-server startup configuration.
/// These settings are set at startup and do not change during runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Address to listen on
    pub listen_address: String,
    /// Port to listen on
    pub listen_port: u16,
    /// Directory for test artifacts (the shared password file lives here)
    pub testfiles_dir: String,
    /// Cipher transformation for the configurable crypto routes
    /// (properties key `cryptoAlg1`)
    pub crypto_alg1: String,
    /// Whether SQL failures are collapsed to a generic response
    /// (properties key `hideSQLErrors`)
    pub hide_sql_errors: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            listen_address: "127.0.0.1".to_string(),
            listen_port: 8008,
            testfiles_dir: "./testfiles".to_string(),
            crypto_alg1: DEFAULT_CRYPTO_ALG.to_string(),
            hide_sql_errors: true,
        }
    }
}

impl BenchConfig {
    /// Load configuration from a properties file, falling back to defaults
    /// for anything absent. A missing file is not an error: the original
    /// fixtures behave the same when `benchmark.properties` is not on the
    /// classpath.
    pub fn from_properties_file(path: &Path) -> Result<Self, BenchError> {
        let mut config = Self::default();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "properties file not found, using defaults");
                return Ok(config);
            }
            Err(err) => return Err(err.into()),
        };

        let props = parse_properties(&text);
        if let Some(alg) = props.get("cryptoAlg1") {
            config.crypto_alg1 = alg.clone();
        }
        if let Some(dir) = props.get("testfilesDir") {
            config.testfiles_dir = dir.clone();
        }
        if let Some(hide) = props.get("hideSQLErrors") {
            config.hide_sql_errors = hide.trim().eq_ignore_ascii_case("true");
        }
        Ok(config)
    }

    /// Socket address string for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_address, self.listen_port)
    }
}

/// Parse `key=value` lines. Blank lines and `#`/`!` comment lines are
/// skipped; whitespace around keys and values is trimmed.
fn parse_properties(text: &str) -> HashMap<String, String> {
    let mut props = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            props.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    props
}
