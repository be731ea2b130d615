//! Configuration for key encoding and the local key registry.

use std::path::PathBuf;

/// Environment variable naming the directory registry location.
pub const REGISTRY_DIR_ENV: &str = "DIGISIGN_REGISTRY_DIR";

/// Environment variable enabling `-----BEGIN ...-----` armor on exported keys.
pub const ARMORED_KEYS_ENV: &str = "DIGISIGN_ARMORED_KEYS";

/// Signing toolkit configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigiSignConfig {
    /// Wrap encoded keys in PEM header/footer lines.
    pub armored_keys: bool,

    /// Directory used by [`DirectoryRegistry`](crate::registry::DirectoryRegistry).
    pub registry_dir: PathBuf,
}

impl Default for DigiSignConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DigiSignConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            armored_keys: false,
            registry_dir: PathBuf::from(".digisign/registry"),
        }
    }

    /// Create configuration from defaults overridden by environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::new();
        if let Ok(dir) = std::env::var(REGISTRY_DIR_ENV) {
            if !dir.trim().is_empty() {
                config.registry_dir = PathBuf::from(dir);
            }
        }
        if let Ok(flag) = std::env::var(ARMORED_KEYS_ENV) {
            config.armored_keys = parse_flag(&flag);
        }
        config
    }

    /// Enable PEM armor on encoded keys.
    pub fn with_armored_keys(mut self, enable: bool) -> Self {
        self.armored_keys = enable;
        self
    }

    /// Set the registry directory.
    pub fn with_registry_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.registry_dir = dir.into();
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
