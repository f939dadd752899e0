//! Adapter configuration
//!
//! Configuration is a plain value passed into the facade at
//! construction. Per-role settings (bucket, root path, expiry) live in
//! a [`RoleConfig`] selected by [`StorageRole`]; everything else is
//! shared. Values can come from the process environment or a TOML
//! file.

use crate::context::RequestContext;
use crate::error::StorageResult;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Which storage role an adapter instance fills
///
/// The role selects the configuration prefix. Result storage
/// additionally captures response headers as object metadata when
/// metadata capture is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageRole {
    /// Processed results written back after a transformation
    ResultStorage,

    /// Source images fetched on behalf of the service
    Loader,

    /// Originals and their sidecar artifacts
    Storage,
}

impl StorageRole {
    /// Environment prefix for this role's settings
    pub fn prefix(&self) -> &'static str {
        match self {
            StorageRole::ResultStorage => "TC_AWS_RESULT_STORAGE",
            StorageRole::Loader => "TC_AWS_LOADER",
            StorageRole::Storage => "TC_AWS_STORAGE",
        }
    }
}

/// Per-role settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RoleConfig {
    /// Bucket this role reads and writes
    pub bucket: String,

    /// Prefix prepended to every derived key
    pub root_path: Option<String>,

    /// Expiry horizon in seconds; `None` or `0` never expires
    pub expiration_seconds: Option<u64>,
}

impl RoleConfig {
    fn from_env(prefix: &str) -> Self {
        RoleConfig {
            bucket: env_string(&format!("{prefix}_BUCKET")).unwrap_or_default(),
            root_path: env_string(&format!("{prefix}_ROOT_PATH")),
            expiration_seconds: env_u64(&format!("{prefix}_EXPIRATION_SECONDS")),
        }
    }
}

/// Adapter configuration shared across roles
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// AWS region
    pub region: Option<String>,

    /// Custom S3-compatible endpoint
    pub endpoint: Option<String>,

    /// Capture response headers as object metadata on result writes
    pub store_metadata: bool,

    /// Store objects under the reduced-redundancy storage class
    pub reduced_redundancy: bool,

    /// Request server-side encryption on writes
    pub server_side_encryption: bool,

    /// Prepend a content-derived digest segment to every key
    pub randomize_keys: bool,

    /// Filename substituted when a derived key would end in `/`
    pub root_image_name: String,

    /// Serve WebP variants to clients that accept them
    pub auto_webp: bool,

    /// Store the security key next to each image
    pub stores_crypto_key_for_each_image: bool,

    /// Server-level security key
    pub security_key: Option<String>,

    /// Result storage settings
    pub result_storage: RoleConfig,

    /// Loader settings
    pub loader: RoleConfig,

    /// Original storage settings
    pub storage: RoleConfig,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Config {
            region: env_string("TC_AWS_REGION"),
            endpoint: env_string("TC_AWS_ENDPOINT"),
            store_metadata: env_bool("TC_AWS_STORE_METADATA"),
            reduced_redundancy: env_bool("TC_AWS_STORAGE_RRS"),
            server_side_encryption: env_bool("TC_AWS_STORAGE_SSE"),
            randomize_keys: env_bool("TC_AWS_RANDOMIZE_KEYS"),
            root_image_name: env_string("TC_AWS_ROOT_IMAGE_NAME").unwrap_or_default(),
            auto_webp: env_bool("AUTO_WEBP"),
            stores_crypto_key_for_each_image: env_bool("STORES_CRYPTO_KEY_FOR_EACH_IMAGE"),
            security_key: env_string("SECURITY_KEY"),
            result_storage: RoleConfig::from_env(StorageRole::ResultStorage.prefix()),
            loader: RoleConfig::from_env(StorageRole::Loader.prefix()),
            storage: RoleConfig::from_env(StorageRole::Storage.prefix()),
        }
    }

    /// Read configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Settings for the given role
    pub fn role_config(&self, role: StorageRole) -> &RoleConfig {
        match role {
            StorageRole::ResultStorage => &self.result_storage,
            StorageRole::Loader => &self.loader,
            StorageRole::Storage => &self.storage,
        }
    }

    /// Effective key-derivation policy for one request
    ///
    /// WebP variants apply only when both the adapter and the client
    /// support them.
    pub fn policy_for(&self, role: StorageRole, context: &RequestContext) -> StoragePolicy {
        let role_config = self.role_config(role);
        StoragePolicy {
            root_path: role_config.root_path.clone(),
            randomize_keys: self.randomize_keys,
            auto_webp: self.auto_webp && context.accepts_webp,
            root_image_name: self.root_image_name.clone(),
            ttl_seconds: role_config.expiration_seconds,
        }
    }
}

/// Key-derivation and expiry policy for a single request
///
/// A resolved, read-only snapshot of everything key derivation needs.
/// Identical (path, policy) pairs always derive identical keys.
#[derive(Debug, Clone, Default)]
pub struct StoragePolicy {
    /// Prefix prepended to every derived key
    pub root_path: Option<String>,

    /// Prepend a content-derived digest segment
    pub randomize_keys: bool,

    /// Append the `webp` variant segment
    pub auto_webp: bool,

    /// Filename substituted when a derived key would end in `/`
    pub root_image_name: String,

    /// Expiry horizon in seconds; `None` or `0` never expires
    pub ttl_seconds: Option<u64>,
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

fn env_bool(key: &str) -> bool {
    match env::var(key) {
        Ok(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => false,
    }
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}
