//! Storage facade
//!
//! Orchestrates key derivation, the expiry policy, and the object
//! store into the read/write surface the host service consumes. Every
//! operation derives its physical key first, then makes one store
//! round trip; read paths degrade missing, errored, or stale objects
//! to "absent". Only configuration faults propagate as errors.

use crate::config::{Config, StoragePolicy, StorageRole};
use crate::context::RequestContext;
use crate::error::{StorageError, StorageResult};
use crate::expiry::is_expired;
use crate::keys::{derive_key, sidecar_key, SidecarKind};
use crate::store::{Lookup, ObjectStore, PutAttributes};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Storage adapter for one role of the image service
///
/// The adapter holds no durable state of its own; the object store is
/// the sole persistence owner. Concurrent calls on distinct paths are
/// independent round trips; writes to the same derived key are
/// last-write-wins at the store.
///
/// # Examples
///
/// ```rust,no_run
/// use aperture_s3::{Config, ImageStorage, MemoryStore, RequestContext, StorageRole};
/// use bytes::Bytes;
///
/// # tokio_test::block_on(async {
/// let mut config = Config::default();
/// config.result_storage.root_path = Some("prod".to_string());
///
/// let storage = ImageStorage::new(MemoryStore::new(), config, StorageRole::ResultStorage);
/// let context = RequestContext::for_path("/images/cat.jpg");
///
/// let key = storage.normalize_path(&context, &context.path);
/// storage.set(&context, Bytes::from_static(b"\xff\xd8..."), &key).await;
/// assert!(storage.exists(&context, "/images/cat.jpg").await);
/// # });
/// ```
pub struct ImageStorage<S> {
    store: S,
    config: Config,
    role: StorageRole,
}

impl<S: ObjectStore> ImageStorage<S> {
    /// Create an adapter over `store` for the given role
    pub fn new(store: S, config: Config, role: StorageRole) -> Self {
        info!("Initializing {:?} storage adapter", role);
        ImageStorage {
            store,
            config,
            role,
        }
    }

    /// Role this adapter fills
    pub fn role(&self) -> StorageRole {
        self.role
    }

    /// The underlying object store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Physical key for a logical path under the current policy
    pub fn normalize_path(&self, context: &RequestContext, path: &str) -> String {
        derive_key(path, &self.policy(context))
    }

    /// Fetch the object for a logical path
    ///
    /// Returns the raw lookup; the caller interprets presence, errors,
    /// and freshness.
    pub async fn get(&self, context: &RequestContext, path: &str) -> Lookup {
        let key = self.normalize_path(context, path);
        debug!("Fetching {}", key);
        self.store.get(&key).await
    }

    /// Store bytes at an already-derived key, applying write policy
    ///
    /// Result storage captures the context's response headers as
    /// object metadata when metadata capture is enabled. Store
    /// failures are logged and absorbed; the key is returned either
    /// way.
    pub async fn set(&self, context: &RequestContext, body: Bytes, key: &str) -> String {
        let mut metadata = HashMap::new();
        if self.role == StorageRole::ResultStorage && self.config.store_metadata {
            metadata = context.response_headers.clone();
        }

        let attributes = PutAttributes {
            metadata,
            reduced_redundancy: self.config.reduced_redundancy,
            encrypt_key: self.config.server_side_encryption,
        };

        debug!("Storing {} bytes at {}", body.len(), key);
        if let Err(err) = self.store.put(key, body, attributes).await {
            warn!("error occurred while storing data at {}: {}", key, err);
        }

        key.to_string()
    }

    /// Delete the object at an already-derived key
    pub async fn remove(&self, key: &str) {
        debug!("Deleting {}", key);
        if let Err(err) = self.store.delete(key).await {
            warn!("error occurred while deleting {}: {}", key, err);
        }
    }

    /// Whether an object exists for the logical path
    ///
    /// Existence is distinct from freshness: expiry is deliberately
    /// not consulted here.
    pub async fn exists(&self, context: &RequestContext, path: &str) -> bool {
        let key = self.normalize_path(context, path);
        match self.store.get(&key).await {
            Lookup::Found(_) => true,
            Lookup::NotFound => false,
            Lookup::BackendError(message) => {
                warn!("existence check failed at {}: {}", key, message);
                false
            }
        }
    }

    /// Last-modified time of the context's resource
    ///
    /// `None` when the object is missing, errored, or stale.
    pub async fn last_updated(&self, context: &RequestContext) -> Option<DateTime<Utc>> {
        let key = self.normalize_path(context, &context.path);
        let lookup = self.store.get(&key).await;

        if is_expired(&lookup, self.ttl(), Utc::now()) {
            warn!("s3 key not found at {}", key);
            return None;
        }

        lookup.descriptor().and_then(|descriptor| descriptor.last_modified)
    }

    /// Read the per-image security key sidecar
    pub async fn get_crypto(&self, context: &RequestContext, path: &str) -> Option<String> {
        let key = sidecar_key(&self.normalize_path(context, path), SidecarKind::Crypto);
        let lookup = self.store.get(&key).await;

        if is_expired(&lookup, self.ttl(), Utc::now()) {
            warn!("s3 key not found at {}", key);
            return None;
        }

        let descriptor = lookup.into_descriptor()?;
        String::from_utf8(descriptor.body.to_vec()).ok()
    }

    /// Write the security key sidecar for an image
    ///
    /// A no-op returning `Ok(None)` when per-image crypto storage is
    /// disabled. Fails before any store write when the policy is
    /// enabled but no security key is configured.
    pub async fn put_crypto(
        &self,
        context: &RequestContext,
        path: &str,
    ) -> StorageResult<Option<String>> {
        if !self.config.stores_crypto_key_for_each_image {
            return Ok(None);
        }

        let security_key = self.config.security_key.clone().ok_or_else(|| {
            StorageError::Configuration(
                "stores_crypto_key_for_each_image requires a security key".to_string(),
            )
        })?;

        let key = sidecar_key(&self.normalize_path(context, path), SidecarKind::Crypto);
        let stored = self.set(context, Bytes::from(security_key), &key).await;
        Ok(Some(stored))
    }

    /// Read detector metadata for an image
    pub async fn get_detector_data(
        &self,
        context: &RequestContext,
        path: &str,
    ) -> Option<Value> {
        let key = sidecar_key(&self.normalize_path(context, path), SidecarKind::DetectorData);
        let lookup = self.store.get(&key).await;

        if is_expired(&lookup, self.ttl(), Utc::now()) {
            warn!("s3 key not found at {}", key);
            return None;
        }

        let descriptor = lookup.into_descriptor()?;
        match serde_json::from_slice(&descriptor.body) {
            Ok(data) => Some(data),
            Err(err) => {
                warn!("malformed detector data at {}: {}", key, err);
                None
            }
        }
    }

    /// Write detector metadata for an image
    pub async fn put_detector_data(
        &self,
        context: &RequestContext,
        path: &str,
        data: &Value,
    ) -> StorageResult<String> {
        let key = sidecar_key(&self.normalize_path(context, path), SidecarKind::DetectorData);
        let body = serde_json::to_vec(data)?;
        Ok(self.set(context, Bytes::from(body), &key).await)
    }

    fn policy(&self, context: &RequestContext) -> StoragePolicy {
        self.config.policy_for(self.role, context)
    }

    fn ttl(&self) -> Option<u64> {
        self.config.role_config(self.role).expiration_seconds
    }
}
