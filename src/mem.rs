//! In-memory object store
//!
//! Backs the integration tests and local development. Entries behave
//! like bucket objects: writes stamp a last-modified time and record
//! the attributes they were stored with.

use crate::error::StorageResult;
use crate::store::{Lookup, ObjectDescriptor, ObjectStore, PutAttributes};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    metadata: HashMap<String, String>,
    last_modified: DateTime<Utc>,
    reduced_redundancy: bool,
    encrypt_key: bool,
}

/// Object store held entirely in process memory
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// True when nothing is stored
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Attributes recorded when `key` was stored
    pub fn attributes(&self, key: &str) -> Option<PutAttributes> {
        self.objects.read().get(key).map(|object| PutAttributes {
            metadata: object.metadata.clone(),
            reduced_redundancy: object.reduced_redundancy,
            encrypt_key: object.encrypt_key,
        })
    }

    /// Rewrite an object's last-modified time
    ///
    /// Returns false when no object exists at `key`. Lets tests age an
    /// entry past an expiry horizon.
    pub fn backdate(&self, key: &str, last_modified: DateTime<Utc>) -> bool {
        match self.objects.write().get_mut(key) {
            Some(object) => {
                object.last_modified = last_modified;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, key: &str) -> Lookup {
        match self.objects.read().get(key) {
            Some(object) => Lookup::Found(ObjectDescriptor {
                body: object.body.clone(),
                last_modified: Some(object.last_modified),
                metadata: object.metadata.clone(),
            }),
            None => Lookup::NotFound,
        }
    }

    async fn put(
        &self,
        key: &str,
        body: Bytes,
        attributes: PutAttributes,
    ) -> StorageResult<String> {
        self.objects.write().insert(
            key.to_string(),
            StoredObject {
                body,
                metadata: attributes.metadata,
                last_modified: Utc::now(),
                reduced_redundancy: attributes.reduced_redundancy,
                encrypt_key: attributes.encrypt_key,
            },
        );
        Ok(key.to_string())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.objects.write().remove(key);
        Ok(())
    }
}
