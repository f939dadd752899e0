//! Object store collaborator interface
//!
//! The adapter is a pure client of an S3-compatible object store. The
//! store reports fetch failures in-band as a [`Lookup`] variant rather
//! than through the error channel, so read paths can uniformly degrade
//! a failed fetch to "absent".

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A stored object returned by a successful fetch
#[derive(Debug, Clone)]
pub struct ObjectDescriptor {
    /// Object body
    pub body: Bytes,

    /// Last-modified time reported by the store (UTC)
    pub last_modified: Option<DateTime<Utc>>,

    /// User metadata attached at write time
    pub metadata: HashMap<String, String>,
}

/// Outcome of an object-store fetch
#[derive(Debug, Clone)]
pub enum Lookup {
    /// The object exists
    Found(ObjectDescriptor),

    /// No object at the requested key
    NotFound,

    /// The store answered with an error payload
    BackendError(String),
}

impl Lookup {
    /// True when the fetch returned an object
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// In-band error message, if any
    pub fn error(&self) -> Option<&str> {
        match self {
            Lookup::BackendError(message) => Some(message),
            _ => None,
        }
    }

    /// Borrow the descriptor of a found object
    pub fn descriptor(&self) -> Option<&ObjectDescriptor> {
        match self {
            Lookup::Found(descriptor) => Some(descriptor),
            _ => None,
        }
    }

    /// Consume the lookup, keeping the descriptor of a found object
    pub fn into_descriptor(self) -> Option<ObjectDescriptor> {
        match self {
            Lookup::Found(descriptor) => Some(descriptor),
            _ => None,
        }
    }
}

/// Write-time attributes applied by storage policy
#[derive(Debug, Clone, Default)]
pub struct PutAttributes {
    /// User metadata stored with the object
    pub metadata: HashMap<String, String>,

    /// Store under the reduced-redundancy storage class
    pub reduced_redundancy: bool,

    /// Encrypt the object server-side
    pub encrypt_key: bool,
}

/// S3-compatible object store
///
/// Implementations own all transport concerns: retries, timeouts, and
/// credential resolution happen behind this seam.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the object at `key`
    async fn get(&self, key: &str) -> Lookup;

    /// Store `body` at `key`, returning the key
    async fn put(&self, key: &str, body: Bytes, attributes: PutAttributes)
        -> StorageResult<String>;

    /// Delete the object at `key`
    async fn delete(&self, key: &str) -> StorageResult<()>;
}
