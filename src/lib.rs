//! # Aperture S3 - Object Storage Adapter for Image Processing
//!
//! `aperture-s3` persists and retrieves image-processing artifacts
//! (original images, processed results, crypto-signature sidecars, and
//! detector metadata) in any S3-compatible object store, on behalf of
//! the Aperture image service:
//!
//! - **Key derivation**: deterministic mapping from logical request
//!   paths to physical storage keys, with root prefixing, WebP variant
//!   segmentation, and content-addressed key randomization
//! - **Expiry policy**: TTL decisions against the store's
//!   last-modified timestamps
//! - **Sidecar naming**: companion keys for security-key and detector
//!   metadata artifacts
//! - **Storage facade**: an async CRUD surface that applies write
//!   policy (metadata capture, redundancy, encryption) and degrades
//!   missing, errored, or stale objects to "absent" on reads
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aperture_s3::{Config, ImageStorage, MemoryStore, RequestContext, StorageRole};
//! use bytes::Bytes;
//!
//! # tokio_test::block_on(async {
//! let mut config = Config::default();
//! config.result_storage.root_path = Some("prod".to_string());
//!
//! let storage = ImageStorage::new(MemoryStore::new(), config, StorageRole::ResultStorage);
//! let context = RequestContext::for_path("/images/cat.jpg");
//!
//! // prod/images/cat.jpg
//! let key = storage.normalize_path(&context, &context.path);
//!
//! storage.set(&context, Bytes::from_static(b"..."), &key).await;
//! assert!(storage.exists(&context, "/images/cat.jpg").await);
//! # });
//! ```
//!
//! ## Against a real bucket
//!
//! ```rust,no_run
//! use aperture_s3::{Config, ImageStorage, S3Store, StorageRole};
//!
//! # tokio_test::block_on(async {
//! let config = Config::from_env();
//! let store = S3Store::from_config(&config, config.loader.bucket.clone()).await;
//! let storage = ImageStorage::new(store, config, StorageRole::Loader);
//! # });
//! ```

mod config;
mod context;
mod error;
mod expiry;
mod keys;
mod mem;
mod s3;
mod storage;
mod store;

pub use config::{Config, RoleConfig, StoragePolicy, StorageRole};
pub use context::RequestContext;
pub use error::{StorageError, StorageResult};
pub use expiry::is_expired;
pub use keys::{derive_key, sidecar_key, SidecarKind};
pub use mem::MemoryStore;
pub use s3::S3Store;
pub use storage::ImageStorage;
pub use store::{Lookup, ObjectDescriptor, ObjectStore, PutAttributes};
