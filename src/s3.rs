//! S3-backed object store

use crate::config::Config;
use crate::error::{StorageError, StorageResult};
use crate::store::{Lookup, ObjectDescriptor, ObjectStore, PutAttributes};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{ServerSideEncryption, StorageClass};
use aws_sdk_s3::Client;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Object store backed by a single S3 bucket
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Wrap an existing client
    pub fn new<B: Into<String>>(client: Client, bucket: B) -> Self {
        S3Store {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client from the adapter configuration
    ///
    /// Honors an optional region and custom endpoint; credential
    /// resolution follows the SDK's default provider chain. Custom
    /// endpoints use path-style addressing so S3-compatible stores
    /// without wildcard DNS work out of the box.
    pub async fn from_config<B: Into<String>>(config: &Config, bucket: B) -> Self {
        let bucket = bucket.into();
        info!("Connecting S3 store for bucket '{}'", bucket);

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        S3Store {
            client: Client::from_conf(builder.build()),
            bucket,
        }
    }

    /// Bucket this store reads and writes
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

fn to_chrono(timestamp: aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn get(&self, key: &str) -> Lookup {
        debug!("GET s3://{}/{}", self.bucket, key);

        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                let service_error = err.into_service_error();
                if service_error.is_no_such_key() {
                    return Lookup::NotFound;
                }
                return Lookup::BackendError(service_error.to_string());
            }
        };

        let last_modified = output.last_modified.and_then(to_chrono);
        let metadata = output.metadata.unwrap_or_default();

        match output.body.collect().await {
            Ok(data) => Lookup::Found(ObjectDescriptor {
                body: data.into_bytes(),
                last_modified,
                metadata,
            }),
            Err(err) => Lookup::BackendError(err.to_string()),
        }
    }

    async fn put(
        &self,
        key: &str,
        body: Bytes,
        attributes: PutAttributes,
    ) -> StorageResult<String> {
        debug!("PUT s3://{}/{} ({} bytes)", self.bucket, key, body.len());

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body));

        if !attributes.metadata.is_empty() {
            request = request.set_metadata(Some(attributes.metadata));
        }
        if attributes.reduced_redundancy {
            request = request.storage_class(StorageClass::ReducedRedundancy);
        }
        if attributes.encrypt_key {
            request = request.server_side_encryption(ServerSideEncryption::Aes256);
        }

        request
            .send()
            .await
            .map_err(|err| StorageError::Backend(err.into_service_error().to_string()))?;

        Ok(key.to_string())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        debug!("DELETE s3://{}/{}", self.bucket, key);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| StorageError::Backend(err.into_service_error().to_string()))?;

        Ok(())
    }
}
