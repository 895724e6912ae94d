use crate::{
    error::Result,
    models::{PutOptions, StoredObject},
};
use async_trait::async_trait;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes `bytes` under `key` and returns the object's public location.
    async fn put(&self, key: &str, bytes: Vec<u8>, options: &PutOptions) -> Result<StoredObject>;
}
