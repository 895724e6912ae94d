pub mod client;
pub mod config;
pub mod error;
pub mod generator;
pub mod history;
pub mod logger;
pub mod models;
#[cfg(feature = "server")]
pub mod server;
pub mod storage;

pub use client::{HttpProxyClient, Orchestrator, ProxyApi, SubmitError};
pub use config::{BlobStoreConfig, ClientConfig, Config, GeneratorConfig};
pub use error::{PopArtError, Result};
pub use generator::{ImageGenerator, WorkerGenerator};
pub use history::{FileStorage, HistoryStore, LocalHistoryStore, MemoryStorage};
pub use models::*;
pub use storage::{BlobStore, ImageUploader, ObjectStore};
