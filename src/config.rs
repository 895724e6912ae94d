use crate::error::{PopArtError, Result};
use std::env;
use std::path::PathBuf;

pub const GENERATOR_URL_VAR: &str = "GENERATOR_WORKER_URL";
pub const GENERATOR_URL_PLACEHOLDER: &str = "YOUR_GENERATOR_WORKER_URL_HERE";
pub const DEFAULT_BLOB_STORE_URL: &str = "https://blob.vercel-storage.com";
pub const DEFAULT_PROXY_BASE_URL: &str = "http://127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BlobStoreConfig {
    pub base_url: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub proxy_base_url: String,
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub generator: GeneratorConfig,
    pub blob_store: BlobStoreConfig,
    pub client: ClientConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig { endpoint: None }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        GeneratorConfig {
            endpoint: env::var(GENERATOR_URL_VAR).ok(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Resolves the generator endpoint. Unset, blank, or placeholder values are
    /// a misconfiguration, reported when a request needs the endpoint.
    pub fn endpoint(&self) -> Result<&str> {
        match self.endpoint.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() && url != GENERATOR_URL_PLACEHOLDER => Ok(url),
            _ => Err(PopArtError::Config(format!(
                "{} is not set. Please configure it in your environment variables.",
                GENERATOR_URL_VAR
            ))),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint().is_ok()
    }
}

impl Default for BlobStoreConfig {
    fn default() -> Self {
        BlobStoreConfig {
            base_url: DEFAULT_BLOB_STORE_URL.to_string(),
            token: None,
        }
    }
}

impl BlobStoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let base_url =
            env::var("BLOB_STORE_URL").unwrap_or_else(|_| DEFAULT_BLOB_STORE_URL.to_string());
        let token = env::var("BLOB_READ_WRITE_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        BlobStoreConfig { base_url, token }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            proxy_base_url: DEFAULT_PROXY_BASE_URL.to_string(),
            data_dir: PathBuf::from(".popart"),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let proxy_base_url = env::var("PROXY_BASE_URL").unwrap_or(defaults.proxy_base_url);
        let data_dir = env::var("POPART_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        ClientConfig {
            proxy_base_url,
            data_dir,
        }
    }

    pub fn with_proxy_base_url(mut self, url: impl Into<String>) -> Self {
        self.proxy_base_url = url.into();
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: None,
            port: None,
            generator: GeneratorConfig::default(),
            blob_store: BlobStoreConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let host = env::var("HOST").ok();
        let port = env::var("PORT").ok().and_then(|port| port.parse().ok());

        Config {
            host,
            port,
            generator: GeneratorConfig::from_env(),
            blob_store: BlobStoreConfig::from_env(),
            client: ClientConfig::from_env(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_generator(mut self, config: GeneratorConfig) -> Self {
        self.generator = config;
        self
    }

    pub fn with_blob_store(mut self, config: BlobStoreConfig) -> Self {
        self.blob_store = config;
        self
    }

    pub fn with_client(mut self, config: ClientConfig) -> Self {
        self.client = config;
        self
    }

    pub fn bind_host(&self) -> &str {
        self.host.as_deref().unwrap_or("127.0.0.1")
    }

    pub fn bind_port(&self) -> u16 {
        self.port.unwrap_or(3000)
    }
}
