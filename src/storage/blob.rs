use crate::{
    config::BlobStoreConfig,
    error::{PopArtError, Result},
    models::{PutOptions, StoredObject},
    storage::traits::ObjectStore,
};
use async_trait::async_trait;
use reqwest::Client;

/// Blob store reached over its HTTP API: `PUT <base>/<key>` with the raw
/// bytes as body, answered with JSON describing the stored object.
pub struct BlobStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl BlobStore {
    pub fn new(config: BlobStoreConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
        }
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn build_headers(&self, token: &str, options: &PutOptions) -> Result<reqwest::header::HeaderMap> {
        let mut headers = reqwest::header::HeaderMap::new();
        let pairs = [
            (reqwest::header::AUTHORIZATION.as_str(), format!("Bearer {}", token)),
            ("x-content-type", options.content_type.clone()),
            ("x-access", options.access.as_str().to_string()),
            (
                "x-add-random-suffix",
                if options.add_random_suffix { "1" } else { "0" }.to_string(),
            ),
        ];
        for (name, value) in pairs {
            let name = reqwest::header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| PopArtError::UpstreamUpload(e.to_string()))?;
            let value = value
                .parse()
                .map_err(|_| PopArtError::UpstreamUpload(format!("invalid header value for {}", name)))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl ObjectStore for BlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, options: &PutOptions) -> Result<StoredObject> {
        let token = self.token.as_deref().ok_or_else(|| {
            PopArtError::UpstreamUpload("BLOB_READ_WRITE_TOKEN is not set".into())
        })?;

        let response = self
            .client
            .put(format!("{}/{}", self.base_url, key))
            .headers(self.build_headers(token, options)?)
            .body(bytes)
            .send()
            .await
            .map_err(|e| PopArtError::UpstreamUpload(format!("Blob store request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PopArtError::UpstreamUpload(format!(
                "Blob store returned HTTP {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let object: StoredObject = response
            .json()
            .await
            .map_err(|e| PopArtError::UpstreamUpload(format!("Unreadable blob store response: {}", e)))?;

        if object.url.trim().is_empty() {
            return Err(PopArtError::UpstreamUpload(
                "Blob store response carried no URL".into(),
            ));
        }

        Ok(object)
    }
}
