use crate::{
    error::{PopArtError, Result},
    models::{GenerationRequest, UploadRequest, UploadResponse},
};
use async_trait::async_trait;
use reqwest::Client;

pub const GENERATE_PATH: &str = "/api/generate-image";
pub const UPLOAD_PATH: &str = "/api/upload-image";

/// The two proxy endpoints as seen from the client.
#[async_trait]
pub trait ProxyApi: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>>;

    /// Uploads base64 image data and returns the durable image URL.
    async fn upload_image(&self, image_data: &str, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct HttpProxyClient {
    http: Client,
    base_url: String,
}

impl HttpProxyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn reject(response: reqwest::Response) -> PopArtError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        PopArtError::ProxyRejected { status, body }
    }
}

#[async_trait]
impl ProxyApi for HttpProxyClient {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url, GENERATE_PATH);
        let response = self
            .http
            .post(&url)
            .json(&GenerationRequest::new(prompt))
            .send()
            .await
            .map_err(|e| PopArtError::transport(format!("Cannot reach {}", url), e))?;

        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PopArtError::transport("Reading generated image", e))?;
        Ok(bytes.to_vec())
    }

    async fn upload_image(&self, image_data: &str, prompt: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, UPLOAD_PATH);
        let response = self
            .http
            .post(&url)
            .json(&UploadRequest::new(image_data, prompt))
            .send()
            .await
            .map_err(|e| PopArtError::transport(format!("Cannot reach {}", url), e))?;

        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| PopArtError::transport("Reading upload response", e))?;
        Ok(upload.image_url)
    }
}
