use crate::{
    config::GeneratorConfig,
    error::{PopArtError, Result},
    generator::ImageGenerator,
    models::GeneratorPayload,
};
use async_trait::async_trait;
use reqwest::Client;

/// Talks to an HTTP worker that runs the diffusion model and answers with
/// the image bytes as the response body.
#[derive(Clone)]
pub struct WorkerGenerator {
    client: Client,
    config: GeneratorConfig,
}

impl WorkerGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl ImageGenerator for WorkerGenerator {
    fn ensure_configured(&self) -> Result<()> {
        self.config.endpoint().map(|_| ())
    }

    async fn generate(&self, payload: &GeneratorPayload) -> Result<Vec<u8>> {
        let endpoint = self.config.endpoint()?;

        log::debug!("Forwarding prompt to generator (seed {})", payload.seed);

        let response = self
            .client
            .post(endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| PopArtError::GeneratorUnreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Generator error: {} - {}", status.as_u16(), body);
            return Err(PopArtError::UpstreamGeneration {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PopArtError::GeneratorUnreachable(e.to_string()))?;

        if bytes.is_empty() {
            return Err(PopArtError::UpstreamGeneration {
                status: status.as_u16(),
                body: "empty image payload".to_string(),
            });
        }

        log::info!("Generator returned {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}
