use crate::{
    client::api::ProxyApi,
    error::PopArtError,
    history::HistoryStore,
    logger,
    models::GeneratedImage,
};
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub const FAILURE_ALERT: &str = "Failed to generate or upload image. Please try again!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Generating,
    Encoding,
    Uploading,
}

impl PipelineState {
    pub fn is_busy(&self) -> bool {
        !matches!(self, PipelineState::Idle)
    }
}

/// The pipeline stage a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Generating,
    Encoding,
    Uploading,
}

impl Stage {
    fn state(self) -> PipelineState {
        match self {
            Stage::Generating => PipelineState::Generating,
            Stage::Encoding => PipelineState::Encoding,
            Stage::Uploading => PipelineState::Uploading,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Generating => "generate",
            Stage::Encoding => "encode",
            Stage::Uploading => "upload",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: PopArtError,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("prompt is empty")]
    EmptyPrompt,

    #[error("a generation is already in flight")]
    InFlight,

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Where user-facing failure notices go.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, message: &str) {
        log::warn!("🔔 {}", message);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Holds the non-idle state for one run and puts it back to `Idle` when
/// dropped, whichever way the run ended.
struct InFlight<'a> {
    state: &'a Mutex<PipelineState>,
}

impl<'a> InFlight<'a> {
    fn enter(&self, stage: Stage) {
        *lock(self.state) = stage.state();
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *lock(self.state) = PipelineState::Idle;
    }
}

/// Client-side state container: prompt input, in-flight state, current
/// result and history, driving generate → encode → upload → record.
pub struct Orchestrator {
    api: Arc<dyn ProxyApi>,
    history: Mutex<Box<dyn HistoryStore>>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<PipelineState>,
    prompt: Mutex<String>,
    current: Mutex<Option<GeneratedImage>>,
}

impl Orchestrator {
    pub fn new(api: Arc<dyn ProxyApi>, history: Box<dyn HistoryStore>) -> Self {
        Self {
            api,
            history: Mutex::new(history),
            notifier: Arc::new(LogNotifier),
            state: Mutex::new(PipelineState::Idle),
            prompt: Mutex::new(String::new()),
            current: Mutex::new(None),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn state(&self) -> PipelineState {
        *lock(&self.state)
    }

    /// Whether the submit action is currently enabled.
    pub fn can_submit(&self) -> bool {
        !self.state().is_busy() && !lock(&self.prompt).trim().is_empty()
    }

    pub fn prompt(&self) -> String {
        lock(&self.prompt).clone()
    }

    pub fn set_prompt(&self, prompt: impl Into<String>) {
        *lock(&self.prompt) = prompt.into();
    }

    pub fn current_result(&self) -> Option<GeneratedImage> {
        lock(&self.current).clone()
    }

    pub fn history(&self) -> Vec<GeneratedImage> {
        lock(&self.history).entries().to_vec()
    }

    pub fn find(&self, id: &str) -> Option<GeneratedImage> {
        lock(&self.history)
            .entries()
            .iter()
            .find(|image| image.id == id)
            .cloned()
    }

    pub fn clear_history(&self) -> crate::error::Result<()> {
        lock(&self.history).clear()
    }

    fn begin(&self) -> Result<InFlight<'_>, SubmitError> {
        let mut state = lock(&self.state);
        if state.is_busy() {
            return Err(SubmitError::InFlight);
        }
        *state = PipelineState::Generating;
        Ok(InFlight { state: &self.state })
    }

    /// Runs one pipeline for the current prompt. Blank prompts and
    /// submissions made while a run is in flight are ignored without any
    /// network traffic.
    pub async fn submit(&self) -> Result<GeneratedImage, SubmitError> {
        let prompt = self.prompt();
        if prompt.trim().is_empty() {
            return Err(SubmitError::EmptyPrompt);
        }
        let flight = self.begin()?;

        match self.run(&flight, &prompt).await {
            Ok(image_url) => {
                let image = GeneratedImage::at(self.next_timestamp(), prompt, image_url);
                self.record(image.clone());
                Ok(image)
            }
            Err(err) => {
                log::error!("❌ Pipeline failed at {} stage: {}", err.stage, err.source);
                self.notifier.alert(FAILURE_ALERT);
                Err(err.into())
            }
        }
    }

    async fn run(&self, flight: &InFlight<'_>, prompt: &str) -> Result<String, PipelineError> {
        let _run = logger::timer("pipeline");

        flight.enter(Stage::Generating);
        let bytes = {
            let _t = logger::timer("generate");
            self.api
                .generate_image(prompt)
                .await
                .map_err(|source| PipelineError {
                    stage: Stage::Generating,
                    source,
                })?
        };

        flight.enter(Stage::Encoding);
        let encoded = encode_image(bytes).await.map_err(|source| PipelineError {
            stage: Stage::Encoding,
            source,
        })?;

        flight.enter(Stage::Uploading);
        let _t = logger::timer("upload");
        self.api
            .upload_image(&encoded, prompt)
            .await
            .map_err(|source| PipelineError {
                stage: Stage::Uploading,
                source,
            })
    }

    /// Current time in millis, nudged past the newest entry so ids stay unique.
    fn next_timestamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        match lock(&self.history).entries().first() {
            Some(newest) if newest.timestamp >= now => newest.timestamp + 1,
            _ => now,
        }
    }

    fn record(&self, image: GeneratedImage) {
        log::info!("✅ Generated {} for {:?}", image.image_url, image.prompt);
        *lock(&self.current) = Some(image.clone());
        if let Err(e) = lock(&self.history).append(image) {
            log::warn!("Could not persist history: {}", e);
        }
        lock(&self.prompt).clear();
    }
}

/// Base64-encodes the image off the async executor.
async fn encode_image(bytes: Vec<u8>) -> crate::error::Result<String> {
    if bytes.is_empty() {
        return Err(PopArtError::Encoding(
            "Failed to convert image to base64: empty payload".into(),
        ));
    }
    tokio::task::spawn_blocking(move || general_purpose::STANDARD.encode(bytes))
        .await
        .map_err(|e| PopArtError::Encoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_encode_rejects_empty_payload() {
        let err = encode_image(Vec::new()).await.unwrap_err();
        assert!(matches!(err, PopArtError::Encoding(_)));
    }

    #[tokio::test]
    async fn test_encode_standard_base64() {
        assert_eq!(encode_image(b"PNG".to_vec()).await.unwrap(), "UE5H");
    }

    #[test]
    fn test_in_flight_guard_resets_state() {
        let state = Mutex::new(PipelineState::Generating);
        {
            let flight = InFlight { state: &state };
            flight.enter(Stage::Uploading);
            assert_eq!(*lock(&state), PipelineState::Uploading);
        }
        assert_eq!(*lock(&state), PipelineState::Idle);
    }
}
