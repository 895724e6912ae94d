#![cfg(feature = "server")]

use actix_web::{http::header, test, web, App};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use popart::{
    generator::{ImageGenerator, NEGATIVE_PROMPT, STYLE_SUFFIX},
    models::{GeneratorPayload, PutOptions, StoredObject},
    server::{configure, AppState},
    storage::ObjectStore,
    GeneratorConfig, PopArtError, WorkerGenerator,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-image";

// --- Mocks ---

struct RecordingGenerator {
    payloads: Mutex<Vec<GeneratorPayload>>,
    failure: Option<(u16, String)>,
}

impl RecordingGenerator {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            payloads: Mutex::new(Vec::new()),
            failure: None,
        })
    }

    fn failing(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            payloads: Mutex::new(Vec::new()),
            failure: Some((status, body.to_string())),
        })
    }

    fn calls(&self) -> usize {
        self.payloads.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageGenerator for RecordingGenerator {
    async fn generate(&self, payload: &GeneratorPayload) -> popart::Result<Vec<u8>> {
        self.payloads.lock().unwrap().push(payload.clone());
        match &self.failure {
            Some((status, body)) => Err(PopArtError::UpstreamGeneration {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(PNG_BYTES.to_vec()),
        }
    }
}

struct RecordingStore {
    puts: Mutex<Vec<(String, Vec<u8>, PutOptions)>>,
    fail: bool,
}

impl RecordingStore {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            puts: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            puts: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    fn calls(&self) -> usize {
        self.puts.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, options: &PutOptions) -> popart::Result<StoredObject> {
        self.puts
            .lock()
            .unwrap()
            .push((key.to_string(), bytes, options.clone()));
        if self.fail {
            return Err(PopArtError::Storage("bucket is on fire".into()));
        }
        Ok(StoredObject {
            url: format!("https://store.example/{}", key),
            pathname: Some(key.to_string()),
            content_type: Some(options.content_type.clone()),
        })
    }
}

macro_rules! app {
    ($generator:expr, $store:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new($generator, $store)))
                .configure(configure),
        )
        .await
    };
}

// --- Generation proxy ---

#[actix_web::test]
async fn test_generate_returns_png_bytes_uncached() {
    let generator = RecordingGenerator::ok();
    let app = app!(generator.clone(), RecordingStore::ok());

    let req = test::TestRequest::post()
        .uri("/api/generate-image")
        .set_json(json!({ "prompt": "a funky cat" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
    assert_eq!(resp.headers().get(header::CACHE_CONTROL).unwrap(), "no-cache");
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], PNG_BYTES);

    let payloads = generator.payloads.lock().unwrap();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].prompt, format!("a funky cat, {}", STYLE_SUFFIX));
    assert_eq!(payloads[0].negative_prompt, NEGATIVE_PROMPT);
}

#[actix_web::test]
async fn test_generate_missing_prompt_is_400() {
    let generator = RecordingGenerator::ok();
    let app = app!(generator.clone(), RecordingStore::ok());

    for body in [json!({}), json!({ "prompt": "" }), json!({ "prompt": "   " })] {
        let req = test::TestRequest::post()
            .uri("/api/generate-image")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Prompt is required" }));
    }
    assert_eq!(generator.calls(), 0);
}

#[actix_web::test]
async fn test_generate_unparseable_body_is_400() {
    let generator = RecordingGenerator::ok();
    let app = app!(generator.clone(), RecordingStore::ok());

    let req = test::TestRequest::post()
        .uri("/api/generate-image")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    assert_eq!(generator.calls(), 0);
}

#[actix_web::test]
async fn test_generate_without_endpoint_is_500_config_error() {
    let store = RecordingStore::ok();
    let generator = Arc::new(WorkerGenerator::new(GeneratorConfig::new()));
    let app = app!(generator, store.clone());

    // configuration is checked before the body, so even a bad body gets the 500
    for body in [json!({ "prompt": "a funky cat" }), json!({})] {
        let req = test::TestRequest::post()
            .uri("/api/generate-image")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 500);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("GENERATOR_WORKER_URL"));
    }
    assert_eq!(store.calls(), 0);
}

#[actix_web::test]
async fn test_generate_upstream_failure_is_500() {
    let generator = RecordingGenerator::failing(503, "model overloaded");
    let app = app!(generator.clone(), RecordingStore::ok());

    let req = test::TestRequest::post()
        .uri("/api/generate-image")
        .set_json(json!({ "prompt": "a funky cat" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Failed to generate image" }));
}

#[actix_web::test]
async fn test_identical_prompts_get_fresh_seeds() {
    let generator = RecordingGenerator::ok();
    let app = app!(generator.clone(), RecordingStore::ok());

    for _ in 0..8 {
        let req = test::TestRequest::post()
            .uri("/api/generate-image")
            .set_json(json!({ "prompt": "robot" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);
    }

    let payloads = generator.payloads.lock().unwrap();
    let first = payloads[0].seed;
    assert!(payloads.iter().any(|p| p.seed != first));
}

// --- Upload proxy ---

#[actix_web::test]
async fn test_upload_stores_public_jpeg_and_returns_url() {
    let store = RecordingStore::ok();
    let app = app!(RecordingGenerator::ok(), store.clone());

    let req = test::TestRequest::post()
        .uri("/api/upload-image")
        .set_json(json!({
            "imageData": general_purpose::STANDARD.encode(PNG_BYTES),
            "prompt": "a funky cat",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;

    let puts = store.puts.lock().unwrap();
    assert_eq!(puts.len(), 1);
    let (key, bytes, options) = &puts[0];
    assert!(key.starts_with("pop-art-images/"));
    assert!(key.ends_with(".jpeg"));
    assert_eq!(bytes.as_slice(), PNG_BYTES);
    assert_eq!(options, &PutOptions::public("image/jpeg"));
    assert!(!options.add_random_suffix);
    assert_eq!(body["imageUrl"], format!("https://store.example/{}", key));
}

#[actix_web::test]
async fn test_upload_prompt_is_optional() {
    let store = RecordingStore::ok();
    let app = app!(RecordingGenerator::ok(), store.clone());

    let req = test::TestRequest::post()
        .uri("/api/upload-image")
        .set_json(json!({ "imageData": general_purpose::STANDARD.encode(PNG_BYTES) }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);
    assert_eq!(store.calls(), 1);
}

#[actix_web::test]
async fn test_upload_missing_image_data_is_400() {
    let store = RecordingStore::ok();
    let app = app!(RecordingGenerator::ok(), store.clone());

    let req = test::TestRequest::post()
        .uri("/api/upload-image")
        .set_json(json!({ "prompt": "a funky cat" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Image data is required" }));
    assert_eq!(store.calls(), 0);
}

#[actix_web::test]
async fn test_upload_undecodable_data_is_500_without_store_call() {
    let store = RecordingStore::ok();
    let app = app!(RecordingGenerator::ok(), store.clone());

    let req = test::TestRequest::post()
        .uri("/api/upload-image")
        .set_json(json!({ "imageData": "%%% definitely not base64 %%%" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Failed to upload image" }));
    assert_eq!(store.calls(), 0);
}

#[actix_web::test]
async fn test_upload_store_failure_is_500() {
    let app = app!(RecordingGenerator::ok(), RecordingStore::failing());

    let req = test::TestRequest::post()
        .uri("/api/upload-image")
        .set_json(json!({ "imageData": general_purpose::STANDARD.encode(PNG_BYTES) }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Failed to upload image" }));
}

#[actix_web::test]
async fn test_upload_accepts_large_payloads() {
    let store = RecordingStore::ok();
    let app = app!(RecordingGenerator::ok(), store.clone());

    let big = vec![7u8; 2 * 1024 * 1024];
    let req = test::TestRequest::post()
        .uri("/api/upload-image")
        .set_json(json!({ "imageData": general_purpose::STANDARD.encode(&big) }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);
    assert_eq!(store.puts.lock().unwrap()[0].1.len(), big.len());
}
