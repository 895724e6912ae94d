use crate::{
    error::{PopArtError, Result},
    generator::build_payload,
    models::{GenerationRequest, UploadRequest, UploadResponse},
    server::AppState,
};
use actix_web::{http::header, web, HttpResponse};
use serde::de::DeserializeOwned;

/// Unparseable bodies are treated like bodies missing every field.
fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap_or_else(|e| {
        log::warn!("Unreadable request body: {}", e);
        T::default()
    })
}

/// POST /api/generate-image
///
/// Forwards the styled prompt to the image generator and relays the raw
/// bytes. The generator endpoint is checked before the body.
pub async fn generate_image(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    log::info!("generate-image request received");

    if let Err(e) = state.generator.ensure_configured() {
        log::error!("Generator not configured: {}", e);
        return Err(e);
    }

    let request: GenerationRequest = parse_body(&body);
    let prompt = request
        .prompt()
        .ok_or_else(|| PopArtError::ClientInput("Prompt is required".into()))?;

    let payload = build_payload(prompt);
    let bytes = state.generator.generate(&payload).await.map_err(|e| {
        log::error!("Error in generate-image: {}", e);
        e
    })?;

    Ok(HttpResponse::Ok()
        .content_type("image/png")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .body(bytes))
}

/// POST /api/upload-image
///
/// Decodes base64 image data, stores it publicly, and answers with its URL.
pub async fn upload_image(state: web::Data<AppState>, body: web::Bytes) -> Result<HttpResponse> {
    log::info!("upload-image request received");

    let request: UploadRequest = parse_body(&body);
    let image_data = request
        .image_data()
        .ok_or_else(|| PopArtError::ClientInput("Image data is required".into()))?;

    let image_url = state
        .uploader
        .upload(image_data, request.prompt.as_deref())
        .await
        .map_err(|e| {
            log::error!("Error in upload-image: {}", e);
            match e {
                PopArtError::UpstreamUpload(_) => e,
                other => PopArtError::UpstreamUpload(other.to_string()),
            }
        })?;

    Ok(HttpResponse::Ok().json(UploadResponse { image_url }))
}
