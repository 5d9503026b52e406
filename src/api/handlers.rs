//! Axum request handlers for the HTTP API.
use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use crate::api::routes::AppState;
use crate::error::{AppError, AppResult};
use crate::upload::{allowed_file, mime_for_filename, validate_upload, UploadedImage};

/// Serve the main page.
pub async fn index(State(state): State<Arc<AppState>>) -> AppResult<Html<String>> {
    let path = state.public_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(body) => Ok(Html(body)),
        Err(err) => {
            tracing::warn!("Frontend document missing at {}: {}", path.display(), err);
            Err(AppError::NotFound("index.html".to_string()))
        }
    }
}

/// Health check endpoint. Always succeeds; reports whether the generation
/// client is usable and how many reference images loaded.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
        "genai_initialized": state.gemini.is_some(),
        "reference_images_loaded": state.composer.reference_count(),
        "api_key_configured": state.gemini.is_some(),
    }))
}

async fn read_image_field(multipart: &mut Multipart) -> AppResult<UploadedImage> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(AppError::BadRequest("No file selected".to_string()));
        }
        // Extension check before buffering the body.
        if !allowed_file(&filename) {
            return Err(AppError::UnsupportedType(filename));
        }
        let declared = field.content_type().map(|c| c.to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file bytes: {}", e)))?
            .to_vec();
        let content_type = match declared {
            Some(ct) if ct.starts_with("image/") => ct,
            _ => mime_for_filename(&filename).to_string(),
        };
        return Ok(UploadedImage { bytes, filename, content_type });
    }
    Err(AppError::BadRequest("No image file uploaded".to_string()))
}

/// Convert an uploaded photo into a stylized avatar.
///
/// Pipeline: client presence check, validation, payload composition, one
/// upstream call, persistence. An output file is only written after a
/// successful upstream response.
pub async fn convert(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<Json<Value>> {
    let gemini = state.gemini.as_ref().ok_or(AppError::ClientNotInitialized)?;

    let image = read_image_field(&mut multipart).await?;
    validate_upload(&image.filename, image.bytes.len())?;

    tracing::info!(
        "Processing image: {}, size: {} bytes",
        image.filename,
        image.bytes.len()
    );

    let payload = state.composer.compose(&image);
    let avatar = gemini.generate_avatar(payload).await?;
    let filename = state.outputs.save(&avatar).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Image converted successfully",
        "results": [{
            "fileName": filename,
            "filePath": format!("/outputs/{}", filename),
            "mimeType": "image/png"
        }]
    })))
}

/// Serve generated images by filename.
pub async fn serve_output(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> AppResult<impl IntoResponse> {
    let bytes = state.outputs.read(&filename).await?;
    let mime = mime_for_filename(&filename);
    Ok(([(header::CONTENT_TYPE, mime)], bytes))
}
