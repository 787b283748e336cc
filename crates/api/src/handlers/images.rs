//! Handler for the `/images` resource: product photo uploads.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Uploads above this size are rejected before hitting storage.
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// POST /api/v1/images
///
/// Multipart upload of one product photo; returns its public URL.
/// Accepts the file under either an `image` or `file` field.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default();
        if name != "image" && name != "file" {
            continue;
        }

        let filename = field.file_name().unwrap_or("photo.jpg").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;

        if bytes.is_empty() {
            return Err(AppError::BadRequest("uploaded image is empty".into()));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(AppError::BadRequest(format!(
                "image exceeds the {MAX_IMAGE_BYTES} byte limit"
            )));
        }

        let url = state
            .providers
            .object_store
            .upload(bytes.to_vec(), &filename, &mime_type)
            .await?;

        return Ok(Json(UploadResponse { url }));
    }

    Err(AppError::BadRequest(
        "multipart body must contain an 'image' field".into(),
    ))
}

/// Pull the image bytes + mime type out of a multipart body. Shared by
/// the analysis endpoints, which take the same upload shape.
pub async fn read_image_field(multipart: &mut Multipart) -> Result<(Vec<u8>, String), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default();
        if name != "image" && name != "file" {
            continue;
        }

        let mime_type = field.content_type().unwrap_or("image/jpeg").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;

        if bytes.is_empty() {
            return Err(AppError::BadRequest("uploaded image is empty".into()));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(AppError::BadRequest(format!(
                "image exceeds the {MAX_IMAGE_BYTES} byte limit"
            )));
        }

        return Ok((bytes.to_vec(), mime_type));
    }

    Err(AppError::BadRequest(
        "multipart body must contain an 'image' field".into(),
    ))
}
