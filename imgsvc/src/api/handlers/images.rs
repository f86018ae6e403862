use crate::AppState;
use crate::api::models::images::{ImageHistoryItem, UploadResponse};
use crate::api::models::pagination::HistoryQuery;
use crate::errors::{Error, Result};
use crate::upload::UploadedFile;
use axum::{
    Json,
    extract::{Multipart, Path, Query, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// Multipart field carrying the image
pub const FILE_FIELD: &str = "file";

fn multipart_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge {
            message: "Uploaded file exceeds the maximum allowed size".to_string(),
        }
    } else {
        Error::BadRequest {
            message: format!("Failed to parse multipart data: {}", e.body_text()),
        }
    }
}

/// Pull the `file` part out of a multipart body, ignoring any other fields.
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<UploadedFile>> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            tracing::debug!(field = ?field.name(), "Ignoring multipart field");
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_owned);
        let content = field.bytes().await.map_err(multipart_error)?;

        upload = Some(UploadedFile::new(content, filename, content_type));
    }

    Ok(upload)
}

#[utoipa::path(
    post,
    path = "/images",
    tag = "images",
    summary = "Upload image",
    description = "Store an image, run every analysis task over it and record the results.",
    request_body(
        content_type = "multipart/form-data",
        description = "Form with a single `file` part holding the image"
    ),
    responses(
        (status = 201, description = "Image stored and analysed", body = UploadResponse),
        (status = 400, description = "No file, or a file type that is not allowed"),
        (status = 413, description = "Payload too large"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn upload_image(State(state): State<AppState>, mut multipart: Multipart) -> Result<(StatusCode, Json<UploadResponse>)> {
    let upload = read_file_field(&mut multipart).await?;

    let response = state.pipeline.post_image(upload).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/images",
    tag = "images",
    summary = "List upload history",
    description = "Returns processed uploads, newest first.",
    params(HistoryQuery),
    responses(
        (status = 200, description = "One page of upload history", body = Vec<ImageHistoryItem>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_images(State(state): State<AppState>, Query(query): Query<HistoryQuery>) -> Result<Json<Vec<ImageHistoryItem>>> {
    let history = state.pipeline.get_history(query.page, query.count).await?;
    Ok(Json(history))
}

#[utoipa::path(
    get,
    path = "/images/view/{name}",
    tag = "images",
    summary = "View image",
    description = "Returns the stored image bytes with their content type.",
    params(
        ("name" = String, Path, description = "Name returned by the upload endpoint")
    ),
    responses(
        (status = 200, description = "Raw image bytes", content_type = "application/octet-stream"),
        (status = 404, description = "No image stored under this name")
    )
)]
pub async fn view_image(State(state): State<AppState>, Path(name): Path<String>) -> Result<Response> {
    let stored = state.pipeline.view_image(&name).await?;

    Ok(([(header::CONTENT_TYPE, stored.content_type)], stored.content).into_response())
}
