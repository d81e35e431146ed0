use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures of the drawing surface. Any of these ends the render.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("Non-finite geometry in {op}")]
    InvalidGeometry { op: &'static str },

    #[error("Image data does not match its dimensions ({width}x{height})")]
    ImageData { width: u32, height: u32 },

    #[error("Output sink failed: {0}")]
    Sink(#[from] std::io::Error),
}

/// The only error a render can return. Missing fields and bad photos never get here.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Canvas error: {0}")]
    Canvas(#[from] CanvasError),
}

/// Photo processing failures. Consumed inside `render::photo`, which falls back to the
/// placeholder asset.
#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("No photo supplied")]
    Missing,

    #[error("Photo could not be decoded: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Requested portrait size is zero")]
    ZeroSize,

    #[error("Photo has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Asset could not be encoded: {0}")]
    Encode(String),
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upload exceeds the {0} byte limit")]
    UploadTooLarge(usize),

    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    #[error("Render did not finish within {0}s")]
    RenderTimeout(u64),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UploadTooLarge(limit) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                format!("Request body exceeds {limit} bytes"),
            ),
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "The document could not be rendered".to_string(),
                )
            }
            AppError::RenderTimeout(secs) => {
                tracing::warn!(timeout_secs = secs, "Render timed out");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "RENDER_TIMEOUT",
                    format!("Rendering took longer than {secs}s"),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn envelope(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_render_timeout_response() {
        let (status, body) = envelope(AppError::RenderTimeout(30)).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"]["code"], "RENDER_TIMEOUT");
        assert_eq!(body["error"]["message"], "Rendering took longer than 30s");
    }

    #[tokio::test]
    async fn test_render_error_hides_details() {
        let error = AppError::Render(RenderError::Canvas(CanvasError::ImageData {
            width: 4,
            height: 4,
        }));
        let (status, body) = envelope(error).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "RENDER_ERROR");
        let message = body["error"]["message"].as_str().unwrap_or_default();
        assert!(!message.contains("4x4"), "canvas details must not leak: {message}");
    }

    #[tokio::test]
    async fn test_upload_too_large_response() {
        let (status, body) = envelope(AppError::UploadTooLarge(1024)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
        assert_eq!(body["error"]["message"], "Request body exceeds 1024 bytes");
    }
}
