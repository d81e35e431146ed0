use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tokio::task::JoinError;
use tracing::{debug, info_span};
use uuid::Uuid;

use crate::errors::{AppError, RenderError};
use crate::layout::FontFamily;
use crate::models::resume::ResumeDocument;
use crate::render::canvas::Color;
use crate::render::{render_resume, PdfCanvas, ThemePreset};
use crate::state::AppState;

/// Parsed multipart submission: the document plus an optional template choice.
#[derive(Debug, Default)]
pub struct RenderForm {
    pub document: ResumeDocument,
    pub preset: Option<ThemePreset>,
}

#[derive(Serialize)]
pub struct ThemeSummary {
    pub name: &'static str,
    pub primary_color: Color,
    pub background_color: Color,
    pub text_color: Color,
    pub font_family: FontFamily,
    pub default: bool,
}

#[derive(Serialize)]
pub struct ThemeListResponse {
    pub themes: Vec<ThemeSummary>,
}

/// POST /api/v1/resumes/render
/// Multipart form in, PDF attachment out.
pub async fn handle_render(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_form(&mut multipart, state.config.max_upload_bytes).await?;

    let theme = state.theme(form.preset);
    let flow = Arc::clone(&state.text_flow);
    let photo_size_px = state.config.photo_size_px;
    let timeout_secs = state.config.render_timeout_secs;
    let render_id = Uuid::new_v4();
    let span = info_span!("render", %render_id, template = theme.preset.as_str());
    let doc = form.document;

    // Layout, image resampling and compression are CPU-bound: keep them off the executor.
    let task = tokio::task::spawn_blocking(move || {
        let _guard = span.enter();
        let title = match doc.name.trim() {
            "" => "Resume".to_string(),
            name => format!("{name} - Resume"),
        };
        let canvas = PdfCanvas::new(theme.page).with_title(title);
        render_resume(&doc, &theme, flow.as_ref(), photo_size_px, canvas)
    });

    let rendered = await_render(task, timeout_secs).await?;

    let disposition = format!("attachment; filename=\"{}\"", rendered.filename);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (
                header::HeaderName::from_static("x-page-count"),
                rendered.page_count.to_string(),
            ),
        ],
        rendered.bytes,
    )
        .into_response())
}

/// Waits for a render task under the deadline. An expired deadline is an error; whatever the
/// task produces afterwards is discarded.
pub async fn await_render<T>(
    task: impl Future<Output = Result<Result<T, RenderError>, JoinError>>,
    timeout_secs: u64,
) -> Result<T, AppError> {
    match tokio::time::timeout(Duration::from_secs(timeout_secs), task).await {
        Ok(joined) => Ok(joined.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in render: {e}"))
        })??),
        Err(_) => Err(AppError::RenderTimeout(timeout_secs)),
    }
}

/// GET /api/v1/themes
pub async fn handle_list_themes(State(state): State<AppState>) -> Json<ThemeListResponse> {
    let themes = ThemePreset::ALL
        .into_iter()
        .map(|preset| {
            let theme = state.theme(Some(preset));
            ThemeSummary {
                name: preset.as_str(),
                primary_color: theme.primary_color,
                background_color: theme.background_color,
                text_color: theme.text_color,
                font_family: theme.font_family,
                default: preset == state.config.default_preset,
            }
        })
        .collect();
    Json(ThemeListResponse { themes })
}

/// Reads every field of the submission. Text fields map onto `ResumeDocument`; the `photo`
/// file field is kept as raw bytes, an empty upload counting as no photo.
pub async fn read_form(multipart: &mut Multipart, limit: usize) -> Result<RenderForm, AppError> {
    let mut form = RenderForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "photo" {
            let data = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
            form.document.photo = (!data.is_empty()).then_some(data);
            continue;
        }

        let value = field.text().await.map_err(|e| multipart_error(e, limit))?;
        let doc = &mut form.document;
        match name.as_str() {
            "name" => doc.name = value,
            "title" => doc.title = value,
            "profile" => doc.profile_text = value,
            "phone" => doc.phone = value,
            "email" => doc.email = value,
            "address" => doc.address = value,
            "skills" => doc.skills = value,
            "languages" => doc.languages = value,
            "hobbies" => doc.hobbies = value,
            "experiences" => doc.experiences = value,
            "education" => doc.education = value,
            "template" => form.preset = parse_template(&value)?,
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

fn parse_template(value: &str) -> Result<Option<ThemePreset>, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    ThemePreset::parse(value).map(Some).ok_or_else(|| {
        let known: Vec<&str> = ThemePreset::ALL.iter().map(|p| p.as_str()).collect();
        AppError::Validation(format!(
            "Unknown template '{value}', expected one of: {}",
            known.join(", ")
        ))
    })
}

fn multipart_error(e: MultipartError, limit: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::UploadTooLarge(limit)
    } else {
        AppError::Validation(format!("Malformed form submission: {}", e.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CanvasError;

    #[test]
    fn test_parse_template() {
        assert_eq!(parse_template("").unwrap(), None);
        assert_eq!(parse_template(" crimson ").unwrap(), Some(ThemePreset::Crimson));
        match parse_template("neon") {
            Err(AppError::Validation(msg)) => {
                assert!(msg.contains("neon"), "message should name the template: {msg}");
                assert!(msg.contains("slate"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_past_deadline_times_out() {
        let task = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(120)).await;
            Ok::<_, RenderError>("late")
        });
        match await_render(task, 30).await {
            Err(AppError::RenderTimeout(secs)) => assert_eq!(secs, 30),
            other => panic!("expected render timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_within_deadline_returns_output() {
        let task = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, RenderError>("done")
        });
        assert_eq!(await_render(task, 30).await.unwrap(), "done");
    }

    #[tokio::test]
    async fn test_render_error_passes_through() {
        let task = tokio::spawn(async {
            Err::<(), _>(RenderError::Canvas(CanvasError::InvalidGeometry { op: "fill_rect" }))
        });
        assert!(
            matches!(await_render(task, 30).await, Err(AppError::Render(_))),
            "render failures should map to AppError::Render"
        );
    }

    #[tokio::test]
    async fn test_panicking_render_is_internal_error() {
        let task = tokio::task::spawn_blocking(|| -> Result<(), RenderError> {
            panic!("layout bug");
        });
        assert!(
            matches!(await_render(task, 30).await, Err(AppError::Internal(_))),
            "a panicked task should surface as an internal error"
        );
    }
}
