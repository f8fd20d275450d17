//! Axum route handlers for the Ranking API.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::documents::{read_job_description, Upload};
use crate::errors::AppError;
use crate::ranking::aggregator::{rank_resumes, RankingRun};
use crate::ranking::export::{results_to_csv, CSV_CONTENT_TYPE, CSV_FILENAME};
use crate::ranking::scorer::{ScoreResult, MAX_SCORE};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

/// Multipart form accepted by the ranking endpoint.
#[derive(Debug, Default)]
pub struct RankingForm {
    pub jd_file: Option<Upload>,
    pub jd_text: Option<String>,
    pub resumes: Vec<Upload>,
    pub debug: bool,
}

impl RankingForm {
    pub async fn read(multipart: &mut Multipart) -> Result<Self, AppError> {
        let mut form = RankingForm::default();

        while let Some(field) = multipart.next_field().await? {
            let field_name = field.name().unwrap_or_default().to_string();
            match field_name.as_str() {
                "jd_file" | "resumes" => {
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;
                    // Browsers send an empty part for an unused file input.
                    if file_name.as_deref().unwrap_or("").is_empty() && bytes.is_empty() {
                        continue;
                    }

                    if field_name == "jd_file" {
                        let name = file_name.unwrap_or_else(|| "job_description".to_string());
                        form.jd_file = Some(Upload::new(name, content_type, bytes));
                    } else {
                        let name = file_name
                            .unwrap_or_else(|| format!("resume-{}.pdf", form.resumes.len() + 1));
                        form.resumes.push(Upload::new(name, content_type, bytes));
                    }
                }
                "jd_text" => form.jd_text = Some(field.text().await?),
                "debug" => {
                    let value = field.text().await?;
                    form.debug = matches!(value.trim(), "1" | "true" | "on" | "yes");
                }
                other => debug!("Ignoring unknown form field '{other}'"),
            }
        }

        Ok(form)
    }
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub results: Vec<ScoreResult>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/rankings
///
/// Scores the uploaded resumes against the job description and returns them
/// ranked. A file JD takes precedence over `jd_text`. Per-resume failures
/// appear as zero-score rows; only a missing or unreadable JD fails the request.
pub async fn handle_rank(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<RankingRun>, AppError> {
    let form = RankingForm::read(&mut multipart).await?;

    let jd_text = match (form.jd_file, form.jd_text) {
        (Some(file), _) => read_job_description(file).await?,
        (None, Some(text)) if !text.trim().is_empty() => text,
        _ => {
            return Err(AppError::Validation(
                "a job description file or jd_text is required".to_string(),
            ))
        }
    };

    if form.resumes.is_empty() {
        return Err(AppError::Validation(
            "at least one resume PDF is required".to_string(),
        ));
    }

    let debug = form.debug || state.config.scorer_debug;
    let run = rank_resumes(&state.scorer, &jd_text, form.resumes, debug).await;

    Ok(Json(run))
}

/// POST /api/v1/rankings/export
///
/// Returns the posted results as a downloadable CSV file, in the order given.
/// Scores must lie in 0..=100.
pub async fn handle_export(
    Json(request): Json<ExportRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(bad) = request.results.iter().find(|r| r.score > MAX_SCORE) {
        return Err(AppError::Validation(format!(
            "score for '{}' is {}, must be between 0 and {MAX_SCORE}",
            bad.name, bad.score
        )));
    }

    let csv = results_to_csv(&request.results)?;

    let headers = [
        (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{CSV_FILENAME}\""),
        ),
    ];
    Ok((headers, csv))
}
