//! Policy comparison route.
//!
//! POST /api/analyze accepts multipart `files` (2+ documents) and an
//! optional JSON `preferences` field, and answers with
//! `{"aiCommentary", "tableHtml"}` or `{"error"}`.

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{debug, info, info_span, warn, Instrument};

use policysage_core::{
    ComparisonResult, Error, NormalizedFragment, Result, ServiceConfig, UserPreferences,
};
use policysage_ingest::{ensure_documents, label_fragments, Normalizer, UploadedDocument};

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/analyze",
        post(analyze)
            .options(preflight)
            .fallback(method_not_allowed),
    )
}

/// OPTIONS /api/analyze: empty 200.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

/// POST /api/analyze
async fn analyze(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> std::result::Result<Json<ComparisonResult>, ApiError> {
    let request_id = uuid::Uuid::new_v4();
    run_analysis(&state, multipart)
        .instrument(info_span!("analyze", %request_id))
        .await
        .map(Json)
        .map_err(|e| ApiError::from_error(e, state.model()))
}

async fn run_analysis(state: &AppState, multipart: Multipart) -> Result<ComparisonResult> {
    let form = read_form(&state.config, multipart).await?;
    ensure_documents(&form.documents)?;
    info!("Received {} documents", form.documents.len());

    let fragments = normalize_documents(&state.normalizer, form.documents).await;
    info!("{} documents usable after normalization", fragments.len());

    let result = state.comparator.compare(&fragments, &form.preferences).await?;
    info!("Returning successful analysis");
    Ok(result)
}

/// Decoded multipart submission. Dropping it releases every staged file.
struct AnalyzeForm {
    documents: Vec<UploadedDocument>,
    preferences: UserPreferences,
}

async fn read_form(config: &ServiceConfig, mut multipart: Multipart) -> Result<AnalyzeForm> {
    let mut documents = Vec::new();
    let mut preferences_raw: Option<String> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(upload_error)? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("files") => {
                let file_name = field.file_name().map(str::to_string);
                let mut writer =
                    UploadedDocument::stage(&config.upload_dir, file_name, config.max_file_bytes)?;
                while let Some(chunk) = field.chunk().await.map_err(upload_error)? {
                    writer.write_chunk(&chunk)?;
                }
                documents.push(writer.finish()?);
            }
            Some("preferences") if preferences_raw.is_none() => {
                preferences_raw = Some(field.text().await.map_err(upload_error)?);
            }
            other => debug!("Ignoring form field {:?}", other),
        }
    }

    Ok(AnalyzeForm {
        documents,
        preferences: UserPreferences::parse(preferences_raw.as_deref()),
    })
}

fn upload_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge(e.body_text())
    } else {
        Error::Upload(e.body_text())
    }
}

/// Extract every document on the blocking pool in parallel, then label the
/// accepted ones in upload order.
async fn normalize_documents(
    normalizer: &Normalizer,
    documents: Vec<UploadedDocument>,
) -> Vec<NormalizedFragment> {
    let tasks = documents.into_iter().map(|doc| {
        let normalizer = normalizer.clone();
        tokio::task::spawn_blocking(move || normalizer.extract_document(doc))
    });

    let accepted = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| {
            joined.unwrap_or_else(|e| {
                warn!("Extraction task failed: {}", e);
                None
            })
        });
    label_fragments(accepted)
}
