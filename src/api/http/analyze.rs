// src/api/http/analyze.rs
// POST /api/analyze: multipart document upload in, AnalysisResult out

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use bytes::Bytes;
use tracing::info;

use crate::analysis::AnalysisResult;
use crate::api::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Form field carrying the document.
pub const FILE_FIELD: &str = "file";

struct Upload {
    file_name: Option<String>,
    bytes: Bytes,
}

pub async fn analyze_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<AnalysisResult>> {
    let mut multipart = multipart?;
    let upload = read_upload(&mut multipart)
        .await?
        .ok_or_else(|| ApiError::bad_request("No file provided"))?;

    info!(
        file = upload.file_name.as_deref().unwrap_or("<unnamed>"),
        bytes = upload.bytes.len(),
        "Analyzing uploaded document"
    );

    let result = state
        .analyzer
        .analyze(upload.bytes, upload.file_name.as_deref())
        .await?;
    Ok(Json(result))
}

/// First `file` field in the form; other fields are ignored.
async fn read_upload(multipart: &mut Multipart) -> ApiResult<Option<Upload>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;
        return Ok(Some(Upload { file_name, bytes }));
    }
    Ok(None)
}
