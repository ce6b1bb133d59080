use std::time::Instant;

use axum::{
    extract::{Multipart, State},
    response::Response,
    Json,
};
use tracing::{error, info, warn};

use crate::{
    adapters::{dto::convert_dto::UploadFileResponse, state::AppState},
    application::error::ApplicationError,
    domain::models::job::{ConversionKind, UploadJob},
    services::UploadError,
};

pub struct ConvertController;

impl ConvertController {
    /// POST /convert/upload
    ///
    /// Stores the uploaded file in the scratch upload directory and
    /// acknowledges it. Unlike the conversion routes, the stored file is
    /// kept; only the unused per-job output directory is reclaimed.
    pub async fn upload_file(
        State(state): State<AppState>,
        mut multipart: Multipart,
    ) -> Result<Json<UploadFileResponse>, ApplicationError> {
        while let Some(field) = multipart.next_field().await.map_err(|e| {
            warn!("Invalid multipart data: {}", e);
            ApplicationError::BadRequest("Invalid request format".to_string())
        })? {
            if field.name() != Some("file") {
                continue;
            }

            let original = field
                .file_name()
                .map(str::to_string)
                .ok_or_else(|| {
                    ApplicationError::BadRequest("Missing filename in 'file' field".to_string())
                })?;

            let job = state.workspace.stage(&original)?;
            state
                .workspace
                .save_capped(field, &job.source_path, state.settings.max_upload_bytes)
                .await?;

            let stored_name = job
                .source_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();

            state.workspace.remove_dir(&job.release());

            return Ok(Json(UploadFileResponse {
                message: "File uploaded".to_string(),
                filename: stored_name,
            }));
        }

        warn!("Missing required 'file' field in upload");
        Err(ApplicationError::BadRequest(
            "Missing required field 'file'".to_string(),
        ))
    }

    /// POST /convert/pdf-to-docx
    pub async fn pdf_to_docx(
        State(state): State<AppState>,
        multipart: Multipart,
    ) -> Result<Response, ApplicationError> {
        Self::convert(state, ConversionKind::PdfToDocx, multipart).await
    }

    /// POST /convert/docx-to-pdf
    pub async fn docx_to_pdf(
        State(state): State<AppState>,
        multipart: Multipart,
    ) -> Result<Response, ApplicationError> {
        Self::convert(state, ConversionKind::DocxToPdf, multipart).await
    }

    /// POST /convert/xlsx-to-pdf
    pub async fn xlsx_to_pdf(
        State(state): State<AppState>,
        multipart: Multipart,
    ) -> Result<Response, ApplicationError> {
        Self::convert(state, ConversionKind::XlsxToPdf, multipart).await
    }

    /// Shared request pipeline: validate extension, stream the upload to
    /// disk under the cap, convert, then stream the output back.
    ///
    /// The staged source and the per-job output directory are owned by the
    /// [`UploadJob`]; every failure return drops it and removes both. On
    /// success the source is deleted as soon as the converter returns, and
    /// the output directory's lifetime is handed to the response stream.
    async fn convert(
        state: AppState,
        kind: ConversionKind,
        mut multipart: Multipart,
    ) -> Result<Response, ApplicationError> {
        let t0 = Instant::now();
        let limit = state.settings.max_upload_bytes;

        let mut job: Option<UploadJob> = None;

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            warn!("Invalid multipart data: {}", e);
            ApplicationError::BadRequest("Invalid request format".to_string())
        })? {
            if field.name() != Some("file") {
                continue;
            }

            let original = field
                .file_name()
                .map(str::to_string)
                .ok_or_else(|| {
                    ApplicationError::BadRequest("Missing filename in 'file' field".to_string())
                })?;

            if !kind.accepts(&original) {
                return Err(ApplicationError::UnsupportedInput(
                    kind.rejection_detail().to_string(),
                ));
            }

            info!(conversion = %kind, filename = %original, "START");

            let staged = state.workspace.stage(&original)?;
            match state
                .workspace
                .save_capped(field, &staged.source_path, limit)
                .await
            {
                Ok(_) => {}
                Err(UploadError::TooLarge(max_bytes)) => {
                    warn!(
                        conversion = %kind,
                        filename = %original,
                        limit_bytes = max_bytes,
                        "REJECT too_large"
                    );
                    return Err(ApplicationError::PayloadTooLarge(max_bytes));
                }
                Err(e) => return Err(e.into()),
            }

            job = Some(staged);
            break;
        }

        let job = job.ok_or_else(|| {
            warn!("Missing required 'file' field in upload");
            ApplicationError::BadRequest("Missing required field 'file'".to_string())
        })?;

        let converter = state.converter_for(kind);
        let result = converter.convert(&job.source_path, &job.output_dir).await;
        let elapsed = t0.elapsed().as_secs_f64();

        let out_path = match result {
            Ok(path) => path,
            Err(e) => {
                error!(
                    conversion = %kind,
                    job = %job.id,
                    filename = %job.original_filename,
                    error = ?e,
                    time_sec = elapsed,
                    "FAIL"
                );
                return Err(e);
            }
        };

        // The staged source is no longer needed once the output exists.
        state.workspace.delete(&job.source_path);

        info!(
            conversion = %kind,
            job = %job.id,
            filename = %job.original_filename,
            out = %out_path.display(),
            time_sec = elapsed,
            "OK"
        );

        let display_filename = job.output_display_name(kind);
        let output_dir = job.release();
        state
            .workspace
            .deliver_and_delete(output_dir, &out_path, &display_filename, kind.media_type())
            .await
    }
}
