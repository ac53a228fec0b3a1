use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::info;
use uuid::Uuid;

use crate::docx::DOCX_MIME;
use crate::errors::AppError;
use crate::extraction::SourceFormat;
use crate::pipeline::{self, ConvertError};
use crate::state::AppState;

/// Multipart field carrying the résumé.
pub const FILE_FIELD: &str = "cv_file";

/// POST /convert
/// Accepts a PDF or DOCX résumé and answers with the branded DOCX.
pub async fn handle_convert(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let max_bytes = state.config.max_upload_bytes;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.trim().is_empty() {
            return Err(ConvertError::Input("Nom de fichier vide.".to_string()).into());
        }
        SourceFormat::detect(&filename).map_err(ConvertError::from)?;

        let bytes = field.bytes().await.map_err(multipart_error)?;
        if bytes.len() > max_bytes {
            return Err(too_large(max_bytes));
        }
        info!("Received '{}' ({} bytes)", filename, bytes.len());

        let conversion = pipeline::convert_upload(
            &bytes,
            &filename,
            &state.config.upload_dir,
            state.structurer.as_ref(),
            &state.render_options,
        )
        .await?;

        let unique = Uuid::new_v4().simple().to_string();
        let download_name =
            pipeline::output_file_name(&conversion.record.full_name, Some(&unique[..8]));
        info!("Sending {download_name}");

        return Ok((
            [
                (header::CONTENT_TYPE, DOCX_MIME.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{download_name}\""),
                ),
            ],
            conversion.docx,
        )
            .into_response());
    }

    Err(ConvertError::Input(format!(
        "Aucun fichier reçu. Utilisez le champ '{FILE_FIELD}'."
    ))
    .into())
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(e.body_text())
    }
}

fn too_large(max_bytes: usize) -> AppError {
    AppError::PayloadTooLarge(format!(
        "Fichier trop volumineux (maximum {} Mo).",
        max_bytes / (1024 * 1024)
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::pipeline::tests::{sample_docx, sample_record, FakeStructurer};
    use crate::routes::build_router;
    use crate::routes::tests::test_state;
    use crate::structuring::StructureError;

    const BOUNDARY: &str = "cv-boundary";

    fn multipart_request(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::post("/convert")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(
        structurer: FakeStructurer,
        request: Request<Body>,
    ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(Arc::new(structurer), dir.path()));
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec(), dir)
    }

    fn error_code(body: &[u8]) -> String {
        let json: Value = serde_json::from_slice(body).unwrap();
        json["error"]["code"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_convert_returns_docx_attachment() {
        let request = multipart_request(FILE_FIELD, "cv.docx", &sample_docx(&["Awa Diop"]));
        let (status, headers, body, dir) = send(FakeStructurer::ok(sample_record()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], DOCX_MIME);
        let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"CV_Maltem_Awa_Diop_"));
        assert!(disposition.ends_with(".docx\""));
        assert!(body.starts_with(b"PK"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_field_is_rejected() {
        let request = multipart_request("other", "cv.docx", b"data");
        let (status, _, body, _) = send(FakeStructurer::ok(sample_record()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_empty_filename_is_rejected() {
        let request = multipart_request(FILE_FIELD, "", b"data");
        let (status, _, body, _) = send(FakeStructurer::ok(sample_record()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["message"], "Nom de fichier vide.");
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_rejected_before_size() {
        let big = vec![b'x'; 70 * 1024];
        let request = multipart_request(FILE_FIELD, "cv.odt", &big);
        let (status, _, _, _) = send(FakeStructurer::ok(sample_record()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let big = vec![b'x'; 70 * 1024];
        let request = multipart_request(FILE_FIELD, "cv.pdf", &big);
        let structurer = FakeStructurer::ok(sample_record());
        let (status, _, body, dir) = send(structurer, request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(error_code(&body), "PAYLOAD_TOO_LARGE");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let request = multipart_request(FILE_FIELD, "cv.docx", &sample_docx(&["Awa Diop"]));
        let structurer = FakeStructurer::failing(|| StructureError::Upstream("HTTP 503".into()));
        let (status, _, body, dir) = send(structurer, request).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(error_code(&body), "UPSTREAM_ERROR");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_file_is_input_error() {
        let request = multipart_request(FILE_FIELD, "cv.docx", b"not a docx");
        let structurer = FakeStructurer::ok(sample_record());
        let (status, _, _, _) = send(structurer, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
