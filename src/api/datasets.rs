//! Dataset upload endpoint
//!
//! `POST /datasets` accepts a multipart form with a `file` part (CSV) and
//! an optional `domain_column` part, registers the dataset and returns its
//! id for later runs to reference.

use axum::extract::{Extension, Multipart};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use metis_core::DatasetStore;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    dataset_id: uuid::Uuid,
    rows: usize,
    columns: Vec<String>,
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            success: false,
            error: message.into(),
        }),
    )
        .into_response()
}

/// Accept a dataset upload
async fn upload_dataset(
    Extension(datasets): Extension<Arc<DatasetStore>>,
    mut multipart: Multipart,
) -> Response {
    let mut file_name: Option<String> = None;
    let mut bytes: Option<axum::body::Bytes> = None;
    let mut domain_column: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return bad_request(format!("invalid multipart body: {e}")),
        };

        match field.name() {
            Some("file") => {
                file_name = field.file_name().map(str::to_string);
                bytes = match field.bytes().await {
                    Ok(bytes) => Some(bytes),
                    Err(e) => return bad_request(format!("failed to read file part: {e}")),
                };
            }
            Some("domain_column") => {
                domain_column = match field.text().await {
                    Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
                    Ok(_) => None,
                    Err(e) => return bad_request(format!("failed to read domain_column: {e}")),
                };
            }
            _ => {}
        }
    }

    let Some(bytes) = bytes else {
        return bad_request("missing 'file' part");
    };
    let name = file_name.unwrap_or_else(|| "dataset.csv".to_string());

    match datasets.save(&name, &bytes, domain_column).await {
        Ok(record) => Json(UploadResponse {
            dataset_id: record.id,
            rows: record.rows,
            columns: record.columns,
        })
        .into_response(),
        Err(e) => bad_request(e.to_string()),
    }
}

/// Create dataset routes
pub fn datasets_routes() -> Router {
    Router::new().route("/datasets", post(upload_dataset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn multipart_body(boundary: &str, parts: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (name, filename, content) in parts {
            body.push_str(&format!("--{boundary}\r\n"));
            match filename {
                Some(filename) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{boundary}--\r\n"));
        body
    }

    fn app() -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(DatasetStore::new(dir.path()).unwrap());
        (datasets_routes().layer(Extension(store)), dir)
    }

    #[tokio::test]
    async fn test_upload_returns_dataset_id() {
        let (app, _dir) = app();
        let boundary = "metis-test-boundary";
        let body = multipart_body(
            boundary,
            &[
                ("file", Some("projects.csv"), "effort,size\n10,100\n20,180"),
                ("domain_column", None, ""),
            ],
        );

        let response = app
            .oneshot(
                Request::post("/datasets")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value["dataset_id"].is_string());
        assert_eq!(value["rows"], 2);
    }

    #[tokio::test]
    async fn test_upload_without_file_is_bad_request() {
        let (app, _dir) = app();
        let boundary = "metis-test-boundary";
        let body = multipart_body(boundary, &[("domain_column", None, "domain")]);

        let response = app
            .oneshot(
                Request::post("/datasets")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
