//! Static browser client
//!
//! A single embedded page; all rendering logic lives in the page itself
//! and talks to the JSON API.

use axum::response::Html;
use axum::routing::get;
use axum::Router;

/// Embedded browser client
const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Serve the browser client
async fn ui() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Create UI routes
pub fn ui_routes() -> Router {
    Router::new().route("/ui", get(ui))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_ui_serves_html() {
        let response = ui_routes()
            .oneshot(Request::get("/ui").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()["content-type"].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
    }
}
