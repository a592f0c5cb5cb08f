//! Agent listing endpoint

use axum::extract::Extension;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use metis_core::AgentRegistry;
use std::sync::Arc;

/// List available agent names in registry order
async fn list_agents(Extension(registry): Extension<Arc<AgentRegistry>>) -> Json<Vec<&'static str>> {
    Json(registry.names())
}

/// Create agent routes
pub fn agents_routes() -> Router {
    Router::new().route("/agents", get(list_agents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_agents_listing_is_ordered() {
        let app = agents_routes().layer(Extension(Arc::new(AgentRegistry::standard())));
        let response = app
            .oneshot(Request::get("/agents").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        let names: Vec<String> = serde_json::from_slice(&body).unwrap();
        assert_eq!(names[0], "architect");
        assert_eq!(names[1], "pm");
        assert!(names.contains(&"datasci".to_string()));
    }
}
