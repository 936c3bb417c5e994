//! HTTP server for image warehouse relations.
//!
//! Exposes parent and child queries as hypermedia links and accepts assembly
//! and deployable descriptions for recording. All state lives in the
//! warehouse; the server holds only a store client.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use router::build_router;
pub use server::IwrServer;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::util::ServiceExt;

    use iwr_sdk::Relations;
    use iwr_store::InMemoryStore;
    use iwr_types::{AttributeSet, EntityId, EntityType};

    fn id(s: &str) -> EntityId {
        EntityId::new(s).unwrap()
    }

    fn app() -> (Arc<InMemoryStore>, Router) {
        let store = Arc::new(InMemoryStore::new());
        store.insert_object(EntityType::Template, id("T1"), AttributeSet::new());
        store.insert_object(EntityType::Template, id("T2"), AttributeSet::new());
        store.insert_object(EntityType::Image, id("I1"), [("template", "T1")].into_iter().collect());
        store.insert_object(EntityType::ProviderImage, id("P1"), [("image", "I1")].into_iter().collect());
        let router = build_router(Relations::new(store.clone()));
        (store, router)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, content_type: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (_, app) = app();
        let (status, body) = send(&app, get("/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn index_lists_supported_relations() {
        let (_, app) = app();
        let (status, body) = send(&app, get("/iwhd")).await;
        assert_eq!(status, StatusCode::OK);
        let collections = body["collections"].as_array().unwrap();
        assert_eq!(collections.len(), 5);
        assert_eq!(collections[0]["collection"], "provider_images");
        assert!(collections[0]["children"].is_null());
        assert_eq!(collections[0]["parents"], "/iwhd/provider_images/{id}/parents");
        assert!(collections[4]["parents"].is_null());
    }

    #[tokio::test]
    async fn parents_are_rendered_as_links() {
        let (_, app) = app();
        let (status, body) = send(&app, get("/iwhd/provider_images/P1/parents")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["entity"]["href"], "/iwhd/provider_images/P1");
        assert_eq!(body["relation"], "parents");
        assert_eq!(body["skipped"], 0);
        let links = body["links"].as_array().unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0]["href"], "/iwhd/images/I1");
        assert_eq!(links[0]["rel"], "image");
        assert_eq!(links[0]["type"], "parent");
        assert_eq!(links[0]["id"], "I1");
    }

    #[tokio::test]
    async fn record_and_traverse() {
        let (store, app) = app();
        let (status, body) = send(
            &app,
            post(
                "/iwhd/assemblies",
                "application/xml",
                r#"<assembly uuid="A1"><template uuid="T1"/></assembly>"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["targets"][0]["id"], "T1");

        let (status, _) = send(
            &app,
            post("/iwhd/assemblies", "application/json", r#"{"id": "A2", "template_id": "T2"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            post("/iwhd/deployables", "application/json", r#"{"id": "D1", "assembly_ids": ["A1", "A2"]}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["targets"].as_array().unwrap().len(), 2);

        let t1 = store.object(EntityType::Template, &id("T1")).unwrap();
        assert_eq!(t1.get("referenced_by_D1"), Some("deployable"));

        let (status, body) = send(&app, get("/iwhd/deployables/D1/children")).await;
        assert_eq!(status, StatusCode::OK);
        let mut ids: Vec<&str> = body["links"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["id"].as_str().unwrap())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["A1", "A2"]);

        let (_, body) = send(&app, get("/iwhd/assemblies/A1/parents")).await;
        assert_eq!(body["links"][0]["href"], "/iwhd/deployables/D1");
        assert_eq!(body["links"][0]["rel"], "deployable");
    }

    #[tokio::test]
    async fn object_view_carries_relation_links() {
        let (_, app) = app();
        let (status, body) = send(&app, get("/iwhd/images/I1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["attributes"]["template"], "T1");
        assert_eq!(body["parents"], "/iwhd/images/I1/parents");
        assert_eq!(body["children"], "/iwhd/images/I1/children");
    }

    #[tokio::test]
    async fn error_statuses() {
        let (store, app) = app();
        let (status, body) = send(&app, get("/iwhd/widgets/X/parents")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], 404);

        let (status, _) = send(&app, get("/iwhd/templates/T9/parents")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, get("/iwhd/deployables/D1/parents")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, post("/iwhd/assemblies", "application/xml", "<assembly/>")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, post("/iwhd/deployables", "application/json", "{")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        store.set_unreachable(EntityType::Template, id("T1"));
        let (status, _) = send(
            &app,
            post(
                "/iwhd/assemblies",
                "application/xml",
                r#"<assembly uuid="A1"><template uuid="T1"/></assembly>"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, String) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn other_warehouse_paths_are_relayed() {
        let (_, app) = app();
        let (status, content_type, body) = send_raw(&app, get("/iwhd/templates")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/xml"));
        assert!(body.contains("<key>T1</key>"));
        assert!(body.contains("<key>T2</key>"));

        let (status, _, body) = send_raw(&app, get("/iwhd/images/I1/_attrs")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"<object_attr name="template">T1</object_attr>"#));

        let (status, content_type, body) = send_raw(&app, get("/iwhd/provider_images/P1/image")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("text/plain"));
        assert_eq!(body, "I1");

        let (status, _, body) = send_raw(&app, get("/iwhd/assemblies")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<objects>"));
    }

    #[tokio::test]
    async fn relayed_misses_and_writes_are_refused() {
        let (_, app) = app();
        let (status, body) = send(&app, get("/iwhd/templates/T9/_attrs")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], 404);

        let (status, _) = send(&app, get("/iwhd/widgets")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, get("/elsewhere")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, post("/iwhd/templates", "text/plain", "x")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn skipped_members_are_reported() {
        let (store, app) = app();
        store.set_unreachable(EntityType::ProviderImage, id("P0"));
        let (status, body) = send(&app, get("/iwhd/images/I1/children")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["skipped"], 1);
        assert_eq!(body["links"][0]["id"], "P1");
    }
}
