use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;
use tower::ServiceExt;

use panchi_catalog::config::Config;
use panchi_catalog::content::{ContentSource, InMemoryContent};
use panchi_catalog::error::{CatalogError, Result};
use panchi_catalog::export::export_site;
use panchi_catalog::models::Furniture;
use panchi_catalog::server::create_router;
use panchi_catalog::site::Site;
use panchi_catalog::state::AppState;

fn listing(value: Value) -> Furniture {
    serde_json::from_value(value).expect("valid furniture document")
}

fn sample_listings() -> Vec<Furniture> {
    vec![
        listing(json!({
            "_id": "t2",
            "title": "Silla Nórdica",
            "slug": { "current": "silla-nordica" },
            "price": 0,
            "images": [],
            "publishedAt": "2024-05-02T10:00:00Z"
        })),
        listing(json!({
            "_id": "t1",
            "title": "Mesa de Roble",
            "slug": { "current": "mesa-de-roble" },
            "ambiente": "comedor",
            "price": 150000,
            "material": "Roble macizo",
            "measurements": { "alto": 75, "ancho": 180, "profundidad": 90 },
            "images": [
                { "_key": "a", "asset": { "_ref": "image-aaa-2000x3000-jpg" }, "alt": "Frente" },
                { "_key": "b", "asset": { "_ref": "image-bbb-3000x2000-jpg" } }
            ],
            "publishedAt": "2024-05-03T10:00:00Z"
        })),
        listing(json!({
            "_id": "t3",
            "title": "Banco de Pino",
            "slug": { "current": "banco-de-pino" },
            "images": null,
            "publishedAt": "2024-05-01T10:00:00Z"
        })),
        listing(json!({
            "_id": "draft",
            "title": "Borrador",
            "publishedAt": "2024-05-09T10:00:00Z"
        })),
    ]
}

fn config_with_secret(secret: Option<&str>) -> Config {
    let mut config = Config::default();
    config.revalidate_secret = secret.map(str::to_string);
    config
}

fn app_with(content: Arc<dyn ContentSource>, config: Config) -> (Router, AppState) {
    let site = Site::new(content, &config);
    let state = AppState::new(site, config);
    (create_router(state.clone()), state)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

struct FailingContent;

#[async_trait]
impl ContentSource for FailingContent {
    async fn list_furniture(&self) -> Result<Vec<Furniture>> {
        Err(CatalogError::Content { message: "dataset unavailable".to_string() })
    }

    async fn furniture_by_slug(&self, _slug: &str) -> Result<Option<Furniture>> {
        Err(CatalogError::Content { message: "dataset unavailable".to_string() })
    }

    async fn all_slugs(&self) -> Result<Vec<String>> {
        Err(CatalogError::Content { message: "dataset unavailable".to_string() })
    }
}

#[tokio::test]
async fn catalog_lists_slugged_items_newest_first() {
    let (app, _) = app_with(Arc::new(InMemoryContent::new(sample_listings())), Config::default());
    let (status, body) = get(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.matches("class=\"card\"").count(), 3);
    assert!(!body.contains("Borrador"));

    let mesa = body.find("Mesa de Roble").unwrap();
    let silla = body.find("Silla Nórdica").unwrap();
    let banco = body.find("Banco de Pino").unwrap();
    assert!(mesa < silla && silla < banco);
}

#[tokio::test]
async fn catalog_cards_show_price_or_fallbacks() {
    let (app, _) = app_with(Arc::new(InMemoryContent::new(sample_listings())), Config::default());
    let (_, body) = get(&app, "/").await;

    assert!(body.contains("AR$ 150000"));
    assert!(body.contains("Consultar"));
    assert!(body.contains("Sin imagen"));
    assert!(body.contains("Mueble general"));
    assert!(body.contains("cdn.sanity.io"));
    assert!(body.contains("wa.me"));
}

#[tokio::test]
async fn empty_catalog_shows_message() {
    let (app, _) = app_with(Arc::new(InMemoryContent::default()), Config::default());
    let (status, body) = get(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No hay muebles publicados todavía."));
    assert!(body.contains("Sobre Nosotros"));
}

#[tokio::test]
async fn product_page_renders_details_and_gallery() {
    let (app, _) = app_with(Arc::new(InMemoryContent::new(sample_listings())), Config::default());
    let (status, body) = get(&app, "/productos/mesa-de-roble").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Mesa de Roble"));
    assert!(body.contains("Roble macizo"));
    assert!(body.contains("AR$ 150000"));
    assert!(body.contains("og:image"));
    assert_eq!(body.matches("class=\"thumbnail\"").count(), 1);
    assert_eq!(body.matches("class=\"thumbnail activo\"").count(), 1);
    assert!(body.contains("imagen=image-aaa-2000x3000-jpg\" class=\"thumbnail activo\""));
}

#[tokio::test]
async fn gallery_selection_moves_active_thumbnail() {
    let (app, _) = app_with(Arc::new(InMemoryContent::new(sample_listings())), Config::default());
    let (_, default_view) = get(&app, "/productos/mesa-de-roble").await;
    let (status, selected) = get(&app, "/productos/mesa-de-roble?imagen=image-bbb-3000x2000-jpg").await;

    assert_eq!(status, StatusCode::OK);
    assert_ne!(default_view, selected);
    assert_eq!(selected.matches("class=\"thumbnail activo\"").count(), 1);
    assert!(selected.contains("imagen=image-bbb-3000x2000-jpg\" class=\"thumbnail activo\""));
}

#[tokio::test]
async fn product_without_images_has_no_thumbnails() {
    let (app, _) = app_with(Arc::new(InMemoryContent::new(sample_listings())), Config::default());
    let (status, body) = get(&app, "/productos/banco-de-pino").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Sin imagen"));
    assert!(!body.contains("class=\"thumbnails\""));
    assert!(!body.contains("class=\"price large\""));
}

#[tokio::test]
async fn unknown_product_is_404() {
    let (app, state) = app_with(Arc::new(InMemoryContent::new(sample_listings())), Config::default());
    let (status, body) = get(&app, "/productos/does-not-exist").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Página no encontrada."));
    assert!(state.site.cache().is_empty());
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (app, _) = app_with(Arc::new(InMemoryContent::default()), Config::default());
    let (status, _) = get(&app, "/contacto").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn content_failure_is_500() {
    let (app, _) = app_with(Arc::new(FailingContent), Config::default());
    let (status, _) = get(&app, "/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn cached_page_carries_etag_and_honours_if_none_match() {
    let (app, _) = app_with(Arc::new(InMemoryContent::new(sample_listings())), Config::default());
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let etag = response.headers().get(header::ETAG).unwrap().clone();
    let cache_control = response.headers().get(header::CACHE_CONTROL).unwrap();
    assert_eq!(cache_control, "s-maxage=60, stale-while-revalidate");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::IF_NONE_MATCH, etag)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
}

#[tokio::test]
async fn revalidate_with_valid_secret_regenerates_pages() {
    let content = InMemoryContent::new(sample_listings());
    let (app, _) = app_with(Arc::new(content.clone()), config_with_secret(Some("abc")));

    let (_, before) = get(&app, "/").await;
    assert!(before.contains("Mesa de Roble"));

    content.replace(vec![listing(json!({
        "_id": "t9",
        "title": "Ropero Antiguo",
        "slug": { "current": "ropero-antiguo" }
    }))]);
    let (_, stale) = get(&app, "/").await;
    assert!(stale.contains("Mesa de Roble"));

    let (status, body) = get(&app, "/api/revalidate?secret=abc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({ "revalidated": true }));

    let (_, fresh) = get(&app, "/").await;
    assert!(fresh.contains("Ropero Antiguo"));
    assert!(!fresh.contains("Mesa de Roble"));
}

#[tokio::test]
async fn revalidate_with_wrong_secret_is_rejected_without_touching_cache() {
    let content = InMemoryContent::new(sample_listings());
    let (app, _) = app_with(Arc::new(content.clone()), config_with_secret(Some("abc")));
    get(&app, "/").await;

    content.replace(Vec::new());
    let (status, body) = get(&app, "/api/revalidate?secret=xyz").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        serde_json::from_str::<Value>(&body).unwrap(),
        json!({ "message": "Invalid token" })
    );

    let (_, still_cached) = get(&app, "/").await;
    assert!(still_cached.contains("Mesa de Roble"));
}

#[tokio::test]
async fn revalidate_accepts_secret_header_and_slug() {
    let content = InMemoryContent::new(sample_listings());
    let (app, state) = app_with(Arc::new(content.clone()), config_with_secret(Some("abc")));
    get(&app, "/productos/mesa-de-roble").await;

    content.replace(Vec::new());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/revalidate?slug=mesa-de-roble")
                .header("x-revalidate-secret", "abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.site.cache().get("/productos/mesa-de-roble").is_none());
}

#[tokio::test]
async fn revalidate_rejects_multi_segment_slug_before_regenerating() {
    let content = InMemoryContent::new(sample_listings());
    let (app, _) = app_with(Arc::new(content.clone()), config_with_secret(Some("abc")));
    get(&app, "/").await;

    content.replace(Vec::new());
    let (status, body) = get(&app, "/api/revalidate?secret=abc&slug=a/b").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        serde_json::from_str::<Value>(&body).unwrap(),
        json!({ "message": "Invalid slug" })
    );

    let (_, still_cached) = get(&app, "/").await;
    assert!(still_cached.contains("Mesa de Roble"));
}

#[tokio::test]
async fn revalidate_without_configured_secret_is_rejected() {
    let (app, _) = app_with(Arc::new(InMemoryContent::default()), config_with_secret(None));
    let (status, _) = get(&app, "/api/revalidate?secret=abc").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn revalidate_failure_reports_500() {
    let (app, _) = app_with(Arc::new(FailingContent), config_with_secret(Some("abc")));
    let (status, body) = get(&app, "/api/revalidate?secret=abc").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["message"], "Error revalidating");
    assert!(body["error"].as_str().unwrap().contains("dataset unavailable"));
}

#[tokio::test]
async fn health_reports_service() {
    let (app, _) = app_with(Arc::new(InMemoryContent::default()), Config::default());
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap()["status"], "healthy");
}

#[tokio::test]
async fn export_writes_every_page() {
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/fixtures.json");
    let content = InMemoryContent::from_file(&fixtures).unwrap();
    let config = Config::default();
    let site = Site::new(Arc::new(content), &config);

    let out = tempdir().unwrap();
    let static_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("static");
    let summary = export_site(&site, out.path(), Some(static_dir.as_path())).await.unwrap();

    assert_eq!(summary.pages_written, 4);
    assert!(summary.skipped.is_empty());
    assert!(summary.assets_copied >= 1);
    assert!(out.path().join("index.html").exists());
    assert!(out.path().join("productos/mesa-de-roble/index.html").exists());
    assert!(out.path().join("productos/banco-de-pino/index.html").exists());
    assert!(out.path().join("404.html").exists());
    assert!(out.path().join("static/styles.css").exists());

    let index = std::fs::read_to_string(out.path().join("index.html")).unwrap();
    let mesa = index.find("Mesa de roble").unwrap();
    let banco = index.find("Banco de pino").unwrap();
    assert!(mesa < banco);
}
