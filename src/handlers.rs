use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::cache::CachedPage;
use crate::error::{CatalogError, Result};
use crate::site::PageRequest;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    pub imagen: Option<String>,
}

/// `GET /`
pub async fn catalog(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let page = state.site.page(&PageRequest::Catalog).await?;
    Ok(page_response(&state, &headers, page))
}

/// `GET /productos/:slug`
pub async fn product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<GalleryQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let request = PageRequest::Product {
        slug,
        image: query.imagen.filter(|s| !s.trim().is_empty()),
    };
    let page = state.site.page(&request).await?;
    Ok(page_response(&state, &headers, page))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "panchi-catalog",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn not_found() -> CatalogError {
    CatalogError::NotFound("route".to_string())
}

fn page_response(state: &AppState, headers: &HeaderMap, page: CachedPage) -> Response {
    let cache_control = format!(
        "s-maxage={}, stale-while-revalidate",
        state.site.revalidate_after().as_secs()
    );

    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').any(|tag| tag.trim() == page.etag))
        .unwrap_or(false);

    let mut response = if not_modified {
        StatusCode::NOT_MODIFIED.into_response()
    } else {
        Html(page.html.to_string()).into_response()
    };

    let response_headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&page.etag) {
        response_headers.insert(header::ETAG, value);
    }
    if let Ok(value) = HeaderValue::from_str(&cache_control) {
        response_headers.insert(header::CACHE_CONTROL, value);
    }
    response
}
