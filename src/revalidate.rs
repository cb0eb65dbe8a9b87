//! On-demand revalidation webhook.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};

use crate::constants::{product_path, slug_from_path, CATALOG_ROOT, REVALIDATE_SECRET_HEADER};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RevalidateQuery {
    pub secret: Option<String>,
    /// Also regenerate this listing's detail page.
    pub slug: Option<String>,
}

/// Compares SHA-256 digests of both secrets in constant time.
/// An unset secret never matches.
pub fn secret_matches(configured: Option<&str>, provided: Option<&str>) -> bool {
    let (Some(expected), Some(given)) = (configured, provided) else {
        return false;
    };
    let expected = Sha256::digest(expected.as_bytes());
    let given = Sha256::digest(given.as_bytes());
    expected
        .iter()
        .zip(given.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

fn provided_secret<'a>(query: &'a RevalidateQuery, headers: &'a HeaderMap) -> Option<&'a str> {
    query
        .secret
        .as_deref()
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get(REVALIDATE_SECRET_HEADER)
                .and_then(|v| v.to_str().ok())
        })
}

/// A slug names exactly one detail page path.
fn is_single_segment(slug: &str) -> bool {
    slug_from_path(&product_path(slug)) == Some(slug)
}

/// `GET|POST /api/revalidate`
pub async fn revalidate_handler(
    State(state): State<AppState>,
    Query(query): Query<RevalidateQuery>,
    headers: HeaderMap,
) -> Response {
    let provided = provided_secret(&query, &headers);
    if !secret_matches(state.config.revalidate_secret.as_deref(), provided) {
        warn!("revalidation rejected: invalid token");
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid token" }))).into_response();
    }

    let mut paths = vec![CATALOG_ROOT.to_string()];
    if let Some(slug) = query.slug.as_deref().filter(|s| !s.trim().is_empty()) {
        if !is_single_segment(slug) {
            warn!(slug = %slug, "revalidation rejected: invalid slug");
            return (StatusCode::BAD_REQUEST, Json(json!({ "message": "Invalid slug" }))).into_response();
        }
        paths.push(product_path(slug));
    }

    for path in &paths {
        if let Err(e) = state.site.revalidate(path).await {
            error!(path = %path, error = %e, "revalidation failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Error revalidating", "error": e.to_string() })),
            )
                .into_response();
        }
    }

    info!(paths = ?paths, "revalidated");
    Json(json!({ "revalidated": true })).into_response()
}
