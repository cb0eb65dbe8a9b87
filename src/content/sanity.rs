use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Instant;
use tracing::debug;

use super::queries;
use super::traits::ContentSource;
use crate::config::SanityConfig;
use crate::error::{CatalogError, Result};
use crate::models::Furniture;

/// GROQ-over-HTTP client for the content platform's query endpoint.
#[derive(Clone)]
pub struct SanityClient {
    http: Client,
    endpoint: String,
    token: Option<String>,
}

impl SanityClient {
    pub fn new(config: &SanityConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(http: Client, config: &SanityConfig) -> Self {
        Self {
            http,
            endpoint: query_endpoint(config),
            token: config.token.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Runs `query` with `params` bound as `$name`. Parameter values are JSON-encoded.
    pub async fn fetch<T: DeserializeOwned>(&self, query: &str, params: &[(&str, Value)]) -> Result<T> {
        let mut pairs: Vec<(String, String)> = vec![("query".to_string(), query.to_string())];
        for (name, value) in params {
            pairs.push((format!("${}", name), value.to_string()));
        }

        let mut request = self.http.get(&self.endpoint).query(&pairs);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "content query finished"
        );

        parse_response(status, &body)
    }
}

pub fn query_endpoint(config: &SanityConfig) -> String {
    let host = if config.use_cdn && config.token.is_none() {
        "apicdn.sanity.io"
    } else {
        "api.sanity.io"
    };
    let version = config.api_version.trim_start_matches('v');
    format!(
        "https://{}.{}/v{}/data/query/{}",
        config.project_id, host, version, config.dataset
    )
}

/// Turns a query endpoint response into the typed `result`.
pub fn parse_response<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T> {
    let json: Value = serde_json::from_str(body).map_err(|e| CatalogError::Content {
        message: format!("unreadable response ({}): {}", status, e),
    })?;

    if let Some(error) = json.get("error") {
        return Err(CatalogError::Content { message: describe_error(error, &json) });
    }
    if !status.is_success() {
        return Err(CatalogError::Content {
            message: format!("content platform answered {}", status),
        });
    }

    let result = json.get("result").cloned().unwrap_or(Value::Null);
    Ok(serde_json::from_value(result)?)
}

fn describe_error(error: &Value, body: &Value) -> String {
    match error {
        Value::Object(map) => map
            .get("description")
            .or_else(|| map.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("unknown query error")
            .to_string(),
        Value::String(kind) => match body.get("message").and_then(Value::as_str) {
            Some(message) => format!("{}: {}", kind, message),
            None => kind.clone(),
        },
        other => other.to_string(),
    }
}

#[async_trait]
impl ContentSource for SanityClient {
    async fn list_furniture(&self) -> Result<Vec<Furniture>> {
        let items: Option<Vec<Furniture>> = self.fetch(&queries::list_furniture(), &[]).await?;
        Ok(items.unwrap_or_default())
    }

    async fn furniture_by_slug(&self, slug: &str) -> Result<Option<Furniture>> {
        self.fetch(&queries::furniture_by_slug(), &[("slug", Value::from(slug))])
            .await
    }

    async fn all_slugs(&self) -> Result<Vec<String>> {
        let slugs: Option<Vec<Option<String>>> = self.fetch(&queries::all_slugs(), &[]).await?;
        Ok(slugs.unwrap_or_default().into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_uses_cdn_only_without_token() {
        let mut config = SanityConfig::default();
        assert_eq!(
            query_endpoint(&config),
            "https://r96cmfio.apicdn.sanity.io/v2023-05-03/data/query/production"
        );

        config.token = Some("t".into());
        assert_eq!(
            query_endpoint(&config),
            "https://r96cmfio.api.sanity.io/v2023-05-03/data/query/production"
        );
    }

    #[test]
    fn parses_result_list() {
        let body = r#"{"ms": 3, "query": "*", "result": [{"_id": "a", "title": "Mesa", "slug": {"current": "mesa"}}]}"#;
        let items: Vec<Furniture> = parse_response(StatusCode::OK, body).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].slug_str(), Some("mesa"));
    }

    #[test]
    fn null_result_is_none() {
        let body = r#"{"ms": 1, "result": null}"#;
        let item: Option<Furniture> = parse_response(StatusCode::OK, body).unwrap();
        assert!(item.is_none());
    }

    #[test]
    fn query_error_becomes_content_error() {
        let body = r#"{"error": {"description": "expected ']' following array body", "type": "queryParseError"}}"#;
        let err = parse_response::<Value>(StatusCode::BAD_REQUEST, body).unwrap_err();
        match err {
            CatalogError::Content { message } => assert!(message.contains("expected ']'")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn auth_error_keeps_message() {
        let body = r#"{"error": "Unauthorized", "message": "Session not found", "statusCode": 401}"#;
        let err = parse_response::<Value>(StatusCode::UNAUTHORIZED, body).unwrap_err();
        assert_eq!(err.to_string(), "Content query failed: Unauthorized: Session not found");
    }

    #[test]
    fn non_json_body_is_content_error() {
        let err = parse_response::<Value>(StatusCode::BAD_GATEWAY, "<html>").unwrap_err();
        assert!(matches!(err, CatalogError::Content { .. }));
    }
}
