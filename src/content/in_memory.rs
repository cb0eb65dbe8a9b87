use async_trait::async_trait;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::debug;

use super::traits::ContentSource;
use crate::constants::FURNITURE_TYPE;
use crate::error::{CatalogError, Result};
use crate::models::Furniture;

/// Content source over a local snapshot, for development fixtures and tests.
/// Applies the same filtering and ordering as the catalog queries.
#[derive(Clone, Default)]
pub struct InMemoryContent {
    items: Arc<RwLock<Vec<Furniture>>>,
}

impl InMemoryContent {
    pub fn new(items: Vec<Furniture>) -> Self {
        Self { items: Arc::new(RwLock::new(items)) }
    }

    /// Loads a dataset export: a JSON array, or one document per line (NDJSON).
    /// Documents of other types are skipped.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| {
            CatalogError::Config(format!("Failed to read fixtures '{}': {}", path.display(), e))
        })?;
        let docs = parse_documents(&data)?;

        let mut items = Vec::new();
        for doc in docs {
            let is_furniture = doc
                .get("_type")
                .and_then(Value::as_str)
                .map_or(true, |t| t == FURNITURE_TYPE);
            if is_furniture {
                items.push(serde_json::from_value::<Furniture>(doc)?);
            }
        }
        debug!(count = items.len(), path = %path.display(), "loaded fixtures");
        Ok(Self::new(items))
    }

    /// Replaces the whole snapshot, as an editor publishing changes would.
    pub fn replace(&self, items: Vec<Furniture>) {
        let mut guard = self.items.write().unwrap_or_else(|e| e.into_inner());
        *guard = items;
    }

    fn snapshot(&self) -> Vec<Furniture> {
        self.items.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// A JSON array, or newline-delimited documents.
pub fn parse_documents(data: &str) -> Result<Vec<Value>> {
    let trimmed = data.trim_start();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }
    data.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(CatalogError::from))
        .collect()
}

#[async_trait]
impl ContentSource for InMemoryContent {
    async fn list_furniture(&self) -> Result<Vec<Furniture>> {
        let mut items: Vec<Furniture> = self
            .snapshot()
            .into_iter()
            .filter(|f| f.slug_str().is_some())
            .collect();
        // newest first, undated last
        items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(items)
    }

    async fn furniture_by_slug(&self, slug: &str) -> Result<Option<Furniture>> {
        Ok(self
            .snapshot()
            .into_iter()
            .find(|f| f.slug_str() == Some(slug)))
    }

    async fn all_slugs(&self) -> Result<Vec<String>> {
        Ok(self
            .snapshot()
            .iter()
            .filter_map(|f| f.slug_str().map(str::to_string))
            .collect())
    }
}
