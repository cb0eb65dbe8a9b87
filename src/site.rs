use askama::Template;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, Instrument};

use crate::cache::{CachedPage, PageCache};
use crate::config::{Config, SiteConfig};
use crate::constants::{product_path, slug_from_path, CATALOG_ROOT, GALLERY_QUERY_PARAM};
use crate::content::ContentSource;
use crate::error::{CatalogError, Result};
use crate::gallery::Gallery;
use crate::images::ImageUrlBuilder;
use crate::views;

/// A page the site knows how to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    Catalog,
    Product { slug: String, image: Option<String> },
}

impl PageRequest {
    pub fn product(slug: impl Into<String>) -> Self {
        PageRequest::Product { slug: slug.into(), image: None }
    }

    /// Maps a route path to a page; `None` for paths the site does not generate.
    pub fn from_path(path: &str) -> Option<Self> {
        if path == CATALOG_ROOT {
            return Some(PageRequest::Catalog);
        }
        slug_from_path(path).map(PageRequest::product)
    }

    pub fn path(&self) -> String {
        match self {
            PageRequest::Catalog => CATALOG_ROOT.to_string(),
            PageRequest::Product { slug, .. } => product_path(slug),
        }
    }

    fn variant_key(&self) -> String {
        match self {
            PageRequest::Product { image: Some(image), .. } => {
                format!("{}?{}={}", self.path(), GALLERY_QUERY_PARAM, image)
            }
            _ => self.path(),
        }
    }
}

struct Generated {
    html: String,
    /// False when a requested gallery image did not match; the page is then the default view.
    selection_applied: bool,
}

/// Generates pages from content and keeps them in the page cache.
pub struct Site {
    content: Arc<dyn ContentSource>,
    images: ImageUrlBuilder,
    settings: SiteConfig,
    cache: PageCache,
}

impl Site {
    pub fn new(content: Arc<dyn ContentSource>, config: &Config) -> Self {
        Self {
            content,
            images: ImageUrlBuilder::new(&config.sanity.project_id, &config.sanity.dataset),
            settings: config.site.clone(),
            cache: PageCache::new(Duration::from_secs(config.site.revalidate_seconds)),
        }
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub fn revalidate_after(&self) -> Duration {
        self.cache.ttl()
    }

    /// Serves `request` from cache while fresh, generating it otherwise.
    /// Not-found results are never cached.
    pub async fn page(&self, request: &PageRequest) -> Result<CachedPage> {
        let key = request.variant_key();
        if let Some(hit) = self.cache.get_fresh(&key) {
            debug!(key = %key, "page cache hit");
            return Ok(hit);
        }

        let generated = self.generate(request).await?;
        let key = if generated.selection_applied { key } else { request.path() };
        Ok(self.cache.insert(key, generated.html))
    }

    /// Regenerates `path` now and replaces its cache entry.
    /// A page that no longer resolves is evicted; other failures leave the old entry in place.
    pub async fn revalidate(&self, path: &str) -> Result<()> {
        let request = PageRequest::from_path(path)
            .ok_or_else(|| CatalogError::NotFound(path.to_string()))?;
        let path = request.path();

        match self.generate(&request).await {
            Ok(generated) => {
                self.cache.remove_path(&path);
                self.cache.insert(path.as_str(), generated.html);
                info!(path = %path, "page regenerated");
                Ok(())
            }
            Err(CatalogError::NotFound(_)) => {
                let evicted = self.cache.remove_path(&path);
                info!(path = %path, evicted, "page no longer exists");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn generate(&self, request: &PageRequest) -> Result<Generated> {
        let span = info_span!("generate", path = %request.path());
        async {
            match request {
                PageRequest::Catalog => Ok(Generated {
                    html: self.render_catalog().await?,
                    selection_applied: true,
                }),
                PageRequest::Product { slug, image } => {
                    self.render_product_page(slug, image.as_deref()).await
                }
            }
        }
        .instrument(span)
        .await
    }

    pub async fn render_catalog(&self) -> Result<String> {
        let mut items = self.content.list_furniture().await?;
        items.retain(|item| item.slug_str().is_some());
        items.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        let page = views::index_page(&items, &self.images, &self.settings);
        info!(listings = page.cards.len(), "catalog generated");
        Ok(page.render()?)
    }

    pub async fn render_product(&self, slug: &str, image: Option<&str>) -> Result<String> {
        Ok(self.render_product_page(slug, image).await?.html)
    }

    async fn render_product_page(&self, slug: &str, image: Option<&str>) -> Result<Generated> {
        let item = self
            .content
            .furniture_by_slug(slug)
            .await?
            .ok_or_else(|| CatalogError::NotFound(product_path(slug)))?;

        let mut gallery = Gallery::new(item.images.clone());
        let selection_applied = match image {
            Some(reference) => {
                let matched = gallery.select(reference);
                if !matched {
                    debug!(slug, reference, "gallery image not found, showing cover");
                }
                matched
            }
            None => true,
        };

        let page = views::product_page(&item, &gallery, &self.images, &self.settings);
        Ok(Generated { html: page.render()?, selection_applied })
    }

    pub async fn slugs(&self) -> Result<Vec<String>> {
        self.content.all_slugs().await
    }
}
