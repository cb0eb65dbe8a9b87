use async_trait::async_trait;

use crate::error::Result;
use crate::models::Furniture;

/// Read-only port onto the content store. Implementations never mutate content.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Every listing with a defined slug, newest `publishedAt` first.
    async fn list_furniture(&self) -> Result<Vec<Furniture>>;

    /// The listing whose slug equals `slug`, if any.
    async fn furniture_by_slug(&self, slug: &str) -> Result<Option<Furniture>>;

    /// Slugs of every reachable listing.
    async fn all_slugs(&self) -> Result<Vec<String>>;
}
