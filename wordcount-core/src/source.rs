use crate::error::CoreError;
use crate::types::{CommentEntry, ContainerInfo, ItemHandle, ListingCursor, MorePlaceholder};
use async_trait::async_trait;

/// The remote community feed the crawler reads from.
///
/// Implementations only translate requests; paging, deduplication and
/// comment expansion are driven by the caller.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Checks that the community exists and is readable.
    async fn resolve_container(&self, name: &str) -> Result<ContainerInfo, CoreError>;

    /// Fetches the page following `cursor`, newest first.
    async fn list_page(
        &self,
        container: &str,
        cursor: &ListingCursor,
        page_size: u32,
    ) -> Result<Vec<ItemHandle>, CoreError>;

    /// First-level comment fetch for an item, flattened. May contain placeholders.
    async fn comment_tree(&self, item: &ItemHandle) -> Result<Vec<CommentEntry>, CoreError>;

    /// Expands a single placeholder. The result may contain further placeholders.
    async fn resolve_placeholder(
        &self,
        item: &ItemHandle,
        placeholder: &MorePlaceholder,
    ) -> Result<Vec<CommentEntry>, CoreError>;
}
