use std::collections::HashSet;
use tracing::{debug, info};
use wordcount_core::{CoreError, ItemHandle, ListingCursor, ListingSource};

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Items requested per page. Reddit caps listings at 100.
    pub page_limit: u32,
    /// Hard cap on page requests.
    pub max_pages: u32,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            page_limit: 100,
            max_pages: 10,
        }
    }
}

/// Result of walking a listing.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub container: String,
    /// Distinct posts in first-seen order.
    pub items: Vec<ItemHandle>,
    /// Items returned across all pages, repeats included.
    pub total_items: u64,
    /// Sum of the declared comment counts of every returned item.
    pub total_children: u64,
    pub pages_fetched: u32,
}

impl Collection {
    /// Progress denominator for the counting phase. Never zero.
    pub fn denominator(&self) -> u64 {
        (self.total_items + self.total_children).max(1)
    }
}

type PageCallback<'a> = Box<dyn Fn(u64, u64) + Send + Sync + 'a>;

pub struct PageCollector<'a, S: ListingSource + ?Sized> {
    source: &'a S,
    config: CollectorConfig,
    on_page: Option<PageCallback<'a>>,
}

impl<'a, S: ListingSource + ?Sized> PageCollector<'a, S> {
    pub fn new(source: &'a S, config: CollectorConfig) -> Self {
        Self {
            source,
            config,
            on_page: None,
        }
    }

    /// Called after every page with the running `(total_items, total_children)`.
    pub fn on_page<F>(mut self, callback: F) -> Self
    where
        F: Fn(u64, u64) + Send + Sync + 'a,
    {
        self.on_page = Some(Box::new(callback));
        self
    }

    /// Pages through `container` until a page brings nothing new or
    /// `max_pages` requests were made. Any fetch error aborts the whole
    /// collection.
    pub async fn collect(&self, container: &str) -> Result<Collection, CoreError> {
        let mut cursor = ListingCursor::default();
        let mut previous_count: Option<u64> = None;
        let mut seen: HashSet<String> = HashSet::new();
        let mut collection = Collection {
            container: container.to_string(),
            ..Default::default()
        };

        while previous_count != Some(cursor.count)
            && collection.pages_fetched < self.config.max_pages
        {
            previous_count = Some(cursor.count);
            collection.pages_fetched += 1;

            let page = self
                .source
                .list_page(container, &cursor, self.config.page_limit)
                .await?;

            let mut fresh = 0usize;
            for item in page {
                cursor.advance(&item.name);
                collection.total_children += item.num_comments;
                if seen.insert(item.name.clone()) {
                    collection.items.push(item);
                    fresh += 1;
                }
            }
            collection.total_items = cursor.count;

            info!(
                "Page {} of r/{}: {} posts found ({} comments)",
                collection.pages_fetched,
                container,
                collection.total_items,
                collection.total_children
            );
            if let Some(callback) = &self.on_page {
                callback(collection.total_items, collection.total_children);
            }

            if fresh == 0 {
                debug!(
                    "Page {} added no new posts, listing exhausted",
                    collection.pages_fetched
                );
                break;
            }
        }

        Ok(collection)
    }
}
