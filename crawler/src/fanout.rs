use crate::expand::expand_all_comments;
use crate::needle::Needle;
use crate::progress::ProgressTracker;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{debug, info, trace, warn};
use wordcount_core::{AuthorTally, CoreError, ItemHandle, ListingSource};

#[derive(Debug, Clone)]
pub struct FanoutConfig {
    /// Posts processed concurrently.
    pub workers: usize,
    /// Upper bound for one post, comment expansion included.
    pub task_timeout: Option<Duration>,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            task_timeout: None,
        }
    }
}

/// Counts a needle across posts and their comments on a bounded pool of
/// concurrent tasks.
pub struct FanoutCounter<'a, S: ListingSource + ?Sized> {
    source: &'a S,
    config: FanoutConfig,
}

impl<'a, S: ListingSource + ?Sized> FanoutCounter<'a, S> {
    pub fn new(source: &'a S, config: FanoutConfig) -> Self {
        Self { source, config }
    }

    /// Scans every item and merges the per-item tallies.
    ///
    /// Tasks complete in any order; the merge is a per-author sum so the
    /// result does not depend on it. The first failing task aborts the run,
    /// drops the tasks still in flight and no partial tally is returned.
    pub async fn count_all(
        &self,
        items: &[ItemHandle],
        needle: &str,
        progress: &ProgressTracker,
    ) -> Result<AuthorTally, CoreError> {
        let needle = Needle::new(needle)?;
        if self.config.workers == 0 {
            return Err(CoreError::InvalidInput {
                message: "worker count must be at least 1".to_string(),
            });
        }

        info!(
            "Searching for '{}' in {} posts with {} workers",
            needle,
            items.len(),
            self.config.workers
        );

        let needle = &needle;
        let mut tasks = stream::iter(items)
            .map(|item| self.run_task(item, needle, progress))
            .buffer_unordered(self.config.workers);

        let mut tally = AuthorTally::new();
        while let Some(result) = tasks.next().await {
            match result {
                Ok(local) => tally.merge(local),
                Err(e) => {
                    warn!("Aborting search: {}", e);
                    return Err(e);
                }
            }
        }

        progress.finish();
        info!(
            "Search for '{}' complete: {} occurrences by {} authors",
            needle,
            tally.total(),
            tally.len()
        );
        Ok(tally)
    }

    async fn run_task(
        &self,
        item: &ItemHandle,
        needle: &Needle,
        progress: &ProgressTracker,
    ) -> Result<AuthorTally, CoreError> {
        let result = match self.config.task_timeout {
            Some(limit) => tokio::time::timeout(limit, self.process(item, needle, progress))
                .await
                .unwrap_or(Err(CoreError::Timeout { after: limit })),
            None => self.process(item, needle, progress).await,
        };

        result.map_err(|e| CoreError::TaskFailed {
            item: item.name.clone(),
            source: Box::new(e),
        })
    }

    /// Body first, then every comment. Each text unit counts towards
    /// progress whether or not it has an author.
    async fn process(
        &self,
        item: &ItemHandle,
        needle: &Needle,
        progress: &ProgressTracker,
    ) -> Result<AuthorTally, CoreError> {
        let mut local = AuthorTally::new();

        if item.is_self {
            if let Some(author) = &item.author {
                local.add(author, needle.count_in(&item.body));
            }
        }
        progress.record(1);

        let comments = expand_all_comments(self.source, item).await?;
        for comment in &comments {
            if let Some(author) = &comment.author {
                local.add(author, needle.count_in(&comment.body));
            }
            let percent = progress.record(1);
            trace!("Progress: {:.2}%", percent);
        }

        debug!(
            "Scanned {} ({} comments): {} occurrences",
            item.name,
            comments.len(),
            local.total()
        );
        Ok(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool_width() {
        let config = FanoutConfig::default();
        assert_eq!(config.workers, 10);
        assert!(config.task_timeout.is_none());
    }
}
