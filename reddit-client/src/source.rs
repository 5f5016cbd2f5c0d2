use crate::models::{flatten_comments, CommentThing, RedditListingChild, RedditPostData};
use crate::RedditClient;
use async_trait::async_trait;
use wordcount_core::{
    CommentEntry, ContainerInfo, CoreError, ItemHandle, ListingCursor, ListingSource,
    MorePlaceholder,
};

#[async_trait]
impl ListingSource for RedditClient {
    async fn resolve_container(&self, name: &str) -> Result<ContainerInfo, CoreError> {
        let about = self
            .with_token(|token| async move { self.api.get_subreddit_info(&token, name).await })
            .await?;

        Ok(ContainerInfo {
            name: about.display_name.to_lowercase(),
            display_name: about.display_name,
        })
    }

    async fn list_page(
        &self,
        container: &str,
        cursor: &ListingCursor,
        page_size: u32,
    ) -> Result<Vec<ItemHandle>, CoreError> {
        let listing = self
            .with_token(|token| async move {
                self.api
                    .get_new_posts(
                        &token,
                        container,
                        cursor.after.as_deref(),
                        cursor.count,
                        page_size,
                    )
                    .await
            })
            .await?;

        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child: RedditListingChild<RedditPostData>| child.data.into())
            .collect())
    }

    async fn comment_tree(&self, item: &ItemHandle) -> Result<Vec<CommentEntry>, CoreError> {
        let things = self
            .with_token(|token| async move { self.api.get_comments(&token, &item.id, None).await })
            .await?;
        Ok(flatten_comments(things))
    }

    async fn resolve_placeholder(
        &self,
        item: &ItemHandle,
        placeholder: &MorePlaceholder,
    ) -> Result<Vec<CommentEntry>, CoreError> {
        let things: Vec<CommentThing> = if placeholder.is_continue_thread() {
            let parent = placeholder
                .parent_id
                .strip_prefix("t1_")
                .unwrap_or(&placeholder.parent_id);
            self.with_token(|token| async move {
                self.api.get_comments(&token, &item.id, Some(parent)).await
            })
            .await?
        } else {
            self.with_token(|token| async move {
                self.api
                    .get_more_children(&token, &item.name, &placeholder.children)
                    .await
            })
            .await?
        };
        Ok(flatten_comments(things))
    }
}
