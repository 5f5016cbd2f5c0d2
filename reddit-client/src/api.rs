use crate::models::{
    CommentThing, MoreChildrenResponse, RedditListing, RedditListingChild, RedditPostData,
    RedditSubredditData,
};
use crate::rate_limiter::{RateLimitConfig, RateLimiter};
use reqwest::{Client, Method, Response, StatusCode};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use wordcount_core::{CoreError, RedditApiError};

pub const REDDIT_API_BASE: &str = "https://oauth.reddit.com";

/// `morechildren` accepts at most this many ids per call.
pub const MORE_CHILDREN_BATCH: usize = 100;

#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    rate_limiter: RateLimiter,
    base_url: String,
}

impl RedditApiClient {
    pub fn new(http_client: Client) -> Self {
        Self::with_base_url(http_client, REDDIT_API_BASE.to_string())
    }

    pub fn with_base_url(http_client: Client, base_url: String) -> Self {
        Self {
            http_client,
            rate_limiter: RateLimiter::new(RateLimitConfig::reddit_oauth()),
            base_url,
        }
    }

    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: &[(&str, &str)],
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let start_time = Instant::now();

        let permit = self.rate_limiter.acquire_permit().await?;
        debug!(
            "Acquired rate limit permit for {} {} after {:?}",
            method, endpoint, permit.queue_wait_time
        );

        let request_builder = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(access_token)
            .query(&[("raw_json", "1")])
            .query(query_params);

        debug!("Making Reddit API request: {} {}", method, endpoint);
        let response = match request_builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for {} {}: {}", method, endpoint, e);
                if e.is_timeout() {
                    return Err(CoreError::RedditApi(RedditApiError::RequestTimeout));
                }
                return Err(CoreError::Network(e));
            }
        };

        let status = response.status();
        debug!(
            "{} {} answered {} in {:?}",
            method,
            endpoint,
            status,
            start_time.elapsed()
        );
        if status.is_success() {
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, endpoint);
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|value| value.to_str().ok());
        Err(status_error(status, retry_after, endpoint))
    }

    pub async fn get_subreddit_info(
        &self,
        access_token: &str,
        subreddit: &str,
    ) -> Result<RedditSubredditData, CoreError> {
        let endpoint = format!("/r/{}/about", subreddit);
        let not_found = || {
            CoreError::RedditApi(RedditApiError::SubredditNotFound {
                subreddit: subreddit.to_string(),
            })
        };

        let response = match self
            .make_request(Method::GET, &endpoint, access_token, &[])
            .await
        {
            Ok(response) => response,
            Err(CoreError::NotFound { .. }) => return Err(not_found()),
            Err(e) => return Err(e),
        };

        let about: serde_json::Value = response.json().await.map_err(|e| {
            error!("Failed to parse subreddit info: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse info for r/{}", subreddit),
            })
        })?;

        let subreddit_data = parse_subreddit_about(about).ok_or_else(not_found)?;
        debug!("Retrieved info for r/{}", subreddit_data.display_name);
        Ok(subreddit_data)
    }

    /// One page of `/r/{subreddit}/new`, newest first.
    pub async fn get_new_posts(
        &self,
        access_token: &str,
        subreddit: &str,
        after: Option<&str>,
        count: u64,
        limit: u32,
    ) -> Result<RedditListing<RedditListingChild<RedditPostData>>, CoreError> {
        let endpoint = format!("/r/{}/new", subreddit);
        let count_str = count.to_string();
        let limit_str = limit.to_string();
        let mut params = vec![("limit", limit_str.as_str()), ("count", count_str.as_str())];
        if let Some(after_val) = after {
            params.push(("after", after_val));
        }

        let response = self
            .make_request(Method::GET, &endpoint, access_token, &params)
            .await?;

        let listing: RedditListing<RedditListingChild<RedditPostData>> =
            response.json().await.map_err(|e| {
                error!("Failed to parse subreddit posts: {}", e);
                CoreError::RedditApi(RedditApiError::InvalidResponse {
                    details: format!("Failed to parse posts for r/{}", subreddit),
                })
            })?;

        info!(
            "Retrieved {} posts from r/{}",
            listing.data.children.len(),
            subreddit
        );
        Ok(listing)
    }

    /// Comment tree of a post. With `focus_comment` set, the tree is rooted at
    /// that comment instead, which is how "continue this thread" stubs expand.
    pub async fn get_comments(
        &self,
        access_token: &str,
        article_id: &str,
        focus_comment: Option<&str>,
    ) -> Result<Vec<CommentThing>, CoreError> {
        let endpoint = format!("/comments/{}", article_id);
        let mut params = vec![("limit", "500"), ("sort", "new")];
        if let Some(comment_id) = focus_comment {
            params.push(("comment", comment_id));
        }

        let response = match self
            .make_request(Method::GET, &endpoint, access_token, &params)
            .await
        {
            Ok(response) => response,
            Err(CoreError::NotFound { .. }) => {
                return Err(CoreError::RedditApi(RedditApiError::PostNotFound {
                    post_id: article_id.to_string(),
                }))
            }
            Err(e) => return Err(e),
        };

        let (_post, comments): (serde_json::Value, RedditListing<CommentThing>) =
            response.json().await.map_err(|e| {
                error!("Failed to parse comments of {}: {}", article_id, e);
                CoreError::RedditApi(RedditApiError::InvalidResponse {
                    details: format!("Failed to parse comments for {}", article_id),
                })
            })?;

        Ok(comments.data.children)
    }

    /// Resolves "load more" ids, batching to the endpoint's limit.
    pub async fn get_more_children(
        &self,
        access_token: &str,
        link_name: &str,
        children: &[String],
    ) -> Result<Vec<CommentThing>, CoreError> {
        let mut things = Vec::new();

        for batch in children.chunks(MORE_CHILDREN_BATCH) {
            let ids = batch.join(",");
            let params = [
                ("api_type", "json"),
                ("link_id", link_name),
                ("children", ids.as_str()),
                ("limit_children", "false"),
            ];

            let response = self
                .make_request(Method::GET, "/api/morechildren", access_token, &params)
                .await?;

            let parsed: MoreChildrenResponse = response.json().await.map_err(|e| {
                error!("Failed to parse morechildren for {}: {}", link_name, e);
                CoreError::RedditApi(RedditApiError::InvalidResponse {
                    details: format!("Failed to parse more comments for {}", link_name),
                })
            })?;

            if !parsed.json.errors.is_empty() {
                return Err(CoreError::RedditApi(RedditApiError::InvalidResponse {
                    details: format!("morechildren errors: {:?}", parsed.json.errors),
                }));
            }
            if let Some(data) = parsed.json.data {
                things.extend(data.things);
            }
        }

        debug!(
            "Resolved {} more ids into {} things for {}",
            children.len(),
            things.len(),
            link_name
        );
        Ok(things)
    }
}

/// `/about` answers with a `t5` thing for real subreddits. Unknown names may
/// come back as an empty search listing instead of a 404.
pub fn parse_subreddit_about(value: serde_json::Value) -> Option<RedditSubredditData> {
    let child: RedditListingChild<serde_json::Value> = serde_json::from_value(value).ok()?;
    if child.kind != "t5" {
        return None;
    }
    serde_json::from_value(child.data).ok()
}

/// Maps a non-success status to the error the rest of the crate understands.
/// Redirects mean Reddit sent us to a search page, so they count as missing.
pub fn status_error(status: StatusCode, retry_after: Option<&str>, endpoint: &str) -> CoreError {
    match status.as_u16() {
        429 => {
            let retry_after = retry_after
                .and_then(|value| value.trim().parse::<u64>().ok())
                .unwrap_or(60);
            warn!("Rate limited, retry after {} seconds", retry_after);
            CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after })
        }
        401 => CoreError::RedditApi(RedditApiError::InvalidToken),
        403 => CoreError::RedditApi(RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        }),
        404 => CoreError::NotFound {
            resource: endpoint.to_string(),
        },
        code if status.is_redirection() => {
            debug!("{} redirected ({}), treating as missing", endpoint, code);
            CoreError::NotFound {
                resource: endpoint.to_string(),
            }
        }
        code if status.is_server_error() => {
            CoreError::RedditApi(RedditApiError::ServerError { status_code: code })
        }
        code => CoreError::RedditApi(RedditApiError::InvalidResponse {
            details: format!("unexpected status {} for {}", code, endpoint),
        }),
    }
}
