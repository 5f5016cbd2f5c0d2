use serde::{Deserialize, Serialize};
use wordcount_core::{CommentEntry, CommentNode, ItemHandle, MorePlaceholder};

/// Author name Reddit reports for removed accounts.
const DELETED_AUTHOR: &str = "[deleted]";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<T>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    pub author: Option<String>,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub num_comments: u64,
    #[serde(default)]
    pub is_self: bool,
    #[serde(default)]
    pub created_utc: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditSubredditData {
    pub id: String,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub subreddit_type: Option<String>,
    #[serde(default)]
    pub subscribers: Option<u64>,
}

/// A node of a comment listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum CommentThing {
    #[serde(rename = "t1")]
    Comment(RedditCommentData),
    #[serde(rename = "more")]
    More(RedditMoreData),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditCommentData {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub author: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub parent_id: String,
    #[serde(default)]
    pub replies: Replies,
}

/// Reddit sends an empty string instead of a listing when a comment has no replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Replies {
    Listing(Box<RedditListing<CommentThing>>),
    Empty(String),
}

impl Default for Replies {
    fn default() -> Self {
        Replies::Empty(String::new())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditMoreData {
    pub id: String,
    pub parent_id: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub children: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoreChildrenResponse {
    pub json: MoreChildrenJson,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoreChildrenJson {
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
    pub data: Option<MoreChildrenData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoreChildrenData {
    #[serde(default)]
    pub things: Vec<CommentThing>,
}

pub(crate) fn author_name(author: Option<String>) -> Option<String> {
    author.filter(|name| !name.is_empty() && name != DELETED_AUTHOR)
}

impl From<RedditPostData> for ItemHandle {
    fn from(post_data: RedditPostData) -> Self {
        Self {
            id: post_data.id,
            name: post_data.name,
            author: author_name(post_data.author),
            body: post_data.selftext,
            is_self: post_data.is_self,
            num_comments: post_data.num_comments,
        }
    }
}

impl From<RedditMoreData> for MorePlaceholder {
    fn from(more: RedditMoreData) -> Self {
        Self {
            id: more.id,
            parent_id: more.parent_id,
            children: more.children,
            count: more.count,
        }
    }
}

/// Flattens comment things depth-first, keeping placeholders as entries.
pub fn flatten_comments(things: Vec<CommentThing>) -> Vec<CommentEntry> {
    let mut entries = Vec::new();
    let mut stack: Vec<CommentThing> = things.into_iter().rev().collect();

    while let Some(thing) = stack.pop() {
        match thing {
            CommentThing::Comment(comment) => {
                if let Replies::Listing(listing) = comment.replies {
                    stack.extend(listing.data.children.into_iter().rev());
                }
                entries.push(CommentEntry::Comment(CommentNode {
                    id: comment.id,
                    author: author_name(comment.author),
                    body: comment.body,
                }));
            }
            CommentThing::More(more) => entries.push(CommentEntry::More(more.into())),
        }
    }

    entries
}
