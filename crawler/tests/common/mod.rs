#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use wordcount_core::{
    CommentEntry, CommentNode, ContainerInfo, CoreError, ItemHandle, ListingCursor,
    ListingSource, MorePlaceholder, RedditApiError,
};

pub fn post(id: &str, author: Option<&str>, body: &str, num_comments: u64) -> ItemHandle {
    ItemHandle {
        id: id.to_string(),
        name: format!("t3_{id}"),
        author: author.map(str::to_string),
        body: body.to_string(),
        is_self: true,
        num_comments,
    }
}

pub fn link_post(id: &str, author: Option<&str>, num_comments: u64) -> ItemHandle {
    ItemHandle {
        is_self: false,
        ..post(id, author, "", num_comments)
    }
}

pub fn comment(id: &str, author: Option<&str>, body: &str) -> CommentEntry {
    CommentEntry::Comment(CommentNode {
        id: id.to_string(),
        author: author.map(str::to_string),
        body: body.to_string(),
    })
}

pub fn more(id: &str, parent_id: &str, children: &[&str]) -> CommentEntry {
    CommentEntry::More(MorePlaceholder {
        id: id.to_string(),
        parent_id: parent_id.to_string(),
        children: children.iter().map(|c| c.to_string()).collect(),
        count: children.len() as u64,
    })
}

/// How `list_page` answers once the scripted pages run out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageMode {
    /// Scripted pages, then empty pages.
    Scripted,
    /// Always a full page of never-before-seen posts.
    Endless,
}

pub struct MemorySource {
    pub pages: Vec<Vec<ItemHandle>>,
    pub mode: PageMode,
    pub comments: HashMap<String, Vec<CommentEntry>>,
    pub placeholders: HashMap<String, Vec<CommentEntry>>,
    pub delays: HashMap<String, Duration>,
    pub failing_item: Option<String>,
    pub failing_page: Option<u32>,
    pub page_requests: AtomicU32,
    pub placeholder_requests: AtomicU32,
    pub cursors: Mutex<Vec<ListingCursor>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            mode: PageMode::Scripted,
            comments: HashMap::new(),
            placeholders: HashMap::new(),
            delays: HashMap::new(),
            failing_item: None,
            failing_page: None,
            page_requests: AtomicU32::new(0),
            placeholder_requests: AtomicU32::new(0),
            cursors: Mutex::new(Vec::new()),
        }
    }

    pub fn with_pages(mut self, pages: Vec<Vec<ItemHandle>>) -> Self {
        self.pages = pages;
        self
    }

    pub fn endless(mut self) -> Self {
        self.mode = PageMode::Endless;
        self
    }

    pub fn with_comments(mut self, item_id: &str, entries: Vec<CommentEntry>) -> Self {
        self.comments.insert(item_id.to_string(), entries);
        self
    }

    pub fn with_placeholder(mut self, key: &str, entries: Vec<CommentEntry>) -> Self {
        self.placeholders.insert(key.to_string(), entries);
        self
    }

    pub fn with_delay(mut self, item_id: &str, delay: Duration) -> Self {
        self.delays.insert(item_id.to_string(), delay);
        self
    }

    pub fn failing_on(mut self, item_id: &str) -> Self {
        self.failing_item = Some(item_id.to_string());
        self
    }

    pub fn failing_on_page(mut self, page: u32) -> Self {
        self.failing_page = Some(page);
        self
    }

    pub fn page_requests(&self) -> u32 {
        self.page_requests.load(Ordering::SeqCst)
    }

    pub fn placeholder_requests(&self) -> u32 {
        self.placeholder_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListingSource for MemorySource {
    async fn resolve_container(&self, name: &str) -> Result<ContainerInfo, CoreError> {
        if name == "missing" {
            return Err(CoreError::RedditApi(RedditApiError::SubredditNotFound {
                subreddit: name.to_string(),
            }));
        }
        Ok(ContainerInfo {
            name: name.to_lowercase(),
            display_name: name.to_string(),
        })
    }

    async fn list_page(
        &self,
        _container: &str,
        cursor: &ListingCursor,
        page_size: u32,
    ) -> Result<Vec<ItemHandle>, CoreError> {
        let index = self.page_requests.fetch_add(1, Ordering::SeqCst);
        self.cursors.lock().unwrap().push(cursor.clone());

        if self.failing_page == Some(index) {
            return Err(CoreError::RedditApi(RedditApiError::ServerError {
                status_code: 503,
            }));
        }

        match self.mode {
            PageMode::Scripted => Ok(self.pages.get(index as usize).cloned().unwrap_or_default()),
            PageMode::Endless => Ok((0..page_size as u64)
                .map(|offset| {
                    let id = format!("p{}", cursor.count + offset);
                    post(&id, Some("someone"), "", 0)
                })
                .collect()),
        }
    }

    async fn comment_tree(&self, item: &ItemHandle) -> Result<Vec<CommentEntry>, CoreError> {
        if let Some(delay) = self.delays.get(&item.id) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_item.as_deref() == Some(item.id.as_str()) {
            return Err(CoreError::RedditApi(RedditApiError::RequestTimeout));
        }
        Ok(self.comments.get(&item.id).cloned().unwrap_or_default())
    }

    async fn resolve_placeholder(
        &self,
        _item: &ItemHandle,
        placeholder: &MorePlaceholder,
    ) -> Result<Vec<CommentEntry>, CoreError> {
        self.placeholder_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .placeholders
            .get(&placeholder.key())
            .cloned()
            .unwrap_or_default())
    }
}
