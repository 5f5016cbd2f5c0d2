use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Position inside a paged listing: the fullname of the last item seen plus
/// how many items were returned so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingCursor {
    pub after: Option<String>,
    pub count: u64,
}

impl ListingCursor {
    pub fn advance(&mut self, item_name: &str) {
        self.count += 1;
        self.after = Some(item_name.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    pub name: String,
    pub display_name: String,
}

/// One post of a listing. Identity is the fullname (`t3_<id>`), so the same
/// post returned on two overlapping pages compares equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemHandle {
    pub id: String,
    pub name: String,
    /// `None` for deleted or anonymized accounts.
    pub author: Option<String>,
    pub body: String,
    pub is_self: bool,
    pub num_comments: u64,
}

impl PartialEq for ItemHandle {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ItemHandle {}

impl Hash for ItemHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentNode {
    pub id: String,
    pub author: Option<String>,
    pub body: String,
}

/// A "load more comments" stand-in. An empty `children` list means the
/// thread continues under `parent_id` and has to be fetched from there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorePlaceholder {
    pub id: String,
    pub parent_id: String,
    pub children: Vec<String>,
    pub count: u64,
}

impl MorePlaceholder {
    pub fn is_continue_thread(&self) -> bool {
        self.children.is_empty()
    }

    /// Stable key for "already expanded" bookkeeping. Continue-thread stubs
    /// all share the same id, so they are keyed by their parent instead.
    pub fn key(&self) -> String {
        if self.is_continue_thread() {
            format!("continue:{}", self.parent_id)
        } else {
            self.id.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentEntry {
    Comment(CommentNode),
    More(MorePlaceholder),
}

/// Occurrence counts keyed by author name. Only non-zero counts are stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorTally {
    counts: HashMap<String, u64>,
}

impl AuthorTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, author: &str, occurrences: u64) {
        if occurrences == 0 {
            return;
        }
        *self.counts.entry(author.to_string()).or_insert(0) += occurrences;
    }

    pub fn merge(&mut self, other: AuthorTally) {
        for (author, occurrences) in other.counts {
            *self.counts.entry(author).or_insert(0) += occurrences;
        }
    }

    pub fn get(&self, author: &str) -> u64 {
        self.counts.get(author).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Authors by count descending; equal counts are ordered by author name.
    pub fn ranked(&self) -> Vec<(String, u64)> {
        let mut ranked: Vec<(String, u64)> = self
            .counts
            .iter()
            .map(|(author, count)| (author.clone(), *count))
            .collect();
        ranked.sort_by(|a, b| match b.1.cmp(&a.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });
        ranked
    }
}

impl FromIterator<(String, u64)> for AuthorTally {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut tally = AuthorTally::new();
        for (author, occurrences) in iter {
            tally.add(&author, occurrences);
        }
        tally
    }
}
