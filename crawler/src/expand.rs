use std::collections::{HashSet, VecDeque};
use tracing::{debug, trace};
use wordcount_core::{
    CommentEntry, CommentNode, CoreError, ItemHandle, ListingSource, MorePlaceholder,
};

/// Fetches every comment of `item`, resolving "load more" placeholders
/// until none are left. Hierarchy is dropped; each comment appears once.
///
/// Placeholders are worked off a queue rather than by recursion, and each
/// one is resolved at most once.
pub async fn expand_all_comments<S: ListingSource + ?Sized>(
    source: &S,
    item: &ItemHandle,
) -> Result<Vec<CommentNode>, CoreError> {
    let mut expansion = Expansion::default();
    expansion.absorb(source.comment_tree(item).await?);

    let mut resolved = 0usize;
    while let Some(placeholder) = expansion.pending.pop_front() {
        if !expansion.resolved.insert(placeholder.key()) {
            trace!("Skipping already expanded placeholder {}", placeholder.key());
            continue;
        }
        let entries = source.resolve_placeholder(item, &placeholder).await?;
        expansion.absorb(entries);
        resolved += 1;
    }

    debug!(
        "Expanded {} comments for {} ({} placeholders resolved)",
        expansion.comments.len(),
        item.name,
        resolved
    );
    Ok(expansion.comments)
}

#[derive(Default)]
struct Expansion {
    comments: Vec<CommentNode>,
    seen: HashSet<String>,
    pending: VecDeque<MorePlaceholder>,
    resolved: HashSet<String>,
}

impl Expansion {
    fn absorb(&mut self, entries: Vec<CommentEntry>) {
        for entry in entries {
            match entry {
                CommentEntry::Comment(comment) => {
                    if self.seen.insert(comment.id.clone()) {
                        self.comments.push(comment);
                    }
                }
                CommentEntry::More(placeholder) => {
                    if !self.resolved.contains(&placeholder.key()) {
                        self.pending.push_back(placeholder);
                    }
                }
            }
        }
    }
}
