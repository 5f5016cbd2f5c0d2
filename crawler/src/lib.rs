//! Paging and counting engine behind the word-count search.
//!
//! A search runs in two sequential phases: [`PageCollector`] walks the
//! listing of a community and deduplicates posts, then [`FanoutCounter`]
//! scans every post and its fully expanded comment tree on a bounded pool
//! of concurrent tasks, merging per-post tallies into one [`AuthorTally`].

pub mod collector;
pub mod expand;
pub mod fanout;
pub mod needle;
pub mod progress;

pub use collector::{Collection, CollectorConfig, PageCollector};
pub use expand::expand_all_comments;
pub use fanout::{FanoutConfig, FanoutCounter};
pub use needle::Needle;
pub use progress::ProgressTracker;
pub use wordcount_core::AuthorTally;
