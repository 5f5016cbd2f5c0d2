mod common;

use common::{post, MemorySource};
use crawler::{CollectorConfig, PageCollector};
use std::sync::atomic::{AtomicU64, Ordering};
use wordcount_core::{CoreError, ErrorExt};

#[tokio::test]
async fn test_overlapping_pages_are_deduplicated() {
    let source = MemorySource::new().with_pages(vec![
        vec![post("a", Some("x"), "", 1), post("b", Some("x"), "", 2), post("c", Some("x"), "", 0)],
        vec![post("c", Some("x"), "", 0), post("d", Some("y"), "", 3)],
    ]);

    let collection = PageCollector::new(&source, CollectorConfig::default())
        .collect("rust")
        .await
        .unwrap();

    let names: Vec<&str> = collection.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["t3_a", "t3_b", "t3_c", "t3_d"]);
    // Running totals count what the listing returned, repeats included.
    assert_eq!(collection.total_items, 5);
    assert_eq!(collection.total_children, 6);
    assert!(collection.items.len() as u64 <= collection.total_items);
    // Two scripted pages, then the empty page that ends the walk.
    assert_eq!(source.page_requests(), 3);
    assert_eq!(collection.pages_fetched, 3);
}

#[tokio::test]
async fn test_never_exceeds_max_pages() {
    let source = MemorySource::new().endless();

    let collection = PageCollector::new(&source, CollectorConfig::default())
        .collect("rust")
        .await
        .unwrap();

    assert_eq!(source.page_requests(), 10);
    assert_eq!(collection.items.len(), 1000);
    assert_eq!(collection.total_items, 1000);
}

#[tokio::test]
async fn test_custom_page_cap() {
    let source = MemorySource::new().endless();
    let config = CollectorConfig {
        page_limit: 25,
        max_pages: 3,
    };

    let collection = PageCollector::new(&source, config)
        .collect("rust")
        .await
        .unwrap();

    assert_eq!(source.page_requests(), 3);
    assert_eq!(collection.items.len(), 75);
}

#[tokio::test]
async fn test_stops_on_empty_page() {
    let source = MemorySource::new().with_pages(vec![
        vec![post("a", Some("x"), "", 0)],
        vec![],
        vec![post("never", Some("x"), "", 0)],
    ]);

    let collection = PageCollector::new(&source, CollectorConfig::default())
        .collect("rust")
        .await
        .unwrap();

    assert_eq!(source.page_requests(), 2);
    assert_eq!(collection.items.len(), 1);
}

#[tokio::test]
async fn test_stops_when_page_repeats_known_posts() {
    let source = MemorySource::new().with_pages(vec![
        vec![post("a", Some("x"), "", 0), post("b", Some("x"), "", 0)],
        vec![post("a", Some("x"), "", 0), post("b", Some("x"), "", 0)],
        vec![post("c", Some("x"), "", 0)],
    ]);

    let collection = PageCollector::new(&source, CollectorConfig::default())
        .collect("rust")
        .await
        .unwrap();

    assert_eq!(source.page_requests(), 2);
    assert_eq!(collection.items.len(), 2);
}

#[tokio::test]
async fn test_empty_listing() {
    let source = MemorySource::new();

    let collection = PageCollector::new(&source, CollectorConfig::default())
        .collect("quiet")
        .await
        .unwrap();

    assert!(collection.items.is_empty());
    assert_eq!(collection.total_items, 0);
    assert_eq!(collection.total_children, 0);
    assert_eq!(collection.denominator(), 1);
    assert_eq!(source.page_requests(), 1);
}

#[tokio::test]
async fn test_cursor_follows_last_item() {
    let source = MemorySource::new().with_pages(vec![
        vec![post("a", Some("x"), "", 0), post("b", Some("x"), "", 0)],
        vec![post("c", Some("x"), "", 0)],
    ]);

    PageCollector::new(&source, CollectorConfig::default())
        .collect("rust")
        .await
        .unwrap();

    let cursors = source.cursors.lock().unwrap().clone();
    assert_eq!(cursors.len(), 3);
    assert_eq!(cursors[0].after, None);
    assert_eq!(cursors[0].count, 0);
    assert_eq!(cursors[1].after.as_deref(), Some("t3_b"));
    assert_eq!(cursors[1].count, 2);
    assert_eq!(cursors[2].after.as_deref(), Some("t3_c"));
    assert_eq!(cursors[2].count, 3);
}

#[tokio::test]
async fn test_page_failure_aborts_collection() {
    let source = MemorySource::new()
        .endless()
        .failing_on_page(1);

    let result = PageCollector::new(&source, CollectorConfig::default())
        .collect("rust")
        .await;

    match result {
        Err(error @ CoreError::RedditApi(_)) => assert!(error.is_retryable()),
        other => panic!("expected a Reddit API error, got {:?}", other.map(|c| c.items.len())),
    }
    assert_eq!(source.page_requests(), 2);
}

#[tokio::test]
async fn test_page_callback_reports_running_totals() {
    let source = MemorySource::new().with_pages(vec![
        vec![post("a", Some("x"), "", 4)],
        vec![post("b", Some("x"), "", 1)],
    ]);
    let last_items = AtomicU64::new(0);
    let last_children = AtomicU64::new(0);

    PageCollector::new(&source, CollectorConfig::default())
        .on_page(|items, children| {
            last_items.store(items, Ordering::SeqCst);
            last_children.store(children, Ordering::SeqCst);
        })
        .collect("rust")
        .await
        .unwrap();

    assert_eq!(last_items.load(Ordering::SeqCst), 2);
    assert_eq!(last_children.load(Ordering::SeqCst), 5);
}
