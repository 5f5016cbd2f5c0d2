use crawler::{CollectorConfig, FanoutConfig, FanoutCounter, PageCollector, ProgressTracker};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;
use wordcount_core::{AuthorTally, ContainerInfo, CoreError, ListingSource, SearchConfig};

/// Percent values are rendered on a bar of this many steps (two decimals).
const BAR_STEPS: u64 = 10_000;

pub fn collector_config(settings: &SearchConfig) -> CollectorConfig {
    CollectorConfig {
        page_limit: settings.page_limit,
        max_pages: settings.max_pages,
    }
}

pub fn fanout_config(settings: &SearchConfig) -> FanoutConfig {
    FanoutConfig {
        workers: settings.workers,
        task_timeout: settings.task_timeout(),
    }
}

/// Collects the recent posts of `container` and counts `needle` in them,
/// drawing both phases on the terminal.
pub async fn run_search<S: ListingSource + ?Sized>(
    source: &S,
    container: &ContainerInfo,
    needle: &str,
    settings: &SearchConfig,
) -> Result<AuthorTally, CoreError> {
    let max_posts = settings.page_limit as u64 * settings.max_pages as u64;
    println!(
        "Fetching the list of recent posts on r/{} (up to {} posts)...",
        container.display_name, max_posts
    );

    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(120));
    let collection = PageCollector::new(source, collector_config(settings))
        .on_page(|items, children| {
            spinner.set_message(format!("{} posts found ({} comments)", items, children));
        })
        .collect(&container.name)
        .await;
    let collection = match collection {
        Ok(collection) => {
            spinner.finish_with_message(format!(
                "{} posts found ({} comments)",
                collection.total_items, collection.total_children
            ));
            collection
        }
        Err(e) => {
            spinner.abandon_with_message("Fetching posts failed");
            return Err(e);
        }
    };

    println!(
        "Searching for '{}' in the content of posts... Please be patient.",
        needle
    );
    let progress = ProgressTracker::new(collection.denominator());
    let bar = counting_bar();
    let renderer = tokio::spawn(render_progress(progress.subscribe(), bar.clone()));

    let result = FanoutCounter::new(source, fanout_config(settings))
        .count_all(&collection.items, needle, &progress)
        .await;

    match &result {
        Ok(tally) => {
            // The renderer stops on its own once 100% has been published.
            let _ = renderer.await;
            bar.finish_with_message("done");
            info!(
                "r/{}: {} authors mentioned '{}'",
                container.name,
                tally.len(),
                needle
            );
        }
        Err(_) => {
            renderer.abort();
            bar.abandon_with_message("search aborted");
        }
    }
    result
}

fn counting_bar() -> ProgressBar {
    let bar = ProgressBar::new(BAR_STEPS);
    let style = ProgressStyle::with_template("Progress: {msg:>7} [{bar:40.cyan/blue}]")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar.set_message("0.00%");
    bar
}

async fn render_progress(mut receiver: watch::Receiver<f64>, bar: ProgressBar) {
    while receiver.changed().await.is_ok() {
        let percent = *receiver.borrow_and_update();
        bar.set_position((percent * 100.0).round() as u64);
        bar.set_message(format!("{:.2}%", percent));
        if percent >= 100.0 {
            break;
        }
    }
}
