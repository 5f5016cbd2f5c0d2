mod report;
mod search;

use anyhow::Context;
use crawler::Needle;
use dialoguer::{Confirm, Input};
use reddit_client::{RedditClient, RedditOAuth2Config};
use report::{report_file_name, Report};
use std::path::Path;
use tracing_subscriber::EnvFilter;
use wordcount_core::{AppConfig, CoreError, ErrorExt, ErrorReporter, ListingSource};

const DEFAULT_LOG_FILTER: &str = "wordcount=warn,crawler=warn,reddit_client=warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    println!(
        "Word Counter bot for Reddit: version {}",
        env!("CARGO_PKG_VERSION")
    );

    let reporter = ErrorReporter::new();
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            let error = CoreError::from(e);
            reporter.report_error(&error);
            println!("Error: {}", error.user_friendly_message());
            wait_for_enter();
            std::process::exit(1);
        }
    };

    let client = RedditClient::new(RedditOAuth2Config::new(
        config.reddit.client_id.clone(),
        config.reddit.client_secret.clone(),
        config.reddit.user_agent.clone(),
    ))
    .context("failed to set up the Reddit client")?;
    tracing::info!("Starting Wordcount as {}", client.user_agent());

    println!(
        "Search the {} most recent posts of a subreddit in order to find who has said some word or sentence the most.",
        config.search.page_limit as u64 * config.search.max_pages as u64
    );

    loop {
        let subreddit: String = Input::new()
            .with_prompt("Subreddit to search: r/")
            .interact_text()?;

        let container = match client.resolve_container(subreddit.trim()).await {
            Ok(container) => container,
            Err(e) => {
                reporter.report_error(&e);
                println!("Error: {}", e.user_friendly_message());
                continue;
            }
        };

        let needle: String = Input::new()
            .with_prompt("Text to search")
            .interact_text()?;
        let needle = match Needle::new(&needle) {
            Ok(needle) => needle,
            Err(e) => {
                println!("Error: {}", e.user_friendly_message());
                continue;
            }
        };
        let needle = needle.as_str();

        match search::run_search(&client, &container, needle, &config.search).await {
            Ok(tally) => {
                println!("Search complete! Results:");
                let report = Report::new(needle, &tally, chrono::Local::now());
                print!("{}", report.render_terminal());

                let file_name = report_file_name(&container.display_name);
                match report.append_to(Path::new(&file_name)) {
                    Ok(()) => println!(
                        "Search finished. Full results were saved to {}",
                        file_name
                    ),
                    Err(e) => {
                        let error = CoreError::from(e);
                        reporter.report_error(&error);
                        println!("Error: could not write {}: {}", file_name, error);
                    }
                }
            }
            Err(e) => {
                reporter.report_error(&e);
                println!("Error: {}", e.user_friendly_message());
            }
        }

        let again = Confirm::new()
            .with_prompt("Do you want to perform another search?")
            .default(true)
            .interact()?;
        if !again {
            println!("Closing program... Have a nice day!");
            break;
        }
    }

    Ok(())
}

fn wait_for_enter() {
    let _ = Input::<String>::new()
        .with_prompt("Press ENTER to exit program")
        .allow_empty(true)
        .interact_text();
}
