use crate::error::*;
use tracing::{error, info};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    /// The machine could not reach Reddit at all (offline, DNS, timeouts).
    fn is_connectivity(&self) -> bool;
    /// Whether starting the same search again has a chance of succeeding.
    fn is_retryable(&self) -> bool;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self.root_cause() {
            CoreError::RedditApi(e) => {
                error!("Reddit API error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn is_connectivity(&self) -> bool {
        match self {
            CoreError::RedditApi(e) => e.is_connectivity(),
            CoreError::Network(_) => true,
            CoreError::TaskFailed { source, .. } => source.is_connectivity(),
            _ => false,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            CoreError::RedditApi(e) => e.is_retryable(),
            CoreError::Network(_) => true,
            CoreError::Timeout { .. } => true,
            CoreError::TaskFailed { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "You seem to be offline. Please connect to the internet and try again.".to_string()
            }
            CoreError::InvalidInput { message } => {
                format!("Invalid input: {}. Please check your input and try again.", message)
            }
            CoreError::Timeout { .. } => {
                "The search took too long to complete. Please try again.".to_string()
            }
            CoreError::NotFound { resource } => format!("Could not find: {}", resource),
            CoreError::TaskFailed { source, .. } => source.user_friendly_message(),
            _ => "An unexpected error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::RedditApi(_) => "REDDIT_API".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::Timeout { .. } => "TIMEOUT".to_string(),
            CoreError::NotFound { .. } => "NOT_FOUND".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
            CoreError::TaskFailed { .. } => "TASK_FAILED".to_string(),
        }
    }
}

impl ErrorExt for RedditApiError {
    fn log_error(&self) -> &Self {
        error!("RedditApiError: {}", self);
        self
    }

    fn is_connectivity(&self) -> bool {
        matches!(self, RedditApiError::RequestTimeout)
    }

    fn is_retryable(&self) -> bool {
        match self {
            RedditApiError::RateLimitExceeded { .. } => true,
            RedditApiError::RequestTimeout => true,
            RedditApiError::ServerError { status_code } => *status_code >= 500,
            RedditApiError::InvalidResponse { .. } => true,
            _ => false,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => {
                "Reddit rejected the configured credentials. Please check wordcount.toml."
                    .to_string()
            }
            RedditApiError::RateLimitExceeded { retry_after } => format!(
                "Too many requests. Please wait {} seconds before trying again.",
                retry_after
            ),
            RedditApiError::Forbidden { resource } => format!(
                "Access denied to {}. The subreddit may be private or quarantined.",
                resource
            ),
            RedditApiError::SubredditNotFound { .. } => {
                "Subreddit not found. Please check your spelling and try again.".to_string()
            }
            RedditApiError::PostNotFound { .. } => {
                "A post disappeared while it was being searched. Please try again.".to_string()
            }
            RedditApiError::InvalidToken => {
                "Reddit authentication token is invalid. Please check your credentials."
                    .to_string()
            }
            RedditApiError::RequestTimeout => {
                "Request to Reddit timed out. Please try again.".to_string()
            }
            _ => "Reddit API error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => "REDDIT_AUTH_FAILED".to_string(),
            RedditApiError::RateLimitExceeded { .. } => "REDDIT_RATE_LIMIT".to_string(),
            RedditApiError::Forbidden { .. } => "REDDIT_FORBIDDEN".to_string(),
            RedditApiError::SubredditNotFound { .. } => "REDDIT_SUBREDDIT_NOT_FOUND".to_string(),
            RedditApiError::PostNotFound { .. } => "REDDIT_POST_NOT_FOUND".to_string(),
            RedditApiError::InvalidToken => "REDDIT_INVALID_TOKEN".to_string(),
            RedditApiError::RequestTimeout => "REDDIT_TIMEOUT".to_string(),
            RedditApiError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE".to_string(),
            RedditApiError::ServerError { .. } => "REDDIT_SERVER_ERROR".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn is_connectivity(&self) -> bool {
        false
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => format!(
                "Configuration file '{}' not found. It should be on the same directory as the program.",
                path
            ),
            ConfigError::MissingField { field } => {
                format!("Required configuration field '{}' is missing.", field)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::Parse(_) => {
                "Configuration file could not be parsed. Please check its format.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::MissingField { .. } => "CONFIG_MISSING_FIELD".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

/// Logs failures at the binary edge before the user sees the friendly message.
#[derive(Debug, Default)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report_error(&self, error: &CoreError) {
        error.log_error();
        info!("Error code: {}", error.error_code());
        info!("User message: {}", error.user_friendly_message());
        if error.is_connectivity() {
            info!("Reddit could not be reached, check the network connection");
        } else if error.is_retryable() {
            info!("Error is transient, a new search may succeed");
        }
    }
}
