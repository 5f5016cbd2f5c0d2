use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Reddit API error: {0}")]
    RedditApi(#[from] RedditApiError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Operation timeout after {after:?}")]
    Timeout { after: std::time::Duration },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Search task failed for {item}: {source}")]
    TaskFailed {
        item: String,
        #[source]
        source: Box<CoreError>,
    },
}

#[derive(Error, Debug, Clone)]
pub enum RedditApiError {
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Forbidden access to resource: {resource}")]
    Forbidden { resource: String },

    #[error("Subreddit not found: {subreddit}")]
    SubredditNotFound { subreddit: String },

    #[error("Post not found: {post_id}")]
    PostNotFound { post_id: String },

    #[error("Invalid OAuth token")]
    InvalidToken,

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}

impl CoreError {
    /// Unwraps a `TaskFailed` wrapper down to the error that caused it.
    pub fn root_cause(&self) -> &CoreError {
        match self {
            CoreError::TaskFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
