use async_trait::async_trait;
use oauth2::basic::BasicClient;
use oauth2::{
    AuthType, AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, RequestTokenError,
    Scope, TokenResponse, TokenUrl,
};
use reqwest::Client;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use std::future::Future;
use tracing::{debug, info, warn};
use wordcount_core::{CoreError, RedditApiError};

const REDDIT_AUTH_URL: &str = "https://www.reddit.com/api/v1/authorize";
const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Tokens are refreshed this long before Reddit says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RedditOAuth2Config {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl RedditOAuth2Config {
    pub fn new(client_id: String, client_secret: String, user_agent: String) -> Self {
        Self {
            client_id,
            client_secret,
            user_agent,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: SystemTime,
}

impl RedditToken {
    pub fn is_expired(&self) -> bool {
        SystemTime::now() + EXPIRY_MARGIN >= self.expires_at
    }
}

/// Hands out bearer tokens and forgets them once Reddit rejects one.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, CoreError>;
    async fn invalidate(&self);
}

/// Runs `call` with a bearer token; a rejected token is refreshed once.
pub async fn with_fresh_token<S, T, F, Fut>(tokens: &S, call: F) -> Result<T, CoreError>
where
    S: TokenSource + ?Sized,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T, CoreError>>,
{
    let token = tokens.access_token().await?;
    match call(token).await {
        Err(CoreError::RedditApi(RedditApiError::InvalidToken)) => {
            warn!("Access token rejected, authenticating again");
            tokens.invalidate().await;
            let token = tokens.access_token().await?;
            call(token).await
        }
        other => other,
    }
}

/// Application-only OAuth2 (client credentials grant). Read access to public
/// listings needs no user login.
#[derive(Debug)]
pub struct AppOnlyAuthenticator {
    oauth_client: BasicClient,
    http_client: Client,
    token: Mutex<Option<RedditToken>>,
}

impl AppOnlyAuthenticator {
    pub fn new(config: &RedditOAuth2Config, http_client: Client) -> Result<Self, CoreError> {
        let auth_url = AuthUrl::new(REDDIT_AUTH_URL.to_string()).map_err(|e| {
            CoreError::Internal {
                message: format!("invalid auth url: {e}"),
            }
        })?;
        let token_url = TokenUrl::new(REDDIT_TOKEN_URL.to_string()).map_err(|e| {
            CoreError::Internal {
                message: format!("invalid token url: {e}"),
            }
        })?;

        let oauth_client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            auth_url,
            Some(token_url),
        )
        .set_auth_type(AuthType::BasicAuth);

        Ok(Self {
            oauth_client,
            http_client,
            token: Mutex::new(None),
        })
    }

    async fn request_token(&self) -> Result<RedditToken, CoreError> {
        let response = self
            .oauth_client
            .exchange_client_credentials()
            .add_scope(Scope::new("read".to_string()))
            .request_async(|request| send_oauth_request(&self.http_client, request))
            .await
            .map_err(|e| {
                let reason = match e {
                    RequestTokenError::ServerResponse(response) => response.error().to_string(),
                    RequestTokenError::Request(e) => e.to_string(),
                    RequestTokenError::Parse(e, _) => e.to_string(),
                    RequestTokenError::Other(e) => e,
                };
                CoreError::RedditApi(RedditApiError::AuthenticationFailed { reason })
            })?;

        let lifetime = response
            .expires_in()
            .unwrap_or(Duration::from_secs(3600));
        info!("Obtained Reddit application token valid for {:?}", lifetime);

        Ok(RedditToken {
            access_token: response.access_token().secret().clone(),
            expires_at: SystemTime::now() + lifetime,
        })
    }
}

#[async_trait]
impl TokenSource for AppOnlyAuthenticator {
    /// Returns a valid bearer token, fetching a new one when needed.
    async fn access_token(&self) -> Result<String, CoreError> {
        let mut token = self.token.lock().await;
        if let Some(current) = token.as_ref() {
            if !current.is_expired() {
                return Ok(current.access_token.clone());
            }
            debug!("Access token expired, requesting a new one");
        }

        let fresh = self.request_token().await?;
        let access_token = fresh.access_token.clone();
        *token = Some(fresh);
        Ok(access_token)
    }

    /// Drops the cached token so the next request authenticates again.
    async fn invalidate(&self) {
        *self.token.lock().await = None;
    }
}

/// Sends the token request through the shared client so it carries our User-Agent.
async fn send_oauth_request(
    http_client: &Client,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let response = http_client
        .request(request.method, request.url.as_str())
        .headers(request.headers)
        .body(request.body)
        .send()
        .await?;

    let status_code = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}
