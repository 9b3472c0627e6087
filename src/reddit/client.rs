use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{RedditConfig, RedditCredentials};
use crate::error::{Result, SubfetchError};
use super::{PageKind, Submission, SubmissionSource};

const ANONYMOUS_BASE: &str = "https://www.reddit.com";
const OAUTH_BASE: &str = "https://oauth.reddit.com";
const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const LISTING_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    kind: String,
    data: Value,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_lifetime")]
    expires_in: u64,
}

fn default_token_lifetime() -> u64 {
    3600
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// Reddit API client.
///
/// Uses OAuth with a refresh token when credentials are configured and the
/// public JSON endpoints otherwise.
pub struct RedditClient {
    client: Client,
    credentials: Option<RedditCredentials>,
    token: Mutex<Option<AccessToken>>,
}

impl RedditClient {
    pub fn new(config: &RedditConfig, credentials: Option<RedditCredentials>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(SubfetchError::Http)?;

        if credentials.is_some() {
            info!("Reddit client using OAuth credentials");
        } else {
            info!("Reddit client using anonymous JSON endpoints");
        }

        Ok(Self {
            client,
            credentials,
            token: Mutex::new(None),
        })
    }

    /// Return a valid bearer token, refreshing it when expired
    async fn bearer(&self) -> Result<Option<String>> {
        let Some(credentials) = &self.credentials else {
            return Ok(None);
        };

        let mut token = self.token.lock().await;
        if let Some(current) = token.as_ref() {
            if current.expires_at > Instant::now() {
                return Ok(Some(current.value.clone()));
            }
        }

        debug!("Refreshing reddit access token");
        let response = self.client
            .post(TOKEN_URL)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", credentials.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SubfetchError::SourceUnavailable(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SubfetchError::SourceUnavailable(format!(
                "Token request rejected: HTTP {}",
                response.status()
            )));
        }

        let refreshed: TokenResponse = response.json().await
            .map_err(|e| SubfetchError::SourceUnavailable(format!("Failed to parse token response: {}", e)))?;

        // Refresh a minute early
        let lifetime = Duration::from_secs(refreshed.expires_in.saturating_sub(60));
        let value = refreshed.access_token;
        *token = Some(AccessToken {
            value: value.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(Some(value))
    }

    async fn get_json(&self, subreddit: &str, path: &str) -> Result<Value> {
        let bearer = self.bearer().await?;
        let url = match bearer {
            Some(_) => format!("{}/r/{}/{}", OAUTH_BASE, subreddit, path),
            None => format!("{}/r/{}/{}.json", ANONYMOUS_BASE, subreddit, path),
        };

        debug!("Requesting reddit endpoint: {}", url);

        let limit = LISTING_LIMIT.to_string();
        let mut request = self.client
            .get(&url)
            .query(&[("raw_json", "1"), ("limit", limit.as_str())]);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await
            .map_err(|e| SubfetchError::SourceUnavailable(format!("r/{}: {}", subreddit, e)))?;

        let status = response.status();
        if matches!(status, StatusCode::NOT_FOUND | StatusCode::FORBIDDEN) {
            return Err(SubfetchError::SourceUnavailable(format!("can't find r/{}", subreddit)));
        }
        if !status.is_success() {
            return Err(SubfetchError::SourceUnavailable(format!(
                "r/{} returned HTTP {}",
                subreddit, status
            )));
        }

        response.json().await
            .map_err(|e| SubfetchError::SourceUnavailable(format!("r/{} returned an unreadable body: {}", subreddit, e)))
    }
}

#[async_trait]
impl SubmissionSource for RedditClient {
    async fn random_submission(&self, subreddit: &str) -> Result<Submission> {
        let subreddit = normalize_subreddit(subreddit)?;
        let value = self.get_json(&subreddit, "random").await?;

        // The random endpoint answers with either a single post (a listing
        // pair of post + comments) or a whole listing
        let submissions = submissions_from_value(value)?;
        pick_random(submissions)
            .ok_or_else(|| SubfetchError::SourceUnavailable(format!("can't find r/{}", subreddit)))
    }

    async fn listing_page(&self, subreddit: &str, page: PageKind) -> Result<Vec<Submission>> {
        let subreddit = normalize_subreddit(subreddit)?;
        let value = self.get_json(&subreddit, page.as_str()).await?;
        submissions_from_value(value)
    }
}

/// Strip an optional `r/` prefix and reject names reddit cannot have
pub fn normalize_subreddit(name: &str) -> Result<String> {
    let trimmed = name.trim();
    let trimmed = trimmed
        .strip_prefix("/r/")
        .or_else(|| trimmed.strip_prefix("r/"))
        .unwrap_or(trimmed);

    let valid = !trimmed.is_empty()
        && trimmed.len() <= 21
        && trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(trimmed.to_string())
    } else {
        Err(SubfetchError::SourceUnavailable(format!("invalid subreddit name '{}'", name)))
    }
}

/// Extract the link submissions from a listing response
pub fn submissions_from_value(value: Value) -> Result<Vec<Submission>> {
    let listing = match value {
        Value::Array(mut parts) if !parts.is_empty() => parts.swap_remove(0),
        object @ Value::Object(_) => object,
        _ => {
            return Err(SubfetchError::SourceUnavailable(
                "response is not a listing".to_string(),
            ))
        }
    };

    let listing: Listing = serde_json::from_value(listing)
        .map_err(|e| SubfetchError::SourceUnavailable(format!("response is not a listing: {}", e)))?;

    let mut submissions = Vec::new();
    for thing in listing.data.children {
        if thing.kind != "t3" {
            continue;
        }
        match serde_json::from_value::<Submission>(thing.data) {
            Ok(submission) => submissions.push(submission),
            Err(e) => warn!("Skipping malformed submission: {}", e),
        }
    }

    Ok(submissions)
}

/// Take one element at random
pub fn pick_random<T>(mut items: Vec<T>) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    let index = rand::rng().random_range(0..items.len());
    Some(items.swap_remove(index))
}
