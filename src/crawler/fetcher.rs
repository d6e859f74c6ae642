//! HTTP fetcher implementation
//!
//! This module is the only place the crawler talks to the network. It handles:
//! - Building HTTP clients with optional proxy routing
//! - Rotating the User-Agent header per attempt
//! - Retry with exponential backoff for transient failures
//! - Error classification

use crate::config::FetchConfig;
use crate::{ConfigError, TrawlError};
use rand::seq::IndexedRandom;
use reqwest::header::USER_AGENT;
use reqwest::{Client, Proxy, Response, StatusCode};
use std::time::Duration;

/// A fixed set of request identities
///
/// One entry is chosen uniformly at random for every attempt, so a single
/// page fetch may go out under several identities.
#[derive(Debug, Clone)]
pub struct UserAgentPool {
    agents: Vec<String>,
}

impl UserAgentPool {
    /// Creates a pool, requiring at least two non-empty identities
    pub fn new(agents: Vec<String>) -> Result<Self, ConfigError> {
        if agents.len() < 2 {
            return Err(ConfigError::Validation(format!(
                "user agent pool needs at least 2 entries, got {}",
                agents.len()
            )));
        }

        if agents.iter().any(|ua| ua.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "user agent pool cannot contain empty entries".to_string(),
            ));
        }

        Ok(Self { agents })
    }

    /// Picks one identity at random
    pub fn pick(&self) -> &str {
        self.agents
            .choose(&mut rand::rng())
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.agents
    }
}

/// Attempt budget, per-attempt timeout and backoff unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub timeout: Duration,
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            timeout: Duration::from_secs(10),
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            timeout: Duration::from_secs(config.timeout_secs),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
        }
    }

    /// Delay after a failed attempt (1-indexed): `backoff_base * 2^attempt`
    ///
    /// With the default one-second base this is 2, 4, 8, 16, 32 seconds.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_base
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// A page fetched with status 200
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL that was requested
    pub url: String,
    pub status_code: u16,
    pub body: String,
    /// Attempt number that succeeded
    pub attempts: u32,
}

/// Builds an HTTP client, routing every scheme through `proxy` when given
///
/// The User-Agent and timeout are set per request, not on the client.
pub fn build_http_client(proxy: Option<&str>) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().gzip(true).brotli(true);

    if let Some(proxy) = proxy {
        builder = builder.proxy(Proxy::all(proxy)?);
    }

    builder.build()
}

/// Resilient page fetcher
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 200 | Return the page |
/// | HTTP 5xx | Retry after backoff |
/// | Any other status | Fail with `HttpStatus`, no retry |
/// | Timeout / connection / body read error | Retry after backoff |
/// | Attempts used up | Fail with `FetchExhausted` |
///
/// The fetcher holds no per-call state, so one instance can be shared by
/// concurrent category walks.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    user_agents: UserAgentPool,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, user_agents: UserAgentPool, policy: RetryPolicy) -> Self {
        Self {
            client,
            user_agents,
            policy,
        }
    }

    /// Builds a fetcher (client, identity pool and policy) from config
    pub fn from_config(config: &FetchConfig) -> Result<Self, TrawlError> {
        let client = build_http_client(config.proxy.as_deref())?;
        let user_agents = UserAgentPool::new(config.user_agents.clone())?;
        Ok(Self::new(client, user_agents, RetryPolicy::from_config(config)))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn user_agents(&self) -> &UserAgentPool {
        &self.user_agents
    }

    /// Sends one GET with a freshly picked identity and the per-attempt timeout
    pub async fn get_once(&self, url: &str) -> Result<Response, reqwest::Error> {
        let user_agent = self.user_agents.pick();
        tracing::trace!("GET {} as {}", url, user_agent);

        self.client
            .get(url)
            .header(USER_AGENT, user_agent)
            .timeout(self.policy.timeout)
            .send()
            .await
    }

    /// Fetches a URL, retrying transient failures
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedPage)` - A 200 response and its body
    /// * `Err(TrawlError::HttpStatus)` - A non-retryable status
    /// * `Err(TrawlError::FetchExhausted)` - Every attempt failed transiently
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, TrawlError> {
        let max_retries = self.policy.max_retries;

        for attempt in 1..=max_retries {
            let failure = match self.get_once(url).await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::OK {
                        match response.text().await {
                            Ok(body) => {
                                return Ok(FetchedPage {
                                    url: url.to_string(),
                                    status_code: status.as_u16(),
                                    body,
                                    attempts: attempt,
                                });
                            }
                            Err(e) => format!("failed to read body: {}", e),
                        }
                    } else if status.is_server_error() {
                        format!("server error {}", status.as_u16())
                    } else {
                        tracing::error!("HTTP {} for {}, not retrying", status.as_u16(), url);
                        return Err(TrawlError::HttpStatus {
                            url: url.to_string(),
                            status: status.as_u16(),
                        });
                    }
                }
                Err(e) if e.is_builder() => return Err(e.into()),
                Err(e) => classify_error(&e),
            };

            tracing::warn!(
                "Attempt {}/{} for {} failed: {}",
                attempt,
                max_retries,
                url,
                failure
            );

            if attempt < max_retries {
                let delay = self.policy.backoff_for(attempt);
                tracing::debug!("Retrying {} in {:?}", url, delay);
                tokio::time::sleep(delay).await;
            }
        }

        tracing::error!("Failed to fetch {} after {} attempts", url, max_retries);
        Err(TrawlError::FetchExhausted {
            url: url.to_string(),
            attempts: max_retries,
        })
    }
}

/// Short description of a transport error for retry log lines
fn classify_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    }
}
