//! Robots.txt handling module
//!
//! This module is the run's permission gate: it fetches the site's
//! robots.txt once, before any catalog page is requested, and refuses the
//! run unless the policy allows the base URL. Anything that keeps the
//! policy from being read counts as a refusal.

mod parser;

pub use parser::ParsedRobots;

use crate::crawler::Fetcher;
use crate::url::{parse_site_url, robots_url};
use crate::TrawlError;
use reqwest::StatusCode;
use url::Url;

/// Fetches robots.txt and turns the response into a policy
///
/// | Response | Policy |
/// |----------|--------|
/// | 200 | Parse the body |
/// | 401, 403 | Disallow all |
/// | Other 4xx | Allow all |
/// | 5xx, network error | `Err` |
///
/// A single attempt is made with one identity from the fetcher's pool.
pub async fn fetch_robots(fetcher: &Fetcher, robots_url: &Url) -> Result<ParsedRobots, TrawlError> {
    let response = fetcher.get_once(robots_url.as_str()).await?;
    let status = response.status();

    if status == StatusCode::OK {
        let body = response.text().await?;
        return Ok(ParsedRobots::from_content(&body));
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Ok(ParsedRobots::disallow_all());
    }

    if status.is_client_error() {
        return Ok(ParsedRobots::allow_all());
    }

    Err(TrawlError::HttpStatus {
        url: robots_url.to_string(),
        status: status.as_u16(),
    })
}

/// Checks that `user_agent` may crawl `base_url`
///
/// # Returns
///
/// * `Ok(())` - The policy allows the base URL
/// * `Err(TrawlError::PermissionDenied)` - The policy forbids it, or it
///   could not be fetched
pub async fn check_allowed(
    fetcher: &Fetcher,
    base_url: &str,
    user_agent: &str,
) -> Result<(), TrawlError> {
    let site = parse_site_url(base_url)?;
    let robots_url = robots_url(site.as_str())?;
    tracing::info!("Checking {} for access to {}", robots_url, base_url);

    let robots = match fetch_robots(fetcher, &robots_url).await {
        Ok(robots) => robots,
        Err(e) => {
            tracing::error!("Could not read {}: {}", robots_url, e);
            return Err(TrawlError::PermissionDenied {
                url: base_url.to_string(),
                user_agent: user_agent.to_string(),
                reason: format!("could not read {}: {}", robots_url, e),
            });
        }
    };

    if robots.allows_url(&site, user_agent) {
        tracing::info!(
            "Access allowed for {} to {} ({})",
            user_agent,
            base_url,
            robots.describe()
        );
        Ok(())
    } else {
        tracing::error!("Access denied for {} to {}", user_agent, base_url);
        Err(TrawlError::PermissionDenied {
            url: base_url.to_string(),
            user_agent: user_agent.to_string(),
            reason: format!("disallowed by robots.txt ({})", robots.describe()),
        })
    }
}
