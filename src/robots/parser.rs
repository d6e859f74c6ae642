//! Robots.txt parser implementation
//!
//! This module provides functionality for parsing robots.txt content using the robotstxt crate.

use robotstxt::DefaultMatcher;
use url::Url;

/// How a fetched robots.txt should be applied
#[derive(Debug, Clone, PartialEq, Eq)]
enum Policy {
    /// Evaluate the published rules
    Rules(String),
    /// No policy was published; everything is allowed
    AllowAll,
    /// Access to the policy itself was refused; nothing is allowed
    DisallowAll,
}

/// Parsed robots.txt data
///
/// This is a wrapper around the robotstxt crate's matcher, providing a
/// simplified interface for checking if URLs are allowed.
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    policy: Policy,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            policy: Policy::Rules(content.to_string()),
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// Used when the site answers the robots.txt request with a client
    /// error other than 401/403, i.e. it publishes no policy.
    pub fn allow_all() -> Self {
        Self {
            policy: Policy::AllowAll,
        }
    }

    /// Creates a ParsedRobots that refuses everything
    ///
    /// Used when the site refuses access to robots.txt itself (401/403).
    pub fn disallow_all() -> Self {
        Self {
            policy: Policy::DisallowAll,
        }
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The URL (or path) to check
    /// * `user_agent` - The user agent name, `*` for the wildcard group
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match &self.policy {
            Policy::AllowAll => true,
            Policy::DisallowAll => false,
            Policy::Rules(content) if content.trim().is_empty() => true,
            Policy::Rules(content) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(content, user_agent, url)
            }
        }
    }

    /// Checks a parsed URL, in its percent-encoded form
    ///
    /// Rules are matched against encoded paths, so a raw non-ASCII path
    /// would slip past a `Disallow` written for it.
    pub fn allows_url(&self, url: &Url, user_agent: &str) -> bool {
        self.is_allowed(url.as_str(), user_agent)
    }

    /// Short description of the policy, for log lines
    pub fn describe(&self) -> &'static str {
        match self.policy {
            Policy::Rules(_) => "published rules",
            Policy::AllowAll => "no policy published",
            Policy::DisallowAll => "policy access refused",
        }
    }
}
