//! External API clients.
//!
//! All three upstreams (scheduling portal, river gauges, weather) are plain
//! JSON-over-HTTP. `JsonSource` is the seam between fetching and parsing:
//! `HttpSource` does the real blocking request with a bounded timeout,
//! `CachedSource` adds the 5-minute reuse window, and tests substitute a
//! canned source. Every failure comes back as a `SourceError`.
//!
//! Submodules:
//! - `cache`    - TTL cache keyed by URL.
//! - `schedule` - vehicle rosters.
//! - `gauge`    - water level series and thresholds.
//! - `weather`  - current conditions.

pub mod cache;
pub mod gauge;
pub mod schedule;
pub mod weather;

use std::time::{Duration, Instant};

use crate::error::SourceError;

pub use cache::TtlCache;

/// Anything that can return the parsed JSON body behind a URL.
pub trait JsonSource {
    /// `cookie` is sent verbatim as the `Cookie` header when present.
    fn get_json(&self, url: &str, cookie: Option<&str>) -> Result<serde_json::Value, SourceError>;
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

pub struct HttpSource {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("legasi/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        Ok(Self { client, timeout })
    }

    fn map_error(&self, err: reqwest::Error) -> SourceError {
        if err.is_timeout() {
            SourceError::Timeout(self.timeout.as_secs())
        } else if let Some(status) = err.status() {
            SourceError::HttpStatus(status.as_u16())
        } else if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else {
            SourceError::Transport(err.to_string())
        }
    }
}

impl JsonSource for HttpSource {
    fn get_json(&self, url: &str, cookie: Option<&str>) -> Result<serde_json::Value, SourceError> {
        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(cookie) = cookie {
            request = request.header("Cookie", cookie);
        }

        let response = request.send().map_err(|e| self.map_error(e))?;

        if !response.status().is_success() {
            return Err(SourceError::HttpStatus(response.status().as_u16()));
        }

        response.json::<serde_json::Value>().map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout(self.timeout.as_secs())
            } else {
                SourceError::Parse(e.to_string())
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Caching wrapper
// ---------------------------------------------------------------------------

/// Reuses successful responses for the cache TTL. Failures are never cached,
/// so the next refresh retries immediately.
pub struct CachedSource<S> {
    inner: S,
    cache: TtlCache<serde_json::Value>,
}

impl<S: JsonSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            cache: TtlCache::new(ttl),
        }
    }

    pub fn get_json_at(
        &self,
        url: &str,
        cookie: Option<&str>,
        now: Instant,
    ) -> Result<serde_json::Value, SourceError> {
        if let Some(hit) = self.cache.get(url, now) {
            return Ok(hit);
        }
        let value = self.inner.get_json(url, cookie)?;
        self.cache.insert(url, value.clone(), now);
        Ok(value)
    }
}

impl<S: JsonSource> JsonSource for CachedSource<S> {
    fn get_json(&self, url: &str, cookie: Option<&str>) -> Result<serde_json::Value, SourceError> {
        self.get_json_at(url, cookie, Instant::now())
    }
}

// ---------------------------------------------------------------------------
// Shared parsing helpers
// ---------------------------------------------------------------------------

/// A number, or a string holding one. Anything else is `None`.
pub(crate) fn lenient_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}
