//! Client-wide configuration surface (§3 supplemental data model):
//! `ClientConfig`, `RetryPolicy`, `RedirectPolicy`. These don't exist in the
//! teacher's source; they're new types the expanded spec calls for, built
//! in the teacher's builder-pattern idiom (see `ClientHelloSpec`/`Profile`
//! construction) rather than a config file or env var surface -- §6 is
//! explicit that this crate has no CLI/env/persistence layer.
//!
//! `RedirectPolicy` also governs header forwarding and host-scoping on
//! redirect hops (§4.8); `Orchestrator::execute` is the sole consumer.

use std::time::Duration;

/// Governs whether/how a failed request is retried. `Fixed`/`Exponential`
/// mirror the teacher's connection-pool retry language; `status_codes`
/// gates retry on the response, not just on transport errors (§8 scenario
/// 2: retrying a 503 mid-multipart-upload).
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
    pub status_codes: Vec<u16>,
}

#[derive(Debug, Clone, Copy)]
pub enum Backoff {
    Fixed(Duration),
    Exponential { base: Duration, max: Duration },
}

impl Backoff {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Fixed(d) => *d,
            Backoff::Exponential { base, max } => {
                let scaled = base.saturating_mul(1 << attempt.min(16));
                scaled.min(*max)
            }
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self { max_attempts: 1, backoff: Backoff::Fixed(Duration::ZERO), status_codes: vec![] }
    }

    pub fn new(max_attempts: u32, backoff: Duration, status_codes: Vec<u16>) -> Self {
        Self { max_attempts, backoff: Backoff::Fixed(backoff), status_codes }
    }

    pub fn should_retry(&self, attempt: u32, status: Option<u16>) -> bool {
        if attempt + 1 >= self.max_attempts {
            return false;
        }
        match status {
            Some(code) => self.status_codes.contains(&code),
            None => true,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Governs whether/how a 3xx response is followed (§4.8). Every hop re-runs
/// the middleware pipeline; `only_same_host`/`forward_headers` decide what
/// survives the hop.
#[derive(Debug, Clone)]
pub struct RedirectPolicy {
    pub follow: bool,
    pub max_redirects: u32,
    /// When true, a redirect to a different host is not followed.
    pub only_same_host: bool,
    /// When true, `Authorization`/`Cookie` are forwarded across a
    /// cross-host hop. When false (the default), they're stripped whenever
    /// the redirect target's host differs from the original request's.
    pub forward_headers: bool,
}

impl Default for RedirectPolicy {
    fn default() -> Self {
        RedirectPolicy { follow: true, max_redirects: 10, only_same_host: false, forward_headers: false }
    }
}

impl RedirectPolicy {
    pub fn follow(max_redirects: u32) -> Self {
        Self { follow: true, max_redirects, ..Default::default() }
    }

    pub fn no_follow() -> Self {
        Self { follow: false, max_redirects: 0, ..Default::default() }
    }

    pub fn only_same_host(mut self, value: bool) -> Self {
        self.only_same_host = value;
        self
    }

    pub fn forward_headers(mut self, value: bool) -> Self {
        self.forward_headers = value;
        self
    }

    pub fn max_hops(&self) -> u32 {
        if self.follow {
            self.max_redirects
        } else {
            0
        }
    }
}

/// Top-level knobs a `ClientBuilder` assembles into one immutable config
/// shared (via `Arc`) by every request the client issues.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub connect_timeout: Duration,
    pub response_header_timeout: Duration,
    pub request_timeout: Option<Duration>,
    pub idle_pool_timeout: Duration,
    pub max_idle_per_host: usize,
    pub retry: RetryPolicy,
    pub redirect: RedirectPolicy,
    pub force_http1: bool,
    pub enable_http3: bool,
    /// Keeps a copy of the request body so it can be replayed verbatim on
    /// retry/redirect hops even after the original source has been consumed.
    pub cache_body: bool,
    pub disable_compression: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            response_header_timeout: Duration::from_secs(30),
            request_timeout: None,
            idle_pool_timeout: Duration::from_secs(90),
            max_idle_per_host: 8,
            retry: RetryPolicy::default(),
            redirect: RedirectPolicy::default(),
            force_http1: false,
            enable_http3: true,
            cache_body: true,
            disable_compression: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_backoff_caps_at_max() {
        let b = Backoff::Exponential { base: Duration::from_millis(10), max: Duration::from_secs(1) };
        assert!(b.delay_for(20) <= Duration::from_secs(1));
    }

    #[test]
    fn retry_respects_max_attempts() {
        let policy = RetryPolicy::new(2, Duration::from_millis(10), vec![503]);
        assert!(policy.should_retry(0, Some(503)));
        assert!(!policy.should_retry(1, Some(503)));
        assert!(!policy.should_retry(0, Some(200)));
    }

    #[test]
    fn redirect_policy_builders() {
        assert_eq!(RedirectPolicy::no_follow().max_hops(), 0);
        let p = RedirectPolicy::follow(3).only_same_host(true).forward_headers(true);
        assert_eq!(p.max_hops(), 3);
        assert!(p.only_same_host);
        assert!(p.forward_headers);
    }
}
