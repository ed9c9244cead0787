//! The `Request` type (§3): method, URL, headers (order-preserving), body,
//! and the per-request overrides a builder can layer on top of client
//! defaults.

use crate::multipart::MultipartWriter;
use http::Method;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Body {
    Bytes(Vec<u8>),
    Multipart(MultipartWriter),
}

/// Headers kept as an ordered `Vec` rather than `http::HeaderMap` so that
/// insertion order survives into the wire encoder -- `HeaderMap` makes no
/// ordering guarantee, which would silently break the "host position is
/// preserved" invariant (§8 scenario 3).
#[derive(Debug, Clone, Default)]
pub struct OrderedHeaders(pub Vec<(String, String)>);

impl OrderedHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Replaces the first occurrence of `name` in place, preserving its
    /// position; appends if absent.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.0.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            entry.1 = value;
        } else {
            self.0.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: url::Url,
    pub headers: OrderedHeaders,
    pub body: Option<Body>,
    pub timeout: Option<Duration>,
    pub profile_override: Option<&'static str>,
    pub force_http1: bool,
}

impl Request {
    pub fn new(method: Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: OrderedHeaders::new(),
            body: None,
            timeout: None,
            profile_override: None,
            force_http1: false,
        }
    }

    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    pub fn port(&self) -> u16 {
        self.url.port_or_known_default().unwrap_or(443)
    }

    pub fn is_https(&self) -> bool {
        self.url.scheme() == "https"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_headers_preserve_host_position() {
        let mut headers = OrderedHeaders::new();
        headers.push("x-before", "");
        headers.push("host", "");
        headers.push("x-after", "");

        let names: Vec<&str> = headers.0.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["x-before", "host", "x-after"]);

        headers.set("host", "example.com");
        let names: Vec<&str> = headers.0.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["x-before", "host", "x-after"]);
    }
}
