//! Closed error taxonomy (§3/§7/§C10).
//!
//! Every fallible operation in this crate returns `Result<T, Error>`. Most
//! transport-level failures simply wrap an `std::io::Error` or a TLS/H2
//! library error via `#[from]`. `HTTP2Fallback` is hand-written rather than
//! `#[from]`-derived because it carries two independent sources and the
//! `err_as` walker must visit both.

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid URL: {0}")]
    InvalidURL(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("{0} received an unexpected response, switching protocols to WebSocket")]
    WebSocketUpgrade(String),

    #[error("unsupported User-Agent option: {0}")]
    UserAgentType(String),

    #[error("{0} received 101 Switching Protocols on a plain request")]
    OneHundredOneReceived(String),

    #[error("proxy URL error: {0}")]
    ProxyURL(String),

    #[error("proxy returned non-2xx status: {0}")]
    ProxyStatus(String),

    #[error("proxy URL is empty")]
    ProxyEmpty,

    #[error("proxy URL {0} has a username but no password")]
    PasswordEmpty(String),

    /// Both legs of an HTTP/2 -> HTTP/1.1 fallback failed. Both errors are
    /// kept reachable via `err_as` so a caller can recover e.g. the original
    /// RST_STREAM code from `h2` even though the request ultimately failed
    /// over HTTP/1.1.
    #[error("HTTP/2 fallback failed: h2={h2}, h1={h1}")]
    HTTP2Fallback { h2: Box<Error>, h1: Box<Error> },

    #[error("stream error: {0}")]
    StreamError(StreamErrorKind),

    #[error("response header timeout after {0:?}")]
    ResponseHeaderTimeout(std::time::Duration),

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("request cancelled")]
    Cancelled,

    #[error("middleware {0} rejected the request")]
    Middleware(String),

    #[error("request already has a body; Body() and Multipart() are mutually exclusive")]
    ConflictingBody,

    #[error("DNS resolution failed: {0}")]
    Dns(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("HTTP/3 / QUIC error: {0}")]
    Quic(String),

    #[error(transparent)]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error(transparent)]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("malformed HTTP message: {0}")]
    Protocol(String),
}

/// Subset of RST_STREAM / timeout conditions the Orchestrator treats as
/// fallback triggers (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamErrorKind {
    InternalError,
    RefusedStream,
    EnhanceYourCalm,
}

impl fmt::Display for StreamErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StreamErrorKind::InternalError => "INTERNAL_ERROR",
            StreamErrorKind::RefusedStream => "REFUSED_STREAM",
            StreamErrorKind::EnhanceYourCalm => "ENHANCE_YOUR_CALM",
        };
        f.write_str(s)
    }
}

impl StreamErrorKind {
    /// RST_STREAM error codes per RFC 7540 §7 that should trigger fallback.
    pub fn from_h2_code(code: u32) -> Option<Self> {
        match code {
            2 => Some(StreamErrorKind::InternalError),
            7 => Some(StreamErrorKind::RefusedStream),
            11 => Some(StreamErrorKind::EnhanceYourCalm),
            _ => None,
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            StreamErrorKind::InternalError => 2,
            StreamErrorKind::RefusedStream => 7,
            StreamErrorKind::EnhanceYourCalm => 11,
        }
    }
}

impl Error {
    pub fn is_fallback_trigger(&self) -> bool {
        matches!(self, Error::StreamError(_))
            || matches!(self, Error::ResponseHeaderTimeout(_))
    }

    /// Error-chain walk (§4.10, §9 "Error chain walk across the fallback").
    ///
    /// `HTTP2Fallback` has two sources, not one; the predicate is offered
    /// both rather than following a single `source()` pointer.
    pub fn err_as<T, F>(&self, mut predicate: F) -> Option<T>
    where
        F: FnMut(&Error) -> Option<T>,
    {
        if let Some(v) = predicate(self) {
            return Some(v);
        }
        if let Error::HTTP2Fallback { h2, h1 } = self {
            if let Some(v) = h2.err_as(&mut predicate) {
                return Some(v);
            }
            if let Some(v) = h1.err_as(&mut predicate) {
                return Some(v);
            }
        }
        None
    }

    pub fn as_stream_error(&self) -> Option<StreamErrorKind> {
        self.err_as(|e| match e {
            Error::StreamError(k) => Some(*k),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn err_as_walks_both_fallback_legs() {
        let h2 = Error::StreamError(StreamErrorKind::InternalError);
        let h1 = Error::ResponseHeaderTimeout(std::time::Duration::from_millis(50));
        let combined = Error::HTTP2Fallback {
            h2: Box::new(h2),
            h1: Box::new(h1),
        };

        assert_eq!(
            combined.as_stream_error(),
            Some(StreamErrorKind::InternalError)
        );
        let timeout = combined.err_as(|e| match e {
            Error::ResponseHeaderTimeout(d) => Some(*d),
            _ => None,
        });
        assert!(timeout.is_some());
    }
}
