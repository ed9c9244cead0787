//! C12 Response Assembler (§4.12) and the `Response` type (§3). Handles
//! Content-Encoding transparent decompression, Set-Cookie extraction into
//! the shared jar, and TLS certificate metadata capture.

use crate::cookie::CookieJar;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct TlsInfo {
    pub fingerprint_hex: String,
    pub fingerprint_colon: String,
    pub subject_cn: Option<String>,
    pub issuer_cn: Option<String>,
    pub sans: Vec<String>,
    pub alpn: Option<String>,
}

/// Case-insensitive, order-preserving, multi-valued header collection (§3:
/// "case-insensitive with preserved multi-value ordering"). A server that
/// sends two `Set-Cookie` headers must have both observable, which a plain
/// `HashMap<String, String>` cannot do.
#[derive(Debug, Clone, Default)]
pub struct Headers(pub Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// First value for `name`, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    /// Every value for `name`, in the order they arrived on the wire.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.0.iter().filter(move |(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
    pub tls_info: Option<TlsInfo>,
    /// `"{METHOD} {url}"`, used verbatim in the WebSocket-rejection error
    /// message (§8 scenario 5).
    pub request_summary: String,
}

impl Response {
    pub fn is_informational(&self) -> bool {
        (100..200).contains(&self.status)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirection(&self) -> bool {
        (300..400).contains(&self.status)
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    pub fn body_str(&self) -> std::result::Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }
}

/// Decompresses `body` in place according to `content_encoding`. Supports
/// the four encodings real servers actually send; anything else is passed
/// through unchanged since a server advertising an encoding this crate
/// can't decode is the server's bug, not this client's.
pub fn decompress(content_encoding: Option<&str>, body: Vec<u8>) -> Result<Vec<u8>> {
    match content_encoding {
        #[cfg(feature = "compression")]
        Some("gzip") => {
            use std::io::Read;
            let mut out = Vec::new();
            flate2::read::GzDecoder::new(&body[..])
                .read_to_end(&mut out)
                .map_err(|e| Error::Protocol(format!("gzip decode failed: {e}")))?;
            Ok(out)
        }
        #[cfg(feature = "compression")]
        Some("deflate") => {
            use std::io::Read;
            let mut out = Vec::new();
            flate2::read::DeflateDecoder::new(&body[..])
                .read_to_end(&mut out)
                .map_err(|e| Error::Protocol(format!("deflate decode failed: {e}")))?;
            Ok(out)
        }
        #[cfg(feature = "compression")]
        Some("br") => brotli_decompressor::decompress(&mut &body[..], 4096)
            .map_err(|e| Error::Protocol(format!("brotli decode failed: {e}"))),
        #[cfg(feature = "compression")]
        Some("zstd") => zstd::stream::decode_all(&body[..])
            .map_err(|e| Error::Protocol(format!("zstd decode failed: {e}"))),
        _ => Ok(body),
    }
}

/// Extracts every `Set-Cookie` header into the shared jar, keyed on the
/// response's originating host.
pub fn extract_cookies(headers: &Headers, host: &str, jar: &CookieJar) {
    for raw in headers.get_all("set-cookie") {
        jar.add_from_response(raw, host.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> Response {
        Response { status, headers: Headers::new(), body: Vec::new(), tls_info: None, request_summary: String::new() }
    }

    #[test]
    fn headers_preserve_multiple_set_cookie_values() {
        let mut headers = Headers::new();
        headers.push("Set-Cookie", "a=1");
        headers.push("content-type", "text/plain");
        headers.push("set-cookie", "b=2");

        let values: Vec<&str> = headers.get_all("set-cookie").collect();
        assert_eq!(values, vec!["a=1", "b=2"]);
        assert_eq!(headers.get("Content-Type"), Some("text/plain"));
    }

    #[test]
    fn extract_cookies_captures_every_set_cookie_header() {
        let jar = CookieJar::new();
        let mut headers = Headers::new();
        headers.push("set-cookie", "a=1; Path=/");
        headers.push("set-cookie", "b=2; Path=/");
        extract_cookies(&headers, "example.com", &jar);
        let header = jar.generate_cookie_header("example.com", "/").unwrap();
        assert!(header.contains("a=1"));
        assert!(header.contains("b=2"));
    }

    #[test]
    fn classifies_teapot_as_client_error() {
        let r = response(418);
        assert!(r.is_client_error());
        assert!(!r.is_success());
        assert!(!r.is_server_error());
    }

    #[test]
    fn classifies_each_status_class() {
        assert!(response(100).is_informational());
        assert!(response(204).is_success());
        assert!(response(301).is_redirection());
        assert!(response(404).is_client_error());
        assert!(response(503).is_server_error());
    }

    #[test]
    fn passthrough_when_no_content_encoding() {
        let body = b"hello".to_vec();
        let out = decompress(None, body.clone()).unwrap();
        assert_eq!(out, body);
    }
}
