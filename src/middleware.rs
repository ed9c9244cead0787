//! C9 MiddlewarePipeline (§4.9): ordered request-side and response-side
//! transforms. Built-ins cover the two hard-reject cases the spec commits
//! to exact wording for -- an unexpected protocol switch, and a bare 101
//! returned outside a WebSocket upgrade (§8 scenario 5).

use crate::error::{Error, Result};
use crate::request::Request;
use crate::response::Response;
use crate::utils::random_choice_string;

pub trait Middleware: Send + Sync {
    fn name(&self) -> &'static str;

    fn on_request(&self, _request: &mut Request) -> Result<()> {
        Ok(())
    }

    fn on_response(&self, _response: &Response) -> Result<()> {
        Ok(())
    }
}

/// Rejects any response that switched protocols when the caller never
/// asked to upgrade. `who` identifies the caller context (e.g. the request
/// URL) so the error message matches §8 scenario 5 exactly.
pub struct WebSocketRejection;

impl Middleware for WebSocketRejection {
    fn name(&self) -> &'static str {
        "websocket_rejection"
    }

    fn on_response(&self, response: &Response) -> Result<()> {
        if response.status == 101 {
            return Err(Error::WebSocketUpgrade(response.request_summary.clone()));
        }
        Ok(())
    }
}

/// Sets `Authorization: Basic <base64(user:pass)>` on every request (§4.9).
pub struct BasicAuth {
    credentials: String,
}

impl BasicAuth {
    pub fn new(username: impl AsRef<str>, password: impl AsRef<str>) -> Self {
        use base64::Engine;
        let raw = format!("{}:{}", username.as_ref(), password.as_ref());
        Self { credentials: base64::engine::general_purpose::STANDARD.encode(raw) }
    }
}

impl Middleware for BasicAuth {
    fn name(&self) -> &'static str {
        "basic_auth"
    }

    fn on_request(&self, request: &mut Request) -> Result<()> {
        request.headers.set("authorization", format!("Basic {}", self.credentials));
        Ok(())
    }
}

/// Sets `Authorization: Bearer <token>` on every request (§4.9).
pub struct BearerAuth {
    token: String,
}

impl BearerAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl Middleware for BearerAuth {
    fn name(&self) -> &'static str {
        "bearer_auth"
    }

    fn on_request(&self, request: &mut Request) -> Result<()> {
        request.headers.set("authorization", format!("Bearer {}", self.token));
        Ok(())
    }
}

/// Overrides the `User-Agent` header with either a fixed string or a value
/// picked at random from a candidate list on every request (§4.9, §8:
/// "User-Agent option with an empty list => UserAgentType error").
pub struct UserAgentOverride {
    candidates: Vec<String>,
}

impl UserAgentOverride {
    pub fn new(candidates: Vec<String>) -> Result<Self> {
        if candidates.is_empty() {
            return Err(Error::UserAgentType("user-agent candidate list is empty".into()));
        }
        Ok(Self { candidates })
    }

    pub fn fixed(value: impl Into<String>) -> Self {
        Self { candidates: vec![value.into()] }
    }
}

impl Middleware for UserAgentOverride {
    fn name(&self) -> &'static str {
        "user_agent_override"
    }

    fn on_request(&self, request: &mut Request) -> Result<()> {
        let refs: Vec<&str> = self.candidates.iter().map(String::as_str).collect();
        let chosen = random_choice_string(&refs)
            .ok_or_else(|| Error::UserAgentType("user-agent candidate list is empty".into()))?;
        request.headers.set("user-agent", chosen);
        Ok(())
    }
}

/// Overrides `Content-Type` on every request (§4.9).
pub struct ContentTypeOverride {
    content_type: String,
}

impl ContentTypeOverride {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self { content_type: content_type.into() }
    }
}

impl Middleware for ContentTypeOverride {
    fn name(&self) -> &'static str {
        "content_type_override"
    }

    fn on_request(&self, request: &mut Request) -> Result<()> {
        request.headers.set("content-type", self.content_type.clone());
        Ok(())
    }
}

/// A pipeline stage that owns both ordered stages the spec names: request
/// middlewares run in registration order before dialing, response
/// middlewares run in registration order after the response is assembled.
pub struct Pipeline {
    stages: Vec<Box<dyn Middleware>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { stages: vec![Box::new(WebSocketRejection)] }
    }

    pub fn push(&mut self, middleware: Box<dyn Middleware>) {
        self.stages.push(middleware);
    }

    pub fn run_request(&self, request: &mut Request) -> Result<()> {
        for stage in &self.stages {
            stage.on_request(request).map_err(|e| match e {
                Error::Middleware(_) => e,
                other => Error::Middleware(format!("{}: {other}", stage.name())),
            })?;
        }
        Ok(())
    }

    pub fn run_response(&self, response: &Response) -> Result<()> {
        for stage in &self.stages {
            stage.on_response(response)?;
        }
        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Headers;

    fn response_with_status(status: u16) -> Response {
        Response {
            status,
            headers: Headers::new(),
            body: Vec::new(),
            tls_info: None,
            request_summary: "GET https://example.com/".to_string(),
        }
    }

    #[test]
    fn rejects_unexpected_101() {
        let pipeline = Pipeline::new();
        let response = response_with_status(101);
        let err = pipeline.run_response(&response).unwrap_err();
        assert_eq!(
            err.to_string(),
            "GET https://example.com/ received an unexpected response, switching protocols to WebSocket"
        );
    }

    #[test]
    fn passes_ordinary_responses() {
        let pipeline = Pipeline::new();
        let response = response_with_status(200);
        assert!(pipeline.run_response(&response).is_ok());
    }

    fn sample_request() -> Request {
        Request::new(http::Method::GET, url::Url::parse("https://example.com/").unwrap())
    }

    #[test]
    fn basic_auth_sets_authorization_header() {
        let mw = BasicAuth::new("alice", "hunter2");
        let mut request = sample_request();
        mw.on_request(&mut request).unwrap();
        let value = request.headers.get("authorization").unwrap();
        assert!(value.starts_with("Basic "));
    }

    #[test]
    fn bearer_auth_sets_authorization_header() {
        let mw = BearerAuth::new("tok123");
        let mut request = sample_request();
        mw.on_request(&mut request).unwrap();
        assert_eq!(request.headers.get("authorization"), Some("Bearer tok123"));
    }

    #[test]
    fn empty_user_agent_list_is_rejected() {
        let err = UserAgentOverride::new(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::UserAgentType(_)));
    }

    #[test]
    fn user_agent_override_picks_from_candidates() {
        let mw = UserAgentOverride::new(vec!["ua-one".to_string(), "ua-two".to_string()]).unwrap();
        let mut request = sample_request();
        mw.on_request(&mut request).unwrap();
        let ua = request.headers.get("user-agent").unwrap();
        assert!(ua == "ua-one" || ua == "ua-two");
    }

    #[test]
    fn content_type_override_sets_header() {
        let mw = ContentTypeOverride::new("application/json");
        let mut request = sample_request();
        mw.on_request(&mut request).unwrap();
        assert_eq!(request.headers.get("content-type"), Some("application/json"));
    }
}
