//! The public entry point (§6): `Client`/`ClientBuilder`. Lowers the
//! fluent builder surface into a `ClientConfig` + profile selection +
//! middleware pipeline, then hands requests to the [`Orchestrator`].

use crate::config::{ClientConfig, RedirectPolicy, RetryPolicy};
use crate::cookie::CookieJar;
use crate::error::Result;
use crate::middleware::{BasicAuth, BearerAuth, ContentTypeOverride, Middleware, Pipeline, UserAgentOverride};
use crate::orchestrator::Orchestrator;
use crate::profile::{self, OperatingSystem, Profile};
use crate::request::{Body, OrderedHeaders, Request};
use crate::response::Response;
use crate::transport::{ProxyConfig, TransportCache};
use http::Method;
use std::sync::Arc;
use std::time::Duration;

/// Which concrete browser fingerprint a client impersonates, plus the
/// optional OS refiner (`.windows()`/`.android()`/...) §6 describes.
#[derive(Debug, Clone)]
pub struct Impersonate {
    profile_name: &'static str,
    os: Option<OperatingSystem>,
}

impl Impersonate {
    fn named(name: &'static str) -> Self {
        Self { profile_name: name, os: None }
    }

    pub fn chrome_133() -> Self {
        Self::named("chrome_133")
    }
    pub fn chrome_103() -> Self {
        Self::named("chrome_103")
    }
    pub fn firefox_133() -> Self {
        Self::named("firefox_133")
    }
    pub fn safari_16_0() -> Self {
        Self::named("safari_16_0")
    }

    pub fn windows(mut self) -> Self {
        self.os = Some(OperatingSystem::Windows10);
        self
    }
    pub fn macos(mut self) -> Self {
        self.os = Some(OperatingSystem::MacOS14);
        self
    }
    pub fn linux(mut self) -> Self {
        self.os = Some(OperatingSystem::Linux);
        self
    }
    pub fn android(mut self) -> Self {
        self.os = Some(OperatingSystem::Android);
        self
    }
    pub fn ios(mut self) -> Self {
        self.os = Some(OperatingSystem::Ios);
        self
    }
}

pub struct ClientBuilder {
    config: ClientConfig,
    impersonate: Impersonate,
    proxy: Option<ProxyConfig>,
    cookie_jar: Option<CookieJar>,
    middlewares: Vec<Box<dyn Middleware>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            impersonate: Impersonate::chrome_133(),
            proxy: None,
            cookie_jar: None,
            middlewares: Vec::new(),
        }
    }

    pub fn impersonate(mut self, impersonate: Impersonate) -> Self {
        self.impersonate = impersonate;
        self
    }

    pub fn proxy(mut self, url: &str) -> Result<Self> {
        self.proxy = Some(ProxyConfig::parse(url)?);
        Ok(self)
    }

    pub fn cookie_store(mut self, enabled: bool) -> Self {
        self.cookie_jar = if enabled { Some(CookieJar::new()) } else { None };
        self
    }

    pub fn connect_timeout(mut self, d: Duration) -> Self {
        self.config.connect_timeout = d;
        self
    }

    pub fn response_header_timeout(mut self, d: Duration) -> Self {
        self.config.response_header_timeout = d;
        self
    }

    pub fn request_timeout(mut self, d: Duration) -> Self {
        self.config.request_timeout = Some(d);
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    pub fn redirect(mut self, policy: RedirectPolicy) -> Self {
        self.config.redirect = policy;
        self
    }

    pub fn force_http1(mut self, force: bool) -> Self {
        self.config.force_http1 = force;
        self
    }

    pub fn http3(mut self, enabled: bool) -> Self {
        self.config.enable_http3 = enabled;
        self
    }

    pub fn middleware(mut self, middleware: Box<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Sets `Authorization: Basic ...` on every request (§4.9).
    pub fn basic_auth(mut self, username: impl AsRef<str>, password: impl AsRef<str>) -> Self {
        self.middlewares.push(Box::new(BasicAuth::new(username, password)));
        self
    }

    /// Sets `Authorization: Bearer ...` on every request (§4.9).
    pub fn bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.middlewares.push(Box::new(BearerAuth::new(token)));
        self
    }

    /// Overrides `User-Agent`, picking at random among `candidates` per
    /// request. An empty list is rejected with `Error::UserAgentType`
    /// (§8: "User-Agent option with an empty list => UserAgentType error").
    pub fn user_agent(mut self, candidates: Vec<String>) -> Result<Self> {
        self.middlewares.push(Box::new(UserAgentOverride::new(candidates)?));
        Ok(self)
    }

    /// Overrides `Content-Type` on every request (§4.9).
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.middlewares.push(Box::new(ContentTypeOverride::new(content_type)));
        self
    }

    /// Keeps a copy of the request body so retry/redirect hops can replay
    /// it verbatim (§4.9, §4.11).
    pub fn cache_body(mut self, enabled: bool) -> Self {
        self.config.cache_body = enabled;
        self
    }

    /// Disables transparent `Content-Encoding` decompression of response
    /// bodies.
    pub fn disable_compression(mut self, disabled: bool) -> Self {
        self.config.disable_compression = disabled;
        self
    }

    pub fn build(self) -> Client {
        let profile = profile::lookup(self.impersonate.profile_name);
        let mut pipeline = Pipeline::new();
        for m in self.middlewares {
            pipeline.push(m);
        }
        let cache = Arc::new(TransportCache::new());
        Client {
            orchestrator: Arc::new(Orchestrator::new(self.config, cache, pipeline)),
            profile: Arc::new(profile),
            proxy: self.proxy,
            cookie_jar: self.cookie_jar.unwrap_or_default(),
            os: self.impersonate.os,
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A cheaply cloneable handle: every clone shares the same transport
/// cache, cookie jar and profile, so spawning one `Client` per task is the
/// intended usage pattern rather than pooling `Client`s.
#[derive(Clone)]
pub struct Client {
    orchestrator: Arc<Orchestrator>,
    profile: Arc<Profile>,
    proxy: Option<ProxyConfig>,
    cookie_jar: CookieJar,
    os: Option<OperatingSystem>,
}

pub struct RequestBuilder {
    client: Client,
    request: Request,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn get(&self, url: &str) -> Result<RequestBuilder> {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: &str) -> Result<RequestBuilder> {
        self.request(Method::POST, url)
    }

    pub fn request(&self, method: Method, url: &str) -> Result<RequestBuilder> {
        let parsed = url::Url::parse(url).map_err(|_| crate::error::Error::InvalidURL(url.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(crate::error::Error::UnsupportedScheme(parsed.scheme().to_string()));
        }
        let mut req = Request::new(method, parsed);
        self.apply_default_headers(&mut req);
        Ok(RequestBuilder { client: self.clone(), request: req })
    }

    fn apply_default_headers(&self, req: &mut Request) {
        let os = self.os.unwrap_or(OperatingSystem::Windows10);
        let ua = profile::useragent::get_user_agent_by_profile_name_with_os(self.profile.id, os);
        req.headers.push("user-agent", ua);

        let (browser, version) = profile::useragent::template_for(self.profile.id);
        let browser_headers = profile::generate_headers(browser, &version, os, os.is_mobile());
        for (name, value) in browser_headers.into_vec() {
            req.headers.push(name, value);
        }

        if let Some(host) = req.host() {
            if let Some(cookie_header) = self.cookie_jar.generate_cookie_header(host, req.url.path()) {
                req.headers.push("cookie", cookie_header);
            }
        }
    }

    pub async fn execute(&self, request: Request) -> Result<Response> {
        let host = request.host().map(str::to_string);
        let response = self.orchestrator.execute(request, &self.profile, self.proxy.as_ref()).await?;
        if let Some(host) = host {
            crate::response::extract_cookies(&response.headers, &host, &self.cookie_jar);
        }
        Ok(response)
    }
}

impl RequestBuilder {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.headers.set(name, value);
        self
    }

    pub fn body(mut self, bytes: Vec<u8>) -> Self {
        self.request.body = Some(Body::Bytes(bytes));
        self
    }

    pub fn multipart(mut self, writer: crate::multipart::MultipartWriter) -> Self {
        self.request.headers.set("content-type", writer.content_type());
        self.request.body = Some(Body::Multipart(writer));
        self
    }

    pub fn timeout(mut self, d: Duration) -> Self {
        self.request.timeout = Some(d);
        self
    }

    pub async fn send(self) -> Result<Response> {
        self.client.execute(self.request).await
    }
}
