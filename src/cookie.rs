//! CookieJar (§3 supplemental data model). Ported from the teacher's
//! `http_client::cookie::CookieStore`, renamed to match the spec's data
//! model and switched to `tracing` for lock-failure diagnostics.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub expires: Option<SystemTime>,
    pub max_age: Option<Duration>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl Cookie {
    pub fn new(name: String, value: String, domain: String) -> Self {
        Self {
            name,
            value,
            domain,
            path: "/".to_string(),
            expires: None,
            max_age: None,
            secure: false,
            http_only: false,
            same_site: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        if let Some(expires) = self.expires {
            return SystemTime::now() > expires;
        }
        false
    }

    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    pub fn parse_set_cookie(header: &str, domain: String) -> Option<Self> {
        let parts: Vec<&str> = header.split(';').collect();
        if parts.is_empty() {
            return None;
        }

        let name_value: Vec<&str> = parts[0].splitn(2, '=').collect();
        if name_value.len() != 2 {
            return None;
        }

        let mut cookie = Cookie::new(
            name_value[0].trim().to_string(),
            name_value[1].trim().to_string(),
            domain,
        );

        for part in &parts[1..] {
            let part = part.trim();
            let lower = part.to_lowercase();
            if let Some(v) = lower.strip_prefix("domain=") {
                cookie.domain = part[7..7 + v.len()].to_string();
            } else if let Some(v) = lower.strip_prefix("path=") {
                cookie.path = part[5..5 + v.len()].to_string();
            } else if let Some(v) = lower.strip_prefix("max-age=") {
                if let Ok(secs) = v.parse::<u64>() {
                    cookie.max_age = Some(Duration::from_secs(secs));
                }
            } else if lower == "secure" {
                cookie.secure = true;
            } else if lower == "httponly" {
                cookie.http_only = true;
            } else if let Some(v) = lower.strip_prefix("samesite=") {
                cookie.same_site = match v {
                    "strict" => Some(SameSite::Strict),
                    "lax" => Some(SameSite::Lax),
                    "none" => Some(SameSite::None),
                    _ => None,
                };
            }
        }

        Some(cookie)
    }
}

/// Domain-indexed cookie store shared by every request the client issues.
/// `Clone` is cheap: the `Arc<Mutex<_>>` is shared, not duplicated, so a
/// cloned `CookieJar` still observes cookies set through the original.
#[derive(Debug, Clone)]
pub struct CookieJar {
    cookies: Arc<Mutex<HashMap<String, Vec<Cookie>>>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self { cookies: Arc::new(Mutex::new(HashMap::new())) }
    }

    pub fn add_cookie(&self, cookie: Cookie) {
        match self.cookies.lock() {
            Ok(mut cookies) => {
                let domain_cookies = cookies.entry(cookie.domain.clone()).or_default();
                if let Some(pos) = domain_cookies.iter().position(|c| c.name == cookie.name) {
                    domain_cookies[pos] = cookie;
                } else {
                    domain_cookies.push(cookie);
                }
            }
            Err(_) => tracing::warn!("cookie jar lock poisoned, dropping cookie"),
        }
    }

    pub fn add_from_response(&self, set_cookie_header: &str, domain: String) {
        if let Some(cookie) = Cookie::parse_set_cookie(set_cookie_header, domain) {
            self.add_cookie(cookie);
        }
    }

    pub fn get_cookies_for_domain(&self, domain: &str) -> Vec<Cookie> {
        let cookies = match self.cookies.lock() {
            Ok(c) => c,
            Err(_) => {
                tracing::warn!("cookie jar lock poisoned, returning no cookies");
                return Vec::new();
            }
        };
        let mut result = Vec::new();
        let domain_lower = domain.to_lowercase();
        for (cookie_domain, domain_cookies) in cookies.iter() {
            let cookie_domain_lower = cookie_domain.to_lowercase();
            let matches = domain_lower == cookie_domain_lower
                || (cookie_domain_lower.starts_with('.') && domain_lower.ends_with(&cookie_domain_lower))
                || domain_lower.ends_with(&format!(".{cookie_domain_lower}"));
            if matches {
                result.extend(domain_cookies.iter().filter(|c| !c.is_expired()).cloned());
            }
        }
        result
    }

    pub fn generate_cookie_header(&self, domain: &str, path: &str) -> Option<String> {
        let cookies = self.get_cookies_for_domain(domain);
        let matching: Vec<String> = cookies
            .iter()
            .filter(|c| path.starts_with(&c.path))
            .map(Cookie::to_header_value)
            .collect();
        if matching.is_empty() {
            None
        } else {
            Some(matching.join("; "))
        }
    }

    pub fn clear_domain(&self, domain: &str) {
        if let Ok(mut cookies) = self.cookies.lock() {
            cookies.remove(domain);
        }
    }

    pub fn clear_all(&self) {
        if let Ok(mut cookies) = self.cookies.lock() {
            cookies.clear();
        }
    }

    pub fn cleanup_expired(&self) {
        if let Ok(mut cookies) = self.cookies.lock() {
            for domain_cookies in cookies.values_mut() {
                domain_cookies.retain(|c| !c.is_expired());
            }
        }
    }

    pub fn count(&self) -> usize {
        self.cookies.lock().map(|c| c.values().map(Vec::len).sum()).unwrap_or(0)
    }
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_to_header() {
        let cookie = Cookie::new("session".into(), "abc123".into(), "example.com".into());
        assert_eq!(cookie.to_header_value(), "session=abc123");
    }

    #[test]
    fn parse_set_cookie_attributes() {
        let header = "session=abc123; Path=/; HttpOnly";
        let cookie = Cookie::parse_set_cookie(header, "example.com".into()).unwrap();
        assert_eq!(cookie.name, "session");
        assert_eq!(cookie.path, "/");
        assert!(cookie.http_only);
    }

    #[test]
    fn subdomain_matches_leading_dot_cookie() {
        let jar = CookieJar::new();
        jar.add_cookie(Cookie::new("a".into(), "1".into(), ".example.com".into()));
        let found = jar.get_cookies_for_domain("www.example.com");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn generate_cookie_header_joins_multiple() {
        let jar = CookieJar::new();
        jar.add_cookie(Cookie::new("session".into(), "abc123".into(), "example.com".into()));
        jar.add_cookie(Cookie::new("token".into(), "xyz789".into(), "example.com".into()));
        let header = jar.generate_cookie_header("example.com", "/").unwrap();
        assert!(header.contains("session=abc123"));
        assert!(header.contains("token=xyz789"));
    }
}
