//! Header generation for the sec-ch-ua client-hints family and Accept-*
//! defaults. This module doesn't exist in the retrieval pack (the
//! teacher's `lib.rs` references a `crate::headers` it never shipped); it's
//! authored fresh here, grounded in how `utils.rs::extract_platform` and
//! the spec's testable scenario #4 define the expected values.

use super::types::{BrowserType, OperatingSystem};
use rand::Rng;
use std::collections::HashMap;

/// Ordered header map the profile layer hands to the middleware pipeline as
/// request-side defaults. Plain `Vec` rather than `HeaderMap` because
/// nothing here needs HTTP-spec header validation, only insertion order.
#[derive(Debug, Clone, Default)]
pub struct HttpHeaders {
    entries: Vec<(String, String)>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_vec(self) -> Vec<(String, String)> {
        self.entries
    }
}

const ACCEPT_LANGUAGES: &[&str] = &[
    "en-US,en;q=0.9",
    "en-GB,en;q=0.9",
    "en-US,en;q=0.9,es;q=0.8",
    "de-DE,de;q=0.9,en;q=0.8",
    "fr-FR,fr;q=0.9,en;q=0.8",
];

pub fn random_language() -> &'static str {
    ACCEPT_LANGUAGES[rand::thread_rng().gen_range(0..ACCEPT_LANGUAGES.len())]
}

fn sec_ch_ua(browser: BrowserType, version: &str) -> String {
    let major = version.split('.').next().unwrap_or(version);
    match browser {
        BrowserType::Chrome => format!(
            "\"Chromium\";v=\"{major}\", \"Google Chrome\";v=\"{major}\", \"Not_A Brand\";v=\"24\""
        ),
        BrowserType::Edge => format!(
            "\"Chromium\";v=\"{major}\", \"Microsoft Edge\";v=\"{major}\", \"Not_A Brand\";v=\"24\""
        ),
        BrowserType::Opera => format!(
            "\"Chromium\";v=\"{major}\", \"Opera\";v=\"{major}\", \"Not_A Brand\";v=\"24\""
        ),
        // Firefox and Safari don't send sec-ch-ua at all.
        BrowserType::Firefox | BrowserType::Safari => String::new(),
    }
}

/// Builds the default header set a browser attaches to every navigation
/// request for this profile/OS pair. `is_mobile` drives `sec-ch-ua-mobile`
/// (§8 scenario 4: `"?0"` on desktop Chrome, `"?1"` on Android Chrome).
pub fn generate_headers(
    browser: BrowserType,
    version: &str,
    os: OperatingSystem,
    is_mobile: bool,
) -> HttpHeaders {
    let mut headers = HttpHeaders::new();
    headers.insert("accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8");
    headers.insert("accept-language", random_language());
    headers.insert("accept-encoding", "gzip, deflate, br, zstd");

    let ua_client_hints = matches!(browser, BrowserType::Chrome | BrowserType::Edge | BrowserType::Opera);
    if ua_client_hints {
        headers.insert("sec-ch-ua", sec_ch_ua(browser, version));
        headers.insert("sec-ch-ua-mobile", if is_mobile { "?1" } else { "?0" });
        headers.insert("sec-ch-ua-platform", format!("\"{}\"", os.sec_ch_ua_platform()));
    }

    headers.insert("upgrade-insecure-requests", "1");
    headers.insert("sec-fetch-site", "none");
    headers.insert("sec-fetch-mode", "navigate");
    headers.insert("sec-fetch-user", "?1");
    headers.insert("sec-fetch-dest", "document");
    headers
}

#[derive(Debug)]
pub struct FingerprintResult {
    pub profile_id: &'static str,
    pub user_agent: String,
    pub headers: HttpHeaders,
}

/// Convenience entry point combining profile lookup, User-Agent rendering
/// and default-header generation, mirroring the teacher's `random.rs`
/// helpers (`get_random_fingerprint*`) but built on the new catalog.
pub fn random_fingerprint(os: Option<OperatingSystem>) -> FingerprintResult {
    let names = super::catalog::known_names();
    let name = names[rand::thread_rng().gen_range(0..names.len())];
    let profile = super::catalog::lookup(name);
    let os = os.unwrap_or_else(|| {
        let pool = super::types::OPERATING_SYSTEMS;
        pool[rand::thread_rng().gen_range(0..pool.len())]
    });
    let version_key = name;
    let user_agent = super::useragent::get_user_agent_by_profile_name_with_os(version_key, os);
    let browser = match profile.family {
        super::catalog::Family::Chrome => BrowserType::Chrome,
        super::catalog::Family::Firefox => BrowserType::Firefox,
        super::catalog::Family::Safari => BrowserType::Safari,
        super::catalog::Family::Opera => BrowserType::Opera,
    };
    let headers = generate_headers(browser, "0", os, os.is_mobile());
    FingerprintResult { profile_id: profile.id, user_agent, headers }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chrome_desktop_sets_mobile_flag_false() {
        let h = generate_headers(BrowserType::Chrome, "133.0.0.0", OperatingSystem::Windows10, false);
        let map: HashMap<_, _> = h.iter().collect();
        assert_eq!(map.get("sec-ch-ua-mobile"), Some(&"?0"));
        assert_eq!(map.get("sec-ch-ua-platform"), Some(&"\"Windows\""));
    }

    #[test]
    fn chrome_android_sets_mobile_flag_true() {
        let h = generate_headers(BrowserType::Chrome, "133.0.0.0", OperatingSystem::Android, true);
        let map: HashMap<_, _> = h.iter().collect();
        assert_eq!(map.get("sec-ch-ua-mobile"), Some(&"?1"));
        assert_eq!(map.get("sec-ch-ua-platform"), Some(&"\"Android\""));
    }

    #[test]
    fn firefox_has_no_client_hints() {
        let h = generate_headers(BrowserType::Firefox, "133.0", OperatingSystem::Linux, false);
        assert!(h.iter().all(|(k, _)| k != "sec-ch-ua"));
    }
}
