//! User-Agent string generation. Ported from the teacher's `useragent.rs`,
//! retargeted onto `profile::types::{BrowserType, OperatingSystem}` instead
//! of the missing `crate::types` module.

use super::types::{BrowserType, OperatingSystem, UserAgentTemplate, OPERATING_SYSTEMS};
use rand::Rng;
use std::collections::HashMap;
use std::sync::OnceLock;

pub struct UserAgentGenerator {
    templates: HashMap<&'static str, UserAgentTemplate>,
}

fn init_templates() -> HashMap<&'static str, UserAgentTemplate> {
    let mut m = HashMap::new();
    m.insert(
        "chrome_133",
        UserAgentTemplate::new(
            BrowserType::Chrome,
            "133.0.0.0".into(),
            "Mozilla/5.0 (%s) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36".into(),
            false,
            true,
        ),
    );
    m.insert(
        "chrome_103",
        UserAgentTemplate::new(
            BrowserType::Chrome,
            "103.0.0.0".into(),
            "Mozilla/5.0 (%s) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/103.0.0.0 Safari/537.36".into(),
            false,
            true,
        ),
    );
    m.insert(
        "chrome_android",
        UserAgentTemplate::new(
            BrowserType::Chrome,
            "133.0.0.0".into(),
            "Mozilla/5.0 (%s) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Mobile Safari/537.36".into(),
            true,
            true,
        ),
    );
    m.insert(
        "firefox_133",
        UserAgentTemplate::new(
            BrowserType::Firefox,
            "133.0".into(),
            "Mozilla/5.0 (%s; rv:133.0) Gecko/20100101 Firefox/133.0".into(),
            false,
            true,
        ),
    );
    m.insert(
        "safari_16_0",
        UserAgentTemplate::new(
            BrowserType::Safari,
            "16.0".into(),
            "Mozilla/5.0 (%s) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Safari/605.1.15".into(),
            false,
            true,
        ),
    );
    m.insert(
        "safari_ios_16_0",
        UserAgentTemplate::new(
            BrowserType::Safari,
            "16.0".into(),
            "Mozilla/5.0 (%s) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Mobile/15E148 Safari/604.1".into(),
            true,
            true,
        ),
    );
    m.insert(
        "opera_91",
        UserAgentTemplate::new(
            BrowserType::Opera,
            "91.0.0.0".into(),
            "Mozilla/5.0 (%s) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36 OPR/91.0.0.0".into(),
            false,
            true,
        ),
    );
    m
}

impl UserAgentGenerator {
    pub fn new() -> Self {
        Self { templates: init_templates() }
    }

    fn random_os(&self, tpl: &UserAgentTemplate) -> OperatingSystem {
        let candidates: Vec<&OperatingSystem> = OPERATING_SYSTEMS
            .iter()
            .filter(|os| os.is_mobile() == tpl.mobile)
            .collect();
        let pick = if candidates.is_empty() {
            &OPERATING_SYSTEMS[0]
        } else {
            candidates[rand::thread_rng().gen_range(0..candidates.len())]
        };
        *pick
    }

    pub fn get_user_agent(&self, profile_name: &str) -> Option<String> {
        let tpl = self.templates.get(profile_name)?;
        let os = self.random_os(tpl);
        Some(self.render(tpl, os))
    }

    pub fn get_user_agent_with_os(&self, profile_name: &str, os: OperatingSystem) -> Option<String> {
        let tpl = self.templates.get(profile_name)?;
        Some(self.render(tpl, os))
    }

    fn render(&self, tpl: &UserAgentTemplate, os: OperatingSystem) -> String {
        if tpl.os_required {
            tpl.template.replacen("%s", os.as_str(), 1)
        } else {
            tpl.template.clone()
        }
    }
}

impl Default for UserAgentGenerator {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT_GENERATOR: OnceLock<UserAgentGenerator> = OnceLock::new();

fn generator() -> &'static UserAgentGenerator {
    DEFAULT_GENERATOR.get_or_init(UserAgentGenerator::new)
}

/// Falls back to the Chrome 133 desktop template when `profile_name` has no
/// dedicated User-Agent entry, so a new profile alias never needs a matching
/// UA-table update to produce a plausible client.
pub fn get_user_agent_by_profile_name(profile_name: &str) -> String {
    generator()
        .get_user_agent(profile_name)
        .unwrap_or_else(|| generator().get_user_agent("chrome_133").unwrap())
}

pub fn get_user_agent_by_profile_name_with_os(profile_name: &str, os: OperatingSystem) -> String {
    generator()
        .get_user_agent_with_os(profile_name, os)
        .unwrap_or_else(|| generator().get_user_agent_with_os("chrome_133", os).unwrap())
}

/// Looks up the `(browser, version)` pair backing a profile's User-Agent
/// template, for callers (the sec-ch-ua header generator) that need the
/// same identity the rendered User-Agent string encodes. Falls back to the
/// Chrome 133 template like the UA getters above.
pub fn template_for(profile_name: &str) -> (BrowserType, String) {
    let templates = &generator().templates;
    let tpl = templates.get(profile_name).or_else(|| templates.get("chrome_133")).unwrap();
    (tpl.browser, tpl.version.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_profile_falls_back() {
        let ua = get_user_agent_by_profile_name("totally-unknown");
        assert!(ua.contains("Chrome/133.0.0.0"));
    }

    #[test]
    fn os_override_is_honored() {
        let ua = get_user_agent_by_profile_name_with_os("chrome_133", OperatingSystem::Linux);
        assert!(ua.contains("X11; Linux x86_64"));
    }
}
