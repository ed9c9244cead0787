//! Browser/OS identity types shared by the profile catalog and the
//! User-Agent / sec-ch-ua generators.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserType {
    Chrome,
    Firefox,
    Safari,
    Opera,
    Edge,
}

impl BrowserType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "chrome" => Some(BrowserType::Chrome),
            "firefox" => Some(BrowserType::Firefox),
            "safari" => Some(BrowserType::Safari),
            "opera" => Some(BrowserType::Opera),
            "edge" => Some(BrowserType::Edge),
            _ => None,
        }
    }
}

impl fmt::Display for BrowserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BrowserType::Chrome => "chrome",
            BrowserType::Firefox => "firefox",
            BrowserType::Safari => "safari",
            BrowserType::Opera => "opera",
            BrowserType::Edge => "edge",
        };
        f.write_str(s)
    }
}

/// Operating systems the `Impersonate().<OS>()` builder refiners (§6) pick
/// from. `as_str`/`sec_ch_ua_platform` feed two different surfaces: the
/// former is embedded in the User-Agent string, the latter is the exact
/// `sec-ch-ua-platform` header value (testable property #4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingSystem {
    Windows10,
    MacOS14,
    Linux,
    Android,
    Ios,
}

pub const OPERATING_SYSTEMS: &[OperatingSystem] = &[
    OperatingSystem::Windows10,
    OperatingSystem::MacOS14,
    OperatingSystem::Linux,
    OperatingSystem::Android,
    OperatingSystem::Ios,
];

impl OperatingSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingSystem::Windows10 => "Windows NT 10.0; Win64; x64",
            OperatingSystem::MacOS14 => "Macintosh; Intel Mac OS X 14_5",
            OperatingSystem::Linux => "X11; Linux x86_64",
            OperatingSystem::Android => "Linux; Android 14",
            OperatingSystem::Ios => "iPhone; CPU iPhone OS 17_5 like Mac OS X",
        }
    }

    /// Exact `sec-ch-ua-platform` value (§8 scenario 4).
    pub fn sec_ch_ua_platform(&self) -> &'static str {
        match self {
            OperatingSystem::Windows10 => "Windows",
            OperatingSystem::MacOS14 => "macOS",
            OperatingSystem::Linux => "Linux",
            OperatingSystem::Android => "Android",
            OperatingSystem::Ios => "iOS",
        }
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self, OperatingSystem::Android | OperatingSystem::Ios)
    }
}

/// Template used by the User-Agent generator: `%s` is replaced with the
/// chosen OS token when `os_required` is set.
#[derive(Debug, Clone)]
pub struct UserAgentTemplate {
    pub browser: BrowserType,
    pub version: String,
    pub template: String,
    pub mobile: bool,
    pub os_required: bool,
}

impl UserAgentTemplate {
    pub fn new(
        browser: BrowserType,
        version: String,
        template: String,
        mobile: bool,
        os_required: bool,
    ) -> Self {
        Self {
            browser,
            version,
            template,
            mobile,
            os_required,
        }
    }
}
