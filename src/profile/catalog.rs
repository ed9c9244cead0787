//! C1 ProfileDB: the static table mapping a browser/version identifier
//! (e.g. `"chrome_133"`) to the TLS and HTTP/2 fingerprint templates that
//! produce a byte-identical wire image. Ported from the teacher's
//! `profiles.rs`; `lookup` never panics on an unrecognized name, returning
//! the default Chrome profile as a well-defined sentinel instead (§4.1).

use super::h2_profile::{self, H2Profile};
use super::tls_spec::ClientHelloSpec;
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Chrome,
    Firefox,
    Safari,
    Opera,
}

/// A fully resolved fingerprint: the TLS template plus the matching HTTP/2
/// wire-behavior table. Cloning a `Profile` is cheap relative to dialing a
/// connection, but `tls_spec` must still go through
/// [`ClientHelloSpec::instantiate_for_connection`] before use on the wire.
#[derive(Debug, Clone)]
pub struct Profile {
    pub id: &'static str,
    pub family: Family,
    pub tls_spec: ClientHelloSpec,
    pub h2: H2Profile,
}

fn build(id: &'static str, family: Family, tls_spec: ClientHelloSpec, h2: H2Profile) -> Profile {
    Profile { id, family, tls_spec, h2 }
}

fn chrome_133_profile() -> Profile {
    build("chrome_133", Family::Chrome, ClientHelloSpec::chrome_133(), h2_profile::chrome())
}

fn chrome_103_profile() -> Profile {
    build("chrome_103", Family::Chrome, ClientHelloSpec::chrome_103(), h2_profile::chrome())
}

fn firefox_133_profile() -> Profile {
    build("firefox_133", Family::Firefox, ClientHelloSpec::firefox_133(), h2_profile::firefox())
}

fn safari_16_0_profile() -> Profile {
    build("safari_16_0", Family::Safari, ClientHelloSpec::safari_16_0(), h2_profile::safari())
}

/// Every concrete name a caller may pass to `Impersonate()`/`lookup`, mapped
/// onto one of the four canonical templates above. Mirrors the teacher's
/// `init_mapped_tls_clients` alias table: most "point releases" a browser
/// ships share one wire fingerprint with the nearest major version modeled
/// here.
fn aliases() -> Vec<(&'static str, fn() -> Profile)> {
    vec![
        ("chrome_133", chrome_133_profile as fn() -> Profile),
        ("chrome_132", chrome_133_profile),
        ("chrome_131", chrome_133_profile),
        ("chrome_130", chrome_133_profile),
        ("chrome_129", chrome_133_profile),
        ("chrome_128", chrome_133_profile),
        ("chrome_127", chrome_133_profile),
        ("chrome_120", chrome_103_profile),
        ("chrome_110", chrome_103_profile),
        ("chrome_107", chrome_103_profile),
        ("chrome_104", chrome_103_profile),
        ("chrome_103", chrome_103_profile),
        ("chrome_100", chrome_103_profile),
        ("chrome", chrome_133_profile),
        ("firefox_133", firefox_133_profile),
        ("firefox_132", firefox_133_profile),
        ("firefox_120", firefox_133_profile),
        ("firefox_117", firefox_133_profile),
        ("firefox_102", firefox_133_profile),
        ("firefox", firefox_133_profile),
        ("safari_16_0", safari_16_0_profile),
        ("safari_15_6", safari_16_0_profile),
        ("safari_15_3", safari_16_0_profile),
        ("safari_ios_16_0", safari_16_0_profile),
        ("safari_ios_15_5", safari_16_0_profile),
        ("safari", safari_16_0_profile),
        ("opera_91", chrome_133_profile),
        ("opera", chrome_133_profile),
        ("edge_131", chrome_133_profile),
        ("edge", chrome_133_profile),
    ]
}

static CATALOG: OnceLock<HashMap<&'static str, fn() -> Profile>> = OnceLock::new();

fn catalog() -> &'static HashMap<&'static str, fn() -> Profile> {
    CATALOG.get_or_init(|| aliases().into_iter().collect())
}

/// Resolve a profile name to a `Profile`. Unknown names fall back to the
/// default Chrome profile rather than returning an error or panicking --
/// this crate treats fingerprint selection as best-effort cosmetic input,
/// never a hard failure mode (§4.1, §9 "unknown extension is a safety net,
/// not an error").
pub fn lookup(name: &str) -> Profile {
    match catalog().get(name) {
        Some(factory) => factory(),
        None => chrome_133_profile(),
    }
}

pub fn known_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = catalog().keys().copied().collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_name_falls_back_to_chrome() {
        let p = lookup("not-a-real-browser");
        assert_eq!(p.id, "chrome_133");
    }

    #[test]
    fn known_aliases_resolve() {
        assert_eq!(lookup("firefox_133").family, Family::Firefox);
        assert_eq!(lookup("safari_16_0").family, Family::Safari);
        assert_eq!(lookup("chrome_103").id, "chrome_103");
    }
}
