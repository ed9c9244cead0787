//! §8 scenario 4 (sec-ch-ua-platform/mobile flag), exercised across the
//! seam `client.rs` actually uses: `profile::lookup` ->
//! `profile::useragent::template_for` -> `profile::generate_headers`.

use impersonate::profile::{lookup, useragent, BrowserType, OperatingSystem};

#[test]
fn chrome_profile_template_matches_its_catalog_entry() {
    let profile = lookup("chrome_133");
    let (browser, version) = useragent::template_for(profile.id);
    assert_eq!(browser, BrowserType::Chrome);
    assert!(version.starts_with("133"));
}

#[test]
fn generated_headers_carry_client_hints_for_a_chrome_desktop_profile() {
    let profile = lookup("chrome_133");
    let (browser, version) = useragent::template_for(profile.id);
    let headers = impersonate::profile::generate_headers(browser, &version, OperatingSystem::Windows10, false);
    let map: std::collections::HashMap<_, _> = headers.iter().collect();

    assert_eq!(map.get("sec-ch-ua-mobile"), Some(&"?0"));
    assert_eq!(map.get("sec-ch-ua-platform"), Some(&"\"Windows\""));
    assert!(map.contains_key("sec-ch-ua"));
}

#[test]
fn firefox_profiles_omit_sec_ch_ua_entirely() {
    let profile = lookup("firefox_133");
    let (browser, version) = useragent::template_for(profile.id);
    let headers = impersonate::profile::generate_headers(browser, &version, OperatingSystem::Linux, false);
    let map: std::collections::HashMap<_, _> = headers.iter().collect();

    assert!(!map.contains_key("sec-ch-ua"));
    assert!(!map.contains_key("sec-ch-ua-mobile"));
}

#[test]
fn unknown_profile_id_falls_back_to_chrome_133_template() {
    let (browser, version) = useragent::template_for("not-a-real-profile");
    assert_eq!(browser, BrowserType::Chrome);
    assert_eq!(version, "133.0.0.0");
}
