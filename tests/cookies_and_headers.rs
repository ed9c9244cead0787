//! Cookie jar persistence across a simulated redirect hop, and the
//! order-preserving, multi-valued `Headers` collection (§3).

use impersonate::cookie::CookieJar;
use impersonate::response::{extract_cookies, Headers};

#[test]
fn cookies_set_on_one_host_are_not_sent_to_another() {
    let jar = CookieJar::new();
    let mut headers = Headers::new();
    headers.push("set-cookie", "session=abc123; Path=/");
    extract_cookies(&headers, "a.example.com", &jar);

    assert!(jar.generate_cookie_header("a.example.com", "/").unwrap().contains("session=abc123"));
    assert!(jar.generate_cookie_header("b.example.com", "/").is_none());
}

#[test]
fn a_later_set_cookie_for_the_same_name_overwrites_the_earlier_one() {
    let jar = CookieJar::new();
    let mut first = Headers::new();
    first.push("set-cookie", "token=one; Path=/");
    extract_cookies(&first, "example.com", &jar);

    let mut second = Headers::new();
    second.push("set-cookie", "token=two; Path=/");
    extract_cookies(&second, "example.com", &jar);

    let header = jar.generate_cookie_header("example.com", "/").unwrap();
    assert!(header.contains("token=two"));
    assert!(!header.contains("token=one"));
}

#[test]
fn headers_lookup_is_case_insensitive() {
    let mut headers = Headers::new();
    headers.push("Content-Type", "application/json");
    assert_eq!(headers.get("content-type"), Some("application/json"));
    assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
}

#[test]
fn headers_preserve_wire_order_across_mixed_names() {
    let mut headers = Headers::new();
    headers.push("date", "Wed, 01 Jan 2026 00:00:00 GMT");
    headers.push("content-type", "text/plain");
    headers.push("set-cookie", "a=1");
    headers.push("set-cookie", "b=2");

    let names: Vec<&str> = headers.iter().map(|(k, _)| k).collect();
    assert_eq!(names, vec!["date", "content-type", "set-cookie", "set-cookie"]);
}
