//! §8 testable properties around `RetryPolicy`/`RedirectPolicy`, exercised
//! through the public `config` surface rather than a live server.

use impersonate::config::{Backoff, RedirectPolicy, RetryPolicy};
use std::time::Duration;

#[test]
fn retry_stops_after_max_attempts_even_on_retryable_status() {
    let policy = RetryPolicy::new(3, Duration::from_millis(1), vec![502, 503]);
    assert!(policy.should_retry(0, Some(503)));
    assert!(policy.should_retry(1, Some(502)));
    assert!(!policy.should_retry(2, Some(503)));
}

#[test]
fn retry_never_fires_for_a_status_outside_the_allow_list() {
    let policy = RetryPolicy::new(5, Duration::from_millis(1), vec![503]);
    assert!(!policy.should_retry(0, Some(404)));
    assert!(!policy.should_retry(0, Some(200)));
}

#[test]
fn retry_none_disables_retries_entirely() {
    let policy = RetryPolicy::none();
    assert!(!policy.should_retry(0, Some(503)));
    assert!(!policy.should_retry(0, None));
}

#[test]
fn transport_errors_retry_regardless_of_status_code_list() {
    let policy = RetryPolicy::new(2, Duration::from_millis(1), vec![]);
    assert!(policy.should_retry(0, None));
}

#[test]
fn exponential_backoff_grows_then_caps() {
    let backoff = Backoff::Exponential { base: Duration::from_millis(10), max: Duration::from_millis(200) };
    let d0 = backoff.delay_for(0);
    let d1 = backoff.delay_for(1);
    let d_far = backoff.delay_for(30);
    assert!(d1 >= d0);
    assert_eq!(d_far, Duration::from_millis(200));
}

#[test]
fn redirect_policy_default_follows_up_to_ten_hops() {
    let policy = RedirectPolicy::default();
    assert!(policy.follow);
    assert_eq!(policy.max_hops(), 10);
}

#[test]
fn redirect_policy_no_follow_has_zero_hops() {
    assert_eq!(RedirectPolicy::no_follow().max_hops(), 0);
}

#[test]
fn redirect_policy_composes_same_host_and_header_forwarding_flags() {
    let policy = RedirectPolicy::follow(4).only_same_host(true).forward_headers(true);
    assert_eq!(policy.max_hops(), 4);
    assert!(policy.only_same_host);
    assert!(policy.forward_headers);
}
