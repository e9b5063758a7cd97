//! Metrics collection.
//!
//! # Metrics
//! - `router_resolutions_total` (counter): resolutions by `outcome`
//!   (`matched`, `no_match`, `redirect_loop`, `default`)
//! - `router_redirects_followed_total` (counter): redirect hops followed

/// Record the outcome of one resolution.
pub fn record_resolution(outcome: &'static str) {
    ::metrics::counter!("router_resolutions_total", "outcome" => outcome).increment(1);
}

/// Record one followed redirect.
pub fn record_redirect() {
    ::metrics::counter!("router_redirects_followed_total").increment(1);
}
