//! Extraction of advertised VTEP loopbacks from BGP route listings.
//!
//! The input is the text rendering of `show ip bgp community <tag>`. Every
//! IPv4 host route (`A.B.C.D/32`) in the listing is a remote VTEP loopback;
//! routes with any other mask length are ignored.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{VtepAddress, VtepSet};

/// Matches an IPv4 host route and captures the address without its mask.
static HOST_ROUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})/32\b").expect("Invalid regex pattern")
});

/// Returns the set of VTEP addresses advertised in a BGP route listing.
///
/// Text without any host routes yields an empty set. Matches whose octets
/// fall outside 0-255 are skipped.
pub fn parse_advertised_vteps(route_text: &str) -> VtepSet {
    let mut vteps = VtepSet::new();

    for caps in HOST_ROUTE_RE.captures_iter(route_text) {
        let raw = &caps[1];
        match raw.parse::<VtepAddress>() {
            Ok(addr) => {
                vteps.insert(addr);
            }
            Err(_) => {
                tracing::warn!(route = %raw, "Skipping host route with invalid address");
            }
        }
    }

    tracing::debug!(count = vteps.len(), vteps = %vteps, "Parsed advertised VTEPs");
    vteps
}
