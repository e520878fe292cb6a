//! Tenant resolution from URL and host context.
//!
//! A tenant is a subdomain label scoping all state and network calls. It is
//! derived per request/render and never stored as its own entity. Resolution
//! is a pure function of its inputs, so repeated calls with identical inputs
//! yield identical results and dependent clients need not be rebuilt.

use crate::config;

/// Check a candidate subdomain label. DNS label rules, minus the exotic
/// parts: non-empty, at most 63 chars, alphanumeric and hyphens, no leading
/// or trailing hyphen.
pub fn is_valid_label(label: &str) -> bool {
    if label.is_empty() || label.len() > 63 {
        return false;
    }
    if label.starts_with('-') || label.ends_with('-') {
        return false;
    }
    label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Resolve the active tenant from render context: prefer an explicit route
/// parameter, fall back to the first path segment, and degrade to the
/// default tenant when neither carries a usable label. Never fails.
pub fn resolve(route_param: Option<&str>, path: &str) -> String {
    if let Some(param) = route_param {
        if is_valid_label(param) {
            return param.to_ascii_lowercase();
        }
    }

    if let Some(segment) = first_segment(path) {
        if is_valid_label(segment) {
            return segment.to_ascii_lowercase();
        }
    }

    config::config().platform.default_tenant.clone()
}

/// Resolve the tenant from the request host, the edge-filter algorithm:
///
/// 1. Host under the platform root domain: the tenant is the subdomain
///    label, the text before the first dot.
/// 2. Local development host: the tenant is the first non-"api" path
///    segment when present.
/// 3. Anything else, including malformed hosts, degrades to the default
///    tenant silently.
pub fn from_host(host: &str, path: &str) -> String {
    let platform = &config::config().platform;

    // Ports never carry tenant signal
    let hostname = host.split(':').next().unwrap_or("").to_ascii_lowercase();

    if hostname != platform.root_domain && hostname.contains(&platform.root_domain) {
        if let Some(label) = hostname.split('.').next() {
            if is_valid_label(label) {
                return label.to_string();
            }
        }
        return platform.default_tenant.clone();
    }

    if platform.local_hosts.iter().any(|h| h == &hostname) {
        let segment = path
            .split('/')
            .filter(|s| !s.is_empty())
            .find(|s| *s != "api");
        if let Some(segment) = segment {
            if is_valid_label(segment) {
                return segment.to_ascii_lowercase();
            }
        }
    }

    platform.default_tenant.clone()
}

fn first_segment(path: &str) -> Option<&str> {
    path.split('/').find(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_param_wins_over_path() {
        assert_eq!(resolve(Some("utility1"), "/other/portal"), "utility1");
    }

    #[test]
    fn test_first_path_segment_fallback() {
        assert_eq!(resolve(None, "/acme/portal/dashboard"), "acme");
        assert_eq!(resolve(None, "acme/portal"), "acme");
    }

    #[test]
    fn test_empty_path_defaults() {
        assert_eq!(resolve(None, "/"), "demo");
        assert_eq!(resolve(None, ""), "demo");
        assert_eq!(resolve(Some(""), "/"), "demo");
    }

    #[test]
    fn test_invalid_labels_degrade() {
        assert_eq!(resolve(Some("not a label"), "/"), "demo");
        assert_eq!(resolve(None, "/-bad-/portal"), "demo");
    }

    #[test]
    fn test_host_subdomain() {
        assert_eq!(from_host("utility1.accesswash.org", "/"), "utility1");
        assert_eq!(from_host("utility1.accesswash.org:443", "/"), "utility1");
        assert_eq!(from_host("Nairobi-Water.accesswash.org", "/"), "nairobi-water");
    }

    #[test]
    fn test_local_host_uses_path() {
        assert_eq!(from_host("localhost:3000", "/acme/portal/dashboard"), "acme");
        assert_eq!(from_host("127.0.0.1:3000", "/acme/portal"), "acme");
        assert_eq!(from_host("localhost:3000", "/api/acme/portal"), "acme");
        assert_eq!(from_host("localhost:3000", "/api"), "demo");
        assert_eq!(from_host("localhost", "/"), "demo");
    }

    #[test]
    fn test_bare_root_domain_defaults() {
        assert_eq!(from_host("accesswash.org", "/"), "demo");
    }

    #[test]
    fn test_malformed_hosts_default_silently() {
        assert_eq!(from_host("", "/"), "demo");
        assert_eq!(from_host(":::", "/"), "demo");
        assert_eq!(from_host("example.com", "/acme"), "demo");
    }
}
