//! Domain relevance predicate for mutation filtering.
//!
//! Decides whether a cookie domain is relevant to the host of the active
//! context's URL. Implements RFC 6265 style dot-boundary suffix matching
//! without public-suffix consultation: the reconciler only needs "could
//! this cookie plausibly belong to the page being inspected", and a
//! permissive answer merely refreshes one extra jar entry.
//!
//! Policy, explicitly:
//! - leading dot on the cookie domain is ignored (`.a.example` == `a.example`)
//! - comparison is ASCII case-insensitive
//! - matches when the host equals the domain, or ends with `.` + domain
//! - no public-suffix boundary check (a cookie on `com` would match
//!   `a.com`; stores reject such cookies upstream)
//! - an empty domain or empty host never matches

/// True when `cookie_domain` is relevant to `context_host`.
pub fn domain_matches(cookie_domain: &str, context_host: &str) -> bool {
    let domain = cookie_domain.trim_start_matches('.');
    if domain.is_empty() || context_host.is_empty() {
        return false;
    }

    if context_host.eq_ignore_ascii_case(domain) {
        return true;
    }

    // Suffix match only on a label boundary: "ample.com" must not match
    // host "example.com".
    if context_host.len() > domain.len() {
        let suffix = &context_host[context_host.len() - domain.len()..];
        if suffix.eq_ignore_ascii_case(domain) {
            let boundary = context_host
                .chars()
                .nth(context_host.len() - domain.len() - 1);
            return boundary == Some('.');
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(domain_matches("example.com", "example.com"));
        assert!(domain_matches("EXAMPLE.com", "example.COM"));
    }

    #[test]
    fn test_leading_dot_is_stripped() {
        assert!(domain_matches(".example.com", "example.com"));
        assert!(domain_matches(".example.com", "sub.example.com"));
    }

    #[test]
    fn test_subdomain_host_matches_parent_domain() {
        assert!(domain_matches("example.com", "a.example.com"));
        assert!(domain_matches("example.com", "deep.a.example.com"));
    }

    #[test]
    fn test_label_boundary_enforced() {
        assert!(!domain_matches("ample.com", "example.com"));
        assert!(!domain_matches("le.com", "example.com"));
    }

    #[test]
    fn test_parent_host_does_not_match_subdomain_cookie() {
        assert!(!domain_matches("a.example.com", "example.com"));
    }

    #[test]
    fn test_unrelated_domains() {
        assert!(!domain_matches("example.org", "example.com"));
    }

    #[test]
    fn test_empty_inputs_never_match() {
        assert!(!domain_matches("", "example.com"));
        assert!(!domain_matches(".", "example.com"));
        assert!(!domain_matches("example.com", ""));
    }
}
