//! Probe path and scanner user-agent blocklists

/// Path fragments only ever requested by vulnerability scanners.
/// Matched as lowercase substrings of the request path.
pub const BLOCKED_PATHS: &[&str] = &[
    "/wp-admin",
    "/wp-login",
    "/wp-content",
    "/phpmyadmin",
    "/pma",
    "/mysql",
    "/.env",
    "/.git",
    "/.htaccess",
    "/admin.php",
    "/config.php",
    "/shell",
    "/cmd",
    "/exec",
];

/// Scanner signatures, matched as lowercase substrings of the User-Agent
pub const SUSPICIOUS_AGENTS: &[&str] = &["sqlmap", "nikto", "nmap", "masscan", "zgrab"];

pub fn is_blocked_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    BLOCKED_PATHS.iter().any(|p| lower.contains(p))
}

pub fn is_suspicious_agent(user_agent: &str) -> bool {
    let lower = user_agent.to_lowercase();
    SUSPICIOUS_AGENTS.iter().any(|a| lower.contains(a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_paths() {
        assert!(is_blocked_path("/wp-admin/setup.php"));
        assert!(is_blocked_path("/WP-LOGIN.php"));
        assert!(is_blocked_path("/static/.env"));
        assert!(is_blocked_path("/.git/config"));
        assert!(!is_blocked_path("/api/articles"));
        assert!(!is_blocked_path("/"));
    }

    #[test]
    fn test_substring_match_catches_prefix_lookalikes() {
        // "/pma" is a substring of "/pmatch" too; the probe list is coarse on purpose
        assert!(is_blocked_path("/pmatch"));
        assert!(is_blocked_path("/api/execute"));
    }

    #[test]
    fn test_suspicious_agents() {
        assert!(is_suspicious_agent("sqlmap/1.7.2#stable (https://sqlmap.org)"));
        assert!(is_suspicious_agent("Mozilla/5.0 (compatible; Nmap Scripting Engine)"));
        assert!(!is_suspicious_agent("Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0"));
        assert!(!is_suspicious_agent(""));
    }
}
