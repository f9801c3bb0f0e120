//! Shared User-Agent string for REST and stream requests.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/murasaki-project/murasaki-remote";

/// Default User-Agent (identifies the client and its version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("murasaki-remote/{version} (+{PROJECT_UA_URL})")
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_carries_crate_version() {
        let ua = default_user_agent();
        assert_eq!(
            env!("CARGO_PKG_VERSION"),
            ua.strip_prefix("murasaki-remote/")
                .and_then(|s| s.split(' ').next())
                .expect("UA has version"),
            "UA must contain crate version"
        );
        assert!(ua.contains(PROJECT_UA_URL), "UA must contain project URL");
    }
}
