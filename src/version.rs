//! Client version reported by `monitorctl --version` and sent to the API.

/// Release version stamped in at build time through `APP_VERSION`. An unset
/// or empty stamp falls back to the package version.
pub const VERSION: &str = match option_env!("APP_VERSION") {
    Some(stamp) if !stamp.is_empty() => stamp,
    _ => env!("CARGO_PKG_VERSION"),
};

/// `User-Agent` header for API requests.
pub fn user_agent() -> String {
    format!("monitorctl/{VERSION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_carries_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(user_agent(), format!("monitorctl/{VERSION}"));
    }
}
