use reqwest::Client;

use crate::error::Result;

const DISABLE_SYSTEM_PROXY_ENV: &str = "MEDIMATE_DISABLE_SYSTEM_PROXY";

/// Build the shared HTTP client.
///
/// No client-wide timeout is set: a chat stream may legitimately run for a
/// long time. Bounded requests set their own timeout per request.
pub(crate) fn build_http_client() -> Result<Client> {
    let builder = Client::builder();
    let builder = if should_disable_system_proxy() {
        builder.no_proxy()
    } else {
        builder
    };
    Ok(builder.build()?)
}

fn should_disable_system_proxy() -> bool {
    if std::env::var_os(DISABLE_SYSTEM_PROXY_ENV).is_some() {
        return true;
    }

    cfg!(test)
}

/// Normalize a base URL so endpoint paths can be appended with `format!`.
pub(crate) fn normalize_base_url(base_url: &str) -> Option<String> {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Some(trimmed.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slashes() {
        assert_eq!(
            normalize_base_url("http://localhost:7861//").as_deref(),
            Some("http://localhost:7861")
        );
    }

    #[test]
    fn rejects_urls_without_scheme() {
        assert_eq!(normalize_base_url("localhost:7861"), None);
        assert_eq!(normalize_base_url(""), None);
    }

    #[test]
    fn proxy_is_disabled_under_test() {
        assert!(should_disable_system_proxy());
    }
}
