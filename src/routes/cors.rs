use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::auth::auth::API_KEY_HEADER;
use crate::config::Config;

/// CORS policy for browser clients: explicitly configured origins, tenant
/// subdomains under the configured suffix, and localhost in development.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let explicit = config.cors_origin_list();
    let tenant_suffix = config.cors_tenant_suffix.clone();
    let development = config.is_development();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _request_parts| {
                let Ok(origin) = origin.to_str() else {
                    return false;
                };
                origin_allowed(origin, &explicit, tenant_suffix.as_deref(), development)
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(API_KEY_HEADER),
        ])
        .allow_credentials(true)
}

fn origin_allowed(
    origin: &str,
    explicit: &[String],
    tenant_suffix: Option<&str>,
    development: bool,
) -> bool {
    // Check explicit origins
    if explicit.iter().any(|o| o == origin || o == "*") {
        info!("CORS: Origin {} allowed (explicit)", origin);
        return true;
    }

    // Check tenant subdomain pattern
    if let Some(suffix) = tenant_suffix {
        if origin.starts_with("https://")
            && origin.ends_with(suffix)
            && origin.len() > "https://".len() + suffix.len()
        {
            info!("CORS: Origin {} allowed (tenant subdomain)", origin);
            return true;
        }
    }

    // Allow localhost for development
    if development && (origin.starts_with("http://localhost") || origin.starts_with("http://127.0.0.1"))
    {
        info!("CORS: Origin {} allowed (localhost)", origin);
        return true;
    }

    warn!("CORS: Origin {} not allowed", origin);
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_origin_is_allowed() {
        let explicit = vec!["https://app.example.com".to_string()];
        assert!(origin_allowed("https://app.example.com", &explicit, None, false));
        assert!(!origin_allowed("https://evil.example.com", &explicit, None, false));
    }

    #[test]
    fn tenant_subdomain_is_allowed() {
        let suffix = Some(".tuneup.sageteck.com");
        assert!(origin_allowed(
            "https://acme.tuneup.sageteck.com",
            &[],
            suffix,
            false
        ));
        // Suffix alone, without a subdomain, is not enough
        assert!(!origin_allowed("https://", &[], Some("https://"), false));
        // Plain http does not qualify
        assert!(!origin_allowed(
            "http://acme.tuneup.sageteck.com",
            &[],
            suffix,
            false
        ));
    }

    #[test]
    fn localhost_only_in_development() {
        assert!(origin_allowed("http://localhost:3000", &[], None, true));
        assert!(!origin_allowed("http://localhost:3000", &[], None, false));
    }

    #[test]
    fn wildcard_allows_everything() {
        let explicit = vec!["*".to_string()];
        assert!(origin_allowed("https://anything.example", &explicit, None, false));
    }
}
