use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::config;
use crate::tenant;

/// Header stamped on every filtered request and response
pub const TENANT_HEADER: &str = "x-tenant";

fn tenant_header_name() -> HeaderName {
    HeaderName::from_static(TENANT_HEADER)
}

/// Resolved tenant, injected as a request extension for downstream handlers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedTenant(pub String);

/// Paths served without tenant resolution: API passthrough, static assets
/// and internal endpoints
const EXEMPT_PREFIXES: &[&str] = &["/api/", "/static/", "/assets/", "/_internal/"];
const EXEMPT_PATHS: &[&str] = &["/health", "/favicon.ico"];

fn is_exempt(path: &str) -> bool {
    EXEMPT_PATHS.contains(&path) || EXEMPT_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// Edge routing filter. Runs before content is served, determines the
/// tenant from the request host or path, and stamps it onto the request
/// and response so downstream rendering can stay tenant-agnostic.
///
/// Never blocks or fails the request; malformed hosts degrade to the
/// default tenant silently.
pub async fn tenant_filter(mut request: Request, next: Next) -> Response {
    if is_exempt(request.uri().path()) {
        return next.run(request).await;
    }

    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let resolved = tenant::from_host(&host, request.uri().path());
    tracing::debug!("Resolved tenant {} from host {:?}", resolved, host);

    let header_value = HeaderValue::from_str(&resolved).unwrap_or_else(|_| {
        HeaderValue::from_str(&config::config().platform.default_tenant)
            .unwrap_or(HeaderValue::from_static("demo"))
    });

    request
        .headers_mut()
        .insert(tenant_header_name(), header_value.clone());
    request.extensions_mut().insert(ResolvedTenant(resolved));

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(tenant_header_name(), header_value);
    response
}
