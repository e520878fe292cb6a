//! Per-tenant backend API client.
//!
//! One `PortalClient` is constructed per tenant; every networked operation
//! for that tenant goes through it. The client is never shared across
//! tenants and is reconstructed, not mutated, when the tenant changes.

use chrono::{Duration as ChronoDuration, Utc};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{self, Environment};
use crate::error::{PortalError, DEFAULT_ERROR_MESSAGE};
use crate::session::storage::{
    self, customer_cookie_name, token_cookie_name, DiagnosticSink, LoggingNavigator, MemoryJar,
    Navigator, SessionCookie, SessionStorage, TracingSink,
};
use crate::types::{
    ApiEnvelope, AuthPayload, Customer, Dashboard, LoginCredentials, NewServiceRequest,
    ProfileUpdate, RegisterData, ServiceRequest, ServiceRequestComment,
};

/// Where the code is executing. Hostname introspection is only available in
/// a browser; other contexts fall back to the configured environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionContext {
    Browser { hostname: String },
    Server,
}

/// Derive the backend base URL for a tenant. Local development talks to an
/// explicit port on the tenant subdomain; everything else goes through
/// `https://{tenant}.{root_domain}/api`.
pub fn resolve_base_url(
    tenant: &str,
    context: &ExecutionContext,
    environment: &Environment,
) -> String {
    let platform = &config::config().platform;

    let local = match context {
        ExecutionContext::Browser { hostname } => {
            platform.local_hosts.iter().any(|h| h == hostname)
        }
        ExecutionContext::Server => *environment == Environment::Development,
    };

    if local {
        format!(
            "http://{}.{}:{}",
            tenant, platform.root_domain, platform.dev_api_port
        )
    } else {
        format!("https://{}.{}/api", tenant, platform.root_domain)
    }
}

pub struct PortalClient {
    tenant: String,
    base_url: String,
    http: reqwest::Client,
    storage: Arc<dyn SessionStorage>,
    navigator: Arc<dyn Navigator>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

pub struct PortalClientBuilder {
    tenant: String,
    base_url: Option<String>,
    execution_context: ExecutionContext,
    timeout: Option<Duration>,
    storage: Option<Arc<dyn SessionStorage>>,
    navigator: Option<Arc<dyn Navigator>>,
    diagnostics: Option<Arc<dyn DiagnosticSink>>,
}

impl PortalClientBuilder {
    /// Override the derived base URL, mainly for tests against a fake backend
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn execution_context(mut self, context: ExecutionContext) -> Self {
        self.execution_context = context;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn storage(mut self, storage: Arc<dyn SessionStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    pub fn build(self) -> Result<PortalClient, PortalError> {
        let cfg = config::config();
        let base_url = self.base_url.unwrap_or_else(|| {
            resolve_base_url(&self.tenant, &self.execution_context, &cfg.environment)
        });
        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(cfg.http.request_timeout_secs));

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortalError::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(PortalClient {
            tenant: self.tenant,
            base_url,
            http,
            storage: self.storage.unwrap_or_else(|| Arc::new(MemoryJar::new())),
            navigator: self.navigator.unwrap_or_else(|| Arc::new(LoggingNavigator)),
            diagnostics: self.diagnostics.unwrap_or_else(|| Arc::new(TracingSink)),
        })
    }
}

impl PortalClient {
    pub fn builder(tenant: impl Into<String>) -> PortalClientBuilder {
        PortalClientBuilder {
            tenant: tenant.into(),
            base_url: None,
            execution_context: ExecutionContext::Server,
            timeout: None,
            storage: None,
            navigator: None,
            diagnostics: None,
        }
    }

    /// Client with production defaults for a tenant
    pub fn new(tenant: impl Into<String>) -> Result<Self, PortalError> {
        Self::builder(tenant).build()
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // --- Auth operations ---

    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Customer, PortalError> {
        let payload: AuthPayload = self
            .send(Method::POST, "/portal/auth/login/", Some(credentials), false)
            .await?;
        self.persist_session(&payload);
        tracing::debug!("Login succeeded for tenant {}", self.tenant);
        Ok(payload.customer)
    }

    pub async fn register(&self, data: &RegisterData) -> Result<Customer, PortalError> {
        let payload: AuthPayload = self
            .send(Method::POST, "/portal/auth/register/", Some(data), false)
            .await?;
        self.persist_session(&payload);
        Ok(payload.customer)
    }

    /// Best-effort server notification followed by unconditional local
    /// session clearing. Never fails; remote failures are reported to the
    /// diagnostic sink and otherwise ignored.
    pub async fn logout(&self) {
        if self.storage.get(&token_cookie_name(&self.tenant)).is_some() {
            if let Err(err) = self
                .send_unit(Method::POST, "/portal/auth/logout/", None::<&()>, true)
                .await
            {
                self.diagnostics
                    .swallowed("logout notification", err.message());
            }
        }
        storage::clear_session(self.storage.as_ref(), &self.tenant);
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), PortalError> {
        #[derive(Serialize)]
        struct ForgotPassword<'a> {
            email: &'a str,
        }
        self.send_unit(
            Method::POST,
            "/portal/auth/forgot-password/",
            Some(&ForgotPassword { email }),
            false,
        )
        .await
    }

    // --- Portal operations ---

    pub async fn get_dashboard(&self) -> Result<Dashboard, PortalError> {
        self.send(Method::GET, "/portal/dashboard/", None::<&()>, true)
            .await
    }

    pub async fn get_profile(&self) -> Result<Customer, PortalError> {
        self.send(Method::GET, "/portal/profile/", None::<&()>, true)
            .await
    }

    /// Update the profile and refresh the cached snapshot from the response.
    /// On failure the previously cached snapshot is left untouched.
    pub async fn update_profile(&self, data: &ProfileUpdate) -> Result<Customer, PortalError> {
        let customer: Customer = self
            .send(Method::PATCH, "/portal/profile/", Some(data), true)
            .await?;
        self.persist_customer(&customer);
        Ok(customer)
    }

    pub async fn get_service_requests(&self) -> Result<Vec<ServiceRequest>, PortalError> {
        self.send(Method::GET, "/support/requests/", None::<&()>, true)
            .await
    }

    pub async fn get_service_request(&self, id: uuid::Uuid) -> Result<ServiceRequest, PortalError> {
        self.send(
            Method::GET,
            &format!("/support/requests/{}/", id),
            None::<&()>,
            true,
        )
        .await
    }

    pub async fn create_service_request(
        &self,
        data: &NewServiceRequest,
    ) -> Result<ServiceRequest, PortalError> {
        self.send(Method::POST, "/support/requests/", Some(data), true)
            .await
    }

    pub async fn add_comment(
        &self,
        request_id: uuid::Uuid,
        comment: &str,
    ) -> Result<ServiceRequestComment, PortalError> {
        #[derive(Serialize)]
        struct NewComment<'a> {
            comment: &'a str,
        }
        self.send(
            Method::POST,
            &format!("/support/requests/{}/comments/", request_id),
            Some(&NewComment { comment }),
            true,
        )
        .await
    }

    // --- Session reads (no network) ---

    /// Cached customer snapshot for this tenant, if present and parseable
    pub fn get_current_customer(&self) -> Option<Customer> {
        storage::read_customer(
            self.storage.as_ref(),
            &self.tenant,
            self.diagnostics.as_ref(),
        )
    }

    /// True iff both a token and a cached customer exist for this tenant
    pub fn is_authenticated(&self) -> bool {
        self.storage.get(&token_cookie_name(&self.tenant)).is_some()
            && self.get_current_customer().is_some()
    }

    // --- Request pipeline ---

    async fn send<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authed: bool,
    ) -> Result<T, PortalError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let envelope = self.exchange::<T, B>(method, path, body, authed).await?;
        match envelope.data {
            Some(data) => Ok(data),
            None => Err(PortalError::transport(
                "Received an invalid response from the service.",
            )),
        }
    }

    /// Variant for endpoints whose success payload carries no data
    async fn send_unit<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authed: bool,
    ) -> Result<(), PortalError>
    where
        B: Serialize + ?Sized,
    {
        self.exchange::<serde_json::Value, B>(method, path, body, authed)
            .await
            .map(|_| ())
    }

    async fn exchange<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authed: bool,
    ) -> Result<ApiEnvelope<T>, PortalError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);

        if authed {
            if let Some(token) = self.storage.get(&token_cookie_name(&self.tenant)) {
                request = request.bearer_auth(token);
            }
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(PortalError::from)?;
        let status = response.status();

        // The sole automatic session-invalidation trigger
        if status == StatusCode::UNAUTHORIZED && authed {
            self.invalidate_session();
            return Err(PortalError::unauthorized(
                "Your session has expired. Please sign in again.",
            ));
        }

        let envelope: ApiEnvelope<T> = response.json().await.map_err(PortalError::from)?;

        if envelope.success {
            Ok(envelope)
        } else {
            Err(PortalError::rejected(
                envelope
                    .message
                    .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
                envelope.errors,
            ))
        }
    }

    /// Clear tenant-scoped session state and force navigation to the tenant
    /// login page. Runs exactly once per rejected response.
    fn invalidate_session(&self) {
        tracing::warn!("Session rejected for tenant {}, clearing", self.tenant);
        storage::clear_session(self.storage.as_ref(), &self.tenant);
        self.navigator
            .navigate(&format!("/{}/portal/auth/login", self.tenant));
    }

    fn persist_session(&self, payload: &AuthPayload) {
        let cfg = &config::config().session;
        let expires_at = Utc::now() + ChronoDuration::days(cfg.cookie_ttl_days);

        self.storage.set(SessionCookie {
            name: token_cookie_name(&self.tenant),
            value: payload.token.clone(),
            expires_at,
            secure: cfg.secure_cookies,
            same_site_strict: true,
        });
        self.persist_customer(&payload.customer);
    }

    fn persist_customer(&self, customer: &Customer) {
        let cfg = &config::config().session;
        match serde_json::to_string(customer) {
            Ok(snapshot) => {
                self.storage.set(SessionCookie {
                    name: customer_cookie_name(&self.tenant),
                    value: snapshot,
                    expires_at: Utc::now() + ChronoDuration::days(cfg.cookie_ttl_days),
                    secure: cfg.secure_cookies,
                    same_site_strict: true,
                });
            }
            Err(e) => {
                self.diagnostics
                    .swallowed("customer snapshot write", &e.to_string());
            }
        }
    }
}
