//! Authentication session store.
//!
//! An explicit context object, not a process-wide global: callers construct
//! one per tenant scope, hand it the tenant-bound [`PortalClient`] for each
//! action, and reset it when the tenant changes. It never holds more than
//! one tenant's state at a time.

use crate::client::PortalClient;
use crate::error::PortalError;
use crate::types::{Customer, LoginCredentials, ProfileUpdate, RegisterData};

/// Reactive authentication state consumed by UI surfaces.
///
/// The state machine has four shapes: idle (nothing loaded), loading (an
/// action is in flight), authenticated (customer cached) and
/// unauthenticated with an optional retained error message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub customer: Option<Customer>,
    pub loading: bool,
    pub error: Option<String>,
}

impl AuthState {
    /// True iff a customer snapshot is cached for the active tenant. The
    /// store only caches one after both token and snapshot were persisted.
    pub fn is_authenticated(&self) -> bool {
        self.customer.is_some()
    }
}

#[derive(Debug, Default)]
pub struct AuthStore {
    state: AuthState,
}

impl AuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// Drop all held state, for tenant changes. The next caller must
    /// re-initialize with `load_from_storage` for the new tenant.
    pub fn reset(&mut self) {
        self.state = AuthState::default();
    }

    /// Error messages are retained until explicitly cleared or until the
    /// next action begins.
    pub fn clear_error(&mut self) {
        self.state.error = None;
    }

    /// Initialize from persisted session state without a network round
    /// trip. Does not set `loading`.
    pub fn load_from_storage(&mut self, client: &PortalClient) {
        if client.is_authenticated() {
            self.state.customer = client.get_current_customer();
        } else {
            self.state.customer = None;
        }
        self.state.error = None;
    }

    pub async fn login(&mut self, client: &PortalClient, credentials: &LoginCredentials) {
        self.begin();
        match client.login(credentials).await {
            Ok(customer) => self.finish_authenticated(customer),
            Err(err) => self.finish_unauthenticated(Some(err)),
        }
    }

    pub async fn register(&mut self, client: &PortalClient, data: &RegisterData) {
        self.begin();
        match client.register(data).await {
            Ok(customer) => self.finish_authenticated(customer),
            Err(err) => self.finish_unauthenticated(Some(err)),
        }
    }

    /// Always lands in unauthenticated with no error, regardless of the
    /// remote outcome.
    pub async fn logout(&mut self, client: &PortalClient) {
        self.begin();
        client.logout().await;
        self.finish_unauthenticated(None);
    }

    pub async fn forgot_password(&mut self, client: &PortalClient, email: &str) {
        self.begin();
        match client.forgot_password(email).await {
            Ok(()) => self.finish_unauthenticated(None),
            Err(err) => self.finish_unauthenticated(Some(err)),
        }
    }

    /// Profile refresh through the store, so UI state tracks the canonical
    /// record after an edit. Failure keeps the current customer.
    pub async fn update_profile(&mut self, client: &PortalClient, data: &ProfileUpdate) {
        self.begin();
        match client.update_profile(data).await {
            Ok(customer) => self.finish_authenticated(customer),
            Err(err) => {
                self.state.loading = false;
                self.state.error = Some(err.message().to_string());
            }
        }
    }

    fn begin(&mut self) {
        self.state.loading = true;
        self.state.error = None;
    }

    fn finish_authenticated(&mut self, customer: Customer) {
        self.state = AuthState {
            customer: Some(customer),
            loading: false,
            error: None,
        };
    }

    fn finish_unauthenticated(&mut self, error: Option<PortalError>) {
        self.state = AuthState {
            customer: None,
            loading: false,
            error: error.map(|e| e.message().to_string()),
        };
    }
}
