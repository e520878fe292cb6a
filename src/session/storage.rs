//! Tenant-scoped session storage.
//!
//! Sessions live in cookie storage under names namespaced by tenant, so
//! operations scoped to one tenant can never read or clear another's
//! session. Reads degrade to "no session" on corrupt or missing data;
//! the swallowing is explicit and reported through [`DiagnosticSink`].

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::types::Customer;

pub fn token_cookie_name(tenant: &str) -> String {
    format!("accesswash_token_{}", tenant)
}

pub fn customer_cookie_name(tenant: &str) -> String {
    format!("accesswash_customer_{}", tenant)
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Corrupt session snapshot: {0}")]
    Corrupt(String),
    #[error("Storage I/O error: {0}")]
    Io(String),
}

/// A cookie as the portal persists it. Expiry is enforced on read;
/// `secure` and `same_site_strict` mirror the browser attributes and are
/// carried so file-backed jars can round-trip them.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub expires_at: DateTime<Utc>,
    pub secure: bool,
    pub same_site_strict: bool,
}

/// Persistent cookie storage. Implementations are shared across clients,
/// accessed without cross-call locking; concurrent writers are
/// last-writer-wins.
pub trait SessionStorage: Send + Sync {
    /// Read a live cookie value. Expired entries behave as absent.
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, cookie: SessionCookie);
    fn remove(&self, name: &str);
}

/// Sink for failures the session layer swallows on purpose (storage reads,
/// logout notifications). Keeps them observable without blocking the user.
pub trait DiagnosticSink: Send + Sync {
    fn swallowed(&self, context: &str, detail: &str);
}

/// Default sink: swallowed failures land in the log
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn swallowed(&self, context: &str, detail: &str) {
        tracing::warn!("Swallowed failure in {}: {}", context, detail);
    }
}

/// Browser navigation seam. The client forces a navigation to the tenant
/// login page on session invalidation; outside a browser the default
/// implementation records the intent in the log.
pub trait Navigator: Send + Sync {
    fn navigate(&self, location: &str);
}

pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, location: &str) {
        tracing::info!("Navigation requested: {}", location);
    }
}

/// In-memory cookie jar modeling per-browser cookie storage
#[derive(Default)]
pub struct MemoryJar {
    cookies: Mutex<HashMap<String, SessionCookie>>,
}

impl MemoryJar {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryJar {
    fn get(&self, name: &str) -> Option<String> {
        let mut cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(cookie) = cookies.get(name) {
            if cookie.expires_at <= Utc::now() {
                cookies.remove(name);
                return None;
            }
            return Some(cookie.value.clone());
        }
        None
    }

    fn set(&self, cookie: SessionCookie) {
        let mut cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        cookies.insert(cookie.name.clone(), cookie);
    }

    fn remove(&self, name: &str) {
        let mut cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        cookies.remove(name);
    }
}

/// Remove both session cookies for a tenant. Cookies belonging to other
/// tenants are untouched.
pub fn clear_session(storage: &dyn SessionStorage, tenant: &str) {
    storage.remove(&token_cookie_name(tenant));
    storage.remove(&customer_cookie_name(tenant));
}

/// Read the cached customer snapshot for a tenant. Absent or unparseable
/// snapshots degrade to `None`; parse failures are reported, never raised.
pub fn read_customer(
    storage: &dyn SessionStorage,
    tenant: &str,
    diagnostics: &dyn DiagnosticSink,
) -> Option<Customer> {
    let raw = storage.get(&customer_cookie_name(tenant))?;
    match serde_json::from_str::<Customer>(&raw) {
        Ok(customer) => Some(customer),
        Err(e) => {
            let err = StorageError::Corrupt(e.to_string());
            diagnostics.swallowed("customer snapshot read", &err.to_string());
            None
        }
    }
}
