mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use accesswash_portal::client::PortalClient;
use accesswash_portal::session::storage::MemoryJar;
use accesswash_portal::session::{AuthState, AuthStore};
use accesswash_portal::types::LoginCredentials;

use common::sample_customer_json;

async fn client_for(backend: &MockServer, jar: Arc<MemoryJar>) -> PortalClient {
    PortalClient::builder("acme")
        .base_url(backend.uri())
        .storage(jar)
        .timeout(Duration::from_secs(2))
        .build()
        .expect("client should build")
}

fn credentials() -> LoginCredentials {
    LoginCredentials {
        email: "jane@example.com".to_string(),
        password: "hunter2".to_string(),
    }
}

#[tokio::test]
async fn login_success_transitions_to_authenticated() -> Result<()> {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/portal/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "token": "tok-1", "customer": sample_customer_json() }
        })))
        .mount(&backend)
        .await;

    let client = client_for(&backend, Arc::new(MemoryJar::new())).await;
    let mut store = AuthStore::new();
    store.login(&client, &credentials()).await;

    let state = store.state();
    assert!(state.is_authenticated());
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert_eq!(
        state.customer.as_ref().map(|c| c.email.as_str()),
        Some("jane@example.com")
    );
    Ok(())
}

#[tokio::test]
async fn login_failure_retains_the_error_until_the_next_action() -> Result<()> {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/portal/auth/login/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "message": "Invalid email or password"
        })))
        .mount(&backend)
        .await;

    let client = client_for(&backend, Arc::new(MemoryJar::new())).await;
    let mut store = AuthStore::new();
    store.login(&client, &credentials()).await;

    assert!(!store.state().is_authenticated());
    assert_eq!(
        store.state().error.as_deref(),
        Some("Invalid email or password")
    );

    // Explicit clear drops the message
    store.clear_error();
    assert!(store.state().error.is_none());
    Ok(())
}

#[tokio::test]
async fn logout_is_idempotent() -> Result<()> {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/portal/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "token": "tok-1", "customer": sample_customer_json() }
        })))
        .mount(&backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/portal/auth/logout/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&backend)
        .await;

    let client = client_for(&backend, Arc::new(MemoryJar::new())).await;
    let mut store = AuthStore::new();
    store.login(&client, &credentials()).await;
    assert!(store.state().is_authenticated());

    store.logout(&client).await;
    assert_eq!(*store.state(), AuthState::default());

    // A second logout never raises and lands in the same state
    store.logout(&client).await;
    assert_eq!(*store.state(), AuthState::default());
    Ok(())
}

#[tokio::test]
async fn load_from_storage_restores_a_persisted_session() -> Result<()> {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/portal/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "token": "tok-1", "customer": sample_customer_json() }
        })))
        .mount(&backend)
        .await;

    let jar = Arc::new(MemoryJar::new());
    let client = client_for(&backend, jar.clone()).await;
    let mut store = AuthStore::new();
    store.login(&client, &credentials()).await;

    // A fresh store over the same storage picks the session up without
    // a network round trip
    let fresh_client = client_for(&backend, jar).await;
    let mut fresh_store = AuthStore::new();
    fresh_store.load_from_storage(&fresh_client);

    assert!(fresh_store.state().is_authenticated());
    assert!(!fresh_store.state().loading);
    Ok(())
}

#[tokio::test]
async fn load_from_storage_with_no_session_stays_unauthenticated() -> Result<()> {
    let backend = MockServer::start().await;
    let client = client_for(&backend, Arc::new(MemoryJar::new())).await;

    let mut store = AuthStore::new();
    store.load_from_storage(&client);

    assert_eq!(*store.state(), AuthState::default());
    Ok(())
}

#[tokio::test]
async fn forgot_password_completes_without_authenticating() -> Result<()> {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/portal/auth/forgot-password/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Reset email sent"
        })))
        .mount(&backend)
        .await;

    let client = client_for(&backend, Arc::new(MemoryJar::new())).await;
    let mut store = AuthStore::new();
    store.forgot_password(&client, "jane@example.com").await;

    assert!(!store.state().is_authenticated());
    assert!(store.state().error.is_none());
    Ok(())
}

#[tokio::test]
async fn forgot_password_failure_surfaces_the_message() -> Result<()> {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/portal/auth/forgot-password/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "message": "No account for that email"
        })))
        .mount(&backend)
        .await;

    let client = client_for(&backend, Arc::new(MemoryJar::new())).await;
    let mut store = AuthStore::new();
    store.forgot_password(&client, "nobody@example.com").await;

    assert_eq!(
        store.state().error.as_deref(),
        Some("No account for that email")
    );
    Ok(())
}

#[tokio::test]
async fn reset_prepares_the_store_for_a_tenant_change() -> Result<()> {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/portal/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "token": "tok-1", "customer": sample_customer_json() }
        })))
        .mount(&backend)
        .await;

    let client = client_for(&backend, Arc::new(MemoryJar::new())).await;
    let mut store = AuthStore::new();
    store.login(&client, &credentials()).await;
    assert!(store.state().is_authenticated());

    store.reset();
    assert_eq!(*store.state(), AuthState::default());
    Ok(())
}
