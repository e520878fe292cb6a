use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

use accesswash_portal::session::storage::{DiagnosticSink, Navigator};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        let mut cmd = Command::new("target/debug/accesswash-portal");
        cmd.env("PORTAL_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn edge binary")?;

        Ok(Self {
            port,
            base_url,
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "edge server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

#[allow(dead_code)]
pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn edge binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Navigation sink that records every requested location
#[derive(Default)]
pub struct RecordingNavigator(pub Mutex<Vec<String>>);

impl Navigator for RecordingNavigator {
    fn navigate(&self, location: &str) {
        self.0.lock().unwrap().push(location.to_string());
    }
}

/// Diagnostic sink that records every swallowed failure
#[derive(Default)]
pub struct RecordingSink(pub Mutex<Vec<String>>);

impl DiagnosticSink for RecordingSink {
    fn swallowed(&self, context: &str, detail: &str) {
        self.0
            .lock()
            .unwrap()
            .push(format!("{}: {}", context, detail));
    }
}

/// A customer payload as the backend returns it
#[allow(dead_code)]
pub fn sample_customer_json() -> serde_json::Value {
    serde_json::json!({
        "id": "7b1c9a52-72fd-4a3f-9a9e-2f2c8a7d1e10",
        "email": "jane@example.com",
        "phone": "+254700000001",
        "first_name": "Jane",
        "last_name": "Wairimu",
        "account_number": "AW-10442",
        "meter_number": "MTR-5521",
        "property_address": "12 Riverside Drive",
        "email_verified": true,
        "phone_verified": false,
        "created_at": "2025-01-15T08:30:00Z",
        "updated_at": "2025-06-01T10:00:00Z"
    })
}
