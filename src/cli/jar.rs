//! File-backed cookie jar for the CLI.
//!
//! Persists tenant-scoped session cookies as JSON under the user config
//! directory, so `portal auth login` survives across invocations. Storage
//! failures degrade to "no session" with a log entry, matching the portal
//! storage policy.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::session::storage::{SessionCookie, SessionStorage};

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("PORTAL_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME")
            .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home)
            .join(".config")
            .join("accesswash")
            .join("portal")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct JarFile {
    cookies: HashMap<String, SessionCookie>,
}

pub struct FileJar {
    path: PathBuf,
    cookies: Mutex<HashMap<String, SessionCookie>>,
}

impl FileJar {
    pub fn open() -> anyhow::Result<Self> {
        let path = get_config_dir()?.join("cookies.json");

        let cookies = if path.exists() {
            let content = fs::read_to_string(&path)?;
            match serde_json::from_str::<JarFile>(&content) {
                Ok(file) => file.cookies,
                Err(e) => {
                    tracing::warn!("Discarding corrupt cookie jar at {:?}: {}", path, e);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            cookies: Mutex::new(cookies),
        })
    }

    fn save(&self, cookies: &HashMap<String, SessionCookie>) {
        let file = JarFile {
            cookies: cookies.clone(),
        };
        let result = serde_json::to_string_pretty(&file)
            .map_err(|e| e.to_string())
            .and_then(|content| fs::write(&self.path, content).map_err(|e| e.to_string()));
        if let Err(e) = result {
            tracing::warn!("Failed to persist cookie jar at {:?}: {}", self.path, e);
        }
    }
}

impl SessionStorage for FileJar {
    fn get(&self, name: &str) -> Option<String> {
        let mut cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(cookie) = cookies.get(name) {
            if cookie.expires_at <= Utc::now() {
                cookies.remove(name);
                self.save(&cookies);
                return None;
            }
            return Some(cookie.value.clone());
        }
        None
    }

    fn set(&self, cookie: SessionCookie) {
        let mut cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        cookies.insert(cookie.name.clone(), cookie);
        self.save(&cookies);
    }

    fn remove(&self, name: &str) {
        let mut cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        if cookies.remove(name).is_some() {
            self.save(&cookies);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn scoped_jar(dir: &std::path::Path) -> FileJar {
        std::env::set_var("PORTAL_CLI_CONFIG_DIR", dir);
        let jar = FileJar::open().expect("jar should open in temp dir");
        std::env::remove_var("PORTAL_CLI_CONFIG_DIR");
        jar
    }

    #[test]
    fn test_roundtrip_across_instances() {
        let dir = std::env::temp_dir().join(format!("portal-jar-{}", uuid::Uuid::new_v4()));
        let jar = scoped_jar(&dir);
        jar.set(SessionCookie {
            name: "accesswash_token_acme".to_string(),
            value: "tok".to_string(),
            expires_at: Utc::now() + Duration::days(7),
            secure: false,
            same_site_strict: true,
        });
        drop(jar);

        let jar = scoped_jar(&dir);
        assert_eq!(jar.get("accesswash_token_acme"), Some("tok".to_string()));
    }
}
