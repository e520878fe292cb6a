use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub platform: PlatformConfig,
    pub http: HttpConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Root domain all tenant subdomains hang off, e.g. `utility1.accesswash.org`
    pub root_domain: String,
    /// Hostnames treated as local development (tenant comes from the path there)
    pub local_hosts: Vec<String>,
    /// Port the backend API listens on during local development
    pub dev_api_port: u16,
    /// Tenant used when no signal is present in the URL or host
    pub default_tenant: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub cookie_ttl_days: i64,
    pub secure_cookies: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Platform overrides
        if let Ok(v) = env::var("PORTAL_ROOT_DOMAIN") {
            if !v.is_empty() {
                self.platform.root_domain = v;
            }
        }
        if let Ok(v) = env::var("PORTAL_LOCAL_HOSTS") {
            self.platform.local_hosts = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("PORTAL_DEV_API_PORT") {
            self.platform.dev_api_port = v.parse().unwrap_or(self.platform.dev_api_port);
        }
        if let Ok(v) = env::var("PORTAL_DEFAULT_TENANT") {
            if !v.is_empty() {
                self.platform.default_tenant = v;
            }
        }

        // HTTP overrides
        if let Ok(v) = env::var("PORTAL_REQUEST_TIMEOUT_SECS") {
            self.http.request_timeout_secs = v.parse().unwrap_or(self.http.request_timeout_secs);
        }

        // Session overrides
        if let Ok(v) = env::var("PORTAL_COOKIE_TTL_DAYS") {
            self.session.cookie_ttl_days = v.parse().unwrap_or(self.session.cookie_ttl_days);
        }
        if let Ok(v) = env::var("PORTAL_SECURE_COOKIES") {
            self.session.secure_cookies = v.parse().unwrap_or(self.session.secure_cookies);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            platform: PlatformConfig {
                root_domain: "accesswash.org".to_string(),
                local_hosts: vec![
                    "localhost".to_string(),
                    "127.0.0.1".to_string(),
                    "0.0.0.0".to_string(),
                ],
                dev_api_port: 8000,
                default_tenant: "demo".to_string(),
            },
            http: HttpConfig {
                request_timeout_secs: 10,
            },
            session: SessionConfig {
                cookie_ttl_days: 7,
                secure_cookies: false,
            },
        }
    }

    fn staging() -> Self {
        Self {
            session: SessionConfig {
                cookie_ttl_days: 7,
                secure_cookies: true,
            },
            environment: Environment::Staging,
            ..Self::development()
        }
    }

    fn production() -> Self {
        Self {
            session: SessionConfig {
                cookie_ttl_days: 7,
                secure_cookies: true,
            },
            environment: Environment::Production,
            ..Self::development()
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.platform.root_domain, "accesswash.org");
        assert_eq!(config.platform.default_tenant, "demo");
        assert_eq!(config.http.request_timeout_secs, 10);
        assert!(!config.session.secure_cookies);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.session.cookie_ttl_days, 7);
        assert!(config.session.secure_cookies);
        assert_eq!(config.environment, Environment::Production);
    }
}
