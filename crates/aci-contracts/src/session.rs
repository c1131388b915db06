//! APIC Session
//!
//! Logs in once with `aaaLogin` and keeps the issued token for every later
//! read. Reads never fail loudly: any transport problem is logged and
//! surfaces as "no data".

use crate::models::ImData;
use crate::{AciError, Result};
use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Cookie the APIC expects the login token in
const TOKEN_COOKIE: &str = "APIC-cookie";

/// Read-only source of APIC objects
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Fetch an object path; `None` when the call produced no usable data
    async fn fetch(&self, path: &str) -> Option<ImData>;
}

/// Connection settings for one fabric
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub base_url: String,
    pub verify_tls: bool,
    pub timeout: Duration,
}

impl SessionConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Accepts a bare host (`10.1.1.1`) or a full URL
    pub fn new(apic: &str) -> Self {
        let apic = apic.trim().trim_end_matches('/');
        let base_url = if apic.contains("://") {
            apic.to_string()
        } else {
            format!("https://{}", apic)
        };

        Self {
            base_url,
            verify_tls: false,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Authenticated APIC session
pub struct ApicSession {
    client: Client,
    base_url: String,
    token: String,
}

impl ApicSession {
    /// Log in and keep the session token for the rest of the run
    pub async fn authenticate(config: &SessionConfig, username: &str, password: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        let url = format!("{}/api/aaaLogin.json", config.base_url);
        debug!("POST {}", url);

        let response = client
            .post(&url)
            .json(&serde_json::json!({
                "aaaUser": {
                    "attributes": {
                        "name": username,
                        "pwd": password
                    }
                }
            }))
            .send()
            .await
            .map_err(|e| AciError::Auth(format!("cannot reach {}: {}", config.base_url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AciError::Auth(format!("login rejected with status {}", status)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AciError::Auth(format!("unreadable login response: {}", e)))?;

        let token = ImData::from_value(body)
            .first_of("aaaLogin")
            .and_then(|attrs| attrs.get("token"))
            .filter(|token| !token.is_empty())
            .map(String::from)
            .ok_or_else(|| AciError::Auth("no session token in login response".to_string()))?;

        info!("Authenticated with APIC {} as {}", config.base_url, username);

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `<base>/api<path>`; `None` on any failure
    pub async fn fetch_json(&self, path: &str) -> Option<Value> {
        match self.get(path).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("GET {} returned no data: {}", path, e);
                None
            }
        }
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let url = format!("{}/api{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(COOKIE, format!("{}={}", TOKEN_COOKIE, self.token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AciError::Api(format!("{} - {}", status, url)));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ObjectSource for ApicSession {
    async fn fetch(&self, path: &str) -> Option<ImData> {
        self.fetch_json(path).await.map(ImData::from_value)
    }
}
