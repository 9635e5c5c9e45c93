//! Bearer credential for the Prokerala API (OAuth client-credentials grant).
//!
//! The credential lives in memory and in a persisted store so it survives
//! restarts. Concurrent callers that find it expired share a single token
//! request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};
use panchang_core::constants::TOKEN_SAFETY_BUFFER;
use panchang_core::store::KeyValueStore;
use panchang_core::{PanchangError, PanchangResult};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::app_config::AppConfig;

/// Key of the credential inside the credential store.
const STORE_KEY: &str = "prokerala";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub token_type: String,
    pub expires_in_seconds: i64,
    pub issued_at_epoch_millis: i64,
}

impl Credential {
    pub fn expires_at_millis(&self) -> i64 {
        self.issued_at_epoch_millis + self.expires_in_seconds * 1000
    }

    /// Valid until the safety buffer before the provider's expiry.
    pub fn is_valid_at(&self, now_millis: i64) -> bool {
        now_millis < self.expires_at_millis() - TOKEN_SAFETY_BUFFER.as_millis() as i64
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now().timestamp_millis())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    expires_in: i64,
    #[serde(default)]
    scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

type RefreshFuture = Shared<BoxFuture<'static, PanchangResult<Credential>>>;

struct Inner {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    store: Arc<dyn KeyValueStore>,
    current: Mutex<Option<Credential>>,
    in_flight: tokio::sync::Mutex<Option<(u64, RefreshFuture)>>,
    next_refresh_id: AtomicU64,
}

/// Owns the provider credential. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CredentialManager {
    inner: Arc<Inner>,
}

impl CredentialManager {
    pub fn new(http: reqwest::Client, config: &AppConfig, store: Arc<dyn KeyValueStore>) -> Self {
        CredentialManager {
            inner: Arc::new(Inner {
                http,
                token_url: config.token_url.clone(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                store,
                current: Mutex::new(None),
                in_flight: tokio::sync::Mutex::new(None),
                next_refresh_id: AtomicU64::new(0),
            }),
        }
    }

    /// A bearer token valid for at least the safety buffer.
    pub async fn get_valid_token(&self) -> PanchangResult<String> {
        Ok(self.valid_credential().await?.access_token)
    }

    pub async fn valid_credential(&self) -> PanchangResult<Credential> {
        let (id, refresh) = {
            let mut in_flight = self.inner.in_flight.lock().await;
            // A finished refresh whose owner was cancelled before clearing it
            if matches!(in_flight.as_ref(), Some((_, refresh)) if refresh.peek().is_some()) {
                *in_flight = None;
            }
            match in_flight.as_ref() {
                Some((id, refresh)) => (*id, refresh.clone()),
                None => {
                    if let Some(credential) = self.inner.cached().await {
                        return Ok(credential);
                    }
                    let id = self.inner.next_refresh_id.fetch_add(1, Ordering::Relaxed);
                    let refresh = Inner::issue(self.inner.clone()).boxed().shared();
                    *in_flight = Some((id, refresh.clone()));
                    (id, refresh)
                }
            }
        };

        let result = refresh.await;

        let mut in_flight = self.inner.in_flight.lock().await;
        if matches!(in_flight.as_ref(), Some((current, _)) if *current == id) {
            *in_flight = None;
        }
        result
    }

    /// Forget the credential, in memory and on disk. No network call.
    pub async fn invalidate(&self) {
        self.inner.set_current(None);
        self.inner.forget_persisted().await;
    }

    /// Send `request` with a bearer token. On 401 the token is dropped,
    /// re-issued once, and the request retried once; the retry's response
    /// is returned whatever it is.
    pub async fn make_authenticated_request(
        &self,
        request: reqwest::RequestBuilder,
    ) -> PanchangResult<reqwest::Response> {
        let retry = request
            .try_clone()
            .ok_or_else(|| PanchangError::Fetch("request cannot be retried".into()))?;

        let token = self.get_valid_token().await?;
        let response = request
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| PanchangError::Fetch(format!("Failed to reach provider: {}", e)))?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::info!("provider rejected bearer token, re-issuing");
        self.invalidate_if_current(&token).await;

        let token = self.get_valid_token().await?;
        retry
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| PanchangError::Fetch(format!("Failed to reach provider: {}", e)))
    }

    /// Another caller may already have replaced the rejected token; keep theirs.
    async fn invalidate_if_current(&self, rejected: &str) {
        let held = self
            .inner
            .current()
            .map(|c| c.access_token == rejected)
            .unwrap_or(true);
        if held {
            self.invalidate().await;
        }
    }
}

impl Inner {
    fn current(&self) -> Option<Credential> {
        self.current.lock().ok().and_then(|c| c.clone())
    }

    fn set_current(&self, credential: Option<Credential>) {
        if let Ok(mut current) = self.current.lock() {
            *current = credential;
        }
    }

    /// A still-valid credential from memory, else from the persisted store.
    async fn cached(&self) -> Option<Credential> {
        if let Some(credential) = self.current().filter(Credential::is_valid) {
            return Some(credential);
        }

        let persisted = match self.store.get(STORE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "could not read persisted credential");
                return None;
            }
        };

        match serde_json::from_str::<Credential>(&persisted) {
            Ok(credential) if credential.is_valid() => {
                tracing::debug!("using persisted credential");
                self.set_current(Some(credential.clone()));
                Some(credential)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable persisted credential");
                None
            }
        }
    }

    async fn forget_persisted(&self) {
        if let Err(e) = self.store.delete(STORE_KEY).await {
            tracing::warn!(error = %e, "could not delete persisted credential");
        }
    }

    async fn persist(&self, credential: &Credential) {
        let raw = match serde_json::to_string(credential) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "could not serialize credential");
                return;
            }
        };
        if let Err(e) = self.store.put(STORE_KEY, raw).await {
            tracing::warn!(error = %e, "could not persist credential");
        }
    }

    /// Exchange the client credentials for a new bearer token.
    async fn issue(self: Arc<Self>) -> PanchangResult<Credential> {
        tracing::info!(url = %self.token_url, "requesting access token");

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PanchangError::Auth(format!("Failed to send token request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PanchangError::Auth(format!(
                "Token request failed ({}): {}",
                status,
                provider_message(&body)
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| PanchangError::Auth(format!("Failed to parse token response: {}", e)))?;

        tracing::debug!(scope = token.scope.as_deref().unwrap_or(""), "token granted");

        let credential = Credential {
            access_token: token.access_token,
            token_type: token.token_type,
            expires_in_seconds: token.expires_in,
            issued_at_epoch_millis: Utc::now().timestamp_millis(),
        };

        self.set_current(Some(credential.clone()));
        self.persist(&credential).await;
        tracing::debug!(expires_in = credential.expires_in_seconds, "access token issued");

        Ok(credential)
    }
}

/// `error_description`, else `error`, else the raw body.
fn provider_message(body: &str) -> String {
    match serde_json::from_str::<TokenErrorResponse>(body) {
        Ok(TokenErrorResponse {
            error_description: Some(description),
            ..
        }) => description,
        Ok(TokenErrorResponse {
            error: Some(error), ..
        }) => error,
        _ if body.trim().is_empty() => "no response body".to_string(),
        _ => body.trim().to_string(),
    }
}
