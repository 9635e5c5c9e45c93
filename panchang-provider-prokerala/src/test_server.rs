//! In-process stand-in for the Prokerala API, for tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Form, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Days, NaiveDate};
use panchang_core::store::KeyValueStore;
use serde_json::json;

use crate::app_config::AppConfig;
use crate::credential::CredentialManager;

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const TOKEN_LIFETIME_SECS: i64 = 3600;

/// Raw tithi id of the first day served, so a short range crosses into Krishna.
const FIRST_TITHI_ID: u64 = 14;

#[derive(Clone, Copy, PartialEq)]
pub enum PanchangMode {
    Ok,
    ServerError,
    NotOk,
    Garbage,
}

struct MockState {
    token_requests: AtomicUsize,
    api_requests: AtomicUsize,
    revoked: Mutex<Vec<String>>,
    reject_all: AtomicBool,
    mode: Mutex<PanchangMode>,
    last_query: Mutex<HashMap<String, String>>,
}

pub struct MockProvider {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockProvider {
    pub async fn start() -> Self {
        let state = Arc::new(MockState {
            token_requests: AtomicUsize::new(0),
            api_requests: AtomicUsize::new(0),
            revoked: Mutex::new(Vec::new()),
            reject_all: AtomicBool::new(false),
            mode: Mutex::new(PanchangMode::Ok),
            last_query: Mutex::new(HashMap::new()),
        });

        let app = Router::new()
            .route("/token", post(issue_token))
            .route("/v2/astrology/panchang", get(panchang))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockProvider { addr, state }
    }

    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            token_url: format!("http://{}/token", self.addr),
            api_url: format!("http://{}/v2/astrology/panchang", self.addr),
            ..AppConfig::new(CLIENT_ID, CLIENT_SECRET)
        }
    }

    pub fn credential_manager(&self, store: Arc<dyn KeyValueStore>) -> CredentialManager {
        CredentialManager::new(reqwest::Client::new(), &self.app_config(), store)
    }

    pub fn panchang_request(&self, start: &str, end: &str) -> reqwest::RequestBuilder {
        let datetime = format!("{}T00:00:00+00:00", start);
        reqwest::Client::new()
            .get(self.app_config().api_url)
            .query(&[
                ("ayanamsa", "1"),
                ("datetime", datetime.as_str()),
                ("coordinates", "19.076,72.8777"),
                ("date_range", end),
            ])
    }

    pub fn token_requests(&self) -> usize {
        self.state.token_requests.load(Ordering::SeqCst)
    }

    pub fn api_requests(&self) -> usize {
        self.state.api_requests.load(Ordering::SeqCst)
    }

    pub fn revoke(&self, token: &str) {
        self.state.revoked.lock().unwrap().push(token.to_string());
    }

    pub fn reject_all_tokens(&self) {
        self.state.reject_all.store(true, Ordering::SeqCst);
    }

    pub fn set_mode(&self, mode: PanchangMode) {
        *self.state.mode.lock().unwrap() = mode;
    }

    pub fn last_query(&self) -> HashMap<String, String> {
        self.state.last_query.lock().unwrap().clone()
    }
}

async fn issue_token(
    State(state): State<Arc<MockState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let n = state.token_requests.fetch_add(1, Ordering::SeqCst) + 1;

    // Give concurrent callers time to pile up behind this request
    tokio::time::sleep(Duration::from_millis(50)).await;

    let authorized = form.get("grant_type").map(String::as_str) == Some("client_credentials")
        && form.get("client_id").map(String::as_str) == Some(CLIENT_ID)
        && form.get("client_secret").map(String::as_str) == Some(CLIENT_SECRET);

    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "invalid_client",
                "error_description": "Client authentication failed",
            })),
        )
            .into_response();
    }

    Json(json!({
        "access_token": format!("token-{}", n),
        "token_type": "Bearer",
        "expires_in": TOKEN_LIFETIME_SECS,
        "scope": "",
    }))
    .into_response()
}

async fn panchang(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.api_requests.fetch_add(1, Ordering::SeqCst);
    *state.last_query.lock().unwrap() = query.clone();

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string();

    let revoked = state.revoked.lock().unwrap().contains(&token);
    if token.is_empty() || revoked || state.reject_all.load(Ordering::SeqCst) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "status": "error",
                "errors": [{"title": "Unauthorized", "detail": "Invalid token"}],
            })),
        )
            .into_response();
    }

    let mode = *state.mode.lock().unwrap();
    match mode {
        PanchangMode::ServerError => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
        }
        PanchangMode::NotOk => {
            return Json(json!({
                "status": "error",
                "errors": [{"title": "Validation Error", "detail": "Invalid coordinates"}],
            }))
            .into_response();
        }
        PanchangMode::Garbage => {
            return Json(json!({"status": "ok", "data": {"days": "soon"}})).into_response();
        }
        PanchangMode::Ok => {}
    }

    let start = query
        .get("datetime")
        .and_then(|dt| NaiveDate::parse_from_str(&dt[..10], "%Y-%m-%d").ok());
    let end = query
        .get("date_range")
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
    let (Some(start), Some(end)) = (start, end) else {
        return (StatusCode::BAD_REQUEST, "bad query").into_response();
    };

    let days: Vec<_> = (0..=(end - start).num_days() as u64)
        .map(|offset| {
            let date = start.checked_add_days(Days::new(offset)).unwrap();
            let tithi_id = (FIRST_TITHI_ID - 1 + offset) % 30 + 1;
            let festivals = if offset == 0 {
                json!(["Holi", {"name": "Dhulandi"}])
            } else {
                json!([])
            };
            json!({
                "datetime": format!("{}T00:00:00+05:30", date),
                "tithi": [{"id": tithi_id, "name": "ignored", "paksha": "ignored"}],
                "nakshatra": [{"id": 8, "name": "Pushya"}],
                "yoga": [{"id": 5, "name": "Shobhana"}],
                "karana": [{"id": 3, "name": "Kaulava"}, {"id": 4, "name": "Taitila"}],
                "sunrise": format!("{}T06:52:13+05:30", date),
                "sunset": format!("{}T18:47:02+05:30", date),
                "moonrise": format!("{}T19:01:00+05:30", date),
                "festivals": festivals,
            })
        })
        .collect();

    Json(json!({"status": "ok", "data": {"days": days}})).into_response()
}
