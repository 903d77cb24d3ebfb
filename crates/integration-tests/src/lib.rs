//! Integration tests for Dogfinder.
//!
//! Every test runs the real web router in-process against [`FakeDogApi`], a
//! small axum server that speaks the remote dog API's shapes. Both listen on
//! ephemeral ports, so tests run in parallel without setup.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p dogfinder-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth_flow` - Login validation, login and logout
//! - `search_flow` - URL filters, paging, session expiry
//! - `favorites_flow` - Toggle, cap, clear and match
//! - `search_race` - Superseded navigations never overwrite newer ones

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::{Query, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::{Next, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use dogfinder_core::{Dog, DogId};
use dogfinder_web::{AppState, WebConfig};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use url::form_urlencoded;

/// Breeds served by the fake API, with how many dogs each has.
pub const FAKE_BREEDS: [(&str, u32); 3] = [("Akita", 5), ("Beagle", 30), ("Poodle", 60)];

/// Cookie the fake API sets on login.
const TOKEN_COOKIE: &str = "fetch-access-token";

// =============================================================================
// Fake dog API
// =============================================================================

/// One request seen by the fake API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
}

impl RecordedCall {
    /// Decoded query parameters.
    #[must_use]
    pub fn params(&self) -> HashMap<String, String> {
        self.query
            .as_deref()
            .map(|query| form_urlencoded::parse(query.as_bytes()).into_owned().collect())
            .unwrap_or_default()
    }
}

struct FakeState {
    dogs: Vec<Dog>,
    calls: Mutex<Vec<RecordedCall>>,
    delays: Mutex<HashMap<String, Duration>>,
    rejected: Mutex<HashSet<String>>,
    revoked: AtomicBool,
    logins: AtomicU32,
}

/// In-process stand-in for the remote dog API.
///
/// Every endpoint except login answers 401 unless the request carries the
/// cookie handed out at login, and every request is recorded.
#[derive(Clone)]
pub struct FakeDogApi {
    addr: SocketAddr,
    state: Arc<FakeState>,
}

impl FakeDogApi {
    /// Start the fake API on an ephemeral port.
    pub async fn spawn() -> Self {
        let state = Arc::new(FakeState {
            dogs: fake_dogs(),
            calls: Mutex::new(Vec::new()),
            delays: Mutex::new(HashMap::new()),
            rejected: Mutex::new(HashSet::new()),
            revoked: AtomicBool::new(false),
            logins: AtomicU32::new(0),
        });

        let router = Router::new()
            .route("/auth/login", post(fake_login))
            .route("/auth/logout", post(fake_logout))
            .route("/dogs/breeds", get(fake_breeds))
            .route("/dogs/search", get(fake_search))
            .route("/dogs", post(fake_dogs_by_id))
            .route("/dogs/match", post(fake_match))
            .layer(from_fn_with_state(Arc::clone(&state), record_call))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake dog API");
        let addr = listener.local_addr().expect("Failed to read fake API address");
        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Fake dog API stopped");
        });

        Self { addr, state }
    }

    /// Root URL of the fake API.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Every recorded request to `path`, oldest first.
    #[must_use]
    pub fn calls(&self, path: &str) -> Vec<RecordedCall> {
        self.state
            .calls
            .lock()
            .expect("call log poisoned")
            .iter()
            .filter(|call| call.path == path)
            .cloned()
            .collect()
    }

    /// Number of recorded requests to `path`.
    #[must_use]
    pub fn call_count(&self, path: &str) -> usize {
        self.calls(path).len()
    }

    /// Reject every session handed out so far, as an expired token would be.
    pub fn revoke_sessions(&self) {
        self.state.revoked.store(true, Ordering::SeqCst);
    }

    /// Accept sessions again.
    pub fn restore_sessions(&self) {
        self.state.revoked.store(false, Ordering::SeqCst);
    }

    /// Answer 401 at `path` only, leaving other endpoints working.
    pub fn reject_endpoint(&self, path: &str) {
        self.state
            .rejected
            .lock()
            .expect("rejection table poisoned")
            .insert(path.to_string());
    }

    /// Delay search answers for `breed`.
    pub fn delay_breed(&self, breed: &str, delay: Duration) {
        self.state
            .delays
            .lock()
            .expect("delay table poisoned")
            .insert(breed.to_string(), delay);
    }

    /// Records of `breed` in the fake catalog, in id order.
    #[must_use]
    pub fn dogs_of(&self, breed: &str) -> Vec<Dog> {
        self.state
            .dogs
            .iter()
            .filter(|dog| dog.breed == breed)
            .cloned()
            .collect()
    }
}

fn fake_dogs() -> Vec<Dog> {
    FAKE_BREEDS
        .iter()
        .flat_map(|(breed, count)| {
            (0..*count).map(move |i| {
                let id = format!("{}-{i:03}", breed.to_lowercase());
                Dog {
                    img: format!("https://images.test/{id}.jpg"),
                    id: DogId::from(id.as_str()),
                    name: format!("{breed} {i}"),
                    age: i % 15,
                    zip_code: format!("{:05}", 10_000 + i),
                    breed: (*breed).to_string(),
                }
            })
        })
        .collect()
}

async fn record_call(State(state): State<Arc<FakeState>>, request: Request, next: Next) -> Response {
    let call = RecordedCall {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
    };
    let rejected = state
        .rejected
        .lock()
        .expect("rejection table poisoned")
        .contains(&call.path);
    state.calls.lock().expect("call log poisoned").push(call);
    if rejected {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    next.run(request).await
}

fn authorized(state: &FakeState, headers: &HeaderMap) -> bool {
    let has_token = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|cookie| cookie.contains(&format!("{TOKEN_COOKIE}=")));
    has_token && !state.revoked.load(Ordering::SeqCst)
}

#[derive(Deserialize)]
struct LoginBody {
    name: String,
    email: String,
}

async fn fake_login(State(state): State<Arc<FakeState>>, Json(body): Json<LoginBody>) -> Response {
    if body.name.is_empty() || body.email.is_empty() {
        return StatusCode::BAD_REQUEST.into_response();
    }
    let n = state.logins.fetch_add(1, Ordering::SeqCst);
    let cookie = format!("{TOKEN_COOKIE}=token-{n}; Path=/; HttpOnly; SameSite=None");
    ([(header::SET_COOKIE, cookie)], "OK").into_response()
}

async fn fake_logout() -> &'static str {
    "OK"
}

async fn fake_breeds(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let breeds: Vec<&str> = FAKE_BREEDS.iter().map(|(breed, _)| *breed).collect();
    Json(breeds).into_response()
}

#[derive(Deserialize)]
struct SearchParams {
    breeds: Option<String>,
    size: usize,
    from: usize,
    sort: String,
}

async fn fake_search(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Response {
    if !authorized(&state, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    if let Some(breed) = &params.breeds {
        let delay = state
            .delays
            .lock()
            .expect("delay table poisoned")
            .get(breed)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    let mut matching: Vec<&Dog> = state
        .dogs
        .iter()
        .filter(|dog| params.breeds.as_ref().is_none_or(|breed| &dog.breed == breed))
        .collect();

    let (field, direction) = params.sort.split_once(':').unwrap_or(("breed", "asc"));
    matching.sort_by(|a, b| {
        let ordering = match field {
            "name" => a.name.cmp(&b.name),
            "age" => a.age.cmp(&b.age),
            _ => a.breed.cmp(&b.breed),
        };
        ordering.then_with(|| a.id.as_str().cmp(b.id.as_str()))
    });
    if direction == "desc" {
        matching.reverse();
    }

    let total = matching.len();
    let ids: Vec<&str> = matching
        .into_iter()
        .skip(params.from)
        .take(params.size)
        .map(|dog| dog.id.as_str())
        .collect();

    Json(json!({ "resultIds": ids, "total": total })).into_response()
}

async fn fake_dogs_by_id(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(ids): Json<Vec<String>>,
) -> Response {
    if !authorized(&state, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let dogs: Vec<&Dog> = ids
        .iter()
        .filter_map(|id| state.dogs.iter().find(|dog| dog.id.as_str() == id))
        .collect();
    Json(dogs).into_response()
}

async fn fake_match(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(ids): Json<Vec<String>>,
) -> Response {
    if !authorized(&state, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match ids.first() {
        Some(id) => Json(json!({ "match": id })).into_response(),
        None => (StatusCode::BAD_REQUEST, Body::from("no ids")).into_response(),
    }
}

// =============================================================================
// Test application
// =============================================================================

/// The web app running against a fresh [`FakeDogApi`].
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub api: FakeDogApi,
}

impl TestApp {
    /// Start the app with default policy.
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Start the app after adjusting its configuration.
    pub async fn spawn_with(configure: impl FnOnce(&mut WebConfig)) -> Self {
        let api = FakeDogApi::spawn().await;

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind web app");
        let addr = listener.local_addr().expect("Failed to read app address");

        let mut config = WebConfig {
            host: addr.ip(),
            port: addr.port(),
            base_url: format!("http://{addr}"),
            ..WebConfig::default()
        };
        config.api.base_url = api.base_url();
        config.api.image_origin = "https://images.test".to_string();
        configure(&mut config);

        let state = AppState::new(config).expect("Failed to build app state");
        let router = dogfinder_web::build_router(state);
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Web app stopped");
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            address: format!("http://{addr}"),
            client,
            api,
        }
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.address))
            .send()
            .await
            .expect("GET request failed")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(format!("{}{path}", self.address))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Log in and assert it succeeded.
    pub async fn login(&self, name: &str, email: &str) {
        let response = self
            .post_form("/login", &[("name", name), ("email", email)])
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "login should redirect");
    }

    /// GET `path` and return the body, asserting a 200.
    pub async fn page(&self, path: &str) -> String {
        let response = self.get(path).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {path}");
        response.text().await.expect("Failed to read body")
    }
}

/// `Location` header of a redirect.
#[must_use]
pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
