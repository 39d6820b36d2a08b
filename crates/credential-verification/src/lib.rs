//! Credential verification service.
//!
//! Answers "does this subject hold a credential?" by asking the issuance
//! service through a [`CredentialLookup`]. Holds no state of its own.

pub mod client;
pub mod config;
pub mod error;
pub mod verify;

pub use error::ApiError;

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::State,
  routing::{get, post},
};
use client::CredentialLookup;
use credential_core::worker::WorkerId;
use serde::Serialize;

/// Name reported by `/health` and used to derive the default worker id.
pub const SERVICE_NAME: &str = "verification-service";

/// Path prefix under which every verification route is mounted.
pub const API_PREFIX: &str = "/api/verification";

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<L: CredentialLookup> {
  pub lookup: Arc<L>,
  pub worker: Arc<WorkerId>,
}

impl<L: CredentialLookup> AppState<L> {
  pub fn new(lookup: L, worker: WorkerId) -> Self {
    Self { lookup: Arc::new(lookup), worker: Arc::new(worker) }
  }
}

/// Build the verification [`Router`], with every route under [`API_PREFIX`].
pub fn router<L>(state: AppState<L>) -> Router
where
  L: CredentialLookup + Clone + Send + Sync + 'static,
{
  let api = Router::new()
    .route("/health", get(health::<L>))
    .route("/verify", post(verify::handler::<L>))
    .with_state(state);

  Router::new().nest(API_PREFIX, api)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
  pub status:  &'static str,
  pub service: &'static str,
  pub worker:  String,
}

/// `GET /health`
async fn health<L>(State(state): State<AppState<L>>) -> Json<HealthResponse>
where
  L: CredentialLookup + Clone + Send + Sync + 'static,
{
  Json(HealthResponse {
    status:  "healthy",
    service: SERVICE_NAME,
    worker:  state.worker.to_string(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  use std::time::Duration;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use credential_core::credential::{Credential, NewCredential};
  use credential_core::store::CredentialStore as _;
  use credential_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tokio::net::TcpListener;
  use tower::ServiceExt as _;

  use crate::client::{IssuanceClient, LookupError};

  // ── Helpers ─────────────────────────────────────────────────────────────────

  #[derive(Clone)]
  enum StubLookup {
    Found(Credential),
    Missing,
    Down,
  }

  impl CredentialLookup for StubLookup {
    async fn lookup(&self, _: &str) -> Result<Option<Credential>, LookupError> {
      match self {
        StubLookup::Found(c) => Ok(Some(c.clone())),
        StubLookup::Missing => Ok(None),
        StubLookup::Down => Err(LookupError::UnexpectedStatus(
          StatusCode::BAD_GATEWAY,
        )),
      }
    }
  }

  fn sample_credential() -> Credential {
    let mut input = NewCredential::new("Identity Credential", "X", "u1");
    input.credential_id = "cred-1".into();
    input.claims.insert("name".into(), json!("John Doe"));
    input.into_credential(chrono::Utc::now(), "issuance-worker-1")
  }

  async fn post_verify<L>(state: AppState<L>, body: Value) -> Response
  where
    L: CredentialLookup + Clone + Send + Sync + 'static,
  {
    let req = Request::builder()
      .method("POST")
      .uri("/api/verification/verify")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn stub_state(stub: StubLookup) -> AppState<StubLookup> {
    AppState::new(stub, WorkerId::new("verification-worker-1"))
  }

  /// Serve `app` on an ephemeral local port and return its base URL.
  async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
  }

  fn client_state(base_url: &str, timeout: Duration) -> AppState<IssuanceClient> {
    AppState::new(
      IssuanceClient::new(base_url, timeout).unwrap(),
      WorkerId::new("verification-worker-1"),
    )
  }

  // ── Handler behaviour ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_reports_worker() {
    let req = Request::builder()
      .uri("/api/verification/health")
      .body(Body::empty())
      .unwrap();
    let resp = router(stub_state(StubLookup::Missing)).oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      json_body(resp).await,
      json!({
        "status": "healthy",
        "service": "verification-service",
        "worker": "verification-worker-1",
      })
    );
  }

  #[tokio::test]
  async fn verified_response_carries_every_credential_field() {
    let credential = sample_credential();
    let resp = post_verify(
      stub_state(StubLookup::Found(credential.clone())),
      json!({ "subjectId": "u1" }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let mut expected = serde_json::to_value(&credential).unwrap();
    expected["verified"] = json!(true);
    expected["verifiedBy"] = json!("verification-worker-1");
    expected["message"] = json!("Credential verified by verification-worker-1");
    assert_eq!(json_body(resp).await, expected);
  }

  #[tokio::test]
  async fn missing_credential_returns_404_without_credential_fields() {
    let resp =
      post_verify(stub_state(StubLookup::Missing), json!({ "subjectId": "u1" }))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
      json_body(resp).await,
      json!({
        "verified": false,
        "message": "Credential not found",
        "verifiedBy": "verification-worker-1",
      })
    );
  }

  #[tokio::test]
  async fn lookup_failure_returns_503() {
    let resp =
      post_verify(stub_state(StubLookup::Down), json!({ "subjectId": "u1" }))
        .await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
      json_body(resp).await,
      json!({ "error": "Issuance service unavailable", "verified": false })
    );
  }

  #[tokio::test]
  async fn missing_subject_returns_400() {
    for body in [json!({}), json!({ "subjectId": "" }), json!({ "subjectId": "  " })] {
      let resp = post_verify(stub_state(StubLookup::Down), body).await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
      assert_eq!(
        json_body(resp).await,
        json!({ "error": "Subject ID is required" })
      );
    }
  }

  // ── Against a live issuance service ─────────────────────────────────────────

  async fn issuance_with(subject_id: &str) -> (String, Credential) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let mut input = NewCredential::new("Identity Credential", "X", subject_id);
    input.claims.insert("name".into(), json!("John Doe"));
    input.claims.insert("email".into(), json!("john@example.com"));
    let credential = match store
      .insert(input, &WorkerId::new("issuance-worker-1"))
      .await
      .unwrap()
    {
      credential_core::store::Insertion::Inserted(c) => c,
      other => panic!("unexpected {other:?}"),
    };

    let app = credential_issuance::router(credential_issuance::AppState::new(
      store,
      WorkerId::new("issuance-worker-1"),
    ));
    (serve(app).await, credential)
  }

  #[tokio::test]
  async fn verifies_credential_issued_upstream() {
    let (base, credential) = issuance_with("u1").await;
    let state = client_state(&base, Duration::from_secs(5));

    let resp = post_verify(state, json!({ "subjectId": "u1" })).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["verified"], true);
    assert_eq!(body["credentialId"], credential.credential_id.as_str());
    assert_eq!(body["workerId"], "issuance-worker-1");
    assert_eq!(body["verifiedBy"], "verification-worker-1");
    assert_eq!(
      body["claims"],
      json!({ "name": "John Doe", "email": "john@example.com" })
    );
  }

  #[tokio::test]
  async fn subject_with_reserved_characters_is_looked_up_verbatim() {
    let (base, _) = issuance_with("org/unit 7").await;
    let state = client_state(&base, Duration::from_secs(5));

    let resp = post_verify(state, json!({ "subjectId": "org/unit 7" })).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["subjectId"], "org/unit 7");
  }

  #[tokio::test]
  async fn never_issued_subject_returns_404() {
    let (base, _) = issuance_with("u1").await;
    let state = client_state(&base, Duration::from_secs(5));

    let resp = post_verify(state, json!({ "subjectId": "u2" })).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = json_body(resp).await;
    assert_eq!(body["verified"], false);
    assert!(body.get("credentialId").is_none());
  }

  #[tokio::test]
  async fn unreachable_issuance_returns_503() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let state = client_state(&format!("http://{addr}"), Duration::from_secs(5));
    let resp = post_verify(state, json!({ "subjectId": "u1" })).await;

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(resp).await;
    assert_eq!(body["verified"], false);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn slow_issuance_times_out_as_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    // Accept connections and never answer.
    tokio::spawn(async move {
      let mut held = Vec::new();
      while let Ok((socket, _)) = listener.accept().await {
        held.push(socket);
      }
    });

    let state =
      client_state(&format!("http://{addr}"), Duration::from_millis(200));
    let resp = post_verify(state, json!({ "subjectId": "u1" })).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
  }

  #[tokio::test]
  async fn unexpected_upstream_answers_are_unavailable() {
    let upstream = Router::new()
      .route(
        "/api/issuance/credentials/broken",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
      )
      .route(
        "/api/issuance/credentials/garbled",
        get(|| async { "definitely not a credential" }),
      );
    let base = serve(upstream).await;

    for subject in ["broken", "garbled"] {
      let state = client_state(&base, Duration::from_secs(5));
      let resp = post_verify(state, json!({ "subjectId": subject })).await;
      assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE, "{subject}");
    }
  }
}
