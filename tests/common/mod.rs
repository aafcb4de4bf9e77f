#![allow(dead_code)]

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use uitnodiging::identity::IdentityAdmin;
use uitnodiging::invites::{CodeGenerator, InviteManager};
use uitnodiging::notify::{Mail, MailError, Notifier};
use uitnodiging::store::{KvStore, SqliteStore};
use uitnodiging::AppState;

/// Keeps every mail instead of delivering it.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Mail>>,
    pub fail: bool,
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    fn enabled(&self) -> bool {
        true
    }

    async fn send(&self, mail: &Mail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(mail.clone());
        if self.fail {
            return Err(MailError::Rejected("provider down".into()));
        }
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<SqliteStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_notifier(RecordingNotifier::default(), None).await
    }

    pub async fn with_notifier(notifier: RecordingNotifier, identity: Option<IdentityAdmin>) -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("Failed to create in-memory SQLite pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let store = Arc::new(SqliteStore::new(pool, "invites"));
        let notifier = Arc::new(notifier);

        let state = AppState {
            invites: InviteManager::new(store.clone(), CodeGenerator::default()),
            notifier: notifier.clone(),
            identity,
        };

        Self {
            router: uitnodiging::build_app(state),
            store,
            notifier,
        }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.request(req).await
    }

    /// POST a raw body with a JSON content type.
    pub async fn post_raw(&self, uri: &str, body: &str) -> Response {
        let req = Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(req).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response {
        self.post_raw(uri, &body.to_string()).await
    }

    /// Raw stored value at an invite key.
    pub async fn stored(&self, key: &str) -> Option<String> {
        self.store.get(key).await.unwrap()
    }
}

/// Read the full response body as JSON.
pub async fn body_json(resp: Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
