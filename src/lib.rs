pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod invites;
pub mod models;
pub mod notify;
pub mod routes;
pub mod store;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::Config;
use crate::identity::IdentityAdmin;
use crate::invites::{CodeGenerator, InviteManager, ThreadRandom};
use crate::notify::{DisabledNotifier, Notifier, ResendMailer};
use crate::store::KvStore;

#[derive(Clone)]
pub struct AppState {
    pub invites: InviteManager,
    pub notifier: Arc<dyn Notifier>,
    pub identity: Option<IdentityAdmin>,
}

impl AppState {
    /// Wire the production collaborators described by `config` around `store`.
    pub fn from_config(config: &Config, store: Arc<dyn KvStore>) -> Self {
        let generator = CodeGenerator::new(Arc::new(ThreadRandom), config.code_length, config.code_attempts);

        let notifier: Arc<dyn Notifier> = match &config.mail {
            Some(mail) => Arc::new(ResendMailer::new(&mail.api_key, &mail.from)),
            None => {
                tracing::warn!("RESEND_API_KEY/RESEND_FROM_EMAIL not set, mail delivery disabled");
                Arc::new(DisabledNotifier)
            }
        };

        let identity = config
            .identity
            .as_ref()
            .map(|identity| IdentityAdmin::new(&identity.site_url, &identity.admin_token));

        Self {
            invites: InviteManager::new(store, generator),
            notifier,
            identity,
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

/// Build the full Axum application router.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::invite_code::router())
        .merge(routes::mail::router())
        .merge(routes::identity::router())
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
