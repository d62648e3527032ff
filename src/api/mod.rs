pub mod auth;
pub mod health;
pub mod leaderboard;
pub mod matches;
pub mod sessions;

use crate::db::Repository;
use crate::gateway::Authorizer;
use crate::leaderboard::Leaderboard;
use crate::lifecycle::LifecycleManager;
use crate::session::SessionStore;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub lifecycle: Arc<LifecycleManager>,
    pub leaderboard: Arc<Leaderboard>,
    pub authorizer: Arc<dyn Authorizer>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(
        repo: Arc<Repository>,
        lifecycle: Arc<LifecycleManager>,
        leaderboard: Arc<Leaderboard>,
        authorizer: Arc<dyn Authorizer>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            repo,
            lifecycle,
            leaderboard,
            authorizer,
            sessions,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route(
            "/v1/matches",
            get(matches::list_matches).post(matches::create_match),
        )
        .route("/v1/matches/open", get(matches::list_open_matches))
        .route("/v1/matches/:id", axum::routing::delete(matches::delete_match))
        .route(
            "/v1/matches/:id/predictions",
            get(matches::list_predictions).post(matches::submit_prediction),
        )
        .route("/v1/matches/:id/result", put(matches::record_result))
        .route("/v1/leaderboard", get(leaderboard::get_leaderboard))
        .route(
            "/v1/sessions",
            post(sessions::select_match).delete(sessions::cancel),
        )
        .route("/v1/sessions/score", post(sessions::submit_score))
        .layer(cors)
        .with_state(state)
}
