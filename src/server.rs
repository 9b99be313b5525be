use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tokio::sync::Mutex;
use tracing::info;

use crate::{Res, api, config, recommend::RecommendationEngine, types::PkceToken};

/// Routes of the local server. The recommendation endpoints are only mounted
/// when an engine is given.
pub fn router(
    auth_state: Arc<Mutex<Option<PkceToken>>>,
    engine: Option<Arc<RecommendationEngine>>,
) -> Router {
    let mut app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(auth_state)));

    if let Some(engine) = engine {
        app = app.nest(
            "/api/recommendations",
            Router::new()
                .route("/independent", post(api::recommend_independent))
                .route("/users/{user_id}", post(api::recommend_for_user))
                .layer(Extension(engine)),
        );
    }

    app
}

pub async fn start_api_server(
    auth_state: Arc<Mutex<Option<PkceToken>>>,
    engine: Option<Arc<RecommendationEngine>>,
) -> Res<()> {
    let addr = SocketAddr::from_str(&config::server_addr())?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, router(auth_state, engine)).await?;
    Ok(())
}
