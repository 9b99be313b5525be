use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    config::{self, EngineConfig},
    error, info,
    management::ProfileManager,
    recommend::RecommendationEngine,
    server::start_api_server,
};

use super::connect;

pub async fn serve() {
    let catalog = Arc::new(connect().await);
    let engine = RecommendationEngine::new(
        catalog,
        Arc::new(ProfileManager::new()),
        EngineConfig::from_env(),
    );

    info!("Serving recommendations on http://{}", config::server_addr());
    if let Err(e) = start_api_server(Arc::new(Mutex::new(None)), Some(Arc::new(engine))).await {
        error!("Server stopped. Err: {}", e);
    }
}
