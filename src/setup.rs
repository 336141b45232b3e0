use std::sync::Arc;

use crate::auth::jwt::JwtProvider;
use crate::clients::predictor::FastApiPredictor;
use crate::config::Config;
use crate::domain::blacklist::BlacklistService;
use crate::domain::messages::MessageService;
use crate::domain::ports::{
    AttackerRepo, BlacklistRepo, MessageRepo, PredictionRepo, Predictor, UserRepo,
};
use crate::domain::users::UserService;
use crate::server::AppState;
use crate::storage::memory::{
    MemoryAttackers, MemoryBlacklist, MemoryMessages, MemoryPredictions, MemoryUsers,
};

/// Wires stores, clients and services into the shared application state.
/// Everything is injected through constructors; a relational backend swaps
/// in behind the repository ports without touching the services.
pub fn setup(config: &Config) -> color_eyre::Result<AppState> {
    tracing::info!("Using in-memory storage for all repositories");
    let users: Arc<dyn UserRepo> = Arc::new(MemoryUsers::new());
    let attackers: Arc<dyn AttackerRepo> = Arc::new(MemoryAttackers::new());
    let entries: Arc<dyn BlacklistRepo> = Arc::new(MemoryBlacklist::new());
    let messages: Arc<dyn MessageRepo> = Arc::new(MemoryMessages::new());
    let predictions: Arc<dyn PredictionRepo> = Arc::new(MemoryPredictions::new());

    let tokens = JwtProvider::new(&config.auth.jwt_secret, config.auth.jwt_expiry_secs)?;
    let predictor: Arc<dyn Predictor> =
        Arc::new(FastApiPredictor::new(config.predictor.base_url.clone()));

    Ok(AppState {
        users: Arc::new(UserService::new(users.clone(), tokens.clone())),
        blacklist: Arc::new(BlacklistService::new(users.clone(), attackers, entries)),
        messages: Arc::new(MessageService::new(
            users,
            messages,
            predictions,
            predictor,
        )),
        tokens,
    })
}
