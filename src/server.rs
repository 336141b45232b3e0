use std::sync::Arc;

use axum::http::Method;
use axum::routing::{delete, get, post};
use axum::{Router, middleware};
use color_eyre::eyre::{Context, Result};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::jwt::JwtProvider;
use crate::domain::blacklist::BlacklistService;
use crate::domain::messages::MessageService;
use crate::domain::users::UserService;
use crate::web::auth::require_bearer;
use crate::web::handlers::{auth, blacklist, health::health_check, messages};

#[derive(Debug, Clone)]
pub struct ServerConfig<'a> {
    pub host: &'a str,
    pub port: u16,
}

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub blacklist: Arc<BlacklistService>,
    pub messages: Arc<MessageService>,
    pub tokens: JwtProvider,
}

pub struct Server {
    router: Router,
    listener: TcpListener,
}

impl Server {
    /// Binds the listener and assembles the router. `/v1/auth` and `/health`
    /// are open; everything else sits behind the bearer-token middleware.
    pub async fn new(state: AppState, config: ServerConfig<'_>) -> Result<Self> {
        let trace_layer =
            TraceLayer::new_for_http().make_span_with(|request: &'_ axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                tracing::info_span!("request", method = %request.method(), uri)
            });

        let cors_layer = CorsLayer::new()
            .allow_origin(Any)
            .allow_headers(Any)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ]);

        let protected = Router::new()
            .route("/lista-negra/agregar", post(blacklist::add))
            .route("/lista-negra/usuario/{id_usuario}", get(blacklist::list))
            .route("/lista-negra/todos/{id_usuario}", get(blacklist::list))
            .route("/lista-negra/{id_lista_negra}", delete(blacklist::remove))
            .route(
                "/lista-negra/estadisticas/{id_usuario}",
                get(blacklist::stats),
            )
            .route("/lista-negra/exportar/{id_usuario}", get(blacklist::export))
            .route("/lista-negra/importar/{id_usuario}", post(blacklist::import))
            .route("/mensajes/predecir", post(messages::predict))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                require_bearer,
            ));

        let router = Router::new()
            .route("/health", get(health_check))
            .route("/v1/auth/register", post(auth::register))
            .route("/v1/auth/login", post(auth::login))
            .route("/v1/auth/forgot-password", post(auth::forgot_password))
            .merge(protected)
            .layer(cors_layer)
            .layer(trace_layer)
            .with_state(state);

        let listener = TcpListener::bind(format!("{}:{}", config.host, config.port))
            .await
            .context("Binding TCP listener")?;

        Ok(Self { router, listener })
    }

    /// The bound port, useful when the config asked for port 0.
    pub fn port(&self) -> Result<u16> {
        Ok(self
            .listener
            .local_addr()
            .context("Getting local address")?
            .port())
    }

    pub async fn run(self) -> Result<()> {
        tracing::info!(
            "Server listening on http://{}",
            self.listener.local_addr().context("Getting local address")?
        );
        axum::serve(self.listener, self.router)
            .await
            .context("Running HTTP server")
    }
}
