use axum::{Json, Router, routing::post};
use safechat_server::{
    config::Config,
    server::{Server, ServerConfig},
    setup,
};
use serde_json::{Value, json};

/// Stands in for the FastAPI classifier: every message is phishing with 93%
/// confidence.
pub async fn spawn_stub_predictor() -> String {
    let router = Router::new().route(
        "/predict",
        post(|| async { Json(json!({ "prediction": "phishing", "confidence": 0.93 })) }),
    );

    let listener = tokio::net::TcpListener::bind("localhost:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://localhost:{}", addr.port())
}

/// Spawns the application against a working stub classifier.
#[allow(dead_code)]
pub async fn spawn_server() -> String {
    let predictor_url = spawn_stub_predictor().await;
    spawn_server_with_predictor(predictor_url).await
}

// Helper function to spawn a test server on a random port
pub async fn spawn_server_with_predictor(predictor_url: String) -> String {
    let config = {
        let mut config = Config::load().unwrap();
        config.server.host = "localhost".to_string();
        // Use a random OS port
        config.server.port = 0;
        config.predictor.base_url = predictor_url;
        config
    };

    let state = setup::setup(&config).unwrap();

    let server = Server::new(
        state,
        ServerConfig {
            host: &config.server.host,
            port: config.server.port,
        },
    )
    .await
    .unwrap();

    let port = server.port().unwrap();
    tokio::spawn(async move {
        server.run().await.expect("failed to run server");
    });

    format!("http://{}:{}", config.server.host, port)
}

/// Registers an account and returns its bearer token. Each spawned server
/// has a fresh store, so the first registered user always gets id 1.
#[allow(dead_code)]
pub async fn register_user(client: &reqwest::Client, addr: &str, email: &str) -> String {
    let response = client
        .post(format!("{addr}/v1/auth/register"))
        .json(&json!({
            "nombre": "Ana",
            "apellido": "Pérez",
            "email": email,
            "password": "hunter2!",
            "telefono": format!("9{}", email.len() * 11111111),
            "fechaNacimiento": "2000-01-15",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}
