mod common;

use reqwest::Client;
use serde_json::{Value, json};

#[tokio::test]
async fn test_register_returns_token() {
    let addr = common::spawn_server().await;
    let client = Client::new();

    let token = common::register_user(&client, &addr, "ana@example.com").await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let addr = common::spawn_server().await;
    let client = Client::new();

    common::register_user(&client, &addr, "ana@example.com").await;

    let response = client
        .post(format!("{addr}/v1/auth/register"))
        .json(&json!({
            "nombre": "Ana",
            "apellido": "Pérez",
            "email": "ana@example.com",
            "password": "otra-clave",
            "telefono": "911111111",
            "fechaNacimiento": "1999-06-30",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "El email solicitado ya existe!");
}

#[tokio::test]
async fn test_register_rejects_duplicate_phone() {
    let addr = common::spawn_server().await;
    let client = Client::new();

    let register = |email: &str| {
        json!({
            "nombre": "Ana",
            "apellido": "Pérez",
            "email": email,
            "password": "hunter2!",
            "telefono": "911111111",
            "fechaNacimiento": "2000-01-15",
        })
    };

    let response = client
        .post(format!("{addr}/v1/auth/register"))
        .json(&register("ana@example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{addr}/v1/auth/register"))
        .json(&register("benito@example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "El teléfono solicitado ya existe!");
}

#[tokio::test]
async fn test_login_roundtrip() {
    let addr = common::spawn_server().await;
    let client = Client::new();

    common::register_user(&client, &addr, "ana@example.com").await;

    let response = client
        .post(format!("{addr}/v1/auth/login"))
        .json(&json!({ "email": "ana@example.com", "password": "hunter2!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_login_wrong_password_is_bad_request() {
    let addr = common::spawn_server().await;
    let client = Client::new();

    common::register_user(&client, &addr, "ana@example.com").await;

    let response = client
        .post(format!("{addr}/v1/auth/login"))
        .json(&json!({ "email": "ana@example.com", "password": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "La contraseña es incorrecta");
}

#[tokio::test]
async fn test_login_unknown_email_is_unauthorized() {
    let addr = common::spawn_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{addr}/v1/auth/login"))
        .json(&json!({ "email": "nadie@example.com", "password": "hunter2!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "El usuario no existe");
}

#[tokio::test]
async fn test_forgot_password_replaces_credential() {
    let addr = common::spawn_server().await;
    let client = Client::new();

    common::register_user(&client, &addr, "ana@example.com").await;

    let response = client
        .post(format!("{addr}/v1/auth/forgot-password"))
        .json(&json!({ "email": "ana@example.com", "nuevaPassword": "clave-nueva" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["mensaje"], "Contraseña actualizada");

    // The old password no longer works, the new one does.
    let old = client
        .post(format!("{addr}/v1/auth/login"))
        .json(&json!({ "email": "ana@example.com", "password": "hunter2!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(old.status(), 400);

    let new = client
        .post(format!("{addr}/v1/auth/login"))
        .json(&json!({ "email": "ana@example.com", "password": "clave-nueva" }))
        .send()
        .await
        .unwrap();
    assert_eq!(new.status(), 200);
}

#[tokio::test]
async fn test_forgot_password_unknown_email_is_not_found() {
    let addr = common::spawn_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{addr}/v1/auth/forgot-password"))
        .json(&json!({ "email": "nadie@example.com", "nuevaPassword": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "El usuario no existe");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let addr = common::spawn_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{addr}/lista-negra/usuario/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Autenticación fallida o token inválido");
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let addr = common::spawn_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{addr}/mensajes/predecir"))
        .bearer_auth("not-a-jwt")
        .json(&json!({
            "userId": 1,
            "tipo": "sms",
            "contenido": "hola",
            "fuente": "sms",
            "remitente": "+34911111111",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}
