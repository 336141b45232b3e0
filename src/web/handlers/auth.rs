use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::users::RegisterInput;
use crate::server::AppState;
use crate::web::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub password: String,
    pub telefono: String,
    #[serde(rename = "fechaNacimiento")]
    pub fecha_nacimiento: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
    #[serde(rename = "nuevaPassword")]
    pub nueva_password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let token = state
        .users
        .register(RegisterInput {
            first_name: body.nombre,
            last_name: body.apellido,
            email: body.email,
            password: body.password,
            phone: body.telefono,
            birth_date: body.fecha_nacimiento,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.users.login(&body.email, &body.password).await?;
    Ok(Json(TokenResponse { token }))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .users
        .update_password(&body.email, &body.nueva_password)
        .await?;
    Ok(Json(json!({ "mensaje": "Contraseña actualizada" })))
}
