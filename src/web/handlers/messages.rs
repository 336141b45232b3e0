use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::domain::messages::ReportedMessage;
use crate::server::AppState;
use crate::web::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub tipo: String,
    pub contenido: String,
    pub fuente: String,
    pub remitente: String,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub modelo: String,
    pub prediccion: String,
    pub confianza: f32,
}

pub async fn predict(
    State(state): State<AppState>,
    Json(body): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    let prediction = state
        .messages
        .submit_and_predict(ReportedMessage {
            user_id: body.user_id,
            message_type: body.tipo,
            content: body.contenido,
            source: body.fuente,
            sender: body.remitente,
        })
        .await?;

    Ok(Json(PredictResponse {
        modelo: prediction.model,
        prediccion: prediction.label,
        confianza: prediction.confidence,
    }))
}
