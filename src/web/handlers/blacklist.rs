//! Blacklist endpoints. These answer errors as `{error}` bodies with the
//! matching status, the shape the mobile client already parses.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::error::ServiceError;
use crate::domain::models::{BlacklistEntry, BlacklistEntryView, DATETIME_FORMAT};
use crate::server::AppState;
use crate::web::error::status_of;

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    #[serde(rename = "idUsuario")]
    pub id_usuario: i64,
    pub valor: String,
    pub tipo: String,
    pub motivo: String,
}

#[derive(Debug, Serialize)]
pub struct AddedEntry {
    #[serde(rename = "idListaNegra")]
    pub id_lista_negra: i64,
    #[serde(rename = "idUsuario")]
    pub id_usuario: i64,
    #[serde(rename = "idAtacante")]
    pub id_atacante: i64,
    pub motivo: String,
    #[serde(rename = "creadoEn")]
    pub creado_en: String,
}

impl From<BlacklistEntry> for AddedEntry {
    fn from(entry: BlacklistEntry) -> Self {
        Self {
            id_lista_negra: entry.id,
            id_usuario: entry.user_id,
            id_atacante: entry.attacker_id,
            motivo: entry.reason,
            creado_en: entry.created_at.format(DATETIME_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    #[serde(rename = "idListaNegra")]
    pub id_lista_negra: i64,
    pub valor: String,
    pub tipo: String,
    pub motivo: String,
    #[serde(rename = "creadoEn")]
    pub creado_en: String,
    pub reputacion: f64,
}

impl From<BlacklistEntryView> for EntryResponse {
    fn from(view: BlacklistEntryView) -> Self {
        Self {
            id_lista_negra: view.entry.id,
            valor: view.attacker.value,
            tipo: view.attacker.kind,
            motivo: view.entry.reason,
            creado_en: view.entry.created_at.format(DATETIME_FORMAT).to_string(),
            reputacion: view.attacker.reputation,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total: usize,
    #[serde(rename = "bloqueadosHoy")]
    pub bloqueados_hoy: usize,
    #[serde(rename = "bloqueadosEstaSemana")]
    pub bloqueados_esta_semana: usize,
    #[serde(rename = "nivelRiesgoPromedio")]
    pub nivel_riesgo_promedio: String,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: u32,
    pub errors: u32,
}

pub async fn add(State(state): State<AppState>, Json(body): Json<AddRequest>) -> Response {
    match state
        .blacklist
        .add(body.id_usuario, &body.valor, &body.tipo, &body.motivo)
        .await
    {
        Ok(entry) => Json(AddedEntry::from(entry)).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn list(State(state): State<AppState>, Path(id_usuario): Path<i64>) -> Response {
    match state.blacklist.list(id_usuario).await {
        Ok(views) => {
            let entries: Vec<EntryResponse> = views.into_iter().map(EntryResponse::from).collect();
            Json(entries).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub async fn remove(State(state): State<AppState>, Path(id_lista_negra): Path<i64>) -> Response {
    match state.blacklist.remove(id_lista_negra).await {
        Ok(()) => Json(json!({ "mensaje": "Eliminado correctamente" })).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn stats(State(state): State<AppState>, Path(id_usuario): Path<i64>) -> Response {
    match state.blacklist.stats(id_usuario).await {
        Ok(stats) => Json(StatsResponse {
            total: stats.total,
            bloqueados_hoy: stats.blocked_today,
            bloqueados_esta_semana: stats.blocked_this_week,
            nivel_riesgo_promedio: stats.avg_risk_level,
        })
        .into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn export(State(state): State<AppState>, Path(id_usuario): Path<i64>) -> Response {
    match state.blacklist.export_csv(id_usuario).await {
        Ok(csv) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"blocklist.csv\"",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn import(
    State(state): State<AppState>,
    Path(id_usuario): Path<i64>,
    csv: String,
) -> Response {
    match state.blacklist.import_csv(id_usuario, &csv).await {
        Ok(report) => Json(ImportResponse {
            success: report.success,
            errors: report.errors,
        })
        .into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: ServiceError) -> Response {
    (status_of(&err), Json(json!({ "error": err.to_string() }))).into_response()
}
