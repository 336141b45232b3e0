//! Bearer-token gate in front of the protected routes.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::error::ServiceError;
use crate::server::AppState;
use crate::web::error::ApiError;

pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let Some(token) = token else {
        return Err(unauthorized());
    };
    if let Err(err) = state.tokens.validate(token) {
        tracing::debug!("rejected bearer token: {err}");
        return Err(unauthorized());
    }

    Ok(next.run(request).await)
}

fn unauthorized() -> ApiError {
    ApiError(ServiceError::Unauthorized(
        "Autenticación fallida o token inválido".into(),
    ))
}
