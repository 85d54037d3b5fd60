use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    middleware::Next,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::{AppState, error::AppError, utils::verify_token};

/// Decodes the bearer token (when present) and stores the claims as a
/// request extension. Requests without a token pass through anonymously;
/// route guards decide what anonymous viewers may reach. A token that is
/// present but invalid is rejected outright.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>() {
        match verify_token(bearer.token(), &state.config) {
            Ok(claims) => {
                request.extensions_mut().insert(claims);
            }
            Err(e) => {
                tracing::debug!("Rejected bearer token: {}", e);
                return AppError::Unauthorized.into_response();
            }
        }
    }

    next.run(request).await
}
