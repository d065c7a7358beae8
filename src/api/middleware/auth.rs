use crate::AppState;
use crate::api::error::AppError;
use crate::models::CurrentUser;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

pub const SESSION_COOKIE: &str = "session";

async fn current_user(state: &AppState, headers: &HeaderMap) -> Result<Option<CurrentUser>, AppError> {
    let token = CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string());

    match token {
        Some(token) => state.auth_service.resolve_session(&token).await,
        None => Ok(None),
    }
}

/// Gate for JSON routes: no valid session → 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = current_user(&state, req.headers())
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Gate for browser pages: no valid session → redirect to the login page.
pub async fn page_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    match current_user(&state, req.headers()).await? {
        Some(user) => {
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        None => Ok(Redirect::to("/").into_response()),
    }
}
