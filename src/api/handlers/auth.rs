use crate::AppState;
use crate::api::error::AppError;
use crate::api::middleware::auth::SESSION_COOKIE;
use crate::api::pages;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Login page; already signed-in browsers go straight to the dashboard.
pub async fn login_page(State(state): State<AppState>, jar: CookieJar) -> Result<Response, AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if state
            .auth_service
            .resolve_session(cookie.value())
            .await?
            .is_some()
        {
            return Ok(Redirect::to("/dashboard").into_response());
        }
    }

    Ok(pages::login(None).into_response())
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let Some(user) = state
        .auth_service
        .authenticate(&form.username, &form.password)
        .await?
    else {
        tracing::info!("🚫 Failed login for {:?}", form.username);
        return Ok((
            StatusCode::UNAUTHORIZED,
            pages::login(Some("Invalid username or password!")),
        )
            .into_response());
    };

    let token = state.auth_service.start_session(&user).await?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.cookie_secure)
        .path("/")
        .build();

    Ok((jar.add(cookie), Redirect::to("/dashboard")).into_response())
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.auth_service.end_session(cookie.value()).await?;
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Redirect::to("/")))
}
