pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::auth_service::AuthService;
use crate::services::file_service::FileService;
use crate::services::storage::StorageService;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::files::list::list_files,
        api::handlers::files::upload::upload_file,
        api::handlers::files::manage::delete_item,
    ),
    components(
        schemas(
            api::handlers::files::FileResponse,
            api::handlers::files::DeleteResponse,
            models::Category,
        )
    ),
    tags(
        (name = "files", description = "Per-user file storage, authenticated by the session cookie")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub file_service: Arc<FileService>,
    pub auth_service: Arc<AuthService>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn StorageService>, config: AppConfig) -> Self {
        let file_service = Arc::new(FileService::new(db.clone(), storage, config.clone()));
        let auth_service = Arc::new(AuthService::new(db, config.clone()));

        Self {
            file_service,
            auth_service,
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let gate_state = state.clone();
    let api_auth =
        || from_fn_with_state(gate_state.clone(), api::middleware::auth::auth_middleware);
    let page_auth =
        || from_fn_with_state(gate_state.clone(), api::middleware::auth::page_auth_middleware);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route(
            "/",
            get(api::handlers::auth::login_page).post(api::handlers::auth::login),
        )
        .route("/logout", get(api::handlers::auth::logout))
        .route(
            "/dashboard",
            get(api::handlers::dashboard::dashboard).layer(page_auth()),
        )
        .route(
            "/api/files/upload",
            post(api::handlers::files::upload_file)
                .layer(axum::extract::DefaultBodyLimit::max(state.config.max_file_size))
                .layer(api_auth()),
        )
        // GET takes a category, DELETE a file id
        .route(
            "/api/files/:key",
            get(api::handlers::files::list_files)
                .delete(api::handlers::files::delete_item)
                .layer(api_auth()),
        )
        .route(
            "/files/:id",
            get(api::handlers::files::download_file).layer(page_auth()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
