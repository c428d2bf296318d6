mod handlers;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Settings;
use crate::db::Database;
use crate::i18n::Translations;
use crate::jobs::JobQueue;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Arc<Settings>,
    pub translations: Arc<Translations>,
    pub jobs: JobQueue,
}

impl AppState {
    /// Build state and start the job worker. Must be called from within a tokio runtime.
    pub fn new(db: Database, settings: Settings, translations: Translations) -> Self {
        let settings = Arc::new(settings);
        let jobs = JobQueue::spawn(db.clone(), settings.clone());
        Self {
            db,
            settings,
            translations: Arc::new(translations),
            jobs,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Libraries
        .route(
            "/libraries",
            get(handlers::list_libraries).post(handlers::create_library),
        )
        .route(
            "/libraries/{id}",
            get(handlers::get_library).delete(handlers::delete_library),
        )
        .route(
            "/libraries/{id}/models",
            get(handlers::list_library_models).post(handlers::create_model),
        )
        // Models
        .route(
            "/models/{id}",
            get(handlers::get_model)
                .put(handlers::update_model)
                .delete(handlers::delete_model),
        )
        .route("/models/{id}/scan", post(handlers::scan_model))
        .route("/models/{id}/badges", get(handlers::get_model_badges))
        .route("/models/{id}/parts", get(handlers::list_parts))
        .route("/models/{id}/parts/grouped", get(handlers::list_grouped_parts))
        .route(
            "/models/{id}/tags",
            get(handlers::list_tags).put(handlers::set_tags),
        )
        .route("/models/{id}/tags/{tag}", delete(handlers::remove_tag))
        .route(
            "/models/{id}/problems",
            get(handlers::list_problems).post(handlers::create_problem),
        )
        // Parts and problems (by their own id)
        .route("/parts/{id}", delete(handlers::delete_part))
        .route("/problems/{id}", delete(handlers::delete_problem))
        // Licenses
        .route("/licenses", get(handlers::list_licenses))
        .route("/licenses/options", get(handlers::license_select_options))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
