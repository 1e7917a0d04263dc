//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        // Saved timers
        .route("/timers", get(list_timers_handler).post(create_timer_handler))
        .route(
            "/timers/:id",
            get(get_timer_handler)
                .put(update_timer_handler)
                .delete(delete_timer_handler),
        )
        .route("/timers/:id/intervals", post(add_interval_handler))
        .route("/timers/:id/activate", post(activate_handler))
        // Active timer
        .route("/active", get(active_view_handler).delete(deactivate_handler))
        .route("/active/start", post(start_handler))
        .route("/active/pause", post(pause_handler))
        .route("/active/stop", post(stop_handler))
        .route(
            "/settings",
            get(get_settings_handler).patch(update_settings_handler),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
