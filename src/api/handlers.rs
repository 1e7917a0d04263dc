//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{info, warn};

use super::responses::{ApiError, HealthResponse, IntervalRequest, TimerSummary};
use crate::{
    runtime::TimerView,
    state::{AppState, NotificationSettings, SettingsPatch, TimerConfig, TimerDraft},
};

type ApiResult<T> = Result<Json<T>, ApiError>;
/// JSON body whose rejection is turned into an [`ApiError`] by the handler
type JsonBody<T> = Result<Json<T>, JsonRejection>;

fn timer_not_found(id: &str) -> ApiError {
    ApiError::not_found(format!("timer `{}` not found", id))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let active = state.runtime.active_timer().await.map(|(id, _)| id);
    Json(HealthResponse::ok(
        state.get_uptime(),
        state.host.clone(),
        state.port,
        active,
    ))
}

/// Handle GET /timers - List saved timers
pub async fn list_timers_handler(State(state): State<Arc<AppState>>) -> Json<Vec<TimerSummary>> {
    Json(state.store.timers().iter().map(TimerSummary::from).collect())
}

/// Handle POST /timers - Create a timer from a draft
pub async fn create_timer_handler(
    State(state): State<Arc<AppState>>,
    body: JsonBody<TimerDraft>,
) -> Result<(StatusCode, Json<TimerConfig>), ApiError> {
    let Json(draft) = body?;
    let config = state.create_timer(draft)?;
    Ok((StatusCode::CREATED, Json(config)))
}

/// Handle GET /timers/:id
pub async fn get_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<TimerConfig> {
    state
        .store
        .find_timer(&id)
        .map(Json)
        .ok_or_else(|| timer_not_found(&id))
}

/// Handle PUT /timers/:id - Replace a timer definition
pub async fn update_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: JsonBody<TimerDraft>,
) -> ApiResult<TimerConfig> {
    let Json(draft) = body?;
    state
        .update_timer(&id, draft)?
        .map(Json)
        .ok_or_else(|| timer_not_found(&id))
}

/// Handle DELETE /timers/:id
pub async fn delete_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !state.store.delete_timer(&id)? {
        return Err(timer_not_found(&id));
    }
    info!("Deleted timer {}", id);

    if matches!(state.runtime.active_timer().await, Some((active, _)) if active == id) {
        state.runtime.deactivate().await;
        if let Err(e) = state.store.clear_active_timer() {
            warn!("Failed to clear snapshot of deleted timer: {}", e);
        }
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Handle POST /timers/:id/intervals - Add one alert interval
pub async fn add_interval_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: JsonBody<IntervalRequest>,
) -> ApiResult<TimerConfig> {
    let Json(request) = body?;
    state
        .add_interval(&id, request.minutes)?
        .map(Json)
        .ok_or_else(|| timer_not_found(&id))
}

/// Handle POST /timers/:id/activate - Make a timer the active one
pub async fn activate_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<TimerView> {
    let config = state.store.find_timer(&id).ok_or_else(|| timer_not_found(&id))?;

    if let Some((active, true)) = state.runtime.active_timer().await {
        if active != id {
            return Err(ApiError::conflict(format!(
                "timer `{}` is running; stop it before activating another",
                active
            )));
        }
    }
    Ok(Json(state.runtime.activate(config).await?))
}

/// Handle GET /active - Current view of the active timer
pub async fn active_view_handler(State(state): State<Arc<AppState>>) -> ApiResult<TimerView> {
    state
        .runtime
        .view()
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("no timer is active"))
}

/// Handle POST /active/start
pub async fn start_handler(State(state): State<Arc<AppState>>) -> ApiResult<TimerView> {
    Ok(Json(state.runtime.start().await?))
}

/// Handle POST /active/pause - Toggle pause
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult<TimerView> {
    Ok(Json(state.runtime.toggle_pause().await?))
}

/// Handle POST /active/stop
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> ApiResult<TimerView> {
    Ok(Json(state.runtime.stop().await?))
}

/// Handle DELETE /active - Leave the active timer
pub async fn deactivate_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    state.runtime.deactivate().await;
    StatusCode::NO_CONTENT
}

/// Handle GET /settings
pub async fn get_settings_handler(
    State(state): State<Arc<AppState>>,
) -> Json<NotificationSettings> {
    Json(state.dispatcher.settings())
}

/// Handle PATCH /settings
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    body: JsonBody<SettingsPatch>,
) -> ApiResult<NotificationSettings> {
    let Json(patch) = body?;
    Ok(Json(state.dispatcher.update_settings(&patch)))
}
