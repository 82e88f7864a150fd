// Shell - the client's operations exposed to a local front end as JSON
// Every handler runs one client operation and answers with the resulting view

use axum::{
    extract::{Path as AxumPath, State},
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    app_state::AppState,
    core::{CommentId, FriendshipId, NotificationId, PostId, ProfileId},
    entities::{ProfileForm, SignUpForm},
    error::{AppError, AppResult},
    state::{NotificationsTab, SearchTab},
};

#[derive(Debug, Deserialize)]
pub struct SignInBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CodeBody {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct ContentBody {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UrlBody {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct QueryBody {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchTabBody {
    pub tab: SearchTab,
}

#[derive(Debug, Deserialize)]
pub struct NotificationsTabBody {
    pub tab: NotificationsTab,
}

async fn with_nav(state: &AppState, view: Value) -> AppResult<Json<Value>> {
    let nav = serde_json::to_value(state.client.nav_view().await)?;
    Ok(Json(json!({ "nav": nav, "view": view })))
}

async fn current_page(state: &AppState) -> AppResult<Json<Value>> {
    let view = serde_json::to_value(state.client.page_view().await)?;
    with_nav(state, view).await
}

// Navigation

pub async fn get_state_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    current_page(&state).await
}

pub async fn navigate_handler(
    State(state): State<AppState>,
    AxumPath(page): AxumPath<String>,
) -> AppResult<Json<Value>> {
    state.client.navigate_to(&page).await;
    current_page(&state).await
}

// Auth

pub async fn sign_up_handler(
    State(state): State<AppState>,
    Json(form): Json<SignUpForm>,
) -> AppResult<Json<Value>> {
    state.client.sign_up(form).await?;
    current_page(&state).await
}

pub async fn verify_handler(
    State(state): State<AppState>,
    Json(body): Json<CodeBody>,
) -> AppResult<Json<Value>> {
    state.client.verify_email_code(&body.code).await?;
    current_page(&state).await
}

pub async fn resend_code_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    state.client.resend_verification_code().await?;
    current_page(&state).await
}

pub async fn sign_in_handler(
    State(state): State<AppState>,
    Json(body): Json<SignInBody>,
) -> AppResult<Json<Value>> {
    state.client.sign_in(&body.email, &body.password).await?;
    current_page(&state).await
}

pub async fn sign_out_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    state.client.sign_out().await?;
    current_page(&state).await
}

// Posts, likes and comments

pub async fn create_post_handler(
    State(state): State<AppState>,
    Json(body): Json<ContentBody>,
) -> AppResult<Json<Value>> {
    state.client.create_post(&body.content).await?;
    current_page(&state).await
}

pub async fn delete_post_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<PostId>,
) -> AppResult<Json<Value>> {
    state.client.delete_post(id).await?;
    current_page(&state).await
}

pub async fn attach_media_handler(
    State(state): State<AppState>,
    Json(body): Json<UrlBody>,
) -> AppResult<Json<Value>> {
    state.client.attach_post_media(&body.url).await?;
    current_page(&state).await
}

pub async fn remove_media_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    state.client.remove_post_media().await;
    current_page(&state).await
}

pub async fn toggle_like_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<PostId>,
) -> AppResult<Json<Value>> {
    let liked = state.client.toggle_like(id).await?;
    with_nav(&state, json!({ "post_id": id, "liked": liked })).await
}

pub async fn get_comments_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<PostId>,
) -> AppResult<Json<Value>> {
    let view = serde_json::to_value(state.client.comments_view(id).await)?;
    with_nav(&state, view).await
}

pub async fn toggle_comments_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<PostId>,
) -> AppResult<Json<Value>> {
    state.client.toggle_comments(id).await?;
    get_comments_handler(State(state), AxumPath(id)).await
}

pub async fn add_comment_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<PostId>,
    Json(body): Json<ContentBody>,
) -> AppResult<Json<Value>> {
    state.client.add_comment(id, &body.content).await?;
    get_comments_handler(State(state), AxumPath(id)).await
}

pub async fn delete_comment_handler(
    State(state): State<AppState>,
    AxumPath((post_id, comment_id)): AxumPath<(PostId, CommentId)>,
) -> AppResult<Json<Value>> {
    state.client.delete_comment(post_id, comment_id).await?;
    get_comments_handler(State(state), AxumPath(post_id)).await
}

// Search and friends

pub async fn search_input_handler(
    State(state): State<AppState>,
    Json(body): Json<QueryBody>,
) -> AppResult<Json<Value>> {
    state.client.on_search_input(&body.query).await;
    state.client.settle_search().await;
    let view = serde_json::to_value(state.client.search_view().await)?;
    with_nav(&state, view).await
}

pub async fn clear_search_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    state.client.clear_search().await;
    let view = serde_json::to_value(state.client.search_view().await)?;
    with_nav(&state, view).await
}

pub async fn search_tab_handler(
    State(state): State<AppState>,
    Json(body): Json<SearchTabBody>,
) -> AppResult<Json<Value>> {
    state.client.switch_search_tab(body.tab).await?;
    let view = serde_json::to_value(state.client.search_view().await)?;
    with_nav(&state, view).await
}

pub async fn send_friend_request_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<ProfileId>,
) -> AppResult<Json<Value>> {
    let outcome = state.client.send_friend_request(id).await?;
    with_nav(&state, json!({ "outcome": outcome })).await
}

pub async fn remove_friend_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<ProfileId>,
) -> AppResult<Json<Value>> {
    state.client.remove_friend(id).await?;
    current_page(&state).await
}

pub async fn accept_request_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<FriendshipId>,
) -> AppResult<Json<Value>> {
    let friendship = state.client.accept_friend_request(id).await?;
    with_nav(&state, serde_json::to_value(friendship)?).await
}

pub async fn reject_request_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<FriendshipId>,
) -> AppResult<Json<Value>> {
    let friendship = state.client.reject_friend_request(id).await?;
    with_nav(&state, serde_json::to_value(friendship)?).await
}

// Notifications

pub async fn notifications_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let view = serde_json::to_value(state.client.notifications_view().await)?;
    with_nav(&state, view).await
}

pub async fn refresh_notifications_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Value>> {
    state.client.refresh_notifications().await?;
    notifications_handler(State(state)).await
}

pub async fn notifications_tab_handler(
    State(state): State<AppState>,
    Json(body): Json<NotificationsTabBody>,
) -> AppResult<Json<Value>> {
    state.client.switch_notifications_tab(body.tab).await;
    notifications_handler(State(state)).await
}

pub async fn mark_read_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<NotificationId>,
) -> AppResult<Json<Value>> {
    state.client.mark_notification_read(id).await?;
    notifications_handler(State(state)).await
}

pub async fn mark_all_read_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    state.client.mark_all_notifications_read().await?;
    notifications_handler(State(state)).await
}

// Profile

pub async fn update_profile_handler(
    State(state): State<AppState>,
    Json(form): Json<ProfileForm>,
) -> AppResult<Json<Value>> {
    state.client.update_profile(form).await?;
    current_page(&state).await
}

pub async fn stage_avatar_handler(
    State(state): State<AppState>,
    Json(body): Json<UrlBody>,
) -> AppResult<Json<Value>> {
    state.client.stage_avatar(&body.url).await?;
    current_page(&state).await
}

// Operations

pub async fn metrics_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let snapshot = state.metrics.snapshot().await;
    let total = state.metrics.total_calls().await;
    let operations = serde_json::to_value(snapshot)
        .map_err(|e| AppError::SerializationError(e.to_string()))?;
    Ok(Json(json!({ "total_calls": total, "operations": operations })))
}

pub fn create_shell_router(state: AppState) -> Router {
    Router::new()
        .route("/state", get(get_state_handler))
        .route("/pages/{page}", get(navigate_handler))

        .route("/auth/sign-up", post(sign_up_handler))
        .route("/auth/verify", post(verify_handler))
        .route("/auth/resend", post(resend_code_handler))
        .route("/auth/sign-in", post(sign_in_handler))
        .route("/auth/sign-out", post(sign_out_handler))

        .route("/posts", post(create_post_handler))
        .route("/posts/media", post(attach_media_handler).delete(remove_media_handler))
        .route("/posts/{id}", delete(delete_post_handler))
        .route("/posts/{id}/like", post(toggle_like_handler))
        .route("/posts/{id}/comments", get(get_comments_handler).post(add_comment_handler))
        .route("/posts/{id}/comments/toggle", post(toggle_comments_handler))
        .route("/posts/{id}/comments/{comment_id}", delete(delete_comment_handler))

        .route("/search", post(search_input_handler).delete(clear_search_handler))
        .route("/search/tab", post(search_tab_handler))
        .route("/friends/{id}", post(send_friend_request_handler).delete(remove_friend_handler))
        .route("/friend-requests/{id}/accept", post(accept_request_handler))
        .route("/friend-requests/{id}/reject", post(reject_request_handler))

        .route("/notifications", get(notifications_handler))
        .route("/notifications/refresh", post(refresh_notifications_handler))
        .route("/notifications/tab", post(notifications_tab_handler))
        .route("/notifications/read-all", post(mark_all_read_handler))
        .route("/notifications/{id}/read", post(mark_read_handler))

        .route("/profile", put(update_profile_handler))
        .route("/profile/avatar", post(stage_avatar_handler))

        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
