//! Message Handlers
//!
//! REST surface for the message store: create, paged list, thread view and
//! per-side delete. Live delivery belongs to the WebSocket hub.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::application::dto::request::{MessageParams, SendMessageRequest};
use crate::application::dto::response::MessageResponse;
use crate::application::services::{MessageError, MessageService, MessageServiceImpl};
use crate::infrastructure::repositories::{PgMessageRepository, PgUserRepository};
use crate::presentation::http::pagination::{pagination_header_value, PAGINATION_HEADER};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn message_service(
    state: &AppState,
) -> MessageServiceImpl<PgMessageRepository, PgUserRepository> {
    MessageServiceImpl::new(
        Arc::new(PgMessageRepository::new(state.db.clone())),
        Arc::new(PgUserRepository::new(state.db.clone())),
        state.snowflake.clone(),
    )
}

fn map_message_error(e: MessageError) -> AppError {
    match e {
        MessageError::SelfMessage => AppError::Validation(e.to_string()),
        MessageError::RecipientNotFound | MessageError::NotFound => {
            AppError::NotFound(e.to_string())
        }
        MessageError::Forbidden => AppError::Forbidden(e.to_string()),
        MessageError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Create a message over REST
pub async fn create_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let message = message_service(&state)
        .create_message(&auth.username, &body.recipient_username, &body.content)
        .await
        .map_err(map_message_error)?;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(message))))
}

/// Paged list of the caller's messages, filtered by container.
/// Paging metadata travels in the `Pagination` response header.
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<MessageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = message_service(&state)
        .messages_for_user(&auth.username, params)
        .await
        .map_err(map_message_error)?;

    let header_value = pagination_header_value(&page)?;
    let items: Vec<MessageResponse> = page.items.into_iter().map(MessageResponse::from).collect();

    Ok(([(PAGINATION_HEADER, header_value)], Json(items)))
}

/// Conversation thread with another user, oldest first. Viewing marks the
/// caller's unread incoming messages as read.
pub async fn get_thread(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(username): Path<String>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let thread = message_service(&state)
        .thread(&auth.username, &username)
        .await
        .map_err(map_message_error)?;

    Ok(Json(thread.into_iter().map(MessageResponse::from).collect()))
}

/// Delete a message from the caller's side; the row is purged once both
/// sides have deleted it.
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id: i64 = id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid message ID".into()))?;

    message_service(&state)
        .delete_message(id, &auth.username)
        .await
        .map_err(map_message_error)?;

    Ok(StatusCode::OK)
}
