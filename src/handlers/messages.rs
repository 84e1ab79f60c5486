/// Messaging handlers
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, ErrorResponse};
use crate::middleware::Caller;
use crate::models::message::{
    ConversationRequest, ConversationResponse, DeleteMessageResponse, EditMessageRequest,
    EditMessageResponse, MessageResponse, SendMessageRequest,
};
use crate::services::{ChatService, HistoryOptions, SortOrder};

/// Send a direct message to another user
#[utoipa::path(
    post,
    path = "/messages/send",
    tag = "Messages",
    security(("bearer_auth" = [])),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message stored", body = MessageResponse),
        (status = 400, description = "Validation failed or unknown receiver", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn send_message(
    caller: Caller,
    pool: web::Data<PgPool>,
    payload: web::Json<SendMessageRequest>,
) -> Result<HttpResponse, AppError> {
    let req = payload.into_inner();
    req.validate()?;

    let service = ChatService::new(pool.get_ref().clone());
    let message = service
        .send_message(caller.0, req.receiver_id, &req.content)
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::from(message)))
}

/// Replace the content of a message the caller sent
#[utoipa::path(
    post,
    path = "/messages/{messageId}/edit",
    tag = "Messages",
    security(("bearer_auth" = [])),
    params(("messageId" = Uuid, Path, description = "Message to edit")),
    request_body = EditMessageRequest,
    responses(
        (status = 200, description = "Message updated", body = EditMessageResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Caller is not the sender", body = ErrorResponse),
        (status = 404, description = "Message not found", body = ErrorResponse)
    )
)]
pub async fn edit_message(
    caller: Caller,
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    payload: web::Json<EditMessageRequest>,
) -> Result<HttpResponse, AppError> {
    let message_id = path.into_inner();
    let req = payload.into_inner();
    req.validate()?;

    let service = ChatService::new(pool.get_ref().clone());
    let message = service
        .edit_message(caller.0, message_id, &req.content)
        .await?;

    Ok(HttpResponse::Ok().json(EditMessageResponse {
        message_id: message.id,
        content: message.content,
        timestamp: message.timestamp,
    }))
}

/// Delete a message the caller sent
#[utoipa::path(
    delete,
    path = "/messages/{messageId}",
    tag = "Messages",
    security(("bearer_auth" = [])),
    params(("messageId" = Uuid, Path, description = "Message to delete")),
    responses(
        (status = 200, description = "Message deleted", body = DeleteMessageResponse),
        (status = 401, description = "Caller is not the sender", body = ErrorResponse),
        (status = 404, description = "Message not found", body = ErrorResponse)
    )
)]
pub async fn delete_message(
    caller: Caller,
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let service = ChatService::new(pool.get_ref().clone());
    service.delete_message(caller.0, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(DeleteMessageResponse {
        message_deleted: true,
    }))
}

/// Page through the conversation between the caller and another user
#[utoipa::path(
    post,
    path = "/messages/conversation",
    tag = "Messages",
    security(("bearer_auth" = [])),
    request_body = ConversationRequest,
    responses(
        (status = 200, description = "Conversation page", body = ConversationResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Receiver user not found", body = ErrorResponse)
    )
)]
pub async fn conversation(
    caller: Caller,
    pool: web::Data<PgPool>,
    payload: web::Json<ConversationRequest>,
) -> Result<HttpResponse, AppError> {
    let req = payload.into_inner();

    let options = HistoryOptions {
        sort: SortOrder::parse(req.sort.as_deref()),
        before: req.time,
        count: req.count,
    };

    let service = ChatService::new(pool.get_ref().clone());
    let messages = service
        .conversation(caller.0, req.receiver_id, options)
        .await?;

    Ok(HttpResponse::Ok().json(ConversationResponse {
        messages: messages.into_iter().map(MessageResponse::from).collect(),
    }))
}
