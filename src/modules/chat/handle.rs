use actix_web::{HttpRequest, get, post, web};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        chat::{
            model::{ChatQuery, MarkReadResponse, SendMessageBody, UnreadCountResponse},
            repository_pg::MessageRepositoryPg,
            schema::MessageEntity,
            service::ChatService,
        },
        user::repository_pg::UserRepositoryPg,
    },
    utils::{ValidatedJson, ValidatedQuery},
};

pub type ChatSvc = ChatService<MessageRepositoryPg, UserRepositoryPg>;

#[post("/chat")]
pub async fn send_message(
    chat_service: web::Data<ChatSvc>,
    body: ValidatedJson<SendMessageBody>,
    req: HttpRequest,
) -> Result<success::Success<MessageEntity>, error::Error> {
    let sender = get_claims(&req)?.sub;
    let message =
        chat_service.send_message(&sender, &body.0.recipient_email, &body.0.content).await?;

    Ok(success::Success::ok(Some(message)).message("Message sent successfully"))
}

#[get("/getChat")]
pub async fn get_chat(
    chat_service: web::Data<ChatSvc>,
    query: ValidatedQuery<ChatQuery>,
    req: HttpRequest,
) -> Result<success::Success<Vec<MessageEntity>>, error::Error> {
    let user = get_claims(&req)?.sub;
    let messages = chat_service.get_chat(&user, &query.0.recipient_email).await?;

    Ok(success::Success::ok(Some(messages)).message("Get chat successfully"))
}

#[get("/markAsRead")]
pub async fn mark_as_read(
    chat_service: web::Data<ChatSvc>,
    query: ValidatedQuery<ChatQuery>,
    req: HttpRequest,
) -> Result<success::Success<MarkReadResponse>, error::Error> {
    let reader = get_claims(&req)?.sub;
    let updated = chat_service.mark_messages_as_read(&reader, &query.0.recipient_email).await?;

    Ok(success::Success::ok(Some(MarkReadResponse { updated }))
        .message("Messages marked as read"))
}

#[get("/unreadCount")]
pub async fn unread_count(
    chat_service: web::Data<ChatSvc>,
    query: ValidatedQuery<ChatQuery>,
    req: HttpRequest,
) -> Result<success::Success<UnreadCountResponse>, error::Error> {
    let reader = get_claims(&req)?.sub;
    let unread = chat_service.unread_count(&reader, &query.0.recipient_email).await?;

    Ok(success::Success::ok(Some(UnreadCountResponse { unread }))
        .message("Get unread count successfully"))
}
