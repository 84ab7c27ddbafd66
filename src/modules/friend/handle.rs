use actix_web::{HttpRequest, get, post, web};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        friend::{
            model::{FriendRequestBody, FriendResponse},
            repository_pg::FriendRequestRepositoryPg,
            schema::FriendRequestEntity,
            service::FriendService,
        },
        user::repository_pg::UserRepositoryPg,
    },
    utils::ValidatedJson,
};

pub type FriendSvc = FriendService<FriendRequestRepositoryPg, UserRepositoryPg>;

#[post("/request")]
pub async fn send_friend_request(
    friend_service: web::Data<FriendSvc>,
    body: ValidatedJson<FriendRequestBody>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestEntity>, error::Error> {
    let sender = get_claims(&req)?.sub;
    let request = friend_service.send_friend_request(&sender, &body.0.email).await?;

    Ok(success::Success::ok(Some(request)).message("Friend request sent successfully"))
}

#[post("/accept/{request_id}")]
pub async fn accept_friend_request(
    friend_service: web::Data<FriendSvc>,
    request_id: web::Path<String>,
    req: HttpRequest,
) -> Result<success::Success<FriendResponse>, error::Error> {
    let acting_user = get_claims(&req)?.sub;
    let friend = friend_service.accept_friend_request(&acting_user, &request_id).await?;

    Ok(success::Success::ok(Some(friend)).message("Friend request accepted successfully"))
}

#[post("/reject/{request_id}")]
pub async fn reject_friend_request(
    friend_service: web::Data<FriendSvc>,
    request_id: web::Path<String>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let acting_user = get_claims(&req)?.sub;
    friend_service.reject_friend_request(&acting_user, &request_id).await?;

    Ok(success::Success::ok(None).message("Friend request rejected successfully"))
}

#[get("/requests")]
pub async fn get_friend_requests(
    friend_service: web::Data<FriendSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FriendRequestEntity>>, error::Error> {
    let user = get_claims(&req)?.sub;
    let requests = friend_service.get_friend_requests(&user).await?;

    Ok(success::Success::ok(Some(requests)).message("Get friend requests successfully"))
}

#[get("/requestsSent")]
pub async fn get_sent_friend_requests(
    friend_service: web::Data<FriendSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FriendRequestEntity>>, error::Error> {
    let user = get_claims(&req)?.sub;
    let requests = friend_service.get_sent_friend_requests(&user).await?;

    Ok(success::Success::ok(Some(requests)).message("Get sent friend requests successfully"))
}

#[get("/friends")]
pub async fn get_friends(
    friend_service: web::Data<FriendSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FriendResponse>>, error::Error> {
    let user = get_claims(&req)?.sub;
    let friends = friend_service.get_friends(&user).await?;

    Ok(success::Success::ok(Some(friends)).message("Get friends successfully"))
}

#[post("/friend/{email}")]
pub async fn find_friend(
    friend_service: web::Data<FriendSvc>,
    email: web::Path<String>,
    _req: HttpRequest,
) -> Result<success::Success<FriendResponse>, error::Error> {
    let friend = friend_service.find_friend(&email).await?;

    Ok(success::Success::ok(Some(friend)).message("Friend found successfully"))
}
