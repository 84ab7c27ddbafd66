use actix_web::{
    HttpRequest,
    cookie::{Cookie, time},
    get, post, web,
};

use crate::modules::user::model::{self, SignUpResponse};
use crate::modules::user::service::UserService;
use crate::{
    ENV,
    api::{error, success},
    middlewares::get_claims,
    utils::ValidatedJson,
};

fn refresh_cookie(value: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build("refresh_token", value)
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(max_age_secs))
        .finish()
}

#[post("/signup")]
pub async fn sign_up(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::SignUpModel>,
) -> Result<success::Success<SignUpResponse>, error::Error> {
    let email = user_service.sign_up(user_data.0).await?;
    Ok(success::Success::created(Some(SignUpResponse { email })).message("Signup successful"))
}

#[post("/signin")]
pub async fn sign_in(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::SignInModel>,
) -> Result<success::Success<model::SignInResponse>, error::Error> {
    let (access_token, refresh_token) = user_service.sign_in(user_data.0).await?;

    Ok(success::Success::ok(Some(model::SignInResponse { access_token }))
        .message("Signin successful")
        .cookie(refresh_cookie(refresh_token, ENV.refresh_token_expiration as i64)))
}

#[post("/refresh")]
pub async fn refresh(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<model::SignInResponse>, error::Error> {
    let presented = req.cookie("refresh_token").map(|c| c.value().to_string());
    let (access_token, refresh_token) = user_service.refresh(presented).await?;

    Ok(success::Success::ok(Some(model::SignInResponse { access_token }))
        .message("Refresh successful")
        .cookie(refresh_cookie(refresh_token, ENV.refresh_token_expiration as i64)))
}

#[get("/signout")]
pub async fn sign_out(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let presented = req.cookie("refresh_token").map(|c| c.value().to_string());
    user_service.sign_out(presented).await?;

    let expired = Cookie::build("refresh_token", "")
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(0))
        .expires(time::OffsetDateTime::UNIX_EPOCH)
        .finish();

    Ok(success::Success::no_content().cookie(expired))
}

#[get("/profile")]
pub async fn get_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let email = get_claims(&req)?.sub;
    let user = user_service.get_profile(&email).await?;
    Ok(success::Success::ok(Some(user)).message("Profile retrieved successfully"))
}
