use crate::modules::friend::handle::*;
use actix_web::web::ServiceConfig;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(send_friend_request)
        .service(accept_friend_request)
        .service(reject_friend_request)
        .service(get_friend_requests)
        .service(get_sent_friend_requests)
        .service(get_friends)
        .service(find_friend);
}
