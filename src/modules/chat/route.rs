use crate::modules::chat::handle::*;
use actix_web::web::ServiceConfig;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(send_message).service(get_chat).service(mark_as_read).service(unread_count);
}
