use actix::Actor;
use actix_cors::Cors;
use actix_web::{
    self, App, HttpServer,
    middleware::{Logger, from_fn},
    web,
};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::{RedisCache, connect_database},
    middlewares::authentication,
    modules::{
        chat::{repository_pg::MessageRepositoryPg, service::ChatService},
        friend::{repository_pg::FriendRequestRepositoryPg, service::FriendService},
        user::{repository_pg::UserRepositoryPg, service::UserService},
        websocket::{handler::websocket_handler, server::ChatServer, typing::TypingService},
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;

    sqlx::migrate!()
        .run(&db_pool)
        .await
        .map_err(|_| std::io::Error::other("Database migration error"))?;

    let redis_cache =
        RedisCache::new().await.map_err(|_| std::io::Error::other("Redis connection error"))?;

    let ws_server = ChatServer::new().start();

    let user_repo = UserRepositoryPg::new(db_pool.clone());
    let request_repo = FriendRequestRepositoryPg::new(db_pool.clone());
    let message_repo = MessageRepositoryPg::new(db_pool.clone());

    let user_service =
        UserService::with_dependencies(Arc::new(user_repo.clone()), Arc::new(redis_cache.clone()));
    let friend_service =
        FriendService::with_dependencies(Arc::new(request_repo), Arc::new(user_repo.clone()));
    let chat_service = ChatService::with_dependencies(
        Arc::new(message_repo),
        Arc::new(user_repo),
        Some(Arc::new(ws_server.clone())),
    );
    let typing_service = TypingService::new(redis_cache.pool());

    println!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(friend_service.clone()))
            .app_data(web::Data::new(chat_service.clone()))
            .app_data(web::Data::new(typing_service.clone()))
            .app_data(web::Data::new(ws_server.clone()))
            .service(health_check)
            .route("/ws", web::get().to(websocket_handler))
            .service(
                web::scope("/api").configure(modules::user::route::public_api_configure).service(
                    web::scope("")
                        .wrap(from_fn(authentication))
                        .configure(modules::user::route::configure)
                        .configure(modules::friend::route::configure)
                        .configure(modules::chat::route::configure),
                ),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
