// src/api/routes.rs
use actix_web::web;
use super::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::show_form))
        .route("/", web::post().to(handlers::submit_form))
        .route("/health", web::get().to(handlers::health_check));
}
