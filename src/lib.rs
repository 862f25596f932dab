pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod promptpay;
pub mod qr;
pub mod service;
pub mod storage;

use actix_web::web;

/// Route table, shared by the binary and the integration tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/generate", web::post().to(handlers::generate))
        .route("/list", web::get().to(handlers::list))
        .route("/qr-images/{filename}", web::get().to(handlers::qr_image))
        .route("/health", web::get().to(handlers::health));
}
