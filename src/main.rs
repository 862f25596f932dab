use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use promptpay_server::config::Config;
use promptpay_server::db::Database;
use promptpay_server::qr::QrRenderer;
use promptpay_server::routes;
use promptpay_server::service::QrCodeService;
use promptpay_server::storage::FileStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::load()?;

    // The store must be reachable and migrated before the server binds.
    let db = Database::connect(&config.database).await?;
    db.health_check().await?;
    db.run_migrations().await?;

    let files = FileStore::open(&config.storage.data_dir).await?;

    let service = QrCodeService::new(db, files, QrRenderer::new(), config.generate.clone());

    let host = config.server.host.clone();
    let port = config.server.port;
    log::info!("Server listening on http://{}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(service.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .configure(routes)
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await?;

    Ok(())
}
