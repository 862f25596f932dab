//! End-to-end tests for the generate -> store -> serve -> list flow.
//! They need a running PostgreSQL (DB_HOST/DB_NAME/DB_USER/DB_PASSWORD
//! honored, same defaults as the server) and are ignored by default.

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use std::env;
use std::path::Path;
use tempfile::TempDir;

use promptpay_server::config::{AmountPolicy, DatabaseConfig, GenerateConfig, ResponseKind};
use promptpay_server::db::Database;
use promptpay_server::qr::QrRenderer;
use promptpay_server::routes;
use promptpay_server::service::QrCodeService;
use promptpay_server::storage::FileStore;

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

fn db_config() -> DatabaseConfig {
    DatabaseConfig {
        host: env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
        port: 5432,
        name: env::var("DB_NAME").unwrap_or_else(|_| "qr_code_test".to_string()),
        user: env::var("DB_USER").unwrap_or_else(|_| "postgres".to_string()),
        password: env::var("DB_PASSWORD").unwrap_or_default(),
        max_connections: 5,
    }
}

fn config_with(response: ResponseKind) -> GenerateConfig {
    GenerateConfig {
        amount_policy: AmountPolicy::Decimal,
        response,
        auth: None,
    }
}

async fn live_service(data_dir: &Path, config: GenerateConfig) -> QrCodeService {
    let db = Database::connect(&db_config()).await.unwrap();
    db.run_migrations().await.unwrap();
    let files = FileStore::open(data_dir).await.unwrap();
    QrCodeService::new(db, files, QrRenderer::new(), config)
}

fn text_between<'a>(haystack: &'a str, prefix: &str, suffix: &str) -> &'a str {
    let start = haystack.find(prefix).unwrap() + prefix.len();
    let end = haystack[start..].find(suffix).unwrap() + start;
    &haystack[start..end]
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL
async fn generate_stores_image_and_record() {
    let dir = TempDir::new().unwrap();
    let service = live_service(dir.path(), config_with(ResponseKind::Page)).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(service))
            .configure(routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/generate")
        .set_form([("promptpayId", "0812345678"), ("amount", "100.50")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let html = std::str::from_utf8(&body).unwrap();
    assert!(html.contains("QR Generated Successfully"));
    assert!(html.contains("PromptPay ID: 0812345678"));
    assert!(html.contains("Amount: 100.50"));

    // The confirmation links the stored file, which must exist on disk.
    let file_name = text_between(html, "/qr-images/", "\"").to_string();
    let on_disk = std::fs::read(dir.path().join(&file_name)).unwrap();
    assert!(on_disk.starts_with(&PNG_MAGIC));

    // Serving the image returns exactly the written bytes.
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/qr-images/{}", file_name))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    let served = test::read_body(resp).await;
    assert_eq!(served.as_ref(), on_disk.as_slice());

    // And the listing shows the record.
    let resp = test::call_service(&app, test::TestRequest::get().uri("/list").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let listing = std::str::from_utf8(&body).unwrap();
    assert!(listing.contains(&file_name));
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL
async fn ids_increase_and_listing_is_newest_first() {
    let dir = TempDir::new().unwrap();
    let service = live_service(dir.path(), config_with(ResponseKind::Page)).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(service))
            .configure(routes),
    )
    .await;

    let mut ids = Vec::new();
    let mut files = Vec::new();
    for amount in ["10.00", "20.00"] {
        let req = test::TestRequest::post()
            .uri("/generate")
            .set_form([("promptpayId", "0899999999"), ("amount", amount)])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = test::read_body(resp).await;
        let html = std::str::from_utf8(&body).unwrap();
        ids.push(text_between(html, "ID: ", "</p>").parse::<i64>().unwrap());
        files.push(text_between(html, "/qr-images/", "\"").to_string());
    }

    assert!(ids[1] > ids[0], "ids must strictly increase");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/list").to_request()).await;
    let body = test::read_body(resp).await;
    let listing = std::str::from_utf8(&body).unwrap();
    let newer = listing.find(&files[1]).unwrap();
    let older = listing.find(&files[0]).unwrap();
    assert!(newer < older, "newest record must come first");
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL
async fn image_response_kind_answers_with_png() {
    let dir = TempDir::new().unwrap();
    let service = live_service(dir.path(), config_with(ResponseKind::Image)).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(service))
            .configure(routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/generate")
        .set_form([("promptpayId", "0812345678"), ("amount", "420")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );

    let body = test::read_body(resp).await;
    assert!(body.starts_with(&PNG_MAGIC));
}
