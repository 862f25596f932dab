use actix_web::http::header::ContentType;
use actix_web::{web, Either, HttpRequest, HttpResponse};

use crate::config::ResponseKind;
use crate::error::ApiError;
use crate::pages;
use crate::service::{GenerateRequest, QrCodeService};

// The generate form
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(pages::index_page())
}

// Generate a QR code from a form or JSON body
pub async fn generate(
    service: web::Data<QrCodeService>,
    req: HttpRequest,
    body: Either<web::Form<GenerateRequest>, web::Json<GenerateRequest>>,
) -> Result<HttpResponse, ApiError> {
    service.authorize(req.headers())?;

    let request = match body {
        Either::Left(form) => form.into_inner(),
        Either::Right(json) => json.into_inner(),
    };

    let generated = service.generate(request).await?;

    let response = match service.response_kind() {
        ResponseKind::Page => HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(pages::confirmation_page(&generated.record)),
        ResponseKind::Image => HttpResponse::Ok()
            .content_type(ContentType::png())
            .body(generated.png),
    };

    Ok(response)
}

// All generated codes, newest first
pub async fn list(service: web::Data<QrCodeService>) -> Result<HttpResponse, ApiError> {
    let records = service.list().await?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(pages::list_page(&records)))
}

// Serve a stored QR image
pub async fn qr_image(
    service: web::Data<QrCodeService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let name = path.into_inner();
    let bytes = service.load_image(&name).await?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::png())
        .body(bytes))
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "promptpay-server",
    }))
}
