use actix_web::http::header::HeaderMap;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth;
use crate::config::{AmountPolicy, GenerateConfig, ResponseKind};
use crate::db::{Database, QrRecord};
use crate::error::ApiError;
use crate::promptpay;
use crate::qr::QrRenderer;
use crate::storage::FileStore;

// NUMERIC(10,2) holds values below 10^8.
const MAX_AMOUNT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

#[derive(Clone)]
pub struct QrCodeService {
    db: Database,
    files: FileStore,
    renderer: QrRenderer,
    config: GenerateConfig,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(rename = "promptpayId")]
    pub promptpay_id: Option<String>,
    pub amount: Option<AmountInput>,
}

/// Amount as submitted: form fields arrive as text, JSON may carry a number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(serde_json::Number),
}

impl AmountInput {
    fn as_text(&self) -> String {
        match self {
            AmountInput::Text(s) => s.trim().to_string(),
            AmountInput::Number(n) => n.to_string(),
        }
    }
}

/// Result of one generation: the stored row plus the PNG that was written.
#[derive(Debug)]
pub struct Generated {
    pub record: QrRecord,
    pub png: Vec<u8>,
}

impl QrCodeService {
    pub fn new(db: Database, files: FileStore, renderer: QrRenderer, config: GenerateConfig) -> Self {
        Self {
            db,
            files,
            renderer,
            config,
        }
    }

    /// Check the request credential when auth is configured.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        auth::authorize(headers, self.config.auth.as_ref())
    }

    pub fn response_kind(&self) -> ResponseKind {
        self.config.response
    }

    /// Generate one QR code: validate, encode, render, write the image,
    /// then insert the record. The file write strictly precedes the insert;
    /// a failed insert leaves the file behind.
    pub async fn generate(&self, request: GenerateRequest) -> Result<Generated, ApiError> {
        let (promptpay_id, amount) = validate_request(&request, self.config.amount_policy)?;

        let payload =
            promptpay::build_payload(&promptpay_id, Some(amount)).map_err(ApiError::Encoding)?;

        let png = self.renderer.render_png(&payload).map_err(ApiError::Render)?;

        let file_name = unique_file_name();
        self.files.save(&file_name, &png).await?;

        let record = match self.db.insert_record(&promptpay_id, amount, &file_name).await {
            Ok(record) => record,
            Err(e) => {
                log::error!(
                    "Record insert failed after writing {}, file left in place",
                    file_name
                );
                return Err(e);
            }
        };

        log::info!(
            "Generated QR {} for {} amount {}",
            record.id,
            record.promptpay_id,
            record.amount
        );

        Ok(Generated { record, png })
    }

    /// Every generated code, newest first.
    pub async fn list(&self) -> Result<Vec<QrRecord>, ApiError> {
        self.db.list_records().await
    }

    pub async fn load_image(&self, name: &str) -> Result<Vec<u8>, ApiError> {
        self.files.load(name).await
    }
}

/// Presence and amount checks. Returns the trimmed PromptPay ID and the
/// amount normalized to two decimal places.
fn validate_request(
    request: &GenerateRequest,
    policy: AmountPolicy,
) -> Result<(String, Decimal), ApiError> {
    let promptpay_id = request
        .promptpay_id
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    let amount_text = request
        .amount
        .as_ref()
        .map(AmountInput::as_text)
        .unwrap_or_default();

    if promptpay_id.is_empty() || amount_text.is_empty() {
        return Err(ApiError::validation("missing promptpayId or amount"));
    }

    if promptpay::sanitize_target(promptpay_id).is_empty() {
        return Err(ApiError::validation(
            "promptpayId must contain at least one digit",
        ));
    }

    let amount = parse_amount(&amount_text, policy)?;

    Ok((promptpay_id.to_string(), amount))
}

fn parse_amount(text: &str, policy: AmountPolicy) -> Result<Decimal, ApiError> {
    let mut amount: Decimal = text
        .parse()
        .map_err(|_| ApiError::validation("invalid amount"))?;

    if amount.is_sign_negative() {
        return Err(ApiError::validation("amount must not be negative"));
    }

    if amount.scale() > 2 {
        return Err(ApiError::validation(
            "amount must have at most two decimal places",
        ));
    }

    if amount >= MAX_AMOUNT {
        return Err(ApiError::validation("amount too large"));
    }

    if policy == AmountPolicy::Integer && !amount.fract().is_zero() {
        return Err(ApiError::validation("amount must be a whole number"));
    }

    amount.rescale(2);

    Ok(amount)
}

/// Creation timestamp plus a random token, so concurrent requests can
/// never collide on a name.
fn unique_file_name() -> String {
    format!(
        "qr_{}_{}.png",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}
