//! PromptPay payload construction.
//!
//! Builds the EMVCo merchant-presented TLV string that Thai banking apps
//! scan: payload format, point-of-initiation, the Bank of Thailand merchant
//! template (AID + proxy), country, currency, optional amount, and a
//! CRC-16/CCITT-FALSE checksum. The proxy subfield is picked from the digit
//! count of the sanitized target: 15+ digits is an e-wallet ID, 13+ a tax
//! ID, anything shorter a phone number rewritten to its 0066 form.

use anyhow::Result;
use rust_decimal::Decimal;

const ID_PAYLOAD_FORMAT: &str = "00";
const ID_POI_METHOD: &str = "01";
const ID_MERCHANT_INFO: &str = "29";
const ID_COUNTRY_CODE: &str = "58";
const ID_CURRENCY: &str = "53";
const ID_AMOUNT: &str = "54";
const ID_CRC: &str = "63";

const PAYLOAD_FORMAT_EMV: &str = "01";
const POI_STATIC: &str = "11";
const POI_DYNAMIC: &str = "12";

const MERCHANT_TEMPLATE_AID: &str = "00";
const PROXY_PHONE: &str = "01";
const PROXY_TAX_ID: &str = "02";
const PROXY_EWALLET: &str = "03";
const PROMPTPAY_AID: &str = "A000000677010111";

const CURRENCY_THB: &str = "764";
const COUNTRY_TH: &str = "TH";

/// Build the payload for a payee target and an optional amount.
///
/// A payload without an amount is a static QR (POI method `11`) that the
/// payer fills in; with an amount it is dynamic (`12`) and carries the value
/// formatted to two decimal places.
pub fn build_payload(target: &str, amount: Option<Decimal>) -> Result<String> {
    let digits = sanitize_target(target);
    if digits.is_empty() {
        anyhow::bail!("PromptPay target contains no digits: {:?}", target);
    }

    let proxy_id = match digits.len() {
        n if n >= 15 => PROXY_EWALLET,
        n if n >= 13 => PROXY_TAX_ID,
        _ => PROXY_PHONE,
    };

    let merchant_info = format!(
        "{}{}",
        tlv(MERCHANT_TEMPLATE_AID, PROMPTPAY_AID),
        tlv(proxy_id, &format_target(&digits)),
    );

    let poi = if amount.is_some() { POI_DYNAMIC } else { POI_STATIC };

    let mut payload = String::new();
    payload.push_str(&tlv(ID_PAYLOAD_FORMAT, PAYLOAD_FORMAT_EMV));
    payload.push_str(&tlv(ID_POI_METHOD, poi));
    payload.push_str(&tlv(ID_MERCHANT_INFO, &merchant_info));
    payload.push_str(&tlv(ID_COUNTRY_CODE, COUNTRY_TH));
    payload.push_str(&tlv(ID_CURRENCY, CURRENCY_THB));
    if let Some(amount) = amount {
        payload.push_str(&tlv(ID_AMOUNT, &format_amount(amount)));
    }

    // The CRC field id and length are part of the checksummed text.
    payload.push_str(ID_CRC);
    payload.push_str("04");
    let crc = crc16_ccitt(payload.as_bytes());
    payload.push_str(&format!("{:04X}", crc));

    Ok(payload)
}

/// Strip everything but digits from a target identifier.
pub fn sanitize_target(target: &str) -> String {
    target.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn tlv(id: &str, value: &str) -> String {
    format!("{}{:02}{}", id, value.len(), value)
}

// Tax IDs and e-wallet IDs (13+ digits) pass through unchanged; phone
// numbers swap the leading 0 for the 66 country code and are zero-padded to
// 13 digits.
fn format_target(digits: &str) -> String {
    if digits.len() >= 13 {
        return digits.to_string();
    }
    let rewritten = match digits.strip_prefix('0') {
        Some(rest) => format!("66{}", rest),
        None => digits.to_string(),
    };
    format!("{:0>13}", rewritten)
}

fn format_amount(amount: Decimal) -> String {
    let mut amount = amount;
    amount.rescale(2);
    amount.to_string()
}

fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn crc16_matches_reference_vector() {
        // Standard CRC-16/CCITT-FALSE check value.
        assert_eq!(crc16_ccitt(b"123456789"), 0x29B1);
    }

    #[test]
    fn dynamic_payload_layout() {
        let payload = build_payload("0899999999", Some(dec!(420))).unwrap();
        assert_eq!(
            payload,
            "00020101021229370016A000000677010111011300668999999995802TH53037645406420.006304CF9E"
        );
    }

    #[test]
    fn crc_suffix_is_consistent() {
        let payload = build_payload("0812345678", Some(dec!(100.50))).unwrap();
        let (body, crc) = payload.split_at(payload.len() - 4);
        assert!(body.ends_with("6304"));
        let expected = format!("{:04X}", crc16_ccitt(body.as_bytes()));
        assert_eq!(crc, expected);
    }

    #[test]
    fn static_payload_has_no_amount_field() {
        let payload = build_payload("0899999999", None).unwrap();
        assert!(payload.contains("010211"));
        assert!(!payload.contains("5406"));
    }

    #[test]
    fn phone_number_is_rewritten_to_country_form() {
        let payload = build_payload("0812345678", Some(dec!(100.50))).unwrap();
        assert_eq!(
            payload,
            "00020101021229370016A000000677010111011300668123456785802TH53037645406100.506304F88B"
        );
    }

    #[test]
    fn tax_id_passes_through_unchanged() {
        let payload = build_payload("1234567890123", Some(dec!(1))).unwrap();
        assert!(payload.contains("02131234567890123"));
    }

    #[test]
    fn ewallet_id_uses_proxy_03() {
        let payload = build_payload("123456789012345", None).unwrap();
        assert!(payload.contains("0315123456789012345"));
    }

    #[test]
    fn separators_in_target_are_ignored() {
        let dashed = build_payload("081-234-5678", Some(dec!(5))).unwrap();
        let plain = build_payload("0812345678", Some(dec!(5))).unwrap();
        assert_eq!(dashed, plain);
    }

    #[test]
    fn amount_is_rendered_with_two_decimals() {
        let payload = build_payload("0812345678", Some(dec!(7.5))).unwrap();
        assert!(payload.contains("54047.50"));
    }

    #[test]
    fn target_without_digits_is_rejected() {
        assert!(build_payload("abc", Some(dec!(1))).is_err());
        assert!(build_payload("", None).is_err());
    }
}
