//! HTML rendering for the form, confirmation, and listing pages.
//! Pure string builders; escaping happens here, filtering does not.

use crate::db::QrRecord;

pub fn index_page() -> String {
    r#"
    <h1>Generate PromptPay QR Code</h1>
    <form method="POST" action="/generate">
      <label>PromptPay ID:</label><br/>
      <input type="text" name="promptpayId" required /><br/><br/>
      <label>Amount:</label><br/>
      <input type="number" name="amount" step="0.01" required /><br/><br/>
      <button type="submit">Generate QR</button>
    </form>
    <br/>
    <a href="/list">View QR List</a>
    "#
    .to_string()
}

pub fn confirmation_page(record: &QrRecord) -> String {
    let image = escape(&record.image_path);
    format!(
        r#"
    <h2>QR Generated Successfully</h2>
    <p>ID: {id}</p>
    <p>PromptPay ID: {promptpay}</p>
    <p>Amount: {amount}</p>
    <p>Image: <a href="/qr-images/{image}" target="_blank">View QR Code</a></p>
    <p><img src="/qr-images/{image}" alt="PromptPay QR code" /></p>
    <br/>
    <a href="/">Go Back</a> | <a href="/list">View All QR Codes</a>
    "#,
        id = record.id,
        promptpay = escape(&record.promptpay_id),
        amount = record.amount,
        image = image,
    )
}

/// Records are rendered in the order given (the store lists newest first).
pub fn list_page(records: &[QrRecord]) -> String {
    let mut html = String::from("<h1>List of Generated QR Codes</h1>");
    html.push_str(
        r#"<table border="1" cellpadding="5" cellspacing="0">
      <tr>
        <th>ID</th>
        <th>PromptPay ID</th>
        <th>Amount</th>
        <th>QR Code Image</th>
      </tr>"#,
    );

    for record in records {
        html.push_str(&format!(
            r#"<tr>
        <td>{}</td>
        <td>{}</td>
        <td>{}</td>
        <td><a href="/qr-images/{}" target="_blank">View Image</a></td>
      </tr>"#,
            record.id,
            escape(&record.promptpay_id),
            record.amount,
            escape(&record.image_path),
        ));
    }

    html.push_str(r#"</table><br/><a href="/">Go Back</a>"#);
    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
