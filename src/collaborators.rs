//! Interfaces to the I/O collaborators around payload generation.
//!
//! Order storage, chat notifications and OCR live outside this crate. What
//! lives here is the boundary they plug into, plus the pure logic the app runs
//! around them: the receipt keyword gate, message formatting and bounded retry.

use crate::error::{PixError, Result};
use crate::payload::PixPayload;
use crate::request::PaymentRequest;
use log::{debug, warn};
use std::thread;
use std::time::Duration;

/// Append/query/update store for finished orders, keyed by order id.
pub trait OrderStore {
    type Record;

    fn append(&mut self, id: &str, record: Self::Record) -> Result<()>;

    fn get(&self, id: &str) -> Result<Option<Self::Record>>;

    fn update(&mut self, id: &str, record: Self::Record) -> Result<()>;
}

/// Binary attachment sent along with a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Fire-and-forget chat delivery.
pub trait Notifier {
    fn send(&self, text: &str, attachment: Option<&Attachment>) -> Result<()>;
}

/// OCR service: image bytes in, recognized text out.
pub trait TextRecognizer {
    fn recognize(&self, image: &[u8]) -> Result<String>;
}

const RECEIPT_KEYWORDS: [&str; 5] = ["pix", "chave", "valor", "recebido", "pagamento"];

/// Gates acceptance of a payment proof on the words OCR finds in it.
///
/// Recognizer failures count as "not a receipt".
pub fn is_pix_receipt(recognizer: &dyn TextRecognizer, image: &[u8]) -> bool {
    match recognizer.recognize(image) {
        Ok(text) => {
            let text = text.to_lowercase();
            let matched = RECEIPT_KEYWORDS.iter().find(|word| text.contains(*word));
            debug!("Receipt keyword match: {:?}", matched);
            matched.is_some()
        }
        Err(e) => {
            warn!("Receipt OCR failed: {}", e);
            false
        }
    }
}

/// Escapes the characters MarkdownV2 reserves.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if "_*[]()~`>#+-=|{}.!".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Formats the MarkdownV2 chat message announcing a pending charge.
pub fn format_payment_notice(request: &PaymentRequest, payload: &PixPayload) -> String {
    let brl = request.amount().to_string().replace('.', ",");
    format!(
        "*NOVA COBRANÇA PIX*\n\n\
         *Recebedor:* {}\n\
         *Cidade:* {}\n\
         *TXID:* {}\n\
         *Valor:* R$ {}\n\n\
         *Pix copia e cola:*\n`{}`",
        escape_markdown_v2(request.merchant_name()),
        escape_markdown_v2(request.merchant_city()),
        escape_markdown_v2(request.transaction_id()),
        escape_markdown_v2(&brl),
        escape_code_span(payload.as_str()),
    )
}

/// Inside code spans MarkdownV2 only reserves `` ` `` and `\`.
fn escape_code_span(text: &str) -> String {
    text.replace('\\', "\\\\").replace('`', "\\`")
}

/// Bounded retry with exponential backoff for collaborator calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: u32,
}

impl RetryPolicy {
    /// Runs `op` until it succeeds or `max_attempts` is spent, returning
    /// the last error as `Collaborator`.
    pub fn run<T, F>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let attempts = self.max_attempts.max(1);
        let mut backoff = self.initial_backoff;
        let mut attempt = 1;

        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= attempts => {
                    return Err(match e {
                        PixError::Collaborator(_) => e,
                        other => PixError::Collaborator(other.to_string()),
                    });
                }
                Err(e) => {
                    warn!(
                        "Attempt {}/{} failed: {}; retrying in {:?}",
                        attempt, attempts, e, backoff
                    );
                    thread::sleep(backoff);
                    backoff = backoff.saturating_mul(self.multiplier);
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            multiplier: 2,
        }
    }
}
