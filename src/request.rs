//! Payment request models for CSV parsing and validated construction.

use crate::decimal::Amount;
use crate::error::{PixError, Result};
use crate::field::is_printable_ascii;
use serde::Deserialize;
use std::str::FromStr;

/// Transaction id used when no specific reconciliation id is tracked.
pub const DEFAULT_TRANSACTION_ID: &str = "***";

pub const MAX_MERCHANT_NAME_LEN: usize = 25;
pub const MAX_PIX_KEY_LEN: usize = 77;
pub const MAX_MERCHANT_CITY_LEN: usize = 15;
pub const MAX_TRANSACTION_ID_LEN: usize = 25;

/// A validated static PIX charge.
///
/// Fields are private and only reachable through [`PaymentRequest::new`], so
/// every instance satisfies the length and character-set rules of the fields
/// it ends up in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    merchant_name: String,
    pix_key: String,
    amount: Amount,
    merchant_city: String,
    transaction_id: String,
}

impl PaymentRequest {
    /// Validates and builds a request.
    ///
    /// Fails with `Validation` when a field is empty, too long, or the
    /// transaction id is neither `***` nor alphanumeric, and with `Encoding`
    /// when a field contains characters outside printable ASCII.
    pub fn new(
        merchant_name: impl Into<String>,
        pix_key: impl Into<String>,
        amount: Amount,
        merchant_city: impl Into<String>,
        transaction_id: impl Into<String>,
    ) -> Result<Self> {
        let merchant_name = merchant_name.into();
        let pix_key = pix_key.into();
        let merchant_city = merchant_city.into();
        let transaction_id = transaction_id.into();

        check_text("merchant_name", &merchant_name, MAX_MERCHANT_NAME_LEN)?;
        check_text("pix_key", &pix_key, MAX_PIX_KEY_LEN)?;
        check_text("merchant_city", &merchant_city, MAX_MERCHANT_CITY_LEN)?;
        check_text("transaction_id", &transaction_id, MAX_TRANSACTION_ID_LEN)?;

        if transaction_id != DEFAULT_TRANSACTION_ID
            && !transaction_id.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(PixError::validation(
                "transaction_id",
                format!(
                    "{:?} must be alphanumeric or {:?}",
                    transaction_id, DEFAULT_TRANSACTION_ID
                ),
            ));
        }

        Ok(PaymentRequest {
            merchant_name,
            pix_key,
            amount,
            merchant_city,
            transaction_id,
        })
    }

    pub fn merchant_name(&self) -> &str {
        &self.merchant_name
    }

    pub fn pix_key(&self) -> &str {
        &self.pix_key
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn merchant_city(&self) -> &str {
        &self.merchant_city
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }
}

fn check_text(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.is_empty() {
        return Err(PixError::validation(field, "must not be empty"));
    }
    if let Some(c) = value.chars().find(|c| !is_printable_ascii(*c)) {
        return Err(PixError::encoding(
            field,
            format!("character {:?} is outside printable ASCII", c),
        ));
    }
    let len = value.chars().count();
    if len > max {
        return Err(PixError::validation(
            field,
            format!("{} characters exceeds maximum of {}", len, max),
        ));
    }
    Ok(())
}

/// Generates a random 25-character transaction id from a v4 UUID.
pub fn generate_transaction_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(MAX_TRANSACTION_ID_LEN);
    id
}

/// Batch-wide settings applied to CSV rows that leave columns blank.
///
/// Loaded from `PIX_`-prefixed environment variables by
/// [`PayloadDefaults::from_env`]:
///
/// - `PIX_MERCHANT_NAME`, `PIX_KEY` (or `PIX_PIX_KEY`), `PIX_MERCHANT_CITY`
/// - `PIX_GENERATE_TRANSACTION_IDS`: when true, a blank transaction id gets a
///   fresh [`generate_transaction_id`] instead of `***`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PayloadDefaults {
    pub merchant_name: Option<String>,

    #[serde(alias = "key")]
    pub pix_key: Option<String>,

    pub merchant_city: Option<String>,

    #[serde(default)]
    pub generate_transaction_ids: bool,
}

impl PayloadDefaults {
    const ENV_PREFIX: &'static str = "PIX";

    /// Reads the defaults from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    fn load(source: Option<config::Map<String, String>>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix(Self::ENV_PREFIX).source(source))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

/// Raw payment request as read from CSV.
///
/// Every column is optional at this stage; blanks are filled from
/// [`PayloadDefaults`] and everything is checked by [`PaymentRecord::parse`].
#[derive(Debug, Deserialize)]
pub struct PaymentRecord {
    #[serde(default)]
    pub merchant_name: Option<String>,

    #[serde(default)]
    pub pix_key: Option<String>,

    /// Amount, `.` or `,` as decimal separator
    pub amount: Option<String>,

    #[serde(default)]
    pub merchant_city: Option<String>,

    /// Falls back to `***` when blank
    #[serde(default)]
    pub transaction_id: Option<String>,
}

impl PaymentRecord {
    /// Parses the raw CSV record into a validated request.
    pub fn parse(&self, defaults: &PayloadDefaults) -> Result<PaymentRequest> {
        let merchant_name = pick("merchant_name", &self.merchant_name, &defaults.merchant_name)?;
        let pix_key = pick("pix_key", &self.pix_key, &defaults.pix_key)?;
        let merchant_city = pick("merchant_city", &self.merchant_city, &defaults.merchant_city)?;

        let amount = match non_blank(&self.amount) {
            Some(raw) => Amount::from_str(raw)?,
            None => return Err(PixError::validation("amount", "missing")),
        };

        let transaction_id = match non_blank(&self.transaction_id) {
            Some(id) => id.to_string(),
            None if defaults.generate_transaction_ids => generate_transaction_id(),
            None => DEFAULT_TRANSACTION_ID.to_string(),
        };

        PaymentRequest::new(
            merchant_name,
            pix_key,
            amount,
            merchant_city,
            transaction_id,
        )
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn pick<'a>(
    field: &'static str,
    value: &'a Option<String>,
    default: &'a Option<String>,
) -> Result<&'a str> {
    non_blank(value)
        .or_else(|| non_blank(default))
        .ok_or_else(|| PixError::validation(field, "missing and no default configured"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn record(amount: Option<&str>, transaction_id: Option<&str>) -> PaymentRecord {
        PaymentRecord {
            merchant_name: Some("LOJA".to_string()),
            pix_key: Some("loja@example.com".to_string()),
            amount: amount.map(str::to_string),
            merchant_city: Some("SAO PAULO".to_string()),
            transaction_id: transaction_id.map(str::to_string),
        }
    }

    #[test]
    fn test_new_accepts_valid_request() {
        let request = PaymentRequest::new(
            "STEPHANE DANIELLY SANTOS",
            "+5583991868219",
            amount("1.00"),
            "JOAO PESSOA",
            "TESTE",
        )
        .unwrap();

        assert_eq!(request.merchant_name(), "STEPHANE DANIELLY SANTOS");
        assert_eq!(request.amount().to_string(), "1.00");
        assert_eq!(request.transaction_id(), "TESTE");
    }

    #[test]
    fn test_new_rejects_empty_fields() {
        let err = PaymentRequest::new("", "key", amount("1"), "CITY", "***").unwrap_err();
        assert!(matches!(err, PixError::Validation { field: "merchant_name", .. }));

        let err = PaymentRequest::new("NAME", "key", amount("1"), "CITY", "").unwrap_err();
        assert!(matches!(err, PixError::Validation { field: "transaction_id", .. }));
    }

    #[test]
    fn test_new_length_limits() {
        let name = "A".repeat(25);
        assert!(PaymentRequest::new(name.as_str(), "k", amount("1"), "C", "***").is_ok());

        let name = "A".repeat(26);
        let err = PaymentRequest::new(name, "k", amount("1"), "C", "***").unwrap_err();
        assert!(matches!(err, PixError::Validation { field: "merchant_name", .. }));

        let city = "B".repeat(16);
        let err = PaymentRequest::new("N", "k", amount("1"), city, "***").unwrap_err();
        assert!(matches!(err, PixError::Validation { field: "merchant_city", .. }));

        let key = "k".repeat(78);
        let err = PaymentRequest::new("N", key, amount("1"), "C", "***").unwrap_err();
        assert!(matches!(err, PixError::Validation { field: "pix_key", .. }));
    }

    #[test]
    fn test_new_rejects_non_ascii_as_encoding_error() {
        let err = PaymentRequest::new("N", "k", amount("1"), "SÃO PAULO", "***").unwrap_err();
        assert!(matches!(err, PixError::Encoding { field: "merchant_city", .. }));
    }

    #[test]
    fn test_transaction_id_shape() {
        assert!(PaymentRequest::new("N", "k", amount("1"), "C", "***").is_ok());
        assert!(PaymentRequest::new("N", "k", amount("1"), "C", "Pedido42").is_ok());

        let err = PaymentRequest::new("N", "k", amount("1"), "C", "PED-42").unwrap_err();
        assert!(matches!(err, PixError::Validation { field: "transaction_id", .. }));
    }

    #[test]
    fn test_generate_transaction_id() {
        let id = generate_transaction_id();
        assert_eq!(id.len(), MAX_TRANSACTION_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, generate_transaction_id());
        assert!(PaymentRequest::new("N", "k", amount("1"), "C", id).is_ok());
    }

    #[test]
    fn test_parse_record() {
        let request = record(Some(" 10,5 "), Some("PEDIDO42"))
            .parse(&PayloadDefaults::default())
            .unwrap();
        assert_eq!(request.amount().to_string(), "10.50");
        assert_eq!(request.transaction_id(), "PEDIDO42");
    }

    #[test]
    fn test_parse_record_defaults_transaction_id() {
        let request = record(Some("1"), Some("  "))
            .parse(&PayloadDefaults::default())
            .unwrap();
        assert_eq!(request.transaction_id(), DEFAULT_TRANSACTION_ID);
    }

    #[test]
    fn test_parse_record_uses_merchant_defaults() {
        let defaults = PayloadDefaults {
            merchant_name: Some("DEFAULT NAME".to_string()),
            pix_key: Some("default@example.com".to_string()),
            merchant_city: Some("RECIFE".to_string()),
            ..Default::default()
        };
        let rec = PaymentRecord {
            merchant_name: None,
            pix_key: Some("".to_string()),
            amount: Some("2".to_string()),
            merchant_city: Some("NATAL".to_string()),
            transaction_id: None,
        };

        let request = rec.parse(&defaults).unwrap();
        assert_eq!(request.merchant_name(), "DEFAULT NAME");
        assert_eq!(request.pix_key(), "default@example.com");
        assert_eq!(request.merchant_city(), "NATAL");
    }

    #[test]
    fn test_parse_record_rejects_missing_amount() {
        let err = record(None, None)
            .parse(&PayloadDefaults::default())
            .unwrap_err();
        assert!(matches!(err, PixError::Validation { field: "amount", .. }));
    }

    #[test]
    fn test_parse_record_rejects_missing_merchant_without_default() {
        let mut rec = record(Some("1"), None);
        rec.merchant_name = None;
        let err = rec.parse(&PayloadDefaults::default()).unwrap_err();
        assert!(matches!(err, PixError::Validation { field: "merchant_name", .. }));
    }

    #[test]
    fn test_parse_record_generates_transaction_id_when_enabled() {
        let defaults = PayloadDefaults {
            generate_transaction_ids: true,
            ..Default::default()
        };

        let request = record(Some("1"), None).parse(&defaults).unwrap();
        assert_eq!(request.transaction_id().len(), MAX_TRANSACTION_ID_LEN);
        assert_ne!(request.transaction_id(), DEFAULT_TRANSACTION_ID);

        let request = record(Some("1"), Some("PEDIDO42")).parse(&defaults).unwrap();
        assert_eq!(request.transaction_id(), "PEDIDO42");
    }

    fn env_map(pairs: &[(&str, &str)]) -> config::Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_load_from_environment() {
        let defaults = PayloadDefaults::load(Some(env_map(&[
            ("PIX_MERCHANT_NAME", "LOJA CENTRO"),
            ("PIX_KEY", "+5583991868219"),
            ("PIX_MERCHANT_CITY", "RECIFE"),
            ("PIX_GENERATE_TRANSACTION_IDS", "true"),
            ("HOME", "/root"),
        ])))
        .unwrap();

        assert_eq!(defaults.merchant_name.as_deref(), Some("LOJA CENTRO"));
        assert_eq!(defaults.pix_key.as_deref(), Some("+5583991868219"));
        assert_eq!(defaults.merchant_city.as_deref(), Some("RECIFE"));
        assert!(defaults.generate_transaction_ids);
    }

    #[test]
    fn test_defaults_empty_environment() {
        let defaults = PayloadDefaults::load(Some(env_map(&[]))).unwrap();
        assert_eq!(defaults, PayloadDefaults::default());
    }
}
