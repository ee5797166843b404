//! The final transmissible PIX payload ("copia e cola" text).
//!
//! [`PixPayload::generate`] runs the builder and checksum in one pass and
//! returns a fresh value; [`PixPayload::parse`] and [`PixPayload::decode`]
//! go the other way, from text back to a validated [`PaymentRequest`].

use crate::builder::{
    PayloadBuilder, COUNTRY_CODE, CURRENCY_BRL, MERCHANT_CATEGORY_CODE, PAYLOAD_FORMAT, PIX_GUI,
};
use crate::checksum::{self, CHECKSUM_LEN};
use crate::decimal::Amount;
use crate::error::{PixError, Result};
use crate::field::{self, EmvField, Tag};
use crate::request::PaymentRequest;
use log::debug;
use std::fmt;
use std::str::FromStr;

/// A complete payload whose trailing CRC16 matches its contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PixPayload(String);

impl PixPayload {
    /// Builds and signs the payload for `request`.
    pub fn generate(request: &PaymentRequest) -> Result<Self> {
        let unsigned = PayloadBuilder::new(request).build()?;
        let signed = checksum::append_checksum(&unsigned)?;
        debug!(
            "Generated payload for transaction {} with checksum {}",
            request.transaction_id(),
            &signed[signed.len() - CHECKSUM_LEN..]
        );
        Ok(PixPayload(signed))
    }

    /// Accepts an existing payload after checking its TLV framing and
    /// checksum.
    pub fn parse(input: &str) -> Result<Self> {
        let fields = field::parse_fields(input)?;
        match fields.last() {
            Some(last) if last.tag() == Tag::CRC16 && last.len() == CHECKSUM_LEN => {}
            _ => {
                return Err(PixError::malformed(
                    "last field must be the 4-character CRC16 (tag 63)",
                ))
            }
        }
        checksum::verify(input)?;
        Ok(PixPayload(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// The 4 hex digits of the trailing CRC16.
    pub fn checksum(&self) -> &str {
        &self.0[self.0.len() - CHECKSUM_LEN..]
    }

    /// Top-level fields in transmission order, CRC field included.
    pub fn fields(&self) -> Result<Vec<EmvField>> {
        field::parse_fields(&self.0)
    }

    /// Reconstructs the request this payload was generated from.
    pub fn decode(&self) -> Result<PaymentRequest> {
        let fields = self.fields()?;

        match fields.first() {
            Some(first)
                if first.tag() == Tag::PAYLOAD_FORMAT_INDICATOR
                    && first.value() == PAYLOAD_FORMAT => {}
            _ => {
                return Err(PixError::malformed(format!(
                    "payload must start with format indicator {}",
                    PAYLOAD_FORMAT
                )))
            }
        }

        let account = required(&fields, Tag::MERCHANT_ACCOUNT_INFO)?.children()?;
        let gui = required(&account, Tag::GUI)?;
        if !gui.value().eq_ignore_ascii_case(PIX_GUI) {
            return Err(PixError::malformed(format!(
                "merchant account GUI {:?} is not {}",
                gui.value(),
                PIX_GUI
            )));
        }
        let pix_key = required(&account, Tag::PIX_KEY)?.value();

        expect_literal(&fields, Tag::MERCHANT_CATEGORY_CODE, MERCHANT_CATEGORY_CODE)?;
        expect_literal(&fields, Tag::TRANSACTION_CURRENCY, CURRENCY_BRL)?;
        expect_literal(&fields, Tag::COUNTRY_CODE, COUNTRY_CODE)?;

        // Must be byte-identical to what the builder writes.
        let raw_amount = required(&fields, Tag::TRANSACTION_AMOUNT)?.value();
        let amount = Amount::from_str(raw_amount)
            .ok()
            .filter(|amount| amount.to_string() == raw_amount)
            .ok_or_else(|| {
                PixError::malformed(format!(
                    "transaction amount {:?} is not a canonical two-digit decimal",
                    raw_amount
                ))
            })?;
        let merchant_name = required(&fields, Tag::MERCHANT_NAME)?.value();
        let merchant_city = required(&fields, Tag::MERCHANT_CITY)?.value();

        let additional = required(&fields, Tag::ADDITIONAL_DATA)?.children()?;
        let transaction_id = required(&additional, Tag::REFERENCE_LABEL)?.value();

        PaymentRequest::new(merchant_name, pix_key, amount, merchant_city, transaction_id)
    }
}

fn required(fields: &[EmvField], tag: Tag) -> Result<&EmvField> {
    field::find(fields, tag).ok_or_else(|| PixError::malformed(format!("missing field {}", tag)))
}

fn expect_literal(fields: &[EmvField], tag: Tag, expected: &str) -> Result<()> {
    let found = required(fields, tag)?;
    if found.value() != expected {
        return Err(PixError::malformed(format!(
            "field {} is {:?}, expected {:?}",
            tag,
            found.value(),
            expected
        )));
    }
    Ok(())
}

impl fmt::Display for PixPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PixPayload {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for PixPayload {
    type Err = PixError;

    fn from_str(s: &str) -> Result<Self> {
        PixPayload::parse(s)
    }
}
