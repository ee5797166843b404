//! Serializes a [`PaymentRequest`] into the EMV MPM field sequence.

use crate::error::Result;
use crate::field::{EmvField, Tag};
use crate::request::PaymentRequest;
use log::debug;

/// Payload Format Indicator value.
pub const PAYLOAD_FORMAT: &str = "01";
/// Globally unique identifier of the PIX arrangement.
pub const PIX_GUI: &str = "BR.GOV.BCB.PIX";
pub const MERCHANT_CATEGORY_CODE: &str = "0000";
/// ISO 4217 numeric code for BRL.
pub const CURRENCY_BRL: &str = "986";
pub const COUNTRY_CODE: &str = "BR";
/// Tag and length of the CRC field, whose 4-character value follows.
pub const CRC_HEADER: &str = "6304";

/// Builds the checksum-ready TLV string for one request.
///
/// The output ends with [`CRC_HEADER`]; the checksum value itself is
/// appended by [`crate::checksum::append_checksum`].
pub struct PayloadBuilder<'a> {
    request: &'a PaymentRequest,
}

impl<'a> PayloadBuilder<'a> {
    pub fn new(request: &'a PaymentRequest) -> Self {
        PayloadBuilder { request }
    }

    /// Returns the top-level fields in transmission order, without the CRC.
    pub fn fields(&self) -> Result<Vec<EmvField>> {
        let request = self.request;

        let merchant_account = EmvField::template(
            Tag::MERCHANT_ACCOUNT_INFO,
            &[
                EmvField::new(Tag::GUI, PIX_GUI)?,
                EmvField::new(Tag::PIX_KEY, request.pix_key())?,
            ],
        )?;
        let additional_data = EmvField::template(
            Tag::ADDITIONAL_DATA,
            &[EmvField::new(Tag::REFERENCE_LABEL, request.transaction_id())?],
        )?;

        Ok(vec![
            EmvField::new(Tag::PAYLOAD_FORMAT_INDICATOR, PAYLOAD_FORMAT)?,
            merchant_account,
            EmvField::new(Tag::MERCHANT_CATEGORY_CODE, MERCHANT_CATEGORY_CODE)?,
            EmvField::new(Tag::TRANSACTION_CURRENCY, CURRENCY_BRL)?,
            EmvField::new(Tag::TRANSACTION_AMOUNT, request.amount().to_string())?,
            EmvField::new(Tag::COUNTRY_CODE, COUNTRY_CODE)?,
            EmvField::new(Tag::MERCHANT_NAME, request.merchant_name())?,
            EmvField::new(Tag::MERCHANT_CITY, request.merchant_city())?,
            additional_data,
        ])
    }

    /// Concatenates the encoded fields and the CRC header.
    pub fn build(&self) -> Result<String> {
        let fields = self.fields()?;
        let capacity = fields.iter().map(EmvField::encoded_len).sum::<usize>() + 8;

        let mut out = String::with_capacity(capacity);
        for field in &fields {
            field.encode_into(&mut out);
        }
        out.push_str(CRC_HEADER);

        debug!(
            "Built {}-character payload for transaction {}",
            out.len(),
            self.request.transaction_id()
        );
        Ok(out)
    }
}
