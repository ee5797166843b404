//! EMV tag-length-value fields.
//!
//! Every field is written as a 2-digit tag, a 2-digit decimal length and the
//! value itself. Lengths count characters, and since values are restricted to
//! printable ASCII that is also the byte count.

use crate::error::{PixError, Result};
use std::fmt;

/// Largest value length a 2-digit length prefix can announce.
pub const MAX_VALUE_LEN: usize = 99;

/// A 2-digit EMV field identifier (`00`..=`99`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(u8);

impl Tag {
    pub const PAYLOAD_FORMAT_INDICATOR: Tag = Tag(0);
    pub const MERCHANT_ACCOUNT_INFO: Tag = Tag(26);
    pub const MERCHANT_CATEGORY_CODE: Tag = Tag(52);
    pub const TRANSACTION_CURRENCY: Tag = Tag(53);
    pub const TRANSACTION_AMOUNT: Tag = Tag(54);
    pub const COUNTRY_CODE: Tag = Tag(58);
    pub const MERCHANT_NAME: Tag = Tag(59);
    pub const MERCHANT_CITY: Tag = Tag(60);
    pub const ADDITIONAL_DATA: Tag = Tag(62);
    pub const CRC16: Tag = Tag(63);

    /// Sub-tags of Merchant Account Information.
    pub const GUI: Tag = Tag(0);
    pub const PIX_KEY: Tag = Tag(1);

    /// Sub-tag of the Additional Data Field Template.
    pub const REFERENCE_LABEL: Tag = Tag(5);

    /// Creates a tag, returning `None` outside `0..=99`.
    pub const fn new(id: u8) -> Option<Tag> {
        if id <= 99 {
            Some(Tag(id))
        } else {
            None
        }
    }

    pub fn id(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// One TLV triad. The length is always derived from the value, so the
/// declared length cannot drift from the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmvField {
    tag: Tag,
    value: String,
}

impl EmvField {
    /// Creates a field, failing with `Encoding` if the value is longer than
    /// 99 characters or contains anything outside printable ASCII.
    pub fn new(tag: Tag, value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if let Some(c) = value.chars().find(|c| !is_printable_ascii(*c)) {
            return Err(PixError::encoding(
                "field",
                format!("tag {} contains non-printable-ASCII character {:?}", tag, c),
            ));
        }
        if value.len() > MAX_VALUE_LEN {
            return Err(PixError::encoding(
                "field",
                format!(
                    "tag {} value has {} characters, maximum is {}",
                    tag,
                    value.len(),
                    MAX_VALUE_LEN
                ),
            ));
        }
        Ok(EmvField { tag, value })
    }

    /// Builds a template field whose value is the serialized `children`.
    pub fn template(tag: Tag, children: &[EmvField]) -> Result<Self> {
        let mut nested = String::new();
        for child in children {
            child.encode_into(&mut nested);
        }
        EmvField::new(tag, nested)
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Character count of the value, as written in the length prefix.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Number of characters this field occupies once encoded.
    pub fn encoded_len(&self) -> usize {
        4 + self.value.len()
    }

    /// Appends `TAG LENGTH VALUE` to `out`.
    pub fn encode_into(&self, out: &mut String) {
        out.push_str(&format!("{}{:02}", self.tag, self.value.len()));
        out.push_str(&self.value);
    }

    /// Parses the value of a template field as its own TLV sequence.
    pub fn children(&self) -> Result<Vec<EmvField>> {
        parse_fields(&self.value)
    }
}

impl fmt::Display for EmvField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02}{}", self.tag, self.value.len(), self.value)
    }
}

/// Tokenizes a single TLV level into fields, in order.
///
/// Fails with `MalformedPayload` on truncated headers, non-digit tags or
/// lengths, or a length that runs past the end of the input.
pub fn parse_fields(input: &str) -> Result<Vec<EmvField>> {
    if let Some(c) = input.chars().find(|c| !is_printable_ascii(*c)) {
        return Err(PixError::malformed(format!(
            "non-printable-ASCII character {:?}",
            c
        )));
    }

    let bytes = input.as_bytes();
    let mut fields = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if pos + 4 > bytes.len() {
            return Err(PixError::malformed(format!(
                "truncated field header at offset {}",
                pos
            )));
        }
        let tag = parse_two_digits(&input[pos..pos + 2])
            .and_then(Tag::new)
            .ok_or_else(|| PixError::malformed(format!("invalid tag at offset {}", pos)))?;
        let len = parse_two_digits(&input[pos + 2..pos + 4]).ok_or_else(|| {
            PixError::malformed(format!("invalid length for tag {} at offset {}", tag, pos))
        })? as usize;

        let start = pos + 4;
        let end = start + len;
        if end > bytes.len() {
            return Err(PixError::malformed(format!(
                "tag {} declares {} characters but only {} remain",
                tag,
                len,
                bytes.len() - start
            )));
        }

        fields.push(EmvField {
            tag,
            value: input[start..end].to_string(),
        });
        pos = end;
    }

    Ok(fields)
}

/// Returns the first field with the given tag.
pub fn find(fields: &[EmvField], tag: Tag) -> Option<&EmvField> {
    fields.iter().find(|f| f.tag == tag)
}

pub(crate) fn is_printable_ascii(c: char) -> bool {
    (' '..='~').contains(&c)
}

fn parse_two_digits(s: &str) -> Option<u8> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some((bytes[0] - b'0') * 10 + (bytes[1] - b'0'))
}
