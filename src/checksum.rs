//! CRC16/CCITT-FALSE over the payload text.
//!
//! Polynomial `0x1021`, initial value `0xFFFF`, no reflection, no final XOR.
//! The `crc` crate catalogues this variant as `CRC_16_IBM_3740`.

use crate::builder::CRC_HEADER;
use crate::error::{PixError, Result};
use crc::{Crc, CRC_16_IBM_3740};

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Number of hex digits in the checksum value.
pub const CHECKSUM_LEN: usize = 4;

pub fn crc16(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}

/// Formats a checksum as 4 uppercase, zero-padded hex digits.
pub fn format_checksum(crc: u16) -> String {
    format!("{:04X}", crc)
}

/// Appends the checksum to a string that ends with the `6304` header.
///
/// The checksum covers everything before it, header included.
pub fn append_checksum(unsigned: &str) -> Result<String> {
    if !unsigned.ends_with(CRC_HEADER) {
        return Err(PixError::malformed(format!(
            "missing checksum header {}",
            CRC_HEADER
        )));
    }

    let mut out = String::with_capacity(unsigned.len() + CHECKSUM_LEN);
    out.push_str(unsigned);
    out.push_str(&format_checksum(crc16(unsigned.as_bytes())));
    Ok(out)
}

/// Verifies the trailing checksum of a complete payload.
///
/// Hex digits are compared case-insensitively.
pub fn verify(payload: &str) -> Result<()> {
    let split = payload
        .len()
        .checked_sub(CHECKSUM_LEN)
        .filter(|&at| payload.is_char_boundary(at))
        .ok_or_else(|| PixError::malformed("payload too short for a checksum"))?;
    let (body, found) = payload.split_at(split);

    if !body.ends_with(CRC_HEADER) {
        return Err(PixError::malformed(format!(
            "missing checksum header {}",
            CRC_HEADER
        )));
    }

    let expected = format_checksum(crc16(body.as_bytes()));
    if !expected.eq_ignore_ascii_case(found) {
        return Err(PixError::ChecksumMismatch {
            expected,
            found: found.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        assert_eq!(crc16(b"123456789"), 0x29B1);
    }

    #[test]
    fn test_empty_input_is_initial_value() {
        assert_eq!(crc16(b""), 0xFFFF);
    }

    #[test]
    fn test_format_is_padded_uppercase() {
        assert_eq!(format_checksum(0x29B1), "29B1");
        assert_eq!(format_checksum(0x00AB), "00AB");
        assert_eq!(format_checksum(0), "0000");
    }

    #[test]
    fn test_append_checksum() {
        let signed = append_checksum("0002015802BR6304").unwrap();
        assert_eq!(signed, "0002015802BR6304D1D4");
        assert!(verify(&signed).is_ok());
    }

    #[test]
    fn test_append_requires_header() {
        let err = append_checksum("0002015802BR").unwrap_err();
        assert!(matches!(err, PixError::MalformedPayload(_)));
    }

    #[test]
    fn test_deterministic() {
        let input = "00020126360014BR.GOV.BCB.PIX6304";
        assert_eq!(append_checksum(input).unwrap(), append_checksum(input).unwrap());
    }

    #[test]
    fn test_single_character_change_changes_checksum() {
        let a = crc16(b"0002015802BR6304");
        let b = crc16(b"0002015802BS6304");
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_detects_mismatch() {
        let mut signed = append_checksum("0002015802BR6304").unwrap();
        let last = signed.pop().unwrap();
        signed.push(if last == '0' { '1' } else { '0' });

        assert!(matches!(
            verify(&signed),
            Err(PixError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_verify_accepts_lowercase_hex() {
        let signed = append_checksum("0002015802BR6304").unwrap();
        let (body, crc) = signed.split_at(signed.len() - 4);
        let lowered = format!("{}{}", body, crc.to_lowercase());
        assert!(verify(&lowered).is_ok());
    }

    #[test]
    fn test_verify_rejects_short_input() {
        assert!(matches!(verify("630"), Err(PixError::MalformedPayload(_))));
    }
}
