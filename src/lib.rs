//! # PIX Payload
//!
//! Generates static PIX charges: EMV QR-Code Merchant-Presented-Mode payloads
//! made of 2-digit tag, 2-digit length and value fields, closed by a
//! CRC16/CCITT-FALSE checksum.
//!
//! ## Design Principles
//!
//! - **Immutable input**: a [`PaymentRequest`] is validated once at construction
//! - **Derived lengths**: every length prefix is computed from the value it announces
//! - **Fixed-point amounts**: two decimal places via `rust_decimal`, never floats
//! - **Fresh output**: each generation returns a new [`PixPayload`]
//!
//! ## Example
//!
//! ```
//! use pix_payload::{Amount, PaymentRequest, PixPayload};
//! use std::str::FromStr;
//!
//! let request = PaymentRequest::new(
//!     "STEPHANE DANIELLY SANTOS",
//!     "+5583991868219",
//!     Amount::from_str("1.00").unwrap(),
//!     "JOAO PESSOA",
//!     "TESTE",
//! )
//! .unwrap();
//!
//! let payload = PixPayload::generate(&request).unwrap();
//! assert_eq!(payload.checksum(), "85D8");
//! assert_eq!(payload.decode().unwrap(), request);
//! ```

pub mod batch;
pub mod builder;
pub mod checksum;
pub mod collaborators;
pub mod decimal;
pub mod error;
pub mod field;
pub mod payload;
pub mod render;
pub mod request;

pub use batch::{BatchEntry, PayloadBatch};
pub use builder::PayloadBuilder;
pub use decimal::Amount;
pub use error::{PixError, Result};
pub use field::{EmvField, Tag};
pub use payload::PixPayload;
pub use render::{QrRenderer, SvgRenderer};
pub use request::{
    generate_transaction_id, PayloadDefaults, PaymentRecord, PaymentRequest,
    DEFAULT_TRANSACTION_ID,
};
