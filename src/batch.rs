//! Batch payload generation from CSV.
//!
//! Reads payment requests row by row, generates a payload for each valid row
//! and keeps them in input order. Invalid rows are logged and skipped.

use crate::error::Result;
use crate::payload::PixPayload;
use crate::render::SvgRenderer;
use crate::request::{PayloadDefaults, PaymentRecord, DEFAULT_TRANSACTION_ID};
use csv::{ReaderBuilder, Trim};
use log::{debug, info, warn};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// One generated payload and the transaction id it was issued for.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub transaction_id: String,
    pub payload: PixPayload,
}

/// Streaming CSV-to-payload generator.
///
/// # Output Ordering
///
/// Payloads are written in the order their rows were read.
pub struct PayloadBatch {
    /// Merchant attributes for rows that leave them blank.
    defaults: PayloadDefaults,

    /// Generated payloads, in input order.
    entries: Vec<BatchEntry>,

    /// Directory receiving one SVG per payload, if any.
    qr_output: Option<(PathBuf, SvgRenderer)>,
}

impl PayloadBatch {
    /// Creates an empty batch.
    pub fn new(defaults: PayloadDefaults) -> Self {
        PayloadBatch {
            defaults,
            entries: Vec::new(),
            qr_output: None,
        }
    }

    /// Renders a QR code for every generated payload into `dir`.
    pub fn with_qr_output(mut self, dir: impl Into<PathBuf>, renderer: SvgRenderer) -> Self {
        self.qr_output = Some((dir.into(), renderer));
        self
    }

    /// Processes payment requests from a CSV reader in streaming fashion.
    ///
    /// Rows that fail to decode or validate are logged at warn level and
    /// skipped.
    pub fn process_csv<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        for (row_idx, result) in csv_reader.deserialize::<PaymentRecord>().enumerate() {
            let row_num = row_idx + 2; // 1-indexed, accounting for header row

            match result {
                Ok(record) => {
                    if let Err(e) = self.process_record(&record, row_num) {
                        warn!("Row {}: {}", row_num, e);
                    }
                }
                Err(e) => {
                    warn!("Row {}: CSV parse error: {}", row_num, e);
                }
            }
        }

        info!("Generated {} payloads", self.entries.len());
        Ok(())
    }

    fn process_record(&mut self, record: &PaymentRecord, row: usize) -> Result<()> {
        let request = record.parse(&self.defaults)?;
        let payload = PixPayload::generate(&request)?;
        debug!(
            "Row {}: Generated payload for transaction {}",
            row,
            request.transaction_id()
        );

        if let Some((dir, renderer)) = &self.qr_output {
            let path = qr_path(dir, request.transaction_id(), row);
            // The text payload stays in the output even when rendering fails.
            if let Err(e) = renderer.write_to(&payload, &path) {
                warn!("Row {}: QR code not written to {}: {}", row, path.display(), e);
            }
        }

        self.entries.push(BatchEntry {
            transaction_id: request.transaction_id().to_string(),
            payload,
        });
        Ok(())
    }

    /// Generated payloads, in input order.
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    /// Writes `transaction_id,payload` CSV.
    pub fn write_output<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["transaction_id", "payload"])?;

        for entry in &self.entries {
            csv_writer.write_record([entry.transaction_id.as_str(), entry.payload.as_str()])?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

/// `<transaction_id>.svg`, or `row-<n>.svg` for rows without their own id.
fn qr_path(dir: &Path, transaction_id: &str, row: usize) -> PathBuf {
    if transaction_id == DEFAULT_TRANSACTION_ID {
        dir.join(format!("row-{}.svg", row))
    } else {
        dir.join(format!("{}.svg", transaction_id))
    }
}

impl Default for PayloadBatch {
    fn default() -> Self {
        Self::new(PayloadDefaults::default())
    }
}
