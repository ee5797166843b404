//! Boundary to the external QR encoder.
//!
//! Rendering never invalidates a payload: when it fails the caller still holds
//! a usable [`PixPayload`] for copy-and-paste.

use crate::error::{PixError, Result};
use crate::payload::PixPayload;
use log::debug;
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};
use std::fs;
use std::path::Path;

/// Turns a finished payload into a scannable image artifact.
pub trait QrRenderer {
    type Output;

    fn render(&self, payload: &PixPayload) -> Result<Self::Output>;
}

/// Renders payloads as standalone SVG documents.
#[derive(Debug, Clone, Copy)]
pub struct SvgRenderer {
    min_size: u32,
    ec_level: EcLevel,
}

impl SvgRenderer {
    pub const DEFAULT_MIN_SIZE: u32 = 256;

    pub fn new() -> Self {
        SvgRenderer {
            min_size: Self::DEFAULT_MIN_SIZE,
            ec_level: EcLevel::M,
        }
    }

    /// Minimum width and height of the image, in pixels.
    pub fn min_size(mut self, pixels: u32) -> Self {
        self.min_size = pixels;
        self
    }

    pub fn ec_level(mut self, level: EcLevel) -> Self {
        self.ec_level = level;
        self
    }

    /// Renders `payload` and writes the SVG document to `path`.
    pub fn write_to(&self, payload: &PixPayload, path: &Path) -> Result<()> {
        let svg = self.render(payload)?;
        fs::write(path, svg)?;
        debug!("Wrote QR code to {}", path.display());
        Ok(())
    }
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl QrRenderer for SvgRenderer {
    type Output = String;

    fn render(&self, payload: &PixPayload) -> Result<String> {
        let code = QrCode::with_error_correction_level(payload.as_str(), self.ec_level)
            .map_err(|e| PixError::Render(e.to_string()))?;

        Ok(code
            .render::<svg::Color>()
            .min_dimensions(self.min_size, self.min_size)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Amount;
    use crate::request::PaymentRequest;

    fn payload() -> PixPayload {
        let request = PaymentRequest::new(
            "LOJA",
            "loja@example.com",
            Amount::from_cents(123450).unwrap(),
            "SAO PAULO",
            "PEDIDO42",
        )
        .unwrap();
        PixPayload::generate(&request).unwrap()
    }

    #[test]
    fn test_render_svg() {
        let svg = SvgRenderer::new().render(&payload()).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = SvgRenderer::new().min_size(128).ec_level(EcLevel::H);
        assert_eq!(
            renderer.render(&payload()).unwrap(),
            renderer.render(&payload()).unwrap()
        );
    }

    #[test]
    fn test_write_to_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("qr.svg");
        let err = SvgRenderer::new().write_to(&payload(), &path).unwrap_err();
        assert!(matches!(err, PixError::Io(_)));
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qr.svg");
        SvgRenderer::new().write_to(&payload(), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("<svg"));
    }
}
