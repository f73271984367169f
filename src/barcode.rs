//! EAN-13 rasterization.
//!
//! Bar patterns come from `barcoders`; this module only turns the module
//! sequence into a grayscale bitmap the PDF writer can embed.

use crate::error::{Error, Result};
use barcoders::sym::ean13::EAN13;

const BAR: u8 = 0;
const SPACE: u8 = 255;

/// Raster geometry for rendered symbols.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Pixels per symbol module.
    pub module_px: u32,
    /// Bar height in pixels.
    pub height_px: u32,
    pub quiet_left: u32,
    pub quiet_right: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            module_px: 2,
            height_px: 60,
            quiet_left: 11,
            quiet_right: 7,
        }
    }
}

/// 8-bit grayscale image, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Render `code` as an EAN-13 symbol.
///
/// Only the first 12 digits are encoded; the check digit is always recomputed,
/// so a wrong or missing check digit never fails. Shorter or non-numeric input
/// is rejected by the encoder.
pub fn render_ean13(code: &str, opts: &RenderOptions) -> Result<BarcodeImage> {
    let payload = if code.len() >= 12 && code.bytes().all(|b| b.is_ascii_digit()) {
        &code[..12]
    } else {
        code
    };
    let symbol = EAN13::new(payload).map_err(|e| Error::Barcode {
        code: code.to_string(),
        details: e.to_string(),
    })?;
    Ok(rasterize(&symbol.encode(), opts))
}

fn rasterize(modules: &[u8], opts: &RenderOptions) -> BarcodeImage {
    let mut line = Vec::new();
    let quiet = |n: u32| std::iter::repeat(SPACE).take((n * opts.module_px) as usize);

    line.extend(quiet(opts.quiet_left));
    for &m in modules {
        let shade = if m == 1 { BAR } else { SPACE };
        line.extend(std::iter::repeat(shade).take(opts.module_px as usize));
    }
    line.extend(quiet(opts.quiet_right));

    let width = line.len() as u32;
    let pixels = line.repeat(opts.height_px as usize);

    BarcodeImage {
        width,
        height: opts.height_px,
        pixels,
    }
}
