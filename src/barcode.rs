use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use tracing::{debug, warn};

use crate::error::{CardError, Result};

// An EAN-13 symbol is 95 modules wide: two 3-module side guards, a
// 5-module center guard, and 12 encoded digits of 7 modules each. The
// 13th payload digit selects the parity pattern of the left half and is
// not drawn as bars itself.
const SYMBOL_DIGITS: usize = 13;
const SYMBOL_MODULES: usize = 95;

const SIDE_GUARD: &str = "101";
const CENTER_GUARD: &str = "01010";

// Left-half digit patterns, odd parity.
const L_CODES: [&str; 10] = [
    "0001101", "0011001", "0010011", "0111101", "0100011", "0110001", "0101111", "0111011",
    "0110111", "0001011",
];

// Left-half digit patterns, even parity.
const G_CODES: [&str; 10] = [
    "0100111", "0110011", "0011011", "0100001", "0011101", "0111001", "0000101", "0010001",
    "0001001", "0010111",
];

// Right-half digit patterns.
const R_CODES: [&str; 10] = [
    "1110010", "1100110", "1101100", "1000010", "1011100", "1001110", "1010000", "1000100",
    "1001000", "1110100",
];

// First digit -> parity of the six left-half digits.
const PARITY_PATTERNS: [&str; 10] = [
    "LLLLLL", "LLGLGG", "LLGGLG", "LLGGGL", "LGLLGG", "LGGLLG", "LGGGLL", "LGLGLG", "LGLGGL",
    "LGGLGL",
];

/// Renders a barcode payload into a raster image file.
///
/// This is the seam towards the barcode library: any implementation that
/// produces an image file at the requested path can stand in for the
/// built-in one.
pub trait BarcodeEncoder {
    fn render_to_file(&self, payload: &str, path: &Path) -> Result<()>;
}

/// EAN-13 renderer producing a monochrome PNG without human-readable text
/// (the assembler draws the caption itself).
#[derive(Debug, Clone)]
pub struct Ean13Encoder {
    pub module_width_px: u32,
    pub bar_height_px: u32,
    pub quiet_zone_modules: u32,
}

impl Default for Ean13Encoder {
    fn default() -> Self {
        Ean13Encoder {
            module_width_px: 4,
            bar_height_px: 120,
            quiet_zone_modules: 9,
        }
    }
}

impl Ean13Encoder {
    /// Expands a 13-digit payload into its 95-module bar pattern.
    /// `true` marks a dark module.
    pub fn modules(payload: &str) -> Result<Vec<bool>> {
        let digits = payload_digits(payload)?;

        let mut modules = Vec::with_capacity(SYMBOL_MODULES);
        push_pattern(&mut modules, SIDE_GUARD);

        let parity = PARITY_PATTERNS[digits[0]].as_bytes();
        for (i, &digit) in digits[1..7].iter().enumerate() {
            let code = if parity[i] == b'L' {
                L_CODES[digit]
            } else {
                G_CODES[digit]
            };
            push_pattern(&mut modules, code);
        }

        push_pattern(&mut modules, CENTER_GUARD);
        for &digit in &digits[7..SYMBOL_DIGITS] {
            push_pattern(&mut modules, R_CODES[digit]);
        }
        push_pattern(&mut modules, SIDE_GUARD);

        Ok(modules)
    }
}

impl BarcodeEncoder for Ean13Encoder {
    fn render_to_file(&self, payload: &str, path: &Path) -> Result<()> {
        let modules = Self::modules(payload)?;

        let width = (modules.len() as u32 + 2 * self.quiet_zone_modules) * self.module_width_px;
        let height = self.bar_height_px;
        let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));

        for (index, &dark) in modules.iter().enumerate() {
            if !dark {
                continue;
            }
            let x0 = (self.quiet_zone_modules + index as u32) * self.module_width_px;
            for x in x0..x0 + self.module_width_px {
                for y in 0..height {
                    img.put_pixel(x, y, Rgb([0, 0, 0]));
                }
            }
        }

        img.save(path)
            .map_err(|err| CardError::BarcodeEncode(format!("failed to write barcode image: {err}")))?;
        debug!(payload, path = %path.display(), "rendered barcode image");
        Ok(())
    }
}

fn payload_digits(payload: &str) -> Result<Vec<usize>> {
    let digits: Vec<usize> = payload
        .chars()
        .filter_map(|ch| ch.to_digit(10).map(|d| d as usize))
        .collect();
    if digits.len() != payload.chars().count() {
        return Err(CardError::BarcodeEncode(format!(
            "payload {payload:?} contains non-numeric characters"
        )));
    }
    if digits.len() != SYMBOL_DIGITS {
        return Err(CardError::BarcodeEncode(format!(
            "payload {payload:?} has {} digits, expected {SYMBOL_DIGITS}",
            digits.len()
        )));
    }
    Ok(digits)
}

fn push_pattern(modules: &mut Vec<bool>, pattern: &str) {
    for byte in pattern.bytes() {
        modules.push(byte == b'1');
    }
}

/// Transient barcode image file, deleted when the guard is dropped.
///
/// Deletion runs on both the success and the failure path of a record, so
/// an aborted run leaves no orphaned images behind. A removal failure is
/// only logged; it never aborts the run.
pub struct TempBarcodeImage {
    path: PathBuf,
}

impl TempBarcodeImage {
    pub fn render(encoder: &dyn BarcodeEncoder, payload: &str, path: PathBuf) -> Result<Self> {
        encoder.render_to_file(payload, &path)?;
        Ok(TempBarcodeImage { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempBarcodeImage {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), %err, "failed to remove temporary barcode image");
        }
    }
}
