//! QR symbol encoding and block scaling.
//!
//! The symbol is drawn with an integer number of dots per module so every
//! module prints as a crisp square. Error correction is traded away only
//! when the stronger level would make modules too small to scan.

use image::{GrayImage, Luma};
use qrcode::{Color, EcLevel, QrCode};

use crate::error::JobError;

/// Quiet zone around the symbol, in modules.
pub const QUIET_ZONE: usize = 1;

/// Smallest module size (dots) considered comfortably scannable.
pub const MIN_MODULE_DOTS: usize = 3;

/// Error correction levels, strongest first.
const EC_LEVELS: [EcLevel; 4] = [EcLevel::H, EcLevel::Q, EcLevel::M, EcLevel::L];

/// An encoded symbol with its chosen scale.
#[derive(Debug, Clone)]
pub struct QrSymbol {
    /// Modules per side, quiet zone excluded
    width: usize,
    dark: Vec<bool>,
    module_dots: usize,
    ec_level: EcLevel,
}

impl QrSymbol {
    /// Encode `payload` so the symbol (quiet zone included) fits in
    /// `max_side` dots.
    ///
    /// Tries H, Q, M, L and keeps the first level whose modules are at least
    /// [`MIN_MODULE_DOTS`] wide. If none reaches that, the level giving the
    /// biggest modules is used.
    ///
    /// ## Errors
    ///
    /// [`JobError::PayloadTooLarge`] if the payload exceeds QR capacity or
    /// cannot be drawn at one dot per module.
    pub fn encode(payload: &str, max_side: usize) -> Result<Self, JobError> {
        let mut best: Option<(QrCode, EcLevel, usize)> = None;

        for level in EC_LEVELS {
            let Ok(code) = QrCode::with_error_correction_level(payload.as_bytes(), level) else {
                continue;
            };
            let module_dots = max_side / (code.width() + 2 * QUIET_ZONE);

            if module_dots >= MIN_MODULE_DOTS {
                return Ok(Self::from_code(&code, level, module_dots));
            }
            if module_dots >= 1 && best.as_ref().is_none_or(|(_, _, dots)| module_dots > *dots) {
                best = Some((code, level, module_dots));
            }
        }

        best.map(|(code, level, dots)| Self::from_code(&code, level, dots))
            .ok_or_else(|| {
                JobError::PayloadTooLarge(format!(
                    "QR payload of {} bytes does not fit in {} dots",
                    payload.len(),
                    max_side
                ))
            })
    }

    fn from_code(code: &QrCode, ec_level: EcLevel, module_dots: usize) -> Self {
        Self {
            width: code.width(),
            dark: code.to_colors().into_iter().map(|c| c == Color::Dark).collect(),
            module_dots,
            ec_level,
        }
    }

    /// Side length in dots, quiet zone included.
    pub fn side(&self) -> usize {
        (self.width + 2 * QUIET_ZONE) * self.module_dots
    }

    pub fn module_dots(&self) -> usize {
        self.module_dots
    }

    pub fn ec_level(&self) -> EcLevel {
        self.ec_level
    }

    /// Block-scale the symbol onto the canvas with its top-left corner (quiet
    /// zone included) at `(x, y)`.
    pub fn draw(&self, canvas: &mut GrayImage, x: usize, y: usize) {
        let cell = self.module_dots;
        let origin_x = x + QUIET_ZONE * cell;
        let origin_y = y + QUIET_ZONE * cell;

        for qy in 0..self.width {
            for qx in 0..self.width {
                if !self.dark[qy * self.width + qx] {
                    continue;
                }
                for cy in 0..cell {
                    for cx in 0..cell {
                        let px = (origin_x + qx * cell + cx) as u32;
                        let py = (origin_y + qy * cell + cy) as u32;
                        if px < canvas.width() && py < canvas.height() {
                            canvas.put_pixel(px, py, Luma([0]));
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_high_error_correction() {
        let symbol = QrSymbol::encode("https://example.com", 272).unwrap();
        assert_eq!(symbol.ec_level(), EcLevel::H);
        assert!(symbol.module_dots() >= MIN_MODULE_DOTS);
        assert!(symbol.side() <= 272);
    }

    #[test]
    fn test_drops_error_correction_when_cramped() {
        let payload = "x".repeat(300);
        let symbol = QrSymbol::encode(&payload, 272).unwrap();
        assert_ne!(symbol.ec_level(), EcLevel::H);
        assert!(symbol.side() <= 272);
    }

    #[test]
    fn test_payload_too_large() {
        let payload = "x".repeat(4000);
        let err = QrSymbol::encode(&payload, 272).unwrap_err();
        assert!(matches!(err, JobError::PayloadTooLarge(_)));
    }

    #[test]
    fn test_no_room_is_too_large() {
        let err = QrSymbol::encode("hello", 10).unwrap_err();
        assert!(matches!(err, JobError::PayloadTooLarge(_)));
    }

    #[test]
    fn test_draw_stays_inside_side() {
        let symbol = QrSymbol::encode("abc", 200).unwrap();
        let side = symbol.side() as u32;
        let mut canvas = GrayImage::from_pixel(side + 20, side + 20, Luma([255]));
        symbol.draw(&mut canvas, 10, 10);

        for (x, y, pixel) in canvas.enumerate_pixels() {
            if pixel.0[0] == 0 {
                let quiet = (QUIET_ZONE * symbol.module_dots()) as u32;
                assert!(x >= 10 + quiet && x < 10 + side - quiet);
                assert!(y >= 10 + quiet && y < 10 + side - quiet);
            }
        }
        // Finder pattern corner is dark
        let corner = 10 + (QUIET_ZONE * symbol.module_dots()) as u32;
        assert_eq!(canvas.get_pixel(corner, corner).0[0], 0);
    }
}
