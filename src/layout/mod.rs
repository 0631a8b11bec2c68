//! # Layout Engine
//!
//! Composes a [`PrintJob`] into one monochrome bitmap exactly as wide as the
//! paper.
//!
//! ## QR + Text
//!
//! ```text
//! ├──── paper_width / 2 ────┼──── paper_width - qr_width ────┤
//! ┌─────────────────────────┬────────────────────────────────┐
//! │      ┌───────────┐      │ gutter                         │
//! │      │ ▓▓ QR  ▓▓ │      │   Text, word wrapped,          │ ← both
//! │      │ ▓▓▓▓▓▓▓▓▓ │      │   vertically centred           │   centred
//! │      └───────────┘      │                                │
//! └─────────────────────────┴────────────────────────────────┘
//! ```
//!
//! ## Text Only
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ top margin                                               │
//! │ Text across the full width, flowing downward             │
//! │ ...                                                      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Text is never truncated. A job taller than the printer's maximum image
//! height is still composed.

pub mod font;
pub mod qr;
pub mod text;

use std::io::Cursor;

use image::{GrayImage, ImageFormat, Luma};
use tracing::warn;

use crate::error::JobError;
use crate::job::PrintJob;
use crate::printer::PrinterCapabilities;

use font::{FontSize, GlyphCache};
use qr::QrSymbol;

/// Blank rows above and below the content.
pub const VERTICAL_MARGIN: usize = 16;

/// Blank columns kept around the QR inside its half.
pub const QR_MARGIN: usize = 8;

/// Blank columns between the QR half and the first glyph.
pub const TEXT_GUTTER: usize = 8;

/// Full-width text should offer at least this many columns.
pub const MIN_TEXT_COLUMNS: usize = 24;

const WHITE: Luma<u8> = Luma([255]);

/// Axis-aligned rectangle in canvas dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x: x as u32,
            y: y as u32,
            width: width as u32,
            height: height as u32,
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        let (x, y) = (x as u32, y as u32);
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn overlaps(&self, other: &Region) -> bool {
        self.x < other.right() && other.x < self.right() && self.y < other.bottom() && other.y < self.bottom()
    }
}

/// A composed monochrome bitmap (pixels are 0 or 255) ready to print.
#[derive(Debug, Clone)]
pub struct PrintableImage {
    bitmap: GrayImage,
    qr_region: Option<Region>,
    text_region: Region,
    font: FontSize,
    line_count: usize,
}

impl PrintableImage {
    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    pub fn bitmap(&self) -> &GrayImage {
        &self.bitmap
    }

    /// Columns reserved for the QR symbol, if the job has one.
    pub fn qr_region(&self) -> Option<Region> {
        self.qr_region
    }

    /// Columns reserved for text.
    pub fn text_region(&self) -> Region {
        self.text_region
    }

    pub fn font(&self) -> FontSize {
        self.font
    }

    /// Number of wrapped text lines, blank lines included.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn is_black(&self, x: u32, y: u32) -> bool {
        self.bitmap.get_pixel(x, y).0[0] < 128
    }

    /// Pack into 1-bit raster rows: MSB = leftmost dot, 1 = black, each row
    /// padded to a whole byte.
    pub fn to_raster(&self) -> Vec<u8> {
        let width = self.width() as usize;
        let width_bytes = width.div_ceil(8);
        let mut data = vec![0u8; width_bytes * self.height() as usize];

        for (x, y, pixel) in self.bitmap.enumerate_pixels() {
            if pixel.0[0] < 128 {
                let idx = y as usize * width_bytes + x as usize / 8;
                data[idx] |= 0x80 >> (x % 8);
            }
        }
        data
    }

    /// Encode as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut png_bytes = Vec::new();
        self.bitmap
            .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)?;
        Ok(png_bytes)
    }
}

/// Compose a job for a printer.
///
/// ## Errors
///
/// [`JobError::PayloadTooLarge`] if the QR payload cannot be encoded in the
/// left half of the paper.
pub fn compose(job: &PrintJob, capabilities: &PrinterCapabilities) -> Result<PrintableImage, JobError> {
    let width = capabilities.width_dots as usize;

    let image = match job.qr_payload() {
        Some(qr) => compose_qr_and_text(job.text(), qr, width)?,
        None => compose_text_only(job.text(), width),
    };

    if let Some(max_height) = capabilities.max_height
        && image.height() > max_height
    {
        warn!(
            height = image.height(),
            max_height,
            model = capabilities.name,
            "Composed image exceeds printer maximum height"
        );
    }

    Ok(image)
}

fn compose_qr_and_text(text: &str, qr: &str, width: usize) -> Result<PrintableImage, JobError> {
    let qr_width = width / 2;
    let symbol = QrSymbol::encode(qr, qr_width.saturating_sub(2 * QR_MARGIN))?;
    let side = symbol.side();

    let text_width = width - qr_width;
    let usable = text_width.saturating_sub(TEXT_GUTTER);
    let (font, lines) = fit_beside_qr(text, usable, side);
    let text_height = lines.len() * font.line_height();

    let content = side.max(text_height);
    let height = content + 2 * VERTICAL_MARGIN;
    let mut bitmap = GrayImage::from_pixel(width as u32, height as u32, WHITE);

    symbol.draw(
        &mut bitmap,
        (qr_width - side) / 2,
        VERTICAL_MARGIN + (content - side) / 2,
    );

    let block = Region::new(
        qr_width + TEXT_GUTTER,
        VERTICAL_MARGIN + (content - text_height) / 2,
        usable,
        text_height,
    );
    text::draw_lines(&mut bitmap, &lines, font, block, &mut GlyphCache::default());

    Ok(PrintableImage {
        bitmap,
        qr_region: Some(Region::new(0, 0, qr_width, height)),
        text_region: Region::new(qr_width, 0, text_width, height),
        font,
        line_count: lines.len(),
    })
}

fn compose_text_only(text: &str, width: usize) -> PrintableImage {
    let (font, lines) = fit_full_width(text, width);
    let text_height = lines.len() * font.line_height();
    let height = text_height + 2 * VERTICAL_MARGIN;
    let mut bitmap = GrayImage::from_pixel(width as u32, height as u32, WHITE);

    let block = Region::new(0, VERTICAL_MARGIN, width, text_height);
    text::draw_lines(&mut bitmap, &lines, font, block, &mut GlyphCache::default());

    PrintableImage {
        bitmap,
        qr_region: None,
        text_region: Region::new(0, 0, width, height),
        font,
        line_count: lines.len(),
    }
}

/// Largest font whose wrapped block is no taller than the QR and breaks no
/// words. Falls back to the smallest font.
fn fit_beside_qr(text: &str, width: usize, qr_side: usize) -> (FontSize, Vec<String>) {
    let longest = text::longest_word(text);

    for font in FontSize::CANDIDATES {
        let columns = font.columns(width);
        if columns == 0 || longest > columns {
            continue;
        }
        let lines = text::wrap_text(text, columns);
        if lines.len() * font.line_height() <= qr_side {
            return (font, lines);
        }
    }

    let font = FontSize::smallest();
    (font, text::wrap_text(text, font.columns(width)))
}

/// Largest font, no smaller than body size, that gives enough columns and
/// fits every line unwrapped. Falls back to body size with wrapping.
fn fit_full_width(text: &str, width: usize) -> (FontSize, Vec<String>) {
    let widest = text::widest_line(text);

    let fitted = FontSize::CANDIDATES
        .into_iter()
        .take_while(|font| font.char_height() >= FontSize::BODY.char_height())
        .find(|font| {
            let columns = font.columns(width);
            columns >= MIN_TEXT_COLUMNS && widest <= columns
        });

    let font = fitted.unwrap_or(FontSize::BODY);
    (font, text::wrap_text(text, font.columns(width)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobMode;
    use font::BaseFont;

    fn caps(width: u16) -> PrinterCapabilities {
        PrinterCapabilities {
            width_dots: width,
            ..PrinterCapabilities::TSP650II
        }
    }

    fn black_pixels(image: &PrintableImage) -> impl Iterator<Item = (u32, u32)> + '_ {
        image
            .bitmap()
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] == 0)
            .map(|(x, y, _)| (x, y))
    }

    #[test]
    fn test_pixels_are_monochrome() {
        let job = PrintJob::qr_and_text("https://example.com", Some("Scan me".into())).unwrap();
        let image = compose(&job, &caps(576)).unwrap();
        assert!(image.bitmap().pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn test_qr_and_text_regions() {
        for width in [384u16, 576, 577] {
            let job = PrintJob::qr_and_text("https://example.com/menu", Some("Table 4".into())).unwrap();
            let image = compose(&job, &caps(width)).unwrap();
            let qr = image.qr_region().unwrap();
            let text = image.text_region();

            assert_eq!(image.width(), width as u32);
            assert!(qr.width <= width as u32 / 2);
            assert_eq!(text.width, width as u32 - qr.width);
            assert_eq!(text.x, qr.right());
            assert!(!qr.overlaps(&text));
        }
    }

    #[test]
    fn test_qr_stays_left_and_text_stays_right() {
        let job = PrintJob::qr_and_text("https://example.com", Some("Hello World".into())).unwrap();
        let image = compose(&job, &caps(576)).unwrap();
        let qr = image.qr_region().unwrap();

        let mut left = 0;
        let mut right = 0;
        for (x, _) in black_pixels(&image) {
            if x < qr.right() {
                left += 1;
            } else {
                // Gutter stays clear
                assert!(x >= qr.right() + TEXT_GUTTER as u32);
                right += 1;
            }
        }
        assert!(left > 0 && right > 0);
    }

    #[test]
    fn test_text_defaults_to_qr_payload() {
        let job = PrintJob::qr_and_text("ABC", None).unwrap();
        assert_eq!(job.mode(), JobMode::QrAndText);
        let image = compose(&job, &caps(576)).unwrap();
        assert_eq!(image.line_count(), 1);
    }

    #[test]
    fn test_short_text_is_centred_against_qr() {
        let job = PrintJob::qr_and_text("https://example.com", Some("Hi".into())).unwrap();
        let image = compose(&job, &caps(576)).unwrap();
        let text_x = image.text_region().x;

        let rows: Vec<u32> = black_pixels(&image).filter(|(x, _)| *x >= text_x).map(|(_, y)| y).collect();
        let top = *rows.iter().min().unwrap();
        let bottom = *rows.iter().max().unwrap();
        let centre = (top + bottom) / 2;
        let mid = image.height() / 2;
        assert!(centre.abs_diff(mid) <= image.font().line_height() as u32);
    }

    #[test]
    fn test_height_follows_taller_block() {
        let long_text = (0..40).map(|i| format!("Line {}", i)).collect::<Vec<_>>().join("\n");
        let job = PrintJob::qr_and_text("x", Some(long_text)).unwrap();
        let image = compose(&job, &caps(576)).unwrap();

        assert_eq!(image.line_count(), 40);
        assert_eq!(image.font(), FontSize::smallest());
        let text_height = 40 * FontSize::smallest().line_height();
        assert_eq!(image.height() as usize, text_height + 2 * VERTICAL_MARGIN);
    }

    #[test]
    fn test_payload_too_large() {
        let job = PrintJob::qr_and_text("x".repeat(5000), Some("big".into())).unwrap();
        let err = compose(&job, &caps(576)).unwrap_err();
        assert!(matches!(err, JobError::PayloadTooLarge(_)));
    }

    #[test]
    fn test_text_only_width_is_constant() {
        for text in ["Hi", "A much longer line of text that will need wrapping across the receipt"] {
            let job = PrintJob::text_only(text).unwrap();
            let image = compose(&job, &caps(576)).unwrap();
            assert_eq!(image.width(), 576);
            assert!(image.qr_region().is_none());
            assert_eq!(image.text_region().width, 576);
        }
    }

    #[test]
    fn test_text_only_height() {
        let job = PrintJob::text_only("one\ntwo\nthree").unwrap();
        let image = compose(&job, &caps(576)).unwrap();
        let expected = 3 * image.font().line_height() + 2 * VERTICAL_MARGIN;
        assert_eq!(image.height() as usize, expected);
    }

    #[test]
    fn test_text_only_recomputes_font_for_full_width() {
        let text = "Smashburger";
        let job = PrintJob::text_only(text).unwrap();
        let full = compose(&job, &caps(576)).unwrap();
        assert_eq!(full.font(), FontSize::new(BaseFont::Large, 2));

        let long = "x".repeat(60);
        let job = PrintJob::text_only(long).unwrap();
        let image = compose(&job, &caps(576)).unwrap();
        assert_eq!(image.font(), FontSize::BODY);
        assert_eq!(image.line_count(), 2);
    }

    #[test]
    fn test_end_to_end_order_lines() {
        let job = PrintJob::text_only("Order #1\nSmashburger\n\nToppings:\n\tCheese\n\tBacon").unwrap();
        let image = compose(&job, &caps(576)).unwrap();
        assert_eq!(image.width(), 576);
        assert_eq!(image.line_count(), 6);
    }

    #[test]
    fn test_over_max_height_still_composed() {
        let capabilities = PrinterCapabilities {
            max_height: Some(50),
            ..caps(384)
        };
        let job = PrintJob::text_only("a\nb\nc\nd\ne").unwrap();
        let image = compose(&job, &capabilities).unwrap();
        assert!(image.height() > 50);
    }

    #[test]
    fn test_to_raster_packing() {
        let job = PrintJob::text_only("X").unwrap();
        let image = compose(&job, &caps(20)).unwrap();
        let raster = image.to_raster();
        let width_bytes = 3;
        assert_eq!(raster.len(), width_bytes * image.height() as usize);

        for y in 0..image.height() {
            for x in 0..image.width() {
                let byte = raster[y as usize * width_bytes + x as usize / 8];
                let bit = (byte >> (7 - x % 8)) & 1 == 1;
                assert_eq!(bit, image.is_black(x, y));
            }
        }
    }

    #[test]
    fn test_png_encoding() {
        let job = PrintJob::text_only("png").unwrap();
        let png = compose(&job, &caps(384)).unwrap().to_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_region_overlap() {
        let a = Region::new(0, 0, 10, 10);
        assert!(!a.overlaps(&Region::new(10, 0, 5, 10)));
        assert!(a.overlaps(&Region::new(9, 9, 5, 5)));
        assert!(a.contains(9, 9));
        assert!(!a.contains(10, 0));
    }
}
