//! Bitmap font metrics and glyph generation.
//!
//! Uses the Spleen bitmap font family. Larger sizes are integer multiples of
//! the 12×24 and 8×16 faces, scaled nearest-neighbour so strokes stay sharp
//! on a thermal head.

use std::collections::HashMap;

use spleen_font::{FONT_6X12, FONT_8X16, FONT_12X24, PSF2Font};

/// Extra dots between lines, per scale step.
const LINE_GAP: usize = 2;

/// Native Spleen faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseFont {
    /// 6×12
    Small,
    /// 8×16
    Medium,
    /// 12×24
    Large,
}

impl BaseFont {
    pub fn char_width(self) -> usize {
        match self {
            BaseFont::Small => 6,
            BaseFont::Medium => 8,
            BaseFont::Large => 12,
        }
    }

    pub fn char_height(self) -> usize {
        match self {
            BaseFont::Small => 12,
            BaseFont::Medium => 16,
            BaseFont::Large => 24,
        }
    }

    fn font_data(self) -> &'static [u8] {
        match self {
            BaseFont::Small => FONT_6X12,
            BaseFont::Medium => FONT_8X16,
            BaseFont::Large => FONT_12X24,
        }
    }
}

/// A base face plus an integer magnification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSize {
    pub base: BaseFont,
    pub scale: usize,
}

impl FontSize {
    /// Standard receipt size (Font A on most printers).
    pub const BODY: FontSize = FontSize::new(BaseFont::Large, 1);

    /// Sizes the layout engine may pick from, largest first.
    ///
    /// | Size | Cell |
    /// |------|------|
    /// | Large ×3 | 36×72 |
    /// | Large ×2 | 24×48 |
    /// | Medium ×2 | 16×32 |
    /// | Large ×1 | 12×24 |
    /// | Medium ×1 | 8×16 |
    /// | Small ×1 | 6×12 |
    pub const CANDIDATES: [FontSize; 6] = [
        FontSize::new(BaseFont::Large, 3),
        FontSize::new(BaseFont::Large, 2),
        FontSize::new(BaseFont::Medium, 2),
        FontSize::BODY,
        FontSize::new(BaseFont::Medium, 1),
        FontSize::new(BaseFont::Small, 1),
    ];

    pub const fn new(base: BaseFont, scale: usize) -> Self {
        Self { base, scale }
    }

    /// The smallest size the engine will ever use.
    pub fn smallest() -> FontSize {
        Self::CANDIDATES[Self::CANDIDATES.len() - 1]
    }

    pub fn char_width(&self) -> usize {
        self.base.char_width() * self.scale
    }

    pub fn char_height(&self) -> usize {
        self.base.char_height() * self.scale
    }

    pub fn line_height(&self) -> usize {
        self.char_height() + LINE_GAP * self.scale
    }

    /// Characters that fit in `width` dots.
    pub fn columns(&self, width: usize) -> usize {
        width / self.char_width()
    }
}

/// Generate a glyph bitmap for a character at the face's native size.
/// Returns a Vec<u8> where each byte is 0 (white) or 1 (black).
pub fn generate_glyph(base: BaseFont, ch: char) -> Vec<u8> {
    let width = base.char_width();
    let height = base.char_height();
    let mut glyph = vec![0u8; width * height];

    let mut spleen = match PSF2Font::new(base.font_data()) {
        Ok(font) => font,
        Err(_) => {
            draw_box(&mut glyph, width, height);
            return glyph;
        }
    };
    let utf8_bytes = ch.to_string();

    if let Some(spleen_glyph) = spleen.glyph_for_utf8(utf8_bytes.as_bytes()) {
        for (row_y, row) in spleen_glyph.enumerate() {
            for (col_x, on) in row.enumerate() {
                if row_y < height && col_x < width {
                    glyph[row_y * width + col_x] = if on { 1 } else { 0 };
                }
            }
        }
    } else {
        // Fallback: draw a box for unknown chars
        draw_box(&mut glyph, width, height);
    }

    glyph
}

/// Draw a box outline in the glyph buffer.
fn draw_box(glyph: &mut [u8], width: usize, height: usize) {
    for x in 0..width {
        glyph[x] = 1;
        glyph[(height - 1) * width + x] = 1;
    }
    for y in 0..height {
        glyph[y * width] = 1;
        glyph[y * width + width - 1] = 1;
    }
}

/// Per-composition glyph cache.
#[derive(Debug, Default)]
pub struct GlyphCache {
    glyphs: HashMap<(BaseFont, char), Vec<u8>>,
}

impl GlyphCache {
    pub fn get(&mut self, base: BaseFont, ch: char) -> &[u8] {
        self.glyphs
            .entry((base, ch))
            .or_insert_with(|| generate_glyph(base, ch))
    }
}
