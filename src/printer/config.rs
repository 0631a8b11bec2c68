//! # Printer Capabilities
//!
//! Hardware facts the layout engine and drivers need about a printer.
//!
//! ## Built-in Models
//!
//! | Model | Names | Width (dots) | Resolution | Chunk rows |
//! |-------|-------|--------------|------------|------------|
//! | Star TSP650II | `tsp650ii` | 576 | 203 DPI | 256 |
//! | 58mm receipt | `58mm` | 384 | 203 DPI | 256 |
//!
//! ## Usage
//!
//! ```
//! use printpost::printer::PrinterCapabilities;
//!
//! let caps = PrinterCapabilities::by_name("TSP650II").unwrap();
//! assert_eq!(caps.width_dots, 576);
//! assert_eq!(caps.width_bytes(), 72);
//! ```

/// # Printer Capabilities
///
/// Read-only description of a printer, resolved once at startup.
///
/// ## Calculations
///
/// ```text
/// dots_per_mm = dpi / 25.4
/// width_mm = width_dots / dots_per_mm
///
/// For TSP650II:
///   dots_per_mm = 203 / 25.4 ≈ 8
///   width_mm = 576 / 8 = 72mm
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterCapabilities {
    /// Printer model name
    pub name: &'static str,

    /// Maximum print width in dots (pixels)
    pub width_dots: u16,

    /// Resolution in dots per inch
    pub dpi: u16,

    /// Tallest image the printer accepts in one job, if limited
    pub max_height: Option<u32>,

    /// Maximum rows per raster chunk (for Bluetooth buffer limits)
    pub max_chunk_rows: u16,
}

impl PrinterCapabilities {
    /// # Star TSP650II
    ///
    /// 80mm paper, 72mm (576 dots) printable at 203 DPI.
    ///
    /// ```text
    /// ├── 4mm ──┼────── 72mm printable ──────┼── 4mm ──┤
    /// │ margin  │         576 dots           │ margin  │
    /// ```
    pub const TSP650II: Self = Self {
        name: "Star TSP650II",
        width_dots: 576,
        dpi: 203,
        max_height: None,
        max_chunk_rows: 256,
    };

    /// # Generic 58mm Receipt Printer
    ///
    /// 48mm (384 dots) printable at 203 DPI.
    pub const PAPER_58MM: Self = Self {
        name: "58mm receipt",
        width_dots: 384,
        dpi: 203,
        max_height: None,
        max_chunk_rows: 256,
    };

    /// Built-in models with the names they can be selected by.
    pub const BUILT_IN: [(&'static str, Self); 2] = [("tsp650ii", Self::TSP650II), ("58mm", Self::PAPER_58MM)];

    /// Look up a built-in model by short name or display name, ignoring case.
    pub fn by_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::BUILT_IN
            .iter()
            .find(|(short, caps)| short.eq_ignore_ascii_case(name) || caps.name.eq_ignore_ascii_case(name))
            .map(|(_, caps)| *caps)
    }

    /// Short names accepted by [`by_name`](Self::by_name).
    pub fn model_names() -> Vec<&'static str> {
        Self::BUILT_IN.iter().map(|(short, _)| *short).collect()
    }

    /// Calculate dots per millimeter
    #[inline]
    pub fn dots_per_mm(&self) -> f32 {
        self.dpi as f32 / 25.4
    }

    /// Calculate print width in millimeters
    #[inline]
    pub fn width_mm(&self) -> f32 {
        self.width_dots as f32 / self.dots_per_mm()
    }
}

impl Default for PrinterCapabilities {
    fn default() -> Self {
        Self::TSP650II
    }
}
