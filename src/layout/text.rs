//! Text wrapping and rasterization.
//!
//! Wrapping works in character columns (the font is monospace):
//! - `\n` forces a break, blank lines are kept
//! - leading tabs become [`TAB_WIDTH`] spaces of indentation, repeated on
//!   wrapped continuation lines
//! - lines that fit are kept verbatim (inner spacing survives), longer lines
//!   break at spaces, words longer than a line are split

use image::{GrayImage, Luma};

use super::Region;
use super::font::{FontSize, GlyphCache};

/// Spaces per tab.
pub const TAB_WIDTH: usize = 4;

const BLACK: Luma<u8> = Luma([0]);

/// Split a hard line into (indent columns, body with tabs expanded).
fn split_indent(line: &str) -> (usize, String) {
    let mut indent = 0;
    let mut body_start = line.len();
    for (i, c) in line.char_indices() {
        match c {
            '\t' => indent += TAB_WIDTH,
            ' ' => indent += 1,
            _ => {
                body_start = i;
                break;
            }
        }
    }
    let body = line[body_start..].replace('\t', &" ".repeat(TAB_WIDTH));
    (indent, body)
}

fn hard_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Widest hard line in columns, indentation included.
pub fn widest_line(text: &str) -> usize {
    hard_lines(text)
        .map(|line| {
            let (indent, body) = split_indent(line);
            if body.is_empty() { 0 } else { indent + body.chars().count() }
        })
        .max()
        .unwrap_or(0)
}

/// Longest single word in columns, including its line's indentation.
pub fn longest_word(text: &str) -> usize {
    hard_lines(text)
        .flat_map(|line| {
            let (indent, body) = split_indent(line);
            body.split(' ')
                .map(|word| indent + word.chars().count())
                .collect::<Vec<_>>()
        })
        .max()
        .unwrap_or(0)
}

/// Wrap `text` to `columns` characters per line.
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();

    for raw in hard_lines(text) {
        let (indent, body) = split_indent(raw);
        if body.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        // Always leave at least one column for content
        let indent = indent.min(columns - 1);
        let avail = columns - indent;
        let pad = " ".repeat(indent);

        if body.chars().count() <= avail {
            lines.push(format!("{}{}", pad, body));
            continue;
        }

        let mut current = String::new();
        let mut current_len = 0;

        for word in body.split(' ').filter(|w| !w.is_empty()) {
            let mut chars: Vec<char> = word.chars().collect();

            while chars.len() > avail {
                if current_len > 0 {
                    lines.push(format!("{}{}", pad, current));
                    current.clear();
                    current_len = 0;
                }
                let head: String = chars.drain(..avail).collect();
                lines.push(format!("{}{}", pad, head));
            }
            if chars.is_empty() {
                continue;
            }

            let needed = if current_len == 0 {
                chars.len()
            } else {
                current_len + 1 + chars.len()
            };

            if needed > avail {
                lines.push(format!("{}{}", pad, current));
                current = chars.into_iter().collect();
                current_len = current.chars().count();
            } else {
                if current_len > 0 {
                    current.push(' ');
                }
                current.extend(chars);
                current_len = needed;
            }
        }

        if current_len > 0 {
            lines.push(format!("{}{}", pad, current));
        }
    }

    lines
}

/// Draw wrapped lines into `region` of the canvas, bold (double-struck).
///
/// Pixels falling outside the region are clipped.
pub fn draw_lines(canvas: &mut GrayImage, lines: &[String], font: FontSize, region: Region, cache: &mut GlyphCache) {
    let line_height = font.line_height();

    for (row, line) in lines.iter().enumerate() {
        let y = region.y as usize + row * line_height;
        for (col, ch) in line.chars().enumerate() {
            if ch == ' ' {
                continue;
            }
            let x = region.x as usize + col * font.char_width();
            draw_char(canvas, ch, font, x, y, region, cache);
        }
    }
}

fn draw_char(
    canvas: &mut GrayImage,
    ch: char,
    font: FontSize,
    base_x: usize,
    base_y: usize,
    region: Region,
    cache: &mut GlyphCache,
) {
    let glyph_width = font.base.char_width();
    let glyph_height = font.base.char_height();
    let scale = font.scale;
    let glyph = cache.get(font.base, ch);

    for gy in 0..glyph_height {
        for gx in 0..glyph_width {
            if glyph[gy * glyph_width + gx] == 0 {
                continue;
            }
            for sy in 0..scale {
                for sx in 0..scale {
                    let px = base_x + gx * scale + sx;
                    let py = base_y + gy * scale + sy;
                    // Second strike one dot to the right for bold
                    for dx in 0..=1 {
                        if region.contains(px + dx, py) {
                            canvas.put_pixel((px + dx) as u32, py as u32, BLACK);
                        }
                    }
                }
            }
        }
    }
}
