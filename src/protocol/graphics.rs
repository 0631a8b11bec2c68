//! # StarPRNT Raster Graphics
//!
//! ## Bit Packing
//!
//! Graphics data is packed as bytes where each bit represents one dot:
//! - Bit 7 (MSB) = leftmost dot
//! - Bit 0 (LSB) = rightmost dot
//! - 1 = black (print), 0 = white (no print)
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0x0F = 00001111 = ░░░░████
//! ```

use super::commands::{ESC, GS, u16_le};

/// # Print Raster Graphics Data (ESC GS S m xL xH yL yH n d1...dk)
///
/// | Format  | Bytes |
/// |---------|-------|
/// | Hex     | 1B 1D 53 m xL xH yL yH n d1...dk |
///
/// - `m`: Mode (1 = monochrome)
/// - `xL, xH`: Width in bytes, little-endian
/// - `yL, yH`: Height in dots, little-endian
/// - `n`: Color (0 = black)
/// - `d1...dk`: Row-major image data, k = width_bytes × height
///
/// ```
/// use printpost::protocol::graphics;
///
/// let data = vec![0xAA; 72 * 100];
/// let cmd = graphics::raster(576, 100, &data);
/// assert_eq!(&cmd[0..9], &[0x1B, 0x1D, 0x53, 1, 72, 0, 100, 0, 0]);
/// ```
pub fn raster(width_dots: u16, height: u16, data: &[u8]) -> Vec<u8> {
    let width_bytes = width_dots.div_ceil(8);

    debug_assert!(
        data.len() == width_bytes as usize * height as usize,
        "Raster data length mismatch. Expected {} ({} bytes × {} rows), got {}",
        width_bytes as usize * height as usize,
        width_bytes,
        height,
        data.len()
    );

    let [xl, xh] = u16_le(width_bytes);
    let [yl, yh] = u16_le(height);

    let mut cmd = Vec::with_capacity(9 + data.len());
    cmd.extend_from_slice(&[ESC, GS, b'S', 1, xl, xh, yl, yh, 0]);
    cmd.extend_from_slice(data);
    cmd
}

/// Split a full image into consecutive raster commands of at most
/// `chunk_rows` rows each.
///
/// Bluetooth printers drop data when a single raster command outgrows their
/// receive buffer.
///
/// ```text
/// // 600-row image, 256-row chunks:
/// // raster(576, 256, rows 0..256)
/// // raster(576, 256, rows 256..512)
/// // raster(576,  88, rows 512..600)
/// ```
pub fn raster_chunked(width_dots: u16, height: usize, data: &[u8], chunk_rows: u16) -> Vec<u8> {
    let width_bytes = width_dots.div_ceil(8) as usize;
    let chunk_rows = chunk_rows.max(1) as usize;
    let mut cmd = Vec::with_capacity(data.len() + 9 * height.div_ceil(chunk_rows));

    for start in (0..height).step_by(chunk_rows) {
        let rows = chunk_rows.min(height - start);
        let chunk = &data[start * width_bytes..(start + rows) * width_bytes];
        cmd.extend(raster(width_dots, rows as u16, chunk));
    }
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_large_height() {
        let height: u16 = 500;
        let data = vec![0xFF; 72 * height as usize];
        let cmd = raster(576, height, &data);

        // 500 = 0x01F4 -> [0xF4, 0x01] in little-endian
        assert_eq!(cmd[6], 0xF4);
        assert_eq!(cmd[7], 0x01);
        assert_eq!(cmd.len(), 9 + 72 * 500);
    }

    #[test]
    fn test_raster_width_rounding() {
        let data = vec![0xFF; 73 * 10];
        let cmd = raster(577, 10, &data);
        assert_eq!(cmd[4], 73);
        assert_eq!(cmd[5], 0);
    }

    #[test]
    fn test_raster_preserves_data() {
        let data: Vec<u8> = (0..72 * 50).map(|i| (i % 256) as u8).collect();
        let cmd = raster(576, 50, &data);
        assert_eq!(&cmd[9..], &data[..]);
    }

    #[test]
    fn test_chunked_splits_rows() {
        let data: Vec<u8> = (0..48 * 600).map(|i| (i % 251) as u8).collect();
        let cmd = raster_chunked(384, 600, &data, 256);

        assert_eq!(cmd.len(), 3 * 9 + data.len());
        // Second chunk header follows the first chunk's data
        let second = 9 + 48 * 256;
        assert_eq!(&cmd[second..second + 3], &[0x1B, 0x1D, 0x53]);
        assert_eq!(cmd[second + 6], 0); // 256 rows -> yL 0, yH 1
        assert_eq!(cmd[second + 7], 1);
        let third = second + 9 + 48 * 256;
        assert_eq!(cmd[third + 6], 88);
        assert_eq!(&cmd[third + 9..], &data[48 * 512..]);
    }

    #[test]
    fn test_chunked_single_chunk() {
        let data = vec![0x0F; 72 * 10];
        assert_eq!(raster_chunked(576, 10, &data, 256), raster(576, 10, &data));
    }
}
