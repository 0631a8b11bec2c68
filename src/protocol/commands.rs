//! # StarPRNT Protocol Commands
//!
//! Job framing commands: initialisation, paper feed, and cutting.
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding:
//! - `u16` value 0x1234 is sent as bytes `[0x34, 0x12]`

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix, used after ESC for
/// graphics commands
pub const GS: u8 = 0x1D;

/// # Initialize Printer (ESC @)
///
/// Resets the printer to its power-on default state. Sent at the start of
/// every job.
///
/// | Format  | Bytes |
/// |---------|-------|
/// | Hex     | 1B 40 |
///
/// ```
/// use printpost::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Feed to Cut Position, Then Full Cut (ESC d 2)
///
/// Feeds paper so the last printed row is past the cutter, then cuts.
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | Hex     | 1B 64 02 |
#[inline]
pub fn cut_full_feed() -> Vec<u8> {
    vec![ESC, b'd', 2]
}

/// # Micro Feed (ESC J n)
///
/// Feeds paper forward by n/4 millimeters.
///
/// - n=4 feeds 1mm
/// - n=255 feeds ~63.75mm (maximum)
#[inline]
pub fn feed_units(n: u8) -> Vec<u8> {
    vec![ESC, b'J', n]
}

/// Feed paper by millimeters (convenience wrapper for `feed_units`)
///
/// ```
/// use printpost::protocol::commands;
///
/// assert_eq!(commands::feed_mm(5.0), vec![0x1B, 0x4A, 20]); // 5mm * 4 = 20 units
/// ```
#[inline]
pub fn feed_mm(mm: f32) -> Vec<u8> {
    let units = (mm * 4.0).round().clamp(0.0, 255.0) as u8;
    feed_units(units)
}

/// Encode a u16 value as little-endian bytes [low, high]
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert_eq!(init(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_cut_full_feed() {
        assert_eq!(cut_full_feed(), vec![0x1B, 0x64, 0x02]);
    }

    #[test]
    fn test_feed_mm() {
        assert_eq!(feed_mm(1.0), vec![0x1B, 0x4A, 4]);
        assert_eq!(feed_mm(3.0), vec![0x1B, 0x4A, 12]);
    }

    #[test]
    fn test_feed_mm_clamps() {
        assert_eq!(feed_mm(100.0), vec![0x1B, 0x4A, 255]);
        assert_eq!(feed_mm(-5.0), vec![0x1B, 0x4A, 0]);
    }

    #[test]
    fn test_u16_le() {
        assert_eq!(u16_le(0x1234), [0x34, 0x12]);
        assert_eq!(u16_le(576), [0x40, 0x02]);
    }
}
