//! # StarPRNT Raster Protocol
//!
//! The minimal subset of the StarPRNT protocol needed to print one composed
//! bitmap on a Star Micronics receipt printer: initialise, send raster rows,
//! feed, cut.
//!
//! ## Module Structure
//!
//! - [`commands`]: Basic printer commands (init, cut, feed)
//! - [`graphics`]: Raster graphics commands
//!
//! ## Usage Example
//!
//! ```
//! use printpost::protocol::{commands, graphics};
//!
//! let rows = vec![0xAA; 72 * 24]; // 576 dots × 24 rows of stripes
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(graphics::raster_chunked(576, 24, &rows, 256));
//! data.extend(commands::cut_full_feed());
//! ```
//!
//! ## Protocol Reference
//!
//! This implementation is based on "StarPRNT Command Specifications Rev. 4.10"
//! by Star Micronics Co., Ltd.

pub mod commands;
pub mod graphics;
