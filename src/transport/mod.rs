//! # Printer Transport Layer
//!
//! Byte pipes to printers.
//!
//! ## Available Transports
//!
//! - [`bluetooth`]: Bluetooth RFCOMM (or any TTY) in raw mode, Linux

pub mod bluetooth;

pub use bluetooth::{BluetoothTransport, find_rfcomm_for_mac, is_valid_mac, setup_rfcomm};
