//! # Error Types
//!
//! This module defines error types used throughout the printpost library.
//!
//! | Error | Raised by | HTTP |
//! |-------|-----------|------|
//! | [`JobError::InvalidRequest`] | job normalizer | 400 |
//! | [`JobError::UnsupportedValue`] | text formatter | 400 |
//! | [`JobError::PayloadTooLarge`] | layout engine | 413 |
//! | [`PrintError`] | print dispatcher | 502 |

use thiserror::Error;

/// Errors raised while turning a request into a printable image.
///
/// None of these ever reach the printer: a job either composes fully or
/// nothing is dispatched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobError {
    /// Missing or malformed request input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Structured text contains a value that cannot be printed
    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),

    /// QR payload does not fit in a symbol at the printable size
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
}

/// Errors raised by printer drivers (connection, I/O).
#[derive(Debug, Error)]
pub enum TransportError {
    /// The printer device could not be opened
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Device configuration or binding failed
    #[error("Device setup failed: {0}")]
    Setup(String),

    /// Image could not be encoded for the device
    #[error("Image error: {0}")]
    Image(String),

    /// Write, flush, or other I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by the print dispatcher.
#[derive(Debug, Error)]
pub enum PrintError {
    /// The driver failed to deliver the image
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The blocking print task panicked or was cancelled
    #[error("Print worker failed: {0}")]
    Worker(String),
}

/// Errors from the HTTP server shell.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}
