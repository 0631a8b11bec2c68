//! # Printer Module
//!
//! Everything between a composed image and the physical printer.
//!
//! ## Modules
//!
//! - [`config`]: Printer hardware capabilities
//! - [`driver`]: The [`PrinterDriver`] trait and concrete drivers
//! - [`dispatch`]: One-job-at-a-time access to the driver

pub mod config;
pub mod dispatch;
pub mod driver;

pub use config::PrinterCapabilities;
pub use dispatch::PrintDispatcher;
pub use driver::{PrinterDriver, SpoolDriver, StarRasterDriver};
