//! # printpost - QR and Text Printing over HTTP
//!
//! printpost accepts print requests over HTTP and turns each one into a
//! single monochrome raster for a thermal receipt printer:
//!
//! - **Job normalization**: query parameters, JSON or raw text become one
//!   validated [`PrintJob`](job::PrintJob)
//! - **Text formatting**: nested JSON objects and arrays become indented plain
//!   text
//! - **Layout**: a QR code beside vertically centred text, or full-width text
//! - **Dispatch**: one job at a time through a [`PrinterDriver`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use printpost::{
//!     job::{self, JobRequest, QueryParams},
//!     layout,
//!     printer::{PrinterCapabilities, PrinterDriver, StarRasterDriver},
//! };
//!
//! let query = QueryParams {
//!     text: Some("Table 4".into()),
//!     qr: Some("https://example.com/menu".into()),
//! };
//! let job = job::normalize(JobRequest::Query(query))?;
//!
//! let capabilities = PrinterCapabilities::TSP650II;
//! let image = layout::compose(&job, &capabilities)?;
//!
//! let mut driver = StarRasterDriver::new("/dev/rfcomm0", capabilities);
//! driver.connect()?;
//! driver.print_image(&image)?;
//! driver.disconnect();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`format`] | Nested data to indented plain text |
//! | [`job`] | Request normalization |
//! | [`layout`] | Bitmap composition |
//! | [`printer`] | Capabilities, drivers, dispatcher |
//! | [`protocol`] | StarPRNT command builders |
//! | [`transport`] | Bluetooth RFCOMM communication |
//! | [`server`] | HTTP routes |
//! | [`error`] | Error types |

pub mod error;
pub mod format;
pub mod job;
pub mod layout;
pub mod printer;
pub mod protocol;
pub mod server;
pub mod transport;

// Re-exports for convenience
pub use error::{JobError, PrintError, TransportError};
pub use job::PrintJob;
pub use printer::{PrintDispatcher, PrinterCapabilities, PrinterDriver};
pub use transport::BluetoothTransport;
