//! # Print Dispatcher
//!
//! Serializes jobs through the single printer driver.
//!
//! ```text
//! request A ──┐
//! request B ──┼──► lock (FIFO) ──► spawn_blocking: connect → print_image → disconnect
//! request C ──┘
//! ```
//!
//! The driver lives behind a fair `tokio::sync::Mutex`, so waiting requests
//! are served in arrival order. The owned guard is moved into the blocking
//! task and released when the task ends, whatever the outcome. Each dispatch
//! runs in its own spawned task: a client hanging up does not cancel a
//! queued or running print.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::{error, info};

use crate::error::{PrintError, TransportError};
use crate::layout::PrintableImage;

use super::{PrinterCapabilities, PrinterDriver};

/// Shared handle to the printer. Cloning is cheap; all clones share one
/// driver and one queue.
#[derive(Clone)]
pub struct PrintDispatcher {
    driver: Arc<Mutex<Box<dyn PrinterDriver>>>,
    capabilities: PrinterCapabilities,
}

impl PrintDispatcher {
    pub fn new<D: PrinterDriver>(driver: D) -> Self {
        Self::from_boxed(Box::new(driver))
    }

    pub fn from_boxed(driver: Box<dyn PrinterDriver>) -> Self {
        let capabilities = driver.capabilities();
        Self {
            driver: Arc::new(Mutex::new(driver)),
            capabilities,
        }
    }

    /// Capabilities of the driven printer, read once at construction.
    pub fn capabilities(&self) -> PrinterCapabilities {
        self.capabilities
    }

    /// Print one image, waiting for any earlier job to finish first.
    ///
    /// Not idempotent: a retried call prints again.
    ///
    /// ## Errors
    ///
    /// - [`PrintError::Transport`]: the driver failed to connect or write
    /// - [`PrintError::Worker`]: the print task panicked
    pub async fn print(&self, image: PrintableImage) -> Result<(), PrintError> {
        let driver = Arc::clone(&self.driver);
        let printer = self.capabilities.name;

        let job = tokio::spawn(async move {
            let mut guard = driver.lock_owned().await;

            let delivered = tokio::task::spawn_blocking(move || {
                let started = Instant::now();
                let result = deliver(&mut **guard, &image);
                match &result {
                    Ok(()) => info!(
                        printer,
                        width = image.width(),
                        height = image.height(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Printed job"
                    ),
                    Err(e) => error!(printer, error = %e, "Print failed"),
                }
                result
            })
            .await;

            match delivered {
                Ok(result) => result.map_err(PrintError::from),
                Err(e) => Err(PrintError::Worker(e.to_string())),
            }
        });

        job.await.map_err(|e| PrintError::Worker(e.to_string()))?
    }
}

/// One full driver session. `disconnect` runs on every path.
fn deliver(driver: &mut dyn PrinterDriver, image: &PrintableImage) -> Result<(), TransportError> {
    let result = driver.connect().and_then(|()| driver.print_image(image));
    driver.disconnect();
    result
}
