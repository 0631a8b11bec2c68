//! # Printer Drivers
//!
//! A [`PrinterDriver`] turns a composed [`PrintableImage`] into paper (or a
//! file). Drivers are blocking; the dispatcher calls them from a blocking
//! thread while holding the printer lock.
//!
//! | Driver | Output |
//! |--------|--------|
//! | [`StarRasterDriver`] | StarPRNT raster commands over a serial/RFCOMM device |
//! | [`SpoolDriver`] | `job-NNNNN.png` files in a directory |

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::TransportError;
use crate::layout::PrintableImage;
use crate::protocol::{commands, graphics};
use crate::transport::BluetoothTransport;

use super::PrinterCapabilities;

/// Paper fed after the image, before the cut.
const TRAILING_FEED_MM: f32 = 3.0;

/// Printer protocol and transport adapter.
///
/// A job is always `connect`, `print_image`, then `disconnect`, and
/// `disconnect` runs even when printing failed.
pub trait PrinterDriver: Send + 'static {
    fn capabilities(&self) -> PrinterCapabilities;

    fn connect(&mut self) -> Result<(), TransportError>;

    fn print_image(&mut self, image: &PrintableImage) -> Result<(), TransportError>;

    fn disconnect(&mut self);
}

/// StarPRNT raster driver for a printer reachable as a TTY device.
///
/// The device is opened per job so a printer that was switched off between
/// jobs is picked up again on the next request.
pub struct StarRasterDriver {
    device: PathBuf,
    capabilities: PrinterCapabilities,
    transport: Option<BluetoothTransport>,
}

impl StarRasterDriver {
    pub fn new(device: impl Into<PathBuf>, capabilities: PrinterCapabilities) -> Self {
        Self {
            device: device.into(),
            capabilities,
            transport: None,
        }
    }

    /// Full command sequence for one image: init, raster, feed, cut.
    pub fn job_bytes(&self, image: &PrintableImage) -> Vec<u8> {
        let mut data = commands::init();
        data.extend(graphics::raster_chunked(
            image.width() as u16,
            image.height() as usize,
            &image.to_raster(),
            self.capabilities.max_chunk_rows,
        ));
        data.extend(commands::feed_mm(TRAILING_FEED_MM));
        data.extend(commands::cut_full_feed());
        data
    }
}

impl PrinterDriver for StarRasterDriver {
    fn capabilities(&self) -> PrinterCapabilities {
        self.capabilities
    }

    fn connect(&mut self) -> Result<(), TransportError> {
        if self.transport.is_none() {
            debug!(device = %self.device.display(), "Opening printer device");
            self.transport = Some(BluetoothTransport::open(&self.device)?);
        }
        Ok(())
    }

    fn print_image(&mut self, image: &PrintableImage) -> Result<(), TransportError> {
        let data = self.job_bytes(image);
        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| TransportError::Setup("printer is not connected".to_string()))?;
        transport.write_all(&data)
    }

    fn disconnect(&mut self) {
        self.transport = None;
    }
}

/// Writes every job as a PNG into a spool directory instead of printing.
pub struct SpoolDriver {
    dir: PathBuf,
    capabilities: PrinterCapabilities,
    next_job: u64,
}

impl SpoolDriver {
    pub fn new(dir: impl Into<PathBuf>, capabilities: PrinterCapabilities) -> Self {
        Self {
            dir: dir.into(),
            capabilities,
            next_job: 1,
        }
    }

    fn job_path(&self, n: u64) -> PathBuf {
        self.dir.join(format!("job-{:05}.png", n))
    }
}

/// Job number of a spool file name such as `job-00012.png`.
fn spooled_job_number(name: &str) -> Option<u64> {
    name.strip_prefix("job-")?.strip_suffix(".png")?.parse().ok()
}

impl PrinterDriver for SpoolDriver {
    fn capabilities(&self) -> PrinterCapabilities {
        self.capabilities
    }

    fn connect(&mut self) -> Result<(), TransportError> {
        fs::create_dir_all(&self.dir).map_err(|source| TransportError::Open {
            path: self.dir.display().to_string(),
            source,
        })?;

        // Continue numbering after whatever is already spooled
        let last = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| spooled_job_number(&entry.file_name().to_string_lossy()))
            .max()
            .unwrap_or(0);
        self.next_job = self.next_job.max(last + 1);
        Ok(())
    }

    fn print_image(&mut self, image: &PrintableImage) -> Result<(), TransportError> {
        let png = image.to_png().map_err(|e| TransportError::Image(e.to_string()))?;
        let path = self.job_path(self.next_job);
        fs::write(&path, png)?;
        debug!(path = %path.display(), "Spooled job");
        self.next_job += 1;
        Ok(())
    }

    fn disconnect(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::PrintJob;
    use crate::layout;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("printpost-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn sample_image(caps: &PrinterCapabilities) -> PrintableImage {
        let job = PrintJob::text_only("Order #1").unwrap();
        layout::compose(&job, caps).unwrap()
    }

    #[test]
    fn test_spooled_job_number() {
        assert_eq!(spooled_job_number("job-00012.png"), Some(12));
        assert_eq!(spooled_job_number("job-1.png"), Some(1));
        assert_eq!(spooled_job_number("job-x.png"), None);
        assert_eq!(spooled_job_number("notes.txt"), None);
    }

    #[test]
    fn test_spool_writes_numbered_pngs() {
        let dir = temp_dir("spool");
        let caps = PrinterCapabilities::PAPER_58MM;
        let image = sample_image(&caps);

        let mut driver = SpoolDriver::new(&dir, caps);
        for _ in 0..2 {
            driver.connect().unwrap();
            driver.print_image(&image).unwrap();
            driver.disconnect();
        }

        let first = fs::read(dir.join("job-00001.png")).unwrap();
        assert_eq!(&first[1..4], b"PNG");
        assert!(dir.join("job-00002.png").exists());

        // A new driver continues the sequence
        let mut driver = SpoolDriver::new(&dir, caps);
        driver.connect().unwrap();
        driver.print_image(&image).unwrap();
        assert!(dir.join("job-00003.png").exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_star_driver_job_bytes() {
        let caps = PrinterCapabilities::TSP650II;
        let image = sample_image(&caps);
        let driver = StarRasterDriver::new("/dev/null", caps);
        let data = driver.job_bytes(&image);

        assert!(data.starts_with(&commands::init()));
        assert!(data.ends_with(&commands::cut_full_feed()));
        // Raster payload is larger than the image bits
        assert!(data.len() > image.to_raster().len());
    }

    #[test]
    fn test_star_driver_print_requires_connect() {
        let caps = PrinterCapabilities::TSP650II;
        let image = sample_image(&caps);
        let mut driver = StarRasterDriver::new("/dev/null", caps);
        let err = driver.print_image(&image).unwrap_err();
        assert!(matches!(err, TransportError::Setup(_)));
    }

    #[test]
    fn test_star_driver_writes_to_device() {
        let path = std::env::temp_dir().join(format!("printpost-star-{}.bin", std::process::id()));
        fs::write(&path, b"").unwrap();

        let caps = PrinterCapabilities::PAPER_58MM;
        let image = sample_image(&caps);
        let mut driver = StarRasterDriver::new(&path, caps);
        driver.connect().unwrap();
        driver.print_image(&image).unwrap();
        driver.disconnect();

        assert_eq!(fs::read(&path).unwrap(), driver.job_bytes(&image));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_star_driver_missing_device() {
        let mut driver = StarRasterDriver::new("/nonexistent/rfcomm9", PrinterCapabilities::TSP650II);
        assert!(matches!(driver.connect(), Err(TransportError::Open { .. })));
    }
}
