//! # Bluetooth RFCOMM Transport
//!
//! Serial communication with a printer bound to an RFCOMM device (or any
//! other TTY such as a USB serial adapter).
//!
//! ## Bluetooth Setup (Linux)
//!
//! ```bash
//! # 1. Pair with the printer
//! $ bluetoothctl
//! [bluetooth]# pair 00:11:62:XX:XX:XX
//!
//! # 2. Bind to RFCOMM device
//! $ sudo rfcomm bind 0 00:11:62:XX:XX:XX
//! # This creates /dev/rfcomm0
//! ```
//!
//! [`setup_rfcomm`] performs step 2 when the server is started with a MAC
//! address instead of a device path.
//!
//! ## TTY Configuration
//!
//! The device is opened in raw mode so binary raster data is transmitted
//! without modification: no input/output processing, 8-bit characters, no
//! echo, no canonical mode, no XON/XOFF flow control.
//!
//! ## Chunked Writes
//!
//! Large writes are split into 4096-byte chunks with a short delay between
//! them so the Bluetooth buffer does not overflow.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::process::Command;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::TransportError;

/// Default chunk size for writes (bytes)
const CHUNK_SIZE: usize = 4096;

/// Delay between chunks (milliseconds)
const CHUNK_DELAY_MS: u64 = 2;

/// # Bluetooth Printer Transport
///
/// An open, raw-mode connection to a printer device. Dropping it closes the
/// device.
///
/// ```no_run
/// use printpost::transport::BluetoothTransport;
/// use printpost::protocol::commands;
///
/// let mut transport = BluetoothTransport::open("/dev/rfcomm0")?;
/// transport.write_all(&commands::init())?;
/// # Ok::<(), printpost::error::TransportError>(())
/// ```
pub struct BluetoothTransport {
    file: File,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl BluetoothTransport {
    /// Open the device and switch it to raw mode.
    ///
    /// ## Errors
    ///
    /// - The device doesn't exist
    /// - Permission denied (may need root or dialout group)
    /// - TTY configuration fails
    pub fn open<P: AsRef<Path>>(device: P) -> Result<Self, TransportError> {
        let path = device.as_ref();

        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|source| TransportError::Open {
                path: path.display().to_string(),
                source,
            })?;

        configure_tty_raw(file.as_raw_fd())?;

        Ok(Self {
            file,
            chunk_size: CHUNK_SIZE,
            chunk_delay: Duration::from_millis(CHUNK_DELAY_MS),
        })
    }

    /// Set the chunk size for large writes.
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size.max(1);
    }

    /// Set the delay between chunks.
    pub fn set_chunk_delay(&mut self, delay: Duration) {
        self.chunk_delay = delay;
    }

    /// Write data to the printer, chunking large writes, then flush.
    pub fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if data.len() <= self.chunk_size {
            self.file.write_all(data)?;
        } else {
            for chunk in data.chunks(self.chunk_size) {
                self.file.write_all(chunk)?;

                if !self.chunk_delay.is_zero() {
                    thread::sleep(self.chunk_delay);
                }
            }
        }

        self.file.flush()?;
        Ok(())
    }
}

/// Configure a file descriptor for raw TTY mode.
///
/// IXON/IXOFF/IXANY must be off: 0x11 (XON) and 0x13 (XOFF) appear in
/// binary raster data.
#[cfg(unix)]
fn configure_tty_raw(fd: i32) -> Result<(), TransportError> {
    use std::mem::MaybeUninit;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        let err = io::Error::last_os_error();
        // Plain files (e.g. a capture file) are not TTYs; write to them as-is
        if err.raw_os_error() == Some(libc::ENOTTY) {
            debug!("Device is not a TTY, skipping raw mode");
            return Ok(());
        }
        return Err(TransportError::Setup(format!("tcgetattr failed: {}", err)));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(TransportError::Setup(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

#[cfg(not(unix))]
fn configure_tty_raw(_fd: i32) -> Result<(), TransportError> {
    Ok(())
}

// ============================================================================
// RFCOMM SETUP HELPERS
// ============================================================================

/// Validate a Bluetooth MAC address format (XX:XX:XX:XX:XX:XX).
pub fn is_valid_mac(mac: &str) -> bool {
    let parts: Vec<&str> = mac.split(':').collect();
    if parts.len() != 6 {
        return false;
    }
    parts
        .iter()
        .all(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Find the `/dev/rfcommN` device on a line of `/proc/net/rfcomm` or
/// `rfcomm -a` output that mentions `mac_upper`.
fn device_for_mac_in(listing: &str, mac_upper: &str) -> Option<String> {
    listing
        .lines()
        .filter(|line| line.to_uppercase().contains(mac_upper))
        .filter_map(|line| line.split(':').next())
        .map(|dev_name| format!("/dev/{}", dev_name.trim()))
        .find(|device_path| Path::new(device_path).exists())
}

/// Find an existing RFCOMM device bound to the given MAC address.
///
/// Checks `/proc/net/rfcomm` and falls back to `rfcomm -a`.
pub fn find_rfcomm_for_mac(mac: &str) -> Result<Option<String>, TransportError> {
    let mac_upper = mac.to_uppercase();

    if let Ok(contents) = fs::read_to_string("/proc/net/rfcomm")
        && let Some(device) = device_for_mac_in(&contents, &mac_upper)
    {
        return Ok(Some(device));
    }

    let output = Command::new("rfcomm")
        .arg("-a")
        .output()
        .map_err(|e| TransportError::Setup(format!("Failed to run 'rfcomm -a': {}", e)))?;

    Ok(device_for_mac_in(&String::from_utf8_lossy(&output.stdout), &mac_upper))
}

/// Bind an RFCOMM device for a Bluetooth MAC address.
///
/// Runs `bluetoothctl connect`, `l2ping -c 1`, then `rfcomm bind`.
/// Returns the device path on success (e.g., "/dev/rfcomm0").
///
/// **Requires root privileges** for `rfcomm bind`.
pub fn setup_rfcomm(mac: &str, channel: u8) -> Result<String, TransportError> {
    let mac_upper = mac.to_uppercase();
    let device_path = format!("/dev/rfcomm{}", channel);

    info!(mac = %mac_upper, "Connecting to printer");
    let output = Command::new("bluetoothctl")
        .arg("connect")
        .arg(&mac_upper)
        .output()
        .map_err(|e| TransportError::Setup(format!("Failed to run bluetoothctl: {}", e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.contains("Connection successful") && !stdout.contains("already connected") {
        // l2ping below decides whether this matters
        warn!(output = %stdout.trim(), "bluetoothctl did not confirm the connection");
    }

    thread::sleep(Duration::from_millis(500));

    let output = Command::new("l2ping")
        .arg("-c")
        .arg("1")
        .arg(&mac_upper)
        .output()
        .map_err(|e| TransportError::Setup(format!("Failed to run l2ping: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TransportError::Setup(format!(
            "Device {} not reachable: {}",
            mac_upper,
            stderr.trim()
        )));
    }

    info!(device = %device_path, "Binding RFCOMM device");
    let output = Command::new("rfcomm")
        .arg("bind")
        .arg(channel.to_string())
        .arg(&mac_upper)
        .arg("1") // RFCOMM channel 1 (standard for SPP)
        .output()
        .map_err(|e| TransportError::Setup(format!("Failed to run rfcomm bind: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TransportError::Setup(format!("rfcomm bind failed: {}", stderr.trim())));
    }

    thread::sleep(Duration::from_millis(500));

    if !Path::new(&device_path).exists() {
        return Err(TransportError::Setup(format!("Device {} was not created", device_path)));
    }

    Ok(device_path)
}
