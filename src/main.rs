//! # printpost CLI
//!
//! HTTP print server for QR codes and text on thermal receipt printers.
//!
//! ## Usage
//!
//! ```bash
//! # Serve, printing to an already bound RFCOMM device
//! printpost serve --device /dev/rfcomm0
//!
//! # Serve, binding the printer by MAC address first (needs root)
//! printpost serve --bluetooth 00:11:62:AA:BB:CC
//!
//! # Serve without a printer, writing each job as a PNG
//! printpost serve --spool ./spool
//!
//! # Compose one job to a PNG
//! printpost render --qr https://example.com --text "Scan me" -o out.png
//! ```
//!
//! Logging is controlled with `RUST_LOG` (default `printpost=info,tower_http=info`).

use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use printpost::{
    format::FormatOptions,
    job::{Normalizer, QueryParams},
    layout,
    printer::{PrintDispatcher, PrinterCapabilities, PrinterDriver, SpoolDriver, StarRasterDriver},
    server::{self, AppState, ServerConfig},
    transport,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// printpost - QR and text printing over HTTP
#[derive(Parser, Debug)]
#[command(name = "printpost")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Printer model (tsp650ii, 58mm)
    #[arg(long, env = "PRINTER_MODEL", default_value = "tsp650ii", global = true)]
    model: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP print server
    Serve(ServeArgs),

    /// Compose a single job and save it as PNG
    Render {
        /// Text to print
        #[arg(long)]
        text: Option<String>,

        /// QR payload; when given, the QR is drawn left of the text
        #[arg(long)]
        qr: Option<String>,

        /// Output PNG file
        #[arg(long, short, value_name = "FILE")]
        output: PathBuf,
    },
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Printer serial device (e.g. /dev/rfcomm0)
    #[arg(long, env = "PRINTER_SERIAL", value_name = "PATH")]
    device: Option<PathBuf>,

    /// Printer Bluetooth MAC address; bound to an RFCOMM device on startup
    #[arg(long, env = "PRINTER_BLUETOOTH", value_name = "MAC")]
    bluetooth: Option<String>,

    /// RFCOMM device number used when binding --bluetooth
    #[arg(long, default_value_t = 0)]
    rfcomm_channel: u8,

    /// Write jobs as PNG files into this directory instead of printing
    #[arg(long, env = "PRINTER_SPOOL", value_name = "DIR")]
    spool: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "PRINT_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "PRINT_PORT", default_value_t = 8080)]
    port: u16,

    /// Leave a blank line after each nested top-level entry of structured text
    #[arg(long)]
    blank_line_after_nested: bool,
}

/// Where printed jobs go.
enum Target {
    Device(PathBuf),
    Bluetooth(String),
    Spool(PathBuf),
}

impl ServeArgs {
    /// The single configured target, or `None` if zero or several are set.
    fn target(&self) -> Option<Target> {
        match (&self.device, &self.bluetooth, &self.spool) {
            (Some(device), None, None) => Some(Target::Device(device.clone())),
            (None, Some(mac), None) => Some(Target::Bluetooth(mac.clone())),
            (None, None, Some(dir)) => Some(Target::Spool(dir.clone())),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "printpost=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let Some(capabilities) = PrinterCapabilities::by_name(&cli.model) else {
        Cli::command()
            .error(
                ErrorKind::InvalidValue,
                format!(
                    "unknown printer model '{}' (available: {})",
                    cli.model,
                    PrinterCapabilities::model_names().join(", ")
                ),
            )
            .exit();
    };

    if let Err(e) = run(cli.command, capabilities).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, capabilities: PrinterCapabilities) -> Result<(), BoxError> {
    match command {
        Commands::Serve(args) => {
            let Some(target) = args.target() else {
                Cli::command()
                    .error(
                        ErrorKind::MissingRequiredArgument,
                        "exactly one of --device, --bluetooth or --spool is required",
                    )
                    .exit();
            };

            let driver = build_driver(target, args.rfcomm_channel, capabilities)?;
            let normalizer = Normalizer::new(FormatOptions {
                blank_line_after_nested: args.blank_line_after_nested,
            });
            let state = AppState::new(PrintDispatcher::from_boxed(driver)).with_normalizer(normalizer);

            server::serve(ServerConfig::new(&args.host, args.port), Arc::new(state)).await?;
        }

        Commands::Render { text, qr, output } => {
            let job = Normalizer::default().normalize_query(QueryParams { text, qr })?;
            let image = layout::compose(&job, &capabilities)?;
            std::fs::write(&output, image.to_png()?)?;
            info!(
                path = %output.display(),
                width = image.width(),
                height = image.height(),
                "Saved preview"
            );
        }
    }

    Ok(())
}

fn build_driver(
    target: Target,
    rfcomm_channel: u8,
    capabilities: PrinterCapabilities,
) -> Result<Box<dyn PrinterDriver>, BoxError> {
    let driver: Box<dyn PrinterDriver> = match target {
        Target::Spool(dir) => {
            info!(dir = %dir.display(), "Spooling jobs to directory");
            Box::new(SpoolDriver::new(dir, capabilities))
        }
        Target::Device(device) => {
            info!(device = %device.display(), "Printing to serial device");
            Box::new(StarRasterDriver::new(device, capabilities))
        }
        Target::Bluetooth(mac) => {
            if !transport::is_valid_mac(&mac) {
                return Err(format!("Invalid Bluetooth MAC address '{}'", mac).into());
            }
            let device = match transport::find_rfcomm_for_mac(&mac)? {
                Some(device) => {
                    info!(mac = %mac, device = %device, "Found existing RFCOMM binding");
                    device
                }
                None => transport::setup_rfcomm(&mac, rfcomm_channel)?,
            };
            Box::new(StarRasterDriver::new(device, capabilities))
        }
    };
    Ok(driver)
}
