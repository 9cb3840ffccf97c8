//! pencet - Dash button press detector
//!
//! Sniffs ARP probes to discover button hardware addresses.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pencet::capture::{PcapSessionProvider, SessionProvider};
use pencet::{filters, frame, interface, mac};

#[derive(Parser)]
#[command(name = "pencet")]
#[command(about = "Detect Dash button presses from ARP and DHCP broadcasts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the hardware address of every ARP probe seen on the network
    Scan {
        /// Interface to capture on (default: first external interface)
        #[arg(short, long)]
        interface: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scan { interface } => scan(interface).await,
    }
}

async fn scan(interface: Option<String>) -> Result<()> {
    let interface = match interface {
        Some(name) => name,
        None => interface::default_interface()
            .context("no suitable network interface found; pass one with --interface")?,
    };

    let provider = PcapSessionProvider::new(filters::arp_probe_filter());
    let session = provider
        .open(&interface)
        .context("failed to open capture session. Try running as root or with CAP_NET_RAW.")?;

    session.add_handler(|raw| match frame::source_address(raw) {
        Ok(source) => {
            println!(
                "Detected an ARP probe from {}",
                mac::format_mac(source.as_bytes())
            );
        }
        Err(err) => {
            tracing::debug!("ignoring undecodable frame: {}", err);
        }
    });

    eprintln!("Scanning for ARP probes on {}...", interface);
    eprintln!("Press Ctrl+C to stop.");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    session.close();
    Ok(())
}
