// src/main.rs

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use wheelhouse::install::WheelInstaller;

#[derive(Parser)]
#[command(name = "wheelhouse")]
#[command(author, version, about = "Install a wheel with per-file atomic writes and RECORD tracking", long_about = None)]
struct Cli {
    /// Path to the wheel file to install
    wheel: PathBuf,

    /// Destination directory
    dest: PathBuf,

    /// Installer identity recorded in the INSTALLER metadata file
    #[arg(long, default_value = "wheelhouse")]
    installer: String,
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!(
        "Installing {} into {}",
        cli.wheel.display(),
        cli.dest.display()
    );

    let installer = WheelInstaller::from_wheel_path(&cli.installer, &cli.wheel)?;
    installer.install(&cli.dest)?;

    println!(
        "Installed {} into {}",
        cli.wheel.display(),
        cli.dest.display()
    );
    Ok(())
}
