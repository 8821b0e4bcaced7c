//! IMU Simulator - Main Entry Point

use anyhow::Context;
use clap::Parser;
use imu_sim::{create_fifo, PacketGenerator, DEFAULT_FREQUENCY_HZ, DEFAULT_OUTPUT};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn, Level};

/// Write simulated IMU packets to a FIFO or file
#[derive(Debug, Parser)]
#[command(name = "imu-sim", version, about)]
struct Cli {
    /// Output FIFO or file path
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Transmission frequency in Hz
    #[arg(short, long, default_value_t = DEFAULT_FREQUENCY_HZ)]
    frequency: f64,

    /// Send a single packet and exit
    #[arg(short, long)]
    single: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    anyhow::ensure!(
        cli.frequency.is_finite() && cli.frequency > 0.0,
        "frequency must be positive, got {}",
        cli.frequency
    );

    match create_fifo(&cli.output) {
        Ok(()) => info!("Created named pipe {}", cli.output.display()),
        Err(e) => warn!("Could not create named pipe ({}), using regular file", e),
    }

    let mut generator = PacketGenerator::new();
    let epoch = Instant::now();

    if cli.single {
        return send_packet(&cli, &mut generator, epoch).context("Failed to send packet");
    }

    let period = Duration::from_secs_f64(1.0 / cli.frequency);
    info!(
        "Simulating IMU at {} Hz (period {:?}) into {}",
        cli.frequency,
        period,
        cli.output.display()
    );

    loop {
        let started = Instant::now();
        match send_packet(&cli, &mut generator, epoch) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                info!("Reader disconnected, stopping");
                return Ok(());
            }
            Err(e) => return Err(e).context("Failed to send packet"),
        }

        if let Some(left) = period.checked_sub(started.elapsed()) {
            std::thread::sleep(left);
        }
    }
}

/// Open the output for each packet so a FIFO reader can come and go
fn send_packet(cli: &Cli, generator: &mut PacketGenerator, epoch: Instant) -> io::Result<()> {
    let record = generator.next_record(epoch.elapsed().as_secs_f64());

    let mut out = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli.output)?;
    out.write_all(&record.to_bytes())?;
    out.flush()?;

    info!(
        "Sent packet {}: X={:.3}, Y={:.3}, Z={:.3}",
        record.packet_count, record.x_rate, record.y_rate, record.z_rate
    );
    Ok(())
}
