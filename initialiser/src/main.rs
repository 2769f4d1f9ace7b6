use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use maker_mode_usb::controller::{run, SequenceConfig};
use maker_mode_usb::devices::list_devices;
use maker_mode_usb::find_device;
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};
use std::time::Duration;

use crate::cli::Cli;

mod cli;

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    CombinedLogger::init(vec![TermLogger::new(
        args.log_level.into(),
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )])
    .context("Could not configure the logger")?;

    if args.list {
        for device in list_devices()? {
            let marker = match device.matches(args.vendor_id, args.product_id) {
                true => " <-",
                false => "",
            };
            info!("{}{}", device, marker);
        }
        return Ok(());
    }

    info!(
        "Looking for device {:04x}:{:04x}..",
        args.vendor_id, args.product_id
    );
    let mut device = find_device(
        args.vendor_id,
        args.product_id,
        Duration::from_millis(args.timeout_ms),
    )?;

    let config = SequenceConfig {
        settle_time: Duration::from_secs(args.settle_time),
        probe: args.probe,
    };
    run(&mut device, &config);

    info!("Sequence complete");
    Ok(())
}
