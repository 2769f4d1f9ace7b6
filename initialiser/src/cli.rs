use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[clap(about, version)]
pub struct Cli {
    /// Minimum log level to print out
    #[clap(long, value_enum, default_value = "info")]
    pub log_level: LevelFilter,

    /// Vendor ID of the device to switch, in hex
    #[clap(long, value_parser = parse_hex_id, default_value = "04dd")]
    pub vendor_id: u16,

    /// Product ID of the device to switch, in hex
    #[clap(long, value_parser = parse_hex_id, default_value = "92d1")]
    pub product_id: u16,

    /// Seconds to wait between the system set and the reboot
    #[clap(long, default_value = "10")]
    pub settle_time: u64,

    /// Timeout for each USB transfer, in milliseconds
    #[clap(long, default_value = "1000")]
    pub timeout_ms: u64,

    /// Send the read-only query commands before rebooting
    #[clap(long)]
    pub probe: bool,

    /// List connected USB devices and exit
    #[clap(long)]
    pub list: bool,
}

pub fn parse_hex_id(value: &str) -> Result<u16, String> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u16::from_str_radix(digits, 16).map_err(|e| format!("'{}' is not a 16-bit hex ID: {}", value, e))
}

#[repr(usize)]
#[derive(ValueEnum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum LevelFilter {
    /// A level lower than all log levels.
    Off,
    /// Corresponds to the `Error` log level.
    Error,
    /// Corresponds to the `Warn` log level.
    Warn,
    /// Corresponds to the `Info` log level.
    Info,
    /// Corresponds to the `Debug` log level.
    Debug,
    /// Corresponds to the `Trace` log level.
    Trace,
}

impl From<LevelFilter> for log::LevelFilter {
    fn from(level: LevelFilter) -> Self {
        match level {
            LevelFilter::Off => log::LevelFilter::Off,
            LevelFilter::Error => log::LevelFilter::Error,
            LevelFilter::Warn => log::LevelFilter::Warn,
            LevelFilter::Info => log::LevelFilter::Info,
            LevelFilter::Debug => log::LevelFilter::Debug,
            LevelFilter::Trace => log::LevelFilter::Trace,
        }
    }
}
