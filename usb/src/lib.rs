pub use rusb;
pub mod commands;
pub mod controller;
pub mod devices;
pub mod error;

mod device;
pub use device::base::{ExecutableDevice, MakerModeCommands};
pub use device::find_device;
pub use device::MakerModeUSB;

pub const VID_MAKER_MODE: u16 = 0x04dd;
pub const PID_MAKER_MODE: u16 = 0x92d1;

// Endpoints used by the switch sequence
pub const EP_CONTROL_RESPONSE: u8 = 0x81;
pub const EP_COMMAND_RESPONSE: u8 = 0x82;
pub const EP_COMMAND: u8 = 0x03;

pub const CONTROL_INDEX: u16 = 0;
pub const RESPONSE_LENGTH: usize = 256;

/// Formats a buffer the way every response is printed, as contiguous lowercase hex.
pub fn to_hex(data: &[u8]) -> String {
    data.iter().map(|byte| format!("{:02x}", byte)).collect()
}
