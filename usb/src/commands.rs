use rusb::{Direction, Recipient, RequestType};
use strum::{Display, EnumIter};

// The device firmware's framing of these payloads is undocumented, so they're sent exactly as
// captured rather than being built from fields.
const SYSTEM_SET: &[u8] = &[0xFF, 0x55, 0x56, 0x42, 0x00, 0x03, 0xC1, 0x01, 0x01, 0xFE];
const REBOOT: &[u8] = &[0xFF, 0x55, 0x56, 0x42, 0x00, 0x03, 0xC1, 0x01, 0xFE];
const IMEI_READ: &[u8] = &[0xFF, 0x55, 0x56, 0x42, 0x00, 0x02, 0xC1, 0x03, 0xFE];
const QUERY_05: &[u8] = &[0xFF, 0x55, 0x56, 0x42, 0x00, 0x02, 0xC1, 0x05, 0xFE];
const MANUFACTURER_READ: &[u8] = &[0xFF, 0x55, 0x56, 0x42, 0x00, 0x02, 0xC1, 0x07, 0xFE];
const QUERY_09: &[u8] = &[0xFF, 0x55, 0x56, 0x42, 0x00, 0x02, 0xC1, 0x09, 0xFE];

/// Commands written to the bulk command endpoint.
#[derive(Copy, Clone, Debug, Display, EnumIter, PartialEq, Eq)]
pub enum Command {
    SystemSet,
    Reboot,
    ImeiRead,
    Query05,
    ManufacturerRead,
    Query09,
}

impl Command {
    pub fn payload(&self) -> &'static [u8] {
        match self {
            Command::SystemSet => SYSTEM_SET,
            Command::Reboot => REBOOT,
            Command::ImeiRead => IMEI_READ,
            Command::Query05 => QUERY_05,
            Command::ManufacturerRead => MANUFACTURER_READ,
            Command::Query09 => QUERY_09,
        }
    }

    /// Read-only queries which may be sent between the system set and the reboot.
    pub fn probes() -> [Command; 4] {
        [
            Command::ImeiRead,
            Command::Query05,
            Command::ManufacturerRead,
            Command::Query09,
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlData {
    /// Bytes written to the device, may be empty
    Out(Vec<u8>),

    /// Number of bytes to read back
    In(u16),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlRequest {
    pub request_type: u8,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub data: ControlData,
}

const GET_DESCRIPTOR: u8 = 0x06;
const DESCRIPTOR_LENGTH: u16 = 0x40;

const VENDOR_MODE_SET: u8 = 0x60;
const VENDOR_MODE_QUERY: u8 = 0x62;
const MAKER_MODE: u16 = 0xC0;

impl ControlRequest {
    pub fn direction(&self) -> Direction {
        match self.request_type & 0x80 {
            0 => Direction::Out,
            _ => Direction::In,
        }
    }

    pub fn device_descriptor() -> Self {
        Self::standard_read(0x0100)
    }

    pub fn configuration_descriptor() -> Self {
        Self::standard_read(0x0200)
    }

    pub fn mode_query(index: u16) -> Self {
        Self {
            request_type: vendor_out(),
            request: VENDOR_MODE_QUERY,
            value: 0,
            index,
            data: ControlData::Out(vec![0x02, MAKER_MODE as u8]),
        }
    }

    pub fn mode_set(index: u16) -> Self {
        Self {
            request_type: vendor_out(),
            request: VENDOR_MODE_SET,
            value: MAKER_MODE,
            index,
            data: ControlData::Out(vec![]),
        }
    }

    fn standard_read(value: u16) -> Self {
        Self {
            request_type: rusb::request_type(Direction::In, RequestType::Standard, Recipient::Device),
            request: GET_DESCRIPTOR,
            value,
            index: 0,
            data: ControlData::In(DESCRIPTOR_LENGTH),
        }
    }
}

fn vendor_out() -> u8 {
    rusb::request_type(Direction::Out, RequestType::Vendor, Recipient::Interface)
}
