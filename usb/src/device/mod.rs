use crate::error::ConnectError;
use std::time::Duration;

pub mod base;
#[cfg(test)]
pub(crate) mod mock;

// libusb is used on every platform, the device has no vendor driver to talk through.
mod libusb;
pub use crate::device::libusb::device::MakerModeUSB;

pub fn find_device(
    vendor_id: u16,
    product_id: u16,
    timeout: Duration,
) -> Result<MakerModeUSB, ConnectError> {
    MakerModeUSB::open(vendor_id, product_id, timeout)
}
