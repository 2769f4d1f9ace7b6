// Plain structs describing what's on the bus, so device selection can be done (and tested)
// without holding any libusb handles.
use crate::error::ConnectError;
use log::debug;
use rusb::{Device, DeviceDescriptor, GlobalContext};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsbDeviceInfo {
    pub bus_number: u8,
    pub address: u8,
    pub vendor_id: u16,
    pub product_id: u16,
}

impl UsbDeviceInfo {
    pub fn from_device(device: &Device<GlobalContext>, descriptor: &DeviceDescriptor) -> Self {
        Self {
            bus_number: device.bus_number(),
            address: device.address(),
            vendor_id: descriptor.vendor_id(),
            product_id: descriptor.product_id(),
        }
    }

    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }
}

impl Display for UsbDeviceInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Bus {:03} Device {:03}: ID {:04x}:{:04x}",
            self.bus_number, self.address, self.vendor_id, self.product_id
        )
    }
}

pub fn list_devices() -> Result<Vec<UsbDeviceInfo>, ConnectError> {
    let mut found_devices = Vec::new();

    for device in rusb::devices()?.iter() {
        match device.device_descriptor() {
            Ok(descriptor) => found_devices.push(UsbDeviceInfo::from_device(&device, &descriptor)),
            Err(e) => debug!("Skipping {:?}, unable to read descriptor: {}", device, e),
        }
    }

    Ok(found_devices)
}

/// Walks the candidates once, returning whatever is attached to the first one matching the IDs.
pub fn select_device<T>(
    candidates: impl IntoIterator<Item = (UsbDeviceInfo, T)>,
    vendor_id: u16,
    product_id: u16,
) -> Result<T, ConnectError> {
    candidates
        .into_iter()
        .find(|(info, _)| info.matches(vendor_id, product_id))
        .map(|(_, device)| device)
        .ok_or(ConnectError::DeviceNotFound {
            vendor_id,
            product_id,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PID_MAKER_MODE, VID_MAKER_MODE};

    fn bus() -> Vec<UsbDeviceInfo> {
        vec![
            UsbDeviceInfo {
                bus_number: 1,
                address: 2,
                vendor_id: 0x1d6b,
                product_id: 0x0002,
            },
            UsbDeviceInfo {
                bus_number: 3,
                address: 7,
                vendor_id: VID_MAKER_MODE,
                product_id: PID_MAKER_MODE,
            },
            UsbDeviceInfo {
                bus_number: 3,
                address: 9,
                vendor_id: VID_MAKER_MODE,
                product_id: PID_MAKER_MODE,
            },
        ]
    }

    fn tagged() -> Vec<(UsbDeviceInfo, usize)> {
        bus().into_iter().enumerate().map(|(i, info)| (info, i)).collect()
    }

    #[test]
    fn first_matching_device_is_chosen() {
        let selected = select_device(tagged(), VID_MAKER_MODE, PID_MAKER_MODE).unwrap();
        assert_eq!(selected, 1);
    }

    #[test]
    fn selection_stops_at_the_first_match() {
        let mut scanned = 0;
        let candidates = tagged().into_iter().inspect(|_| scanned += 1);

        select_device(candidates, VID_MAKER_MODE, PID_MAKER_MODE).unwrap();
        assert_eq!(scanned, 2);
    }

    #[test]
    fn missing_device_is_reported() {
        let result = select_device(tagged(), VID_MAKER_MODE, 0x0001);
        assert!(matches!(
            result,
            Err(ConnectError::DeviceNotFound {
                vendor_id: VID_MAKER_MODE,
                product_id: 0x0001
            })
        ));

        let result = select_device(Vec::<(UsbDeviceInfo, ())>::new(), VID_MAKER_MODE, PID_MAKER_MODE);
        assert!(matches!(result, Err(ConnectError::DeviceNotFound { .. })));
    }

    #[test]
    fn not_found_message_names_both_ids() {
        let error = ConnectError::DeviceNotFound {
            vendor_id: 0x04dd,
            product_id: 0x92d1,
        };
        assert_eq!(
            error.to_string(),
            "Device with Vendor ID 0x04dd and Product ID 0x92d1 not found"
        );
    }

    #[test]
    fn display_is_lsusb_style() {
        assert_eq!(bus()[1].to_string(), "Bus 003 Device 007: ID 04dd:92d1");
    }
}
