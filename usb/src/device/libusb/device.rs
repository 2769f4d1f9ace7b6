use crate::commands::{ControlData, ControlRequest};
use crate::device::base::{ExecutableDevice, MakerModeCommands};
use crate::devices::{select_device, UsbDeviceInfo};
use crate::error::{ConnectError, TransferError};
use crate::{EP_COMMAND, EP_COMMAND_RESPONSE, EP_CONTROL_RESPONSE};
use log::{debug, info, warn};
use rusb::{Device, DeviceDescriptor, DeviceHandle, Direction, GlobalContext, Language, TransferType};
use std::collections::HashMap;
use std::time::Duration;

pub struct MakerModeUSB {
    handle: DeviceHandle<GlobalContext>,
    device: Device<GlobalContext>,
    descriptor: DeviceDescriptor,

    // Kept as read, so a failed lookup surfaces on every string read instead of looking empty.
    language: Result<Option<Language>, rusb::Error>,
    endpoint_types: HashMap<u8, TransferType>,
    claimed_interfaces: Vec<u8>,
    timeout: Duration,
}

impl MakerModeUSB {
    pub fn open(vendor_id: u16, product_id: u16, timeout: Duration) -> Result<Self, ConnectError> {
        let (device, descriptor) = MakerModeUSB::find_device(vendor_id, product_id)?;
        let mut handle = device.open()?;
        info!("Connected to device at {:?}", device);

        let language = handle
            .read_languages(timeout)
            .map(|languages| languages.first().copied());
        if let Err(e) = &language {
            debug!("Unable to read supported languages: {}", e);
        }

        // Not supported everywhere (Windows / MacOS), so failure here is fine.
        if let Err(e) = handle.set_auto_detach_kernel_driver(true) {
            debug!("Kernel driver auto-detach unavailable: {}", e);
        }

        let endpoint_types = MakerModeUSB::endpoint_types(&device);
        let mut claimed_interfaces = vec![];
        for interface in MakerModeUSB::interfaces_to_claim(&device) {
            match handle.claim_interface(interface) {
                Ok(()) => claimed_interfaces.push(interface),
                Err(e) => warn!("Unable to claim interface {}: {}", interface, e),
            }
        }

        Ok(Self {
            handle,
            device,
            descriptor,
            language,
            endpoint_types,
            claimed_interfaces,
            timeout,
        })
    }

    fn find_device(
        vendor_id: u16,
        product_id: u16,
    ) -> Result<(Device<GlobalContext>, DeviceDescriptor), ConnectError> {
        let devices = rusb::devices()?;
        let candidates = devices.iter().filter_map(|usb_device| {
            let descriptor = usb_device.device_descriptor().ok()?;
            let info = UsbDeviceInfo::from_device(&usb_device, &descriptor);
            Some((info, (usb_device, descriptor)))
        });
        select_device(candidates, vendor_id, product_id)
    }

    fn endpoint_types(device: &Device<GlobalContext>) -> HashMap<u8, TransferType> {
        let mut types = HashMap::new();
        if let Ok(config) = device.active_config_descriptor() {
            for interface in config.interfaces() {
                for setting in interface.descriptors() {
                    for endpoint in setting.endpoint_descriptors() {
                        types.insert(endpoint.address(), endpoint.transfer_type());
                    }
                }
            }
        }
        types
    }

    // Claims whichever interfaces own the sequence's endpoints, or interface 0 if the
    // configuration can't be read.
    fn interfaces_to_claim(device: &Device<GlobalContext>) -> Vec<u8> {
        let wanted = [EP_CONTROL_RESPONSE, EP_COMMAND_RESPONSE, EP_COMMAND];
        let mut interfaces = vec![];

        if let Ok(config) = device.active_config_descriptor() {
            for interface in config.interfaces() {
                let owns_endpoint = interface.descriptors().any(|setting| {
                    setting
                        .endpoint_descriptors()
                        .any(|endpoint| wanted.contains(&endpoint.address()))
                });
                if owns_endpoint && !interfaces.contains(&interface.number()) {
                    interfaces.push(interface.number());
                }
            }
        }

        if interfaces.is_empty() {
            interfaces.push(0);
        }
        interfaces
    }

    fn transfer_type(&self, endpoint: u8) -> TransferType {
        self.endpoint_types
            .get(&endpoint)
            .copied()
            .unwrap_or(TransferType::Bulk)
    }

    fn read_string(&self, index: Option<u8>) -> Result<Option<String>, TransferError> {
        match string_target(&self.language, index)? {
            Some((language, index)) => Ok(Some(self.handle.read_string_descriptor(
                language,
                index,
                self.timeout,
            )?)),
            None => Ok(None),
        }
    }
}

/// Works out which language and index a string read should use. A device without the string
/// (index 0), or without any languages, has nothing to read. A failed language lookup is an
/// error for every string.
fn string_target<L: Copy>(
    language: &Result<Option<L>, rusb::Error>,
    index: Option<u8>,
) -> Result<Option<(L, u8)>, TransferError> {
    let Some(index) = index else {
        return Ok(None);
    };

    match language {
        Ok(Some(language)) => Ok(Some((*language, index))),
        Ok(None) => Ok(None),
        Err(e) => Err(TransferError::UsbError(*e)),
    }
}

impl ExecutableDevice for MakerModeUSB {
    fn control_transfer(&mut self, request: &ControlRequest) -> Result<Vec<u8>, TransferError> {
        match (&request.data, request.direction()) {
            (ControlData::Out(data), Direction::Out) => {
                self.handle.write_control(
                    request.request_type,
                    request.request,
                    request.value,
                    request.index,
                    data,
                    self.timeout,
                )?;
                Ok(vec![])
            }
            (ControlData::In(length), Direction::In) => {
                let mut buf = vec![0; *length as usize];
                let response_length = self.handle.read_control(
                    request.request_type,
                    request.request,
                    request.value,
                    request.index,
                    &mut buf,
                    self.timeout,
                )?;
                buf.truncate(response_length);
                Ok(buf)
            }
            _ => Err(TransferError::UnexpectedDirection(request.request_type)),
        }
    }

    fn write_endpoint(&mut self, endpoint: u8, data: &[u8]) -> Result<usize, TransferError> {
        let written = match self.transfer_type(endpoint) {
            TransferType::Interrupt => self.handle.write_interrupt(endpoint, data, self.timeout)?,
            _ => self.handle.write_bulk(endpoint, data, self.timeout)?,
        };
        Ok(written)
    }

    fn read_endpoint(&mut self, endpoint: u8, length: usize) -> Result<Vec<u8>, TransferError> {
        let mut buf = vec![0; length];
        let response_length = match self.transfer_type(endpoint) {
            TransferType::Interrupt => self.handle.read_interrupt(endpoint, &mut buf, self.timeout)?,
            _ => self.handle.read_bulk(endpoint, &mut buf, self.timeout)?,
        };
        buf.truncate(response_length);
        Ok(buf)
    }

    fn read_serial_number(&mut self) -> Result<Option<String>, TransferError> {
        self.read_string(self.descriptor.serial_number_string_index())
    }

    fn read_manufacturer(&mut self) -> Result<Option<String>, TransferError> {
        self.read_string(self.descriptor.manufacturer_string_index())
    }
}

impl MakerModeCommands for MakerModeUSB {}

impl Drop for MakerModeUSB {
    fn drop(&mut self) {
        for interface in self.claimed_interfaces.drain(..) {
            if let Err(e) = self.handle.release_interface(interface) {
                debug!("Unable to release interface {} on {:?}: {}", interface, self.device, e);
            }
        }
    }
}
