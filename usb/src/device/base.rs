use crate::commands::ControlRequest;
use crate::error::TransferError;
use crate::to_hex;
use log::{debug, error, info};

/// The raw transfers a device must provide, everything else is built on top of these.
pub trait ExecutableDevice {
    /// Performs a control transfer, returning whatever was read (empty for OUT requests).
    fn control_transfer(&mut self, request: &ControlRequest) -> Result<Vec<u8>, TransferError>;
    fn write_endpoint(&mut self, endpoint: u8, data: &[u8]) -> Result<usize, TransferError>;
    fn read_endpoint(&mut self, endpoint: u8, length: usize) -> Result<Vec<u8>, TransferError>;

    // These return None when the device has no string descriptor for the field.
    fn read_serial_number(&mut self) -> Result<Option<String>, TransferError>;
    fn read_manufacturer(&mut self) -> Result<Option<String>, TransferError>;
}

// None of these are allowed to fail, a transport error is logged and the sequence carries on.
pub trait MakerModeCommands: ExecutableDevice {
    fn print_descriptors(&mut self) {
        match read_descriptors(self) {
            Ok((device, other)) => {
                info!("Device descriptor: {}", device);
                info!("Other descriptor: {}", other);
            }
            Err(e) => error!("Error getting device descriptors: {}", e),
        }
    }

    fn print_device_info(&mut self) {
        if let Err(e) = log_device_info(self) {
            error!("Error getting device info: {}", e);
        }
    }

    fn control_transfer_then_read(
        &mut self,
        request: &ControlRequest,
        read_endpoint: u8,
        read_length: usize,
    ) -> Option<String> {
        debug!("Control Transfer: {:x?}", request);
        let result = self
            .control_transfer(request)
            .and_then(|_| self.read_endpoint(read_endpoint, read_length));

        match result {
            Ok(response) => Some(to_hex(&response)),
            Err(e) => {
                error!("Error in control transfer or read: {}", e);
                None
            }
        }
    }

    fn send_payload(&mut self, endpoint: u8, data: &[u8]) {
        match self.write_endpoint(endpoint, data) {
            Ok(written) => {
                debug!("Wrote {} of {} bytes to {:#04x}", written, data.len(), endpoint);
                info!("Data Transfered: {}", to_hex(data));
            }
            Err(e) => error!("Error sending data to device: {}", e),
        }
    }

    fn read_response(&mut self, endpoint: u8, length: usize) -> Option<String> {
        match self.read_endpoint(endpoint, length) {
            Ok(response) => {
                let response = to_hex(&response);
                info!("Response: {}", response);
                Some(response)
            }
            Err(e) => {
                error!("Error reading response: {}", e);
                None
            }
        }
    }
}

fn read_descriptors<D: ExecutableDevice + ?Sized>(
    device: &mut D,
) -> Result<(String, String), TransferError> {
    let device_descriptor = device.control_transfer(&ControlRequest::device_descriptor())?;
    let other_descriptor = device.control_transfer(&ControlRequest::configuration_descriptor())?;
    Ok((to_hex(&device_descriptor), to_hex(&other_descriptor)))
}

fn log_device_info<D: ExecutableDevice + ?Sized>(device: &mut D) -> Result<(), TransferError> {
    let serial = device.read_serial_number()?;
    info!("Serial number: {}", serial.as_deref().unwrap_or("None"));

    let manufacturer = device.read_manufacturer()?;
    info!("Manufacturer: {}", manufacturer.as_deref().unwrap_or("None"));
    Ok(())
}
