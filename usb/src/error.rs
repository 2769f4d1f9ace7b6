#[derive(thiserror::Error, Debug)]
pub enum ConnectError {
    #[error("Device with Vendor ID {vendor_id:#06x} and Product ID {product_id:#06x} not found")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    #[error("USB error: {0}")]
    UsbError(#[from] rusb::Error),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("USB error: {0}")]
    UsbError(#[from] rusb::Error),

    #[error("Request type {0:#04x} does not match the supplied data direction")]
    UnexpectedDirection(u8),
}
