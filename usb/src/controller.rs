use crate::commands::{Command, ControlRequest};
use crate::device::base::MakerModeCommands;
use crate::{CONTROL_INDEX, EP_COMMAND, EP_COMMAND_RESPONSE, EP_CONTROL_RESPONSE, RESPONSE_LENGTH};
use log::info;
use std::thread::sleep;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SequenceConfig {
    /// How long the device is given to apply the system set before it's rebooted
    pub settle_time: Duration,

    /// Sends the read-only probe commands before the reboot
    pub probe: bool,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            settle_time: Duration::from_secs(10),
            probe: false,
        }
    }
}

/// Runs the switch sequence against an already opened device. Responses are only logged, no
/// step depends on what the previous one returned.
pub fn run<D: MakerModeCommands + ?Sized>(device: &mut D, config: &SequenceConfig) {
    device.print_descriptors();
    device.print_device_info();

    let mode_support = device.control_transfer_then_read(
        &ControlRequest::mode_query(CONTROL_INDEX),
        EP_CONTROL_RESPONSE,
        RESPONSE_LENGTH,
    );
    if let Some(mode_support) = mode_support.filter(|response| !response.is_empty()) {
        info!("Mode Support: {}", mode_support);
    }

    let mode_set = device.control_transfer_then_read(
        &ControlRequest::mode_set(CONTROL_INDEX),
        EP_CONTROL_RESPONSE,
        RESPONSE_LENGTH,
    );
    if let Some(mode_set) = mode_set.filter(|response| !response.is_empty()) {
        info!("Mode Set: {}", mode_set);
    }

    send_command(device, Command::SystemSet);

    if !config.settle_time.is_zero() {
        info!("Waiting {:?} for the device to settle..", config.settle_time);
        sleep(config.settle_time);
    }

    if config.probe {
        for command in Command::probes() {
            info!("Probing with {}", command);
            send_command(device, command);
        }
    }

    send_command(device, Command::Reboot);
}

fn send_command<D: MakerModeCommands + ?Sized>(device: &mut D, command: Command) {
    device.send_payload(EP_COMMAND, command.payload());
    device.read_response(EP_COMMAND_RESPONSE, RESPONSE_LENGTH);
}
