use crate::commands::{ControlData, ControlRequest};
use crate::device::base::{ExecutableDevice, MakerModeCommands};
use crate::error::TransferError;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Once;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Control(ControlRequest),
    Write(u8, Vec<u8>),
    Read(u8, usize),
    SerialNumber,
    Manufacturer,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Control,
    Write,
    Read,
    Strings,
}

/// Records every transfer, and answers reads from a fixed table.
#[derive(Default)]
pub struct MockDevice {
    pub calls: Vec<Call>,
    failing: Vec<Operation>,
    responses: HashMap<u8, Vec<u8>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, operation: Operation) -> Self {
        self.failing.push(operation);
        self
    }

    pub fn respond(mut self, endpoint: u8, data: &[u8]) -> Self {
        self.responses.insert(endpoint, data.to_vec());
        self
    }

    fn check(&self, operation: Operation) -> Result<(), TransferError> {
        if self.failing.contains(&operation) {
            return Err(TransferError::UsbError(rusb::Error::Io));
        }
        Ok(())
    }
}

impl ExecutableDevice for MockDevice {
    fn control_transfer(&mut self, request: &ControlRequest) -> Result<Vec<u8>, TransferError> {
        self.calls.push(Call::Control(request.clone()));
        self.check(Operation::Control)?;

        Ok(match request.data {
            ControlData::In(length) => vec![0x12; length as usize],
            ControlData::Out(_) => vec![],
        })
    }

    fn write_endpoint(&mut self, endpoint: u8, data: &[u8]) -> Result<usize, TransferError> {
        self.calls.push(Call::Write(endpoint, data.to_vec()));
        self.check(Operation::Write)?;
        Ok(data.len())
    }

    fn read_endpoint(&mut self, endpoint: u8, length: usize) -> Result<Vec<u8>, TransferError> {
        self.calls.push(Call::Read(endpoint, length));
        self.check(Operation::Read)?;

        let mut response = self.responses.get(&endpoint).cloned().unwrap_or_default();
        response.truncate(length);
        Ok(response)
    }

    fn read_serial_number(&mut self) -> Result<Option<String>, TransferError> {
        self.calls.push(Call::SerialNumber);
        self.check(Operation::Strings)?;
        Ok(Some(String::from("0123456789")))
    }

    fn read_manufacturer(&mut self) -> Result<Option<String>, TransferError> {
        self.calls.push(Call::Manufacturer);
        self.check(Operation::Strings)?;
        Ok(None)
    }
}

impl MakerModeCommands for MockDevice {}

thread_local! {
    static CAPTURED: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

// Tests run on their own threads, so each one only ever sees its own lines.
struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        CAPTURED.with(|lines| {
            lines
                .borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INSTALL: Once = Once::new();

/// Starts capturing log output for the current test.
pub fn capture_logs() {
    INSTALL.call_once(|| {
        log::set_logger(&LOGGER).expect("Logger already installed");
        log::set_max_level(LevelFilter::Trace);
    });
    CAPTURED.with(|lines| lines.borrow_mut().clear());
}

/// Lines logged at `level` since `capture_logs` was called on this thread.
pub fn logged(level: Level) -> Vec<String> {
    CAPTURED.with(|lines| {
        lines
            .borrow()
            .iter()
            .filter(|(line_level, _)| *line_level == level)
            .map(|(_, line)| line.clone())
            .collect()
    })
}
