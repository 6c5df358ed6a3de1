//! Field-bus access: the read capability consumed by meter drivers, and its
//! Modbus RTU implementation for an RS-485 serial line.

use async_trait::async_trait;
use thiserror::Error;
use tokio_modbus::client::rtu;
use tokio_modbus::prelude::*;
use tokio_serial::SerialStream;
use tracing::info;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("serial port unavailable: {0}")]
    Serial(String),
    #[error("modbus transport failed: {0}")]
    Transport(String),
    #[error("modbus exception: {0}")]
    Exception(String),
    #[error("short register response: expected {expected} registers, got {got}")]
    ShortResponse { expected: usize, got: usize },
}

/// Reads one numeric value from a device on the shared field bus.
#[async_trait]
pub trait RegisterBus: Send {
    async fn read_value(&mut self, register: u16, device: u8) -> Result<f32, BusError>;
}

/// Modbus RTU client for the shared RS-485 line all meters hang off.
///
/// The port is opened lazily on the first read and reopened after a
/// transport error, so a flaky adapter degrades to stale readings instead of
/// taking the polling loop down.
pub struct SerialRegisterBus {
    path: String,
    baud_rate: u32,
    connection: Option<client::Context>,
}

impl SerialRegisterBus {
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
            connection: None,
        }
    }

    fn ensure_connected(&mut self) -> Result<&mut client::Context, BusError> {
        if self.connection.is_none() {
            info!("opening serial port {} at {} baud", self.path, self.baud_rate);
            let builder = tokio_serial::new(&self.path, self.baud_rate);
            let port =
                SerialStream::open(&builder).map_err(|err| BusError::Serial(err.to_string()))?;
            self.connection = Some(rtu::attach(port));
        }
        Ok(self
            .connection
            .as_mut()
            .expect("serial connection just opened"))
    }
}

#[async_trait]
impl RegisterBus for SerialRegisterBus {
    async fn read_value(&mut self, register: u16, device: u8) -> Result<f32, BusError> {
        let connection = self.ensure_connected()?;
        connection.set_slave(Slave(device));

        // tokio-modbus surfaces protocol errors as an inner result
        let words = match connection.read_input_registers(register, 2).await {
            Ok(Ok(words)) => words,
            Ok(Err(exception)) => return Err(BusError::Exception(format!("{exception:?}"))),
            Err(err) => {
                // Drop the port so the next read reopens it
                self.connection = None;
                return Err(BusError::Transport(format!("{err:?}")));
            }
        };

        if words.len() < 2 {
            return Err(BusError::ShortResponse {
                expected: 2,
                got: words.len(),
            });
        }
        Ok(merge_registers_f32(words[0], words[1]))
    }
}

/// Merges two 16-bit registers into an IEEE-754 float. SDM meters transmit
/// the high word first.
pub fn merge_registers_f32(high: u16, low: u16) -> f32 {
    let combined: u32 = ((high as u32) << 16) | low as u32;
    f32::from_bits(combined)
}
