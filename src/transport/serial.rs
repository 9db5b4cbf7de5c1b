//! Serial/USB transport implementation.
//!
//! This module provides serial port communication for gamebot peripherals
//! attached through a USB-to-UART adapter.

use std::io;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{ClearBuffer, SerialPort, SerialPortBuilderExt, SerialStream};

use crate::error::{Error, Result};
use crate::transport::{Transport, TransportFuture};

/// Default serial device.
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// Default baud rate for gamebot peripherals.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default delay between opening the port and clearing its buffers.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Configuration for serial transport.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Serial port path (e.g., "/dev/ttyUSB0" or "COM3").
    pub port: String,
    /// Baud rate.
    pub baud_rate: u32,
    /// Delay after opening, giving the peripheral time to get ready.
    pub settle_delay: Duration,
}

impl SerialConfig {
    /// Creates a new serial configuration with default settings.
    #[must_use]
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Sets the baud rate.
    #[must_use]
    pub const fn baud_rate(mut self, rate: u32) -> Self {
        self.baud_rate = rate;
        self
    }

    /// Sets the settle delay.
    #[must_use]
    pub const fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PORT)
    }
}

/// Serial transport for gamebot communication.
pub struct SerialTransport {
    config: SerialConfig,
    stream: Option<SerialStream>,
}

impl SerialTransport {
    /// Creates a new serial transport with the given configuration.
    #[must_use]
    pub const fn new(config: SerialConfig) -> Self {
        Self {
            config,
            stream: None,
        }
    }

    /// Creates a new serial transport for the given port with default settings.
    #[must_use]
    pub fn with_port(port: impl Into<String>) -> Self {
        Self::new(SerialConfig::new(port))
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &SerialConfig {
        &self.config
    }

    fn stream(&self) -> Result<&SerialStream> {
        self.stream.as_ref().ok_or(Error::NotConnected)
    }
}

impl Transport for SerialTransport {
    fn connect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if self.stream.is_some() {
                return Ok(());
            }

            tracing::info!(
                "opening serial port {} at {} baud",
                self.config.port,
                self.config.baud_rate
            );

            let stream = tokio_serial::new(&self.config.port, self.config.baud_rate)
                .open_native_async()
                .map_err(Error::Serial)?;

            // Wait for device to be ready
            tokio::time::sleep(self.config.settle_delay).await;

            self.stream = Some(stream);
            tracing::info!("serial port open");
            Ok(())
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if self.stream.take().is_some() {
                tracing::info!("closing serial port {}", self.config.port);
            }
            Ok(())
        })
    }

    fn write(&mut self, data: Bytes) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
            stream.write_all(&data).await.map_err(Error::Io)?;
            stream.flush().await.map_err(Error::Io)?;
            Ok(())
        })
    }

    fn read<'a>(&'a mut self, buf: &'a mut [u8]) -> TransportFuture<'a, usize> {
        Box::pin(async move {
            let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
            match stream.read(buf).await {
                Ok(n) => Ok(n),
                Err(e) => {
                    tracing::error!("serial read error: {}", e);
                    Err(Error::Io(e))
                }
            }
        })
    }

    fn bytes_available(&self) -> Result<usize> {
        let n = self.stream()?.bytes_to_read().map_err(Error::Serial)?;
        usize::try_from(n).map_err(|e| Error::Io(io::Error::other(e)))
    }

    fn reset_input_buffer(&mut self) -> Result<()> {
        self.stream()?
            .clear(ClearBuffer::Input)
            .map_err(Error::Serial)
    }

    fn reset_output_buffer(&mut self) -> Result<()> {
        self.stream()?
            .clear(ClearBuffer::Output)
            .map_err(Error::Serial)
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

/// Lists available serial ports.
///
/// # Errors
///
/// Returns an error if the port list cannot be retrieved.
pub fn list_ports() -> Result<Vec<String>> {
    let ports = tokio_serial::available_ports().map_err(Error::Serial)?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
