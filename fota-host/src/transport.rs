// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Serial transport layer for bootloader communication.
//!
//! Outbound packets (host -> device) carry the four-byte frame preamble;
//! inbound responses (device -> host) do not, per the reference device's
//! asymmetric framing (see `fota_common::config::RESPONSES_INCLUDE_PREAMBLE`).
//! Both directions send only `length` meaningful payload bytes, never the
//! full 16-byte backing array.

use anyhow::{bail, Context, Result};
use serialport::SerialPort;
use std::io::{Read, Write};
use std::time::Duration;

use fota_common::protocol::Packet;

/// Default timeout for serial operations in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// UART transport for communicating with the bootloader.
pub struct Transport {
    port: Box<dyn SerialPort>,
}

impl Transport {
    /// Create a new transport connection to the specified serial port.
    pub fn new(port_name: &str) -> Result<Self> {
        Self::with_timeout(port_name, DEFAULT_TIMEOUT_MS)
    }

    /// Create a new transport connection with a custom timeout.
    pub fn with_timeout(port_name: &str, timeout_ms: u64) -> Result<Self> {
        let port = serialport::new(port_name, 115200)
            .timeout(Duration::from_millis(timeout_ms))
            .open()
            .with_context(|| format!("Failed to open serial port {}", port_name))?;

        Ok(Self { port })
    }

    /// Get the port name.
    pub fn port_name(&self) -> String {
        self.port.name().unwrap_or_else(|| "?".to_string())
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(1) => Ok(byte[0]),
            Ok(_) => bail!("Serial port closed unexpectedly"),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                bail!("Timeout waiting for response")
            }
            Err(e) => bail!("Serial read error: {}", e),
        }
    }

    fn drain_rx(&mut self) {
        let mut buf = [0u8; 64];
        let old_timeout = self.port.timeout();
        let _ = self.port.set_timeout(Duration::from_millis(10));
        while self.port.read(&mut buf).unwrap_or(0) > 0 {}
        let _ = self.port.set_timeout(old_timeout);
    }

    /// Send a packet, preamble included.
    pub fn send(&mut self, packet: &Packet) -> Result<()> {
        let mut buf = Vec::with_capacity(32);
        packet.write_into(|b| buf.push(b), true);
        self.port
            .write_all(&buf)
            .map_err(|e| anyhow::anyhow!("Failed to write to serial port: {}", e))?;
        self.port.flush()?;
        Ok(())
    }

    /// Receive a response: `id(1) length(1) payload(length) crc(4,LE)`, no
    /// preamble.
    pub fn receive(&mut self) -> Result<Packet> {
        let command_id = self.read_byte()?;
        let length = self.read_byte()?;

        let mut payload = [0xFFu8; fota_common::config::MAX_PAYLOAD_SIZE];
        let n = (length as usize).min(payload.len());
        for slot in payload.iter_mut().take(n) {
            *slot = self.read_byte()?;
        }
        // A malformed length longer than capacity still has to be drained
        // off the wire so the next read starts aligned on the next packet.
        for _ in n..length as usize {
            self.read_byte()?;
        }

        let mut crc = 0u32;
        for i in 0..4 {
            crc |= (self.read_byte()? as u32) << (8 * i);
        }

        let packet = Packet {
            command_id,
            length,
            payload,
            crc,
        };
        if !packet.crc_is_valid() {
            bail!("Response failed CRC check (id=0x{:02x})", command_id);
        }
        Ok(packet)
    }

    /// Send a packet and wait for the response.
    pub fn send_recv(&mut self, packet: &Packet) -> Result<Packet> {
        self.drain_rx();
        self.send(packet)?;
        self.receive()
    }

    /// Send a packet and wait for the response with a custom timeout.
    pub fn send_recv_timeout(&mut self, packet: &Packet, timeout_ms: u64) -> Result<Packet> {
        let old_timeout = self.port.timeout();
        self.port
            .set_timeout(Duration::from_millis(timeout_ms))
            .map_err(|e| anyhow::anyhow!("Failed to set timeout: {}", e))?;

        let result = self.send_recv(packet);

        let _ = self.port.set_timeout(old_timeout);
        result
    }
}
