// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Wire-level packet format shared by the bootloader and the host tool.
//!
//! A packet is `[preamble(4)] id(1) length(1) payload(length, <=16) crc(4,LE)`.
//! The preamble only appears on packets sent host -> device; device
//! responses omit it (see [`crate::config::RESPONSES_INCLUDE_PREAMBLE`]).

use crate::config::{FRAME_PREAMBLE, MAX_PAYLOAD_SIZE};
use crate::crc::packet_crc32;

/// Command identifiers accepted by the bootloader. Closed set: anything not
/// listed here is an unrecognized command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandId {
    RetransmitLastToClient = 0xB0,
    GetBootloaderVersion = 0xB1,
    GetAppVersion = 0xB2,
    GetChipId = 0xB3,
    FwSync = 0xB4,
    FwVerifyDeviceId = 0xB5,
    FwSendBinSize = 0xB6,
    FwSendBinInPackets = 0xB7,
}

impl CommandId {
    pub fn from_u8(raw: u8) -> Option<Self> {
        Some(match raw {
            0xB0 => Self::RetransmitLastToClient,
            0xB1 => Self::GetBootloaderVersion,
            0xB2 => Self::GetAppVersion,
            0xB3 => Self::GetChipId,
            0xB4 => Self::FwSync,
            0xB5 => Self::FwVerifyDeviceId,
            0xB6 => Self::FwSendBinSize,
            0xB7 => Self::FwSendBinInPackets,
            _ => return None,
        })
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// True for the commands that belong to the firmware-update admission
    /// window (`FW_SYNC ..= FW_SEND_BIN_IN_PACKETS`).
    pub fn in_firmware_update_range(raw: u8) -> bool {
        raw >= Self::FwSync.as_u8() && raw <= Self::FwSendBinInPackets.as_u8()
    }
}

/// Response codes a handler may ask the transport layer to send back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponseCode {
    Ack = 0xE0,
    Nack = 0xE1,
    Retransmit = 0xE2,
}

impl ResponseCode {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(raw: u8) -> Option<Self> {
        Some(match raw {
            x if x == Self::Ack.as_u8() => Self::Ack,
            x if x == Self::Nack.as_u8() => Self::Nack,
            x if x == Self::Retransmit.as_u8() => Self::Retransmit,
            _ => return None,
        })
    }
}

/// NACK payload byte for an unrecognized command id.
pub const ERROR_INVALID_COMMAND: u8 = 0x11;

/// A single framed packet, host<->device, in either direction.
///
/// `payload` is always 16 bytes wide; only `payload[..payload_len()]` is
/// meaningful. `length` is stored as received so a malformed (>16) value is
/// preserved for CRC checking rather than silently clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    pub command_id: u8,
    pub length: u8,
    pub payload: [u8; MAX_PAYLOAD_SIZE],
    pub crc: u32,
}

impl Packet {
    pub const EMPTY: Packet = Packet {
        command_id: 0,
        length: 0,
        payload: [0xFF; MAX_PAYLOAD_SIZE],
        crc: 0,
    };

    pub fn new(command_id: u8, data: &[u8]) -> Self {
        let mut payload = [0xFF; MAX_PAYLOAD_SIZE];
        let n = data.len().min(MAX_PAYLOAD_SIZE);
        payload[..n].copy_from_slice(&data[..n]);
        let mut packet = Packet {
            command_id,
            length: data.len() as u8,
            payload,
            crc: 0,
        };
        packet.crc = packet.compute_crc();
        packet
    }

    /// Number of payload bytes actually backed by storage. A `length` field
    /// greater than the payload capacity (malformed/adversarial) is clamped
    /// here purely for safe indexing; the raw `length` still feeds the CRC
    /// check, so such a packet fails verification rather than panicking.
    pub fn payload_len(&self) -> usize {
        (self.length as usize).min(MAX_PAYLOAD_SIZE)
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.payload_len()]
    }

    /// CRC-32/MPEG-2 over `[command_id, length, payload[..length]]`.
    pub fn compute_crc(&self) -> u32 {
        packet_crc32(self.command_id, self.length, self.payload())
    }

    pub fn crc_is_valid(&self) -> bool {
        self.crc == self.compute_crc()
    }

    /// Serializes this packet byte-by-byte via `sink`, preamble optional.
    /// Only `payload_len()` bytes are ever written, never the full 16-byte
    /// backing array, matching what [`crate::packet_codec::PacketCodec`]
    /// expects on the receiving end.
    pub fn write_into(&self, mut sink: impl FnMut(u8), include_preamble: bool) {
        if include_preamble {
            for b in FRAME_PREAMBLE {
                sink(b);
            }
        }
        sink(self.command_id);
        sink(self.length);
        for &b in self.payload() {
            sink(b);
        }
        for b in self.crc.to_le_bytes() {
            sink(b);
        }
    }
}
