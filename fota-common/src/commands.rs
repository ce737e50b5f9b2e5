// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Individual command handlers: one function per [`CommandId`], called by
//! [`crate::dispatch::Bootloader`] once a command has cleared admission.
//!
//! Each handler only needs the slice of state it actually touches, not the
//! whole [`crate::dispatch::Bootloader`] — keeps every handler testable on
//! its own inputs, and mirrors the reference device's one-function-per-
//! command table without needing a runtime-indexed table: `CommandId` is a
//! closed, exhaustively-matched enum, so the compiler is the table.

use crate::config::{BOOTLOADER_VERSION, DEVICE_CHIP_ID, SHARED_METADATA_ADDR};
use crate::metadata::SharedMetadata;
use crate::packet_controller::{FlashProgrammer, PacketController};
use crate::protocol::{Packet, ResponseCode};

pub fn get_bootloader_version() -> Packet {
    let (major, minor, patch) = BOOTLOADER_VERSION;
    Packet::new(ResponseCode::Ack.as_u8(), &[major, minor, patch])
}

/// Reads the application's self-reported version from the shared-metadata
/// record. Reports `0.0.0` if the application never wrote one.
pub fn get_app_version() -> Packet {
    let metadata = unsafe { SharedMetadata::read_from(SHARED_METADATA_ADDR) };
    let payload = if metadata.is_valid() {
        [metadata.version.major, metadata.version.minor, metadata.version.patch]
    } else {
        [0, 0, 0]
    };
    Packet::new(ResponseCode::Ack.as_u8(), &payload)
}

pub fn get_chip_id() -> Packet {
    Packet::new(ResponseCode::Ack.as_u8(), &DEVICE_CHIP_ID.to_le_bytes())
}

pub fn fw_sync() -> Packet {
    Packet::new(ResponseCode::Ack.as_u8(), &[])
}

pub fn fw_verify_device_id(payload: &[u8]) -> Packet {
    let mut id_bytes = [0u8; 2];
    let n = 2.min(payload.len());
    id_bytes[..n].copy_from_slice(&payload[..n]);
    let requested = u16::from_le_bytes(id_bytes);
    let code = if requested == DEVICE_CHIP_ID {
        ResponseCode::Ack
    } else {
        ResponseCode::Nack
    };
    Packet::new(code.as_u8(), &[])
}

pub fn fw_send_bin_size<F: FlashProgrammer>(
    payload: &[u8],
    controller: &mut PacketController,
    flash: &mut F,
) -> Packet {
    let mut size_bytes = [0u8; 4];
    let n = 4.min(payload.len());
    size_bytes[..n].copy_from_slice(&payload[..n]);
    let fw_size = u32::from_le_bytes(size_bytes);

    match controller.begin(fw_size, flash) {
        Ok(()) => {
            let mut response = [0u8; 8];
            response[0..4].copy_from_slice(&controller.current_flash_address().to_le_bytes());
            response[4..8].copy_from_slice(&controller.total_packets().to_le_bytes());
            Packet::new(ResponseCode::Ack.as_u8(), &response)
        }
        Err(_) => Packet::new(ResponseCode::Nack.as_u8(), &[]),
    }
}

pub fn fw_send_bin_in_packets<F: FlashProgrammer>(
    payload: &[u8],
    controller: &mut PacketController,
    flash: &mut F,
) -> Packet {
    match controller.write_packet(payload, flash) {
        Ok(()) => {
            let mut response = [0u8; 8];
            response[0..4].copy_from_slice(&controller.current_flash_address().to_le_bytes());
            response[4..8].copy_from_slice(&controller.current_packet_number().to_le_bytes());
            Packet::new(ResponseCode::Ack.as_u8(), &response)
        }
        Err(_) => Packet::new(ResponseCode::Nack.as_u8(), &[]),
    }
}
