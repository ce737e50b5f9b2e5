// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Board and protocol configuration constants.
//!
//! Everything that the original C reference scattered across linker symbols
//! and `#define`s lives here instead, including the two choices the spec
//! leaves as open questions (boot-select polarity, response framing).

/// Base address of the device's memory-mapped flash.
pub const FLASH_BASE: u32 = 0x1000_0000;

/// Size of the bootloader's own code region. Never erased or programmed by
/// the update engine.
pub const BOOTLOADER_SIZE: u32 = 64 * 1024;

/// Size of the shared-metadata region (one flash page on the reference
/// device).
pub const SHARED_SIZE: u32 = 2 * 1024;

/// Number of flash pages reserved for the application image.
pub const APP_REGION_PAGES: u32 = 128;

/// Flash programming/erase granule.
pub const FLASH_PAGE_SIZE: u32 = 2 * 1024;

/// Start of the shared-metadata + application region (erased as a unit by
/// `FW_SEND_BIN_SIZE`).
pub const FOTA_SHARED_START: u32 = FLASH_BASE + BOOTLOADER_SIZE;

/// Size of the application region in bytes.
pub const APP_REGION_SIZE: u32 = APP_REGION_PAGES * FLASH_PAGE_SIZE;

/// Start of the application image proper, after the shared-metadata page.
pub const FOTA_APP_START: u32 = FOTA_SHARED_START + SHARED_SIZE;

/// Address of the shared-metadata record. Aliases `FOTA_SHARED_START`.
pub const SHARED_METADATA_ADDR: u32 = FOTA_SHARED_START;

/// Total pages erased by a single `erase_region` call covering shared
/// metadata + application (reference device: 1 + 128).
pub const ERASE_REGION_PAGES: u32 = 1 + APP_REGION_PAGES;

/// Number of SysTick-equivalent timer ticks the bootloader waits at boot
/// before sampling the boot-select input.
pub const STARTUP_GRACE_TICKS: u8 = 3;

/// Bounded timeout, in milliseconds, for a single blocking serial transmit.
pub const SERIAL_TX_TIMEOUT_MS: u32 = 100;

/// Bootloader's own reported version (major, minor, patch).
pub const BOOTLOADER_VERSION: (u8, u8, u8) = (1, 2, 3);

/// Resolves the boot-select polarity Open Question: the spec standardizes on
/// "pressed = enter update". Flip this one constant for boards wired the
/// other way.
pub const BOOT_SELECT_PRESSED_ENTERS_UPDATE: bool = true;

/// Resolves the response-framing Open Question: the reference device does
/// not prefix response packets with the preamble, only inbound commands
/// require it. Kept `false` to preserve that asymmetry; flipping it is a
/// wire-format break and must be paired with a host-side change.
pub const RESPONSES_INCLUDE_PREAMBLE: bool = false;

/// Maximum number of bytes in a packet payload.
pub const MAX_PAYLOAD_SIZE: usize = 16;

/// Four-byte frame preamble that precedes every inbound packet.
pub const FRAME_PREAMBLE: [u8; 4] = [0xA5, 0xAA, 0xBB, 0xA5];

/// Board identifier reported by `GET_CHIP_ID` and checked by
/// `FW_VERIFY_DEVICE_ID`. The reference device reads this from a debug
/// register at runtime; this crate targets one board family so it is a
/// constant here instead.
pub const DEVICE_CHIP_ID: u16 = 0x2040;
