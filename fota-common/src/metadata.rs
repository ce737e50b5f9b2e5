// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Shared-metadata record: the application's self-description, written by
//! the application at boot and read (never fabricated) by the bootloader.
//!
//! Layout is fixed and packed so both sides agree on it without sharing a
//! build: `version`(4) + `padding`(8) + `app_size`(4) +
//! `firmware_signature`(16) + `crc`(4, reserved) + `padding`(8) +
//! `sentinel`(4) = 48 bytes.

/// Semantic-ish version tag the application reports for itself.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
    pub _padding: u8,
}

/// Marks a `SharedMetadata` record as having been written by an application,
/// as opposed to erased flash (all `0xFF`) or zeroed flash.
pub const SHARED_METADATA_SENTINEL: u32 = 0xDEAD_BEEF;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SharedMetadata {
    pub version: AppVersion,
    _reserved0: [u8; 8],
    pub app_size: u32,
    pub firmware_signature: [u8; 16],
    /// Reserved for a future integrity check; not verified today.
    pub crc: u32,
    _reserved1: [u8; 8],
    pub sentinel: u32,
}

const _: () = assert!(core::mem::size_of::<SharedMetadata>() == 48);

impl SharedMetadata {
    pub fn new(version: AppVersion, app_size: u32, firmware_signature: [u8; 16]) -> Self {
        Self {
            version,
            _reserved0: [0; 8],
            app_size,
            firmware_signature,
            crc: 0,
            _reserved1: [0; 8],
            sentinel: SHARED_METADATA_SENTINEL,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.sentinel == SHARED_METADATA_SENTINEL
    }

    /// Reads a `SharedMetadata` record from `addr` via volatile word reads.
    ///
    /// # Safety
    /// `addr` must point to a readable, naturally aligned 48-byte region for
    /// the duration of the call.
    pub unsafe fn read_from(addr: u32) -> Self {
        let ptr = addr as *const Self;
        core::ptr::read_volatile(ptr)
    }

    /// Writes this record to `addr` via a volatile word write. The target
    /// region must already be erased; this does not erase it.
    ///
    /// # Safety
    /// `addr` must point to a writable, naturally aligned, already-erased
    /// 48-byte region for the duration of the call.
    pub unsafe fn write_to(&self, addr: u32) {
        let ptr = addr as *mut Self;
        core::ptr::write_volatile(ptr, *self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_record_is_valid() {
        let md = SharedMetadata::new(
            AppVersion {
                major: 1,
                minor: 0,
                patch: 0,
                _padding: 0,
            },
            4096,
            [0; 16],
        );
        assert!(md.is_valid());
        assert_eq!(md.app_size, 4096);
    }

    #[test]
    fn garbage_sentinel_is_invalid() {
        let mut md = SharedMetadata::new(AppVersion::default(), 0, [0; 16]);
        md.sentinel = 0xFFFF_FFFF;
        assert!(!md.is_valid());
    }

    #[test]
    fn layout_is_forty_eight_bytes() {
        assert_eq!(core::mem::size_of::<SharedMetadata>(), 48);
    }
}
