// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Tracks progress through a firmware transfer: total packet count, current
//! packet index, and the flash write cursor. Actual flash access is behind
//! [`FlashProgrammer`] so this module is testable against an in-memory mock.

use crate::config::{ERASE_REGION_PAGES, FOTA_SHARED_START, MAX_PAYLOAD_SIZE};

/// Capability needed to commit a firmware transfer to non-volatile storage.
///
/// Implementors operate in fixed-size units matching the target's flash
/// controller: erase is page-granular, programming is one double-word (8
/// bytes) at a time, matching the reference device's
/// `HAL_FLASH_Program(FLASH_TYPEPROGRAM_DOUBLEWORD, ...)` contract.
pub trait FlashProgrammer {
    type Error;

    /// Erases `page_count` pages starting at `start_addr`.
    fn erase_region(&mut self, start_addr: u32, page_count: u32) -> Result<(), Self::Error>;

    /// Programs one 8-byte double-word at `addr`. `addr` is always 8-byte
    /// aligned by the caller.
    fn program_dword(&mut self, addr: u32, dword: [u8; 8]) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketControllerError {
    /// Neither erased nor programmed since `init`; `send_bin` must run first.
    NotInitialized,
    /// All expected packets for this transfer have already been written.
    TransferComplete,
    /// The underlying flash programmer reported an error on this packet.
    FlashError,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PacketController {
    fw_size: u32,
    total_packets: u32,
    current_packet_number: u32,
    current_flash_address: u32,
    error_occurred: bool,
    initialized: bool,
}

impl PacketController {
    pub const fn new() -> Self {
        Self {
            fw_size: 0,
            total_packets: 0,
            current_packet_number: 0,
            current_flash_address: 0,
            error_occurred: false,
            initialized: false,
        }
    }

    /// Begins a new transfer of `fw_size` bytes, erasing the shared-metadata
    /// + application region as a unit before any packet is written.
    pub fn begin<F: FlashProgrammer>(
        &mut self,
        fw_size: u32,
        flash: &mut F,
    ) -> Result<(), F::Error> {
        flash.erase_region(FOTA_SHARED_START, ERASE_REGION_PAGES)?;
        self.fw_size = fw_size;
        self.total_packets = fw_size.div_ceil(MAX_PAYLOAD_SIZE as u32);
        self.current_packet_number = 0;
        self.current_flash_address = FOTA_SHARED_START;
        self.error_occurred = false;
        self.initialized = true;
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn is_finished(&self) -> bool {
        self.initialized && self.current_packet_number >= self.total_packets
    }

    pub fn total_packets(&self) -> u32 {
        self.total_packets
    }

    pub fn current_packet_number(&self) -> u32 {
        self.current_packet_number
    }

    pub fn current_flash_address(&self) -> u32 {
        self.current_flash_address
    }

    /// Programs one 16-byte packet payload as two double-words, advancing the
    /// flash cursor by 8 bytes per double-word regardless of how many bytes
    /// of the payload were meaningful (short payloads are padded with
    /// `0xFF`, matching flash's erased state).
    pub fn write_packet<F: FlashProgrammer>(
        &mut self,
        payload: &[u8],
        flash: &mut F,
    ) -> Result<(), PacketControllerError> {
        if !self.initialized {
            return Err(PacketControllerError::NotInitialized);
        }
        if self.is_finished() || self.error_occurred {
            return Err(PacketControllerError::TransferComplete);
        }

        let mut buffer = [0xFFu8; MAX_PAYLOAD_SIZE];
        let n = payload.len().min(MAX_PAYLOAD_SIZE);
        buffer[..n].copy_from_slice(&payload[..n]);

        let mut dw1 = [0u8; 8];
        let mut dw2 = [0u8; 8];
        dw1.copy_from_slice(&buffer[0..8]);
        dw2.copy_from_slice(&buffer[8..16]);

        let result: Result<(), F::Error> = (|| {
            flash.program_dword(self.current_flash_address, dw1)?;
            self.current_flash_address += 8;
            flash.program_dword(self.current_flash_address, dw2)?;
            self.current_flash_address += 8;
            Ok(())
        })();

        match result {
            Ok(()) => {
                self.current_packet_number += 1;
                self.error_occurred = false;
                Ok(())
            }
            Err(_) => {
                self.error_occurred = true;
                Err(PacketControllerError::FlashError)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct MockFlash {
        words: BTreeMap<u32, [u8; 8]>,
        erased: Vec<(u32, u32)>,
        fail_next: bool,
    }

    impl FlashProgrammer for MockFlash {
        type Error = ();

        fn erase_region(&mut self, start_addr: u32, page_count: u32) -> Result<(), ()> {
            self.erased.push((start_addr, page_count));
            Ok(())
        }

        fn program_dword(&mut self, addr: u32, dword: [u8; 8]) -> Result<(), ()> {
            if self.fail_next {
                self.fail_next = false;
                return Err(());
            }
            self.words.insert(addr, dword);
            Ok(())
        }
    }

    #[test]
    fn total_packets_rounds_up() {
        let mut pc = PacketController::new();
        let mut flash = MockFlash::default();
        pc.begin(33, &mut flash).unwrap();
        assert_eq!(pc.total_packets(), 3);
        assert_eq!(flash.erased, vec![(FOTA_SHARED_START, ERASE_REGION_PAGES)]);
    }

    #[test]
    fn writing_all_packets_marks_finished() {
        let mut pc = PacketController::new();
        let mut flash = MockFlash::default();
        pc.begin(16, &mut flash).unwrap();
        assert!(!pc.is_finished());
        pc.write_packet(&[0xAA; 16], &mut flash).unwrap();
        assert!(pc.is_finished());
        assert_eq!(pc.current_flash_address(), FOTA_SHARED_START + 16);
    }

    #[test]
    fn flash_error_surfaces_and_blocks_further_writes() {
        let mut pc = PacketController::new();
        let mut flash = MockFlash::default();
        pc.begin(16, &mut flash).unwrap();
        flash.fail_next = true;
        assert_eq!(
            pc.write_packet(&[0; 16], &mut flash),
            Err(PacketControllerError::FlashError)
        );
        assert_eq!(
            pc.write_packet(&[0; 16], &mut flash),
            Err(PacketControllerError::TransferComplete)
        );
    }

    #[test]
    fn uninitialized_controller_rejects_writes() {
        let mut pc = PacketController::new();
        let mut flash = MockFlash::default();
        assert_eq!(
            pc.write_packet(&[0; 16], &mut flash),
            Err(PacketControllerError::NotInitialized)
        );
    }
}
