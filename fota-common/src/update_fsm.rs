// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Firmware-update command admission sequencer.
//!
//! Enforces that `FW_SYNC`, `FW_VERIFY_DEVICE_ID`, `FW_SEND_BIN_SIZE` and
//! `FW_SEND_BIN_IN_PACKETS` (repeated) arrive in exactly that order. Any
//! command outside the firmware-update id range is ignored by this
//! sequencer entirely (it's handled elsewhere); an in-range command that
//! arrives out of order breaks the sequence and forces a restart at
//! `FW_SYNC`.
//!
//! This is plain data plus plain functions: no interrupts, no hardware, one
//! field (`started`/`next_expected_id`/`cmd_seq_broken`) per concern, fully
//! exercisable from a unit test.

use crate::protocol::CommandId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareUpdateState {
    started: bool,
    next_expected_id: u8,
    cmd_seq_broken: bool,
}

impl FirmwareUpdateState {
    pub const fn new() -> Self {
        Self {
            started: false,
            next_expected_id: CommandId::FwSync.as_u8(),
            cmd_seq_broken: false,
        }
    }

    pub fn cmd_seq_broken(&self) -> bool {
        self.cmd_seq_broken
    }

    pub fn started(&self) -> bool {
        self.started
    }

    /// Decides whether `id` is admitted into the update sequence.
    ///
    /// Mirrors the reference admission table: commands outside the
    /// firmware-update range are never admitted; the first admitted command
    /// must be `FW_SYNC`; every later command must match
    /// `next_expected_id` or the sequence breaks.
    pub fn admit(&mut self, id: u8) -> bool {
        if !CommandId::in_firmware_update_range(id) {
            return false;
        }

        if self.started {
            if self.next_expected_id == id {
                self.cmd_seq_broken = false;
                true
            } else {
                self.cmd_seq_broken = true;
                self.started = false;
                false
            }
        } else if id == CommandId::FwSync.as_u8() {
            self.started = true;
            self.cmd_seq_broken = false;
            true
        } else {
            false
        }
    }

    /// Called by the dispatcher whenever admission failed; restarts the
    /// sequence at `FW_SYNC` if the failure broke an in-progress sequence.
    pub fn recover_if_broken(&mut self) {
        if self.cmd_seq_broken {
            self.next_expected_id = CommandId::FwSync.as_u8();
            self.started = false;
            self.cmd_seq_broken = false;
        }
    }

    /// Advances `next_expected_id` after an admitted command has been
    /// handled. `app_flash_finished` decides whether a completed
    /// `FW_SEND_BIN_IN_PACKETS` loops (more packets remain) or the transfer
    /// is complete and the sequence resets to `FW_SYNC` for the next one.
    pub fn advance(&mut self, app_flash_finished: bool) {
        use CommandId::*;
        self.next_expected_id = if self.next_expected_id == FwSync.as_u8() {
            FwVerifyDeviceId.as_u8()
        } else if self.next_expected_id == FwVerifyDeviceId.as_u8() {
            FwSendBinSize.as_u8()
        } else if self.next_expected_id == FwSendBinSize.as_u8() {
            FwSendBinInPackets.as_u8()
        } else if self.next_expected_id == FwSendBinInPackets.as_u8() {
            if app_flash_finished {
                FwSync.as_u8()
            } else {
                FwSendBinInPackets.as_u8()
            }
        } else {
            FwSync.as_u8()
        };
    }
}

impl Default for FirmwareUpdateState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_command_is_never_admitted() {
        let mut fw = FirmwareUpdateState::new();
        assert!(!fw.admit(CommandId::GetChipId.as_u8()));
        assert!(!fw.started());
    }

    #[test]
    fn sequence_must_start_with_fw_sync() {
        let mut fw = FirmwareUpdateState::new();
        assert!(!fw.admit(CommandId::FwVerifyDeviceId.as_u8()));
        assert!(fw.admit(CommandId::FwSync.as_u8()));
        assert!(fw.started());
    }

    #[test]
    fn full_happy_path_sequence() {
        let mut fw = FirmwareUpdateState::new();
        assert!(fw.admit(CommandId::FwSync.as_u8()));
        fw.advance(false);
        assert!(fw.admit(CommandId::FwVerifyDeviceId.as_u8()));
        fw.advance(false);
        assert!(fw.admit(CommandId::FwSendBinSize.as_u8()));
        fw.advance(false);
        assert!(fw.admit(CommandId::FwSendBinInPackets.as_u8()));
        fw.advance(false);
        assert!(fw.admit(CommandId::FwSendBinInPackets.as_u8()));
    }

    #[test]
    fn out_of_order_command_breaks_sequence_and_recovers() {
        let mut fw = FirmwareUpdateState::new();
        assert!(fw.admit(CommandId::FwSync.as_u8()));
        fw.advance(false);
        // Skip FW_VERIFY_DEVICE_ID straight to FW_SEND_BIN_SIZE.
        assert!(!fw.admit(CommandId::FwSendBinSize.as_u8()));
        assert!(fw.cmd_seq_broken());
        fw.recover_if_broken();
        assert!(!fw.started());
        assert!(fw.admit(CommandId::FwSync.as_u8()));
    }

    #[test]
    fn finished_transfer_resets_to_fw_sync() {
        let mut fw = FirmwareUpdateState::new();
        fw.admit(CommandId::FwSync.as_u8());
        fw.advance(false);
        fw.admit(CommandId::FwVerifyDeviceId.as_u8());
        fw.advance(false);
        fw.admit(CommandId::FwSendBinSize.as_u8());
        fw.advance(false);
        fw.admit(CommandId::FwSendBinInPackets.as_u8());
        fw.advance(true);
        assert!(!fw.admit(CommandId::FwSendBinInPackets.as_u8()));
        assert!(fw.admit(CommandId::FwSync.as_u8()));
    }
}
