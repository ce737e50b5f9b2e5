// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Top-level packet dispatch: receives a validated (or rejected) packet from
//! [`crate::packet_codec::PacketCodec`], drives it through the
//! firmware-update admission sequencer, and routes admitted commands to
//! [`crate::commands`].
//!
//! Generic over [`FlashProgrammer`] and therefore hardware-independent: the
//! RP2040 binary supplies its ROM-call implementation, unit tests supply an
//! in-memory one.

use crate::commands;
use crate::packet_controller::{FlashProgrammer, PacketController};
use crate::protocol::{CommandId, Packet, ResponseCode, ERROR_INVALID_COMMAND};
use crate::update_fsm::FirmwareUpdateState;

/// Owns everything a command handler can touch: the packet controller, the
/// flash programmer, the admission sequencer, and the cache of the last
/// transmitted response (for `RETRANSMIT_LAST_TO_CLIENT`).
pub struct Bootloader<F: FlashProgrammer> {
    pub flash: F,
    update: FirmwareUpdateState,
    controller: PacketController,
    last_sent: Packet,
}

impl<F: FlashProgrammer> Bootloader<F> {
    pub fn new(flash: F) -> Self {
        Self {
            flash,
            update: FirmwareUpdateState::new(),
            controller: PacketController::new(),
            last_sent: Packet::new(ResponseCode::Ack.as_u8(), &[]),
        }
    }

    /// A codec rejection (bad CRC): respond with a retransmit request and
    /// leave all other state untouched.
    pub fn handle_invalid_packet(&mut self) -> Packet {
        self.send(Packet::new(ResponseCode::Retransmit.as_u8(), &[]))
    }

    /// A codec-validated packet: route it through admission (for
    /// firmware-update commands) or straight to its handler.
    pub fn handle_valid_packet(&mut self, packet: Packet) -> Packet {
        if packet.command_id == CommandId::RetransmitLastToClient.as_u8() {
            return self.last_sent;
        }

        let response = if CommandId::in_firmware_update_range(packet.command_id) {
            if self.update.admit(packet.command_id) {
                let response = self.run_handler(packet);
                let finished = self.controller.is_finished();
                self.update.advance(finished);
                response
            } else {
                self.update.recover_if_broken();
                Packet::new(ResponseCode::Nack.as_u8(), &[ERROR_INVALID_COMMAND])
            }
        } else {
            self.run_handler(packet)
        };

        self.send(response)
    }

    fn send(&mut self, response: Packet) -> Packet {
        self.last_sent = response;
        response
    }

    fn run_handler(&mut self, packet: Packet) -> Packet {
        let Some(command) = CommandId::from_u8(packet.command_id) else {
            return Packet::new(ResponseCode::Nack.as_u8(), &[ERROR_INVALID_COMMAND]);
        };

        match command {
            CommandId::RetransmitLastToClient => self.last_sent,
            CommandId::GetBootloaderVersion => commands::get_bootloader_version(),
            CommandId::GetAppVersion => commands::get_app_version(),
            CommandId::GetChipId => commands::get_chip_id(),
            CommandId::FwSync => commands::fw_sync(),
            CommandId::FwVerifyDeviceId => commands::fw_verify_device_id(packet.payload()),
            CommandId::FwSendBinSize => {
                commands::fw_send_bin_size(packet.payload(), &mut self.controller, &mut self.flash)
            }
            CommandId::FwSendBinInPackets => commands::fw_send_bin_in_packets(
                packet.payload(),
                &mut self.controller,
                &mut self.flash,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEVICE_CHIP_ID;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct MockFlash {
        words: BTreeMap<u32, [u8; 8]>,
    }

    impl FlashProgrammer for MockFlash {
        type Error = ();

        fn erase_region(&mut self, _start_addr: u32, _page_count: u32) -> Result<(), ()> {
            Ok(())
        }

        fn program_dword(&mut self, addr: u32, dword: [u8; 8]) -> Result<(), ()> {
            self.words.insert(addr, dword);
            Ok(())
        }
    }

    #[test]
    fn unrecognized_command_is_nacked() {
        let mut bl = Bootloader::new(MockFlash::default());
        let packet = Packet::new(0x42, &[]);
        let response = bl.handle_valid_packet(packet);
        assert_eq!(response.command_id, ResponseCode::Nack.as_u8());
        assert_eq!(response.payload(), &[ERROR_INVALID_COMMAND]);
    }

    #[test]
    fn out_of_order_update_command_is_rejected_without_running() {
        let mut bl = Bootloader::new(MockFlash::default());
        let packet = Packet::new(CommandId::FwSendBinSize.as_u8(), &4u32.to_le_bytes());
        let response = bl.handle_valid_packet(packet);
        assert_eq!(response.command_id, ResponseCode::Nack.as_u8());
    }

    #[test]
    fn retransmit_returns_the_last_sent_packet_verbatim() {
        let mut bl = Bootloader::new(MockFlash::default());
        let first = bl.handle_valid_packet(Packet::new(CommandId::GetChipId.as_u8(), &[]));
        let retransmit = bl.handle_valid_packet(Packet::new(
            CommandId::RetransmitLastToClient.as_u8(),
            &[],
        ));
        assert_eq!(retransmit, first);
    }

    #[test]
    fn invalid_packet_requests_retransmit() {
        let mut bl = Bootloader::new(MockFlash::default());
        let response = bl.handle_invalid_packet();
        assert_eq!(response.command_id, ResponseCode::Retransmit.as_u8());
    }

    #[test]
    fn full_sequence_flashes_and_completes() {
        let mut bl = Bootloader::new(MockFlash::default());
        bl.handle_valid_packet(Packet::new(CommandId::FwSync.as_u8(), &[]));
        bl.handle_valid_packet(Packet::new(
            CommandId::FwVerifyDeviceId.as_u8(),
            &DEVICE_CHIP_ID.to_le_bytes(),
        ));
        bl.handle_valid_packet(Packet::new(
            CommandId::FwSendBinSize.as_u8(),
            &16u32.to_le_bytes(),
        ));
        let response = bl.handle_valid_packet(Packet::new(
            CommandId::FwSendBinInPackets.as_u8(),
            &[0xAA; 16],
        ));
        assert_eq!(response.command_id, ResponseCode::Ack.as_u8());
        assert!(bl.controller.is_finished());
    }
}
