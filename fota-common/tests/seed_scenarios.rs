// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! End-to-end scenarios exercising the packet codec, admission sequencer
//! and packet controller together, the way a real transfer drives them.

use fota_common::config::{FOTA_SHARED_START, FRAME_PREAMBLE};
use fota_common::packet_codec::{CodecOutcome, PacketCodec};
use fota_common::packet_controller::{FlashProgrammer, PacketController};
use fota_common::protocol::{CommandId, Packet};
use fota_common::update_fsm::FirmwareUpdateState;
use std::collections::BTreeMap;

#[derive(Default)]
struct MockFlash {
    words: BTreeMap<u32, [u8; 8]>,
}

impl FlashProgrammer for MockFlash {
    type Error = ();

    fn erase_region(&mut self, _start_addr: u32, _page_count: u32) -> Result<(), ()> {
        self.words.clear();
        Ok(())
    }

    fn program_dword(&mut self, addr: u32, dword: [u8; 8]) -> Result<(), ()> {
        self.words.insert(addr, dword);
        Ok(())
    }
}

fn framed_bytes(packet: &Packet) -> Vec<u8> {
    let mut bytes = FRAME_PREAMBLE.to_vec();
    bytes.push(packet.command_id);
    bytes.push(packet.length);
    bytes.extend_from_slice(packet.payload());
    bytes.extend_from_slice(&packet.crc.to_le_bytes());
    bytes
}

fn decode_one(codec: &mut PacketCodec, bytes: &[u8]) -> CodecOutcome {
    let mut last = CodecOutcome::Pending;
    for &b in bytes {
        last = codec.feed(b);
    }
    last
}

/// A full two-packet firmware transfer: SYNC, VERIFY_DEVICE_ID,
/// SEND_BIN_SIZE, then two SEND_BIN_IN_PACKETS, admitted in strict order and
/// landing 32 bytes in flash.
#[test]
fn full_update_sequence_is_admitted_and_flashed() {
    let mut codec = PacketCodec::new();
    let mut update = FirmwareUpdateState::new();
    let mut controller = PacketController::new();
    let mut flash = MockFlash::default();

    let sync = Packet::new(CommandId::FwSync.as_u8(), &[]);
    assert!(matches!(
        decode_one(&mut codec, &framed_bytes(&sync)),
        CodecOutcome::PacketValid(_)
    ));
    assert!(update.admit(sync.command_id));
    update.advance(false);

    let verify = Packet::new(CommandId::FwVerifyDeviceId.as_u8(), &[0x01, 0x02]);
    assert!(matches!(
        decode_one(&mut codec, &framed_bytes(&verify)),
        CodecOutcome::PacketValid(_)
    ));
    assert!(update.admit(verify.command_id));
    update.advance(false);

    let fw_size: u32 = 32;
    let size_pkt = Packet::new(CommandId::FwSendBinSize.as_u8(), &fw_size.to_le_bytes());
    assert!(matches!(
        decode_one(&mut codec, &framed_bytes(&size_pkt)),
        CodecOutcome::PacketValid(_)
    ));
    assert!(update.admit(size_pkt.command_id));
    update.advance(false);
    controller.begin(fw_size, &mut flash).unwrap();

    for chunk in [[1u8; 16], [2u8; 16]] {
        let data_pkt = Packet::new(CommandId::FwSendBinInPackets.as_u8(), &chunk);
        assert!(matches!(
            decode_one(&mut codec, &framed_bytes(&data_pkt)),
            CodecOutcome::PacketValid(_)
        ));
        assert!(update.admit(data_pkt.command_id));
        controller
            .write_packet(data_pkt.payload(), &mut flash)
            .unwrap();
        update.advance(controller.is_finished());
    }

    assert!(controller.is_finished());
    assert_eq!(controller.current_flash_address(), FOTA_SHARED_START + 32);
    assert_eq!(flash.words.len(), 4);
}

/// An out-of-order command (verify before sync) is rejected by the
/// sequencer even though the packet itself is well-formed.
#[test]
fn out_of_order_data_packet_is_rejected_before_sync() {
    let mut update = FirmwareUpdateState::new();
    assert!(!update.admit(CommandId::FwSendBinInPackets.as_u8()));
    assert!(!update.started());
}

/// A corrupted frame (bit flip in the payload after the CRC was computed)
/// is caught by the codec and never reaches the sequencer.
#[test]
fn corrupted_frame_never_reaches_the_sequencer() {
    let mut codec = PacketCodec::new();
    let packet = Packet::new(CommandId::FwVerifyDeviceId.as_u8(), &[1, 2]);
    let mut bytes = framed_bytes(&packet);
    let payload_idx = FRAME_PREAMBLE.len() + 2; // skip preamble + id + length
    bytes[payload_idx] ^= 0xFF;

    assert_eq!(decode_one(&mut codec, &bytes), CodecOutcome::PacketInvalid);
}
