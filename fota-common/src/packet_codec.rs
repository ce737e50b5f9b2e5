// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Byte-at-a-time packet reception state machine.
//!
//! Drives one byte through `Frame -> Id -> Length -> Payload? -> Crc`,
//! producing a [`CodecOutcome`] once a full packet has been framed and its
//! CRC checked. A `length` of zero skips straight from `Length` to `Crc`, a
//! payload longer than the buffer's capacity is accepted byte-for-byte (the
//! CRC step still runs) but only the first [`MAX_PAYLOAD_SIZE`] bytes are
//! retained, so a malformed frame fails CRC verification instead of
//! panicking.

use crate::config::{FRAME_PREAMBLE, MAX_PAYLOAD_SIZE};
use crate::protocol::Packet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodecState {
    Frame { matched: u8 },
    Id,
    Length,
    Payload { collected: u8 },
    Crc { collected: u8 },
}

/// Result of feeding one byte into the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecOutcome {
    /// More bytes needed before a packet is complete.
    Pending,
    /// A full packet was framed and its CRC matched.
    PacketValid(Packet),
    /// A full packet was framed but its CRC did not match.
    PacketInvalid,
}

pub struct PacketCodec {
    state: CodecState,
    temp: Packet,
}

impl PacketCodec {
    pub const fn new() -> Self {
        Self {
            state: CodecState::Frame { matched: 0 },
            temp: Packet::EMPTY,
        }
    }

    pub fn reset(&mut self) {
        self.state = CodecState::Frame { matched: 0 };
    }

    /// Feeds a single received byte into the state machine.
    pub fn feed(&mut self, byte: u8) -> CodecOutcome {
        match self.state {
            CodecState::Frame { matched } => {
                if byte == FRAME_PREAMBLE[matched as usize] {
                    let matched = matched + 1;
                    if matched as usize == FRAME_PREAMBLE.len() {
                        self.enter_id();
                    } else {
                        self.state = CodecState::Frame { matched };
                    }
                } else {
                    self.state = CodecState::Frame { matched: 0 };
                }
                CodecOutcome::Pending
            }
            CodecState::Id => {
                self.temp.command_id = byte;
                self.state = CodecState::Length;
                CodecOutcome::Pending
            }
            CodecState::Length => {
                if byte == 0 {
                    self.temp.length = 0;
                    self.enter_crc();
                } else {
                    self.temp.length = byte;
                    self.state = CodecState::Payload { collected: 0 };
                }
                CodecOutcome::Pending
            }
            CodecState::Payload { collected } => {
                if (collected as usize) < MAX_PAYLOAD_SIZE {
                    self.temp.payload[collected as usize] = byte;
                }
                let collected = collected + 1;
                if collected >= self.temp.length {
                    self.enter_crc();
                } else {
                    self.state = CodecState::Payload { collected };
                }
                CodecOutcome::Pending
            }
            CodecState::Crc { collected } => {
                self.temp.crc |= (byte as u32) << (8 * collected);
                let collected = collected + 1;
                if collected >= 4 {
                    let outcome = if self.temp.crc_is_valid() {
                        CodecOutcome::PacketValid(self.temp)
                    } else {
                        CodecOutcome::PacketInvalid
                    };
                    self.enter_id();
                    outcome
                } else {
                    self.state = CodecState::Crc { collected };
                    CodecOutcome::Pending
                }
            }
        }
    }

    fn enter_id(&mut self) {
        self.temp = Packet::EMPTY;
        self.state = CodecState::Id;
    }

    fn enter_crc(&mut self) {
        self.temp.crc = 0;
        self.state = CodecState::Crc { collected: 0 };
    }
}

impl Default for PacketCodec {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(codec: &mut PacketCodec, bytes: &[u8]) -> CodecOutcome {
        let mut last = CodecOutcome::Pending;
        for &b in bytes {
            last = codec.feed(b);
        }
        last
    }

    #[test]
    fn valid_zero_length_packet_round_trips() {
        let packet = Packet::new(0xB1, &[]);
        let mut bytes = FRAME_PREAMBLE.to_vec();
        bytes.push(packet.command_id);
        bytes.push(packet.length);
        bytes.extend_from_slice(&packet.crc.to_le_bytes());

        let mut codec = PacketCodec::new();
        match feed_all(&mut codec, &bytes) {
            CodecOutcome::PacketValid(p) => {
                assert_eq!(p.command_id, 0xB1);
                assert_eq!(p.length, 0);
            }
            other => panic!("expected PacketValid, got {other:?}"),
        }
    }

    #[test]
    fn valid_payload_packet_round_trips() {
        let payload = [1, 2, 3, 4, 5];
        let packet = Packet::new(0xB7, &payload);
        let mut bytes = FRAME_PREAMBLE.to_vec();
        bytes.push(packet.command_id);
        bytes.push(packet.length);
        bytes.extend_from_slice(&payload);
        bytes.extend_from_slice(&packet.crc.to_le_bytes());

        let mut codec = PacketCodec::new();
        match feed_all(&mut codec, &bytes) {
            CodecOutcome::PacketValid(p) => {
                assert_eq!(p.payload(), &payload);
            }
            other => panic!("expected PacketValid, got {other:?}"),
        }
    }

    #[test]
    fn corrupted_crc_is_reported_invalid() {
        let packet = Packet::new(0xB1, &[]);
        let mut bytes = FRAME_PREAMBLE.to_vec();
        bytes.push(packet.command_id);
        bytes.push(packet.length);
        bytes.extend_from_slice(&(packet.crc ^ 0xFFFF_FFFF).to_le_bytes());

        let mut codec = PacketCodec::new();
        assert_eq!(feed_all(&mut codec, &bytes), CodecOutcome::PacketInvalid);
    }

    #[test]
    fn preamble_restarts_on_mismatch_mid_sequence() {
        let packet = Packet::new(0xB1, &[]);
        let mut bytes = vec![0xA5, 0xAA, 0x00]; // mismatch at third byte
        bytes.extend_from_slice(&FRAME_PREAMBLE);
        bytes.push(packet.command_id);
        bytes.push(packet.length);
        bytes.extend_from_slice(&packet.crc.to_le_bytes());

        let mut codec = PacketCodec::new();
        match feed_all(&mut codec, &bytes) {
            CodecOutcome::PacketValid(_) => {}
            other => panic!("expected PacketValid after resync, got {other:?}"),
        }
    }

    #[test]
    fn codec_resynchronizes_after_valid_packet() {
        let packet = Packet::new(0xB1, &[]);
        let mut bytes = FRAME_PREAMBLE.to_vec();
        bytes.push(packet.command_id);
        bytes.push(packet.length);
        bytes.extend_from_slice(&packet.crc.to_le_bytes());

        let mut codec = PacketCodec::new();
        feed_all(&mut codec, &bytes);
        match feed_all(&mut codec, &bytes) {
            CodecOutcome::PacketValid(_) => {}
            other => panic!("expected a second PacketValid, got {other:?}"),
        }
    }
}
