// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! CRC-32/MPEG-2 packet checksum.
//!
//! Polynomial 0x04C11DB7, init 0xFFFFFFFF, no input/output reflection, no
//! final XOR. This is the variant the reference hardware's CRC peripheral is
//! configured for; it is not the same algorithm as `zip`/`zlib`'s
//! CRC-32/ISO-HDLC.

use crc::{Crc, CRC_32_MPEG_2};

const CRC32_MPEG2: Crc<u32> = Crc::<u32>::new(&CRC_32_MPEG_2);

/// Checksum over `[command_id, length, payload]`, the same byte sequence the
/// sender signs before appending the 4-byte CRC trailer.
pub fn packet_crc32(command_id: u8, length: u8, payload: &[u8]) -> u32 {
    let mut digest = CRC32_MPEG2.digest();
    digest.update(&[command_id, length]);
    digest.update(payload);
    digest.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector_differs_from_iso_hdlc() {
        // CRC-32/MPEG-2 of ASCII "123456789" is the well-known 0x0376E6E7.
        let crc = CRC32_MPEG2.checksum(b"123456789");
        assert_eq!(crc, 0x0376_E6E7);
    }

    #[test]
    fn empty_payload_is_stable() {
        let a = packet_crc32(0xB1, 0, &[]);
        let b = packet_crc32(0xB1, 0, &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn payload_byte_flip_changes_crc() {
        let a = packet_crc32(0xB7, 4, &[1, 2, 3, 4]);
        let b = packet_crc32(0xB7, 4, &[1, 2, 3, 5]);
        assert_ne!(a, b);
    }
}
