// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Pure validation of a Cortex-M vector table's initial stack pointer.
//!
//! Kept hardware-independent (the caller supplies the valid RAM range) so it
//! is unit-testable on the host; the actual read-and-jump sequence lives in
//! the bootloader binary, where it belongs next to the asm.

const FLASH_ERASED_WORD: u32 = 0xFFFF_FFFF;

/// True if `msp` looks like a real initial stack pointer: non-zero, not
/// erased flash, 4-byte aligned, and inside `sram_start..=sram_end`.
pub fn is_msp_valid(msp: u32, sram_start: u32, sram_end: u32) -> bool {
    if msp == 0 || msp == FLASH_ERASED_WORD {
        return false;
    }
    if msp & 0x3 != 0 {
        return false;
    }
    (sram_start..=sram_end).contains(&msp)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRAM_START: u32 = 0x2000_0000;
    const SRAM_END: u32 = 0x2004_2000;

    #[test]
    fn zero_stack_pointer_is_invalid() {
        assert!(!is_msp_valid(0, SRAM_START, SRAM_END));
    }

    #[test]
    fn erased_flash_stack_pointer_is_invalid() {
        assert!(!is_msp_valid(FLASH_ERASED_WORD, SRAM_START, SRAM_END));
    }

    #[test]
    fn misaligned_stack_pointer_is_invalid() {
        assert!(!is_msp_valid(SRAM_START + 1, SRAM_START, SRAM_END));
    }

    #[test]
    fn stack_pointer_outside_sram_is_invalid() {
        assert!(!is_msp_valid(0x1000_0000, SRAM_START, SRAM_END));
    }

    #[test]
    fn stack_pointer_inside_sram_is_valid() {
        assert!(is_msp_valid(SRAM_START + 0x1000, SRAM_START, SRAM_END));
    }

    #[test]
    fn stack_pointer_at_top_of_sram_is_valid() {
        assert!(is_msp_valid(SRAM_END, SRAM_START, SRAM_END));
    }
}
