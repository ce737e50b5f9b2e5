// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Startup decision logic: validate the application's vector table and jump
//! to it directly out of flash, or fall back to the command loop.
//!
//! There is no RAM staging and no A/B bank selection here: the application
//! runs in place at [`fota_common::config::FOTA_APP_START`] and the
//! bootloader only ever needs its first two words (initial stack pointer and
//! reset vector). Validity is delegated to
//! [`fota_common::vector_table::is_msp_valid`], which carries the unit tests.

use fota_common::config::{BOOT_SELECT_PRESSED_ENTERS_UPDATE, FOTA_APP_START};
use fota_common::vector_table::is_msp_valid;

use crate::timer_isr;

// RP2040 SRAM0-5 span 0x2000_0000..0x2004_2000 (264 KiB).
const SRAM_START: u32 = 0x2000_0000;
const SRAM_END: u32 = 0x2004_2000;

/// Blocks until the timer ISR has decremented the startup grace counter to
/// zero, sleeping between ticks instead of busy-waiting. Mirrors the
/// reference firmware's `while (elapsed_time > 0) HAL_Delay(1)` loop, except
/// the countdown itself lives in the ISR, not in this loop.
pub fn wait_for_grace_period() {
    while timer_isr::grace_ticks_remaining() > 0 {
        cortex_m::asm::wfi();
    }
}

/// Resolves the boot-select Open Question to a single call: a board wired
/// the opposite way only has to flip `BOOT_SELECT_PRESSED_ENTERS_UPDATE`.
pub fn should_enter_update(pin_low: bool) -> bool {
    pin_low == BOOT_SELECT_PRESSED_ENTERS_UPDATE
}

/// Reads the application's would-be initial stack pointer and checks it
/// looks like a real vector table rather than erased or garbage flash.
pub fn application_is_valid() -> bool {
    let msp = unsafe { (FOTA_APP_START as *const u32).read_volatile() };
    is_msp_valid(msp, SRAM_START, SRAM_END)
}

/// Jumps to the application's reset handler if its vector table validates.
/// Returns (without side effects beyond the validity check) if it does not,
/// leaving the caller to fall back to the command loop.
///
/// # Safety
/// Must only be called once, before any application-owned state (besides
/// the vector table itself) has been touched, and interrupts must not fire
/// during the jump.
pub unsafe fn try_jump_to_application() {
    let msp = (FOTA_APP_START as *const u32).read_volatile();
    if !is_msp_valid(msp, SRAM_START, SRAM_END) {
        return;
    }

    cortex_m::interrupt::disable();
    let nvic_icpr = 0xE000_E280 as *mut u32;
    for i in 0..8u32 {
        nvic_icpr.add(i as usize).write_volatile(0xFFFF_FFFF);
    }

    let reset_vector = ((FOTA_APP_START + 4) as *const u32).read_volatile();

    core::arch::asm!(
        "msr msp, {sp}",
        "cpsie i",
        "bx {reset}",
        sp = in(reg) msp,
        reset = in(reg) reset_vector,
        options(noreturn)
    );
}
