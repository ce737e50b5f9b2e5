// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Flash erase/program wrappers using RP2040 ROM routines, implementing
//! [`fota_common::FlashProgrammer`].
//!
//! On RP2040, flash operations (erase/program) require disabling XIP first.
//! The full sequence is:
//!   1. connect_internal_flash()
//!   2. flash_exit_xip()
//!   3. flash_range_erase() or flash_range_program()
//!   4. flash_flush_cache()
//!   5. flash_enter_cmd_xip()
//!
//! All code executing during steps 1-5 must run from RAM, not flash. We use
//! `#[link_section = ".data"]` to place critical functions in RAM, and
//! pre-resolve all ROM function pointers at init time.

use fota_common::config::{FLASH_BASE, FLASH_PAGE_SIZE};
use fota_common::packet_controller::FlashProgrammer;

// ROM function pointer types
type RomFnVoid = unsafe extern "C" fn();
type RomFnErase = unsafe extern "C" fn(u32, usize, u32, u8);
type RomFnProgram = unsafe extern "C" fn(u32, *const u8, usize);

/// ROM function pointers, resolved once at init from the ROM table. Stored
/// in static RAM so the RAM-resident functions below can call them without
/// touching flash-based code while XIP is torn down.
static mut ROM_CONNECT_INTERNAL_FLASH: RomFnVoid = dummy_void;
static mut ROM_FLASH_EXIT_XIP: RomFnVoid = dummy_void;
static mut ROM_FLASH_RANGE_ERASE: RomFnErase = dummy_erase;
static mut ROM_FLASH_RANGE_PROGRAM: RomFnProgram = dummy_program;
static mut ROM_FLASH_FLUSH_CACHE: RomFnVoid = dummy_void;
static mut ROM_FLASH_ENTER_CMD_XIP: RomFnVoid = dummy_void;

unsafe extern "C" fn dummy_void() {}
unsafe extern "C" fn dummy_erase(_: u32, _: usize, _: u32, _: u8) {}
unsafe extern "C" fn dummy_program(_: u32, _: *const u8, _: usize) {}

/// Looks up a ROM function by its two-character tag. ROM table pointer at
/// 0x14 and lookup function at 0x18 are 16-bit halfword pointers.
unsafe fn rom_func_lookup(tag: &[u8; 2]) -> usize {
    let fn_table = *(0x14 as *const u16) as *const u16;
    let lookup: unsafe extern "C" fn(*const u16, u32) -> usize =
        core::mem::transmute::<usize, unsafe extern "C" fn(*const u16, u32) -> usize>(
            *(0x18 as *const u16) as usize,
        );
    let code = u16::from_le_bytes(*tag) as u32;
    lookup(fn_table, code)
}

/// Resolves the ROM flash function pointers. Must be called once, early in
/// boot, before any `RpFlash` operation. Performs ROM table lookups, which
/// require XIP to still be active at call time.
pub fn init() {
    unsafe {
        ROM_CONNECT_INTERNAL_FLASH = core::mem::transmute::<usize, RomFnVoid>(rom_func_lookup(b"IF"));
        ROM_FLASH_EXIT_XIP = core::mem::transmute::<usize, RomFnVoid>(rom_func_lookup(b"EX"));
        ROM_FLASH_RANGE_ERASE = core::mem::transmute::<usize, RomFnErase>(rom_func_lookup(b"RE"));
        ROM_FLASH_RANGE_PROGRAM =
            core::mem::transmute::<usize, RomFnProgram>(rom_func_lookup(b"RP"));
        ROM_FLASH_FLUSH_CACHE = core::mem::transmute::<usize, RomFnVoid>(rom_func_lookup(b"FC"));
        ROM_FLASH_ENTER_CMD_XIP = core::mem::transmute::<usize, RomFnVoid>(rom_func_lookup(b"CX"));
    }
}

fn addr_to_offset(abs_addr: u32) -> u32 {
    abs_addr - FLASH_BASE
}

/// Erases flash at the given flash-relative offset. Runs entirely from RAM
/// with proper XIP teardown/setup.
///
/// # Safety
/// [`init`] must have been called first.
#[link_section = ".data"]
#[inline(never)]
unsafe fn raw_erase(offset: u32, size: u32) {
    cortex_m::interrupt::disable();
    ROM_CONNECT_INTERNAL_FLASH();
    ROM_FLASH_EXIT_XIP();
    ROM_FLASH_RANGE_ERASE(offset, size as usize, FLASH_PAGE_SIZE, 0x20);
    ROM_FLASH_FLUSH_CACHE();
    ROM_FLASH_ENTER_CMD_XIP();
    cortex_m::interrupt::enable();
}

/// Programs flash at the given flash-relative offset. Runs entirely from RAM
/// with proper XIP teardown/setup.
///
/// # Safety
/// [`init`] must have been called first.
#[link_section = ".data"]
#[inline(never)]
unsafe fn raw_program(offset: u32, data: *const u8, len: usize) {
    cortex_m::interrupt::disable();
    ROM_CONNECT_INTERNAL_FLASH();
    ROM_FLASH_EXIT_XIP();
    ROM_FLASH_RANGE_PROGRAM(offset, data, len);
    ROM_FLASH_FLUSH_CACHE();
    ROM_FLASH_ENTER_CMD_XIP();
    cortex_m::interrupt::enable();
}

/// Reads bytes from an absolute XIP flash address via volatile reads.
pub fn read(abs_addr: u32, buf: &mut [u8]) {
    for (i, byte) in buf.iter_mut().enumerate() {
        *byte = unsafe { ((abs_addr + i as u32) as *const u8).read_volatile() };
    }
}

/// On-target [`FlashProgrammer`]: erase is page-granular over
/// [`FLASH_PAGE_SIZE`], programming happens one double-word at a time by
/// packing it into a 2-byte-aligned scratch buffer and calling into the RAM
/// routines above.
#[derive(Default)]
pub struct RpFlash;

impl FlashProgrammer for RpFlash {
    type Error = ();

    fn erase_region(&mut self, start_addr: u32, page_count: u32) -> Result<(), ()> {
        let offset = addr_to_offset(start_addr);
        unsafe {
            raw_erase(offset, page_count * FLASH_PAGE_SIZE);
        }
        Ok(())
    }

    fn program_dword(&mut self, addr: u32, dword: [u8; 8]) -> Result<(), ()> {
        let offset = addr_to_offset(addr);
        unsafe {
            raw_program(offset, dword.as_ptr(), dword.len());
        }
        Ok(())
    }
}
