// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Minimal resident application: writes its own shared-metadata record at
//! boot, blinks to signal it is alive, then idles. Exists to demonstrate the
//! MSP/vector-table contract the bootloader validates before jumping here,
//! not to be a useful firmware image in its own right.

#![no_std]
#![no_main]

use defmt_rtt as _;
use panic_probe as _;

defmt::timestamp!("{=u64:us}", { 0 });

use cortex_m_rt::entry;
use fota_common::config::SHARED_METADATA_ADDR;
use fota_common::metadata::{AppVersion, SharedMetadata};

/// This application's self-reported version, written into shared metadata
/// at boot for `GET_APP_VERSION` to report back.
const APP_VERSION: AppVersion = AppVersion {
    major: 0,
    minor: 1,
    patch: 0,
    _padding: 0,
};

#[entry]
fn main() -> ! {
    defmt::println!("app started");

    let (mut timer, mut led_pin) = fota_common::init_board();

    let metadata = SharedMetadata::new(APP_VERSION, 0, [0; 16]);
    unsafe {
        metadata.write_to(SHARED_METADATA_ADDR);
    }
    defmt::println!("shared metadata written");

    fota_common::blink(&mut led_pin, &mut timer, 5, 100);

    loop {
        cortex_m::asm::wfi();
    }
}
