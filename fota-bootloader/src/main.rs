// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! FOTA bootloader for RP2040: validates and jumps to a single resident
//! application image, or serves the update protocol over UART until a new
//! one has been written.

#![no_std]
#![no_main]

mod boot;
mod flash;
mod peripherals;
mod timer_isr;
mod uart_transport;

use defmt_rtt as _;
use embedded_hal::digital::{InputPin, OutputPin};
use panic_probe as _;

defmt::timestamp!("{=u64:us}", { 0 });

use cortex_m_rt::entry;
use fota_common::packet_codec::CodecOutcome;
use fota_common::protocol::ResponseCode;
use fota_common::{Bootloader, PacketCodec};

#[unsafe(link_section = ".boot2")]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_GENERIC_03H;

#[entry]
fn main() -> ! {
    defmt::println!("bootloader init");

    let mut p = peripherals::init();
    flash::init();
    unsafe {
        uart_transport::install(p.uart_reader);
        timer_isr::install(p.alarm0, p.liveness_pin);
    }

    fota_common::blink(&mut p.led_pin, &mut p.timer, 3, 200);

    boot::wait_for_grace_period();

    let pin_low = p.boot_select.is_low().unwrap_or(false);
    if boot::should_enter_update(pin_low) {
        defmt::println!("boot-select asserted, entering command loop");
    } else {
        defmt::println!(
            "boot-select not asserted, application valid = {}",
            boot::application_is_valid()
        );
        unsafe {
            boot::try_jump_to_application();
        }
        defmt::println!("no valid application, falling back to command loop");
    }

    run_command_loop(&mut p.uart_writer, &p.timer, &mut p.led_pin)
}

fn run_command_loop(
    uart_writer: &mut peripherals::UartWriter,
    timer: &rp2040_hal::Timer,
    led_pin: &mut peripherals::LedPin,
) -> ! {
    let mut codec = PacketCodec::new();
    let mut bootloader = Bootloader::new(flash::RpFlash);
    let rx = uart_transport::rx_consumer();

    loop {
        let Some(byte) = rx.read() else { continue };

        let response = match codec.feed(byte) {
            CodecOutcome::Pending => continue,
            CodecOutcome::PacketValid(packet) => bootloader.handle_valid_packet(packet),
            CodecOutcome::PacketInvalid => bootloader.handle_invalid_packet(),
        };

        let include_preamble = fota_common::config::RESPONSES_INCLUDE_PREAMBLE;
        response.write_into(
            |b| {
                peripherals::send_byte(uart_writer, timer, b);
            },
            include_preamble,
        );

        if response.command_id == ResponseCode::Ack.as_u8() {
            led_pin.set_low().ok();
        }
    }
}
