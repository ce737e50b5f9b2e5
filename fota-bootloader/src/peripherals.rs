// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Peripheral initialization for the bootloader.

use embedded_hal_nb::serial::Write as _;
use fota_common::config::SERIAL_TX_TIMEOUT_MS;
use fota_common::SharedMetadata;
use rp2040_hal as hal;
use rp2040_hal::fugit::RateExtU32;
use rp2040_hal::Clock as _;
use rp2040_hal::uart::{DataBits, Reader, StopBits, UartConfig, UartPeripheral, Writer};

pub type LedPin =
    hal::gpio::Pin<hal::gpio::bank0::Gpio25, hal::gpio::FunctionSioOutput, hal::gpio::PullDown>;
pub type BootSelectPin =
    hal::gpio::Pin<hal::gpio::bank0::Gpio2, hal::gpio::FunctionSioInput, hal::gpio::PullUp>;
/// Toggled once per timer tick by [`crate::timer_isr`]; a liveness signal
/// independent of the boot/update LED.
pub type LivenessPin =
    hal::gpio::Pin<hal::gpio::bank0::Gpio15, hal::gpio::FunctionSioOutput, hal::gpio::PullDown>;

pub type UartTx =
    hal::gpio::Pin<hal::gpio::bank0::Gpio0, hal::gpio::FunctionUart, hal::gpio::PullNone>;
pub type UartRx =
    hal::gpio::Pin<hal::gpio::bank0::Gpio1, hal::gpio::FunctionUart, hal::gpio::PullNone>;
pub type UartWriter = Writer<hal::pac::UART0, (UartTx, UartRx)>;
pub type UartReader = Reader<hal::pac::UART0, (UartTx, UartRx)>;

pub struct Peripherals {
    pub led_pin: LedPin,
    pub boot_select: BootSelectPin,
    pub liveness_pin: LivenessPin,
    pub timer: hal::Timer,
    pub alarm0: hal::timer::Alarm0,
    pub uart_writer: UartWriter,
    pub uart_reader: UartReader,
}

pub fn init() -> Peripherals {
    let mut pac = unsafe { hal::pac::Peripherals::steal() };

    let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);
    let clocks = hal::clocks::init_clocks_and_plls(
        12_000_000u32,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .unwrap();

    let mut timer = hal::Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);
    let alarm0 = timer.alarm_0().expect("ALARM0 already taken");
    let sio = hal::Sio::new(pac.SIO);
    let pins = hal::gpio::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let uart_pins = (
        pins.gpio0.into_function().into_pull_type::<hal::gpio::PullNone>(),
        pins.gpio1.into_function().into_pull_type::<hal::gpio::PullNone>(),
    );
    let mut uart = UartPeripheral::new(pac.UART0, uart_pins, &mut pac.RESETS)
        .enable(
            UartConfig::new(115_200u32.Hz(), DataBits::Eight, None, StopBits::One),
            clocks.peripheral_clock.freq(),
        )
        .unwrap();
    uart.enable_rx_interrupt();
    let (uart_reader, uart_writer) = uart.split();

    Peripherals {
        led_pin: pins.gpio25.into_push_pull_output(),
        boot_select: pins.gpio2.into_pull_up_input(),
        liveness_pin: pins.gpio15.into_push_pull_output(),
        timer,
        alarm0,
        uart_writer,
        uart_reader,
    }
}

/// Blocking send of one byte with the configured transport timeout. Mirrors
/// the reference device's bounded `HAL_UART_Transmit`, there is no infinite
/// retry.
pub fn send_byte(uart: &mut UartWriter, timer: &hal::Timer, byte: u8) -> bool {
    let deadline = timer.get_counter() + fugit_duration_ms(SERIAL_TX_TIMEOUT_MS);
    loop {
        match uart.write(byte) {
            Ok(()) => return true,
            Err(nb::Error::WouldBlock) => {
                if timer.get_counter() >= deadline {
                    return false;
                }
            }
            Err(nb::Error::Other(_)) => return false,
        }
    }
}

pub fn send_bytes(uart: &mut UartWriter, timer: &hal::Timer, bytes: &[u8]) -> bool {
    for &b in bytes {
        if !send_byte(uart, timer, b) {
            return false;
        }
    }
    true
}

fn fugit_duration_ms(ms: u32) -> hal::fugit::MicrosDurationU64 {
    hal::fugit::MicrosDurationU64::millis(ms as u64)
}

/// Reads the application's self-reported metadata from the shared region,
/// if it was ever written (valid sentinel).
pub fn read_shared_metadata() -> Option<SharedMetadata> {
    let metadata = unsafe { SharedMetadata::read_from(fota_common::config::SHARED_METADATA_ADDR) };
    metadata.is_valid().then_some(metadata)
}
