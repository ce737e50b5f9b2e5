// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! UART transport: an RX interrupt handler feeds a byte ring buffer, the
//! foreground packet loop drains it. TX stays blocking, driven directly by
//! `peripherals::send_byte`/`send_bytes` from the caller holding the writer
//! half.
//!
//! This is the RP2040-specific concern the ring buffer in `fota-common` was
//! built to be decoupled from: the ISR only ever calls `Producer::write`,
//! the foreground loop only ever calls `Consumer::read`.

use crate::peripherals::{UartRx, UartTx};
use cortex_m::peripheral::NVIC;
use fota_common::ring_buffer::{ByteRingBuffer, Consumer};
use rp2040_hal as hal;
use rp2040_hal::pac::interrupt;
use rp2040_hal::uart::Reader;

/// Power of two; comfortably larger than one packet (preamble + id + length
/// + 16-byte payload + crc = 26 bytes).
const RX_RING_CAPACITY: usize = 256;

static RX_RING: ByteRingBuffer<RX_RING_CAPACITY> = ByteRingBuffer::new();
static mut RX_READER: Option<Reader<hal::pac::UART0, (UartTx, UartRx)>> = None;

/// Hands the reader half of the UART to the interrupt handler and unmasks
/// the IRQ. Must be called exactly once, before interrupts are globally
/// enabled.
///
/// # Safety
/// Must not be called while `UART0_IRQ` can preempt this function.
pub unsafe fn install(reader: Reader<hal::pac::UART0, (UartTx, UartRx)>) {
    RX_READER = Some(reader);
    NVIC::unmask(hal::pac::Interrupt::UART0_IRQ);
}

/// Consumer handle for the foreground packet-reception loop.
pub fn rx_consumer() -> Consumer<'static, RX_RING_CAPACITY> {
    RX_RING.split().1
}

#[interrupt]
fn UART0_IRQ() {
    use embedded_hal_nb::serial::Read;

    // SAFETY: only this handler touches `RX_READER`, and only the producer
    // side of `RX_RING` is touched from interrupt context.
    let reader = unsafe { (*core::ptr::addr_of_mut!(RX_READER)).as_mut() };
    let Some(reader) = reader else { return };

    let (producer, _consumer) = RX_RING.split();
    while let Ok(byte) = reader.read() {
        producer.write(byte);
    }
}
