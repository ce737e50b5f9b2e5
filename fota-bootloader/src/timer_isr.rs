// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Periodic timer interrupt: the reference firmware's `TIM6` period-elapsed
//! callback decrements a startup grace counter and toggles a liveness pin on
//! every tick; `ALARM0`/`TIMER_IRQ_0` plays the same role here. The
//! foreground loop only ever reads [`grace_ticks_remaining`]; only this
//! handler ever writes the counter.

use core::sync::atomic::{AtomicU8, Ordering};

use cortex_m::peripheral::NVIC;
use embedded_hal::digital::StatefulOutputPin;
use fota_common::config::STARTUP_GRACE_TICKS;
use rp2040_hal as hal;
use rp2040_hal::fugit::ExtU32;
use rp2040_hal::pac::interrupt;
use rp2040_hal::timer::Alarm;

use crate::peripherals::LivenessPin;

static GRACE_TICKS: AtomicU8 = AtomicU8::new(STARTUP_GRACE_TICKS);

const TICK_PERIOD_MS: u32 = 1;

static mut ALARM: Option<hal::timer::Alarm0> = None;
static mut LIVENESS_PIN: Option<LivenessPin> = None;

/// Arms `ALARM0` for a 1 ms period and unmasks `TIMER_IRQ_0`. Must be called
/// exactly once, before interrupts are globally enabled.
///
/// # Safety
/// Must not be called while `TIMER_IRQ_0` can preempt this function.
pub unsafe fn install(mut alarm: hal::timer::Alarm0, liveness_pin: LivenessPin) {
    alarm.enable_interrupt();
    let _ = alarm.schedule(TICK_PERIOD_MS.millis());
    ALARM = Some(alarm);
    LIVENESS_PIN = Some(liveness_pin);
    NVIC::unmask(hal::pac::Interrupt::TIMER_IRQ_0);
}

/// Remaining startup grace ticks, as last observed by the foreground loop.
pub fn grace_ticks_remaining() -> u8 {
    GRACE_TICKS.load(Ordering::Acquire)
}

#[interrupt]
fn TIMER_IRQ_0() {
    // SAFETY: only this handler touches `ALARM`/`LIVENESS_PIN`.
    let alarm = unsafe { (*core::ptr::addr_of_mut!(ALARM)).as_mut() };
    if let Some(alarm) = alarm {
        alarm.clear_interrupt();
        let _ = alarm.schedule(TICK_PERIOD_MS.millis());
    }

    let current = GRACE_TICKS.load(Ordering::Relaxed);
    if current > 0 {
        GRACE_TICKS.store(current - 1, Ordering::Release);
    }

    let pin = unsafe { (*core::ptr::addr_of_mut!(LIVENESS_PIN)).as_mut() };
    if let Some(pin) = pin {
        pin.toggle().ok();
    }
}
