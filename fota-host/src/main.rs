// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Host-side tool for fota-bootloader's UART update protocol.
//!
//! Usage:
//!   fota-host --port /dev/ttyACM0 sync
//!   fota-host --port /dev/ttyACM0 verify-device 0x2040
//!   fota-host --port /dev/ttyACM0 upload firmware.bin
//!   fota-host --port /dev/ttyACM0 version

mod cli;
mod commands;
mod transport;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    cli::run(args)
}
