// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command-line interface definitions.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use crate::transport::Transport;

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "fota-host")]
#[command(about = "Host tool for fota-bootloader's UART update protocol")]
pub struct Cli {
    /// Serial port (e.g., /dev/ttyACM0)
    #[arg(short, long)]
    pub port: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Probe the update sequence (FW_SYNC)
    Sync,

    /// Verify the device reports the expected chip id (FW_VERIFY_DEVICE_ID)
    VerifyDevice {
        /// Expected chip id, e.g. 0x2040
        #[arg(value_name = "ID", value_parser = parse_u16)]
        id: u16,
    },

    /// Upload a firmware image (FW_SEND_BIN_SIZE + FW_SEND_BIN_IN_PACKETS)
    Upload {
        /// Firmware binary file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Read bootloader and application version
    Version,

    /// Read the device's chip id
    ChipId,

    /// Ask the device to resend its last response
    Retransmit,
}

fn parse_u16(s: &str) -> Result<u16, std::num::ParseIntError> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16)
    } else {
        s.parse()
    }
}

/// Execute the parsed CLI command.
pub fn run(cli: Cli) -> Result<()> {
    let mut transport = Transport::new(&cli.port)?;

    match cli.command {
        Commands::Sync => commands::sync(&mut transport),
        Commands::VerifyDevice { id } => commands::verify_device(&mut transport, id),
        Commands::Upload { file } => commands::upload(&mut transport, &file),
        Commands::Version => commands::version(&mut transport),
        Commands::ChipId => commands::chip_id(&mut transport),
        Commands::Retransmit => commands::retransmit(&mut transport),
    }
}
