// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command implementations for bootloader operations.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use fota_common::config::MAX_PAYLOAD_SIZE;
use fota_common::protocol::{CommandId, Packet, ResponseCode};

use crate::transport::Transport;

fn expect_ack(response: &Packet, what: &str) -> Result<()> {
    match ResponseCode::from_u8(response.command_id) {
        Some(ResponseCode::Ack) => Ok(()),
        Some(ResponseCode::Nack) => bail!("{what} nacked (payload {:02x?})", response.payload()),
        Some(ResponseCode::Retransmit) => bail!("{what}: device asked for retransmit"),
        None => bail!(
            "{what}: unrecognized response code 0x{:02x}",
            response.command_id
        ),
    }
}

/// Probe the firmware-update sequence (FW_SYNC).
pub fn sync(transport: &mut Transport) -> Result<()> {
    let response = transport.send_recv(&Packet::new(CommandId::FwSync.as_u8(), &[]))?;
    expect_ack(&response, "FW_SYNC")?;
    println!("Device in sync, ready for update sequence.");
    Ok(())
}

/// Verify the device reports the expected chip id (FW_VERIFY_DEVICE_ID).
pub fn verify_device(transport: &mut Transport, id: u16) -> Result<()> {
    let response = transport.send_recv(&Packet::new(
        CommandId::FwVerifyDeviceId.as_u8(),
        &id.to_le_bytes(),
    ))?;
    expect_ack(&response, "FW_VERIFY_DEVICE_ID")?;
    println!("Device id 0x{id:04x} confirmed.");
    Ok(())
}

/// Upload a firmware image: FW_SEND_BIN_SIZE followed by repeated
/// FW_SEND_BIN_IN_PACKETS.
pub fn upload(transport: &mut Transport, file: &Path) -> Result<()> {
    let firmware = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let size = firmware.len() as u32;

    println!("Firmware: {} ({} bytes)", file.display(), size);
    print!("Starting update (erasing application region)... ");
    std::io::stdout().flush()?;

    let response = transport.send_recv_timeout(
        &Packet::new(CommandId::FwSendBinSize.as_u8(), &size.to_le_bytes()),
        60_000, // erase can take tens of seconds
    )?;
    expect_ack(&response, "FW_SEND_BIN_SIZE")?;
    println!("OK");

    let pb = ProgressBar::new(size as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
            )?
            .progress_chars("#>-"),
    );

    let mut sent = 0u32;
    for chunk in firmware.chunks(MAX_PAYLOAD_SIZE) {
        let response =
            transport.send_recv(&Packet::new(CommandId::FwSendBinInPackets.as_u8(), chunk))?;
        if let Err(e) = expect_ack(&response, "FW_SEND_BIN_IN_PACKETS") {
            pb.abandon();
            return Err(e);
        }

        sent += chunk.len() as u32;
        pb.set_position(sent as u64);
    }

    pb.finish_with_message("Upload complete");
    println!();
    println!("Firmware uploaded successfully!");
    println!(
        "Reboot the device (or reset it) to run the new application on port {}.",
        transport.port_name()
    );

    Ok(())
}

/// Read bootloader and application version.
pub fn version(transport: &mut Transport) -> Result<()> {
    let bl = transport.send_recv(&Packet::new(CommandId::GetBootloaderVersion.as_u8(), &[]))?;
    expect_ack(&bl, "GET_BOOTLOADER_VERSION")?;
    let [major, minor, patch] = [bl.payload()[0], bl.payload()[1], bl.payload()[2]];
    println!("Bootloader version: {major}.{minor}.{patch}");

    let app = transport.send_recv(&Packet::new(CommandId::GetAppVersion.as_u8(), &[]))?;
    expect_ack(&app, "GET_APP_VERSION")?;
    let [major, minor, patch] = [app.payload()[0], app.payload()[1], app.payload()[2]];
    println!("Application version: {major}.{minor}.{patch}");

    Ok(())
}

/// Read the device's chip id.
pub fn chip_id(transport: &mut Transport) -> Result<()> {
    let response = transport.send_recv(&Packet::new(CommandId::GetChipId.as_u8(), &[]))?;
    expect_ack(&response, "GET_CHIP_ID")?;
    let id = u16::from_le_bytes([response.payload()[0], response.payload()[1]]);
    println!("Chip id: 0x{id:04x}");
    Ok(())
}

/// Ask the device to resend its last response.
pub fn retransmit(transport: &mut Transport) -> Result<()> {
    let response =
        transport.send_recv(&Packet::new(CommandId::RetransmitLastToClient.as_u8(), &[]))?;
    println!(
        "Last response: id=0x{:02x} payload={:02x?}",
        response.command_id,
        response.payload()
    );
    Ok(())
}
