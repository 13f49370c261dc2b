// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! nv4-inspect: a small register-poking CLI around [`nv4_core::core::device::Device`].
//!
//! Not a driver and not a display pipeline — just enough to load a
//! config, push raw MMIO reads/writes from the command line, and print
//! back what the device did. Useful for exercising the FIFO/PGRAPH
//! dispatch path without a full guest driver.

use clap::{Parser, Subcommand};
use nv4_core::core::config::DeviceConfig;
use nv4_core::core::device::Device;

#[derive(Parser)]
#[command(name = "nv4-inspect", about = "Poke an NV4 core's MMIO aperture from the command line")]
struct Cli {
    /// Path to a TOML device config. Falls back to the default
    /// revision C00 / 16 MiB board if omitted.
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read one 32-bit register.
    Read {
        /// Aperture offset, hex or decimal (e.g. 0x1100 or 4352).
        address: String,
    },
    /// Write one 32-bit register.
    Write {
        address: String,
        value: String,
    },
    /// Push a value into the NV_USER aperture and drain whatever PFIFO
    /// can resolve afterward.
    Push {
        address: String,
        value: String,
    },
    /// Print PMC's aggregated interrupt state after recomputing it.
    Interrupts,
}

fn parse_u32(s: &str) -> u32 {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).unwrap_or_else(|e| panic!("invalid hex value {s}: {e}"))
    } else {
        s.parse().unwrap_or_else(|e| panic!("invalid value {s}: {e}"))
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => DeviceConfig::load(&path).unwrap_or_else(|e| {
            eprintln!("failed to load config {path}: {e}");
            std::process::exit(1);
        }),
        None => DeviceConfig::default(),
    };

    let mut device = Device::new(config).unwrap_or_else(|e| {
        eprintln!("failed to construct device: {e}");
        std::process::exit(1);
    });

    match cli.command {
        Command::Read { address } => {
            let addr = parse_u32(&address);
            println!("0x{:06X} -> 0x{:08X}", addr, device.read32(addr));
        }
        Command::Write { address, value } => {
            let addr = parse_u32(&address);
            let val = parse_u32(&value);
            device.write32(addr, val);
            println!("0x{:06X} <- 0x{:08X}", addr, val);
        }
        Command::Push { address, value } => {
            let addr = parse_u32(&address);
            let val = parse_u32(&value);
            device.write32(addr, val);
            println!("pushed 0x{:08X} at NV_USER offset 0x{:06X}", val, addr);
        }
        Command::Interrupts => {
            let asserted = device.recompute_interrupts();
            println!("IRQ asserted: {asserted}");
        }
    }
}
