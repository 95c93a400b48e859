#![cfg_attr(not(test), no_std)]
#![doc = include_str!("../README.md")]

#[macro_use]
mod fmt;

mod address;
mod channel;
mod command;
mod config;
mod driver;
mod result;
mod search;
#[cfg(test)]
mod sim;
mod status;

pub use address::{Address, AddressError};
pub use channel::Channel;
pub use command::{Command, OpCode, Register, RomCommand};
pub use config::{Config, DeviceConfig};
pub use driver::Ds2482;
pub use result::Error;
pub use search::{DeviceSearch, DeviceSearchIter};
pub use status::Status;

/// Continues a Dow/Maxim CRC8 (x^8 + x^5 + x^4 + 1, reflected) over `data`
pub fn compute_partial_crc8(crc: u8, data: &[u8]) -> u8 {
    let mut crc = crc;
    for byte in data.iter() {
        let mut byte = *byte;
        for _ in 0..8 {
            let mix = (crc ^ byte) & 0x01;
            crc >>= 1;
            if mix != 0x00 {
                crc ^= 0x8C;
            }
            byte >>= 1;
        }
    }
    crc
}

/// 1-Wire CRC8 of `data`, as stored in the last byte of a ROM address
pub fn crc8(data: &[u8]) -> u8 {
    compute_partial_crc8(0, data)
}
