use crate::{DeviceSearch, Ds2482, Error, OpCode, RomCommand};
use byteorder::{ByteOrder, LittleEndian};
use core::{
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    ops::{Deref, DerefMut},
    str::FromStr,
};
use embedded_hal::{delay::DelayNs, i2c::I2c};

/// 64 bit ROM address of a 1-Wire slave
///
/// Byte 0 is the family code, bytes 1 to 6 the serial number and byte 7 the
/// CRC8 over the first seven bytes.
#[derive(Debug, Clone, Copy, PartialOrd, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct Address {
    raw: [u8; Self::BYTES as usize],
}

impl Default for Address {
    fn default() -> Self {
        Self::from([0; Self::BYTES as usize])
    }
}

impl From<[u8; Self::BYTES as usize]> for Address {
    fn from(raw: [u8; Self::BYTES as usize]) -> Self {
        Address { raw }
    }
}

impl From<Address> for [u8; Address::BYTES as usize] {
    fn from(addr: Address) -> [u8; Address::BYTES as usize] {
        addr.raw
    }
}

/// The integer form is little endian: the family code is the lowest byte
impl From<u64> for Address {
    fn from(value: u64) -> Self {
        let mut addr = Address::default();
        LittleEndian::write_u64(addr.as_mut(), value);
        addr
    }
}

impl From<Address> for u64 {
    fn from(addr: Address) -> u64 {
        LittleEndian::read_u64(addr.as_ref())
    }
}

impl Deref for Address {
    type Target = [u8; Self::BYTES as usize];

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

impl DerefMut for Address {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.raw
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        self.deref() as _
    }
}

impl AsMut<[u8]> for Address {
    fn as_mut(&mut self) -> &mut [u8] {
        self.deref_mut() as _
    }
}

impl Address {
    /// The length of device address in bytes
    pub const BYTES: u8 = 8;

    /// The length of device address in bits
    pub const BITS: u8 = Self::BYTES * 8;

    /// Builds an address from family code and serial, filling in the checksum
    pub fn new(family_code: u8, serial: [u8; 6]) -> Self {
        let mut addr = Address::default();
        addr[0] = family_code;
        addr[1..7].copy_from_slice(&serial);
        addr[7] = crate::crc8(&addr[..7]);
        addr
    }

    pub fn family_code(&self) -> u8 {
        self[0]
    }

    pub fn serial(&self) -> &[u8] {
        &self[1..7]
    }

    /// Stored checksum byte
    pub fn crc(&self) -> u8 {
        self[7]
    }

    pub fn is_crc_valid(&self) -> bool {
        crate::crc8(&self[..7]) == self.crc()
    }

    pub fn ensure_valid<E: Debug>(&self) -> Result<(), Error<E>> {
        let computed = crate::crc8(&self[..7]);
        if computed != self.crc() {
            Err(Error::CrcMismatch(computed, self.crc()))
        } else {
            Ok(())
        }
    }

    pub fn ensure_family_code<E: Debug>(&self, family_code: u8) -> Result<(), Error<E>> {
        if self.family_code() != family_code {
            Err(Error::FamilyCodeMismatch(family_code, self.family_code()))
        } else {
            Ok(())
        }
    }
}

/// Error type
#[derive(Debug, PartialEq)]
pub enum AddressError {
    NotEnough,
    Invalid,
}

fn hex_to_u8(c: char) -> Option<u8> {
    c.to_digit(16).map(|d| d as u8)
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut addr = Address::default();
        let mut chars = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ':' && *c != '-');

        for i in 0..Self::BYTES as usize {
            match (chars.next(), chars.next()) {
                (Some(h), Some(l)) => match (hex_to_u8(h), hex_to_u8(l)) {
                    (Some(h), Some(l)) => {
                        addr[i] = (h << 4) | l;
                    }
                    _ => return Err(AddressError::Invalid),
                },
                _ => return Err(AddressError::NotEnough),
            }
        }

        Ok(addr)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self[0], self[1], self[2], self[3], self[4], self[5], self[6], self[7],
        )
    }
}

impl Address {
    /// Reads the address of the only device on the bus with Read ROM
    pub fn read_single<I: I2c>(
        &mut self,
        bridge: &mut Ds2482<I>,
        delay: &mut impl DelayNs,
    ) -> Result<(), Error<I::Error>> {
        bridge.reset_write_read(delay, &[RomCommand::ReadRom.op_code()], self.as_mut())?;
        Ok(())
    }

    pub fn get_single<I: I2c>(
        bridge: &mut Ds2482<I>,
        delay: &mut impl DelayNs,
    ) -> Result<Self, Error<I::Error>> {
        let mut address = Self::default();
        address.read_single(bridge, delay)?;
        Ok(address)
    }

    pub fn search_first<I: I2c>(
        bridge: &mut Ds2482<I>,
        delay: &mut impl DelayNs,
        family_code: u8,
    ) -> Result<Option<Self>, Error<I::Error>> {
        let mut search = DeviceSearch::new();
        while let Some(address) = bridge.search_next(&mut search, delay)? {
            if family_code == address.family_code() {
                return Ok(Some(address));
            }
        }
        Ok(None)
    }
}
