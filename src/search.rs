use crate::{Address, Ds2482, Error, OpCode, RomCommand};
use embedded_hal::{delay::DelayNs, i2c::I2c};

/// Progress of a ROM search across calls
///
/// Bit positions are counted from 1 to 64, least significant bit of the
/// family code first. A `last_discrepancy` of 0 starts a fresh search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceSearch {
    address: [u8; 8],
    last_discrepancy: u8,
    exhausted: bool,
}

impl DeviceSearch {
    pub fn new() -> DeviceSearch {
        DeviceSearch::default()
    }

    /// Starts over from the lowest address
    pub fn reset(&mut self) {
        *self = DeviceSearch::default();
    }

    /// Position of the branch point the next search will take the 1 side of
    pub fn last_discrepancy(&self) -> u8 {
        self.last_discrepancy
    }

    /// All devices have been reported
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// The most recently found address
    pub fn address(&self) -> Address {
        Address::from(self.address)
    }

    fn is_bit_set_in_address(&self, bit: u8) -> bool {
        self.address[(bit / 8) as usize] & (0x01 << (bit % 8)) != 0x00
    }

    fn write_bit_in_address(&mut self, bit: u8, value: bool) {
        let index = (bit / 8) as usize;
        let mask = 0x01 << (bit % 8);
        if value {
            self.address[index] |= mask;
        } else {
            self.address[index] &= !mask;
        }
    }

    pub fn into_iter<'a, I: I2c, D: DelayNs>(
        self,
        bridge: &'a mut Ds2482<I>,
        delay: &'a mut D,
    ) -> DeviceSearchIter<'a, I, D> {
        DeviceSearchIter {
            search: Some(self),
            bridge,
            delay,
        }
    }
}

pub struct DeviceSearchIter<'a, I: I2c, D: DelayNs> {
    search: Option<DeviceSearch>,
    bridge: &'a mut Ds2482<I>,
    delay: &'a mut D,
}

impl<'a, I: I2c, D: DelayNs> Iterator for DeviceSearchIter<'a, I, D> {
    type Item = Result<Address, Error<I::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut search = self.search.take()?;
        let result = self
            .bridge
            .search_next(&mut search, &mut *self.delay)
            .transpose()?;
        self.search = Some(search);
        Some(result)
    }
}

impl<I: I2c> Ds2482<I> {
    /// Finds the next device on the bus
    ///
    /// `Ok(None)` means either that the search is exhausted, that nobody
    /// answered the reset, or that the devices stopped answering consistently
    /// mid search. Only the first case marks `search` as exhausted.
    pub fn search_next(
        &mut self,
        search: &mut DeviceSearch,
        delay: &mut impl DelayNs,
    ) -> Result<Option<Address>, Error<I::Error>> {
        self.search(search, delay, RomCommand::SearchRom)
    }

    /// Like [`Ds2482::search_next`] but only devices in alarm state answer
    pub fn search_next_alarmed(
        &mut self,
        search: &mut DeviceSearch,
        delay: &mut impl DelayNs,
    ) -> Result<Option<Address>, Error<I::Error>> {
        self.search(search, delay, RomCommand::SearchRomAlarmed)
    }

    /// Enumerates the whole bus from scratch, returning the number of devices
    pub fn devices_count(
        &mut self,
        delay: &mut impl DelayNs,
        mut on_found: impl FnMut(&Address),
    ) -> Result<usize, Error<I::Error>> {
        let mut search = DeviceSearch::new();
        let mut count = 0;
        while let Some(address) = self.search_next(&mut search, delay)? {
            count += 1;
            on_found(&address);
        }
        Ok(count)
    }

    fn search(
        &mut self,
        rom: &mut DeviceSearch,
        delay: &mut impl DelayNs,
        cmd: RomCommand,
    ) -> Result<Option<Address>, Error<I::Error>> {
        if rom.exhausted {
            return Ok(None);
        }

        if !self.reset(delay)? {
            debug!("ds2482 {:#x}: no presence, nothing to search", self.address());
            return Ok(None);
        }

        self.write_byte(delay, cmd.op_code())?;

        let mut last_zero = 0;
        for i in 1..=Address::BITS {
            let bit = i - 1;
            let direction = if i < rom.last_discrepancy {
                rom.is_bit_set_in_address(bit)
            } else {
                // take the 1 branch at the last fork, 0 at every new one
                i == rom.last_discrepancy
            };

            let status = self.triplet(delay, direction)?;
            let id = status.single_bit_result();
            let comp_id = status.triplet_second_bit();
            let taken = status.branch_direction();

            if id && comp_id {
                debug!("ds2482 {:#x}: no device answered bit {}", self.address(), i);
                return Ok(None);
            }
            if !id && !comp_id && !taken {
                last_zero = i;
            }

            rom.write_bit_in_address(bit, taken);
        }

        rom.last_discrepancy = last_zero;
        if last_zero == 0 {
            rom.exhausted = true;
        }

        let address = rom.address();
        debug!("ds2482 {:#x}: found {}", self.address(), address);
        Ok(Some(address))
    }
}
