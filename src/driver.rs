use crate::{
    Address, Channel, Command, Config, DeviceConfig, Error, OpCode, Register, RomCommand, Status,
};
use embedded_hal::{delay::DelayNs, i2c::I2c};

/// DS2482 I2C to 1-Wire bridge
///
/// Every operation blocks until the bridge reports idle, polling the status
/// register within the bounds of [`Config`]. Running out of attempts is not an
/// error: the last status is used as is and the sticky [`Ds2482::timed_out`]
/// flag is raised until [`Ds2482::clear_timeout`] is called.
pub struct Ds2482<I: I2c> {
    i2c: I,
    address: u8,
    config: Config,
    timed_out: bool,
    channel: Channel,
}

impl<I: I2c> Ds2482<I> {
    /// I2C address with all address pins tied low
    pub const BASE_ADDRESS: u8 = 0x18;

    /// `address_pins` is the AD2..AD0 strapping of the chip
    pub fn new(i2c: I, address_pins: u8) -> Self {
        Self::with_config(i2c, address_pins, Config::default())
    }

    pub fn with_config(i2c: I, address_pins: u8, config: Config) -> Self {
        Ds2482 {
            i2c,
            address: Self::BASE_ADDRESS | (address_pins & 0x07),
            config,
            timed_out: false,
            channel: Channel::default(),
        }
    }

    /// 7 bit I2C address of the bridge
    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether some status poll ran out of attempts since the last clear
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn clear_timeout(&mut self) {
        self.timed_out = false;
    }

    /// Last successfully selected channel
    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn release(self) -> I {
        self.i2c
    }

    #[cfg(test)]
    pub(crate) fn bus_mut(&mut self) -> &mut I {
        &mut self.i2c
    }

    fn send(&mut self, cmd: Command, payload: Option<u8>) -> Result<(), Error<I::Error>> {
        trace!("ds2482 {:#x}: command {:#x}", self.address, cmd.op_code());
        match payload {
            Some(payload) => self.i2c.write(self.address, &[cmd.op_code(), payload])?,
            None => self.i2c.write(self.address, &[cmd.op_code()])?,
        }
        Ok(())
    }

    fn read_pointed(&mut self) -> Result<u8, Error<I::Error>> {
        let mut buf = [0u8];
        self.i2c.read(self.address, &mut buf)?;
        Ok(buf[0])
    }

    pub fn set_read_pointer(&mut self, register: Register) -> Result<(), Error<I::Error>> {
        self.send(Command::SetReadPointer, Some(register.op_code()))
    }

    /// Single read of the status register
    pub fn read_status(&mut self, set_pointer: bool) -> Result<Status, Error<I::Error>> {
        if set_pointer {
            self.set_read_pointer(Register::Status)?;
        }
        Ok(Status(self.read_pointed()?))
    }

    /// Reads the status register until the busy bit clears
    ///
    /// With `set_pointer` the read pointer is moved to the status register
    /// before each read. After the configured number of attempts the timeout
    /// flag is raised and the last status is returned, busy or not.
    pub fn poll_status(
        &mut self,
        delay: &mut impl DelayNs,
        set_pointer: bool,
    ) -> Result<Status, Error<I::Error>> {
        let mut attempts = self.config.poll_attempts.max(1);
        loop {
            let status = self.read_status(set_pointer)?;
            if !status.busy() {
                return Ok(status);
            }
            attempts -= 1;
            if attempts == 0 {
                warn!("ds2482 {:#x}: still busy, giving up", self.address);
                self.timed_out = true;
                return Ok(status);
            }
            delay.delay_us(self.config.poll_interval_us);
        }
    }

    /// Resets the bridge itself, aborting any 1-Wire activity
    ///
    /// Returns whether the status reports the device reset bit.
    pub fn device_reset(&mut self, delay: &mut impl DelayNs) -> Result<bool, Error<I::Error>> {
        self.send(Command::DeviceReset, None)?;
        let status = self.poll_status(delay, false)?;
        self.channel = Channel::default();
        Ok(status.device_reset())
    }

    /// Writes the configuration register, returns whether the bridge took it
    pub fn configure(
        &mut self,
        delay: &mut impl DelayNs,
        config: DeviceConfig,
    ) -> Result<bool, Error<I::Error>> {
        self.poll_status(delay, true)?;
        self.send(Command::WriteConfiguration, Some(config.transit()))?;
        let read = self.read_pointed()?;
        if read != config.bits() {
            warn!(
                "ds2482 {:#x}: configuration {:#x} read back as {:#x}",
                self.address,
                config.bits(),
                read
            );
            return Ok(false);
        }
        Ok(true)
    }

    /// Switches the active 1-Wire channel (eight channel variant only)
    ///
    /// Returns false if the bridge does not echo the expected code. A timeout
    /// while waiting is not checked here; it shows up as a failed echo.
    pub fn select_channel(
        &mut self,
        delay: &mut impl DelayNs,
        channel: Channel,
    ) -> Result<bool, Error<I::Error>> {
        self.poll_status(delay, true)?;
        self.send(Command::ChannelSelect, Some(channel.select_code()))?;
        self.poll_status(delay, true)?;
        self.set_read_pointer(Register::ChannelSelect)?;
        let echo = self.read_pointed()?;
        if echo != channel.echo_code() {
            warn!(
                "ds2482 {:#x}: channel {} echoed {:#x}",
                self.address,
                channel.index(),
                echo
            );
            return Ok(false);
        }
        self.channel = channel;
        Ok(true)
    }

    /// Performs a 1-Wire reset and listens for a presence pulse
    ///
    /// Returns true if at least one device answered.
    pub fn reset(&mut self, delay: &mut impl DelayNs) -> Result<bool, Error<I::Error>> {
        self.poll_status(delay, true)?;
        self.send(Command::OneWireReset, None)?;
        let status = self.poll_status(delay, false)?;
        if status.short_detected() {
            warn!("ds2482 {:#x}: short on 1-Wire line", self.address);
        }
        Ok(status.presence_pulse())
    }

    fn reset_expect_presence(&mut self, delay: &mut impl DelayNs) -> Result<(), Error<I::Error>> {
        if self.reset(delay)? {
            Ok(())
        } else {
            Err(Error::NoPresence)
        }
    }

    pub fn reset_write_read(
        &mut self,
        delay: &mut impl DelayNs,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Error<I::Error>> {
        self.reset_expect_presence(delay)?;
        self.write_bytes(delay, write)?;
        self.read_bytes(delay, read)?;
        Ok(())
    }

    pub fn reset_write_only(
        &mut self,
        delay: &mut impl DelayNs,
        write: &[u8],
    ) -> Result<(), Error<I::Error>> {
        self.reset_expect_presence(delay)?;
        self.write_bytes(delay, write)?;
        Ok(())
    }

    pub fn reset_select_write_read(
        &mut self,
        delay: &mut impl DelayNs,
        addr: &Address,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Error<I::Error>> {
        self.reset_expect_presence(delay)?;
        self.select(delay, addr)?;
        self.write_bytes(delay, write)?;
        self.read_bytes(delay, read)?;
        Ok(())
    }

    pub fn reset_select_write_only(
        &mut self,
        delay: &mut impl DelayNs,
        addr: &Address,
        write: &[u8],
    ) -> Result<(), Error<I::Error>> {
        self.reset_expect_presence(delay)?;
        self.select(delay, addr)?;
        self.write_bytes(delay, write)?;
        Ok(())
    }

    pub fn reset_skip_write_read(
        &mut self,
        delay: &mut impl DelayNs,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Error<I::Error>> {
        self.reset_expect_presence(delay)?;
        self.skip(delay)?;
        self.write_bytes(delay, write)?;
        self.read_bytes(delay, read)?;
        Ok(())
    }

    pub fn reset_skip_write_only(
        &mut self,
        delay: &mut impl DelayNs,
        write: &[u8],
    ) -> Result<(), Error<I::Error>> {
        self.reset_expect_presence(delay)?;
        self.skip(delay)?;
        self.write_bytes(delay, write)?;
        Ok(())
    }

    /// Addresses every device at once, only sensible with a single device
    pub fn skip(&mut self, delay: &mut impl DelayNs) -> Result<(), Error<I::Error>> {
        self.write_command(delay, RomCommand::SkipRom)
    }

    /// Addresses a single device by its ROM address
    pub fn select(&mut self, delay: &mut impl DelayNs, addr: &Address) -> Result<(), Error<I::Error>> {
        self.write_command(delay, RomCommand::MatchRom)?;
        self.write_bytes(delay, addr.as_ref())
    }

    pub fn write_command(
        &mut self,
        delay: &mut impl DelayNs,
        cmd: impl OpCode,
    ) -> Result<(), Error<I::Error>> {
        self.write_byte(delay, cmd.op_code())
    }

    pub fn write_bytes(&mut self, delay: &mut impl DelayNs, bytes: &[u8]) -> Result<(), Error<I::Error>> {
        for b in bytes {
            self.write_byte(delay, *b)?;
        }
        Ok(())
    }

    pub fn read_bytes(&mut self, delay: &mut impl DelayNs, dst: &mut [u8]) -> Result<(), Error<I::Error>> {
        for d in dst {
            *d = self.read_byte(delay)?;
        }
        Ok(())
    }

    pub fn write_byte(&mut self, delay: &mut impl DelayNs, byte: u8) -> Result<(), Error<I::Error>> {
        self.poll_status(delay, true)?;
        self.send(Command::OneWireWriteByte, Some(byte))
    }

    pub fn read_byte(&mut self, delay: &mut impl DelayNs) -> Result<u8, Error<I::Error>> {
        self.poll_status(delay, true)?;
        self.send(Command::OneWireReadByte, None)?;
        self.poll_status(delay, false)?;
        self.set_read_pointer(Register::ReadData)?;
        self.read_pointed()
    }

    /// Generates a single time slot, writing `high` or sampling when high
    pub fn write_bit(&mut self, delay: &mut impl DelayNs, high: bool) -> Result<(), Error<I::Error>> {
        self.poll_status(delay, true)?;
        self.send(Command::OneWireSingleBit, Some(if high { 0x80 } else { 0x00 }))
    }

    pub fn read_bit(&mut self, delay: &mut impl DelayNs) -> Result<bool, Error<I::Error>> {
        self.write_bit(delay, true)?;
        let status = self.poll_status(delay, true)?;
        Ok(status.single_bit_result())
    }

    /// Reads a bit and its complement, then writes a direction bit
    ///
    /// The bridge writes `direction` only when both sampled bits are zero,
    /// otherwise it follows the sampled bit. The returned status carries the
    /// two samples and the direction actually taken.
    pub fn triplet(&mut self, delay: &mut impl DelayNs, direction: bool) -> Result<Status, Error<I::Error>> {
        self.poll_status(delay, true)?;
        self.send(Command::OneWireTriplet, Some(if direction { 0x80 } else { 0x00 }))?;
        self.poll_status(delay, false)
    }
}
