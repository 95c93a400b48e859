pub trait OpCode {
    fn op_code(&self) -> u8;
}

/// 1-Wire ROM function commands, sent over the wire with [`Command::OneWireWriteByte`]
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RomCommand {
    MatchRom = 0x55,
    SearchRom = 0xF0,
    SearchRomAlarmed = 0xEC,
    SkipRom = 0xCC,
    ReadRom = 0x33,
}

impl OpCode for RomCommand {
    fn op_code(&self) -> u8 {
        *self as _
    }
}

/// Bridge function commands, the first byte of every I2C write
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    DeviceReset = 0xF0,
    SetReadPointer = 0xE1,
    WriteConfiguration = 0xD2,
    ChannelSelect = 0xC3,
    OneWireReset = 0xB4,
    OneWireWriteByte = 0xA5,
    OneWireReadByte = 0x96,
    OneWireSingleBit = 0x87,
    OneWireTriplet = 0x78,
}

impl OpCode for Command {
    fn op_code(&self) -> u8 {
        *self as _
    }
}

/// Read pointer codes accepted by [`Command::SetReadPointer`]
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    Status = 0xF0,
    ReadData = 0xE1,
    ChannelSelect = 0xD2,
    Configuration = 0xC3,
}

impl OpCode for Register {
    fn op_code(&self) -> u8 {
        *self as _
    }
}
