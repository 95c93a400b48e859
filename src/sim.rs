//! Simulated bridge with a wired-AND 1-Wire bus behind it, for tests

use crate::{Address, Channel, Command, Register, RomCommand, Status};
use embedded_hal::{
    delay::DelayNs,
    i2c::{self, ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation, SevenBitAddress},
};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimError;

impl i2c::Error for SimError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
    }
}

/// Adds up every requested pause
#[derive(Debug, Default)]
pub struct CountingDelay {
    pub ns: u64,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.ns += ns as u64;
    }
}

pub struct SimBridge {
    pub address: SevenBitAddress,
    pub devices: Vec<Address>,
    pub alarmed: Vec<Address>,
    /// Status reads reporting busy after every 1-Wire command
    pub busy_polls: u32,
    /// Never leaves busy state
    pub stuck: bool,
    /// Level the slaves leave on the line during a read slot
    pub slave_bit: bool,
    /// Bytes returned by 1-Wire read byte commands, 0xff when empty
    pub read_queue: VecDeque<u8>,
    /// Bytes written to the 1-Wire bus
    pub wire_log: Vec<u8>,
    pub config: u8,
    pub config_locked: bool,
    /// Replaces the channel select read back
    pub channel_echo: Option<u8>,
    /// Bit position (0 based) at which all devices drop off during a search
    pub unplug_at_bit: Option<u8>,
    pub status_reads: u32,
    pub triplets: u32,
    pointer: u8,
    status: u8,
    data: u8,
    channel: Channel,
    busy_left: u32,
    rom_command_pending: bool,
    searching: Option<(Vec<Address>, u8)>,
}

impl SimBridge {
    pub fn with_devices(devices: &[Address]) -> Self {
        SimBridge {
            address: 0x18,
            devices: devices.to_vec(),
            alarmed: Vec::new(),
            busy_polls: 0,
            stuck: false,
            slave_bit: true,
            read_queue: VecDeque::new(),
            wire_log: Vec::new(),
            config: 0,
            config_locked: false,
            channel_echo: None,
            unplug_at_bit: None,
            status_reads: 0,
            triplets: 0,
            pointer: Register::Status as u8,
            status: 0,
            data: 0,
            channel: Channel::Ch0,
            busy_left: 0,
            rom_command_pending: false,
            searching: None,
        }
    }

    fn bit_of(address: &Address, bit: u8) -> bool {
        address[(bit / 8) as usize] & (1 << (bit % 8)) != 0
    }

    fn one_wire_started(&mut self) {
        self.pointer = Register::Status as u8;
        self.busy_left = self.busy_polls;
    }

    fn one_wire_reset(&mut self) {
        self.status = if self.devices.is_empty() {
            0
        } else {
            Status::PRESENCE_PULSE
        };
        self.rom_command_pending = true;
        self.searching = None;
    }

    fn one_wire_write_byte(&mut self, byte: u8) {
        self.wire_log.push(byte);
        if !self.rom_command_pending {
            return;
        }
        self.rom_command_pending = false;
        if byte == RomCommand::SearchRom as u8 {
            self.searching = Some((self.devices.clone(), 0));
        } else if byte == RomCommand::SearchRomAlarmed as u8 {
            self.searching = Some((self.alarmed.clone(), 0));
        } else if byte == RomCommand::ReadRom as u8 {
            // every device answers at once, the line reads the AND of all
            let rom = self
                .devices
                .iter()
                .fold([0xff; 8], |acc, a| core::array::from_fn(|i| acc[i] & a[i]));
            self.read_queue.extend(rom);
        }
    }

    fn one_wire_triplet(&mut self, direction: bool) {
        self.triplets += 1;
        let unplug_at_bit = self.unplug_at_bit;
        let (candidates, bit) = match self.searching.as_mut() {
            Some(search) => search,
            None => {
                self.status = Status::SINGLE_BIT_RESULT | Status::TRIPLET_SECOND_BIT;
                return;
            }
        };
        if unplug_at_bit == Some(*bit) {
            candidates.clear();
        }

        let id = !candidates.iter().any(|a| !Self::bit_of(a, *bit));
        let comp_id = !candidates.iter().any(|a| Self::bit_of(a, *bit));
        let taken = match (id, comp_id) {
            (false, false) => direction,
            (id, _) => id,
        };
        let current = *bit;
        candidates.retain(|a| Self::bit_of(a, current) == taken);
        *bit += 1;

        let mut status = 0;
        if id {
            status |= Status::SINGLE_BIT_RESULT;
        }
        if comp_id {
            status |= Status::TRIPLET_SECOND_BIT;
        }
        if taken {
            status |= Status::BRANCH_DIRECTION;
        }
        self.status = status;
    }

    fn command(&mut self, bytes: &[u8]) {
        let payload = bytes.get(1).copied().unwrap_or(0);
        match bytes[0] {
            c if c == Command::DeviceReset as u8 => {
                self.status = Status::DEVICE_RESET;
                self.pointer = Register::Status as u8;
                self.config = 0;
                self.channel = Channel::Ch0;
                self.searching = None;
            }
            c if c == Command::SetReadPointer as u8 => self.pointer = payload,
            c if c == Command::WriteConfiguration as u8 => {
                let valid = payload >> 4 == !payload & 0x0f;
                if valid && !self.config_locked {
                    self.config = payload & 0x0f;
                }
                self.pointer = Register::Configuration as u8;
            }
            c if c == Command::ChannelSelect as u8 => {
                if let Some(channel) = Channel::ALL.iter().find(|ch| ch.select_code() == payload) {
                    self.channel = *channel;
                }
                self.pointer = Register::ChannelSelect as u8;
            }
            c if c == Command::OneWireReset as u8 => {
                self.one_wire_started();
                self.one_wire_reset();
            }
            c if c == Command::OneWireWriteByte as u8 => {
                self.one_wire_started();
                self.one_wire_write_byte(payload);
            }
            c if c == Command::OneWireReadByte as u8 => {
                self.one_wire_started();
                self.data = self.read_queue.pop_front().unwrap_or(0xff);
            }
            c if c == Command::OneWireSingleBit as u8 => {
                self.one_wire_started();
                let sampled = payload & 0x80 != 0 && self.slave_bit;
                self.status = if sampled { Status::SINGLE_BIT_RESULT } else { 0 };
            }
            c if c == Command::OneWireTriplet as u8 => {
                self.one_wire_started();
                self.one_wire_triplet(payload & 0x80 != 0);
            }
            _ => {}
        }
    }

    fn read_pointed(&mut self) -> u8 {
        match self.pointer {
            p if p == Register::Status as u8 => {
                self.status_reads += 1;
                if self.stuck || self.busy_left > 0 {
                    self.busy_left = self.busy_left.saturating_sub(1);
                    self.status | Status::BUSY
                } else {
                    self.status
                }
            }
            p if p == Register::ReadData as u8 => self.data,
            p if p == Register::Configuration as u8 => self.config,
            p if p == Register::ChannelSelect as u8 => {
                self.channel_echo.unwrap_or(self.channel.echo_code())
            }
            _ => 0xff,
        }
    }
}

impl ErrorType for SimBridge {
    type Error = SimError;
}

impl I2c for SimBridge {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(SimError);
        }
        for operation in operations {
            match operation {
                Operation::Write(bytes) if !bytes.is_empty() => self.command(bytes),
                Operation::Write(_) => {}
                Operation::Read(buf) => {
                    for b in buf.iter_mut() {
                        *b = self.read_pointed();
                    }
                }
            }
        }
        Ok(())
    }
}
