/// Snapshot of the bridge status register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct Status(pub u8);

impl Status {
    pub const BUSY: u8 = 1 << 0;
    pub const PRESENCE_PULSE: u8 = 1 << 1;
    pub const SHORT_DETECTED: u8 = 1 << 2;
    pub const LOGIC_LEVEL: u8 = 1 << 3;
    pub const DEVICE_RESET: u8 = 1 << 4;
    pub const SINGLE_BIT_RESULT: u8 = 1 << 5;
    pub const TRIPLET_SECOND_BIT: u8 = 1 << 6;
    pub const BRANCH_DIRECTION: u8 = 1 << 7;

    fn has(&self, mask: u8) -> bool {
        self.0 & mask != 0
    }

    /// A 1-Wire command is still in progress
    pub fn busy(&self) -> bool {
        self.has(Self::BUSY)
    }

    /// A presence pulse was seen after the last 1-Wire reset
    pub fn presence_pulse(&self) -> bool {
        self.has(Self::PRESENCE_PULSE)
    }

    pub fn short_detected(&self) -> bool {
        self.has(Self::SHORT_DETECTED)
    }

    pub fn logic_level(&self) -> bool {
        self.has(Self::LOGIC_LEVEL)
    }

    pub fn device_reset(&self) -> bool {
        self.has(Self::DEVICE_RESET)
    }

    /// Sampled bit of the last single bit slot, or the first bit of a triplet
    pub fn single_bit_result(&self) -> bool {
        self.has(Self::SINGLE_BIT_RESULT)
    }

    /// Complement bit sampled by the last triplet
    pub fn triplet_second_bit(&self) -> bool {
        self.has(Self::TRIPLET_SECOND_BIT)
    }

    /// Direction the bridge wrote during the last triplet
    pub fn branch_direction(&self) -> bool {
        self.has(Self::BRANCH_DIRECTION)
    }
}

impl From<u8> for Status {
    fn from(raw: u8) -> Self {
        Status(raw)
    }
}
