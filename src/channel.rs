/// 1-Wire channel of the eight channel bridge variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Channel {
    #[default]
    Ch0 = 0,
    Ch1,
    Ch2,
    Ch3,
    Ch4,
    Ch5,
    Ch6,
    Ch7,
}

/// (selection code, read back code) per channel
const CODES: [(u8, u8); 8] = [
    (0xF0, 0xB8),
    (0xE1, 0xB1),
    (0xD2, 0xAA),
    (0xC3, 0xA3),
    (0xB4, 0x9C),
    (0xA5, 0x95),
    (0x96, 0x8E),
    (0x87, 0x87),
];

impl Channel {
    pub const ALL: [Channel; 8] = [
        Channel::Ch0,
        Channel::Ch1,
        Channel::Ch2,
        Channel::Ch3,
        Channel::Ch4,
        Channel::Ch5,
        Channel::Ch6,
        Channel::Ch7,
    ];

    pub fn index(&self) -> u8 {
        *self as _
    }

    /// Code written with the channel select command
    pub fn select_code(&self) -> u8 {
        CODES[self.index() as usize].0
    }

    /// Code the bridge reports back once the channel is switched
    pub fn echo_code(&self) -> u8 {
        CODES[self.index() as usize].1
    }
}

impl TryFrom<u8> for Channel {
    type Error = u8;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Channel::ALL.get(index as usize).copied().ok_or(index)
    }
}
