/// Polling policy used while waiting for the bridge to become idle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Status reads before giving up and raising the timeout flag, at least one
    pub poll_attempts: u16,
    /// Pause between two status reads in microseconds
    pub poll_interval_us: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            poll_attempts: 1000,
            poll_interval_us: 20,
        }
    }
}

impl Config {
    pub fn with_poll_attempts(mut self, poll_attempts: u16) -> Self {
        self.poll_attempts = poll_attempts;
        self
    }

    pub fn with_poll_interval_us(mut self, poll_interval_us: u32) -> Self {
        self.poll_interval_us = poll_interval_us;
        self
    }
}

/// Bridge configuration register
///
/// Only the lower nibble carries settings. On the wire the upper nibble must
/// hold the one's complement of the lower one, see [`DeviceConfig::transit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct DeviceConfig(u8);

impl DeviceConfig {
    pub const ACTIVE_PULLUP: u8 = 1 << 0;
    pub const STRONG_PULLUP: u8 = 1 << 2;
    pub const OVERDRIVE: u8 = 1 << 3;

    pub fn new() -> Self {
        Self::default()
    }

    fn with(mut self, mask: u8, enable: bool) -> Self {
        if enable {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
        self
    }

    pub fn with_active_pullup(self, enable: bool) -> Self {
        self.with(Self::ACTIVE_PULLUP, enable)
    }

    pub fn with_strong_pullup(self, enable: bool) -> Self {
        self.with(Self::STRONG_PULLUP, enable)
    }

    pub fn with_overdrive(self, enable: bool) -> Self {
        self.with(Self::OVERDRIVE, enable)
    }

    pub fn active_pullup(&self) -> bool {
        self.0 & Self::ACTIVE_PULLUP != 0
    }

    pub fn strong_pullup(&self) -> bool {
        self.0 & Self::STRONG_PULLUP != 0
    }

    pub fn overdrive(&self) -> bool {
        self.0 & Self::OVERDRIVE != 0
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Byte as written with the configuration command
    pub fn transit(&self) -> u8 {
        (self.0 & 0x0F) | (!self.0 & 0x0F) << 4
    }
}

impl From<u8> for DeviceConfig {
    fn from(raw: u8) -> Self {
        DeviceConfig(raw & 0x0F)
    }
}

impl From<DeviceConfig> for u8 {
    fn from(config: DeviceConfig) -> u8 {
        config.0
    }
}
