//! Hardware-facing types shared by all backends.

use crate::core::{Indicator, SignalState};
use serde::{Deserialize, Serialize};

/// Bus address of the PCF8591 converter.
pub const PCF8591_ADDRESS: u16 = 0x48;

/// Bus address of the ADS7830 converter.
pub const ADS7830_ADDRESS: u16 = 0x4b;

/// Highest channel index either converter exposes.
pub const MAX_CHANNEL: u8 = 7;

/// Supported 8-bit I2C converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdcModel {
    Pcf8591,
    Ads7830,
}

impl AdcModel {
    /// Probe order on the bus.
    pub const PROBE_ORDER: [AdcModel; 2] = [AdcModel::Pcf8591, AdcModel::Ads7830];

    pub fn address(self) -> u16 {
        match self {
            AdcModel::Pcf8591 => PCF8591_ADDRESS,
            AdcModel::Ads7830 => ADS7830_ADDRESS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AdcModel::Pcf8591 => "PCF8591",
            AdcModel::Ads7830 => "ADS7830",
        }
    }

    /// Command byte selecting `channel` for a single-ended conversion.
    pub fn command(self, channel: u8) -> Result<u8, HardwareError> {
        if channel > MAX_CHANNEL {
            return Err(HardwareError::InvalidChannel(channel));
        }
        Ok(match self {
            AdcModel::Pcf8591 => 0x40 + channel,
            AdcModel::Ads7830 => 0x84 | ((((channel << 2) | (channel >> 1)) & 0x07) << 4),
        })
    }

    /// Reads issued per sample.
    ///
    /// The PCF8591 returns the previous conversion on the first read.
    pub fn reads_per_sample(self) -> usize {
        match self {
            AdcModel::Pcf8591 => 2,
            AdcModel::Ads7830 => 1,
        }
    }
}

/// Source of raw converter samples.
pub trait AnalogInput {
    fn read(&mut self, channel: u8) -> Result<u8, HardwareError>;
}

/// Three independent on/off outputs.
pub trait IndicatorBank {
    fn set(&mut self, indicator: Indicator, on: bool) -> Result<(), HardwareError>;

    /// Drive the outputs so only the state's indicator is lit.
    fn show(&mut self, state: SignalState) -> Result<(), HardwareError> {
        for (indicator, on) in state.transitions() {
            self.set(indicator, on)?;
        }
        Ok(())
    }

    fn all_off(&mut self) -> Result<(), HardwareError> {
        for indicator in Indicator::ALL {
            self.set(indicator, false)?;
        }
        Ok(())
    }
}

/// BCM pin numbers of the indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorPins {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl IndicatorPins {
    pub fn pin(&self, indicator: Indicator) -> u8 {
        match indicator {
            Indicator::Red => self.red,
            Indicator::Green => self.green,
            Indicator::Blue => self.blue,
        }
    }
}

impl Default for IndicatorPins {
    fn default() -> Self {
        Self {
            red: 26,
            green: 27,
            blue: 17,
        }
    }
}

/// Errors raised by converter and indicator backends.
#[derive(Debug)]
pub enum HardwareError {
    /// No supported converter answered on the bus
    NotDetected { bus: u8 },
    InvalidChannel(u8),
    Bus(String),
    Gpio(String),
}

impl std::fmt::Display for HardwareError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HardwareError::NotDetected { bus } => write!(
                f,
                "No supported converter found at 0x{PCF8591_ADDRESS:02x} or 0x{ADS7830_ADDRESS:02x}.\n\
                 Please use command 'i2cdetect -y {bus}' to check the I2C address."
            ),
            HardwareError::InvalidChannel(ch) => {
                write!(f, "Invalid converter channel {ch} (expected 0-{MAX_CHANNEL})")
            }
            HardwareError::Bus(e) => write!(f, "I2C error: {e}"),
            HardwareError::Gpio(e) => write!(f, "GPIO error: {e}"),
        }
    }
}

impl std::error::Error for HardwareError {}
