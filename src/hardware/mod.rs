//! Converter and indicator access.
//!
//! The real backend talks to an I2C converter and GPIO pins on a
//! Raspberry Pi and is only built with the `rpi` feature. The simulated
//! backend is always available.

pub mod sim;
pub mod types;

#[cfg(feature = "rpi")]
pub mod rpi;

// Re-export commonly used types
pub use sim::{MemoryIndicators, ScriptedAdc, SimulatedAdc};
pub use types::{
    AdcModel, AnalogInput, HardwareError, IndicatorBank, IndicatorPins, ADS7830_ADDRESS,
    MAX_CHANNEL, PCF8591_ADDRESS,
};

#[cfg(feature = "rpi")]
pub use rpi::{probe, GpioIndicators, I2cAdc};

/// Whether this build can drive real hardware.
pub const HARDWARE_SUPPORT: bool = cfg!(feature = "rpi");
