//! Raspberry Pi backend: converter on I2C, indicators on GPIO.

use super::types::{AdcModel, AnalogInput, HardwareError, IndicatorBank, IndicatorPins};
use crate::core::Indicator;
use rppal::gpio::{Gpio, OutputPin};
use rppal::i2c::I2c;

/// Converter detected on the I2C bus.
///
/// The bus handle is closed when this value is dropped.
pub struct I2cAdc {
    bus: I2c,
    model: AdcModel,
}

impl I2cAdc {
    pub fn model(&self) -> AdcModel {
        self.model
    }
}

/// Try each supported address in turn; the first one to ack wins.
pub fn probe(bus: u8) -> Result<I2cAdc, HardwareError> {
    for model in AdcModel::PROBE_ORDER {
        let mut i2c = I2c::with_bus(bus).map_err(|e| HardwareError::Bus(e.to_string()))?;
        i2c.set_slave_address(model.address())
            .map_err(|e| HardwareError::Bus(e.to_string()))?;

        if i2c.smbus_send_byte(0).is_ok() {
            tracing::debug!(
                converter = model.name(),
                address = model.address(),
                "converter detected"
            );
            return Ok(I2cAdc { bus: i2c, model });
        }
    }
    Err(HardwareError::NotDetected { bus })
}

impl AnalogInput for I2cAdc {
    fn read(&mut self, channel: u8) -> Result<u8, HardwareError> {
        let command = self.model.command(channel)?;
        let mut value = 0;
        for _ in 0..self.model.reads_per_sample() {
            value = self
                .bus
                .smbus_read_byte(command)
                .map_err(|e| HardwareError::Bus(e.to_string()))?;
        }
        Ok(value)
    }
}

/// Three LEDs on GPIO output pins, switched off on drop.
pub struct GpioIndicators {
    red: OutputPin,
    green: OutputPin,
    blue: OutputPin,
}

impl GpioIndicators {
    pub fn new(pins: &IndicatorPins) -> Result<Self, HardwareError> {
        let gpio = Gpio::new().map_err(|e| HardwareError::Gpio(e.to_string()))?;
        let output = |pin: u8| -> Result<OutputPin, HardwareError> {
            gpio.get(pin)
                .map(|p| p.into_output_low())
                .map_err(|e| HardwareError::Gpio(format!("pin {pin}: {e}")))
        };

        Ok(Self {
            red: output(pins.red)?,
            green: output(pins.green)?,
            blue: output(pins.blue)?,
        })
    }

    fn pin_mut(&mut self, indicator: Indicator) -> &mut OutputPin {
        match indicator {
            Indicator::Red => &mut self.red,
            Indicator::Green => &mut self.green,
            Indicator::Blue => &mut self.blue,
        }
    }
}

impl IndicatorBank for GpioIndicators {
    fn set(&mut self, indicator: Indicator, on: bool) -> Result<(), HardwareError> {
        let pin = self.pin_mut(indicator);
        if on {
            pin.set_high();
        } else {
            pin.set_low();
        }
        Ok(())
    }
}

impl Drop for GpioIndicators {
    fn drop(&mut self) {
        self.red.set_low();
        self.green.set_low();
        self.blue.set_low();
    }
}
