//! Simulated converter and indicators.
//!
//! These exist so the indicator loop and the recorder can run on machines
//! without an I2C bus or GPIO header, and so tests can script readings.

use super::types::{AnalogInput, HardwareError, IndicatorBank, MAX_CHANNEL};
use crate::core::Indicator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Noisy converter hovering around a base level.
pub struct SimulatedAdc {
    rng: StdRng,
    reads: u64,
    pub base_level: f64,
    pub noise_amplitude: f64,
    spike: Option<Spike>,
}

/// Periodic burst added on top of the noise.
#[derive(Debug, Clone, Copy)]
struct Spike {
    every: u64,
    length: u64,
    magnitude: f64,
}

impl SimulatedAdc {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            reads: 0,
            base_level: 177.0,
            noise_amplitude: 3.0,
            spike: None,
        }
    }

    /// Add `magnitude` to `length` consecutive reads out of every `every`.
    pub fn with_spikes(mut self, every: u64, length: u64, magnitude: f64) -> Self {
        if every > 0 {
            self.spike = Some(Spike {
                every,
                length: length.min(every),
                magnitude,
            });
        }
        self
    }

    pub fn reads(&self) -> u64 {
        self.reads
    }
}

impl AnalogInput for SimulatedAdc {
    fn read(&mut self, channel: u8) -> Result<u8, HardwareError> {
        if channel > MAX_CHANNEL {
            return Err(HardwareError::InvalidChannel(channel));
        }

        let noise = if self.noise_amplitude > 0.0 {
            self.rng
                .gen_range(-self.noise_amplitude..self.noise_amplitude)
        } else {
            0.0
        };
        let spike = match self.spike {
            Some(s) if self.reads % s.every >= s.every - s.length => s.magnitude,
            _ => 0.0,
        };
        self.reads += 1;

        Ok((self.base_level + noise + spike).round().clamp(0.0, 255.0) as u8)
    }
}

/// Replays a fixed list of readings, wrapping around at the end.
pub struct ScriptedAdc {
    samples: Vec<u8>,
    position: usize,
}

impl ScriptedAdc {
    pub fn new(samples: Vec<u8>) -> Self {
        Self {
            samples,
            position: 0,
        }
    }
}

impl AnalogInput for ScriptedAdc {
    fn read(&mut self, channel: u8) -> Result<u8, HardwareError> {
        if channel > MAX_CHANNEL {
            return Err(HardwareError::InvalidChannel(channel));
        }
        if self.samples.is_empty() {
            return Err(HardwareError::Bus("scripted converter has no samples".to_string()));
        }
        let value = self.samples[self.position % self.samples.len()];
        self.position += 1;
        Ok(value)
    }
}

/// Indicators held in memory, with a log of every write.
#[derive(Debug, Default)]
pub struct MemoryIndicators {
    levels: HashMap<Indicator, bool>,
    writes: Vec<(Indicator, bool)>,
}

impl MemoryIndicators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_on(&self, indicator: Indicator) -> bool {
        self.levels.get(&indicator).copied().unwrap_or(false)
    }

    /// Indicators currently on, in red/green/blue order.
    pub fn lit(&self) -> Vec<Indicator> {
        Indicator::ALL
            .into_iter()
            .filter(|&i| self.is_on(i))
            .collect()
    }

    pub fn writes(&self) -> &[(Indicator, bool)] {
        &self.writes
    }
}

impl IndicatorBank for MemoryIndicators {
    fn set(&mut self, indicator: Indicator, on: bool) -> Result<(), HardwareError> {
        self.levels.insert(indicator, on);
        self.writes.push((indicator, on));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SignalState;

    #[test]
    fn test_simulated_adc_is_seeded() {
        let mut a = SimulatedAdc::new(42);
        let mut b = SimulatedAdc::new(42);
        for _ in 0..20 {
            assert_eq!(a.read(7).unwrap(), b.read(7).unwrap());
        }
        assert_eq!(a.reads(), 20);
    }

    #[test]
    fn test_simulated_adc_stays_near_base() {
        let mut adc = SimulatedAdc::new(7);
        for _ in 0..100 {
            let value = adc.read(7).unwrap();
            assert!((174..=180).contains(&value));
        }
    }

    #[test]
    fn test_spikes_repeat() {
        let mut adc = SimulatedAdc::new(1).with_spikes(5, 1, 60.0);
        adc.noise_amplitude = 0.0;
        let values: Vec<u8> = (0..10).map(|_| adc.read(0).unwrap()).collect();
        assert_eq!(values, vec![177, 177, 177, 177, 237, 177, 177, 177, 177, 237]);
    }

    #[test]
    fn test_scripted_adc_wraps() {
        let mut adc = ScriptedAdc::new(vec![1, 2, 3]);
        let values: Vec<u8> = (0..5).map(|_| adc.read(7).unwrap()).collect();
        assert_eq!(values, vec![1, 2, 3, 1, 2]);
        assert!(adc.read(9).is_err());
    }

    #[test]
    fn test_memory_indicators_show_state() {
        let mut bank = MemoryIndicators::new();
        bank.show(SignalState::Blue).unwrap();
        assert_eq!(bank.lit(), vec![Indicator::Blue]);

        bank.show(SignalState::Red).unwrap();
        assert_eq!(bank.lit(), vec![Indicator::Red]);

        bank.all_off().unwrap();
        assert!(bank.lit().is_empty());
    }

    #[test]
    fn test_show_writes_pins_in_fixed_order() {
        let mut bank = MemoryIndicators::new();
        bank.show(SignalState::Red).unwrap();
        bank.show(SignalState::Green).unwrap();
        bank.show(SignalState::Blue).unwrap();

        use Indicator::{Blue, Green, Red};
        assert_eq!(
            bank.writes(),
            &[
                (Blue, false),
                (Green, false),
                (Red, true),
                (Red, false),
                (Blue, false),
                (Green, true),
                (Red, false),
                (Blue, true),
                (Green, false),
            ]
        );
    }
}
