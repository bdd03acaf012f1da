//! The indicator loop: sample, extract, classify, signal, sleep.
//!
//! The monitor owns the converter and the indicators for its whole life.
//! Dropping it turns every indicator off, so the outputs are cleared on
//! interruption, on a read failure and on normal return alike.

use crate::core::{
    ClassLabel, ClassificationResult, FeatureExtractor, FeatureVector, OutlierFlag, SampleWindow,
    SignalState, SignalStateMachine,
};
use crate::hardware::{AnalogInput, HardwareError, IndicatorBank};
use crate::model::{ClassifierEnsemble, Predictor};
use crate::stats::SharedRunLog;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Static settings of the loop.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub channel: u8,
    pub window_len: usize,
    pub baseline_sample: f64,
    pub tick_period: Duration,
}

impl From<&crate::config::Config> for MonitorSettings {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            channel: config.adc_channel,
            window_len: config.window_len,
            baseline_sample: config.baseline_sample,
            tick_period: config.tick_period,
        }
    }
}

/// What happened on one tick.
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub sample: u8,
    pub features: FeatureVector,
    pub result: ClassificationResult,
    pub state: SignalState,
    /// Whether the lit indicator changed on this tick
    pub changed: bool,
}

pub struct Monitor<A, I, O, C>
where
    A: AnalogInput,
    I: IndicatorBank,
    O: Predictor<Label = OutlierFlag>,
    C: Predictor<Label = ClassLabel>,
{
    adc: A,
    indicators: I,
    ensemble: ClassifierEnsemble<O, C>,
    settings: MonitorSettings,
    window: SampleWindow,
    extractor: FeatureExtractor,
    machine: SignalStateMachine,
    log: SharedRunLog,
    ticks: u64,
}

impl<A, I, O, C> Monitor<A, I, O, C>
where
    A: AnalogInput,
    I: IndicatorBank,
    O: Predictor<Label = OutlierFlag>,
    C: Predictor<Label = ClassLabel>,
{
    pub fn new(
        adc: A,
        indicators: I,
        ensemble: ClassifierEnsemble<O, C>,
        settings: MonitorSettings,
        log: SharedRunLog,
    ) -> Self {
        Self {
            adc,
            indicators,
            ensemble,
            window: SampleWindow::new(settings.window_len, settings.baseline_sample),
            extractor: FeatureExtractor::new(settings.window_len),
            settings,
            machine: SignalStateMachine::new(),
            log,
            ticks: 0,
        }
    }

    /// Run one sample-to-indicator pass.
    pub fn tick(&mut self) -> Result<TickReport, HardwareError> {
        let sample = self.adc.read(self.settings.channel)?;
        self.window.push(f64::from(sample));

        let features = self.extractor.extract(&self.window);
        let result = self.ensemble.classify(&features);

        let previous = self.machine.current();
        let state = self.machine.step(result);
        self.indicators.show(state)?;

        self.ticks += 1;
        self.log.record_tick(&result, state);

        let changed = previous != Some(state);
        tracing::debug!(
            tick = self.ticks,
            sample,
            outlier = result.outlier.raw(),
            class = result.class.raw(),
            state = %state,
            "tick"
        );
        if changed {
            tracing::info!(tick = self.ticks, "indicator -> {state}");
        }

        Ok(TickReport {
            tick: self.ticks,
            sample,
            features,
            result,
            state,
            changed,
        })
    }

    /// Tick until `running` is cleared, then switch the indicators off.
    ///
    /// The flag is checked before every tick; a sleep in progress is not
    /// cut short. Returns the number of ticks run.
    pub fn run(&mut self, running: &AtomicBool) -> Result<u64, HardwareError> {
        while running.load(Ordering::SeqCst) {
            self.tick()?;
            thread::sleep(self.settings.tick_period);
        }
        self.indicators.all_off()?;
        Ok(self.ticks)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    pub fn indicators(&self) -> &I {
        &self.indicators
    }

    pub fn state(&self) -> Option<SignalState> {
        self.machine.current()
    }
}

impl<A, I, O, C> Drop for Monitor<A, I, O, C>
where
    A: AnalogInput,
    I: IndicatorBank,
    O: Predictor<Label = OutlierFlag>,
    C: Predictor<Label = ClassLabel>,
{
    fn drop(&mut self) {
        if let Err(e) = self.indicators.all_off() {
            tracing::warn!("could not switch indicators off: {e}");
        }
    }
}
