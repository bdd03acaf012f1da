//! Sensor Anomaly Indicator - sliding-window anomaly signalling for an
//! analog sensor read through an I2C converter.
//!
//! Every tick one converter sample is pushed into a fixed-depth window,
//! the window is reduced to a short feature vector, two pre-trained models
//! classify it, and exactly one of three LEDs is lit.
//!
//! # Signals
//!
//! - **GREEN**: normal, class 0
//! - **BLUE**: normal, class 1
//! - **RED**: anomaly, confirmed by two consecutive outlier ticks
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     Sensor Anomaly Indicator                      │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌───────────┐   ┌───────────┐   ┌───────────┐  │
//! │  │ Converter │──▶│  Window   │──▶│ Features  │──▶│ Ensemble  │  │
//! │  │  (I2C)    │   │ (N = 10)  │   │ (mean,std,│   │ (scaler,  │  │
//! │  └───────────┘   └───────────┘   │  spectrum)│   │  LOF, kNN)│  │
//! │                                  └─────┬─────┘   └─────┬─────┘  │
//! │                                        │               ▼        │
//! │                                        │         ┌───────────┐  │
//! │                                        ▼         │  Signal   │  │
//! │                                  ┌───────────┐   │  state    │  │
//! │                                  │ Recorder  │   │  machine  │  │
//! │                                  │  (CSV)    │   └─────┬─────┘  │
//! │                                  └───────────┘         ▼        │
//! │                                                  ┌───────────┐  │
//! │                                                  │   LEDs    │  │
//! │                                                  └───────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use sensor_anomaly_indicator::{
//!     hardware::{MemoryIndicators, SimulatedAdc},
//!     model::FittedEnsemble,
//!     monitor::{Monitor, MonitorSettings},
//!     stats::create_shared_log,
//!     Config,
//! };
//!
//! let config = Config::default();
//! let ensemble = FittedEnsemble::load(&config.models, config.feature_len()).unwrap();
//! let mut monitor = Monitor::new(
//!     SimulatedAdc::new(42),
//!     MemoryIndicators::new(),
//!     ensemble,
//!     MonitorSettings::from(&config),
//!     create_shared_log(),
//! );
//! let report = monitor.tick().unwrap();
//! println!("{}", report.state);
//! ```

pub mod config;
pub mod core;
pub mod hardware;
pub mod model;
pub mod monitor;
pub mod recorder;
pub mod stats;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError, RecorderConfig};
pub use core::{
    extract_features, FeatureExtractor, FeatureVector, SampleWindow, SignalState,
    SignalStateMachine,
};
pub use hardware::{AnalogInput, HardwareError, IndicatorBank};
pub use model::{ClassifierEnsemble, FittedEnsemble, ModelError, Predictor};
pub use monitor::{Monitor, MonitorSettings, TickReport};
pub use recorder::{FeatureTable, RecorderError, SessionRecorder};
pub use stats::{RunLog, RunStats, SharedRunLog};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
